use crate::error::{Level, LucixErrorExt};
use crate::location::{Location, Span};

/// Raised when a unit cannot be compiled: malformed IR, a symbol defined
/// twice, an import with no definition, or a Cranelift failure.
#[derive(Debug, Clone)]
pub struct BackendError {
    pub unit: String,
    pub message: String,
}

impl BackendError {
    pub fn new(unit: &str, message: impl Into<String>) -> Self {
        BackendError {
            unit: unit.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot compile unit '{}': {}", self.unit, self.message)
    }
}

impl std::error::Error for BackendError {}

impl LucixErrorExt for BackendError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "lucix.jit.session".to_string()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        None
    }
}

/// A symbol that was never added to the session.
#[derive(Debug, Clone)]
pub struct LookupError {
    pub name: String,
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "symbol '{}' is not defined in the session", self.name)
    }
}

impl std::error::Error for LookupError {}

impl LucixErrorExt for LookupError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "lucix.jit.lookup".to_string()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        None
    }
}
