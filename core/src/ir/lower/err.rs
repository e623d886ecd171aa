use crate::error::{Level, LucixErrorExt};
use crate::location::{Location, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
}

/// A name that no scope frame (or no registered function) knows about.
#[derive(Debug, Clone)]
pub struct UnresolvedSymbolError {
    pub kind: SymbolKind,
    pub name: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl UnresolvedSymbolError {
    pub fn variable(name: &str) -> Self {
        UnresolvedSymbolError {
            kind: SymbolKind::Variable,
            name: name.to_string(),
            location: None,
            span: None,
        }
    }

    pub fn function(name: &str) -> Self {
        UnresolvedSymbolError {
            kind: SymbolKind::Function,
            name: name.to_string(),
            location: None,
            span: None,
        }
    }

    pub fn at(mut self, location: Option<Location>, span: Option<Span>) -> Self {
        self.location = location;
        self.span = span;
        self
    }
}

impl std::fmt::Display for UnresolvedSymbolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            SymbolKind::Variable => write!(f, "cannot resolve symbol {}", self.name),
            SymbolKind::Function => write!(f, "cannot resolve function {}", self.name),
        }
    }
}

impl std::error::Error for UnresolvedSymbolError {}

impl LucixErrorExt for UnresolvedSymbolError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        match self.kind {
            SymbolKind::Variable => "lucix.codegen.scope".to_string(),
            SymbolKind::Function => "lucix.codegen.registry".to_string(),
        }
    }

    fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

/// A type name outside the catalog. The grammar cannot produce one, so
/// this is always a `Critical` contract violation.
#[derive(Debug, Clone)]
pub struct UnknownTypeError {
    pub name: String,
    location: Option<Location>,
}

impl UnknownTypeError {
    pub fn new(name: &str) -> Self {
        UnknownTypeError {
            name: name.to_string(),
            location: None,
        }
    }

    pub fn at(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }
}

impl std::fmt::Display for UnknownTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown type '{}'", self.name)
    }
}

impl std::error::Error for UnknownTypeError {}

impl LucixErrorExt for UnknownTypeError {
    fn level(&self) -> Level {
        Level::Critical
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "lucix.codegen.types".to_string()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

/// A variable binding was attempted while no scope frame is open.
#[derive(Debug, Clone)]
pub struct NoOpenScopeError {
    pub name: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl NoOpenScopeError {
    pub fn new(name: &str) -> Self {
        NoOpenScopeError {
            name: name.to_string(),
            location: None,
            span: None,
        }
    }

    pub fn at(mut self, location: Option<Location>, span: Option<Span>) -> Self {
        self.location = location;
        self.span = span;
        self
    }
}

impl std::fmt::Display for NoOpenScopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot declare {} outside any scope", self.name)
    }
}

impl std::error::Error for NoOpenScopeError {}

impl LucixErrorExt for NoOpenScopeError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "lucix.codegen.scope".to_string()
    }

    fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

/// A construct that is well formed but cannot produce the value its
/// context needs, e.g. using a void call as an operand.
#[derive(Debug, Clone)]
pub struct InvalidValueError {
    message: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl InvalidValueError {
    pub fn new(message: impl Into<String>, location: Option<Location>, span: Option<Span>) -> Self {
        InvalidValueError {
            message: message.into(),
            location,
            span,
        }
    }
}

impl std::fmt::Display for InvalidValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for InvalidValueError {}

impl LucixErrorExt for InvalidValueError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        "lucix.codegen".to_string()
    }

    fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}
