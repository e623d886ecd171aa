//! Errors raised while turning source text into an AST.

use std::fmt;

use crate::ast::rules::Rule;
use crate::error::{Level, LucixErrorExt};
use crate::location::{Location, Span};

/// Fields shared by every parse failure.
#[derive(Debug, Clone)]
struct ParseDiagnostic {
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} (at {})", self.message, loc),
            None => f.write_str(&self.message),
        }
    }
}

/// The script holds nothing but whitespace.
#[derive(Debug, Clone)]
pub struct EmptyScriptError(ParseDiagnostic);

impl EmptyScriptError {
    pub fn new(issuer: String, location: Option<Location>, span: Option<Span>) -> Self {
        let message = match &location {
            Some(loc) => format!("script '{}' is empty", loc.file),
            None => "script is empty".to_string(),
        };
        EmptyScriptError(ParseDiagnostic {
            level: Level::Error,
            message,
            issuer,
            location,
            span,
        })
    }
}

impl fmt::Display for EmptyScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for EmptyScriptError {}

impl LucixErrorExt for EmptyScriptError {
    fn level(&self) -> Level {
        self.0.level
    }

    fn message(&self) -> String {
        self.0.message.clone()
    }

    fn issuer(&self) -> String {
        self.0.issuer.clone()
    }

    fn span(&self) -> Option<Span> {
        self.0.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.0.location.clone()
    }
}

/// Raised for any input the grammar rejects, and for literals the parser
/// cannot represent (such as integers outside the i32 range).
#[derive(Debug, Clone)]
pub struct SyntaxError(ParseDiagnostic);

impl SyntaxError {
    pub fn with(
        level: Level,
        message: String,
        issuer: String,
        location: Option<Location>,
        span: Option<Span>,
    ) -> Self {
        SyntaxError(ParseDiagnostic {
            level,
            message,
            issuer,
            location,
            span,
        })
    }

    /// Converts a pest failure, keeping only the start of a span.
    pub fn from_pest(err: &pest::error::Error<Rule>, file: &str, issuer: &str) -> Self {
        let (line, column) = match err.line_col {
            pest::error::LineColLocation::Pos(pos) => pos,
            pest::error::LineColLocation::Span(start, _) => start,
        };
        Self::with(
            Level::Error,
            err.variant.message().to_string(),
            issuer.to_string(),
            Some(Location::new(file.to_string(), line, column)),
            None,
        )
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for SyntaxError {}

impl LucixErrorExt for SyntaxError {
    fn level(&self) -> Level {
        self.0.level
    }

    fn message(&self) -> String {
        self.0.message.clone()
    }

    fn issuer(&self) -> String {
        self.0.issuer.clone()
    }

    fn span(&self) -> Option<Span> {
        self.0.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.0.location.clone()
    }
}
