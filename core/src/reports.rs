// Diagnostics rendering for errors raised while compiling a script.
// A `Report` is built from any `LucixErrorExt` and can be printed with a
// source excerpt or exported as JSON.

use console::Style;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use crate::error::{Level, LucixErrorExt};
use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Fatal,
    Error,
    Warning,
    Info,
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Critical => Severity::Fatal,
            Level::Error => Severity::Error,
            Level::Warning => Severity::Warning,
            Level::Info => Severity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        };
        write!(f, "{}", s)
    }
}

/// Stable error code for programmatic handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u32);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E_{}", self.0)
    }
}

pub const E_IO: ErrorCode = ErrorCode(1);
pub const E_SYNTAX: ErrorCode = ErrorCode(2);
pub const E_RESOLVE: ErrorCode = ErrorCode(3);
pub const E_BACKEND: ErrorCode = ErrorCode(4);
pub const E_CONFIG: ErrorCode = ErrorCode(5);
pub const E_INTERNAL: ErrorCode = ErrorCode(999);

impl ErrorCode {
    /// Classify an error by the component that issued it.
    pub fn for_issuer(issuer: &str) -> ErrorCode {
        if issuer.starts_with("lucix.ast") {
            E_SYNTAX
        } else if issuer.starts_with("lucix.script") {
            E_IO
        } else if issuer.starts_with("lucix.codegen") {
            E_RESOLVE
        } else if issuer.starts_with("lucix.jit") {
            E_BACKEND
        } else if issuer.starts_with("lucix.config") {
            E_CONFIG
        } else {
            E_INTERNAL
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    /// Columns to underline on the reported line.
    pub width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub message: String,
    pub severity: Severity,
    pub issuer: String,
    pub location: Option<ReportLocation>,
    pub code: Option<ErrorCode>,
    pub suggestion: Option<String>,
}

impl Report {
    pub fn new(message: &str, severity: Severity, location: Option<ReportLocation>) -> Self {
        Report {
            message: message.to_string(),
            severity,
            issuer: String::new(),
            location,
            code: None,
            suggestion: None,
        }
    }

    /// Build a report from any crate error.
    pub fn from_error(error: &dyn LucixErrorExt) -> Self {
        let width = error.span().map(|s| s.width_on_line()).unwrap_or(1);
        let location = error
            .location()
            .or_else(|| error.span().map(|s| s.start))
            .map(|loc: Location| ReportLocation {
                file: loc.file,
                line: loc.line,
                column: loc.column,
                width,
            });
        let issuer = error.issuer();
        Report {
            message: error.message(),
            severity: error.level().into(),
            code: Some(ErrorCode::for_issuer(&issuer)),
            suggestion: suggestion_for(&error.message()),
            issuer,
            location,
        }
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Minimal LSP-like diagnostic map.
    pub fn to_lsp_diagnostic(&self) -> serde_json::Value {
        let range = if let Some(loc) = &self.location {
            json!({
                "start": { "line": loc.line.saturating_sub(1), "character": loc.column.saturating_sub(1) },
                "end": { "line": loc.line.saturating_sub(1), "character": loc.column.saturating_sub(1) + loc.width }
            })
        } else {
            json!(null)
        };
        json!({
            "severity": match self.severity {
                Severity::Fatal | Severity::Error => 1,
                Severity::Warning => 2,
                Severity::Info => 3,
            },
            "code": self.code.map(|c| c.to_string()),
            "source": "lucix",
            "message": self.message,
            "range": range,
        })
    }

    /// Render with a source excerpt and a caret under the reported span.
    pub fn pretty_with_source(&self, source: &str) -> String {
        let header = Style::new().bold();
        let sev = match self.severity {
            Severity::Fatal => Style::new().on_red().white().bold(),
            Severity::Error => Style::new().red().bold(),
            Severity::Warning => Style::new().yellow().bold(),
            Severity::Info => Style::new().blue().bold(),
        };

        let mut out = format!(
            "{} {}\n",
            sev.apply_to(format!("[{}]", self.severity)),
            header.apply_to(&self.message)
        );

        if let Some(loc) = &self.location {
            out.push_str(&format!(" --> {}:{}:{}\n", loc.file, loc.line, loc.column));
            if let Some(line_str) = source.lines().nth(loc.line.saturating_sub(1)) {
                out.push_str(&format!(" {:4} | {}\n", loc.line, line_str));
                let caret = format!(
                    "      | {}{}",
                    " ".repeat(loc.column.saturating_sub(1)),
                    "^".repeat(loc.width.max(1))
                );
                out.push_str(&format!("{}\n", Style::new().green().apply_to(caret)));
            }
        }

        if let Some(s) = &self.suggestion {
            out.push_str(&format!(
                "{}\n",
                Style::new().cyan().apply_to(format!("Suggestion: {}", s))
            ));
        }
        out
    }
}

fn suggestion_for(message: &str) -> Option<String> {
    if message.starts_with("cannot resolve symbol") {
        Some("declare it with `var` before use, in this scope or an enclosing one".to_string())
    } else if message.starts_with("cannot resolve function") {
        Some("functions must be declared above their first call".to_string())
    } else {
        None
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = match &self.location {
            Some(l) => format!(" at {}:{}:{}", l.file, l.line, l.column),
            None => String::new(),
        };
        match &self.code {
            Some(code) => write!(f, "[{}]{} ({}): {}", self.severity, loc, code, self.message),
            None => write!(f, "[{}]{}: {}", self.severity, loc, self.message),
        }
    }
}

impl std::error::Error for Report {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::err::SyntaxError;

    fn sample() -> Report {
        let err = SyntaxError::with(
            Level::Error,
            "expected ';'".into(),
            "lucix.ast.generate_ast_from_source".into(),
            Some(Location::new("a.lx".into(), 2, 5)),
            None,
        );
        Report::from_error(&err)
    }

    #[test]
    fn classifies_by_issuer() {
        let report = sample();
        assert_eq!(report.code, Some(E_SYNTAX));
        assert_eq!(report.severity, Severity::Error);
        assert_eq!(
            report.to_string(),
            "[ERROR] at a.lx:2:5 (E_2): expected ';'"
        );
    }

    #[test]
    fn caret_points_at_column() {
        console::set_colors_enabled(false);
        let text = sample().pretty_with_source("fn f() {\n    x\n}");
        assert!(text.contains("    2 |     x"));
        assert!(text.contains("      |     ^"));
    }

    #[test]
    fn json_export_names_fields() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"severity\": \"Error\""));
        assert!(json.contains("\"line\": 2"));
    }
}
