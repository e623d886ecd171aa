use std::io;
use std::path::PathBuf;

use crate::error::{Level, LucixErrorExt};

/// A source file handed to the compiler. The whole file is read up front;
/// generation never starts on partially consumed input.
#[derive(Debug, Clone)]
pub struct Script {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

impl Script {
    pub fn new(path: PathBuf) -> Result<Self, Box<dyn LucixErrorExt>> {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                log::debug!("read {} bytes from {}", content.len(), path.display());
                Ok(Script {
                    name,
                    path,
                    content,
                })
            }
            Err(e) => Err(Box::new(UnreadableScriptError::new(path, &e))),
        }
    }

    /// In-memory script, used by tests and by tooling that already holds the text.
    pub fn from_source(name: &str, content: &str) -> Self {
        Script {
            name: name.to_string(),
            path: PathBuf::from(name),
            content: content.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// 1-based source line, without its terminator.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|index| self.content.lines().nth(index))
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// The script file is missing or could not be read as UTF-8 text.
#[derive(Debug, Clone)]
pub struct UnreadableScriptError {
    pub path: PathBuf,
    pub kind: io::ErrorKind,
    pub reason: String,
}

impl UnreadableScriptError {
    pub fn new(path: PathBuf, err: &io::Error) -> Self {
        UnreadableScriptError {
            path,
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

impl std::fmt::Display for UnreadableScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            io::ErrorKind::NotFound => write!(f, "script {} does not exist", self.path.display()),
            _ => write!(f, "cannot read script {}: {}", self.path.display(), self.reason),
        }
    }
}

impl std::error::Error for UnreadableScriptError {}

impl LucixErrorExt for UnreadableScriptError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "lucix.script".to_string()
    }

    fn span(&self) -> Option<crate::location::Span> {
        None
    }

    fn location(&self) -> Option<crate::location::Location> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_names_the_path() {
        let err = Script::new(PathBuf::from("no/such/file.lx")).unwrap_err();
        assert_eq!(err.issuer(), "lucix.script");
        assert!(err.message().contains("does not exist"));
        assert!(err.message().contains("file.lx"));
    }

    #[test]
    fn lines_are_one_based() {
        let script = Script::from_source("a.lx", "fn a() {}\nfn b() {}\n");
        assert_eq!(script.line(1), Some("fn a() {}"));
        assert_eq!(script.line(2), Some("fn b() {}"));
        assert_eq!(script.line(0), None);
        assert_eq!(script.line(3), None);
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert!(Script::from_source("a.lx", " \n\t\n").is_empty());
        assert!(!Script::from_source("a.lx", "fn main() {}").is_empty());
    }
}
