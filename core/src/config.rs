//! file: core/src/config.rs
//! description: compiler/runtime settings loaded from JSON.
//!
//! Every field has a default so an empty object (or no file at all) is a
//! valid configuration. The CLI layers its flags on top of whatever is loaded.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Level, LucixErrorExt};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "lucix.json";

/// How top-level functions are grouped into compilation units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileMode {
    /// Each function gets a fresh unit, handed over as soon as it is generated.
    #[default]
    PerFunction,
    /// One unit per source file, handed over after the whole tree.
    PerUnit,
}

impl std::str::FromStr for CompileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_function" | "per-function" | "function" => Ok(CompileMode::PerFunction),
            "per_unit" | "per-unit" | "unit" => Ok(CompileMode::PerUnit),
            other => Err(format!("unknown compile mode '{}'", other)),
        }
    }
}

/// Cranelift `opt_level` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendOptLevel {
    None,
    #[default]
    Speed,
    SpeedAndSize,
}

impl BackendOptLevel {
    pub fn as_flag(&self) -> &'static str {
        match self {
            BackendOptLevel::None => "none",
            BackendOptLevel::Speed => "speed",
            BackendOptLevel::SpeedAndSize => "speed_and_size",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    #[serde(default)]
    pub mode: CompileMode,
    #[serde(default = "default_true")]
    pub optimize: bool,
    #[serde(default = "default_true")]
    pub print_ir: bool,
    #[serde(default)]
    pub backend_opt_level: BackendOptLevel,
}

fn default_entry_point() -> String {
    "test".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            entry_point: default_entry_point(),
            mode: CompileMode::default(),
            optimize: true,
            print_ir: true,
            backend_opt_level: BackendOptLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, Box<dyn LucixErrorExt>> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::boxed(path, e))?;
        Self::from_json(&raw).map_err(|e| ConfigError::boxed(path, e))
    }

    pub fn from_json(raw: &str) -> Result<Config, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Load `path` when given, else `lucix.json` from `dir` if it exists,
    /// else the defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Config, Box<dyn LucixErrorExt>> {
        if let Some(p) = path {
            return Self::load_from_file(p);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("using config {}", candidate.display());
            Self::load_from_file(candidate)
        } else {
            Ok(Config::default())
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub path: String,
    pub reason: String,
}

impl ConfigError {
    fn boxed(path: &Path, reason: impl std::fmt::Display) -> Box<dyn LucixErrorExt> {
        Box::new(ConfigError {
            path: path.display().to_string(),
            reason: reason.to_string(),
        })
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid config {}: {}", self.path, self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl LucixErrorExt for ConfigError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "lucix.config".to_string()
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
    fn empty_object_gives_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.entry_point, "test");
        assert_eq!(cfg.mode, CompileMode::PerFunction);
        assert!(cfg.optimize);
    }

    #[test]
    fn fields_are_snake_case() {
        let cfg = Config::from_json(
            r#"{ "entry_point": "main", "mode": "per_unit", "backend_opt_level": "none", "print_ir": false }"#,
        )
        .unwrap();
        assert_eq!(cfg.entry_point, "main");
        assert_eq!(cfg.mode, CompileMode::PerUnit);
        assert_eq!(cfg.backend_opt_level, BackendOptLevel::None);
        assert!(!cfg.print_ir);
    }

    #[test]
    fn compile_mode_parses_cli_spellings() {
        assert_eq!("per-unit".parse::<CompileMode>(), Ok(CompileMode::PerUnit));
        assert!("nope".parse::<CompileMode>().is_err());
    }
}
