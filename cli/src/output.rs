//! file: cli/src/output.rs
//! description: styled log output, error reports and the build summary table.

use std::io::Write;

use comfy_table::{Table, presets::UTF8_FULL};
use console::Style;
use log::{Level, LevelFilter, Log, Metadata, Record};
use lucix_core::jit::CompiledFunction;
use lucix_core::reports::Report;

/// Styles for the different kinds of CLI output.
pub struct FormatStyle {
    pub title: Style,
    pub debug: Style,
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub success: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            title: Style::new().bold().underlined(),
            debug: Style::new().dim(),
            info: Style::new().cyan(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            success: Style::new().green().bold(),
        }
    }
}

/// `log` backend writing one styled line per record to stderr.
pub struct CliLogger {
    level: LevelFilter,
    formatting: FormatStyle,
}

impl CliLogger {
    pub fn new(level: LevelFilter) -> Self {
        CliLogger {
            level,
            formatting: FormatStyle::default(),
        }
    }

    /// Install as the global logger. A second call is a no-op.
    pub fn install(self) {
        let level = self.level;
        if log::set_boxed_logger(Box::new(self)).is_ok() {
            log::set_max_level(level);
        }
    }

    fn style_for(&self, level: Level) -> &Style {
        match level {
            Level::Error => &self.formatting.error,
            Level::Warn => &self.formatting.warning,
            Level::Info => &self.formatting.info,
            Level::Debug | Level::Trace => &self.formatting.debug,
        }
    }
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = format!("[{:<5}]", record.level());
        let _ = writeln!(
            std::io::stderr(),
            "{} {} {}",
            self.style_for(record.level()).apply_to(tag),
            self.formatting.debug.apply_to(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// `-q` silences everything but errors; each `-v` adds a level.
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Render a diagnostic for stderr. Text reports quote the offending source
/// line when the script text is available.
pub fn render_report(report: &Report, source: Option<&str>, format: ReportFormat) -> String {
    match format {
        ReportFormat::Json => report
            .to_json()
            .unwrap_or_else(|e| format!("{{\"error\":\"cannot serialize report: {}\"}}", e)),
        ReportFormat::Text => match source {
            Some(src) => report.pretty_with_source(src),
            None => report.to_string(),
        },
    }
}

/// Table of every function the pipeline compiled.
pub fn summary_table(compiled: &[CompiledFunction]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["unit", "function", "signature", "ops", "optimized"]);
    for func in compiled {
        table.add_row(vec![
            func.unit.clone(),
            func.name.clone(),
            func.signature.clone(),
            func.ops_before.to_string(),
            func.ops_after.to_string(),
        ]);
    }
    table
}

pub fn success_line(text: &str) -> String {
    FormatStyle::default().success.apply_to(text).to_string()
}

pub fn title_line(text: &str) -> String {
    FormatStyle::default().title.apply_to(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_flags_map_to_levels() {
        assert_eq!(level_from_flags(0, false), LevelFilter::Warn);
        assert_eq!(level_from_flags(2, false), LevelFilter::Debug);
        assert_eq!(level_from_flags(3, true), LevelFilter::Error);
    }

    #[test]
    fn summary_lists_each_function() {
        let compiled = vec![CompiledFunction {
            name: "add".into(),
            unit: "add".into(),
            signature: "i32 @add(i32, i32)".into(),
            ops_before: 9,
            ops_after: 3,
        }];
        let rendered = summary_table(&compiled).to_string();
        assert!(rendered.contains("i32 @add(i32, i32)"));
        assert!(rendered.contains("optimized"));
    }
}
