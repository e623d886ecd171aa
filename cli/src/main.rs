use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use lucix_core::config::{CompileMode, Config};
use lucix_core::jit::{CompiledFunction, ExecutionPipeline};
use lucix_core::reports::Report;
use lucix_core::script::Script;
use lucix_core::{LucixErrorExt, compile_script, generate_ast_from_source};
use serde::Serialize;

mod output;

use output::{CliLogger, ReportFormat};

fn main() -> ExitCode {
    let cli = Command::new("lucix")
        .version(clap::crate_version!())
        .about("Compile and run Lucix scripts with a Cranelift JIT");

    let matches = setup_cli(cli).get_matches();

    let verbose = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");
    CliLogger::new(output::level_from_flags(verbose, quiet)).install();

    dispatch_commands(&matches)
}

fn file_arg(help: &'static str) -> Arg {
    Arg::new("file").help(help).required(true).index(1)
}

/// Options shared by `run` and `build`.
fn compile_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("dump")
            .help("Dump a compilation stage: ast, ir or opt")
            .short('d')
            .long("dump")
            .value_parser(["ast", "ir", "opt"])
            .action(ArgAction::Append)
            .value_name("STAGE"),
    )
    .arg(
        Arg::new("entry")
            .help("Function invoked after its unit is compiled")
            .short('e')
            .long("entry")
            .value_name("NAME"),
    )
    .arg(
        Arg::new("mode")
            .help("Unit grouping: per_function or per_unit")
            .short('m')
            .long("mode")
            .value_parser(clap::value_parser!(CompileMode))
            .value_name("MODE"),
    )
    .arg(
        Arg::new("no-opt")
            .help("Skip the IR optimization passes")
            .long("no-opt")
            .action(ArgAction::SetTrue),
    )
}

fn setup_cli(cli: Command) -> Command {
    cli.arg(
        Arg::new("config")
            .help("Configuration file (defaults to ./lucix.json when present)")
            .short('c')
            .long("config")
            .global(true)
            .value_parser(clap::value_parser!(PathBuf))
            .value_name("FILE"),
    )
    .arg(
        Arg::new("report")
            .help("Diagnostic format: text or json")
            .long("report")
            .global(true)
            .value_parser(["text", "json"])
            .default_value("text"),
    )
    .arg(
        Arg::new("verbose")
            .help("More log output (repeatable)")
            .short('v')
            .long("verbose")
            .global(true)
            .action(ArgAction::Count),
    )
    .arg(
        Arg::new("quiet")
            .help("Only log errors")
            .short('q')
            .long("quiet")
            .global(true)
            .action(ArgAction::SetTrue),
    )
    .subcommand_required(true)
    .subcommand(compile_args(
        Command::new("run")
            .about("Compile a script and invoke its entry point")
            .arg(file_arg("The script file to run")),
    ))
    .subcommand(compile_args(
        Command::new("build")
            .about("Compile a script without running it and summarize the result")
            .arg(file_arg("The script file to build")),
    ))
}

fn dispatch_commands(matches: &ArgMatches) -> ExitCode {
    let format = matches
        .get_one::<String>("report")
        .and_then(|r| ReportFormat::parse(r))
        .unwrap_or(ReportFormat::Text);

    let (sub_m, invoke) = match matches.subcommand() {
        Some(("run", sub_m)) => (sub_m, true),
        Some(("build", sub_m)) => (sub_m, false),
        _ => {
            eprintln!("No valid subcommand was used. Use --help for more information.");
            return ExitCode::FAILURE;
        }
    };

    let config = match load_config(matches, sub_m) {
        Ok(config) => config,
        Err(e) => return fail(e.as_ref(), None, format),
    };

    let file = sub_m
        .get_one::<String>("file")
        .map(PathBuf::from)
        .unwrap_or_default();
    let script = match Script::new(file) {
        Ok(script) => script,
        Err(e) => return fail(e.as_ref(), None, format),
    };

    match compile(&script, &config, sub_m, invoke, format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e.as_ref(), Some(&script.content), format),
    }
}

/// Config file first, then command line overrides.
fn load_config(matches: &ArgMatches, sub_m: &ArgMatches) -> Result<Config, Box<dyn LucixErrorExt>> {
    let explicit = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = Config::discover(explicit, Path::new(&cwd))?;

    if let Some(entry) = sub_m.get_one::<String>("entry") {
        config.entry_point = entry.clone();
    }
    if let Some(mode) = sub_m.get_one::<CompileMode>("mode") {
        config.mode = *mode;
    }
    if sub_m.get_flag("no-opt") {
        config.optimize = false;
    }

    let dumps = dump_stages(sub_m);
    if !dumps.is_empty() {
        config.print_ir = dumps.iter().any(|d| d == "ir");
    }
    log::debug!("effective config: {:?}", config);
    Ok(config)
}

fn dump_stages(sub_m: &ArgMatches) -> Vec<String> {
    sub_m
        .get_many::<String>("dump")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn compile(
    script: &Script,
    config: &Config,
    sub_m: &ArgMatches,
    invoke: bool,
    format: ReportFormat,
) -> Result<(), Box<dyn LucixErrorExt>> {
    let dumps = dump_stages(sub_m);

    if dumps.iter().any(|d| d == "ast") {
        let ast = generate_ast_from_source(script)?;
        eprintln!("{}", ast);
    }

    let mut pipeline = ExecutionPipeline::new(config)
        .map_err(lucix_core::error::boxed)?
        .print_optimized(dumps.iter().any(|d| d == "opt"))
        .invoke_entry(invoke);

    compile_script(script, config, &mut pipeline)?;

    if !invoke {
        print_summary(&script.name, pipeline.compiled(), format);
    }
    Ok(())
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    unit: &'a str,
    function: &'a str,
    signature: &'a str,
    ops: usize,
    optimized_ops: usize,
}

fn print_summary(name: &str, compiled: &[CompiledFunction], format: ReportFormat) {
    match format {
        ReportFormat::Json => {
            let rows: Vec<SummaryRow> = compiled
                .iter()
                .map(|f| SummaryRow {
                    unit: &f.unit,
                    function: &f.name,
                    signature: &f.signature,
                    ops: f.ops_before,
                    optimized_ops: f.ops_after,
                })
                .collect();
            match serde_json::to_string_pretty(&rows) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("cannot serialize build summary: {}", e),
            }
        }
        ReportFormat::Text => {
            println!("{}", output::title_line(&format!("Build summary for {}", name)));
            println!("{}", output::summary_table(compiled));
            println!(
                "{}",
                output::success_line(&format!("{} function(s) compiled", compiled.len()))
            );
        }
    }
}

fn fail(error: &dyn LucixErrorExt, source: Option<&str>, format: ReportFormat) -> ExitCode {
    let report = Report::from_error(error);
    eprintln!("{}", output::render_report(&report, source, format));
    ExitCode::FAILURE
}
