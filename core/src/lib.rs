pub mod ast;
pub mod config;
pub mod error;
pub mod ir;
pub mod jit;
pub mod location;
pub mod reports;
pub mod script;

pub use ast::{AstNode, AstNodeKind, RulesParser, generate_ast_from_source};
pub use config::{BackendOptLevel, CompileMode, Config};
pub use error::{Level, LucixErrorExt};
pub use ir::{CodeGen, IrModule, UnitSink, lower_ast_to_ir};
pub use jit::{ExecutionPipeline, JitSession};
pub use location::{Location, Span};
pub use reports::Report;
pub use script::Script;

/// Unit name for a script: its file name without extension.
pub fn unit_name(script: &Script) -> String {
    std::path::Path::new(&script.name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| script.name.clone())
}

/// Parse `script` and stream its units into `sink`.
pub fn compile_script(
    script: &Script,
    config: &Config,
    sink: &mut dyn UnitSink,
) -> Result<(), Box<dyn LucixErrorExt>> {
    let ast = generate_ast_from_source(script)?;
    let mut codegen = CodeGen::new(&unit_name(script), config.mode);
    codegen.generate(&ast, sink)
}

/// Compile and execute `script`, printing IR to stderr and entry point
/// results to stdout. Returns every entry point result.
pub fn run_script(script: &Script, config: &Config) -> Result<Vec<i32>, Box<dyn LucixErrorExt>> {
    let mut pipeline = ExecutionPipeline::new(config).map_err(error::boxed)?;
    compile_script(script, config, &mut pipeline)?;
    Ok(pipeline.results().to_vec())
}
