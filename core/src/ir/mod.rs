pub mod lower;
pub mod module;
pub mod op;
pub mod opt;
pub mod types;
pub mod verify;

pub use self::lower::{CodeGen, UnitSink};
pub use self::module::{FunctionPrototype, IrFunction, IrModule};
pub use self::types::{IrType, TypeCatalog};

use crate::config::CompileMode;
use crate::error::LucixErrorExt;

/// Generate IR for a whole tree without executing anything.
pub fn lower_ast_to_ir(
    ast: &crate::ast::AstNode,
    unit_name: &str,
    mode: CompileMode,
) -> Result<Vec<IrModule>, Box<dyn LucixErrorExt>> {
    let mut units: Vec<IrModule> = Vec::new();
    let mut codegen = CodeGen::new(unit_name, mode);
    codegen.generate(ast, &mut units)?;
    Ok(units)
}
