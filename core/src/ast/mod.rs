//! file: core/src/ast/mod.rs
//! description: parse Lucix source into an `AstNode` tree.
//!
//! The grammar lives in `grammar.pest`; the `rules` helpers attach
//! `Location`/`Span` metadata so diagnostics can point back at the source.
//!
pub mod err;
pub mod expr;
pub mod kind;
pub mod node;
pub mod rules;
pub mod stmt;

pub use kind::{AstNodeKind, BinaryOperator, Parameter, UnaryOperator};
pub use node::AstNode;
pub use rules::{Rule, RulesParser};

use pest::Parser;

use crate::error::LucixErrorExt;
use crate::location::Location;
use crate::script::Script;

/// Parse a whole script into an `Application` node.
///
/// # Errors
///
/// - `EmptyScriptError` when the script contains nothing but whitespace.
/// - `SyntaxError` when the grammar rejects the input.
pub fn generate_ast_from_source(script: &Script) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    if script.is_empty() {
        return Err(Box::new(err::EmptyScriptError::new(
            "lucix.ast.generate_ast_from_source".into(),
            Some(Location::new(script.name.clone(), 1, 1)),
            None,
        )));
    }

    let mut pairs = RulesParser::parse(Rule::application, &script.content).map_err(|e| {
        let syntax = err::SyntaxError::from_pest(&e, &script.name, "lucix.ast.generate_ast_from_source");
        log::debug!("parse of {} failed: {}", script.name, syntax);
        Box::new(syntax) as Box<dyn LucixErrorExt>
    })?;

    let application = rules::fetch_next_pair(&mut pairs, &None, &None)?;
    stmt::parse_application_rule(application, script)
}
