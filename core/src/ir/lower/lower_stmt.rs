//! Lowering for statement nodes.
//!
//! See also: `ir::lower::lower_expr` for expressions.

use crate::ast::{AstNode, AstNodeKind};
use crate::error::LucixErrorExt;
use crate::ir::op::ICmpPredicate;
use crate::ir::types::IrType;

use super::CodeGen;
use super::err::InvalidValueError;

impl CodeGen {
    pub(crate) fn lower_statement(&mut self, node: &AstNode) -> Result<(), Box<dyn LucixErrorExt>> {
        match &node.kind {
            AstNodeKind::Block { statements } => {
                self.scopes.push_scope();
                let result = statements.iter().try_for_each(|s| self.lower_statement(s));
                self.scopes.pop_scope();
                result
            }

            AstNodeKind::VariableDeclaration {
                name,
                type_name,
                initializer,
            } => {
                let ty = self.resolve_type(type_name, node)?;
                if ty.is_void() {
                    return Err(Box::new(InvalidValueError::new(
                        format!("variable '{}' cannot have no type", name),
                        node.location.clone(),
                        node.span.clone(),
                    )));
                }
                // The initializer sees the enclosing binding of `name`, if any.
                let value = match initializer {
                    Some(init) => Some(self.lower_value(init)?),
                    None => None,
                };
                let b = self.builder_mut(node)?;
                let slot = b.build_alloca(name, ty);
                if let Some(v) = value {
                    b.build_store(v, slot);
                }
                self.scopes.declare(name, slot).map_err(|e| {
                    Box::new(e.at(node.location.clone(), node.span.clone()))
                        as Box<dyn LucixErrorExt>
                })
            }

            AstNodeKind::Assignment { target, value } => {
                let v = self.lower_value(value)?;
                let slot = self.resolve_slot(target, node)?;
                self.builder_mut(node)?.build_store(v, slot);
                Ok(())
            }

            AstNodeKind::If {
                condition,
                then_block,
                else_block,
            } => self.lower_if(node, condition, then_block, else_block.as_deref()),

            AstNodeKind::Return { value } => {
                let ret = self.builder_mut(node)?.prototype().ret;
                match value {
                    Some(expr) => {
                        if ret.is_void() {
                            return Err(Box::new(InvalidValueError::new(
                                "cannot return a value from a function without a return type",
                                node.location.clone(),
                                node.span.clone(),
                            )));
                        }
                        let v = self.lower_value(expr)?;
                        self.builder_mut(node)?.build_ret(Some(v));
                    }
                    None => {
                        if ret != IrType::Void {
                            return Err(Box::new(InvalidValueError::new(
                                format!("missing return value of type {}", ret),
                                node.location.clone(),
                                node.span.clone(),
                            )));
                        }
                        self.builder_mut(node)?.build_ret(None);
                    }
                }
                Ok(())
            }

            kind if kind.is_expression() => {
                self.lower_expression(node)?;
                Ok(())
            }

            other => Err(Box::new(InvalidValueError::new(
                format!("{} is not allowed inside a function body", other),
                node.location.clone(),
                node.span.clone(),
            ))),
        }
    }

    /// `if c {..} else {..}` becomes `then`, `else` and `if_cont` blocks;
    /// both arms fall through to `if_cont` unless they already returned.
    fn lower_if(
        &mut self,
        node: &AstNode,
        condition: &AstNode,
        then_block: &AstNode,
        else_block: Option<&AstNode>,
    ) -> Result<(), Box<dyn LucixErrorExt>> {
        let value = self.lower_value(condition)?;

        let b = self.builder_mut(node)?;
        let zero = b.build_const(IrType::I32, 0);
        let cond = b.build_icmp(ICmpPredicate::Ne, value, zero);
        let then_id = b.create_block("then");
        let else_id = b.create_block("else");
        let cont_id = b.create_block("if_cont");
        b.build_cond_br(cond, then_id, else_id);

        for (block, body) in [(then_id, Some(then_block)), (else_id, else_block)] {
            self.builder_mut(node)?.set_insertion_point(block);
            if let Some(body) = body {
                self.lower_statement(body)?;
            }
            self.builder_mut(node)?.build_br(cont_id);
        }

        self.builder_mut(node)?.set_insertion_point(cont_id);
        Ok(())
    }
}
