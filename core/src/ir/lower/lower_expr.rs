//! Lowering for expression nodes. Operands are always generated left to
//! right, call arguments before the callee is resolved.

use crate::ast::{AstNode, AstNodeKind, BinaryOperator, UnaryOperator};
use crate::error::LucixErrorExt;
use crate::ir::op::{ICmpPredicate, Register, SlotId};
use crate::ir::types::IrType;

use super::CodeGen;
use super::err::{InvalidValueError, UnresolvedSymbolError};

impl CodeGen {
    /// Lower an expression whose value is required.
    pub(crate) fn lower_value(&mut self, node: &AstNode) -> Result<Register, Box<dyn LucixErrorExt>> {
        match self.lower_expression(node)? {
            Some(reg) => Ok(reg),
            None => Err(Box::new(InvalidValueError::new(
                format!(
                    "'{}' does not produce a value",
                    node.text().unwrap_or_else(|| node.kind.to_string())
                ),
                node.location.clone(),
                node.span.clone(),
            ))),
        }
    }

    /// Lower an expression. `None` means a call to a function without a
    /// return type.
    pub(crate) fn lower_expression(
        &mut self,
        node: &AstNode,
    ) -> Result<Option<Register>, Box<dyn LucixErrorExt>> {
        match &node.kind {
            AstNodeKind::Integer { value } => {
                Ok(Some(self.builder_mut(node)?.build_const(IrType::I32, *value)))
            }

            AstNodeKind::Identifier { name } => {
                let slot = self.resolve_slot(name, node)?;
                Ok(Some(self.builder_mut(node)?.build_load(slot)))
            }

            AstNodeKind::UnaryOp {
                op: UnaryOperator::Minus,
                expr,
            } => {
                let v = self.lower_value(expr)?;
                Ok(Some(self.builder_mut(node)?.build_neg(v)))
            }

            AstNodeKind::BinaryOp { left, op, right } => {
                let l = self.lower_value(left)?;
                let r = self.lower_value(right)?;
                let b = self.builder_mut(node)?;
                let reg = match op {
                    BinaryOperator::Add => b.build_add(l, r),
                    BinaryOperator::Sub => b.build_sub(l, r),
                    BinaryOperator::Lt | BinaryOperator::Gt => {
                        let pred = if *op == BinaryOperator::Lt {
                            ICmpPredicate::Slt
                        } else {
                            ICmpPredicate::Sgt
                        };
                        let bit = b.build_icmp(pred, l, r);
                        b.build_zext(bit)
                    }
                };
                Ok(Some(reg))
            }

            AstNodeKind::Call { callee, args } => self.lower_call(node, callee, args),

            other => Err(Box::new(InvalidValueError::new(
                format!("{} is not an expression", other),
                node.location.clone(),
                node.span.clone(),
            ))),
        }
    }

    fn lower_call(
        &mut self,
        node: &AstNode,
        callee: &str,
        args: &[AstNode],
    ) -> Result<Option<Register>, Box<dyn LucixErrorExt>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.lower_value(arg)?);
        }

        let record = self.functions.resolve(callee).ok_or_else(|| {
            Box::new(
                UnresolvedSymbolError::function(callee)
                    .at(node.location.clone(), node.span.clone()),
            ) as Box<dyn LucixErrorExt>
        })?;
        let prototype = record.prototype.clone();

        if prototype.params.len() != values.len() {
            return Err(Box::new(InvalidValueError::new(
                format!(
                    "function {} takes {} argument(s) but {} were given",
                    callee,
                    prototype.params.len(),
                    values.len()
                ),
                node.location.clone(),
                node.span.clone(),
            )));
        }

        if !self.unit.defines(callee) {
            self.unit.declare(&prototype);
        }
        Ok(self
            .builder_mut(node)?
            .build_call(callee, values, prototype.ret))
    }

    pub(crate) fn resolve_slot(
        &self,
        name: &str,
        node: &AstNode,
    ) -> Result<SlotId, Box<dyn LucixErrorExt>> {
        self.scopes.resolve(name).map_err(|e| {
            Box::new(e.at(node.location.clone(), node.span.clone())) as Box<dyn LucixErrorExt>
        })
    }
}
