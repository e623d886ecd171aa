//! file: core/src/ir/opt/simplify.rs
//! description: constant folding and algebraic identities.
//!
//! Arithmetic follows i32 wrapping semantics, the same as the backend.
//!
use std::collections::HashMap;

use super::{apply_replacements, constant_values, remove_dead_ops};
use crate::ir::module::IrFunction;
use crate::ir::op::{IROp, Register};
use crate::ir::types::IrType;

pub(crate) fn simplify(func: &mut IrFunction) -> bool {
    let mut changed = false;
    loop {
        let mut round = false;
        let consts = constant_values(func);
        let negations: HashMap<Register, Register> = func
            .blocks
            .iter()
            .flat_map(|b| b.ops.iter())
            .filter_map(|op| match op {
                IROp::Neg { dest, src } => Some((*dest, *src)),
                _ => None,
            })
            .collect();

        let mut replacements = Vec::new();
        for block in &mut func.blocks {
            for op in &mut block.ops {
                if let Some(folded) = fold(op, &consts) {
                    *op = folded;
                    round = true;
                } else if let Some(pair) = identity(op, &consts, &negations) {
                    replacements.push(pair);
                }
            }
        }

        if !replacements.is_empty() {
            apply_replacements(func, &replacements);
            round = true;
        }
        round |= remove_dead_ops(func);

        if !round {
            return changed;
        }
        changed = true;
    }
}

fn fold(op: &IROp, consts: &HashMap<Register, i32>) -> Option<IROp> {
    let c = |r: &Register| consts.get(r).copied();
    match op {
        IROp::Add { dest, lhs, rhs } => Some(IROp::Const {
            dest: *dest,
            ty: IrType::I32,
            value: c(lhs)?.wrapping_add(c(rhs)?),
        }),
        IROp::Sub { dest, lhs, rhs } if lhs == rhs => Some(IROp::Const {
            dest: *dest,
            ty: IrType::I32,
            value: 0,
        }),
        IROp::Sub { dest, lhs, rhs } => Some(IROp::Const {
            dest: *dest,
            ty: IrType::I32,
            value: c(lhs)?.wrapping_sub(c(rhs)?),
        }),
        IROp::Neg { dest, src } => Some(IROp::Const {
            dest: *dest,
            ty: IrType::I32,
            value: c(src)?.wrapping_neg(),
        }),
        IROp::ICmp {
            dest,
            pred,
            lhs,
            rhs,
        } => Some(IROp::Const {
            dest: *dest,
            ty: IrType::I1,
            value: pred.evaluate(c(lhs)?, c(rhs)?) as i32,
        }),
        IROp::ZExt { dest, src } => Some(IROp::Const {
            dest: *dest,
            ty: IrType::I32,
            value: c(src)?,
        }),
        _ => None,
    }
}

/// `x + 0`, `0 + x`, `x - 0` and `-(-x)` all reduce to an existing register.
fn identity(
    op: &IROp,
    consts: &HashMap<Register, i32>,
    negations: &HashMap<Register, Register>,
) -> Option<(Register, Register)> {
    let is_zero = |r: &Register| consts.get(r) == Some(&0);
    match op {
        IROp::Add { dest, lhs, rhs } if is_zero(rhs) => Some((*dest, *lhs)),
        IROp::Add { dest, lhs, rhs } if is_zero(lhs) => Some((*dest, *rhs)),
        IROp::Sub { dest, lhs, rhs } if is_zero(rhs) => Some((*dest, *lhs)),
        IROp::Neg { dest, src } => negations.get(src).map(|inner| (*dest, *inner)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::module::{BasicBlock, FunctionPrototype};
    use crate::ir::op::Terminator;

    fn func_with(ops: Vec<IROp>, ret: Register, regs: usize) -> IrFunction {
        let mut f = IrFunction::new(FunctionPrototype::new("f", vec![], IrType::I32), vec![]);
        f.reg_types = vec![IrType::I32; regs];
        let mut b = BasicBlock::new(0, "entry");
        b.ops = ops;
        b.terminator = Some(Terminator::Ret { value: Some(ret) });
        f.blocks.push(b);
        f
    }

    #[test]
    fn folds_add_chain_to_single_constant() {
        let mut f = func_with(
            vec![
                IROp::Const { dest: 0, ty: IrType::I32, value: 2 },
                IROp::Const { dest: 1, ty: IrType::I32, value: 3 },
                IROp::Add { dest: 2, lhs: 0, rhs: 1 },
            ],
            2,
            3,
        );
        assert!(simplify(&mut f));
        assert_eq!(f.blocks[0].ops, vec![IROp::Const { dest: 2, ty: IrType::I32, value: 5 }]);
    }

    #[test]
    fn arithmetic_wraps() {
        let mut f = func_with(
            vec![
                IROp::Const { dest: 0, ty: IrType::I32, value: i32::MAX },
                IROp::Const { dest: 1, ty: IrType::I32, value: 1 },
                IROp::Add { dest: 2, lhs: 0, rhs: 1 },
            ],
            2,
            3,
        );
        simplify(&mut f);
        assert_eq!(f.blocks[0].ops, vec![IROp::Const { dest: 2, ty: IrType::I32, value: i32::MIN }]);
    }

    #[test]
    fn double_negation_cancels() {
        let mut f = func_with(
            vec![
                IROp::Arg { dest: 0, index: 0 },
                IROp::Neg { dest: 1, src: 0 },
                IROp::Neg { dest: 2, src: 1 },
            ],
            2,
            3,
        );
        f.prototype.params = vec![IrType::I32];
        f.param_names = vec!["a".into()];
        assert!(simplify(&mut f));
        assert_eq!(f.blocks[0].ops, vec![IROp::Arg { dest: 0, index: 0 }]);
        assert_eq!(f.blocks[0].terminator, Some(Terminator::Ret { value: Some(0) }));
    }

    #[test]
    fn calls_survive_even_when_unused() {
        let mut f = func_with(
            vec![
                IROp::Call { dest: Some(0), callee: "g".into(), args: vec![] },
                IROp::Const { dest: 1, ty: IrType::I32, value: 1 },
            ],
            1,
            2,
        );
        simplify(&mut f);
        assert_eq!(f.blocks[0].ops.len(), 2);
    }
}
