use std::fmt;

use super::types::IrType;

/// Function-local SSA value number, printed as `%N`.
pub type Register = usize;
/// Index into `IrFunction::slots`.
pub type SlotId = usize;
/// Stable id of a basic block inside one function.
pub type BlockId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ICmpPredicate {
    Slt,
    Sgt,
    Ne,
}

impl ICmpPredicate {
    pub fn evaluate(&self, lhs: i32, rhs: i32) -> bool {
        match self {
            ICmpPredicate::Slt => lhs < rhs,
            ICmpPredicate::Sgt => lhs > rhs,
            ICmpPredicate::Ne => lhs != rhs,
        }
    }
}

impl fmt::Display for ICmpPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ICmpPredicate::Slt => write!(f, "slt"),
            ICmpPredicate::Sgt => write!(f, "sgt"),
            ICmpPredicate::Ne => write!(f, "ne"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IROp {
    /// Incoming function argument `index`.
    Arg { dest: Register, index: usize },
    Const { dest: Register, ty: IrType, value: i32 },

    Alloca { slot: SlotId },
    Load { dest: Register, slot: SlotId },
    Store { src: Register, slot: SlotId },

    Add { dest: Register, lhs: Register, rhs: Register },
    Sub { dest: Register, lhs: Register, rhs: Register },
    Neg { dest: Register, src: Register },
    ICmp { dest: Register, pred: ICmpPredicate, lhs: Register, rhs: Register },
    ZExt { dest: Register, src: Register },

    Call { dest: Option<Register>, callee: String, args: Vec<Register> },
}

impl IROp {
    /// Register written by this op, if any.
    pub fn dest(&self) -> Option<Register> {
        match self {
            IROp::Arg { dest, .. }
            | IROp::Const { dest, .. }
            | IROp::Load { dest, .. }
            | IROp::Add { dest, .. }
            | IROp::Sub { dest, .. }
            | IROp::Neg { dest, .. }
            | IROp::ICmp { dest, .. }
            | IROp::ZExt { dest, .. } => Some(*dest),
            IROp::Call { dest, .. } => *dest,
            IROp::Alloca { .. } | IROp::Store { .. } => None,
        }
    }

    /// Registers read by this op, in operand order.
    pub fn operands(&self) -> Vec<Register> {
        match self {
            IROp::Store { src, .. } | IROp::Neg { src, .. } | IROp::ZExt { src, .. } => vec![*src],
            IROp::Add { lhs, rhs, .. } | IROp::Sub { lhs, rhs, .. } | IROp::ICmp { lhs, rhs, .. } => {
                vec![*lhs, *rhs]
            }
            IROp::Call { args, .. } => args.clone(),
            IROp::Arg { .. } | IROp::Const { .. } | IROp::Alloca { .. } | IROp::Load { .. } => {
                Vec::new()
            }
        }
    }

    pub fn operands_mut(&mut self) -> Vec<&mut Register> {
        match self {
            IROp::Store { src, .. } | IROp::Neg { src, .. } | IROp::ZExt { src, .. } => vec![src],
            IROp::Add { lhs, rhs, .. } | IROp::Sub { lhs, rhs, .. } | IROp::ICmp { lhs, rhs, .. } => {
                vec![lhs, rhs]
            }
            IROp::Call { args, .. } => args.iter_mut().collect(),
            IROp::Arg { .. } | IROp::Const { .. } | IROp::Alloca { .. } | IROp::Load { .. } => {
                Vec::new()
            }
        }
    }

    /// Slot touched by a memory op.
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            IROp::Alloca { slot } | IROp::Load { slot, .. } | IROp::Store { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    pub fn has_side_effects(&self) -> bool {
        matches!(self, IROp::Store { .. } | IROp::Call { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Ret { value: Option<Register> },
    Br { target: BlockId },
    CondBr { cond: Register, then_block: BlockId, else_block: BlockId },
    Unreachable,
}

impl Terminator {
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Br { target } => vec![*target],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => {
                if then_block == else_block {
                    vec![*then_block]
                } else {
                    vec![*then_block, *else_block]
                }
            }
            Terminator::Ret { .. } | Terminator::Unreachable => Vec::new(),
        }
    }

    pub fn operands_mut(&mut self) -> Vec<&mut Register> {
        match self {
            Terminator::Ret { value: Some(v) } => vec![v],
            Terminator::CondBr { cond, .. } => vec![cond],
            _ => Vec::new(),
        }
    }

    pub fn operands(&self) -> Vec<Register> {
        match self {
            Terminator::Ret { value: Some(v) } => vec![*v],
            Terminator::CondBr { cond, .. } => vec![*cond],
            _ => Vec::new(),
        }
    }
}
