//! file: core/src/ir/opt/reassociate.rs
//! description: canonicalize additive expressions around constants.
//!
//! - `c + x` becomes `x + c`
//! - `x - c` becomes `x + (-c)`
//! - `(x + c1) + c2` becomes `x + (c1 + c2)`
//!
use std::collections::HashMap;

use super::constant_values;
use crate::ir::module::IrFunction;
use crate::ir::op::{IROp, Register};
use crate::ir::types::IrType;

pub(crate) fn reassociate(func: &mut IrFunction) -> bool {
    let mut consts = constant_values(func);
    // dest -> (x, c) for every `dest = x + c` seen so far
    let mut offset_adds: HashMap<Register, (Register, i32)> = HashMap::new();
    let mut changed = false;

    for bi in 0..func.blocks.len() {
        let mut i = 0;
        while i < func.blocks[bi].ops.len() {
            let op = func.blocks[bi].ops[i].clone();
            match op {
                IROp::Add { dest, lhs, rhs }
                    if consts.contains_key(&lhs) && !consts.contains_key(&rhs) =>
                {
                    func.blocks[bi].ops[i] = IROp::Add { dest, lhs: rhs, rhs: lhs };
                    changed = true;
                }
                IROp::Sub { dest, lhs, rhs } if !consts.contains_key(&lhs) => {
                    if let Some(c) = consts.get(&rhs).copied() {
                        let k = insert_const(func, bi, i, c.wrapping_neg(), &mut consts);
                        i += 1;
                        func.blocks[bi].ops[i] = IROp::Add { dest, lhs, rhs: k };
                        changed = true;
                    }
                }
                _ => {}
            }

            if let IROp::Add { dest, lhs, rhs } = func.blocks[bi].ops[i].clone() {
                if let Some(c2) = consts.get(&rhs).copied() {
                    if let Some((x, c1)) = offset_adds.get(&lhs).copied() {
                        let sum = c1.wrapping_add(c2);
                        let k = insert_const(func, bi, i, sum, &mut consts);
                        i += 1;
                        func.blocks[bi].ops[i] = IROp::Add { dest, lhs: x, rhs: k };
                        offset_adds.insert(dest, (x, sum));
                        changed = true;
                    } else if !consts.contains_key(&lhs) {
                        offset_adds.insert(dest, (lhs, c2));
                    }
                }
            }
            i += 1;
        }
    }
    changed
}

fn insert_const(
    func: &mut IrFunction,
    block: usize,
    at: usize,
    value: i32,
    consts: &mut HashMap<Register, i32>,
) -> Register {
    let k = func.new_register(IrType::I32);
    func.blocks[block].ops.insert(
        at,
        IROp::Const {
            dest: k,
            ty: IrType::I32,
            value,
        },
    );
    consts.insert(k, value);
    k
}
