//! file: core/src/ir/opt/redundant_load.rs
//! description: forward stored/loaded slot values within a block.
//!
//! Slots never escape (no address is taken), so calls cannot clobber them
//! and the last value written to or read from a slot in the same block can
//! stand in for a later load.
//!
use std::collections::HashMap;

use super::apply_replacements;
use crate::ir::module::IrFunction;
use crate::ir::op::{IROp, Register, SlotId};

pub(crate) fn eliminate_redundant_loads(func: &mut IrFunction) -> bool {
    let mut replacements: Vec<(Register, Register)> = Vec::new();
    for block in &mut func.blocks {
        let mut known: HashMap<SlotId, Register> = HashMap::new();
        block.ops.retain(|op| match op {
            IROp::Store { src, slot } => {
                known.insert(*slot, *src);
                true
            }
            IROp::Load { dest, slot } => match known.get(slot) {
                Some(value) => {
                    replacements.push((*dest, *value));
                    false
                }
                None => {
                    known.insert(*slot, *dest);
                    true
                }
            },
            _ => true,
        });
    }
    if replacements.is_empty() {
        return false;
    }
    apply_replacements(func, &replacements);
    true
}
