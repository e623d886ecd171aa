//! file: core/src/ir/opt/promote.rs
//! description: promote stack slots to registers where no merge is needed.
//!
//! Handles the three shapes that need no phi nodes:
//! - slots that are never loaded (their stores and alloca go away)
//! - slots whose every access sits in one block
//! - slots stored exactly once, in the entry block, before any load there
//!
use super::apply_replacements;
use crate::ir::module::IrFunction;
use crate::ir::op::{IROp, Register, SlotId};

pub(crate) fn promote_slots(func: &mut IrFunction) -> bool {
    let mut changed = false;
    for slot in 0..func.slots.len() {
        changed |= promote_slot(func, slot);
    }
    changed
}

fn promote_slot(func: &mut IrFunction, slot: SlotId) -> bool {
    let mut has_alloca = false;
    let mut stores: Vec<(usize, usize, Register)> = Vec::new();
    let mut loads: Vec<(usize, usize, Register)> = Vec::new();
    for (bi, block) in func.blocks.iter().enumerate() {
        for (oi, op) in block.ops.iter().enumerate() {
            match op {
                IROp::Alloca { slot: s } if *s == slot => has_alloca = true,
                IROp::Store { src, slot: s } if *s == slot => stores.push((bi, oi, *src)),
                IROp::Load { dest, slot: s } if *s == slot => loads.push((bi, oi, *dest)),
                _ => {}
            }
        }
    }

    if loads.is_empty() {
        if !has_alloca && stores.is_empty() {
            return false;
        }
        strip_slot(func, slot);
        return true;
    }

    let mut replacements = Vec::new();
    let first_block = loads[0].0;
    let single_block = loads
        .iter()
        .chain(stores.iter())
        .all(|(bi, _, _)| *bi == first_block);

    if single_block {
        let mut current: Option<Register> = None;
        for op in &func.blocks[first_block].ops {
            match op {
                IROp::Store { src, slot: s } if *s == slot => current = Some(*src),
                IROp::Load { dest, slot: s } if *s == slot => match current {
                    Some(value) => replacements.push((*dest, value)),
                    // read before any write: leave the slot alone
                    None => return false,
                },
                _ => {}
            }
        }
    } else if stores.len() == 1 && stores[0].0 == 0 {
        let (_, store_at, value) = stores[0];
        if loads.iter().any(|(bi, oi, _)| *bi == 0 && *oi < store_at) {
            return false;
        }
        replacements.extend(loads.iter().map(|(_, _, dest)| (*dest, value)));
    } else {
        return false;
    }

    strip_slot(func, slot);
    apply_replacements(func, &replacements);
    log::debug!("promote: slot {} of @{} now lives in registers", func.slot_name(slot), func.name());
    true
}

fn strip_slot(func: &mut IrFunction, slot: SlotId) {
    for block in &mut func.blocks {
        block.ops.retain(|op| op.slot() != Some(slot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::module::{BasicBlock, FunctionPrototype, SlotInfo};
    use crate::ir::op::Terminator;
    use crate::ir::types::IrType;

    fn slot_func(blocks: Vec<BasicBlock>, regs: usize) -> IrFunction {
        let mut f = IrFunction::new(FunctionPrototype::new("f", vec![], IrType::I32), vec![]);
        f.slots.push(SlotInfo { name: "x".into(), ty: IrType::I32 });
        f.reg_types = vec![IrType::I32; regs];
        f.blocks = blocks;
        f
    }

    #[test]
    fn entry_store_feeds_loads_in_other_blocks() {
        let mut entry = BasicBlock::new(0, "entry");
        entry.ops = vec![
            IROp::Alloca { slot: 0 },
            IROp::Const { dest: 0, ty: IrType::I32, value: 10 },
            IROp::Store { src: 0, slot: 0 },
        ];
        entry.terminator = Some(Terminator::Br { target: 1 });
        let mut next = BasicBlock::new(1, "next");
        next.ops = vec![IROp::Load { dest: 1, slot: 0 }];
        next.terminator = Some(Terminator::Ret { value: Some(1) });
        let mut f = slot_func(vec![entry, next], 2);

        assert!(promote_slots(&mut f));
        assert!(f.blocks.iter().all(|b| b.ops.iter().all(|op| op.slot().is_none())));
        assert_eq!(f.blocks[1].terminator, Some(Terminator::Ret { value: Some(0) }));
    }

    #[test]
    fn read_before_write_is_not_promoted() {
        let mut entry = BasicBlock::new(0, "entry");
        entry.ops = vec![
            IROp::Alloca { slot: 0 },
            IROp::Load { dest: 0, slot: 0 },
            IROp::Const { dest: 1, ty: IrType::I32, value: 1 },
            IROp::Store { src: 1, slot: 0 },
        ];
        entry.terminator = Some(Terminator::Ret { value: Some(0) });
        let mut f = slot_func(vec![entry], 2);

        assert!(!promote_slots(&mut f));
        assert_eq!(f.blocks[0].ops.len(), 4);
    }

    #[test]
    fn stores_in_two_blocks_stay_in_memory() {
        let mut entry = BasicBlock::new(0, "entry");
        entry.ops = vec![
            IROp::Alloca { slot: 0 },
            IROp::Const { dest: 0, ty: IrType::I32, value: 1 },
            IROp::Store { src: 0, slot: 0 },
        ];
        entry.terminator = Some(Terminator::Br { target: 1 });
        let mut next = BasicBlock::new(1, "next");
        next.ops = vec![
            IROp::Const { dest: 1, ty: IrType::I32, value: 2 },
            IROp::Store { src: 1, slot: 0 },
            IROp::Load { dest: 2, slot: 0 },
        ];
        next.terminator = Some(Terminator::Ret { value: Some(2) });
        let mut f = slot_func(vec![entry, next], 3);

        assert!(!promote_slots(&mut f));
    }
}
