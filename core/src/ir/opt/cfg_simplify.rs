//! file: core/src/ir/opt/cfg_simplify.rs
//! description: control-flow graph cleanup.
//!
//! Folds branches on constant conditions, deletes blocks unreachable from
//! the entry block and merges a block into its sole predecessor when that
//! predecessor jumps to it unconditionally.
//!
use std::collections::{HashSet, VecDeque};

use super::constant_values;
use crate::ir::module::IrFunction;
use crate::ir::op::Terminator;

pub(crate) fn simplify_cfg(func: &mut IrFunction) -> bool {
    let mut changed = fold_branches(func);
    changed |= remove_unreachable(func);
    while merge_one(func) {
        changed = true;
    }
    changed
}

fn fold_branches(func: &mut IrFunction) -> bool {
    let consts = constant_values(func);
    let mut changed = false;
    for block in &mut func.blocks {
        if let Some(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        }) = block.terminator.clone()
        {
            let target = if then_block == else_block {
                Some(then_block)
            } else {
                consts
                    .get(&cond)
                    .map(|c| if *c != 0 { then_block } else { else_block })
            };
            if let Some(target) = target {
                block.terminator = Some(Terminator::Br { target });
                changed = true;
            }
        }
    }
    changed
}

fn remove_unreachable(func: &mut IrFunction) -> bool {
    let Some(entry) = func.entry().map(|b| b.id) else {
        return false;
    };
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::from([entry]);
    while let Some(id) = queue.pop_front() {
        if !reachable.insert(id) {
            continue;
        }
        if let Some(block) = func.block(id) {
            queue.extend(block.successors());
        }
    }
    let before = func.blocks.len();
    func.blocks.retain(|b| reachable.contains(&b.id));
    if func.blocks.len() != before {
        log::debug!(
            "cfg-simplify: removed {} unreachable block(s) from @{}",
            before - func.blocks.len(),
            func.name()
        );
        true
    } else {
        false
    }
}

fn merge_one(func: &mut IrFunction) -> bool {
    let Some(entry) = func.entry().map(|b| b.id) else {
        return false;
    };
    let preds = func.predecessor_counts();

    let candidate = func.blocks.iter().find_map(|block| match block.terminator {
        Some(Terminator::Br { target })
            if target != block.id && target != entry && preds.get(&target) == Some(&1) =>
        {
            Some((block.id, target))
        }
        _ => None,
    });
    let Some((pred_id, succ_id)) = candidate else {
        return false;
    };

    let Some(succ_index) = func.blocks.iter().position(|b| b.id == succ_id) else {
        return false;
    };
    let succ = func.blocks.remove(succ_index);
    match func.block_mut(pred_id) {
        Some(pred) => {
            pred.ops.extend(succ.ops);
            pred.terminator = succ.terminator;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::module::{BasicBlock, FunctionPrototype};
    use crate::ir::op::IROp;
    use crate::ir::types::IrType;

    fn block(id: usize, label: &str, ops: Vec<IROp>, term: Terminator) -> BasicBlock {
        let mut b = BasicBlock::new(id, label);
        b.ops = ops;
        b.terminator = Some(term);
        b
    }

    #[test]
    fn constant_branch_collapses_to_one_block() {
        let mut f = IrFunction::new(FunctionPrototype::new("f", vec![], IrType::I32), vec![]);
        f.reg_types = vec![IrType::I1, IrType::I32, IrType::I32];
        f.blocks = vec![
            block(
                0,
                "entry",
                vec![IROp::Const { dest: 0, ty: IrType::I1, value: 1 }],
                Terminator::CondBr { cond: 0, then_block: 1, else_block: 2 },
            ),
            block(
                1,
                "then",
                vec![IROp::Const { dest: 1, ty: IrType::I32, value: 1 }],
                Terminator::Ret { value: Some(1) },
            ),
            block(
                2,
                "else",
                vec![IROp::Const { dest: 2, ty: IrType::I32, value: 0 }],
                Terminator::Ret { value: Some(2) },
            ),
        ];

        assert!(simplify_cfg(&mut f));
        assert_eq!(f.blocks.len(), 1);
        assert_eq!(f.blocks[0].label, "entry");
        assert_eq!(f.blocks[0].terminator, Some(Terminator::Ret { value: Some(1) }));
    }

    #[test]
    fn join_block_with_two_predecessors_is_kept() {
        let mut f = IrFunction::new(FunctionPrototype::new("f", vec![], IrType::Void), vec![]);
        f.reg_types = vec![IrType::I1];
        f.blocks = vec![
            block(
                0,
                "entry",
                vec![IROp::Call { dest: None, callee: "g".into(), args: vec![] }],
                Terminator::CondBr { cond: 0, then_block: 1, else_block: 2 },
            ),
            block(1, "then", vec![], Terminator::Br { target: 3 }),
            block(2, "else", vec![], Terminator::Br { target: 3 }),
            block(3, "if_cont", vec![], Terminator::Ret { value: None }),
        ];
        simplify_cfg(&mut f);
        assert!(f.blocks.iter().any(|b| b.label == "if_cont"));
        assert_eq!(f.blocks.len(), 4);
    }
}
