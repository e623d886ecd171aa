//! IR optimizer: a fixed per-function pass sequence.
//!
//! simplify -> reassociate -> redundant-load elimination -> CFG
//! simplification -> slot promotion. Each pass reports whether it changed
//! the function.
pub mod cfg_simplify;
pub mod promote;
pub mod reassociate;
pub mod redundant_load;
pub mod simplify;

use std::collections::{HashMap, HashSet};

use crate::ir::module::{IrFunction, IrModule};
use crate::ir::op::{IROp, Register};

#[derive(Clone, Copy)]
pub struct Pass {
    pub name: &'static str,
    pub run: fn(&mut IrFunction) -> bool,
}

pub struct PassManager {
    passes: Vec<Pass>,
}

impl PassManager {
    /// The standard sequence used by the execution pipeline.
    pub fn standard() -> Self {
        PassManager {
            passes: vec![
                Pass { name: "simplify", run: simplify::simplify },
                Pass { name: "reassociate", run: reassociate::reassociate },
                Pass { name: "redundant-load", run: redundant_load::eliminate_redundant_loads },
                Pass { name: "cfg-simplify", run: cfg_simplify::simplify_cfg },
                Pass { name: "promote", run: promote::promote_slots },
            ],
        }
    }

    /// No passes; units go to the backend as generated.
    pub fn empty() -> Self {
        PassManager { passes: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name).collect()
    }

    pub fn run_on_function(&self, func: &mut IrFunction) -> usize {
        let mut changed = 0;
        for pass in &self.passes {
            if (pass.run)(func) {
                log::debug!("{}: changed @{}", pass.name, func.name());
                changed += 1;
            }
        }
        changed
    }

    /// Run the sequence once over every function; returns how many
    /// (pass, function) pairs made a change.
    pub fn run(&self, module: &mut IrModule) -> usize {
        module
            .functions
            .iter_mut()
            .map(|f| self.run_on_function(f))
            .sum()
    }
}

pub fn optimize(module: &mut IrModule) -> usize {
    PassManager::standard().run(module)
}

/// Registers defined by `const`, with their values.
pub(crate) fn constant_values(func: &IrFunction) -> HashMap<Register, i32> {
    func.blocks
        .iter()
        .flat_map(|b| b.ops.iter())
        .filter_map(|op| match op {
            IROp::Const { dest, value, .. } => Some((*dest, *value)),
            _ => None,
        })
        .collect()
}

/// Rewrite uses of each `old` to its `new`, following chains so that a
/// replacement target that was itself replaced ends at the final register.
pub(crate) fn apply_replacements(func: &mut IrFunction, replacements: &[(Register, Register)]) {
    let direct: HashMap<Register, Register> = replacements.iter().copied().collect();
    let resolved: HashMap<Register, Register> = direct
        .keys()
        .map(|old| {
            let mut target = *old;
            let mut hops = 0;
            while let Some(next) = direct.get(&target) {
                target = *next;
                hops += 1;
                if hops > direct.len() {
                    break;
                }
            }
            (*old, target)
        })
        .collect();
    func.rewrite_uses(&resolved);
}

/// Drop pure ops whose result is never used. Repeats until stable.
pub(crate) fn remove_dead_ops(func: &mut IrFunction) -> bool {
    let mut changed = false;
    loop {
        let mut used: HashSet<Register> = HashSet::new();
        for block in &func.blocks {
            for op in &block.ops {
                used.extend(op.operands());
            }
            if let Some(term) = &block.terminator {
                used.extend(term.operands());
            }
        }
        let mut removed = false;
        for block in &mut func.blocks {
            let before = block.ops.len();
            block.ops.retain(|op| match op.dest() {
                Some(dest) => used.contains(&dest) || op.has_side_effects(),
                None => true,
            });
            removed |= block.ops.len() != before;
        }
        if !removed {
            return changed;
        }
        changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::lower::function_builder::FunctionBuilder;
    use crate::ir::module::FunctionPrototype;
    use crate::ir::op::Terminator;
    use crate::ir::types::IrType;

    #[test]
    fn replacement_chains_end_at_the_final_register() {
        let mut b = FunctionBuilder::new(FunctionPrototype::new("f", vec![], IrType::I32), vec![]);
        let entry = b.create_block("entry");
        b.set_insertion_point(entry);
        let first = b.build_const(IrType::I32, 1);
        let second = b.build_const(IrType::I32, 1);
        let third = b.build_const(IrType::I32, 1);
        let sum = b.build_add(third, second);
        b.build_ret(Some(third));
        let mut func = b.finish();

        apply_replacements(&mut func, &[(third, second), (second, first)]);

        assert_eq!(
            func.blocks[0].ops[3],
            IROp::Add {
                dest: sum,
                lhs: first,
                rhs: first
            }
        );
        assert_eq!(
            func.blocks[0].terminator,
            Some(Terminator::Ret { value: Some(first) })
        );
    }

    #[test]
    fn no_replacements_leaves_the_function_alone() {
        let mut b = FunctionBuilder::new(FunctionPrototype::new("f", vec![], IrType::I32), vec![]);
        let entry = b.create_block("entry");
        b.set_insertion_point(entry);
        let one = b.build_const(IrType::I32, 1);
        b.build_ret(Some(one));
        let mut func = b.finish();
        let before = func.to_string();

        apply_replacements(&mut func, &[]);
        assert_eq!(func.to_string(), before);
    }
}
