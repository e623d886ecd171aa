//! file: core/src/ir/verify.rs
//! description: structural checks run on a unit before it reaches the backend.
//!
use std::collections::HashSet;

use super::module::{IrFunction, IrModule};
use super::op::{IROp, Register, Terminator};
use super::types::IrType;

/// Validate a whole unit. The first problem found is returned as text.
pub fn verify_module(module: &IrModule) -> Result<(), String> {
    let mut seen = HashSet::new();
    for func in &module.functions {
        if !seen.insert(func.name()) {
            return Err(format!("duplicate function '{}' in unit", func.name()));
        }
    }
    for func in &module.functions {
        verify_function(module, func).map_err(|e| format!("in @{}: {}", func.name(), e))?;
    }
    Ok(())
}

pub fn verify_function(module: &IrModule, func: &IrFunction) -> Result<(), String> {
    if func.blocks.is_empty() {
        return Err("function has no blocks".to_string());
    }
    if func.param_names.len() != func.prototype.params.len() {
        return Err("parameter names do not match the prototype".to_string());
    }

    let block_ids: HashSet<_> = func.blocks.iter().map(|b| b.id).collect();
    if block_ids.len() != func.blocks.len() {
        return Err("duplicate block id".to_string());
    }

    // Every register has exactly one writer.
    let mut defined: HashSet<Register> = HashSet::new();
    for block in &func.blocks {
        for op in &block.ops {
            if let Some(dest) = op.dest() {
                if dest >= func.reg_types.len() {
                    return Err(format!("register %{} has no type", dest));
                }
                if !defined.insert(dest) {
                    return Err(format!("register %{} defined more than once", dest));
                }
            }
        }
    }

    let ty_of = |reg: Register| -> Result<IrType, String> {
        if !defined.contains(&reg) {
            return Err(format!("use of undefined register %{}", reg));
        }
        func.reg_type(reg)
            .ok_or_else(|| format!("register %{} has no type", reg))
    };
    let expect = |reg: Register, want: IrType| -> Result<(), String> {
        let got = ty_of(reg)?;
        if got != want {
            return Err(format!("%{} is {} but {} was expected", reg, got, want));
        }
        Ok(())
    };

    for block in &func.blocks {
        for op in &block.ops {
            if let Some(slot) = op.slot() {
                if slot >= func.slots.len() {
                    return Err(format!("unknown slot {}", slot));
                }
            }
            match op {
                IROp::Arg { dest, index } => {
                    let param = func
                        .prototype
                        .params
                        .get(*index)
                        .ok_or_else(|| format!("argument index {} out of range", index))?;
                    expect(*dest, *param)?;
                }
                IROp::Const { dest, ty, .. } => expect(*dest, *ty)?,
                IROp::Alloca { .. } => {}
                IROp::Load { dest, slot } => expect(*dest, func.slots[*slot].ty)?,
                IROp::Store { src, slot } => expect(*src, func.slots[*slot].ty)?,
                IROp::Add { dest, lhs, rhs } | IROp::Sub { dest, lhs, rhs } => {
                    expect(*lhs, IrType::I32)?;
                    expect(*rhs, IrType::I32)?;
                    expect(*dest, IrType::I32)?;
                }
                IROp::Neg { dest, src } => {
                    expect(*src, IrType::I32)?;
                    expect(*dest, IrType::I32)?;
                }
                IROp::ICmp { dest, lhs, rhs, .. } => {
                    expect(*lhs, IrType::I32)?;
                    expect(*rhs, IrType::I32)?;
                    expect(*dest, IrType::I1)?;
                }
                IROp::ZExt { dest, src } => {
                    expect(*src, IrType::I1)?;
                    expect(*dest, IrType::I32)?;
                }
                IROp::Call { dest, callee, args } => {
                    let proto = module
                        .lookup_prototype(callee)
                        .ok_or_else(|| format!("call to undeclared function @{}", callee))?;
                    if proto.params.len() != args.len() {
                        return Err(format!(
                            "@{} takes {} arguments, {} given",
                            callee,
                            proto.params.len(),
                            args.len()
                        ));
                    }
                    for (arg, ty) in args.iter().zip(proto.params.iter()) {
                        expect(*arg, *ty)?;
                    }
                    match (dest, proto.ret) {
                        (None, IrType::Void) => {}
                        (Some(d), ret) if !ret.is_void() => expect(*d, ret)?,
                        _ => return Err(format!("call result of @{} does not match its return type", callee)),
                    }
                }
            }
        }

        let term = block
            .terminator
            .as_ref()
            .ok_or_else(|| format!("block '{}' has no terminator", block.label))?;
        for succ in term.successors() {
            if !block_ids.contains(&succ) {
                return Err(format!("block '{}' branches to unknown block {}", block.label, succ));
            }
        }
        match term {
            Terminator::Ret { value: Some(v) } => {
                if func.prototype.ret.is_void() {
                    return Err("value returned from a void function".to_string());
                }
                expect(*v, func.prototype.ret)?;
            }
            Terminator::Ret { value: None } => {
                if !func.prototype.ret.is_void() {
                    return Err(format!("missing return value of type {}", func.prototype.ret));
                }
            }
            Terminator::CondBr { cond, .. } => expect(*cond, IrType::I1)?,
            Terminator::Br { .. } | Terminator::Unreachable => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::module::{BasicBlock, FunctionPrototype};

    fn single_block(ret: IrType, ops: Vec<IROp>, term: Option<Terminator>, regs: Vec<IrType>) -> IrModule {
        let mut func = IrFunction::new(FunctionPrototype::new("f", vec![], ret), vec![]);
        func.reg_types = regs;
        let mut block = BasicBlock::new(0, "entry");
        block.ops = ops;
        block.terminator = term;
        func.blocks.push(block);
        let mut module = IrModule::new("t");
        module.functions.push(func);
        module
    }

    #[test]
    fn accepts_constant_return() {
        let m = single_block(
            IrType::I32,
            vec![IROp::Const { dest: 0, ty: IrType::I32, value: 5 }],
            Some(Terminator::Ret { value: Some(0) }),
            vec![IrType::I32],
        );
        assert!(verify_module(&m).is_ok());
    }

    #[test]
    fn rejects_missing_terminator() {
        let m = single_block(IrType::Void, vec![], None, vec![]);
        assert!(verify_module(&m).unwrap_err().contains("no terminator"));
    }

    #[test]
    fn rejects_void_return_in_i32_function() {
        let m = single_block(IrType::I32, vec![], Some(Terminator::Ret { value: None }), vec![]);
        assert!(verify_module(&m).unwrap_err().contains("missing return value"));
    }

    #[test]
    fn rejects_call_to_unknown_function() {
        let m = single_block(
            IrType::Void,
            vec![IROp::Call { dest: None, callee: "g".into(), args: vec![] }],
            Some(Terminator::Ret { value: None }),
            vec![],
        );
        assert!(verify_module(&m).unwrap_err().contains("undeclared"));
    }

    #[test]
    fn rejects_branch_on_i32() {
        let m = single_block(
            IrType::Void,
            vec![IROp::Const { dest: 0, ty: IrType::I32, value: 1 }],
            Some(Terminator::CondBr { cond: 0, then_block: 0, else_block: 0 }),
            vec![IrType::I32],
        );
        assert!(verify_module(&m).is_err());
    }
}
