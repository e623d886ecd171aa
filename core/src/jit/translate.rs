//! file: core/src/jit/translate.rs
//! description: lower one `IrFunction` into Cranelift IR.
//!
//! Slots become explicit stack slots, `i1` values are carried as `i8`, and
//! `unreachable` is a user trap.
//!
use std::collections::HashMap;

use cranelift_codegen::ir::condcodes::IntCC;
use cranelift_codegen::ir::{
    AbiParam, Block, InstBuilder, Signature, StackSlot, StackSlotData, StackSlotKind, TrapCode,
    Type, Value, types,
};
use cranelift_frontend::FunctionBuilder;
use cranelift_jit::JITModule;
use cranelift_module::{FuncId, Module};

use crate::ir::module::{FunctionPrototype, IrFunction};
use crate::ir::op::{BlockId, ICmpPredicate, IROp, Register, SlotId, Terminator};
use crate::ir::types::IrType;

pub(crate) fn clif_type(ty: IrType) -> Option<Type> {
    match ty {
        IrType::I1 => Some(types::I8),
        IrType::I32 => Some(types::I32),
        IrType::Void => None,
    }
}

pub(crate) fn make_signature(module: &JITModule, prototype: &FunctionPrototype) -> Signature {
    let mut sig = module.make_signature();
    for param in &prototype.params {
        if let Some(ty) = clif_type(*param) {
            sig.params.push(AbiParam::new(ty));
        }
    }
    if let Some(ty) = clif_type(prototype.ret) {
        sig.returns.push(AbiParam::new(ty));
    }
    sig
}

/// Immediates must be zero-extended to the width of their type.
fn immediate(ty: IrType, value: i32) -> i64 {
    match ty {
        IrType::I1 => (value as u8 & 1) as i64,
        _ => value as u32 as i64,
    }
}

fn int_cc(pred: ICmpPredicate) -> IntCC {
    match pred {
        ICmpPredicate::Slt => IntCC::SignedLessThan,
        ICmpPredicate::Sgt => IntCC::SignedGreaterThan,
        ICmpPredicate::Ne => IntCC::NotEqual,
    }
}

pub(crate) fn lower_function(
    module: &mut JITModule,
    func: &IrFunction,
    callees: &HashMap<String, FuncId>,
    builder: &mut FunctionBuilder,
) -> Result<(), String> {
    if func.blocks.is_empty() {
        return Err(format!("function '{}' has no basic blocks", func.name()));
    }

    let mut blocks: HashMap<BlockId, Block> = HashMap::new();
    for block in &func.blocks {
        blocks.insert(block.id, builder.create_block());
    }
    let entry = blocks[&func.blocks[0].id];
    builder.append_block_params_for_function_params(entry);

    let mut slots: HashMap<SlotId, StackSlot> = HashMap::new();
    for op in func.blocks.iter().flat_map(|b| b.ops.iter()) {
        if let Some(slot) = op.slot() {
            slots.entry(slot).or_insert_with(|| {
                builder.create_sized_stack_slot(StackSlotData::new(
                    StackSlotKind::ExplicitSlot,
                    4,
                    2, // 4-byte alignment
                ))
            });
        }
    }

    let mut func_refs = HashMap::new();
    for op in func.blocks.iter().flat_map(|b| b.ops.iter()) {
        if let IROp::Call { callee, .. } = op {
            if func_refs.contains_key(callee) {
                continue;
            }
            let id = callees
                .get(callee)
                .ok_or_else(|| format!("call to undeclared function '{}'", callee))?;
            func_refs.insert(callee.clone(), module.declare_func_in_func(*id, builder.func));
        }
    }

    let mut values: HashMap<Register, Value> = HashMap::new();
    let value_of = |values: &HashMap<Register, Value>, reg: Register| -> Result<Value, String> {
        values
            .get(&reg)
            .copied()
            .ok_or_else(|| format!("register %{} used before definition", reg))
    };
    let slot_of = |slot: SlotId| -> Result<StackSlot, String> {
        slots
            .get(&slot)
            .copied()
            .ok_or_else(|| format!("unknown slot {}", slot))
    };
    let type_of = |reg: Register| -> Result<Type, String> {
        func.reg_type(reg)
            .and_then(clif_type)
            .ok_or_else(|| format!("register %{} has no value type", reg))
    };

    for block in &func.blocks {
        builder.switch_to_block(blocks[&block.id]);

        for op in &block.ops {
            match op {
                IROp::Arg { dest, index } => {
                    let param = builder
                        .block_params(entry)
                        .get(*index)
                        .copied()
                        .ok_or_else(|| format!("missing parameter {}", index))?;
                    values.insert(*dest, param);
                }
                IROp::Const { dest, ty, value } => {
                    let clif = clif_type(*ty).ok_or("void constant")?;
                    let v = builder.ins().iconst(clif, immediate(*ty, *value));
                    values.insert(*dest, v);
                }
                IROp::Alloca { .. } => {}
                IROp::Load { dest, slot } => {
                    let v = builder.ins().stack_load(type_of(*dest)?, slot_of(*slot)?, 0);
                    values.insert(*dest, v);
                }
                IROp::Store { src, slot } => {
                    let v = value_of(&values, *src)?;
                    builder.ins().stack_store(v, slot_of(*slot)?, 0);
                }
                IROp::Add { dest, lhs, rhs } => {
                    let (l, r) = (value_of(&values, *lhs)?, value_of(&values, *rhs)?);
                    let v = builder.ins().iadd(l, r);
                    values.insert(*dest, v);
                }
                IROp::Sub { dest, lhs, rhs } => {
                    let (l, r) = (value_of(&values, *lhs)?, value_of(&values, *rhs)?);
                    let v = builder.ins().isub(l, r);
                    values.insert(*dest, v);
                }
                IROp::Neg { dest, src } => {
                    let v = builder.ins().ineg(value_of(&values, *src)?);
                    values.insert(*dest, v);
                }
                IROp::ICmp {
                    dest,
                    pred,
                    lhs,
                    rhs,
                } => {
                    let (l, r) = (value_of(&values, *lhs)?, value_of(&values, *rhs)?);
                    let v = builder.ins().icmp(int_cc(*pred), l, r);
                    values.insert(*dest, v);
                }
                IROp::ZExt { dest, src } => {
                    let v = builder
                        .ins()
                        .uextend(type_of(*dest)?, value_of(&values, *src)?);
                    values.insert(*dest, v);
                }
                IROp::Call { dest, callee, args } => {
                    let func_ref = func_refs
                        .get(callee)
                        .copied()
                        .ok_or_else(|| format!("unknown call target '{}'", callee))?;
                    let mut lowered = Vec::with_capacity(args.len());
                    for arg in args {
                        lowered.push(value_of(&values, *arg)?);
                    }
                    let call = builder.ins().call(func_ref, &lowered);
                    if let Some(dest) = dest {
                        let result = builder
                            .inst_results(call)
                            .first()
                            .copied()
                            .ok_or_else(|| format!("call to '{}' returned nothing", callee))?;
                        values.insert(*dest, result);
                    }
                }
            }
        }

        let target = |id: &BlockId| -> Result<Block, String> {
            blocks
                .get(id)
                .copied()
                .ok_or_else(|| format!("unknown branch target {}", id))
        };
        match &block.terminator {
            Some(Terminator::Ret { value: Some(v) }) => {
                let v = value_of(&values, *v)?;
                builder.ins().return_(&[v]);
            }
            Some(Terminator::Ret { value: None }) => {
                builder.ins().return_(&[]);
            }
            Some(Terminator::Br { target: t }) => {
                builder.ins().jump(target(t)?, &[]);
            }
            Some(Terminator::CondBr {
                cond,
                then_block,
                else_block,
            }) => {
                let c = value_of(&values, *cond)?;
                builder
                    .ins()
                    .brif(c, target(then_block)?, &[], target(else_block)?, &[]);
            }
            Some(Terminator::Unreachable) => {
                builder.ins().trap(TrapCode::unwrap_user(1));
            }
            None => return Err(format!("block '{}' has no terminator", block.label)),
        }
    }

    Ok(())
}
