use std::collections::HashMap;

use crate::ir::module::{BasicBlock, FunctionPrototype, IrFunction, SlotInfo};
use crate::ir::op::{BlockId, ICmpPredicate, IROp, Register, SlotId, Terminator};
use crate::ir::types::IrType;

/// Insertion cursor over one function under construction.
///
/// Registers, slots and blocks are numbered per function. Emitting into a
/// block that already has a terminator moves the cursor to a fresh `dead`
/// block, so code after a `return` is kept but unreachable.
pub struct FunctionBuilder {
    func: IrFunction,
    current: Option<BlockId>,
    next_block: BlockId,
    label_counts: HashMap<String, usize>,
}

impl FunctionBuilder {
    pub fn new(prototype: FunctionPrototype, param_names: Vec<String>) -> Self {
        FunctionBuilder {
            func: IrFunction::new(prototype, param_names),
            current: None,
            next_block: 0,
            label_counts: HashMap::new(),
        }
    }

    pub fn prototype(&self) -> &FunctionPrototype {
        &self.func.prototype
    }

    /// Append a new empty block. Labels are made unique within the function
    /// (`then`, `then1`, ...).
    pub fn create_block(&mut self, label: &str) -> BlockId {
        let count = self.label_counts.entry(label.to_string()).or_insert(0);
        let unique = if *count == 0 {
            label.to_string()
        } else {
            format!("{}{}", label, count)
        };
        *count += 1;

        let id = self.next_block;
        self.next_block += 1;
        self.func.blocks.push(BasicBlock::new(id, &unique));
        id
    }

    pub fn set_insertion_point(&mut self, block: BlockId) {
        self.current = Some(block);
    }

    /// True when the cursor sits on a block that already ended.
    pub fn is_terminated(&self) -> bool {
        self.current
            .and_then(|id| self.func.block(id))
            .map(|b| b.is_terminated())
            .unwrap_or(false)
    }

    fn open_block(&mut self) -> BlockId {
        match self.current {
            Some(id) if !self.is_terminated() => id,
            Some(_) => {
                log::warn!(
                    "unreachable code after terminator in @{}",
                    self.func.prototype.name
                );
                let dead = self.create_block("dead");
                self.current = Some(dead);
                dead
            }
            None => {
                let entry = self.create_block("entry");
                self.current = Some(entry);
                entry
            }
        }
    }

    fn emit(&mut self, op: IROp) {
        let id = self.open_block();
        if let Some(block) = self.func.block_mut(id) {
            block.ops.push(op);
        }
    }

    fn emit_value(&mut self, ty: IrType, make: impl FnOnce(Register) -> IROp) -> Register {
        let dest = self.func.new_register(ty);
        self.emit(make(dest));
        dest
    }

    pub fn build_arg(&mut self, index: usize, ty: IrType) -> Register {
        self.emit_value(ty, |dest| IROp::Arg { dest, index })
    }

    /// Create a constant.
    pub fn build_const(&mut self, ty: IrType, value: i32) -> Register {
        self.emit_value(ty, |dest| IROp::Const { dest, ty, value })
    }

    /// Reserve a stack slot for `name` and emit its `alloca`.
    pub fn build_alloca(&mut self, name: &str, ty: IrType) -> SlotId {
        self.func.slots.push(SlotInfo {
            name: name.to_string(),
            ty,
        });
        let slot = self.func.slots.len() - 1;
        self.emit(IROp::Alloca { slot });
        slot
    }

    pub fn slot_type(&self, slot: SlotId) -> IrType {
        self.func.slots.get(slot).map(|s| s.ty).unwrap_or(IrType::I32)
    }

    pub fn build_load(&mut self, slot: SlotId) -> Register {
        let ty = self.slot_type(slot);
        self.emit_value(ty, |dest| IROp::Load { dest, slot })
    }

    pub fn build_store(&mut self, src: Register, slot: SlotId) {
        self.emit(IROp::Store { src, slot });
    }

    pub fn build_add(&mut self, lhs: Register, rhs: Register) -> Register {
        self.emit_value(IrType::I32, |dest| IROp::Add { dest, lhs, rhs })
    }

    pub fn build_sub(&mut self, lhs: Register, rhs: Register) -> Register {
        self.emit_value(IrType::I32, |dest| IROp::Sub { dest, lhs, rhs })
    }

    pub fn build_neg(&mut self, src: Register) -> Register {
        self.emit_value(IrType::I32, |dest| IROp::Neg { dest, src })
    }

    pub fn build_icmp(&mut self, pred: ICmpPredicate, lhs: Register, rhs: Register) -> Register {
        self.emit_value(IrType::I1, |dest| IROp::ICmp {
            dest,
            pred,
            lhs,
            rhs,
        })
    }

    pub fn build_zext(&mut self, src: Register) -> Register {
        self.emit_value(IrType::I32, |dest| IROp::ZExt { dest, src })
    }

    /// Emit a call; void callees produce no register.
    pub fn build_call(&mut self, callee: &str, args: Vec<Register>, ret: IrType) -> Option<Register> {
        let callee = callee.to_string();
        if ret.is_void() {
            self.emit(IROp::Call {
                dest: None,
                callee,
                args,
            });
            None
        } else {
            Some(self.emit_value(ret, |dest| IROp::Call {
                dest: Some(dest),
                callee,
                args,
            }))
        }
    }

    fn terminate(&mut self, term: Terminator) {
        let id = self.open_block();
        if let Some(block) = self.func.block_mut(id) {
            block.terminator = Some(term);
        }
    }

    pub fn build_ret(&mut self, value: Option<Register>) {
        self.terminate(Terminator::Ret { value });
    }

    /// Branch to `target`. Dropped when the current block already ended,
    /// which is how a `return` inside a branch body wins over the merge jump.
    pub fn build_br(&mut self, target: BlockId) {
        if self.is_terminated() {
            log::debug!(
                "branch to block {} dropped: block already terminated",
                target
            );
            return;
        }
        self.terminate(Terminator::Br { target });
    }

    pub fn build_cond_br(&mut self, cond: Register, then_block: BlockId, else_block: BlockId) {
        if self.is_terminated() {
            log::debug!("conditional branch dropped: block already terminated");
            return;
        }
        self.terminate(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        });
    }

    /// Close every open block and return the function. Void functions fall
    /// off the end with `ret void`; any other open block is `unreachable`.
    pub fn finish(mut self) -> IrFunction {
        let void = self.func.prototype.ret.is_void();
        for block in &mut self.func.blocks {
            if block.terminator.is_none() {
                block.terminator = Some(if void {
                    Terminator::Ret { value: None }
                } else {
                    Terminator::Unreachable
                });
            }
        }
        self.func
    }
}
