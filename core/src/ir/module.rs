//! file: core/src/ir/module.rs
//! description: compilation unit, function and basic block containers.
//!
//! `Display` renders an LLVM-flavoured text form that is used for the
//! diagnostic IR dump. Register, slot and block numbering is local to each
//! function so generating the same source twice prints identical text.
//!
use std::fmt;

use super::op::{BlockId, IROp, Register, SlotId, Terminator};
use super::types::IrType;

/// Name and signature of a callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionPrototype {
    pub name: String,
    pub params: Vec<IrType>,
    pub ret: IrType,
}

impl FunctionPrototype {
    pub fn new(name: &str, params: Vec<IrType>, ret: IrType) -> Self {
        FunctionPrototype {
            name: name.to_string(),
            params,
            ret,
        }
    }
}

impl fmt::Display for FunctionPrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{} @{}({})", self.ret, self.name, params.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub name: String,
    pub ty: IrType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub id: BlockId,
    pub label: String,
    pub ops: Vec<IROp>,
    pub terminator: Option<Terminator>,
}

impl BasicBlock {
    pub fn new(id: BlockId, label: &str) -> Self {
        BasicBlock {
            id,
            label: label.to_string(),
            ops: Vec::new(),
            terminator: None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }

    pub fn successors(&self) -> Vec<BlockId> {
        self.terminator
            .as_ref()
            .map(|t| t.successors())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    pub prototype: FunctionPrototype,
    pub param_names: Vec<String>,
    pub slots: Vec<SlotInfo>,
    /// Type of every register, indexed by register number.
    pub reg_types: Vec<IrType>,
    /// Blocks in layout order; the first one is the entry block.
    pub blocks: Vec<BasicBlock>,
}

impl IrFunction {
    pub fn new(prototype: FunctionPrototype, param_names: Vec<String>) -> Self {
        IrFunction {
            prototype,
            param_names,
            slots: Vec::new(),
            reg_types: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.prototype.name
    }

    pub fn new_register(&mut self, ty: IrType) -> Register {
        self.reg_types.push(ty);
        self.reg_types.len() - 1
    }

    pub fn reg_type(&self, reg: Register) -> Option<IrType> {
        self.reg_types.get(reg).copied()
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn entry(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    pub fn label_of(&self, id: BlockId) -> String {
        self.block(id)
            .map(|b| b.label.clone())
            .unwrap_or_else(|| format!("bb{}", id))
    }

    pub fn slot_name(&self, slot: SlotId) -> String {
        match self.slots.get(slot) {
            Some(info) => format!("%{}.{}", info.name, slot),
            None => format!("%slot.{}", slot),
        }
    }

    /// Rewrite every operand found in `map` to its mapped register, in ops
    /// and terminators, in one walk over the function.
    pub fn rewrite_uses(&mut self, map: &std::collections::HashMap<Register, Register>) {
        if map.is_empty() {
            return;
        }
        for block in &mut self.blocks {
            let terminator = block.terminator.iter_mut().flat_map(|t| t.operands_mut());
            for operand in block
                .ops
                .iter_mut()
                .flat_map(|op| op.operands_mut())
                .chain(terminator)
            {
                if let Some(new) = map.get(&*operand) {
                    *operand = *new;
                }
            }
        }
    }

    /// Number of blocks branching to each block id.
    pub fn predecessor_counts(&self) -> std::collections::HashMap<BlockId, usize> {
        let mut counts = std::collections::HashMap::new();
        for block in &self.blocks {
            for succ in block.successors() {
                *counts.entry(succ).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn op_count(&self) -> usize {
        self.blocks.iter().map(|b| b.ops.len() + 1).sum()
    }

    fn fmt_reg(&self, reg: Register) -> String {
        match self.reg_type(reg) {
            Some(ty) => format!("{} %{}", ty, reg),
            None => format!("? %{}", reg),
        }
    }

    fn fmt_op(&self, op: &IROp) -> String {
        match op {
            IROp::Arg { dest, index } => format!("%{} = arg {}", dest, index),
            IROp::Const { dest, ty, value } => format!("%{} = const {} {}", dest, ty, value),
            IROp::Alloca { slot } => {
                let ty = self.slots.get(*slot).map(|s| s.ty).unwrap_or(IrType::I32);
                format!("{} = alloca {}", self.slot_name(*slot), ty)
            }
            IROp::Load { dest, slot } => {
                let ty = self.reg_type(*dest).unwrap_or(IrType::I32);
                format!("%{} = load {}, ptr {}", dest, ty, self.slot_name(*slot))
            }
            IROp::Store { src, slot } => {
                format!("store {}, ptr {}", self.fmt_reg(*src), self.slot_name(*slot))
            }
            IROp::Add { dest, lhs, rhs } => {
                format!("%{} = add {}, %{}", dest, self.fmt_reg(*lhs), rhs)
            }
            IROp::Sub { dest, lhs, rhs } => {
                format!("%{} = sub {}, %{}", dest, self.fmt_reg(*lhs), rhs)
            }
            IROp::Neg { dest, src } => format!("%{} = neg {}", dest, self.fmt_reg(*src)),
            IROp::ICmp {
                dest,
                pred,
                lhs,
                rhs,
            } => format!("%{} = icmp {} {}, %{}", dest, pred, self.fmt_reg(*lhs), rhs),
            IROp::ZExt { dest, src } => {
                let ty = self.reg_type(*dest).unwrap_or(IrType::I32);
                format!("%{} = zext {} to {}", dest, self.fmt_reg(*src), ty)
            }
            IROp::Call { dest, callee, args } => {
                let args: Vec<String> = args.iter().map(|a| self.fmt_reg(*a)).collect();
                match dest {
                    Some(d) => {
                        let ty = self.reg_type(*d).unwrap_or(IrType::I32);
                        format!("%{} = call {} @{}({})", d, ty, callee, args.join(", "))
                    }
                    None => format!("call void @{}({})", callee, args.join(", ")),
                }
            }
        }
    }

    fn fmt_terminator(&self, term: &Terminator) -> String {
        match term {
            Terminator::Ret { value: Some(v) } => format!("ret {}", self.fmt_reg(*v)),
            Terminator::Ret { value: None } => "ret void".to_string(),
            Terminator::Br { target } => format!("br label %{}", self.label_of(*target)),
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => format!(
                "condbr {}, label %{}, label %{}",
                self.fmt_reg(*cond),
                self.label_of(*then_block),
                self.label_of(*else_block)
            ),
            Terminator::Unreachable => "unreachable".to_string(),
        }
    }
}

impl fmt::Display for IrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .prototype
            .params
            .iter()
            .zip(self.param_names.iter())
            .map(|(ty, name)| format!("{} %{}", ty, name))
            .collect();
        writeln!(
            f,
            "define {} @{}({}) {{",
            self.prototype.ret,
            self.prototype.name,
            params.join(", ")
        )?;
        for block in &self.blocks {
            writeln!(f, "{}:", block.label)?;
            for op in &block.ops {
                writeln!(f, "  {}", self.fmt_op(op))?;
            }
            match &block.terminator {
                Some(term) => writeln!(f, "  {}", self.fmt_terminator(term))?,
                None => writeln!(f, "  ; <missing terminator>")?,
            }
        }
        writeln!(f, "}}")
    }
}

/// One compilation unit: the functions defined by it plus prototypes of
/// functions it calls that live in earlier units.
#[derive(Debug, Clone, PartialEq)]
pub struct IrModule {
    pub name: String,
    pub functions: Vec<IrFunction>,
    pub declarations: Vec<FunctionPrototype>,
}

impl IrModule {
    pub fn new(name: &str) -> Self {
        IrModule {
            name: name.to_string(),
            functions: Vec::new(),
            declarations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn defines(&self, name: &str) -> bool {
        self.functions.iter().any(|f| f.name() == name)
    }

    pub fn function(&self, name: &str) -> Option<&IrFunction> {
        self.functions.iter().find(|f| f.name() == name)
    }

    /// Record an external prototype once.
    pub fn declare(&mut self, prototype: &FunctionPrototype) {
        if !self.defines(&prototype.name)
            && !self.declarations.iter().any(|d| d.name == prototype.name)
        {
            self.declarations.push(prototype.clone());
        }
    }

    /// Prototype for a call target visible from this unit.
    pub fn lookup_prototype(&self, name: &str) -> Option<&FunctionPrototype> {
        self.function(name)
            .map(|f| &f.prototype)
            .or_else(|| self.declarations.iter().find(|d| d.name == name))
    }
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; unit '{}'", self.name)?;
        for decl in &self.declarations {
            writeln!(f, "declare {}", decl)?;
        }
        for func in &self.functions {
            writeln!(f)?;
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}
