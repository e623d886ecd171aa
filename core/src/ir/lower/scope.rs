//! file: core/src/ir/lower/scope.rs
//! description: lexical scope stack mapping variable names to slots.
//!
use std::collections::HashMap;

use super::err::{NoOpenScopeError, UnresolvedSymbolError};
use crate::ir::op::SlotId;

type Frame = HashMap<String, SlotId>;

/// Stack of scope frames; the last frame is the innermost scope.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { frames: Vec::new() }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Drop the innermost frame. Slots it named stay allocated in the function.
    pub fn pop_scope(&mut self) {
        self.frames.pop();
    }

    /// Bind `name` in the innermost frame, replacing a binding of the same
    /// name in that frame.
    pub fn declare(&mut self, name: &str, slot: SlotId) -> Result<(), NoOpenScopeError> {
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| NoOpenScopeError::new(name))?;
        frame.insert(name.to_string(), slot);
        Ok(())
    }

    /// Innermost binding of `name`.
    pub fn resolve(&self, name: &str) -> Result<SlotId, UnresolvedSymbolError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
            .ok_or_else(|| UnresolvedSymbolError::variable(name))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pop frames until only `depth` remain.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }
}
