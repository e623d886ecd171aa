use std::collections::HashMap;

use crate::ir::module::FunctionPrototype;

/// A fully generated function, callable from any later function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionRecord {
    pub prototype: FunctionPrototype,
    /// Name of the unit that defines the function.
    pub unit: String,
}

/// Name -> function record for call-site resolution. Owned by one `CodeGen`.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionRecord>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        FunctionRegistry {
            functions: HashMap::new(),
        }
    }

    /// Insert `record` under `name`; a later registration of the same name wins.
    pub fn register(&mut self, name: &str, record: FunctionRecord) {
        if self.functions.insert(name.to_string(), record).is_some() {
            log::debug!("function '{}' re-registered", name);
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::IrType;

    fn record(ret: IrType, unit: &str) -> FunctionRecord {
        FunctionRecord {
            prototype: FunctionPrototype::new("f", vec![], ret),
            unit: unit.to_string(),
        }
    }

    #[test]
    fn last_registration_wins() {
        let mut reg = FunctionRegistry::new();
        reg.register("f", record(IrType::I32, "a"));
        reg.register("f", record(IrType::Void, "b"));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.resolve("f").unwrap().unit, "b");
    }

    #[test]
    fn absent_name_is_none() {
        assert!(FunctionRegistry::new().resolve("nope").is_none());
    }
}
