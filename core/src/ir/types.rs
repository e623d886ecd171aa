//! file: core/src/ir/types.rs
//! description: type catalog mapping source type names to IR types.
//!
use std::collections::HashMap;
use std::fmt;

use crate::ir::lower::err::UnknownTypeError;

/// Primitive IR types. `I1` only appears as the result of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    I1,
    I32,
    Void,
}

impl IrType {
    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::I1 => write!(f, "i1"),
            IrType::I32 => write!(f, "i32"),
            IrType::Void => write!(f, "void"),
        }
    }
}

/// Fixed mapping from source type names to IR types. The empty name is
/// how the parser spells "no return type".
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    types: HashMap<String, IrType>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        let mut types = HashMap::new();
        types.insert("i32".to_string(), IrType::I32);
        types.insert(String::new(), IrType::Void);
        TypeCatalog { types }
    }

    /// Look up a source type name.
    ///
    /// The grammar only produces names present in the catalog, so a miss is
    /// reported at `Level::Critical`.
    pub fn resolve(&self, name: &str) -> Result<IrType, UnknownTypeError> {
        self.types
            .get(name)
            .copied()
            .ok_or_else(|| UnknownTypeError::new(name))
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Level, LucixErrorExt};

    #[test]
    fn resolves_known_names() {
        let catalog = TypeCatalog::new();
        assert_eq!(catalog.resolve("i32").unwrap(), IrType::I32);
        assert_eq!(catalog.resolve("").unwrap(), IrType::Void);
    }

    #[test]
    fn unknown_name_is_critical() {
        let err = TypeCatalog::new().resolve("f64").unwrap_err();
        assert_eq!(err.level(), Level::Critical);
        assert!(err.message().contains("f64"));
    }
}
