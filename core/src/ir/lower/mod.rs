//! file: core/src/ir/lower/mod.rs
//! description: AST -> IR code generator.
//!
//! `CodeGen` walks an `Application` tree once. It owns the type catalog,
//! the scope stack and the function registry, and keeps exactly one live
//! compilation unit. Completed units are handed to a `UnitSink` (normally
//! the execution pipeline), after which a fresh unit is started.
//!
pub mod err;
pub mod function_builder;
pub mod lower_expr;
pub mod lower_stmt;
pub mod registry;
pub mod scope;

use crate::ast::{AstNode, AstNodeKind};
use crate::config::CompileMode;
use crate::error::LucixErrorExt;
use crate::ir::module::{FunctionPrototype, IrModule};
use crate::ir::types::{IrType, TypeCatalog};

use self::err::InvalidValueError;
use self::function_builder::FunctionBuilder;
use self::registry::{FunctionRecord, FunctionRegistry};
use self::scope::ScopeStack;

/// Receiver of completed compilation units.
pub trait UnitSink {
    fn accept_unit(&mut self, unit: IrModule) -> Result<(), Box<dyn LucixErrorExt>>;
}

impl UnitSink for Vec<IrModule> {
    fn accept_unit(&mut self, unit: IrModule) -> Result<(), Box<dyn LucixErrorExt>> {
        self.push(unit);
        Ok(())
    }
}

pub struct CodeGen {
    pub(crate) types: TypeCatalog,
    pub(crate) scopes: ScopeStack,
    pub(crate) functions: FunctionRegistry,
    pub(crate) unit: IrModule,
    pub(crate) builder: Option<FunctionBuilder>,
    mode: CompileMode,
    unit_base: String,
}

impl CodeGen {
    /// `unit_base` names the per-source unit in `PerUnit` mode.
    pub fn new(unit_base: &str, mode: CompileMode) -> Self {
        CodeGen {
            types: TypeCatalog::new(),
            scopes: ScopeStack::new(),
            functions: FunctionRegistry::new(),
            unit: IrModule::new(unit_base),
            builder: None,
            mode,
            unit_base: unit_base.to_string(),
        }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Generate every function under `root`, handing units to `sink` as they
    /// complete. The first error aborts generation.
    pub fn generate(
        &mut self,
        root: &AstNode,
        sink: &mut dyn UnitSink,
    ) -> Result<(), Box<dyn LucixErrorExt>> {
        let functions = match &root.kind {
            AstNodeKind::Application { functions } => functions.iter().collect::<Vec<_>>(),
            AstNodeKind::FunctionDeclaration { .. } => vec![root],
            other => {
                return Err(Box::new(InvalidValueError::new(
                    format!("expected a function declaration at top level, found {}", other),
                    root.location.clone(),
                    root.span.clone(),
                )));
            }
        };

        for func in functions {
            if let (CompileMode::PerFunction, AstNodeKind::FunctionDeclaration { name, .. }) =
                (self.mode, &func.kind)
            {
                self.unit = IrModule::new(name);
            }

            self.lower_function(func)?;

            if self.mode == CompileMode::PerFunction {
                self.hand_over(sink)?;
            }
        }

        if self.mode == CompileMode::PerUnit && !self.unit.is_empty() {
            self.hand_over(sink)?;
        }
        Ok(())
    }

    fn hand_over(&mut self, sink: &mut dyn UnitSink) -> Result<(), Box<dyn LucixErrorExt>> {
        let unit = std::mem::replace(&mut self.unit, IrModule::new(&self.unit_base));
        log::info!(
            "unit '{}' complete: {} function(s), {} extern(s)",
            unit.name,
            unit.functions.len(),
            unit.declarations.len()
        );
        sink.accept_unit(unit)
    }

    fn lower_function(&mut self, node: &AstNode) -> Result<(), Box<dyn LucixErrorExt>> {
        let AstNodeKind::FunctionDeclaration {
            name,
            params,
            return_type,
            body,
        } = &node.kind
        else {
            return Err(Box::new(InvalidValueError::new(
                format!("expected a function declaration, found {}", node.kind),
                node.location.clone(),
                node.span.clone(),
            )));
        };

        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            param_types.push(self.resolve_type(&param.type_name, node)?);
        }
        let ret = self.resolve_type(return_type, node)?;
        let prototype = FunctionPrototype::new(name, param_types.clone(), ret);
        log::debug!("lowering {}", prototype);

        let mut builder = FunctionBuilder::new(
            prototype.clone(),
            params.iter().map(|p| p.name.clone()).collect(),
        );
        let entry = builder.create_block("entry");
        builder.set_insertion_point(entry);
        self.builder = Some(builder);

        let depth = self.scopes.depth();
        self.scopes.push_scope();
        let result = self.lower_function_body(params, &param_types, body);
        self.scopes.truncate(depth);

        let builder = self.builder.take();
        result?;
        let func = match builder {
            Some(b) => b.finish(),
            None => {
                return Err(Box::new(InvalidValueError::new(
                    format!("lost the builder while lowering '{}'", name),
                    node.location.clone(),
                    node.span.clone(),
                )));
            }
        };

        self.unit.functions.push(func);
        // Registered only now: a function cannot call itself.
        self.functions.register(
            name,
            FunctionRecord {
                prototype,
                unit: self.unit.name.clone(),
            },
        );
        Ok(())
    }

    fn lower_function_body(
        &mut self,
        params: &[crate::ast::Parameter],
        param_types: &[IrType],
        body: &AstNode,
    ) -> Result<(), Box<dyn LucixErrorExt>> {
        for (index, (param, ty)) in params.iter().zip(param_types.iter()).enumerate() {
            let b = self.builder_mut(body)?;
            let incoming = b.build_arg(index, *ty);
            let slot = b.build_alloca(&param.name, *ty);
            b.build_store(incoming, slot);
            self.scopes.declare(&param.name, slot).map_err(|e| {
                Box::new(e.at(body.location.clone(), body.span.clone())) as Box<dyn LucixErrorExt>
            })?;
        }
        self.lower_statement(body)
    }

    pub(crate) fn resolve_type(
        &self,
        name: &str,
        node: &AstNode,
    ) -> Result<IrType, Box<dyn LucixErrorExt>> {
        self.types
            .resolve(name)
            .map_err(|e| Box::new(e.at(node.location.clone())) as Box<dyn LucixErrorExt>)
    }

    pub(crate) fn builder_mut(
        &mut self,
        node: &AstNode,
    ) -> Result<&mut FunctionBuilder, Box<dyn LucixErrorExt>> {
        self.builder.as_mut().ok_or_else(|| {
            Box::new(InvalidValueError::new(
                "statement outside of a function body",
                node.location.clone(),
                node.span.clone(),
            )) as Box<dyn LucixErrorExt>
        })
    }
}
