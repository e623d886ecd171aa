//! file: core/src/jit/session.rs
//! description: long-lived Cranelift JIT session.
//!
//! Every unit is compiled into the same `JITModule`, so functions defined by
//! earlier units stay callable from later ones. A unit's extern declarations
//! must name functions the session already holds.
//!
use std::collections::HashMap;

use cranelift_codegen::isa::OwnedTargetIsa;
use cranelift_codegen::settings::{self, Configurable};
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId, Linkage, Module};

use crate::config::BackendOptLevel;
use crate::ir::module::{FunctionPrototype, IrModule};

use super::err::{BackendError, LookupError};
use super::translate::{lower_function, make_signature};

struct CompiledSymbol {
    id: FuncId,
    prototype: FunctionPrototype,
    unit: String,
}

pub struct JitSession {
    module: JITModule,
    symbols: HashMap<String, CompiledSymbol>,
    units: Vec<String>,
}

fn build_native_isa(opt_level: BackendOptLevel) -> Result<OwnedTargetIsa, BackendError> {
    let flag_error = |err: settings::SetError| {
        BackendError::new("<session>", format!("failed to set Cranelift flag: {}", err))
    };
    let mut flags = settings::builder();
    flags.set("use_colocated_libcalls", "false").map_err(flag_error)?;
    flags.set("is_pic", "false").map_err(flag_error)?;
    flags.set("opt_level", opt_level.as_flag()).map_err(flag_error)?;

    let isa_builder = cranelift_native::builder().map_err(|msg| {
        BackendError::new(
            "<session>",
            format!("host machine is not supported by Cranelift: {}", msg),
        )
    })?;

    isa_builder
        .finish(settings::Flags::new(flags))
        .map_err(|err| BackendError::new("<session>", err.to_string()))
}

impl JitSession {
    pub fn new(opt_level: BackendOptLevel) -> Result<Self, BackendError> {
        let isa = build_native_isa(opt_level)?;
        let builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
        log::debug!("jit session created (opt_level = {})", opt_level.as_flag());
        Ok(JitSession {
            module: JITModule::new(builder),
            symbols: HashMap::new(),
            units: Vec::new(),
        })
    }

    /// Compile and link `unit`. Returns the names it defined.
    pub fn add_unit(&mut self, unit: IrModule) -> Result<Vec<String>, BackendError> {
        let unit_error = |message: String| BackendError::new(&unit.name, message);

        for func in &unit.functions {
            if let Some(existing) = self.symbols.get(func.name()) {
                return Err(unit_error(format!(
                    "symbol '{}' is already defined by unit '{}'",
                    func.name(),
                    existing.unit
                )));
            }
        }

        let mut ids: HashMap<String, FuncId> = HashMap::new();
        for decl in &unit.declarations {
            let known = self.symbols.get(&decl.name).ok_or_else(|| {
                unit_error(format!(
                    "extern '{}' does not name a function in the session",
                    decl.name
                ))
            })?;
            if known.prototype != *decl {
                return Err(unit_error(format!(
                    "extern '{}' is declared as {} but defined as {}",
                    decl.name, decl, known.prototype
                )));
            }
            let sig = make_signature(&self.module, decl);
            let id = self
                .module
                .declare_function(&decl.name, Linkage::Import, &sig)
                .map_err(|e| unit_error(e.to_string()))?;
            ids.insert(decl.name.clone(), id);
        }

        for func in &unit.functions {
            let sig = make_signature(&self.module, &func.prototype);
            let id = self
                .module
                .declare_function(func.name(), Linkage::Export, &sig)
                .map_err(|e| unit_error(e.to_string()))?;
            ids.insert(func.name().to_string(), id);
        }

        let mut context = self.module.make_context();
        let mut builder_context = FunctionBuilderContext::new();
        for func in &unit.functions {
            let id = ids[func.name()];
            context.func.signature = make_signature(&self.module, &func.prototype);
            {
                let mut builder = FunctionBuilder::new(&mut context.func, &mut builder_context);
                lower_function(&mut self.module, func, &ids, &mut builder)
                    .map_err(|msg| unit_error(format!("in @{}: {}", func.name(), msg)))?;
                builder.seal_all_blocks();
                builder.finalize();
            }
            self.module
                .define_function(id, &mut context)
                .map_err(|e| unit_error(format!("in @{}: {:?}", func.name(), e)))?;
            self.module.clear_context(&mut context);
        }

        self.module
            .finalize_definitions()
            .map_err(|e| unit_error(e.to_string()))?;

        let mut defined = Vec::with_capacity(unit.functions.len());
        for func in &unit.functions {
            let name = func.name().to_string();
            self.symbols.insert(
                name.clone(),
                CompiledSymbol {
                    id: ids[&name],
                    prototype: func.prototype.clone(),
                    unit: unit.name.clone(),
                },
            );
            defined.push(name);
        }
        log::info!("unit '{}' linked: {}", unit.name, defined.join(", "));
        self.units.push(unit.name);
        Ok(defined)
    }

    /// Address of a finalized function.
    pub fn lookup(&self, name: &str) -> Result<*const u8, LookupError> {
        let symbol = self.symbols.get(name).ok_or_else(|| LookupError {
            name: name.to_string(),
        })?;
        Ok(self.module.get_finalized_function(symbol.id))
    }

    pub fn prototype(&self, name: &str) -> Option<&FunctionPrototype> {
        self.symbols.get(name).map(|s| &s.prototype)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Names of the units linked so far, in order.
    pub fn units(&self) -> &[String] {
        &self.units
    }
}
