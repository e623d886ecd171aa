//! file: core/src/jit/pipeline.rs
//! description: per-unit optimize, verify, compile and run.
//!
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::config::Config;
use crate::error::{LucixErrorExt, boxed};
use crate::ir::lower::UnitSink;
use crate::ir::module::IrModule;
use crate::ir::opt::PassManager;
use crate::ir::types::IrType;
use crate::ir::verify::verify_module;

use super::err::BackendError;
use super::session::JitSession;

/// What happened to one function that went through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    pub name: String,
    pub unit: String,
    pub signature: String,
    pub ops_before: usize,
    pub ops_after: usize,
}

/// In-memory writer that can be cloned and read back after the pipeline
/// is done with it.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub struct ExecutionPipeline {
    session: JitSession,
    passes: PassManager,
    entry_point: String,
    print_ir: bool,
    print_optimized: bool,
    invoke: bool,
    diagnostics: Box<dyn Write>,
    output: Box<dyn Write>,
    compiled: Vec<CompiledFunction>,
    results: Vec<i32>,
}

impl ExecutionPipeline {
    /// Pipeline writing IR to stderr and program results to stdout.
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        Self::with_writers(
            config,
            Box::new(std::io::stderr()),
            Box::new(std::io::stdout()),
        )
    }

    pub fn with_writers(
        config: &Config,
        diagnostics: Box<dyn Write>,
        output: Box<dyn Write>,
    ) -> Result<Self, BackendError> {
        let passes = if config.optimize {
            PassManager::standard()
        } else {
            PassManager::empty()
        };
        log::debug!("pipeline passes: [{}]", passes.pass_names().join(", "));
        Ok(ExecutionPipeline {
            session: JitSession::new(config.backend_opt_level)?,
            passes,
            entry_point: config.entry_point.clone(),
            print_ir: config.print_ir,
            print_optimized: false,
            invoke: true,
            diagnostics,
            output,
            compiled: Vec::new(),
            results: Vec::new(),
        })
    }

    /// Also print each unit after optimization.
    pub fn print_optimized(mut self, enabled: bool) -> Self {
        self.print_optimized = enabled;
        self
    }

    /// Compile without calling the entry point.
    pub fn invoke_entry(mut self, enabled: bool) -> Self {
        self.invoke = enabled;
        self
    }

    fn emit_diagnostic(&mut self, text: &str) {
        if let Err(e) = writeln!(self.diagnostics, "{}", text) {
            log::warn!("cannot write IR dump: {}", e);
        }
    }

    /// Take one generated unit through the optimizer and into the JIT.
    /// Returns the entry point's result when this unit defined it.
    pub fn add_unit(&mut self, mut unit: IrModule) -> Result<Option<i32>, Box<dyn LucixErrorExt>> {
        if self.print_ir {
            self.emit_diagnostic(&unit.to_string());
        }

        let before: Vec<usize> = unit.functions.iter().map(|f| f.op_count()).collect();
        let changed = self.passes.run(&mut unit);
        log::debug!("unit '{}': {} pass(es) changed code", unit.name, changed);
        if self.print_optimized && !self.passes.is_empty() {
            let text = format!("; optimized\n{}", unit);
            self.emit_diagnostic(&text);
        }

        verify_module(&unit).map_err(|msg| boxed(BackendError::new(&unit.name, msg)))?;

        for (func, ops_before) in unit.functions.iter().zip(before) {
            self.compiled.push(CompiledFunction {
                name: func.name().to_string(),
                unit: unit.name.clone(),
                signature: func.prototype.to_string(),
                ops_before,
                ops_after: func.op_count(),
            });
        }

        let defines_entry = unit.defines(&self.entry_point);
        self.session.add_unit(unit).map_err(boxed)?;

        if !(self.invoke && defines_entry) {
            return Ok(None);
        }
        let value = self.call_entry()?;
        self.results.push(value);
        writeln!(self.output, "{}", value).map_err(|e| {
            boxed(BackendError::new(
                &self.entry_point,
                format!("cannot write result: {}", e),
            ))
        })?;
        Ok(Some(value))
    }

    fn call_entry(&self) -> Result<i32, Box<dyn LucixErrorExt>> {
        let name = &self.entry_point;
        match self.session.prototype(name) {
            Some(p) if p.params.is_empty() && p.ret == IrType::I32 => {}
            Some(p) => {
                return Err(Box::new(BackendError::new(
                    name,
                    format!("entry point must have signature i32 @{}(), found {}", name, p),
                )));
            }
            None => {
                return Err(Box::new(BackendError::new(name, "entry point was not compiled")));
            }
        }

        let code = self.session.lookup(name).map_err(boxed)?;
        log::info!("invoking @{}", name);
        // SAFETY: the prototype check above guarantees the function was
        // compiled as `fn() -> i32` with the host's default calling convention.
        let entry: extern "C" fn() -> i32 = unsafe { std::mem::transmute(code) };
        Ok(entry())
    }

    /// Address of any function compiled so far.
    pub fn lookup(&self, name: &str) -> Result<*const u8, Box<dyn LucixErrorExt>> {
        self.session.lookup(name).map_err(boxed)
    }

    pub fn session(&self) -> &JitSession {
        &self.session
    }

    pub fn compiled(&self) -> &[CompiledFunction] {
        &self.compiled
    }

    /// Values returned by each entry point invocation, in order.
    pub fn results(&self) -> &[i32] {
        &self.results
    }
}

impl UnitSink for ExecutionPipeline {
    fn accept_unit(&mut self, unit: IrModule) -> Result<(), Box<dyn LucixErrorExt>> {
        self.add_unit(unit).map(|_| ())
    }
}
