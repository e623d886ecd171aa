//! Native code generation: a Cranelift JIT session and the pipeline that
//! feeds generated units into it.
pub mod err;
pub mod pipeline;
pub mod session;
mod translate;

pub use self::err::{BackendError, LookupError};
pub use self::pipeline::{CompiledFunction, ExecutionPipeline, SharedBuffer};
pub use self::session::JitSession;
