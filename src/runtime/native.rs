//! Native-call protocol
//!
//! Built-in bodies are plain functions wrapped once by [`guarded`]. The wrapper
//! enforces the Unknown pre-check and hands unclassified faults to the
//! session's diagnostic channel, so a body only has to implement the concrete
//! algorithm.

use super::completion::Fault;
use super::session::Session;
use super::value::{any_unknown, Value};
use std::fmt;
use std::rc::Rc;

/// Per-call options supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Source filename for code evaluated by the call
    pub filename: Option<String>,
    /// The call is a direct call to the global `eval`
    pub is_direct_eval: bool,
}

impl CallOptions {
    pub fn direct_eval() -> Self {
        Self {
            is_direct_eval: true,
            ..Self::default()
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// The executable body of a function object
pub trait Callable {
    /// Invoke with a receiver and ordered arguments
    fn call(
        &self,
        session: &mut Session,
        this: &Value,
        args: &[Value],
        options: &CallOptions,
    ) -> Result<Value, Fault>;

    /// Declared parameter count (the function's `length`)
    fn arity(&self) -> usize;

    /// Function name, empty for anonymous functions
    fn name(&self) -> &str;
}

/// Signature of a built-in body
pub type NativeBody =
    fn(&mut Session, &Value, &[Value], &CallOptions) -> Result<Value, Fault>;

/// A built-in function
pub struct NativeFunction {
    name: &'static str,
    arity: usize,
    body: NativeBody,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Wrap a built-in body in the native-call protocol
pub fn guarded(name: &'static str, arity: usize, body: NativeBody) -> Rc<dyn Callable> {
    Rc::new(NativeFunction { name, arity, body })
}

impl Callable for NativeFunction {
    fn call(
        &self,
        session: &mut Session,
        this: &Value,
        args: &[Value],
        options: &CallOptions,
    ) -> Result<Value, Fault> {
        if this.is_unknown() || any_unknown(args) {
            tracing::trace!(function = self.name, "unknown operand, body skipped");
            return Ok(Value::Unknown);
        }
        tracing::trace!(function = self.name, argc = args.len(), "native call");
        match (self.body)(session, this, args, options) {
            Err(Fault::Internal(error)) => session.recoverable(error.kind(), error.message()),
            other => other,
        }
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// The argument at `index`, Undefined when absent
pub fn argument(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}
