//! Abstract runtime for jsabstract
//!
//! This module provides the value model, the conversion operators, the
//! evaluation session with its context stack and diagnostic channel, and the
//! global built-ins.

pub mod builtins;
mod completion;
mod context;
pub mod convert;
mod diagnostics;
mod native;
mod session;
mod value;

pub use completion::{Completion, Fault};
pub use context::{Assignment, ContextScope, Environment, ExecutionContext};
pub use diagnostics::{Diagnostic, DiagnosticSink, Disposition};
pub use native::{argument, guarded, CallOptions, Callable, NativeBody, NativeFunction};
pub use session::{Program, Session, SourceParser};
pub use value::{
    any_unknown, array_index, Attributes, Extent, Object, ObjectClass, ObjectRef, PropertyDescriptor,
    Value, ValueType, MAX_WALKED_LENGTH,
};
