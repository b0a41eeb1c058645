//! Prelude module for convenient imports
//!
//! ```no_run
//! use jsabstract::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut session = Session::new(AnalysisOptions::exact());
//!     let completion = session.run("parseInt('ff', 16)")?;
//!     println!("{:?}", completion);
//!     Ok(())
//! }
//! ```

// Session and values
pub use crate::runtime::{
    Completion, Fault, Object, ObjectClass, ObjectRef, Session, Value, ValueType,
};

// Built-in protocol
pub use crate::runtime::{guarded, Attributes, CallOptions, Callable, Program, SourceParser};

// Diagnostics
pub use crate::runtime::{Diagnostic, DiagnosticSink, Disposition};

// Configuration
pub use crate::config::AnalysisOptions;

// Error handling
pub use crate::error::{Error, ErrorKind, Result, SourceLocation};
