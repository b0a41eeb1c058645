//! jsabstract: the ECMAScript value model and global built-ins for abstract interpretation
//!
//! jsabstract evaluates JavaScript without trusting it to run. Anything that
//! cannot be derived statically is carried as [`Value::Unknown`], which every
//! operator and built-in absorbs. Built-in faults are either recorded as
//! recoverable diagnostics (the default) or surfaced as simulated in-language
//! exceptions (exact mode, or inside a `try` block).
//!
//! # Quick Start
//!
//! ```no_run
//! use jsabstract::{AnalysisOptions, Completion, Session};
//!
//! fn main() -> jsabstract::Result<()> {
//!     let mut session = Session::new(AnalysisOptions::default());
//!     let completion = session.run("JSON.stringify({a: [1, 2]})")?;
//!     if let Completion::Normal(Some(value)) = completion {
//!         println!("{}", value);
//!     }
//!     for diagnostic in session.diagnostics() {
//!         eprintln!("{}", diagnostic);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! The pipeline flows: Source → [`lexer`] → [`parser`] → [`ast`] → [`interpreter`] → [`runtime`] → Completion
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Front end** | [`lexer`], [`parser`], [`ast`] |
//! | **Evaluation** | [`interpreter`], [`runtime`] |
//! | **Ambient** | [`config`], [`error`](Error) |
#![allow(clippy::enum_variant_names)]

pub mod ast;
pub mod config;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod prelude;
pub mod runtime;

mod error;

pub use config::AnalysisOptions;
pub use error::{format_error_context, messages, Error, ErrorKind, Result, SourceLocation};
pub use runtime::{Completion, Diagnostic, Disposition, Fault, Session, Value};

/// jsabstract version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
