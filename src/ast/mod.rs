//! Abstract Syntax Tree (AST) types for the script subset
//!
//! The node types follow the ESTree shapes for the constructs the bundled
//! parser accepts.

mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

use crate::error::SourceLocation;
use std::rc::Rc;

/// A span in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start location
    pub start: SourceLocation,
    /// End location
    pub end: SourceLocation,
}

impl Span {
    /// Create a new span
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }
}

/// A complete script
#[derive(Debug, Clone)]
pub struct Program {
    /// The statements in the program
    pub body: Vec<Statement>,
    /// Whether the program starts with a "use strict" directive
    pub strict: bool,
    /// Span in source
    pub span: Span,
}

/// An identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// The name of the identifier
    pub name: String,
    /// Span in source
    pub span: Span,
}

impl Identifier {
    /// Create a new identifier
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A function declaration or expression
#[derive(Debug, Clone)]
pub struct Function {
    /// Function name (None for anonymous function expressions)
    pub id: Option<Identifier>,
    /// Parameter names
    pub params: Vec<Identifier>,
    /// Function body
    pub body: Vec<Statement>,
    /// Whether the body is strict code
    pub strict: bool,
    /// Span in source
    pub span: Span,
}

/// Functions are shared between the tree and the closures created from it
pub type FunctionRef = Rc<Function>;
