//! Error types for the jsabstract analysis engine
//!
//! These are host-level faults. Simulated in-language exceptions never travel
//! through [`Error`]; they are carried as [`crate::runtime::Fault::Throw`] values.

use std::fmt;
use thiserror::Error;

/// Source location in JavaScript code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
    /// Byte offset in source
    pub offset: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Format a source context with caret pointer for errors
pub fn format_error_context(source: &str, location: &SourceLocation) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let line_idx = (location.line.saturating_sub(1)) as usize;

    if line_idx >= lines.len() {
        return String::new();
    }

    let mut result = String::new();
    let line_num_width = format!("{}", location.line + 1).len().max(3);

    // Show 1 line before if available
    if line_idx > 0 {
        result.push_str(&format!(
            "{:>width$} | {}\n",
            location.line - 1,
            lines[line_idx - 1],
            width = line_num_width
        ));
    }

    result.push_str(&format!(
        "{:>width$} | {}\n",
        location.line,
        lines[line_idx],
        width = line_num_width
    ));

    let pointer_offset = (location.column.saturating_sub(1)) as usize;
    result.push_str(&format!(
        "{:>width$} | {}^\n",
        "",
        " ".repeat(pointer_offset),
        width = line_num_width
    ));

    result
}

/// Main error type for jsabstract
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// Lexer error - invalid token or character
    #[error("SyntaxError: {message} at {location}{}", if source_context.is_empty() { String::new() } else { format!("\n{}", source_context) })]
    LexerError {
        message: String,
        location: SourceLocation,
        source_context: String,
    },

    /// Parser error - invalid syntax
    #[error("SyntaxError: {message} at {location}{}", if source_context.is_empty() { String::new() } else { format!("\n{}", source_context) })]
    ParseError {
        message: String,
        location: SourceLocation,
        source_context: String,
    },

    /// A classified fault raised by a built-in body.
    ///
    /// The native-call wrapper routes it through the diagnostic channel, which
    /// decides between a recoverable diagnostic and a simulated exception.
    #[error("{kind}: {message}")]
    Native { kind: ErrorKind, message: String },

    /// Internal engine error
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error
    #[error("IOError: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// Configuration could not be loaded
    #[error("ConfigError: {0}")]
    ConfigError(String),
}

/// JavaScript error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorKind {
    /// TypeError - wrong type for operation
    TypeError,
    /// ReferenceError - undefined variable
    ReferenceError,
    /// RangeError - value out of range
    RangeError,
    /// SyntaxError - invalid syntax at runtime (eval, JSON.parse)
    SyntaxError,
    /// EvalError - error in eval()
    EvalError,
    /// URIError - malformed URI
    UriError,
    /// Generic Error
    GenericError,
}

impl ErrorKind {
    /// The in-language `name` of errors of this kind
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::UriError => "URIError",
            ErrorKind::GenericError => "Error",
        }
    }

    /// Look up a kind by its in-language name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "TypeError" => Some(ErrorKind::TypeError),
            "ReferenceError" => Some(ErrorKind::ReferenceError),
            "RangeError" => Some(ErrorKind::RangeError),
            "SyntaxError" => Some(ErrorKind::SyntaxError),
            "EvalError" => Some(ErrorKind::EvalError),
            "URIError" => Some(ErrorKind::UriError),
            "Error" => Some(ErrorKind::GenericError),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Error {
    /// Create a new lexer error
    pub fn lexer_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Error::LexerError {
            message: message.into(),
            location,
            source_context: String::new(),
        }
    }

    /// Create a new lexer error with source context
    pub fn lexer_error_with_context(
        message: impl Into<String>,
        location: SourceLocation,
        source: &str,
    ) -> Self {
        Error::LexerError {
            message: message.into(),
            source_context: format_error_context(source, &location),
            location,
        }
    }

    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Error::ParseError {
            message: message.into(),
            location,
            source_context: String::new(),
        }
    }

    /// Create a new parse error with source context
    pub fn parse_error_with_context(
        message: impl Into<String>,
        location: SourceLocation,
        source: &str,
    ) -> Self {
        Error::ParseError {
            message: message.into(),
            source_context: format_error_context(source, &location),
            location,
        }
    }

    /// Create a classified built-in fault
    pub fn native(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error::Native {
            kind,
            message: message.into(),
        }
    }

    /// Create a TypeError fault
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::native(ErrorKind::TypeError, message)
    }

    /// Create a RangeError fault
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::native(ErrorKind::RangeError, message)
    }

    /// Create a URIError fault
    pub fn uri_error(message: impl Into<String>) -> Self {
        Self::native(ErrorKind::UriError, message)
    }

    /// Whether this error reports malformed source text
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Error::LexerError { .. } | Error::ParseError { .. })
    }

    /// The in-language error kind this fault surfaces as
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::LexerError { .. } | Error::ParseError { .. } => ErrorKind::SyntaxError,
            Error::Native { kind, .. } => *kind,
            _ => ErrorKind::GenericError,
        }
    }

    /// The bare message, without kind prefix, location or source context
    pub fn message(&self) -> String {
        match self {
            Error::LexerError { message, .. }
            | Error::ParseError { message, .. }
            | Error::Native { message, .. } => message.clone(),
            Error::InternalError(message) | Error::ConfigError(message) => message.clone(),
            Error::IoError { source } => source.to_string(),
        }
    }

    /// Add source context to an existing error
    pub fn with_source_context(self, source: &str) -> Self {
        match self {
            Error::LexerError {
                message, location, ..
            } => Error::LexerError {
                message,
                source_context: format_error_context(source, &location),
                location,
            },
            Error::ParseError {
                message, location, ..
            } => Error::ParseError {
                message,
                source_context: format_error_context(source, &location),
                location,
            },
            other => other,
        }
    }
}

/// Result type alias for jsabstract
pub type Result<T> = std::result::Result<T, Error>;

/// Standardized error message templates
pub mod messages {
    pub const NOT_A_FUNCTION: &str = "is not a function";
    pub const IS_NOT_DEFINED: &str = "is not defined";
    pub const MALFORMED_URI: &str = "URI malformed";
    pub const CIRCULAR_STRUCTURE: &str = "Converting circular structure to JSON";
    pub const MISSING_THROW_VALUE: &str = "Missing throw value";
    pub const MAXIMUM_CALL_STACK: &str = "Maximum call stack size exceeded";
    pub const INVALID_ASSIGNMENT_TARGET: &str = "Invalid left-hand side in assignment";
    pub const UNEXPECTED_END: &str = "Unexpected end of input";
    pub const INVALID_STRING_LENGTH: &str = "Invalid string length";

    /// Format a "X is not a function" error message
    pub fn not_a_function(name: &str) -> String {
        format!("{} {}", name, NOT_A_FUNCTION)
    }

    /// Format a "X is not defined" error message
    pub fn not_defined(name: &str) -> String {
        format!("{} {}", name, IS_NOT_DEFINED)
    }

    /// Format an "Unexpected token" error message
    pub fn unexpected_token(found: &str) -> String {
        format!("Unexpected token '{}'", found)
    }
}
