//! Tool-level diagnostics
//!
//! A diagnostic is recorded for every fault the built-ins raise. Its
//! [`Disposition`] says whether analysis recovered with an Unknown result or
//! the fault was turned into a simulated exception.

use crate::error::ErrorKind;
use std::fmt;

/// What became of a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Swallowed; the faulting expression evaluated to Unknown
    Recovered,
    /// Propagated as a simulated in-language throw
    Thrown,
}

/// A tool-level fault report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub filename: String,
    pub disposition: Disposition,
}

impl Diagnostic {
    pub fn is_recovered(&self) -> bool {
        self.disposition == Disposition::Recovered
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let disposition = match self.disposition {
            Disposition::Recovered => "recovered",
            Disposition::Thrown => "thrown",
        };
        write!(
            f,
            "{}: {}: {} ({})",
            self.filename, self.kind, self.message, disposition
        )
    }
}

/// Receiver of diagnostics as they are reported
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

impl<F: FnMut(&Diagnostic)> DiagnosticSink for F {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}
