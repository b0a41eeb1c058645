//! Completion records and evaluator faults

use super::value::Value;
use crate::error::Error;

/// Outcome of evaluating a program fragment
#[derive(Debug, Clone)]
pub enum Completion {
    /// Normal completion, with the value of the last value-producing statement
    Normal(Option<Value>),
    /// Abrupt completion by a simulated throw
    Throw(Option<Value>),
}

impl Completion {
    /// The carried value, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            Completion::Normal(value) | Completion::Throw(value) => value.as_ref(),
        }
    }

    pub fn is_throw(&self) -> bool {
        matches!(self, Completion::Throw(_))
    }

    /// The normal value, Undefined for an empty normal completion
    pub fn normal_value(&self) -> Option<Value> {
        match self {
            Completion::Normal(value) => Some(value.clone().unwrap_or(Value::Undefined)),
            Completion::Throw(_) => None,
        }
    }
}

/// Why evaluation of an expression did not produce a value
#[derive(Debug)]
pub enum Fault {
    /// A simulated in-language throw carrying the thrown value
    Throw(Value),
    /// A host-level fault not yet classified by the diagnostic channel
    Internal(Error),
}

impl Fault {
    /// The thrown value, for simulated throws
    pub fn thrown(&self) -> Option<&Value> {
        match self {
            Fault::Throw(value) => Some(value),
            Fault::Internal(_) => None,
        }
    }
}

impl From<Error> for Fault {
    fn from(error: Error) -> Self {
        Fault::Internal(error)
    }
}
