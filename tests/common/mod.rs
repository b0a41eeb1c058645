//! Shared test helpers for integration tests

#![allow(dead_code)]

use jsabstract::{AnalysisOptions, Completion, Session, Value};

/// A session with the default (fault-tolerant, inexact) options
pub fn session() -> Session {
    Session::new(AnalysisOptions::default())
}

/// A session in exact mode, where built-in faults are simulated throws
pub fn exact_session() -> Session {
    Session::new(AnalysisOptions::exact())
}

/// Run code in a fresh default session and return its normal value
pub fn run_js(code: &str) -> Value {
    let mut session = session();
    run_in(&mut session, code)
}

/// Run code in `session` and return its normal value
pub fn run_in(session: &mut Session, code: &str) -> Value {
    match session.run(code) {
        Ok(Completion::Normal(value)) => value.unwrap_or(Value::Undefined),
        Ok(Completion::Throw(value)) => panic!("uncaught throw: {:?}", value),
        Err(e) => panic!("host error: {}", e),
    }
}

/// Run code in `session`, expecting an uncaught simulated throw
pub fn run_throw(session: &mut Session, code: &str) -> Value {
    match session.run(code) {
        Ok(Completion::Throw(Some(value))) => value,
        other => panic!("expected a throw, got {:?}", other),
    }
}

/// Run code and expect a string result
pub fn run_string(code: &str) -> String {
    match run_js(code) {
        Value::String(s) => s,
        other => panic!("expected a string, got {:?}", other),
    }
}

/// Run code and expect a number result
pub fn run_number(code: &str) -> f64 {
    match run_js(code) {
        Value::Number(n) => n,
        other => panic!("expected a number, got {:?}", other),
    }
}

/// The `name` and `message` of a thrown error object
pub fn error_parts(value: &Value) -> (String, String) {
    let name = value.get_property("name");
    let message = value.get_property("message");
    (
        name.as_str().unwrap_or_default().to_string(),
        message.as_str().unwrap_or_default().to_string(),
    )
}
