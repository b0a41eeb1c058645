//! Script-defined functions

use super::{declare_body, execute_statements, Flow};
use crate::ast::FunctionRef;
use crate::error::{messages, ErrorKind};
use crate::runtime::{
    argument, CallOptions, Callable, Environment, ExecutionContext, Fault, Session, Value,
};
use std::rc::Rc;

/// A function value created from script source, closing over its environment
pub struct Closure {
    function: FunctionRef,
    env: Environment,
}

impl Closure {
    /// A function object for a declaration
    pub fn create(function: FunctionRef, env: Environment) -> Value {
        Value::new_function(Rc::new(Self { function, env }))
    }

    /// A function object for an expression; a named expression sees its own name
    pub fn create_expression(function: FunctionRef, env: Environment) -> Value {
        let Some(id) = function.id.clone() else {
            return Self::create(function, env);
        };
        let own_env = Environment::new_declarative(&env);
        let value = Self::create(function, own_env.clone());
        own_env.declare(&id.name, value.clone(), false);
        value
    }
}

impl Callable for Closure {
    fn call(
        &self,
        session: &mut Session,
        this: &Value,
        args: &[Value],
        _options: &CallOptions,
    ) -> Result<Value, Fault> {
        if session.call_depth_exceeded() {
            return session.recoverable(ErrorKind::RangeError, messages::MAXIMUM_CALL_STACK);
        }
        let function = &self.function;
        let env = Environment::new_declarative(&self.env);
        for (index, param) in function.params.iter().enumerate() {
            env.declare(&param.name, argument(args, index), true);
        }

        let this_value = match this {
            Value::Undefined | Value::Null if !function.strict => {
                Value::Object(session.global_object().clone())
            }
            other => other.clone(),
        };
        let context = ExecutionContext {
            lexical_env: env.clone(),
            variable_env: env.clone(),
            this_value,
            strict: function.strict,
            is_direct_eval: false,
            filename: session.current_context().filename.clone(),
        };
        tracing::trace!(function = self.name(), argc = args.len(), "script call");

        let mut scope = session.enter_context(context);
        declare_body(&mut scope, &function.body, &env, true);
        let flow = execute_statements(&mut scope, &function.body);
        drop(scope);
        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Normal(_) => Ok(Value::Undefined),
        }
    }

    fn arity(&self) -> usize {
        self.function.params.len()
    }

    fn name(&self) -> &str {
        self.function.id.as_ref().map_or("", |id| id.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AnalysisOptions;
    use crate::runtime::{Completion, Session, Value};

    fn run(session: &mut Session, source: &str) -> Completion {
        session.run(source).unwrap()
    }

    #[test]
    fn test_closure_captures_environment() {
        let mut session = Session::new(AnalysisOptions::default());
        let completion = run(
            &mut session,
            "function counter() { var n = 0; return function () { n = n + 1; return n; }; }\n\
             var c = counter(); c(); c()",
        );
        assert_eq!(completion.value(), Some(&Value::Number(2.0)));
        assert_eq!(session.context_depth(), 1);
    }

    #[test]
    fn test_sloppy_this_is_global_object() {
        let mut session = Session::new(AnalysisOptions::default());
        let completion = run(&mut session, "function f() { return this; } f() === this");
        assert_eq!(completion.value(), Some(&Value::Boolean(true)));
        let completion = run(&mut session, "function g() { 'use strict'; return this; } g()");
        assert_eq!(completion.value(), Some(&Value::Undefined));
    }

    #[test]
    fn test_named_function_expression_recursion() {
        let mut session = Session::new(AnalysisOptions::default());
        let completion = run(
            &mut session,
            "var fact = function f(n) { return n < 2 ? 1 : n * f(n - 1); }; fact(5)",
        );
        assert_eq!(completion.value(), Some(&Value::Number(120.0)));
    }

    #[test]
    fn test_call_depth_limit_is_a_range_error() {
        let options = AnalysisOptions::default().with_max_call_depth(16);
        let mut session = Session::new(options);
        let completion = run(&mut session, "function f() { return f(); } f()");
        assert!(matches!(completion, Completion::Normal(Some(Value::Unknown))));
        let diagnostic = &session.diagnostics()[0];
        assert_eq!(diagnostic.kind, crate::error::ErrorKind::RangeError);
        assert!(diagnostic.is_recovered());
        assert_eq!(session.context_depth(), 1);
    }
}
