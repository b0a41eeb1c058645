//! Evaluation session
//!
//! A [`Session`] owns everything one abstract evaluation needs: the mode
//! flags, the context stack, the global environment, the diagnostics reported
//! so far and the source parser used by `eval`. It is threaded explicitly
//! through every call; there is no process-wide state.

use super::builtins;
use super::completion::{Completion, Fault};
use super::context::{ContextScope, Environment, ExecutionContext};
use super::diagnostics::{Diagnostic, DiagnosticSink, Disposition};
use super::native::CallOptions;
use super::value::{Object, ObjectClass, ObjectRef, Value};
use crate::config::AnalysisOptions;
use crate::error::{messages, ErrorKind, Result};
use crate::interpreter::ScriptParser;
use std::rc::Rc;

/// A parsed program fragment ready for evaluation
pub trait Program {
    /// Whether the code begins with a `"use strict"` directive
    fn is_strict(&self) -> bool;

    /// Evaluate in the session's current context
    fn evaluate(&self, session: &mut Session) -> Completion;
}

/// Source-text parser collaborator
pub trait SourceParser {
    /// Parse source text; syntax errors are reported as `Err`
    fn parse(&self, source: &str, filename: &str) -> Result<Rc<dyn Program>>;
}

/// One abstract evaluation session
pub struct Session {
    options: AnalysisOptions,
    global_object: ObjectRef,
    global_context: ExecutionContext,
    contexts: Vec<ExecutionContext>,
    diagnostics: Vec<Diagnostic>,
    sink: Option<Box<dyn DiagnosticSink>>,
    parser: Rc<dyn SourceParser>,
    try_depth: usize,
}

impl Session {
    /// Create a session using the bundled script parser
    pub fn new(options: AnalysisOptions) -> Self {
        Self::with_parser(options, Rc::new(ScriptParser))
    }

    /// Create a session with a custom source parser
    pub fn with_parser(options: AnalysisOptions, parser: Rc<dyn SourceParser>) -> Self {
        let global_object = ObjectRef::new(Object::new(ObjectClass::Object));
        builtins::install(&global_object);
        let global_env = Environment::global(global_object.clone());
        let global_context = ExecutionContext {
            lexical_env: global_env.clone(),
            variable_env: global_env,
            this_value: Value::Object(global_object.clone()),
            strict: false,
            is_direct_eval: false,
            filename: options.default_filename.clone(),
        };
        Self {
            options,
            global_object,
            global_context,
            contexts: Vec::new(),
            diagnostics: Vec::new(),
            sink: None,
            parser,
            try_depth: 0,
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn global_object(&self) -> &ObjectRef {
        &self.global_object
    }

    pub fn global_env(&self) -> &Environment {
        &self.global_context.lexical_env
    }

    /// Install a sink that receives each diagnostic as it is reported
    pub fn set_sink(&mut self, sink: Box<dyn DiagnosticSink>) {
        self.sink = Some(sink);
    }

    /// Diagnostics reported so far, in order
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // ---- Context stack ----

    /// The current (top) context
    pub fn current_context(&self) -> &ExecutionContext {
        self.contexts.last().unwrap_or(&self.global_context)
    }

    /// Number of contexts on the stack, the global context included
    pub fn context_depth(&self) -> usize {
        self.contexts.len() + 1
    }

    /// Push a context; it is popped when the returned scope is dropped
    pub fn enter_context(&mut self, context: ExecutionContext) -> ContextScope<'_> {
        let depth = self.contexts.len();
        self.contexts.push(context);
        tracing::trace!(depth = depth + 2, "enter context");
        ContextScope::new(self, depth)
    }

    /// Push the context for evaluating `eval` code
    ///
    /// Direct eval code sees the caller's environments; indirect eval code runs
    /// against the global environment. Strict eval code gets its own variable
    /// environment.
    pub fn enter_eval_context(
        &mut self,
        strict: bool,
        is_direct_eval: bool,
        filename: String,
    ) -> ContextScope<'_> {
        let caller = self.current_context();
        let strict = strict || (is_direct_eval && caller.strict);
        let (outer, variable_env, this_value) = if is_direct_eval {
            (
                caller.lexical_env.clone(),
                caller.variable_env.clone(),
                caller.this_value.clone(),
            )
        } else {
            (
                self.global_env().clone(),
                self.global_env().clone(),
                Value::Object(self.global_object.clone()),
            )
        };
        let lexical_env = Environment::new_declarative(&outer);
        let variable_env = if strict { lexical_env.clone() } else { variable_env };
        self.enter_context(ExecutionContext {
            lexical_env,
            variable_env,
            this_value,
            strict,
            is_direct_eval,
            filename,
        })
    }

    /// Replace the lexical environment of the current context (block scoping)
    pub(crate) fn swap_lexical_env(&mut self, env: Environment) -> Environment {
        let context = self.contexts.last_mut().unwrap_or(&mut self.global_context);
        std::mem::replace(&mut context.lexical_env, env)
    }

    pub(crate) fn leave_context(&mut self, depth: usize) {
        self.contexts.truncate(depth);
        tracing::trace!(depth = depth + 1, "leave context");
    }

    /// Whether another nested call would exceed the configured limit
    pub fn call_depth_exceeded(&self) -> bool {
        self.context_depth() > self.options.max_call_depth
    }

    // ---- Diagnostic / exception channel ----

    /// Whether evaluation is inside a simulated try block
    pub fn in_try(&self) -> bool {
        self.try_depth > 0
    }

    /// Run `f` as the body of a simulated try block
    pub fn within_try<T>(&mut self, f: impl FnOnce(&mut Session) -> T) -> T {
        self.try_depth += 1;
        let result = f(self);
        self.try_depth -= 1;
        result
    }

    /// Route a built-in fault through the channel
    ///
    /// In fault-tolerant inexact mode, outside any try block, the fault is
    /// recorded as a recovered diagnostic and the result is Unknown. Otherwise
    /// it becomes a simulated exception.
    pub fn recoverable(&mut self, kind: ErrorKind, message: impl Into<String>) -> std::result::Result<Value, Fault> {
        let message = message.into();
        if self.options.allows_recovery() && !self.in_try() {
            self.report_recovered(kind, message);
            Ok(Value::Unknown)
        } else {
            Err(self.throw_native(kind.name(), message))
        }
    }

    /// Report a recovered diagnostic unconditionally
    pub fn report_recovered(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.report(kind, message.into(), Disposition::Recovered);
    }

    /// Build a simulated throw of an error object with the given name
    pub fn throw_native(&mut self, name: &str, message: impl Into<String>) -> Fault {
        let message = message.into();
        let kind = ErrorKind::from_name(name).unwrap_or(ErrorKind::GenericError);
        let error = Value::new_error(name, &message);
        self.report(kind, message, Disposition::Thrown);
        Fault::Throw(error)
    }

    fn report(&mut self, kind: ErrorKind, message: String, disposition: Disposition) {
        let filename = self.current_context().filename.clone();
        match disposition {
            Disposition::Recovered => {
                tracing::warn!(kind = %kind, message = %message, filename = %filename, "recovered fault")
            }
            Disposition::Thrown => {
                tracing::debug!(kind = %kind, message = %message, filename = %filename, "simulated throw")
            }
        }
        let diagnostic = Diagnostic {
            kind,
            message,
            filename,
            disposition,
        };
        if let Some(sink) = self.sink.as_mut() {
            sink.report(&diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }

    /// Turn an evaluator result into a completion
    ///
    /// Unclassified host faults are routed through the channel first.
    pub fn settle(&mut self, result: std::result::Result<Value, Fault>) -> Completion {
        match result {
            Ok(value) => Completion::Normal(Some(value)),
            Err(Fault::Throw(value)) => Completion::Throw(Some(value)),
            Err(Fault::Internal(error)) => {
                let routed = self.recoverable(error.kind(), error.message());
                self.settle(routed)
            }
        }
    }

    // ---- Invocation ----

    /// Invoke a callee
    ///
    /// Calling Unknown yields Unknown. Calling a value without a callable body
    /// raises a simulated TypeError.
    pub fn call_function(
        &mut self,
        callee: &Value,
        this: &Value,
        args: &[Value],
        options: &CallOptions,
    ) -> std::result::Result<Value, Fault> {
        let callable = match callee {
            Value::Unknown => return Ok(Value::Unknown),
            Value::Object(obj) => obj.callable(),
            _ => None,
        };
        match callable {
            Some(callable) => callable.call(self, this, args, options),
            None => {
                let description = match callee {
                    Value::String(s) => format!("\"{}\"", s),
                    other => other.to_string(),
                };
                Err(self.throw_native(ErrorKind::TypeError.name(), messages::not_a_function(&description)))
            }
        }
    }

    /// Invoke a callee and report the outcome as a completion
    pub fn call(&mut self, callee: &Value, this: &Value, args: &[Value]) -> Completion {
        let result = self.call_function(callee, this, args, &CallOptions::default());
        self.settle(result)
    }

    /// Invoke a global function by name with an undefined receiver
    pub fn call_global(&mut self, name: &str, args: &[Value]) -> Completion {
        let callee = self.global_object.get(name);
        self.call(&callee, &Value::Undefined, args)
    }

    /// Parse source text with the session's parser
    pub fn parse(&self, source: &str, filename: &str) -> Result<Rc<dyn Program>> {
        self.parser.parse(source, filename)
    }

    /// Evaluate top-level code under the default filename
    pub fn run(&mut self, source: &str) -> Result<Completion> {
        let filename = self.options.default_filename.clone();
        self.run_file(source, &filename)
    }

    /// Evaluate top-level code in the global environment
    ///
    /// Syntax errors in the top-level code are host errors, not diagnostics.
    pub fn run_file(&mut self, source: &str, filename: &str) -> Result<Completion> {
        let program = self
            .parse(source, filename)
            .map_err(|e| e.with_source_context(source))?;
        let global_env = self.global_env().clone();
        let context = ExecutionContext {
            lexical_env: global_env.clone(),
            variable_env: global_env,
            this_value: Value::Object(self.global_object.clone()),
            strict: program.is_strict(),
            is_direct_eval: false,
            filename: filename.to_string(),
        };
        let mut scope = self.enter_context(context);
        let completion = program.evaluate(&mut scope);
        Ok(completion)
    }
}
