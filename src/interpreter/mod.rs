//! Abstract tree-walking interpreter
//!
//! This is the default [`SourceParser`] collaborator: it parses script text
//! with the bundled parser and evaluates the tree against a [`Session`].
//! Values that cannot be derived statically are carried as
//! [`Value::Unknown`] and absorbed by every operator.

mod expr;
mod function;
mod operators;
mod widen;

pub use function::Closure;
pub use operators::{binary_operation, loose_equals};

use crate::ast::{self, Statement, VariableKind};
use crate::error::Result;
use crate::parser;
use crate::runtime::convert::truthiness;
use crate::runtime::{Completion, Environment, Fault, Program, Session, SourceParser, Value};
use std::rc::Rc;

/// Parser for the bundled script subset
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptParser;

impl SourceParser for ScriptParser {
    fn parse(&self, source: &str, filename: &str) -> Result<Rc<dyn Program>> {
        tracing::trace!(filename, len = source.len(), "parse script");
        let program = parser::parse(source)?;
        Ok(Rc::new(Script { program }))
    }
}

/// A parsed script ready for evaluation
#[derive(Debug)]
pub struct Script {
    program: ast::Program,
}

impl Script {
    pub fn new(program: ast::Program) -> Self {
        Self { program }
    }
}

impl Program for Script {
    fn is_strict(&self) -> bool {
        self.program.strict
    }

    fn evaluate(&self, session: &mut Session) -> Completion {
        let variable_env = session.current_context().variable_env.clone();
        declare_body(session, &self.program.body, &variable_env, true);
        match execute_statements(session, &self.program.body) {
            Ok(Flow::Normal(value)) => Completion::Normal(value),
            Ok(Flow::Return(value)) => Completion::Normal(Some(value)),
            Err(fault) => session.settle(Err(fault)),
        }
    }
}

/// How a statement completed
#[derive(Debug)]
pub(crate) enum Flow {
    /// Normal completion with the value of the last value-producing statement
    Normal(Option<Value>),
    Return(Value),
}

pub(crate) type Exec = std::result::Result<Flow, Fault>;

/// Instantiate the declarations of a body in `env`
///
/// `var` names are created (as Undefined) and function declarations are bound
/// to fresh closures before any statement runs.
pub(crate) fn declare_body(
    session: &mut Session,
    body: &[Statement],
    env: &Environment,
    variable_scope: bool,
) {
    if variable_scope {
        let mut names = Vec::new();
        collect_var_names(body, &mut names);
        for name in names {
            env.declare_var(name, None);
        }
    }
    for statement in body {
        if let Statement::FunctionDeclaration(function) = statement {
            let Some(id) = &function.id else { continue };
            let lexical_env = session.current_context().lexical_env.clone();
            let closure = Closure::create(function.clone(), lexical_env);
            if variable_scope {
                env.declare_var(&id.name, Some(closure));
            } else {
                env.declare(&id.name, closure, true);
            }
        }
    }
}

fn collect_var_names<'a>(body: &'a [Statement], names: &mut Vec<&'a str>) {
    for statement in body {
        collect_statement_var_names(statement, names);
    }
}

fn collect_statement_var_names<'a>(statement: &'a Statement, names: &mut Vec<&'a str>) {
    match statement {
        Statement::VariableDeclaration(decl) if decl.kind == VariableKind::Var => {
            names.extend(decl.declarations.iter().map(|d| d.id.name.as_str()));
        }
        Statement::Block(body) => collect_var_names(body, names),
        Statement::If(stmt) => {
            collect_statement_var_names(&stmt.consequent, names);
            if let Some(alternate) = &stmt.alternate {
                collect_statement_var_names(alternate, names);
            }
        }
        Statement::Try(stmt) => {
            collect_var_names(&stmt.block, names);
            if let Some(handler) = &stmt.handler {
                collect_var_names(&handler.body, names);
            }
            if let Some(finalizer) = &stmt.finalizer {
                collect_var_names(finalizer, names);
            }
        }
        _ => {}
    }
}

/// Execute a statement list, stopping at the first abrupt completion
pub(crate) fn execute_statements(session: &mut Session, body: &[Statement]) -> Exec {
    let mut last = None;
    for statement in body {
        match execute(session, statement)? {
            Flow::Normal(Some(value)) => last = Some(value),
            Flow::Normal(None) => {}
            flow @ Flow::Return(_) => return Ok(flow),
        }
    }
    Ok(Flow::Normal(last))
}

fn execute(session: &mut Session, statement: &Statement) -> Exec {
    match statement {
        Statement::Block(body) => execute_block(session, body, None),
        Statement::Empty | Statement::FunctionDeclaration(_) => Ok(Flow::Normal(None)),
        Statement::Expression(expression) => {
            expr::evaluate(session, expression).map(|value| Flow::Normal(Some(value)))
        }
        Statement::VariableDeclaration(decl) => {
            for declarator in &decl.declarations {
                let name = declarator.id.name.as_str();
                match decl.kind {
                    VariableKind::Var => {
                        if let Some(init) = &declarator.init {
                            let value = expr::evaluate(session, init)?;
                            expr::assign_identifier(session, name, value)?;
                        }
                    }
                    VariableKind::Let | VariableKind::Const => {
                        let value = match &declarator.init {
                            Some(init) => expr::evaluate(session, init)?,
                            None => Value::Undefined,
                        };
                        let env = session.current_context().lexical_env.clone();
                        env.declare(name, value, decl.kind == VariableKind::Let);
                    }
                }
            }
            Ok(Flow::Normal(None))
        }
        Statement::If(stmt) => {
            let test = expr::evaluate(session, &stmt.test)?;
            match truthiness(&test) {
                Some(true) => execute(session, &stmt.consequent),
                Some(false) => match &stmt.alternate {
                    Some(alternate) => execute(session, alternate),
                    None => Ok(Flow::Normal(None)),
                },
                None => {
                    tracing::trace!("unknown condition, both branches skipped");
                    widen::statement(session, &stmt.consequent);
                    if let Some(alternate) = &stmt.alternate {
                        widen::statement(session, alternate);
                    }
                    Ok(Flow::Normal(Some(Value::Unknown)))
                }
            }
        }
        Statement::Return(argument) => {
            let value = match argument {
                Some(argument) => expr::evaluate(session, argument)?,
                None => Value::Undefined,
            };
            Ok(Flow::Return(value))
        }
        Statement::Throw(argument) => {
            let value = expr::evaluate(session, argument)?;
            Err(Fault::Throw(value))
        }
        Statement::Try(stmt) => execute_try(session, stmt),
    }
}

/// Run a block in a fresh declarative environment, optionally binding a name
fn execute_block(session: &mut Session, body: &[Statement], binding: Option<(&str, Value)>) -> Exec {
    let outer = session.current_context().lexical_env.clone();
    let env = Environment::new_declarative(&outer);
    if let Some((name, value)) = binding {
        env.declare(name, value, true);
    }
    let outer = session.swap_lexical_env(env.clone());
    declare_body(session, body, &env, false);
    let result = execute_statements(session, body);
    session.swap_lexical_env(outer);
    result
}

fn execute_try(session: &mut Session, stmt: &ast::TryStatement) -> Exec {
    let mut result = session.within_try(|session| execute_block(session, &stmt.block, None));

    if let Err(Fault::Internal(error)) = result {
        result = Err(session.throw_native(error.kind().name(), error.message()));
    }

    if let Some(handler) = &stmt.handler {
        if let Err(Fault::Throw(thrown)) = result {
            let binding = handler.param.as_ref().map(|param| (param.name.as_str(), thrown));
            result = execute_block(session, &handler.body, binding);
        }
    }

    if let Some(finalizer) = &stmt.finalizer {
        match execute_block(session, finalizer, None)? {
            Flow::Normal(_) => {}
            flow @ Flow::Return(_) => return Ok(flow),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisOptions;

    fn run(source: &str) -> Completion {
        let mut session = Session::new(AnalysisOptions::default());
        session.run(source).unwrap()
    }

    fn number(source: &str) -> f64 {
        match run(source) {
            Completion::Normal(Some(Value::Number(n))) => n,
            other => panic!("Expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_completion_value_is_last_value_statement() {
        assert_eq!(number("1; 2; var x = 3;"), 2.0);
        assert!(matches!(run("var x;"), Completion::Normal(None)));
    }

    #[test]
    fn test_var_and_function_hoisting() {
        assert_eq!(number("f(); function f() { return x; } var x = 4; x"), 4.0);
        assert!(matches!(
            run("var r = y; var y = 1; r"),
            Completion::Normal(Some(Value::Undefined))
        ));
    }

    #[test]
    fn test_block_scoping() {
        assert_eq!(number("let a = 1; { let a = 2; } a"), 1.0);
        assert_eq!(number("var b = 1; { var b = 2; } b"), 2.0);
    }

    #[test]
    fn test_unknown_condition_skips_branches() {
        let completion = run("var hit = 0; if (Math.random()) { hit = 1 } else { hit = 2 }");
        assert!(matches!(completion, Completion::Normal(Some(Value::Unknown))));
    }

    #[test]
    fn test_skipped_branches_widen_their_writes() {
        let widened = |source: &str| matches!(run(source), Completion::Normal(Some(Value::Unknown)));
        assert!(widened("var hit = 0; if (Math.random()) { hit = 1 } hit"));
        assert!(widened("var hit = 0; if (Math.random()) {} else { hit = 2 } hit"));
        assert!(widened("var o = {n: 0}; if (Math.random()) { o.n = 1 } o.n"));
        assert!(widened("var o = {}; if (Math.random()) { o['added'] = 1 } o.added"));
        assert!(widened("var x = 0; if (Math.random()) { var x = 5 } x"));
        assert!(widened("var a = 0; if (Math.random()) { if (true) { a = 1 } } a"));
        // names the branch does not write keep their value
        assert_eq!(number("var keep = 3; if (Math.random()) { hit = 1 } keep"), 3.0);
        assert_eq!(number("const c = 3; if (Math.random()) { c = 1 } c"), 3.0);
        assert_eq!(
            number("var n = 1; if (Math.random()) { var f = function () { n = 2 } } n"),
            1.0
        );
    }

    #[test]
    fn test_try_catch_finally() {
        assert_eq!(number("var r; try { throw 1 } catch (e) { r = e + 1 } r"), 2.0);
        assert_eq!(number("var r = 0; try { r = 1 } finally { r = r + 10 } r"), 11.0);
        assert_eq!(
            number("function f() { try { return 1 } finally { return 2 } } f()"),
            2.0
        );
        assert!(matches!(run("try { throw 1 } finally { 2 }"), Completion::Throw(Some(Value::Number(n))) if n == 1.0));
    }

    #[test]
    fn test_try_catches_recoverable_faults() {
        let completion = run("var r; try { decodeURI('%') } catch (e) { r = e.name } r");
        match completion {
            Completion::Normal(Some(Value::String(name))) => assert_eq!(name, "URIError"),
            other => panic!("Expected URIError name, got {:?}", other),
        }
    }

    #[test]
    fn test_uncaught_throw() {
        match run("throw 'boom'") {
            Completion::Throw(Some(Value::String(s))) => assert_eq!(s, "boom"),
            other => panic!("Expected throw, got {:?}", other),
        }
    }
}
