//! Widening of code that is skipped under an Unknown condition
//!
//! A branch that is not evaluated may still have written to bindings and
//! properties. Every write target it names is set to Unknown so that later
//! reads cannot observe the stale concrete value. Calls made by the skipped
//! code are not followed.

use crate::ast::*;
use crate::runtime::convert::number_to_string;
use crate::runtime::{Environment, ObjectRef, Session, Value};

/// Widen the write targets of skipped statements
pub(crate) fn statement(session: &mut Session, statement: &Statement) {
    let env = session.current_context().lexical_env.clone();
    widen_statement(&env, statement);
}

/// Widen the write targets of a skipped expression
pub(crate) fn expression(session: &mut Session, expression: &Expression) {
    let env = session.current_context().lexical_env.clone();
    widen_expression(&env, expression);
}

/// Set every existing own property of `object` to Unknown
pub(crate) fn all_properties(object: &ObjectRef) {
    let keys = object.borrow().keys();
    for key in keys {
        object.put(&key, Value::Unknown);
    }
}

fn widen_statements(env: &Environment, body: &[Statement]) {
    for statement in body {
        widen_statement(env, statement);
    }
}

fn widen_statement(env: &Environment, statement: &Statement) {
    match statement {
        Statement::Block(body) => widen_statements(env, body),
        Statement::Expression(expression) | Statement::Throw(expression) => {
            widen_expression(env, expression)
        }
        Statement::Return(argument) => {
            if let Some(argument) = argument {
                widen_expression(env, argument);
            }
        }
        Statement::VariableDeclaration(decl) => {
            for declarator in &decl.declarations {
                if let Some(init) = &declarator.init {
                    widen_expression(env, init);
                    if decl.kind == VariableKind::Var {
                        widen_binding(env, &declarator.id.name);
                    }
                }
            }
        }
        Statement::If(stmt) => {
            widen_expression(env, &stmt.test);
            widen_statement(env, &stmt.consequent);
            if let Some(alternate) = &stmt.alternate {
                widen_statement(env, alternate);
            }
        }
        Statement::Try(stmt) => {
            widen_statements(env, &stmt.block);
            if let Some(handler) = &stmt.handler {
                widen_statements(env, &handler.body);
            }
            if let Some(finalizer) = &stmt.finalizer {
                widen_statements(env, finalizer);
            }
        }
        Statement::Empty | Statement::FunctionDeclaration(_) => {}
    }
}

fn widen_expression(env: &Environment, expression: &Expression) {
    match expression {
        Expression::Assignment(assignment) => {
            widen_expression(env, &assignment.value);
            match &assignment.target {
                AssignmentTarget::Identifier(id) => widen_binding(env, &id.name),
                AssignmentTarget::Member(member) => widen_member(env, member),
            }
        }
        Expression::Array(elements) => {
            for element in elements.iter().flatten() {
                widen_expression(env, element);
            }
        }
        Expression::Object(properties) => {
            for property in properties {
                widen_expression(env, &property.value);
            }
        }
        Expression::Member(member) => {
            widen_expression(env, &member.object);
            if let MemberProperty::Computed(key) = &member.property {
                widen_expression(env, key);
            }
        }
        Expression::Call(call) => {
            widen_expression(env, &call.callee);
            for argument in &call.arguments {
                widen_expression(env, argument);
            }
        }
        Expression::Unary(unary) => widen_expression(env, &unary.argument),
        Expression::Binary(binary) => {
            widen_expression(env, &binary.left);
            widen_expression(env, &binary.right);
        }
        Expression::Logical(logical) => {
            widen_expression(env, &logical.left);
            widen_expression(env, &logical.right);
        }
        Expression::Conditional(conditional) => {
            widen_expression(env, &conditional.test);
            widen_expression(env, &conditional.consequent);
            widen_expression(env, &conditional.alternate);
        }
        Expression::Sequence(expressions) => {
            for expression in expressions {
                widen_expression(env, expression);
            }
        }
        // function bodies only run when called
        Expression::Identifier(_)
        | Expression::Literal(_)
        | Expression::Function(_)
        | Expression::This(_) => {}
    }
}

/// Unresolved names stay unresolved and constants keep their value
fn widen_binding(env: &Environment, name: &str) {
    env.assign(name, Value::Unknown);
}

fn widen_member(env: &Environment, member: &MemberExpression) {
    widen_expression(env, &member.object);
    let Expression::Identifier(base) = &member.object else {
        return;
    };
    let Some(Value::Object(object)) = env.lookup(&base.name) else {
        return;
    };
    match &member.property {
        MemberProperty::Named(name) => {
            object.put(name, Value::Unknown);
        }
        MemberProperty::Computed(Expression::Literal(Literal::String(key))) => {
            object.put(key, Value::Unknown);
        }
        MemberProperty::Computed(Expression::Literal(Literal::Number(n))) => {
            object.put(&number_to_string(*n), Value::Unknown);
        }
        MemberProperty::Computed(key) => {
            widen_expression(env, key);
            all_properties(&object);
        }
    }
}
