//! Expression evaluation

use super::function::Closure;
use super::operators::binary_operation;
use super::widen;
use crate::ast::*;
use crate::error::{messages, ErrorKind};
use crate::runtime::convert::{to_number, to_property_key, truthiness, type_of_operator};
use crate::runtime::{Assignment, CallOptions, Fault, Object, ObjectClass, ObjectRef, Session, Value};

type Eval = Result<Value, Fault>;

pub(crate) fn evaluate(session: &mut Session, expression: &Expression) -> Eval {
    match expression {
        Expression::Identifier(id) => resolve(session, &id.name),
        Expression::Literal(literal) => Ok(match literal {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::String(s.clone()),
        }),
        Expression::Array(elements) => {
            let mut array = Object::new_array();
            for (index, element) in elements.iter().enumerate() {
                if let Some(element) = element {
                    let value = evaluate(session, element)?;
                    array.put(&index.to_string(), value);
                }
            }
            array.put("length", Value::Number(elements.len() as f64));
            Ok(Value::Object(ObjectRef::new(array)))
        }
        Expression::Object(properties) => {
            let object = ObjectRef::new(Object::new(ObjectClass::Object));
            for property in properties {
                let value = evaluate(session, &property.value)?;
                object.put(&property.key, value);
            }
            Ok(Value::Object(object))
        }
        Expression::Function(function) => {
            let lexical_env = session.current_context().lexical_env.clone();
            Ok(Closure::create_expression(function.clone(), lexical_env))
        }
        Expression::This(_) => Ok(session.current_context().this_value.clone()),
        Expression::Member(member) => {
            let (object, key) = evaluate_member(session, member)?;
            read_member(session, &object, key)
        }
        Expression::Call(call) => evaluate_call(session, call),
        Expression::Unary(unary) => evaluate_unary(session, unary),
        Expression::Binary(binary) => {
            let left = evaluate(session, &binary.left)?;
            let right = evaluate(session, &binary.right)?;
            Ok(binary_operation(binary.operator, &left, &right))
        }
        Expression::Logical(logical) => {
            let left = evaluate(session, &logical.left)?;
            match (logical.operator, truthiness(&left)) {
                (_, None) => {
                    widen::expression(session, &logical.right);
                    Ok(Value::Unknown)
                }
                (LogicalOperator::And, Some(false)) | (LogicalOperator::Or, Some(true)) => Ok(left),
                _ => evaluate(session, &logical.right),
            }
        }
        Expression::Conditional(conditional) => {
            let test = evaluate(session, &conditional.test)?;
            match truthiness(&test) {
                Some(true) => evaluate(session, &conditional.consequent),
                Some(false) => evaluate(session, &conditional.alternate),
                None => {
                    widen::expression(session, &conditional.consequent);
                    widen::expression(session, &conditional.alternate);
                    Ok(Value::Unknown)
                }
            }
        }
        Expression::Assignment(assignment) => evaluate_assignment(session, assignment),
        Expression::Sequence(expressions) => {
            let mut value = Value::Undefined;
            for expression in expressions {
                value = evaluate(session, expression)?;
            }
            Ok(value)
        }
    }
}

/// Resolve an identifier reference through the current lexical environment
fn resolve(session: &mut Session, name: &str) -> Eval {
    let env = session.current_context().lexical_env.clone();
    match env.lookup(name) {
        Some(value) => Ok(value),
        None => session.recoverable(ErrorKind::ReferenceError, messages::not_defined(name)),
    }
}

/// PutValue on an identifier reference
pub(crate) fn assign_identifier(session: &mut Session, name: &str, value: Value) -> Result<(), Fault> {
    let (env, strict) = {
        let context = session.current_context();
        (context.lexical_env.clone(), context.strict)
    };
    match env.assign(name, value.clone()) {
        Assignment::Done => {}
        Assignment::Immutable => {
            let global_property = session.global_object().borrow().has_own(name);
            if strict || !global_property {
                session.recoverable(
                    ErrorKind::TypeError,
                    format!("Assignment to constant variable '{}'", name),
                )?;
            }
        }
        Assignment::Unresolved if strict => {
            session.recoverable(ErrorKind::ReferenceError, messages::not_defined(name))?;
        }
        Assignment::Unresolved => {
            session.global_object().put(name, value);
        }
    }
    Ok(())
}

/// Evaluate the object and key of a member expression; None when the key is Unknown
fn evaluate_member(session: &mut Session, member: &MemberExpression) -> Result<(Value, Option<String>), Fault> {
    let object = evaluate(session, &member.object)?;
    let key = match &member.property {
        MemberProperty::Named(name) => Some(name.clone()),
        MemberProperty::Computed(expression) => {
            let key = evaluate(session, expression)?;
            to_property_key(&key)
        }
    };
    Ok((object, key))
}

fn read_member(session: &mut Session, object: &Value, key: Option<String>) -> Eval {
    let Some(key) = key else {
        return Ok(Value::Unknown);
    };
    if object.is_nullish() {
        return session.recoverable(
            ErrorKind::TypeError,
            format!("Cannot read property '{}' of {}", key, object),
        );
    }
    Ok(object.get_property(&key))
}

fn write_member(session: &mut Session, object: &Value, key: Option<String>, value: Value) -> Result<(), Fault> {
    let Some(key) = key else {
        // any existing property may be the one written
        if let Value::Object(obj) = object {
            widen::all_properties(obj);
        }
        return Ok(());
    };
    match object {
        Value::Object(obj) => {
            if !obj.put(&key, value) && session.current_context().strict {
                session.recoverable(
                    ErrorKind::TypeError,
                    format!("Cannot assign to read only property '{}'", key),
                )?;
            }
        }
        Value::Undefined | Value::Null => {
            session.recoverable(
                ErrorKind::TypeError,
                format!("Cannot set property '{}' of {}", key, object),
            )?;
        }
        // Unknown targets and primitives absorb the write
        _ => {}
    }
    Ok(())
}

fn evaluate_call(session: &mut Session, call: &CallExpression) -> Eval {
    let (callee, this, options) = match &call.callee {
        Expression::Member(member) => {
            let (object, key) = evaluate_member(session, member)?;
            let callee = read_member(session, &object, key)?;
            (callee, object, CallOptions::default())
        }
        Expression::Identifier(id) => {
            let callee = resolve(session, &id.name)?;
            let options = if id.name == "eval" && is_global_eval(session, &callee) {
                CallOptions::direct_eval()
            } else {
                CallOptions::default()
            };
            (callee, Value::Undefined, options)
        }
        other => (evaluate(session, other)?, Value::Undefined, CallOptions::default()),
    };

    let mut args = Vec::with_capacity(call.arguments.len());
    for argument in &call.arguments {
        args.push(evaluate(session, argument)?);
    }
    session.call_function(&callee, &this, &args, &options)
}

fn is_global_eval(session: &Session, callee: &Value) -> bool {
    match (callee, session.global_object().get("eval")) {
        (Value::Object(callee), Value::Object(eval)) => callee.ptr_eq(&eval),
        _ => false,
    }
}

fn evaluate_unary(session: &mut Session, unary: &UnaryExpression) -> Eval {
    // typeof tolerates unresolvable references
    if let (UnaryOperator::Typeof, Expression::Identifier(id)) = (unary.operator, &unary.argument) {
        let env = session.current_context().lexical_env.clone();
        return Ok(match env.lookup(&id.name) {
            Some(value) => type_of_operator(&value),
            None => Value::String("undefined".to_string()),
        });
    }

    let argument = evaluate(session, &unary.argument)?;
    Ok(match unary.operator {
        UnaryOperator::Minus => match to_number(&argument) {
            Value::Number(n) => Value::Number(-n),
            _ => Value::Unknown,
        },
        UnaryOperator::Plus => to_number(&argument),
        UnaryOperator::Not => match truthiness(&argument) {
            Some(b) => Value::Boolean(!b),
            None => Value::Unknown,
        },
        UnaryOperator::Typeof => type_of_operator(&argument),
        UnaryOperator::Void => Value::Undefined,
    })
}

fn evaluate_assignment(session: &mut Session, assignment: &AssignmentExpression) -> Eval {
    match &assignment.target {
        AssignmentTarget::Identifier(id) => {
            let value = match assignment.operator {
                AssignmentOperator::Assign => evaluate(session, &assignment.value)?,
                AssignmentOperator::Compound(operator) => {
                    let current = resolve(session, &id.name)?;
                    let right = evaluate(session, &assignment.value)?;
                    binary_operation(operator, &current, &right)
                }
            };
            assign_identifier(session, &id.name, value.clone())?;
            Ok(value)
        }
        AssignmentTarget::Member(member) => {
            let (object, key) = evaluate_member(session, member)?;
            let value = match assignment.operator {
                AssignmentOperator::Assign => evaluate(session, &assignment.value)?,
                AssignmentOperator::Compound(operator) => {
                    let current = read_member(session, &object, key.clone())?;
                    let right = evaluate(session, &assignment.value)?;
                    binary_operation(operator, &current, &right)
                }
            };
            write_member(session, &object, key, value.clone())?;
            Ok(value)
        }
    }
}
