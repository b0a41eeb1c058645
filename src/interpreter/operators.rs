//! Binary operators over abstract values
//!
//! Every operator yields Unknown when an operand, or the primitive an object
//! operand converts to, is Unknown.

use crate::ast::BinaryOperator;
use crate::runtime::convert::{to_number, to_primitive, to_string};
use crate::runtime::Value;
use std::cmp::Ordering;

/// Apply a binary operator
pub fn binary_operation(operator: BinaryOperator, left: &Value, right: &Value) -> Value {
    if left.is_unknown() || right.is_unknown() {
        return Value::Unknown;
    }
    match operator {
        BinaryOperator::Add => add(left, right),
        BinaryOperator::Sub => arithmetic(left, right, |a, b| a - b),
        BinaryOperator::Mul => arithmetic(left, right, |a, b| a * b),
        BinaryOperator::Div => arithmetic(left, right, |a, b| a / b),
        BinaryOperator::Mod => arithmetic(left, right, |a, b| a % b),
        BinaryOperator::Less => relational(left, right, |o| o == Ordering::Less),
        BinaryOperator::Greater => relational(left, right, |o| o == Ordering::Greater),
        BinaryOperator::LessEq => relational(left, right, |o| o != Ordering::Greater),
        BinaryOperator::GreaterEq => relational(left, right, |o| o != Ordering::Less),
        BinaryOperator::Equal => boolean(loose_equals(left, right)),
        BinaryOperator::NotEqual => boolean(loose_equals(left, right).map(|b| !b)),
        BinaryOperator::StrictEqual => Value::Boolean(left.strict_equals(right)),
        BinaryOperator::StrictNotEqual => Value::Boolean(!left.strict_equals(right)),
    }
}

fn boolean(result: Option<bool>) -> Value {
    result.map(Value::Boolean).unwrap_or(Value::Unknown)
}

fn add(left: &Value, right: &Value) -> Value {
    let (left, right) = (to_primitive(left), to_primitive(right));
    if left.is_unknown() || right.is_unknown() {
        return Value::Unknown;
    }
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        return match (to_string(&left), to_string(&right)) {
            (Value::String(mut a), Value::String(b)) => {
                a.push_str(&b);
                Value::String(a)
            }
            _ => Value::Unknown,
        };
    }
    arithmetic(&left, &right, |a, b| a + b)
}

fn arithmetic(left: &Value, right: &Value, op: fn(f64, f64) -> f64) -> Value {
    match (to_number(left), to_number(right)) {
        (Value::Number(a), Value::Number(b)) => Value::Number(op(a, b)),
        _ => Value::Unknown,
    }
}

/// The abstract relational comparison; NaN operands compare false
fn relational(left: &Value, right: &Value, accept: fn(Ordering) -> bool) -> Value {
    let (left, right) = (to_primitive(left), to_primitive(right));
    if let (Value::String(a), Value::String(b)) = (&left, &right) {
        return Value::Boolean(accept(a.encode_utf16().cmp(b.encode_utf16())));
    }
    match (to_number(&left), to_number(&right)) {
        (Value::Number(a), Value::Number(b)) => {
            Value::Boolean(a.partial_cmp(&b).is_some_and(accept))
        }
        _ => Value::Unknown,
    }
}

/// The abstract equality comparison (`==`), None when undeterminable
pub fn loose_equals(left: &Value, right: &Value) -> Option<bool> {
    match (left, right) {
        (Value::Unknown, _) | (_, Value::Unknown) => None,
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Some(true),
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => Some(false),
        (Value::Number(a), Value::Number(b)) => Some(a == b),
        (Value::String(a), Value::String(b)) => Some(a == b),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a == b),
        (Value::Object(a), Value::Object(b)) => Some(a.ptr_eq(b)),
        (Value::Boolean(_), _) => loose_equals(&to_number(left), right),
        (_, Value::Boolean(_)) => loose_equals(left, &to_number(right)),
        (Value::Number(_), Value::String(_)) => loose_equals(left, &to_number(right)),
        (Value::String(_), Value::Number(_)) => loose_equals(&to_number(left), right),
        (Value::Object(_), _) => loose_equals(&to_primitive(left), right),
        (_, Value::Object(_)) => loose_equals(left, &to_primitive(right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::String(text.to_string())
    }

    #[test]
    fn test_addition_concatenates_strings() {
        assert_eq!(binary_operation(BinaryOperator::Add, &s("a"), &Value::Number(1.0)), s("a1"));
        assert_eq!(
            binary_operation(BinaryOperator::Add, &Value::Number(1.0), &Value::Boolean(true)),
            Value::Number(2.0)
        );
        let array = Value::new_array(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(binary_operation(BinaryOperator::Add, &array, &s("")), s("1,2"));
    }

    #[test]
    fn test_unknown_absorbs_every_operator() {
        for operator in [
            BinaryOperator::Add,
            BinaryOperator::Mul,
            BinaryOperator::Less,
            BinaryOperator::Equal,
            BinaryOperator::StrictEqual,
        ] {
            assert!(binary_operation(operator, &Value::Unknown, &Value::Number(1.0)).is_unknown());
        }
    }

    #[test]
    fn test_loose_equality() {
        assert_eq!(loose_equals(&Value::Null, &Value::Undefined), Some(true));
        assert_eq!(loose_equals(&s("1"), &Value::Number(1.0)), Some(true));
        assert_eq!(loose_equals(&Value::Boolean(false), &s("0")), Some(true));
        assert_eq!(loose_equals(&Value::Null, &Value::Number(0.0)), Some(false));
        assert_eq!(loose_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)), Some(false));
    }

    #[test]
    fn test_relational_comparison() {
        assert_eq!(binary_operation(BinaryOperator::Less, &s("a"), &s("b")), Value::Boolean(true));
        assert_eq!(binary_operation(BinaryOperator::Less, &s("10"), &Value::Number(9.0)), Value::Boolean(false));
        assert_eq!(
            binary_operation(BinaryOperator::GreaterEq, &Value::Number(f64::NAN), &Value::Number(1.0)),
            Value::Boolean(false)
        );
    }
}
