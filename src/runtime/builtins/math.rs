//! The Math object (ES5 §15.8)

use super::{define_method, namespace};
use crate::runtime::completion::Fault;
use crate::runtime::convert::to_number;
use crate::runtime::native::CallOptions;
use crate::runtime::session::Session;
use crate::runtime::value::{Attributes, ObjectClass, Value};
use std::f64::consts;

pub(super) fn create() -> Value {
    let math = namespace(ObjectClass::Math);

    for (name, value) in [
        ("E", consts::E),
        ("LN10", consts::LN_10),
        ("LN2", consts::LN_2),
        ("LOG2E", consts::LOG2_E),
        ("LOG10E", consts::LOG10_E),
        ("PI", consts::PI),
        ("SQRT1_2", consts::FRAC_1_SQRT_2),
        ("SQRT2", consts::SQRT_2),
    ] {
        math.define(name, Value::Number(value), Attributes::READ_ONLY);
    }

    define_method(&math, "abs", 1, abs);
    define_method(&math, "acos", 1, acos);
    define_method(&math, "asin", 1, asin);
    define_method(&math, "atan", 1, atan);
    define_method(&math, "atan2", 2, atan2);
    define_method(&math, "ceil", 1, ceil);
    define_method(&math, "cos", 1, cos);
    define_method(&math, "exp", 1, exp);
    define_method(&math, "floor", 1, floor);
    define_method(&math, "log", 1, log);
    define_method(&math, "max", 2, max);
    define_method(&math, "min", 2, min);
    define_method(&math, "pow", 2, pow);
    define_method(&math, "random", 0, random);
    define_method(&math, "round", 1, round);
    define_method(&math, "sin", 1, sin);
    define_method(&math, "sqrt", 1, sqrt);
    define_method(&math, "tan", 1, tan);

    Value::Object(math)
}

/// A missing argument is NaN; a present one goes through ToNumber
fn number_arg(args: &[Value], index: usize) -> Option<Value> {
    match args.get(index) {
        None => Some(Value::Number(f64::NAN)),
        Some(value) => match to_number(value) {
            Value::Number(n) => Some(Value::Number(n)),
            _ => None,
        },
    }
}

fn unary(args: &[Value], op: fn(f64) -> f64) -> Result<Value, Fault> {
    match number_arg(args, 0) {
        Some(Value::Number(x)) => Ok(Value::Number(op(x))),
        _ => Ok(Value::Unknown),
    }
}

fn binary(args: &[Value], op: fn(f64, f64) -> f64) -> Result<Value, Fault> {
    match (number_arg(args, 0), number_arg(args, 1)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => Ok(Value::Number(op(x, y))),
        _ => Ok(Value::Unknown),
    }
}

macro_rules! unary_method {
    ($($name:ident => $op:expr;)*) => {
        $(
            fn $name(
                _session: &mut Session,
                _this: &Value,
                args: &[Value],
                _options: &CallOptions,
            ) -> Result<Value, Fault> {
                unary(args, $op)
            }
        )*
    };
}

unary_method! {
    abs => f64::abs;
    acos => f64::acos;
    asin => f64::asin;
    atan => f64::atan;
    ceil => f64::ceil;
    cos => f64::cos;
    exp => f64::exp;
    floor => f64::floor;
    log => f64::ln;
    round => round_half_up;
    sin => f64::sin;
    sqrt => f64::sqrt;
    tan => f64::tan;
}

/// Round half toward +Infinity, preserving -0 for inputs in [-0.5, -0]
fn round_half_up(x: f64) -> f64 {
    if !x.is_finite() || x == 0.0 || x.fract() == 0.0 {
        return x;
    }
    if x < 0.0 && x >= -0.5 {
        return -0.0;
    }
    (x + 0.5).floor()
}

fn atan2(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    binary(args, f64::atan2)
}

fn pow(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    binary(args, |x, y| {
        if y.is_nan() || (x.abs() == 1.0 && y.is_infinite()) {
            f64::NAN
        } else {
            x.powf(y)
        }
    })
}

fn numbers(args: &[Value]) -> Option<Vec<f64>> {
    args.iter()
        .map(|arg| to_number(arg).as_number())
        .collect()
}

fn max(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    let Some(values) = numbers(args) else {
        return Ok(Value::Unknown);
    };
    let mut result = f64::NEG_INFINITY;
    for n in values {
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        if n > result || (n == 0.0 && result == 0.0 && result.is_sign_negative()) {
            result = n;
        }
    }
    Ok(Value::Number(result))
}

fn min(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    let Some(values) = numbers(args) else {
        return Ok(Value::Unknown);
    };
    let mut result = f64::INFINITY;
    for n in values {
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        if n < result || (n == 0.0 && result == 0.0 && n.is_sign_negative()) {
            result = n;
        }
    }
    Ok(Value::Number(result))
}

/// Math.random is only concrete when verifying an exact trace
fn random(
    session: &mut Session,
    _this: &Value,
    _args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    if session.options().exact_mode {
        Ok(Value::Number(rand::random::<f64>()))
    } else {
        Ok(Value::Unknown)
    }
}
