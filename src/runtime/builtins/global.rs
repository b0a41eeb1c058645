//! Global function properties: `eval`, `parseInt`, `parseFloat`, `isNaN`, `isFinite`

use super::define_method;
use crate::error::{messages, ErrorKind};
use crate::runtime::completion::{Completion, Fault};
use crate::runtime::convert::{scan_decimal, to_int32, to_number, to_string, trim_js_start};
use crate::runtime::native::{argument, CallOptions};
use crate::runtime::session::Session;
use crate::runtime::value::{ObjectRef, Value};

pub(super) fn register(global: &ObjectRef) {
    define_method(global, "eval", 1, eval);
    define_method(global, "parseInt", 2, parse_int);
    define_method(global, "parseFloat", 1, parse_float);
    define_method(global, "isNaN", 1, is_nan);
    define_method(global, "isFinite", 1, is_finite);
}

/// eval(x)
fn eval(
    session: &mut Session,
    _this: &Value,
    args: &[Value],
    options: &CallOptions,
) -> Result<Value, Fault> {
    let source = match args.first() {
        Some(Value::String(source)) => source,
        Some(other) => return Ok(other.clone()),
        None => return Ok(Value::Undefined),
    };
    let filename = options
        .filename
        .clone()
        .unwrap_or_else(|| session.current_context().filename.clone());

    let program = match session.parse(source, &filename) {
        Ok(program) => program,
        Err(error) => return session.recoverable(ErrorKind::SyntaxError, error.message()),
    };
    if session.call_depth_exceeded() {
        return session.recoverable(ErrorKind::RangeError, messages::MAXIMUM_CALL_STACK);
    }

    let mut scope =
        session.enter_eval_context(program.is_strict(), options.is_direct_eval, filename);
    let completion = program.evaluate(&mut scope);
    drop(scope);
    interpret_completion(session, completion)
}

fn interpret_completion(session: &mut Session, completion: Completion) -> Result<Value, Fault> {
    match completion {
        Completion::Normal(value) => Ok(value.unwrap_or(Value::Undefined)),
        Completion::Throw(None) => Err(session.throw_native("Error", messages::MISSING_THROW_VALUE)),
        Completion::Throw(Some(Value::Unknown)) => Err(Fault::Throw(Value::Unknown)),
        Completion::Throw(Some(Value::Object(obj))) if obj.class().name().ends_with("Error") => {
            let name = match to_string(&obj.get("name")) {
                Value::String(name) => name,
                _ => obj.class().name().to_string(),
            };
            let message = match obj.get("message") {
                Value::Undefined => String::new(),
                other => match to_string(&other) {
                    Value::String(message) => message,
                    _ => String::new(),
                },
            };
            // already reported when it was first thrown
            Err(Fault::Throw(Value::new_error(&name, &message)))
        }
        Completion::Throw(Some(other)) => match to_string(&other) {
            Value::String(message) => Err(session.throw_native("Error", message)),
            _ => Err(Fault::Throw(Value::Unknown)),
        },
    }
}

/// parseInt(string, radix)
fn parse_int(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    let Value::String(input) = to_string(&argument(args, 0)) else {
        return Ok(Value::Unknown);
    };
    let Value::Number(radix) = to_int32(&argument(args, 1)) else {
        return Ok(Value::Unknown);
    };
    Ok(Value::Number(parse_int_str(&input, radix as i32)))
}

/// The parseInt algorithm over an already converted string and radix
pub fn parse_int_str(input: &str, radix: i32) -> f64 {
    let mut s = trim_js_start(input);
    let negative = s.starts_with('-');
    if s.starts_with('-') || s.starts_with('+') {
        s = &s[1..];
    }

    let mut strip_prefix = true;
    let mut radix = radix;
    if radix == 0 {
        radix = 10;
    } else if !(2..=36).contains(&radix) {
        return f64::NAN;
    } else if radix != 16 {
        strip_prefix = false;
    }
    if strip_prefix && (s.starts_with("0x") || s.starts_with("0X")) {
        s = &s[2..];
        radix = 16;
    }

    let radix = radix as u32;
    let end = s
        .char_indices()
        .find(|(_, c)| c.to_digit(radix).is_none())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let digits = &s[..end];
    if digits.is_empty() {
        return f64::NAN;
    }

    let magnitude = if radix == 10 {
        lexical_core::parse::<f64>(digits.as_bytes()).unwrap_or(f64::NAN)
    } else {
        digits.chars().fold(0.0, |acc, c| {
            acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
        })
    };
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// parseFloat(string)
fn parse_float(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    match to_string(&argument(args, 0)) {
        Value::String(input) => Ok(Value::Number(parse_float_str(&input))),
        _ => Ok(Value::Unknown),
    }
}

/// The parseFloat algorithm: longest StrDecimalLiteral prefix after leading whitespace
pub fn parse_float_str(input: &str) -> f64 {
    let s = trim_js_start(input);
    if s.starts_with("Infinity") || s.starts_with("+Infinity") {
        return f64::INFINITY;
    }
    if s.starts_with("-Infinity") {
        return f64::NEG_INFINITY;
    }
    scan_decimal(s).map(|(value, _)| value).unwrap_or(f64::NAN)
}

/// isNaN(number)
fn is_nan(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    match to_number(&argument(args, 0)) {
        Value::Number(n) => Ok(Value::Boolean(n.is_nan())),
        _ => Ok(Value::Unknown),
    }
}

/// isFinite(number)
fn is_finite(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    match to_number(&argument(args, 0)) {
        Value::Number(n) => Ok(Value::Boolean(n.is_finite())),
        _ => Ok(Value::Unknown),
    }
}
