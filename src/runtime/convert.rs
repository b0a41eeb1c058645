//! Type conversion operators (ES5 §9)
//!
//! Every operator is total over [`Value`]. An Unknown input yields Unknown, and
//! so does an object whose primitive conversion would have to run analysed code.

use super::value::{Extent, ObjectClass, ObjectRef, Value};

/// ECMAScript WhiteSpace and LineTerminator
pub fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\u{B}' | '\u{C}' | ' ' | '\u{A0}' | '\u{FEFF}'
            // Zs
            | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
            // LineTerminator
            | '\n' | '\r' | '\u{2028}' | '\u{2029}'
    )
}

/// Strip ECMAScript whitespace from both ends
pub fn trim_js(s: &str) -> &str {
    s.trim_matches(is_js_whitespace)
}

/// Strip ECMAScript whitespace from the start
pub fn trim_js_start(s: &str) -> &str {
    s.trim_start_matches(is_js_whitespace)
}

/// ToPrimitive
pub fn to_primitive(value: &Value) -> Value {
    match value {
        Value::Object(obj) => object_to_primitive(obj, &mut Vec::new()),
        other => other.clone(),
    }
}

fn object_to_primitive(obj: &ObjectRef, visited: &mut Vec<usize>) -> Value {
    let class = obj.class();
    match class {
        ObjectClass::Boolean | ObjectClass::Number | ObjectClass::String => obj
            .borrow()
            .primitive
            .clone()
            .unwrap_or(Value::Undefined),
        ObjectClass::Array => join_array(obj, visited),
        ObjectClass::Error(_) => {
            let name = match to_string(&obj.get("name")) {
                Value::String(s) => s,
                _ => return Value::Unknown,
            };
            let message = match obj.get("message") {
                Value::Undefined => String::new(),
                other => match to_string(&other) {
                    Value::String(s) => s,
                    _ => return Value::Unknown,
                },
            };
            match (name.is_empty(), message.is_empty()) {
                (_, true) => Value::String(name),
                (true, false) => Value::String(message),
                (false, false) => Value::String(format!("{}: {}", name, message)),
            }
        }
        ObjectClass::Function => {
            let name = obj.callable().map(|c| c.name().to_string()).unwrap_or_default();
            Value::String(format!("function {}() {{ [native code] }}", name))
        }
        ObjectClass::Math | ObjectClass::Json => Value::String(format!("[object {}]", class.name())),
        ObjectClass::Object => {
            let borrowed = obj.borrow();
            let overridden = ["toString", "valueOf"]
                .iter()
                .any(|key| borrowed.get(key).is_callable() || borrowed.get(key).is_unknown());
            if overridden {
                Value::Unknown
            } else {
                Value::String("[object Object]".to_string())
            }
        }
    }
}

/// Array.prototype.join with "," as the separator
fn join_array(obj: &ObjectRef, visited: &mut Vec<usize>) -> Value {
    if visited.contains(&obj.id()) {
        return Value::String(String::new());
    }
    let length = match obj.borrow().extent() {
        Extent::Walkable(length) => length,
        Extent::Unknown | Extent::TooLong(_) => return Value::Unknown,
    };
    visited.push(obj.id());
    let mut parts = Vec::new();
    for index in 0..length {
        let element = obj.get(&index.to_string());
        let part = match &element {
            Value::Undefined | Value::Null => String::new(),
            Value::Object(inner) => match object_to_primitive(inner, visited) {
                Value::String(s) => s,
                Value::Unknown => {
                    visited.pop();
                    return Value::Unknown;
                }
                primitive => primitive_to_string(&primitive).unwrap_or_default(),
            },
            Value::Unknown => {
                visited.pop();
                return Value::Unknown;
            }
            primitive => primitive_to_string(primitive).unwrap_or_default(),
        };
        parts.push(part);
    }
    visited.pop();
    Value::String(parts.join(","))
}

fn primitive_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Undefined => Some("undefined".to_string()),
        Value::Null => Some("null".to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_to_string(*n)),
        Value::String(s) => Some(s.clone()),
        Value::Object(_) | Value::Unknown => None,
    }
}

/// ToString
pub fn to_string(value: &Value) -> Value {
    match value {
        Value::Object(_) => match to_primitive(value) {
            Value::Unknown => Value::Unknown,
            primitive => to_string(&primitive),
        },
        Value::Unknown => Value::Unknown,
        primitive => primitive_to_string(primitive)
            .map(Value::String)
            .unwrap_or(Value::Unknown),
    }
}

/// ToNumber
pub fn to_number(value: &Value) -> Value {
    match value {
        Value::Undefined => Value::Number(f64::NAN),
        Value::Null => Value::Number(0.0),
        Value::Boolean(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => Value::Number(*n),
        Value::String(s) => Value::Number(string_to_number(s)),
        Value::Object(_) => match to_primitive(value) {
            Value::Unknown => Value::Unknown,
            primitive => to_number(&primitive),
        },
        Value::Unknown => Value::Unknown,
    }
}

/// ToBoolean
pub fn to_boolean(value: &Value) -> Value {
    truthiness(value).map(Value::Boolean).unwrap_or(Value::Unknown)
}

/// ToBoolean as a host boolean, None for Unknown
pub fn truthiness(value: &Value) -> Option<bool> {
    match value {
        Value::Undefined | Value::Null => Some(false),
        Value::Boolean(b) => Some(*b),
        Value::Number(n) => Some(*n != 0.0 && !n.is_nan()),
        Value::String(s) => Some(!s.is_empty()),
        Value::Object(_) => Some(true),
        Value::Unknown => None,
    }
}

/// ToInteger
pub fn to_integer(value: &Value) -> Value {
    match to_number(value) {
        Value::Number(n) => Value::Number(integer_of(n)),
        _ => Value::Unknown,
    }
}

/// ToInt32
pub fn to_int32(value: &Value) -> Value {
    match to_number(value) {
        Value::Number(n) => Value::Number(f64::from(int32_of(n))),
        _ => Value::Unknown,
    }
}

/// ToUint32
pub fn to_uint32(value: &Value) -> Value {
    match to_number(value) {
        Value::Number(n) => Value::Number(f64::from(uint32_of(n))),
        _ => Value::Unknown,
    }
}

pub fn integer_of(n: f64) -> f64 {
    if n.is_nan() {
        0.0
    } else if n == 0.0 || n.is_infinite() {
        n
    } else {
        n.signum() * n.abs().floor()
    }
}

pub fn uint32_of(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let pos_int = n.signum() * n.abs().floor();
    pos_int.rem_euclid(4_294_967_296.0) as u32
}

pub fn int32_of(n: f64) -> i32 {
    uint32_of(n) as i32
}

/// The `typeof` operator
pub fn type_of_operator(value: &Value) -> Value {
    let name = match value {
        Value::Undefined => "undefined",
        Value::Null => "object",
        Value::Boolean(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Object(obj) if obj.callable().is_some() => "function",
        Value::Object(_) => "object",
        Value::Unknown => return Value::Unknown,
    };
    Value::String(name.to_string())
}

/// Convert a value to a property key, None when it is not determinable
pub fn to_property_key(value: &Value) -> Option<String> {
    match to_string(value) {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// StringToNumber (ES5 §9.3.1)
pub fn string_to_number(input: &str) -> f64 {
    let s = trim_js(input);
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let bytes = s.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'0' {
        let radix = match bytes[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return integer_literal(&s[2..], radix).unwrap_or(f64::NAN);
        }
    }
    match scan_decimal(s) {
        Some((value, consumed)) if consumed == s.len() => value,
        _ => f64::NAN,
    }
}

/// Parse a string of digits in the given radix, None if any character is not a digit
pub fn integer_literal(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// Scan the longest StrDecimalLiteral prefix (without `Infinity`)
///
/// Returns the value and the number of bytes consumed.
pub fn scan_decimal(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let digits_from = |mut i: usize| {
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            i = 1;
            true
        }
        Some(b'+') => {
            i = 1;
            false
        }
        _ => false,
    };

    let int_start = i;
    i = digits_from(i);
    let int_part = &s[int_start..i];

    let mut frac_part = "";
    if i < len && bytes[i] == b'.' {
        let frac_end = digits_from(i + 1);
        if int_part.is_empty() && frac_end == i + 1 {
            return None;
        }
        frac_part = &s[i + 1..frac_end];
        i = frac_end;
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut exponent = "";
    if i < len && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            exponent = &s[i + 1..exp_end];
            i = exp_end;
        }
    }

    let mut normalized = String::with_capacity(i + 4);
    normalized.push_str(if int_part.is_empty() { "0" } else { int_part });
    normalized.push('.');
    normalized.push_str(if frac_part.is_empty() { "0" } else { frac_part });
    if !exponent.is_empty() {
        normalized.push('e');
        normalized.push_str(exponent);
    }
    let magnitude = lexical_core::parse::<f64>(normalized.as_bytes()).ok()?;
    Some((if negative { -magnitude } else { magnitude }, i))
}

/// Number::toString (ES5 §9.8.1)
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    // Shortest round-trip digits and decimal exponent
    let formatted = format!("{:e}", n);
    let (mantissa, exp) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exp.parse::<i32>().unwrap_or(0) + 1;

    if k <= point && point <= 21 {
        let mut out = digits;
        out.extend(std::iter::repeat('0').take((point - k) as usize));
        out
    } else if 0 < point && point <= 21 {
        let (whole, frac) = digits.split_at(point as usize);
        format!("{}.{}", whole, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let e = point - 1;
        let sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, e.abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(value: Value) -> f64 {
        value.as_number().expect("number")
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(0.0), "0");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(42.0), "42");
        assert_eq!(number_to_string(-1.5), "-1.5");
        assert_eq!(number_to_string(0.1), "0.1");
        assert_eq!(number_to_string(123456789.125), "123456789.125");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1e20), "100000000000000000000");
        assert_eq!(number_to_string(0.000001), "0.000001");
        assert_eq!(number_to_string(1e-7), "1e-7");
        assert_eq!(number_to_string(1.5e-10), "1.5e-10");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("  \n\t "), 0.0);
        assert_eq!(string_to_number(" 42 "), 42.0);
        assert_eq!(string_to_number("-3.5e2"), -350.0);
        assert_eq!(string_to_number(".5"), 0.5);
        assert_eq!(string_to_number("5."), 5.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("0b101"), 5.0);
        assert_eq!(string_to_number("0o17"), 15.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(string_to_number("abc").is_nan());
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("0x").is_nan());
        assert!(string_to_number(".").is_nan());
    }

    #[test]
    fn test_scan_decimal_prefix() {
        assert_eq!(scan_decimal("3.14abc"), Some((3.14, 4)));
        assert_eq!(scan_decimal("1e5x"), Some((100000.0, 3)));
        assert_eq!(scan_decimal("1ex"), Some((1.0, 1)));
        assert_eq!(scan_decimal("-.5"), Some((-0.5, 3)));
        assert_eq!(scan_decimal("-"), None);
        assert_eq!(scan_decimal("abc"), None);
    }

    #[test]
    fn test_primitive_conversions() {
        assert!(num(to_number(&Value::Undefined)).is_nan());
        assert_eq!(num(to_number(&Value::Null)), 0.0);
        assert_eq!(num(to_number(&Value::Boolean(true))), 1.0);
        assert_eq!(to_string(&Value::Number(1.0)), Value::String("1".into()));
        assert_eq!(to_string(&Value::Null), Value::String("null".into()));
        assert_eq!(to_boolean(&Value::String(String::new())), Value::Boolean(false));
        assert_eq!(to_boolean(&Value::Number(f64::NAN)), Value::Boolean(false));
        assert_eq!(to_boolean(&Value::new_object()), Value::Boolean(true));
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(num(to_integer(&Value::Number(-3.7))), -3.0);
        assert_eq!(num(to_integer(&Value::Number(f64::NAN))), 0.0);
        assert_eq!(num(to_int32(&Value::Number(4294967296.0 + 5.0))), 5.0);
        assert_eq!(num(to_int32(&Value::Number(2147483648.0))), -2147483648.0);
        assert_eq!(num(to_uint32(&Value::Number(-1.0))), 4294967295.0);
        assert_eq!(num(to_int32(&Value::Number(f64::INFINITY))), 0.0);
    }

    #[test]
    fn test_unknown_is_absorbed() {
        assert!(to_string(&Value::Unknown).is_unknown());
        assert!(to_number(&Value::Unknown).is_unknown());
        assert!(to_boolean(&Value::Unknown).is_unknown());
        assert!(to_integer(&Value::Unknown).is_unknown());
        assert!(to_int32(&Value::Unknown).is_unknown());
        assert!(type_of_operator(&Value::Unknown).is_unknown());
    }

    #[test]
    fn test_object_to_primitive() {
        let arr = Value::new_array(vec![Value::Number(1.0), Value::Null, Value::String("x".into())]);
        assert_eq!(to_string(&arr), Value::String("1,,x".into()));
        assert_eq!(num(to_number(&Value::new_array(vec![Value::Number(7.0)]))), 7.0);

        let err = Value::new_error("TypeError", "bad");
        assert_eq!(to_string(&err), Value::String("TypeError: bad".into()));

        assert_eq!(to_string(&Value::new_object()), Value::String("[object Object]".into()));
        assert_eq!(
            to_string(&Value::new_boxed(Value::Number(2.5))),
            Value::String("2.5".into())
        );

        let opaque = Value::new_object();
        opaque.as_object().unwrap().put("toString", Value::Unknown);
        assert!(to_string(&opaque).is_unknown());
    }

    #[test]
    fn test_cyclic_array_join() {
        let arr = Value::new_array(vec![Value::Number(1.0)]);
        arr.as_object().unwrap().put("1", arr.clone());
        assert_eq!(to_string(&arr), Value::String("1,".into()));
    }

    #[test]
    fn test_whitespace_set() {
        for c in ['\t', '\u{B}', '\u{C}', ' ', '\u{A0}', '\u{FEFF}', '\u{1680}', '\u{2007}', '\u{3000}', '\u{2028}'] {
            assert!(is_js_whitespace(c), "{:?}", c);
        }
        for c in ['\u{85}', '\u{180E}', '\u{200B}', 'a'] {
            assert!(!is_js_whitespace(c), "{:?}", c);
        }
        assert!(string_to_number("\u{85}").is_nan());
        assert!(string_to_number("\u{85}1").is_nan());
        assert_eq!(string_to_number("\u{A0}1\u{2029}"), 1.0);
    }

    #[test]
    fn test_join_of_unwalkable_arrays_is_unknown() {
        let huge = Value::new_array(vec![Value::Number(1.0)]);
        huge.as_object().unwrap().put("length", Value::Number(4294967295.0));
        assert!(to_string(&huge).is_unknown());

        let unknown_length = Value::new_array(vec![Value::Number(1.0)]);
        unknown_length.as_object().unwrap().put("length", Value::Unknown);
        assert!(to_string(&unknown_length).is_unknown());
    }

    #[test]
    fn test_typeof_operator() {
        assert_eq!(type_of_operator(&Value::Null), Value::String("object".into()));
        assert_eq!(type_of_operator(&Value::Undefined), Value::String("undefined".into()));
        assert_eq!(type_of_operator(&Value::new_array(vec![])), Value::String("object".into()));
    }
}
