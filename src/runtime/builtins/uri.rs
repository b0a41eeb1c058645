//! URI handling functions (ES5 §15.1.3)

use super::define_method;
use crate::error::{messages, Error, Result};
use crate::runtime::completion::Fault;
use crate::runtime::convert::to_string;
use crate::runtime::native::{argument, CallOptions};
use crate::runtime::session::Session;
use crate::runtime::value::{ObjectRef, Value};

/// uriReserved
pub const URI_RESERVED: &str = ";/?:@&=+$,";
/// uriUnescaped minus the alphanumerics
pub const URI_UNESCAPED: &str = "-_.!~*'()";

pub(super) fn register(global: &ObjectRef) {
    define_method(global, "decodeURI", 1, decode_uri);
    define_method(global, "decodeURIComponent", 1, decode_uri_component);
    define_method(global, "encodeURI", 1, encode_uri);
    define_method(global, "encodeURIComponent", 1, encode_uri_component);
}

fn is_unescaped(c: char) -> bool {
    c.is_ascii_alphanumeric() || URI_UNESCAPED.contains(c)
}

fn is_reserved_or_hash(c: char) -> bool {
    URI_RESERVED.contains(c) || c == '#'
}

/// Percent-encode every character not accepted by `keep`
pub fn encode(input: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut buf = [0u8; 4];
    for c in input.chars() {
        if c.is_ascii() && keep(c) {
            out.push(c);
        } else {
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    out
}

fn hex_pair(bytes: &[u8], at: usize) -> Option<u8> {
    if bytes.get(at) != Some(&b'%') {
        return None;
    }
    let hi = (*bytes.get(at + 1)? as char).to_digit(16)?;
    let lo = (*bytes.get(at + 2)? as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Decode percent escapes, leaving escapes of characters in `preserve` intact
///
/// Truncated escapes and invalid UTF-8 sequences are URIError faults.
pub fn decode(input: &str, preserve: impl Fn(char) -> bool) -> Result<String> {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let lead = hex_pair(bytes, i).ok_or_else(malformed)?;
        if lead < 0x80 {
            let c = lead as char;
            if preserve(c) {
                out.extend_from_slice(&bytes[i..i + 3]);
            } else {
                out.push(lead);
            }
            i += 3;
            continue;
        }

        let width = match lead {
            b if b & 0xE0 == 0xC0 => 2,
            b if b & 0xF0 == 0xE0 => 3,
            b if b & 0xF8 == 0xF0 => 4,
            _ => return Err(malformed()),
        };
        let mut octets = [lead, 0, 0, 0];
        for (n, slot) in octets.iter_mut().enumerate().take(width).skip(1) {
            let byte = hex_pair(bytes, i + 3 * n).ok_or_else(malformed)?;
            if byte & 0xC0 != 0x80 {
                return Err(malformed());
            }
            *slot = byte;
        }
        let decoded = std::str::from_utf8(&octets[..width]).map_err(|_| malformed())?;
        out.extend_from_slice(decoded.as_bytes());
        i += 3 * width;
    }
    String::from_utf8(out).map_err(|_| malformed())
}

fn malformed() -> Error {
    Error::uri_error(messages::MALFORMED_URI)
}

fn string_argument(args: &[Value]) -> Option<String> {
    match to_string(&argument(args, 0)) {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn decode_uri(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> std::result::Result<Value, Fault> {
    let Some(input) = string_argument(args) else {
        return Ok(Value::Unknown);
    };
    Ok(Value::String(decode(&input, is_reserved_or_hash)?))
}

fn decode_uri_component(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> std::result::Result<Value, Fault> {
    let Some(input) = string_argument(args) else {
        return Ok(Value::Unknown);
    };
    Ok(Value::String(decode(&input, |_| false)?))
}

fn encode_uri(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> std::result::Result<Value, Fault> {
    let Some(input) = string_argument(args) else {
        return Ok(Value::Unknown);
    };
    Ok(Value::String(encode(&input, |c| is_unescaped(c) || is_reserved_or_hash(c))))
}

fn encode_uri_component(
    _session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> std::result::Result<Value, Fault> {
    let Some(input) = string_argument(args) else {
        return Ok(Value::Unknown);
    };
    Ok(Value::String(encode(&input, is_unescaped)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component() {
        assert_eq!(encode("a b&c", is_unescaped), "a%20b%26c");
        assert_eq!(encode("é", is_unescaped), "%C3%A9");
        assert_eq!(encode("😀", is_unescaped), "%F0%9F%98%80");
        assert_eq!(encode("-_.!~*'()", is_unescaped), "-_.!~*'()");
    }

    #[test]
    fn test_encode_uri_keeps_reserved() {
        let keep = |c| is_unescaped(c) || is_reserved_or_hash(c);
        assert_eq!(encode("http://x.y/a b?q=1#f", keep), "http://x.y/a%20b?q=1#f");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("a%20b", |_| false).unwrap(), "a b");
        assert_eq!(decode("%C3%A9", |_| false).unwrap(), "é");
        assert_eq!(decode("%F0%9F%98%80", |_| false).unwrap(), "😀");
        assert_eq!(decode("%2F%41", is_reserved_or_hash).unwrap(), "%2FA");
        assert_eq!(decode("é%41", |_| false).unwrap(), "éA");
    }

    #[test]
    fn test_decode_malformed() {
        for input in ["%", "%4", "%G1", "%C3", "%C3%41", "%FF", "%ED%A0%80", "%C0%80"] {
            let err = decode(input, |_| false).unwrap_err();
            assert_eq!(err.to_string(), "URIError: URI malformed", "input {input}");
        }
    }
}
