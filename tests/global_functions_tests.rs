//! Integration tests for the global function properties

mod common;
use common::{error_parts, exact_session, run_in, run_js, run_number, run_string, run_throw, session};
use jsabstract::{ErrorKind, Value};

mod numeric {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(run_number("parseInt('  42px', 10)"), 42.0);
        assert_eq!(run_number("parseInt('0x1F')"), 31.0);
        assert_eq!(run_number("parseInt('-17')"), -17.0);
        assert_eq!(run_number("parseInt('ff', 16)"), 255.0);
        assert_eq!(run_number("parseInt('101', 2)"), 5.0);
        assert!(run_number("parseInt('xyz')").is_nan());
        assert!(run_number("parseInt('10', 37)").is_nan());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(run_number("parseFloat('  3.14abc')"), 3.14);
        assert_eq!(run_number("parseFloat('.5')"), 0.5);
        assert_eq!(run_number("parseFloat('-1e3x')"), -1000.0);
        assert_eq!(run_number("parseFloat('Infinityx')"), f64::INFINITY);
        assert!(run_number("parseFloat('abc')").is_nan());
    }

    #[test]
    fn test_is_nan_and_is_finite() {
        assert_eq!(run_js("isNaN('abc')"), Value::Boolean(true));
        assert_eq!(run_js("isNaN('12')"), Value::Boolean(false));
        assert_eq!(run_js("isNaN(undefined)"), Value::Boolean(true));
        assert_eq!(run_js("isFinite('abc')"), Value::Boolean(false));
        assert_eq!(run_js("isFinite('12')"), Value::Boolean(true));
        assert_eq!(run_js("isFinite(1 / 0)"), Value::Boolean(false));
    }

    #[test]
    fn test_only_ecmascript_whitespace_is_trimmed() {
        assert_eq!(run_js("isNaN('\\u0085')"), Value::Boolean(true));
        assert!(run_number("parseInt('\\u0085 1')").is_nan());
        assert!(run_number("parseFloat('\\u00851')").is_nan());
        assert_eq!(run_number("parseInt('\\u3000\\ufeff 12')"), 12.0);
        assert_eq!(run_number("parseFloat('\\u00a0\\u2029 2.5')"), 2.5);
        assert_eq!(run_number("+'\\t\\u000b\\u000c 7 '"), 7.0);
    }

    #[test]
    fn test_global_value_properties() {
        assert!(run_number("NaN").is_nan());
        assert_eq!(run_number("Infinity"), f64::INFINITY);
        assert_eq!(run_js("typeof undefined"), Value::String("undefined".into()));
        // read-only: sloppy assignment is ignored
        assert_eq!(run_number("Infinity = 1; Infinity"), f64::INFINITY);
    }
}

mod uri {
    use super::*;

    #[test]
    fn test_uri_component_round_trip() {
        for text in [
            "hello world",
            "a+b=c&d",
            "caf\\u00e9",
            "\\u4e2d\\u6587",
            "\\uD83D\\uDE00 smile",
            "100% ;/?:@&=+$,#",
        ] {
            let code = format!(
                "var s = '{}'; decodeURIComponent(encodeURIComponent(s)) === s",
                text
            );
            assert_eq!(run_js(&code), Value::Boolean(true), "round trip of {}", text);
        }
    }

    #[test]
    fn test_encode_uri_keeps_reserved() {
        assert_eq!(
            run_string("encodeURI('http://x.test/a b?q=1#f')"),
            "http://x.test/a%20b?q=1#f"
        );
        assert_eq!(
            run_string("encodeURIComponent('a b/c')"),
            "a%20b%2Fc"
        );
        assert_eq!(run_string("encodeURIComponent('\\u00e9')"), "%C3%A9");
    }

    #[test]
    fn test_decode_uri_preserves_reserved_escapes() {
        assert_eq!(run_string("decodeURI('%2F%20')"), "%2F ");
        assert_eq!(run_string("decodeURIComponent('%2F%20')"), "/ ");
    }

    #[test]
    fn test_malformed_uri_is_recovered() {
        let mut session = session();
        let value = run_in(&mut session, "decodeURIComponent('%')");
        assert!(value.is_unknown());
        let diagnostics = session.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, ErrorKind::UriError);
        assert!(diagnostics[0].is_recovered());
    }

    #[test]
    fn test_malformed_uri_throws_in_exact_mode() {
        let mut session = exact_session();
        let thrown = run_throw(&mut session, "decodeURIComponent('%E0%A4%A')");
        let (name, message) = error_parts(&thrown);
        assert_eq!(name, "URIError");
        assert_eq!(message, "URI malformed");
    }
}
