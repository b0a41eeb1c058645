//! Integration tests for the JSON object

mod common;
use common::{error_parts, exact_session, run_in, run_js, run_number, run_string, run_throw, session};
use jsabstract::{ErrorKind, Value};
use pretty_assertions::assert_eq;

mod stringify {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compact_output() {
        assert_eq!(
            run_string("JSON.stringify({a: 1, b: [true, null, 'x'], c: {}})"),
            r#"{"a":1,"b":[true,null,"x"],"c":{}}"#
        );
        assert_eq!(run_string("JSON.stringify('he said \"hi\"\\n')"), r#""he said \"hi\"\n""#);
        assert_eq!(run_string("JSON.stringify([1 / 0, 0 / 0, -0])"), "[null,null,0]");
    }

    #[test]
    fn test_omitted_members() {
        assert_eq!(
            run_string("JSON.stringify({a: undefined, f: function () {}, b: 2})"),
            r#"{"b":2}"#
        );
        assert_eq!(run_string("JSON.stringify([undefined, function () {}])"), "[null,null]");
        assert_eq!(run_js("JSON.stringify(undefined)"), Value::Undefined);
    }

    #[test]
    fn test_replacer_allow_list() {
        assert_eq!(run_string("JSON.stringify({a: 1, b: 2}, ['b'])"), r#"{"b":2}"#);
        assert_eq!(
            run_string("JSON.stringify({1: 'one', a: 1}, [1, 'a', 'a'])"),
            r#"{"1":"one","a":1}"#
        );
    }

    #[test]
    fn test_replacer_function() {
        assert_eq!(
            run_string(
                "JSON.stringify({a: 1, b: 'x'}, function (k, v) { return typeof v === 'number' ? v * 10 : v; })"
            ),
            r#"{"a":10,"b":"x"}"#
        );
    }

    #[test]
    fn test_indentation() {
        assert_eq!(run_string("JSON.stringify({a: 1}, null, 2)"), "{\n  \"a\": 1\n}");
        assert_eq!(
            run_string("JSON.stringify({a: 1}, null, 11)"),
            format!("{{\n{}\"a\": 1\n}}", " ".repeat(10))
        );
        assert_eq!(
            run_string("JSON.stringify({a: [1, 2]}, null, '--')"),
            "{\n--\"a\": [\n----1,\n----2\n--]\n}"
        );
        assert_eq!(
            run_string("JSON.stringify([1], null, 'abcdefghijkl')"),
            "[\nabcdefghij1\n]"
        );
    }

    #[test]
    fn test_to_json_is_applied_first() {
        assert_eq!(
            run_string("JSON.stringify({d: {toJSON: function (key) { return key + '!'; }}})"),
            r#"{"d":"d!"}"#
        );
    }

    #[test]
    fn test_cycle_is_a_type_error() {
        let mut session = session();
        let value = run_in(&mut session, "let a = {}; a.self = a; JSON.stringify(a)");
        assert!(value.is_unknown());
        let diagnostics = session.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, ErrorKind::TypeError);
        assert!(diagnostics[0].is_recovered());
    }

    #[test]
    fn test_cycle_throws_in_exact_mode() {
        let mut session = exact_session();
        let thrown = run_throw(&mut session, "var a = [1]; a[1] = a; JSON.stringify(a)");
        let (name, message) = error_parts(&thrown);
        assert_eq!(name, "TypeError");
        assert_eq!(message, "Converting circular structure to JSON");
    }

    #[test]
    fn test_shared_references_are_not_cycles() {
        assert_eq!(
            run_string("var s = {v: 1}; JSON.stringify([s, s, {x: s}])"),
            r#"[{"v":1},{"v":1},{"x":{"v":1}}]"#
        );
    }

    #[test]
    fn test_unknown_member_aborts() {
        let mut session = session();
        assert!(run_in(&mut session, "JSON.stringify({a: 1, b: [Math.random()]})").is_unknown());
        assert!(session.diagnostics().is_empty());
    }
}

mod parse {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_values() {
        assert_eq!(run_number("JSON.parse('[1, 2, 3]')[2]"), 3.0);
        assert_eq!(run_string("JSON.parse('{\"a\": {\"b\": \"deep\"}}').a.b"), "deep");
        assert_eq!(run_js("JSON.parse('null')"), Value::Null);
        assert_eq!(run_number("JSON.parse('[1, 2, 3]').length"), 3.0);
    }

    #[test]
    fn test_round_trip() {
        for text in [
            r#"{"a":1,"b":[true,false,null],"c":{"d":"e"}}"#,
            r#"[1.5,-2,"x\"y",[],{}]"#,
            r#""plain""#,
            "-0.25",
        ] {
            let code = format!("JSON.stringify(JSON.parse('{}'))", text.replace('\\', "\\\\"));
            assert_eq!(run_string(&code), text);
        }
    }

    #[test]
    fn test_key_order_is_preserved() {
        assert_eq!(
            run_string("JSON.stringify(JSON.parse('{\"z\":1,\"a\":2,\"m\":3}'))"),
            r#"{"z":1,"a":2,"m":3}"#
        );
    }

    #[test]
    fn test_reviver() {
        assert_eq!(
            run_string(
                "JSON.stringify(JSON.parse('{\"a\":1,\"b\":2,\"c\":{\"d\":3}}', \
                 function (k, v) { return k === 'b' ? undefined : (typeof v === 'number' ? v + 1 : v); }))"
            ),
            r#"{"a":2,"c":{"d":4}}"#
        );
    }

    #[test]
    fn test_reviver_sees_root_under_empty_key() {
        assert_eq!(
            run_string("JSON.parse('[1]', function (k, v) { return k === '' ? 'root' : v; })"),
            "root"
        );
    }

    #[test]
    fn test_malformed_text_is_always_recovered() {
        for mut analysis in [session(), exact_session()] {
            let value = run_in(&mut analysis, "JSON.parse('{\"a\":')");
            assert!(value.is_unknown());
            let diagnostics = analysis.diagnostics();
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].kind, ErrorKind::SyntaxError);
            assert!(diagnostics[0].is_recovered());
        }
    }
}
