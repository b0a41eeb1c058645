//! Integration tests for `eval` and the execution context stack

mod common;
use common::{error_parts, exact_session, run_in, run_js, run_number, run_throw, session};
use jsabstract::{AnalysisOptions, Completion, ErrorKind, Session, Value};

mod evaluation {
    use super::*;

    #[test]
    fn test_eval_expression() {
        assert_eq!(run_number("eval('1+1')"), 2.0);
        assert_eq!(run_number("eval('var a = 2; a * 21')"), 42.0);
    }

    #[test]
    fn test_eval_non_string_is_returned_unchanged() {
        assert_eq!(run_number("eval(42)"), 42.0);
        assert_eq!(run_js("var o = {}; eval(o) === o"), Value::Boolean(true));
        assert_eq!(run_js("eval()"), Value::Undefined);
    }

    #[test]
    fn test_eval_empty_completion_is_undefined() {
        assert_eq!(run_js("eval('var x = 1;')"), Value::Undefined);
        assert_eq!(run_js("eval('')"), Value::Undefined);
    }

    #[test]
    fn test_unknown_argument() {
        let mut session = session();
        assert!(run_in(&mut session, "eval(Math.random())").is_unknown());
        assert!(session.diagnostics().is_empty());
    }
}

mod syntax_errors {
    use super::*;

    #[test]
    fn test_syntax_error_is_recovered_by_default() {
        let mut session = session();
        let value = run_in(&mut session, "eval('{')");
        assert!(value.is_unknown());
        let diagnostics = session.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, ErrorKind::SyntaxError);
        assert!(diagnostics[0].is_recovered());
    }

    #[test]
    fn test_syntax_error_is_thrown_in_exact_mode() {
        let mut session = exact_session();
        let thrown = run_throw(&mut session, "eval('{')");
        let (name, message) = error_parts(&thrown);
        assert_eq!(name, "SyntaxError");
        assert_eq!(message, "Unexpected end of input");
    }

    #[test]
    fn test_syntax_error_is_thrown_inside_try() {
        let value = run_js("var r; try { eval('1 +') } catch (e) { r = e.name } r");
        assert_eq!(value, Value::String("SyntaxError".into()));
    }

    #[test]
    fn test_syntax_error_is_thrown_without_recovery() {
        let mut session = Session::new(AnalysisOptions::default().with_recovery(false));
        let thrown = run_throw(&mut session, "eval('var')");
        assert_eq!(error_parts(&thrown).0, "SyntaxError");
    }
}

mod completions {
    use super::*;

    #[test]
    fn test_thrown_error_keeps_its_name() {
        let value = run_js(
            "var r; try { eval('decodeURI(\"%\")') } catch (e) { r = e.name + '|' + e.message } r",
        );
        // inside the try, the URIError is thrown and rethrown by eval
        assert_eq!(value, Value::String("URIError|URI malformed".into()));
    }

    #[test]
    fn test_rethrown_error_is_reported_once() {
        let mut session = exact_session();
        let thrown = run_throw(&mut session, "eval('decodeURI(\"%\")')");
        assert_eq!(error_parts(&thrown).0, "URIError");
        let diagnostics = session.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, ErrorKind::UriError);
        assert!(!diagnostics[0].is_recovered());
    }

    #[test]
    fn test_thrown_non_error_is_wrapped() {
        let mut session = session();
        let thrown = run_throw(&mut session, "eval('throw 5')");
        assert_eq!(error_parts(&thrown), ("Error".to_string(), "5".to_string()));
    }

    #[test]
    fn test_thrown_unknown_stays_unknown() {
        let mut session = session();
        let thrown = run_throw(&mut session, "eval('throw Math.random()')");
        assert!(thrown.is_unknown());
    }
}

mod scoping {
    use super::*;

    #[test]
    fn test_direct_eval_sees_caller_scope() {
        assert_eq!(
            run_number("function f() { var local = 7; return eval('local * 2'); } f()"),
            14.0
        );
    }

    #[test]
    fn test_direct_eval_declares_in_caller() {
        assert_eq!(run_number("function f() { eval('var v = 3'); return v; } f()"), 3.0);
    }

    #[test]
    fn test_strict_eval_keeps_its_declarations() {
        assert_eq!(
            run_js("function f() { eval('\"use strict\"; var v = 3'); return typeof v; } f()"),
            Value::String("undefined".into())
        );
    }

    #[test]
    fn test_indirect_eval_uses_global_scope() {
        let mut session = session();
        let value = run_in(
            &mut session,
            "var scope = 'global'; function f() { var scope = 'local'; var e = eval; return e('scope'); } f()",
        );
        assert_eq!(value, Value::String("global".into()));
    }
}

mod context_balance {
    use super::*;

    fn eval_with(session: &mut Session, source: &str) -> Completion {
        let before = session.context_depth();
        let completion = session.call_global("eval", &[Value::String(source.to_string())]);
        assert_eq!(session.context_depth(), before, "after eval({:?})", source);
        completion
    }

    #[test]
    fn test_depth_is_restored_on_every_path() {
        for mut analysis in [session(), exact_session()] {
            assert_eq!(analysis.context_depth(), 1);
            assert!(!eval_with(&mut analysis, "1 + 1").is_throw());
            eval_with(&mut analysis, "{");
            assert!(eval_with(&mut analysis, "throw missing_name").is_throw());
            assert!(eval_with(&mut analysis, "throw 1").is_throw());
            eval_with(&mut analysis, "eval('eval(\\\"{\\\")')");
        }
    }

    #[test]
    fn test_depth_is_restored_after_call_limit() {
        let mut session = Session::new(AnalysisOptions::default().with_max_call_depth(16));
        let completion = eval_with(&mut session, "function f() { return eval('f()'); } f()");
        assert!(matches!(completion, Completion::Normal(Some(Value::Unknown))));
        assert_eq!(session.diagnostics()[0].kind, ErrorKind::RangeError);
    }
}
