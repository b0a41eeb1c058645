//! The JSON object (ES5 §15.12)
//!
//! `JSON.parse` hands the text to `serde_json` and converts the resulting tree
//! into the value model, applying the reviver bottom-up when one is given.
//! Malformed text is always a recovered SyntaxError.
//!
//! `JSON.stringify` follows the ES5 Str / Quote / JO / JA
//! algorithms. An Unknown value anywhere in the serialized graph aborts the
//! whole call with Unknown, and so does a recovered cycle.

use super::{define_method, namespace};
use crate::error::{messages, Error, ErrorKind};
use crate::runtime::completion::Fault;
use crate::runtime::convert::{integer_of, number_to_string, to_number, to_primitive, to_string};
use crate::runtime::native::{argument, CallOptions};
use crate::runtime::session::Session;
use crate::runtime::value::{Attributes, Extent, Object, ObjectClass, ObjectRef, Value};
use rustc_hash::FxHashSet;

pub(super) fn create() -> Value {
    let json = namespace(ObjectClass::Json);
    define_method(&json, "parse", 2, parse);
    define_method(&json, "stringify", 3, stringify);
    Value::Object(json)
}

// ---- JSON.parse ----

fn parse(
    session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    let Value::String(text) = to_string(&argument(args, 0)) else {
        return Ok(Value::Unknown);
    };
    let tree: serde_json::Value = match serde_json::from_str(&text) {
        Ok(tree) => tree,
        // serde_json stops at 128 levels of nesting; the text itself may be valid
        Err(error) if error.to_string().starts_with("recursion limit exceeded") => {
            session.report_recovered(ErrorKind::RangeError, messages::MAXIMUM_CALL_STACK);
            return Ok(Value::Unknown);
        }
        Err(error) => {
            session.report_recovered(ErrorKind::SyntaxError, error.to_string());
            return Ok(Value::Unknown);
        }
    };

    let reviver = argument(args, 1);
    if !reviver.is_callable() {
        return Ok(from_tree(&tree));
    }

    let value = revive(session, &tree, &reviver)?;
    let root = ObjectRef::new(Object::new(ObjectClass::Object));
    root.put("", value.clone());
    session.call_function(
        &reviver,
        &Value::Object(root),
        &[Value::String(String::new()), value],
        &CallOptions::default(),
    )
}

/// Convert a host JSON tree into the value model
fn from_tree(tree: &serde_json::Value) -> Value {
    match tree {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::new_array(items.iter().map(from_tree).collect()),
        serde_json::Value::Object(map) => {
            let object = Value::new_object();
            if let Value::Object(handle) = &object {
                for (key, item) in map {
                    handle.put(key, from_tree(item));
                }
            }
            object
        }
    }
}

/// Convert a host JSON tree, walking each member through the reviver
fn revive(session: &mut Session, tree: &serde_json::Value, reviver: &Value) -> Result<Value, Fault> {
    let (holder, members): (ObjectRef, Vec<(String, &serde_json::Value)>) = match tree {
        serde_json::Value::Array(items) => (
            ObjectRef::new(Object::new_array()),
            items
                .iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
        ),
        serde_json::Value::Object(map) => (
            ObjectRef::new(Object::new(ObjectClass::Object)),
            map.iter().map(|(key, item)| (key.clone(), item)).collect(),
        ),
        leaf => return Ok(from_tree(leaf)),
    };
    let container = Value::Object(holder.clone());

    for (key, item) in members {
        let value = revive(session, item, reviver)?;
        // Placeholder: present but hidden from enumeration until revived
        holder.put(&key, value.clone());
        holder.define(&key, value.clone(), Attributes::METHOD);

        let revived = session.call_function(
            reviver,
            &container,
            &[Value::String(key.clone()), value],
            &CallOptions::default(),
        )?;
        if revived.is_undefined() {
            holder.delete(&key);
        } else {
            holder.define(&key, revived, Attributes::DATA);
        }
    }
    Ok(container)
}

// ---- JSON.stringify ----

/// Why serialization stopped early
enum Abort {
    /// The result is not statically determinable
    Unknown,
    /// A simulated throw escaped a hook or the cycle check
    Fault(Fault),
}

impl From<Fault> for Abort {
    fn from(fault: Fault) -> Self {
        Abort::Fault(fault)
    }
}

type Step<T> = Result<T, Abort>;

fn stringify(
    session: &mut Session,
    _this: &Value,
    args: &[Value],
    _options: &CallOptions,
) -> Result<Value, Fault> {
    let value = argument(args, 0);
    let replacer = argument(args, 1);
    let space = argument(args, 2);

    let mut replacer_fn = None;
    let mut property_list = None;
    if replacer.is_callable() {
        replacer_fn = Some(replacer.clone());
    } else if let Value::Object(list) = &replacer {
        if list.class() == ObjectClass::Array {
            match allow_list(list) {
                Some(keys) => property_list = Some(keys),
                None => return Ok(Value::Unknown),
            }
        }
    }

    let space = match &space {
        Value::Object(obj) if matches!(obj.class(), ObjectClass::Number | ObjectClass::String) => {
            to_primitive(&space)
        }
        other => other.clone(),
    };
    let gap = match space {
        Value::Number(n) => " ".repeat(integer_of(n).clamp(0.0, 10.0) as usize),
        Value::String(s) => s.chars().take(10).collect(),
        Value::Unknown => return Ok(Value::Unknown),
        _ => String::new(),
    };

    let holder = ObjectRef::new(Object::new(ObjectClass::Object));
    holder.put("", value);

    let mut serializer = Serializer {
        session,
        replacer: replacer_fn,
        property_list,
        gap,
        indent: String::new(),
        stack: Vec::new(),
    };
    match serializer.serialize_property("", &holder) {
        Ok(Some(text)) => Ok(Value::String(text)),
        Ok(None) => Ok(Value::Undefined),
        Err(Abort::Unknown) => Ok(Value::Unknown),
        Err(Abort::Fault(fault)) => Err(fault),
    }
}

/// Property keys named by an array replacer, deduplicated, in order
fn allow_list(list: &ObjectRef) -> Option<Vec<String>> {
    let indexes = {
        let list = list.borrow();
        let length = match list.extent() {
            Extent::Unknown => return None,
            Extent::Walkable(length) | Extent::TooLong(length) => length,
        };
        // holes name no key, so only stored indexes are visited
        let mut indexes = list.index_keys();
        indexes.retain(|&index| index < length);
        indexes
    };
    let mut seen = FxHashSet::default();
    let mut keys: Vec<String> = Vec::new();
    for index in indexes {
        let item = list.get(&index.to_string());
        let key = match &item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(number_to_string(*n)),
            Value::Object(obj) if matches!(obj.class(), ObjectClass::Number | ObjectClass::String) => {
                Some(to_string(&item).as_str()?.to_string())
            }
            Value::Unknown => return None,
            _ => None,
        };
        if let Some(key) = key {
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
    }
    Some(keys)
}

struct Serializer<'s> {
    session: &'s mut Session,
    replacer: Option<Value>,
    property_list: Option<Vec<String>>,
    gap: String,
    indent: String,
    /// Objects currently being serialized, by identity
    stack: Vec<ObjectRef>,
}

impl Serializer<'_> {
    /// Str(key, holder); None means the member is omitted
    fn serialize_property(&mut self, key: &str, holder: &ObjectRef) -> Step<Option<String>> {
        let mut value = holder.get(key);

        if let Value::Object(obj) = &value {
            let to_json = obj.get("toJSON");
            if to_json.is_unknown() {
                return Err(Abort::Unknown);
            }
            if to_json.is_callable() {
                value = self.session.call_function(
                    &to_json,
                    &value,
                    &[Value::String(key.to_string())],
                    &CallOptions::default(),
                )?;
            }
        }

        if let Some(replacer) = &self.replacer {
            value = self.session.call_function(
                replacer,
                &Value::Object(holder.clone()),
                &[Value::String(key.to_string()), value],
                &CallOptions::default(),
            )?;
        }

        if let Value::Object(obj) = &value {
            value = match obj.class() {
                ObjectClass::Number => to_number(&value),
                ObjectClass::String => to_string(&value),
                ObjectClass::Boolean => to_primitive(&value),
                _ => value,
            };
        }

        match value {
            Value::Null => Ok(Some("null".to_string())),
            Value::Boolean(b) => Ok(Some(b.to_string())),
            Value::String(s) => quote(&s).map(Some),
            Value::Number(n) if n.is_finite() => Ok(Some(number_to_string(n))),
            Value::Number(_) => Ok(Some("null".to_string())),
            Value::Unknown => Err(Abort::Unknown),
            Value::Object(obj) if obj.callable().is_none() => {
                if obj.class() == ObjectClass::Array {
                    self.serialize_array(&obj).map(Some)
                } else {
                    self.serialize_object(&obj).map(Some)
                }
            }
            Value::Undefined | Value::Object(_) => Ok(None),
        }
    }

    /// Push `obj` on the cycle stack, or route the circular-structure fault
    fn enter(&mut self, obj: &ObjectRef) -> Step<()> {
        if self.stack.iter().any(|active| active.ptr_eq(obj)) {
            return Err(self.fault(ErrorKind::TypeError, messages::CIRCULAR_STRUCTURE));
        }
        self.stack.push(obj.clone());
        Ok(())
    }

    /// Route a fault through the channel; a recovered fault aborts with Unknown
    fn fault(&mut self, kind: ErrorKind, message: &str) -> Abort {
        match self.session.recoverable(kind, message) {
            Ok(_) => Abort::Unknown,
            Err(fault) => Abort::Fault(fault),
        }
    }

    /// JO(value)
    fn serialize_object(&mut self, obj: &ObjectRef) -> Step<String> {
        self.enter(obj)?;
        let stepback = self.indent.clone();
        self.indent.push_str(&self.gap);

        let keys = match &self.property_list {
            Some(list) => list.clone(),
            None => obj.borrow().enumerable_keys(),
        };
        let members = self.object_members(obj, &keys);
        let result = members.map(|partial| self.join(&partial, '{', '}', &stepback));

        self.indent = stepback;
        self.stack.pop();
        result
    }

    fn object_members(&mut self, obj: &ObjectRef, keys: &[String]) -> Step<Vec<String>> {
        let separator = if self.gap.is_empty() { ":" } else { ": " };
        let mut partial = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(text) = self.serialize_property(key, obj)? {
                partial.push(format!("{}{}{}", quote(key)?, separator, text));
            }
        }
        Ok(partial)
    }

    /// JA(value)
    fn serialize_array(&mut self, obj: &ObjectRef) -> Step<String> {
        self.enter(obj)?;
        let stepback = self.indent.clone();
        self.indent.push_str(&self.gap);

        let elements = self.array_elements(obj);
        let result = elements.map(|partial| self.join(&partial, '[', ']', &stepback));

        self.indent = stepback;
        self.stack.pop();
        result
    }

    fn array_elements(&mut self, obj: &ObjectRef) -> Step<Vec<String>> {
        let extent = obj.borrow().extent();
        let length = match extent {
            Extent::Walkable(length) => length,
            Extent::Unknown => return Err(Abort::Unknown),
            Extent::TooLong(_) => {
                return Err(self.fault(ErrorKind::RangeError, messages::INVALID_STRING_LENGTH))
            }
        };
        let mut partial = Vec::new();
        for index in 0..length {
            let text = self.serialize_property(&index.to_string(), obj)?;
            partial.push(text.unwrap_or_else(|| "null".to_string()));
        }
        Ok(partial)
    }

    fn join(&self, partial: &[String], open: char, close: char, stepback: &str) -> String {
        if partial.is_empty() {
            format!("{}{}", open, close)
        } else if self.gap.is_empty() {
            format!("{}{}{}", open, partial.join(","), close)
        } else {
            let separator = format!(",\n{}", self.indent);
            format!(
                "{}\n{}{}\n{}{}",
                open,
                self.indent,
                partial.join(&separator),
                stepback,
                close
            )
        }
    }
}

/// Quote(value)
fn quote(s: &str) -> Step<String> {
    serde_json::to_string(s)
        .map_err(|e| Abort::Fault(Fault::Internal(Error::InternalError(e.to_string()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b\\c").ok(), Some(r#""a\"b\\c""#.to_string()));
        assert_eq!(quote("line\nbreak\t").ok(), Some(r#""line\nbreak\t""#.to_string()));
        assert_eq!(quote("\u{1}").ok(), Some(r#""\u0001""#.to_string()));
    }

    #[test]
    fn test_from_tree_keeps_member_order() {
        let tree: serde_json::Value = serde_json::from_str(r#"{"z":1,"a":[true,null],"m":"x"}"#).unwrap();
        let value = from_tree(&tree);
        let keys = value.as_object().unwrap().borrow().keys();
        assert_eq!(keys, vec!["z", "a", "m"]);
        let array = value.get_property("a");
        assert_eq!(array.get_property("length"), Value::Number(2.0));
        assert_eq!(array.get_property("0"), Value::Boolean(true));
    }

    use crate::config::AnalysisOptions;
    use crate::runtime::Completion;

    fn stringify_with(session: &mut Session, args: &[Value]) -> Completion {
        let json = session.global_object().get("JSON");
        let stringify = json.get_property("stringify");
        session.call(&stringify, &json, args)
    }

    fn stringify_text(args: &[Value]) -> String {
        let mut session = Session::new(AnalysisOptions::default());
        match stringify_with(&mut session, args) {
            Completion::Normal(Some(Value::String(text))) => text,
            other => panic!("expected a string, got {:?}", other),
        }
    }

    #[test]
    fn test_boxed_primitives_collapse() {
        let boxed = Value::new_array(vec![
            Value::new_boxed(Value::Number(3.0)),
            Value::new_boxed(Value::String("x".into())),
            Value::new_boxed(Value::Boolean(false)),
        ]);
        assert_eq!(stringify_text(&[boxed]), r#"[3,"x",false]"#);
        assert_eq!(stringify_text(&[Value::new_boxed(Value::Number(f64::NAN))]), "null");
    }

    #[test]
    fn test_boxed_space_argument() {
        let value = Value::new_array(vec![Value::Number(1.0)]);
        assert_eq!(
            stringify_text(&[value.clone(), Value::Null, Value::new_boxed(Value::Number(2.0))]),
            "[\n  1\n]"
        );
        assert_eq!(
            stringify_text(&[value, Value::Null, Value::new_boxed(Value::String("--".into()))]),
            "[\n--1\n]"
        );
    }

    #[test]
    fn test_unwalkable_array_length() {
        let array = Value::new_array(vec![]);
        array.as_object().unwrap().put("length", Value::Number(4294967295.0));

        let mut session = Session::new(AnalysisOptions::default());
        let completion = stringify_with(&mut session, &[array.clone()]);
        assert!(matches!(completion, Completion::Normal(Some(Value::Unknown))));
        assert_eq!(session.diagnostics().len(), 1);
        assert_eq!(session.diagnostics()[0].kind, ErrorKind::RangeError);

        let mut session = Session::new(AnalysisOptions::exact());
        match stringify_with(&mut session, &[array]) {
            Completion::Throw(Some(error)) => {
                assert_eq!(error.get_property("name"), Value::String("RangeError".into()));
            }
            other => panic!("expected a RangeError, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_array_length_aborts() {
        let array = Value::new_array(vec![Value::Number(1.0)]);
        array.as_object().unwrap().put("length", Value::Unknown);
        let mut session = Session::new(AnalysisOptions::default());
        let completion = stringify_with(&mut session, &[array]);
        assert!(matches!(completion, Completion::Normal(Some(Value::Unknown))));
        assert!(session.diagnostics().is_empty());
    }

    #[test]
    fn test_sparse_allow_list() {
        let list = Value::new_array(vec![Value::String("a".into())]);
        list.as_object().unwrap().put("length", Value::Number(4294967295.0));
        let keys = allow_list(list.as_object().unwrap()).unwrap();
        assert_eq!(keys, vec!["a"]);
    }

    #[test]
    fn test_reviver_holder_hides_pending_member() {
        let mut session = Session::new(AnalysisOptions::default());
        let completion = session
            .run(
                "var seen = ''; \
                 JSON.parse('{\"a\":1,\"b\":2}', function (k, v) { \
                   if (k === 'b') { seen = JSON.stringify(this) + '|' + (this[k] === v); } \
                   return v; \
                 }); seen",
            )
            .unwrap();
        match completion {
            Completion::Normal(Some(Value::String(seen))) => assert_eq!(seen, r#"{"a":1}|true"#),
            other => panic!("expected a string, got {:?}", other),
        }
    }

    #[test]
    fn test_deep_nesting_is_a_range_error() {
        let mut session = Session::new(AnalysisOptions::default());
        let json = session.global_object().get("JSON");
        let parse = json.get_property("parse");
        let text = format!("{}{}", "[".repeat(200), "]".repeat(200));
        let completion = session.call(&parse, &json, &[Value::String(text)]);
        assert!(matches!(completion, Completion::Normal(Some(Value::Unknown))));
        assert_eq!(session.diagnostics()[0].kind, ErrorKind::RangeError);
    }

    #[test]
    fn test_allow_list_dedupes() {
        let list = Value::new_array(vec![
            Value::String("b".into()),
            Value::Number(1.0),
            Value::String("b".into()),
            Value::Null,
            Value::new_boxed(Value::String("c".into())),
        ]);
        let keys = allow_list(list.as_object().unwrap()).unwrap();
        assert_eq!(keys, vec!["b", "1", "c"]);
    }
}
