//! Built-in functions and objects
//!
//! This module provides the global functions (`eval`, `parseInt`, the URI
//! codec, ...) and the `Math` and `JSON` objects. Every body is wrapped with
//! [`guarded`] when it is installed.

mod global;
mod json;
mod math;
mod uri;

pub use global::{parse_float_str, parse_int_str};
pub use uri::{decode, encode, URI_RESERVED, URI_UNESCAPED};

use super::native::{guarded, NativeBody};
use super::value::{Attributes, Object, ObjectClass, ObjectRef, Value};

/// Install all globals on the global object
pub fn install(global: &ObjectRef) {
    global.define("NaN", Value::Number(f64::NAN), Attributes::READ_ONLY);
    global.define("Infinity", Value::Number(f64::INFINITY), Attributes::READ_ONLY);
    global.define("undefined", Value::Undefined, Attributes::READ_ONLY);

    global::register(global);
    uri::register(global);
    global.define("Math", math::create(), Attributes::METHOD);
    global.define("JSON", json::create(), Attributes::METHOD);
}

/// Define a built-in method: non-enumerable, writable, configurable
fn define_method(target: &ObjectRef, name: &'static str, arity: usize, body: NativeBody) {
    target.define(name, Value::new_function(guarded(name, arity, body)), Attributes::METHOD);
}

/// Create an empty namespace object such as `Math`
fn namespace(class: ObjectClass) -> ObjectRef {
    ObjectRef::new(Object::new(class))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_property_attributes() {
        let global = ObjectRef::new(Object::new(ObjectClass::Object));
        install(&global);
        let object = global.borrow();

        let parse_int = object.get_own("parseInt").unwrap();
        assert_eq!(parse_int.attributes, Attributes::METHOD);
        assert!(parse_int.value.is_callable());
        assert_eq!(parse_int.value.get_property("length"), Value::Number(2.0));

        let nan = object.get_own("NaN").unwrap();
        assert_eq!(nan.attributes, Attributes::READ_ONLY);
        assert!(object.enumerable_keys().is_empty());
    }
}
