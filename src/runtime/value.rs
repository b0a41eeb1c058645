//! JavaScript value types
//!
//! This module defines the abstract-interpretation representation of
//! ECMAScript values. Besides the six language types it carries
//! [`Value::Unknown`], the value of anything that cannot be derived statically.

use super::convert;
use super::native::Callable;
use crate::error::ErrorKind;
use bitflags::bitflags;
use indexmap::IndexMap;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// A JavaScript value
#[derive(Clone)]
pub enum Value {
    /// undefined
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Object (includes arrays, functions, errors, wrappers)
    Object(ObjectRef),
    /// Not statically determinable
    Unknown,
}

/// Classification tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object,
    Unknown,
}

impl ValueType {
    /// The specification name of the type
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Undefined => "Undefined",
            ValueType::Null => "Null",
            ValueType::Boolean => "Boolean",
            ValueType::Number => "Number",
            ValueType::String => "String",
            ValueType::Object => "Object",
            ValueType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether any of the values is [`Value::Unknown`]
pub fn any_unknown<'a>(values: impl IntoIterator<Item = &'a Value>) -> bool {
    values.into_iter().any(Value::is_unknown)
}

impl Value {
    /// Classify the value
    pub fn type_of(&self) -> ValueType {
        match self {
            Value::Undefined => ValueType::Undefined,
            Value::Null => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Object(_) => ValueType::Object,
            Value::Unknown => ValueType::Unknown,
        }
    }

    /// Check if value is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is nullish (null or undefined)
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Check if value is the indeterminate value
    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Check if value is an object with a callable body
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Object(obj) => obj.callable().is_some(),
            _ => false,
        }
    }

    /// The number, if this is a Number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string contents, if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The object handle, if this is an Object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The class of the object, if this is an Object
    pub fn class(&self) -> Option<ObjectClass> {
        self.as_object().map(ObjectRef::class)
    }

    /// Strict equality (===)
    ///
    /// Unknown is never strictly equal to anything, itself included.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Create a new ordinary object value
    pub fn new_object() -> Value {
        Value::Object(ObjectRef::new(Object::new(ObjectClass::Object)))
    }

    /// Create a new array value
    pub fn new_array(elements: Vec<Value>) -> Value {
        let mut array = Object::new_array();
        for (index, element) in elements.into_iter().enumerate() {
            array.put(&index.to_string(), element);
        }
        Value::Object(ObjectRef::new(array))
    }

    /// Create a new error value with the given name and message
    pub fn new_error(name: &str, message: &str) -> Value {
        let kind = ErrorKind::from_name(name).unwrap_or(ErrorKind::GenericError);
        let mut error = Object::new(ObjectClass::Error(kind));
        error.define_own("name", PropertyDescriptor::new(Value::String(name.to_string()), Attributes::METHOD));
        error.define_own(
            "message",
            PropertyDescriptor::new(Value::String(message.to_string()), Attributes::METHOD),
        );
        Value::Object(ObjectRef::new(error))
    }

    /// Create a new function value around a callable body
    pub fn new_function(callable: Rc<dyn Callable>) -> Value {
        let mut function = Object::new(ObjectClass::Function);
        function.define_own(
            "length",
            PropertyDescriptor::new(Value::Number(callable.arity() as f64), Attributes::READ_ONLY),
        );
        function.callable = Some(callable);
        Value::Object(ObjectRef::new(function))
    }

    /// Box a primitive into its wrapper object (`new Number(1)` and friends)
    pub fn new_boxed(primitive: Value) -> Value {
        let class = match &primitive {
            Value::Boolean(_) => ObjectClass::Boolean,
            Value::Number(_) => ObjectClass::Number,
            Value::String(_) => ObjectClass::String,
            _ => return primitive,
        };
        let mut wrapper = Object::new(class);
        if let Value::String(s) = &primitive {
            wrapper.define_own(
                "length",
                PropertyDescriptor::new(Value::Number(s.encode_utf16().count() as f64), Attributes::READ_ONLY),
            );
        }
        wrapper.primitive = Some(primitive);
        Value::Object(ObjectRef::new(wrapper))
    }

    /// Read a property (own properties only; prototype chains are out of scope)
    ///
    /// Reading from Unknown yields Unknown. Reading an absent property, or any
    /// property of `undefined`/`null`, yields Undefined.
    pub fn get_property(&self, key: &str) -> Value {
        match self {
            Value::Object(obj) => obj.get(key),
            Value::String(s) => {
                if key == "length" {
                    return Value::Number(s.encode_utf16().count() as f64);
                }
                match array_index(key) {
                    Some(index) => s
                        .chars()
                        .nth(index as usize)
                        .map(|c| Value::String(c.to_string()))
                        .unwrap_or(Value::Undefined),
                    None => Value::Undefined,
                }
            }
            Value::Unknown => Value::Unknown,
            _ => Value::Undefined,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", convert::number_to_string(*n)),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Object(obj) => write!(f, "{:?}", obj),
            Value::Unknown => write!(f, "<unknown>"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match convert::to_string(self) {
            Value::String(s) => f.write_str(&s),
            _ => f.write_str("<unknown>"),
        }
    }
}

/// Return the canonical array index a property key denotes, if any
pub fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|&index| index != u32::MAX)
}

bitflags! {
    /// Attribute flags of a data property
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attributes: u8 {
        const WRITABLE = 0b001;
        const ENUMERABLE = 0b010;
        const CONFIGURABLE = 0b100;
    }
}

impl Attributes {
    /// Ordinary assignment-created property
    pub const DATA: Attributes = Attributes::all();
    /// Built-in methods: writable, configurable, not enumerable
    pub const METHOD: Attributes = Attributes::WRITABLE.union(Attributes::CONFIGURABLE);
    /// Constants: none of the flags
    pub const READ_ONLY: Attributes = Attributes::empty();
}

/// A data property descriptor
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// The property value
    pub value: Value,
    /// Attribute flags
    pub attributes: Attributes,
}

impl PropertyDescriptor {
    /// Create a descriptor
    pub fn new(value: Value, attributes: Attributes) -> Self {
        Self { value, attributes }
    }

    /// Create an ordinary writable, enumerable, configurable descriptor
    pub fn data(value: Value) -> Self {
        Self::new(value, Attributes::DATA)
    }

    pub fn writable(&self) -> bool {
        self.attributes.contains(Attributes::WRITABLE)
    }

    pub fn enumerable(&self) -> bool {
        self.attributes.contains(Attributes::ENUMERABLE)
    }

    pub fn configurable(&self) -> bool {
        self.attributes.contains(Attributes::CONFIGURABLE)
    }
}

/// Insertion-ordered property storage
#[derive(Debug, Clone, Default)]
struct PropertyMap {
    entries: IndexMap<String, PropertyDescriptor>,
}

impl PropertyMap {
    fn get(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.entries.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut PropertyDescriptor> {
        self.entries.get_mut(key)
    }

    /// Insert or replace, keeping the original position of an existing key
    fn insert(&mut self, key: &str, descriptor: PropertyDescriptor) {
        match self.entries.get_mut(key) {
            Some(slot) => *slot = descriptor,
            None => {
                self.entries.insert(key.to_string(), descriptor);
            }
        }
    }

    fn remove(&mut self, key: &str) -> Option<PropertyDescriptor> {
        self.entries.shift_remove(key)
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &PropertyDescriptor)> {
        self.entries.iter()
    }

    fn retain(&mut self, mut f: impl FnMut(&str) -> bool) {
        self.entries.retain(|key, _| f(key));
    }
}

/// Arrays longer than this are not walked element by element
pub const MAX_WALKED_LENGTH: u32 = 1 << 22;

/// How far an element-wise walk over an array may go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// Indexes `0..n`
    Walkable(u32),
    /// The `length` is Unknown
    Unknown,
    /// The `length` exceeds [`MAX_WALKED_LENGTH`]
    TooLong(u32),
}

/// Class tag of an object record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectClass {
    Object,
    Array,
    Function,
    Error(ErrorKind),
    Boolean,
    Number,
    String,
    Math,
    Json,
}

impl ObjectClass {
    /// The `[[Class]]` name
    pub fn name(self) -> &'static str {
        match self {
            ObjectClass::Object => "Object",
            ObjectClass::Array => "Array",
            ObjectClass::Function => "Function",
            ObjectClass::Error(kind) => kind.name(),
            ObjectClass::Boolean => "Boolean",
            ObjectClass::Number => "Number",
            ObjectClass::String => "String",
            ObjectClass::Math => "Math",
            ObjectClass::Json => "JSON",
        }
    }
}

/// A JavaScript object record
pub struct Object {
    /// Class tag
    pub class: ObjectClass,
    properties: PropertyMap,
    /// `[[PrimitiveValue]]` of wrapper objects
    pub primitive: Option<Value>,
    /// Executable body of function objects
    pub callable: Option<Rc<dyn Callable>>,
    /// Whether new properties may be added
    pub extensible: bool,
}

impl Object {
    /// Create an empty object of the given class
    pub fn new(class: ObjectClass) -> Self {
        Self {
            class,
            properties: PropertyMap::default(),
            primitive: None,
            callable: None,
            extensible: true,
        }
    }

    /// Create an empty array (with its `length` property)
    pub fn new_array() -> Self {
        let mut array = Self::new(ObjectClass::Array);
        array.define_own(
            "length",
            PropertyDescriptor::new(Value::Number(0.0), Attributes::WRITABLE),
        );
        array
    }

    /// Own property descriptor
    pub fn get_own(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(key)
    }

    /// Whether the object has the own property
    pub fn has_own(&self, key: &str) -> bool {
        self.properties.get(key).is_some()
    }

    /// Own property value, Undefined when absent
    pub fn get(&self, key: &str) -> Value {
        self.properties
            .get(key)
            .map(|p| p.value.clone())
            .unwrap_or(Value::Undefined)
    }

    /// Define (or redefine) an own property, bypassing attribute checks
    ///
    /// Returns false when an existing property is not configurable.
    pub fn define_own(&mut self, key: &str, descriptor: PropertyDescriptor) -> bool {
        if let Some(existing) = self.properties.get(key) {
            if !existing.configurable() && !(existing.writable() && descriptor.attributes == existing.attributes) {
                return false;
            }
        }
        self.properties.insert(key, descriptor);
        true
    }

    /// `[[Put]]`: assign a value, honouring `writable` and `extensible`
    ///
    /// Returns false when the assignment was rejected.
    pub fn put(&mut self, key: &str, value: Value) -> bool {
        if self.class == ObjectClass::Array {
            if key == "length" {
                return self.set_array_length(&value);
            }
            if let Some(index) = array_index(key) {
                if !self.assign(key, value) {
                    return false;
                }
                if let Some(length) = self.properties.get_mut("length") {
                    // an Unknown length stays Unknown
                    if matches!(length.value, Value::Number(n) if f64::from(index) >= n) {
                        length.value = Value::Number(f64::from(index) + 1.0);
                    }
                }
                return true;
            }
        }
        self.assign(key, value)
    }

    fn assign(&mut self, key: &str, value: Value) -> bool {
        match self.properties.get_mut(key) {
            Some(existing) => {
                if !existing.writable() {
                    return false;
                }
                existing.value = value;
                true
            }
            None if self.extensible => {
                self.properties.insert(key, PropertyDescriptor::data(value));
                true
            }
            None => false,
        }
    }

    fn set_array_length(&mut self, value: &Value) -> bool {
        if value.is_unknown() {
            return match self.properties.get_mut("length") {
                Some(length) if length.writable() => {
                    length.value = Value::Unknown;
                    true
                }
                _ => false,
            };
        }
        let Value::Number(n) = value else {
            return false;
        };
        let new_length = *n;
        if new_length < 0.0 || new_length.fract() != 0.0 || new_length > f64::from(u32::MAX) {
            return false;
        }
        self.properties.retain(|k| match array_index(k) {
            Some(index) => f64::from(index) < new_length,
            None => true,
        });
        match self.properties.get_mut("length") {
            Some(length) if length.writable() => {
                length.value = Value::Number(new_length);
                true
            }
            _ => false,
        }
    }

    /// `[[Delete]]`: remove an own property unless it is non-configurable
    pub fn delete(&mut self, key: &str) -> bool {
        match self.properties.get(key) {
            Some(p) if !p.configurable() => false,
            Some(_) => {
                self.properties.remove(key);
                true
            }
            None => true,
        }
    }

    /// All own property keys in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.properties.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Enumerable own property keys in insertion order
    pub fn enumerable_keys(&self) -> Vec<String> {
        self.properties
            .iter()
            .filter(|(_, p)| p.enumerable())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// The `length` of an array, 0 when absent or not a number
    pub fn array_length(&self) -> u32 {
        match self.get("length") {
            Value::Number(n) if n.is_finite() && n >= 0.0 => n as u32,
            _ => 0,
        }
    }

    /// The range of indexes an element-wise walk covers
    pub fn extent(&self) -> Extent {
        match self.get("length") {
            Value::Unknown => Extent::Unknown,
            _ => match self.array_length() {
                length if length > MAX_WALKED_LENGTH => Extent::TooLong(length),
                length => Extent::Walkable(length),
            },
        }
    }

    /// The array indexes present as own properties, ascending
    pub fn index_keys(&self) -> Vec<u32> {
        let mut indexes: Vec<u32> = self.properties.iter().filter_map(|(k, _)| array_index(k)).collect();
        indexes.sort_unstable();
        indexes
    }
}

/// Shared, identity-comparable handle to an object record
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    /// Wrap an object record
    pub fn new(object: Object) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address-stable identity of the record
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn class(&self) -> ObjectClass {
        self.borrow().class
    }

    /// The callable body, cloned out so no borrow is held during the call
    pub fn callable(&self) -> Option<Rc<dyn Callable>> {
        self.borrow().callable.clone()
    }

    pub fn get(&self, key: &str) -> Value {
        self.borrow().get(key)
    }

    pub fn put(&self, key: &str, value: Value) -> bool {
        self.borrow_mut().put(key, value)
    }

    pub fn define(&self, key: &str, value: Value, attributes: Attributes) -> bool {
        self.borrow_mut()
            .define_own(key, PropertyDescriptor::new(value, attributes))
    }

    pub fn delete(&self, key: &str) -> bool {
        self.borrow_mut().delete(key)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let obj = self.borrow();
        match (&obj.class, &obj.callable) {
            (ObjectClass::Function, Some(callable)) => write!(f, "[Function: {}]", callable.name()),
            (ObjectClass::Array, _) => write!(f, "[Array({})]", obj.array_length()),
            (ObjectClass::Error(_), _) => write!(f, "[{}: {:?}]", obj.get("name"), obj.get("message")),
            (class, _) => write!(f, "[object {}]", class.name()),
        }
    }
}
