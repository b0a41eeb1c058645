//! Execution contexts and environments
//!
//! Contexts form a stack owned by the [`Session`]. Pushing returns a
//! [`ContextScope`] guard; the context is popped when the guard is dropped,
//! whichever way the enclosing function exits.

use super::session::Session;
use super::value::{ObjectRef, Value};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// A variable binding
#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    mutable: bool,
}

struct Scope {
    bindings: FxHashMap<String, Binding>,
    /// Backing object of the global environment
    object: Option<ObjectRef>,
    parent: Option<Environment>,
}

/// Result of assigning to a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Done,
    /// The binding is `const` or the property is read-only
    Immutable,
    /// No binding of that name exists
    Unresolved,
}

/// A lexical environment record
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// The global environment, backed by the global object
    pub fn global(object: ObjectRef) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            bindings: FxHashMap::default(),
            object: Some(object),
            parent: None,
        })))
    }

    /// A fresh declarative environment nested in `parent`
    pub fn new_declarative(parent: &Environment) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            bindings: FxHashMap::default(),
            object: None,
            parent: Some(parent.clone()),
        })))
    }

    pub fn parent(&self) -> Option<Environment> {
        self.0.borrow().parent.clone()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Create (or replace) a lexical binding in this record
    pub fn declare(&self, name: &str, value: Value, mutable: bool) {
        self.0
            .borrow_mut()
            .bindings
            .insert(name.to_string(), Binding { value, mutable });
    }

    /// Declare a `var`; an existing binding keeps its value unless one is given
    pub fn declare_var(&self, name: &str, value: Option<Value>) {
        let scope = self.0.borrow();
        if let Some(object) = &scope.object {
            if !scope.bindings.contains_key(name) {
                let exists = object.borrow().has_own(name);
                match value {
                    Some(value) => {
                        object.put(name, value);
                    }
                    None if !exists => {
                        object.put(name, Value::Undefined);
                    }
                    None => {}
                }
                return;
            }
        }
        drop(scope);
        let mut scope = self.0.borrow_mut();
        match (scope.bindings.get_mut(name), value) {
            (Some(binding), Some(value)) => binding.value = value,
            (Some(_), None) => {}
            (None, value) => {
                scope.bindings.insert(
                    name.to_string(),
                    Binding {
                        value: value.unwrap_or(Value::Undefined),
                        mutable: true,
                    },
                );
            }
        }
    }

    /// Whether this record (not its parents) binds `name`
    pub fn has_own_binding(&self, name: &str) -> bool {
        let scope = self.0.borrow();
        scope.bindings.contains_key(name)
            || scope.object.as_ref().is_some_and(|o| o.borrow().has_own(name))
    }

    /// Resolve a name through the environment chain
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let scope = env.0.borrow();
            if let Some(binding) = scope.bindings.get(name) {
                return Some(binding.value.clone());
            }
            if let Some(object) = &scope.object {
                let object = object.borrow();
                if object.has_own(name) {
                    return Some(object.get(name));
                }
            }
            current = scope.parent.clone();
        }
        None
    }

    /// Assign to the nearest binding of `name`
    pub fn assign(&self, name: &str, value: Value) -> Assignment {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let mut scope = env.0.borrow_mut();
            if let Some(binding) = scope.bindings.get_mut(name) {
                if !binding.mutable {
                    return Assignment::Immutable;
                }
                binding.value = value;
                return Assignment::Done;
            }
            if let Some(object) = &scope.object {
                if object.borrow().has_own(name) {
                    return if object.put(name, value) {
                        Assignment::Done
                    } else {
                        Assignment::Immutable
                    };
                }
            }
            current = scope.parent.clone();
        }
        Assignment::Unresolved
    }
}

/// One analysis scope on the context stack
#[derive(Clone)]
pub struct ExecutionContext {
    pub lexical_env: Environment,
    pub variable_env: Environment,
    pub this_value: Value,
    pub strict: bool,
    pub is_direct_eval: bool,
    pub filename: String,
}

/// Guard for a pushed context; pops it on drop
pub struct ContextScope<'s> {
    session: &'s mut Session,
    depth: usize,
}

impl<'s> ContextScope<'s> {
    pub(crate) fn new(session: &'s mut Session, depth: usize) -> Self {
        Self { session, depth }
    }
}

impl Deref for ContextScope<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for ContextScope<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        self.session.leave_context(self.depth);
    }
}
