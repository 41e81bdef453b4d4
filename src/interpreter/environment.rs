//! Lexical environments: a parent-linked chain of mutable frames.
//!
//! Frames are reference-counted because closures keep their defining
//! frame alive past the block that created it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::error::{RuntimeError, RuntimeResult};
use super::value::Value;

#[derive(Default)]
struct Frame {
    parent: Option<Environment>,
    values: HashMap<String, Value>,
    /// Declared type per name; `None` means the name was declared
    /// without an annotation.
    types: HashMap<String, Option<String>>,
}

#[derive(Clone, Default)]
pub struct Environment {
    frame: Rc<RefCell<Frame>>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment::default()
    }

    /// A fresh frame whose parent is this one.
    pub fn child(&self) -> Environment {
        Environment {
            frame: Rc::new(RefCell::new(Frame {
                parent: Some(self.clone()),
                ..Frame::default()
            })),
        }
    }

    /// Bind a new name in this frame. Re-declaring a name that already
    /// lives in the same frame is an error; shadowing an outer frame is
    /// fine.
    pub fn define(
        &self,
        name: &str,
        value: Value,
        type_name: Option<String>,
    ) -> RuntimeResult<()> {
        let mut frame = self.frame.borrow_mut();
        if frame.values.contains_key(name) {
            return Err(RuntimeError::new(format!(
                "Variable '{name}' is already declared in this scope"
            )));
        }
        frame.values.insert(name.to_owned(), value);
        frame.types.insert(name.to_owned(), type_name);
        Ok(())
    }

    /// Update an existing binding, searching from the innermost frame
    /// outwards. Fails if the name is not bound anywhere.
    pub fn assign(&self, name: &str, value: Value) -> RuntimeResult<()> {
        let parent = {
            let mut frame = self.frame.borrow_mut();
            if let Some(slot) = frame.values.get_mut(name) {
                *slot = value;
                return Ok(());
            }
            frame.parent.clone()
        };

        match parent {
            Some(parent) => parent.assign(name, value),
            None => Err(RuntimeError::new(format!("Undefined variable '{name}'"))),
        }
    }

    pub fn get(&self, name: &str) -> RuntimeResult<Value> {
        let parent = {
            let frame = self.frame.borrow();
            if let Some(value) = frame.values.get(name) {
                return Ok(value.clone());
            }
            frame.parent.clone()
        };

        match parent {
            Some(parent) => parent.get(name),
            None => Err(RuntimeError::new(format!("Undefined variable '{name}'"))),
        }
    }

    /// The declared type of the innermost binding of `name`, if any.
    pub fn declared_type(&self, name: &str) -> Option<String> {
        let parent = {
            let frame = self.frame.borrow();
            if let Some(type_name) = frame.types.get(name) {
                return type_name.clone();
            }
            frame.parent.clone()
        };

        parent.and_then(|parent| parent.declared_type(name))
    }
}

impl fmt::Debug for Environment {
    // frames can be cyclic through closures stored in them; print the
    // bound names only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.frame.borrow();
        let mut names = frame.values.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_parent", &frame.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_then_get() {
        let env = Environment::new();
        env.define("x", Value::Int(1), None).unwrap();

        assert!(matches!(env.get("x").unwrap(), Value::Int(1)));
    }

    #[test]
    fn test_get_walks_parent_chain() {
        let global = Environment::new();
        global.define("x", Value::Int(1), None).unwrap();
        let inner = global.child().child();

        assert!(matches!(inner.get("x").unwrap(), Value::Int(1)));
    }

    #[test]
    fn test_get_unknown_name_fails() {
        let env = Environment::new();
        let error = env.get("nope").unwrap_err();
        assert_eq!(error.message, "Undefined variable 'nope'");
    }

    #[test]
    fn test_assign_mutates_innermost_binding() {
        let global = Environment::new();
        global.define("x", Value::Int(1), None).unwrap();
        let inner = global.child();
        inner.define("x", Value::Int(2), None).unwrap();

        inner.assign("x", Value::Int(3)).unwrap();

        assert!(matches!(inner.get("x").unwrap(), Value::Int(3)));
        assert!(matches!(global.get("x").unwrap(), Value::Int(1)));
    }

    #[test]
    fn test_assign_reaches_outer_frame() {
        let global = Environment::new();
        global.define("x", Value::Int(1), None).unwrap();
        let inner = global.child();

        inner.assign("x", Value::Int(5)).unwrap();

        assert!(matches!(global.get("x").unwrap(), Value::Int(5)));
    }

    #[test]
    fn test_assign_unknown_name_fails() {
        let env = Environment::new();
        let error = env.assign("nope", Value::Null).unwrap_err();
        assert_eq!(error.message, "Undefined variable 'nope'");
    }

    #[test]
    fn test_redeclaration_in_same_frame_fails() {
        let env = Environment::new();
        env.define("x", Value::Int(1), None).unwrap();

        let error = env.define("x", Value::Int(2), None).unwrap_err();
        assert_eq!(
            error.message,
            "Variable 'x' is already declared in this scope"
        );
    }

    #[test]
    fn test_shadowing_in_child_frame_is_allowed() {
        let global = Environment::new();
        global.define("x", Value::Int(1), None).unwrap();
        let inner = global.child();

        inner.define("x", Value::Int(2), None).unwrap();
        assert!(matches!(inner.get("x").unwrap(), Value::Int(2)));
    }

    #[test]
    fn test_declared_type_comes_from_innermost_binding() {
        let global = Environment::new();
        global
            .define("x", Value::Int(1), Some("Int".into()))
            .unwrap();
        let inner = global.child();
        inner.define("x", Value::Null, None).unwrap();

        assert_eq!(inner.declared_type("x"), None);
        assert_eq!(global.declared_type("x"), Some("Int".into()));
    }

    #[test]
    fn test_declared_type_walks_parent_chain() {
        let global = Environment::new();
        global
            .define("x", Value::Int(1), Some("Int".into()))
            .unwrap();
        let inner = global.child();

        assert_eq!(inner.declared_type("x"), Some("Int".into()));
    }
}
