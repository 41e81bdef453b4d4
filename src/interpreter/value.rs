//! The runtime value universe.
//!
//! Lists and maps are heap-allocated and shared by reference: cloning a
//! [Value] clones the handle, not the container, so mutation is visible
//! through every alias.

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::parser::ast::{Block, Param};

use super::environment::Environment;
use super::error::{RuntimeError, RuntimeResult};

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<MapValue>>),
    Function(Rc<Function>),
    Native(NativeFunction),
}

impl Value {
    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(elements)))
    }

    pub fn map(map: MapValue) -> Value {
        Value::Map(Rc::new(RefCell::new(map)))
    }

    /// The type tag reported by `__intrinsic_typeof` and checked by
    /// gradual-type enforcement.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Function(_) => "Function",
            Value::Native(_) => "NativeFunction",
        }
    }

    /// Only null and false are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => f.write_str(&format_float(*value)),
            Value::String(value) => write!(f, "\"{}\"", escape_string(value)),
            Value::List(elements) => {
                let elements = elements.borrow();
                let parts = elements
                    .iter()
                    .map(|element| element.to_string())
                    .collect::<Vec<_>>();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Map(map) => write!(f, "{}", map.borrow()),
            Value::Function(function) => write!(f, "<fn {}>", function.name),
            Value::Native(native) => write!(f, "<fn {}>", native.name),
        }
    }
}

/// Floats always render with a decimal point so they stay
/// distinguishable from Ints.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Re-encode the escapes the lexer decodes.
fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}

/// The canonical form of a map key. Only primitive values can be keys,
/// and Int/Float keys addressing the same numeric value share a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Null,
    Bool(bool),
    /// Bit pattern of the numeric value as a float.
    Num(u64),
    Str(String),
}

impl MapKey {
    pub fn for_value(value: &Value) -> RuntimeResult<MapKey> {
        match value {
            Value::Null => Ok(MapKey::Null),
            Value::Bool(value) => Ok(MapKey::Bool(*value)),
            Value::Int(value) => Ok(MapKey::num(*value as f64)),
            Value::Float(value) => Ok(MapKey::num(*value)),
            Value::String(value) => Ok(MapKey::Str(value.clone())),
            other => Err(RuntimeError::new(format!(
                "Unhashable key type: {}",
                other.type_name()
            ))),
        }
    }

    fn num(value: f64) -> MapKey {
        // 0.0 and -0.0 address the same slot
        let value = if value == 0.0 { 0.0 } else { value };
        MapKey::Num(value.to_bits())
    }
}

/// An insertion-ordered map. Each slot keeps the key as originally
/// written for display, next to the stored value.
#[derive(Debug, Default)]
pub struct MapValue {
    entries: IndexMap<MapKey, (Value, Value)>,
}

impl MapValue {
    pub fn set(&mut self, key: Value, value: Value) -> RuntimeResult<()> {
        let canonical = MapKey::for_value(&key)?;
        self.entries.insert(canonical, (key, value));
        Ok(())
    }

    /// A missing key reads as null.
    pub fn get(&self, key: &Value) -> RuntimeResult<Value> {
        let canonical = MapKey::for_value(key)?;
        Ok(self
            .entries
            .get(&canonical)
            .map(|(_, value)| value.clone())
            .unwrap_or(Value::Null))
    }

    pub fn has(&self, key: &Value) -> RuntimeResult<bool> {
        let canonical = MapKey::for_value(key)?;
        Ok(self.entries.contains_key(&canonical))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("{}");
        }
        let parts = self
            .entries
            .values()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>();
        write!(f, "{{ {} }}", parts.join(", "))
    }
}

/// A user-defined function together with the environment frame captured
/// at its creation site.
#[derive(Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Block,
    pub closure: Environment,
}

impl fmt::Debug for Function {
    // the closure chain can reach back to this function; never traverse it
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// A host-implemented function bound in the global frame.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    /// Required argument count; `None` accepts any arity.
    pub arity: Option<usize>,
    pub callback: fn(&[Value]) -> RuntimeResult<Value>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_primitives() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(3.5).to_string(), "3.5");
        assert_eq!(Value::Float(12.0).to_string(), "12.0");
        assert_eq!(Value::String("hi".into()).to_string(), "\"hi\"");
    }

    #[test]
    fn test_display_escapes_strings() {
        assert_eq!(
            Value::String("a\nb\t\"c\"\\".into()).to_string(),
            r#""a\nb\t\"c\"\\""#
        );
    }

    #[test]
    fn test_display_list() {
        let list = Value::list(vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
        assert_eq!(list.to_string(), "[10, 20, 30]");
        assert_eq!(Value::list(vec![]).to_string(), "[]");
    }

    #[test]
    fn test_display_map_preserves_insertion_order() {
        let mut map = MapValue::default();
        map.set(Value::String("b".into()), Value::Int(2)).unwrap();
        map.set(Value::String("a".into()), Value::Int(1)).unwrap();
        assert_eq!(Value::map(map).to_string(), "{ \"b\": 2, \"a\": 1 }");
    }

    #[test]
    fn test_map_unifies_numeric_keys() {
        let mut map = MapValue::default();
        map.set(Value::Int(1), Value::String("a".into())).unwrap();
        assert_eq!(
            map.get(&Value::Float(1.0)).unwrap().to_string(),
            "\"a\""
        );

        map.set(Value::Float(2.0), Value::String("b".into())).unwrap();
        assert_eq!(map.get(&Value::Int(2)).unwrap().to_string(), "\"b\"");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_map_missing_key_reads_null() {
        let map = MapValue::default();
        assert!(matches!(map.get(&Value::Int(7)).unwrap(), Value::Null));
    }

    #[test]
    fn test_unhashable_map_key() {
        let mut map = MapValue::default();
        let error = map
            .set(Value::list(vec![]), Value::Int(1))
            .unwrap_err();
        assert_eq!(error.message, "Unhashable key type: List");
    }

    #[test]
    fn test_bool_keys_are_distinct_from_numeric_keys() {
        let mut map = MapValue::default();
        map.set(Value::Bool(true), Value::Int(1)).unwrap();
        assert!(matches!(map.get(&Value::Int(1)).unwrap(), Value::Null));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::Float(0.0).is_truthy());
        assert!(Value::String("".into()).is_truthy());
        assert!(Value::list(vec![]).is_truthy());
        assert!(Value::map(MapValue::default()).is_truthy());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "Null");
        assert_eq!(Value::Int(1).type_name(), "Int");
        assert_eq!(Value::Float(1.0).type_name(), "Float");
        assert_eq!(Value::String("".into()).type_name(), "String");
        assert_eq!(Value::list(vec![]).type_name(), "List");
        assert_eq!(Value::map(MapValue::default()).type_name(), "Map");
    }
}
