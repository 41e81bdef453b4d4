//! Tree-walking evaluator for gs programs.
//!
//! The interpreter owns the global environment, installs the host
//! intrinsics, and bootstraps the standard library by running
//! `stdlib/std.gs` through the lexer and parser before any user program
//! executes.

mod environment;
mod error;
mod value;

pub use self::environment::Environment;
pub use self::error::{RuntimeError, RuntimeErrorKind, RuntimeResult, TypeError};
pub use self::value::{Function, MapKey, MapValue, NativeFunction, Value};

use std::path::PathBuf;
use std::rc::Rc;
use std::{env, fs};

use log::debug;

use crate::error::GsError;
use crate::lexer::Lexer;
use crate::parser::ast::{BinaryOp, Block, Expression, Statement, UnaryOp};
use crate::parser::Parser;

/// Outcome of executing a statement: either a regular value, or the
/// non-local return signal travelling up to the enclosing call frame.
#[derive(Debug, Clone)]
enum Flow {
    Normal(Value),
    Return(Value),
}

pub struct Interpreter {
    globals: Environment,
    env: Environment,
}

impl Interpreter {
    /// Create an interpreter with intrinsics and the `std` module
    /// installed. Failing to load the standard library is fatal.
    pub fn new() -> Result<Interpreter, GsError> {
        let globals = Environment::new();
        let mut interpreter = Interpreter {
            globals: globals.clone(),
            env: globals,
        };

        interpreter.install_intrinsics()?;
        interpreter.install_std()?;

        Ok(interpreter)
    }

    fn install_intrinsics(&mut self) -> RuntimeResult<()> {
        let natives = [
            NativeFunction {
                name: "__intrinsic_print",
                arity: Some(1),
                callback: intrinsic_print,
            },
            NativeFunction {
                name: "__intrinsic_typeof",
                arity: Some(1),
                callback: intrinsic_typeof,
            },
            NativeFunction {
                name: "__intrinsic_len",
                arity: Some(1),
                callback: intrinsic_len,
            },
        ];

        for native in natives {
            let name = native.name;
            self.globals.define(name, Value::Native(native), None)?;
        }

        Ok(())
    }

    /// Run `stdlib/std.gs` in the global environment and bind its final
    /// value (which must be a map) as `std`.
    fn install_std(&mut self) -> Result<(), GsError> {
        let path = stdlib_path();
        debug!("loading stdlib from '{}'", path.display());

        if !path.exists() {
            return Err(GsError::Runtime(RuntimeError::new(format!(
                "Missing stdlib file: {}",
                path.display()
            ))));
        }

        let source = fs::read_to_string(&path).map_err(|error| {
            GsError::Runtime(RuntimeError::new(format!(
                "Could not read stdlib file '{}': {error}",
                path.display()
            )))
        })?;

        let tokens = Lexer::new(&source).tokenize()?;
        let program = Parser::new(tokens).parse_program()?;
        let result = self.run(&program)?;

        if !matches!(result, Value::Map(_)) {
            return Err(GsError::Runtime(RuntimeError::new(
                "stdlib/std.gs must evaluate to a Map (the std module).",
            )));
        }

        self.globals.define("std", result, None)?;
        Ok(())
    }

    /// Execute a program and produce the value of its last statement.
    pub fn run(&mut self, program: &[Statement]) -> RuntimeResult<Value> {
        let mut last = Value::Null;
        for statement in program {
            match self.exec_statement(statement)? {
                Flow::Normal(value) => last = value,
                Flow::Return(_) => {
                    return Err(RuntimeError::new("'return' outside of a function"))
                }
            }
        }
        Ok(last)
    }

    fn exec_statement(&mut self, statement: &Statement) -> RuntimeResult<Flow> {
        match statement {
            Statement::Expression(expression) => Ok(Flow::Normal(self.eval(expression)?)),

            Statement::VarDecl(decl) => {
                let value = match &decl.initializer {
                    Some(initializer) => self.eval(initializer)?,
                    None => Value::Null,
                };
                enforce_type(
                    decl.type_name.as_deref(),
                    &value,
                    &format!("variable '{}'", decl.name),
                )?;
                self.env
                    .define(&decl.name, value.clone(), decl.type_name.clone())?;
                Ok(Flow::Normal(value))
            }

            Statement::Block(block) => self.exec_block(block),

            Statement::If(node) => {
                if self.eval(&node.condition)?.is_truthy() {
                    self.exec_statement(&node.then_branch)
                } else if let Some(else_branch) = &node.else_branch {
                    self.exec_statement(else_branch)
                } else {
                    Ok(Flow::Normal(Value::Null))
                }
            }

            Statement::While(node) => {
                let mut last = Value::Null;
                while self.eval(&node.condition)?.is_truthy() {
                    match self.exec_statement(&node.body)? {
                        Flow::Normal(value) => last = value,
                        signal @ Flow::Return(_) => return Ok(signal),
                    }
                }
                Ok(Flow::Normal(last))
            }

            Statement::Return(node) => {
                let value = match &node.value {
                    Some(expression) => self.eval(expression)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }

            Statement::FunctionDecl(decl) => {
                let function = Value::Function(Rc::new(Function {
                    name: decl.name.clone(),
                    params: decl.params.clone(),
                    return_type: decl.return_type.clone(),
                    body: decl.body.clone(),
                    closure: self.env.clone(),
                }));
                self.env.define(&decl.name, function.clone(), None)?;
                Ok(Flow::Normal(function))
            }
        }
    }

    /// Run a block in a fresh child frame. The previous frame is
    /// restored on every exit path, including errors and the return
    /// signal.
    fn exec_block(&mut self, block: &Block) -> RuntimeResult<Flow> {
        let previous = self.env.clone();
        self.env = previous.child();
        let result = self.exec_statements(&block.statements);
        self.env = previous;
        result
    }

    fn exec_statements(&mut self, statements: &[Statement]) -> RuntimeResult<Flow> {
        let mut last = Value::Null;
        for statement in statements {
            match self.exec_statement(statement)? {
                Flow::Normal(value) => last = value,
                signal @ Flow::Return(_) => return Ok(signal),
            }
        }
        Ok(Flow::Normal(last))
    }

    fn eval(&mut self, expression: &Expression) -> RuntimeResult<Value> {
        match expression {
            Expression::Int(value) => Ok(Value::Int(*value)),
            Expression::Float(value) => Ok(Value::Float(*value)),
            Expression::Str(value) => Ok(Value::String(value.clone())),
            Expression::Bool(value) => Ok(Value::Bool(*value)),
            Expression::Null => Ok(Value::Null),

            Expression::Ident(name) => self.env.get(name),

            Expression::List(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval(element)?);
                }
                Ok(Value::list(items))
            }

            Expression::Map(entries) => {
                let mut map = MapValue::default();
                for (key_expression, value_expression) in entries {
                    let key = self.eval(key_expression)?;
                    let value = self.eval(value_expression)?;
                    map.set(key, value)?;
                }
                Ok(Value::map(map))
            }

            Expression::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                index_get(&object, &index)
            }

            Expression::Assign { target, value } => self.eval_assign(target, value),

            Expression::Unary(op, operand) => {
                let right = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!right.is_truthy())),
                    UnaryOp::Neg => negate(right),
                }
            }

            Expression::Binary(left, op, right) => {
                let lhs = self.eval(left)?;

                // && and || short-circuit, returning the deciding
                // operand unchanged
                match op {
                    BinaryOp::And => {
                        if !lhs.is_truthy() {
                            return Ok(lhs);
                        }
                        self.eval(right)
                    }
                    BinaryOp::Or => {
                        if lhs.is_truthy() {
                            return Ok(lhs);
                        }
                        self.eval(right)
                    }
                    _ => {
                        let rhs = self.eval(right)?;
                        binary_op(lhs, *op, rhs)
                    }
                }
            }

            Expression::Call { callee, args } => {
                let callee = self.eval(callee)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                self.call(callee, values)
            }

            Expression::Attribute { object, name } => {
                let object = self.eval(object)?;
                get_attr(&object, name)
            }

            Expression::Function(node) => Ok(Value::Function(Rc::new(Function {
                name: "<anon>".to_owned(),
                params: node.params.clone(),
                return_type: node.return_type.clone(),
                body: node.body.clone(),
                closure: self.env.clone(),
            }))),
        }
    }

    fn eval_assign(&mut self, target: &Expression, value: &Expression) -> RuntimeResult<Value> {
        let value = self.eval(value)?;

        match target {
            Expression::Ident(name) => {
                let declared = self.env.declared_type(name);
                enforce_type(
                    declared.as_deref(),
                    &value,
                    &format!("assignment to '{name}'"),
                )?;
                self.env.assign(name, value.clone())?;
                Ok(value)
            }
            Expression::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                index_set(&object, &index, value)
            }
            _ => Err(RuntimeError::new("Invalid assignment target")),
        }
    }

    fn call(&mut self, callee: Value, args: Vec<Value>) -> RuntimeResult<Value> {
        match callee {
            Value::Function(function) => {
                if args.len() != function.params.len() {
                    return Err(RuntimeError::new(format!(
                        "{} expects {} args, got {}",
                        function.name,
                        function.params.len(),
                        args.len()
                    )));
                }

                // the call frame's parent is the captured closure frame,
                // not the caller's frame
                let previous = self.env.clone();
                self.env = function.closure.child();
                let result = self.call_function(&function, args);
                self.env = previous;
                result
            }

            Value::Native(native) => {
                if let Some(arity) = native.arity {
                    if args.len() != arity {
                        return Err(RuntimeError::new(format!(
                            "{} expects {arity} args, got {}",
                            native.name,
                            args.len()
                        )));
                    }
                }
                (native.callback)(&args)
            }

            other => Err(RuntimeError::new(format!(
                "Can only call functions, got {}",
                other.type_name()
            ))),
        }
    }

    fn call_function(&mut self, function: &Function, args: Vec<Value>) -> RuntimeResult<Value> {
        for (param, arg) in function.params.iter().zip(args) {
            enforce_type(
                param.type_name.as_deref(),
                &arg,
                &format!("argument '{}' of {}()", param.name, function.name),
            )?;
            self.env.define(&param.name, arg, param.type_name.clone())?;
        }

        let location = format!("return of {}()", function.name);
        match self.exec_block(&function.body)? {
            Flow::Return(value) => {
                enforce_type(function.return_type.as_deref(), &value, &location)?;
                Ok(value)
            }
            Flow::Normal(_) => {
                enforce_type(function.return_type.as_deref(), &Value::Null, &location)?;
                Ok(Value::Null)
            }
        }
    }
}

/// Locate `stdlib/std.gs`: next to the installed binary first, then the
/// crate root for dev runs.
fn stdlib_path() -> PathBuf {
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join("stdlib").join("std.gs");
            if candidate.exists() {
                return candidate;
            }
        }
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("stdlib")
        .join("std.gs")
}

fn intrinsic_print(args: &[Value]) -> RuntimeResult<Value> {
    println!("{}", args[0]);
    Ok(Value::Null)
}

fn intrinsic_typeof(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::String(args[0].type_name().to_owned()))
}

fn intrinsic_len(args: &[Value]) -> RuntimeResult<Value> {
    match &args[0] {
        Value::String(value) => Ok(Value::Int(value.chars().count() as i64)),
        Value::List(elements) => Ok(Value::Int(elements.borrow().len() as i64)),
        Value::Map(map) => Ok(Value::Int(map.borrow().len() as i64)),
        _ => Err(RuntimeError::new(
            "__intrinsic_len expects String, List, or Map",
        )),
    }
}

/// Check a value against a declared type string. Only the base prefix
/// (e.g. `List` of `List[Int]`) is enforced; `Any` and a missing
/// declaration disable the check.
fn enforce_type(expected: Option<&str>, value: &Value, location: &str) -> Result<(), TypeError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let expected = expected.trim();
    if expected == "Any" {
        return Ok(());
    }

    let got = value.type_name();
    if got != base_type(expected) {
        return Err(TypeError {
            location: location.to_owned(),
            expected: expected.to_owned(),
            got: got.to_owned(),
        });
    }
    Ok(())
}

fn base_type(type_name: &str) -> &str {
    type_name
        .split('[')
        .next()
        .unwrap_or(type_name)
        .trim()
}

fn negate(value: Value) -> RuntimeResult<Value> {
    match value {
        Value::Int(value) => Ok(Value::Int(-value)),
        Value::Float(value) => Ok(Value::Float(-value)),
        _ => Err(RuntimeError::new("Unary '-' expects Int or Float")),
    }
}

fn binary_op(lhs: Value, op: BinaryOp, rhs: Value) -> RuntimeResult<Value> {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(lhs, op, rhs)
        }
        BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => compare(lhs, op, rhs),
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&lhs, &rhs))),
        BinaryOp::And | BinaryOp::Or => unreachable!("short-circuit operators are handled in eval"),
    }
}

fn arithmetic(lhs: Value, op: BinaryOp, rhs: Value) -> RuntimeResult<Value> {
    // '+' doubles as string concatenation
    if op == BinaryOp::Add {
        if let (Value::String(a), Value::String(b)) = (&lhs, &rhs) {
            return Ok(Value::String(format!("{a}{b}")));
        }
    }

    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => int_arithmetic(*a, op, *b),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let a = as_number(&lhs);
            let b = as_number(&rhs);
            float_arithmetic(a, op, b)
        }
        _ => Err(RuntimeError::new(format!(
            "Operator '{}' not supported for these types",
            op.symbol()
        ))),
    }
}

fn int_arithmetic(a: i64, op: BinaryOp, b: i64) -> RuntimeResult<Value> {
    match op {
        BinaryOp::Add => Ok(Value::Int(a.wrapping_add(b))),
        BinaryOp::Sub => Ok(Value::Int(a.wrapping_sub(b))),
        BinaryOp::Mul => Ok(Value::Int(a.wrapping_mul(b))),
        BinaryOp::Div => {
            if b == 0 {
                return Err(RuntimeError::new("Division by zero"));
            }
            // division always yields Float
            Ok(Value::Float(a as f64 / b as f64))
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(RuntimeError::new("Modulo by zero"));
            }
            // result takes the sign of the divisor
            Ok(Value::Int(((a % b) + b) % b))
        }
        _ => unreachable!(),
    }
}

fn float_arithmetic(a: f64, op: BinaryOp, b: f64) -> RuntimeResult<Value> {
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(RuntimeError::new("Division by zero"));
            }
            Ok(Value::Float(a / b))
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(RuntimeError::new("Modulo by zero"));
            }
            Err(RuntimeError::new("Modulo '%' is only supported for Int"))
        }
        _ => unreachable!(),
    }
}

fn as_number(value: &Value) -> f64 {
    match value {
        Value::Int(value) => *value as f64,
        Value::Float(value) => *value,
        _ => unreachable!("callers check both operands are numeric"),
    }
}

fn compare(lhs: Value, op: BinaryOp, rhs: Value) -> RuntimeResult<Value> {
    match (&lhs, &rhs) {
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let a = as_number(&lhs);
            let b = as_number(&rhs);
            let result = match op {
                BinaryOp::Lt => a < b,
                BinaryOp::Lte => a <= b,
                BinaryOp::Gt => a > b,
                BinaryOp::Gte => a >= b,
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }
        _ => Err(RuntimeError::new(format!(
            "Operator '{}' expects numbers",
            op.symbol()
        ))),
    }
}

/// Language-level equality: primitives by value (Int/Float unified
/// numerically), containers and functions by identity.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        (Value::List(x), Value::List(y)) => Rc::ptr_eq(x, y),
        (Value::Map(x), Value::Map(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Native(x), Value::Native(y)) => x.name == y.name,
        _ => false,
    }
}

fn index_get(object: &Value, index: &Value) -> RuntimeResult<Value> {
    match object {
        Value::List(elements) => {
            let Value::Int(i) = index else {
                return Err(RuntimeError::new("List index must be Int"));
            };
            let elements = elements.borrow();
            // out-of-range reads yield null
            if *i < 0 || *i as usize >= elements.len() {
                return Ok(Value::Null);
            }
            Ok(elements[*i as usize].clone())
        }
        Value::Map(map) => map.borrow().get(index),
        _ => Err(RuntimeError::new(
            "Indexing is only supported on List and Map",
        )),
    }
}

fn index_set(object: &Value, index: &Value, value: Value) -> RuntimeResult<Value> {
    match object {
        Value::List(elements) => {
            let Value::Int(i) = index else {
                return Err(RuntimeError::new("List index must be Int"));
            };
            if *i < 0 {
                return Err(RuntimeError::new("Negative list index not supported"));
            }
            let mut elements = elements.borrow_mut();
            let i = *i as usize;
            // writing exactly at len() appends
            if i > elements.len() {
                return Err(RuntimeError::new("List assignment index out of range"));
            }
            if i == elements.len() {
                elements.push(value.clone());
            } else {
                elements[i] = value.clone();
            }
            Ok(value)
        }
        Value::Map(map) => {
            map.borrow_mut().set(index.clone(), value.clone())?;
            Ok(value)
        }
        _ => Err(RuntimeError::new(
            "Index assignment is only supported on List and Map",
        )),
    }
}

/// `obj.name` is map indexing by the string key `name`; other values
/// have no attributes.
fn get_attr(object: &Value, name: &str) -> RuntimeResult<Value> {
    match object {
        Value::Map(map) => map.borrow().get(&Value::String(name.to_owned())),
        _ => Err(RuntimeError::new(format!(
            "Object of type {} has no attribute '{name}'",
            object.type_name()
        ))),
    }
}
