//! Runtime value types for the Quill interpreter.

use std::fmt;
use std::rc::Rc;

use quill_syntax::ast::Block;
use quill_syntax::error::Result;

use crate::env::Env;
use crate::interpreter::Interpreter;

/// A host-language callable backing built-ins and the functions produced by
/// `&*&` and `=>>`. It receives the interpreter (to invoke other functions)
/// and the environment in force at the call site.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, &Env, &[Value]) -> Result<Value>>;

/// The two mutually exclusive implementations of a function.
#[derive(Clone)]
pub enum Callable {
    /// A user-written body, evaluated against a fresh environment per call.
    Body(Block),
    /// A native closure returning its result directly.
    Native(NativeFn),
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Body(_) => write!(f, "Body(..)"),
            Callable::Native(_) => write!(f, "Native(..)"),
        }
    }
}

/// A function record: ordered parameter names plus its implementation.
#[derive(Debug, Clone)]
pub struct Function {
    pub params: Vec<String>,
    pub callable: Callable,
}

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Fun(Rc<Function>),
    /// Produced only by parenthesized comma lists; the bound-argument
    /// carrier for `=>>`.
    Tuple(Rc<Vec<Value>>),
}

impl Value {
    /// Short tag used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Fun(_) => "function",
            Value::Tuple(_) => "tuple",
        }
    }
}

impl PartialEq for Value {
    /// Structural equality; functions compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Fun(a), Value::Fun(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "<null>"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Str(s) => write!(f, "{}", s),
            Value::Fun(_) => write!(f, "<function>"),
            Value::Tuple(elements) => {
                write!(f, "(")?;
                for (i, el) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", el)?;
                }
                write!(f, ")")
            }
        }
    }
}
