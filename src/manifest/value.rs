//! Runtime values held in a manifest environment.

use super::Env;
use super::scope::Scope;
use crate::ast::Expr;
use crate::error::ManifestError;
use std::fmt;
use std::rc::Rc;

/// Signature of a native form. Receives the environment and the already
/// evaluated argument list.
pub type BuiltinFn = dyn Fn(&mut Env, Vec<Value>) -> Result<Value, ManifestError>;

/// A value bound in, or produced by, a manifest environment.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Callable(Callable),
}

/// Something that can be applied to an argument list.
#[derive(Clone)]
pub enum Callable {
    Builtin(Rc<Builtin>),
    Lambda(Rc<Lambda>),
}

pub struct Builtin {
    pub name: String,
    pub func: Box<BuiltinFn>,
}

/// A procedure written in the manifest itself via `fn` or `func`.
pub struct Lambda {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Expr>,
    /// Scope the lambda was created in; calls run in a child of it.
    pub scope: Scope,
}

impl Callable {
    pub fn builtin<F>(name: &str, func: F) -> Self
    where
        F: Fn(&mut Env, Vec<Value>) -> Result<Value, ManifestError> + 'static,
    {
        Callable::Builtin(Rc::new(Builtin {
            name: name.to_string(),
            func: Box::new(func),
        }))
    }

    /// A callable that ignores its arguments and returns `nil`.
    pub fn noop(name: &str) -> Self {
        Self::builtin(name, |_, _| Ok(Value::Nil))
    }

    pub fn name(&self) -> &str {
        match self {
            Callable::Builtin(b) => &b.name,
            Callable::Lambda(l) => l.name.as_deref().unwrap_or("<fn>"),
        }
    }

    fn ptr_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Builtin(a), Callable::Builtin(b)) => Rc::ptr_eq(a, b),
            (Callable::Lambda(a), Callable::Lambda(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Builtin(b) => write!(f, "Builtin({})", b.name),
            Callable::Lambda(l) => write!(f, "Lambda({}, {:?})", self.name(), l.params),
        }
    }
}

impl Value {
    /// Name of the value's runtime kind, used in type mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Callable(_) => "callable",
        }
    }

    /// `false` and `nil` are false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    /// Borrow the string payload or report a mismatch against `name`.
    pub fn expect_str(&self, name: &str) -> Result<&str, ManifestError> {
        self.as_str().ok_or_else(|| self.mismatch(name, "string"))
    }

    /// Render a string or number as text, the way `str` and `shell` accept
    /// their arguments.
    pub fn expect_text(&self, name: &str) -> Result<String, ManifestError> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Number(_) => Ok(self.to_string()),
            _ => Err(self.mismatch(name, "string")),
        }
    }

    pub(crate) fn mismatch(&self, name: &str, expected: &'static str) -> ManifestError {
        ManifestError::TypeMismatch {
            name: name.to_string(),
            expected,
            actual: self.kind(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Callable(c) => write!(f, "Callable({:?})", c),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Value::Callable(c) => write!(f, "<fn {}>", c.name()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Callable(c)
    }
}
