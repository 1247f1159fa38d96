use super::ast::{Block, Identifier};
use super::environment::Env;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Host callable exposed to scripts.
pub type NativeFn = dyn Fn(&[Value]) -> Value;

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Number(f64),
    String(String),
    Boolean(bool),
    Function(Function),
    Object(Rc<RefCell<JsObject>>),
    /// Unwinds blocks on `return`. Stripped at call boundaries and at the
    /// program root, so it never escapes evaluation.
    Return(Box<Value>),
}

#[derive(Debug, Clone)]
pub enum Function {
    User(Rc<UserFunction>),
    Native(NativeFunction),
}

pub struct UserFunction {
    pub params: Vec<Identifier>,
    pub body: Block,
    pub closure: Env,
}

#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    func: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new(name: impl Into<String>, func: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

// The closure is left out: it usually holds the function itself.
impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFunction")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// Named property bag used for host-injected objects such as `console`.
#[derive(Debug, Clone, Default)]
pub struct JsObject {
    name: String,
    properties: HashMap<String, Value>,
}

impl JsObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.properties.insert(key.into(), value);
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

impl Value {
    pub fn native(name: impl Into<String>, func: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Value::Function(Function::Native(NativeFunction::new(name, func)))
    }

    pub fn object(object: JsObject) -> Self {
        Value::Object(Rc::new(RefCell::new(object)))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Function(_) | Value::Object(_) => true,
            Value::Return(inner) => inner.is_truthy(),
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Numeric view used by host built-ins: Booleans map to 1/0, every other
    /// non-Number to 0.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Boolean(true) => 1.0,
            Value::Return(inner) => inner.to_number(),
            _ => 0.0,
        }
    }

    /// Property lookup; anything but an Object, or a missing key, is
    /// `Undefined`.
    pub fn get_property(&self, key: &str) -> Value {
        match self {
            Value::Object(obj) => obj.borrow().get_property(key).cloned().unwrap_or_default(),
            _ => Value::Undefined,
        }
    }

    /// Strips a `Return` wrapper, leaving any other value as is.
    pub fn unwrap_return(self) -> Value {
        match self {
            Value::Return(inner) => *inner,
            other => other,
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Value::Return(_))
    }

    /// `+`: concatenation when either side is a String, numeric addition when
    /// both are Numbers, otherwise `Undefined`.
    pub fn add(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{}{}", self, other))
            }
            _ => Value::Undefined,
        }
    }

    pub fn subtract(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a - b),
            _ => Value::Undefined,
        }
    }

    pub fn multiply(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a * b),
            _ => Value::Undefined,
        }
    }

    /// Division by zero is `Undefined`, not an infinity.
    pub fn divide(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Number(_), Value::Number(b)) if *b == 0.0 => Value::Undefined,
            (Value::Number(a), Value::Number(b)) => Value::Number(a / b),
            _ => Value::Undefined,
        }
    }

    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.same_as(b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Return(a), Value::Return(b)) => a.equals(b),
            _ => false,
        }
    }

    /// Ordering for `< > <= >=`: two Numbers or two Strings; `None` for any
    /// other pairing.
    pub fn compare(&self, other: &Value) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Function(_) => "function",
            Value::Object(_) => "object",
            Value::Return(_) => "return",
        }
    }
}

impl Function {
    fn same_as(&self, other: &Function) -> bool {
        match (self, other) {
            (Function::User(a), Function::User(b)) => Rc::ptr_eq(a, b),
            (Function::Native(a), Function::Native(b)) => Rc::ptr_eq(&a.func, &b.func),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Function(_) => write!(f, "[Function]"),
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Return(inner) => write!(f, "{}", inner),
        }
    }
}
