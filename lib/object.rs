use std::{cell::RefCell, fmt, rc::Rc};

use crate::host::HostObject;

pub type ObjectRef = Rc<RefCell<dyn HostObject>>;

pub fn object_ref<T: HostObject + 'static>(object: T) -> ObjectRef {
    Rc::new(RefCell::new(object))
}

#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Char(char),
    String(String),
    List(Vec<Value>),
    Pointer(Rc<RefCell<Value>>),
    Object(ObjectRef),
}

impl Value {
    pub fn object<T: HostObject + 'static>(object: T) -> Self {
        Value::Object(object_ref(object))
    }

    pub fn pointer(value: Value) -> Self {
        Value::Pointer(Rc::new(RefCell::new(value)))
    }

    /// Follows pointers until a non-pointer value is reached.
    pub fn deref(&self) -> Value {
        match self {
            Value::Pointer(inner) => inner.borrow().deref(),
            value => value.clone(),
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Boolean(_) => "bool".to_string(),
            Value::Integer(_) => "int".to_string(),
            Value::Unsigned(_) => "uint".to_string(),
            Value::Float(_) => "float64".to_string(),
            Value::Char(_) => "rune".to_string(),
            Value::String(_) => "string".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Pointer(inner) => format!("*{}", inner.borrow().type_name()),
            Value::Object(object) => match object.try_borrow() {
                Ok(object) => object.type_name().to_string(),
                Err(_) => "object".to_string(),
            },
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.deref() {
            Value::Boolean(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.deref() {
            Value::Integer(value) => Some(value),
            Value::Unsigned(value) => i64::try_from(value).ok(),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self.deref() {
            Value::Unsigned(value) => Some(value),
            Value::Integer(value) => u64::try_from(value).ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.deref() {
            Value::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self.deref() {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self.deref() {
            Value::Char(value) => Some(value),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            (Value::Integer(left), Value::Integer(right)) => left == right,
            (Value::Unsigned(left), Value::Unsigned(right)) => left == right,
            (Value::Float(left), Value::Float(right)) => left == right,
            (Value::Char(left), Value::Char(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::List(left), Value::List(right)) => left == right,
            (Value::Pointer(left), Value::Pointer(right)) => {
                Rc::ptr_eq(left, right) || *left.borrow() == *right.borrow()
            }
            // Host objects have identity, not structure.
            (Value::Object(left), Value::Object(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Boolean(value) => write!(f, "Boolean({:?})", value),
            Value::Integer(value) => write!(f, "Integer({:?})", value),
            Value::Unsigned(value) => write!(f, "Unsigned({:?})", value),
            Value::Float(value) => write!(f, "Float({:?})", value),
            Value::Char(value) => write!(f, "Char({:?})", value),
            Value::String(value) => write!(f, "String({:?})", value),
            Value::List(values) => f.debug_tuple("List").field(values).finish(),
            Value::Pointer(inner) => write!(f, "Pointer({:?})", inner.borrow()),
            Value::Object(object) => match object.try_borrow() {
                Ok(object) => write!(f, "Object({:?})", object),
                Err(_) => write!(f, "Object(<borrowed>)"),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Unsigned(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Char(value) => write!(f, "'{}'", value),
            Value::String(value) => write!(f, "{:?}", value),
            Value::List(values) => {
                let values: Vec<String> = values.iter().map(|v| format!("{}", v)).collect();
                write!(f, "[{}]", values.join(", "))
            }
            Value::Pointer(inner) => write!(f, "&{}", inner.borrow()),
            Value::Object(object) => match object.try_borrow() {
                Ok(object) => write!(f, "{:#?}", object),
                Err(_) => write!(f, "<borrowed object>"),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Unsigned(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}
