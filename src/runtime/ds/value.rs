use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::runtime::ds::class_object::ClassHandle;
use crate::runtime::ds::function_object::FunctionObject;
use crate::runtime::ds::instance_object::InstanceHandle;
use crate::runtime::ds::operations::type_conversion::{
    TYPE_STR_BOOLEAN, TYPE_STR_CLASS, TYPE_STR_FUNCTION, TYPE_STR_INSTANCE, TYPE_STR_NIL,
    TYPE_STR_NUMBER, TYPE_STR_STRING, TYPE_STR_TABLE,
};
use crate::runtime::ds::table::TableType;

#[derive(Clone)]
pub enum KValue {
    Nil,
    Boolean(bool),
    Number(KNumberType),
    String(String),
    Table(TableType),
    Function(Rc<FunctionObject>),
    Class(ClassHandle),
    Instance(InstanceHandle),
}
impl KValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            KValue::Nil => TYPE_STR_NIL,
            KValue::Boolean(_) => TYPE_STR_BOOLEAN,
            KValue::Number(_) => TYPE_STR_NUMBER,
            KValue::String(_) => TYPE_STR_STRING,
            KValue::Table(_) => TYPE_STR_TABLE,
            KValue::Function(_) => TYPE_STR_FUNCTION,
            KValue::Class(_) => TYPE_STR_CLASS,
            KValue::Instance(_) => TYPE_STR_INSTANCE,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, KValue::Nil)
    }

    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, KValue::Nil | KValue::Boolean(false))
    }

    pub fn as_class(&self) -> Option<&ClassHandle> {
        match self {
            KValue::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&InstanceHandle> {
        match self {
            KValue::Instance(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            KValue::Number(n) => n.to_integer(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KValue::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }
}
impl Display for KValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            KValue::Nil => write!(f, "{}", TYPE_STR_NIL),
            KValue::Boolean(b) => write!(f, "{}", b),
            KValue::Number(n) => write!(f, "{}", n),
            KValue::String(s) => write!(f, "{}", s),
            KValue::Table(t) => write!(f, "table({} entries)", t.borrow().len()),
            KValue::Function(func) => write!(f, "function: {}", func.name()),
            KValue::Class(c) => write!(f, "{}", c),
            KValue::Instance(i) => write!(f, "{}", i),
        }
    }
}

impl fmt::Debug for KValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            KValue::Nil => write!(f, "KValue::Nil"),
            KValue::Boolean(b) => write!(f, "KValue::Boolean({})", b),
            KValue::Number(n) => write!(f, "KValue::Number({:?})", n),
            KValue::String(s) => write!(f, "KValue::String({:?})", s),
            KValue::Table(_) => write!(f, "KValue::Table(...)"),
            KValue::Function(func) => write!(f, "KValue::Function({})", func.name()),
            KValue::Class(c) => write!(f, "KValue::Class({})", c),
            KValue::Instance(i) => write!(f, "KValue::Instance({})", i),
        }
    }
}

/// Raw equality: references compare by identity and no operator slot is consulted.
impl PartialEq for KValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KValue::Nil, KValue::Nil) => true,
            (KValue::Boolean(a), KValue::Boolean(b)) => a == b,
            (KValue::Number(a), KValue::Number(b)) => a == b,
            (KValue::String(a), KValue::String(b)) => a == b,
            (KValue::Table(a), KValue::Table(b)) => Rc::ptr_eq(a, b),
            (KValue::Function(a), KValue::Function(b)) => Rc::ptr_eq(a, b),
            (KValue::Class(a), KValue::Class(b)) => a == b,
            (KValue::Instance(a), KValue::Instance(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for KValue {
    fn from(b: bool) -> Self {
        KValue::Boolean(b)
    }
}
impl From<i64> for KValue {
    fn from(i: i64) -> Self {
        KValue::Number(KNumberType::Integer(i))
    }
}
impl From<i32> for KValue {
    fn from(i: i32) -> Self {
        KValue::Number(KNumberType::Integer(i as i64))
    }
}
impl From<f64> for KValue {
    fn from(f: f64) -> Self {
        KValue::Number(KNumberType::Float(f))
    }
}
impl From<&str> for KValue {
    fn from(s: &str) -> Self {
        KValue::String(s.to_string())
    }
}
impl From<String> for KValue {
    fn from(s: String) -> Self {
        KValue::String(s)
    }
}
impl From<ClassHandle> for KValue {
    fn from(c: ClassHandle) -> Self {
        KValue::Class(c)
    }
}
impl From<InstanceHandle> for KValue {
    fn from(i: InstanceHandle) -> Self {
        KValue::Instance(i)
    }
}
impl From<FunctionObject> for KValue {
    fn from(f: FunctionObject) -> Self {
        KValue::Function(Rc::new(f))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum KNumberType {
    Integer(i64),
    Float(f64),
}
impl KNumberType {
    pub fn as_f64(&self) -> f64 {
        match self {
            KNumberType::Integer(i) => *i as f64,
            KNumberType::Float(f) => *f,
        }
    }

    /// Integer representation, if the number has one exactly.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            KNumberType::Integer(i) => Some(*i),
            KNumberType::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
        }
    }
}
impl PartialEq for KNumberType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KNumberType::Integer(a), KNumberType::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}
impl Display for KNumberType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            KNumberType::Integer(i) => write!(f, "{}", i),
            KNumberType::Float(nf) => {
                if nf.is_finite() && nf.fract() == 0.0 {
                    write!(f, "{:.1}", nf)
                } else if nf.is_nan() {
                    write!(f, "nan")
                } else if nf.is_infinite() {
                    write!(f, "{}inf", if *nf < 0.0 { "-" } else { "" })
                } else {
                    write!(f, "{}", nf)
                }
            }
        }
    }
}
