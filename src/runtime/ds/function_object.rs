use std::fmt;

use crate::runtime::ds::error::KErrorType;
use crate::runtime::ds::value::KValue;

/// Signature for plain function pointers. Receives the receiver (`this`) and arguments.
pub type NativeFn = fn(this: KValue, args: Vec<KValue>) -> Result<KValue, KErrorType>;

pub type ClosureFn = Box<dyn Fn(KValue, Vec<KValue>) -> Result<KValue, KErrorType>>;

pub enum FunctionKind {
    /// Direct function pointer.
    Native(NativeFn),
    /// Boxed closure, may capture state.
    Closure(ClosureFn),
}

pub struct FunctionObject {
    name: String,
    kind: FunctionKind,
}
impl FunctionObject {
    pub fn native(name: impl Into<String>, func: NativeFn) -> Self {
        FunctionObject {
            name: name.into(),
            kind: FunctionKind::Native(func),
        }
    }

    pub fn closure<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(KValue, Vec<KValue>) -> Result<KValue, KErrorType> + 'static,
    {
        FunctionObject {
            name: name.into(),
            kind: FunctionKind::Closure(Box::new(func)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, this: KValue, args: Vec<KValue>) -> Result<KValue, KErrorType> {
        match &self.kind {
            FunctionKind::Native(f) => f(this, args),
            FunctionKind::Closure(f) => f(this, args),
        }
    }
}
impl fmt::Debug for FunctionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionObject({})", self.name)
    }
}

/// Wrap a closure as a function value.
pub fn new_function<F>(name: impl Into<String>, func: F) -> KValue
where
    F: Fn(KValue, Vec<KValue>) -> Result<KValue, KErrorType> + 'static,
{
    KValue::from(FunctionObject::closure(name, func))
}

/// Wrap a function pointer as a function value.
pub fn new_native_function(name: impl Into<String>, func: NativeFn) -> KValue {
    KValue::from(FunctionObject::native(name, func))
}

/// Argument at `index`, or `nil` when absent.
pub fn arg_or_nil(args: &[KValue], index: usize) -> KValue {
    args.get(index).cloned().unwrap_or(KValue::Nil)
}
