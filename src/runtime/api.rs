//! Public entry points over the thread's default class registry.
//!
//! Handles are `Rc` based, so "process-wide" state lives per thread: each
//! thread starts with an empty registry and identity display switched off.

use std::cell::RefCell;

use crate::runtime::ds::class_object::ClassHandle;
use crate::runtime::ds::error::KErrorType;
use crate::runtime::ds::identity;
use crate::runtime::ds::value::KValue;
use crate::runtime::registry::ClassRegistry;

thread_local! {
    static DEFAULT_REGISTRY: RefCell<ClassRegistry> = RefCell::new(ClassRegistry::new());
}

/// Run `f` against the default registry.
///
/// Must not be re-entered from inside `f`.
pub fn with_registry<R, F>(f: F) -> R
where
    F: FnOnce(&mut ClassRegistry) -> R,
{
    DEFAULT_REGISTRY.with(|registry| f(&mut registry.borrow_mut()))
}

/// `define(name, baseOrMembers)` against the default registry.
pub fn define(
    name: impl Into<KValue>,
    base_or_members: Option<KValue>,
) -> Result<ClassHandle, KErrorType> {
    let name = name.into();
    with_registry(|registry| registry.define(&name, base_or_members.as_ref()))
}

/// Registered class by name, without defining anything.
pub fn lookup(name: &str) -> Option<ClassHandle> {
    with_registry(|registry| registry.get(name))
}

/// Invoke a value: classes construct, functions run with a `nil` receiver.
pub fn call(callee: &KValue, args: Vec<KValue>) -> Result<KValue, KErrorType> {
    match callee {
        KValue::Class(c) => Ok(KValue::Instance(c.call(args)?)),
        KValue::Function(f) => f.call(KValue::Nil, args),
        other => Err(KErrorType::TypeError(format!(
            "attempt to call a {} value",
            other.type_name()
        ))),
    }
}

pub fn is_class(value: &KValue) -> bool {
    matches!(value, KValue::Class(_))
}

pub fn is_instance(value: &KValue) -> bool {
    matches!(value, KValue::Instance(_))
}

/// Reflexive: a class is a subclass of itself. Non-classes are never subclasses.
pub fn is_subclass_of(value: &KValue, base: &KValue) -> bool {
    match (value, base) {
        (KValue::Class(c), KValue::Class(b)) => c.is_subclass_of(b),
        _ => false,
    }
}

pub fn class_of(value: &KValue) -> Option<ClassHandle> {
    match value {
        KValue::Instance(i) => Some(i.class().clone()),
        _ => None,
    }
}

/// Alias of [`class_of`].
pub fn of(value: &KValue) -> Option<ClassHandle> {
    class_of(value)
}

pub fn is_instance_of(value: &KValue, class: &ClassHandle) -> bool {
    match class_of(value) {
        Some(c) => c.is_subclass_of(class),
        None => false,
    }
}

/// Name of a class, or of an instance's class.
pub fn name_of(value: &KValue) -> Option<String> {
    match value {
        KValue::Class(c) => Some(c.name().to_string()),
        KValue::Instance(i) => Some(i.class_name().to_string()),
        _ => None,
    }
}

pub fn to_display(value: &KValue) -> String {
    value.to_string()
}

pub fn set_identity_display(enabled: bool) {
    identity::set_identity_display(enabled);
}

pub fn identity_display() -> bool {
    identity::identity_display_enabled()
}
