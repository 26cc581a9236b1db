//! Instances and the per-class instance view.
//!
//! An instance is a field store that owns its class and shares the view its
//! class built for it. Non-own keys resolve through the class chain. The view
//! is owned by the class and carries the forwarded operator slots consulted by
//! operator dispatch.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::{Rc, Weak};

use crate::runtime::ds::class_object::{ClassHandle, SUPER_KEY};
use crate::runtime::ds::error::KErrorType;
use crate::runtime::ds::identity;
use crate::runtime::ds::value::KValue;

/// Operator slots shared by every instance of one class.
pub struct InstanceView {
    operators: RefCell<HashMap<String, KValue>>,
}
impl InstanceView {
    pub(crate) fn new() -> Self {
        InstanceView {
            operators: RefCell::new(HashMap::new()),
        }
    }

    pub fn operator(&self, name: &str) -> Option<KValue> {
        self.operators.borrow().get(name).cloned()
    }

    pub fn operator_names(&self) -> Vec<String> {
        let mut names = self
            .operators
            .borrow()
            .keys()
            .cloned()
            .collect::<Vec<String>>();
        names.sort();
        names
    }

    pub(crate) fn forward(&self, name: &str, value: KValue) {
        let mut operators = self.operators.borrow_mut();
        if value.is_nil() {
            operators.remove(name);
        } else {
            operators.insert(name.to_string(), value);
        }
    }
}

pub struct InstanceObject {
    class: ClassHandle,
    view: Rc<InstanceView>,
    fields: RefCell<HashMap<String, KValue>>,
}

/// Reference to an instance. Cloning shares the instance; equality is identity.
#[derive(Clone)]
pub struct InstanceHandle(Rc<InstanceObject>);

impl InstanceHandle {
    pub(crate) fn new(class: &ClassHandle, view: Rc<InstanceView>) -> Self {
        InstanceHandle(Rc::new(InstanceObject {
            class: class.clone(),
            view,
            fields: RefCell::new(HashMap::new()),
        }))
    }

    pub(crate) fn downgrade(&self) -> Weak<InstanceObject> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn view(&self) -> &Rc<InstanceView> {
        &self.0.view
    }

    pub fn class(&self) -> &ClassHandle {
        &self.0.class
    }

    pub fn class_name(&self) -> &str {
        self.0.class.name()
    }

    pub fn get_own(&self, key: &str) -> Option<KValue> {
        self.0.fields.borrow().get(key).cloned()
    }

    /// Own field names, sorted.
    pub fn field_names(&self) -> Vec<String> {
        let mut names = self
            .0
            .fields
            .borrow()
            .keys()
            .cloned()
            .collect::<Vec<String>>();
        names.sort();
        names
    }

    pub fn field_count(&self) -> usize {
        self.0.fields.borrow().len()
    }

    /// Instance read: `super`, then own fields, then each class in the chain.
    pub fn get(&self, key: &str) -> KValue {
        if key == SUPER_KEY {
            return match self.class().parent() {
                Some(p) => KValue::Class(p),
                None => KValue::Nil,
            };
        }
        if let Some(v) = self.get_own(key) {
            return v;
        }
        self.class().get(key)
    }

    pub fn set(&self, key: &str, value: KValue) -> Result<(), KErrorType> {
        if key == SUPER_KEY {
            return Err(KErrorType::ImmutableRelation(
                "Cannot set 'super' on an instance".to_string(),
            ));
        }
        let mut fields = self.0.fields.borrow_mut();
        if value.is_nil() {
            fields.remove(key);
        } else {
            fields.insert(key.to_string(), value);
        }
        Ok(())
    }

    /// Invoke a method with this instance as receiver.
    pub fn send(&self, method: &str, args: Vec<KValue>) -> Result<KValue, KErrorType> {
        match self.get(method) {
            KValue::Function(f) => f.call(KValue::Instance(self.clone()), args),
            other => Err(KErrorType::TypeError(format!(
                "attempt to call a {} value (method '{}' of '{}')",
                other.type_name(),
                method,
                self.class_name()
            ))),
        }
    }

    /// Identity sequence number, if one was recorded at construction.
    pub fn identity(&self) -> Option<u64> {
        identity::identity_of(self)
    }

    pub fn is_instance_of(&self, class: &ClassHandle) -> bool {
        self.class().is_subclass_of(class)
    }
}
impl PartialEq for InstanceHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for InstanceHandle {}

impl Display for InstanceHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sequence = if identity::identity_display_enabled() {
            self.identity()
        } else {
            None
        };
        match sequence {
            Some(n) => write!(f, "Instance<{}#{}>", self.class_name(), n),
            None => write!(f, "Instance<{}>", self.class_name()),
        }
    }
}
impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceHandle({})", self)
    }
}
