//! Classes and the class-side interception layer.
//!
//! A class is a bag of own members plus an immutable link to its parent. The
//! `super` key is never stored: reads derive it from the parent link and
//! writes are rejected. Member reads fall back through the ancestor chain,
//! which is also what instances use to find their methods.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use log::trace;

use crate::runtime::ds::error::KErrorType;
use crate::runtime::ds::forwarding::{forwarded_operators, is_forwarded_operator};
use crate::runtime::ds::identity;
use crate::runtime::ds::instance_object::{InstanceHandle, InstanceView};
use crate::runtime::ds::value::KValue;

pub const SUPER_KEY: &str = "super";
pub const CONSTRUCTOR_KEY: &str = "new";
pub const CHAIN_NEW_KEY: &str = "chainNew";
pub const ANONYMOUS_CLASS_NAME: &str = "Anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Root,
    Derived,
}

pub struct ClassObject {
    name: Option<String>,
    parent: Option<ClassHandle>,
    members: RefCell<HashMap<String, KValue>>,
    /// Ancestors from the parent up to the root; the leaf is `self`.
    constructor_chain: RefCell<Option<Vec<ClassHandle>>>,
    instance_view: RefCell<Option<Rc<InstanceView>>>,
    next_instance_sequence: Cell<u64>,
}

/// Reference to a class. Cloning shares the class; equality is identity.
#[derive(Clone)]
pub struct ClassHandle(Rc<ClassObject>);

impl ClassHandle {
    pub(crate) fn new_root(name: Option<String>) -> Self {
        Self::with_parent(name, None)
    }

    pub(crate) fn new_derived(name: Option<String>, parent: &ClassHandle) -> Self {
        Self::with_parent(name, Some(parent.clone()))
    }

    fn with_parent(name: Option<String>, parent: Option<ClassHandle>) -> Self {
        ClassHandle(Rc::new(ClassObject {
            name,
            parent,
            members: RefCell::new(HashMap::new()),
            constructor_chain: RefCell::new(None),
            instance_view: RefCell::new(None),
            next_instance_sequence: Cell::new(0),
        }))
    }

    /// Display name, `"Anonymous"` for unnamed classes.
    pub fn name(&self) -> &str {
        self.0.name.as_deref().unwrap_or(ANONYMOUS_CLASS_NAME)
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.name.is_none()
    }

    pub fn kind(&self) -> ClassKind {
        if self.0.parent.is_some() {
            ClassKind::Derived
        } else {
            ClassKind::Root
        }
    }

    /// The super relation.
    pub fn parent(&self) -> Option<ClassHandle> {
        self.0.parent.clone()
    }

    /// This class followed by each ancestor up to the root.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// True iff `base` is this class or one of its ancestors.
    pub fn is_subclass_of(&self, base: &ClassHandle) -> bool {
        self.ancestors().any(|c| &c == base)
    }

    pub fn get_own(&self, key: &str) -> Option<KValue> {
        self.0.members.borrow().get(key).cloned()
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.0.members.borrow().contains_key(key)
    }

    /// Own member keys, sorted.
    pub fn own_keys(&self) -> Vec<String> {
        let mut keys = self
            .0
            .members
            .borrow()
            .keys()
            .cloned()
            .collect::<Vec<String>>();
        keys.sort();
        keys
    }

    /// Class read: `super`, then own members, then the inherited fallback.
    pub fn get(&self, key: &str) -> KValue {
        if key == SUPER_KEY {
            return match self.parent() {
                Some(p) => KValue::Class(p),
                None => KValue::Nil,
            };
        }
        match self.get_own(key) {
            Some(v) => v,
            None => self.inherited(key),
        }
    }

    /// Fallback lookup. Starts at the parent; own members are the caller's job.
    fn inherited(&self, key: &str) -> KValue {
        let mut current = self.parent();
        while let Some(class) = current {
            if let Some(v) = class.get_own(key) {
                return v;
            }
            current = class.parent();
        }
        KValue::Nil
    }

    /// Guarded class write. Allow-listed operator keys are pushed into the
    /// instance view if one has been built already.
    pub fn set(&self, key: &str, value: KValue) -> Result<(), KErrorType> {
        if key == SUPER_KEY {
            return Err(KErrorType::ImmutableRelation(format!(
                "Cannot set 'super' on class '{}'",
                self.name()
            )));
        }
        {
            let mut members = self.0.members.borrow_mut();
            if value.is_nil() {
                members.remove(key);
            } else {
                members.insert(key.to_string(), value.clone());
            }
        }
        if is_forwarded_operator(key) {
            if let Some(view) = self.0.instance_view.borrow().as_ref() {
                trace!("forwarding {} to instances of {}", key, self);
                view.forward(key, value);
            }
        }
        Ok(())
    }

    /// `false` only when `chainNew` reads as `false`, own or inherited.
    pub fn chain_new_enabled(&self) -> bool {
        !matches!(self.get(CHAIN_NEW_KEY), KValue::Boolean(false))
    }

    /// Leaf-to-root constructor chain, built on first use and never rebuilt.
    pub fn constructor_chain(&self) -> Vec<ClassHandle> {
        let mut cache = self.0.constructor_chain.borrow_mut();
        let ancestors = cache.get_or_insert_with(|| {
            let ancestors = self.ancestors().skip(1).collect::<Vec<ClassHandle>>();
            trace!("cached constructor chain for {} ({} classes)", self, ancestors.len() + 1);
            ancestors
        });
        let mut chain = Vec::with_capacity(ancestors.len() + 1);
        chain.push(self.clone());
        chain.extend(ancestors.iter().cloned());
        chain
    }

    pub fn has_instance_view(&self) -> bool {
        self.0.instance_view.borrow().is_some()
    }

    /// The view shared by every instance of this exact class.
    ///
    /// Built at most once. Seeds every allow-listed operator currently
    /// readable on the class, inherited ones included.
    pub fn instance_view(&self) -> Rc<InstanceView> {
        if let Some(view) = self.0.instance_view.borrow().as_ref() {
            return view.clone();
        }
        let view = Rc::new(InstanceView::new());
        for name in forwarded_operators() {
            let value = self.get(name);
            if !value.is_nil() {
                view.forward(name, value);
            }
        }
        trace!(
            "built instance view for {} with {} operator slot(s)",
            self,
            view.operator_names().len()
        );
        *self.0.instance_view.borrow_mut() = Some(view.clone());
        view
    }

    /// Construct an instance.
    ///
    /// Constructors run root to leaf, each only if the class declares its own
    /// `new`. With `chainNew = false` only the leaf's own `new` runs.
    pub fn call(&self, args: Vec<KValue>) -> Result<InstanceHandle, KErrorType> {
        let view = self.instance_view();
        let instance = InstanceHandle::new(self, view);

        if identity::identity_display_enabled() {
            let sequence = self.0.next_instance_sequence.get() + 1;
            self.0.next_instance_sequence.set(sequence);
            identity::record_identity(&instance, sequence);
        }

        let chain = self.constructor_chain();
        if self.chain_new_enabled() {
            for class in chain.iter().rev() {
                class.run_own_constructor(&instance, &args)?;
            }
        } else {
            self.run_own_constructor(&instance, &args)?;
        }
        Ok(instance)
    }

    fn run_own_constructor(
        &self,
        instance: &InstanceHandle,
        args: &[KValue],
    ) -> Result<(), KErrorType> {
        match self.get_own(CONSTRUCTOR_KEY) {
            None => Ok(()),
            Some(KValue::Function(f)) => {
                f.call(KValue::Instance(instance.clone()), args.to_vec())?;
                Ok(())
            }
            Some(other) => Err(KErrorType::TypeError(format!(
                "attempt to call a {} value (constructor of '{}')",
                other.type_name(),
                self.name()
            ))),
        }
    }

    /// Invoke a class-level method with the class as receiver.
    pub fn send(&self, method: &str, args: Vec<KValue>) -> Result<KValue, KErrorType> {
        match self.get(method) {
            KValue::Function(f) => f.call(KValue::Class(self.clone()), args),
            other => Err(KErrorType::TypeError(format!(
                "attempt to call a {} value (method '{}' of '{}')",
                other.type_name(),
                method,
                self.name()
            ))),
        }
    }

    /// Last identity sequence number handed out; 0 if none yet.
    pub fn last_identity_sequence(&self) -> u64 {
        self.0.next_instance_sequence.get()
    }
}
impl PartialEq for ClassHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for ClassHandle {}

impl Display for ClassHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ClassKind::Root => write!(f, "Class<{}>", self.name()),
            ClassKind::Derived => {
                let names = self
                    .ancestors()
                    .map(|c| c.name().to_string())
                    .collect::<Vec<String>>();
                write!(f, "Subclass<{}>", names.join(", "))
            }
        }
    }
}
impl fmt::Debug for ClassHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ClassHandle({})", self)
    }
}

/// Iterator over a class and its ancestors, leaf first.
pub struct Ancestors {
    next: Option<ClassHandle>,
}
impl Iterator for Ancestors {
    type Item = ClassHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}
