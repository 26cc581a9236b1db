//! Identity sequence numbers for instance display.
//!
//! The registry never owns an instance. Records are keyed by allocation
//! address and hold a `Weak`, which pins the allocation (not the value) so an
//! address cannot be handed to another instance while its record exists.
//! Dead records are swept as the table grows.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Weak;

use crate::runtime::ds::instance_object::{InstanceHandle, InstanceObject};

const MIN_SWEEP_THRESHOLD: usize = 64;

struct IdentityRecord {
    instance: Weak<InstanceObject>,
    sequence: u64,
}

pub struct IdentityRegistry {
    records: HashMap<usize, IdentityRecord>,
    sweep_threshold: usize,
}
impl IdentityRegistry {
    pub fn new() -> Self {
        IdentityRegistry {
            records: HashMap::new(),
            sweep_threshold: MIN_SWEEP_THRESHOLD,
        }
    }

    pub fn record(&mut self, instance: &InstanceHandle, sequence: u64) {
        if self.records.len() >= self.sweep_threshold {
            self.sweep();
            self.sweep_threshold = (self.records.len() * 2).max(MIN_SWEEP_THRESHOLD);
        }
        self.records.insert(
            instance.address(),
            IdentityRecord {
                instance: instance.downgrade(),
                sequence,
            },
        );
    }

    pub fn lookup(&self, instance: &InstanceHandle) -> Option<u64> {
        self.records
            .get(&instance.address())
            .filter(|r| r.instance.strong_count() > 0)
            .map(|r| r.sequence)
    }

    /// Drop records whose instance is gone.
    pub fn sweep(&mut self) {
        self.records.retain(|_, r| r.instance.strong_count() > 0);
    }

    pub fn live_count(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.instance.strong_count() > 0)
            .count()
    }

    /// Records held, including dead ones not yet swept.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static IDENTITIES: RefCell<IdentityRegistry> = RefCell::new(IdentityRegistry::new());
    static IDENTITY_DISPLAY: Cell<bool> = Cell::new(false);
}

pub fn identity_display_enabled() -> bool {
    IDENTITY_DISPLAY.with(|flag| flag.get())
}

/// Affects sequence assignment for future instantiations and the display of all instances.
pub fn set_identity_display(enabled: bool) {
    IDENTITY_DISPLAY.with(|flag| flag.set(enabled));
}

pub fn record_identity(instance: &InstanceHandle, sequence: u64) {
    IDENTITIES.with(|registry| registry.borrow_mut().record(instance, sequence));
}

pub fn identity_of(instance: &InstanceHandle) -> Option<u64> {
    IDENTITIES.with(|registry| registry.borrow().lookup(instance))
}

pub fn live_identity_count() -> usize {
    IDENTITIES.with(|registry| registry.borrow().live_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ds::class_object::ClassHandle;

    fn new_instance(class: &ClassHandle) -> InstanceHandle {
        InstanceHandle::new(class, class.instance_view())
    }

    #[test]
    fn test_lookup_recorded_sequence() {
        let class = ClassHandle::new_root(Some("Point".to_string()));
        let a = new_instance(&class);
        let b = new_instance(&class);
        let mut registry = IdentityRegistry::new();
        registry.record(&a, 1);
        registry.record(&b, 2);
        assert_eq!(registry.lookup(&a), Some(1));
        assert_eq!(registry.lookup(&b), Some(2));
    }

    #[test]
    fn test_unrecorded_instance_has_no_identity() {
        let class = ClassHandle::new_root(Some("Point".to_string()));
        let a = new_instance(&class);
        let registry = IdentityRegistry::new();
        assert_eq!(registry.lookup(&a), None);
    }

    #[test]
    fn test_registry_does_not_keep_instances_alive() {
        let class = ClassHandle::new_root(Some("Point".to_string()));
        let mut registry = IdentityRegistry::new();
        let a = new_instance(&class);
        let weak = a.downgrade();
        registry.record(&a, 1);
        drop(a);
        assert_eq!(weak.strong_count(), 0);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.len(), 1);
        registry.sweep();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sweep_on_growth() {
        let class = ClassHandle::new_root(Some("Point".to_string()));
        let mut registry = IdentityRegistry::new();
        for n in 0..(MIN_SWEEP_THRESHOLD as u64 * 3) {
            let instance = new_instance(&class);
            registry.record(&instance, n + 1);
        }
        let keeper = new_instance(&class);
        registry.record(&keeper, 999);
        assert!(registry.len() <= MIN_SWEEP_THRESHOLD + 1);
        assert_eq!(registry.lookup(&keeper), Some(999));
        assert_eq!(registry.live_count(), 1);
    }
}
