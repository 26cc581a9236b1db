use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::ds::value::KValue;

pub type TableType = Rc<RefCell<Table>>;

/// A plain string-keyed mapping, the host's untyped record.
///
/// Writing `nil` removes the key, so a stored `nil` and a missing key are
/// indistinguishable.
#[derive(Default)]
pub struct Table {
    entries: HashMap<String, KValue>,
}
impl Table {
    pub fn new() -> Self {
        Table {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> KValue {
        self.entries.get(key).cloned().unwrap_or(KValue::Nil)
    }

    pub fn set(&mut self, key: impl Into<String>, value: KValue) {
        let key = key.into();
        if value.is_nil() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value);
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by key.
    pub fn sorted_entries(&self) -> Vec<(String, KValue)> {
        let mut entries = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Vec<(String, KValue)>>();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

/// Build a table value from key/value pairs. `nil` values are skipped.
pub fn new_table<K, I>(entries: I) -> KValue
where
    K: Into<String>,
    I: IntoIterator<Item = (K, KValue)>,
{
    let mut table = Table::new();
    for (k, v) in entries {
        table.set(k, v);
    }
    KValue::Table(Rc::new(RefCell::new(table)))
}
