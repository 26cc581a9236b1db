//! Class registry: the table from class name to class handle.
//!
//! The registry is append-only. A name, once registered, maps to the same
//! class for the lifetime of the registry; asking for it again without a base
//! or members argument is a lookup, asking with one is an error.

use std::collections::HashMap;

use log::debug;

use crate::runtime::ds::class_object::ClassHandle;
use crate::runtime::ds::error::KErrorType;
use crate::runtime::ds::table::{new_table, Table};
use crate::runtime::ds::value::KValue;

/// Second argument to a definition, after shape checking.
enum Definition<'a> {
    Absent,
    Base(&'a ClassHandle),
    Members(&'a Table),
}

pub struct ClassRegistry {
    classes: HashMap<String, ClassHandle>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        ClassRegistry {
            classes: HashMap::new(),
        }
    }

    /// Define a class, or look up an existing one.
    ///
    /// `name` must be a string; `nil` or the empty string defines an anonymous,
    /// unregistered class. `base_or_members` may be absent (or `nil`), a class
    /// (defines a subclass, nothing copied) or a table (defines a root class
    /// with the entries shallow-copied as members).
    pub fn define(
        &mut self,
        name: &KValue,
        base_or_members: Option<&KValue>,
    ) -> Result<ClassHandle, KErrorType> {
        let name = match name {
            KValue::Nil => None,
            KValue::String(s) if s.is_empty() => None,
            KValue::String(s) => Some(s.clone()),
            other => {
                return Err(KErrorType::InvalidArgument(format!(
                    "class name must be a string, got {}",
                    other.type_name()
                )))
            }
        };

        let table_guard;
        let definition = match base_or_members {
            None | Some(KValue::Nil) => Definition::Absent,
            Some(KValue::Class(base)) => Definition::Base(base),
            Some(KValue::Table(t)) => {
                table_guard = t.borrow();
                Definition::Members(&table_guard)
            }
            Some(other) => {
                return Err(KErrorType::InvalidArgument(format!(
                    "expected a class or a table of members, got {}",
                    other.type_name()
                )))
            }
        };

        if let Some(name) = &name {
            if let Some(existing) = self.classes.get(name) {
                return match definition {
                    Definition::Absent => {
                        debug!("registry hit for {}", existing);
                        Ok(existing.clone())
                    }
                    _ => Err(KErrorType::DuplicateDefinition(format!(
                        "class '{}' is already defined",
                        name
                    ))),
                };
            }
        }

        let class = match definition {
            Definition::Absent => ClassHandle::new_root(name.clone()),
            Definition::Base(base) => ClassHandle::new_derived(name.clone(), base),
            Definition::Members(members) => {
                let class = ClassHandle::new_root(name.clone());
                for (key, value) in members.sorted_entries() {
                    class.set(&key, value)?;
                }
                class
            }
        };

        debug!("defined {}", class);
        if let Some(name) = name {
            self.classes.insert(name, class.clone());
        }
        Ok(class)
    }

    /// Define a root class from `(key, value)` members.
    pub fn define_root<K, I>(&mut self, name: &str, members: I) -> Result<ClassHandle, KErrorType>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, KValue)>,
    {
        let members = new_table(members);
        self.define(&KValue::from(name), Some(&members))
    }

    /// Define a subclass of `base`.
    pub fn define_subclass(
        &mut self,
        name: &str,
        base: &ClassHandle,
    ) -> Result<ClassHandle, KErrorType> {
        self.define(&KValue::from(name), Some(&KValue::Class(base.clone())))
    }

    pub fn get(&self, name: &str) -> Option<ClassHandle> {
        self.classes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.classes.keys().cloned().collect::<Vec<String>>();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
