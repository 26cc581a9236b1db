//! # klass - a minimal class/object model
//!
//! Classes are member bags with an immutable link to a parent class.
//! Instances are field stores that resolve everything else through their
//! class chain. On top of that:
//! - a registry mapping names to classes, with idempotent lookup
//! - a virtual, read-only `super` on classes and instances
//! - constructor chaining, root to leaf, opt-out via `chainNew = false`
//! - forwarding of operator members (`__add`, `__eq`, ...) to instances,
//!   including operators added after the first instance exists
//! - optional per-class identity numbers in instance display
//!
//! ## Quick Start
//!
//! ```
//! use klass::{call, define, new_function, new_table, KValue};
//!
//! let animal = define("Animal", Some(new_table(vec![(
//!     "new",
//!     new_function("Animal.new", |this, args| {
//!         let instance = this.as_instance().unwrap().clone();
//!         instance.set("name", args[0].clone())?;
//!         Ok(KValue::Nil)
//!     }),
//! )]))).unwrap();
//! let dog = define("Dog", Some(KValue::Class(animal.clone()))).unwrap();
//!
//! let rex = call(&KValue::Class(dog.clone()), vec![KValue::from("Rex")]).unwrap();
//! let rex = rex.as_instance().unwrap();
//! assert_eq!(rex.get("name"), KValue::from("Rex"));
//! assert_eq!(rex.get("super"), KValue::Class(animal.clone()));
//! assert_eq!(dog.to_string(), "Subclass<Dog, Animal>");
//! assert_eq!(rex.to_string(), "Instance<Dog>");
//!
//! // Same name, no definition: the registered class comes back.
//! assert_eq!(define("Dog", None).unwrap(), dog);
//! ```
//!
//! ## Operators
//!
//! ```
//! use klass::runtime::ds::operations::operators::{arith, Operator};
//! use klass::{call, define, new_function, KValue};
//!
//! let counter = define("Counter", None).unwrap();
//! let c = call(&KValue::Class(counter.clone()), vec![]).unwrap();
//!
//! // Defined after `c` was built; still reaches it.
//! counter
//!     .set("__add", new_function("Counter.__add", |_, _| Ok(KValue::from(42))))
//!     .unwrap();
//! assert_eq!(arith(Operator::Add, &c, &KValue::from(1)).unwrap(), KValue::from(42));
//! ```

#[macro_use]
extern crate lazy_static;

pub mod runtime;

pub use runtime::api::{
    call, class_of, define, identity_display, is_class, is_instance, is_instance_of,
    is_subclass_of, lookup, name_of, of, set_identity_display, to_display, with_registry,
};
pub use runtime::config::{ConfigError, ModelConfig};
pub use runtime::ds::class_object::ClassHandle;
pub use runtime::ds::error::KErrorType;
pub use runtime::ds::function_object::{new_function, new_native_function};
pub use runtime::ds::instance_object::InstanceHandle;
pub use runtime::ds::table::new_table;
pub use runtime::ds::value::{KNumberType, KValue};
pub use runtime::registry::ClassRegistry;
