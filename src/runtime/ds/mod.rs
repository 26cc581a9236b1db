//! Data structures of the object model: values, classes, instances, and the
//! side tables that serve them.

pub mod class_object;
pub mod error;
pub mod forwarding;
pub mod function_object;
pub mod identity;
pub mod instance_object;
pub mod operations;
pub mod table;
pub mod value;
