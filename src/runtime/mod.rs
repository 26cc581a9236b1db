//! The object model runtime.
//!
//! - **[`ds`]** - values, classes, instances, and the side tables that serve them
//! - **[`registry`]** - name to class table
//! - **[`api`]** - free functions over the thread's default registry
//! - **[`config`]** - model configuration file

pub mod api;
pub mod config;
pub mod ds;
pub mod registry;
