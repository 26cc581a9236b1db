pub mod operators;
pub mod type_conversion;
