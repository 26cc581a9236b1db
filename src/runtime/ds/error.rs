use std::fmt;
use std::fmt::{Display, Formatter};

/// Errors raised by the object model.
///
/// Every failure surfaces synchronously to the caller of the operation that
/// triggered it; nothing inside the core catches or retries.
#[derive(Debug, Clone, PartialEq)]
pub enum KErrorType {
    /// A registered class name was redefined with a base or members argument.
    DuplicateDefinition(String),
    /// A definition received a name or second argument of the wrong shape.
    InvalidArgument(String),
    /// A write targeted the reserved `super` key.
    ImmutableRelation(String),
    /// A value was used in a way its type does not support (calls, operators).
    TypeError(String),
}
impl KErrorType {
    pub fn message(&self) -> &str {
        match self {
            KErrorType::DuplicateDefinition(m) => m,
            KErrorType::InvalidArgument(m) => m,
            KErrorType::ImmutableRelation(m) => m,
            KErrorType::TypeError(m) => m,
        }
    }
}
impl Display for KErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            KErrorType::DuplicateDefinition(m) => write!(f, "Duplicate definition: {}", m),
            KErrorType::InvalidArgument(m) => write!(f, "Invalid argument: {}", m),
            KErrorType::ImmutableRelation(m) => write!(f, "Immutable relation: {}", m),
            KErrorType::TypeError(m) => write!(f, "Type error: {}", m),
        }
    }
}

impl std::error::Error for KErrorType {}
