//! The operator forwarding allow-list.
//!
//! Only these keys are copied from a class into its instance view. Any other
//! member, even one named like a metamethod, stays class-side.

use std::collections::HashSet;

use crate::runtime::ds::operations::operators::Operator;

lazy_static! {
    static ref FORWARDED_OPERATORS: HashSet<&'static str> =
        Operator::ALL.iter().map(|op| op.metamethod()).collect();
}

pub fn is_forwarded_operator(key: &str) -> bool {
    FORWARDED_OPERATORS.contains(key)
}

/// Allow-listed names in declaration order.
pub fn forwarded_operators() -> impl Iterator<Item = &'static str> {
    Operator::ALL.iter().map(|op| op.metamethod())
}
