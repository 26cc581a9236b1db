use crate::runtime::ds::error::KErrorType;
use crate::runtime::ds::value::{KNumberType, KValue};

pub const TYPE_STR_NIL: &str = "nil";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_TABLE: &str = "table";
pub const TYPE_STR_FUNCTION: &str = "function";
pub const TYPE_STR_CLASS: &str = "class";
pub const TYPE_STR_INSTANCE: &str = "instance";

/// Integer operand for bitwise operators.
pub fn to_bitwise_integer(value: &KValue) -> Result<Option<i64>, KErrorType> {
    match value {
        KValue::Number(n) => match n.to_integer() {
            Some(i) => Ok(Some(i)),
            None => Err(KErrorType::TypeError(
                "number has no integer representation".to_string(),
            )),
        },
        _ => Ok(None),
    }
}

/// String form used by concatenation; only strings and numbers qualify.
pub fn to_concat_string(value: &KValue) -> Option<String> {
    match value {
        KValue::String(s) => Some(s.clone()),
        KValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn to_number(value: &KValue) -> Option<KNumberType> {
    match value {
        KValue::Number(n) => Some(*n),
        _ => None,
    }
}

/// Type name with its indefinite article, for error messages.
pub fn with_article(value: &KValue) -> String {
    let name = value.type_name();
    match name.chars().next() {
        Some('a') | Some('e') | Some('i') | Some('o') | Some('u') => format!("an {}", name),
        _ => format!("a {}", name),
    }
}
