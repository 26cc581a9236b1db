//! Operator dispatch.
//!
//! Primitive operands use the host semantics directly. Otherwise the forwarded
//! slot table of an instance operand's view is consulted, left operand first.
//! Slots are data, so a class may redefine an operator at any time and every
//! instance sees the new handler on its next operation.

use std::cmp::Ordering;

use crate::runtime::ds::error::KErrorType;
use crate::runtime::ds::operations::type_conversion::{
    to_bitwise_integer, to_concat_string, to_number, with_article,
};
use crate::runtime::ds::value::{KNumberType, KValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Unm,
    IDiv,
    Len,
    Concat,
    BAnd,
    BOr,
    BXor,
    BNot,
    Shl,
    Shr,
    Pairs,
}
impl Operator {
    pub const ALL: &'static [Operator] = &[
        Operator::Eq,
        Operator::Lt,
        Operator::Le,
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Pow,
        Operator::Unm,
        Operator::IDiv,
        Operator::Len,
        Operator::Concat,
        Operator::BAnd,
        Operator::BOr,
        Operator::BXor,
        Operator::BNot,
        Operator::Shl,
        Operator::Shr,
        Operator::Pairs,
    ];

    pub fn metamethod(self) -> &'static str {
        match self {
            Operator::Eq => "__eq",
            Operator::Lt => "__lt",
            Operator::Le => "__le",
            Operator::Add => "__add",
            Operator::Sub => "__sub",
            Operator::Mul => "__mul",
            Operator::Div => "__div",
            Operator::Mod => "__mod",
            Operator::Pow => "__pow",
            Operator::Unm => "__unm",
            Operator::IDiv => "__idiv",
            Operator::Len => "__len",
            Operator::Concat => "__concat",
            Operator::BAnd => "__band",
            Operator::BOr => "__bor",
            Operator::BXor => "__bxor",
            Operator::BNot => "__bnot",
            Operator::Shl => "__shl",
            Operator::Shr => "__shr",
            Operator::Pairs => "__pairs",
        }
    }

    pub fn from_metamethod(name: &str) -> Option<Operator> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.metamethod() == name)
    }

    fn is_bitwise(self) -> bool {
        matches!(
            self,
            Operator::BAnd
                | Operator::BOr
                | Operator::BXor
                | Operator::BNot
                | Operator::Shl
                | Operator::Shr
        )
    }
}

/// Handler for `op` on `value`, if `value` is an instance that has one.
///
/// The forwarded slot wins; a miss falls back to the class chain, which sees
/// operators an ancestor gained after this class's view was built.
fn handler(value: &KValue, op: Operator) -> Option<KValue> {
    let instance = match value {
        KValue::Instance(i) => i,
        _ => return None,
    };
    let name = op.metamethod();
    instance.view().operator(name).or_else(|| {
        let inherited = instance.class().get(name);
        if inherited.is_nil() {
            None
        } else {
            Some(inherited)
        }
    })
}

fn call_handler(handler: KValue, this: &KValue, args: Vec<KValue>) -> Result<KValue, KErrorType> {
    match handler {
        KValue::Function(f) => f.call(this.clone(), args),
        other => Err(KErrorType::TypeError(format!(
            "attempt to call a {} value (operator handler)",
            other.type_name()
        ))),
    }
}

/// Try the left operand's handler, then the right's.
fn binary_handler(
    op: Operator,
    lhs: &KValue,
    rhs: &KValue,
) -> Option<Result<KValue, KErrorType>> {
    let h = handler(lhs, op).or_else(|| handler(rhs, op))?;
    Some(call_handler(h, lhs, vec![rhs.clone()]))
}

/// Binary arithmetic, bitwise and concatenation operators.
pub fn arith(op: Operator, lhs: &KValue, rhs: &KValue) -> Result<KValue, KErrorType> {
    if let Some(result) = primitive_binary(op, lhs, rhs)? {
        return Ok(result);
    }
    match binary_handler(op, lhs, rhs) {
        Some(result) => result,
        None => {
            let culprit = if primitive_operand(op, lhs) { rhs } else { lhs };
            Err(binary_type_error(op, culprit))
        }
    }
}

fn primitive_operand(op: Operator, value: &KValue) -> bool {
    match op {
        Operator::Concat => to_concat_string(value).is_some(),
        _ => to_number(value).is_some(),
    }
}

fn binary_type_error(op: Operator, culprit: &KValue) -> KErrorType {
    let message = if op == Operator::Concat {
        format!("attempt to concatenate {} value", with_article(culprit))
    } else if op.is_bitwise() {
        format!(
            "attempt to perform bitwise operation on {} value",
            with_article(culprit)
        )
    } else {
        format!(
            "attempt to perform arithmetic on {} value",
            with_article(culprit)
        )
    };
    KErrorType::TypeError(message)
}

fn primitive_binary(
    op: Operator,
    lhs: &KValue,
    rhs: &KValue,
) -> Result<Option<KValue>, KErrorType> {
    if op == Operator::Concat {
        return Ok(match (to_concat_string(lhs), to_concat_string(rhs)) {
            (Some(a), Some(b)) => Some(KValue::String(a + &b)),
            _ => None,
        });
    }
    if op.is_bitwise() {
        return Ok(match (to_bitwise_integer(lhs)?, to_bitwise_integer(rhs)?) {
            (Some(a), Some(b)) => Some(KValue::from(integer_bitwise(op, a, b))),
            _ => None,
        });
    }
    match (to_number(lhs), to_number(rhs)) {
        (Some(a), Some(b)) => numeric_binary(op, a, b).map(|n| Some(KValue::Number(n))),
        _ => Ok(None),
    }
}

fn numeric_binary(op: Operator, a: KNumberType, b: KNumberType) -> Result<KNumberType, KErrorType> {
    use KNumberType::{Float, Integer};

    match (a, b) {
        (Integer(x), Integer(y)) => match op {
            Operator::Add => Ok(Integer(x.wrapping_add(y))),
            Operator::Sub => Ok(Integer(x.wrapping_sub(y))),
            Operator::Mul => Ok(Integer(x.wrapping_mul(y))),
            Operator::Div => Ok(Float(x as f64 / y as f64)),
            Operator::Pow => Ok(Float((x as f64).powf(y as f64))),
            Operator::Mod => {
                if y == 0 {
                    return Err(KErrorType::TypeError("attempt to perform 'n%0'".to_string()));
                }
                Ok(Integer(floor_mod(x, y)))
            }
            Operator::IDiv => {
                if y == 0 {
                    return Err(KErrorType::TypeError("attempt to perform 'n//0'".to_string()));
                }
                Ok(Integer(floor_div(x, y)))
            }
            _ => Err(KErrorType::TypeError(format!(
                "'{}' is not an arithmetic operator",
                op.metamethod()
            ))),
        },
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            match op {
                Operator::Add => Ok(Float(x + y)),
                Operator::Sub => Ok(Float(x - y)),
                Operator::Mul => Ok(Float(x * y)),
                Operator::Div => Ok(Float(x / y)),
                Operator::Pow => Ok(Float(x.powf(y))),
                Operator::Mod => Ok(Float(x - (x / y).floor() * y)),
                Operator::IDiv => Ok(Float((x / y).floor())),
                _ => Err(KErrorType::TypeError(format!(
                    "'{}' is not an arithmetic operator",
                    op.metamethod()
                ))),
            }
        }
    }
}

fn floor_div(x: i64, y: i64) -> i64 {
    let q = x.wrapping_div(y);
    if x.wrapping_rem(y) != 0 && ((x < 0) != (y < 0)) {
        q - 1
    } else {
        q
    }
}

fn floor_mod(x: i64, y: i64) -> i64 {
    let r = x.wrapping_rem(y);
    if r != 0 && ((r < 0) != (y < 0)) {
        r + y
    } else {
        r
    }
}

fn integer_bitwise(op: Operator, a: i64, b: i64) -> i64 {
    match op {
        Operator::BAnd => a & b,
        Operator::BOr => a | b,
        Operator::BXor => a ^ b,
        Operator::Shl => shift_left(a, b),
        Operator::Shr => shift_left(a, b.wrapping_neg()),
        _ => 0,
    }
}

/// Logical shift; negative counts shift right, counts of 64 or more clear.
fn shift_left(a: i64, n: i64) -> i64 {
    if n <= -64 || n >= 64 {
        0
    } else if n >= 0 {
        ((a as u64) << n) as i64
    } else {
        ((a as u64) >> (-n)) as i64
    }
}

/// `-value`
pub fn negate(value: &KValue) -> Result<KValue, KErrorType> {
    match value {
        KValue::Number(KNumberType::Integer(i)) => Ok(KValue::from(i.wrapping_neg())),
        KValue::Number(KNumberType::Float(f)) => Ok(KValue::from(-f)),
        _ => match handler(value, Operator::Unm) {
            Some(h) => call_handler(h, value, vec![value.clone()]),
            None => Err(binary_type_error(Operator::Unm, value)),
        },
    }
}

/// `~value`
pub fn bitwise_not(value: &KValue) -> Result<KValue, KErrorType> {
    if let Some(i) = to_bitwise_integer(value)? {
        return Ok(KValue::from(!i));
    }
    match handler(value, Operator::BNot) {
        Some(h) => call_handler(h, value, vec![value.clone()]),
        None => Err(binary_type_error(Operator::BNot, value)),
    }
}

/// `#value`
pub fn len(value: &KValue) -> Result<KValue, KErrorType> {
    match value {
        KValue::String(s) => Ok(KValue::from(s.len() as i64)),
        KValue::Table(t) => Ok(KValue::from(t.borrow().len() as i64)),
        _ => match handler(value, Operator::Len) {
            Some(h) => call_handler(h, value, vec![value.clone()]),
            None => Err(KErrorType::TypeError(format!(
                "attempt to get length of {} value",
                with_article(value)
            ))),
        },
    }
}

pub fn concat(lhs: &KValue, rhs: &KValue) -> Result<KValue, KErrorType> {
    arith(Operator::Concat, lhs, rhs)
}

/// `lhs == rhs`. Handlers are only consulted for two distinct instances.
pub fn equals(lhs: &KValue, rhs: &KValue) -> Result<bool, KErrorType> {
    if lhs == rhs {
        return Ok(true);
    }
    if let (KValue::Instance(_), KValue::Instance(_)) = (lhs, rhs) {
        if let Some(result) = binary_handler(Operator::Eq, lhs, rhs) {
            return Ok(result?.is_truthy());
        }
    }
    Ok(false)
}

/// `lhs < rhs`
pub fn less_than(lhs: &KValue, rhs: &KValue) -> Result<bool, KErrorType> {
    compare(Operator::Lt, lhs, rhs)
}

/// `lhs <= rhs`
pub fn less_equal(lhs: &KValue, rhs: &KValue) -> Result<bool, KErrorType> {
    compare(Operator::Le, lhs, rhs)
}

fn compare(op: Operator, lhs: &KValue, rhs: &KValue) -> Result<bool, KErrorType> {
    let ordering = match (lhs, rhs) {
        (KValue::Number(a), KValue::Number(b)) => a.as_f64().partial_cmp(&b.as_f64()),
        (KValue::String(a), KValue::String(b)) => Some(a.cmp(b)),
        _ => {
            return match binary_handler(op, lhs, rhs) {
                Some(result) => Ok(result?.is_truthy()),
                None => Err(compare_type_error(lhs, rhs)),
            };
        }
    };
    Ok(match (op, ordering) {
        (_, None) => false,
        (Operator::Lt, Some(o)) => o == Ordering::Less,
        (_, Some(o)) => o != Ordering::Greater,
    })
}

fn compare_type_error(lhs: &KValue, rhs: &KValue) -> KErrorType {
    if lhs.type_name() == rhs.type_name() {
        KErrorType::TypeError(format!("attempt to compare two {} values", lhs.type_name()))
    } else {
        KErrorType::TypeError(format!(
            "attempt to compare {} with {}",
            lhs.type_name(),
            rhs.type_name()
        ))
    }
}

/// Key-ordered entries of a table or instance.
///
/// An instance with a `__pairs` handler delegates to it; the handler must
/// return a table.
pub fn pairs(value: &KValue) -> Result<Vec<(String, KValue)>, KErrorType> {
    match value {
        KValue::Table(t) => Ok(t.borrow().sorted_entries()),
        KValue::Instance(i) => match handler(value, Operator::Pairs) {
            Some(h) => match call_handler(h, value, vec![])? {
                KValue::Table(t) => Ok(t.borrow().sorted_entries()),
                other => Err(KErrorType::TypeError(format!(
                    "'__pairs' must return a table, got {}",
                    other.type_name()
                ))),
            },
            None => Ok(i
                .field_names()
                .into_iter()
                .map(|k| {
                    let v = i.get_own(&k).unwrap_or(KValue::Nil);
                    (k, v)
                })
                .collect()),
        },
        _ => Err(KErrorType::TypeError(format!(
            "bad argument to 'pairs' (table expected, got {})",
            value.type_name()
        ))),
    }
}
