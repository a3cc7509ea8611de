use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        lexer::Token,
        value::{core::Value, key::ValueKey},
    },
    util::num::i64_to_usize,
};

/// A pair of numeric operands after promotion to their common kind.
///
/// If either side is a double the pair is double; otherwise if either side
/// is a bignum the pair is bignum; otherwise both are longs.
enum NumericPair {
    Long(i64, i64),
    Big(BigInt, BigInt),
    Double(f64, f64),
}

/// Promotes two values to a common numeric kind.
fn numeric_pair(left: &Value, right: &Value, line: usize) -> EvalResult<NumericPair> {
    match (left, right) {
        (Value::Long(a), Value::Long(b)) => Ok(NumericPair::Long(*a, *b)),

        (Value::BigNum(a), Value::BigNum(b)) => {
            Ok(NumericPair::Big((**a).clone(), (**b).clone()))
        },
        (Value::BigNum(a), Value::Long(b)) => {
            Ok(NumericPair::Big((**a).clone(), BigInt::from(*b)))
        },
        (Value::Long(a), Value::BigNum(b)) => {
            Ok(NumericPair::Big(BigInt::from(*a), (**b).clone()))
        },

        _ if left.is_numeric() && right.is_numeric() => {
            Ok(NumericPair::Double(left.as_double(line)?, right.as_double(line)?))
        },

        _ => Err(RuntimeError::ExpectedNumber { line }),
    }
}

/// Evaluates a non-short-circuiting binary operator over two values.
///
/// `+` is overloaded: if either operand is a string, both are converted to
/// strings and concatenated; otherwise it is numeric addition. `==` and
/// `!=` use loose equality. Bitwise and shift operators require longs.
///
/// # Parameters
/// - `op`: The operator token.
/// - `left`, `right`: The evaluated operands, in source order.
/// - `line`: Source code line number for error reporting.
///
/// # Returns
/// The resulting value, or a `RuntimeError` for incompatible operands,
/// overflow or division by zero.
pub fn eval_binary(op: &Token, left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match op {
        Token::Plus => {
            if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
                return Ok(Value::from(format!("{left}{right}")));
            }
            match numeric_pair(left, right, line)? {
                NumericPair::Long(a, b) => {
                    a.checked_add(b).map(Value::Long).ok_or(RuntimeError::Overflow { line })
                },
                NumericPair::Big(a, b) => Ok(Value::BigNum(Rc::new(a + b))),
                NumericPair::Double(a, b) => Ok(Value::Double(a + b)),
            }
        },

        Token::Minus => match numeric_pair(left, right, line)? {
            NumericPair::Long(a, b) => {
                a.checked_sub(b).map(Value::Long).ok_or(RuntimeError::Overflow { line })
            },
            NumericPair::Big(a, b) => Ok(Value::BigNum(Rc::new(a - b))),
            NumericPair::Double(a, b) => Ok(Value::Double(a - b)),
        },

        Token::Star => match numeric_pair(left, right, line)? {
            NumericPair::Long(a, b) => {
                a.checked_mul(b).map(Value::Long).ok_or(RuntimeError::Overflow { line })
            },
            NumericPair::Big(a, b) => Ok(Value::BigNum(Rc::new(a * b))),
            NumericPair::Double(a, b) => Ok(Value::Double(a * b)),
        },

        Token::Slash => match numeric_pair(left, right, line)? {
            NumericPair::Long(a, b) => {
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero { line });
                }
                a.checked_div(b).map(Value::Long).ok_or(RuntimeError::Overflow { line })
            },
            NumericPair::Big(a, b) => {
                if b.is_zero() {
                    return Err(RuntimeError::DivisionByZero { line });
                }
                Ok(Value::BigNum(Rc::new(a / b)))
            },
            NumericPair::Double(a, b) => Ok(Value::Double(a / b)),
        },

        Token::Percent => match numeric_pair(left, right, line)? {
            NumericPair::Long(a, b) => {
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero { line });
                }
                a.checked_rem(b).map(Value::Long).ok_or(RuntimeError::Overflow { line })
            },
            NumericPair::Big(a, b) => {
                if b.is_zero() {
                    return Err(RuntimeError::DivisionByZero { line });
                }
                Ok(Value::BigNum(Rc::new(a % b)))
            },
            NumericPair::Double(a, b) => Ok(Value::Double(a % b)),
        },

        Token::StarStar => eval_power(left, right, line),

        Token::Amp | Token::Pipe | Token::Caret | Token::Shl | Token::Shr | Token::UShr => {
            let a = left.as_long(line)?;
            let b = right.as_long(line)?;
            Ok(Value::Long(eval_bitwise(op, a, b)))
        },

        Token::Lt => Ok(Value::Bool(left.compare(right, line)?.is_lt())),
        Token::Le => Ok(Value::Bool(left.compare(right, line)?.is_le())),
        Token::Gt => Ok(Value::Bool(left.compare(right, line)?.is_gt())),
        Token::Ge => Ok(Value::Bool(left.compare(right, line)?.is_ge())),

        Token::EqEq => Ok(Value::Bool(left.loose_eq(right))),
        Token::NotEq => Ok(Value::Bool(!left.loose_eq(right))),

        Token::Match => {
            let Value::Pattern(pattern) = right else {
                return Err(RuntimeError::TypeError { details: format!("right operand of '=~' must be a pattern, got {}",
                                                                      right.type_name()),
                                                     line });
            };
            if matches!(left, Value::Nil | Value::Undefined) {
                return Err(RuntimeError::TypeError { details: format!("cannot match {} against a pattern",
                                                                      left.type_name()),
                                                     line });
            }
            Ok(Value::Bool(pattern.anchored.is_match(&left.to_string())))
        },

        other => {
            Err(RuntimeError::TypeError { details: format!("unsupported binary operator {other:?}"),
                                          line })
        },
    }
}

/// Exponentiation with the numeric promotion rules of the other arithmetic
/// operators; `**` groups right at the parser level.
fn eval_power(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match numeric_pair(left, right, line)? {
        NumericPair::Long(a, b) => {
            if let Ok(exp) = u32::try_from(b) {
                return a.checked_pow(exp).map(Value::Long).ok_or(RuntimeError::Overflow { line });
            }
            // Negative exponents fall back to floating point.
            Ok(Value::Double(left.as_double(line)?.powf(right.as_double(line)?)))
        },
        NumericPair::Big(a, b) => {
            let exp = b.to_u32().ok_or(RuntimeError::InvalidArgument { details:
                                           "exponent out of range for bigint power".to_string(),
                                       line })?;
            Ok(Value::BigNum(Rc::new(a.pow(exp))))
        },
        NumericPair::Double(a, b) => Ok(Value::Double(a.powf(b))),
    }
}

/// The bitwise and shift operators over longs. Shift counts are masked to
/// the word size, as the host integers do.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn eval_bitwise(op: &Token, a: i64, b: i64) -> i64 {
    let shift = (b & 63) as u32;
    match op {
        Token::Amp => a & b,
        Token::Pipe => a | b,
        Token::Caret => a ^ b,
        Token::Shl => a.wrapping_shl(shift),
        Token::Shr => a.wrapping_shr(shift),
        Token::UShr => ((a as u64).wrapping_shr(shift)) as i64,
        _ => unreachable!(),
    }
}

/// Reads a named field from a value. Only mapping values have fields;
/// anything else reads as `undefined`.
#[must_use]
pub fn property_access(target: &Value, name: &str) -> Value {
    match target {
        Value::Map(entries) => entries.borrow()
                                      .get(&ValueKey::Str(name.to_string()))
                                      .cloned()
                                      .unwrap_or(Value::Undefined),
        _ => Value::Undefined,
    }
}

/// Reads an indexed element from a list or the value for a key from a map.
/// Out-of-range and missing-key reads return `undefined`.
pub fn element_read(target: &Value, index: &Value, line: usize) -> EvalResult<Value> {
    match target {
        Value::List(items) => {
            let position = index.as_long(line)?;
            Ok(i64_to_usize(position).and_then(|p| items.borrow().get(p).cloned())
                                     .unwrap_or(Value::Undefined))
        },
        Value::Map(entries) => {
            let key = ValueKey::try_from_value(index, line)?;
            Ok(entries.borrow().get(&key).cloned().unwrap_or(Value::Undefined))
        },
        other => {
            Err(RuntimeError::TypeError { details: format!("cannot index {}", other.type_name()),
                                          line })
        },
    }
}

/// Mutates an indexed element of a list or the value for a key in a map.
/// Unlike reads, an out-of-range list write is an error.
pub fn element_write(target: &Value, index: &Value, value: Value, line: usize) -> EvalResult<Value> {
    match target {
        Value::List(items) => {
            let position = index.as_long(line)?;
            let mut items = items.borrow_mut();
            let max = items.len().saturating_sub(1);

            match i64_to_usize(position) {
                Some(p) if p < items.len() => {
                    items[p] = value.clone();
                    Ok(value)
                },
                _ => {
                    Err(RuntimeError::IndexOutOfBounds { max,
                                                         found: position,
                                                         line })
                },
            }
        },
        Value::Map(entries) => {
            let key = ValueKey::try_from_value(index, line)?;
            entries.borrow_mut().insert(key, value.clone());
            Ok(value)
        },
        other => {
            Err(RuntimeError::TypeError { details: format!("cannot index {}", other.type_name()),
                                          line })
        },
    }
}
