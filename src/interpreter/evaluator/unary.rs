use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        lexer::Token,
        value::core::Value,
    },
};

/// Evaluates a prefix operator over its already-evaluated operand.
///
/// - `-` negates a numeric value.
/// - `!` inverts a boolean.
/// - `~` complements a long bitwise.
///
/// # Parameters
/// - `op`: The operator token.
/// - `operand`: The evaluated operand.
/// - `line`: Source code line number for error reporting.
///
/// # Returns
/// The resulting value, or a `RuntimeError` for an incompatible operand.
pub fn eval_unary(op: &Token, operand: &Value, line: usize) -> EvalResult<Value> {
    match op {
        Token::Minus => match operand {
            Value::Long(n) => n.checked_neg().map(Value::Long).ok_or(RuntimeError::Overflow { line }),
            Value::Double(d) => Ok(Value::Double(-d)),
            Value::BigNum(n) => Ok(Value::BigNum(Rc::new(-(**n).clone()))),
            _ => Err(RuntimeError::ExpectedNumber { line }),
        },

        Token::Bang => Ok(Value::Bool(!operand.as_bool(line)?)),

        Token::Tilde => Ok(Value::Long(!operand.as_long(line)?)),

        other => {
            Err(RuntimeError::TypeError { details: format!("unsupported unary operator {other:?}"),
                                          line })
        },
    }
}
