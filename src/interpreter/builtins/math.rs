use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
    util::num::f64_to_i64_checked,
};

/// `math.abs(x)`: absolute value, preserving the numeric kind.
pub fn abs(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Long(n) => n.checked_abs().map(Value::Long).ok_or(RuntimeError::Overflow { line }),
        Value::Double(d) => Ok(Value::Double(d.abs())),
        Value::BigNum(n) => {
            use num_traits::Signed;
            Ok(Value::BigNum(Rc::new(n.abs())))
        },
        _ => Err(RuntimeError::ExpectedNumber { line }),
    }
}

/// `math.round(x)`: the nearest long.
pub fn round(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Long(n) => Ok(Value::Long(*n)),
        other => Ok(Value::Long(f64_to_i64_checked(other.as_double(line)?.round(), line)?)),
    }
}

/// Applies a one-argument float function to a numeric value.
fn unary_float(op: fn(f64) -> f64, args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Double(op(args[0].as_double(line)?)))
}

/// `math.floor(x)`.
pub fn floor(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::floor, args, line)
}

/// `math.ceil(x)`.
pub fn ceil(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::ceil, args, line)
}

/// `math.sqrt(x)`.
pub fn sqrt(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::sqrt, args, line)
}

/// `math.pow(base, exponent)`.
pub fn pow(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let base = args[0].as_double(line)?;
    let exponent = args[1].as_double(line)?;
    Ok(Value::Double(base.powf(exponent)))
}

/// `math.log(x)`: the natural logarithm.
pub fn log(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::ln, args, line)
}

/// `math.log10(x)`.
pub fn log10(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::log10, args, line)
}

/// `math.sin(x)`.
pub fn sin(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::sin, args, line)
}

/// `math.cos(x)`.
pub fn cos(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::cos, args, line)
}

/// `math.tan(x)`.
pub fn tan(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::tan, args, line)
}

/// `math.asin(x)`.
pub fn asin(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::asin, args, line)
}

/// `math.acos(x)`.
pub fn acos(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::acos, args, line)
}

/// `math.atan(x)`.
pub fn atan(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    unary_float(f64::atan, args, line)
}
