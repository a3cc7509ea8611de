use std::cmp::Ordering;

use num_traits::ToPrimitive;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
    util::num::f64_to_i64_checked,
};

/// `long(x)`: converts a number or numeric string to a long, truncating
/// doubles towards zero.
pub fn long(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Long(n) => Ok(Value::Long(*n)),
        Value::Double(d) => Ok(Value::Long(f64_to_i64_checked(d.trunc(), line)?)),
        Value::BigNum(n) => {
            n.to_i64().map(Value::Long).ok_or(RuntimeError::LiteralTooLarge { line })
        },
        Value::Str(s) => s.trim().parse().map(Value::Long).map_err(|_| {
                                                              RuntimeError::InvalidArgument {
                    details: format!("cannot parse '{s}' as long"),
                    line,
                }
                                                          }),
        other => {
            Err(RuntimeError::InvalidArgument { details: format!("cannot convert {} to long",
                                                                 other.type_name()),
                                                line })
        },
    }
}

/// `double(x)`: converts a number or numeric string to a double.
pub fn double(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Str(s) => s.trim().parse().map(Value::Double).map_err(|_| {
                                                                RuntimeError::InvalidArgument {
                    details: format!("cannot parse '{s}' as double"),
                    line,
                }
                                                            }),
        other if other.is_numeric() => Ok(Value::Double(other.as_double(line)?)),
        other => {
            Err(RuntimeError::InvalidArgument { details: format!("cannot convert {} to double",
                                                                 other.type_name()),
                                                line })
        },
    }
}

/// `boolean(x)`: passes booleans through and parses the strings `"true"`
/// and `"false"`.
pub fn boolean(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Str(s) if &**s == "true" => Ok(Value::Bool(true)),
        Value::Str(s) if &**s == "false" => Ok(Value::Bool(false)),
        other => {
            Err(RuntimeError::InvalidArgument { details: format!("cannot convert {} to boolean",
                                                                 other.type_name()),
                                                line })
        },
    }
}

/// `str(x)`: the value's string rendering.
pub fn str(_context: &mut Context, args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::from(args[0].to_string()))
}

/// `identity(x)`: returns its argument unchanged.
pub fn identity(_context: &mut Context, args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(args[0].clone())
}

/// `type(x)`: the value's type name as a string.
pub fn type_of(_context: &mut Context, args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::from(args[0].type_name()))
}

/// `is_def(x)`: whether the value is defined (not `undefined`). Since an
/// unbound identifier evaluates to `undefined`, `is_def(x)` tests whether
/// `x` is bound anywhere.
pub fn is_def(_context: &mut Context, args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::Bool(!args[0].is_undefined()))
}

/// `cmp(a, b)`: `-1`, `0` or `1` according to the values' relative order.
pub fn cmp(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let order = match args[0].compare(&args[1], line)? {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    };
    Ok(Value::Long(order))
}
