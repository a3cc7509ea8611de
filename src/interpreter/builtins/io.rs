use chrono::{Local, Utc};
use rand::Rng;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

/// `print(x)`: writes the value without a trailing newline. Returns nil.
pub fn print(_context: &mut Context, args: &[Value], _line: usize) -> EvalResult<Value> {
    print!("{}", args[0]);
    Ok(Value::Nil)
}

/// `println()` / `println(x)`: writes the value (or nothing) followed by a
/// newline. Returns nil.
pub fn println(_context: &mut Context, args: &[Value], _line: usize) -> EvalResult<Value> {
    match args.first() {
        Some(value) => println!("{value}"),
        None => println!(),
    }
    Ok(Value::Nil)
}

/// `p(x)`: writes the value followed by a newline and returns the value, so
/// it can be spliced into expressions while debugging.
pub fn p(_context: &mut Context, args: &[Value], _line: usize) -> EvalResult<Value> {
    println!("{}", args[0]);
    Ok(args[0].clone())
}

/// `sysdate()`: the current local date and time, rendered as a string.
pub fn sysdate(_context: &mut Context, _args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::from(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()))
}

/// `now()`: milliseconds since the Unix epoch.
pub fn now(_context: &mut Context, _args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::Long(Utc::now().timestamp_millis()))
}

/// `rand()`: a double in `[0, 1)`. `rand(n)`: a long in `[0, n)`.
pub fn rand(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let mut rng = rand::thread_rng();

    match args.first() {
        None => Ok(Value::Double(rng.r#gen::<f64>())),
        Some(bound) => {
            let bound = bound.as_long(line)?;
            if bound <= 0 {
                return Err(RuntimeError::InvalidArgument { details:
                                                               "rand bound must be positive"
                                                                   .to_string(),
                                                           line });
            }
            Ok(Value::Long(rng.gen_range(0..bound)))
        },
    }
}
