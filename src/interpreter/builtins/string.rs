use regex::Regex;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
    util::num::i64_to_usize,
};

/// Borrows a string argument, or reports a type error naming the builtin.
fn text<'v>(value: &'v Value, name: &str, line: usize) -> EvalResult<&'v str> {
    match value {
        Value::Str(s) => Ok(s),
        other => {
            Err(RuntimeError::TypeError { details: format!("{name} expects a string, got {}",
                                                           other.type_name()),
                                          line })
        },
    }
}

/// Interprets an argument as a regular expression: pattern values are used
/// as compiled, strings are compiled on the spot.
fn pattern_of(value: &Value, line: usize) -> EvalResult<Regex> {
    match value {
        Value::Pattern(pattern) => Ok(pattern.regex.clone()),
        Value::Str(s) => Regex::new(s).map_err(|e| {
                                          RuntimeError::InvalidRegex { details: e.to_string(),
                                                                      line }
                                      }),
        other => {
            Err(RuntimeError::TypeError { details: format!("expected a pattern or string, got {}",
                                                           other.type_name()),
                                          line })
        },
    }
}

/// `string.length(s)`: the number of characters.
#[allow(clippy::cast_possible_wrap)]
pub fn length(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let s = text(&args[0], "string.length", line)?;
    Ok(Value::Long(s.chars().count() as i64))
}

/// `string.contains(s, part)`.
pub fn contains(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let s = text(&args[0], "string.contains", line)?;
    let part = text(&args[1], "string.contains", line)?;
    Ok(Value::Bool(s.contains(part)))
}

/// `string.startsWith(s, prefix)`.
pub fn starts_with(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let s = text(&args[0], "string.startsWith", line)?;
    let prefix = text(&args[1], "string.startsWith", line)?;
    Ok(Value::Bool(s.starts_with(prefix)))
}

/// `string.endsWith(s, suffix)`.
pub fn ends_with(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let s = text(&args[0], "string.endsWith", line)?;
    let suffix = text(&args[1], "string.endsWith", line)?;
    Ok(Value::Bool(s.ends_with(suffix)))
}

/// `string.substring(s, begin)` / `string.substring(s, begin, end)`:
/// character-based slicing; `end` defaults to the string's length.
pub fn substring(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let s = text(&args[0], "string.substring", line)?;
    let chars: Vec<char> = s.chars().collect();

    let begin = i64_to_usize(args[1].as_long(line)?);
    let end = match args.get(2) {
        Some(end) => i64_to_usize(end.as_long(line)?),
        None => Some(chars.len()),
    };

    match (begin, end) {
        (Some(begin), Some(end)) if begin <= end && end <= chars.len() => {
            Ok(Value::from(chars[begin..end].iter().collect::<String>()))
        },
        _ => {
            Err(RuntimeError::InvalidArgument { details: "substring bounds out of range"
                                                             .to_string(),
                                                line })
        },
    }
}

/// `string.indexOf(s, part)`: the character index of the first occurrence,
/// or `-1`.
#[allow(clippy::cast_possible_wrap)]
pub fn index_of(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let s = text(&args[0], "string.indexOf", line)?;
    let part = text(&args[1], "string.indexOf", line)?;

    let index = s.find(part)
                 .map_or(-1, |byte_index| s[..byte_index].chars().count() as i64);
    Ok(Value::Long(index))
}

/// `string.split(s, regex)` / `string.split(s, regex, limit)`: splits on a
/// pattern, with an optional maximum number of pieces.
pub fn split(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let s = text(&args[0], "string.split", line)?;
    let pattern = pattern_of(&args[1], line)?;

    let pieces: Vec<Value> = match args.get(2) {
        Some(limit) => {
            let limit = i64_to_usize(limit.as_long(line)?).ok_or_else(|| {
                            RuntimeError::InvalidArgument { details:
                                                                "split limit must be non-negative"
                                                                    .to_string(),
                                                            line }
                        })?;
            pattern.splitn(s, limit).map(Value::from).collect()
        },
        None => pattern.split(s).map(Value::from).collect(),
    };

    Ok(Value::from(pieces))
}

/// `string.join(list)` / `string.join(list, sep)`: concatenates the
/// elements' renderings with an optional separator.
pub fn join(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let Value::List(items) = &args[0] else {
        return Err(RuntimeError::TypeError { details: format!("string.join expects a list, got {}",
                                                              args[0].type_name()),
                                             line });
    };
    let separator = match args.get(1) {
        Some(sep) => text(sep, "string.join", line)?.to_string(),
        None => String::new(),
    };

    let rendered: Vec<String> = items.borrow().iter().map(ToString::to_string).collect();
    Ok(Value::from(rendered.join(&separator)))
}

/// `string.replace_first(s, regex, replacement)`.
pub fn replace_first(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let s = text(&args[0], "string.replace_first", line)?;
    let pattern = pattern_of(&args[1], line)?;
    let replacement = text(&args[2], "string.replace_first", line)?;

    Ok(Value::from(pattern.replace(s, replacement).into_owned()))
}

/// `string.replace_all(s, regex, replacement)`.
pub fn replace_all(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let s = text(&args[0], "string.replace_all", line)?;
    let pattern = pattern_of(&args[1], line)?;
    let replacement = text(&args[2], "string.replace_all", line)?;

    Ok(Value::from(pattern.replace_all(s, replacement).into_owned()))
}
