use std::{cell::RefCell, cmp::Ordering, collections::HashSet, rc::Rc};

use indexmap::IndexMap;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary,
            core::{Context, EvalResult},
        },
        value::{
            core::{HostFn, Value},
            key::ValueKey,
        },
    },
};

/// `range(start, end)` / `range(start, end, step)`: the longs from `start`
/// up to (exclusive) `end`, as a list. A negative step counts down.
pub fn range(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let start = args[0].as_long(line)?;
    let end = args[1].as_long(line)?;
    let step = match args.get(2) {
        Some(step) => step.as_long(line)?,
        None => 1,
    };

    if step == 0 {
        return Err(RuntimeError::InvalidArgument { details: "range step must not be zero"
                                                                .to_string(),
                                                   line });
    }

    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < end) || (step < 0 && current > end) {
        items.push(Value::Long(current));
        let Some(next) = current.checked_add(step) else {
            break;
        };
        current = next;
    }

    Ok(Value::from(items))
}

/// `tuple(...)`: its arguments as a list.
pub fn tuple(_context: &mut Context, args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::from(args.to_vec()))
}

/// `seq.list(...)`: its arguments as a list.
pub fn list(_context: &mut Context, args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::from(args.to_vec()))
}

/// `seq.set(...)`: its arguments as a set. Duplicates collapse.
pub fn set(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let mut items = HashSet::new();
    for arg in args {
        items.insert(ValueKey::try_from_value(arg, line)?);
    }
    Ok(Value::Set(Rc::new(RefCell::new(items))))
}

/// `seq.map(k1, v1, k2, v2, ...)`: an insertion-ordered map from
/// alternating keys and values.
pub fn map_of(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    if args.len() % 2 != 0 {
        return Err(RuntimeError::InvalidArgument { details:
                                                       "seq.map expects key, value pairs"
                                                           .to_string(),
                                                   line });
    }

    let mut entries = IndexMap::new();
    for pair in args.chunks(2) {
        entries.insert(ValueKey::try_from_value(&pair[0], line)?, pair[1].clone());
    }
    Ok(Value::Map(Rc::new(RefCell::new(entries))))
}

/// `seq.add(list, x)` / `seq.add(set, x)` / `seq.add(map, k, v)`: adds to a
/// collection in place and returns the collection.
pub fn add(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    match (&args[0], args.len()) {
        (Value::List(items), 2) => {
            items.borrow_mut().push(args[1].clone());
            Ok(args[0].clone())
        },
        (Value::Set(items), 2) => {
            items.borrow_mut().insert(ValueKey::try_from_value(&args[1], line)?);
            Ok(args[0].clone())
        },
        (Value::Map(entries), 3) => {
            entries.borrow_mut()
                   .insert(ValueKey::try_from_value(&args[1], line)?, args[2].clone());
            Ok(args[0].clone())
        },
        (Value::Map(_), _) => {
            Err(RuntimeError::InvalidArgument { details:
                                                    "seq.add on a map expects a key and a value"
                                                        .to_string(),
                                                line })
        },
        (other, _) => {
            Err(RuntimeError::TypeError { details: format!("cannot add to {}", other.type_name()),
                                          line })
        },
    }
}

/// `seq.get(coll, index_or_key)`: element or entry read with the same
/// semantics as the subscript operator.
pub fn get(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    binary::element_read(&args[0], &args[1], line)
}

/// `seq.contains_key(coll, key)`: whether a map holds the key, a list has
/// the index in range, or a set holds the element.
#[allow(clippy::cast_sign_loss)]
pub fn contains_key(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let found = match &args[0] {
        Value::Map(entries) => {
            entries.borrow().contains_key(&ValueKey::try_from_value(&args[1], line)?)
        },
        Value::Set(items) => items.borrow().contains(&ValueKey::try_from_value(&args[1], line)?),
        Value::List(items) => {
            let index = args[1].as_long(line)?;
            index >= 0 && (index as usize) < items.borrow().len()
        },
        other => {
            return Err(RuntimeError::TypeError { details: format!("{} has no keys",
                                                                  other.type_name()),
                                                 line });
        },
    };
    Ok(Value::Bool(found))
}

/// `seq.remove(coll, x)`: removes an element (lists: first equal element;
/// sets: the element; maps: the key) and returns the collection.
pub fn remove(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::List(items) => {
            let position = items.borrow().iter().position(|item| item.loose_eq(&args[1]));
            if let Some(position) = position {
                items.borrow_mut().remove(position);
            }
            Ok(args[0].clone())
        },
        Value::Set(items) => {
            items.borrow_mut().remove(&ValueKey::try_from_value(&args[1], line)?);
            Ok(args[0].clone())
        },
        Value::Map(entries) => {
            entries.borrow_mut()
                   .shift_remove(&ValueKey::try_from_value(&args[1], line)?);
            Ok(args[0].clone())
        },
        other => {
            Err(RuntimeError::TypeError { details: format!("cannot remove from {}",
                                                           other.type_name()),
                                          line })
        },
    }
}

/// The elements of a list or set, snapshotted. The iteration source for the
/// higher-order builtins.
fn elements(value: &Value, line: usize) -> EvalResult<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items.borrow().clone()),
        Value::Set(items) => Ok(items.borrow().iter().map(ValueKey::to_value).collect()),
        other => {
            Err(RuntimeError::NotIterable { found: other.type_name().to_string(),
                                            line })
        },
    }
}

/// `count(coll)`: the number of elements, entries or characters.
#[allow(clippy::cast_possible_wrap)]
pub fn count(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Long(size(&args[0], line)? as i64))
}

/// `is_empty(coll)`: whether `count` would be zero.
pub fn is_empty(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Bool(size(&args[0], line)? == 0))
}

fn size(value: &Value, line: usize) -> EvalResult<usize> {
    match value {
        Value::List(items) => Ok(items.borrow().len()),
        Value::Map(entries) => Ok(entries.borrow().len()),
        Value::Set(items) => Ok(items.borrow().len()),
        Value::Str(s) => Ok(s.chars().count()),
        other => {
            Err(RuntimeError::TypeError { details: format!("{} has no size", other.type_name()),
                                          line })
        },
    }
}

/// `min(...)` / `max(...)`: the smallest or largest of the arguments, or of
/// a single list argument's elements.
pub fn min_max(which: &str, _context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let items = match args {
        [Value::List(items)] => items.borrow().clone(),
        _ => args.to_vec(),
    };

    let Some(first) = items.first() else {
        return Ok(Value::Nil);
    };

    let mut best = first.clone();
    for item in &items[1..] {
        let order = item.compare(&best, line)?;
        let better = if which == "min" { order == Ordering::Less } else { order == Ordering::Greater };
        if better {
            best = item.clone();
        }
    }
    Ok(best)
}

/// `map(coll, f)`: the results of applying `f` to each element, as a list.
pub fn map_fn(context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let mut mapped = Vec::new();
    for item in elements(&args[0], line)? {
        mapped.push(context.call_value(&args[1], &[item], line)?);
    }
    Ok(Value::from(mapped))
}

/// `filter(coll, pred)`: the elements for which `pred` returns true, as a
/// list.
pub fn filter(context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let mut kept = Vec::new();
    for item in elements(&args[0], line)? {
        if context.call_value(&args[1], &[item.clone()], line)?.as_bool(line)? {
            kept.push(item);
        }
    }
    Ok(Value::from(kept))
}

/// `reduce(coll, f, init)`: folds `f(acc, element)` over the elements,
/// starting from `init`.
pub fn reduce(context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let mut acc = args[2].clone();
    for item in elements(&args[0], line)? {
        acc = context.call_value(&args[1], &[acc, item], line)?;
    }
    Ok(acc)
}

/// `include(coll, x)`: whether the collection contains an element equal to
/// `x`.
pub fn include(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    if let Value::Set(items) = &args[0] {
        let key = ValueKey::try_from_value(&args[1], line)?;
        return Ok(Value::Bool(items.borrow().contains(&key)));
    }

    let found = elements(&args[0], line)?.iter().any(|item| item.loose_eq(&args[1]));
    Ok(Value::Bool(found))
}

/// `sort(list)`: a sorted copy of the list. Elements must be mutually
/// comparable.
pub fn sort(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let Value::List(items) = &args[0] else {
        return Err(RuntimeError::TypeError { details: format!("cannot sort {}",
                                                              args[0].type_name()),
                                             line });
    };

    let mut sorted = items.borrow().clone();
    let mut failure = None;
    sorted.sort_by(|a, b| match a.compare(b, line) {
              Ok(order) => order,
              Err(error) => {
                  failure.get_or_insert(error);
                  Ordering::Equal
              },
          });

    match failure {
        Some(error) => Err(error),
        None => Ok(Value::from(sorted)),
    }
}

/// `reverse(list)`: a reversed copy of the list.
pub fn reverse(_context: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let Value::List(items) = &args[0] else {
        return Err(RuntimeError::TypeError { details: format!("cannot reverse {}",
                                                              args[0].type_name()),
                                             line });
    };

    let mut reversed = items.borrow().clone();
    reversed.reverse();
    Ok(Value::from(reversed))
}

/// The predicate factories: `seq.eq(v)` and friends return a one-argument
/// function value testing each element against `v`; `seq.nil()` and
/// `seq.exists()` test against nil-ness.
pub fn predicate(which: &'static str,
                 _context: &mut Context,
                 args: &[Value],
                 _line: usize)
                 -> EvalResult<Value> {
    let target = args.first().cloned();

    let func = Box::new(move |call_args: &[Value], call_line: usize| {
        let Some(subject) = call_args.first() else {
            return Err(RuntimeError::ArgumentCountMismatch { name: which.to_string(),
                                                             line: call_line, });
        };

        let holds = match which {
            "seq.eq" => subject.loose_eq(target.as_ref().unwrap_or(&Value::Nil)),
            "seq.neq" => !subject.loose_eq(target.as_ref().unwrap_or(&Value::Nil)),
            "seq.nil" => matches!(subject, Value::Nil),
            "seq.exists" => !matches!(subject, Value::Nil | Value::Undefined),
            ordered => {
                let order =
                    subject.compare(target.as_ref().unwrap_or(&Value::Nil), call_line)?;
                match ordered {
                    "seq.gt" => order == Ordering::Greater,
                    "seq.ge" => order != Ordering::Less,
                    "seq.lt" => order == Ordering::Less,
                    _ => order != Ordering::Greater,
                }
            },
        };

        Ok(Value::Bool(holds))
    });

    Ok(Value::HostFn(Rc::new(HostFn { name: which.to_string(),
                                      func })))
}
