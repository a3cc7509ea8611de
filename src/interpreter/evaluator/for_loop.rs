use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{
    ast::{Expr, Statement},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, Control, EvalResult},
        value::{core::Value, env::Frame, key::ValueKey},
    },
};

/// One step of an iteration: the value for the index/key name and the value
/// for the item name.
struct IterationStep {
    index: Value,
    item:  Value,
}

impl Context {
    /// Executes a `for` statement.
    ///
    /// The iterable is evaluated once. Maps iterate in insertion order
    /// yielding (key, value) pairs; lists yield (index, element); sets
    /// yield (index, element) in an unspecified order. Anything else raises
    /// a not-iterable error.
    ///
    /// With a single name, a map iteration binds a `{key, value}` record
    /// and the other forms bind the element; with two names, the first is
    /// bound to the index or key and the second to the item.
    ///
    /// Each iteration runs the body in a fresh child frame, so the loop
    /// bindings cannot leak.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn eval_for(&mut self,
                           index: Option<&str>,
                           item: &str,
                           iterable: &Expr,
                           body: &[Statement],
                           line: usize)
                           -> EvalResult<Control> {
        let value = self.eval(iterable)?;

        let steps: Vec<IterationStep> = match &value {
            Value::Map(entries) => entries.borrow()
                                          .iter()
                                          .map(|(key, value)| {
                                              IterationStep { index: key.to_value(),
                                                              item:  value.clone(), }
                                          })
                                          .collect(),

            Value::List(items) => items.borrow()
                                       .iter()
                                       .enumerate()
                                       .map(|(position, element)| {
                                           IterationStep { index: Value::from(position as i64),
                                                           item:  element.clone(), }
                                       })
                                       .collect(),

            Value::Set(items) => items.borrow()
                                      .iter()
                                      .enumerate()
                                      .map(|(position, key)| {
                                          IterationStep { index: Value::from(position as i64),
                                                          item:  key.to_value(), }
                                      })
                                      .collect(),

            other => {
                return Err(RuntimeError::NotIterable { found: other.type_name().to_string(),
                                                       line });
            },
        };

        let over_map = matches!(value, Value::Map(_));

        for step in steps {
            let previous = Rc::clone(&self.current);
            self.current = Frame::child(&previous);

            match index {
                Some(index_name) => {
                    self.current.define(index_name, step.index);
                    self.current.define(item, step.item);
                },
                None if over_map => {
                    // Single-name map form: bind a {key, value} record.
                    let mut record = IndexMap::new();
                    record.insert(ValueKey::Str("key".to_string()), step.index);
                    record.insert(ValueKey::Str("value".to_string()), step.item);
                    self.current.define(item, Value::Map(Rc::new(RefCell::new(record))));
                },
                None => self.current.define(item, step.item),
            }

            let outcome = self.execute_statements(body);
            self.current = previous;

            match outcome? {
                Control::Value(_) | Control::Continue { .. } => {},
                Control::Break { .. } => break,
                signal @ Control::Return(_) => return Ok(signal),
            }
        }

        Ok(Control::Value(Value::Nil))
    }
}
