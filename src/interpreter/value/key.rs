use ordered_float::OrderedFloat;

use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
};

/// The hashable subset of values, used for set elements and map keys.
///
/// Floats are wrapped in `OrderedFloat` so that keys hash consistently.
/// Collections, closures and patterns are not hashable; using one as a key
/// is a type error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    /// An integer key.
    Long(i64),
    /// A floating-point key.
    Double(OrderedFloat<f64>),
    /// A boolean key.
    Bool(bool),
    /// A string key.
    Str(String),
    /// The nil key.
    Nil,
}

impl ValueKey {
    /// Converts a runtime value into a key.
    ///
    /// # Errors
    /// Returns a `TypeError` when the value is of a kind that cannot be
    /// hashed.
    pub fn try_from_value(value: &Value, line: usize) -> EvalResult<Self> {
        match value {
            Value::Long(n) => Ok(Self::Long(*n)),
            Value::Double(d) => Ok(Self::Double(OrderedFloat(*d))),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Str(s) => Ok(Self::Str(s.to_string())),
            Value::Nil => Ok(Self::Nil),
            other => {
                Err(RuntimeError::TypeError { details: format!("{} cannot be used as a key",
                                                               other.type_name()),
                                              line })
            },
        }
    }

    /// Converts the key back into a runtime value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Long(n) => Value::Long(*n),
            Self::Double(d) => Value::Double(d.into_inner()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Str(s) => Value::from(s.as_str()),
            Self::Nil => Value::Nil,
        }
    }
}

impl std::fmt::Display for ValueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long(n) => write!(f, "{n}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Nil => write!(f, "nil"),
        }
    }
}
