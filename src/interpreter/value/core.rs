use std::{cell::RefCell, cmp::Ordering, collections::HashSet, rc::Rc};

use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use regex::Regex;

use crate::{
    error::RuntimeError,
    interpreter::{
        builtins::BuiltinDef,
        evaluator::core::EvalResult,
        value::{env::Closure, key::ValueKey},
    },
    util::num::i64_to_f64_checked,
};

/// A compiled regular expression together with the source text it was
/// compiled from. The source is kept for display and for equality.
#[derive(Debug)]
pub struct PatternValue {
    /// The literal body as written between the delimiting slashes.
    pub source:   String,
    /// The compiled expression, as written.
    pub regex:    Regex,
    /// The same expression anchored at both ends, used by `=~`, which tests
    /// a full match.
    pub anchored: Regex,
}

impl PatternValue {
    /// Compiles a pattern from its literal body.
    ///
    /// # Errors
    /// Returns `RuntimeError::InvalidRegex` when the body is not a valid
    /// regular expression.
    pub fn compile(source: &str, line: usize) -> EvalResult<Self> {
        let compile = |text: &str| {
            Regex::new(text).map_err(|e| {
                                 RuntimeError::InvalidRegex { details: e.to_string(),
                                                             line }
                             })
        };

        Ok(Self { source:   source.to_string(),
                  regex:    compile(source)?,
                  anchored: compile(&format!(r"\A(?:{source})\z"))?, })
    }
}

/// A host-provided function value closing over host state, such as the
/// predicates produced by `seq.eq` and friends.
pub struct HostFn {
    /// The display name.
    pub name: String,
    /// The callable itself.
    pub func: Box<dyn Fn(&[Value], usize) -> EvalResult<Value>>,
}

impl std::fmt::Debug for HostFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostFn").field("name", &self.name).finish()
    }
}

/// Represents a runtime value in the interpreter.
///
/// This enum models all the possible types that can appear in expressions,
/// assignments, function returns, and conditional evaluations. Collections
/// are shared mutable references: cloning a `Value::List` clones the handle,
/// not the elements.
#[derive(Debug, Clone)]
pub enum Value {
    /// A 64-bit signed integer.
    Long(i64),
    /// A double-precision floating-point number. Decimal-tagged literals
    /// (`M` suffix) land here as well.
    Double(f64),
    /// A boolean value (`true` or `false`).
    Bool(bool),
    /// An immutable string.
    Str(Rc<str>),
    /// An arbitrary-precision integer, from `N`-suffixed literals.
    BigNum(Rc<BigInt>),
    /// The nil value. First-class and distinct from `Undefined`.
    Nil,
    /// The value of an identifier with no binding anywhere. A diagnostic
    /// value, not nil.
    Undefined,
    /// A compiled regular expression.
    Pattern(Rc<PatternValue>),
    /// A user function: `lambda` or `fn`, with its captured frame.
    Closure(Rc<Closure>),
    /// A function from the built-in catalog.
    Builtin(&'static BuiltinDef),
    /// A host-provided function value.
    HostFn(Rc<HostFn>),
    /// An ordered list of values.
    List(Rc<RefCell<Vec<Value>>>),
    /// An insertion-ordered map.
    Map(Rc<RefCell<IndexMap<ValueKey, Value>>>),
    /// An unordered set of hashable values.
    Set(Rc<RefCell<HashSet<ValueKey>>>),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Rc::from(v.as_str()))
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(Rc::new(RefCell::new(v)))
    }
}

impl Value {
    /// The value's type name, as reported by the `type` builtin and used in
    /// error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::Bool(_) => "boolean",
            Self::Str(_) => "string",
            Self::BigNum(_) => "bigint",
            Self::Nil => "nil",
            Self::Undefined => "undefined",
            Self::Pattern(_) => "pattern",
            Self::Closure(_) | Self::Builtin(_) | Self::HostFn(_) => "function",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Set(_) => "set",
        }
    }

    /// Converts the value to `bool`, or returns an error if not boolean.
    ///
    /// Used for conditions in `if`, `while` and `?:`, and for logical
    /// operands.
    ///
    /// # Parameters
    /// - `line`: Source code line number for error reporting.
    ///
    /// # Returns
    /// - `Ok(bool)`: The boolean value.
    /// - `Err(RuntimeError::ExpectedBoolean)`: If not boolean.
    pub const fn as_bool(&self, line: usize) -> EvalResult<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(RuntimeError::ExpectedBoolean { line }),
        }
    }

    /// Converts the value to an `f64`, or returns an error if not numeric.
    ///
    /// Accepts `Long`, `Double` and `BigNum`. Integer conversion fails when
    /// the value is too large to be represented as `f64` exactly.
    ///
    /// # Parameters
    /// - `line`: Source code line number for error reporting.
    ///
    /// # Returns
    /// - `Ok(f64)`: If the value is numeric and representable.
    /// - `Err(RuntimeError::ExpectedNumber | LiteralTooLarge)`: Otherwise.
    pub fn as_double(&self, line: usize) -> EvalResult<f64> {
        match self {
            Self::Double(d) => Ok(*d),
            Self::Long(n) => i64_to_f64_checked(*n, RuntimeError::LiteralTooLarge { line }),
            Self::BigNum(n) => n.to_f64().ok_or(RuntimeError::LiteralTooLarge { line }),
            _ => Err(RuntimeError::ExpectedNumber { line }),
        }
    }

    /// Converts the value to `i64`, or returns an error if not an integer.
    ///
    /// # Parameters
    /// - `line`: Source code line number for error reporting.
    ///
    /// # Returns
    /// - `Ok(i64)`: The integer value.
    /// - `Err(RuntimeError::ExpectedNumber | LiteralTooLarge)`: Otherwise.
    pub fn as_long(&self, line: usize) -> EvalResult<i64> {
        match self {
            Self::Long(n) => Ok(*n),
            Self::BigNum(n) => n.to_i64().ok_or(RuntimeError::LiteralTooLarge { line }),
            _ => Err(RuntimeError::ExpectedNumber { line }),
        }
    }

    /// Returns `true` if the value is numeric (`Long`, `Double` or
    /// `BigNum`).
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Long(_) | Self::Double(_) | Self::BigNum(_))
    }

    /// Returns `true` if the value is [`Value::Undefined`].
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` if the value is callable.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Closure(_) | Self::Builtin(_) | Self::HostFn(_))
    }

    /// Loose, type-coercing equality as used by `==` and `!=`.
    ///
    /// Numeric kinds compare by value across `Long`, `Double` and `BigNum`.
    /// `nil` equals only `nil`, and `undefined` equals only `undefined`.
    /// Lists and maps compare element-wise; functions compare by identity.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Long(a), Self::Double(b)) | (Self::Double(b), Self::Long(a)) => {
                (*a as f64) == *b
            },
            (Self::BigNum(a), Self::BigNum(b)) => a == b,
            (Self::BigNum(a), Self::Long(b)) | (Self::Long(b), Self::BigNum(a)) => {
                **a == BigInt::from(*b)
            },
            (Self::BigNum(a), Self::Double(b)) | (Self::Double(b), Self::BigNum(a)) => {
                a.to_f64().is_some_and(|a| a == *b)
            },
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Nil, Self::Nil) | (Self::Undefined, Self::Undefined) => true,
            (Self::Pattern(a), Self::Pattern(b)) => a.source == b.source,
            (Self::Closure(a), Self::Closure(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a.name == b.name,
            (Self::HostFn(a), Self::HostFn(b)) => Rc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.loose_eq(y))
            },
            (Self::Map(a), Self::Map(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| v.loose_eq(other)))
            },
            (Self::Set(a), Self::Set(b)) => *a.borrow() == *b.borrow(),
            _ => false,
        }
    }

    /// Orders two values for the relational operators and `sort`.
    ///
    /// Numbers order across kinds; strings order lexicographically; booleans
    /// order `false < true`. Anything else is a type error.
    ///
    /// # Parameters
    /// - `other`: The value to compare against.
    /// - `line`: Source code line number for error reporting.
    ///
    /// # Returns
    /// - `Ok(Ordering)`: The relative order.
    /// - `Err(RuntimeError::TypeError)`: If the kinds are incomparable.
    pub fn compare(&self, other: &Self, line: usize) -> EvalResult<Ordering> {
        let incomparable = || {
            RuntimeError::TypeError { details: format!("cannot compare {} and {}",
                                                       self.type_name(),
                                                       other.type_name()),
                                      line }
        };

        match (self, other) {
            (Self::Long(a), Self::Long(b)) => Ok(a.cmp(b)),
            (Self::BigNum(a), Self::BigNum(b)) => Ok(a.cmp(b)),
            (Self::BigNum(a), Self::Long(b)) => Ok((**a).cmp(&BigInt::from(*b))),
            (Self::Long(a), Self::BigNum(b)) => Ok(BigInt::from(*a).cmp(b)),
            (Self::Str(a), Self::Str(b)) => Ok(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Ok(a.cmp(b)),
            _ if self.is_numeric() && other.is_numeric() => {
                let a = self.as_double(line)?;
                let b = other.as_double(line)?;
                a.partial_cmp(&b).ok_or_else(incomparable)
            },
            _ => Err(incomparable()),
        }
    }
}

/// Strict equality, used by tests and collection comparisons. Same-kind
/// values compare by content (by identity for functions); cross-kind numeric
/// coercion is left to [`Value::loose_eq`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::BigNum(a), Self::BigNum(b)) => a == b,
            (Self::Nil, Self::Nil) | (Self::Undefined, Self::Undefined) => true,
            (Self::Pattern(a), Self::Pattern(b)) => a.source == b.source,
            (Self::Closure(a), Self::Closure(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a.name == b.name,
            (Self::HostFn(a), Self::HostFn(b)) => Rc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) => *a.borrow() == *b.borrow(),
            (Self::Map(a), Self::Map(b)) => *a.borrow() == *b.borrow(),
            (Self::Set(a), Self::Set(b)) => *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long(n) => write!(f, "{n}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::BigNum(n) => write!(f, "{n}"),
            Self::Nil => write!(f, "nil"),
            Self::Undefined => write!(f, "undefined"),
            Self::Pattern(p) => write!(f, "/{}/", p.source),
            Self::Closure(c) => match &c.name {
                Some(name) => write!(f, "<fn {name}>"),
                None => write!(f, "<lambda>"),
            },
            Self::Builtin(b) => write!(f, "<builtin {}>", b.name),
            Self::HostFn(h) => write!(f, "<fn {}>", h.name),
            Self::List(items) => {
                write!(f, "[")?;
                for (index, value) in items.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            },
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (index, (key, value)) in entries.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            },
            Self::Set(items) => {
                // Sets are unordered; print in a stable order anyway.
                let mut rendered: Vec<String> =
                    items.borrow().iter().map(ToString::to_string).collect();
                rendered.sort();

                write!(f, "{{")?;
                for (index, item) in rendered.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            },
        }
    }
}
