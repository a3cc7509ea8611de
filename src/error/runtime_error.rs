use crate::interpreter::value::core::Value;

#[derive(Debug)]
/// Represents all errors that can occur during evaluation and runtime.
pub enum RuntimeError {
    /// Read an undefined variable in a context that demands a value.
    UndefinedVariable {
        /// The name of the variable.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to call a value that is not callable.
    NotAFunction {
        /// A rendering of the value in call position.
        found: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Tried to iterate a value with no iteration contract.
    NotIterable {
        /// A rendering of the offending value.
        found: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// The left side of an assignment is not a variable, field or element.
    InvalidAssignmentTarget {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A value had an unexpected or incompatible type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A boolean value was expected, but not found.
    ExpectedBoolean {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A numeric value was expected, but not found.
    ExpectedNumber {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to write an element outside the allowed bounds.
    IndexOutOfBounds {
        /// The largest valid index.
        max:   usize,
        /// The index that was actually requested.
        found: i64,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Attempted division by zero.
    DivisionByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Arithmetic operation overflowed.
    Overflow {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An argument was invalid or out of range.
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// The wrong number of arguments was supplied to a builtin.
    ArgumentCountMismatch {
        /// The name of the function.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A regular expression failed to compile.
    InvalidRegex {
        /// The compilation failure message.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A `break` outside any enclosing loop.
    BreakOutsideLoop {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `continue` outside any enclosing loop.
    ContinueOutsideLoop {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A value raised by a `throw` statement, catchable by `try/catch`.
    Thrown {
        /// The thrown value.
        value: Value,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A literal value was too large to be represented safely.
    LiteralTooLarge {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to use a fractional number where an integer was required.
    RealIsFractional {
        /// The source line where the error occurred.
        line: usize,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedVariable { name, line } => {
                write!(f, "Error on line {line}: Undefined variable '{name}'.")
            },
            Self::NotAFunction { found, line } => {
                write!(f, "Error on line {line}: '{found}' is not a function.")
            },
            Self::NotIterable { found, line } => {
                write!(f, "Error on line {line}: '{found}' is not iterable.")
            },
            Self::InvalidAssignmentTarget { line } => {
                write!(f, "Error on line {line}: Invalid assignment target.")
            },
            Self::TypeError { details, line } => {
                write!(f, "Error on line {line}: Type error: {details}.")
            },
            Self::ExpectedBoolean { line } => write!(f, "Error on line {line}: Expected boolean."),
            Self::ExpectedNumber { line } => write!(f, "Error on line {line}: Expected number."),
            Self::IndexOutOfBounds { max, found, line } => write!(f,
                                                                  "Error on line {line}: Index out of bounds. Maximum is {max}, but found {found} instead."),
            Self::DivisionByZero { line } => write!(f, "Error on line {line}: Division by zero."),
            Self::Overflow { line } => write!(f,
                                              "Error on line {line}: Integer overflow while trying to compute result."),
            Self::InvalidArgument { details, line } => {
                write!(f, "Error on line {line}: Invalid argument: {details}.")
            },
            Self::ArgumentCountMismatch { name, line } => write!(f,
                                                                 "Error on line {line}: Wrong number of arguments for '{name}'."),
            Self::InvalidRegex { details, line } => {
                write!(f, "Error on line {line}: Invalid regular expression: {details}.")
            },
            Self::BreakOutsideLoop { line } => {
                write!(f, "Error on line {line}: 'break' outside of a loop.")
            },
            Self::ContinueOutsideLoop { line } => {
                write!(f, "Error on line {line}: 'continue' outside of a loop.")
            },
            Self::Thrown { value, line } => write!(f, "Error on line {line}: Uncaught: {value}"),
            Self::LiteralTooLarge { line } => {
                write!(f, "Error on line {line}: Literal is too large.")
            },
            Self::RealIsFractional { line } => write!(f,
                                                      "Error on line {line}: Value is fractional and cannot be safely converted to an integer."),
        }
    }
}

impl std::error::Error for RuntimeError {}
