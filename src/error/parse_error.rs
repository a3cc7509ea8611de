#[derive(Debug)]
/// Represents all errors that can occur during lexing or parsing.
pub enum ParseError {
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// The token encountered, with context.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Reached the end of input unexpectedly.
    UnexpectedEndOfInput {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A string literal was not closed before the end of its line.
    UnterminatedString {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A regular-expression literal was not closed before the end of its
    /// line.
    UnterminatedRegex {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `.` was not followed by the start of an identifier.
    IllegalObjectAccess {
        /// A printable rendering of the offending character.
        found: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A number literal could not be represented.
    InvalidNumber {
        /// The offending literal text.
        literal: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A character no token pattern matches.
    UnexpectedCharacter {
        /// A printable rendering of the offending character.
        found: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A trailing comma before a closing `)` in an argument or parameter
    /// list.
    TrailingComma {
        /// The source line where the error occurred.
        line: usize,
    },
}

impl ParseError {
    /// Gets the line number the error was reported on.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::UnexpectedToken { line, .. }
            | Self::UnexpectedEndOfInput { line }
            | Self::UnterminatedString { line }
            | Self::UnterminatedRegex { line }
            | Self::IllegalObjectAccess { line, .. }
            | Self::InvalidNumber { line, .. }
            | Self::UnexpectedCharacter { line, .. }
            | Self::TrailingComma { line } => *line,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { token, line } => {
                write!(f, "Error on line {line}: Unexpected token: {token}.")
            },

            Self::UnexpectedEndOfInput { line } => {
                write!(f, "Error on line {line}: Unexpected end of input.")
            },

            Self::UnterminatedString { line } => {
                write!(f, "Error on line {line}: Unterminated string literal.")
            },

            Self::UnterminatedRegex { line } => write!(f,
                                                       "Error on line {line}: Unterminated regular expression literal."),

            Self::IllegalObjectAccess { found, line } => write!(f,
                                                                "Error on line {line}: Expected a property name after '.', found '{found}'."),

            Self::InvalidNumber { literal, line } => {
                write!(f, "Error on line {line}: Invalid number literal '{literal}'.")
            },

            Self::UnexpectedCharacter { found, line } => {
                write!(f, "Error on line {line}: Unexpected character '{found}'.")
            },

            Self::TrailingComma { line } => {
                write!(f, "Error on line {line}: Trailing comma is not allowed here.")
            },
        }
    }
}

impl std::error::Error for ParseError {}
