use logos::Logos;
use num_bigint::BigInt;

use crate::error::ParseError;

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
pub enum Token {
    /// Floating-point literal tokens, such as `3.14`, `.5` or `2.1e-10`.
    /// A trailing `M` marks a decimal-tagged literal; it is accepted and
    /// carries no distinct runtime representation.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?M?", parse_double)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?M?", parse_double)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+M?", parse_double)]
    #[regex(r"[0-9]+M", parse_double)]
    Double(f64),
    /// Integer literal tokens, decimal (`42`) or hexadecimal (`0xFF`).
    #[regex(r"0[xX][0-9a-fA-F]+", parse_hex)]
    #[regex(r"[0-9]+", parse_long)]
    Long(i64),
    /// Arbitrary-precision integer literals, suffixed `N`: `170141183460469N`.
    #[regex(r"[0-9]+N", parse_bignum)]
    BigNum(BigInt),
    /// String literal tokens, delimited by matching `"` or `'`. The payload
    /// is the raw inner lexeme; escape processing and interpolation are
    /// deferred to evaluation.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#, parse_string)]
    #[regex(r"'([^'\\\n]|\\[^\n])*'", parse_string)]
    Str(String),
    /// A regular-expression literal body. Never produced by the token
    /// patterns themselves: the [`Lexer`] wrapper recognizes a `/` in regex
    /// position and scans the body by hand.
    Regex(String),
    /// Identifier tokens; variable or function names such as `x` or `sum`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// `true`
    #[token("true")]
    True,
    /// `false`
    #[token("false")]
    False,
    /// `nil`
    #[token("nil")]
    Nil,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `elsif`
    #[token("elsif")]
    Elsif,
    /// `for`
    #[token("for")]
    For,
    /// `in`
    #[token("in")]
    In,
    /// `while`
    #[token("while")]
    While,
    /// `break`
    #[token("break")]
    Break,
    /// `continue`
    #[token("continue")]
    Continue,
    /// `return`
    #[token("return")]
    Return,
    /// `try`
    #[token("try")]
    Try,
    /// `catch`
    #[token("catch")]
    Catch,
    /// `finally`
    #[token("finally")]
    Finally,
    /// `throw`
    #[token("throw")]
    Throw,
    /// `fn`
    #[token("fn")]
    Fn,
    /// `lambda`
    #[token("lambda")]
    Lambda,
    /// `end`
    #[token("end")]
    End,
    /// `let`
    #[token("let")]
    Let,
    /// `new` (reserved)
    #[token("new")]
    New,
    /// `use` (reserved)
    #[token("use")]
    Use,

    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `?`
    #[token("?")]
    Question,
    /// `.`
    #[token(".")]
    Dot,
    /// `->`
    #[token("->")]
    Arrow,

    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `**`
    #[token("**")]
    StarStar,
    /// `&`
    #[token("&")]
    Amp,
    /// `|`
    #[token("|")]
    Pipe,
    /// `^`
    #[token("^")]
    Caret,
    /// `~`
    #[token("~")]
    Tilde,
    /// `<<`
    #[token("<<")]
    Shl,
    /// `>>`
    #[token(">>")]
    Shr,
    /// `>>>`
    #[token(">>>")]
    UShr,
    /// `==`
    #[token("==")]
    EqEq,
    /// `!=`
    #[token("!=")]
    NotEq,
    /// `<`
    #[token("<")]
    Lt,
    /// `<=`
    #[token("<=")]
    Le,
    /// `>`
    #[token(">")]
    Gt,
    /// `>=`
    #[token(">=")]
    Ge,
    /// `&&`
    #[token("&&")]
    AndAnd,
    /// `||`
    #[token("||")]
    OrOr,
    /// `!`
    #[token("!")]
    Bang,
    /// `=`
    #[token("=")]
    Assign,
    /// `=~`
    #[token("=~")]
    Match,

    /// `## Comments.`
    #[regex(r"##[^\n]*", logos::skip)]
    Comment,
    /// Newlines are skipped, but counted for error reporting.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        logos::Skip
    })]
    Newline,
    /// Tabs and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number for error reporting and diagnostics.
/// Incremented as newlines are processed.
#[derive(Default)]
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line: usize,
}

/// Parses a floating-point literal from the current token slice, tolerating
/// a trailing `M` suffix.
fn parse_double(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().trim_end_matches('M').parse().ok()
}
/// Parses a decimal integer literal from the current token slice.
fn parse_long(lex: &logos::Lexer<Token>) -> Option<i64> {
    lex.slice().parse().ok()
}
/// Parses a hexadecimal integer literal (`0x...`) from the current token
/// slice.
fn parse_hex(lex: &logos::Lexer<Token>) -> Option<i64> {
    i64::from_str_radix(&lex.slice()[2..], 16).ok()
}
/// Parses an `N`-suffixed arbitrary-precision integer literal.
fn parse_bignum(lex: &logos::Lexer<Token>) -> Option<BigInt> {
    lex.slice().trim_end_matches('N').parse().ok()
}
/// Strips the delimiting quotes from a string literal. The inner lexeme is
/// kept raw; escapes are processed at evaluation time.
fn parse_string(lex: &logos::Lexer<Token>) -> Option<String> {
    let slice = lex.slice();
    Some(slice[1..slice.len() - 1].to_string())
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Double(v) => write!(f, "{v:?}"),
            Self::Long(n) => write!(f, "{n}"),
            Self::BigNum(n) => write!(f, "{n}N"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Regex(r) => write!(f, "/{r}/"),
            Self::Ident(name) => write!(f, "{name}"),
            _ => f.write_str(match self {
                Self::True => "true",
                Self::False => "false",
                Self::Nil => "nil",
                Self::If => "if",
                Self::Else => "else",
                Self::Elsif => "elsif",
                Self::For => "for",
                Self::In => "in",
                Self::While => "while",
                Self::Break => "break",
                Self::Continue => "continue",
                Self::Return => "return",
                Self::Try => "try",
                Self::Catch => "catch",
                Self::Finally => "finally",
                Self::Throw => "throw",
                Self::Fn => "fn",
                Self::Lambda => "lambda",
                Self::End => "end",
                Self::Let => "let",
                Self::New => "new",
                Self::Use => "use",
                Self::LParen => "(",
                Self::RParen => ")",
                Self::LBracket => "[",
                Self::RBracket => "]",
                Self::LBrace => "{",
                Self::RBrace => "}",
                Self::Comma => ",",
                Self::Semicolon => ";",
                Self::Colon => ":",
                Self::Question => "?",
                Self::Dot => ".",
                Self::Arrow => "->",
                Self::Plus => "+",
                Self::Minus => "-",
                Self::Star => "*",
                Self::Slash => "/",
                Self::Percent => "%",
                Self::StarStar => "**",
                Self::Amp => "&",
                Self::Pipe => "|",
                Self::Caret => "^",
                Self::Tilde => "~",
                Self::Shl => "<<",
                Self::Shr => ">>",
                Self::UShr => ">>>",
                Self::EqEq => "==",
                Self::NotEq => "!=",
                Self::Lt => "<",
                Self::Le => "<=",
                Self::Gt => ">",
                Self::Ge => ">=",
                Self::AndAnd => "&&",
                Self::OrOr => "||",
                Self::Bang => "!",
                Self::Assign => "=",
                Self::Match => "=~",
                Self::Comment | Self::Newline | Self::Ignored => "",
                _ => unreachable!(),
            }),
        }
    }
}

/// Drives the token patterns and applies the two context-sensitive rules the
/// patterns alone cannot express.
///
/// - A `/` is division only when the previously emitted token is a number,
///   an identifier, `)` or `]`. In every other position it begins a
///   regular-expression literal, which this wrapper scans by hand up to the
///   next unescaped `/` on the same line.
/// - A `.` must be followed by an identifier start. Fraction-leading dots
///   (`.5`) have already been consumed as number literals by that point.
///
/// Both rules need exactly one token of history, kept in `prev`.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, Token>,
    prev:  Option<Token>,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer over `source` with line tracking starting at 1.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self { inner: Token::lexer_with_extras(source, LexerExtras { line: 1 }),
               prev:  None, }
    }

    /// Produces the next token and its 1-based line, or `None` at the end of
    /// the stream.
    ///
    /// # Errors
    /// Returns a `ParseError` for unterminated strings or regexes, a dot not
    /// followed by an identifier start, malformed number literals, and any
    /// character no pattern matches.
    pub fn next_token(&mut self) -> Result<Option<(Token, usize)>, ParseError> {
        let Some(result) = self.inner.next() else {
            return Ok(None);
        };
        let line = self.inner.extras.line;

        let token = match result {
            Ok(Token::Slash) if !self.division_position() => {
                let body = self.scan_regex_body(line)?;
                Token::Regex(body)
            },
            Ok(Token::Dot) => {
                match self.inner.remainder().chars().next() {
                    Some(c) if c.is_ascii_alphabetic() || c == '_' => Token::Dot,
                    found => {
                        return Err(ParseError::IllegalObjectAccess { found: render_char(found),
                                                                     line });
                    },
                }
            },
            Ok(token) => token,
            Err(()) => return Err(self.classify_error(line)),
        };

        self.prev = Some(token.clone());
        Ok(Some((token, line)))
    }

    /// Whether the previously emitted token puts a following `/` in division
    /// position.
    fn division_position(&self) -> bool {
        matches!(self.prev,
                 Some(Token::Long(_)
                      | Token::Double(_)
                      | Token::BigNum(_)
                      | Token::Ident(_)
                      | Token::RParen
                      | Token::RBracket))
    }

    /// Scans a regular-expression body from the character after the opening
    /// `/` up to the next unescaped `/`, consuming the scanned bytes from the
    /// underlying lexer.
    ///
    /// The body must close on the same line; a newline or the end of input
    /// before the closing `/` is an unterminated-regex error.
    fn scan_regex_body(&mut self, line: usize) -> Result<String, ParseError> {
        let rest = self.inner.remainder();
        let mut escaped = false;

        for (offset, c) in rest.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '\n' => break,
                '/' => {
                    let body = rest[..offset].to_string();
                    self.inner.bump(offset + 1);
                    return Ok(body);
                },
                _ => {},
            }
        }

        Err(ParseError::UnterminatedRegex { line })
    }

    /// Turns a pattern-level failure into a typed parse error, looking at the
    /// offending slice to tell an unterminated string from a stray character.
    fn classify_error(&self, line: usize) -> ParseError {
        let slice = self.inner.slice();
        match slice.chars().next() {
            Some('"' | '\'') => ParseError::UnterminatedString { line },
            Some(c) if c.is_ascii_digit() => {
                ParseError::InvalidNumber { literal: slice.to_string(),
                                            line }
            },
            found => ParseError::UnexpectedCharacter { found: render_char(found),
                                                       line },
        }
    }
}

/// Renders a character (or the end of input) printably for error messages.
fn render_char(c: Option<char>) -> String {
    c.map_or_else(|| "end of input".to_string(), |c| {
         if c.is_control() {
             format!("{}", c.escape_default())
         } else {
             c.to_string()
         }
     })
}

/// Tokenizes an entire source string into `(token, line)` pairs.
///
/// # Errors
/// Returns the first lexical error encountered; see [`Lexer::next_token`].
///
/// # Examples
/// ```
/// use kestrel::interpreter::lexer::{Token, tokenize};
///
/// let tokens = tokenize("let x = 1").unwrap();
/// assert_eq!(tokens[0], (Token::Let, 1));
/// assert_eq!(tokens[1], (Token::Ident("x".to_string()), 1));
/// ```
pub fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    while let Some(pair) = lexer.next_token()? {
        tokens.push(pair);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn slash_after_value_is_division() {
        assert!(kinds("a / 2").contains(&Token::Slash));
        assert!(kinds("(a) / 2").contains(&Token::Slash));
        assert!(kinds("a[0] / 2").contains(&Token::Slash));
        assert!(kinds("10 / 2").contains(&Token::Slash));
    }

    #[test]
    fn slash_elsewhere_begins_a_regex() {
        assert_eq!(kinds(r"a =~ /\d+/")[2], Token::Regex(r"\d+".to_string()));
        assert_eq!(kinds("/ab/")[0], Token::Regex("ab".to_string()));
        // An escaped slash does not close the body.
        assert_eq!(kinds(r"/a\/b/")[0], Token::Regex(r"a\/b".to_string()));
    }

    #[test]
    fn unterminated_regex_reports_its_line() {
        let err = tokenize("\n/ab").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedRegex { line: 2 }));
    }

    #[test]
    fn dot_requires_an_identifier_start() {
        assert_eq!(kinds("a.b"),
                   vec![Token::Ident("a".to_string()),
                        Token::Dot,
                        Token::Ident("b".to_string())]);
        assert!(tokenize("a.+").is_err());
    }

    #[test]
    fn number_forms() {
        assert_eq!(kinds("0x10")[0], Token::Long(16));
        assert_eq!(kinds(".5")[0], Token::Double(0.5));
        assert_eq!(kinds("2e3")[0], Token::Double(2000.0));
        assert_eq!(kinds("3M")[0], Token::Double(3.0));
        assert_eq!(kinds("42N")[0], Token::BigNum(42.into()));
    }

    #[test]
    fn maximal_munch_on_shifts() {
        assert_eq!(kinds("a >>> b")[1], Token::UShr);
        assert_eq!(kinds("a >> b")[1], Token::Shr);
    }

    #[test]
    fn strings_defer_escapes() {
        assert_eq!(kinds(r#""a\nb""#)[0], Token::Str(r"a\nb".to_string()));
        assert!(matches!(tokenize("\"abc").unwrap_err(),
                         ParseError::UnterminatedString { line: 1 }));
    }

    #[test]
    fn comments_and_lines() {
        let tokens = tokenize("1 ## one\n2").unwrap();
        assert_eq!(tokens, vec![(Token::Long(1), 1), (Token::Long(2), 2)]);
    }
}
