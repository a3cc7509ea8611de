use std::iter::Peekable;

use crate::{
    error::ParseError,
    interpreter::{lexer::Token, parser::expr::ParseResult},
};

/// Consumes the next token, which must equal `expected`.
///
/// # Parameters
/// - `tokens`: Token iterator.
/// - `expected`: The required token.
/// - `line`: Line to report if the stream ends here.
///
/// # Errors
/// Returns a `ParseError` if the next token differs from `expected` or the
/// input ends.
pub(in crate::interpreter::parser) fn expect<'a, I>(tokens: &mut Peekable<I>,
                                                    expected: &Token,
                                                    line: usize)
                                                    -> ParseResult<()>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((token, _)) if token == expected => Ok(()),
        Some((token, line)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected {expected:?}, found {token:?}"),
                                              line:  *line, })
        },
        None => Err(ParseError::UnexpectedEndOfInput { line }),
    }
}

/// Parses a comma-separated list of items up to and including a closing
/// token.
///
/// This utility is shared by call argument lists and parameter lists. It
/// repeatedly calls `parse_item` to parse one element, expecting either:
///
/// - a comma, to continue the list, or
/// - the specified closing token, to end it.
///
/// An immediately encountered closing token produces an empty list. A comma
/// directly followed by the closing token is a trailing-comma error.
///
/// Grammar (simplified): `list := (item ("," item)*)?`
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the first item or closing token.
/// - `parse_item`: Function used to parse each list element.
/// - `closing`: The token that terminates the list (e.g., `)`).
///
/// # Returns
/// A vector of parsed items.
///
/// # Errors
/// Returns a `ParseError` if an item fails to parse, a trailing comma is
/// present, an unexpected token is encountered, or the stream ends before
/// the closing token.
pub(in crate::interpreter) fn parse_comma_separated<'a, I, T>(
    tokens: &mut Peekable<I>,
    parse_item: impl Fn(&mut Peekable<I>) -> ParseResult<T>,
    closing: &Token)
    -> ParseResult<Vec<T>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut items = Vec::new();
    if let Some((token, _)) = tokens.peek()
       && token == closing
    {
        tokens.next();

        return Ok(items);
    }
    loop {
        items.push(parse_item(tokens)?);
        match tokens.next() {
            Some((Token::Comma, line)) => {
                if let Some((token, _)) = tokens.peek()
                   && token == closing
                {
                    return Err(ParseError::TrailingComma { line: *line });
                }
            },
            Some((token, _)) if token == closing => break,
            Some((token, line)) => {
                return Err(ParseError::UnexpectedToken { token: format!("Expected ',' or {closing:?}, found {token:?}"),
                                                         line:  *line, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
        }
    }
    Ok(items)
}

/// Parses a plain identifier and returns its name.
///
/// The next token must be `Token::Ident`.
///
/// # Parameters
/// - `tokens`: Token iterator positioned at an identifier.
///
/// # Returns
/// A `String` containing the identifier.
///
/// # Errors
/// Returns a `ParseError` if the next token is not an identifier or the
/// input ends unexpectedly.
pub(in crate::interpreter) fn parse_identifier<'a, I>(tokens: &mut Peekable<I>)
                                                      -> ParseResult<String>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((Token::Ident(name), _)) => Ok(name.clone()),
        Some((token, line)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected identifier, found {token:?}"),
                                              line:  *line, })
        },
        None => Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    }
}
