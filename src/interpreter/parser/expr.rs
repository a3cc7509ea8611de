use std::iter::Peekable;

use crate::{
    ast::Expr,
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::utils::{expect, parse_comma_separated, parse_identifier},
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// The binding power prefix operators (`-`, `!`, `~`) apply to their
/// operand.
const PREFIX_BINDING_POWER: u8 = 19;
/// The left binding power of the postfix forms `(` and `[`.
const POSTFIX_BINDING_POWER: u8 = 19;

/// The binding powers of `?`, which is handled outside the generic infix
/// loop because its middle operand re-enters the parser at zero.
const TERNARY_BINDING_POWER: (u8, u8) = (2, 1);

/// Maps an infix operator token to its `(left, right)` binding powers.
///
/// Higher binds tighter. Left-associative operators have `left == right - 1`
/// and right-associative operators (assignment, `**`) have `left == right +
/// 1` or a right power of zero, meaning the right operand is parsed without
/// an upper bound.
#[must_use]
pub const fn infix_binding_power(token: &Token) -> Option<(u8, u8)> {
    Some(match token {
        Token::Assign => (6, 0),
        Token::Question => TERNARY_BINDING_POWER,
        Token::OrOr => (3, 4),
        Token::AndAnd => (5, 6),
        Token::Pipe => (6, 7),
        Token::Caret | Token::Match => (7, 8),
        Token::Amp => (8, 9),
        Token::EqEq | Token::NotEq => (9, 10),
        Token::Lt | Token::Le | Token::Gt | Token::Ge => (11, 12),
        Token::Shl | Token::Shr | Token::UShr => (12, 13),
        Token::Plus | Token::Minus => (13, 14),
        Token::Percent => (15, 16),
        Token::Star | Token::Slash => (17, 18),
        Token::StarStar => (18, 17),
        Token::Dot => (19, 20),
        _ => return None,
    })
}

/// Parses a full expression.
///
/// This is the entry point for expression parsing; it runs the Pratt loop
/// with an upper binding power of zero, so nothing is excluded.
///
/// # Parameters
/// - `tokens`: Token iterator providing `(Token, line)` pairs.
///
/// # Returns
/// The parsed expression node.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_expr_bp(tokens, 0)
}

/// The Pratt core: parses a primary, then repeatedly folds infix and
/// postfix forms whose left binding power is at least `min_bp` into the
/// left-hand side.
///
/// - A postfix `(` converts the left-hand side into a call; a postfix `[`
///   into a subscript node whose operator is the bracket token.
/// - `?` parses its consequent with an upper bound of zero (up to the
///   matching `:`), then the alternate with its right binding power, which
///   makes nested ternaries chain to the right.
/// - Every other infix operator recurses with its right binding power.
///
/// # Parameters
/// - `tokens`: Token iterator providing `(Token, line)` pairs.
/// - `min_bp`: The upper binding power; operators binding looser than this
///   are left for an enclosing call to consume.
///
/// # Returns
/// The parsed expression node.
pub fn parse_expr_bp<'a, I>(tokens: &mut Peekable<I>, min_bp: u8) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut left = parse_primary(tokens)?;

    loop {
        let Some((token, line)) = tokens.peek() else {
            break;
        };
        let line = *line;

        match token {
            Token::LParen if POSTFIX_BINDING_POWER >= min_bp => {
                tokens.next();
                let args = parse_comma_separated(tokens, parse_expression, &Token::RParen)?;
                left = Expr::Call { callee: Box::new(left),
                                    args,
                                    line };
            },
            Token::LBracket if POSTFIX_BINDING_POWER >= min_bp => {
                tokens.next();
                let index = parse_expression(tokens)?;
                expect(tokens, &Token::RBracket, line)?;
                left = Expr::Node { op:       Token::LBracket,
                                    operands: vec![left, index],
                                    line };
            },
            Token::Question => {
                if TERNARY_BINDING_POWER.0 < min_bp {
                    break;
                }
                tokens.next();
                let then = parse_expression(tokens)?;
                expect(tokens, &Token::Colon, line)?;
                let other = parse_expr_bp(tokens, TERNARY_BINDING_POWER.1)?;
                left = Expr::Node { op:       Token::Question,
                                    operands: vec![left, then, other],
                                    line };
            },
            _ => {
                let Some((lbp, rbp)) = infix_binding_power(token) else {
                    break;
                };
                if lbp < min_bp {
                    break;
                }

                let op = token.clone();
                tokens.next();

                let right = parse_expr_bp(tokens, rbp)?;
                left = Expr::Node { op,
                                    operands: vec![left, right],
                                    line };
            },
        }
    }

    Ok(left)
}

/// Parses a primary: a parenthesized sub-expression, a leaf token, a prefix
/// operator application, or a `lambda` form.
fn parse_primary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.next() {
        Some((Token::LParen, line)) => {
            let line = *line;
            let expr = parse_expression(tokens)?;
            expect(tokens, &Token::RParen, line)?;
            Ok(expr)
        },

        Some((token @ (Token::Long(_)
              | Token::Double(_)
              | Token::BigNum(_)
              | Token::Str(_)
              | Token::Regex(_)
              | Token::Ident(_)
              | Token::True
              | Token::False
              | Token::Nil),
              line)) => {
            Ok(Expr::Leaf { token: token.clone(),
                            line:  *line, })
        },

        Some((op @ (Token::Minus | Token::Bang | Token::Tilde), line)) => {
            let line = *line;
            let operand = parse_expr_bp(tokens, PREFIX_BINDING_POWER)?;
            Ok(Expr::Node { op: op.clone(),
                            operands: vec![operand],
                            line })
        },

        Some((Token::Lambda, line)) => parse_lambda(tokens, *line),

        Some((token, line)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected expression, found {token:?}"),
                                              line:  *line, })
        },

        None => Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    }
}

/// Parses a `lambda` form after the keyword has been consumed:
///
/// ```text
/// lambda (p1, p2, ...) -> body end
/// ```
///
/// The parameter list may be empty; a trailing comma is rejected. The body
/// is a single expression.
fn parse_lambda<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, &Token::LParen, line)?;
    let params = parse_comma_separated(tokens, parse_identifier, &Token::RParen)?;
    expect(tokens, &Token::Arrow, line)?;

    let body = parse_expression(tokens)?;
    expect(tokens, &Token::End, line)?;

    Ok(Expr::Lambda { params,
                      body: Box::new(body),
                      line })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::lexer::tokenize;

    fn parse(source: &str) -> Expr {
        let tokens = tokenize(source).unwrap();
        let mut iter = tokens.iter().peekable();
        parse_expression(&mut iter).unwrap()
    }

    #[test]
    fn precedence_shapes() {
        assert_eq!(parse("1 + 2 * 3").to_string(), "(1 + (2 * 3))");
        assert_eq!(parse("1 * 2 + 3").to_string(), "((1 * 2) + 3)");
        assert_eq!(parse("1 + 2 - 3").to_string(), "((1 + 2) - 3)");
        assert_eq!(parse("a || b && c").to_string(), "(a || (b && c))");
        assert_eq!(parse("1 < 2 == true").to_string(), "((1 < 2) == true)");
        assert_eq!(parse("1 << 2 + 3").to_string(), "((1 << 2) + 3)");
    }

    #[test]
    fn exponent_groups_right() {
        assert_eq!(parse("2 ** 3 ** 2").to_string(), "(2 ** (3 ** 2))");
    }

    #[test]
    fn ternaries_chain_right() {
        assert_eq!(parse("a ? b : c ? d : e").to_string(), "(a ? b : (c ? d : e))");
        assert_eq!(parse("a ? b ? c : d : e").to_string(), "(a ? (b ? c : d) : e)");
    }

    #[test]
    fn assignment_binds_loosely_and_to_the_right() {
        assert_eq!(parse("a = b = 1 + 2").to_string(), "(a = (b = (1 + 2)))");
    }

    #[test]
    fn postfix_chains() {
        assert_eq!(parse("a.b.c").to_string(), "a.b.c");
        assert_eq!(parse("a[0][1]").to_string(), "a[0][1]");
        assert_eq!(parse("f(1)(2)").to_string(), "f(1)(2)");
        assert_eq!(parse("a.b(1)[2]").to_string(), "a.b(1)[2]");
    }

    #[test]
    fn prefix_binds_tighter_than_infix() {
        assert_eq!(parse("-a + b").to_string(), "((-a) + b)");
        assert_eq!(parse("!a && b").to_string(), "((!a) && b)");
    }

    #[test]
    fn lambda_form() {
        assert_eq!(parse("lambda(x, y) -> x + y end").to_string(),
                   "lambda(x, y) -> (x + y) end");
        assert_eq!(parse("lambda() -> 1 end").to_string(), "lambda() -> 1 end");
    }

    #[test]
    fn trailing_comma_is_rejected() {
        let tokens = tokenize("f(1, 2,)").unwrap();
        let mut iter = tokens.iter().peekable();
        assert!(matches!(parse_expression(&mut iter),
                         Err(ParseError::TrailingComma { .. })));
    }

    #[test]
    fn printer_round_trips() {
        for source in ["1 + 2 * 3",
                       "a ? b : c ? d : e",
                       "-x ** 2",
                       "a.b.c(1, f(2))[3]",
                       "s =~ /a+b/",
                       "lambda(n) -> n * 2 end",
                       "\"hi #{name}\" + 'x'",
                       "~(a | b) ^ c >>> 2"]
        {
            let once = parse(source);
            let again = parse(&once.to_string());
            assert_eq!(once, again, "{source}");
        }
    }
}
