use std::iter::Peekable;

use crate::{
    ast::{ElsifArm, Expr, FunctionDef, Statement},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            expr::{ParseResult, parse_expression},
            utils::{expect, parse_comma_separated, parse_identifier},
        },
    },
};

/// Parses a whole script into a statement list.
///
/// Leading, trailing and duplicated semicolons between statements are
/// accepted as separators.
///
/// # Parameters
/// - `tokens`: Token iterator containing `(Token, line)` pairs.
///
/// # Returns
/// The parsed statements, in source order.
pub fn parse_program<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Statement>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut statements = Vec::new();

    skip_semicolons(tokens);
    while tokens.peek().is_some() {
        statements.push(parse_statement(tokens)?);
        skip_semicolons(tokens);
    }

    Ok(statements)
}

/// Parses a single statement.
///
/// Dispatches on the next keyword: `let`, `if`, `while`, `for`, `fn`,
/// `try`, `throw`, `return`, `break`, `continue`, or `{` for a bare block.
/// Any other start yields an expression statement, which records whether it
/// ended in a semicolon.
///
/// # Parameters
/// - `tokens`: Token iterator containing `(Token, line)` pairs.
///
/// # Returns
/// A parsed [`Statement`] node.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let Some((token, line)) = tokens.peek() else {
        return Err(ParseError::UnexpectedEndOfInput { line: 0 });
    };
    let line = *line;

    match token {
        Token::Let => parse_let(tokens, line),
        Token::If => parse_if(tokens, line),
        Token::While => parse_while(tokens, line),
        Token::For => parse_for(tokens, line),
        Token::Fn => parse_fn(tokens, line),
        Token::Try => parse_try(tokens, line),
        Token::Throw => {
            tokens.next();
            let value = parse_expression(tokens)?;
            Ok(Statement::Throw { value, line })
        },
        Token::Return => parse_return(tokens, line),
        Token::Break => {
            tokens.next();
            Ok(Statement::Break { line })
        },
        Token::Continue => {
            tokens.next();
            Ok(Statement::Continue { line })
        },
        Token::LBrace => {
            let statements = parse_block(tokens, line)?;
            Ok(Statement::Block { statements, line })
        },
        _ => {
            let expr = parse_expression(tokens)?;
            let semicolon = matches!(tokens.peek(), Some((Token::Semicolon, _)));
            if semicolon {
                tokens.next();
            }
            Ok(Statement::Expression { expr, semicolon, line })
        },
    }
}

/// Parses a brace-delimited statement list: `{ stmt* }`.
///
/// Semicolons between statements are optional separators; consecutive
/// semicolons are allowed.
fn parse_block<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Vec<Statement>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, &Token::LBrace, line)?;

    let mut statements = Vec::new();
    skip_semicolons(tokens);
    loop {
        match tokens.peek() {
            Some((Token::RBrace, _)) => {
                tokens.next();
                break;
            },
            Some(_) => {
                statements.push(parse_statement(tokens)?);
                skip_semicolons(tokens);
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        }
    }

    Ok(statements)
}

/// Parses a variable declaration: `let IDENT = expr ;?`.
fn parse_let<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    tokens.next();

    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::Assign, line)?;
    let value = parse_expression(tokens)?;

    Ok(Statement::Let { name, value, line })
}

/// Parses an `if` statement with optional `elsif` chain and `else` branch.
///
/// Syntax:
/// ```text
///     if cond { ... }
///     elsif cond { ... }
///     else { ... }
/// ```
/// Parentheses around conditions are optional; a parenthesized condition is
/// simply a parenthesized expression.
fn parse_if<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    tokens.next();

    let condition = parse_expression(tokens)?;
    let then = parse_block(tokens, line)?;

    let mut elsifs = Vec::new();
    while let Some((Token::Elsif, elsif_line)) = tokens.peek() {
        let elsif_line = *elsif_line;
        tokens.next();

        let condition = parse_expression(tokens)?;
        let body = parse_block(tokens, elsif_line)?;
        elsifs.push(ElsifArm { condition,
                               body,
                               line: elsif_line });
    }

    let otherwise = match tokens.peek() {
        Some((Token::Else, else_line)) => {
            let else_line = *else_line;
            tokens.next();
            Some(parse_block(tokens, else_line)?)
        },
        _ => None,
    };

    Ok(Statement::If { condition,
                       then,
                       elsifs,
                       otherwise,
                       line })
}

/// Parses a `while` loop: `while cond { ... }`.
fn parse_while<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    tokens.next();

    let condition = parse_expression(tokens)?;
    let body = parse_block(tokens, line)?;

    Ok(Statement::While { condition, body, line })
}

/// Parses a `for` loop: `for (IDENT ,)? IDENT in expr { ... }`.
///
/// The two-name form binds the first name to an index or key and the second
/// to the item.
fn parse_for<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    tokens.next();

    let first = parse_identifier(tokens)?;
    let (index, item) = if matches!(tokens.peek(), Some((Token::Comma, _))) {
        tokens.next();
        (Some(first), parse_identifier(tokens)?)
    } else {
        (None, first)
    };

    expect(tokens, &Token::In, line)?;
    let iterable = parse_expression(tokens)?;
    let body = parse_block(tokens, line)?;

    Ok(Statement::For { index,
                        item,
                        iterable,
                        body,
                        line })
}

/// Parses a function definition: `fn IDENT ( IDENT , ... ) { ... }`.
fn parse_fn<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    tokens.next();

    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::LParen, line)?;
    let params = parse_comma_separated(tokens, parse_identifier, &Token::RParen)?;
    let body = parse_block(tokens, line)?;

    Ok(Statement::Function(FunctionDef { name,
                                         params,
                                         body,
                                         line }))
}

/// Parses a `try` statement:
/// `try { ... } ( catch ( IDENT ) { ... } )? ( finally { ... } )?`.
fn parse_try<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    tokens.next();

    let body = parse_block(tokens, line)?;

    let catch = match tokens.peek() {
        Some((Token::Catch, catch_line)) => {
            let catch_line = *catch_line;
            tokens.next();

            expect(tokens, &Token::LParen, catch_line)?;
            let name = parse_identifier(tokens)?;
            expect(tokens, &Token::RParen, catch_line)?;

            Some((name, parse_block(tokens, catch_line)?))
        },
        _ => None,
    };

    let finally = match tokens.peek() {
        Some((Token::Finally, finally_line)) => {
            let finally_line = *finally_line;
            tokens.next();
            Some(parse_block(tokens, finally_line)?)
        },
        _ => None,
    };

    Ok(Statement::Try { body,
                        catch,
                        finally,
                        line })
}

/// Parses a `return` statement. The expression is omitted if the next token
/// is `}`, `;`, or the end of the stream.
fn parse_return<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    tokens.next();

    let value = match tokens.peek() {
        Some((Token::RBrace | Token::Semicolon, _)) | None => None,
        Some(_) => Some(parse_expression(tokens)?),
    };

    Ok(Statement::Return { value, line })
}

/// Consumes any run of semicolons.
fn skip_semicolons<'a, I>(tokens: &mut Peekable<I>)
    where I: Iterator<Item = &'a (Token, usize)>
{
    while let Some((Token::Semicolon, _)) = tokens.peek() {
        tokens.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::lexer::tokenize;

    fn parse(source: &str) -> Vec<Statement> {
        let tokens = tokenize(source).unwrap();
        let mut iter = tokens.iter().peekable();
        parse_program(&mut iter).unwrap()
    }

    #[test]
    fn semicolons_are_recorded_on_expression_statements() {
        let statements = parse("1 + 2; 3");
        assert!(matches!(statements[0], Statement::Expression { semicolon: true, .. }));
        assert!(matches!(statements[1], Statement::Expression { semicolon: false, .. }));
    }

    #[test]
    fn duplicate_semicolons_are_separators() {
        assert_eq!(parse(";; let a = 1 ;;; a ;;").len(), 2);
    }

    #[test]
    fn condition_parens_are_optional() {
        let with = parse("if (a > 5) { 1 }");
        let without = parse("if a > 5 { 1 }");
        assert_eq!(with, without);
    }

    #[test]
    fn elsif_chain() {
        let statements = parse("if a { 1 } elsif b { 2 } elsif c { 3 } else { 4 }");
        let Statement::If { elsifs, otherwise, .. } = &statements[0] else {
            panic!("expected if");
        };
        assert_eq!(elsifs.len(), 2);
        assert!(otherwise.is_some());
    }

    #[test]
    fn for_forms() {
        let single = parse("for x in xs { x }");
        assert!(matches!(&single[0], Statement::For { index: None, item, .. } if item == "x"));

        let double = parse("for i, x in xs { x }");
        assert!(matches!(&double[0],
                         Statement::For { index: Some(i), item, .. } if i == "i" && item == "x"));
    }

    #[test]
    fn return_value_is_optional() {
        let statements = parse("fn f() { return } fn g() { return 1; }");
        let Statement::Function(f) = &statements[0] else {
            panic!("expected fn");
        };
        assert!(matches!(f.body[0], Statement::Return { value: None, .. }));

        let Statement::Function(g) = &statements[1] else {
            panic!("expected fn");
        };
        assert!(matches!(g.body[0], Statement::Return { value: Some(_), .. }));
    }

    #[test]
    fn try_catch_finally() {
        let statements = parse("try { 1 } catch (e) { 2 } finally { 3 }");
        let Statement::Try { catch, finally, .. } = &statements[0] else {
            panic!("expected try");
        };
        assert_eq!(catch.as_ref().unwrap().0, "e");
        assert!(finally.is_some());
    }

    #[test]
    fn bare_block_is_a_statement() {
        assert!(matches!(parse("{ 1; 2 }")[0], Statement::Block { .. }));
    }

    #[test]
    fn missing_token_is_a_typed_error() {
        let tokens = tokenize("let a 1").unwrap();
        let mut iter = tokens.iter().peekable();
        assert!(matches!(parse_program(&mut iter),
                         Err(ParseError::UnexpectedToken { .. })));
    }
}
