use std::fmt;

use crate::interpreter::lexer::Token;

/// An abstract syntax tree (AST) node representing an expression in the
/// language.
///
/// `Expr` is deliberately small: every operator application, regardless of
/// arity, is a [`Expr::Node`] whose operator is the token that introduced it.
/// A subscript `a[b]` is a two-operand node whose operator is `[`, and a
/// ternary `a ? b : c` is a three-operand node whose operator is `?`. This
/// keeps the interpreter, the analyzer and the pending-execution factory to a
/// single exhaustive match each.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A terminal: a literal token or an identifier reference.
    Leaf {
        /// The literal or identifier token.
        token: Token,
        /// Line number in the source code.
        line:  usize,
    },
    /// A unary, binary or ternary operator application.
    Node {
        /// The operator token (`[` for subscripts, `?` for ternaries).
        op:       Token,
        /// The operand expressions, in source order. Holds one operand for
        /// prefix operators, two for binary operators, three for `?:`.
        operands: Vec<Expr>,
        /// Line number in the source code.
        line:     usize,
    },
    /// A function application. The callee is itself an expression.
    Call {
        /// The expression in call position.
        callee: Box<Expr>,
        /// The argument expressions, in source order.
        args:   Vec<Expr>,
        /// Line number in the source code.
        line:   usize,
    },
    /// An anonymous function: `lambda (a, b) -> a + b end`.
    Lambda {
        /// Ordered parameter names.
        params: Vec<String>,
        /// The single expression body.
        body:   Box<Expr>,
        /// Line number in the source code.
        line:   usize,
    },
}

impl Expr {
    /// Gets the line number from `self`.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::Leaf { line, .. }
            | Self::Node { line, .. }
            | Self::Call { line, .. }
            | Self::Lambda { line, .. } => *line,
        }
    }

    /// Returns the identifier name if this expression is a plain identifier
    /// leaf.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Leaf { token: Token::Ident(name),
                         .. } => Some(name),
            _ => None,
        }
    }

    /// Folds a chain of `.` nodes whose leaves are all identifiers into a
    /// single dotted name, e.g. `string.endsWith` into `"string.endsWith"`.
    ///
    /// Returns `None` as soon as any link of the chain is not an identifier
    /// leaf. This is the basis of the flattened-name lookup used for callees
    /// and of dotted-path handling in the analyzer and the free-variable
    /// finder.
    #[must_use]
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Self::Leaf { token: Token::Ident(name),
                         .. } => Some(name.clone()),
            Self::Node { op: Token::Dot,
                         operands,
                         .. } if operands.len() == 2 => {
                let head = operands[0].dotted_name()?;
                let tail = operands[1].as_identifier()?;
                Some(format!("{head}.{tail}"))
            },
            _ => None,
        }
    }

    /// Whether this expression needs no parentheses when it appears to the
    /// left of a postfix `(`, `[` or `.`.
    fn is_postfix_safe(&self) -> bool {
        match self {
            Self::Leaf { .. } | Self::Call { .. } => true,
            Self::Node { op, .. } => matches!(op, Token::Dot | Token::LBracket),
            Self::Lambda { .. } => false,
        }
    }
}

/// Prints the expression so that re-parsing the output yields an equal tree.
///
/// Operator applications are parenthesized, so precedence never changes the
/// shape on the way back in; subscripts, calls and property accesses print
/// in their surface form because grouping parentheses do not create nodes.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf { token, .. } => write!(f, "{token}"),
            Self::Node { op, operands, .. } => match (op, operands.as_slice()) {
                (Token::LBracket, [target, index]) => {
                    if target.is_postfix_safe() {
                        write!(f, "{target}[{index}]")
                    } else {
                        write!(f, "({target})[{index}]")
                    }
                },
                (Token::Dot, [target, field]) => {
                    if target.is_postfix_safe() {
                        write!(f, "{target}.{field}")
                    } else {
                        write!(f, "({target}).{field}")
                    }
                },
                (Token::Question, [cond, then, other]) => {
                    write!(f, "({cond} ? {then} : {other})")
                },
                (_, [operand]) => write!(f, "({op}{operand})"),
                (_, [left, right]) => write!(f, "({left} {op} {right})"),
                _ => Err(fmt::Error),
            },
            Self::Call { callee, args, .. } => {
                if callee.is_postfix_safe() {
                    write!(f, "{callee}(")?;
                } else {
                    write!(f, "({callee})(")?;
                }
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            },
            Self::Lambda { params, body, .. } => {
                write!(f, "lambda(")?;
                for (index, param) in params.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {body} end")
            },
        }
    }
}

/// Represents a named function definition.
///
/// A function binds an ordered parameter list to a statement-list body and is
/// itself a closure over the frame it was defined in.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// The name of the function.
    pub name:   String,
    /// The parameter names.
    pub params: Vec<String>,
    /// The statements executed when the function is called.
    pub body:   Vec<Statement>,
    /// Line number in the source code.
    pub line:   usize,
}

/// One `elsif` arm of an `if` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ElsifArm {
    /// The arm's condition.
    pub condition: Expr,
    /// The statements executed when the condition holds.
    pub body:      Vec<Statement>,
    /// Line number in the source code.
    pub line:      usize,
}

/// Represents a statement.
///
/// Statements are the units of a script. Blocks are plain statement lists;
/// the enclosing construct decides how a contained list's value propagates.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A standalone expression evaluated for its result.
    Expression {
        /// The expression to evaluate.
        expr:      Expr,
        /// Whether the statement ended in a semicolon. A trailing semicolon
        /// suppresses the statement's contribution to the script value.
        semicolon: bool,
        /// Line number in the source code.
        line:      usize,
    },
    /// A variable declaration using `let`.
    Let {
        /// The name of the variable.
        name:  String,
        /// The initial value of the variable.
        value: Expr,
        /// Line number in the source code.
        line:  usize,
    },
    /// An `if` statement with optional `elsif` chain and `else` branch.
    If {
        /// The primary condition.
        condition: Expr,
        /// Statements executed when the condition is true.
        then:      Vec<Statement>,
        /// The `elsif` arms, in source order.
        elsifs:    Vec<ElsifArm>,
        /// Statements executed when no condition matched.
        otherwise: Option<Vec<Statement>>,
        /// Line number in the source code.
        line:      usize,
    },
    /// A `while` loop.
    While {
        /// The loop condition, tested before each iteration.
        condition: Expr,
        /// The loop body.
        body:      Vec<Statement>,
        /// Line number in the source code.
        line:      usize,
    },
    /// A `for` loop over a list or map.
    For {
        /// The optional first name of the two-name form, bound to the index
        /// or key.
        index:    Option<String>,
        /// The name bound to each element or value.
        item:     String,
        /// The expression producing the iterated value.
        iterable: Expr,
        /// The loop body.
        body:     Vec<Statement>,
        /// Line number in the source code.
        line:     usize,
    },
    /// A named function definition.
    Function(FunctionDef),
    /// A `return` statement with optional value.
    Return {
        /// The returned expression, if any.
        value: Option<Expr>,
        /// Line number in the source code.
        line:  usize,
    },
    /// A `break` statement.
    Break {
        /// Line number in the source code.
        line: usize,
    },
    /// A `continue` statement.
    Continue {
        /// Line number in the source code.
        line: usize,
    },
    /// A bare `{ ... }` block introducing a new scope.
    Block {
        /// The statements inside the block.
        statements: Vec<Statement>,
        /// Line number in the source code.
        line:       usize,
    },
    /// A `try` statement with optional `catch` and `finally`.
    Try {
        /// The guarded statements.
        body:    Vec<Statement>,
        /// The catch variable and handler, if present.
        catch:   Option<(String, Vec<Statement>)>,
        /// The statements run on every exit path, if present.
        finally: Option<Vec<Statement>>,
        /// Line number in the source code.
        line:    usize,
    },
    /// A `throw` statement.
    Throw {
        /// The thrown expression.
        value: Expr,
        /// Line number in the source code.
        line:  usize,
    },
}

impl Statement {
    /// Gets the line number from `self`.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::Expression { line, .. }
            | Self::Let { line, .. }
            | Self::If { line, .. }
            | Self::While { line, .. }
            | Self::For { line, .. }
            | Self::Return { line, .. }
            | Self::Break { line }
            | Self::Continue { line }
            | Self::Block { line, .. }
            | Self::Try { line, .. }
            | Self::Throw { line, .. } => *line,
            Self::Function(def) => def.line,
        }
    }
}
