use std::collections::{HashMap, HashSet};

use crate::{
    ast::Expr,
    error::{EngineError, RuntimeError},
    interpreter::{lexer::Token, value::core::Value},
    pending::{PendingRuntime, free_vars::free_identifiers},
};

/// Raised when `execute` is called on a node whose result is not yet
/// determined; callers are expected to consult `can_execute` first.
fn not_determined() -> EngineError {
    EngineError::Runtime(RuntimeError::InvalidArgument { details:
                                                             "pending expression is not executable yet"
                                                                 .to_string(),
                                                         line:    0, })
}

/// A leaf of the combinator tree: an arbitrary boolean subtree, evaluated
/// by the host runtime once every free identifier has a value.
#[derive(Debug)]
pub struct ValueExec {
    text:     String,
    free:     HashSet<String>,
    provided: HashMap<String, Value>,
    cache:    Option<bool>,
}

impl ValueExec {
    fn new(expr: &Expr, runtime: &dyn PendingRuntime) -> Self {
        Self { text:     expr.to_string(),
               free:     free_identifiers(expr, runtime.builtin_identifiers()),
               provided: HashMap::new(),
               cache:    None, }
    }

    fn provide(&mut self, name: &str, value: &Value) {
        if self.free.contains(name) {
            self.provided.insert(name.to_string(), value.clone());
        }
    }

    fn can_execute(&self) -> bool {
        self.free.iter().all(|name| self.provided.contains_key(name))
    }

    fn execute(&mut self, runtime: &mut dyn PendingRuntime) -> Result<bool, EngineError> {
        if let Some(result) = self.cache {
            return Ok(result);
        }
        if !self.can_execute() {
            return Err(not_determined());
        }

        let value = runtime.run(&self.text, &self.provided)?;
        let Value::Bool(result) = value else {
            return Err(EngineError::Runtime(RuntimeError::TypeError { details: format!("pending expression '{}' must produce a boolean, got {}",
                                                                                       self.text,
                                                                                       value.type_name()),
                                                                      line:    0, }));
        };

        self.cache = Some(result);
        Ok(result)
    }
}

/// A lazily evaluated boolean expression over incrementally provided
/// variables.
///
/// The factory turns `&&`, `||`, `!` and `?:` nodes into structural
/// combinators and every other subtree into a [`ValueExec`] leaf. Values
/// arrive through [`PendingExec::provide`]; [`PendingExec::can_execute`]
/// reports whether the result is determined yet, short-circuiting where
/// one side alone decides the outcome; [`PendingExec::execute`] computes
/// and memoizes the result.
///
/// Once `can_execute` turns true, further `provide` calls leave the result
/// unchanged, and repeated `execute` calls return the cached value without
/// re-entering the host runtime.
#[derive(Debug)]
pub enum PendingExec {
    /// A host-evaluated leaf.
    Value(ValueExec),
    /// Short-circuiting conjunction.
    And {
        left:  Box<PendingExec>,
        right: Box<PendingExec>,
        cache: Option<bool>,
    },
    /// Short-circuiting disjunction.
    Or {
        left:  Box<PendingExec>,
        right: Box<PendingExec>,
        cache: Option<bool>,
    },
    /// Negation; mirrors its child.
    Not {
        child: Box<PendingExec>,
        cache: Option<bool>,
    },
    /// Conditional; defers to one branch once the condition is known.
    Cond {
        condition: Box<PendingExec>,
        then:      Box<PendingExec>,
        other:     Box<PendingExec>,
        cache:     Option<bool>,
    },
}

impl PendingExec {
    /// Builds the combinator tree for an expression.
    ///
    /// # Parameters
    /// - `expr`: The boolean expression, restricted in practice to logical
    ///   and ternary combinators over arbitrary leaves.
    /// - `runtime`: Supplies the bound-name set for free-variable
    ///   discovery.
    #[must_use]
    pub fn compile(expr: &Expr, runtime: &dyn PendingRuntime) -> Self {
        match expr {
            Expr::Node { op: Token::AndAnd,
                         operands,
                         .. } if operands.len() == 2 => {
                Self::And { left:  Box::new(Self::compile(&operands[0], runtime)),
                            right: Box::new(Self::compile(&operands[1], runtime)),
                            cache: None, }
            },
            Expr::Node { op: Token::OrOr,
                         operands,
                         .. } if operands.len() == 2 => {
                Self::Or { left:  Box::new(Self::compile(&operands[0], runtime)),
                           right: Box::new(Self::compile(&operands[1], runtime)),
                           cache: None, }
            },
            Expr::Node { op: Token::Bang,
                         operands,
                         .. } if operands.len() == 1 => {
                Self::Not { child: Box::new(Self::compile(&operands[0], runtime)),
                            cache: None, }
            },
            Expr::Node { op: Token::Question,
                         operands,
                         .. } if operands.len() == 3 => {
                Self::Cond { condition: Box::new(Self::compile(&operands[0], runtime)),
                             then:      Box::new(Self::compile(&operands[1], runtime)),
                             other:     Box::new(Self::compile(&operands[2], runtime)),
                             cache:     None, }
            },
            other => Self::Value(ValueExec::new(other, runtime)),
        }
    }

    /// Stores a variable's value in every leaf that lists it as free.
    /// Structural combinators always forward to their children.
    pub fn provide(&mut self, name: &str, value: &Value) {
        match self {
            Self::Value(leaf) => leaf.provide(name, value),
            Self::And { left, right, .. } | Self::Or { left, right, .. } => {
                left.provide(name, value);
                right.provide(name, value);
            },
            Self::Not { child, .. } => child.provide(name, value),
            Self::Cond { condition, then, other, .. } => {
                condition.provide(name, value);
                then.provide(name, value);
                other.provide(name, value);
            },
        }
    }

    /// Whether the node's result is determined by the values provided so
    /// far.
    ///
    /// For a leaf this means every free identifier has a value. A
    /// conjunction is determined when both sides are, or when one
    /// executable side is false; a disjunction mirrors that with true; a
    /// conditional needs its condition, then defers to the chosen branch.
    /// The probes may trigger and cache partial evaluations.
    ///
    /// # Errors
    /// Failures from the host runtime while probing executable children.
    pub fn can_execute(&mut self, runtime: &mut dyn PendingRuntime) -> Result<bool, EngineError> {
        match self {
            Self::Value(leaf) => Ok(leaf.can_execute()),

            Self::And { left, right, .. } => {
                if left.can_execute(runtime)? && right.can_execute(runtime)? {
                    return Ok(true);
                }
                if left.can_execute(runtime)? && !left.execute(runtime)? {
                    return Ok(true);
                }
                if right.can_execute(runtime)? && !right.execute(runtime)? {
                    return Ok(true);
                }
                Ok(false)
            },

            Self::Or { left, right, .. } => {
                if left.can_execute(runtime)? && right.can_execute(runtime)? {
                    return Ok(true);
                }
                if left.can_execute(runtime)? && left.execute(runtime)? {
                    return Ok(true);
                }
                if right.can_execute(runtime)? && right.execute(runtime)? {
                    return Ok(true);
                }
                Ok(false)
            },

            Self::Not { child, .. } => child.can_execute(runtime),

            Self::Cond { condition, then, other, .. } => {
                if !condition.can_execute(runtime)? {
                    return Ok(false);
                }
                if condition.execute(runtime)? {
                    then.can_execute(runtime)
                } else {
                    other.can_execute(runtime)
                }
            },
        }
    }

    /// Computes the node's boolean result. Memoized: the first successful
    /// execution is cached and returned on every later call.
    ///
    /// # Errors
    /// `not determined` when called before `can_execute` turns true, plus
    /// failures from the host runtime.
    pub fn execute(&mut self, runtime: &mut dyn PendingRuntime) -> Result<bool, EngineError> {
        match self {
            Self::Value(leaf) => leaf.execute(runtime),

            Self::And { left, right, cache } => {
                if let Some(result) = *cache {
                    return Ok(result);
                }

                let result = if left.can_execute(runtime)? && right.can_execute(runtime)? {
                    left.execute(runtime)? && right.execute(runtime)?
                } else if left.can_execute(runtime)? && !left.execute(runtime)? {
                    false
                } else if right.can_execute(runtime)? && !right.execute(runtime)? {
                    false
                } else {
                    return Err(not_determined());
                };

                *cache = Some(result);
                Ok(result)
            },

            Self::Or { left, right, cache } => {
                if let Some(result) = *cache {
                    return Ok(result);
                }

                let result = if left.can_execute(runtime)? && right.can_execute(runtime)? {
                    left.execute(runtime)? || right.execute(runtime)?
                } else if left.can_execute(runtime)? && left.execute(runtime)? {
                    true
                } else if right.can_execute(runtime)? && right.execute(runtime)? {
                    true
                } else {
                    return Err(not_determined());
                };

                *cache = Some(result);
                Ok(result)
            },

            Self::Not { child, cache } => {
                if let Some(result) = *cache {
                    return Ok(result);
                }

                let result = !child.execute(runtime)?;
                *cache = Some(result);
                Ok(result)
            },

            Self::Cond { condition,
                         then,
                         other,
                         cache, } => {
                if let Some(result) = *cache {
                    return Ok(result);
                }

                let result = if condition.execute(runtime)? {
                    then.execute(runtime)?
                } else {
                    other.execute(runtime)?
                };

                *cache = Some(result);
                Ok(result)
            },
        }
    }

    /// Convenience: compiles a source string through the expression parser.
    ///
    /// # Errors
    /// Lexical or syntactic errors in `source`.
    pub fn compile_str(source: &str, runtime: &dyn PendingRuntime) -> Result<Self, EngineError> {
        let tokens = crate::interpreter::lexer::tokenize(source)?;
        let mut iter = tokens.iter().peekable();
        let expr = crate::interpreter::parser::expr::parse_expression(&mut iter)?;
        Ok(Self::compile(&expr, runtime))
    }
}
