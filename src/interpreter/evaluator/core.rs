use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{Expr, Statement},
    error::RuntimeError,
    interpreter::{
        builtins,
        evaluator::binary,
        lexer::Token,
        value::{
            core::{PatternValue, Value},
            env::{Closure, ClosureBody, Frame},
            key::ValueKey,
        },
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// The control-flow signal produced by statement execution.
///
/// A signal is distinct from every ordinary value; it unwinds block
/// execution until it reaches the matching construct. `break` and
/// `continue` are consumed by the nearest enclosing loop, `return` by the
/// nearest function boundary.
#[derive(Debug)]
pub enum Control {
    /// Ordinary completion carrying the statement's value.
    Value(Value),
    /// A `break` unwinding towards the nearest loop.
    Break {
        /// The line of the `break`, for reporting a stray signal.
        line: usize,
    },
    /// A `continue` unwinding towards the nearest loop.
    Continue {
        /// The line of the `continue`, for reporting a stray signal.
        line: usize,
    },
    /// A `return` unwinding towards the nearest function boundary, carrying
    /// the returned value.
    Return(Value),
}

/// Stores the runtime evaluation context.
///
/// This struct holds the interpreter state: the current frame of the
/// environment chain and the global frame at its root. The global frame is
/// pre-populated with the built-in catalog; dotted builtin names are plain
/// keys in it.
///
/// ## Usage
///
/// A `Context` is created once per script run (or kept alive across runs,
/// as the REPL does) and drives both statement execution and expression
/// evaluation.
pub struct Context {
    /// The currently innermost frame.
    pub(crate) current: Rc<Frame>,
    globals: Rc<Frame>,
}

#[allow(clippy::new_without_default)]
impl Context {
    /// Creates a new evaluation context whose global frame holds the
    /// built-in catalog.
    #[must_use]
    pub fn new() -> Self {
        let globals = Frame::global();
        builtins::install(&globals);

        Self { current: Rc::clone(&globals),
               globals }
    }

    /// Defines a binding in the global frame. Used to merge a caller's
    /// context map before running a script.
    pub fn define_global(&self, name: &str, value: Value) {
        self.globals.define(name, value);
    }

    /// The names bound in the global frame, excluding builtins. Used by the
    /// REPL's `.vars` command.
    #[must_use]
    pub fn global_names(&self) -> Vec<String> {
        self.globals
            .local_names()
            .into_iter()
            .filter(|name| !builtins::is_builtin(name))
            .collect()
    }

    /// Runs a whole script and produces the script value: the value of the
    /// last executed statement, or nil.
    ///
    /// A top-level `return` ends the script with its value; a stray `break`
    /// or `continue` is an error.
    ///
    /// # Errors
    /// Any `RuntimeError` raised by a statement, including uncaught
    /// user-thrown values.
    pub fn run_script(&mut self, statements: &[Statement]) -> EvalResult<Value> {
        match self.execute_statements(statements)? {
            Control::Value(value) | Control::Return(value) => Ok(value),
            Control::Break { line } => Err(RuntimeError::BreakOutsideLoop { line }),
            Control::Continue { line } => Err(RuntimeError::ContinueOutsideLoop { line }),
        }
    }

    /// Executes a statement list in order within the current frame.
    ///
    /// The value of the last executed statement becomes the list's value;
    /// a control-flow signal short-circuits the rest of the list and
    /// propagates upward.
    pub(crate) fn execute_statements(&mut self, statements: &[Statement]) -> EvalResult<Control> {
        let mut result = Value::Nil;

        for statement in statements {
            match self.eval_statement(statement)? {
                Control::Value(value) => result = value,
                signal => return Ok(signal),
            }
        }

        Ok(Control::Value(result))
    }

    /// Executes a statement list in a fresh child frame, restoring the
    /// previous frame on every exit path (normal, signal or error).
    pub(crate) fn execute_block(&mut self, statements: &[Statement]) -> EvalResult<Control> {
        let previous = Rc::clone(&self.current);
        self.current = Frame::child(&previous);

        let outcome = self.execute_statements(statements);

        self.current = previous;
        outcome
    }

    /// Evaluates a single statement.
    ///
    /// `let`, function definitions and semicolon-terminated expression
    /// statements yield nil; `break`, `continue` and `return` yield their
    /// control-flow signal.
    ///
    /// # Parameters
    /// - `statement`: Statement to evaluate.
    ///
    /// # Returns
    /// The statement's [`Control`] outcome.
    pub fn eval_statement(&mut self, statement: &Statement) -> EvalResult<Control> {
        match statement {
            Statement::Expression { expr, semicolon, .. } => {
                let value = self.eval(expr)?;
                Ok(Control::Value(if *semicolon { Value::Nil } else { value }))
            },

            Statement::Let { name, value, .. } => {
                let value = self.eval(value)?;
                self.current.define(name, value);
                Ok(Control::Value(Value::Nil))
            },

            Statement::If { condition,
                            then,
                            elsifs,
                            otherwise,
                            .. } => {
                if self.eval_condition(condition)? {
                    return self.execute_block(then);
                }
                for arm in elsifs {
                    if self.eval_condition(&arm.condition)? {
                        return self.execute_block(&arm.body);
                    }
                }
                otherwise.as_ref()
                         .map_or(Ok(Control::Value(Value::Nil)), |body| self.execute_block(body))
            },

            Statement::While { condition, body, .. } => {
                while self.eval_condition(condition)? {
                    match self.execute_block(body)? {
                        Control::Value(_) | Control::Continue { .. } => {},
                        Control::Break { .. } => break,
                        signal @ Control::Return(_) => return Ok(signal),
                    }
                }
                Ok(Control::Value(Value::Nil))
            },

            Statement::For { index,
                             item,
                             iterable,
                             body,
                             line, } => {
                self.eval_for(index.as_deref(), item, iterable, body, *line)
            },

            Statement::Function(def) => {
                let closure = Closure { name:   Some(def.name.clone()),
                                        params: def.params.clone(),
                                        body:   ClosureBody::Block(def.body.clone()),
                                        env:    Rc::clone(&self.current), };
                self.current.define(&def.name, Value::Closure(Rc::new(closure)));
                Ok(Control::Value(Value::Nil))
            },

            Statement::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };
                Ok(Control::Return(value))
            },

            Statement::Break { line } => Ok(Control::Break { line: *line }),
            Statement::Continue { line } => Ok(Control::Continue { line: *line }),

            Statement::Block { statements, .. } => self.execute_block(statements),

            Statement::Try { body, catch, finally, .. } => self.eval_try(body, catch.as_ref(), finally.as_deref()),

            Statement::Throw { value, line } => {
                let value = self.eval(value)?;
                Err(RuntimeError::Thrown { value, line: *line })
            },
        }
    }

    /// Evaluates a condition expression, which must produce a boolean.
    fn eval_condition(&mut self, condition: &Expr) -> EvalResult<bool> {
        self.eval(condition)?.as_bool(condition.line_number())
    }

    /// Executes a `try` statement.
    ///
    /// `catch` intercepts any runtime error raised in the body; a value
    /// raised by `throw` is bound as-is, while engine errors are bound as
    /// their message string. The `finally` block runs on every exit path;
    /// its own signal or error takes precedence over the body's outcome.
    fn eval_try(&mut self,
                body: &[Statement],
                catch: Option<&(String, Vec<Statement>)>,
                finally: Option<&[Statement]>)
                -> EvalResult<Control> {
        let mut outcome = self.execute_block(body);

        if let Err(error) = outcome {
            match catch {
                Some((name, handler)) => {
                    let payload = match error {
                        RuntimeError::Thrown { value, .. } => value,
                        other => Value::from(other.to_string()),
                    };

                    let previous = Rc::clone(&self.current);
                    self.current = Frame::child(&previous);
                    self.current.define(name, payload);

                    outcome = self.execute_statements(handler);

                    self.current = previous;
                },
                None => outcome = Err(error),
            }
        }

        if let Some(finally_body) = finally {
            match self.execute_block(finally_body)? {
                Control::Value(_) => {},
                signal => return Ok(signal),
            }
        }

        outcome
    }

    /// Evaluates an expression and returns the resulting value.
    ///
    /// This is the main entry point for expression evaluation. The
    /// evaluator dispatches on the expression variant: leaves decode by
    /// token kind, nodes dispatch on their operator token, calls resolve
    /// their callee (with flattened-name lookup), and lambdas capture the
    /// current frame.
    ///
    /// # Parameters
    /// - `expr`: Expression to evaluate.
    ///
    /// # Returns
    /// The computed [`Value`].
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Leaf { token, line } => self.eval_leaf(token, *line),
            Expr::Node { op, operands, line } => self.eval_node(op, operands, *line),
            Expr::Call { callee, args, line } => self.eval_call(callee, args, *line),
            Expr::Lambda { params, body, .. } => {
                let closure = Closure { name:   None,
                                        params: params.clone(),
                                        body:   ClosureBody::Expr((**body).clone()),
                                        env:    Rc::clone(&self.current), };
                Ok(Value::Closure(Rc::new(closure)))
            },
        }
    }

    /// Decodes a leaf token into a value.
    ///
    /// String literals additionally undergo escape processing and
    /// interpolation; identifiers resolve through the frame chain and
    /// produce `undefined` when no binding exists at any level.
    fn eval_leaf(&mut self, token: &Token, line: usize) -> EvalResult<Value> {
        match token {
            Token::Long(n) => Ok(Value::Long(*n)),
            Token::Double(d) => Ok(Value::Double(*d)),
            Token::BigNum(n) => Ok(Value::BigNum(Rc::new(n.clone()))),
            Token::Str(raw) => self.eval_string_literal(raw),
            Token::Regex(source) => {
                Ok(Value::Pattern(Rc::new(PatternValue::compile(source, line)?)))
            },
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::Nil => Ok(Value::Nil),
            Token::Ident(name) => Ok(self.current.lookup(name).unwrap_or(Value::Undefined)),
            other => {
                Err(RuntimeError::TypeError { details: format!("{other:?} is not a literal"),
                                              line })
            },
        }
    }

    /// Evaluates an operator node.
    ///
    /// Short-circuiting forms (`&&`, `||`, `?:`) and assignment control
    /// their own operand evaluation; everything else evaluates operands
    /// strictly left-to-right and delegates to the operator tables.
    fn eval_node(&mut self, op: &Token, operands: &[Expr], line: usize) -> EvalResult<Value> {
        match (op, operands) {
            (Token::AndAnd, [left, right]) => {
                if !self.eval(left)?.as_bool(left.line_number())? {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval(right)?.as_bool(right.line_number())?;
                Ok(Value::Bool(right))
            },
            (Token::OrOr, [left, right]) => {
                if self.eval(left)?.as_bool(left.line_number())? {
                    return Ok(Value::Bool(true));
                }
                let right = self.eval(right)?.as_bool(right.line_number())?;
                Ok(Value::Bool(right))
            },

            (Token::Question, [condition, then, other]) => {
                if self.eval(condition)?.as_bool(condition.line_number())? {
                    self.eval(then)
                } else {
                    self.eval(other)
                }
            },

            (Token::Assign, [target, value]) => self.eval_assignment(target, value, line),

            (Token::Dot, [target, field]) => {
                let target = self.eval(target)?;
                let name = field.as_identifier().ok_or(RuntimeError::TypeError { details:
                                                           "property name must be an identifier".to_string(),
                                                       line })?;
                Ok(binary::property_access(&target, name))
            },

            (Token::LBracket, [target, index]) => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                binary::element_read(&target, &index, line)
            },

            (_, [operand]) => {
                let operand = self.eval(operand)?;
                super::unary::eval_unary(op, &operand, line)
            },

            (_, [left, right]) => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary::eval_binary(op, &left, &right, line)
            },

            _ => {
                Err(RuntimeError::TypeError { details: format!("malformed {op:?} node"),
                                              line })
            },
        }
    }

    /// Assigns to a location: an identifier, a `.` field, or a `[]`
    /// element. Any other target is a runtime error. The value of an
    /// assignment is the assigned value.
    fn eval_assignment(&mut self, target: &Expr, value: &Expr, line: usize) -> EvalResult<Value> {
        match target {
            Expr::Leaf { token: Token::Ident(name),
                         .. } => {
                let value = self.eval(value)?;
                self.current.assign(name, value.clone());
                Ok(value)
            },

            Expr::Node { op: Token::Dot,
                         operands,
                         .. } if operands.len() == 2 => {
                let container = self.eval(&operands[0])?;
                let name =
                    operands[1].as_identifier()
                               .ok_or(RuntimeError::InvalidAssignmentTarget { line })?;
                let value = self.eval(value)?;

                match container {
                    Value::Map(entries) => {
                        entries.borrow_mut()
                               .insert(ValueKey::Str(name.to_string()), value.clone());
                        Ok(value)
                    },
                    other => {
                        Err(RuntimeError::TypeError { details: format!("cannot set property '{name}' on {}",
                                                                       other.type_name()),
                                                      line })
                    },
                }
            },

            Expr::Node { op: Token::LBracket,
                         operands,
                         .. } if operands.len() == 2 => {
                let container = self.eval(&operands[0])?;
                let index = self.eval(&operands[1])?;
                let value = self.eval(value)?;
                binary::element_write(&container, &index, value, line)
            },

            _ => Err(RuntimeError::InvalidAssignmentTarget { line }),
        }
    }

    /// Evaluates a function call.
    ///
    /// Before ordinary evaluation of the callee, a chain of `.` nodes whose
    /// leaves are all identifiers is folded into a single dotted name and
    /// looked up in the environment; this is how dotted builtin names like
    /// `string.endsWith` dispatch without a runtime namespace value. The
    /// rule applies only to the callee position.
    fn eval_call(&mut self, callee: &Expr, args: &[Expr], line: usize) -> EvalResult<Value> {
        let flattened = callee.dotted_name();
        let callee_value = match &flattened {
            Some(name) => match self.current.lookup(name) {
                Some(value) => value,
                None => self.eval(callee)?,
            },
            None => self.eval(callee)?,
        };

        if callee_value.is_undefined()
           && let Some(name) = flattened
        {
            return Err(RuntimeError::UndefinedVariable { name, line });
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }

        self.call_value(&callee_value, &values, line)
    }

    /// Calls any callable value with already-evaluated arguments.
    ///
    /// # Errors
    /// `NotAFunction` when the value is not callable, plus whatever the
    /// callee itself raises.
    pub fn call_value(&mut self, callee: &Value, args: &[Value], line: usize) -> EvalResult<Value> {
        match callee {
            Value::Closure(closure) => self.call_closure(closure, args),
            Value::Builtin(def) => {
                if !def.arity.check(args.len()) {
                    return Err(RuntimeError::ArgumentCountMismatch { name: def.name.to_string(),
                                                                    line });
                }
                (def.func)(self, args, line)
            },
            Value::HostFn(host) => (host.func)(args, line),
            other => {
                Err(RuntimeError::NotAFunction { found: other.to_string(),
                                                 line })
            },
        }
    }

    /// Calls a closure: builds a new child of the closure's captured frame,
    /// binds parameters positionally (missing arguments become `undefined`,
    /// extra arguments are ignored), and runs the body.
    ///
    /// A lambda returns its expression's value; a `fn` body returns its
    /// last statement's value unless a `return` signal unwinds first.
    pub(crate) fn call_closure(&mut self, closure: &Rc<Closure>, args: &[Value]) -> EvalResult<Value> {
        let frame = Frame::child(&closure.env);
        for (position, param) in closure.params.iter().enumerate() {
            frame.define(param, args.get(position).cloned().unwrap_or(Value::Undefined));
        }

        let previous = std::mem::replace(&mut self.current, frame);

        let result = match &closure.body {
            ClosureBody::Expr(expr) => self.eval(expr),
            ClosureBody::Block(statements) => match self.execute_statements(statements) {
                Ok(Control::Value(value) | Control::Return(value)) => Ok(value),
                Ok(Control::Break { line }) => Err(RuntimeError::BreakOutsideLoop { line }),
                Ok(Control::Continue { line }) => Err(RuntimeError::ContinueOutsideLoop { line }),
                Err(error) => Err(error),
            },
        };

        self.current = previous;
        result
    }
}

/// Compiles a source string and runs it in a fresh context, merging
/// `bindings` into the global frame first. This is the engine behind the
/// public `execute` entry point and the interpolation-free re-entry used by
/// the pending-execution runtime.
///
/// # Errors
/// Parse errors and runtime errors, wrapped by the caller as needed.
pub fn run_with_bindings(source: &str,
                         bindings: Option<&HashMap<String, Value>>)
                         -> Result<Value, crate::error::EngineError> {
    let tokens = crate::interpreter::lexer::tokenize(source)?;
    let mut iter = tokens.iter().peekable();
    let statements = crate::interpreter::parser::statement::parse_program(&mut iter)?;

    let mut context = Context::new();
    if let Some(bindings) = bindings {
        for (name, value) in bindings {
            context.define_global(name, value.clone());
        }
    }

    Ok(context.run_script(&statements)?)
}
