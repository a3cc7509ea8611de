//! # kestrel
//!
//! kestrel is a small, dynamically-typed scripting language written in
//! Rust. It parses and evaluates scripts with lexical scoping, first-class
//! closures, string interpolation and a flat catalog of built-in
//! functions, and ships two independent walkers over the same tree: a
//! pending-execution engine for incrementally-provisioned boolean
//! expressions and a static analyzer producing line-annotated diagnostics.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::collections::HashMap;

use crate::{
    ast::Statement,
    interpreter::evaluator::core::Context,
};

/// Static analysis over parsed scripts.
///
/// This module walks the statement tree once and emits a list of
/// line-annotated diagnostics: undefined identifiers, non-boolean
/// conditions, and type mismatches in logical operators. It mirrors
/// runtime scoping with a chain of symbol tables seeded from the builtin
/// catalog.
///
/// # Responsibilities
/// - Types expressions over a coarse lattice and applies promotion rules.
/// - Reports findings without ever aborting, recovering with `any`.
/// - Converts parse failures into a single diagnostic.
pub mod analyzer;
/// Defines the structure of parsed code.
///
/// This module declares the `Expr` and `Statement` types that represent the
/// syntactic structure of source code as a tree. The tree is built by the
/// parsers and traversed by the interpreter, the analyzer and the
/// pending-execution factory.
///
/// # Responsibilities
/// - Defines expression and statement types for all language constructs.
/// - Attaches source lines to nodes for error reporting.
/// - Prints expressions back to parseable text.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing, parsing
/// or evaluating code. It standardizes error reporting and carries detailed
/// information about failures, including error kinds, descriptions, and
/// source lines.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches line numbers and detailed messages for context.
/// - Wraps both kinds behind `EngineError` for the public API.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations, the environment chain, the builtin catalog, error
/// handling, and all supporting infrastructure to provide a complete
/// runtime for source code evaluation.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, builtins.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// Lazy, short-circuit evaluation of boolean expressions.
///
/// Given an expression tree, this module builds a combinator tree that
/// discovers its free identifiers, accepts values incrementally, and
/// reports whether the result is determined yet, memoizing every partial
/// evaluation.
///
/// # Responsibilities
/// - Compiles `&&`, `||`, `!` and `?:` nodes into structural combinators.
/// - Tracks provided variables per leaf and short-circuits early.
/// - Delegates leaf evaluation to a host runtime contract.
pub mod pending;
/// General utilities.
///
/// Safe numeric conversions and the scoped name set shared by the walkers.
pub mod util;

pub use crate::{
    analyzer::{Diagnostic, Severity, analyze},
    error::EngineError,
    interpreter::value::core::Value,
    pending::{EngineRuntime, PendingExec, PendingRuntime},
};

/// A compiled script: a handle bound to the parsed statement list, ready to
/// run any number of times.
///
/// Produced by [`compile`]; each [`Script::execute`] call runs against a
/// fresh context.
#[derive(Debug, Clone)]
pub struct Script {
    statements: Vec<Statement>,
}

impl Script {
    /// Runs the compiled statement list against an optional name-to-value
    /// context and returns the script value: the value of the last
    /// statement whose expression statement did not end in a semicolon, or
    /// nil.
    ///
    /// # Errors
    /// Any runtime error the script raises, including uncaught `throw`n
    /// values.
    ///
    /// # Examples
    /// ```
    /// use kestrel::{Value, compile};
    ///
    /// let script = compile("1 + 2").unwrap();
    /// assert_eq!(script.execute(None).unwrap(), Value::Long(3));
    /// assert_eq!(script.execute(None).unwrap(), Value::Long(3));
    /// ```
    pub fn execute(&self, context: Option<&HashMap<String, Value>>) -> Result<Value, EngineError> {
        let mut ctx = Context::new();
        if let Some(context) = context {
            for (name, value) in context {
                ctx.define_global(name, value.clone());
            }
        }
        Ok(ctx.run_script(&self.statements)?)
    }
}

/// Parses a source string into a reusable [`Script`] handle.
///
/// # Errors
/// Returns an `EngineError::Parse` when the source fails to lex or parse.
///
/// # Examples
/// ```
/// use kestrel::compile;
///
/// assert!(compile("let x = 1; x + 1").is_ok());
/// assert!(compile("let x =").is_err());
/// ```
pub fn compile(source: &str) -> Result<Script, EngineError> {
    let tokens = interpreter::lexer::tokenize(source)?;
    let mut iter = tokens.iter().peekable();
    let statements = interpreter::parser::statement::parse_program(&mut iter)?;
    Ok(Script { statements })
}

/// Parses and runs a script against an optional name-to-value context and
/// returns the script value.
///
/// # Errors
/// Returns an error if parsing or evaluation fails, or if any runtime
/// error occurs.
///
/// # Examples
/// ```
/// use kestrel::{Value, execute};
///
/// let result = execute("let a = 10; a > 5 ? \"big\" : \"small\"", None).unwrap();
/// assert_eq!(result, Value::from("big"));
/// ```
pub fn execute(source: &str,
               context: Option<&HashMap<String, Value>>)
               -> Result<Value, EngineError> {
    compile(source)?.execute(context)
}
