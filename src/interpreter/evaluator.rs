/// Binary operator evaluation logic.
///
/// Handles the execution of all binary operations in expressions, including
/// arithmetic with numeric promotion, comparisons, bitwise operators,
/// regex matching and property/element access.
pub mod binary;

/// Unary operator evaluation logic.
///
/// Implements the prefix operators: arithmetic negation, logical NOT and
/// bitwise complement.
pub mod unary;

/// Core evaluation logic and context management.
///
/// Contains the main evaluation engine, the runtime context with its frame
/// chain, control-flow signals, closure calls and error propagation.
pub mod core;

/// Evaluation of for loops.
///
/// Iterates lists, maps and sets, binding index/key and item names per
/// iteration.
pub mod for_loop;

/// String literal evaluation.
///
/// Processes escapes, then substitutes `#{...}` interpolations by
/// re-entering the expression parser at evaluation time.
pub mod strings;
