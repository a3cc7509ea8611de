/// Pratt expression parsing.
///
/// Contains the binding-power table and the core `expr(ubp)` loop that
/// builds expression trees while respecting operator precedence and
/// associativity.
pub mod expr;
/// Statement parsing.
///
/// Dispatches on the leading keyword of each statement and delegates every
/// embedded expression to the Pratt core.
pub mod statement;
/// Utility functions for the parser.
///
/// Provides helpers shared by expression and statement parsing, such as
/// comma-separated list parsing and token expectation.
pub mod utils;
