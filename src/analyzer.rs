use std::collections::HashMap;

use crate::{
    analyzer::{core::Analyzer, types::TypeKind},
    interpreter::{lexer::tokenize, parser::statement::parse_program},
};

/// The analysis walker.
///
/// Walks the statement tree once, tracking a symbol-table chain that
/// mirrors runtime scoping, and records diagnostics as it goes.
pub mod core;
/// Symbol-table chain.
///
/// A stack of name-to-type tables with the root table seeded from the
/// builtin catalog and the caller's type environment.
pub mod scope;
/// The coarse type lattice.
///
/// Defines `TypeKind` and the promotion rules for arithmetic operators.
pub mod types;

/// How severe a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A definite problem, such as an undefined variable.
    Error,
    /// A likely problem that does not invalidate the script.
    Warning,
    /// A neutral remark.
    Information,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Information => write!(f, "information"),
        }
    }
}

/// One line-annotated finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable description of the finding.
    pub message:  String,
    /// 1-based line of the token that provoked the finding.
    pub line:     usize,
    /// Column, when known. The engine currently reports line precision
    /// only.
    pub column:   Option<usize>,
    /// The finding's severity.
    pub severity: Severity,
    /// The tool that produced the finding.
    pub source:   &'static str,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: line {}: {}", self.severity, self.line, self.message)
    }
}

/// Analyzes a source string and returns its diagnostics.
///
/// The symbol table's root is seeded with the builtin catalog and with
/// `type_env`, a caller-supplied mapping of variable names to type kinds.
/// Parse errors do not abort: they are converted into a single error
/// diagnostic carrying the offending token's line.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
///
/// use kestrel::analyzer::analyze;
///
/// let diagnostics = analyze("a + 1", &HashMap::new());
/// assert_eq!(diagnostics.len(), 1);
/// assert_eq!(diagnostics[0].message, "Undefined variable 'a'");
/// assert_eq!(diagnostics[0].line, 1);
/// ```
#[must_use]
pub fn analyze(source: &str, type_env: &HashMap<String, TypeKind>) -> Vec<Diagnostic> {
    let parsed = tokenize(source).and_then(|tokens| {
                                     let mut iter = tokens.iter().peekable();
                                     parse_program(&mut iter)
                                 });

    match parsed {
        Ok(statements) => {
            let mut analyzer = Analyzer::new(type_env);
            analyzer.analyze_program(&statements);
            analyzer.finish()
        },
        Err(error) => vec![Diagnostic { message:  error.to_string(),
                                        line:     error.line_number(),
                                        column:   None,
                                        severity: Severity::Error,
                                        source:   core::SOURCE, }],
    }
}
