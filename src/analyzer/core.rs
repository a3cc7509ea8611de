use std::collections::HashMap;

use crate::{
    analyzer::{Diagnostic, Severity, scope::ScopeChain, types::TypeKind},
    ast::{Expr, Statement},
    interpreter::{builtins, lexer::Token},
};

/// The identifier this analyzer stamps on its diagnostics.
pub const SOURCE: &str = "kestrel";

/// Walks a statement tree once and collects diagnostics.
///
/// The analyzer never aborts on a semantic finding: it records the
/// diagnostic, assigns `any` to the offending expression and carries on,
/// so one mistake does not drown the report in follow-up noise.
pub struct Analyzer {
    scopes:      ScopeChain,
    signatures:  HashMap<&'static str, TypeKind>,
    diagnostics: Vec<Diagnostic>,
}

impl Analyzer {
    /// Creates an analyzer whose root table holds the builtin catalog and
    /// the caller's type environment.
    #[must_use]
    pub fn new(type_env: &HashMap<String, TypeKind>) -> Self {
        let mut root: HashMap<String, TypeKind> =
            builtins::BUILTIN_NAMES.iter().map(|name| ((*name).to_string(), TypeKind::Any)).collect();
        for (name, kind) in type_env {
            root.insert(name.clone(), *kind);
        }

        let signatures = builtins::BUILTIN_TABLE.iter().map(|def| (def.name, def.returns)).collect();

        Self { scopes: ScopeChain::new(root),
               signatures,
               diagnostics: Vec::new() }
    }

    /// Walks a whole program.
    pub fn analyze_program(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.check_statement(statement);
        }
    }

    /// Consumes the analyzer and returns its findings, in source order.
    #[must_use]
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn error(&mut self, message: String, line: usize) {
        self.diagnostics.push(Diagnostic { message,
                                           line,
                                           column: None,
                                           severity: Severity::Error,
                                           source: SOURCE });
    }

    fn check_block(&mut self, statements: &[Statement]) {
        self.scopes.push();
        for statement in statements {
            self.check_statement(statement);
        }
        self.scopes.pop();
    }

    fn check_condition(&mut self, keyword: &str, condition: &Expr) {
        let kind = self.type_of_expr(condition);
        if !kind.is_boolean_compatible() {
            self.error(format!("'{keyword}' condition expects boolean, got {kind}"),
                       condition.line_number());
        }
    }

    fn check_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Expression { expr, .. } => {
                self.type_of_expr(expr);
            },

            Statement::Let { name, value, .. } => {
                let kind = self.type_of_expr(value);
                self.scopes.define(name, kind);
            },

            Statement::If { condition,
                            then,
                            elsifs,
                            otherwise,
                            .. } => {
                self.check_condition("if", condition);
                self.check_block(then);
                for arm in elsifs {
                    self.check_condition("elsif", &arm.condition);
                    self.check_block(&arm.body);
                }
                if let Some(body) = otherwise {
                    self.check_block(body);
                }
            },

            Statement::While { condition, body, .. } => {
                self.check_condition("while", condition);
                self.check_block(body);
            },

            Statement::For { index,
                             item,
                             iterable,
                             body,
                             .. } => {
                self.type_of_expr(iterable);
                self.scopes.push();
                if let Some(index) = index {
                    self.scopes.define(index, TypeKind::Any);
                }
                self.scopes.define(item, TypeKind::Any);
                for statement in body {
                    self.check_statement(statement);
                }
                self.scopes.pop();
            },

            Statement::Function(def) => {
                self.scopes.define(&def.name, TypeKind::Any);
                self.scopes.push();
                for param in &def.params {
                    self.scopes.define(param, TypeKind::Any);
                }
                for statement in &def.body {
                    self.check_statement(statement);
                }
                self.scopes.pop();
            },

            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.type_of_expr(value);
                }
            },

            Statement::Break { .. } | Statement::Continue { .. } => {},

            Statement::Block { statements, .. } => self.check_block(statements),

            Statement::Try { body, catch, finally, .. } => {
                self.check_block(body);
                if let Some((name, handler)) = catch {
                    self.scopes.push();
                    self.scopes.define(name, TypeKind::Any);
                    for statement in handler {
                        self.check_statement(statement);
                    }
                    self.scopes.pop();
                }
                if let Some(finally_body) = finally {
                    self.check_block(finally_body);
                }
            },

            Statement::Throw { value, .. } => {
                self.type_of_expr(value);
            },
        }
    }

    /// Types an expression, recording diagnostics along the way. A finding
    /// decays the expression to `any`.
    #[allow(clippy::too_many_lines)]
    fn type_of_expr(&mut self, expr: &Expr) -> TypeKind {
        match expr {
            Expr::Leaf { token, line } => self.type_of_leaf(token, *line),

            Expr::Lambda { params, body, .. } => {
                self.scopes.push();
                for param in params {
                    self.scopes.define(param, TypeKind::Any);
                }
                self.type_of_expr(body);
                self.scopes.pop();
                TypeKind::Any
            },

            Expr::Call { callee, args, .. } => {
                for arg in args {
                    self.type_of_expr(arg);
                }

                match callee.dotted_name() {
                    Some(name) => {
                        if let Some(kind) = self.signatures.get(name.as_str()) {
                            return *kind;
                        }
                        // Not a catalog name: resolve it like any other
                        // expression so unknown roots are reported.
                        self.type_of_expr(callee);
                        TypeKind::Any
                    },
                    None => {
                        self.type_of_expr(callee);
                        TypeKind::Any
                    },
                }
            },

            Expr::Node { op, operands, line } => self.type_of_node(op, operands, *line),
        }
    }

    fn type_of_leaf(&mut self, token: &Token, line: usize) -> TypeKind {
        match token {
            Token::Long(_) => TypeKind::Long,
            Token::Double(_) => TypeKind::Double,
            Token::BigNum(_) => TypeKind::BigInt,
            Token::Str(_) => TypeKind::Str,
            Token::Regex(_) => TypeKind::Pattern,
            Token::True | Token::False => TypeKind::Bool,
            Token::Nil => TypeKind::Nil,
            Token::Ident(name) => {
                if let Some(kind) = self.scopes.lookup(name) {
                    kind
                } else {
                    self.error(format!("Undefined variable '{name}'"), line);
                    // Define the name so one typo reports once.
                    self.scopes.define(name, TypeKind::Any);
                    TypeKind::Any
                }
            },
            _ => TypeKind::Any,
        }
    }

    fn type_of_node(&mut self, op: &Token, operands: &[Expr], line: usize) -> TypeKind {
        match (op, operands) {
            // A complete dotted name known to the root table takes its
            // type; otherwise analyze the parts and recover with any. This
            // is the analyzer counterpart of the interpreter's
            // flattened-name rule.
            (Token::Dot, [target, field]) => {
                let dotted = target.dotted_name()
                                   .zip(field.as_identifier())
                                   .map(|(head, tail)| format!("{head}.{tail}"));
                if let Some(name) = dotted
                   && let Some(kind) = self.scopes.lookup_root(&name)
                {
                    return kind;
                }
                self.type_of_expr(target);
                TypeKind::Any
            },

            (Token::LBracket, [target, index]) => {
                self.type_of_expr(target);
                self.type_of_expr(index);
                TypeKind::Any
            },

            (Token::Question, [condition, then, other]) => {
                let kind = self.type_of_expr(condition);
                if !kind.is_boolean_compatible() {
                    self.error(format!("'?:' condition expects boolean, got {kind}"),
                               condition.line_number());
                }
                let then = self.type_of_expr(then);
                let other = self.type_of_expr(other);
                if then == other { then } else { TypeKind::Any }
            },

            (Token::Assign, [target, value]) => {
                let kind = self.type_of_expr(value);
                match target.as_identifier() {
                    Some(name) => self.scopes.assign(name, kind),
                    None => {
                        self.type_of_expr(target);
                    },
                }
                kind
            },

            (Token::AndAnd | Token::OrOr, [left, right]) => {
                let left_kind = self.type_of_expr(left);
                if !left_kind.is_boolean_compatible() {
                    self.error(format!("Left operand of '{op}' must be boolean, got {left_kind}"),
                               left.line_number());
                }
                let right_kind = self.type_of_expr(right);
                if !right_kind.is_boolean_compatible() {
                    self.error(format!("Right operand of '{op}' must be boolean, got {right_kind}"),
                               right.line_number());
                }
                TypeKind::Bool
            },

            (Token::Bang, [operand]) => {
                let kind = self.type_of_expr(operand);
                if !kind.is_boolean_compatible() {
                    self.error(format!("Operator '!' expects boolean, got {kind}"),
                               operand.line_number());
                }
                TypeKind::Bool
            },

            (Token::Minus, [operand]) => {
                let kind = self.type_of_expr(operand);
                if !kind.is_numeric() {
                    self.error(format!("Operator '-' expects a number, got {kind}"),
                               operand.line_number());
                    return TypeKind::Any;
                }
                kind
            },

            (Token::Tilde, [operand]) => {
                let kind = self.type_of_expr(operand);
                if !kind.is_numeric() {
                    self.error(format!("Operator '~' expects a number, got {kind}"),
                               operand.line_number());
                }
                TypeKind::Long
            },

            (Token::Plus, [left, right]) => {
                let left_kind = self.type_of_expr(left);
                let right_kind = self.type_of_expr(right);
                if left_kind == TypeKind::Str || right_kind == TypeKind::Str {
                    return TypeKind::Str;
                }
                self.arithmetic(op, left_kind, right_kind, line)
            },

            (Token::Minus | Token::Star | Token::Slash | Token::Percent | Token::StarStar,
             [left, right]) => {
                let left_kind = self.type_of_expr(left);
                let right_kind = self.type_of_expr(right);
                self.arithmetic(op, left_kind, right_kind, line)
            },

            (Token::Lt | Token::Le | Token::Gt | Token::Ge | Token::EqEq | Token::NotEq,
             [left, right]) => {
                self.type_of_expr(left);
                self.type_of_expr(right);
                TypeKind::Bool
            },

            (Token::Amp | Token::Pipe | Token::Caret | Token::Shl | Token::Shr | Token::UShr,
             [left, right]) => {
                for operand in [left, right] {
                    let kind = self.type_of_expr(operand);
                    if !kind.is_numeric() {
                        self.error(format!("Operator '{op}' expects a number, got {kind}"),
                                   operand.line_number());
                    }
                }
                TypeKind::Long
            },

            (Token::Match, [left, right]) => {
                self.type_of_expr(left);
                let right_kind = self.type_of_expr(right);
                if !matches!(right_kind, TypeKind::Pattern | TypeKind::Any) {
                    self.error(format!("Right operand of '=~' must be a pattern, got {right_kind}"),
                               right.line_number());
                }
                TypeKind::Bool
            },

            _ => {
                for operand in operands {
                    self.type_of_expr(operand);
                }
                TypeKind::Any
            },
        }
    }

    /// Types an arithmetic operator application, reporting non-numeric
    /// operands.
    fn arithmetic(&mut self,
                  op: &Token,
                  left: TypeKind,
                  right: TypeKind,
                  line: usize)
                  -> TypeKind {
        if !left.is_numeric() || !right.is_numeric() {
            self.error(format!("Operator '{op}' cannot combine {left} and {right}"), line);
            return TypeKind::Any;
        }
        left.promote(right)
    }
}
