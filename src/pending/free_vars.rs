use std::collections::HashSet;

use crate::{
    ast::Expr,
    interpreter::lexer::Token,
    util::scoped_set::ScopedSet,
};

/// Extracts the free identifiers of an expression by depth-first
/// traversal.
///
/// - A `.`-chain whose links are all identifiers contributes its dotted
///   path as a single name (`user.age`, not `user`).
/// - Lambda parameters shadow free variables inside their body.
/// - Names present in `builtins` are bound by the host and excluded.
#[must_use]
pub fn free_identifiers(expr: &Expr, builtins: &HashSet<String>) -> HashSet<String> {
    let mut free = HashSet::new();
    let mut scopes = ScopedSet::new();
    collect(expr, builtins, &mut scopes, &mut free);
    free
}

/// Records a dotted path (or plain identifier) as free, unless its root is
/// shadowed or the whole path is a builtin.
fn record(path: String, builtins: &HashSet<String>, scopes: &ScopedSet, free: &mut HashSet<String>) {
    let root = path.split_once('.').map_or(path.as_str(), |(head, _)| head);
    if !scopes.contains(root) && !builtins.contains(&path) {
        free.insert(path);
    }
}

fn collect(expr: &Expr,
           builtins: &HashSet<String>,
           scopes: &mut ScopedSet,
           free: &mut HashSet<String>) {
    match expr {
        Expr::Leaf { token: Token::Ident(name),
                     .. } => record(name.clone(), builtins, scopes, free),

        Expr::Leaf { .. } => {},

        Expr::Node { op: Token::Dot,
                     operands,
                     .. } if operands.len() == 2 => {
            match expr.dotted_name() {
                Some(path) => record(path, builtins, scopes, free),
                // The right side is a field name, not a variable.
                None => collect(&operands[0], builtins, scopes, free),
            }
        },

        Expr::Node { operands, .. } => {
            for operand in operands {
                collect(operand, builtins, scopes, free);
            }
        },

        Expr::Call { callee, args, .. } => {
            match callee.dotted_name() {
                Some(path) => record(path, builtins, scopes, free),
                None => collect(callee, builtins, scopes, free),
            }
            for arg in args {
                collect(arg, builtins, scopes, free);
            }
        },

        Expr::Lambda { params, body, .. } => {
            scopes.push();
            for param in params {
                scopes.bind(param);
            }
            collect(body, builtins, scopes, free);
            scopes.pop();
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{lexer::tokenize, parser::expr::parse_expression};

    fn free(source: &str, builtins: &[&str]) -> HashSet<String> {
        let tokens = tokenize(source).unwrap();
        let mut iter = tokens.iter().peekable();
        let expr = parse_expression(&mut iter).unwrap();
        let builtins = builtins.iter().map(|s| (*s).to_string()).collect();
        free_identifiers(&expr, &builtins)
    }

    fn names(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn plain_identifiers_are_free() {
        assert_eq!(free("a + b * a", &[]), names(&["a", "b"]));
    }

    #[test]
    fn dotted_chains_count_as_one_name() {
        assert_eq!(free("user.age > 18", &[]), names(&["user.age"]));
    }

    #[test]
    fn lambda_parameters_shadow() {
        assert_eq!(free("lambda(x) -> x + y end", &[]), names(&["y"]));
    }

    #[test]
    fn builtins_are_excluded() {
        assert_eq!(free("math.abs(a)", &["math.abs"]), names(&["a"]));
    }
}
