use crate::{
    interpreter::{
        evaluator::core::{Context, EvalResult},
        lexer::tokenize,
        parser::expr::parse_expression,
        value::core::Value,
    },
};

impl Context {
    /// Evaluates a string literal: escape processing first, then `#{...}`
    /// interpolation over the processed text.
    ///
    /// Each placeholder holds a single expression, parsed by re-entering
    /// the expression parser and evaluated in the current frame. A
    /// malformed placeholder (bad tokens, a parse error, leftover input, or
    /// a missing closing brace) is substituted literally. Runtime errors
    /// raised while evaluating a well-formed placeholder propagate.
    pub(crate) fn eval_string_literal(&mut self, raw: &str) -> EvalResult<Value> {
        let unescaped = process_escapes(raw);

        if !unescaped.contains("#{") {
            return Ok(Value::from(unescaped));
        }

        let mut out = String::with_capacity(unescaped.len());
        let mut rest = unescaped.as_str();

        while let Some(start) = rest.find("#{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            match after.find('}') {
                Some(end) => {
                    let inner = &after[..end];
                    match self.eval_fragment(inner)? {
                        Some(value) => out.push_str(&value.to_string()),
                        None => {
                            out.push_str("#{");
                            out.push_str(inner);
                            out.push('}');
                        },
                    }
                    rest = &after[end + 1..];
                },
                // No closing brace: keep the rest literally.
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                },
            }
        }
        out.push_str(rest);

        Ok(Value::from(out))
    }

    /// Parses and evaluates one placeholder expression in the current
    /// frame. Returns `Ok(None)` when the placeholder is malformed, so the
    /// caller substitutes it literally.
    fn eval_fragment(&mut self, inner: &str) -> EvalResult<Option<Value>> {
        let Ok(tokens) = tokenize(inner) else {
            return Ok(None);
        };

        let mut iter = tokens.iter().peekable();
        let Ok(expr) = parse_expression(&mut iter) else {
            return Ok(None);
        };
        if iter.peek().is_some() {
            // More than a single expression in the placeholder.
            return Ok(None);
        }

        self.eval(&expr).map(Some)
    }
}

/// Processes string escapes: `\n`, `\t`, `\r`, `\\`, `\"`, `\'` and `\0`
/// decode to their characters; any other `\x` pair is kept literally.
fn process_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('0') => out.push('\0'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_escapes_decode() {
        assert_eq!(process_escapes(r"a\nb\tc"), "a\nb\tc");
        assert_eq!(process_escapes(r#"say \"hi\""#), "say \"hi\"");
    }

    #[test]
    fn unknown_escapes_keep_the_pair() {
        assert_eq!(process_escapes(r"a\qb"), r"a\qb");
    }
}
