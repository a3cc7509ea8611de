use std::collections::HashMap;

use kestrel::{Severity, analyze, analyzer::types::TypeKind};

fn diagnostics(source: &str) -> Vec<String> {
    analyze(source, &HashMap::new()).into_iter().map(|d| d.message).collect()
}

fn diagnostics_with(source: &str, env: &[(&str, TypeKind)]) -> Vec<String> {
    let env: HashMap<String, TypeKind> =
        env.iter().map(|(name, kind)| ((*name).to_string(), *kind)).collect();
    analyze(source, &env).into_iter().map(|d| d.message).collect()
}

fn assert_clean(source: &str) {
    let found = diagnostics(source);
    assert!(found.is_empty(), "expected no diagnostics for {source:?}, got {found:?}");
}

#[test]
fn undefined_variables_report_once() {
    let found = analyze("a + 1", &HashMap::new());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Undefined variable 'a'");
    assert_eq!(found[0].line, 1);
    assert_eq!(found[0].severity, Severity::Error);

    // The name decays to any, so it does not cascade.
    assert_eq!(diagnostics("a + a + a").len(), 1);
}

#[test]
fn non_boolean_conditions_are_reported() {
    assert_eq!(diagnostics("if 1 + 2 { 0 }"),
               vec!["'if' condition expects boolean, got long"]);
    assert_eq!(diagnostics("while \"x\" { }"),
               vec!["'while' condition expects boolean, got string"]);
    assert_eq!(diagnostics("let a = true; if a { 0 } elsif 1.5 { 1 }"),
               vec!["'elsif' condition expects boolean, got double"]);
}

#[test]
fn logical_operands_must_be_boolean() {
    assert_eq!(diagnostics_with("if b == 2 && c = 1 { 0 }",
                                &[("b", TypeKind::Long), ("c", TypeKind::Long)]),
               vec!["Right operand of '&&' must be boolean, got long"]);
    assert_eq!(diagnostics("let s = \"x\"; s && true"),
               vec!["Left operand of '&&' must be boolean, got string"]);
    assert_eq!(diagnostics("!1"), vec!["Operator '!' expects boolean, got long"]);
}

#[test]
fn arithmetic_promotions() {
    assert_clean("let a = 1; let b = 2.0; if a + b > 0.0 { }");
    assert_clean("let n = 1N; let m = n * 2; m == 2");
    // String concatenation via + is fine either way around.
    assert_clean("let s = \"v=\" + 1; string.length(s)");
    assert_eq!(diagnostics("nil + 1"),
               vec!["Operator '+' cannot combine nil and long"]);
}

#[test]
fn diagnostic_lines_match_their_tokens() {
    let found = analyze("let a = true\nif a { }\nb", &HashMap::new());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line, 3);
}

#[test]
fn builtin_catalog_is_preseeded() {
    assert_clean("math.sqrt(2.0)");
    assert_clean("if string.contains(\"a\", \"b\") { }");
    assert_clean("let xs = seq.list(1, 2); count(xs) > 0");
    // The call's return kind flows into the condition check.
    assert_eq!(diagnostics("if count(seq.list()) { }"),
               vec!["'if' condition expects boolean, got long"]);
}

#[test]
fn scopes_mirror_runtime_scoping() {
    assert_clean("fn f(x) { x + 1 } f(1)");
    assert_clean("for i, x in seq.list(1) { i + x }");
    assert_clean("try { 1 } catch (e) { e }");
    assert_clean("let f = lambda(n) -> n * 2 end; f(3)");

    // A for-loop binding does not leak out of the loop.
    assert_eq!(diagnostics("for x in seq.list(1) { x } x"),
               vec!["Undefined variable 'x'"]);
}

#[test]
fn assignment_updates_the_binding_type() {
    assert_eq!(diagnostics("let a = true; a = 1; if a { }"),
               vec!["'if' condition expects boolean, got long"]);
}

#[test]
fn ternary_conditions_are_checked() {
    assert_eq!(diagnostics("1 ? true : false"),
               vec!["'?:' condition expects boolean, got long"]);
    assert_clean("true ? 1 : 2");
}

#[test]
fn match_operator_wants_a_pattern() {
    assert_clean("\"x\" =~ /x/");
    assert_eq!(diagnostics("\"x\" =~ \"x\""),
               vec!["Right operand of '=~' must be a pattern, got string"]);
}

#[test]
fn caller_supplied_type_environment() {
    assert_eq!(diagnostics_with("if flag { }", &[("flag", TypeKind::Bool)]), Vec::<String>::new());
    assert_eq!(diagnostics_with("if flag { }", &[("flag", TypeKind::Long)]),
               vec!["'if' condition expects boolean, got long"]);
}

#[test]
fn parse_errors_become_one_diagnostic() {
    let found = analyze("let = 1", &HashMap::new());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Error);
    assert_eq!(found[0].line, 1);

    let found = analyze("1 +\n2 +", &HashMap::new());
    assert_eq!(found.len(), 1);
}

#[test]
fn dotted_object_access_recovers_with_any() {
    // A known root with an unknown path is fine.
    assert_clean("let m = seq.map(\"a\", 1); m.a + 1");
    // An unknown root is reported once.
    assert_eq!(diagnostics("user.age"), vec!["Undefined variable 'user'"]);
}
