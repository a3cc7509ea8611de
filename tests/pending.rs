use std::collections::{HashMap, HashSet};

use kestrel::{
    EngineError, EngineRuntime, PendingExec, PendingRuntime, Value,
};

/// Wraps the engine runtime, counting how often leaves re-enter it.
struct CountingRuntime {
    inner: EngineRuntime,
    runs:  usize,
}

impl CountingRuntime {
    fn new() -> Self {
        Self { inner: EngineRuntime::new(),
               runs:  0, }
    }
}

impl PendingRuntime for CountingRuntime {
    fn run(&mut self,
           expression: &str,
           context: &HashMap<String, Value>)
           -> Result<Value, EngineError> {
        self.runs += 1;
        self.inner.run(expression, context)
    }

    fn builtin_identifiers(&self) -> &HashSet<String> {
        self.inner.builtin_identifiers()
    }
}

fn compile(source: &str, runtime: &dyn PendingRuntime) -> PendingExec {
    PendingExec::compile_str(source, runtime).unwrap()
}

#[test]
fn and_short_circuits_on_a_false_side() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("a && b", &rt);

    assert!(!exec.can_execute(&mut rt).unwrap());

    exec.provide("a", &Value::Bool(false));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(!exec.execute(&mut rt).unwrap());
}

#[test]
fn and_with_a_true_side_waits_for_the_other() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("a && b", &rt);

    exec.provide("a", &Value::Bool(true));
    assert!(!exec.can_execute(&mut rt).unwrap());

    exec.provide("b", &Value::Bool(true));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(exec.execute(&mut rt).unwrap());
}

#[test]
fn or_short_circuits_on_a_true_side() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("a || b", &rt);

    exec.provide("b", &Value::Bool(true));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(exec.execute(&mut rt).unwrap());
}

#[test]
fn not_mirrors_its_child() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("!a", &rt);

    assert!(!exec.can_execute(&mut rt).unwrap());
    exec.provide("a", &Value::Bool(false));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(exec.execute(&mut rt).unwrap());
}

#[test]
fn conditional_defers_to_the_selected_branch() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("c ? t : e", &rt);

    exec.provide("c", &Value::Bool(false));
    // The alternate is still unknown.
    assert!(!exec.can_execute(&mut rt).unwrap());

    // Providing the untaken branch does not help.
    exec.provide("t", &Value::Bool(true));
    assert!(!exec.can_execute(&mut rt).unwrap());

    exec.provide("e", &Value::Bool(false));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(!exec.execute(&mut rt).unwrap());
}

#[test]
fn leaves_evaluate_whole_subtrees() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("x > 10 && y < 5", &rt);

    exec.provide("x", &Value::Long(20));
    exec.provide("y", &Value::Long(1));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(exec.execute(&mut rt).unwrap());
}

#[test]
fn dotted_paths_are_single_names() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("user.age > 18", &rt);

    // The dotted path is one variable; its root alone is not enough.
    exec.provide("user", &Value::Long(0));
    assert!(!exec.can_execute(&mut rt).unwrap());

    exec.provide("user.age", &Value::Long(21));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(exec.execute(&mut rt).unwrap());
}

#[test]
fn builtins_are_not_free_variables() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("math.abs(a) == 1.0", &rt);

    exec.provide("a", &Value::Double(-1.0));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(exec.execute(&mut rt).unwrap());
}

#[test]
fn lambda_parameters_shadow_free_variables() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("filter(items, lambda(x) -> x > 0 end) == seq.list(1)", &rt);

    exec.provide("x", &Value::Long(0));
    assert!(!exec.can_execute(&mut rt).unwrap());

    exec.provide("items", &Value::from(vec![Value::Long(-1), Value::Long(1)]));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(exec.execute(&mut rt).unwrap());
}

#[test]
fn monotonic_once_determined() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("a && b", &rt);

    exec.provide("a", &Value::Bool(false));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(!exec.execute(&mut rt).unwrap());

    // Later provides leave the result unchanged.
    exec.provide("b", &Value::Bool(true));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(!exec.execute(&mut rt).unwrap());
}

#[test]
fn execute_is_memoized() {
    let mut rt = CountingRuntime::new();
    let mut exec = compile("a && b", &rt);

    exec.provide("a", &Value::Bool(true));
    exec.provide("b", &Value::Bool(true));
    assert!(exec.can_execute(&mut rt).unwrap());

    let runs_after_probe = rt.runs;
    assert!(exec.execute(&mut rt).unwrap());
    let runs_after_first = rt.runs;

    for _ in 0..3 {
        assert!(exec.execute(&mut rt).unwrap());
    }
    assert_eq!(rt.runs, runs_after_first);
    // Each leaf entered the runtime at most once overall.
    assert!(runs_after_first <= 2 && runs_after_probe <= runs_after_first);
}

#[test]
fn executing_too_early_is_an_error() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("a && b", &rt);

    exec.provide("a", &Value::Bool(true));
    assert!(exec.execute(&mut rt).is_err());
}

#[test]
fn non_boolean_leaves_are_rejected() {
    let mut rt = EngineRuntime::new();
    let mut exec = compile("a", &rt);

    exec.provide("a", &Value::Long(1));
    assert!(exec.can_execute(&mut rt).unwrap());
    assert!(exec.execute(&mut rt).is_err());
}
