use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use indexmap::IndexMap;

use crate::{
    error::EngineError,
    interpreter::{
        builtins,
        evaluator::core::run_with_bindings,
        value::{core::Value, key::ValueKey},
    },
};

/// The combinator tree and its incremental-evaluation API.
pub mod exec;
/// Free-identifier discovery over expression trees.
pub mod free_vars;

pub use exec::PendingExec;

/// The host contract the pending-execution engine evaluates leaves
/// against.
///
/// A runtime re-parses and evaluates the textual form of a leaf subtree
/// when all of its free identifiers have been provided, and enumerates the
/// names the factory must treat as bound (and therefore not as free
/// variables).
pub trait PendingRuntime {
    /// Re-parses and evaluates a textual expression against a context map.
    ///
    /// # Errors
    /// Parse or runtime failures from the underlying engine.
    fn run(&mut self,
           expression: &str,
           context: &HashMap<String, Value>)
           -> Result<Value, EngineError>;

    /// The names that are always bound, such as the builtin catalog.
    fn builtin_identifiers(&self) -> &HashSet<String>;
}

/// The engine's own [`PendingRuntime`], backed by the interpreter and the
/// builtin catalog.
pub struct EngineRuntime {
    builtins: HashSet<String>,
}

#[allow(clippy::new_without_default)]
impl EngineRuntime {
    /// Creates a runtime whose bound-name set is the builtin catalog.
    #[must_use]
    pub fn new() -> Self {
        Self { builtins: builtins::builtin_identifiers() }
    }
}

impl PendingRuntime for EngineRuntime {
    /// Runs an expression against the provided context. Free variables are
    /// discovered as dotted paths, so a context key like `user.age` is
    /// bridged into a nested map binding `user` before evaluation, which
    /// lets ordinary property access resolve it.
    fn run(&mut self,
           expression: &str,
           context: &HashMap<String, Value>)
           -> Result<Value, EngineError> {
        let mut bindings: HashMap<String, Value> = HashMap::new();
        for (name, value) in context {
            if name.contains('.') {
                insert_dotted(&mut bindings, name, value);
            } else {
                bindings.insert(name.clone(), value.clone());
            }
        }

        run_with_bindings(expression, Some(&bindings))
    }

    fn builtin_identifiers(&self) -> &HashSet<String> {
        &self.builtins
    }
}

fn empty_map() -> Value {
    Value::Map(Rc::new(RefCell::new(IndexMap::new())))
}

/// Binds a dotted path by building (or extending) nested maps under its
/// root segment.
fn insert_dotted(bindings: &mut HashMap<String, Value>, path: &str, value: &Value) {
    let segments: Vec<&str> = path.split('.').collect();

    let root = bindings.entry(segments[0].to_string()).or_insert_with(empty_map);
    if !matches!(root, Value::Map(_)) {
        *root = empty_map();
    }
    let mut current = root.clone();

    for segment in &segments[1..segments.len() - 1] {
        let next = {
            let Value::Map(entries) = &current else {
                return;
            };
            let mut entries = entries.borrow_mut();
            let entry = entries.entry(ValueKey::Str((*segment).to_string()))
                               .or_insert_with(empty_map);
            if !matches!(entry, Value::Map(_)) {
                *entry = empty_map();
            }
            entry.clone()
        };
        current = next;
    }

    if let (Value::Map(entries), Some(last)) = (&current, segments.last()) {
        entries.borrow_mut().insert(ValueKey::Str((*last).to_string()), value.clone());
    }
}
