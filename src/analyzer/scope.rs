use std::collections::HashMap;

use crate::analyzer::types::TypeKind;

/// A chain of symbol tables mirroring runtime scoping.
///
/// The root table holds the builtin catalog (each dotted name is a single
/// key) and the caller-supplied type environment; inner tables come and go
/// with blocks, functions and loops.
#[derive(Debug)]
pub struct ScopeChain {
    tables: Vec<HashMap<String, TypeKind>>,
}

impl ScopeChain {
    /// Creates a chain whose root table is `root`.
    #[must_use]
    pub fn new(root: HashMap<String, TypeKind>) -> Self {
        Self { tables: vec![root] }
    }

    /// Opens a child scope.
    pub fn push(&mut self) {
        self.tables.push(HashMap::new());
    }

    /// Closes the innermost scope. The root table is never popped.
    pub fn pop(&mut self) {
        if self.tables.len() > 1 {
            self.tables.pop();
        }
    }

    /// Defines or replaces a binding in the innermost scope.
    pub fn define(&mut self, name: &str, kind: TypeKind) {
        if let Some(table) = self.tables.last_mut() {
            table.insert(name.to_string(), kind);
        }
    }

    /// Updates the nearest binding of `name`, or defines it in the
    /// innermost scope when no table binds it. Mirrors runtime assignment.
    pub fn assign(&mut self, name: &str, kind: TypeKind) {
        for table in self.tables.iter_mut().rev() {
            if let Some(entry) = table.get_mut(name) {
                *entry = kind;
                return;
            }
        }
        self.define(name, kind);
    }

    /// Looks a name up through the chain, innermost first.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<TypeKind> {
        self.tables.iter().rev().find_map(|table| table.get(name).copied())
    }

    /// Looks a name up in the root table only. Dotted names live here.
    #[must_use]
    pub fn lookup_root(&self, name: &str) -> Option<TypeKind> {
        self.tables.first().and_then(|table| table.get(name).copied())
    }
}
