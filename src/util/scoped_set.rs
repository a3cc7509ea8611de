use std::collections::HashSet;

/// A stack of name sets mirroring lexical scopes.
///
/// Pushing opens a scope, binding adds a name to the innermost scope, and a
/// containment check walks every open scope. Popping discards the innermost
/// scope together with its bindings.
///
/// # Examples
/// ```
/// use kestrel::util::scoped_set::ScopedSet;
///
/// let mut scopes = ScopedSet::new();
/// scopes.bind("outer");
///
/// scopes.push();
/// scopes.bind("inner");
/// assert!(scopes.contains("outer"));
/// assert!(scopes.contains("inner"));
///
/// scopes.pop();
/// assert!(!scopes.contains("inner"));
/// ```
#[derive(Debug, Default)]
pub struct ScopedSet {
    scopes: Vec<HashSet<String>>,
}

impl ScopedSet {
    /// Creates a scoped set with a single open scope.
    #[must_use]
    pub fn new() -> Self {
        Self { scopes: vec![HashSet::new()] }
    }

    /// Opens a new innermost scope.
    pub fn push(&mut self) {
        self.scopes.push(HashSet::new());
    }

    /// Discards the innermost scope. The outermost scope is never popped.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Binds a name in the innermost scope.
    pub fn bind(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    /// Tests whether any open scope binds `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }
}
