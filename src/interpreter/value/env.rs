use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::{Expr, Statement},
    interpreter::value::core::Value,
};

/// One link in the environment chain, holding a mapping from name to value.
///
/// Frames form a parent-linked chain; the terminal ancestor is the global
/// frame. Lookup walks parents. Frames are shared (`Rc`) because closures
/// extend the lifetime of the frame they captured, and several closures may
/// capture the same frame.
#[derive(Debug)]
pub struct Frame {
    vars:   RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Frame>>,
}

impl Frame {
    /// Creates a global (parentless) frame.
    #[must_use]
    pub fn global() -> Rc<Self> {
        Rc::new(Self { vars:   RefCell::new(HashMap::new()),
                       parent: None, })
    }

    /// Creates a child of `parent`. Used on block entry and on function
    /// call; a called closure's frame is a child of the closure's captured
    /// frame, not of the caller's.
    #[must_use]
    pub fn child(parent: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self { vars:   RefCell::new(HashMap::new()),
                       parent: Some(Rc::clone(parent)), })
    }

    /// Looks a name up through the frame chain. Returns `None` when no
    /// binding exists at any level; identifier evaluation turns that into
    /// the `undefined` value.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    /// Creates or replaces a binding in this frame, without consulting
    /// parents. This is `let` and parameter binding.
    pub fn define(&self, name: &str, value: Value) {
        self.vars.borrow_mut().insert(name.to_string(), value);
    }

    /// Assigns to the nearest existing binding of `name`; if no frame binds
    /// it, creates a global binding.
    pub fn assign(&self, name: &str, value: Value) {
        if self.vars.borrow().contains_key(name) || self.parent.is_none() {
            self.vars.borrow_mut().insert(name.to_string(), value);
            return;
        }
        if let Some(parent) = &self.parent {
            parent.assign(name, value);
        }
    }

    /// The names bound directly in this frame, sorted. Used by the REPL's
    /// `.vars` command.
    #[must_use]
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vars.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

/// The code half of a closure: a single expression for `lambda` forms, a
/// statement list for `fn` definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum ClosureBody {
    /// A `lambda (…) -> expr end` body.
    Expr(Expr),
    /// A `fn name(…) { … }` body.
    Block(Vec<Statement>),
}

/// A function value: code together with the frame that was current at its
/// construction site.
///
/// Calling the closure creates a new child of the captured frame and binds
/// parameters there, which is what makes assignment inside a lambda mutate
/// the captured binding.
pub struct Closure {
    /// The function name for `fn` definitions, `None` for lambdas.
    pub name:   Option<String>,
    /// Ordered parameter names.
    pub params: Vec<String>,
    /// The body to run on call.
    pub body:   ClosureBody,
    /// The captured frame.
    pub env:    Rc<Frame>,
}

/// The captured frame is skipped: a closure defined in a frame that also
/// binds it would otherwise recurse forever.
impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closure")
         .field("name", &self.name)
         .field("params", &self.params)
         .finish_non_exhaustive()
    }
}
