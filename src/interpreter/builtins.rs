use std::collections::HashSet;

use crate::{
    analyzer::types::TypeKind,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::{core::Value, env::Frame},
    },
};

/// Coercion and reflection builtins (`long`, `str`, `type`, ...).
pub mod coerce;
/// I/O and time builtins (`print`, `now`, `rand`, ...).
pub mod io;
/// Math builtins (`math.sqrt`, `math.pow`, ...).
pub mod math;
/// Collection builtins (`range`, `seq.list`, `map`, `reduce`, ...).
pub mod seq;
/// String builtins (`string.length`, `string.split`, ...).
pub mod string;

/// Type alias for builtin function handlers.
///
/// A builtin receives the evaluation context (so higher-order builtins can
/// call user closures), a slice of evaluated argument values and the call's
/// line number.
pub type BuiltinFn = fn(&mut Context, &[Value], usize) -> EvalResult<Value>;

/// Specifies the allowed number of arguments for a builtin.
///
/// - `Exact(n)` means the builtin must receive exactly `n` arguments.
/// - `OneOf(slice)` means the builtin accepts any arity listed in `slice`.
/// - `AtLeast(n)` means the builtin accepts `n` or more arguments.
#[derive(Debug, Clone, Copy)]
pub enum Arity {
    Exact(usize),
    OneOf(&'static [usize]),
    AtLeast(usize),
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity
    /// constraint.
    ///
    /// Returns `true` if the count is permitted, `false` otherwise.
    #[must_use]
    pub fn check(&self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == *m,
            Self::OneOf(arr) => arr.contains(&n),
            Self::AtLeast(m) => n >= *m,
        }
    }
}

/// One entry of the builtin catalog.
///
/// The catalog is flat: dotted names such as `string.endsWith` are single
/// keys, dispatched through the interpreter's flattened-name callee lookup.
/// `returns` seeds the static analyzer's symbol table.
#[derive(Debug)]
pub struct BuiltinDef {
    /// The (possibly dotted) name.
    pub name:    &'static str,
    /// The allowed argument counts.
    pub arity:   Arity,
    /// The return kind reported to the static analyzer.
    pub returns: TypeKind,
    /// The implementation.
    pub func:    BuiltinFn,
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - an arity specification,
/// - the return kind the analyzer assumes,
/// - a function pointer implementing the builtin.
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                returns: $returns:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        /// The full builtin catalog, in registration order.
        pub static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, returns: $returns, func: $func },
            )*
        ];
        /// The names of every builtin, dotted names included.
        pub const BUILTIN_NAMES: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    // I/O and time.
    "print"   => { arity: Arity::Exact(1), returns: TypeKind::Nil, func: io::print },
    "println" => { arity: Arity::OneOf(&[0, 1]), returns: TypeKind::Nil, func: io::println },
    "p"       => { arity: Arity::Exact(1), returns: TypeKind::Any, func: io::p },
    "sysdate" => { arity: Arity::Exact(0), returns: TypeKind::Str, func: io::sysdate },
    "now"     => { arity: Arity::Exact(0), returns: TypeKind::Long, func: io::now },
    "rand"    => { arity: Arity::OneOf(&[0, 1]), returns: TypeKind::Double, func: io::rand },

    // Coercion and reflection.
    "long"     => { arity: Arity::Exact(1), returns: TypeKind::Long, func: coerce::long },
    "double"   => { arity: Arity::Exact(1), returns: TypeKind::Double, func: coerce::double },
    "boolean"  => { arity: Arity::Exact(1), returns: TypeKind::Bool, func: coerce::boolean },
    "str"      => { arity: Arity::Exact(1), returns: TypeKind::Str, func: coerce::str },
    "identity" => { arity: Arity::Exact(1), returns: TypeKind::Any, func: coerce::identity },
    "type"     => { arity: Arity::Exact(1), returns: TypeKind::Str, func: coerce::type_of },
    "is_def"   => { arity: Arity::Exact(1), returns: TypeKind::Bool, func: coerce::is_def },
    "cmp"      => { arity: Arity::Exact(2), returns: TypeKind::Long, func: coerce::cmp },

    // Collections.
    "range"    => { arity: Arity::OneOf(&[2, 3]), returns: TypeKind::List, func: seq::range },
    "tuple"    => { arity: Arity::AtLeast(0), returns: TypeKind::List, func: seq::tuple },
    "min"      => { arity: Arity::AtLeast(1), returns: TypeKind::Any, func: |ctx, args, line| seq::min_max("min", ctx, args, line) },
    "max"      => { arity: Arity::AtLeast(1), returns: TypeKind::Any, func: |ctx, args, line| seq::min_max("max", ctx, args, line) },
    "count"    => { arity: Arity::Exact(1), returns: TypeKind::Long, func: seq::count },
    "is_empty" => { arity: Arity::Exact(1), returns: TypeKind::Bool, func: seq::is_empty },
    "seq.list" => { arity: Arity::AtLeast(0), returns: TypeKind::List, func: seq::list },
    "seq.set"  => { arity: Arity::AtLeast(0), returns: TypeKind::Set, func: seq::set },
    "seq.map"  => { arity: Arity::AtLeast(0), returns: TypeKind::Map, func: seq::map_of },
    "seq.add"  => { arity: Arity::OneOf(&[2, 3]), returns: TypeKind::Any, func: seq::add },
    "seq.get"  => { arity: Arity::Exact(2), returns: TypeKind::Any, func: seq::get },
    "seq.contains_key" => { arity: Arity::Exact(2), returns: TypeKind::Bool, func: seq::contains_key },
    "seq.remove" => { arity: Arity::Exact(2), returns: TypeKind::Any, func: seq::remove },
    "map"      => { arity: Arity::Exact(2), returns: TypeKind::List, func: seq::map_fn },
    "filter"   => { arity: Arity::Exact(2), returns: TypeKind::List, func: seq::filter },
    "reduce"   => { arity: Arity::Exact(3), returns: TypeKind::Any, func: seq::reduce },
    "include"  => { arity: Arity::Exact(2), returns: TypeKind::Bool, func: seq::include },
    "sort"     => { arity: Arity::Exact(1), returns: TypeKind::List, func: seq::sort },
    "reverse"  => { arity: Arity::Exact(1), returns: TypeKind::List, func: seq::reverse },
    "seq.eq"   => { arity: Arity::Exact(1), returns: TypeKind::Any, func: |ctx, args, line| seq::predicate("seq.eq", ctx, args, line) },
    "seq.neq"  => { arity: Arity::Exact(1), returns: TypeKind::Any, func: |ctx, args, line| seq::predicate("seq.neq", ctx, args, line) },
    "seq.gt"   => { arity: Arity::Exact(1), returns: TypeKind::Any, func: |ctx, args, line| seq::predicate("seq.gt", ctx, args, line) },
    "seq.ge"   => { arity: Arity::Exact(1), returns: TypeKind::Any, func: |ctx, args, line| seq::predicate("seq.ge", ctx, args, line) },
    "seq.lt"   => { arity: Arity::Exact(1), returns: TypeKind::Any, func: |ctx, args, line| seq::predicate("seq.lt", ctx, args, line) },
    "seq.le"   => { arity: Arity::Exact(1), returns: TypeKind::Any, func: |ctx, args, line| seq::predicate("seq.le", ctx, args, line) },
    "seq.nil"  => { arity: Arity::Exact(0), returns: TypeKind::Any, func: |ctx, args, line| seq::predicate("seq.nil", ctx, args, line) },
    "seq.exists" => { arity: Arity::Exact(0), returns: TypeKind::Any, func: |ctx, args, line| seq::predicate("seq.exists", ctx, args, line) },

    // Strings.
    "string.length"     => { arity: Arity::Exact(1), returns: TypeKind::Long, func: string::length },
    "string.contains"   => { arity: Arity::Exact(2), returns: TypeKind::Bool, func: string::contains },
    "string.startsWith" => { arity: Arity::Exact(2), returns: TypeKind::Bool, func: string::starts_with },
    "string.endsWith"   => { arity: Arity::Exact(2), returns: TypeKind::Bool, func: string::ends_with },
    "string.substring"  => { arity: Arity::OneOf(&[2, 3]), returns: TypeKind::Str, func: string::substring },
    "string.indexOf"    => { arity: Arity::Exact(2), returns: TypeKind::Long, func: string::index_of },
    "string.split"      => { arity: Arity::OneOf(&[2, 3]), returns: TypeKind::List, func: string::split },
    "string.join"       => { arity: Arity::OneOf(&[1, 2]), returns: TypeKind::Str, func: string::join },
    "string.replace_first" => { arity: Arity::Exact(3), returns: TypeKind::Str, func: string::replace_first },
    "string.replace_all"   => { arity: Arity::Exact(3), returns: TypeKind::Str, func: string::replace_all },

    // Math.
    "math.abs"   => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::abs },
    "math.round" => { arity: Arity::Exact(1), returns: TypeKind::Long, func: math::round },
    "math.floor" => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::floor },
    "math.ceil"  => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::ceil },
    "math.sqrt"  => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::sqrt },
    "math.pow"   => { arity: Arity::Exact(2), returns: TypeKind::Double, func: math::pow },
    "math.log"   => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::log },
    "math.log10" => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::log10 },
    "math.sin"   => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::sin },
    "math.cos"   => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::cos },
    "math.tan"   => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::tan },
    "math.asin"  => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::asin },
    "math.acos"  => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::acos },
    "math.atan"  => { arity: Arity::Exact(1), returns: TypeKind::Double, func: math::atan },
}

/// Merges the whole catalog into a frame. Called once per context on the
/// global frame.
pub fn install(frame: &Frame) {
    for def in BUILTIN_TABLE {
        frame.define(def.name, Value::Builtin(def));
    }
}

/// Whether `name` is a catalog entry.
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// The catalog's name set, owned. Used by the pending-execution runtime to
/// exclude builtins from free-variable discovery.
#[must_use]
pub fn builtin_identifiers() -> HashSet<String> {
    BUILTIN_NAMES.iter().map(|name| (*name).to_string()).collect()
}
