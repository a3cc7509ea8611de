/// The coarse type lattice used by the analyzer.
///
/// `Any` is the top: it is compatible with everything and absorbs unknown
/// results, which is how the analyzer recovers from its own findings
/// without cascading noise. `Void` is the kind of constructs that produce
/// no useful value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Long,
    Double,
    BigInt,
    Decimal,
    Str,
    Bool,
    Nil,
    Pattern,
    List,
    Map,
    Set,
    Void,
    Any,
}

impl TypeKind {
    /// Whether a value of this kind may appear where a boolean is required.
    #[must_use]
    pub const fn is_boolean_compatible(self) -> bool {
        matches!(self, Self::Bool | Self::Any)
    }

    /// Whether this kind participates in numeric promotion.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self,
                 Self::Long | Self::Double | Self::BigInt | Self::Decimal | Self::Any)
    }

    /// The result kind of an arithmetic operator over two numeric kinds:
    /// decimal wins, then double, then bigint, then long. An `Any` operand
    /// makes the result `Any`.
    #[must_use]
    pub const fn promote(self, other: Self) -> Self {
        match (self, other) {
            (Self::Any, _) | (_, Self::Any) => Self::Any,
            (Self::Decimal, _) | (_, Self::Decimal) => Self::Decimal,
            (Self::Double, _) | (_, Self::Double) => Self::Double,
            (Self::BigInt, _) | (_, Self::BigInt) => Self::BigInt,
            _ => Self::Long,
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Long => "long",
            Self::Double => "double",
            Self::BigInt => "bigint",
            Self::Decimal => "decimal",
            Self::Str => "string",
            Self::Bool => "boolean",
            Self::Nil => "nil",
            Self::Pattern => "pattern",
            Self::List => "list",
            Self::Map => "map",
            Self::Set => "set",
            Self::Void => "void",
            Self::Any => "any",
        };
        write!(f, "{name}")
    }
}
