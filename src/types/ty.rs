use std::fmt;

use crate::interner::{self, Symbol};

/// Identifier of a unification variable. The binding itself lives in the
/// `TypeEnv` slot table, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TyVarId(pub u32);

/// Semantic type of a logical-form fragment.
///
/// Types are plain values; since atomic names are interned symbols,
/// structural equality gives the "same type requested twice is the same
/// type" guarantee without a separate interning table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Root of the subtype ontology; every type unifies below it.
    Top,

    /// Named ground type from the ontology: `e`, `t`, `i`, ...
    Atomic(Symbol),

    /// Variadic argument position, written `T*`. A parameter of this shape
    /// absorbs every remaining argument of an application.
    List(Box<Type>),

    /// Function type, written `<from,to>`. Multi-argument functions curry
    /// into nested single-argument complexes.
    Complex(Box<Type>, Box<Type>),

    /// Unification variable, written `?n`.
    Var(TyVarId),
}

impl Type {
    pub fn atomic(name: &str) -> Type {
        Type::Atomic(interner::intern(name))
    }

    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }

    pub fn complex(from: Type, to: Type) -> Type {
        Type::Complex(Box::new(from), Box::new(to))
    }

    /// Number of argument positions before the curried chain bottoms out.
    /// A `List` parameter counts once regardless of how many arguments it
    /// will absorb.
    pub fn arity(&self) -> usize {
        match self {
            Type::Complex(_, to) => 1 + to.arity(),
            _ => 0,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Type::Var(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Top => write!(f, "top"),
            Type::Atomic(name) => write!(f, "{}", interner::resolve(*name)),
            Type::List(elem) => write!(f, "{}*", elem),
            Type::Complex(from, to) => write!(f, "<{},{}>", from, to),
            Type::Var(v) => write!(f, "?{}", v.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_surface_syntax() {
        let et = Type::complex(Type::atomic("e"), Type::atomic("t"));
        assert_eq!(et.to_string(), "<e,t>");

        let conj = Type::complex(Type::list(Type::atomic("t")), Type::atomic("t"));
        assert_eq!(conj.to_string(), "<t*,t>");

        assert_eq!(Type::Var(TyVarId(3)).to_string(), "?3");
        assert_eq!(Type::Top.to_string(), "top");
    }

    #[test]
    fn test_structural_identity() {
        assert_eq!(Type::atomic("e"), Type::atomic("e"));
        assert_eq!(
            Type::complex(Type::atomic("e"), Type::atomic("t")),
            Type::complex(Type::atomic("e"), Type::atomic("t")),
        );
        assert_ne!(Type::atomic("e"), Type::atomic("t"));
    }

    #[test]
    fn test_arity_of_curried_chain() {
        let ty = Type::complex(
            Type::atomic("e"),
            Type::complex(Type::atomic("e"), Type::atomic("t")),
        );
        assert_eq!(ty.arity(), 2);
        assert_eq!(Type::atomic("e").arity(), 0);
    }
}
