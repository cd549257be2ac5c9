use std::fmt;

use crate::interner::{self, Symbol};
use crate::types::ty::{TyVarId, Type};

/// Errors from the type system.
///
/// `Unification` and `Occurs` are recoverable: the candidate derivation
/// that triggered them is simply not produced. `OntologyCycle` is a
/// setup-time fault in the grammar and aborts ontology construction.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    /// `child` cannot sit below `parent` in the subtype order.
    Unification { parent: Type, child: Type },

    /// Binding the variable would build an infinite type.
    Occurs { var: TyVarId, ty: Type },

    /// The requested subtype edge would close a cycle in the ontology.
    OntologyCycle { parent: Symbol, child: Symbol },

    /// A variable occurrence with no enclosing binder.
    UnboundVariable { name: Symbol },

    /// An application whose predicate type is not a function.
    NotFunction { found: Type },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Unification { parent, child } => {
                write!(f, "cannot unify {} below {}", child, parent)
            }
            TypeError::Occurs { var, ty } => {
                write!(f, "infinite type: ?{} occurs in {}", var.0, ty)
            }
            TypeError::OntologyCycle { parent, child } => {
                write!(
                    f,
                    "subtype edge {} -> {} would create a cycle",
                    interner::resolve(*parent),
                    interner::resolve(*child),
                )
            }
            TypeError::UnboundVariable { name } => {
                write!(f, "variable not in scope: {}", interner::resolve(*name))
            }
            TypeError::NotFunction { found } => {
                write!(f, "applied a non-function of type {}", found)
            }
        }
    }
}

impl std::error::Error for TypeError {}
