use std::collections::{HashMap, HashSet};

use crate::interner::{self, Symbol};
use crate::types::error::TypeError;
use crate::types::ty::Type;

/// The subtype ontology: a DAG of atomic type names rooted at `Type::Top`.
///
/// Built once from the grammar, read-only afterwards. An explicit registry
/// object passed by reference, so independent parses (and worker threads)
/// can share one instance or own separate ones.
#[derive(Debug, Default)]
pub struct Ontology {
    /// parent name -> direct child names
    children: HashMap<Symbol, HashSet<Symbol>>,
    known: HashSet<Symbol>,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an atomic type name, implicitly a child of `Top`.
    /// Idempotent; the same name always denotes the same type.
    pub fn register(&mut self, name: &str) -> Type {
        let sym = interner::intern(name);
        self.known.insert(sym);
        Type::Atomic(sym)
    }

    pub fn is_registered(&self, name: Symbol) -> bool {
        self.known.contains(&name)
    }

    /// Add a subtype edge: `child` becomes substitutable for `parent`.
    /// Both names are registered if they were not already. Rejects an edge
    /// that would close a cycle.
    pub fn add_subtype(&mut self, parent: &str, child: &str) -> Result<(), TypeError> {
        let p = interner::intern(parent);
        let c = interner::intern(child);
        if p == c || self.reachable(c, p) {
            return Err(TypeError::OntologyCycle { parent: p, child: c });
        }
        self.known.insert(p);
        self.known.insert(c);
        self.children.entry(p).or_default().insert(c);
        Ok(())
    }

    /// Is `target` reachable from `from` through child edges?
    fn reachable(&self, from: Symbol, target: Symbol) -> bool {
        if from == target {
            return true;
        }
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(cur) = stack.pop() {
            if !seen.insert(cur) {
                continue;
            }
            if let Some(kids) = self.children.get(&cur) {
                if kids.contains(&target) {
                    return true;
                }
                stack.extend(kids.iter().copied());
            }
        }
        false
    }

    fn atom_subtype(&self, child: Symbol, parent: Symbol) -> bool {
        child == parent || self.reachable(parent, child)
    }

    /// The `<=` test over concrete types: reflexive, `Top` above
    /// everything, DAG reachability for atomics, pairwise recursion for
    /// lists and complexes. Argument positions recurse in the same
    /// orientation; this grammar never needs contravariance.
    pub fn is_subtype(&self, child: &Type, parent: &Type) -> bool {
        match (child, parent) {
            _ if child == parent => true,
            (_, Type::Top) => true,
            (Type::Atomic(c), Type::Atomic(p)) => self.atom_subtype(*c, *p),
            (Type::List(c), Type::List(p)) => self.is_subtype(c, p),
            (Type::Complex(cf, ct), Type::Complex(pf, pt)) => {
                self.is_subtype(cf, pf) && self.is_subtype(ct, pt)
            }
            _ => false,
        }
    }

    /// The more specific of two comparable concrete types, recursing
    /// componentwise through lists and complexes. `None` when the types
    /// are incomparable.
    pub fn meet(&self, a: &Type, b: &Type) -> Option<Type> {
        if self.is_subtype(a, b) {
            return Some(a.clone());
        }
        if self.is_subtype(b, a) {
            return Some(b.clone());
        }
        match (a, b) {
            (Type::List(ae), Type::List(be)) => Some(Type::list(self.meet(ae, be)?)),
            (Type::Complex(af, at), Type::Complex(bf, bt)) => Some(Type::complex(
                self.meet(af, bf)?,
                self.meet(at, bt)?,
            )),
            _ => None,
        }
    }
}
