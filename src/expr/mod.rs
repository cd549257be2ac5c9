mod reduce;
pub mod simplify;

pub use simplify::{semantic_eq, simplify};

use std::collections::HashSet;
use std::fmt;

use crate::interner::{self, Symbol};
use crate::types::env::TypeEnv;
use crate::types::ty::Type;

/// A lambda-calculus logical form.
///
/// Trees are exclusively owned: combining two expressions clones them, and
/// reduction builds a fresh tree. The `ty` slots start out `None` and are
/// filled in place by inference; declared constant types are always
/// present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A bound variable occurrence, e.g. `$0`.
    Var { name: Symbol, ty: Option<Type> },

    /// A constant with its declared type, e.g. `capital:<city,t>`.
    Const { name: Symbol, ty: Type },

    /// Application of a predicate to one or more arguments.
    App {
        pred: Box<Expr>,
        args: Vec<Expr>,
        ty: Option<Type>,
    },

    /// Lambda abstraction with a declared binder type.
    Lambda {
        var: Symbol,
        var_ty: Type,
        body: Box<Expr>,
        ty: Option<Type>,
    },
}

impl Expr {
    pub fn var(name: &str) -> Expr {
        Expr::Var {
            name: interner::intern(name),
            ty: None,
        }
    }

    pub fn constant(name: &str, ty: Type) -> Expr {
        Expr::Const {
            name: interner::intern(name),
            ty,
        }
    }

    pub fn app(pred: Expr, args: Vec<Expr>) -> Expr {
        Expr::App {
            pred: Box::new(pred),
            args,
            ty: None,
        }
    }

    pub fn lambda(var: &str, var_ty: Type, body: Expr) -> Expr {
        Expr::Lambda {
            var: interner::intern(var),
            var_ty,
            body: Box::new(body),
            ty: None,
        }
    }

    /// The node's type: declared for constants, inferred for the rest.
    pub fn ty(&self) -> Option<&Type> {
        match self {
            Expr::Var { ty, .. } | Expr::App { ty, .. } | Expr::Lambda { ty, .. } => ty.as_ref(),
            Expr::Const { ty, .. } => Some(ty),
        }
    }

    /// Render the fully curried type signature, resolving variables
    /// through `env`. Un-inferred nodes show as `?`. Debugging aid.
    pub fn fulltype(&self, env: &TypeEnv) -> String {
        match self {
            Expr::Lambda { var_ty, body, .. } => {
                format!("<{},{}>", env.resolve(var_ty), body.fulltype(env))
            }
            other => match other.ty() {
                Some(ty) => env.resolve(ty).to_string(),
                None => "?".to_string(),
            },
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var { name, .. } => write!(f, "{}", interner::resolve(*name)),
            Expr::Const { name, ty } => write!(f, "{}:{}", interner::resolve(*name), ty),
            Expr::App { pred, args, .. } => {
                write!(f, "({}", pred)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Lambda {
                var, var_ty, body, ..
            } => {
                write!(f, "(lambda {}:{} {})", interner::resolve(*var), var_ty, body)
            }
        }
    }
}

/// The constant vocabulary of an expression: the set of constant leaves
/// and the set of unordered adjacency pairs among direct constant children
/// of a single application. Forced decoding uses profiles as a
/// necessary-condition prune against the gold expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantProfile {
    pub unigrams: HashSet<Symbol>,
    pub bigrams: HashSet<(Symbol, Symbol)>,
}

impl ConstantProfile {
    /// Could `candidate` still grow into an expression with this profile?
    /// True when the candidate's constants and adjacencies are all drawn
    /// from this profile. Structurally identical expressions always pass.
    pub fn allows(&self, candidate: &Expr) -> bool {
        let profile = collect_constants(candidate);
        profile.unigrams.is_subset(&self.unigrams) && profile.bigrams.is_subset(&self.bigrams)
    }
}

/// Unordered symbol pair with a deterministic orientation.
fn bigram(a: Symbol, b: Symbol) -> (Symbol, Symbol) {
    if interner::resolve(a) <= interner::resolve(b) {
        (a, b)
    } else {
        (b, a)
    }
}

/// Extract the constant profile of an expression.
///
/// Adjacency is deliberately conservative: within one application, the
/// predicate constant pairs with each directly-constant argument, and
/// consecutive constant arguments pair with each other. Nested structure
/// contributes through recursion only.
pub fn collect_constants(expr: &Expr) -> ConstantProfile {
    let mut profile = ConstantProfile::default();
    walk_constants(expr, &mut profile);
    profile
}

fn walk_constants(expr: &Expr, profile: &mut ConstantProfile) {
    match expr {
        Expr::Var { .. } => {}
        Expr::Const { name, .. } => {
            profile.unigrams.insert(*name);
        }
        Expr::Lambda { body, .. } => walk_constants(body, profile),
        Expr::App { pred, args, .. } => {
            let head = match pred.as_ref() {
                Expr::Const { name, .. } => Some(*name),
                _ => None,
            };
            let direct: Vec<Option<Symbol>> = args
                .iter()
                .map(|arg| match arg {
                    Expr::Const { name, .. } => Some(*name),
                    _ => None,
                })
                .collect();
            if let Some(h) = head {
                for c in direct.iter().flatten() {
                    profile.bigrams.insert(bigram(h, *c));
                }
            }
            for pair in direct.windows(2) {
                if let (Some(a), Some(b)) = (pair[0], pair[1]) {
                    profile.bigrams.insert(bigram(a, b));
                }
            }
            walk_constants(pred, profile);
            for arg in args {
                walk_constants(arg, profile);
            }
        }
    }
}
