use std::collections::HashMap;

use crate::expr::Expr;
use crate::interner::{self, Symbol};

/// Rewrite an expression into the canonical form used for semantic
/// comparison:
///
/// - full beta normalization;
/// - `and`/`or` argument lists flattened across nesting, deduplicated,
///   sorted, and collapsed when they shrink to one conjunct;
/// - `not (not x)` collapsed to `x`;
/// - binders renamed by binding depth, so alpha-variants coincide;
/// - inferred `ty` slots stripped (declared constant types stay, they are
///   part of a constant's identity).
pub fn simplify(expr: &Expr) -> Expr {
    let reduced = expr.reduce();
    let mut scope = HashMap::new();
    canonical(&reduced, 0, &mut scope)
}

/// Structural equality modulo `simplify`: the ground-truth comparison
/// against a gold meaning representation.
pub fn semantic_eq(a: &Expr, b: &Expr) -> bool {
    simplify(a) == simplify(b)
}

impl Expr {
    pub fn semantic_eq(&self, other: &Expr) -> bool {
        semantic_eq(self, other)
    }
}

fn depth_name(depth: usize) -> Symbol {
    interner::intern(&format!("#{}", depth))
}

fn canonical(expr: &Expr, depth: usize, scope: &mut HashMap<Symbol, Vec<usize>>) -> Expr {
    match expr {
        Expr::Var { name, .. } => {
            let renamed = scope
                .get(name)
                .and_then(|stack| stack.last())
                .map(|level| depth_name(*level))
                .unwrap_or(*name);
            Expr::Var {
                name: renamed,
                ty: None,
            }
        }

        Expr::Const { name, ty } => Expr::Const {
            name: *name,
            ty: ty.clone(),
        },

        Expr::Lambda {
            var, var_ty, body, ..
        } => {
            scope.entry(*var).or_default().push(depth);
            let body = canonical(body, depth + 1, scope);
            if let Some(stack) = scope.get_mut(var) {
                stack.pop();
            }
            Expr::Lambda {
                var: depth_name(depth),
                var_ty: var_ty.clone(),
                body: Box::new(body),
                ty: None,
            }
        }

        Expr::App { pred, args, .. } => {
            let pred = canonical(pred, depth, scope);
            let mut args: Vec<Expr> = args
                .iter()
                .map(|arg| canonical(arg, depth, scope))
                .collect();

            match head_const(&pred) {
                Some(op) if is_junctor(op) => {
                    // Flatten same-operator nesting, then sort and drop
                    // duplicate conjuncts.
                    let mut flat = Vec::new();
                    for arg in args {
                        match arg {
                            Expr::App {
                                pred: inner_pred,
                                args: inner_args,
                                ..
                            } if head_const(&inner_pred) == Some(op) => flat.extend(inner_args),
                            other => flat.push(other),
                        }
                    }
                    flat.sort_by_key(|child| child.to_string());
                    flat.dedup();
                    if flat.len() == 1 {
                        return flat.remove(0);
                    }
                    Expr::App {
                        pred: Box::new(pred),
                        args: flat,
                        ty: None,
                    }
                }
                Some(op) if interner::resolve(op) == "not" && args.len() == 1 => {
                    match args.remove(0) {
                        // not (not x) collapses to x.
                        Expr::App {
                            pred: inner_pred,
                            args: mut inner_args,
                            ..
                        } if head_const(&inner_pred) == Some(op) && inner_args.len() == 1 => {
                            inner_args.remove(0)
                        }
                        other => Expr::App {
                            pred: Box::new(pred),
                            args: vec![other],
                            ty: None,
                        },
                    }
                }
                _ => Expr::App {
                    pred: Box::new(pred),
                    args,
                    ty: None,
                },
            }
        }
    }
}

fn head_const(expr: &Expr) -> Option<Symbol> {
    match expr {
        Expr::Const { name, .. } => Some(*name),
        _ => None,
    }
}

fn is_junctor(name: Symbol) -> bool {
    let name = interner::resolve(name);
    name == "and" || name == "or"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ty::Type;

    fn t() -> Type {
        Type::atomic("t")
    }

    fn conj() -> Type {
        Type::complex(Type::list(t()), t())
    }

    fn p(name: &str) -> Expr {
        Expr::constant(name, t())
    }

    fn and(args: Vec<Expr>) -> Expr {
        Expr::app(Expr::constant("and", conj()), args)
    }

    fn not(arg: Expr) -> Expr {
        Expr::app(Expr::constant("not", Type::complex(t(), t())), vec![arg])
    }

    // ===== Commutativity and idempotence =====

    #[test]
    fn test_and_is_unordered() {
        assert!(semantic_eq(
            &and(vec![p("p"), p("q")]),
            &and(vec![p("q"), p("p")]),
        ));
    }

    #[test]
    fn test_duplicate_conjuncts_collapse() {
        assert!(semantic_eq(
            &and(vec![p("p"), p("q"), p("p")]),
            &and(vec![p("p"), p("q")]),
        ));
    }

    #[test]
    fn test_singleton_junction_collapses_to_child() {
        assert!(semantic_eq(&and(vec![p("p")]), &p("p")));
        // Duplicates first collapse to a singleton, then to the child.
        assert!(semantic_eq(&and(vec![p("p"), p("p")]), &p("p")));
    }

    #[test]
    fn test_nested_same_junctor_flattens() {
        assert!(semantic_eq(
            &and(vec![and(vec![p("p"), p("q")]), p("r")]),
            &and(vec![p("p"), p("q"), p("r")]),
        ));
    }

    #[test]
    fn test_and_or_stay_distinct() {
        let or = |args| Expr::app(Expr::constant("or", conj()), args);
        assert!(!semantic_eq(
            &and(vec![p("p"), p("q")]),
            &or(vec![p("p"), p("q")]),
        ));
    }

    #[test]
    fn test_double_negation_collapses() {
        assert!(semantic_eq(&not(not(p("p"))), &p("p")));
        assert!(!semantic_eq(&not(p("p")), &p("p")));
        assert!(semantic_eq(&not(not(not(p("p")))), &not(p("p"))));
    }

    // ===== Alpha equivalence =====

    #[test]
    fn test_alpha_variants_are_equal() {
        let pred = Type::complex(Type::atomic("e"), t());
        let a = Expr::lambda(
            "$0",
            Type::atomic("e"),
            Expr::app(Expr::constant("big", pred.clone()), vec![Expr::var("$0")]),
        );
        let b = Expr::lambda(
            "$7",
            Type::atomic("e"),
            Expr::app(Expr::constant("big", pred), vec![Expr::var("$7")]),
        );
        assert!(semantic_eq(&a, &b));
    }

    #[test]
    fn test_commuted_conjuncts_with_own_binders() {
        let pred = Type::complex(Type::atomic("e"), t());
        let lam = |v: &str, c: &str| {
            Expr::lambda(
                v,
                Type::atomic("e"),
                Expr::app(
                    Expr::constant(c, pred.clone()),
                    vec![Expr::var(v)],
                ),
            )
        };
        let both = |first: Expr, second: Expr| {
            Expr::app(
                Expr::constant("and", Type::complex(Type::list(pred.clone()), t())),
                vec![first, second],
            )
        };
        assert!(semantic_eq(
            &both(lam("$0", "big"), lam("$1", "wet")),
            &both(lam("$3", "wet"), lam("$4", "big")),
        ));
    }

    // ===== Equivalence-relation sanity =====

    #[test]
    fn test_reflexive_and_symmetric() {
        let e = and(vec![p("p"), not(p("q"))]);
        assert!(semantic_eq(&e, &e));
        let f = and(vec![not(p("q")), p("p")]);
        assert!(semantic_eq(&e, &f));
        assert!(semantic_eq(&f, &e));
    }

    #[test]
    fn test_beta_reduction_inside_comparison() {
        // ((lambda $0:e (big:<e,t> $0)) austin:e) equals (big:<e,t> austin:e)
        let pred = Type::complex(Type::atomic("e"), t());
        let redex = Expr::app(
            Expr::lambda(
                "$0",
                Type::atomic("e"),
                Expr::app(Expr::constant("big", pred.clone()), vec![Expr::var("$0")]),
            ),
            vec![Expr::constant("austin", Type::atomic("e"))],
        );
        let normal = Expr::app(
            Expr::constant("big", pred),
            vec![Expr::constant("austin", Type::atomic("e"))],
        );
        assert!(semantic_eq(&redex, &normal));
    }
}
