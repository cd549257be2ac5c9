use crate::expr::Expr;
use crate::interner::Symbol;

impl Expr {
    /// Apply one argument: substitute it for this lambda's binder in a
    /// copy of the body. Applying a non-lambda wraps it in an application
    /// instead, leaving normalization to [`Expr::reduce`].
    pub fn reduce_with(&self, arg: &Expr) -> Expr {
        match self {
            Expr::Lambda { var, body, .. } => substitute(body, *var, arg),
            other => Expr::App {
                pred: Box::new(other.clone()),
                args: vec![arg.clone()],
                ty: None,
            },
        }
    }

    /// Fully beta-normalize, returning a fresh tree. Inferred `ty` slots
    /// on rebuilt nodes reset to `None`; re-inference is the caller's job.
    /// Idempotent on normal forms.
    pub fn reduce(&self) -> Expr {
        match self {
            Expr::App { pred, args, .. } => {
                let mut fun = pred.reduce();
                let mut leftover = Vec::new();
                for arg in args {
                    let arg = arg.reduce();
                    fun = match fun {
                        Expr::Lambda { var, body, .. } => substitute(&body, var, &arg).reduce(),
                        other => {
                            leftover.push(arg);
                            other
                        }
                    };
                }
                if leftover.is_empty() {
                    fun
                } else {
                    Expr::App {
                        pred: Box::new(fun),
                        args: leftover,
                        ty: None,
                    }
                }
            }
            Expr::Lambda {
                var, var_ty, body, ..
            } => Expr::Lambda {
                var: *var,
                var_ty: var_ty.clone(),
                body: Box::new(body.reduce()),
                ty: None,
            },
            leaf => leaf.clone(),
        }
    }
}

/// Replace free occurrences of `var` with `value`. Binders shadowing `var`
/// stop the descent, so inner same-named scopes stay intact.
fn substitute(body: &Expr, var: Symbol, value: &Expr) -> Expr {
    match body {
        Expr::Var { name, .. } if *name == var => value.clone(),
        Expr::Var { .. } | Expr::Const { .. } => body.clone(),
        Expr::App { pred, args, .. } => Expr::App {
            pred: Box::new(substitute(pred, var, value)),
            args: args.iter().map(|arg| substitute(arg, var, value)).collect(),
            ty: None,
        },
        Expr::Lambda { var: binder, .. } if *binder == var => body.clone(),
        Expr::Lambda {
            var: binder,
            var_ty,
            body: inner,
            ..
        } => Expr::Lambda {
            var: *binder,
            var_ty: var_ty.clone(),
            body: Box::new(substitute(inner, var, value)),
            ty: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner;
    use crate::types::ty::Type;

    fn has_free_var(expr: &Expr, var: Symbol) -> bool {
        match expr {
            Expr::Var { name, .. } => *name == var,
            Expr::Const { .. } => false,
            Expr::App { pred, args, .. } => {
                has_free_var(pred, var) || args.iter().any(|a| has_free_var(a, var))
            }
            Expr::Lambda { var: binder, body, .. } => *binder != var && has_free_var(body, var),
        }
    }

    #[test]
    fn test_reduce_with_eliminates_binder() {
        // (lambda $0:e (capital:<e,t> $0)) applied to austin:e
        let body = Expr::app(
            Expr::constant("capital", Type::complex(Type::atomic("e"), Type::atomic("t"))),
            vec![Expr::var("$0")],
        );
        let lam = Expr::lambda("$0", Type::atomic("e"), body);
        let result = lam.reduce_with(&Expr::constant("austin", Type::atomic("e")));
        assert!(!has_free_var(&result, interner::intern("$0")));
        assert_eq!(result.to_string(), "(capital:<e,t> austin:e)");
    }

    #[test]
    fn test_reduce_saturated_application() {
        let lam = Expr::lambda(
            "$0",
            Type::atomic("e"),
            Expr::app(
                Expr::constant("capital", Type::complex(Type::atomic("e"), Type::atomic("t"))),
                vec![Expr::var("$0")],
            ),
        );
        let app = Expr::app(lam, vec![Expr::constant("austin", Type::atomic("e"))]);
        assert_eq!(app.reduce().to_string(), "(capital:<e,t> austin:e)");
    }

    #[test]
    fn test_reduce_applies_arguments_in_sequence() {
        // ((lambda $0:e (lambda $1:e (pair:<e,<e,t>> $0 $1))) a:e b:e)
        let inner = Expr::lambda(
            "$1",
            Type::atomic("e"),
            Expr::app(
                Expr::constant(
                    "pair",
                    Type::complex(
                        Type::atomic("e"),
                        Type::complex(Type::atomic("e"), Type::atomic("t")),
                    ),
                ),
                vec![Expr::var("$0"), Expr::var("$1")],
            ),
        );
        let outer = Expr::lambda("$0", Type::atomic("e"), inner);
        let app = Expr::app(
            outer,
            vec![
                Expr::constant("a", Type::atomic("e")),
                Expr::constant("b", Type::atomic("e")),
            ],
        );
        assert_eq!(app.reduce().to_string(), "(pair:<e,<e,t>> a:e b:e)");
    }

    #[test]
    fn test_reduce_is_idempotent_on_normal_forms() {
        let normal = Expr::lambda(
            "$0",
            Type::atomic("e"),
            Expr::app(
                Expr::constant("capital", Type::complex(Type::atomic("e"), Type::atomic("t"))),
                vec![Expr::var("$0")],
            ),
        );
        let once = normal.reduce();
        let twice = once.reduce();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_shadowed_binder_is_untouched() {
        // (lambda $0:e (lambda $0:e $0)) applied to a:e keeps the inner $0.
        let inner = Expr::lambda("$0", Type::atomic("e"), Expr::var("$0"));
        let outer = Expr::lambda("$0", Type::atomic("e"), inner);
        let result = outer.reduce_with(&Expr::constant("a", Type::atomic("e")));
        assert_eq!(result.to_string(), "(lambda $0:e $0)");
    }

    #[test]
    fn test_substitution_exposes_new_redex() {
        // ((lambda $f:<e,t> ($f austin:e)) (lambda $0:e (big:<e,t> $0)))
        let applier = Expr::lambda(
            "$f",
            Type::complex(Type::atomic("e"), Type::atomic("t")),
            Expr::app(Expr::var("$f"), vec![Expr::constant("austin", Type::atomic("e"))]),
        );
        let pred = Expr::lambda(
            "$0",
            Type::atomic("e"),
            Expr::app(
                Expr::constant("big", Type::complex(Type::atomic("e"), Type::atomic("t"))),
                vec![Expr::var("$0")],
            ),
        );
        let app = Expr::app(applier, vec![pred]);
        assert_eq!(app.reduce().to_string(), "(big:<e,t> austin:e)");
    }
}
