use crate::types::env::{Binding, TypeEnv};
use crate::types::error::TypeError;
use crate::types::ontology::Ontology;
use crate::types::ty::{TyVarId, Type};

/// Unify `child` below `parent` in the subtype order, tightening variable
/// bounds where needed.
///
/// All-or-nothing: on failure the environment is rewound to exactly the
/// state it had before the call, so callers may probe alternatives freely.
pub fn unify_subtype(
    ont: &Ontology,
    env: &mut TypeEnv,
    parent: &Type,
    child: &Type,
) -> Result<(), TypeError> {
    let mark = env.mark();
    unify(ont, env, parent, child).map_err(|err| {
        env.undo_to(mark);
        err
    })
}

fn unify(ont: &Ontology, env: &mut TypeEnv, parent: &Type, child: &Type) -> Result<(), TypeError> {
    match (parent, child) {
        (Type::Var(p), Type::Var(c)) => union_vars(ont, env, *p, *c),
        (Type::Var(v), other) | (other, Type::Var(v)) => tighten(ont, env, *v, other),
        (Type::Top, _) => Ok(()),
        (Type::Atomic(_), Type::Atomic(_)) => {
            if ont.is_subtype(child, parent) {
                Ok(())
            } else {
                Err(mismatch(parent, child))
            }
        }
        (Type::List(pe), Type::List(ce)) => unify(ont, env, pe, ce),
        (Type::Complex(pf, pt), Type::Complex(cf, ct)) => {
            unify(ont, env, pf, cf)?;
            unify(ont, env, pt, ct)
        }
        _ => Err(mismatch(parent, child)),
    }
}

fn mismatch(parent: &Type, child: &Type) -> TypeError {
    TypeError::Unification {
        parent: parent.clone(),
        child: child.clone(),
    }
}

/// Constrain a variable against a concrete type: keep the more specific of
/// the current bound and the new constraint, fail when they cannot share a
/// future value. The tightest constraint seen so far always wins.
fn tighten(ont: &Ontology, env: &mut TypeEnv, var: TyVarId, other: &Type) -> Result<(), TypeError> {
    let root = env.find(var);
    if occurs_in(env, root, other) {
        return Err(TypeError::Occurs {
            var: root,
            ty: other.clone(),
        });
    }
    let bound = match env.probe(root) {
        Some(b) => b.clone(),
        None => {
            env.bind(root, Binding::Bound(other.clone()));
            return Ok(());
        }
    };

    // New constraint at or below the current bound: tighten to it.
    let mark = env.mark();
    if unify(ont, env, &bound, other).is_ok() {
        env.bind(root, Binding::Bound(other.clone()));
        return Ok(());
    }
    env.undo_to(mark);

    // Current bound already at or below the constraint: keep it.
    let mark = env.mark();
    if unify(ont, env, other, &bound).is_ok() {
        return Ok(());
    }
    env.undo_to(mark);

    Err(mismatch(other, &bound))
}

/// Union two variable classes, reconciling their bounds to the more
/// specific one.
fn union_vars(ont: &Ontology, env: &mut TypeEnv, p: TyVarId, c: TyVarId) -> Result<(), TypeError> {
    let rp = env.find(p);
    let rc = env.find(c);
    if rp == rc {
        return Ok(());
    }
    let bp = env.probe(rp).cloned();
    let bc = env.probe(rc).cloned();
    if let Some(b) = &bp {
        if occurs_in(env, rc, b) {
            return Err(TypeError::Occurs { var: rc, ty: b.clone() });
        }
    }
    if let Some(b) = &bc {
        if occurs_in(env, rp, b) {
            return Err(TypeError::Occurs { var: rp, ty: b.clone() });
        }
    }
    match (bp, bc) {
        (_, None) => {
            env.bind(rc, Binding::Link(rp));
            Ok(())
        }
        (None, Some(b)) => {
            env.bind(rc, Binding::Link(rp));
            env.bind(rp, Binding::Bound(b));
            Ok(())
        }
        (Some(bp), Some(bc)) => {
            let mark = env.mark();
            let merged = if unify(ont, env, &bp, &bc).is_ok() {
                bc
            } else {
                env.undo_to(mark);
                let mark = env.mark();
                if unify(ont, env, &bc, &bp).is_ok() {
                    bp
                } else {
                    env.undo_to(mark);
                    return Err(mismatch(&bp, &bc));
                }
            };
            env.bind(rc, Binding::Link(rp));
            env.bind(rp, Binding::Bound(merged));
            Ok(())
        }
    }
}

/// Does `var`'s class occur anywhere inside `ty`, looking through bounds?
fn occurs_in(env: &TypeEnv, var: TyVarId, ty: &Type) -> bool {
    match ty {
        Type::Var(v) => {
            let root = env.find(*v);
            if root == var {
                return true;
            }
            match env.probe(root) {
                Some(bound) => {
                    let bound = bound.clone();
                    occurs_in(env, var, &bound)
                }
                None => false,
            }
        }
        Type::List(elem) => occurs_in(env, var, elem),
        Type::Complex(from, to) => occurs_in(env, var, from) || occurs_in(env, var, to),
        Type::Top | Type::Atomic(_) => false,
    }
}
