use std::collections::HashMap;

use crate::expr::Expr;
use crate::interner::Symbol;
use crate::types::env::TypeEnv;
use crate::types::error::TypeError;
use crate::types::ontology::Ontology;
use crate::types::ty::Type;
use crate::types::unify::unify_subtype;

/// Inference pass over one expression tree.
///
/// Threads the parse's shared `TypeEnv` and fills each node's `ty` slot in
/// place. Successful unifications persist in the environment; a failing
/// pass may leave bindings from the sub-terms it already visited, so
/// callers probing a candidate should bracket the call with
/// `env.mark()` / `env.undo_to()`.
pub struct InferCtx<'a> {
    pub ontology: &'a Ontology,
    pub env: &'a mut TypeEnv,
    /// Binder name -> shadow stack of declared types.
    scope: HashMap<Symbol, Vec<Type>>,
}

impl<'a> InferCtx<'a> {
    pub fn new(ontology: &'a Ontology, env: &'a mut TypeEnv) -> Self {
        InferCtx {
            ontology,
            env,
            scope: HashMap::new(),
        }
    }

    /// Infer the type of `expr`, annotating every node on the way up.
    pub fn infer(&mut self, expr: &mut Expr) -> Result<Type, TypeError> {
        match expr {
            Expr::Var { name, ty } => {
                let declared = self
                    .scope
                    .get(name)
                    .and_then(|stack| stack.last())
                    .cloned()
                    .ok_or(TypeError::UnboundVariable { name: *name })?;
                *ty = Some(declared.clone());
                Ok(declared)
            }

            // Declared constant types are ground truth, never re-inferred.
            Expr::Const { ty, .. } => Ok(ty.clone()),

            Expr::Lambda {
                var,
                var_ty,
                body,
                ty,
            } => {
                self.scope.entry(*var).or_default().push(var_ty.clone());
                let body_ty = self.infer(body);
                if let Some(stack) = self.scope.get_mut(var) {
                    stack.pop();
                }
                let own = Type::complex(var_ty.clone(), body_ty?);
                *ty = Some(own.clone());
                Ok(own)
            }

            Expr::App { pred, args, ty } => {
                let pred_ty = self.infer(pred)?;
                let mut fun_ty = self.env.resolve(&pred_ty);
                let mut idx = 0;
                while idx < args.len() {
                    fun_ty = match fun_ty {
                        Type::Complex(from, to) => {
                            if let Type::List(elem) = from.as_ref() {
                                // Variadic parameter: absorbs every
                                // remaining argument.
                                while idx < args.len() {
                                    let arg_ty = self.infer(&mut args[idx])?;
                                    unify_subtype(self.ontology, self.env, elem, &arg_ty)?;
                                    idx += 1;
                                }
                            } else {
                                let arg_ty = self.infer(&mut args[idx])?;
                                unify_subtype(self.ontology, self.env, from.as_ref(), &arg_ty)?;
                                idx += 1;
                            }
                            self.env.resolve(to.as_ref())
                        }
                        found => return Err(TypeError::NotFunction { found }),
                    };
                }
                *ty = Some(fun_ty.clone());
                Ok(fun_ty)
            }
        }
    }
}

/// Infer the type of a standalone expression against an empty scope.
pub fn infer_type(ont: &Ontology, env: &mut TypeEnv, expr: &mut Expr) -> Result<Type, TypeError> {
    InferCtx::new(ont, env).infer(expr)
}
