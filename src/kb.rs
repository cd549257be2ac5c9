use std::collections::HashMap;

use crate::expr::Expr;
use crate::interner::{self, Symbol};
use crate::types::env::TypeEnv;
use crate::types::ty::{TyVarId, Type};

/// A POS-tagged surface token. Tags arrive already collapsed by
/// preprocessing; tokens without one carry the empty tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputToken {
    pub word: Symbol,
    pub tag: Symbol,
}

impl InputToken {
    pub fn new(word: &str, tag: &str) -> Self {
        InputToken {
            word: interner::intern(word),
            tag: interner::intern(tag),
        }
    }
}

/// Identity of the lexicon rule that licensed a transition. Opaque to the
/// engine; carried through states into the derivation hypergraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct RuleId(pub u32);

/// A typed logical-form fragment a token can shift.
///
/// Entry types may contain template variables; they are scoped to the
/// entry and must be refreshed per use via [`LexicalEntry::instantiate`],
/// never unified against directly.
#[derive(Debug, Clone)]
pub struct LexicalEntry {
    pub expr: Expr,
    pub rule: RuleId,
}

impl LexicalEntry {
    /// Clone the entry expression with every distinct template variable
    /// replaced by a fresh variable from the parse's environment.
    pub fn instantiate(&self, env: &mut TypeEnv) -> Expr {
        let mut map = HashMap::new();
        instantiate_expr(&self.expr, env, &mut map)
    }
}

fn instantiate_ty(ty: &Type, env: &mut TypeEnv, map: &mut HashMap<TyVarId, TyVarId>) -> Type {
    match ty {
        Type::Var(v) => Type::Var(*map.entry(*v).or_insert_with(|| env.fresh_var())),
        Type::List(elem) => Type::list(instantiate_ty(elem, env, map)),
        Type::Complex(from, to) => {
            Type::complex(instantiate_ty(from, env, map), instantiate_ty(to, env, map))
        }
        Type::Top | Type::Atomic(_) => ty.clone(),
    }
}

fn instantiate_expr(expr: &Expr, env: &mut TypeEnv, map: &mut HashMap<TyVarId, TyVarId>) -> Expr {
    match expr {
        Expr::Var { name, .. } => Expr::Var {
            name: *name,
            ty: None,
        },
        Expr::Const { name, ty } => Expr::Const {
            name: *name,
            ty: instantiate_ty(ty, env, map),
        },
        Expr::App { pred, args, .. } => Expr::App {
            pred: Box::new(instantiate_expr(pred, env, map)),
            args: args
                .iter()
                .map(|arg| instantiate_expr(arg, env, map))
                .collect(),
            ty: None,
        },
        Expr::Lambda {
            var, var_ty, body, ..
        } => Expr::Lambda {
            var: *var,
            var_ty: instantiate_ty(var_ty, env, map),
            body: Box::new(instantiate_expr(body, env, map)),
            ty: None,
        },
    }
}

/// The SHIFT oracle: which logical-form fragments a surface token
/// licenses. Adjective normalization and collocation thresholds are
/// applied upstream of tokenization and never reach the engine.
pub trait KnowledgeBase {
    fn shift_entries(&self, token: &InputToken) -> Vec<LexicalEntry>;
}

/// In-memory lexicon keyed by surface word. Entry insertion order is the
/// SHIFT candidate order, which also decides ties during beam sorting.
#[derive(Debug, Default)]
pub struct DictKb {
    entries: HashMap<Symbol, Vec<LexicalEntry>>,
    next_rule: u32,
}

impl DictKb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `expr` as an entry for `word`, returning the rule id
    /// assigned to the pairing.
    pub fn add(&mut self, word: &str, expr: Expr) -> RuleId {
        let rule = RuleId(self.next_rule);
        self.next_rule += 1;
        self.entries
            .entry(interner::intern(word))
            .or_default()
            .push(LexicalEntry { expr, rule });
        rule
    }
}

impl KnowledgeBase for DictKb {
    fn shift_entries(&self, token: &InputToken) -> Vec<LexicalEntry> {
        self.entries.get(&token.word).cloned().unwrap_or_default()
    }
}
