use std::fmt;

use serde::Serialize;

use crate::expr::Expr;
use crate::interner::{self, Symbol};
use crate::kb::RuleId;
use crate::types::env::TypeEnv;

/// Transition kinds of the shift-reduce machine, matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// The root of a derivation; never produced by a transition.
    Init,
    /// Consume a token through a lexicon entry. Advances one step.
    Shift,
    /// Consume a token that licenses no entry, spending its shift and
    /// combine slots at once. Advances two steps.
    Skip,
    /// Apply one stack item to its neighbor. Advances one step.
    Reduce,
    /// Conjoin or disjoin two same-typed stack items. Advances one step.
    Union,
    /// Pad a complete derivation toward the terminal slot. Advances one
    /// step.
    Finish,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Action::Init => "init",
            Action::Shift => "shift",
            Action::Skip => "skip",
            Action::Reduce => "reduce",
            Action::Union => "union",
            Action::Finish => "finish",
        };
        write!(f, "{}", tag)
    }
}

/// Arena index of a state. Stable for the lifetime of one decode and the
/// key of the serialized hypergraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StateId(pub u32);

/// One node in the derivation hypergraph: a partial parse with the top of
/// its stack materialized and everything deeper reachable through
/// `leftptrs`.
#[derive(Debug, Clone)]
pub struct State {
    pub id: StateId,
    /// Position in the beam schedule.
    pub step: usize,
    /// Tokens consumed so far.
    pub pos: usize,
    pub action: Action,
    /// Head constant matched by a shift, if any.
    pub matched: Option<Symbol>,
    /// Lexicon rule that licensed the transition.
    pub rule: Option<RuleId>,
    /// Cumulative model score along the derivation that created the state.
    pub score: f64,
    /// The partial logical form on top of the implicit stack.
    pub expr: Option<Expr>,
    /// Parent back-references as (left, right) pairs. Back-references
    /// only, never ownership; multiple pairs accumulate when equivalent
    /// states are packed.
    pub incomings: Vec<(Option<StateId>, Option<StateId>)>,
    /// Predictor states one stack level down. Reduce and union combine
    /// `expr` with each predictor's top; packing extends this set.
    pub leftptrs: Vec<StateId>,
}

impl State {
    /// Packing key: step, buffer position, and the type-annotated top of
    /// the stack. States sharing a signature expand identically from here
    /// on and can be folded into one representative.
    pub fn signature(&self, env: &TypeEnv) -> String {
        match &self.expr {
            Some(expr) => format!("{}:{}:{}", self.step, self.pos, typed_render(expr, env)),
            None => format!("{}:{}:-", self.step, self.pos),
        }
    }
}

/// Render an expression with every type resolved through the environment.
/// Unbound variables print as a bare `?`: two states whose tops differ
/// only in the identity of still-unconstrained variables behave alike.
fn typed_render(expr: &Expr, env: &TypeEnv) -> String {
    use crate::types::ty::Type;

    fn ty_str(ty: &Type, env: &TypeEnv) -> String {
        match env.resolve(ty) {
            Type::Var(_) => "?".to_string(),
            Type::List(elem) => format!("{}*", ty_str(&elem, env)),
            Type::Complex(from, to) => {
                format!("<{},{}>", ty_str(&from, env), ty_str(&to, env))
            }
            resolved => resolved.to_string(),
        }
    }

    match expr {
        Expr::Var { name, .. } => interner::resolve(*name),
        Expr::Const { name, ty } => format!("{}:{}", interner::resolve(*name), ty_str(ty, env)),
        Expr::App { pred, args, ty } => {
            let mut out = format!("({}", typed_render(pred, env));
            for arg in args {
                out.push(' ');
                out.push_str(&typed_render(arg, env));
            }
            out.push(')');
            if let Some(ty) = ty {
                out.push('@');
                out.push_str(&ty_str(ty, env));
            }
            out
        }
        Expr::Lambda {
            var, var_ty, body, ..
        } => format!(
            "(lambda {}:{} {})",
            interner::resolve(*var),
            ty_str(var_ty, env),
            typed_render(body, env),
        ),
    }
}

/// Id-indexed store of every state created during one decode. States are
/// only ever referenced by id, which keeps back-pointer aliasing out of
/// the picture and makes the hypergraph dump a table walk.
#[derive(Debug, Default)]
pub struct StateArena {
    states: Vec<State>,
}

impl StateArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Allocate a state, assigning its id.
    pub fn alloc(
        &mut self,
        step: usize,
        pos: usize,
        action: Action,
        matched: Option<Symbol>,
        rule: Option<RuleId>,
        score: f64,
        expr: Option<Expr>,
        incomings: Vec<(Option<StateId>, Option<StateId>)>,
        leftptrs: Vec<StateId>,
    ) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(State {
            id,
            step,
            pos,
            action,
            matched,
            rule,
            score,
            expr,
            incomings,
            leftptrs,
        });
        id
    }

    pub fn get(&self, id: StateId) -> &State {
        &self.states[id.0 as usize]
    }

    /// Fold `from`'s derivations into `into`: both incoming edge sets and
    /// both predictor sets stay reachable from the surviving state, so no
    /// derivation is dropped from the hypergraph. `from` stays allocated
    /// but leaves the beam.
    pub fn merge(&mut self, into: StateId, from: StateId) {
        if into == from {
            return;
        }
        let (incomings, leftptrs) = {
            let from = &self.states[from.0 as usize];
            (from.incomings.clone(), from.leftptrs.clone())
        };
        let target = &mut self.states[into.0 as usize];
        for edge in incomings {
            if !target.incomings.contains(&edge) {
                target.incomings.push(edge);
            }
        }
        for ptr in leftptrs {
            if !target.leftptrs.contains(&ptr) {
                target.leftptrs.push(ptr);
            }
        }
    }

    /// The chain of states from the initial state to `id`, following the
    /// temporally-previous parent of the first incoming edge at each hop.
    pub fn trace(&self, id: StateId) -> Vec<StateId> {
        let mut chain = vec![id];
        let mut cur = id;
        while let Some(&(left, right)) = self.get(cur).incomings.first() {
            match right.or(left) {
                Some(parent) => {
                    chain.push(parent);
                    cur = parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ty::Type;

    fn leaf_arena() -> (StateArena, StateId) {
        let mut arena = StateArena::new();
        let init = arena.alloc(0, 0, Action::Init, None, None, 0.0, None, vec![], vec![]);
        (arena, init)
    }

    fn shift(
        arena: &mut StateArena,
        parent: StateId,
        step: usize,
        name: &str,
        score: f64,
    ) -> StateId {
        let expr = Expr::constant(name, Type::atomic("e"));
        arena.alloc(
            step,
            step,
            Action::Shift,
            Some(interner::intern(name)),
            Some(RuleId(0)),
            score,
            Some(expr),
            vec![(Some(parent), None)],
            vec![parent],
        )
    }

    #[test]
    fn test_trace_walks_back_to_init() {
        let (mut arena, init) = leaf_arena();
        let a = shift(&mut arena, init, 1, "austin", 0.0);
        let b = shift(&mut arena, a, 2, "texas", 0.0);
        assert_eq!(arena.trace(b), vec![init, a, b]);
        assert_eq!(arena.trace(init), vec![init]);
    }

    #[test]
    fn test_merge_preserves_both_derivations() {
        let (mut arena, init) = leaf_arena();
        let a = shift(&mut arena, init, 1, "austin", 0.0);
        let b = shift(&mut arena, init, 1, "houston", 0.0);
        let via_a = shift(&mut arena, a, 2, "texas", 0.0);
        let via_b = shift(&mut arena, b, 2, "texas", 0.0);

        arena.merge(via_a, via_b);
        let merged = arena.get(via_a);
        assert_eq!(
            merged.incomings,
            vec![(Some(a), None), (Some(b), None)],
        );
        assert_eq!(merged.leftptrs, vec![a, b]);

        // Merging the same state again changes nothing.
        arena.merge(via_a, via_b);
        assert_eq!(arena.get(via_a).incomings.len(), 2);
    }

    #[test]
    fn test_signature_distinguishes_step_and_structure() {
        let (mut arena, init) = leaf_arena();
        let env = TypeEnv::new();
        let a = shift(&mut arena, init, 1, "austin", 0.0);
        let b = shift(&mut arena, init, 1, "houston", 0.0);
        let a2 = shift(&mut arena, init, 2, "austin", 0.0);

        assert_ne!(
            arena.get(a).signature(&env),
            arena.get(b).signature(&env),
        );
        assert_ne!(
            arena.get(a).signature(&env),
            arena.get(a2).signature(&env),
        );

        let twin = shift(&mut arena, b, 1, "austin", 0.5);
        // Same step, position, and typed top: packable, score ignored.
        assert_eq!(
            arena.get(a).signature(&env),
            arena.get(twin).signature(&env),
        );
    }

    #[test]
    fn test_signature_ignores_unbound_var_identity() {
        let mut arena = StateArena::new();
        let mut env = TypeEnv::new();
        let v1 = env.fresh_var();
        let v2 = env.fresh_var();
        let e1 = Expr::constant("f", Type::complex(Type::Var(v1), Type::atomic("t")));
        let e2 = Expr::constant("f", Type::complex(Type::Var(v2), Type::atomic("t")));
        let s1 = arena.alloc(1, 1, Action::Shift, None, None, 0.0, Some(e1), vec![], vec![]);
        let s2 = arena.alloc(1, 1, Action::Shift, None, None, 0.0, Some(e2), vec![], vec![]);
        assert_eq!(
            arena.get(s1).signature(&env),
            arena.get(s2).signature(&env),
        );
    }
}
