use std::collections::BTreeMap;

use serde::Serialize;

use crate::interner;
use crate::parser::state::{Action, State, StateArena, StateId};
use crate::types::env::TypeEnv;

/// One serialized hypergraph node: enough to replay which rule fired and
/// which parents the derivation came through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HyperNode {
    pub action: Action,
    pub matched: Option<String>,
    pub rule: Option<u32>,
    pub parents: Vec<(Option<u32>, Option<u32>)>,
}

/// Result of one decode: the state arena, the beam slots, and the type
/// environment the parse threaded through inference.
pub struct Chart {
    pub(crate) arena: StateArena,
    pub(crate) beams: Vec<Vec<StateId>>,
    pub(crate) env: TypeEnv,
    pub(crate) n_tokens: usize,
}

impl Chart {
    pub fn n_tokens(&self) -> usize {
        self.n_tokens
    }

    pub fn state(&self, id: StateId) -> &State {
        self.arena.get(id)
    }

    pub fn env(&self) -> &TypeEnv {
        &self.env
    }

    /// The beam slot for one step, sorted by descending score.
    pub fn beam(&self, step: usize) -> &[StateId] {
        self.beams.get(step).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The terminal beam slot at step `2 * n_tokens`.
    pub fn final_beam(&self) -> &[StateId] {
        self.beam(2 * self.n_tokens)
    }

    /// Highest-scoring terminal state. `None` means no derivation reached
    /// the terminal slot: a valid no-parse result, not an error.
    pub fn best(&self) -> Option<&State> {
        self.final_beam().first().map(|&id| self.arena.get(id))
    }

    /// The chain of states from the initial state to `id`.
    pub fn trace(&self, id: StateId) -> Vec<StateId> {
        self.arena.trace(id)
    }

    /// Serializable dump of every state reachable from `roots` through
    /// incoming edges, keyed by state id.
    pub fn hypergraph(&self, roots: &[StateId]) -> BTreeMap<u32, HyperNode> {
        let mut nodes = BTreeMap::new();
        let mut stack: Vec<StateId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if nodes.contains_key(&id.0) {
                continue;
            }
            let state = self.arena.get(id);
            nodes.insert(
                id.0,
                HyperNode {
                    action: state.action,
                    matched: state.matched.map(interner::resolve),
                    rule: state.rule.map(|r| r.0),
                    parents: state
                        .incomings
                        .iter()
                        .map(|(l, r)| (l.map(|s| s.0), r.map(|s| s.0)))
                        .collect(),
                },
            );
            for (left, right) in &state.incomings {
                stack.extend(left.iter().copied());
                stack.extend(right.iter().copied());
            }
        }
        nodes
    }
}
