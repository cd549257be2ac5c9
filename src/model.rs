use std::collections::HashMap;

use crate::interner::{self, Symbol};
use crate::kb::RuleId;
use crate::parser::state::{Action, State};

/// Incremental scoring oracle: the contribution of taking `action` out of
/// `state`, matching constant `matched` under lexicon rule `rule`. The
/// engine adds the contribution to the parent's cumulative score.
pub trait Model {
    fn score(
        &self,
        state: &State,
        action: Action,
        matched: Option<Symbol>,
        rule: Option<RuleId>,
    ) -> f64;
}

/// Scores every transition zero; beam order degenerates to insertion
/// order. Useful for exhaustive and forced decoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformModel;

impl Model for UniformModel {
    fn score(&self, _: &State, _: Action, _: Option<Symbol>, _: Option<RuleId>) -> f64 {
        0.0
    }
}

/// Perceptron-style sparse linear model: a transition fires a handful of
/// string-keyed features and scores their weight sum. Weights are loaded
/// from whatever the caller deserialized; absent features weigh zero.
#[derive(Debug, Default, Clone)]
pub struct WeightModel {
    weights: HashMap<String, f64>,
}

impl WeightModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_weights(weights: HashMap<String, f64>) -> Self {
        WeightModel { weights }
    }

    pub fn set(&mut self, feature: &str, weight: f64) {
        self.weights.insert(feature.to_string(), weight);
    }

    fn features(
        state: &State,
        action: Action,
        matched: Option<Symbol>,
        rule: Option<RuleId>,
    ) -> Vec<String> {
        let mut feats = vec![format!("act={}", action), format!("act={}:pos={}", action, state.pos)];
        if let Some(name) = matched {
            feats.push(format!("act={}:match={}", action, interner::resolve(name)));
        }
        if let Some(rule) = rule {
            feats.push(format!("rule={}", rule.0));
        }
        feats
    }
}

impl Model for WeightModel {
    fn score(
        &self,
        state: &State,
        action: Action,
        matched: Option<Symbol>,
        rule: Option<RuleId>,
    ) -> f64 {
        Self::features(state, action, matched, rule)
            .iter()
            .filter_map(|feat| self.weights.get(feat))
            .sum()
    }
}
