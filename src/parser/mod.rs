pub mod chart;
pub mod preprocess;
pub mod state;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, trace};
use thiserror::Error;

use crate::expr::Expr;
use crate::interner::{self, Symbol};
use crate::kb::{InputToken, KnowledgeBase, LexicalEntry, RuleId};
use crate::model::Model;
use crate::types::env::TypeEnv;
use crate::types::infer::InferCtx;
use crate::types::ontology::Ontology;
use crate::types::ty::Type;
use chart::Chart;
use state::{Action, State, StateArena, StateId};

/// Caller-supplied pruning predicate over a candidate's partial logical
/// form. Forced decoding hands in a constant-profile check; candidates it
/// rejects are discarded before they reach any beam.
pub type ExprFilter<'a> = dyn Fn(&Expr) -> bool + 'a;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The whole-sentence decode exceeded its cooperative deadline.
    /// Recoverable per sentence; batch callers log it and move on.
    #[error("decode exceeded its deadline of {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// States kept per beam slot; 0 keeps everything.
    pub beam_width: usize,
    /// Pack equal-signature states into one representative instead of
    /// carrying duplicates.
    pub dp_merge: bool,
    /// Cooperative per-decode deadline, checked between steps.
    pub timeout: Option<Duration>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            beam_width: 16,
            dp_merge: true,
            timeout: None,
        }
    }
}

/// The beam decoder. Stateless across sentences: every `parse` call owns a
/// fresh environment, arena, and beam array, so one parser can be reused
/// (or one per worker) freely.
pub struct Parser<'a, K: KnowledgeBase, M: Model> {
    ontology: &'a Ontology,
    kb: &'a K,
    model: &'a M,
    config: ParserConfig,
}

impl<'a, K: KnowledgeBase, M: Model> Parser<'a, K, M> {
    pub fn new(ontology: &'a Ontology, kb: &'a K, model: &'a M, config: ParserConfig) -> Self {
        Parser {
            ontology,
            kb,
            model,
            config,
        }
    }

    /// Decode a raw `word/TAG` sentence.
    pub fn parse(&self, input: &str, filter: Option<&ExprFilter>) -> Result<Chart, DecodeError> {
        let tokens = preprocess::preprocess(input);
        self.parse_tokens(&tokens, filter)
    }

    /// Decode pre-tokenized input. The schedule runs `2 * tokens` beam
    /// slots; an empty terminal slot is a no-parse result, not an error.
    pub fn parse_tokens(
        &self,
        tokens: &[InputToken],
        filter: Option<&ExprFilter>,
    ) -> Result<Chart, DecodeError> {
        let last = 2 * tokens.len();
        let decoder = Decoder {
            ontology: self.ontology,
            kb: self.kb,
            model: self.model,
            config: &self.config,
            tokens,
            filter,
            arena: StateArena::new(),
            env: TypeEnv::new(),
            beams: vec![Vec::new(); last + 1],
            last,
            next_anon: 0,
        };
        decoder.run()
    }
}

/// Working state of one decode.
struct Decoder<'d, K: KnowledgeBase, M: Model> {
    ontology: &'d Ontology,
    kb: &'d K,
    model: &'d M,
    config: &'d ParserConfig,
    tokens: &'d [InputToken],
    filter: Option<&'d ExprFilter<'d>>,
    arena: StateArena,
    env: TypeEnv,
    beams: Vec<Vec<StateId>>,
    last: usize,
    next_anon: u32,
}

impl<'d, K: KnowledgeBase, M: Model> Decoder<'d, K, M> {
    fn run(mut self) -> Result<Chart, DecodeError> {
        let deadline = self.config.timeout.map(|limit| (Instant::now(), limit));
        let init = self
            .arena
            .alloc(0, 0, Action::Init, None, None, 0.0, None, Vec::new(), Vec::new());
        self.beams[0].push(init);

        for step in 0..=self.last {
            if let Some((started, limit)) = deadline {
                if started.elapsed() >= limit {
                    return Err(DecodeError::Timeout(limit));
                }
            }
            self.prune(step);
            if step == self.last {
                break;
            }
            let survivors = self.beams[step].clone();
            debug!(
                "step {}/{}: expanding {} states",
                step,
                self.last,
                survivors.len(),
            );
            for id in survivors {
                self.proceed(id);
            }
        }

        Ok(Chart {
            arena: self.arena,
            beams: self.beams,
            env: self.env,
            n_tokens: self.tokens.len(),
        })
    }

    /// Sort one beam slot by descending score (stable: equal scores keep
    /// insertion order), then either pack equal-signature states or
    /// truncate to the beam width.
    fn prune(&mut self, step: usize) {
        let mut slot = std::mem::take(&mut self.beams[step]);
        let before = slot.len();
        slot.sort_by(|&a, &b| {
            let sa = self.arena.get(a).score;
            let sb = self.arena.get(b).score;
            sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
        });

        let width = self.config.beam_width;
        if self.config.dp_merge {
            let mut reps: Vec<StateId> = Vec::new();
            let mut seen: HashMap<String, StateId> = HashMap::new();
            for id in slot {
                let sig = self.arena.get(id).signature(&self.env);
                if let Some(&rep) = seen.get(&sig) {
                    self.arena.merge(rep, id);
                } else if width == 0 || reps.len() < width {
                    seen.insert(sig, id);
                    reps.push(id);
                } else {
                    // Beam full: the remaining lower-scored states drop.
                    break;
                }
            }
            self.beams[step] = reps;
        } else {
            if width > 0 && slot.len() > width {
                slot.truncate(width);
            }
            self.beams[step] = slot;
        }
        trace!("step {}: pruned {} -> {}", step, before, self.beams[step].len());
    }

    /// Expand one surviving state into candidate children.
    fn proceed(&mut self, id: StateId) {
        let parent = self.arena.get(id).clone();

        // Shift and skip consume the next token.
        if parent.pos < self.tokens.len() {
            let token = self.tokens[parent.pos];
            let entries = self.kb.shift_entries(&token);
            if entries.is_empty() {
                self.skip(&parent);
            }
            for entry in entries {
                self.shift(&parent, &entry);
            }
        }

        // Reduce and union combine the top with each predictor's top.
        if parent.expr.is_some() {
            for lp in parent.leftptrs.clone() {
                let left = self.arena.get(lp).clone();
                if left.expr.is_some() {
                    self.reduce(&parent, &left);
                    self.union(&parent, &left);
                }
            }
        }

        // A complete state (all tokens consumed, stack depth one) pads
        // toward the terminal slot.
        if parent.pos == self.tokens.len()
            && parent.expr.is_some()
            && parent
                .leftptrs
                .iter()
                .any(|&lp| self.arena.get(lp).expr.is_none())
        {
            self.finish(&parent);
        }
    }

    fn shift(&mut self, parent: &State, entry: &LexicalEntry) {
        let mark = self.env.mark();
        let mut expr = entry.instantiate(&mut self.env);
        if InferCtx::new(self.ontology, &mut self.env).infer(&mut expr).is_err() {
            self.env.undo_to(mark);
            return;
        }
        let matched = head_constant(&expr);
        self.push(
            parent,
            Action::Shift,
            parent.step + 1,
            parent.pos + 1,
            matched,
            Some(entry.rule),
            Some(expr),
            vec![(Some(parent.id), None)],
            vec![parent.id],
        );
    }

    fn skip(&mut self, parent: &State) {
        self.push(
            parent,
            Action::Skip,
            parent.step + 2,
            parent.pos + 1,
            None,
            None,
            parent.expr.clone(),
            vec![(Some(parent.id), None)],
            parent.leftptrs.clone(),
        );
    }

    /// Apply functor to argument in both orders; each order that
    /// type-checks becomes one candidate.
    fn reduce(&mut self, parent: &State, left: &State) {
        let (Some(left_expr), Some(right_expr)) = (&left.expr, &parent.expr) else {
            return;
        };
        for (functor, argument) in [(left_expr, right_expr), (right_expr, left_expr)] {
            let candidate = Expr::App {
                pred: Box::new(functor.clone()),
                args: vec![argument.clone()],
                ty: None,
            };
            self.combine(parent, left, Action::Reduce, candidate);
        }
    }

    /// Conjoin or disjoin two same-typed subexpressions: propositions
    /// combine directly, lambdas of identical signature combine pointwise.
    fn union(&mut self, parent: &State, left: &State) {
        let (Some(left_expr), Some(right_expr)) = (&left.expr, &parent.expr) else {
            return;
        };
        let (Some(lt), Some(rt)) = (left_expr.ty(), right_expr.ty()) else {
            return;
        };
        let lt = self.env.resolve(lt);
        if lt != self.env.resolve(rt) {
            return;
        }
        for op in ["and", "or"] {
            if let Some(candidate) = self.junction(op, left_expr, right_expr, &lt) {
                self.combine(parent, left, Action::Union, candidate);
            }
        }
    }

    fn junction(&mut self, op: &str, a: &Expr, b: &Expr, ty: &Type) -> Option<Expr> {
        let truth = Type::atomic("t");
        match ty {
            _ if self.ontology.is_subtype(ty, &truth) => {
                let conj = Type::complex(Type::list(truth.clone()), truth);
                Some(Expr::app(
                    Expr::constant(op, conj),
                    vec![a.clone(), b.clone()],
                ))
            }
            Type::Complex(from, to) => {
                let var = self.fresh_anon();
                let applied = |f: &Expr| Expr::App {
                    pred: Box::new(f.clone()),
                    args: vec![Expr::Var { name: var, ty: None }],
                    ty: None,
                };
                let inner = self.junction(op, &applied(a), &applied(b), to)?;
                Some(Expr::Lambda {
                    var,
                    var_ty: (**from).clone(),
                    body: Box::new(inner),
                    ty: None,
                })
            }
            _ => None,
        }
    }

    /// Type-check a combination candidate, beta-normalize it, and emit the
    /// child state. Failed checks rewind the environment and emit nothing.
    fn combine(&mut self, parent: &State, left: &State, action: Action, candidate: Expr) {
        let mark = self.env.mark();
        let mut typed = candidate;
        if InferCtx::new(self.ontology, &mut self.env).infer(&mut typed).is_err() {
            self.env.undo_to(mark);
            return;
        }
        let mut normal = typed.reduce();
        // Normalization strips node annotations; re-infer to restore them.
        if InferCtx::new(self.ontology, &mut self.env).infer(&mut normal).is_err() {
            self.env.undo_to(mark);
            return;
        }
        self.push(
            parent,
            action,
            parent.step + 1,
            parent.pos,
            None,
            None,
            Some(normal),
            vec![(Some(left.id), Some(parent.id))],
            left.leftptrs.clone(),
        );
    }

    fn finish(&mut self, parent: &State) {
        // Only the empty-stack predictors carry over: the padded state
        // stands for the completed readings of a packed node.
        let roots: Vec<StateId> = parent
            .leftptrs
            .iter()
            .copied()
            .filter(|&lp| self.arena.get(lp).expr.is_none())
            .collect();
        self.push(
            parent,
            Action::Finish,
            parent.step + 1,
            parent.pos,
            None,
            None,
            parent.expr.clone(),
            vec![(Some(parent.id), None)],
            roots,
        );
    }

    /// Score, filter, and insert one candidate into its beam slot.
    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        parent: &State,
        action: Action,
        step: usize,
        pos: usize,
        matched: Option<Symbol>,
        rule: Option<RuleId>,
        expr: Option<Expr>,
        incomings: Vec<(Option<StateId>, Option<StateId>)>,
        leftptrs: Vec<StateId>,
    ) {
        if step > self.last {
            return;
        }
        if let (Some(filter), Some(expr)) = (self.filter, &expr) {
            if !filter(expr) {
                trace!("filter rejected {} candidate at step {}", action, step);
                return;
            }
        }
        let score = parent.score + self.model.score(parent, action, matched, rule);
        let id = self
            .arena
            .alloc(step, pos, action, matched, rule, score, expr, incomings, leftptrs);
        self.beams[step].push(id);
    }

    fn fresh_anon(&mut self) -> Symbol {
        let name = format!("$u{}", self.next_anon);
        self.next_anon += 1;
        interner::intern(&name)
    }
}

/// The leftmost constant of an expression, depth-first. Used as the
/// "matched" tag a shift records for scoring and the hypergraph.
fn head_constant(expr: &Expr) -> Option<Symbol> {
    match expr {
        Expr::Const { name, .. } => Some(*name),
        Expr::App { pred, args, .. } => {
            head_constant(pred).or_else(|| args.iter().find_map(head_constant))
        }
        Expr::Lambda { body, .. } => head_constant(body),
        Expr::Var { .. } => None,
    }
}
