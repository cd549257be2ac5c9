//! Typed beam-search semantic parser
//!
//! Incremental shift-reduce decoding of natural-language token streams
//! into typed lambda-calculus logical forms. Three layers:
//! 1. A subtype ontology with directional unification over a journalled,
//!    transactional type environment
//! 2. An owned-tree expression model with beta reduction and canonical
//!    semantic equality
//! 3. A beam driver with optional packed-forest state merging and
//!    caller-supplied hypothesis filtering for forced decoding

pub mod expr;
pub mod interner;
pub mod kb;
pub mod model;
pub mod parser;
pub mod syntax;
pub mod types;

// Re-export the main types
pub use expr::{collect_constants, semantic_eq, simplify, ConstantProfile, Expr};
pub use kb::{DictKb, InputToken, KnowledgeBase, LexicalEntry, RuleId};
pub use model::{Model, UniformModel, WeightModel};
pub use parser::chart::{Chart, HyperNode};
pub use parser::state::{Action, State, StateArena, StateId};
pub use parser::{DecodeError, ExprFilter, Parser, ParserConfig};
pub use syntax::{parse_expr, parse_type, SyntaxError};
pub use types::{infer_type, unify_subtype, Ontology, TyVarId, Type, TypeEnv, TypeError};
