pub mod env;
pub mod error;
pub mod infer;
pub mod ontology;
pub mod ty;
pub mod unify;

pub use env::TypeEnv;
pub use error::TypeError;
pub use infer::{infer_type, InferCtx};
pub use ontology::Ontology;
pub use ty::{TyVarId, Type};
pub use unify::unify_subtype;
