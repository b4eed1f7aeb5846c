//! Constraint catalog and evaluator for cross-reference, attribute, and
//! cross-part semantic rules (§4.6).

pub mod catalog;
pub mod constraint;
pub mod validator;

pub use catalog::{build_pptx_semantic_catalog, ConstraintCatalog};
pub use constraint::{CompareOp, Scope, SemanticConstraint};
pub use validator::SemanticValidator;
