//! Generic Type Solver
//!
//! Inference and checking for PHPStan-style `@template` generics. It uses:
//!
//! - **Interning**: structural `TypeData` stored once, compared by `TypeId`
//! - **Ena**: Union-Find over template variables during call-site inference
//! - **Owner-scoped templates**: `TemplateRef` pairs a name with the
//!   declaration that declares it, so same-named templates never collide
//!
//! Entry points:
//! - `DeclarationStore`: register functions, classes, methods and templates
//! - `infer` / `infer_with_context`: infer a call site's substitution
//! - `CallEvaluator`: evaluate function and method calls end to end
//! - `VarianceEnforcer`: classify template usage and enforce invariance
//!
//! The host language's class hierarchy is reached only through the
//! `NominalHierarchy` trait.
pub mod bounds;
pub mod call;
mod context;
pub mod def;
mod diagnostics;
mod format;
pub mod hierarchy;
pub mod infer;
pub mod inheritance;
pub mod instantiate;
mod intern;
pub mod relation;
pub mod types;
pub mod variance;

pub use bounds::{check_bound, check_consistency, check_substitution_bounds};
pub use call::{CallEvaluator, CallOutcome};
pub use context::SolverContext;
pub use def::{
    DeclId, DeclKind, DeclarationInfo, DeclarationStore, InheritedType, Signature,
    TemplateDeclaration, TemplatePositions,
};
pub use diagnostics::SolverError;
pub use format::TypeFormatter;
pub use hierarchy::{ClassHierarchy, NominalHierarchy};
pub use infer::{InferenceContext, infer, infer_with_context};
pub use inheritance::{direct_ancestors, upcast_to_base};
pub use instantiate::{TypeSubstitution, contains_template_refs, instantiate_type};
pub use intern::TypeInterner;
pub use relation::{are_types_identical, is_subtype_of};
pub use types::{ParamInfo, TemplateRef, TypeData, TypeId, TypeListId};
pub use variance::{TemplateUsage, UsageKind, VarianceEnforcer};

#[cfg(test)]
#[path = "../tests/support.rs"]
mod test_support;
