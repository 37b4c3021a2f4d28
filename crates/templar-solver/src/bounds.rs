//! Bound and consistency checks for inferred template bindings.

use crate::context::SolverContext;
use crate::def::Signature;
use crate::diagnostics::SolverError;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::relation::{are_types_identical, is_subtype_of};
use crate::types::TypeId;
use templar_common::interner::Atom;
use tracing::debug;

/// Check that `inferred` satisfies `bound`.
pub fn check_bound(
    ctx: &SolverContext<'_>,
    template: Atom,
    bound: TypeId,
    inferred: TypeId,
) -> Result<(), SolverError> {
    if is_subtype_of(ctx, inferred, bound) {
        return Ok(());
    }
    debug!(
        template = template.0,
        bound = bound.0,
        inferred = inferred.0,
        "bound violation"
    );
    Err(SolverError::BoundViolation {
        template,
        bound,
        inferred,
    })
}

/// Reconcile two bindings proposed for the same template.
///
/// Identical bindings agree; when one is a subtype of the other the narrower
/// one is kept. Unrelated bindings have no common type and yield `None`.
pub fn check_consistency(ctx: &SolverContext<'_>, a: TypeId, b: TypeId) -> Option<TypeId> {
    if are_types_identical(ctx, a, b) {
        return Some(a);
    }
    if is_subtype_of(ctx, a, b) {
        return Some(a);
    }
    if is_subtype_of(ctx, b, a) {
        return Some(b);
    }
    None
}

/// Check every binding of a completed substitution against its bound.
///
/// Bounds may mention other templates of the same signature
/// (`@template U of T`), so each bound is instantiated with the substitution
/// before the check.
pub fn check_substitution_bounds(
    ctx: &SolverContext<'_>,
    signature: &Signature,
    substitution: &TypeSubstitution,
) -> Result<(), SolverError> {
    for template in &signature.templates {
        let Some(inferred) = substitution.get(template.name) else {
            return Err(SolverError::UnderconstrainedTemplate {
                template: template.name,
            });
        };
        let bound = instantiate_type(ctx.interner, template.effective_bound(), substitution);
        check_bound(ctx, template.name, bound, inferred)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/bounds_tests.rs"]
mod tests;
