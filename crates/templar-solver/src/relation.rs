//! Subtype and identity relations.
//!
//! Rules:
//! - every type is a subtype of `mixed`; `mixed` is a subtype only of itself
//! - a union source is a subtype when every member is; a union target accepts
//!   a source that is a subtype of any member
//! - nominal types ask the `NominalHierarchy`, falling back to the
//!   inheritance mapping for classes that inherit a generic ancestor
//! - a template reference is a subtype of whatever its bound is a subtype of
//! - `G<X>` is a subtype of `G<Y>` only when `X` and `Y` are identical
//!   (invariance), after viewing the source as an instance of `G`

use crate::context::SolverContext;
use crate::inheritance::upcast_to_base;
use crate::types::{TypeData, TypeId};
use templar_common::limits::MAX_SUBTYPE_DEPTH;
use tracing::trace;

/// Whether `source` may be used where `target` is expected.
pub fn is_subtype_of(ctx: &SolverContext<'_>, source: TypeId, target: TypeId) -> bool {
    SubtypeChecker::new(*ctx).is_subtype_of(source, target)
}

/// Structural identity.
///
/// Interning already makes identical structures share a `TypeId`; the only
/// extra case is unions, whose members are kept in declaration order but
/// compare as sets.
pub fn are_types_identical(ctx: &SolverContext<'_>, a: TypeId, b: TypeId) -> bool {
    if a == b {
        return true;
    }
    let interner = ctx.interner;
    match (interner.lookup(a), interner.lookup(b)) {
        (Some(TypeData::Union(left)), Some(TypeData::Union(right))) => {
            let left = interner.type_list(left);
            let right = interner.type_list(right);
            left.len() == right.len()
                && left
                    .iter()
                    .all(|&l| right.iter().any(|&r| are_types_identical(ctx, l, r)))
        }
        (
            Some(TypeData::Parameterized {
                base: left_base,
                args: left,
            }),
            Some(TypeData::Parameterized {
                base: right_base,
                args: right,
            }),
        ) => {
            let left = interner.type_list(left);
            let right = interner.type_list(right);
            left_base == right_base
                && left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(&l, &r)| are_types_identical(ctx, l, r))
        }
        _ => false,
    }
}

/// Depth-guarded subtype checker.
pub struct SubtypeChecker<'a> {
    ctx: SolverContext<'a>,
    depth: u32,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(ctx: SolverContext<'a>) -> Self {
        Self { ctx, depth: 0 }
    }

    pub fn is_subtype_of(&mut self, source: TypeId, target: TypeId) -> bool {
        if source == target || target == TypeId::MIXED {
            return true;
        }
        if self.depth >= MAX_SUBTYPE_DEPTH {
            trace!(source = source.0, target = target.0, "subtype depth exceeded");
            return false;
        }
        self.depth += 1;
        let result = self.check(source, target);
        self.depth -= 1;
        result
    }

    fn check(&mut self, source: TypeId, target: TypeId) -> bool {
        let interner = self.ctx.interner;
        let (Some(source_data), Some(target_data)) =
            (interner.lookup(source), interner.lookup(target))
        else {
            return false;
        };

        if let TypeData::Union(members) = source_data {
            return interner
                .type_list(members)
                .iter()
                .all(|&member| self.is_subtype_of(member, target));
        }
        if let TypeData::Union(members) = target_data {
            return interner
                .type_list(members)
                .iter()
                .any(|&member| self.is_subtype_of(source, member));
        }

        match (source_data, target_data) {
            (TypeData::TemplateRef(template), _) => self
                .ctx
                .store
                .bound_of(template)
                .is_some_and(|bound| bound != source && self.is_subtype_of(bound, target)),
            (TypeData::Concrete(source_name), TypeData::Concrete(target_name)) => {
                self.ctx.hierarchy.is_subtype(source_name, target_name)
                    || upcast_to_base(&self.ctx, source, target_name).is_some()
            }
            (TypeData::Parameterized { base, .. }, TypeData::Concrete(target_name)) => {
                base == target_name
                    || self.ctx.hierarchy.is_subtype(base, target_name)
                    || upcast_to_base(&self.ctx, source, target_name).is_some()
            }
            (
                TypeData::Concrete(_) | TypeData::Parameterized { .. },
                TypeData::Parameterized { base, args },
            ) => {
                let Some(view) = upcast_to_base(&self.ctx, source, base) else {
                    return false;
                };
                let Some((_, view_args)) = interner.nominal_parts(view) else {
                    return false;
                };
                let target_args = interner.type_list(args);
                view_args.len() == target_args.len()
                    && view_args
                        .iter()
                        .zip(target_args.iter())
                        .all(|(&s, &t)| are_types_identical(&self.ctx, s, t))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../tests/relation_tests.rs"]
mod tests;
