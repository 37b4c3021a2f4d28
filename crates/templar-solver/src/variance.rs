//! Variance classification and invariance enforcement for generic classes.
//!
//! Every class template is classified by how the class's members use it:
//!
//! - **Produced**: method return types hand values of the template out
//! - **Consumed**: method parameters take values of the template in
//! - **Both**: properties, positions nested inside another generic's
//!   arguments, or a mix of the above
//!
//! Enforcement does not depend on the classification. Every template is
//! invariant: `Collection<C>` is assignable to `Collection<B>` only when `C`
//! and `B` are identical. A template used in a `set(T $item)` member and a
//! `get(): T` member of the same class would let a caller write a `B` into a
//! `Collection<C>` under covariance, or read a `B` out of a `Collection<C>`
//! typed as `Collection<B>` under contravariance. The rule therefore applies
//! to the template across the whole declaration, not member by member. The
//! classification is reported alongside violations.

use crate::context::SolverContext;
use crate::def::DeclId;
use crate::diagnostics::SolverError;
use crate::inheritance::upcast_to_base;
use crate::relation::{are_types_identical, is_subtype_of};
use crate::types::{TypeData, TypeId};
use bitflags::bitflags;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::Serialize;
use templar_common::interner::Atom;
use templar_common::limits::{MAX_INHERITANCE_DEPTH, MAX_SUBTYPE_DEPTH};
use tracing::debug;

bitflags! {
    /// How a class template is used across the class's members.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TemplateUsage: u8 {
        /// Appears in an output position (`get(): T`).
        const PRODUCED = 1 << 0;
        /// Appears in an input position (`set(T $item)`).
        const CONSUMED = 1 << 1;
        const BOTH = Self::PRODUCED.bits() | Self::CONSUMED.bits();
    }
}

impl TemplateUsage {
    pub fn kind(self) -> UsageKind {
        match (
            self.contains(TemplateUsage::PRODUCED),
            self.contains(TemplateUsage::CONSUMED),
        ) {
            (false, false) => UsageKind::Unused,
            (true, false) => UsageKind::ProducedOnly,
            (false, true) => UsageKind::ConsumedOnly,
            (true, true) => UsageKind::Both,
        }
    }
}

/// Summary of a `TemplateUsage`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UsageKind {
    Unused,
    ProducedOnly,
    ConsumedOnly,
    Both,
}

impl UsageKind {
    pub fn describe(self) -> &'static str {
        match self {
            UsageKind::Unused => "unused",
            UsageKind::ProducedOnly => "produced only",
            UsageKind::ConsumedOnly => "consumed only",
            UsageKind::Both => "produced and consumed",
        }
    }
}

/// Usage of each template of one class, in declaration order.
pub type UsageMap = IndexMap<Atom, TemplateUsage, FxBuildHasher>;

/// Classifies class templates and enforces invariance on assignments.
pub struct VarianceEnforcer<'a> {
    ctx: SolverContext<'a>,
}

impl<'a> VarianceEnforcer<'a> {
    pub fn new(ctx: SolverContext<'a>) -> Self {
        Self { ctx }
    }

    /// Classify every template of `class` over all of its members.
    pub fn classify(&self, class: DeclId) -> Result<UsageMap, SolverError> {
        self.classify_inner(class, 0)
    }

    fn classify_inner(&self, class: DeclId, depth: u32) -> Result<UsageMap, SolverError> {
        let info = self
            .ctx
            .store
            .get(class)
            .ok_or(SolverError::UnregisteredDeclaration { id: class })?;

        let mut usage: UsageMap = info
            .templates
            .iter()
            .map(|t| (t.name, TemplateUsage::empty()))
            .collect();

        for &(_, method) in &info.methods {
            let Some(signature) = self.ctx.store.signature(method) else {
                continue;
            };
            for param in &signature.params {
                self.record(&mut usage, class, param.type_id, TemplateUsage::CONSUMED);
            }
            self.record(
                &mut usage,
                class,
                signature.return_type,
                TemplateUsage::PRODUCED,
            );
        }

        for &(_, property) in &info.properties {
            self.record(&mut usage, class, property, TemplateUsage::BOTH);
        }

        // A template forwarded to an ancestor inherits the ancestor's usage
        // of the position it is forwarded to.
        if depth < MAX_INHERITANCE_DEPTH {
            for inherited in &info.inherited {
                let Some(ancestor) = self.ctx.store.class_by_name(inherited.base) else {
                    continue;
                };
                if ancestor == class {
                    continue;
                }
                let ancestor_usage = self.classify_inner(ancestor, depth + 1)?;
                for (&arg, (_, &position)) in inherited.args.iter().zip(ancestor_usage.iter()) {
                    if !position.is_empty() {
                        self.record(&mut usage, class, arg, position);
                    }
                }
            }
        }

        Ok(usage)
    }

    fn record(
        &self,
        usage: &mut UsageMap,
        class: DeclId,
        type_id: TypeId,
        polarity: TemplateUsage,
    ) {
        let interner = self.ctx.interner;
        match interner.lookup(type_id) {
            Some(TypeData::TemplateRef(template)) if template.owner == class => {
                if let Some(entry) = usage.get_mut(&template.name) {
                    *entry |= polarity;
                }
            }
            Some(TypeData::Union(members)) => {
                for &member in interner.type_list(members).iter() {
                    self.record(usage, class, member, polarity);
                }
            }
            // Arguments of a generic are themselves invariant positions.
            Some(TypeData::Parameterized { args, .. }) => {
                for &arg in interner.type_list(args).iter() {
                    self.record(usage, class, arg, TemplateUsage::BOTH);
                }
            }
            _ => {}
        }
    }

    /// Template name and usage at position `index` of generic `base`.
    ///
    /// Built-in containers have no declaration and are treated as both
    /// produced and consumed.
    pub fn usage_at(&self, base: Atom, index: usize) -> (Option<Atom>, UsageKind) {
        let Some(class) = self.ctx.store.class_by_name(base) else {
            return (None, UsageKind::Both);
        };
        let name = self
            .ctx
            .store
            .templates(class)
            .get(index)
            .map(|template| template.name);
        let usage = name
            .and_then(|name| {
                self.classify(class)
                    .ok()
                    .and_then(|map| map.get(&name).copied())
            })
            .unwrap_or_default();
        (name, usage.kind())
    }

    /// Check that a value of type `source` may flow into a slot of type `target`.
    ///
    /// Fails with `VarianceViolation` when the only obstacle is a generic
    /// argument that is a subtype or supertype of the expected one, and with
    /// `TypeMismatch` otherwise.
    pub fn check_assignment(&self, source: TypeId, target: TypeId) -> Result<(), SolverError> {
        if is_subtype_of(&self.ctx, source, target) {
            return Ok(());
        }
        if let Some(violation) = self.explain_invariance(source, target, 0) {
            debug!(source = source.0, target = target.0, ?violation, "invariance violation");
            return Err(violation);
        }
        Err(SolverError::TypeMismatch {
            expected: target,
            actual: source,
        })
    }

    fn explain_invariance(
        &self,
        source: TypeId,
        target: TypeId,
        depth: u32,
    ) -> Option<SolverError> {
        if depth > MAX_SUBTYPE_DEPTH {
            return None;
        }
        let interner = self.ctx.interner;

        if let Some(members) = interner.union_members(target) {
            return members
                .iter()
                .find_map(|&member| self.explain_invariance(source, member, depth + 1));
        }
        if let Some(members) = interner.union_members(source) {
            return members
                .iter()
                .filter(|&&member| !is_subtype_of(&self.ctx, member, target))
                .find_map(|&member| self.explain_invariance(member, target, depth + 1));
        }

        let Some(TypeData::Parameterized { base, args }) = interner.lookup(target) else {
            return None;
        };
        let view = upcast_to_base(&self.ctx, source, base)?;
        let (_, view_args) = interner.nominal_parts(view)?;
        let target_args = interner.type_list(args);
        if view_args.len() != target_args.len() {
            return None;
        }

        for (index, (&s, &t)) in view_args.iter().zip(target_args.iter()).enumerate() {
            if are_types_identical(&self.ctx, s, t) {
                continue;
            }
            if is_subtype_of(&self.ctx, s, t) || is_subtype_of(&self.ctx, t, s) {
                let (template, usage) = self.usage_at(base, index);
                return Some(SolverError::VarianceViolation {
                    base,
                    template,
                    index,
                    source: s,
                    target: t,
                    usage,
                });
            }
            return self.explain_invariance(s, t, depth + 1);
        }
        None
    }
}

#[cfg(test)]
#[path = "../tests/variance_tests.rs"]
mod tests;
