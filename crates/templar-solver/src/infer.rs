//! Call-site template inference using Union-Find.
//!
//! Each template of the called signature gets an inference variable in an
//! `ena` unification table. Declared parameter types are walked pairwise with
//! the argument types; wherever a declared type is one of the signature's
//! own templates, the argument type is proposed as its binding.
//!
//! Key behaviors:
//! - nested unification through generic arguments (`array<T>` vs `array<int>`)
//! - union members are tried in declaration order; a failed trial is rolled
//!   back with a table snapshot
//! - an argument that is itself a template reference (a value typed by the
//!   caller's own template) binds symbolically, so templates flow through
//!   nested generic calls without being forced to a concrete type
//! - templates no argument determines may be taken from the expected
//!   return type
//! - the completed substitution is checked against every template bound

use crate::bounds::{check_consistency, check_substitution_bounds};
use crate::context::SolverContext;
use crate::def::{DeclId, Signature};
use crate::diagnostics::SolverError;
use crate::inheritance::upcast_to_base;
use crate::instantiate::{TypeSubstitution, contains_templates_of};
use crate::relation::{are_types_identical, is_subtype_of};
use crate::types::{TypeData, TypeId};
use crate::variance::VarianceEnforcer;
use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use templar_common::interner::Atom;
use templar_common::limits::MAX_UNIFY_DEPTH;
use tracing::{debug, trace};

/// An inference variable standing for one template of the called signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InferenceVar(pub u32);

/// Current binding of an inference variable.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InferenceValue {
    pub type_id: Option<TypeId>,
    /// Bound from an invariant position (inside a generic's arguments); the
    /// binding may no longer be narrowed.
    pub pinned: bool,
}

impl UnifyKey for InferenceVar {
    type Value = InferenceValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        InferenceVar(u)
    }

    fn tag() -> &'static str {
        "InferenceVar"
    }
}

impl UnifyValue for InferenceValue {
    type Error = NoError;

    // Candidates are reconciled by `InferenceContext::propose` before they
    // are recorded, so the incoming value always wins.
    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        if b.type_id.is_some() { Ok(*b) } else { Ok(*a) }
    }
}

/// How an argument type flows into the declared type being unified.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Flow {
    /// Top-level parameter: any subtype of the declared type is accepted.
    Assignable,
    /// Generic argument position: only identical types are accepted.
    Invariant,
}

/// Infer the substitution for one call site.
pub fn infer(
    ctx: &SolverContext<'_>,
    signature: &Signature,
    args: &[TypeId],
) -> Result<TypeSubstitution, SolverError> {
    infer_with_context(ctx, signature, args, None)
}

/// Infer the substitution for one call site, using `expected_return` (the
/// type the call's result is assigned to) for templates that no argument
/// determines.
pub fn infer_with_context(
    ctx: &SolverContext<'_>,
    signature: &Signature,
    args: &[TypeId],
    expected_return: Option<TypeId>,
) -> Result<TypeSubstitution, SolverError> {
    if signature.params.len() != args.len() {
        return Err(SolverError::Arity {
            expected: signature.params.len(),
            actual: args.len(),
        });
    }

    let mut infer_ctx = InferenceContext::new(*ctx, signature);
    for (param, &arg) in signature.params.iter().zip(args) {
        infer_ctx.unify(param.type_id, arg)?;
    }
    if let Some(expected) = expected_return {
        infer_ctx.apply_expected_return(signature.return_type, expected);
    }
    infer_ctx.finish(signature)
}

/// Inference state for a single call site.
pub struct InferenceContext<'a> {
    ctx: SolverContext<'a>,
    owner: DeclId,
    table: InPlaceUnificationTable<InferenceVar>,
    vars: IndexMap<Atom, InferenceVar, FxBuildHasher>,
}

impl<'a> InferenceContext<'a> {
    pub fn new(ctx: SolverContext<'a>, signature: &Signature) -> Self {
        let mut table = InPlaceUnificationTable::new();
        let vars = signature
            .templates
            .iter()
            .map(|template| (template.name, table.new_key(InferenceValue::default())))
            .collect();
        Self {
            ctx,
            owner: signature.owner,
            table,
            vars,
        }
    }

    /// Current binding of template `name`.
    pub fn probe(&mut self, name: Atom) -> Option<TypeId> {
        let var = *self.vars.get(&name)?;
        self.table.probe_value(var).type_id
    }

    /// Unify a declared parameter type with an argument type.
    pub fn unify(&mut self, declared: TypeId, actual: TypeId) -> Result<(), SolverError> {
        self.unify_at(declared, actual, Flow::Assignable, 0)
    }

    fn target(&self, declared: TypeId) -> Option<(Atom, InferenceVar)> {
        let template = self.ctx.interner.template_ref_of(declared)?;
        if template.owner != self.owner {
            return None;
        }
        self.vars
            .get(&template.name)
            .map(|&var| (template.name, var))
    }

    fn unify_at(
        &mut self,
        declared: TypeId,
        actual: TypeId,
        flow: Flow,
        depth: u32,
    ) -> Result<(), SolverError> {
        if depth > MAX_UNIFY_DEPTH {
            return Err(SolverError::TypeMismatch {
                expected: declared,
                actual,
            });
        }

        if let Some((name, var)) = self.target(declared) {
            return self.propose(name, var, actual, flow);
        }

        let interner = self.ctx.interner;
        if !contains_templates_of(interner, declared, self.owner) {
            return match flow {
                Flow::Assignable => {
                    VarianceEnforcer::new(self.ctx).check_assignment(actual, declared)
                }
                Flow::Invariant if are_types_identical(&self.ctx, declared, actual) => Ok(()),
                Flow::Invariant => Err(SolverError::TypeMismatch {
                    expected: declared,
                    actual,
                }),
            };
        }

        match interner.lookup(declared) {
            Some(TypeData::Parameterized { base, args }) => {
                if flow == Flow::Assignable
                    && let Some(members) = interner.union_members(actual)
                {
                    for &member in members.iter() {
                        self.unify_at(declared, member, flow, depth + 1)?;
                    }
                    return Ok(());
                }

                let mismatch = SolverError::TypeMismatch {
                    expected: declared,
                    actual,
                };
                let Some(actual_args) = self.generic_view(actual, base, flow) else {
                    return Err(mismatch);
                };
                let declared_args = interner.type_list(args);
                if declared_args.len() != actual_args.len() {
                    return Err(mismatch);
                }

                for (index, (&d, &a)) in declared_args.iter().zip(actual_args.iter()).enumerate() {
                    if contains_templates_of(interner, d, self.owner) {
                        self.unify_at(d, a, Flow::Invariant, depth + 1)?;
                    } else if !are_types_identical(&self.ctx, d, a) {
                        return Err(self.invariance_error(base, index, a, d).unwrap_or(mismatch));
                    }
                }
                Ok(())
            }
            Some(TypeData::Union(members)) => {
                let members = interner.type_list(members);
                for &member in members.iter() {
                    let snapshot = self.table.snapshot();
                    match self.unify_at(member, actual, flow, depth + 1) {
                        Ok(()) => {
                            self.table.commit(snapshot);
                            return Ok(());
                        }
                        Err(err) => {
                            trace!(member = member.0, ?err, "union member trial failed");
                            self.table.rollback_to(snapshot);
                        }
                    }
                }

                // `int|string` passed to `T|null`: each argument member must
                // fit some declared member.
                if flow == Flow::Assignable
                    && let Some(actual_members) = interner.union_members(actual)
                {
                    for &member in actual_members.iter() {
                        self.unify_at(declared, member, flow, depth + 1)?;
                    }
                    return Ok(());
                }

                Err(SolverError::TypeMismatch {
                    expected: declared,
                    actual,
                })
            }
            _ => Err(SolverError::TypeMismatch {
                expected: declared,
                actual,
            }),
        }
    }

    /// Arguments of `actual` viewed as an instance of `base`.
    ///
    /// A top-level argument may be any class inheriting `base` (`IntList`
    /// for `Collection<T>`); a template-typed argument is viewed through its
    /// bound. Inside generic arguments the base must match exactly.
    fn generic_view(&self, actual: TypeId, base: Atom, flow: Flow) -> Option<Vec<TypeId>> {
        let interner = self.ctx.interner;
        let source = match interner.template_ref_of(actual) {
            Some(template) if flow == Flow::Assignable => self.ctx.store.bound_of(template)?,
            _ => actual,
        };
        let view = match flow {
            Flow::Assignable => upcast_to_base(&self.ctx, source, base)?,
            Flow::Invariant => source,
        };
        match interner.lookup(view) {
            Some(TypeData::Parameterized { base: view_base, args }) if view_base == base => {
                Some(interner.type_list(args).to_vec())
            }
            _ => None,
        }
    }

    fn invariance_error(
        &self,
        base: Atom,
        index: usize,
        source: TypeId,
        target: TypeId,
    ) -> Option<SolverError> {
        if !is_subtype_of(&self.ctx, source, target) && !is_subtype_of(&self.ctx, target, source) {
            return None;
        }
        let (template, usage) = VarianceEnforcer::new(self.ctx).usage_at(base, index);
        Some(SolverError::VarianceViolation {
            base,
            template,
            index,
            source,
            target,
            usage,
        })
    }

    /// Propose `actual` as the binding of template `name`.
    ///
    /// A second proposal from an assignable position must be consistent with
    /// the first (the narrower of two related types is kept). Bindings taken
    /// from invariant positions are pinned: later proposals must match them
    /// exactly (invariant) or be subtypes of them (assignable).
    fn propose(
        &mut self,
        name: Atom,
        var: InferenceVar,
        actual: TypeId,
        flow: Flow,
    ) -> Result<(), SolverError> {
        let current = self.table.probe_value(var);
        let inconsistent = |first: TypeId| SolverError::InconsistentTemplate {
            template: name,
            first,
            second: actual,
        };

        let next = match (current.type_id, flow) {
            (None, _) => InferenceValue {
                type_id: Some(actual),
                pinned: flow == Flow::Invariant,
            },
            (Some(previous), Flow::Invariant) => {
                let compatible = if current.pinned {
                    are_types_identical(&self.ctx, previous, actual)
                } else {
                    is_subtype_of(&self.ctx, previous, actual)
                };
                if !compatible {
                    return Err(inconsistent(previous));
                }
                InferenceValue {
                    type_id: Some(actual),
                    pinned: true,
                }
            }
            (Some(previous), Flow::Assignable) if current.pinned => {
                if !is_subtype_of(&self.ctx, actual, previous) {
                    return Err(inconsistent(previous));
                }
                current
            }
            (Some(previous), Flow::Assignable) => {
                let merged =
                    check_consistency(&self.ctx, previous, actual).ok_or(inconsistent(previous))?;
                InferenceValue {
                    type_id: Some(merged),
                    pinned: false,
                }
            }
        };

        debug!(
            template = name.0,
            binding = ?next.type_id,
            pinned = next.pinned,
            "bind template"
        );
        self.table.union_value(var, next);
        Ok(())
    }

    /// Fill still-unbound templates from the type the call's result flows
    /// into. Bindings already taken from arguments are kept as they are, and
    /// a context that does not fit the return type is ignored.
    pub fn apply_expected_return(&mut self, return_type: TypeId, expected: TypeId) {
        let vars: Vec<InferenceVar> = self.vars.values().copied().collect();
        let before: Vec<(InferenceVar, InferenceValue)> = vars
            .iter()
            .map(|&var| (var, self.table.probe_value(var)))
            .collect();
        if before.iter().all(|(_, value)| value.type_id.is_some()) {
            return;
        }

        let snapshot = self.table.snapshot();
        match self.unify_at(return_type, expected, Flow::Assignable, 0) {
            Ok(()) => {
                self.table.commit(snapshot);
                for (var, value) in before {
                    if value.type_id.is_some() {
                        self.table.union_value(var, value);
                    }
                }
            }
            Err(err) => {
                debug!(?err, "expected return type ignored");
                self.table.rollback_to(snapshot);
            }
        }
    }

    /// Build the substitution and check it against the declared bounds.
    pub fn finish(mut self, signature: &Signature) -> Result<TypeSubstitution, SolverError> {
        let mut substitution = TypeSubstitution::new(self.owner);
        for template in &signature.templates {
            match self.probe(template.name) {
                Some(binding) => substitution.insert(template.name, binding),
                None => {
                    debug!(template = template.name.0, "underconstrained template");
                    return Err(SolverError::UnderconstrainedTemplate {
                        template: template.name,
                    });
                }
            }
        }
        check_substitution_bounds(&self.ctx, signature, &substitution)?;
        Ok(substitution)
    }
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
