//! Call-site evaluation: function calls, method calls and deferred bindings.
//!
//! A method call first fixes the class templates from the receiver
//! (`Collection<int>` fixes `T = int` for every method of `Collection`), then
//! infers the method's own templates from the arguments like a function call.

use crate::bounds::check_substitution_bounds;
use crate::context::SolverContext;
use crate::def::{DeclId, Signature, TemplateDeclaration};
use crate::diagnostics::SolverError;
use crate::infer::infer_with_context;
use crate::inheritance::direct_ancestors;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::types::{ParamInfo, TypeId};
use crate::variance::VarianceEnforcer;
use rustc_hash::FxHashSet;
use templar_common::interner::Atom;
use templar_common::limits::MAX_INHERITANCE_DEPTH;
use tracing::{Level, debug, span};

/// Result of a successfully checked call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallOutcome {
    /// Bindings of the callee's own templates.
    pub substitution: TypeSubstitution,
    /// Declared return type with the bindings applied.
    pub return_type: TypeId,
}

/// Evaluates call sites against registered declarations.
pub struct CallEvaluator<'a> {
    ctx: SolverContext<'a>,
}

impl<'a> CallEvaluator<'a> {
    pub fn new(ctx: SolverContext<'a>) -> Self {
        Self { ctx }
    }

    /// Check a call of the function `function`.
    pub fn check_call(
        &self,
        function: DeclId,
        args: &[TypeId],
        expected: Option<TypeId>,
    ) -> Result<CallOutcome, SolverError> {
        let _span = span!(
            Level::DEBUG,
            "check_call",
            function = function.0,
            args = args.len()
        )
        .entered();
        let signature = self.ctx.store.signature(function).ok_or_else(|| {
            match self.ctx.store.get_name(function) {
                Some(name) => SolverError::UnknownDeclaration { name },
                None => SolverError::UnregisteredDeclaration { id: function },
            }
        })?;
        self.evaluate(&signature, args, expected)
    }

    /// Infer and instantiate `signature` for one argument list.
    pub fn evaluate(
        &self,
        signature: &Signature,
        args: &[TypeId],
        expected: Option<TypeId>,
    ) -> Result<CallOutcome, SolverError> {
        let substitution = infer_with_context(&self.ctx, signature, args, expected)?;
        let return_type = instantiate_type(self.ctx.interner, signature.return_type, &substitution);
        debug!(
            owner = signature.owner.0,
            return_type = return_type.0,
            "call evaluated"
        );
        Ok(CallOutcome {
            substitution,
            return_type,
        })
    }

    /// Check `receiver->method(args)`.
    pub fn check_method_call(
        &self,
        receiver: TypeId,
        method: Atom,
        args: &[TypeId],
        expected: Option<TypeId>,
    ) -> Result<CallOutcome, SolverError> {
        let _span = span!(
            Level::DEBUG,
            "check_method_call",
            receiver = receiver.0,
            method = method.0,
            args = args.len()
        )
        .entered();
        let (method_id, view) = self.resolve_method(receiver, method)?;
        let signature = self.ctx.store.signature(method_id).ok_or_else(|| {
            match self.ctx.interner.nominal_parts(view) {
                Some((class, _)) => SolverError::UnknownMethod { class, method },
                None => SolverError::MethodOnNonClass { receiver, method },
            }
        })?;

        let class_subst = self.receiver_substitution(method_id, view);
        let signature = self.bind_class_templates(&signature, &class_subst);
        self.evaluate(&signature, args, expected)
    }

    /// Find `method` on the receiver's class or the nearest ancestor that
    /// declares it. Returns the method and the receiver viewed as an instance
    /// of the declaring class.
    pub fn resolve_method(
        &self,
        receiver: TypeId,
        method: Atom,
    ) -> Result<(DeclId, TypeId), SolverError> {
        let interner = self.ctx.interner;
        let receiver = match interner.template_ref_of(receiver) {
            Some(template) => self.ctx.store.bound_of(template).unwrap_or(receiver),
            None => receiver,
        };
        let Some((class_name, _)) = interner.nominal_parts(receiver) else {
            return Err(SolverError::MethodOnNonClass { receiver, method });
        };

        let mut visited = FxHashSet::default();
        let mut level = vec![receiver];
        for _ in 0..=MAX_INHERITANCE_DEPTH {
            let mut next = Vec::new();
            for ty in level {
                if !visited.insert(ty) {
                    continue;
                }
                let Some((name, _)) = interner.nominal_parts(ty) else {
                    continue;
                };
                if let Some(class) = self.ctx.store.class_by_name(name)
                    && let Some(info) = self.ctx.store.get(class)
                    && let Some(method_id) = info.method(method)
                {
                    return Ok((method_id, ty));
                }
                next.extend(direct_ancestors(&self.ctx, ty));
            }
            if next.is_empty() {
                break;
            }
            level = next;
        }

        Err(SolverError::UnknownMethod {
            class: class_name,
            method,
        })
    }

    /// Class template bindings taken from the receiver's arguments. Missing
    /// arguments of a raw receiver fall back to the template bounds.
    fn receiver_substitution(&self, method_id: DeclId, view: TypeId) -> TypeSubstitution {
        let Some(class) = self.ctx.store.get_parent(method_id) else {
            return TypeSubstitution::new(DeclId::INVALID);
        };
        let templates = self.ctx.store.templates(class);
        let args = self
            .ctx
            .interner
            .nominal_parts(view)
            .map(|(_, args)| args.to_vec())
            .unwrap_or_default();
        let mut subst = TypeSubstitution::from_args(class, &templates, &args);
        for template in templates.iter().skip(args.len()) {
            subst.insert(template.name, template.effective_bound());
        }
        subst
    }

    fn bind_class_templates(
        &self,
        signature: &Signature,
        class_subst: &TypeSubstitution,
    ) -> Signature {
        let interner = self.ctx.interner;
        let apply = |ty: TypeId| instantiate_type(interner, ty, class_subst);
        Signature {
            owner: signature.owner,
            templates: signature
                .templates
                .iter()
                .map(|template| TemplateDeclaration {
                    bound: template.bound.map(apply),
                    ..*template
                })
                .collect(),
            params: signature
                .params
                .iter()
                .map(|param| ParamInfo::new(param.name, apply(param.type_id)))
                .collect(),
            return_type: apply(signature.return_type),
        }
    }

    /// Resolve a substitution inferred inside another generic declaration.
    ///
    /// When `first(array<T> $items)` is called from inside `wrap<T>()`, the
    /// binding `first::T = wrap::T` stays symbolic until `wrap` itself is
    /// called. `outer` is the substitution inferred at that call; the composed
    /// bindings are re-checked against the inner signature's bounds.
    pub fn resolve_deferred(
        &self,
        inner_signature: &Signature,
        deferred: &TypeSubstitution,
        outer: &TypeSubstitution,
    ) -> Result<TypeSubstitution, SolverError> {
        let resolved = deferred.resolve_through(self.ctx.interner, outer);
        check_substitution_bounds(&self.ctx, inner_signature, &resolved)?;
        Ok(resolved)
    }

    /// Check that a value of type `source` may be assigned to `target`.
    pub fn check_assignment(&self, source: TypeId, target: TypeId) -> Result<(), SolverError> {
        VarianceEnforcer::new(self.ctx).check_assignment(source, target)
    }
}

#[cfg(test)]
#[path = "../tests/call_tests.rs"]
mod tests;
