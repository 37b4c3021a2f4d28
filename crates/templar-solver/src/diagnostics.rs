//! Checking failures and their rendering.
//!
//! Failures are collected as structured `SolverError` values holding type
//! handles. Strings are only produced when a failure is rendered into a
//! `Diagnostic`, so tentative checks (union member trials) never pay for
//! formatting.

use crate::def::DeclId;
use crate::format::TypeFormatter;
use crate::types::TypeId;
use crate::variance::UsageKind;
use templar_common::diagnostics::{Diagnostic, diagnostic_codes, format_message};
use templar_common::interner::Atom;

/// Why a declaration or a call/instantiation site was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolverError {
    /// Argument count does not match the parameter count.
    Arity { expected: usize, actual: usize },
    /// An argument (or nested argument) does not fit the declared type.
    TypeMismatch { expected: TypeId, actual: TypeId },
    /// No parameter or expected type determines the template.
    UnderconstrainedTemplate { template: Atom },
    /// Two positions bind the same template to unrelated types.
    InconsistentTemplate {
        template: Atom,
        first: TypeId,
        second: TypeId,
    },
    /// The inferred type is not a subtype of the template's bound.
    BoundViolation {
        template: Atom,
        bound: TypeId,
        inferred: TypeId,
    },
    /// `G<X>` used as `G<Y>` where `X` and `Y` are related but not identical.
    VarianceViolation {
        base: Atom,
        /// Template at the offending position; `None` for built-in containers.
        template: Option<Atom>,
        index: usize,
        source: TypeId,
        target: TypeId,
        usage: UsageKind,
    },
    /// A template name not visible from the declaration that uses it.
    UnknownTemplate { owner: DeclId, name: Atom },
    /// A template declared twice on the same owner.
    DuplicateTemplate { owner: DeclId, name: Atom },
    /// A nominal type the hierarchy does not know.
    UnknownClass { name: Atom },
    /// A generic base applied to the wrong number of arguments.
    TypeArgumentCount {
        base: Atom,
        expected: usize,
        actual: usize,
    },
    /// A function, class or method id/name that is not registered.
    UnknownDeclaration { name: Atom },
    /// A declaration id the store never issued.
    UnregisteredDeclaration { id: DeclId },
    /// A method that the receiver's class (and its ancestors) does not declare.
    UnknownMethod { class: Atom, method: Atom },
    /// A method call on a receiver that is not a class instance.
    MethodOnNonClass { receiver: TypeId, method: Atom },
}

impl SolverError {
    pub fn code(&self) -> u32 {
        match self {
            SolverError::Arity { .. } => diagnostic_codes::ARGUMENT_COUNT_MISMATCH,
            SolverError::TypeMismatch { .. } => diagnostic_codes::TYPE_MISMATCH,
            SolverError::UnderconstrainedTemplate { .. } => {
                diagnostic_codes::UNDERCONSTRAINED_TEMPLATE
            }
            SolverError::InconsistentTemplate { .. } => diagnostic_codes::INCONSISTENT_TEMPLATE,
            SolverError::BoundViolation { .. } => diagnostic_codes::BOUND_VIOLATION,
            SolverError::VarianceViolation { .. } => diagnostic_codes::VARIANCE_VIOLATION,
            SolverError::UnknownTemplate { .. } => diagnostic_codes::UNKNOWN_TEMPLATE,
            SolverError::DuplicateTemplate { .. } => diagnostic_codes::DUPLICATE_TEMPLATE,
            SolverError::UnknownClass { .. } => diagnostic_codes::UNKNOWN_CLASS,
            SolverError::TypeArgumentCount { .. } => diagnostic_codes::TYPE_ARGUMENT_COUNT,
            SolverError::UnknownDeclaration { .. }
            | SolverError::UnregisteredDeclaration { .. } => diagnostic_codes::UNKNOWN_DECLARATION,
            SolverError::UnknownMethod { .. } | SolverError::MethodOnNonClass { .. } => {
                diagnostic_codes::UNKNOWN_METHOD
            }
        }
    }

    /// Declaration-time errors are reported once per declaration rather than
    /// once per site.
    pub fn is_declaration_error(&self) -> bool {
        matches!(
            self,
            SolverError::UnknownTemplate { .. }
                | SolverError::DuplicateTemplate { .. }
                | SolverError::UnknownClass { .. }
                | SolverError::TypeArgumentCount { .. }
        )
    }

    /// Render the failure as message text.
    pub fn render(&self, fmt: &TypeFormatter<'_>) -> String {
        match self {
            SolverError::Arity { expected, actual } => format_message(
                "Expected {0} arguments, but got {1}.",
                &[&expected.to_string(), &actual.to_string()],
            ),
            SolverError::TypeMismatch { expected, actual } => format_message(
                "Type '{0}' is not assignable to type '{1}'.",
                &[&fmt.format(*actual), &fmt.format(*expected)],
            ),
            SolverError::UnderconstrainedTemplate { template } => format_message(
                "Unable to resolve the template type {0}.",
                &[&fmt.atom(*template)],
            ),
            SolverError::InconsistentTemplate {
                template,
                first,
                second,
            } => format_message(
                "Template type {0} is inferred as both '{1}' and '{2}'.",
                &[&fmt.atom(*template), &fmt.format(*first), &fmt.format(*second)],
            ),
            SolverError::BoundViolation {
                template,
                bound,
                inferred,
            } => format_message(
                "Type '{0}' does not satisfy the bound '{1}' of template type {2}.",
                &[&fmt.format(*inferred), &fmt.format(*bound), &fmt.atom(*template)],
            ),
            SolverError::VarianceViolation {
                base,
                template,
                index,
                source,
                target,
                usage,
            } => {
                let position = match template {
                    Some(name) => fmt.atom(*name),
                    None => format!("#{}", index + 1),
                };
                format_message(
                    "Template type {0} of {1} is invariant ({2}): '{3}' is not identical to '{4}'.",
                    &[
                        &position,
                        &fmt.atom(*base),
                        usage.describe(),
                        &fmt.format(*source),
                        &fmt.format(*target),
                    ],
                )
            }
            SolverError::UnknownTemplate { owner, name } => format_message(
                "Template type {0} is not declared on {1}.",
                &[&fmt.atom(*name), &fmt.decl(*owner)],
            ),
            SolverError::DuplicateTemplate { owner, name } => format_message(
                "Template type {0} is already declared on {1}.",
                &[&fmt.atom(*name), &fmt.decl(*owner)],
            ),
            SolverError::UnknownClass { name } => {
                format_message("Class '{0}' not found.", &[&fmt.atom(*name)])
            }
            SolverError::TypeArgumentCount {
                base,
                expected,
                actual,
            } => format_message(
                "Generic type '{0}' requires {1} type arguments, but {2} given.",
                &[&fmt.atom(*base), &expected.to_string(), &actual.to_string()],
            ),
            SolverError::UnknownDeclaration { name } => {
                format_message("Declaration '{0}' not found.", &[&fmt.atom(*name)])
            }
            SolverError::UnregisteredDeclaration { id } => {
                format_message("Declaration {0} is not registered.", &[&fmt.decl(*id)])
            }
            SolverError::UnknownMethod { class, method } => format_message(
                "Method {0}::{1}() not found.",
                &[&fmt.atom(*class), &fmt.atom(*method)],
            ),
            SolverError::MethodOnNonClass { receiver, method } => format_message(
                "Cannot call method {0}() on '{1}'.",
                &[&fmt.atom(*method), &fmt.format(*receiver)],
            ),
        }
    }

    pub fn to_diagnostic(
        &self,
        fmt: &TypeFormatter<'_>,
        file: &str,
        start: u32,
        length: u32,
    ) -> Diagnostic {
        Diagnostic::error(file.to_string(), start, length, self.render(fmt), self.code())
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
