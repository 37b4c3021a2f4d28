//! Shared read-only context for checking queries.

use crate::def::DeclarationStore;
use crate::hierarchy::NominalHierarchy;
use crate::intern::TypeInterner;

/// Everything a checking query reads: interned types, registered
/// declarations and the nominal hierarchy.
///
/// The context is `Copy` and borrows immutably, so independent call sites can
/// be checked from several threads against the same context.
#[derive(Clone, Copy)]
pub struct SolverContext<'a> {
    pub interner: &'a TypeInterner,
    pub store: &'a DeclarationStore,
    pub hierarchy: &'a dyn NominalHierarchy,
}

impl<'a> SolverContext<'a> {
    pub fn new(
        interner: &'a TypeInterner,
        store: &'a DeclarationStore,
        hierarchy: &'a dyn NominalHierarchy,
    ) -> Self {
        Self {
            interner,
            store,
            hierarchy,
        }
    }
}
