//! Declaration identifiers and the template declaration registry.
//!
//! Every function, class and method the checker knows about is registered in
//! a `DeclarationStore` and referenced by a `DeclId`. A declaration owns its
//! template types: a template is visible inside its owner and, for methods,
//! inside the methods of the owning class. There is no global template
//! namespace.
//!
//! The store is populated once while declarations are lowered (append-only)
//! and is read-only while call sites are checked, so it can be shared across
//! threads.

use crate::diagnostics::SolverError;
use crate::hierarchy::NominalHierarchy;
use crate::intern::TypeInterner;
use crate::types::{ParamInfo, TemplateRef, TypeData, TypeId};
use bitflags::bitflags;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use templar_common::interner::Atom;
use tracing::{debug, trace};

/// Global counter for assigning unique instance IDs to `DeclarationStore` instances.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// DeclId
// =============================================================================

/// Identifier of a registered function, class or method.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl DeclId {
    /// Sentinel value for invalid `DeclId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DeclId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// Kind of declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// Free function: `function identity($x)`
    Function,
    /// Class or interface: `class Collection`
    Class,
    /// Method owned by a class: `Collection::get()`
    Method,
}

bitflags! {
    /// Syntactic positions a template appears in across its owner.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TemplatePositions: u8 {
        const PARAMETER = 1 << 0;
        const RETURN = 1 << 1;
        const FIELD = 1 << 2;
        const INHERITED = 1 << 3;
    }
}

// =============================================================================
// Declaration data
// =============================================================================

/// A template type declared on a function, class or method.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TemplateDeclaration {
    pub name: Atom,
    /// Upper bound; `None` means the implicit top type `mixed`.
    pub bound: Option<TypeId>,
    pub owner: DeclId,
    pub positions: TemplatePositions,
}

impl TemplateDeclaration {
    pub fn effective_bound(&self) -> TypeId {
        self.bound.unwrap_or(TypeId::MIXED)
    }
}

/// Arguments a class supplies for a generic ancestor
/// (`@extends Collection<int>`, `@implements Iterator<T>`, `@use Cache<T>`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InheritedType {
    pub base: Atom,
    pub args: Vec<TypeId>,
}

/// The checkable shape of a function or method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub owner: DeclId,
    /// Inference targets in declaration order.
    pub templates: Vec<TemplateDeclaration>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

impl Signature {
    pub fn param_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.params.iter().map(|p| p.type_id)
    }

    pub fn template(&self, name: Atom) -> Option<&TemplateDeclaration> {
        self.templates.iter().find(|t| t.name == name)
    }
}

/// Everything recorded about one declaration.
#[derive(Clone, Debug)]
pub struct DeclarationInfo {
    pub kind: DeclKind,
    pub name: Atom,
    /// Enclosing class of a method.
    pub parent: Option<DeclId>,
    pub templates: Vec<TemplateDeclaration>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    /// Classes only: generic ancestors and the arguments supplied for them.
    pub inherited: Vec<InheritedType>,
    /// Classes only: declared properties.
    pub properties: Vec<(Atom, TypeId)>,
    /// Classes only: methods in declaration order.
    pub methods: Vec<(Atom, DeclId)>,
}

impl DeclarationInfo {
    fn new(kind: DeclKind, name: Atom, parent: Option<DeclId>) -> Self {
        Self {
            kind,
            name,
            parent,
            templates: Vec::new(),
            params: Vec::new(),
            return_type: TypeId::MIXED,
            inherited: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn template(&self, name: Atom) -> Option<&TemplateDeclaration> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn method(&self, name: Atom) -> Option<DeclId> {
        self.methods
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| *id)
    }
}

// =============================================================================
// DeclarationStore
// =============================================================================

/// Thread-safe registry of declarations and their templates.
pub struct DeclarationStore {
    /// Unique instance ID for debugging
    instance_id: u64,
    definitions: DashMap<DeclId, DeclarationInfo>,
    functions: DashMap<Atom, DeclId>,
    classes: DashMap<Atom, DeclId>,
    next_id: AtomicU32,
}

impl Default for DeclarationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationStore {
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "DeclarationStore::new");
        Self {
            instance_id,
            definitions: DashMap::new(),
            functions: DashMap::new(),
            classes: DashMap::new(),
            next_id: AtomicU32::new(DeclId::FIRST_VALID),
        }
    }

    fn register(&self, info: DeclarationInfo) -> DeclId {
        let id = DeclId(self.next_id.fetch_add(1, Ordering::SeqCst));
        trace!(
            instance_id = self.instance_id,
            decl_id = id.0,
            kind = ?info.kind,
            "DeclarationStore::register"
        );
        self.definitions.insert(id, info);
        id
    }

    /// Register a free function. A later declaration with the same name
    /// replaces the earlier one in name lookups.
    pub fn declare_function(&self, name: Atom) -> DeclId {
        let id = self.register(DeclarationInfo::new(DeclKind::Function, name, None));
        self.functions.insert(name, id);
        id
    }

    /// Register a class or interface.
    pub fn declare_class(&self, name: Atom) -> DeclId {
        let id = self.register(DeclarationInfo::new(DeclKind::Class, name, None));
        self.classes.insert(name, id);
        id
    }

    /// Register a method on `class`.
    pub fn declare_method(&self, class: DeclId, name: Atom) -> Result<DeclId, SolverError> {
        let class_name = self.expect_kind(class, DeclKind::Class)?;
        let id = self.register(DeclarationInfo::new(DeclKind::Method, name, Some(class)));
        if let Some(mut entry) = self.definitions.get_mut(&class) {
            entry.methods.push((name, id));
        }
        trace!(class = class_name.0, method = name.0, "declare_method");
        Ok(id)
    }

    /// Declare a template type on `owner`.
    ///
    /// Fails with `DuplicateTemplate` when `owner` already declares `name`.
    pub fn declare_template(
        &self,
        owner: DeclId,
        name: Atom,
        bound: Option<TypeId>,
    ) -> Result<TemplateDeclaration, SolverError> {
        let mut entry = self
            .definitions
            .get_mut(&owner)
            .ok_or(SolverError::UnregisteredDeclaration { id: owner })?;
        if entry.template(name).is_some() {
            return Err(SolverError::DuplicateTemplate { owner, name });
        }
        let template = TemplateDeclaration {
            name,
            bound,
            owner,
            positions: TemplatePositions::empty(),
        };
        entry.templates.push(template);
        trace!(owner = owner.0, template = name.0, ?bound, "declare_template");
        Ok(template)
    }

    /// Define the parameters and return type of a function or method.
    ///
    /// Every type is validated against the owner's scope, and the positions
    /// of the templates it mentions are recorded.
    pub fn define_signature(
        &self,
        interner: &TypeInterner,
        hierarchy: &dyn NominalHierarchy,
        owner: DeclId,
        params: Vec<ParamInfo>,
        return_type: TypeId,
    ) -> Result<(), SolverError> {
        self.validate_bounds(interner, hierarchy, owner)?;
        for param in &params {
            self.validate_type(interner, hierarchy, owner, param.type_id)?;
        }
        self.validate_type(interner, hierarchy, owner, return_type)?;

        for param in &params {
            self.record_positions(interner, param.type_id, TemplatePositions::PARAMETER);
        }
        self.record_positions(interner, return_type, TemplatePositions::RETURN);

        let mut entry = self
            .definitions
            .get_mut(&owner)
            .ok_or(SolverError::UnregisteredDeclaration { id: owner })?;
        entry.params = params;
        entry.return_type = return_type;
        Ok(())
    }

    /// Record the arguments `class` supplies for a generic ancestor.
    pub fn add_inherited(
        &self,
        interner: &TypeInterner,
        hierarchy: &dyn NominalHierarchy,
        class: DeclId,
        base: Atom,
        args: Vec<TypeId>,
    ) -> Result<(), SolverError> {
        self.expect_kind(class, DeclKind::Class)?;
        let expected = self
            .generic_arity(base, hierarchy)
            .ok_or(SolverError::UnknownClass { name: base })?;
        if expected != args.len() {
            return Err(SolverError::TypeArgumentCount {
                base,
                expected,
                actual: args.len(),
            });
        }
        for &arg in &args {
            self.validate_type(interner, hierarchy, class, arg)?;
            self.record_positions(interner, arg, TemplatePositions::INHERITED);
        }
        if let Some(mut entry) = self.definitions.get_mut(&class) {
            entry.inherited.push(InheritedType { base, args });
        }
        Ok(())
    }

    /// Record a property declared on `class`.
    pub fn add_property(
        &self,
        interner: &TypeInterner,
        hierarchy: &dyn NominalHierarchy,
        class: DeclId,
        name: Atom,
        type_id: TypeId,
    ) -> Result<(), SolverError> {
        self.expect_kind(class, DeclKind::Class)?;
        self.validate_type(interner, hierarchy, class, type_id)?;
        self.record_positions(interner, type_id, TemplatePositions::FIELD);
        if let Some(mut entry) = self.definitions.get_mut(&class) {
            entry.properties.push((name, type_id));
        }
        Ok(())
    }

    /// Validate the declared bounds of every template on `owner`.
    ///
    /// A bound may mention templates declared before it on the same owner.
    pub fn validate_bounds(
        &self,
        interner: &TypeInterner,
        hierarchy: &dyn NominalHierarchy,
        owner: DeclId,
    ) -> Result<(), SolverError> {
        let templates = self
            .get(owner)
            .map(|info| info.templates)
            .unwrap_or_default();
        for template in templates {
            if let Some(bound) = template.bound {
                self.validate_type(interner, hierarchy, owner, bound)?;
            }
        }
        Ok(())
    }

    /// Check that every name in `type_id` resolves from `owner`'s scope.
    pub fn validate_type(
        &self,
        interner: &TypeInterner,
        hierarchy: &dyn NominalHierarchy,
        owner: DeclId,
        type_id: TypeId,
    ) -> Result<(), SolverError> {
        match interner.lookup(type_id) {
            None | Some(TypeData::Mixed) => Ok(()),
            Some(TypeData::Concrete(name)) => {
                if self.class_exists(name, hierarchy) {
                    Ok(())
                } else {
                    Err(SolverError::UnknownClass { name })
                }
            }
            Some(TypeData::TemplateRef(template)) => {
                if self.is_template_visible(owner, template) {
                    Ok(())
                } else {
                    Err(SolverError::UnknownTemplate {
                        owner,
                        name: template.name,
                    })
                }
            }
            Some(TypeData::Parameterized { base, args }) => {
                let args = interner.type_list(args);
                let expected = self
                    .generic_arity(base, hierarchy)
                    .ok_or(SolverError::UnknownClass { name: base })?;
                if expected != args.len() {
                    return Err(SolverError::TypeArgumentCount {
                        base,
                        expected,
                        actual: args.len(),
                    });
                }
                for &arg in args.iter() {
                    self.validate_type(interner, hierarchy, owner, arg)?;
                }
                Ok(())
            }
            Some(TypeData::Union(list)) => {
                for &member in interner.type_list(list).iter() {
                    self.validate_type(interner, hierarchy, owner, member)?;
                }
                Ok(())
            }
        }
    }

    fn record_positions(
        &self,
        interner: &TypeInterner,
        type_id: TypeId,
        position: TemplatePositions,
    ) {
        match interner.lookup(type_id) {
            Some(TypeData::TemplateRef(template)) => {
                if let Some(mut entry) = self.definitions.get_mut(&template.owner)
                    && let Some(decl) = entry
                        .templates
                        .iter_mut()
                        .find(|t| t.name == template.name)
                {
                    decl.positions |= position;
                }
            }
            Some(TypeData::Parameterized { args, .. }) | Some(TypeData::Union(args)) => {
                for &inner in interner.type_list(args).iter() {
                    self.record_positions(interner, inner, position);
                }
            }
            _ => {}
        }
    }

    fn expect_kind(&self, id: DeclId, kind: DeclKind) -> Result<Atom, SolverError> {
        match self.definitions.get(&id) {
            Some(entry) if entry.kind == kind => Ok(entry.name),
            Some(entry) => {
                debug!(
                    decl_id = id.0,
                    found = ?entry.kind,
                    expected = ?kind,
                    "declaration kind mismatch"
                );
                Err(SolverError::UnknownDeclaration { name: entry.name })
            }
            None => Err(SolverError::UnregisteredDeclaration { id }),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get(&self, id: DeclId) -> Option<DeclarationInfo> {
        self.definitions.get(&id).map(|r| r.clone())
    }

    pub fn contains(&self, id: DeclId) -> bool {
        self.definitions.contains_key(&id)
    }

    pub fn get_kind(&self, id: DeclId) -> Option<DeclKind> {
        self.definitions.get(&id).map(|r| r.kind)
    }

    pub fn get_name(&self, id: DeclId) -> Option<Atom> {
        self.definitions.get(&id).map(|r| r.name)
    }

    pub fn get_parent(&self, id: DeclId) -> Option<DeclId> {
        self.definitions.get(&id).and_then(|r| r.parent)
    }

    pub fn function_by_name(&self, name: Atom) -> Option<DeclId> {
        self.functions.get(&name).map(|r| *r)
    }

    pub fn class_by_name(&self, name: Atom) -> Option<DeclId> {
        self.classes.get(&name).map(|r| *r)
    }

    /// Templates declared directly on `owner`.
    pub fn templates(&self, owner: DeclId) -> Vec<TemplateDeclaration> {
        self.definitions
            .get(&owner)
            .map(|r| r.templates.clone())
            .unwrap_or_default()
    }

    /// Look up a template visible from `owner`: its own templates first,
    /// then those of the enclosing class.
    pub fn lookup_template(
        &self,
        owner: DeclId,
        name: Atom,
    ) -> Result<TemplateDeclaration, SolverError> {
        let entry = self
            .definitions
            .get(&owner)
            .ok_or(SolverError::UnknownTemplate { owner, name })?;
        if let Some(template) = entry.template(name) {
            return Ok(*template);
        }
        let parent = entry.parent;
        drop(entry);
        parent
            .and_then(|class| self.definitions.get(&class))
            .and_then(|class| class.template(name).copied())
            .ok_or(SolverError::UnknownTemplate { owner, name })
    }

    /// Declared bound of a template visible from `owner`, or `mixed`.
    pub fn resolve_bound(&self, name: Atom, owner: DeclId) -> Result<TypeId, SolverError> {
        self.lookup_template(owner, name)
            .map(|template| template.effective_bound())
    }

    /// Bound of the template a `TemplateRef` points at.
    pub fn bound_of(&self, template: TemplateRef) -> Option<TypeId> {
        self.definitions
            .get(&template.owner)
            .and_then(|r| r.template(template.name).map(|t| t.effective_bound()))
    }

    pub fn is_template_visible(&self, owner: DeclId, template: TemplateRef) -> bool {
        let declares = |id: DeclId| {
            self.definitions
                .get(&id)
                .is_some_and(|r| r.template(template.name).is_some())
        };
        if template.owner == owner {
            return declares(owner);
        }
        self.get_parent(owner) == Some(template.owner) && declares(template.owner)
    }

    /// The inference view of a function or method.
    pub fn signature(&self, id: DeclId) -> Option<Signature> {
        self.definitions.get(&id).and_then(|r| match r.kind {
            DeclKind::Function | DeclKind::Method => Some(Signature {
                owner: id,
                templates: r.templates.clone(),
                params: r.params.clone(),
                return_type: r.return_type,
            }),
            DeclKind::Class => None,
        })
    }

    /// A class exists when it is declared here or known to the hierarchy.
    pub fn class_exists(&self, name: Atom, hierarchy: &dyn NominalHierarchy) -> bool {
        self.classes.contains_key(&name) || hierarchy.class_exists(name)
    }

    /// Number of template arguments `base` takes, if `base` is known.
    pub fn generic_arity(&self, base: Atom, hierarchy: &dyn NominalHierarchy) -> Option<usize> {
        if let Some(class) = self.class_by_name(base) {
            return self.definitions.get(&class).map(|r| r.templates.len());
        }
        hierarchy
            .generic_arity(base)
            .or_else(|| hierarchy.class_exists(base).then_some(0))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Get all `DeclId`s (for debugging/testing).
    pub fn all_ids(&self) -> Vec<DeclId> {
        let mut ids: Vec<DeclId> = self.definitions.iter().map(|r| *r.key()).collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
