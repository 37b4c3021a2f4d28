//! Template substitution.
//!
//! A `TypeSubstitution` maps the templates of one declaration to types. It is
//! produced by inference for one call site and never mutated after it is
//! handed out. `instantiate_type` applies it to a type.

use crate::def::{DeclId, TemplateDeclaration};
use crate::intern::TypeInterner;
use crate::types::{TemplateRef, TypeData, TypeId};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use templar_common::interner::Atom;

/// Mapping from the templates of `owner` to types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSubstitution {
    owner: DeclId,
    map: IndexMap<Atom, TypeId, FxBuildHasher>,
}

impl TypeSubstitution {
    pub fn new(owner: DeclId) -> Self {
        Self {
            owner,
            map: IndexMap::default(),
        }
    }

    /// Pair templates with explicit arguments, e.g. the arguments of a
    /// `Collection<int>` receiver. Extra templates or arguments are ignored.
    pub fn from_args(owner: DeclId, templates: &[TemplateDeclaration], args: &[TypeId]) -> Self {
        let mut subst = Self::new(owner);
        for (template, &arg) in templates.iter().zip(args) {
            subst.insert(template.name, arg);
        }
        subst
    }

    pub fn owner(&self) -> DeclId {
        self.owner
    }

    pub fn insert(&mut self, name: Atom, type_id: TypeId) {
        self.map.insert(name, type_id);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    /// Binding for a template reference, if it belongs to this substitution's owner.
    pub fn get_ref(&self, template: TemplateRef) -> Option<TypeId> {
        if template.owner != self.owner {
            return None;
        }
        self.get(template.name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bindings in template declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Atom, TypeId)> + '_ {
        self.map.iter().map(|(&name, &ty)| (name, ty))
    }

    /// Whether any binding still refers to a template (of any owner).
    ///
    /// Such a substitution was inferred inside another generic declaration and
    /// is only fully resolved once that declaration's own call site is known.
    pub fn is_symbolic(&self, interner: &TypeInterner) -> bool {
        self.map
            .values()
            .any(|&ty| contains_template_refs(interner, ty))
    }

    /// Resolve a deferred substitution through the substitution of the
    /// enclosing declaration's call site.
    ///
    /// `U -> T` composed with `T -> DateTime` yields `U -> DateTime`.
    pub fn resolve_through(&self, interner: &TypeInterner, outer: &TypeSubstitution) -> Self {
        let mut resolved = Self::new(self.owner);
        for (name, ty) in self.iter() {
            resolved.insert(name, instantiate_type(interner, ty, outer));
        }
        resolved
    }
}

/// Replace every template reference bound by `substitution`.
///
/// References owned by other declarations, unbound references and nominal
/// types are returned unchanged. Unions are re-normalized after substitution.
pub fn instantiate_type(
    interner: &TypeInterner,
    type_id: TypeId,
    substitution: &TypeSubstitution,
) -> TypeId {
    if substitution.is_empty() {
        return type_id;
    }
    match interner.lookup(type_id) {
        Some(TypeData::TemplateRef(template)) => {
            substitution.get_ref(template).unwrap_or(type_id)
        }
        Some(TypeData::Parameterized { base, args }) => {
            let args = interner.type_list(args);
            let instantiated: Vec<TypeId> = args
                .iter()
                .map(|&arg| instantiate_type(interner, arg, substitution))
                .collect();
            if instantiated.as_slice() == &*args {
                return type_id;
            }
            interner.parameterized(base, instantiated)
        }
        Some(TypeData::Union(list)) => {
            let members = interner.type_list(list);
            let instantiated: Vec<TypeId> = members
                .iter()
                .map(|&member| instantiate_type(interner, member, substitution))
                .collect();
            if instantiated.as_slice() == &*members {
                return type_id;
            }
            interner.union(instantiated)
        }
        Some(TypeData::Mixed | TypeData::Concrete(_)) | None => type_id,
    }
}

/// Whether `type_id` mentions any template reference.
pub fn contains_template_refs(interner: &TypeInterner, type_id: TypeId) -> bool {
    contains_template_matching(interner, type_id, &|_| true)
}

/// Whether `type_id` mentions a template declared on `owner`.
pub fn contains_templates_of(interner: &TypeInterner, type_id: TypeId, owner: DeclId) -> bool {
    contains_template_matching(interner, type_id, &|template| template.owner == owner)
}

fn contains_template_matching(
    interner: &TypeInterner,
    type_id: TypeId,
    predicate: &dyn Fn(TemplateRef) -> bool,
) -> bool {
    match interner.lookup(type_id) {
        Some(TypeData::TemplateRef(template)) => predicate(template),
        Some(TypeData::Parameterized { args, .. }) | Some(TypeData::Union(args)) => interner
            .type_list(args)
            .iter()
            .any(|&inner| contains_template_matching(interner, inner, predicate)),
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
