//! Type interning for structural deduplication.
//!
//! This module implements the type interning engine that converts
//! `TypeData` structures into lightweight `TypeId` handles.
//!
//! Benefits:
//! - O(1) type equality for identical structures (just compare `TypeId` values)
//! - Memory efficient (each unique structure stored once)
//! - Safe to share between threads checking independent call sites

use crate::def::DeclId;
use crate::types::{TemplateRef, TypeData, TypeId, TypeListId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};
use templar_common::interner::{Atom, ShardedInterner};
use tracing::trace;

const TYPE_LIST_INLINE: usize = 8;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash + Clone,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: &[T]) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items) {
            return id;
        }

        let arc: Arc<[T]> = Arc::from(items);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

/// Type interning table.
///
/// Lookups by structure go through a `DashMap`; lookups by id read a
/// `RwLock`-guarded vector. Interning holds the map entry for the key while
/// appending, so two threads interning the same structure agree on its id.
pub struct TypeInterner {
    /// String interner for class and template names
    pub string_interner: ShardedInterner,
    ids: DashMap<TypeData, TypeId, FxBuildHasher>,
    types: RwLock<Vec<TypeData>>,
    type_lists: RwLock<SliceInterner<TypeId>>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    /// Create a new type interner with `mixed` and the scalar types pre-registered.
    pub fn new() -> Self {
        let interner = TypeInterner {
            string_interner: {
                let strings = ShardedInterner::new();
                strings.intern_common();
                strings
            },
            ids: DashMap::with_hasher(FxBuildHasher),
            types: RwLock::new(Vec::with_capacity(64)),
            type_lists: RwLock::new(SliceInterner::new()),
        };

        interner.intern(TypeData::Mixed);
        for name in TypeId::SCALAR_NAMES {
            let atom = interner.intern_string(name);
            interner.intern(TypeData::Concrete(atom));
        }
        debug_assert_eq!(interner.len() as u32, TypeId::FIRST_USER);
        interner
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    /// Intern a type structure, returning its handle.
    pub fn intern(&self, key: TypeData) -> TypeId {
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }

        match self.ids.entry(key) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
                let id = TypeId(types.len() as u32);
                types.push(key);
                entry.insert(id);
                trace!(type_id = id.0, ?key, "TypeInterner::intern");
                id
            }
        }
    }

    /// Look up the structure behind a handle.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0 as usize)
            .copied()
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self
            .type_lists
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    fn intern_type_list(&self, members: &[TypeId]) -> TypeListId {
        let mut lists = self
            .type_lists
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        TypeListId(lists.intern(members))
    }

    /// Number of interned types.
    pub fn len(&self) -> usize {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn concrete(&self, name: Atom) -> TypeId {
        self.intern(TypeData::Concrete(name))
    }

    /// Intern a nominal type by name.
    pub fn concrete_named(&self, name: &str) -> TypeId {
        let atom = self.intern_string(name);
        self.concrete(atom)
    }

    pub fn template_ref(&self, owner: DeclId, name: Atom) -> TypeId {
        self.intern(TypeData::TemplateRef(TemplateRef { owner, name }))
    }

    /// Apply a generic base to argument types.
    ///
    /// A base applied to no arguments is the raw nominal type.
    pub fn parameterized(&self, base: Atom, args: Vec<TypeId>) -> TypeId {
        if args.is_empty() {
            return self.concrete(base);
        }
        let args = self.intern_type_list(&args);
        self.intern(TypeData::Parameterized { base, args })
    }

    /// Build a normalized union.
    ///
    /// Nested unions are flattened and duplicates dropped while keeping the
    /// first-seen order, which the inference engine relies on when it tries
    /// union members in declaration order. `mixed` absorbs every other
    /// member and a single surviving member is returned as-is. Callers never
    /// pass an empty list; it yields `mixed`.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: IndexSet<TypeId, FxBuildHasher> = IndexSet::default();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Union(list)) => {
                    flat.extend(self.type_list(list).iter().copied());
                }
                _ => {
                    flat.insert(member);
                }
            }
        }

        if flat.is_empty() || flat.contains(&TypeId::MIXED) {
            return TypeId::MIXED;
        }
        if flat.len() == 1 {
            return flat[0];
        }

        let buffer: TypeListBuffer = flat.into_iter().collect();
        let list = self.intern_type_list(&buffer);
        self.intern(TypeData::Union(list))
    }

    /// Shorthand for `T|null`.
    pub fn nullable(&self, type_id: TypeId) -> TypeId {
        self.union(vec![type_id, TypeId::NULL])
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn template_ref_of(&self, type_id: TypeId) -> Option<TemplateRef> {
        match self.lookup(type_id) {
            Some(TypeData::TemplateRef(template)) => Some(template),
            _ => None,
        }
    }

    /// Base name and arguments of a nominal type; raw classes have no arguments.
    pub fn nominal_parts(&self, type_id: TypeId) -> Option<(Atom, Arc<[TypeId]>)> {
        match self.lookup(type_id) {
            Some(TypeData::Concrete(name)) => Some((name, Arc::from(Vec::new()))),
            Some(TypeData::Parameterized { base, args }) => Some((base, self.type_list(args))),
            _ => None,
        }
    }

    pub fn union_members(&self, type_id: TypeId) -> Option<Arc<[TypeId]>> {
        match self.lookup(type_id) {
            Some(TypeData::Union(list)) => Some(self.type_list(list)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
