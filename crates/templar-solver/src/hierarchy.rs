//! Nominal class hierarchy.
//!
//! The solver never walks class hierarchies itself: it asks a
//! `NominalHierarchy` whether one class is a subtype of another and whether a
//! class exists. `ClassHierarchy` is the in-memory implementation used by the
//! driver and the tests; embedders with their own symbol tables implement the
//! trait directly.
//!
//! Multiple interfaces and traits are plain parent edges, so a class may have
//! any number of direct parents.

use dashmap::DashMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use templar_common::interner::{Atom, ShardedInterner};
use tracing::trace;

/// Questions the solver asks about the host language's class hierarchy.
pub trait NominalHierarchy: Send + Sync {
    /// Whether `sub` is `sup` or (transitively) extends or implements it.
    fn is_subtype(&self, sub: Atom, sup: Atom) -> bool;

    /// Whether a class, interface or scalar category named `name` exists.
    fn class_exists(&self, name: Atom) -> bool;

    /// Template arity of built-in generic containers such as `array<T>`.
    fn generic_arity(&self, _name: Atom) -> Option<usize> {
        None
    }
}

/// In-memory hierarchy built from parent edges.
pub struct ClassHierarchy {
    /// Class -> direct parents (superclass, interfaces, traits)
    parents: DashMap<Atom, SmallVec<[Atom; 4]>>,
    /// Built-in generic containers and their arity
    generic_arities: DashMap<Atom, usize>,
}

impl ClassHierarchy {
    /// Empty hierarchy without built-ins.
    pub fn empty() -> Self {
        Self {
            parents: DashMap::new(),
            generic_arities: DashMap::new(),
        }
    }

    /// Hierarchy pre-populated with the scalar categories and the built-in
    /// generic containers `array<T>` and `iterable<T>`.
    pub fn with_builtins(strings: &ShardedInterner) -> Self {
        let hierarchy = Self::empty();
        for scalar in ["int", "float", "string", "bool", "null", "object"] {
            hierarchy.add_class(strings.intern(scalar), &[]);
        }
        for container in ["array", "iterable"] {
            let atom = strings.intern(container);
            hierarchy.add_class(atom, &[]);
            hierarchy.register_generic(atom, 1);
        }
        hierarchy
    }

    /// Register `class` with its direct parents, merging with earlier edges.
    pub fn add_class(&self, class: Atom, parents: &[Atom]) {
        let mut entry = self.parents.entry(class).or_default();
        for &parent in parents {
            if !entry.contains(&parent) {
                entry.push(parent);
            }
        }
        trace!(class = class.0, parents = parents.len(), "ClassHierarchy::add_class");
    }

    /// Declare `name` as a built-in generic container taking `arity` arguments.
    pub fn register_generic(&self, name: Atom, arity: usize) {
        self.generic_arities.insert(name, arity);
    }

    pub fn parents_of(&self, class: Atom) -> SmallVec<[Atom; 4]> {
        self.parents
            .get(&class)
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Whether `child` reaches `ancestor` through parent edges.
    ///
    /// Cycles in user-supplied edges are tolerated: each class is visited once.
    pub fn is_derived_from(&self, child: Atom, ancestor: Atom) -> bool {
        let mut visited = FxHashSet::default();
        let mut worklist: Vec<Atom> = self.parents_of(child).into_vec();
        while let Some(current) = worklist.pop() {
            if current == ancestor {
                return true;
            }
            if visited.insert(current) {
                worklist.extend(self.parents_of(current));
            }
        }
        false
    }

    /// Whether adding the edge `child -> parent` would close a cycle.
    pub fn would_create_cycle(&self, child: Atom, parent: Atom) -> bool {
        child == parent || self.is_derived_from(parent, child)
    }
}

impl NominalHierarchy for ClassHierarchy {
    fn is_subtype(&self, sub: Atom, sup: Atom) -> bool {
        sub == sup || self.is_derived_from(sub, sup)
    }

    fn class_exists(&self, name: Atom) -> bool {
        self.parents.contains_key(&name)
    }

    fn generic_arity(&self, name: Atom) -> Option<usize> {
        self.generic_arities.get(&name).map(|r| *r)
    }
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod tests;
