//! Type representation for the generics solver.
//!
//! Types are interned: every distinct `TypeData` is stored once in the
//! `TypeInterner` and handed out as a `TypeId`. Two `TypeId`s are equal exactly
//! when their structures were interned from equal `TypeData`.

use crate::def::DeclId;
use serde::Serialize;
use templar_common::interner::Atom;

/// Handle to an interned type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The implicit top type. Unbounded templates resolve their bound to it.
    pub const MIXED: TypeId = TypeId(0);
    pub const INT: TypeId = TypeId(1);
    pub const FLOAT: TypeId = TypeId(2);
    pub const STRING: TypeId = TypeId(3);
    pub const BOOL: TypeId = TypeId(4);
    pub const NULL: TypeId = TypeId(5);

    /// Number of ids reserved by `TypeInterner::new`.
    pub const FIRST_USER: u32 = 6;

    /// Scalar names pre-interned as `Concrete` types, in `TypeId` order.
    pub(crate) const SCALAR_NAMES: [&'static str; 5] = ["int", "float", "string", "bool", "null"];
}

/// Handle to an interned, ordered list of types (generic arguments, union members).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

impl TypeListId {
    pub const EMPTY: TypeListId = TypeListId(0);
}

/// Reference to a template type declared on `owner`.
///
/// Templates are scoped to their owner, so `T` of `identity()` and `T` of
/// `first()` are different references even though they share a name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TemplateRef {
    pub owner: DeclId,
    pub name: Atom,
}

/// Structural type data.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// Top type: every type is a subtype of `mixed`.
    Mixed,
    /// Nominal class, interface or scalar category.
    Concrete(Atom),
    /// Placeholder resolved per call site.
    TemplateRef(TemplateRef),
    /// Generic base applied to argument types, e.g. `Collection<int>`.
    Parameterized { base: Atom, args: TypeListId },
    /// Flattened, deduplicated union with at least two members.
    Union(TypeListId),
}

/// A declared parameter of a function or method.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: Atom,
    pub type_id: TypeId,
}

impl ParamInfo {
    pub const fn new(name: Atom, type_id: TypeId) -> Self {
        Self { name, type_id }
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
