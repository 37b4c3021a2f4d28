//! Rendering types for diagnostics.

use crate::def::{DeclId, DeclarationStore};
use crate::intern::TypeInterner;
use crate::types::{TypeData, TypeId};
use templar_common::interner::Atom;

/// Formats types the way they are written in docblocks:
/// `Collection<int>`, `T|null`, `mixed`.
pub struct TypeFormatter<'a> {
    interner: &'a TypeInterner,
    store: Option<&'a DeclarationStore>,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        Self {
            interner,
            store: None,
        }
    }

    /// Also resolve declaration names (used for template owners).
    pub fn with_store(interner: &'a TypeInterner, store: &'a DeclarationStore) -> Self {
        Self {
            interner,
            store: Some(store),
        }
    }

    pub fn format(&self, type_id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, type_id);
        out
    }

    pub fn atom(&self, atom: Atom) -> String {
        self.interner.resolve_atom(atom).to_string()
    }

    /// Name of a declaration; methods render as `Class::method`.
    pub fn decl(&self, id: DeclId) -> String {
        let Some(store) = self.store else {
            return format!("#{}", id.0);
        };
        let Some(name) = store.get_name(id) else {
            return format!("#{}", id.0);
        };
        match store.get_parent(id).and_then(|class| store.get_name(class)) {
            Some(class) => format!("{}::{}", self.atom(class), self.atom(name)),
            None => self.atom(name),
        }
    }

    fn write_type(&self, out: &mut String, type_id: TypeId) {
        match self.interner.lookup(type_id) {
            Some(TypeData::Mixed) => out.push_str("mixed"),
            Some(TypeData::Concrete(name)) => out.push_str(&self.interner.resolve_atom(name)),
            Some(TypeData::TemplateRef(template)) => {
                out.push_str(&self.interner.resolve_atom(template.name));
            }
            Some(TypeData::Parameterized { base, args }) => {
                out.push_str(&self.interner.resolve_atom(base));
                out.push('<');
                for (i, &arg) in self.interner.type_list(args).iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_type(out, arg);
                }
                out.push('>');
            }
            Some(TypeData::Union(list)) => {
                for (i, &member) in self.interner.type_list(list).iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    self.write_type(out, member);
                }
            }
            None => out.push_str("<unknown>"),
        }
    }
}
