//! Shared fixture for solver unit tests.

use crate::context::SolverContext;
use crate::def::{DeclId, DeclarationStore, Signature};
use crate::format::TypeFormatter;
use crate::hierarchy::ClassHierarchy;
use crate::intern::TypeInterner;
use crate::types::{ParamInfo, TypeId};
use templar_common::interner::Atom;

pub(crate) struct Fixture {
    pub interner: TypeInterner,
    pub store: DeclarationStore,
    pub hierarchy: ClassHierarchy,
}

impl Fixture {
    pub fn new() -> Self {
        let interner = TypeInterner::new();
        let hierarchy = ClassHierarchy::with_builtins(&interner.string_interner);
        Self {
            interner,
            store: DeclarationStore::new(),
            hierarchy,
        }
    }

    pub fn ctx(&self) -> SolverContext<'_> {
        SolverContext::new(&self.interner, &self.store, &self.hierarchy)
    }

    pub fn atom(&self, name: &str) -> Atom {
        self.interner.intern_string(name)
    }

    /// Register a plain class in the hierarchy.
    pub fn class(&self, name: &str, parents: &[&str]) -> TypeId {
        let atom = self.atom(name);
        let parents: Vec<Atom> = parents.iter().map(|p| self.atom(p)).collect();
        self.hierarchy.add_class(atom, &parents);
        self.interner.concrete(atom)
    }

    /// Register a class in both the hierarchy and the store, with unbounded templates.
    pub fn generic_class(&self, name: &str, templates: &[&str], parents: &[&str]) -> DeclId {
        self.class(name, parents);
        let id = self.store.declare_class(self.atom(name));
        for template in templates {
            self.store
                .declare_template(id, self.atom(template), None)
                .expect("fresh template");
        }
        id
    }

    /// Register a function with unbounded templates.
    pub fn function(&self, name: &str, templates: &[&str]) -> DeclId {
        let id = self.store.declare_function(self.atom(name));
        for template in templates {
            self.store
                .declare_template(id, self.atom(template), None)
                .expect("fresh template");
        }
        id
    }

    pub fn method(&self, class: DeclId, name: &str, templates: &[&str]) -> DeclId {
        let id = self
            .store
            .declare_method(class, self.atom(name))
            .expect("class exists");
        for template in templates {
            self.store
                .declare_template(id, self.atom(template), None)
                .expect("fresh template");
        }
        id
    }

    pub fn template(&self, owner: DeclId, name: &str) -> TypeId {
        self.interner.template_ref(owner, self.atom(name))
    }

    pub fn generic(&self, base: &str, args: Vec<TypeId>) -> TypeId {
        self.interner.parameterized(self.atom(base), args)
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.generic("array", vec![element])
    }

    /// Define parameters `p0..pN` and the return type of `owner`.
    pub fn define(&self, owner: DeclId, params: &[TypeId], return_type: TypeId) {
        let params = params
            .iter()
            .enumerate()
            .map(|(i, &ty)| ParamInfo::new(self.atom(&format!("p{i}")), ty))
            .collect();
        self.store
            .define_signature(&self.interner, &self.hierarchy, owner, params, return_type)
            .expect("valid signature");
    }

    pub fn signature(&self, owner: DeclId) -> Signature {
        self.store.signature(owner).expect("function or method")
    }

    pub fn format(&self, type_id: TypeId) -> String {
        TypeFormatter::with_store(&self.interner, &self.store).format(type_id)
    }

    /// `Animal`, `Dog extends Animal`, and `Collection<T>` with
    /// `get(): T` and `add(T)`.
    pub fn with_collection() -> (Self, DeclId) {
        let fx = Self::new();
        fx.class("Animal", &[]);
        fx.class("Dog", &["Animal"]);
        let collection = fx.generic_class("Collection", &["T"], &[]);
        let t = fx.template(collection, "T");
        let get = fx.method(collection, "get", &[]);
        fx.define(get, &[], t);
        let add = fx.method(collection, "add", &[]);
        fx.define(add, &[t], TypeId::NULL);
        (fx, collection)
    }
}
