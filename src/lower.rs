//! Lowering of project declarations and type expressions into solver state.
//!
//! Declarations are registered in passes so that any type expression may
//! mention any class of the project regardless of declaration order:
//!
//! 1. class names and parent edges
//! 2. class templates and their bounds
//! 3. functions and methods with their templates
//! 4. inherited arguments, properties and signatures
//!
//! A declaration that fails to lower is reported once and marked invalid;
//! sites calling it are skipped rather than reported again.

use crate::project::{ClassDecl, FunctionDecl, Project, Span, TemplateDecl, TypeExpr};
use rustc_hash::FxHashSet;
use templar_common::diagnostics::{Diagnostic, diagnostic_codes};
use templar_common::interner::Atom;
use templar_solver::{
    ClassHierarchy, DeclId, DeclarationStore, ParamInfo, SolverContext, SolverError,
    TypeFormatter, TypeId, TypeInterner,
};
use tracing::{debug, trace};

/// Solver state for one checking session.
pub struct Session {
    pub interner: TypeInterner,
    pub store: DeclarationStore,
    pub hierarchy: ClassHierarchy,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
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

    pub fn formatter(&self) -> TypeFormatter<'_> {
        TypeFormatter::with_store(&self.interner, &self.store)
    }
}

/// Why a declaration or a site's type expression could not be lowered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LowerError {
    /// `{"union": []}`
    EmptyUnion,
    /// An `extends` entry that is not a class or generic class.
    InvalidInheritance,
    Solver(SolverError),
}

impl From<SolverError> for LowerError {
    fn from(err: SolverError) -> Self {
        LowerError::Solver(err)
    }
}

impl LowerError {
    pub fn code(&self) -> u32 {
        match self {
            LowerError::EmptyUnion => diagnostic_codes::EMPTY_UNION,
            LowerError::InvalidInheritance => diagnostic_codes::INVALID_INHERITANCE,
            LowerError::Solver(err) => err.code(),
        }
    }

    pub fn render(&self, fmt: &TypeFormatter<'_>) -> String {
        match self {
            LowerError::EmptyUnion => "A union type needs at least one member.".to_string(),
            LowerError::InvalidInheritance => {
                "Only a class or a generic class can be inherited.".to_string()
            }
            LowerError::Solver(err) => err.render(fmt),
        }
    }

    pub fn to_diagnostic(&self, fmt: &TypeFormatter<'_>, file: &str, span: Span) -> Diagnostic {
        Diagnostic::error(
            file.to_string(),
            span.start,
            span.length,
            self.render(fmt),
            self.code(),
        )
    }
}

/// A declaration that failed to lower.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarationError {
    pub decl: DeclId,
    pub error: LowerError,
}

/// Outcome of lowering a project's declarations.
#[derive(Debug, Default)]
pub struct Lowered {
    pub errors: Vec<DeclarationError>,
    /// Declarations whose templates or signature could not be registered.
    pub invalid: FxHashSet<DeclId>,
}

impl Lowered {
    fn fail(&mut self, decl: DeclId, error: LowerError) {
        debug!(decl = decl.0, ?error, "declaration rejected");
        self.invalid.insert(decl);
        self.errors.push(DeclarationError { decl, error });
    }

    fn record(&mut self, decl: DeclId, result: Result<(), LowerError>) {
        if let Err(error) = result {
            self.fail(decl, error);
        }
    }

    pub fn is_valid(&self, decl: DeclId) -> bool {
        !self.invalid.contains(&decl)
    }
}

/// Register every declaration of `project` in `session`.
pub fn lower_project(session: &Session, project: &Project) -> Lowered {
    let lowerer = Lowerer::new(session);
    let mut lowered = Lowered::default();

    let classes: Vec<DeclId> = project
        .classes
        .iter()
        .map(|class| lowerer.declare_class(class))
        .collect();

    for (class, &id) in project.classes.iter().zip(&classes) {
        let result = lowerer.declare_templates(id, &class.templates).and_then(|()| {
            session
                .store
                .validate_bounds(&session.interner, &session.hierarchy, id)
                .map_err(LowerError::from)
        });
        lowered.record(id, result);
    }

    let mut callables: Vec<(&FunctionDecl, DeclId)> = Vec::new();
    for function in &project.functions {
        let name = session.interner.intern_string(&function.name);
        let id = session.store.declare_function(name);
        lowered.record(id, lowerer.declare_templates(id, &function.templates));
        callables.push((function, id));
    }
    for (class, &class_id) in project.classes.iter().zip(&classes) {
        for method in &class.methods {
            let name = session.interner.intern_string(&method.name);
            match session.store.declare_method(class_id, name) {
                Ok(id) => {
                    lowered.record(id, lowerer.declare_templates(id, &method.templates));
                    callables.push((method, id));
                }
                Err(err) => lowered.fail(class_id, err.into()),
            }
        }
    }

    for (class, &id) in project.classes.iter().zip(&classes) {
        for inherited in &class.extends {
            lowered.record(id, lowerer.lower_inherited(id, inherited));
        }
        for property in &class.properties {
            let result = lowerer.lower_type(&property.type_expr, Some(id)).and_then(|ty| {
                let name = session.interner.intern_string(&property.name);
                session
                    .store
                    .add_property(&session.interner, &session.hierarchy, id, name, ty)
                    .map_err(LowerError::from)
            });
            lowered.record(id, result);
        }
    }

    for (callable, id) in callables {
        if lowered.is_valid(id) {
            lowered.record(id, lowerer.define_callable(id, callable));
        }
    }

    debug!(
        declarations = session.store.len(),
        errors = lowered.errors.len(),
        "project lowered"
    );
    lowered
}

/// Turns project entities into solver entities.
pub struct Lowerer<'a> {
    session: &'a Session,
}

impl<'a> Lowerer<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    fn atom(&self, name: &str) -> Atom {
        self.session.interner.intern_string(name)
    }

    fn declare_class(&self, class: &ClassDecl) -> DeclId {
        let name = self.atom(&class.name);
        let mut parents: Vec<Atom> = class.parents.iter().map(|p| self.atom(p)).collect();
        for inherited in &class.extends {
            let base = match inherited {
                TypeExpr::Name(base) | TypeExpr::Generic { of: base, .. } => base,
                TypeExpr::Union { .. } => continue,
            };
            parents.push(self.atom(base));
        }
        self.session.hierarchy.add_class(name, &parents);
        trace!(class = %class.name, parents = parents.len(), "declare class");
        self.session.store.declare_class(name)
    }

    /// Declare templates in order; a bound may mention templates declared
    /// before it.
    fn declare_templates(
        &self,
        owner: DeclId,
        templates: &[TemplateDecl],
    ) -> Result<(), LowerError> {
        for template in templates {
            let bound = template
                .bound
                .as_ref()
                .map(|bound| self.lower_type(bound, Some(owner)))
                .transpose()?;
            self.session
                .store
                .declare_template(owner, self.atom(&template.name), bound)?;
        }
        Ok(())
    }

    fn lower_inherited(&self, class: DeclId, inherited: &TypeExpr) -> Result<(), LowerError> {
        let (base, args) = match inherited {
            TypeExpr::Name(base) => (base, Vec::new()),
            TypeExpr::Generic { of, args } => (
                of,
                args.iter()
                    .map(|arg| self.lower_type(arg, Some(class)))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            TypeExpr::Union { .. } => return Err(LowerError::InvalidInheritance),
        };
        let session = self.session;
        session.store.add_inherited(
            &session.interner,
            &session.hierarchy,
            class,
            self.atom(base),
            args,
        )?;
        Ok(())
    }

    fn define_callable(&self, id: DeclId, decl: &FunctionDecl) -> Result<(), LowerError> {
        let params = decl
            .params
            .iter()
            .map(|param| {
                self.lower_type(&param.type_expr, Some(id))
                    .map(|ty| ParamInfo::new(self.atom(&param.name), ty))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let return_type = match &decl.return_type {
            Some(expr) => self.lower_type(expr, Some(id))?,
            None => TypeId::MIXED,
        };
        let session = self.session;
        session.store.define_signature(
            &session.interner,
            &session.hierarchy,
            id,
            params,
            return_type,
        )?;
        Ok(())
    }

    /// Lower a type expression. Bare names resolve to templates visible
    /// from `scope` first, then to classes.
    pub fn lower_type(&self, expr: &TypeExpr, scope: Option<DeclId>) -> Result<TypeId, LowerError> {
        let interner = &self.session.interner;
        match expr {
            TypeExpr::Name(name) => match name.strip_prefix('?') {
                Some(inner) => Ok(interner.nullable(self.lower_name(inner, scope))),
                None => Ok(self.lower_name(name, scope)),
            },
            TypeExpr::Generic { of, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.lower_type(arg, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(interner.parameterized(self.atom(of), args))
            }
            TypeExpr::Union { union } => {
                if union.is_empty() {
                    return Err(LowerError::EmptyUnion);
                }
                let members = union
                    .iter()
                    .map(|member| self.lower_type(member, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(interner.union(members))
            }
        }
    }

    fn lower_name(&self, name: &str, scope: Option<DeclId>) -> TypeId {
        if name == "mixed" {
            return TypeId::MIXED;
        }
        let atom = self.atom(name);
        if let Some(owner) = scope
            && let Ok(template) = self.session.store.lookup_template(owner, atom)
        {
            return self.session.interner.template_ref(template.owner, atom);
        }
        // No visible template claims the name; validation reports it as a class.
        self.session.interner.concrete(atom)
    }

    /// Lower a site's type expression and check that every name resolves.
    pub fn lower_checked(
        &self,
        expr: &TypeExpr,
        scope: Option<DeclId>,
    ) -> Result<TypeId, LowerError> {
        let ty = self.lower_type(expr, scope)?;
        let session = self.session;
        session.store.validate_type(
            &session.interner,
            &session.hierarchy,
            scope.unwrap_or(DeclId::INVALID),
            ty,
        )?;
        Ok(ty)
    }

    /// Resolve an `inside` reference: `"wrap"` or `"Collection::map"`.
    pub fn resolve_scope(&self, name: &str) -> Result<DeclId, LowerError> {
        let store = &self.session.store;
        if let Some((class, method)) = name.split_once("::") {
            let class_atom = self.atom(class);
            let method_atom = self.atom(method);
            return store
                .class_by_name(class_atom)
                .and_then(|id| store.get(id))
                .and_then(|info| info.method(method_atom))
                .ok_or(LowerError::Solver(SolverError::UnknownMethod {
                    class: class_atom,
                    method: method_atom,
                }));
        }
        let atom = self.atom(name);
        store
            .function_by_name(atom)
            .ok_or(LowerError::Solver(SolverError::UnknownDeclaration { name: atom }))
    }
}

#[cfg(test)]
#[path = "tests/lower_tests.rs"]
mod tests;
