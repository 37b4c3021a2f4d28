use super::*;
use serde_json::json;
use templar_solver::{DeclKind, TypeData};

fn lower(value: serde_json::Value) -> (Session, Lowered) {
    let project: Project = serde_json::from_value(value).expect("project should parse");
    let session = Session::new();
    let lowered = lower_project(&session, &project);
    (session, lowered)
}

fn collection_project() -> serde_json::Value {
    json!({
        "classes": [
            { "name": "Animal" },
            { "name": "Dog", "parents": ["Animal"] },
            { "name": "Collection", "templates": [{ "name": "T" }],
              "properties": [{ "name": "items", "type": { "of": "array", "args": ["T"] } }],
              "methods": [
                  { "name": "get", "return": "T" },
                  { "name": "add", "params": [{ "name": "item", "type": "T" }], "return": "null" }
              ] },
            { "name": "DogList", "extends": [{ "of": "Collection", "args": ["Dog"] }] }
        ],
        "functions": [
            { "name": "first", "templates": [{ "name": "T" }],
              "params": [{ "name": "items", "type": { "of": "array", "args": ["T"] } }],
              "return": "?T" }
        ]
    })
}

#[test]
fn test_lower_project_registers_declarations() {
    let (session, lowered) = lower(collection_project());
    assert!(lowered.errors.is_empty(), "{:?}", lowered.errors);

    let store = &session.store;
    let atom = |name: &str| session.interner.intern_string(name);
    let collection = store.class_by_name(atom("Collection")).expect("class");
    assert_eq!(store.get_kind(collection), Some(DeclKind::Class));
    assert_eq!(store.templates(collection).len(), 1);

    let info = store.get(collection).expect("info");
    let get = info.method(atom("get")).expect("method");
    let signature = store.signature(get).expect("signature");
    assert_eq!(
        session.interner.template_ref_of(signature.return_type),
        Some(templar_solver::TemplateRef {
            owner: collection,
            name: atom("T"),
        })
    );
    assert_eq!(info.properties.len(), 1);

    let dog_list = store.class_by_name(atom("DogList")).expect("class");
    let inherited = store.get(dog_list).expect("info").inherited;
    assert_eq!(inherited.len(), 1);
    assert_eq!(inherited[0].base, atom("Collection"));

    // Inherited bases are parents too.
    assert!(session.hierarchy.is_derived_from(atom("DogList"), atom("Collection")));
}

#[test]
fn test_function_return_defaults_to_mixed() {
    let (session, lowered) = lower(json!({ "functions": [{ "name": "log" }] }));
    assert!(lowered.errors.is_empty());
    let log = session
        .store
        .function_by_name(session.interner.intern_string("log"))
        .expect("function");
    let signature = session.store.signature(log).expect("signature");
    assert_eq!(signature.return_type, TypeId::MIXED);
    assert!(signature.params.is_empty());
}

#[test]
fn test_lower_type_resolves_templates_before_classes() {
    let (session, _) = lower(collection_project());
    let lowerer = Lowerer::new(&session);
    let first = lowerer.resolve_scope("first").expect("function");

    let in_scope = lowerer
        .lower_type(&TypeExpr::name("T"), Some(first))
        .expect("lowered");
    assert_eq!(
        session.interner.template_ref_of(in_scope).map(|t| t.owner),
        Some(first)
    );

    let outside = lowerer
        .lower_type(&TypeExpr::name("T"), None)
        .expect("lowered");
    assert!(matches!(
        session.interner.lookup(outside),
        Some(TypeData::Concrete(_))
    ));
}

#[test]
fn test_method_scope_sees_class_templates() {
    let (session, _) = lower(collection_project());
    let lowerer = Lowerer::new(&session);
    let get = lowerer.resolve_scope("Collection::get").expect("method");
    let collection = session
        .store
        .class_by_name(session.interner.intern_string("Collection"))
        .expect("class");

    let ty = lowerer
        .lower_type(&TypeExpr::name("T"), Some(get))
        .expect("lowered");
    assert_eq!(
        session.interner.template_ref_of(ty).map(|t| t.owner),
        Some(collection)
    );
}

#[test]
fn test_lower_type_shapes() {
    let session = Session::new();
    let lowerer = Lowerer::new(&session);

    assert_eq!(
        lowerer.lower_type(&TypeExpr::name("mixed"), None),
        Ok(TypeId::MIXED)
    );
    assert_eq!(
        lowerer.lower_type(&TypeExpr::name("int"), None),
        Ok(TypeId::INT)
    );
    assert_eq!(
        lowerer.lower_type(&TypeExpr::name("?int"), None),
        Ok(session.interner.nullable(TypeId::INT))
    );

    let union = TypeExpr::Union {
        union: vec![TypeExpr::name("int"), TypeExpr::name("string")],
    };
    assert_eq!(
        lowerer.lower_type(&union, None),
        Ok(session.interner.union(vec![TypeId::INT, TypeId::STRING]))
    );

    let array = TypeExpr::Generic {
        of: "array".to_string(),
        args: vec![TypeExpr::name("int")],
    };
    let expected = session
        .interner
        .parameterized(session.interner.intern_string("array"), vec![TypeId::INT]);
    assert_eq!(lowerer.lower_type(&array, None), Ok(expected));
}

#[test]
fn test_empty_union_is_rejected() {
    let session = Session::new();
    let lowerer = Lowerer::new(&session);
    let empty = TypeExpr::Union { union: Vec::new() };
    assert_eq!(
        lowerer.lower_type(&empty, None),
        Err(LowerError::EmptyUnion)
    );
    assert_eq!(LowerError::EmptyUnion.code(), diagnostic_codes::EMPTY_UNION);
}

#[test]
fn test_lower_checked_rejects_unknown_class() {
    let session = Session::new();
    let lowerer = Lowerer::new(&session);
    let result = lowerer.lower_checked(&TypeExpr::name("Missing"), None);
    assert!(matches!(
        result,
        Err(LowerError::Solver(SolverError::UnknownClass { .. }))
    ));
}

#[test]
fn test_lower_checked_rejects_wrong_arity() {
    let (session, _) = lower(collection_project());
    let lowerer = Lowerer::new(&session);
    let raw_args = TypeExpr::Generic {
        of: "Collection".to_string(),
        args: vec![TypeExpr::name("int"), TypeExpr::name("int")],
    };
    assert!(matches!(
        lowerer.lower_checked(&raw_args, None),
        Err(LowerError::Solver(SolverError::TypeArgumentCount {
            expected: 1,
            actual: 2,
            ..
        }))
    ));
}

#[test]
fn test_resolve_scope_errors() {
    let (session, _) = lower(collection_project());
    let lowerer = Lowerer::new(&session);
    assert!(matches!(
        lowerer.resolve_scope("missing"),
        Err(LowerError::Solver(SolverError::UnknownDeclaration { .. }))
    ));
    assert!(matches!(
        lowerer.resolve_scope("Collection::missing"),
        Err(LowerError::Solver(SolverError::UnknownMethod { .. }))
    ));
}

#[test]
fn test_invalid_signature_marks_declaration() {
    let (session, lowered) = lower(json!({
        "functions": [
            { "name": "broken", "params": [{ "name": "x", "type": "Missing" }] },
            { "name": "fine", "params": [{ "name": "x", "type": "int" }] }
        ]
    }));
    let broken = session
        .store
        .function_by_name(session.interner.intern_string("broken"))
        .expect("function");
    let fine = session
        .store
        .function_by_name(session.interner.intern_string("fine"))
        .expect("function");

    assert_eq!(lowered.errors.len(), 1);
    assert_eq!(lowered.errors[0].decl, broken);
    assert_eq!(
        lowered.errors[0].error.code(),
        diagnostic_codes::UNKNOWN_CLASS
    );
    assert!(!lowered.is_valid(broken));
    assert!(lowered.is_valid(fine));
}

#[test]
fn test_duplicate_template_skips_signature() {
    let (session, lowered) = lower(json!({
        "functions": [{
            "name": "pair",
            "templates": [{ "name": "T" }, { "name": "T" }],
            "params": [{ "name": "x", "type": "T" }]
        }]
    }));
    let pair = session
        .store
        .function_by_name(session.interner.intern_string("pair"))
        .expect("function");

    assert_eq!(lowered.errors.len(), 1);
    assert_eq!(
        lowered.errors[0].error.code(),
        diagnostic_codes::DUPLICATE_TEMPLATE
    );
    assert!(!lowered.is_valid(pair));
}

#[test]
fn test_template_bound_may_mention_earlier_template() {
    let (session, lowered) = lower(json!({
        "classes": [{ "name": "Animal" }],
        "functions": [{
            "name": "narrow",
            "templates": [{ "name": "T", "of": "Animal" }, { "name": "U", "of": "T" }],
            "params": [{ "name": "a", "type": "T" }, { "name": "b", "type": "U" }]
        }]
    }));
    assert!(lowered.errors.is_empty(), "{:?}", lowered.errors);

    let narrow = session
        .store
        .function_by_name(session.interner.intern_string("narrow"))
        .expect("function");
    let templates = session.store.templates(narrow);
    let u_bound = templates[1].bound.expect("bound");
    assert_eq!(
        session.interner.template_ref_of(u_bound).map(|t| t.name),
        Some(session.interner.intern_string("T"))
    );
}

#[test]
fn test_union_cannot_be_inherited() {
    let (_, lowered) = lower(json!({
        "classes": [{ "name": "Odd", "extends": [{ "union": ["int", "string"] }] }]
    }));
    assert_eq!(lowered.errors.len(), 1);
    assert_eq!(lowered.errors[0].error, LowerError::InvalidInheritance);
}

#[test]
fn test_class_bound_on_unknown_class() {
    let (_, lowered) = lower(json!({
        "classes": [{ "name": "Box", "templates": [{ "name": "T", "of": "Missing" }] }]
    }));
    assert_eq!(lowered.errors.len(), 1);
    assert_eq!(
        lowered.errors[0].error.code(),
        diagnostic_codes::UNKNOWN_CLASS
    );
}

#[test]
fn test_error_renders_with_formatter() {
    let session = Session::new();
    let fmt = session.formatter();
    let diagnostic =
        LowerError::EmptyUnion.to_diagnostic(&fmt, "project.json", Span { start: 3, length: 2 });
    assert_eq!(diagnostic.file, "project.json");
    assert_eq!(diagnostic.start, 3);
    assert_eq!(diagnostic.length, 2);
    assert_eq!(diagnostic.code, diagnostic_codes::EMPTY_UNION);
    assert!(diagnostic.is_error());
}
