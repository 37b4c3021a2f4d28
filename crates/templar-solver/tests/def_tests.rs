use super::*;
use crate::test_support::Fixture;

#[test]
fn test_decl_id_validity() {
    assert!(!DeclId::INVALID.is_valid());
    assert!(DeclId(1).is_valid());
    assert!(DeclId(100).is_valid());
}

#[test]
fn test_declare_function_and_class() {
    let fx = Fixture::new();
    let identity = fx.function("identity", &["T"]);
    let collection = fx.generic_class("Collection", &["T"], &[]);

    assert!(identity.is_valid());
    assert_ne!(identity, collection);
    assert_eq!(fx.store.get_kind(identity), Some(DeclKind::Function));
    assert_eq!(fx.store.get_kind(collection), Some(DeclKind::Class));
    assert_eq!(fx.store.function_by_name(fx.atom("identity")), Some(identity));
    assert_eq!(fx.store.class_by_name(fx.atom("Collection")), Some(collection));
    assert_eq!(fx.store.all_ids(), vec![identity, collection]);
}

#[test]
fn test_later_function_replaces_name_lookup() {
    let fx = Fixture::new();
    let first = fx.function("wrap", &[]);
    let second = fx.function("wrap", &["T"]);
    assert_ne!(first, second);
    assert_eq!(fx.store.function_by_name(fx.atom("wrap")), Some(second));
    assert_eq!(fx.store.len(), 2);
}

#[test]
fn test_duplicate_template_rejected() {
    let fx = Fixture::new();
    let id = fx.function("pair", &["T"]);
    let err = fx
        .store
        .declare_template(id, fx.atom("T"), None)
        .expect_err("duplicate");
    assert_eq!(
        err,
        SolverError::DuplicateTemplate {
            owner: id,
            name: fx.atom("T")
        }
    );
}

#[test]
fn test_same_template_name_on_two_owners() {
    let fx = Fixture::new();
    let identity = fx.function("identity", &["T"]);
    let first = fx.function("first", &["T"]);

    assert_ne!(fx.template(identity, "T"), fx.template(first, "T"));
    assert!(fx.store.lookup_template(identity, fx.atom("T")).is_ok());
    assert!(fx.store.lookup_template(first, fx.atom("T")).is_ok());
}

#[test]
fn test_resolve_bound_defaults_to_mixed() {
    let fx = Fixture::new();
    let interface = fx.class("DateTimeInterface", &[]);
    let greater = fx.store.declare_function(fx.atom("greater"));
    fx.store
        .declare_template(greater, fx.atom("T"), Some(interface))
        .expect("fresh");
    let identity = fx.function("identity", &["T"]);

    assert_eq!(fx.store.resolve_bound(fx.atom("T"), greater), Ok(interface));
    assert_eq!(
        fx.store.resolve_bound(fx.atom("T"), identity),
        Ok(TypeId::MIXED)
    );
    assert_eq!(
        fx.store.resolve_bound(fx.atom("U"), identity),
        Err(SolverError::UnknownTemplate {
            owner: identity,
            name: fx.atom("U")
        })
    );
}

#[test]
fn test_method_sees_class_templates() {
    let fx = Fixture::new();
    let collection = fx.generic_class("Collection", &["T"], &[]);
    let map = fx.method(collection, "map", &["U"]);

    let class_t = fx.store.lookup_template(map, fx.atom("T")).expect("visible");
    assert_eq!(class_t.owner, collection);
    let own_u = fx.store.lookup_template(map, fx.atom("U")).expect("visible");
    assert_eq!(own_u.owner, map);

    // The class does not see its methods' templates.
    assert!(fx.store.lookup_template(collection, fx.atom("U")).is_err());
    assert_eq!(fx.store.get_parent(map), Some(collection));
}

#[test]
fn test_template_not_visible_from_other_function() {
    let fx = Fixture::new();
    let identity = fx.function("identity", &["T"]);
    let other = fx.function("other", &[]);
    let foreign = fx.template(identity, "T");

    let err = fx
        .store
        .define_signature(&fx.interner, &fx.hierarchy, other, Vec::new(), foreign)
        .expect_err("foreign template");
    assert_eq!(
        err,
        SolverError::UnknownTemplate {
            owner: other,
            name: fx.atom("T")
        }
    );
}

#[test]
fn test_unknown_class_and_argument_count() {
    let fx = Fixture::new();
    let f = fx.function("f", &[]);
    let missing = fx.interner.concrete_named("Missing");
    let err = fx
        .store
        .validate_type(&fx.interner, &fx.hierarchy, f, missing)
        .expect_err("unknown class");
    assert_eq!(err, SolverError::UnknownClass { name: fx.atom("Missing") });

    let bad_array = fx.generic("array", vec![TypeId::INT, TypeId::STRING]);
    let err = fx
        .store
        .validate_type(&fx.interner, &fx.hierarchy, f, bad_array)
        .expect_err("wrong arity");
    assert_eq!(
        err,
        SolverError::TypeArgumentCount {
            base: fx.atom("array"),
            expected: 1,
            actual: 2
        }
    );
}

#[test]
fn test_positions_recorded() {
    let fx = Fixture::new();
    let first = fx.function("first", &["T"]);
    let t = fx.template(first, "T");
    fx.define(first, &[fx.array(t)], fx.interner.nullable(t));

    let template = fx.store.lookup_template(first, fx.atom("T")).expect("declared");
    assert_eq!(
        template.positions,
        TemplatePositions::PARAMETER | TemplatePositions::RETURN
    );

    let collection = fx.generic_class("Collection", &["T"], &[]);
    let ct = fx.template(collection, "T");
    fx.store
        .add_property(&fx.interner, &fx.hierarchy, collection, fx.atom("items"), fx.array(ct))
        .expect("valid property");
    let template = fx
        .store
        .lookup_template(collection, fx.atom("T"))
        .expect("declared");
    assert!(template.positions.contains(TemplatePositions::FIELD));
}

#[test]
fn test_add_inherited_checks_arity() {
    let fx = Fixture::new();
    fx.generic_class("Collection", &["T"], &[]);
    let int_list = fx.generic_class("IntList", &[], &["Collection"]);

    let err = fx
        .store
        .add_inherited(&fx.interner, &fx.hierarchy, int_list, fx.atom("Collection"), Vec::new())
        .expect_err("missing argument");
    assert!(matches!(err, SolverError::TypeArgumentCount { expected: 1, actual: 0, .. }));

    fx.store
        .add_inherited(
            &fx.interner,
            &fx.hierarchy,
            int_list,
            fx.atom("Collection"),
            vec![TypeId::INT],
        )
        .expect("valid extends");
    let info = fx.store.get(int_list).expect("declared");
    assert_eq!(info.inherited.len(), 1);
    assert_eq!(info.inherited[0].args, vec![TypeId::INT]);
}

#[test]
fn test_signature_only_for_callables() {
    let fx = Fixture::new();
    let collection = fx.generic_class("Collection", &["T"], &[]);
    let identity = fx.function("identity", &["T"]);
    let t = fx.template(identity, "T");
    fx.define(identity, &[t], t);

    assert!(fx.store.signature(collection).is_none());
    let sig = fx.signature(identity);
    assert_eq!(sig.owner, identity);
    assert_eq!(sig.param_types().collect::<Vec<_>>(), vec![t]);
    assert_eq!(sig.return_type, t);
    assert!(sig.template(fx.atom("T")).is_some());
}

#[test]
fn test_declare_method_on_function_rejected() {
    let fx = Fixture::new();
    let f = fx.function("f", &[]);
    assert!(fx.store.declare_method(f, fx.atom("m")).is_err());
}

#[test]
fn test_unregistered_owner_is_named_by_id() {
    let fx = Fixture::new();
    let ghost = DeclId(99);
    assert_eq!(
        fx.store.declare_template(ghost, fx.atom("T"), None),
        Err(SolverError::UnregisteredDeclaration { id: ghost })
    );
    assert_eq!(
        fx.store
            .define_signature(&fx.interner, &fx.hierarchy, ghost, Vec::new(), TypeId::MIXED),
        Err(SolverError::UnregisteredDeclaration { id: ghost })
    );
}
