use super::*;
use crate::test_support::Fixture;

/// `Collection<T>` with `get(): T`, `add(T)` and `map<U>(U $seed): Collection<U>`,
/// plus `IntList extends Collection<int>`.
fn fixture() -> (Fixture, DeclId) {
    let (fx, collection) = Fixture::with_collection();
    let map = fx.method(collection, "map", &["U"]);
    let u = fx.template(map, "U");
    fx.define(map, &[u], fx.generic("Collection", vec![u]));

    let int_list = fx.generic_class("IntList", &[], &["Collection"]);
    fx.store
        .add_inherited(
            &fx.interner,
            &fx.hierarchy,
            int_list,
            fx.atom("Collection"),
            vec![TypeId::INT],
        )
        .expect("valid extends");
    (fx, collection)
}

#[test]
fn test_check_call_instantiates_return_type() {
    let fx = Fixture::new();
    let first = fx.function("first", &["T"]);
    let t = fx.template(first, "T");
    fx.define(first, &[fx.array(t)], fx.interner.nullable(t));

    let outcome = CallEvaluator::new(fx.ctx())
        .check_call(first, &[fx.array(TypeId::STRING)], None)
        .expect("valid call");
    assert_eq!(outcome.substitution.get(fx.atom("T")), Some(TypeId::STRING));
    assert_eq!(fx.format(outcome.return_type), "string|null");
}

#[test]
fn test_check_call_unknown_function() {
    let fx = Fixture::new();
    let collection = fx.generic_class("Collection", &["T"], &[]);
    assert_eq!(
        CallEvaluator::new(fx.ctx()).check_call(collection, &[], None),
        Err(SolverError::UnknownDeclaration {
            name: fx.atom("Collection")
        })
    );
}

#[test]
fn test_method_call_uses_receiver_arguments() {
    let (fx, _) = fixture();
    let evaluator = CallEvaluator::new(fx.ctx());
    let strings = fx.generic("Collection", vec![TypeId::STRING]);

    let outcome = evaluator
        .check_method_call(strings, fx.atom("get"), &[], None)
        .expect("valid call");
    assert_eq!(outcome.return_type, TypeId::STRING);
    assert!(outcome.substitution.is_empty());

    assert!(evaluator
        .check_method_call(strings, fx.atom("add"), &[TypeId::STRING], None)
        .is_ok());
    assert_eq!(
        evaluator.check_method_call(strings, fx.atom("add"), &[TypeId::INT], None),
        Err(SolverError::TypeMismatch {
            expected: TypeId::STRING,
            actual: TypeId::INT,
        })
    );
}

#[test]
fn test_method_call_infers_method_templates() {
    let (fx, _) = fixture();
    let strings = fx.generic("Collection", vec![TypeId::STRING]);
    let outcome = CallEvaluator::new(fx.ctx())
        .check_method_call(strings, fx.atom("map"), &[TypeId::FLOAT], None)
        .expect("valid call");
    assert_eq!(outcome.substitution.get(fx.atom("U")), Some(TypeId::FLOAT));
    assert_eq!(fx.format(outcome.return_type), "Collection<float>");
}

#[test]
fn test_method_call_on_subclass() {
    let (fx, collection) = fixture();
    let int_list = fx.interner.concrete_named("IntList");
    let evaluator = CallEvaluator::new(fx.ctx());

    let (method, view) = evaluator
        .resolve_method(int_list, fx.atom("get"))
        .expect("inherited method");
    assert_eq!(fx.store.get_parent(method), Some(collection));
    assert_eq!(fx.format(view), "Collection<int>");

    let outcome = evaluator
        .check_method_call(int_list, fx.atom("get"), &[], None)
        .expect("valid call");
    assert_eq!(outcome.return_type, TypeId::INT);
}

#[test]
fn test_method_call_on_raw_receiver_uses_bound() {
    let (fx, _) = fixture();
    let raw = fx.interner.concrete_named("Collection");
    let outcome = CallEvaluator::new(fx.ctx())
        .check_method_call(raw, fx.atom("get"), &[], None)
        .expect("valid call");
    assert_eq!(outcome.return_type, TypeId::MIXED);
}

#[test]
fn test_unknown_method() {
    let (fx, _) = fixture();
    let ints = fx.generic("Collection", vec![TypeId::INT]);
    assert_eq!(
        CallEvaluator::new(fx.ctx()).check_method_call(ints, fx.atom("missing"), &[], None),
        Err(SolverError::UnknownMethod {
            class: fx.atom("Collection"),
            method: fx.atom("missing"),
        })
    );
}

#[test]
fn test_method_on_union_receiver() {
    let (fx, _) = fixture();
    let receiver = fx.interner.nullable(fx.generic("Collection", vec![TypeId::INT]));
    assert_eq!(
        CallEvaluator::new(fx.ctx()).check_method_call(receiver, fx.atom("get"), &[], None),
        Err(SolverError::MethodOnNonClass {
            receiver,
            method: fx.atom("get"),
        })
    );
}

#[test]
fn test_check_call_unregistered_id() {
    let fx = Fixture::new();
    assert_eq!(
        CallEvaluator::new(fx.ctx()).check_call(DeclId(77), &[], None),
        Err(SolverError::UnregisteredDeclaration { id: DeclId(77) })
    );
}

#[test]
fn test_resolve_deferred_rechecks_bounds() {
    let fx = Fixture::new();
    let interface = fx.class("DateTimeInterface", &[]);
    let date_time = fx.class("DateTime", &["DateTimeInterface"]);
    let greater = fx.store.declare_function(fx.atom("greater"));
    fx.store
        .declare_template(greater, fx.atom("T"), Some(interface))
        .expect("fresh");
    let t = fx.template(greater, "T");
    fx.define(greater, &[t, t], t);

    // compare<V of DateTimeInterface>(V $a, V $b) calls greater($a, $b).
    let compare = fx.store.declare_function(fx.atom("compare"));
    fx.store
        .declare_template(compare, fx.atom("V"), Some(interface))
        .expect("fresh");
    let v = fx.template(compare, "V");
    fx.define(compare, &[v, v], v);

    let evaluator = CallEvaluator::new(fx.ctx());
    let inner_sig = fx.signature(greater);
    let inner = evaluator
        .check_call(greater, &[v, v], None)
        .expect("valid inner call");
    assert!(inner.substitution.is_symbolic(&fx.interner));

    let outer = evaluator
        .check_call(compare, &[date_time, date_time], None)
        .expect("valid outer call");
    let resolved = evaluator
        .resolve_deferred(&inner_sig, &inner.substitution, &outer.substitution)
        .expect("bounds hold");
    assert_eq!(resolved.get(fx.atom("T")), Some(date_time));

    let mut bad_outer = TypeSubstitution::new(compare);
    bad_outer.insert(fx.atom("V"), TypeId::INT);
    assert!(matches!(
        evaluator.resolve_deferred(&inner_sig, &inner.substitution, &bad_outer),
        Err(SolverError::BoundViolation { .. })
    ));
}

#[test]
fn test_check_assignment() {
    let (fx, _) = fixture();
    let evaluator = CallEvaluator::new(fx.ctx());
    let int_list = fx.interner.concrete_named("IntList");
    let ints = fx.generic("Collection", vec![TypeId::INT]);
    let dogs = fx.generic("Collection", vec![fx.interner.concrete_named("Dog")]);
    let animals = fx.generic("Collection", vec![fx.interner.concrete_named("Animal")]);

    assert_eq!(evaluator.check_assignment(int_list, ints), Ok(()));
    assert!(matches!(
        evaluator.check_assignment(dogs, animals),
        Err(SolverError::VarianceViolation { .. })
    ));
}
