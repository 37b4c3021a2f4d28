use super::*;
use crate::intern::TypeInterner;

#[test]
fn test_reserved_type_ids_match_scalar_names() {
    let interner = TypeInterner::new();
    assert_eq!(interner.lookup(TypeId::MIXED), Some(TypeData::Mixed));
    for (offset, name) in TypeId::SCALAR_NAMES.iter().enumerate() {
        let id = TypeId(offset as u32 + 1);
        let atom = interner.intern_string(name);
        assert_eq!(interner.lookup(id), Some(TypeData::Concrete(atom)));
    }
    assert_eq!(interner.concrete_named("null"), TypeId::NULL);
    assert_eq!(interner.concrete_named("string"), TypeId::STRING);
}

#[test]
fn test_template_refs_are_owner_scoped() {
    let interner = TypeInterner::new();
    let t = interner.intern_string("T");
    let identity_t = TemplateRef {
        owner: DeclId(1),
        name: t,
    };
    let first_t = TemplateRef {
        owner: DeclId(2),
        name: t,
    };
    assert_ne!(identity_t, first_t);
    assert_ne!(
        interner.intern(TypeData::TemplateRef(identity_t)),
        interner.intern(TypeData::TemplateRef(first_t))
    );
}

#[test]
fn test_param_info_new() {
    let interner = TypeInterner::new();
    let name = interner.intern_string("items");
    let param = ParamInfo::new(name, TypeId::INT);
    assert_eq!(param.name, name);
    assert_eq!(param.type_id, TypeId::INT);
}
