//! Template propagation through inheritance.
//!
//! A class that extends, implements or uses a generic declaration supplies
//! arguments for the ancestor's templates:
//!
//! ```php
//! /** @template T */
//! class Collection {}
//!
//! /** @extends Collection<int> */
//! class IntList extends Collection {}
//!
//! /**
//!  * @template V
//!  * @extends Collection<V>
//!  */
//! class Stack extends Collection {}
//! ```
//!
//! `IntList` is viewed as `Collection<int>` and `Stack<string>` as
//! `Collection<string>`. The nominal relation itself (`IntList` extends
//! `Collection`) stays with the hierarchy collaborator; this module only maps
//! template arguments.

use crate::context::SolverContext;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::types::TypeId;
use templar_common::interner::Atom;
use templar_common::limits::MAX_INHERITANCE_DEPTH;
use tracing::trace;

/// View `type_id` as an instance of the generic `base`.
///
/// Returns `type_id` itself when its base already is `base`, the mapped
/// ancestor type when some inheritance path reaches `base`, and `None`
/// otherwise. Paths are tried in declaration order; the first one wins.
pub fn upcast_to_base(ctx: &SolverContext<'_>, type_id: TypeId, base: Atom) -> Option<TypeId> {
    upcast_inner(ctx, type_id, base, 0)
}

fn upcast_inner(
    ctx: &SolverContext<'_>,
    type_id: TypeId,
    base: Atom,
    depth: u32,
) -> Option<TypeId> {
    if depth > MAX_INHERITANCE_DEPTH {
        trace!(type_id = type_id.0, "upcast_to_base: inheritance depth exceeded");
        return None;
    }
    let (name, _) = ctx.interner.nominal_parts(type_id)?;
    if name == base {
        return Some(type_id);
    }
    direct_ancestors(ctx, type_id)
        .into_iter()
        .find_map(|ancestor| upcast_inner(ctx, ancestor, base, depth + 1))
}

/// The directly inherited declarations of a class type, with the class's
/// own template arguments substituted in.
///
/// A raw use of a generic class (`Collection` without arguments) stands in
/// each missing argument with the template's bound.
pub fn direct_ancestors(ctx: &SolverContext<'_>, type_id: TypeId) -> Vec<TypeId> {
    let Some((name, args)) = ctx.interner.nominal_parts(type_id) else {
        return Vec::new();
    };
    let Some(class) = ctx.store.class_by_name(name) else {
        return Vec::new();
    };
    let Some(info) = ctx.store.get(class) else {
        return Vec::new();
    };

    let mut subst = TypeSubstitution::from_args(class, &info.templates, &args);
    for template in info.templates.iter().skip(args.len()) {
        subst.insert(template.name, template.effective_bound());
    }

    info.inherited
        .iter()
        .map(|inherited| {
            let mapped = inherited
                .args
                .iter()
                .map(|&arg| instantiate_type(ctx.interner, arg, &subst))
                .collect();
            ctx.interner.parameterized(inherited.base, mapped)
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/inheritance_tests.rs"]
mod tests;
