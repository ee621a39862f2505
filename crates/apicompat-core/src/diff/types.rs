//! Structural type comparison across two snapshots.
//!
//! Type variables are matched by their position in the declaring method or
//! class, so renaming `T` to `U` is not a change, while changing a bound is.

use crate::model::{TypeParam, TypeRef, WildcardBound};

/// Type parameters visible at a use site, innermost first
#[derive(Clone, Copy)]
pub(crate) struct TypeScope<'a> {
    pub method: &'a [TypeParam],
    pub class: &'a [TypeParam],
}

impl<'a> TypeScope<'a> {
    pub fn class(class: &'a [TypeParam]) -> Self {
        Self { method: &[], class }
    }

    pub fn method(method: &'a [TypeParam], class: &'a [TypeParam]) -> Self {
        Self { method, class }
    }

    fn position(&self, name: &str) -> Option<(u8, usize)> {
        if let Some(i) = self.method.iter().position(|p| p.name == name) {
            return Some((0, i));
        }
        self.class
            .iter()
            .position(|p| p.name == name)
            .map(|i| (1, i))
    }

    pub fn param(&self, name: &str) -> Option<&'a TypeParam> {
        self.method
            .iter()
            .chain(self.class.iter())
            .find(|p| p.name == name)
    }
}

/// Whether `old` (seen in `old_scope`) and `new` (in `new_scope`) denote the same type
pub(crate) fn same_type(old: &TypeRef, old_scope: TypeScope, new: &TypeRef, new_scope: TypeScope) -> bool {
    compare(old, old_scope, new, new_scope, true)
}

fn compare(
    old: &TypeRef,
    old_scope: TypeScope,
    new: &TypeRef,
    new_scope: TypeScope,
    with_bounds: bool,
) -> bool {
    match (old, new) {
        (TypeRef::Primitive(a), TypeRef::Primitive(b)) => a == b,
        (TypeRef::Variable(a), TypeRef::Variable(b)) => {
            match (old_scope.position(a), new_scope.position(b)) {
                (Some(pa), Some(pb)) => {
                    pa == pb
                        && (!with_bounds
                            || same_bounds(
                                old_scope.param(a),
                                old_scope,
                                new_scope.param(b),
                                new_scope,
                            ))
                }
                (None, None) => a == b,
                _ => false,
            }
        }
        (
            TypeRef::Class { name: a, args: aa },
            TypeRef::Class { name: b, args: ba },
        ) => {
            a == b
                && aa.len() == ba.len()
                && aa
                    .iter()
                    .zip(ba)
                    .all(|(x, y)| compare(x, old_scope, y, new_scope, with_bounds))
        }
        (TypeRef::Array(a), TypeRef::Array(b)) => compare(a, old_scope, b, new_scope, with_bounds),
        (TypeRef::Wildcard { bound: a }, TypeRef::Wildcard { bound: b }) => match (a, b) {
            (WildcardBound::Unbounded, WildcardBound::Unbounded) => true,
            (WildcardBound::Extends(x), WildcardBound::Extends(y))
            | (WildcardBound::Super(x), WildcardBound::Super(y)) => {
                compare(x, old_scope, y, new_scope, with_bounds)
            }
            _ => false,
        },
        _ => false,
    }
}

fn same_bounds(
    old: Option<&TypeParam>,
    old_scope: TypeScope,
    new: Option<&TypeParam>,
    new_scope: TypeScope,
) -> bool {
    let object = [TypeRef::class("java.lang.Object")];
    let bounds = |param: Option<&TypeParam>| -> Vec<TypeRef> {
        match param {
            Some(p) if !p.bounds.is_empty() => p.bounds.clone(),
            _ => object.to_vec(),
        }
    };
    let (old_bounds, new_bounds) = (bounds(old), bounds(new));
    old_bounds.len() == new_bounds.len()
        && old_bounds
            .iter()
            .zip(&new_bounds)
            .all(|(a, b)| compare(a, old_scope, b, new_scope, false))
}

/// Render a type for a change message; bare type variables show their bound
pub(crate) fn describe_type(ty: &TypeRef, scope: TypeScope) -> String {
    match ty {
        TypeRef::Variable(name) => match scope.param(name) {
            Some(param) => param.describe(),
            None => TypeParam::new(name.clone()).describe(),
        },
        other => other.to_string(),
    }
}
