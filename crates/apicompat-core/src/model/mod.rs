pub mod hierarchy;
pub mod item;
pub mod snapshot;
pub mod types;

pub use item::{ClassItem, ClassKind, DefaultValue, FieldItem, MethodItem, PackageItem, Parameter};
pub use snapshot::{CodebaseSnapshot, SnapshotBuilder};
pub use types::{
    Modifiers, Nullness, SourceLocation, TypeParam, TypeRef, Visibility, WildcardBound, PRIMITIVES,
};
