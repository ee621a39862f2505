//! Type hierarchy queries over a single snapshot.
//!
//! Supertypes that are not part of the snapshot (typically `java.*` classes)
//! end the walk, except for exceptions where a built-in table supplies the
//! well-known superclass chain.

use crate::model::item::{ClassItem, FieldItem, MethodItem};
use crate::model::snapshot::CodebaseSnapshot;
use crate::model::types::Visibility;
use std::collections::{BTreeSet, VecDeque};

pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";

/// Superclass of frequently thrown `java.*` exceptions
const WELL_KNOWN_EXCEPTIONS: &[(&str, &str)] = &[
    ("java.lang.Throwable", JAVA_LANG_OBJECT),
    ("java.lang.Exception", "java.lang.Throwable"),
    ("java.lang.Error", "java.lang.Throwable"),
    ("java.lang.RuntimeException", "java.lang.Exception"),
    ("java.lang.ArithmeticException", "java.lang.RuntimeException"),
    ("java.lang.ArrayStoreException", "java.lang.RuntimeException"),
    ("java.lang.ClassCastException", "java.lang.RuntimeException"),
    ("java.lang.IllegalArgumentException", "java.lang.RuntimeException"),
    ("java.lang.IllegalStateException", "java.lang.RuntimeException"),
    ("java.lang.IndexOutOfBoundsException", "java.lang.RuntimeException"),
    (
        "java.lang.ArrayIndexOutOfBoundsException",
        "java.lang.IndexOutOfBoundsException",
    ),
    (
        "java.lang.StringIndexOutOfBoundsException",
        "java.lang.IndexOutOfBoundsException",
    ),
    ("java.lang.NegativeArraySizeException", "java.lang.RuntimeException"),
    ("java.lang.NullPointerException", "java.lang.RuntimeException"),
    ("java.lang.NumberFormatException", "java.lang.IllegalArgumentException"),
    ("java.lang.SecurityException", "java.lang.RuntimeException"),
    ("java.lang.UnsupportedOperationException", "java.lang.RuntimeException"),
    ("java.lang.CloneNotSupportedException", "java.lang.Exception"),
    ("java.lang.InterruptedException", "java.lang.Exception"),
    ("java.lang.ReflectiveOperationException", "java.lang.Exception"),
    ("java.lang.ClassNotFoundException", "java.lang.ReflectiveOperationException"),
    ("java.lang.NoSuchFieldException", "java.lang.ReflectiveOperationException"),
    ("java.lang.NoSuchMethodException", "java.lang.ReflectiveOperationException"),
    ("java.io.IOException", "java.lang.Exception"),
    ("java.io.FileNotFoundException", "java.io.IOException"),
    ("java.io.EOFException", "java.io.IOException"),
    ("java.io.UncheckedIOException", "java.lang.RuntimeException"),
    ("java.io.UnsupportedEncodingException", "java.io.IOException"),
    ("java.net.MalformedURLException", "java.io.IOException"),
    ("java.net.SocketException", "java.io.IOException"),
    ("java.net.UnknownHostException", "java.io.IOException"),
    ("java.util.ConcurrentModificationException", "java.lang.RuntimeException"),
    ("java.util.NoSuchElementException", "java.lang.RuntimeException"),
    ("java.util.concurrent.TimeoutException", "java.lang.Exception"),
    ("java.util.concurrent.ExecutionException", "java.lang.Exception"),
    ("java.util.concurrent.CancellationException", "java.lang.IllegalStateException"),
    ("java.security.GeneralSecurityException", "java.lang.Exception"),
];

/// Methods every class inherits from `java.lang.Object`, by name and erased parameters
const OBJECT_METHODS: &[(&str, &[&str])] = &[
    ("equals", &[JAVA_LANG_OBJECT]),
    ("hashCode", &[]),
    ("toString", &[]),
    ("clone", &[]),
    ("finalize", &[]),
    ("getClass", &[]),
    ("notify", &[]),
    ("notifyAll", &[]),
    ("wait", &[]),
    ("wait", &["long"]),
    ("wait", &["long", "int"]),
];

/// Whether a signature key (`equals(java.lang.Object)`) names a `java.lang.Object` method
pub fn is_object_method(key: &str) -> bool {
    let Some((name, rest)) = key.split_once('(') else {
        return false;
    };
    let params: Vec<&str> = rest
        .trim_end_matches(')')
        .split(',')
        .filter(|p| !p.is_empty())
        .map(|p| if p == "Object" { JAVA_LANG_OBJECT } else { p })
        .collect();
    OBJECT_METHODS
        .iter()
        .any(|(n, ps)| *n == name && *ps == params.as_slice())
}

fn well_known_superclass(name: &str) -> Option<&'static str> {
    WELL_KNOWN_EXCEPTIONS
        .iter()
        .find(|(exception, _)| *exception == name)
        .map(|(_, parent)| *parent)
}

impl CodebaseSnapshot {
    /// Direct superclass, when it is part of this snapshot
    pub fn superclass_of(&self, class: &ClassItem) -> Option<&ClassItem> {
        class
            .superclass
            .as_ref()
            .and_then(|s| s.class_name())
            .and_then(|name| self.class(name))
    }

    /// Names of all superclasses, nearest first, including the first one
    /// outside the snapshot
    pub fn superclass_names(&self, class: &ClassItem) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = class
            .superclass
            .as_ref()
            .and_then(|s| s.class_name())
            .map(str::to_string);
        while let Some(name) = current {
            if names.contains(&name) {
                break;
            }
            current = match self.class(&name) {
                Some(cls) => cls
                    .superclass
                    .as_ref()
                    .and_then(|s| s.class_name())
                    .map(str::to_string),
                None => well_known_superclass(&name).map(str::to_string),
            };
            names.push(name);
        }
        names
    }

    /// Every supertype reachable from `class` (superclasses and interfaces,
    /// breadth first), excluding `class` itself
    pub fn all_supertypes<'a>(&'a self, class: &'a ClassItem) -> Vec<&'a ClassItem> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&ClassItem> = VecDeque::new();
        let mut result = Vec::new();
        seen.insert(class.qualified_name.as_str());
        queue.push_back(class);
        while let Some(current) = queue.pop_front() {
            let direct = current
                .superclass
                .iter()
                .chain(current.interfaces.iter())
                .filter_map(|t| t.class_name());
            for name in direct {
                if let Some(next) = self.class(name) {
                    if seen.insert(next.qualified_name.as_str()) {
                        result.push(next);
                        queue.push_back(next);
                    }
                }
            }
        }
        result
    }

    /// Transitive set of interface names implemented by `class`, including
    /// interfaces inherited from superclasses and super-interfaces
    pub fn all_interfaces(&self, class: &ClassItem) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = class.interface_names().map(str::to_string).collect();
        for supertype in self.all_supertypes(class) {
            if supertype.kind.is_interface_like() {
                names.insert(supertype.qualified_name.clone());
            }
            names.extend(supertype.interface_names().map(str::to_string));
        }
        names
    }

    /// A method with signature `key` declared by some supertype of `class`
    pub fn inherited_method<'a>(&'a self, class: &'a ClassItem, key: &str) -> Option<&'a MethodItem> {
        self.all_supertypes(class)
            .into_iter()
            .find_map(|supertype| supertype.methods.get(key))
    }

    /// A field named `name` declared by some supertype of `class`
    pub fn inherited_field<'a>(&'a self, class: &'a ClassItem, name: &str) -> Option<&'a FieldItem> {
        self.all_supertypes(class)
            .into_iter()
            .find_map(|supertype| supertype.fields.get(name))
    }

    /// Whether exception `name` is `ancestor` or one of its subclasses
    pub fn is_subclass_of(&self, name: &str, ancestor: &str) -> bool {
        if name == ancestor {
            return true;
        }
        let mut seen = BTreeSet::new();
        let mut current = Some(name.to_string());
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            if !seen.insert(cur.clone()) {
                return false;
            }
            current = match self.class(&cur) {
                Some(cls) => cls
                    .superclass
                    .as_ref()
                    .and_then(|s| s.class_name())
                    .map(str::to_string),
                None => well_known_superclass(&cur).map(str::to_string),
            };
        }
        false
    }

    /// Declared visibility narrowed by every enclosing class
    pub fn effective_class_visibility(&self, class: &ClassItem) -> Visibility {
        let mut visibility = class.modifiers.visibility;
        let mut outer = class.containing_class.as_deref();
        let mut depth = 0;
        while let Some(name) = outer {
            let Some(cls) = self.class(name) else { break };
            visibility = visibility.min(cls.modifiers.visibility);
            outer = cls.containing_class.as_deref();
            depth += 1;
            if depth > 64 {
                break;
            }
        }
        visibility
    }

    pub fn is_api_visible(&self, class: &ClassItem) -> bool {
        self.effective_class_visibility(class).is_api()
    }

    /// Effective visibility of a member of `class`
    ///
    /// Interface members are implicitly public.
    pub fn effective_member_visibility(&self, class: &ClassItem, declared: Visibility) -> Visibility {
        let declared = if class.kind.is_interface_like() && declared == Visibility::PackagePrivate {
            Visibility::Public
        } else {
            declared
        };
        declared.min(self.effective_class_visibility(class))
    }

    /// Whether `class` has a constructor callers outside the package can use
    pub fn has_api_constructor(&self, class: &ClassItem) -> bool {
        class
            .constructors
            .values()
            .any(|c| c.modifiers.visibility.is_api())
    }

    /// Declared final, sealed, or impossible to subclass from outside the
    /// package because it has no API-visible constructor
    pub fn is_effectively_final(&self, class: &ClassItem) -> bool {
        if class.kind.is_interface_like() {
            return class.modifiers.is_sealed;
        }
        class.modifiers.is_final || class.modifiers.is_sealed || !self.has_api_constructor(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::{ClassKind, MethodItem};
    use crate::model::types::{Modifiers, TypeRef};

    fn hierarchy() -> CodebaseSnapshot {
        let base_iface = ClassItem::new("test.pkg", "Base", ClassKind::Interface);
        let child_iface = ClassItem::new("test.pkg", "Child", ClassKind::Interface)
            .with_interface(TypeRef::class("test.pkg.Base"));
        let mut parent = ClassItem::new("test.pkg", "Parent", ClassKind::Class)
            .with_interface(TypeRef::class("test.pkg.Child"));
        parent
            .add_method(MethodItem::method("test.pkg.Parent", "run", TypeRef::primitive("void")))
            .unwrap();
        let child = ClassItem::new("test.pkg", "Impl", ClassKind::Class)
            .with_superclass(TypeRef::class("test.pkg.Parent"));
        let hidden_outer = ClassItem::new("test.pkg", "Hidden", ClassKind::Class)
            .with_modifiers(Modifiers::default());
        let nested = ClassItem::new("test.pkg", "Hidden.Nested", ClassKind::Class);

        let mut builder = CodebaseSnapshot::builder();
        for class in [base_iface, child_iface, parent, child, hidden_outer, nested] {
            builder.add_class(class).unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_all_interfaces_is_transitive() {
        let snapshot = hierarchy();
        let class = snapshot.class("test.pkg.Impl").unwrap();
        let names: Vec<String> = snapshot.all_interfaces(class).into_iter().collect();
        assert_eq!(names, vec!["test.pkg.Base", "test.pkg.Child"]);
    }

    #[test]
    fn test_inherited_method_found_in_superclass() {
        let snapshot = hierarchy();
        let class = snapshot.class("test.pkg.Impl").unwrap();
        assert!(snapshot.inherited_method(class, "run()").is_some());
        assert!(snapshot.inherited_method(class, "walk()").is_none());
    }

    #[test]
    fn test_effective_visibility_narrowed_by_outer_class() {
        let snapshot = hierarchy();
        let nested = snapshot.class("test.pkg.Hidden.Nested").unwrap();
        assert_eq!(
            snapshot.effective_class_visibility(nested),
            Visibility::PackagePrivate
        );
        assert!(!snapshot.is_api_visible(nested));
    }

    #[test]
    fn test_exception_table() {
        let snapshot = CodebaseSnapshot::default();
        assert!(snapshot.is_subclass_of("java.io.FileNotFoundException", "java.io.IOException"));
        assert!(snapshot.is_subclass_of(
            "java.lang.NumberFormatException",
            "java.lang.RuntimeException"
        ));
        assert!(!snapshot.is_subclass_of("java.io.IOException", "java.lang.RuntimeException"));
    }

    #[test]
    fn test_object_methods() {
        assert!(is_object_method("equals(java.lang.Object)"));
        assert!(is_object_method("equals(Object)"));
        assert!(is_object_method("hashCode()"));
        assert!(!is_object_method("hashCode(int)"));
    }

    #[test]
    fn test_uninstantiable_class_is_effectively_final() {
        let snapshot = hierarchy();
        let parent = snapshot.class("test.pkg.Parent").unwrap();
        assert!(snapshot.is_effectively_final(parent));
    }
}
