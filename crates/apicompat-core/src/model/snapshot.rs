use crate::errors::{ApiError, ApiErrorKind, Result};
use crate::model::item::{ClassItem, FieldItem, MethodItem, PackageItem};
use crate::model::types::SourceLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An immutable view of one version of an API surface
///
/// Built through [`SnapshotBuilder`] (or deserialized and validated with
/// [`CodebaseSnapshot::from_json`]); never mutated afterwards, so it can be
/// shared read-only between concurrent checks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodebaseSnapshot {
    packages: BTreeMap<String, PackageItem>,
}

impl CodebaseSnapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Deserialize a snapshot and check its identity invariants
    ///
    /// # Errors
    ///
    /// `Serialization` for malformed JSON, `InvalidSnapshot` when map keys do
    /// not agree with the items they hold, `DuplicateItem` for a class listed
    /// in two packages.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: CodebaseSnapshot = serde_json::from_str(text)?;
        let mut builder = SnapshotBuilder::default();
        for (name, package) in raw.packages {
            if name != package.name {
                return Err(ApiError::new(ApiErrorKind::InvalidSnapshot)
                    .with_op("from_json")
                    .with_element(name)
                    .with_message("package key does not match package name"));
            }
            builder.add_package(&package.name, package.location.clone());
            for (qualified_name, class) in package.classes {
                validate_class_keys(&qualified_name, &class)?;
                builder.add_class(class)?;
            }
        }
        Ok(builder.build())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn package(&self, name: &str) -> Option<&PackageItem> {
        self.packages.get(name)
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageItem> {
        self.packages.values()
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Look up a class by qualified name
    pub fn class(&self, qualified_name: &str) -> Option<&ClassItem> {
        self.package_of(qualified_name)
            .and_then(|package| package.classes.get(qualified_name))
    }

    pub fn contains_class(&self, qualified_name: &str) -> bool {
        self.class(qualified_name).is_some()
    }

    /// All classes, sorted by package then qualified name
    pub fn classes(&self) -> impl Iterator<Item = &ClassItem> {
        self.packages.values().flat_map(|p| p.classes.values())
    }

    pub fn class_count(&self) -> usize {
        self.packages.values().map(|p| p.classes.len()).sum()
    }

    /// The package a qualified class name would live in: the longest dotted
    /// prefix that names a package of this snapshot
    pub fn package_of(&self, qualified_name: &str) -> Option<&PackageItem> {
        let mut candidate = qualified_name;
        while let Some((prefix, _)) = candidate.rsplit_once('.') {
            if let Some(package) = self.packages.get(prefix) {
                return Some(package);
            }
            candidate = prefix;
        }
        self.packages.get("")
    }

    /// Resolve an element key (`pkg.Cls#member`) to its suppression payloads
    ///
    /// Payloads of the member, its class and every enclosing class are
    /// returned; an element naming a package yields nothing.
    pub fn suppressions_for(&self, element: &str) -> Vec<&str> {
        let (class_name, member) = match element.split_once('#') {
            Some((class_name, member)) => (class_name, Some(member)),
            None => (element, None),
        };
        let mut payloads = Vec::new();
        let Some(class) = self.class(class_name) else {
            return payloads;
        };
        if let Some(member) = member {
            if let Some(method) = class
                .methods
                .get(member)
                .or_else(|| class.constructors.get(member))
            {
                payloads.extend(method.suppressions.iter().map(String::as_str));
            } else if let Some(field) = class.fields.get(member) {
                payloads.extend(field.suppressions.iter().map(String::as_str));
            }
        }
        let mut current = Some(class);
        while let Some(cls) = current {
            payloads.extend(cls.suppressions.iter().map(String::as_str));
            current = cls.containing_class.as_deref().and_then(|c| self.class(c));
        }
        payloads
    }

    /// Find a method or constructor by its element key
    pub fn method_by_element(&self, element: &str) -> Option<&MethodItem> {
        let (class_name, key) = element.split_once('#')?;
        let class = self.class(class_name)?;
        class.methods.get(key).or_else(|| class.constructors.get(key))
    }

    /// Find a field by its element key
    pub fn field_by_element(&self, element: &str) -> Option<&FieldItem> {
        let (class_name, name) = element.split_once('#')?;
        self.class(class_name)?.fields.get(name)
    }
}

fn validate_class_keys(qualified_name: &str, class: &ClassItem) -> Result<()> {
    let mismatch = |element: String, what: &str| {
        Err(ApiError::new(ApiErrorKind::InvalidSnapshot)
            .with_op("from_json")
            .with_element(element)
            .with_message(format!("{} key does not match the item it holds", what)))
    };
    if qualified_name != class.qualified_name {
        return mismatch(qualified_name.to_string(), "class");
    }
    for (key, method) in class.all_methods() {
        if *key != method.signature_key(&class.type_params) {
            return mismatch(class.member_element(key), "method");
        }
    }
    for (key, field) in &class.fields {
        if *key != field.name {
            return mismatch(class.member_element(key), "field");
        }
    }
    Ok(())
}

/// Incremental constructor for [`CodebaseSnapshot`]
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    packages: BTreeMap<String, PackageItem>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a package; declaring it again keeps the first location
    pub fn add_package(&mut self, name: &str, location: SourceLocation) -> &mut Self {
        self.packages
            .entry(name.to_string())
            .or_insert_with(|| PackageItem::new(name, location));
        self
    }

    /// Add a class to its package, creating the package if needed
    ///
    /// # Errors
    ///
    /// `DuplicateItem` when the qualified name is already present.
    pub fn add_class(&mut self, class: ClassItem) -> Result<&mut Self> {
        let location = class.location.clone();
        let package = self
            .packages
            .entry(class.package.clone())
            .or_insert_with(|| PackageItem::new(class.package.clone(), location));
        if package.classes.contains_key(&class.qualified_name) {
            return Err(ApiError::new(ApiErrorKind::DuplicateItem)
                .with_op("add_class")
                .with_element(class.qualified_name.clone())
                .with_message("class declared twice"));
        }
        package.classes.insert(class.qualified_name.clone(), class);
        Ok(self)
    }

    pub fn contains_class(&self, qualified_name: &str) -> bool {
        self.packages
            .values()
            .any(|p| p.classes.contains_key(qualified_name))
    }

    pub fn build(self) -> CodebaseSnapshot {
        CodebaseSnapshot {
            packages: self.packages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::ClassKind;
    use crate::model::types::TypeRef;

    fn snapshot() -> CodebaseSnapshot {
        let mut outer = ClassItem::new("test.pkg", "Outer", ClassKind::Class);
        outer.suppressions.push("ChangedValue".to_string());
        let mut inner = ClassItem::new("test.pkg", "Outer.Inner", ClassKind::Class);
        let mut method = MethodItem::method("test.pkg.Outer.Inner", "run", TypeRef::primitive("void"));
        method.suppressions.push("RemovedMethod".to_string());
        inner.add_method(method).unwrap();

        let mut builder = CodebaseSnapshot::builder();
        builder.add_class(outer).unwrap();
        builder.add_class(inner).unwrap();
        builder.build()
    }

    #[test]
    fn test_class_lookup_through_nested_names() {
        let snapshot = snapshot();
        assert!(snapshot.contains_class("test.pkg.Outer.Inner"));
        assert_eq!(
            snapshot.package_of("test.pkg.Outer.Inner").map(|p| p.name.as_str()),
            Some("test.pkg")
        );
        assert_eq!(snapshot.class_count(), 2);
    }

    #[test]
    fn test_suppressions_collect_enclosing_classes() {
        let snapshot = snapshot();
        let payloads = snapshot.suppressions_for("test.pkg.Outer.Inner#run()");
        assert_eq!(payloads, vec!["RemovedMethod", "ChangedValue"]);
        assert!(snapshot.suppressions_for("test.pkg").is_empty());
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let mut builder = CodebaseSnapshot::builder();
        builder
            .add_class(ClassItem::new("test.pkg", "Foo", ClassKind::Class))
            .unwrap();
        let err = builder
            .add_class(ClassItem::new("test.pkg", "Foo", ClassKind::Interface))
            .unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::DuplicateItem);
    }

    #[test]
    fn test_json_round_trip_validates_keys() {
        let snapshot = snapshot();
        let json = snapshot.to_json().unwrap();
        assert_eq!(CodebaseSnapshot::from_json(&json).unwrap(), snapshot);

        let tampered = json.replace("\"run()\"", "\"walk()\"");
        let err = CodebaseSnapshot::from_json(&tampered).unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::InvalidSnapshot);
    }
}
