use crate::errors::{ApiError, ApiErrorKind, Result};
use crate::model::types::{Modifiers, Nullness, SourceLocation, TypeParam, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a class-like declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

impl ClassKind {
    /// Interfaces and annotation types are both interfaces to the JVM
    pub fn is_interface_like(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::Annotation)
    }
}

/// Default value of a (Kotlin) parameter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultValue {
    #[default]
    None,
    /// The parameter is optional but the value is not recorded
    Unknown,
    Value(String),
}

impl DefaultValue {
    pub fn is_present(&self) -> bool {
        !matches!(self, DefaultValue::None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name as declared (may be synthetic such as `arg1`)
    pub name: String,
    /// Name callers may use (Kotlin named arguments); `None` when not public
    #[serde(default)]
    pub public_name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub nullness: Nullness,
    #[serde(default)]
    pub varargs: bool,
    #[serde(default)]
    pub default_value: DefaultValue,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            public_name: None,
            ty,
            nullness: Nullness::Unannotated,
            varargs: false,
            default_value: DefaultValue::None,
        }
    }

    pub fn with_public_name(mut self) -> Self {
        self.public_name = Some(self.name.clone());
        self
    }

    pub fn with_nullness(mut self, nullness: Nullness) -> Self {
        self.nullness = nullness;
        self
    }

    pub fn with_default(mut self, default_value: DefaultValue) -> Self {
        self.default_value = default_value;
        self
    }

    /// Mark as varargs; `ty` must already be the array type
    pub fn varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    /// Type as written, with `...` for varargs
    pub fn type_text(&self) -> String {
        let text = self.ty.to_string();
        match (self.varargs, text.strip_suffix("[]")) {
            (true, Some(component)) => format!("{}...", component),
            _ => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodItem {
    pub name: String,
    /// Qualified name of the declaring class
    pub containing_class: String,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    /// `None` for constructors
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub return_nullness: Nullness,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub throws: Vec<TypeRef>,
    /// Default of an annotation type element (`default false`)
    #[serde(default)]
    pub annotation_default: Option<String>,
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub suppressions: Vec<String>,
}

impl MethodItem {
    pub fn method(
        containing_class: impl Into<String>,
        name: impl Into<String>,
        return_type: TypeRef,
    ) -> Self {
        Self {
            name: name.into(),
            containing_class: containing_class.into(),
            is_constructor: false,
            modifiers: Modifiers::public(),
            type_params: Vec::new(),
            return_type: Some(return_type),
            return_nullness: Nullness::Unannotated,
            parameters: Vec::new(),
            throws: Vec::new(),
            annotation_default: None,
            location: SourceLocation::default(),
            suppressions: Vec::new(),
        }
    }

    /// A constructor is named after the simple name of its class
    pub fn constructor(containing_class: impl Into<String>) -> Self {
        let containing_class = containing_class.into();
        let name = containing_class
            .rsplit('.')
            .next()
            .unwrap_or(&containing_class)
            .to_string();
        Self {
            is_constructor: true,
            return_type: None,
            ..Self::method(containing_class, name, TypeRef::primitive("void"))
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_throws(mut self, exception: TypeRef) -> Self {
        self.throws.push(exception);
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Signature key: name plus erased parameter types, e.g. `foo(int,java.lang.String)`
    pub fn signature_key(&self, class_type_params: &[TypeParam]) -> String {
        let scope: [&[TypeParam]; 2] = [&self.type_params, class_type_params];
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| p.ty.erasure(&scope))
            .collect();
        format!("{}({})", self.name, params.join(","))
    }

    /// `pkg.Cls.name` (constructors: `pkg.Cls.Cls`)
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.containing_class, self.name)
    }

    /// `pkg.Cls.m(String,int)`; constructors render as `pkg.Cls(String,int)`
    pub fn describe(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(Parameter::type_text).collect();
        format!("{}({})", self.call_target(), params.join(","))
    }

    /// `pkg.Cls.m(String s, int i)`, used when a message points at a parameter
    pub fn describe_with_names(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.type_text(), p.name))
            .collect();
        format!("{}({})", self.call_target(), params.join(", "))
    }

    fn call_target(&self) -> String {
        if self.is_constructor {
            self.containing_class.clone()
        } else {
            self.qualified_name()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldItem {
    pub name: String,
    pub containing_class: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub nullness: Nullness,
    /// Compile-time constant value as written
    #[serde(default)]
    pub constant_value: Option<String>,
    #[serde(default)]
    pub is_enum_constant: bool,
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub suppressions: Vec<String>,
}

impl FieldItem {
    pub fn new(containing_class: impl Into<String>, name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            containing_class: containing_class.into(),
            modifiers: Modifiers::public(),
            ty,
            nullness: Nullness::Unannotated,
            constant_value: None,
            is_enum_constant: false,
            location: SourceLocation::default(),
            suppressions: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.constant_value = Some(value.into());
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.containing_class, self.name)
    }

    pub fn is_static_final(&self) -> bool {
        self.modifiers.is_static && self.modifiers.is_final
    }
}

/// A class, interface, enum or annotation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassItem {
    /// Fully qualified name, nested classes joined with `.` (`pkg.Outer.Inner`)
    pub qualified_name: String,
    pub package: String,
    /// Qualified name of the enclosing class for nested classes
    #[serde(default)]
    pub containing_class: Option<String>,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub superclass: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    /// Methods keyed by signature key
    #[serde(default)]
    pub methods: BTreeMap<String, MethodItem>,
    /// Constructors keyed by signature key
    #[serde(default)]
    pub constructors: BTreeMap<String, MethodItem>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldItem>,
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub suppressions: Vec<String>,
}

impl ClassItem {
    pub fn new(package: impl Into<String>, name_in_package: &str, kind: ClassKind) -> Self {
        let package = package.into();
        let qualified_name = if package.is_empty() {
            name_in_package.to_string()
        } else {
            format!("{}.{}", package, name_in_package)
        };
        let containing_class = name_in_package
            .rsplit_once('.')
            .map(|(outer, _)| qualify(&package, outer));
        Self {
            qualified_name,
            package,
            containing_class,
            kind,
            modifiers: Modifiers::public(),
            superclass: None,
            interfaces: Vec::new(),
            type_params: Vec::new(),
            methods: BTreeMap::new(),
            constructors: BTreeMap::new(),
            fields: BTreeMap::new(),
            location: SourceLocation::default(),
            suppressions: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_superclass(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn with_interface(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Simple name, the last segment of the qualified name
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Name relative to the package (`Outer.Inner`)
    pub fn name_in_package(&self) -> &str {
        self.qualified_name
            .strip_prefix(self.package.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.qualified_name)
    }

    /// Insert a method or constructor, rejecting duplicate signatures
    ///
    /// # Errors
    ///
    /// `DuplicateItem` when a member with the same signature key exists.
    pub fn add_method(&mut self, method: MethodItem) -> Result<String> {
        let key = method.signature_key(&self.type_params);
        let element = self.member_element(&key);
        let target = if method.is_constructor {
            &mut self.constructors
        } else {
            &mut self.methods
        };
        if target.contains_key(&key) {
            return Err(ApiError::new(ApiErrorKind::DuplicateItem)
                .with_op("add_method")
                .with_element(element)
                .with_message("method signature declared twice"));
        }
        target.insert(key.clone(), method);
        Ok(key)
    }

    /// Insert a field, rejecting duplicate names
    ///
    /// # Errors
    ///
    /// `DuplicateItem` when a field with the same name exists.
    pub fn add_field(&mut self, field: FieldItem) -> Result<()> {
        if self.fields.contains_key(&field.name) {
            return Err(ApiError::new(ApiErrorKind::DuplicateItem)
                .with_op("add_field")
                .with_element(self.member_element(&field.name))
                .with_message("field declared twice"));
        }
        self.fields.insert(field.name.clone(), field);
        Ok(())
    }

    /// Element key of a member: `pkg.Cls#key`
    pub fn member_element(&self, key: &str) -> String {
        format!("{}#{}", self.qualified_name, key)
    }

    /// Constructors and methods, constructors first
    pub fn all_methods(&self) -> impl Iterator<Item = (&String, &MethodItem)> {
        self.constructors.iter().chain(self.methods.iter())
    }

    /// Declared interface names, type arguments dropped
    pub fn interface_names(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().filter_map(TypeRef::class_name)
    }

    /// Declared `final` or `sealed`, so no outside subclass can override a member
    pub fn prevents_overrides(&self) -> bool {
        self.modifiers.is_final || self.modifiers.is_sealed
    }
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

/// A package and the classes declared in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageItem {
    pub name: String,
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub classes: BTreeMap<String, ClassItem>,
}

impl PackageItem {
    pub fn new(name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            location,
            classes: BTreeMap::new(),
        }
    }
}
