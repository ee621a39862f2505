use serde::{Deserialize, Serialize};
use std::fmt;

/// Java primitive type names, `void` included
pub const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// A reference to a type as written in an API signature
///
/// Names are kept exactly as the loader produced them; no re-qualification
/// happens here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// `int`, `boolean`, `void`, ...
    Primitive(String),
    /// A class or interface type, possibly parameterized
    Class { name: String, args: Vec<TypeRef> },
    /// A type variable declared by the enclosing method or class
    Variable(String),
    /// `T[]`
    Array(Box<TypeRef>),
    /// `?`, `? extends T`, `? super T` (only valid as a type argument)
    Wildcard { bound: WildcardBound },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<TypeRef>),
    Super(Box<TypeRef>),
}

impl TypeRef {
    pub fn primitive(name: impl Into<String>) -> Self {
        TypeRef::Primitive(name.into())
    }

    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        TypeRef::Variable(name.into())
    }

    pub fn array(component: TypeRef) -> Self {
        TypeRef::Array(Box::new(component))
    }

    /// Build a primitive or class reference from a bare name
    pub fn named(name: &str) -> Self {
        if PRIMITIVES.contains(&name) {
            TypeRef::primitive(name)
        } else {
            TypeRef::class(name)
        }
    }

    /// True for primitives (including `void`); arrays of primitives are references
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, TypeRef::Variable(_))
    }

    /// Qualified name of a class type, without type arguments
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeRef::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Erased form as it appears in a method signature key
    ///
    /// Type variables erase to their first bound, or `java.lang.Object` when
    /// unbounded or not declared in `scope`.
    pub fn erasure(&self, scope: &[&[TypeParam]]) -> String {
        match self {
            TypeRef::Primitive(name) => name.clone(),
            TypeRef::Class { name, .. } => name.clone(),
            TypeRef::Variable(name) => scope
                .iter()
                .flat_map(|params| params.iter())
                .find(|p| &p.name == name)
                .and_then(|p| p.bounds.first())
                .map(|bound| match bound {
                    // Guard against `T extends Comparable<T>`-style recursion
                    TypeRef::Variable(_) => "java.lang.Object".to_string(),
                    other => other.erasure(scope),
                })
                .unwrap_or_else(|| "java.lang.Object".to_string()),
            TypeRef::Array(component) => format!("{}[]", component.erasure(scope)),
            TypeRef::Wildcard { bound } => match bound {
                WildcardBound::Extends(t) => t.erasure(scope),
                _ => "java.lang.Object".to_string(),
            },
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(name) | TypeRef::Variable(name) => write!(f, "{}", name),
            TypeRef::Class { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Array(component) => write!(f, "{}[]", component),
            TypeRef::Wildcard { bound } => match bound {
                WildcardBound::Unbounded => write!(f, "?"),
                WildcardBound::Extends(t) => write!(f, "? extends {}", t),
                WildcardBound::Super(t) => write!(f, "? super {}", t),
            },
        }
    }
}

/// A declared type parameter such as `<reified T extends Number>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<TypeRef>,
    #[serde(default)]
    pub reified: bool,
}

impl TypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
            reified: false,
        }
    }

    pub fn with_bound(mut self, bound: TypeRef) -> Self {
        self.bounds.push(bound);
        self
    }

    pub fn reified(mut self) -> Self {
        self.reified = true;
        self
    }

    /// `T (extends java.lang.Object)` style rendering used in change messages
    pub fn describe(&self) -> String {
        let bound = self
            .bounds
            .first()
            .map(|b| b.to_string())
            .unwrap_or_else(|| "java.lang.Object".to_string());
        format!("{} (extends {})", self.name, bound)
    }
}

/// Nullness of a type use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Nullness {
    NonNull,
    Nullable,
    #[default]
    Unannotated,
}

/// Declared visibility, ordered from most to least restrictive
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Visibility {
    Private,
    #[default]
    PackagePrivate,
    Protected,
    Public,
}

impl Visibility {
    /// Whether an item with this effective visibility is part of the API
    pub fn is_api(self) -> bool {
        self >= Visibility::Protected
    }

    /// Name as used in diagnostics (`package private` has a space)
    pub fn describe(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::PackagePrivate => "package private",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Modifier flags shared by classes, methods and fields
///
/// Flags that do not apply to an item kind are simply left false.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_deprecated: bool,
    pub is_synchronized: bool,
    pub is_default: bool,
    pub is_transient: bool,
    pub is_volatile: bool,
    pub is_sealed: bool,
    pub is_operator: bool,
    pub is_infix: bool,
}

impl Modifiers {
    pub fn public() -> Self {
        Self {
            visibility: Visibility::Public,
            ..Self::default()
        }
    }

    pub fn protected() -> Self {
        Self {
            visibility: Visibility::Protected,
            ..Self::default()
        }
    }
}

/// Where an item was declared
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<u32>,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }

    pub fn file_only(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
        }
    }

    /// Location with neither file nor line (configuration diagnostics)
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn without_line(&self) -> Self {
        Self::file_only(self.file.clone())
    }

    pub fn is_unknown(&self) -> bool {
        self.file.is_empty() && self.line.is_none()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => write!(f, "{}", self.file),
        }
    }
}
