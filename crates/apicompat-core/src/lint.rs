//! API lint: naming and style rules for newly added API.
//!
//! Only items that are absent from the previous snapshot are checked, and
//! deprecated items are never flagged.

use crate::diff::Difference;
use crate::issues::IssueKind;
use crate::model::{
    ClassItem, CodebaseSnapshot, FieldItem, MethodItem, Nullness, SourceLocation, TypeRef,
    Visibility,
};
use once_cell::sync::Lazy;
use regex::Regex;

static ACRONYM_2: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[A-Z]{2,}").ok());
static ACRONYM_3: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[A-Z]{3,}").ok());
static CONSTANT_NAME: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Z0-9_]+$").ok());

const GENERIC_EXCEPTIONS: &[&str] = &["java.lang.Exception", "java.lang.Throwable", "java.lang.Error"];

/// Unchecked exceptions that must not be listed in `throws`
const BANNED_THROWS: &[&str] = &[
    "java.lang.NullPointerException",
    "java.lang.ClassCastException",
    "java.lang.IndexOutOfBoundsException",
    "java.lang.reflect.UndeclaredThrowableException",
    "java.lang.reflect.MalformedParametersException",
    "java.lang.reflect.MalformedParameterizedTypeException",
    "java.lang.invoke.WrongMethodTypeException",
    "java.lang.EnumConstantNotPresentException",
    "java.lang.IllegalMonitorStateException",
    "java.lang.SecurityException",
    "java.lang.UnsupportedOperationException",
    "java.lang.annotation.AnnotationTypeMismatchException",
    "java.lang.annotation.IncompleteAnnotationException",
    "java.lang.TypeNotPresentException",
    "java.lang.IllegalStateException",
    "java.lang.ArithmeticException",
    "java.lang.IllegalArgumentException",
    "java.lang.ArrayStoreException",
    "java.lang.NegativeArraySizeException",
    "java.util.MissingResourceException",
    "java.util.EmptyStackException",
    "java.util.concurrent.CompletionException",
    "java.util.concurrent.RejectedExecutionException",
    "java.util.IllformedLocaleException",
    "java.util.ConcurrentModificationException",
    "java.util.NoSuchElementException",
    "java.io.UncheckedIOException",
    "java.time.DateTimeException",
    "java.security.ProviderException",
    "java.nio.BufferUnderflowException",
    "java.nio.BufferOverflowException",
];

const BOX_TYPES: &[&str] = &[
    "java.lang.Number",
    "java.lang.Byte",
    "java.lang.Double",
    "java.lang.Float",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Short",
];

fn first_match(re: &Lazy<Option<Regex>>, text: &str) -> Option<(usize, usize)> {
    re.as_ref()
        .and_then(|re| re.find(text))
        .map(|m| (m.start(), m.end()))
}

/// Three capitals in a row, or two at the very end (`getID`)
pub fn has_acronyms(name: &str) -> bool {
    match first_match(&ACRONYM_2, name) {
        Some((start, _)) => start + 2 == name.len() || first_match(&ACRONYM_3, name).is_some(),
        None => false,
    }
}

fn first_acronym(name: &str) -> Option<&str> {
    let (start, _) = first_match(&ACRONYM_2, name)?;
    if start + 2 == name.len() {
        return Some(&name[name.len() - 2..]);
    }
    first_match(&ACRONYM_3, name).map(|(start, end)| &name[start..end])
}

/// `fooBar` to `foo_bar`
pub fn camel_case_to_underlines(name: &str) -> String {
    let mut out = String::with_capacity(name.len() * 2);
    let mut last_upper = name.chars().next().is_some_and(char::is_uppercase);
    for ch in name.chars() {
        let upper = ch.is_uppercase();
        if upper && !last_upper {
            out.push('_');
        }
        last_upper = upper;
        out.extend(ch.to_lowercase());
    }
    out
}

fn underlines_to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `HTMLWriter` to `HtmlWriter`, `getID` to `getId`, `ALL_CAPS` to `AllCaps`
pub fn decapitalize_acronyms(name: &str) -> String {
    if !name.chars().any(char::is_lowercase) {
        return capitalize(&underlines_to_camel_case(&name.to_lowercase()));
    }
    let mut current = name.to_string();
    while let Some(acronym) = first_acronym(&current).map(str::to_string) {
        let Some(index) = current.find(&acronym) else {
            break;
        };
        let (first, rest) = acronym.split_at(1);
        let replacement = if index + acronym.len() == current.len() {
            format!("{}{}", first, rest.to_lowercase())
        } else {
            let (middle, last) = rest.split_at(rest.len() - 1);
            format!("{}{}{}", first, middle.to_lowercase(), last)
        };
        if replacement == acronym {
            break;
        }
        current = current.replace(&acronym, &replacement);
    }
    current
}

fn is_constant_name(name: &str) -> bool {
    CONSTANT_NAME
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

fn is_string(ty: &TypeRef) -> bool {
    matches!(ty.class_name(), Some("java.lang.String" | "String"))
}

/// Run every lint rule over the items of `new` that `previous` lacks
///
/// Classes whose qualified name starts with one of `ignore_prefixes` are
/// skipped entirely. With no previous snapshot, everything is new.
pub fn run_api_lint(
    new: &CodebaseSnapshot,
    previous: Option<&CodebaseSnapshot>,
    ignore_prefixes: &[String],
) -> Vec<Difference> {
    let mut linter = Linter {
        new,
        findings: Vec::new(),
    };
    for class in new.classes() {
        if !new.is_api_visible(class)
            || class.modifiers.is_deprecated
            || ignore_prefixes
                .iter()
                .any(|prefix| class.qualified_name.starts_with(prefix.as_str()))
        {
            continue;
        }
        let old_class = previous.and_then(|p| p.class(&class.qualified_name));
        linter.check_class(class, old_class);
    }
    let mut findings = linter.findings;
    findings.sort();
    findings
}

struct Linter<'a> {
    new: &'a CodebaseSnapshot,
    findings: Vec<Difference>,
}

impl<'a> Linter<'a> {
    fn report(&mut self, kind: IssueKind, element: String, location: &SourceLocation, message: String) {
        self.findings
            .push(Difference::new(kind, element, location.clone(), message));
    }

    fn check_class(&mut self, class: &ClassItem, old_class: Option<&ClassItem>) {
        if old_class.is_none() {
            self.check_class_name(class);
        }
        for (key, method) in class.all_methods() {
            let is_new = old_class.map_or(true, |old| {
                !old.methods.contains_key(key) && !old.constructors.contains_key(key)
            });
            if is_new && self.is_reportable(class, method.modifiers.is_deprecated, method.modifiers.visibility) {
                self.check_method(class, key, method);
            }
        }
        for (name, field) in &class.fields {
            let is_new = old_class.map_or(true, |old| !old.fields.contains_key(name));
            if is_new && self.is_reportable(class, field.modifiers.is_deprecated, field.modifiers.visibility) {
                self.check_field(class, field);
            }
        }
    }

    fn is_reportable(&self, class: &ClassItem, deprecated: bool, visibility: Visibility) -> bool {
        !deprecated && self.new.effective_member_visibility(class, visibility).is_api()
    }

    fn check_class_name(&mut self, class: &ClassItem) {
        let name = class.simple_name();
        let element = class.qualified_name.clone();
        if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
            self.report(
                IssueKind::StartWithUpper,
                element,
                &class.location,
                format!("Class must start with uppercase char: {}", name),
            );
        } else if has_acronyms(name) {
            self.report(
                IssueKind::AcronymName,
                element,
                &class.location,
                format!(
                    "Acronyms should not be capitalized in class names: was `{}`, should this be `{}`?",
                    name,
                    decapitalize_acronyms(name)
                ),
            );
        } else if name.ends_with("Impl") {
            self.report(
                IssueKind::EndsWithImpl,
                element,
                &class.location,
                format!(
                    "Don't expose your implementation details: `{}` ends with `Impl`",
                    name
                ),
            );
        }
    }

    fn check_method(&mut self, class: &ClassItem, key: &str, method: &MethodItem) {
        let element = class.member_element(key);
        let location = &method.location;

        if !method.is_constructor {
            let name = method.name.as_str();
            if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
                self.report(
                    IssueKind::StartWithLower,
                    element.clone(),
                    location,
                    format!("Method name must start with lowercase char: {}", name),
                );
            } else if has_acronyms(name) {
                self.report(
                    IssueKind::AcronymName,
                    element.clone(),
                    location,
                    format!(
                        "Acronyms should not be capitalized in method names: was `{}`, should this be `{}`?",
                        name,
                        decapitalize_acronyms(name)
                    ),
                );
            }
        }

        for exception in method.throws.iter().filter_map(TypeRef::class_name) {
            if GENERIC_EXCEPTIONS.contains(&exception) {
                self.report(
                    IssueKind::GenericException,
                    element.clone(),
                    location,
                    format!("Methods must not throw generic exceptions (`{}`)", exception),
                );
            } else if BANNED_THROWS.contains(&exception) {
                self.report(
                    IssueKind::BannedThrow,
                    element.clone(),
                    location,
                    format!(
                        "Methods must not mention RuntimeException subclasses in throws clauses (was `{}`)",
                        exception
                    ),
                );
            }
        }

        if let Some(return_type) = &method.return_type {
            self.check_boxed(return_type, &element, location);
            if needs_nullness(return_type, method.return_nullness) {
                self.report(
                    IssueKind::MissingNullability,
                    element.clone(),
                    location,
                    format!("Missing nullability on method `{}` return", method.name),
                );
            }
        }
        for parameter in &method.parameters {
            self.check_boxed(&parameter.ty, &element, location);
            if needs_nullness(&parameter.ty, parameter.nullness) {
                self.report(
                    IssueKind::MissingNullability,
                    element.clone(),
                    location,
                    format!(
                        "Missing nullability on parameter `{}` in method `{}`",
                        parameter.name, method.name
                    ),
                );
            }
        }
    }

    fn check_field(&mut self, class: &ClassItem, field: &FieldItem) {
        if field.is_enum_constant {
            return;
        }
        let element = class.member_element(&field.name);
        let location = &field.location;
        let name = field.name.as_str();
        let qualified = &class.qualified_name;

        if field.is_static_final() {
            if !is_constant_name(name) {
                self.report(
                    IssueKind::AllUpper,
                    element.clone(),
                    location,
                    format!(
                        "Constant field names must be named with only upper case characters: `{}#{}`, should be `{}`?",
                        qualified,
                        name,
                        camel_case_to_underlines(name).to_uppercase()
                    ),
                );
            } else if (name.starts_with("MIN_") || name.starts_with("MAX_")) && !is_string(&field.ty) {
                self.report(
                    IssueKind::MinMaxConstant,
                    element.clone(),
                    location,
                    format!(
                        "If min/max could change in future, make them dynamic methods: {}#{}",
                        qualified, name
                    ),
                );
            } else if (field.ty.is_primitive() || is_string(&field.ty)) && field.constant_value.is_none() {
                self.report(
                    IssueKind::CompileTimeConstant,
                    element.clone(),
                    location,
                    format!("All constants must be defined at compile time: {}#{}", qualified, name),
                );
            }
        } else {
            if !field.modifiers.is_static && !name.starts_with(|c: char| c.is_ascii_lowercase()) {
                self.report(
                    IssueKind::StartWithLower,
                    element.clone(),
                    location,
                    format!("Non-static field {} must be named using fooBar style", name),
                );
            }
            if is_constant_name(name) {
                self.report(
                    IssueKind::AllUpper,
                    element.clone(),
                    location,
                    format!("Constant {} must be marked static final", name),
                );
            }
        }

        self.check_boxed(&field.ty, &element, location);
        if field.constant_value.is_none() && needs_nullness(&field.ty, field.nullness) {
            self.report(
                IssueKind::MissingNullability,
                element,
                location,
                format!("Missing nullability on field `{}` in class `{}`", name, qualified),
            );
        }
    }

    fn check_boxed(&mut self, ty: &TypeRef, element: &str, location: &SourceLocation) {
        if let Some(name) = ty.class_name().filter(|name| BOX_TYPES.contains(name)) {
            self.report(
                IssueKind::AutoBoxing,
                element.to_string(),
                location,
                format!("Must avoid boxed primitives (`{}`)", name),
            );
        }
    }
}

/// Reference types need an explicit nullness; type variables get theirs at the use site
fn needs_nullness(ty: &TypeRef, nullness: Nullness) -> bool {
    nullness == Nullness::Unannotated && !ty.is_primitive() && !ty.is_variable()
}
