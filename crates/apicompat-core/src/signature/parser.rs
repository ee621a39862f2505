use super::text::{
    parse_type, parse_type_params, split_generic_name, split_nullness_suffix,
    split_once_top_level, split_parameter_list, split_top_level, string_literals, strip_comment,
    words, Annotation,
};
use crate::errors::{ApiError, SignatureError};
use crate::model::{
    ClassItem, ClassKind, CodebaseSnapshot, DefaultValue, FieldItem, MethodItem, Modifiers,
    Nullness, Parameter, SnapshotBuilder, SourceLocation, TypeParam, TypeRef, Visibility,
};

/// Version of the signature text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureFormat {
    /// Nullness carried by `@Nullable` / `@NonNull` annotations
    #[default]
    V2,
    /// Kotlin-style nullness suffixes: `?` nullable, `!` unknown, none non-null
    V3,
}

impl SignatureFormat {
    fn from_version(version: &str) -> Option<Self> {
        match version.split('.').next()? {
            "1" | "2" => Some(SignatureFormat::V2),
            "3" | "4" | "5" => Some(SignatureFormat::V3),
            _ => None,
        }
    }
}

const FORMAT_HEADER: &str = "// Signature format:";

/// Kotlin and Java modifiers that carry no compatibility meaning here
const IGNORED_MODIFIERS: &[&str] = &[
    "open", "data", "value", "inline", "suspend", "fun", "inner", "companion", "native",
    "strictfp", "external", "const", "lateinit", "tailrec", "expect", "actual",
];

/// Parse signature text into a snapshot; `file_name` is used for locations
///
/// # Errors
///
/// Returns a [`SignatureError`] carrying the offending line for malformed
/// input or duplicate declarations.
pub fn parse_signature(file_name: &str, text: &str) -> Result<CodebaseSnapshot, SignatureError> {
    let mut parser = Parser {
        file: file_name,
        format: SignatureFormat::default(),
        builder: SnapshotBuilder::new(),
        package: None,
        classes: Vec::new(),
        line: 0,
    };
    for (index, raw) in text.lines().enumerate() {
        parser.line = index as u32 + 1;
        parser.parse_line(raw)?;
    }
    parser.finish()
}

/// Modifiers and annotations collected from the front of a declaration
struct Prefix<'a> {
    modifiers: Modifiers,
    annotations: Vec<Annotation<'a>>,
    rest: Vec<&'a str>,
}

impl<'a> Prefix<'a> {
    fn read(ws: &[&'a str]) -> Self {
        let mut modifiers = Modifiers::default();
        let mut annotations = Vec::new();
        let mut index = 0;
        while let Some(word) = ws.get(index) {
            if *word != "@interface" {
                if let Some(annotation) = Annotation::parse(word) {
                    annotations.push(annotation);
                    index += 1;
                    continue;
                }
            }
            if !apply_modifier(&mut modifiers, word) {
                break;
            }
            index += 1;
        }
        // type-use annotations may still sit in front of the type
        let mut rest = Vec::new();
        for word in &ws[index..] {
            match Annotation::parse(word) {
                Some(annotation) if *word != "@interface" => annotations.push(annotation),
                _ => rest.push(*word),
            }
        }
        if annotations.iter().any(Annotation::is_deprecated) {
            modifiers.is_deprecated = true;
        }
        Prefix {
            modifiers,
            annotations,
            rest,
        }
    }

    fn suppressions(&self) -> Vec<String> {
        self.annotations
            .iter()
            .filter(|a| a.is_suppression())
            .filter_map(|a| a.args)
            .flat_map(string_literals)
            .collect()
    }

    fn annotated_nullness(&self) -> Option<Nullness> {
        self.annotations.iter().find_map(Annotation::nullness)
    }
}

fn apply_modifier(modifiers: &mut Modifiers, word: &str) -> bool {
    match word {
        "public" => modifiers.visibility = Visibility::Public,
        "protected" => modifiers.visibility = Visibility::Protected,
        "private" => modifiers.visibility = Visibility::Private,
        "internal" => modifiers.visibility = Visibility::PackagePrivate,
        "static" => modifiers.is_static = true,
        "final" => modifiers.is_final = true,
        "abstract" => modifiers.is_abstract = true,
        "sealed" => modifiers.is_sealed = true,
        "deprecated" => modifiers.is_deprecated = true,
        "synchronized" => modifiers.is_synchronized = true,
        "default" => modifiers.is_default = true,
        "transient" => modifiers.is_transient = true,
        "volatile" => modifiers.is_volatile = true,
        "operator" => modifiers.is_operator = true,
        "infix" => modifiers.is_infix = true,
        other if IGNORED_MODIFIERS.contains(&other) => {}
        _ => return false,
    }
    true
}

struct Parser<'a> {
    file: &'a str,
    format: SignatureFormat,
    builder: SnapshotBuilder,
    package: Option<String>,
    classes: Vec<ClassItem>,
    line: u32,
}

impl<'a> Parser<'a> {
    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.file, self.line)
    }

    fn invalid(&self, reason: impl Into<String>) -> SignatureError {
        SignatureError::InvalidDeclaration {
            file: self.file.to_string(),
            line: self.line,
            reason: reason.into(),
        }
    }

    fn invalid_type(&self, text: &str) -> SignatureError {
        SignatureError::InvalidType {
            file: self.file.to_string(),
            line: self.line,
            text: text.to_string(),
        }
    }

    fn duplicate(&self, err: ApiError) -> SignatureError {
        SignatureError::Duplicate {
            file: self.file.to_string(),
            line: self.line,
            element: err.element().unwrap_or_default().to_string(),
        }
    }

    fn parse_line(&mut self, raw: &str) -> Result<(), SignatureError> {
        let trimmed = raw.trim();
        if let Some(version) = trimmed.strip_prefix(FORMAT_HEADER) {
            let version = version.trim();
            self.format = SignatureFormat::from_version(version).ok_or_else(|| {
                SignatureError::UnsupportedFormat {
                    file: self.file.to_string(),
                    line: self.line,
                    version: version.to_string(),
                }
            })?;
            return Ok(());
        }

        let line = strip_comment(trimmed).trim();
        if line.is_empty() {
            return Ok(());
        }
        if line == "}" {
            return self.close_block(line);
        }
        if let Some(rest) = line.strip_prefix("package ") {
            return self.open_package(rest, line);
        }
        if let Some((keyword, rest)) = line.split_once(char::is_whitespace) {
            match keyword {
                "ctor" => return self.parse_method(rest, true, line),
                "method" => return self.parse_method(rest, false, line),
                "field" => return self.parse_field(rest, false, line),
                "enum_constant" => return self.parse_field(rest, true, line),
                "property" => return self.require_class(line).map(|_| ()),
                _ => {}
            }
        }
        if line.ends_with('{') || line.ends_with('}') {
            return self.parse_class_header(line);
        }
        Err(SignatureError::UnexpectedLine {
            file: self.file.to_string(),
            line: self.line,
            text: line.to_string(),
        })
    }

    fn finish(self) -> Result<CodebaseSnapshot, SignatureError> {
        if !self.classes.is_empty() || self.package.is_some() {
            return Err(SignatureError::UnbalancedBraces {
                file: self.file.to_string(),
                line: self.line,
            });
        }
        Ok(self.builder.build())
    }

    fn open_package(&mut self, rest: &str, line: &str) -> Result<(), SignatureError> {
        let name = rest.trim().trim_end_matches('{').trim();
        if self.package.is_some() || name.is_empty() {
            return Err(SignatureError::UnexpectedLine {
                file: self.file.to_string(),
                line: self.line,
                text: line.to_string(),
            });
        }
        let location = self.location();
        self.builder.add_package(name, location);
        self.package = Some(name.to_string());
        Ok(())
    }

    fn close_block(&mut self, line: &str) -> Result<(), SignatureError> {
        if let Some(class) = self.classes.pop() {
            return self.add_class(class);
        }
        if self.package.take().is_some() {
            return Ok(());
        }
        Err(SignatureError::UnexpectedLine {
            file: self.file.to_string(),
            line: self.line,
            text: line.to_string(),
        })
    }

    fn add_class(&mut self, class: ClassItem) -> Result<(), SignatureError> {
        match self.builder.add_class(class) {
            Ok(_) => Ok(()),
            Err(err) => Err(self.duplicate(err)),
        }
    }

    fn require_class(&self, line: &str) -> Result<&ClassItem, SignatureError> {
        self.classes.last().ok_or_else(|| SignatureError::OutsideClass {
            file: self.file.to_string(),
            line: self.line,
            text: line.to_string(),
        })
    }

    fn parse_class_header(&mut self, line: &str) -> Result<(), SignatureError> {
        let Some(package) = self.package.clone() else {
            return Err(SignatureError::OutsidePackage {
                file: self.file.to_string(),
                line: self.line,
                text: line.to_string(),
            });
        };
        let (decl, closed) = match line.strip_suffix('}') {
            Some(open) => (open.trim_end().strip_suffix('{'), true),
            None => (line.strip_suffix('{'), false),
        };
        let decl = decl.ok_or_else(|| self.invalid("class header must end with '{'"))?;

        let ws = words(decl);
        let prefix = Prefix::read(&ws);
        let (kind_word, name_word, clauses) = match prefix.rest.as_slice() {
            [kind, name, clauses @ ..] => (*kind, *name, clauses),
            _ => return Err(self.invalid("class header is missing a kind or name")),
        };
        let kind = match kind_word {
            "class" => ClassKind::Class,
            "interface" => ClassKind::Interface,
            "enum" => ClassKind::Enum,
            "@interface" => ClassKind::Annotation,
            other => return Err(self.invalid(format!("unknown class kind `{}`", other))),
        };

        let (name, type_params_text) = split_generic_name(name_word);
        let type_params = match type_params_text {
            Some(text) => parse_type_params(text, &[]).ok_or_else(|| self.invalid_type(text))?,
            None => Vec::new(),
        };
        let vars: Vec<String> = type_params.iter().map(|p| p.name.clone()).collect();

        let name_in_package = match self.classes.last() {
            Some(outer) => format!("{}.{}", outer.name_in_package(), name),
            None => name.to_string(),
        };
        let mut class = ClassItem::new(package, &name_in_package, kind);
        class.modifiers = prefix.modifiers.clone();
        class.suppressions = prefix.suppressions();
        class.type_params = type_params;
        class.location = self.location();

        let (extends, implements) = self.parse_clauses(clauses, &vars)?;
        if kind == ClassKind::Interface {
            class.interfaces = extends;
        } else {
            if extends.len() > 1 {
                return Err(self.invalid("a class can only extend one superclass"));
            }
            class.superclass = extends.into_iter().next();
        }
        class.interfaces.extend(implements);

        if closed {
            self.add_class(class)
        } else {
            self.classes.push(class);
            Ok(())
        }
    }

    fn parse_clauses(
        &self,
        clauses: &[&str],
        vars: &[String],
    ) -> Result<(Vec<TypeRef>, Vec<TypeRef>), SignatureError> {
        let mut extends = Vec::new();
        let mut implements = Vec::new();
        let mut target: Option<&mut Vec<&str>> = None;
        for word in clauses {
            match *word {
                "extends" => target = Some(&mut extends),
                "implements" => target = Some(&mut implements),
                other => match target.as_mut() {
                    Some(list) => list.push(other),
                    None => return Err(self.invalid(format!("unexpected `{}` in class header", other))),
                },
            }
        }
        Ok((self.parse_type_list(&extends, vars)?, self.parse_type_list(&implements, vars)?))
    }

    /// Types separated by commas and/or whitespace (`A, B` or `A B`)
    fn parse_type_list(&self, list: &[&str], vars: &[String]) -> Result<Vec<TypeRef>, SignatureError> {
        list.iter()
            .flat_map(|word| split_top_level(word, ','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| parse_type(t, vars).ok_or_else(|| self.invalid_type(t)))
            .collect()
    }

    fn parse_method(&mut self, rest: &str, is_ctor: bool, line: &str) -> Result<(), SignatureError> {
        let class = self.require_class(line)?;
        let class_name = class.qualified_name.clone();
        let class_vars: Vec<String> = class.type_params.iter().map(|p| p.name.clone()).collect();

        let rest = rest.trim().trim_end_matches(';');
        let (head, params_text, tail) = split_parameter_list(rest)
            .ok_or_else(|| self.invalid("missing parameter list"))?;

        let ws = words(head);
        let prefix = Prefix::read(&ws);
        let mut rest_words = prefix.rest.as_slice();

        let mut type_params: Vec<TypeParam> = Vec::new();
        if let Some((first, tail_words)) = rest_words.split_first() {
            if first.starts_with('<') {
                type_params = parse_type_params(first, &class_vars)
                    .ok_or_else(|| self.invalid_type(first))?;
                rest_words = tail_words;
            }
        }
        let mut vars: Vec<String> = type_params.iter().map(|p| p.name.clone()).collect();
        vars.extend(class_vars);

        let mut method = if is_ctor {
            match rest_words {
                [_name] => MethodItem::constructor(class_name),
                _ => return Err(self.invalid("constructor declaration needs exactly a name")),
            }
        } else {
            match rest_words {
                [return_word, name] => {
                    let (type_text, suffix) = split_nullness_suffix(return_word);
                    let return_type = parse_type(type_text, &vars)
                        .ok_or_else(|| self.invalid_type(return_word))?;
                    let mut method = MethodItem::method(class_name, *name, return_type);
                    method.return_nullness = self.nullness(
                        prefix.annotated_nullness(),
                        suffix,
                        method.return_type.as_ref(),
                    );
                    method
                }
                _ => return Err(self.invalid("method declaration needs a return type and a name")),
            }
        };
        method.modifiers = prefix.modifiers.clone();
        method.suppressions = prefix.suppressions();
        method.type_params = type_params;
        method.location = self.location();

        if !params_text.trim().is_empty() {
            for (index, text) in split_top_level(params_text, ',').into_iter().enumerate() {
                let parameter = self.parse_parameter(index, text, &vars)?;
                method.parameters.push(parameter);
            }
        }
        self.parse_method_tail(&mut method, tail, &vars)?;

        let duplicate = match self.classes.last_mut() {
            Some(class) => class.add_method(method).err(),
            None => None,
        };
        match duplicate {
            Some(err) => Err(self.duplicate(err)),
            None => Ok(()),
        }
    }

    fn parse_method_tail(
        &self,
        method: &mut MethodItem,
        tail: &str,
        vars: &[String],
    ) -> Result<(), SignatureError> {
        let ws = words(tail);
        let mut index = 0;
        while index < ws.len() {
            match ws[index] {
                "throws" => {
                    let end = ws[index + 1..]
                        .iter()
                        .position(|w| *w == "default")
                        .map(|p| index + 1 + p)
                        .unwrap_or(ws.len());
                    let exceptions = self.parse_type_list(&ws[index + 1..end], vars)?;
                    method.throws.extend(exceptions);
                    index = end;
                }
                "default" => {
                    let value = ws[index + 1..].join(" ");
                    if value.is_empty() {
                        return Err(self.invalid("`default` without a value"));
                    }
                    method.annotation_default = Some(value);
                    index = ws.len();
                }
                other => return Err(self.invalid(format!("unexpected `{}` after parameters", other))),
            }
        }
        Ok(())
    }

    fn parse_parameter(
        &self,
        index: usize,
        text: &str,
        vars: &[String],
    ) -> Result<Parameter, SignatureError> {
        let (decl, default) = match split_once_top_level(text, '=') {
            Some((decl, value)) => (decl, Some(value.trim())),
            None => (text, None),
        };
        let ws = words(decl);
        let optional = ws.contains(&"optional");
        let filtered: Vec<&str> = ws.into_iter().filter(|w| *w != "optional").collect();
        let prefix = Prefix::read(&filtered);

        let (type_word, name) = match prefix.rest.as_slice() {
            [type_word] => (*type_word, None),
            [type_word, name] => (*type_word, Some(*name)),
            _ => return Err(self.invalid(format!("malformed parameter `{}`", text.trim()))),
        };
        let (type_text, varargs) = match type_word.strip_suffix("...") {
            Some(component) => (component, true),
            None => (type_word, false),
        };
        let (type_text, suffix) = split_nullness_suffix(type_text);
        let component = parse_type(type_text, vars).ok_or_else(|| self.invalid_type(type_word))?;
        let ty = if varargs {
            TypeRef::array(component)
        } else {
            component
        };

        let mut parameter = match name {
            Some(name) => Parameter::new(name, ty).with_public_name(),
            None => Parameter::new(format!("arg{}", index + 1), ty),
        };
        parameter.varargs = varargs;
        parameter.nullness = self.nullness(prefix.annotated_nullness(), suffix, Some(&parameter.ty));
        parameter.default_value = match default {
            Some(value) if !value.is_empty() => DefaultValue::Value(value.to_string()),
            Some(_) => return Err(self.invalid("empty default value")),
            None if optional => DefaultValue::Unknown,
            None => DefaultValue::None,
        };
        Ok(parameter)
    }

    fn parse_field(&mut self, rest: &str, enum_constant: bool, line: &str) -> Result<(), SignatureError> {
        let class_name = self.require_class(line)?.qualified_name.clone();
        let class_vars: Vec<String> = self
            .require_class(line)?
            .type_params
            .iter()
            .map(|p| p.name.clone())
            .collect();

        let rest = rest.trim().trim_end_matches(';');
        let (decl, value) = match split_once_top_level(rest, '=') {
            Some((decl, value)) => (decl, Some(value.trim())),
            None => (rest, None),
        };
        let ws = words(decl);
        let prefix = Prefix::read(&ws);
        let (type_word, name) = match prefix.rest.as_slice() {
            [type_word, name] => (*type_word, *name),
            _ => return Err(self.invalid("field declaration needs a type and a name")),
        };
        let (type_text, suffix) = split_nullness_suffix(type_word);
        let ty = parse_type(type_text, &class_vars).ok_or_else(|| self.invalid_type(type_word))?;

        let mut field = FieldItem::new(class_name, name, ty);
        field.nullness = self.nullness(prefix.annotated_nullness(), suffix, Some(&field.ty));
        field.modifiers = prefix.modifiers.clone();
        field.suppressions = prefix.suppressions();
        field.constant_value = value.filter(|v| !v.is_empty()).map(str::to_string);
        field.is_enum_constant = enum_constant;
        field.location = self.location();

        let duplicate = match self.classes.last_mut() {
            Some(class) => class.add_field(field).err(),
            None => None,
        };
        match duplicate {
            Some(err) => Err(self.duplicate(err)),
            None => Ok(()),
        }
    }

    fn nullness(
        &self,
        annotated: Option<Nullness>,
        suffix: Option<Nullness>,
        ty: Option<&TypeRef>,
    ) -> Nullness {
        if let Some(nullness) = annotated {
            return nullness;
        }
        if ty.map_or(true, TypeRef::is_primitive) {
            return Nullness::Unannotated;
        }
        match self.format {
            SignatureFormat::V2 => Nullness::Unannotated,
            SignatureFormat::V3 => suffix.unwrap_or(Nullness::NonNull),
        }
    }
}
