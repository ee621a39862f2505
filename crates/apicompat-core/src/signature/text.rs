//! Low level scanning of signature declarations: depth-aware splitting and
//! type expression parsing.

use crate::model::{Nullness, TypeParam, TypeRef, WildcardBound, PRIMITIVES};

/// Iterate over `text`, calling `visit(index, ch)` only for characters at
/// nesting depth zero (outside `()`, `<>`, `{}` and quoted literals)
fn scan_top_level(text: &str, mut visit: impl FnMut(usize, char) -> bool) {
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '<' | '{' => depth += 1,
            ')' | '>' | '}' => depth = (depth - 1).max(0),
            _ => {
                if depth == 0 && !visit(i, ch) {
                    return;
                }
            }
        }
    }
}

/// Split on a separator character occurring at depth zero
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    scan_top_level(text, |i, ch| {
        if ch == separator {
            parts.push(&text[start..i]);
            start = i + ch.len_utf8();
        }
        true
    });
    parts.push(&text[start..]);
    parts
}

/// Split at the first depth-zero occurrence of `separator`
pub(crate) fn split_once_top_level(text: &str, separator: char) -> Option<(&str, &str)> {
    let mut found = None;
    scan_top_level(text, |i, ch| {
        if ch == separator {
            found = Some(i);
            false
        } else {
            true
        }
    });
    found.map(|i| (&text[..i], &text[i + separator.len_utf8()..]))
}

/// Whitespace-separated words, keeping generics, annotation arguments and
/// literals intact
pub(crate) fn words(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    scan_top_level(text, |i, ch| {
        if ch.is_whitespace() {
            parts.push(&text[start..i]);
            start = i + ch.len_utf8();
        }
        true
    });
    parts.push(&text[start..]);
    parts.into_iter().filter(|w| !w.is_empty()).collect()
}

/// Remove a trailing `// comment` that is not inside a literal
pub(crate) fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev = '\0';
    for (i, ch) in line.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
        } else if ch == '"' || ch == '\'' {
            quote = Some(ch);
        } else if ch == '/' && prev == '/' {
            return &line[..i - 1];
        }
        prev = ch;
    }
    line
}

/// Locate the parameter list of a method or constructor declaration
///
/// Returns `(head, params, tail)` around the first parenthesis that does not
/// belong to an annotation.
pub(crate) fn split_parameter_list(text: &str) -> Option<(&str, &str, &str)> {
    let bytes: Vec<(usize, char)> = text.char_indices().collect();
    let mut angle = 0;
    let mut word_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let (pos, ch) = bytes[i];
        match ch {
            '<' => angle += 1,
            '>' => angle -= 1,
            c if c.is_whitespace() && angle == 0 => word_start = pos + c.len_utf8(),
            '(' if angle == 0 => {
                let close = matching_paren(text, pos)?;
                if text[word_start..pos].starts_with('@') {
                    // annotation arguments, keep looking
                    while i < bytes.len() && bytes[i].0 < close {
                        i += 1;
                    }
                } else {
                    return Some((&text[..pos], &text[pos + 1..close], &text[close + 1..]));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the `)` matching the `(` at `open`
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// A parsed annotation word such as `@SuppressLint("ChangedValue")`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Annotation<'a> {
    pub name: &'a str,
    pub args: Option<&'a str>,
}

impl<'a> Annotation<'a> {
    pub fn parse(word: &'a str) -> Option<Self> {
        let body = word.strip_prefix('@')?;
        match body.find('(') {
            Some(open) => Some(Annotation {
                name: &body[..open],
                args: body[open + 1..].strip_suffix(')'),
            }),
            None => Some(Annotation {
                name: body,
                args: None,
            }),
        }
    }

    /// Last dotted segment of the name
    pub fn simple_name(&self) -> &'a str {
        self.name.rsplit('.').next().unwrap_or(self.name)
    }

    pub fn nullness(&self) -> Option<Nullness> {
        match self.simple_name() {
            "Nullable" | "RecentlyNullable" => Some(Nullness::Nullable),
            "NonNull" | "NotNull" | "RecentlyNonNull" => Some(Nullness::NonNull),
            _ => None,
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.simple_name() == "Deprecated"
    }

    pub fn is_suppression(&self) -> bool {
        matches!(
            self.simple_name(),
            "SuppressLint" | "Suppress" | "SuppressWarnings" | "SuppressCompatibility"
        )
    }
}

/// Nullness suffix of a format 3.0 type (`String?`, `String!`)
pub(crate) fn split_nullness_suffix(text: &str) -> (&str, Option<Nullness>) {
    if text.len() > 1 {
        if let Some(stripped) = text.strip_suffix('?') {
            return (stripped, Some(Nullness::Nullable));
        }
        if let Some(stripped) = text.strip_suffix('!') {
            return (stripped, Some(Nullness::Unannotated));
        }
    }
    (text, None)
}

/// Drop leading type-use annotations (`@NonNull String`)
fn strip_type_annotations(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        if !text.starts_with('@') {
            return text;
        }
        let ws = words(text);
        match ws.first() {
            Some(first) if ws.len() > 1 => text = text[first.len()..].trim_start(),
            _ => return text,
        }
    }
}

fn is_type_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
        && !name.starts_with('.')
        && !name.ends_with('.')
}

/// Parse a type expression; `type_vars` names the variables in scope
pub(crate) fn parse_type(text: &str, type_vars: &[String]) -> Option<TypeRef> {
    let text = strip_type_annotations(text.trim());
    let (text, _) = split_nullness_suffix(text);
    let text = text.trim();

    if let Some(component) = text.strip_suffix("[]") {
        return parse_type(component, type_vars).map(TypeRef::array);
    }
    if text == "?" {
        return Some(TypeRef::Wildcard {
            bound: WildcardBound::Unbounded,
        });
    }
    if let Some(rest) = text.strip_prefix("? extends ") {
        return parse_type(rest, type_vars).map(|t| TypeRef::Wildcard {
            bound: WildcardBound::Extends(Box::new(t)),
        });
    }
    if let Some(rest) = text.strip_prefix("? super ") {
        return parse_type(rest, type_vars).map(|t| TypeRef::Wildcard {
            bound: WildcardBound::Super(Box::new(t)),
        });
    }
    if let Some(open) = text.find('<') {
        let inner = text[open + 1..].strip_suffix('>')?;
        let name = &text[..open];
        if !is_type_name(name) {
            return None;
        }
        let args = split_top_level(inner, ',')
            .into_iter()
            .map(|arg| parse_type(arg, type_vars))
            .collect::<Option<Vec<_>>>()?;
        return Some(TypeRef::generic(name, args));
    }
    if !is_type_name(text) {
        return None;
    }
    if PRIMITIVES.contains(&text) {
        Some(TypeRef::primitive(text))
    } else if type_vars.iter().any(|v| v == text) {
        Some(TypeRef::variable(text))
    } else {
        Some(TypeRef::class(text))
    }
}

/// Parse a type parameter list such as `<reified T extends Number & Comparable<T>, U>`
pub(crate) fn parse_type_params(text: &str, outer_vars: &[String]) -> Option<Vec<TypeParam>> {
    let inner = text.trim().strip_prefix('<')?.strip_suffix('>')?;
    let declared: Vec<(bool, &str, Option<&str>)> = split_top_level(inner, ',')
        .into_iter()
        .map(|decl| {
            let decl = decl.trim();
            let (reified, decl) = match decl.strip_prefix("reified ") {
                Some(rest) => (true, rest.trim_start()),
                None => (false, decl),
            };
            match decl.split_once(" extends ") {
                Some((name, bounds)) => (reified, name.trim(), Some(bounds)),
                None => (reified, decl, None),
            }
        })
        .collect();

    let mut scope: Vec<String> = outer_vars.to_vec();
    scope.extend(declared.iter().map(|(_, name, _)| name.to_string()));

    declared
        .into_iter()
        .map(|(reified, name, bounds)| {
            if !is_type_name(name) {
                return None;
            }
            let bounds = match bounds {
                Some(bounds) => split_top_level(bounds, '&')
                    .into_iter()
                    .map(|b| parse_type(b, &scope))
                    .collect::<Option<Vec<_>>>()?,
                None => Vec::new(),
            };
            Some(TypeParam {
                name: name.to_string(),
                bounds,
                reified,
            })
        })
        .collect()
}

/// Split a `Name<T, U>` declaration into its name and optional type parameter text
pub(crate) fn split_generic_name(word: &str) -> (&str, Option<&str>) {
    match word.find('<') {
        Some(open) => (&word[..open], Some(&word[open..])),
        None => (word, None),
    }
}

/// Unquote every string literal inside annotation arguments
pub(crate) fn string_literals(args: &str) -> Vec<String> {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static LITERAL: Lazy<Option<Regex>> =
        Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).ok());

    match LITERAL.as_ref() {
        Some(re) => re
            .captures_iter(args)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().replace("\\\"", "\""))
            .collect(),
        None => Vec::new(),
    }
}
