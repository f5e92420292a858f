//! Splitting a tag body into type expression, name and description.

use std::sync::LazyLock;

use regex::Regex;

use super::type_expr::{TypeExprError, TypeExpressionParser};
use crate::name::split_name_and_description;

static RE_INLINE_TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{@type\s+([^}]+)\}").unwrap());
static RE_OPTIONAL_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^\[\s*(.+?)\s*\]$").unwrap());
static RE_NAME_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*([^=]+?)(?:\s*=\s*(.*?))?\s*$").unwrap());

/// The pieces of a typed and/or named tag body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagInfo {
    pub type_expression: Option<String>,
    pub types: Vec<String>,
    pub name: Option<String>,
    pub text: String,
    pub optional: Option<bool>,
    pub nullable: Option<bool>,
    pub variable: Option<bool>,
    pub default_value: Option<String>,
}

/// A leading balanced `{...}`, unescaped, and whatever follows it.
fn extract_type(text: &str) -> Option<(String, &str)> {
    if !text.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut escaped = false;
    let mut expression = String::new();
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            if c != '{' && c != '}' {
                expression.push('\\');
            }
            expression.push(c);
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => {
                if depth > 0 {
                    expression.push(c);
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((expression.trim().to_string(), &text[i + 1..]));
                }
                expression.push(c);
            }
            _ => expression.push(c),
        }
    }
    None
}

/// `[name=default]` → (name, optional, default).
fn parse_name(raw: &str) -> (String, Option<bool>, Option<String>) {
    let Some(caps) = RE_OPTIONAL_NAME.captures(raw) else {
        return (raw.to_string(), None, None);
    };
    let inner = caps.get(1).map_or("", |m| m.as_str());
    match RE_NAME_DEFAULT.captures(inner) {
        Some(caps) => {
            let name = caps.get(1).map_or(inner, |m| m.as_str()).to_string();
            let default = caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .filter(|d| !d.is_empty());
            (name, Some(true), default)
        }
        None => (inner.to_string(), Some(true), None),
    }
}

/// Splits without parsing the type expression.
pub fn split(text: &str, can_have_name: bool, can_have_type: bool) -> TagInfo {
    let mut info = TagInfo::default();
    let mut rest = text.trim().to_string();

    if can_have_type {
        if let Some((expression, remainder)) = extract_type(&rest) {
            info.type_expression = Some(expression);
            rest = remainder.trim().to_string();
        }
        if let Some(caps) = RE_INLINE_TYPE.captures(&rest) {
            info.type_expression = caps.get(1).map(|m| m.as_str().trim().to_string());
            rest = RE_INLINE_TYPE.replace(&rest, "").trim().to_string();
        }
    }

    if can_have_name {
        let (name, description) = split_name_and_description(&rest);
        rest = description;
        if !name.is_empty() && name != "-" {
            let (name, optional, default_value) = parse_name(&name);
            info.name = Some(name);
            info.optional = optional;
            info.default_value = default_value;
        }
    }

    info.text = rest;
    info
}

/// Splits a tag body and resolves its type expression through `parser`.
///
/// Modifiers written in the type expression win over those implied by a
/// bracketed name.
pub fn parse(
    text: &str,
    can_have_name: bool,
    can_have_type: bool,
    parser: &dyn TypeExpressionParser,
) -> Result<TagInfo, TypeExprError> {
    let mut info = split(text, can_have_name, can_have_type);
    if let Some(expression) = &info.type_expression {
        let parsed = parser.parse(expression)?;
        info.types = parsed.names;
        info.optional = parsed.optional.or(info.optional);
        info.nullable = parsed.nullable.or(info.nullable);
        info.variable = parsed.variable.or(info.variable);
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::type_expr::ClosureTypeParser;

    fn info(text: &str) -> TagInfo {
        parse(text, true, true, &ClosureTypeParser).unwrap()
    }

    #[test]
    fn type_name_and_description() {
        let i = info("{string} kind - What soup.");
        assert_eq!(i.types, ["string"]);
        assert_eq!(i.name.as_deref(), Some("kind"));
        assert_eq!(i.text, "What soup.");
    }

    #[test]
    fn bracketed_names() {
        let i = info("[foo]");
        assert_eq!(i.name.as_deref(), Some("foo"));
        assert_eq!(i.optional, Some(true));
        assert_eq!(i.default_value, None);

        assert_eq!(info("[ bar   ]").name.as_deref(), Some("bar"));

        let i = info("[     baz  =   qux ]");
        assert_eq!(i.name.as_deref(), Some("baz"));
        assert_eq!(i.default_value.as_deref(), Some("qux"));
    }

    #[test]
    fn default_containing_brackets() {
        let i = info(r#"{Array.<string>} [path=["home", "user"]] - Path"#);
        assert_eq!(i.name.as_deref(), Some("path"));
        assert_eq!(i.default_value.as_deref(), Some(r#"["home", "user"]"#));
        assert_eq!(i.text, "Path");
    }

    #[test]
    fn dash_means_no_name() {
        let i = info("{?string} - Only a description.");
        assert_eq!(i.name, None);
        assert_eq!(i.nullable, Some(true));
        assert_eq!(i.text, "Only a description.");
    }

    #[test]
    fn nested_braces_in_type() {
        let i = info("{Object.<string, {a: number}>} map");
        assert_eq!(i.types, ["Object.<string, {a: number}>"]);
        assert_eq!(i.name.as_deref(), Some("map"));
    }

    #[test]
    fn escaped_braces_are_unescaped() {
        let i = split(r"{\{a: number\}} rec", true, true);
        assert_eq!(i.type_expression.as_deref(), Some("{a: number}"));
    }

    #[test]
    fn inline_type_overrides() {
        let i = info("widget {@type Widget} The widget.");
        assert_eq!(i.types, ["Widget"]);
        assert_eq!(i.name.as_deref(), Some("widget"));
        assert_eq!(i.text, "The widget.");
    }

    #[test]
    fn expression_flags_win() {
        let i = info("{number=} [count=1]");
        assert_eq!(i.optional, Some(true));
        assert_eq!(i.default_value.as_deref(), Some("1"));

        let i = info("{!Object} [opts]");
        assert_eq!(i.nullable, Some(false));
        assert_eq!(i.optional, Some(true));
    }

    #[test]
    fn malformed_type_is_an_error_but_split_still_works() {
        assert!(parse("{Array.<} foo", true, true, &ClosureTypeParser).is_err());
        let i = split("{Array.<} foo", true, true);
        assert_eq!(i.name.as_deref(), Some("foo"));
        assert!(i.types.is_empty());
    }

    #[test]
    fn unnamed_tags_keep_all_text() {
        let i = parse("{boolean} True when hot.", false, true, &ClosureTypeParser).unwrap();
        assert_eq!(i.types, ["boolean"]);
        assert_eq!(i.name, None);
        assert_eq!(i.text, "True when hot.");
    }
}
