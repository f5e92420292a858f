//! Tag construction: one `@title body` pair turned into a validated value.

pub mod definitions;
pub mod dictionary;
pub mod type_expr;
pub mod type_info;
pub mod validator;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::doclet::Meta;
use crate::error::DocletError;
use dictionary::{Dictionary, TagDefinition};

static RE_LEADING_INDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]+").unwrap());

/// The type names a tag or doclet refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub names: Vec<String>,
}

impl TypeSpec {
    pub fn new<I, S>(names: I) -> TypeSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeSpec {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

/// The parsed body of a typed and/or named tag. Also the shape of a
/// documented parameter, return value, exception or property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<TypeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<bool>,
    #[serde(rename = "defaultvalue", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Structured(StructuredValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// The title as written, before synonyms are resolved.
    pub original_title: String,
    pub title: String,
    pub text: String,
    pub value: Option<TagValue>,
    /// Problems found while parsing or validating; the caller decides how to report them.
    pub diagnostics: Vec<DocletError>,
}

impl Tag {
    pub fn new(title: &str, body: Option<&str>, meta: &Meta, dictionary: &Dictionary) -> Tag {
        let original_title = title.trim().to_string();
        let title = dictionary.normalise(&original_title);
        let definition = dictionary.look_up(&title);

        let text = trim(body.unwrap_or_default(), definition, meta);
        let mut tag = Tag {
            original_title,
            title,
            text,
            value: None,
            diagnostics: Vec::new(),
        };

        if !tag.text.is_empty() {
            match definition {
                Some(definition) => tag.process_text(definition, meta, dictionary),
                None => tag.value = Some(TagValue::Text(tag.text.clone())),
            }
        }

        if let Err(err) = validator::validate(&tag, definition, meta, dictionary) {
            tag.diagnostics.push(err);
        }
        tag
    }

    fn process_text(&mut self, definition: &TagDefinition, meta: &Meta, dictionary: &Dictionary) {
        if let Some(hook) = definition.on_tag_text {
            self.text = hook(&self.text);
        }
        if !(definition.can_have_type || definition.can_have_name) {
            self.value = Some(TagValue::Text(self.text.clone()));
            return;
        }

        let info = match type_info::parse(
            &self.text,
            definition.can_have_name,
            definition.can_have_type,
            dictionary.type_parser(),
        ) {
            Ok(info) => info,
            Err(err) => {
                let info = type_info::split(&self.text, definition.can_have_name, definition.can_have_type);
                self.diagnostics.push(DocletError::TypeExpression {
                    tag: self.title.clone(),
                    expression: info.type_expression.clone().unwrap_or_default(),
                    message: err.to_string(),
                    location: meta.location(),
                });
                info
            }
        };

        self.value = Some(TagValue::Structured(StructuredValue {
            type_: (!info.types.is_empty()).then(|| TypeSpec::new(info.types)),
            name: info.name.filter(|n| definition.can_have_name && !n.is_empty()),
            description: (!info.text.is_empty()).then_some(info.text),
            optional: info.optional,
            nullable: info.nullable,
            variable: info.variable,
            default_value: info.default_value,
        }));
    }

    /// The plain text of the value: the whole text for untyped tags, the
    /// description for structured ones.
    pub fn value_text(&self) -> Option<&str> {
        match &self.value {
            Some(TagValue::Text(text)) => Some(text),
            Some(TagValue::Structured(value)) => value.description.as_deref(),
            None => None,
        }
    }

    pub fn structured(&self) -> Option<&StructuredValue> {
        match &self.value {
            Some(TagValue::Structured(value)) => Some(value),
            _ => None,
        }
    }
}

fn trim(text: &str, definition: Option<&TagDefinition>, meta: &Meta) -> String {
    let keeps_whitespace = definition.is_some_and(|d| d.keeps_whitespace);
    let removes_indent = definition.is_some_and(|d| d.removes_indent);

    if meta.code.name.as_deref() == Some(text) && text.trim() != text {
        return format!("\"{text}\"");
    }
    if !keeps_whitespace {
        return text.trim().to_string();
    }

    let text = text.trim_matches(|c| c == '\n' || c == '\r' || c == '\x0c');
    if !removes_indent {
        return text.to_string();
    }
    let Some(indent) = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| RE_LEADING_INDENT.find(line))
        .map(|m| m.as_str().to_string())
    else {
        return text.to_string();
    };
    text.lines()
        .map(|line| line.strip_prefix(indent.as_str()).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}
