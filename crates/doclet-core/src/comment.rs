//! Raw comment handling: unwrapping `/** ... */` and splitting it into tags.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_OPENING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/\*\*+").unwrap());
static RE_MARGIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]*\* ?").unwrap());
static RE_STARTS_WITH_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*@").unwrap());
static RE_TAG_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*@(\S)").unwrap());
static RE_ALSO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@also\b").unwrap());

/// One tag as written in the comment, before the dictionary sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTag {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl RawTag {
    pub fn new(title: &str, text: Option<&str>) -> RawTag {
        RawTag {
            title: title.to_string(),
            text: text.map(str::to_string),
        }
    }
}

/// Removes the comment delimiters and the `*` left margin.
pub fn unwrap(comment: &str) -> String {
    let mut body = RE_OPENING.replace(comment, "").into_owned();
    if let Some(inner) = body.strip_suffix("*/") {
        body = inner.trim_end_matches('*').to_string();
    }
    let lines: Vec<&str> = body
        .lines()
        .map(|line| match RE_MARGIN.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        })
        .collect();
    lines.join("\n").trim().to_string()
}

/// Splits one comment into several when it uses `@also`.
pub fn split_also(comment: &str) -> Vec<String> {
    RE_ALSO.split(comment).map(str::to_string).collect()
}

/// Unwraps a comment and splits it into raw tags. Text before the first tag
/// becomes an implicit `@description`.
pub fn to_tags(comment: &str) -> Vec<RawTag> {
    let mut body = unwrap(comment);
    if body.is_empty() {
        return Vec::new();
    }
    if !RE_STARTS_WITH_TAG.is_match(&body) {
        body = format!("@description {body}");
    }

    let mut chunks: Vec<String> = Vec::new();
    for line in body.lines() {
        if let Some(caps) = RE_TAG_LINE.captures(line) {
            if let Some(m) = caps.get(1) {
                chunks.push(line[m.start()..].to_string());
                continue;
            }
        }
        if let Some(current) = chunks.last_mut() {
            current.push('\n');
            current.push_str(line);
        }
    }

    chunks
        .iter()
        .filter_map(|chunk| {
            let title_end = chunk.find(char::is_whitespace).unwrap_or(chunk.len());
            let title = &chunk[..title_end];
            if title.is_empty() {
                return None;
            }
            let rest = &chunk[title_end..];
            let text = (!rest.trim().is_empty()).then(|| rest.to_string());
            Some(RawTag {
                title: title.to_string(),
                text,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_strips_delimiters_and_margin() {
        let comment = "/**\n * Adds two numbers.\n *\n * @param {number} a\n */";
        assert_eq!(unwrap(comment), "Adds two numbers.\n\n@param {number} a");
    }

    #[test]
    fn single_line_comment() {
        assert_eq!(unwrap("/** @ignore */"), "@ignore");
    }

    #[test]
    fn leading_text_is_a_description() {
        let tags = to_tags("/**\n * Makes soup.\n * @param {string} kind - What soup.\n */");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].title, "description");
        assert_eq!(tags[0].text.as_deref().map(str::trim), Some("Makes soup."));
        assert_eq!(tags[1].title, "param");
        assert_eq!(tags[1].text.as_deref().map(str::trim), Some("{string} kind - What soup."));
    }

    #[test]
    fn tag_text_spans_lines_and_keeps_indent() {
        let tags = to_tags("/**\n * @example\n *   soup.heat(3);\n *   soup.eat();\n */");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].text.as_deref(), Some("\n  soup.heat(3);\n  soup.eat();"));
    }

    #[test]
    fn bare_tag_has_no_text() {
        let tags = to_tags("/** @ignore\n * @inner */");
        assert_eq!(tags, vec![RawTag::new("ignore", None), RawTag::new("inner", None)]);
    }

    #[test]
    fn also_splits_comment() {
        let parts = split_also("/** @name a\n * @also\n * @name b */");
        assert_eq!(parts.len(), 2);
        assert!(parts[1].contains("@name b"));
    }
}
