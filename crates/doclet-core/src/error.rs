//! Error types for doclet resolution.

use std::fmt;
use thiserror::Error;

/// Source position attached to a diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}, line {line}"),
            (Some(file), None) => write!(f, "{file}"),
            (None, Some(line)) => write!(f, "line {line}"),
            (None, None) => write!(f, "unknown location"),
        }
    }
}

/// What is wrong with a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagIssue {
    Unknown,
    RequiresValue,
    ForbidsValue,
    ForbidsDescription,
}

impl TagIssue {
    /// Errors make the tag useless; the rest are harmless and only warned about.
    pub fn is_error(self) -> bool {
        matches!(self, TagIssue::Unknown | TagIssue::RequiresValue)
    }
}

impl fmt::Display for TagIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TagIssue::Unknown => "is not a known tag",
            TagIssue::RequiresValue => "requires a value",
            TagIssue::ForbidsValue => "does not permit a value; the value will be ignored",
            TagIssue::ForbidsDescription => {
                "does not permit a description; the description will be ignored"
            }
        })
    }
}

/// Everything that can go wrong while turning comments into resolved doclets.
///
/// Only `MissingDependency` aborts a pass; the rest are logged where they
/// happen and the offending tag or borrow is skipped.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DocletError {
    #[error("the @{tag} tag {issue} ({location})")]
    TagValidation {
        tag: String,
        issue: TagIssue,
        location: Location,
    },

    #[error("unable to parse the type expression `{expression}` of @{tag}: {message} ({location})")]
    TypeExpression {
        tag: String,
        expression: String,
        message: String,
        location: Location,
    },

    #[error("missing dependency: {dependent} depends on {dependency}, which is not a documented class, interface, mixin or external ({location})")]
    MissingDependency {
        dependent: String,
        dependency: String,
        location: Location,
    },

    #[error("cannot borrow {source_name} as {target}: no doclet named {source_name} ({location})")]
    MissingBorrowSource {
        source_name: String,
        target: String,
        location: Location,
    },

    #[error("invalid scope `{0}`; expected global, static, inner or instance")]
    InvalidScope(String),

    #[error("unknown tag dictionary `{0}`")]
    UnknownDictionary(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for DocletError {
    fn from(e: serde_json::Error) -> Self {
        DocletError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display() {
        let loc = Location {
            file: Some("soup.js".to_string()),
            line: Some(12),
        };
        assert_eq!(loc.to_string(), "soup.js, line 12");
        assert_eq!(Location::default().to_string(), "unknown location");
    }

    #[test]
    fn missing_borrow_message() {
        let err = DocletError::MissingBorrowSource {
            source_name: "Foo#bar".to_string(),
            target: "#baz".to_string(),
            location: Location {
                file: Some("widget.js".to_string()),
                line: Some(7),
            },
        };
        assert_eq!(
            err.to_string(),
            "cannot borrow Foo#bar as #baz: no doclet named Foo#bar (widget.js, line 7)"
        );
    }

    #[test]
    fn missing_dependency_message() {
        let err = DocletError::MissingDependency {
            dependent: "Orphan".to_string(),
            dependency: "Nowhere".to_string(),
            location: Location {
                file: Some("widget.js".to_string()),
                line: Some(12),
            },
        };
        let message = err.to_string();
        assert!(message.starts_with("missing dependency: Orphan depends on Nowhere"));
        assert!(message.ends_with("(widget.js, line 12)"));
    }
}
