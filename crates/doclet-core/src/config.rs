//! Run configuration.
//!
//! Mirrors the `tags` section of a jsdoc-style `conf.json`:
//!
//! ```json
//! { "tags": { "allowUnknownTags": ["customtag"], "dictionaries": ["jsdoc"] } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::DocletError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub tags: TagConfig,
}

impl Config {
    pub fn from_json(text: &str) -> Result<Config, DocletError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagConfig {
    pub allow_unknown_tags: UnknownTags,
    /// Tag sets to load. The first one listed wins when two define the same tag.
    pub dictionaries: Vec<String>,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            allow_unknown_tags: UnknownTags::default(),
            dictionaries: vec!["jsdoc".to_string(), "closure".to_string()],
        }
    }
}

/// Policy for tags that no dictionary defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnknownTags {
    All(bool),
    Only(Vec<String>),
}

impl Default for UnknownTags {
    fn default() -> Self {
        UnknownTags::All(true)
    }
}

impl UnknownTags {
    pub fn allows(&self, title: &str) -> bool {
        match self {
            UnknownTags::All(allowed) => *allowed,
            UnknownTags::Only(titles) => titles.iter().any(|t| t == title),
        }
    }
}
