//! Registry of the tags a run understands.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, error};

use super::definitions;
use super::type_expr::{ClosureTypeParser, TypeExpressionParser};
use super::Tag;
use crate::config::{TagConfig, UnknownTags};
use crate::doclet::Doclet;
use crate::error::DocletError;

/// Rewrites tag text before it is parsed.
pub type TextHook = fn(&str) -> String;
/// Applies a parsed tag to the doclet that carries it.
pub type TagHandler = fn(&mut Doclet, &Tag, &Dictionary);

/// How one tag is parsed, validated and applied.
#[derive(Clone, Default)]
pub struct TagDefinition {
    pub title: String,
    pub can_have_type: bool,
    pub can_have_name: bool,
    pub must_have_value: bool,
    pub must_not_have_value: bool,
    pub must_not_have_description: bool,
    pub is_namespace: bool,
    pub keeps_whitespace: bool,
    pub removes_indent: bool,
    pub synonyms: Vec<String>,
    pub on_tag_text: Option<TextHook>,
    pub on_tagged: Option<TagHandler>,
}

impl fmt::Debug for TagDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagDefinition")
            .field("title", &self.title)
            .field("can_have_type", &self.can_have_type)
            .field("can_have_name", &self.can_have_name)
            .field("must_have_value", &self.must_have_value)
            .field("must_not_have_value", &self.must_not_have_value)
            .field("is_namespace", &self.is_namespace)
            .field("synonyms", &self.synonyms)
            .finish_non_exhaustive()
    }
}

impl TagDefinition {
    pub fn new(title: &str) -> TagDefinition {
        TagDefinition {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn typed(mut self) -> Self {
        self.can_have_type = true;
        self
    }

    pub fn named(mut self) -> Self {
        self.can_have_name = true;
        self
    }

    pub fn requires_value(mut self) -> Self {
        self.must_have_value = true;
        self
    }

    pub fn forbids_value(mut self) -> Self {
        self.must_not_have_value = true;
        self
    }

    pub fn forbids_description(mut self) -> Self {
        self.must_not_have_description = true;
        self
    }

    pub fn namespace(mut self) -> Self {
        self.is_namespace = true;
        self
    }

    pub fn keeps_whitespace(mut self) -> Self {
        self.keeps_whitespace = true;
        self
    }

    pub fn removes_indent(mut self) -> Self {
        self.removes_indent = true;
        self
    }

    pub fn synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn on_text(mut self, hook: TextHook) -> Self {
        self.on_tag_text = Some(hook);
        self
    }

    pub fn on_tagged(mut self, handler: TagHandler) -> Self {
        self.on_tagged = Some(handler);
        self
    }

    /// A copy under another title, without the original's synonyms.
    pub fn renamed(&self, title: &str) -> TagDefinition {
        TagDefinition {
            title: title.to_string(),
            synonyms: Vec::new(),
            ..self.clone()
        }
    }
}

/// Tag definitions, synonyms and namespace tags for one run, together with
/// the unknown-tag policy and the type grammar.
pub struct Dictionary {
    definitions: HashMap<String, TagDefinition>,
    synonyms: HashMap<String, String>,
    namespaces: HashSet<String>,
    unknown_tags: UnknownTags,
    type_parser: Box<dyn TypeExpressionParser>,
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("definitions", &self.definitions.len())
            .field("synonyms", &self.synonyms)
            .field("namespaces", &self.namespaces)
            .field("unknown_tags", &self.unknown_tags)
            .finish_non_exhaustive()
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary::from_config(&TagConfig::default())
    }
}

impl Dictionary {
    /// A dictionary with no tags at all.
    pub fn empty() -> Dictionary {
        Dictionary {
            definitions: HashMap::new(),
            synonyms: HashMap::new(),
            namespaces: HashSet::new(),
            unknown_tags: UnknownTags::default(),
            type_parser: Box::new(ClosureTypeParser),
        }
    }

    /// Loads the named tag sets, last listed first, so the first listed set
    /// overrides the others, then the internal tags.
    pub fn from_config(config: &TagConfig) -> Dictionary {
        let mut dictionary = Dictionary::empty();
        dictionary.unknown_tags = config.allow_unknown_tags.clone();

        for name in config.dictionaries.iter().rev() {
            match definitions::tag_set(name) {
                Some(set) => {
                    debug!(dictionary = %name, tags = set.len(), "loading tag dictionary");
                    for definition in set {
                        dictionary.define_tag(definition);
                    }
                }
                None => {
                    let err = DocletError::UnknownDictionary(name.clone());
                    error!("{err}; skipping it");
                }
            }
        }
        for definition in definitions::internal_tags() {
            dictionary.define_tag(definition);
        }
        dictionary
    }

    pub fn with_type_parser(mut self, parser: impl TypeExpressionParser + 'static) -> Self {
        self.type_parser = Box::new(parser);
        self
    }

    pub fn with_unknown_tags(mut self, policy: UnknownTags) -> Self {
        self.unknown_tags = policy;
        self
    }

    pub fn define_tag(&mut self, definition: TagDefinition) {
        let title = definition.title.to_lowercase();
        if definition.is_namespace {
            self.namespaces.insert(title.clone());
        } else {
            self.namespaces.remove(&title);
        }
        for synonym in &definition.synonyms {
            self.synonyms.insert(synonym.to_lowercase(), title.clone());
        }
        self.definitions.insert(title, definition);
    }

    pub fn define_synonym(&mut self, title: &str, synonym: &str) {
        self.synonyms
            .insert(synonym.to_lowercase(), title.to_lowercase());
    }

    /// Canonical title for whatever was written after the `@`.
    pub fn normalise(&self, title: &str) -> String {
        let lower = title.to_lowercase();
        self.synonyms.get(&lower).cloned().unwrap_or(lower)
    }

    pub fn look_up(&self, title: &str) -> Option<&TagDefinition> {
        self.definitions.get(&self.normalise(title))
    }

    /// True when doclets of this kind carry a namespace in their longname.
    pub fn is_namespace(&self, kind: &str) -> bool {
        self.namespaces.contains(kind)
    }

    pub fn allows_unknown(&self, title: &str) -> bool {
        self.unknown_tags.allows(title)
    }

    pub fn type_parser(&self) -> &dyn TypeExpressionParser {
        self.type_parser.as_ref()
    }
}
