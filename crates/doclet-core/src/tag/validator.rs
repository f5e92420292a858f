//! Tag validation against the dictionary.

use super::dictionary::{Dictionary, TagDefinition};
use super::Tag;
use crate::doclet::Meta;
use crate::error::{DocletError, TagIssue};

/// Checks a constructed tag. Nothing here is fatal: the caller logs the
/// error and keeps the tag.
pub fn validate(
    tag: &Tag,
    definition: Option<&TagDefinition>,
    meta: &Meta,
    dictionary: &Dictionary,
) -> Result<(), DocletError> {
    let issue = match definition {
        None if dictionary.allows_unknown(&tag.title) => None,
        None => Some(TagIssue::Unknown),
        Some(def) if def.must_have_value && tag.text.is_empty() => Some(TagIssue::RequiresValue),
        Some(def) if def.must_not_have_value && !tag.text.is_empty() => Some(TagIssue::ForbidsValue),
        Some(def)
            if def.must_not_have_description
                && tag
                    .structured()
                    .is_some_and(|v| v.description.as_deref().is_some_and(|d| !d.is_empty())) =>
        {
            Some(TagIssue::ForbidsDescription)
        }
        Some(_) => None,
    };

    match issue {
        Some(issue) => Err(DocletError::TagValidation {
            tag: tag.original_title.clone(),
            issue,
            location: meta.location(),
        }),
        None => Ok(()),
    }
}
