//! GitHub-flavored markdown anchors for longnames.

use std::collections::HashMap;

/// Hands out heading anchors the way GitHub does, numbering repeats
/// (`heat`, `heat-1`, `heat-2`).
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn slug(&mut self, heading: &str) -> String {
        let base = github_slug(heading);
        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = match *count {
            0 => base.clone(),
            n => format!("{base}-{n}"),
        };
        *count += 1;
        slug
    }
}

/// Generate a table-of-contents link to an anchor.
pub fn render_toc_link(text: &str, slug: &str) -> String {
    format!("[{}](#{})", escape_text(text), slug)
}

/// Generate a TOC list item, indented by nesting level.
pub fn render_toc_item(text: &str, slug: &str, level: usize) -> String {
    format!("{}* {}", "  ".repeat(level), render_toc_link(text, slug))
}

/// Markdown-safe rendering of a longname: `<global>` and `_private` would
/// otherwise turn into HTML or emphasis.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '<' | '>' | '_' | '*' | '[' | ']' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// GitHub heading anchor slug generation.
///
/// - lowercase
/// - remove all chars that aren't alphanumeric, space, underscore or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_simple() {
        assert_eq!(github_slug("hello world"), "hello-world");
    }

    #[test]
    fn slug_with_scope_punctuation() {
        assert_eq!(github_slug("Soup#heat"), "soupheat");
        assert_eq!(github_slug("module:soup~Pot.make"), "modulesouppotmake");
        assert_eq!(github_slug("Soup#heat(1)"), "soupheat1");
    }

    #[test]
    fn slug_keeps_underscore() {
        assert_eq!(github_slug("Soup#_stir"), "soup_stir");
    }

    #[test]
    fn repeated_slugs_are_numbered() {
        let mut slugger = Slugger::default();
        assert_eq!(slugger.slug("Soup#heat"), "soupheat");
        assert_eq!(slugger.slug("Soup.heat"), "soupheat-1");
        assert_eq!(slugger.slug("Soup~heat"), "soupheat-2");
        assert_eq!(slugger.slug("Pot"), "pot");
    }

    #[test]
    fn toc_item() {
        assert_eq!(render_toc_item("Soup#heat", "soupheat", 1), "  * [Soup#heat](#soupheat)");
        assert_eq!(render_toc_item("<global>", "global", 0), "* [\\<global\\>](#global)");
    }
}
