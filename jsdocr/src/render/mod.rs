//! Renderer module: trait-based format dispatch.

pub mod json;
pub mod markdown;

use anyhow::{anyhow, Result};
use doclet_core::Doclet;

/// Renders the finished doclets of a run into one output document.
pub trait Renderer {
    fn render(&self, doclets: &[&Doclet]) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "json" => Ok(Box::new(json::JsonRenderer)),
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use json or markdown", format)),
    }
}

/// Format implied by an output file name, if any.
pub fn format_for_path(path: &std::path::Path) -> Option<&'static str> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some("json"),
        Some("md" | "markdown") => Some("markdown"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn known_formats() {
        assert_eq!(create_renderer("json").unwrap().file_extension(), "json");
        assert_eq!(create_renderer("md").unwrap().file_extension(), "md");
        assert_eq!(create_renderer("markdown").unwrap().file_extension(), "md");
    }

    #[test]
    fn unknown_format() {
        let err = create_renderer("html").err().unwrap();
        assert!(err.to_string().contains("unknown format: html"));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(format_for_path(Path::new("out/api.md")), Some("markdown"));
        assert_eq!(format_for_path(Path::new("api.json")), Some("json"));
        assert_eq!(format_for_path(Path::new("api.txt")), None);
    }
}
