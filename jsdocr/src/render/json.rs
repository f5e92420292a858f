//! JSON renderer: the finished doclets as a pretty-printed array.

use anyhow::{Context, Result};
use doclet_core::Doclet;

use crate::render::Renderer;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, doclets: &[&Doclet]) -> Result<String> {
        let mut out = serde_json::to_string_pretty(doclets).context("failed to serialize doclets")?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doclet_core::{Kind, Scope};

    fn doclet(longname: &str, kind: Kind) -> Doclet {
        Doclet {
            longname: longname.to_string(),
            kind: Some(kind),
            ..Default::default()
        }
    }

    #[test]
    fn empty_array() {
        assert_eq!(JsonRenderer.render(&[]).unwrap(), "[]\n");
    }

    #[test]
    fn doclet_fields() {
        let mut heat = doclet("Soup#heat", Kind::Function);
        heat.memberof = Some("Soup".to_string());
        heat.scope = Some(Scope::Instance);
        let out = JsonRenderer.render(&[&doclet("Soup", Kind::Class), &heat]).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["longname"], "Soup");
        assert_eq!(items[0]["kind"], "class");
        assert_eq!(items[1]["memberof"], "Soup");
        assert_eq!(items[1]["scope"], "instance");
    }
}
