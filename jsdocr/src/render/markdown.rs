//! GitHub-flavored markdown renderer.
//!
//! Layout: an index of every section, then one `##` section per top-level
//! symbol (or symbol that owns members) followed by a `###` block for each
//! of its direct members.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use doclet_core::doclet::Param;
use doclet_core::Doclet;

use crate::render::Renderer;
use crate::toc::{self, Slugger};

pub struct MarkdownRenderer;

/// A `##` section: the owner and its direct members, by position in the input.
struct Section {
    owner: usize,
    members: Vec<usize>,
}

impl Renderer for MarkdownRenderer {
    fn render(&self, doclets: &[&Doclet]) -> Result<String> {
        let sections = group_sections(doclets);

        let mut slugger = Slugger::default();
        let mut slugs: HashMap<usize, String> = HashMap::new();
        for section in &sections {
            slugs.insert(section.owner, slugger.slug(&doclets[section.owner].longname));
            for &member in &section.members {
                slugs.insert(member, slugger.slug(&doclets[member].longname));
            }
        }

        let mut output = String::new();
        if sections.is_empty() {
            return Ok(output);
        }

        output.push_str("## Index\n\n");
        for section in &sections {
            output.push_str(&toc::render_toc_item(
                &doclets[section.owner].longname,
                &slugs[&section.owner],
                0,
            ));
            output.push('\n');
            for &member in &section.members {
                output.push_str(&toc::render_toc_item(&doclets[member].longname, &slugs[&member], 1));
                output.push('\n');
            }
        }
        output.push('\n');

        for section in &sections {
            output.push_str(&render_doclet(doclets[section.owner], "##"));
            for &member in &section.members {
                output.push_str(&render_doclet(doclets[member], "###"));
            }
        }

        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

/// Sections in input order. A doclet heads a section when it has no owner,
/// when its owner is not in the output, or when other doclets are members of it.
fn group_sections(doclets: &[&Doclet]) -> Vec<Section> {
    let longnames: HashSet<&str> = doclets.iter().map(|d| d.longname.as_str()).collect();
    let owners: HashSet<&str> = doclets.iter().filter_map(|d| d.memberof.as_deref()).collect();

    let heads_section = |d: &Doclet| match d.memberof.as_deref() {
        None => true,
        Some(owner) => !longnames.contains(owner) || owners.contains(d.longname.as_str()),
    };

    let mut sections: Vec<Section> = Vec::new();
    let mut by_longname: HashMap<&str, usize> = HashMap::new();
    for (i, doclet) in doclets.iter().enumerate() {
        if heads_section(doclet) {
            by_longname.entry(doclet.longname.as_str()).or_insert(sections.len());
            sections.push(Section {
                owner: i,
                members: Vec::new(),
            });
        }
    }
    for (i, doclet) in doclets.iter().enumerate() {
        if heads_section(doclet) {
            continue;
        }
        let owner = doclet.memberof.as_deref().and_then(|o| by_longname.get(o));
        if let Some(&section) = owner {
            sections[section].members.push(i);
        }
    }
    sections
}

fn render_doclet(doclet: &Doclet, heading: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("{} {}\n", heading, toc::escape_text(&doclet.longname)));

    let mut badges: Vec<String> = Vec::new();
    if let Some(kind) = doclet.kind {
        badges.push(format!("`{kind}`"));
    }
    if let Some(scope) = doclet.scope {
        badges.push(format!("`{}`", scope.as_str()));
    }
    if let Some(deprecated) = &doclet.deprecated {
        if deprecated.is_empty() {
            badges.push("**deprecated**".to_string());
        } else {
            badges.push(format!("**deprecated**: {deprecated}"));
        }
    }
    if !badges.is_empty() {
        lines.push(badges.join(" "));
        lines.push(String::new());
    }

    if let Some(classdesc) = &doclet.classdesc {
        lines.push(classdesc.clone());
        lines.push(String::new());
    }
    if let Some(desc) = &doclet.description {
        lines.push(desc.clone());
        lines.push(String::new());
    }

    let notes = relation_notes(doclet);
    if !notes.is_empty() {
        for note in notes {
            lines.push(format!("* {note}"));
        }
        lines.push(String::new());
    }

    if !doclet.params.is_empty() {
        lines.push("#### Parameters\n".to_string());
        lines.push("| Name | Type | Description |".to_string());
        lines.push("| --- | --- | --- |".to_string());
        for param in &doclet.params {
            lines.push(format!(
                "| {} | {} | {} |",
                param_label(param),
                type_label(param),
                table_cell(param.description.as_deref().unwrap_or(""))
            ));
        }
        lines.push(String::new());
    }

    render_values(&mut lines, "Returns", &doclet.returns);
    render_values(&mut lines, "Throws", &doclet.exceptions);

    for example in &doclet.examples {
        lines.push("#### Example\n".to_string());
        lines.push("```js".to_string());
        lines.push(example.clone());
        lines.push("```".to_string());
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Where a doclet came from and what it relates to.
fn relation_notes(doclet: &Doclet) -> Vec<String> {
    let mut notes = Vec::new();
    for parent in &doclet.augments {
        notes.push(format!("Extends `{parent}`"));
    }
    for mixin in &doclet.mixes {
        notes.push(format!("Mixes in `{mixin}`"));
    }
    for interface in &doclet.implements {
        notes.push(format!("Implements `{interface}`"));
    }
    if doclet.inherited {
        if let Some(source) = &doclet.inherits {
            notes.push(format!("Inherited from `{source}`"));
        }
    }
    if let Some(overridden) = &doclet.overrides {
        notes.push(format!("Overrides `{overridden}`"));
    }
    if doclet.borrowed {
        notes.push("Borrowed".to_string());
    }
    notes
}

fn render_values(lines: &mut Vec<String>, title: &str, values: &[Param]) {
    if values.is_empty() {
        return;
    }
    lines.push(format!("#### {title}\n"));
    for value in values {
        let mut line = format!("* {}", type_label(value));
        if let Some(desc) = value.description.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(&format!(" {desc}"));
        }
        lines.push(line);
    }
    lines.push(String::new());
}

/// `name`, `[name]`, `...name` or `[name=default]`.
fn param_label(param: &Param) -> String {
    let mut name = param.name.clone().unwrap_or_default();
    if param.variable == Some(true) {
        name = format!("...{name}");
    }
    if let Some(default) = &param.default_value {
        name = format!("{name}={default}");
    }
    if param.optional == Some(true) {
        name = format!("[{name}]");
    }
    table_cell(&format!("`{name}`"))
}

fn type_label(param: &Param) -> String {
    match &param.type_ {
        Some(spec) if !spec.names.is_empty() => table_cell(&format!("`{}`", spec.names.join(" | "))),
        _ => String::new(),
    }
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
