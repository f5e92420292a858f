//! The built-in tag sets: `jsdoc`, `closure` and the internal tags every run
//! needs regardless of configuration.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::dictionary::{Dictionary, TagDefinition};
use super::type_info;
use super::{Tag, TagValue, TypeSpec};
use crate::doclet::{Access, Doclet, Kind};
use crate::name::{self, Scope, GLOBAL, MODULE_NAMESPACE};

static RE_BORROWS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^(.+?)(?:\s+as\s+(.+))?$").unwrap());
static RE_MULTIPLE_WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+\s+\S+").unwrap());
static RE_CONSTRUCTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)@construct(s|or)\b").unwrap());
static RE_CLASSDESC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)@classdesc\b").unwrap());

pub fn tag_set(name: &str) -> Option<Vec<TagDefinition>> {
    match name {
        "jsdoc" => Some(jsdoc_tags()),
        "closure" => Some(closure_tags()),
        _ => None,
    }
}

/// Tags the engine itself relies on.
pub fn internal_tags() -> Vec<TagDefinition> {
    vec![
        TagDefinition::new("also"),
        TagDefinition::new("description").requires_value().synonyms(&["desc"]),
        TagDefinition::new("kind").requires_value(),
        TagDefinition::new("name").requires_value(),
    ]
}

// -- Helpers -------------------------------------------------------------------

fn first_word(text: &str) -> String {
    text.split_whitespace().next().unwrap_or_default().to_string()
}

fn text_of(tag: &Tag) -> Option<String> {
    tag.value_text().map(str::to_string)
}

fn set_name_to_value(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    let name = match &tag.value {
        Some(TagValue::Structured(value)) => value.description.clone(),
        Some(TagValue::Text(text)) => Some(text.clone()),
        None => None,
    };
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        doclet.add_tag("name", Some(&name), dictionary);
    }
}

fn set_name_to_value_name(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    if let Some(name) = tag.structured().and_then(|v| v.name.clone()) {
        doclet.add_tag("name", Some(&name), dictionary);
    }
}

fn set_name_to_file(doclet: &mut Doclet, dictionary: &Dictionary) {
    let Some(filename) = doclet.meta.filename.clone() else {
        return;
    };
    let name = match doclet.meta.path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => format!("{path}/{filename}"),
        None => filename,
    };
    doclet.add_tag("name", Some(&name), dictionary);
}

fn set_name_to_module_file(doclet: &mut Doclet, dictionary: &Dictionary) {
    let stem = doclet
        .meta
        .filename
        .as_deref()
        .and_then(|f| Path::new(f).file_stem())
        .map(|s| s.to_string_lossy().into_owned());
    if let Some(stem) = stem {
        doclet.add_tag("name", Some(&stem), dictionary);
    }
}

/// Copies the type and its modifiers without overwriting anything already set.
fn set_type(doclet: &mut Doclet, tag: &Tag) {
    let Some(value) = tag.structured() else {
        return;
    };
    if value.type_.is_none() {
        return;
    }
    if doclet.type_.is_none() {
        doclet.type_ = value.type_.clone();
    }
    doclet.optional = doclet.optional.or(value.optional);
    doclet.nullable = doclet.nullable.or(value.nullable);
    doclet.variable = doclet.variable.or(value.variable);
    if doclet.default_value.is_none() {
        doclet.default_value = value.default_value.clone();
    }
}

fn braces_optional(text: &str) -> String {
    type_info::split(text, false, true)
        .type_expression
        .unwrap_or_else(|| text.to_string())
}

fn braces_required(text: &str) -> String {
    let text: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    if text.starts_with('{') {
        text
    } else {
        format!("{{{text}}}")
    }
}

// -- Handlers ----------------------------------------------------------------------

fn on_abstract(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.is_virtual = true;
}

fn on_access(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.access = tag.value_text().and_then(|v| v.parse().ok());
}

fn on_alias(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.alias = text_of(tag);
}

fn on_augments(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    if let Some(value) = tag.value_text() {
        doclet.augment(&first_word(value));
    }
}

fn on_author(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.author.extend(text_of(tag));
}

fn on_borrows(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    let Some(caps) = tag.value_text().and_then(|v| RE_BORROWS.captures(v)) else {
        return;
    };
    if let Some(source) = caps.get(1) {
        doclet.borrow(source.as_str().trim(), caps.get(2).map(|m| m.as_str().trim()));
    }
}

fn on_class(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::Class);
    if tag.original_title.eq_ignore_ascii_case("class") {
        let looks_like_desc = tag.value_text().is_some_and(|v| RE_MULTIPLE_WORDS.is_match(v));
        if (looks_like_desc || RE_CONSTRUCTS.is_match(&doclet.comment))
            && !RE_CLASSDESC.is_match(&doclet.comment)
        {
            doclet.classdesc = text_of(tag);
            return;
        }
    }
    set_name_to_value(doclet, tag, dictionary);
}

fn on_classdesc(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.classdesc = text_of(tag);
}

fn on_constant(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::Constant);
    set_name_to_value_name(doclet, tag, dictionary);
    set_type(doclet, tag);
}

fn on_constructs(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    let owner = tag
        .value_text()
        .map(first_word)
        .filter(|w| !w.is_empty())
        .unwrap_or_else(|| "{@thisClass}".to_string());
    doclet.add_tag("alias", Some(&owner), dictionary);
    doclet.kind = Some(Kind::Class);
}

fn on_copyright(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.copyright = text_of(tag);
}

fn on_default(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.default_value = text_of(tag).or_else(|| doclet.meta.code.value.clone());
}

fn on_deprecated(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.deprecated = Some(text_of(tag).unwrap_or_default());
}

fn on_enum(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.kind = Some(Kind::Member);
    doclet.is_enum = true;
    set_type(doclet, tag);
}

fn on_event(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::Event);
    set_name_to_value(doclet, tag, dictionary);
}

fn on_example(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.examples.extend(text_of(tag));
}

fn on_exports(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    if let Some(value) = tag.value_text() {
        let module = name::strip_namespace(&first_word(value));
        doclet.add_tag("alias", Some(&module), dictionary);
    }
    doclet.kind = Some(Kind::Module);
}

fn on_external(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::External);
    let first_type = tag
        .structured()
        .and_then(|v| v.type_.as_ref())
        .and_then(|t| t.names.first().cloned());
    match first_type {
        Some(type_name) => {
            set_type(doclet, tag);
            doclet.add_tag("name", Some(&type_name), dictionary);
        }
        None => set_name_to_value(doclet, tag, dictionary),
    }
}

fn on_file(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    set_name_to_file(doclet, dictionary);
    doclet.kind = Some(Kind::File);
    if let Some(text) = text_of(tag) {
        doclet.description = Some(text);
    }
    doclet.preserve_name = true;
}

fn on_fires(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    if let Some(value) = tag.value_text() {
        doclet.fires.push(name::apply_namespace(value, "event"));
    }
}

fn on_function(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::Function);
    set_name_to_value(doclet, tag, dictionary);
}

fn on_global(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.scope = Some(Scope::Global);
    doclet.memberof = None;
}

fn on_ignore(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.ignore = true;
}

fn on_implements(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    if let Some(value) = tag.value_text() {
        doclet.implements.push(first_word(value));
    }
}

fn on_inheritdoc(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.inheritdoc = true;
}

fn on_inner(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.scope = Some(Scope::Inner);
}

fn on_instance(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.scope = Some(Scope::Instance);
}

fn on_static(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.scope = Some(Scope::Static);
}

fn on_interface(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::Interface);
    set_name_to_value_name(doclet, tag, dictionary);
}

fn on_lends(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.alias = Some(text_of(tag).unwrap_or_else(|| GLOBAL.to_string()));
    doclet.add_tag("undocumented", None, dictionary);
}

fn on_license(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.license = text_of(tag);
}

fn on_listens(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    if let Some(value) = tag.value_text() {
        doclet.listens.push(name::apply_namespace(value, "event"));
    }
}

fn on_member(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::Member);
    set_name_to_value_name(doclet, tag, dictionary);
    set_type(doclet, tag);
}

fn on_memberof(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    if tag.original_title.eq_ignore_ascii_case("memberof!") {
        doclet.force_memberof = true;
    }
    match tag.value_text() {
        Some(GLOBAL) => {
            doclet.add_tag("global", None, dictionary);
            doclet.memberof = None;
        }
        Some(owner) => doclet.set_memberof(owner),
        None => {}
    }
}

fn on_mixes(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    if let Some(value) = tag.value_text() {
        doclet.mix(&first_word(value));
    }
}

fn on_mixin(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::Mixin);
    set_name_to_value(doclet, tag, dictionary);
}

fn on_module(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::Module);
    set_name_to_value(doclet, tag, dictionary);
    if doclet.name.is_empty() {
        set_name_to_module_file(doclet, dictionary);
    }
    doclet.name = name::strip_namespace(&doclet.name);
    set_type(doclet, tag);
}

fn on_namespace(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::Namespace);
    set_name_to_value(doclet, tag, dictionary);
    set_type(doclet, tag);
}

fn on_param(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.params.push(tag.structured().cloned().unwrap_or_default());
}

fn on_private(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.access = Some(Access::Private);
}

fn on_private_typed(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.access = Some(Access::Private);
    set_type(doclet, tag);
}

fn on_property(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.properties.push(tag.structured().cloned().unwrap_or_default());
}

fn on_protected(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.access = Some(Access::Protected);
}

fn on_protected_typed(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.access = Some(Access::Protected);
    set_type(doclet, tag);
}

fn on_public(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.access = Some(Access::Public);
}

fn on_readonly(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.readonly = true;
}

fn on_requires(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    let Some(value) = tag.value_text() else {
        return;
    };
    let required = if value.starts_with("{@") {
        value.to_string()
    } else {
        let word = first_word(value);
        if word.starts_with(MODULE_NAMESPACE) {
            word
        } else {
            format!("{MODULE_NAMESPACE}{word}")
        }
    };
    doclet.requires.push(required);
}

fn on_returns(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.returns.push(tag.structured().cloned().unwrap_or_default());
}

fn on_see(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.see.extend(text_of(tag));
}

fn on_since(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.since = text_of(tag);
}

fn on_summary(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.summary = text_of(tag);
}

fn on_this(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.this = tag.value_text().map(first_word);
}

fn on_todo(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.todo.extend(text_of(tag));
}

fn on_throws(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.exceptions.push(tag.structured().cloned().unwrap_or_default());
}

fn on_tutorial(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.tutorials.extend(text_of(tag));
}

fn on_type(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    set_type(doclet, tag);
    if doclet.kind == Some(Kind::Function) {
        doclet.add_tag("returns", Some(&tag.text), dictionary);
    }
}

fn on_typedef(doclet: &mut Doclet, tag: &Tag, dictionary: &Dictionary) {
    doclet.kind = Some(Kind::Typedef);
    if tag.value.is_none() {
        return;
    }
    set_name_to_value_name(doclet, tag, dictionary);
    if tag.original_title.eq_ignore_ascii_case("callback") {
        doclet.type_ = Some(TypeSpec::new(["function"]));
    } else {
        set_type(doclet, tag);
    }
}

fn on_undocumented(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.undocumented = true;
    doclet.comment.clear();
}

fn on_variation(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    let Some(value) = tag.value_text() else {
        return;
    };
    let value = value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(value);
    doclet.variation = Some(value.to_string());
}

fn on_version(doclet: &mut Doclet, tag: &Tag, _: &Dictionary) {
    doclet.version = text_of(tag);
}

fn on_override(doclet: &mut Doclet, _tag: &Tag, _: &Dictionary) {
    doclet.is_override = true;
}

// -- Tag sets ------------------------------------------------------------------------

fn base_definitions() -> Vec<TagDefinition> {
    vec![
        TagDefinition::new("abstract").forbids_value().on_tagged(on_abstract).synonyms(&["virtual"]),
        TagDefinition::new("access").requires_value().on_tagged(on_access),
        TagDefinition::new("alias").requires_value().on_tagged(on_alias),
        TagDefinition::new("augments")
            .requires_value()
            .on_text(braces_optional)
            .on_tagged(on_augments)
            .synonyms(&["extends"]),
        TagDefinition::new("author").requires_value().on_tagged(on_author),
        TagDefinition::new("borrows").requires_value().on_tagged(on_borrows),
        TagDefinition::new("class").on_tagged(on_class).synonyms(&["constructor"]),
        TagDefinition::new("classdesc").on_tagged(on_classdesc),
        TagDefinition::new("constant")
            .typed()
            .named()
            .on_tagged(on_constant)
            .synonyms(&["const"]),
        TagDefinition::new("constructs").on_tagged(on_constructs),
        TagDefinition::new("copyright").requires_value().on_tagged(on_copyright),
        TagDefinition::new("default").on_tagged(on_default).synonyms(&["defaultvalue"]),
        TagDefinition::new("deprecated").on_tagged(on_deprecated),
        TagDefinition::new("description").requires_value().synonyms(&["desc"]),
        TagDefinition::new("enum").typed().on_tagged(on_enum),
        TagDefinition::new("event").namespace().on_tagged(on_event),
        TagDefinition::new("example")
            .keeps_whitespace()
            .removes_indent()
            .requires_value()
            .on_tagged(on_example),
        TagDefinition::new("exports").requires_value().on_tagged(on_exports),
        TagDefinition::new("external")
            .typed()
            .namespace()
            .on_tagged(on_external)
            .synonyms(&["host"]),
        TagDefinition::new("file")
            .on_tagged(on_file)
            .synonyms(&["fileoverview", "overview"]),
        TagDefinition::new("fires").requires_value().on_tagged(on_fires).synonyms(&["emits"]),
        TagDefinition::new("function").on_tagged(on_function).synonyms(&["func", "method"]),
        TagDefinition::new("global").forbids_value().on_tagged(on_global),
        TagDefinition::new("ignore").forbids_value().on_tagged(on_ignore),
        TagDefinition::new("implements")
            .requires_value()
            .on_text(braces_optional)
            .on_tagged(on_implements),
        TagDefinition::new("inheritdoc").forbids_value().on_tagged(on_inheritdoc),
        TagDefinition::new("inner").forbids_value().on_tagged(on_inner),
        TagDefinition::new("instance").forbids_value().on_tagged(on_instance),
        TagDefinition::new("interface").named().on_tagged(on_interface),
        TagDefinition::new("kind").requires_value(),
        TagDefinition::new("lends").on_tagged(on_lends),
        TagDefinition::new("license").requires_value().on_tagged(on_license),
        TagDefinition::new("listens").requires_value().on_tagged(on_listens),
        TagDefinition::new("member")
            .typed()
            .named()
            .on_tagged(on_member)
            .synonyms(&["var"]),
        TagDefinition::new("memberof")
            .requires_value()
            .on_tagged(on_memberof)
            .synonyms(&["memberof!"]),
        TagDefinition::new("mixes").requires_value().on_tagged(on_mixes),
        TagDefinition::new("mixin").on_tagged(on_mixin),
        TagDefinition::new("module").typed().namespace().on_tagged(on_module),
        TagDefinition::new("name").requires_value(),
        TagDefinition::new("namespace").typed().on_tagged(on_namespace),
        TagDefinition::new("param")
            .typed()
            .named()
            .on_tagged(on_param)
            .synonyms(&["arg", "argument"]),
        TagDefinition::new("private").forbids_value().on_tagged(on_private),
        TagDefinition::new("property")
            .requires_value()
            .typed()
            .named()
            .on_tagged(on_property)
            .synonyms(&["prop"]),
        TagDefinition::new("protected").forbids_value().on_tagged(on_protected),
        TagDefinition::new("public").forbids_value().on_tagged(on_public),
        TagDefinition::new("readonly").forbids_value().on_tagged(on_readonly),
        TagDefinition::new("requires").requires_value().on_tagged(on_requires),
        TagDefinition::new("returns")
            .requires_value()
            .typed()
            .on_tagged(on_returns)
            .synonyms(&["return"]),
        TagDefinition::new("see").requires_value().on_tagged(on_see),
        TagDefinition::new("since").requires_value().on_tagged(on_since),
        TagDefinition::new("static").forbids_value().on_tagged(on_static),
        TagDefinition::new("summary").requires_value().on_tagged(on_summary),
        TagDefinition::new("this").requires_value().on_tagged(on_this),
        TagDefinition::new("todo").requires_value().on_tagged(on_todo),
        TagDefinition::new("throws")
            .requires_value()
            .typed()
            .on_tagged(on_throws)
            .synonyms(&["exception"]),
        TagDefinition::new("tutorial").requires_value().on_tagged(on_tutorial),
        TagDefinition::new("type")
            .requires_value()
            .typed()
            .on_text(braces_required)
            .on_tagged(on_type),
        TagDefinition::new("typedef")
            .typed()
            .named()
            .on_tagged(on_typedef)
            .synonyms(&["callback"]),
        TagDefinition::new("undocumented").forbids_value().on_tagged(on_undocumented),
        TagDefinition::new("variation").requires_value().on_tagged(on_variation),
        TagDefinition::new("version").requires_value().on_tagged(on_version),
    ]
}

/// The full jsdoc tag set.
pub fn jsdoc_tags() -> Vec<TagDefinition> {
    base_definitions()
        .into_iter()
        .map(|def| match def.title.as_str() {
            "type" => def.forbids_description(),
            _ => def,
        })
        .collect()
}

/// Tags understood by the Closure Compiler. Several are renamed copies of
/// their jsdoc counterparts; `private`, `protected` and `interface` differ.
pub fn closure_tags() -> Vec<TagDefinition> {
    let base = base_definitions();
    let find = |title: &str| base.iter().find(|d| d.title == title).cloned();

    let mut tags: Vec<TagDefinition> = [
        "deprecated", "enum", "implements", "inheritdoc", "lends", "license", "param", "this",
        "throws", "type", "typedef",
    ]
    .iter()
    .filter_map(|title| find(title))
    .map(|def| TagDefinition {
        synonyms: Vec::new(),
        ..def
    })
    .collect();

    let renamed = [
        ("constant", "const"),
        ("class", "constructor"),
        ("augments", "extends"),
        ("readonly", "final"),
        ("returns", "return"),
    ];
    for (original, title) in renamed {
        if let Some(def) = find(original) {
            tags.push(def.renamed(title));
        }
    }

    tags.push(TagDefinition::new("interface").forbids_value().on_tagged(on_interface));
    tags.push(TagDefinition::new("override").forbids_value().on_tagged(on_override));
    tags.push(TagDefinition::new("private").typed().on_tagged(on_private_typed));
    tags.push(TagDefinition::new("protected").typed().on_tagged(on_protected_typed));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsdoc_type_forbids_description() {
        let tags = jsdoc_tags();
        let ty = tags.iter().find(|d| d.title == "type");
        assert!(ty.is_some_and(|d| d.must_not_have_description));
    }

    #[test]
    fn closure_renamed_copies_drop_synonyms() {
        let tags = closure_tags();
        let extends = tags.iter().find(|d| d.title == "extends");
        assert!(extends.is_some_and(|d| d.synonyms.is_empty() && d.on_tagged.is_some()));
        assert!(tags.iter().all(|d| d.title != "augments"));
    }

    #[test]
    fn braces_are_added_to_type_text() {
        assert_eq!(braces_required("string"), "{string}");
        assert_eq!(braces_required("{number}"), "{number}");
        assert_eq!(braces_optional("{Base}"), "Base");
        assert_eq!(braces_optional("Base"), "Base");
    }

    #[test]
    fn unknown_set() {
        assert!(tag_set("jsdoc").is_some());
        assert!(tag_set("doxygen").is_none());
    }
}
