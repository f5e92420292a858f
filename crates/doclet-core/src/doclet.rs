//! The doclet: everything known about one documented symbol.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::comment::{self, RawTag};
use crate::error::{DocletError, Location};
use crate::name::{self, Scope};
use crate::tag::dictionary::Dictionary;
use crate::tag::{StructuredValue, Tag, TagValue, TypeSpec};

/// A documented parameter, return value, exception or property.
pub type Param = StructuredValue;

// -- Enums ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Class,
    Constant,
    Event,
    External,
    File,
    Function,
    Interface,
    Member,
    Mixin,
    Module,
    Namespace,
    Package,
    Param,
    Typedef,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Class => "class",
            Kind::Constant => "constant",
            Kind::Event => "event",
            Kind::External => "external",
            Kind::File => "file",
            Kind::Function => "function",
            Kind::Interface => "interface",
            Kind::Member => "member",
            Kind::Mixin => "mixin",
            Kind::Module => "module",
            Kind::Namespace => "namespace",
            Kind::Package => "package",
            Kind::Param => "param",
            Kind::Typedef => "typedef",
        }
    }

    /// Kind implied by the code a comment is attached to.
    pub fn from_code_type(node_type: Option<&str>) -> Kind {
        match node_type {
            Some("function") => Kind::Function,
            Some("class") => Kind::Class,
            _ => Kind::Member,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "class" => Kind::Class,
            "constant" => Kind::Constant,
            "event" => Kind::Event,
            "external" => Kind::External,
            "file" => Kind::File,
            "function" => Kind::Function,
            "interface" => Kind::Interface,
            "member" => Kind::Member,
            "mixin" => Kind::Mixin,
            "module" => Kind::Module,
            "namespace" => Kind::Namespace,
            "package" => Kind::Package,
            "param" => Kind::Param,
            "typedef" => Kind::Typedef,
            other => return Err(format!("unknown kind `{other}`")),
        };
        Ok(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Package,
    Private,
    Protected,
    Public,
}

impl FromStr for Access {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "package" => Ok(Access::Package),
            "private" => Ok(Access::Private),
            "protected" => Ok(Access::Protected),
            "public" => Ok(Access::Public),
            other => Err(format!("unknown access level `{other}`")),
        }
    }
}

// -- Source information ---------------------------------------------------------

/// Hints about the code a comment documents, supplied by the source scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Longname of the enclosing function, for symbols declared inside one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funcscope: Option<String>,
    /// Longname `this` refers to at this point in the code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paramnames: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
    #[serde(default)]
    pub code: CodeInfo,
}

impl Meta {
    pub fn location(&self) -> Location {
        Location {
            file: self.filename.clone(),
            line: self.lineno,
        }
    }
}

/// One comment as delivered by the source scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDoclet {
    pub comment: String,
    /// Tags already split by the scanner; when empty, `comment` is split.
    #[serde(default)]
    pub tags: Vec<RawTag>,
    #[serde(default)]
    pub meta: Meta,
}

/// `@borrows from as target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowDirective {
    pub from: String,
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// A tag no dictionary defines, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocletTag {
    pub original_title: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<TagValue>,
}

// -- Doclet -------------------------------------------------------------------------

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Doclet {
    pub comment: String,
    pub meta: Meta,

    pub name: String,
    pub longname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memberof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classdesc: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<TypeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<bool>,
    #[serde(rename = "defaultvalue", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub returns: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Param>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub see: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub todo: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listens: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tutorials: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub augments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub borrows: Vec<BorrowDirective>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(rename = "virtual", default, skip_serializing_if = "is_false")]
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub undocumented: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub inheritdoc: bool,
    #[serde(rename = "override", default, skip_serializing_if = "is_false")]
    pub is_override: bool,
    #[serde(rename = "isEnum", default, skip_serializing_if = "is_false")]
    pub is_enum: bool,

    /// Empty when deprecated without an explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub this: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub inherited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub mixed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub borrowed: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<DocletTag>,

    #[serde(skip)]
    pub force_memberof: bool,
    #[serde(skip)]
    pub preserve_name: bool,
}

impl Doclet {
    /// Parses a raw comment into a doclet and resolves its name.
    pub fn new(comment: &str, meta: Meta, dictionary: &Dictionary) -> Doclet {
        let tags = comment::to_tags(comment);
        Doclet::from_tags(comment, &tags, meta, dictionary)
    }

    /// Builds a doclet from tags the scanner has already split.
    pub fn from_tags(comment: &str, tags: &[RawTag], meta: Meta, dictionary: &Dictionary) -> Doclet {
        let mut doclet = Doclet {
            comment: comment.to_string(),
            meta,
            ..Default::default()
        };
        for tag in tags {
            doclet.add_tag(&tag.title, tag.text.as_deref(), dictionary);
        }
        doclet.post_process(dictionary);
        doclet
    }

    pub fn from_raw(raw: &RawDoclet, dictionary: &Dictionary) -> Doclet {
        if raw.tags.is_empty() {
            Doclet::new(&raw.comment, raw.meta.clone(), dictionary)
        } else {
            Doclet::from_tags(&raw.comment, &raw.tags, raw.meta.clone(), dictionary)
        }
    }

    pub fn location(&self) -> Location {
        self.meta.location()
    }

    /// Parses one tag and applies it. Tags the dictionary does not know are
    /// kept in `tags`.
    pub fn add_tag(&mut self, title: &str, text: Option<&str>, dictionary: &Dictionary) {
        let tag = Tag::new(title, text, &self.meta, dictionary);
        for diagnostic in &tag.diagnostics {
            self.report(diagnostic);
        }

        match dictionary.look_up(&tag.title) {
            Some(definition) => {
                if let Some(handler) = definition.on_tagged {
                    handler(self, &tag, dictionary);
                }
            }
            None => self.tags.push(DocletTag {
                original_title: tag.original_title.clone(),
                title: tag.title.clone(),
                text: tag.text.clone(),
                value: tag.value.clone(),
            }),
        }
        self.apply_tag(&tag);
    }

    fn report(&self, diagnostic: &DocletError) {
        let is_error = match diagnostic {
            DocletError::TagValidation { issue, .. } => issue.is_error(),
            _ => true,
        };
        if is_error {
            error!(comment = %self.comment, "{diagnostic}");
        } else {
            warn!(comment = %self.comment, "{diagnostic}");
        }
    }

    /// The handful of tags that set doclet fields directly.
    fn apply_tag(&mut self, tag: &Tag) {
        let Some(value) = tag.value_text() else {
            return;
        };
        match tag.title.as_str() {
            "name" => self.name = value.to_string(),
            "description" => self.description = Some(value.to_string()),
            "kind" => match value.parse() {
                Ok(kind) => self.kind = Some(kind),
                Err(reason) => warn!(location = %self.location(), "{reason}"),
            },
            "scope" => {
                if let Err(err) = self.set_scope(value) {
                    warn!(location = %self.location(), "{err}");
                }
            }
            _ => {}
        }
    }

    /// Resolves the name and fills in what the tags left open.
    pub fn post_process(&mut self, dictionary: &Dictionary) {
        if !self.preserve_name {
            name::resolve(self, dictionary);
        }
        if !self.name.is_empty() && self.longname.is_empty() {
            let name = self.name.clone();
            self.set_longname(&name, dictionary);
        }
        if self.memberof.as_deref() == Some("") {
            self.memberof = None;
        }
        if self.kind.is_none() {
            self.kind = Some(Kind::from_code_type(self.meta.code.node_type.as_deref()));
        }
        if let Some(variation) = self.variation.as_deref().filter(|v| !v.is_empty()) {
            let suffix = format!("({variation})");
            if !self.longname.is_empty() && !self.longname.ends_with(&suffix) {
                self.longname.push_str(&suffix);
            }
        }
        for (param, code_name) in self.params.iter_mut().zip(&self.meta.code.paramnames) {
            if param.name.is_none() {
                param.name = Some(code_name.clone());
            }
        }
    }

    pub fn set_memberof(&mut self, owner: &str) {
        let owner = name::strip_global_prefix(owner);
        let owner = match owner.strip_suffix(".prototype") {
            Some(stripped) => format!("{stripped}#"),
            None => owner.replace(".prototype.", "#"),
        };
        self.memberof = (!owner.is_empty()).then_some(owner);
    }

    /// Sets the longname, adding the kind's namespace when it has one.
    pub fn set_longname(&mut self, longname: &str, dictionary: &Dictionary) {
        self.longname = name::strip_global_prefix(longname);
        if let Some(kind) = self.kind {
            if dictionary.is_namespace(kind.as_str()) {
                self.longname = name::apply_namespace(&self.longname, kind.as_str());
            }
        }
    }

    pub fn set_scope(&mut self, scope: &str) -> Result<(), DocletError> {
        self.scope = Some(scope.parse()?);
        Ok(())
    }

    pub fn borrow(&mut self, from: &str, target: Option<&str>) {
        self.borrows.push(BorrowDirective {
            from: from.to_string(),
            target: target.map(str::to_string),
        });
    }

    pub fn mix(&mut self, source: &str) {
        self.mixes.push(source.to_string());
    }

    pub fn augment(&mut self, base: &str) {
        self.augments.push(base.to_string());
    }
}
