//! One documentation run: comments in, resolved doclets out.
//!
//! A [`Session`] owns everything that lives for the length of a run: the tag
//! dictionary, the longname index, the overload tracker and the plugins.
//! Feed it comments file by file, then call [`Session::finish`] to resolve
//! borrows and inheritance.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error};

use crate::augment;
use crate::borrow;
use crate::comment;
use crate::config::Config;
use crate::doclet::{Doclet, Kind, RawDoclet};
use crate::error::DocletError;
use crate::index::{DocletId, DocletIndex};
use crate::name::{self, Scope};
use crate::overload::OverloadTracker;
use crate::plugin::{NewDoclet, ParseBegin, Plugin};
use crate::tag::dictionary::Dictionary;

/// Placeholder alias set by `@constructs` without a value.
pub const THIS_CLASS: &str = "{@thisClass}";

/// Name the source scanner gives symbols it had to invent.
const DUMMY_NAME: &str = "____";

static RE_EXPORTS_OR_THIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?:module\.)?exports|this)(\.|$)").unwrap());
static RE_EXPORTS_OR_THIS_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(exports|this)(\.|$)").unwrap());
static RE_PROTOTYPE_OWNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)(\.prototype|#)$").unwrap());

pub struct Session {
    dictionary: Dictionary,
    index: DocletIndex,
    overloads: OverloadTracker,
    plugins: Vec<Box<dyn Plugin>>,
    /// Longname of the last `@module` seen in the current file.
    current_module: Option<String>,
}

impl Session {
    pub fn new(dictionary: Dictionary) -> Session {
        Session {
            dictionary,
            index: DocletIndex::new(),
            overloads: OverloadTracker::new(),
            plugins: Vec::new(),
            current_module: None,
        }
    }

    pub fn from_config(config: &Config) -> Session {
        Session::new(Dictionary::from_config(&config.tags))
    }

    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Session {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn index(&self) -> &DocletIndex {
        &self.index
    }

    pub fn begin(&mut self, source_files: &[String]) {
        debug!(files = source_files.len(), "parse begin");
        let event = ParseBegin { source_files };
        for plugin in &mut self.plugins {
            plugin.parse_begin(&event);
        }
    }

    pub fn file_begin(&mut self, filename: &str) {
        debug!(file = filename, "file begin");
        self.current_module = None;
    }

    pub fn file_complete(&mut self) {
        self.current_module = None;
    }

    /// Turns one comment into doclets (several when it uses `@also`) and
    /// indexes them. Returns the ids of the doclets that were kept.
    pub fn add_comment(&mut self, raw: &RawDoclet) -> Vec<DocletId> {
        let parts = comment::split_also(&raw.comment);
        let mut added = Vec::new();
        for part in &parts {
            let doclet = if parts.len() == 1 && !raw.tags.is_empty() {
                Doclet::from_tags(part, &raw.tags, raw.meta.clone(), &self.dictionary)
            } else {
                Doclet::new(part, raw.meta.clone(), &self.dictionary)
            };
            if let Some(doclet) = self.discover(doclet) {
                added.extend(self.add_doclet(doclet));
            }
        }
        added
    }

    /// Gives a doclet its name. Comments that name their symbol are taken as
    /// they are; the rest are named after an alias or the code they precede.
    fn discover(&self, mut doclet: Doclet) -> Option<Doclet> {
        if !doclet.name.is_empty() {
            return Some(doclet);
        }

        if let Some(alias) = doclet.alias.clone() {
            let alias = if alias == THIS_CLASS {
                this_class(&doclet)?
            } else {
                alias
            };
            doclet.alias = Some(alias.clone());
            doclet.add_tag("name", Some(&alias), &self.dictionary);
        } else if let Some(code_name) = doclet.meta.code.name.clone() {
            self.name_from_code(&mut doclet, &code_name);
        } else {
            return None;
        }
        doclet.post_process(&self.dictionary);

        if doclet.memberof.is_none() {
            doclet.scope = Some(Scope::Global);
        }
        Some(doclet)
    }

    fn name_from_code(&self, doclet: &mut Doclet, code_name: &str) {
        let dictionary = &self.dictionary;
        doclet.add_tag("name", Some(code_name), dictionary);
        if doclet.memberof.is_some() {
            return;
        }

        let mut owner: Option<(String, Scope)> = None;
        let prefix = RE_EXPORTS_OR_THIS
            .captures(&doclet.name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        if let Some(prefix) = prefix {
            doclet.name = RE_EXPORTS_OR_THIS_PREFIX.replace(&doclet.name, "").into_owned();
            let module = self.current_module.clone();
            let receiver = doclet.meta.code.receiver.clone();

            owner = match (prefix.as_str(), module) {
                ("exports", Some(module)) => Some((module, Scope::Static)),
                (_, Some(module)) if doclet.name == "module.exports" => {
                    doclet.add_tag("name", Some(&module), dictionary);
                    None
                }
                ("this", module) => receiver
                    .map(|r| (r, Scope::Instance))
                    .or(module.map(|m| (m, Scope::Static))),
                (_, _) => receiver.map(|r| (r, Scope::Static)),
            };

            if let Some((owner, scope)) = &owner {
                doclet.name = if doclet.name.is_empty() {
                    owner.clone()
                } else {
                    format!("{owner}{}{}", scope.punctuation(), doclet.name)
                };
            }
        }

        match owner {
            Some((owner, _)) => doclet.add_tag("memberof", Some(&owner), dictionary),
            None => {
                let Some(module) = self.current_module.as_deref() else {
                    return;
                };
                if !name::shorten(&doclet.name).memberof.is_empty() {
                    return;
                }
                if doclet.scope.is_none() {
                    doclet.add_tag("inner", None, dictionary);
                }
                if doclet.memberof.is_none() && doclet.scope != Some(Scope::Global) {
                    doclet.add_tag("memberof", Some(module), dictionary);
                }
            }
        }
    }

    /// Hands a resolved doclet to the plugins and indexes it unless a plugin
    /// drops it or it documents nothing that can be documented.
    pub fn add_doclet(&mut self, mut doclet: Doclet) -> Option<DocletId> {
        let mut event = NewDoclet::new(&mut doclet);
        for plugin in &mut self.plugins {
            plugin.new_doclet(&mut event);
        }
        let prevented = event.is_prevented();

        if doclet.kind == Some(Kind::Module) {
            self.current_module = Some(doclet.longname.clone());
        }
        if prevented {
            debug!(longname = %doclet.longname, "doclet dropped by plugin");
            return None;
        }
        if is_filtered(&doclet) {
            return None;
        }

        let id = self.index.insert(doclet);
        self.overloads.track(&mut self.index, id);
        Some(id)
    }

    /// Resolves borrows, then inheritance, mixins and implementations.
    pub fn finish(mut self) -> Result<Docset, DocletError> {
        let missing_borrows = borrow::resolve_borrows(&mut self.index);
        if let Err(err) = augment::augment_all(&mut self.index) {
            error!("{err}");
            return Err(err);
        }
        for plugin in &mut self.plugins {
            plugin.parse_complete(self.index.doclets());
        }
        debug!(doclets = self.index.len(), "parse complete");
        Ok(Docset {
            index: self.index,
            missing_borrows,
        })
    }
}

/// Prototype objects and scanner placeholders.
fn is_filtered(doclet: &Doclet) -> bool {
    doclet.longname.ends_with('#') || doclet.meta.code.name.as_deref() == Some(DUMMY_NAME)
}

/// The class a `@constructs` refers to: the owner of `this`, or failing that
/// the symbol itself.
fn this_class(doclet: &Doclet) -> Option<String> {
    let code = &doclet.meta.code;
    let receiver = code.receiver.as_deref().or(code.name.as_deref())?;
    Some(match RE_PROTOTYPE_OWNER.captures(receiver).and_then(|c| c.get(1)) {
        Some(owner) => owner.as_str().to_string(),
        None => receiver.to_string(),
    })
}

/// The finished doclets of a run.
#[derive(Debug, Clone)]
pub struct Docset {
    index: DocletIndex,
    /// `@borrows` directives that were skipped.
    pub missing_borrows: Vec<DocletError>,
}

impl Docset {
    pub fn doclets(&self) -> &[Doclet] {
        self.index.doclets()
    }

    pub fn index(&self) -> &DocletIndex {
        &self.index
    }

    pub fn get_by_longname<'a>(&'a self, longname: &str) -> impl Iterator<Item = &'a Doclet> + 'a {
        self.index.get_by_longname(longname)
    }

    /// Doclets meant for output: not undocumented, not ignored.
    pub fn documented(&self) -> impl Iterator<Item = &Doclet> {
        self.index
            .doclets()
            .iter()
            .filter(|d| !d.undocumented && !d.ignore)
    }

    pub fn into_doclets(self) -> Vec<Doclet> {
        self.index.into_doclets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doclet::Meta;

    fn raw(comment: &str, code_name: Option<&str>) -> RawDoclet {
        let mut meta = Meta {
            filename: Some("soup.js".to_string()),
            lineno: Some(1),
            ..Default::default()
        };
        meta.code.name = code_name.map(str::to_string);
        RawDoclet {
            comment: comment.to_string(),
            meta,
            ..Default::default()
        }
    }

    fn longnames(session: &Session) -> Vec<String> {
        session.index().doclets().iter().map(|d| d.longname.clone()).collect()
    }

    #[test]
    fn named_comment_ignores_code() {
        let mut session = Session::new(Dictionary::default());
        session.add_comment(&raw("/** @function stir */", Some("somethingElse")));
        assert_eq!(longnames(&session), ["stir"]);
    }

    #[test]
    fn code_name_is_used() {
        let mut session = Session::new(Dictionary::default());
        session.add_comment(&raw("/** Heats the soup. */", Some("Soup.prototype.heat")));
        let d = &session.index().doclets()[0];
        assert_eq!(d.longname, "Soup#heat");
        assert_eq!(d.memberof.as_deref(), Some("Soup"));
        assert_eq!(d.description.as_deref(), Some("Heats the soup."));
    }

    #[test]
    fn global_when_no_owner() {
        let mut session = Session::new(Dictionary::default());
        session.add_comment(&raw("/** Helper. */", Some("helper")));
        assert_eq!(session.index().doclets()[0].scope, Some(Scope::Global));
    }

    #[test]
    fn exports_belong_to_module() {
        let mut session = Session::new(Dictionary::default());
        session.file_begin("math.js");
        session.add_comment(&raw("/** @module math */", None));
        session.add_comment(&raw("/** Adds. */", Some("exports.add")));
        session.add_comment(&raw("/** Private. */", Some("clamp")));
        assert_eq!(longnames(&session), ["module:math", "module:math.add", "module:math~clamp"]);

        session.file_complete();
        session.file_begin("other.js");
        session.add_comment(&raw("/** Free. */", Some("clamp")));
        assert_eq!(session.index().doclets()[3].longname, "clamp");
    }

    #[test]
    fn this_uses_receiver() {
        let mut session = Session::new(Dictionary::default());
        let mut comment = raw("/** The level. */", Some("this.level"));
        comment.meta.code.receiver = Some("Soup".to_string());
        session.add_comment(&comment);
        let d = &session.index().doclets()[0];
        assert_eq!(d.longname, "Soup#level");
        assert_eq!(d.scope, Some(Scope::Instance));
    }

    #[test]
    fn constructs_resolves_owner() {
        let mut session = Session::new(Dictionary::default());
        let mut comment = raw("/** @constructs */", Some("initialize"));
        comment.meta.code.receiver = Some("Soup.prototype".to_string());
        session.add_comment(&comment);
        let d = &session.index().doclets()[0];
        assert_eq!(d.longname, "Soup");
        assert_eq!(d.kind, Some(Kind::Class));
    }

    #[test]
    fn prototypes_and_dummies_are_dropped() {
        let mut session = Session::new(Dictionary::default());
        assert!(session.add_comment(&raw("/** Proto. */", Some("Soup.prototype"))).is_empty());
        assert!(session.add_comment(&raw("/** Dummy. */", Some(DUMMY_NAME))).is_empty());
        assert!(session.index().is_empty());
    }

    #[test]
    fn also_makes_several_doclets() {
        let mut session = Session::new(Dictionary::default());
        let ids = session.add_comment(&raw(
            "/**\n * @function Soup#eat\n * @param {string} spoon\n * @also\n * @function Soup#eat\n * @param {number} sips\n */",
            None,
        ));
        assert_eq!(ids.len(), 2);
        assert_eq!(longnames(&session), ["Soup#eat(spoon)", "Soup#eat(sips)"]);
    }

    struct DropPrivate;

    impl Plugin for DropPrivate {
        fn name(&self) -> &str {
            "drop-private"
        }

        fn new_doclet(&mut self, event: &mut NewDoclet<'_>) {
            if event.doclet.name.starts_with('_') {
                event.prevent_default();
            }
        }
    }

    #[test]
    fn plugin_can_drop_doclets() {
        let mut session = Session::new(Dictionary::default()).with_plugin(DropPrivate);
        session.add_comment(&raw("/** Hidden. */", Some("_secret")));
        session.add_comment(&raw("/** Shown. */", Some("visible")));
        assert_eq!(longnames(&session), ["visible"]);
    }

    #[test]
    fn finish_reports_missing_borrows() {
        let mut session = Session::new(Dictionary::default());
        session.add_comment(&raw("/** @class Widget\n * @borrows Foo#bar as #baz */", None));
        let docset = session.finish().unwrap();
        assert_eq!(docset.missing_borrows.len(), 1);
        assert_eq!(docset.doclets().len(), 1);
    }
}
