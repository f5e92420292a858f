//! Inheritance, mixins and interface implementation.
//!
//! Each pass builds a dependency graph over the class-like doclets, sorts it
//! so that ancestors come before descendants, and then copies members down
//! the graph. Copies are added to the index; the ancestors' own doclets are
//! left untouched.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::doclet::{Doclet, Kind};
use crate::error::{DocletError, Location};
use crate::index::{DocletId, DocletIndex};
use crate::name::{self, Scope};

/// Kinds that can appear as nodes of a dependency graph.
const DEPENDENCY_KINDS: [Kind; 4] = [Kind::Class, Kind::External, Kind::Interface, Kind::Mixin];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Augments,
    Mixes,
    Implements,
}

impl Relation {
    fn targets(self, doclet: &Doclet) -> &[String] {
        match self {
            Relation::Augments => &doclet.augments,
            Relation::Mixes => &doclet.mixes,
            Relation::Implements => &doclet.implements,
        }
    }
}

// -- Dependency graph -------------------------------------------------------------

/// Longname of each class-like doclet mapped to the longnames it depends on.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: IndexMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Fails when a doclet depends on a longname that is not itself a node.
    pub fn build(index: &DocletIndex, relation: Relation) -> Result<DependencyGraph, DocletError> {
        let mut edges: IndexMap<String, Vec<String>> = IndexMap::new();
        // Where each dependency was declared, for reporting.
        let mut declared_at: HashMap<(String, String), Location> = HashMap::new();
        for (_, doclet) in index.iter() {
            if !doclet.kind.is_some_and(|k| DEPENDENCY_KINDS.contains(&k)) {
                continue;
            }
            let deps = edges.entry(doclet.longname.clone()).or_default();
            for target in relation.targets(doclet) {
                if !deps.contains(target) {
                    deps.push(target.clone());
                }
                declared_at
                    .entry((doclet.longname.clone(), target.clone()))
                    .or_insert_with(|| doclet.location());
            }
        }

        for (dependent, deps) in &edges {
            if let Some(dependency) = deps.iter().find(|d| !edges.contains_key(d.as_str())) {
                let location = declared_at
                    .remove(&(dependent.clone(), dependency.clone()))
                    .unwrap_or_default();
                return Err(DocletError::MissingDependency {
                    dependent: dependent.clone(),
                    dependency: dependency.clone(),
                    location,
                });
            }
        }
        Ok(DependencyGraph { edges })
    }

    /// Depth-first post-order: every node appears once, after everything it
    /// depends on.
    pub fn sort(&self) -> Vec<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut sorted = Vec::with_capacity(self.edges.len());

        for root in self.edges.keys() {
            if !visited.insert(root.as_str()) {
                continue;
            }
            let mut stack: Vec<(&str, usize)> = vec![(root.as_str(), 0)];
            while let Some((node, next)) = stack.last_mut() {
                let deps = self.edges.get(*node).map_or(&[][..], Vec::as_slice);
                match deps.get(*next) {
                    Some(dep) => {
                        *next += 1;
                        if visited.insert(dep.as_str()) {
                            stack.push((dep.as_str(), 0));
                        }
                    }
                    None => {
                        sorted.push(node.to_string());
                        stack.pop();
                    }
                }
            }
        }
        sorted
    }
}

// -- Passes ---------------------------------------------------------------------------

/// Runs every pass: mixins, implementations, inheritance, and implementations
/// again for interfaces picked up through inheritance.
///
/// All graphs are checked before anything is added, so a missing dependency
/// leaves the index as it was.
pub fn augment_all(index: &mut DocletIndex) -> Result<(), DocletError> {
    for relation in [Relation::Mixes, Relation::Implements, Relation::Augments] {
        DependencyGraph::build(index, relation)?;
    }
    add_mixed_in(index)?;
    add_implemented(index)?;
    add_inherited(index)?;
    add_implemented(index)
}

/// Copies ancestors' documented instance members onto each descendant.
pub fn add_inherited(index: &mut DocletIndex) -> Result<(), DocletError> {
    augment(index, Relation::Augments, inherited_additions)
}

/// Copies each mixin's members onto the doclets that mix it in, as instance members.
pub fn add_mixed_in(index: &mut DocletIndex) -> Result<(), DocletError> {
    augment(index, Relation::Mixes, mixed_in_additions)
}

/// Links implementations to the interface members they implement.
pub fn add_implemented(index: &mut DocletIndex) -> Result<(), DocletError> {
    augment(index, Relation::Implements, implemented_additions)
}

type Finder = fn(&mut DocletIndex, DocletId) -> Vec<Doclet>;

fn augment(index: &mut DocletIndex, relation: Relation, finder: Finder) -> Result<(), DocletError> {
    let graph = DependencyGraph::build(index, relation)?;
    for longname in graph.sort() {
        // Doclets sharing a longname are one symbol: gather their additions
        // first so one doclet's copies never count as another's members.
        let mut additions: IndexMap<String, Doclet> = IndexMap::new();
        for id in index.lookup(&longname).to_vec() {
            for doclet in finder(index, id) {
                additions.insert(doclet.longname.clone(), doclet);
            }
        }
        if !additions.is_empty() {
            debug!(%longname, ?relation, count = additions.len(), "adding members");
        }
        for doclet in additions.into_values() {
            index.insert(doclet);
        }
    }
    Ok(())
}

fn is_documented(doclet: &Doclet) -> bool {
    !doclet.undocumented && !doclet.ignore
}

fn documented_ids(index: &DocletIndex, longname: &str) -> Vec<DocletId> {
    index
        .lookup(longname)
        .iter()
        .copied()
        .filter(|id| is_documented(&index[*id]))
        .collect()
}

fn explicitly_inherits(index: &DocletIndex, ids: &[DocletId]) -> bool {
    ids.iter().any(|id| index[*id].inheritdoc || index[*id].is_override)
}

fn change_memberof(longname: &str, memberof: &str) -> String {
    let mut parts = name::shorten(longname);
    parts.memberof = memberof.to_string();
    name::combine(&parts)
}

/// Marks the existing doclets ignored and clears the flags the copy no longer needs.
fn replace_with_copy(index: &mut DocletIndex, existing: &[DocletId], copy: &mut Doclet) {
    for id in existing {
        if let Some(doclet) = index.get_mut(*id) {
            doclet.ignore = true;
        }
    }
    copy.is_virtual = false;
    copy.inheritdoc = false;
    copy.is_override = false;
}

fn sources(index: &DocletIndex, owner: &str, scopes: Option<&[Scope]>) -> Vec<Doclet> {
    index
        .members_of(owner, scopes)
        .into_iter()
        .map(|id| index[id].clone())
        .filter(|d| !d.undocumented)
        .collect()
}

fn inherited_additions(index: &mut DocletIndex, id: DocletId) -> Vec<Doclet> {
    let descendant = &index[id];
    if !matches!(descendant.kind, Some(Kind::Class | Kind::Interface)) {
        return Vec::new();
    }
    let owner = descendant.longname.clone();
    let parents = descendant.augments.clone();

    let mut additions: IndexMap<String, Doclet> = IndexMap::new();
    for parent in &parents {
        for ancestor in sources(index, parent, Some(&[Scope::Instance])) {
            let mut member = ancestor.clone();
            if !member.inherited {
                member.inherits = Some(member.longname.clone());
            }
            member.inherited = true;
            member.memberof = Some(owner.clone());
            member.longname = change_memberof(&ancestor.longname, &owner);

            let existing = documented_ids(index, &member.longname);
            member.overrides = (!existing.is_empty()).then(|| ancestor.longname.clone());

            if existing.is_empty() {
                additions.insert(member.longname.clone(), member);
            } else if explicitly_inherits(index, &existing) {
                replace_with_copy(index, &existing, &mut member);
                additions.insert(member.longname.clone(), member);
            } else {
                for id in existing {
                    if let Some(doclet) = index.get_mut(id) {
                        doclet.overrides = Some(ancestor.longname.clone());
                    }
                }
            }
        }
    }
    additions.into_values().collect()
}

fn mixed_in_additions(index: &mut DocletIndex, id: DocletId) -> Vec<Doclet> {
    let consumer = &index[id];
    let owner = consumer.longname.clone();
    let mixins = consumer.mixes.clone();

    let mut additions: IndexMap<String, Doclet> = IndexMap::new();
    for mixin in &mixins {
        for original in sources(index, mixin, None) {
            let mut member = original.clone();
            let short = name::shorten(&original.longname).name;
            member.mixes.retain(|m| name::shorten(m).name != short);
            member.mixes.push(original.longname.clone());
            member.mixed = true;

            let mut parts = name::shorten(&original.longname);
            parts.memberof = owner.clone();
            parts.scope = Scope::Instance;
            member.longname = name::combine(&parts);
            member.memberof = Some(owner.clone());
            member.scope = Some(Scope::Instance);

            additions.insert(member.longname.clone(), member);
        }
    }
    additions.into_values().collect()
}

fn implemented_additions(index: &mut DocletIndex, id: DocletId) -> Vec<Doclet> {
    let implementer = &index[id];
    let owner = implementer.longname.clone();
    let interfaces = implementer.implements.clone();

    let mut additions: IndexMap<String, Doclet> = IndexMap::new();
    for interface in &interfaces {
        for declared in sources(index, interface, Some(&[Scope::Instance])) {
            let mut member = declared.clone();
            member.memberof = Some(owner.clone());
            member.longname = change_memberof(&declared.longname, &owner);
            if !member.implements.contains(&declared.longname) {
                member.implements.push(declared.longname.clone());
            }

            // Nothing to link when the implementer does not define the member at all.
            if !index.contains(&member.longname) {
                continue;
            }

            let existing = documented_ids(index, &member.longname);
            if existing.is_empty() {
                additions.insert(member.longname.clone(), member);
            } else if explicitly_inherits(index, &existing) {
                replace_with_copy(index, &existing, &mut member);
                additions.insert(member.longname.clone(), member);
            } else {
                for id in existing {
                    if let Some(doclet) = index.get_mut(id) {
                        doclet.implements = member.implements.clone();
                    }
                }
            }
        }
    }
    additions.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(longname: &str, augments: &[&str]) -> Doclet {
        Doclet {
            name: longname.to_string(),
            longname: longname.to_string(),
            kind: Some(Kind::Class),
            augments: augments.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn member(owner: &str, name: &str, scope: Scope) -> Doclet {
        Doclet {
            name: name.to_string(),
            longname: format!("{owner}{}{name}", scope.punctuation()),
            memberof: Some(owner.to_string()),
            scope: Some(scope),
            kind: Some(Kind::Function),
            ..Default::default()
        }
    }

    fn longnames(index: &DocletIndex) -> Vec<&str> {
        index.doclets().iter().map(|d| d.longname.as_str()).collect()
    }

    #[test]
    fn sort_puts_ancestors_first() {
        let mut index = DocletIndex::new();
        index.insert(class("C", &["B"]));
        index.insert(class("B", &["A"]));
        index.insert(class("A", &[]));
        let sorted = DependencyGraph::build(&index, Relation::Augments).unwrap().sort();
        assert_eq!(sorted, ["A", "B", "C"]);
    }

    #[test]
    fn sort_handles_deep_chains() {
        let mut index = DocletIndex::new();
        for i in (1..5000).rev() {
            index.insert(class(&format!("C{i}"), &[format!("C{}", i - 1).as_str()]));
        }
        index.insert(class("C0", &[]));
        let sorted = DependencyGraph::build(&index, Relation::Augments).unwrap().sort();
        assert_eq!(sorted.len(), 5000);
        assert_eq!(sorted[0], "C0");
        assert_eq!(sorted[4999], "C4999");
    }

    #[test]
    fn missing_parent_aborts_before_changes() {
        let mut index = DocletIndex::new();
        index.insert(class("A", &[]));
        index.insert(member("A", "run", Scope::Instance));
        index.insert(class("B", &["A"]));
        let mut orphan = class("C", &["Ghost"]);
        orphan.meta.filename = Some("widget.js".to_string());
        orphan.meta.lineno = Some(12);
        index.insert(orphan);

        let err = augment_all(&mut index).unwrap_err();
        assert_eq!(
            err,
            DocletError::MissingDependency {
                dependent: "C".to_string(),
                dependency: "Ghost".to_string(),
                location: Location {
                    file: Some("widget.js".to_string()),
                    line: Some(12),
                },
            }
        );
        assert!(err.to_string().contains("widget.js, line 12"));
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn duplicate_descendants_inherit_once() {
        let mut index = DocletIndex::new();
        index.insert(class("A", &[]));
        index.insert(member("A", "run", Scope::Instance));
        index.insert(class("B", &["A"]));
        index.insert(class("B", &["A"]));
        add_inherited(&mut index).unwrap();

        let runs: Vec<_> = index.get_by_longname("B#run").collect();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].inherited);
        assert_eq!(runs[0].overrides, None);
    }

    #[test]
    fn member_less_parent_is_fine() {
        let mut index = DocletIndex::new();
        index.insert(class("A", &[]));
        index.insert(class("B", &["A"]));
        assert!(add_inherited(&mut index).is_ok());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn inherits_instance_members_only() {
        let mut index = DocletIndex::new();
        index.insert(class("A", &[]));
        index.insert(member("A", "run", Scope::Instance));
        index.insert(member("A", "create", Scope::Static));
        index.insert(class("B", &["A"]));
        add_inherited(&mut index).unwrap();

        let inherited = index.get_by_longname("B#run").next().unwrap();
        assert!(inherited.inherited);
        assert_eq!(inherited.inherits.as_deref(), Some("A#run"));
        assert_eq!(inherited.memberof.as_deref(), Some("B"));
        assert!(!index.contains("B.create"));
        assert!(!index.get_by_longname("A#run").next().unwrap().inherited);
    }

    #[test]
    fn documented_override_is_kept() {
        let mut index = DocletIndex::new();
        index.insert(class("A", &[]));
        index.insert(member("A", "run", Scope::Instance));
        index.insert(class("B", &["A"]));
        index.insert(member("B", "run", Scope::Instance));
        add_inherited(&mut index).unwrap();

        let own: Vec<_> = index.get_by_longname("B#run").collect();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].overrides.as_deref(), Some("A#run"));
        assert!(!own[0].inherited);
    }

    #[test]
    fn inheritdoc_takes_ancestor_docs() {
        let mut index = DocletIndex::new();
        index.insert(class("A", &[]));
        let mut run = member("A", "run", Scope::Instance);
        run.description = Some("Runs.".to_string());
        index.insert(run);
        index.insert(class("B", &["A"]));
        let mut own = member("B", "run", Scope::Instance);
        own.inheritdoc = true;
        index.insert(own);
        add_inherited(&mut index).unwrap();

        let docs: Vec<_> = index.get_by_longname("B#run").collect();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].ignore);
        assert!(docs[1].inherited);
        assert_eq!(docs[1].description.as_deref(), Some("Runs."));
        assert_eq!(docs[1].overrides.as_deref(), Some("A#run"));
    }

    #[test]
    fn undocumented_ancestor_members_are_skipped() {
        let mut index = DocletIndex::new();
        index.insert(class("A", &[]));
        let mut hidden = member("A", "hidden", Scope::Instance);
        hidden.undocumented = true;
        index.insert(hidden);
        index.insert(class("B", &["A"]));
        add_inherited(&mut index).unwrap();
        assert!(!index.contains("B#hidden"));
    }

    #[test]
    fn last_listed_parent_wins() {
        let mut index = DocletIndex::new();
        index.insert(class("A", &[]));
        index.insert(member("A", "run", Scope::Instance));
        index.insert(class("Z", &[]));
        index.insert(member("Z", "run", Scope::Instance));
        index.insert(class("B", &["A", "Z"]));
        add_inherited(&mut index).unwrap();

        let copies: Vec<_> = index.get_by_longname("B#run").collect();
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].inherits.as_deref(), Some("Z#run"));
    }

    #[test]
    fn mixin_members_become_instance() {
        let mut index = DocletIndex::new();
        index.insert(Doclet {
            name: "Eventful".to_string(),
            longname: "Eventful".to_string(),
            kind: Some(Kind::Mixin),
            ..Default::default()
        });
        index.insert(member("Eventful", "on", Scope::Static));
        index.insert(member("Eventful", "emit", Scope::Instance));
        let mut widget = class("Widget", &[]);
        widget.mixes = vec!["Eventful".to_string()];
        index.insert(widget);
        add_mixed_in(&mut index).unwrap();

        for longname in ["Widget#on", "Widget#emit"] {
            let mixed = index.get_by_longname(longname).next().unwrap();
            assert_eq!(mixed.scope, Some(Scope::Instance));
            assert!(mixed.mixed);
        }
        assert_eq!(
            index.get_by_longname("Widget#on").next().unwrap().mixes,
            ["Eventful.on"]
        );
        assert!(longnames(&index).contains(&"Eventful.on"));
    }

    #[test]
    fn implementations_are_linked() {
        let mut index = DocletIndex::new();
        index.insert(Doclet {
            name: "Drawable".to_string(),
            longname: "Drawable".to_string(),
            kind: Some(Kind::Interface),
            ..Default::default()
        });
        let mut draw = member("Drawable", "draw", Scope::Instance);
        draw.description = Some("Draws.".to_string());
        index.insert(draw);
        index.insert(member("Drawable", "erase", Scope::Instance));
        index.insert(member("Drawable", "resize", Scope::Instance));

        let mut shape = class("Shape", &[]);
        shape.implements = vec!["Drawable".to_string()];
        index.insert(shape);
        index.insert(member("Shape", "draw", Scope::Instance));
        let mut erase = member("Shape", "erase", Scope::Instance);
        erase.undocumented = true;
        index.insert(erase);

        add_implemented(&mut index).unwrap();

        let draw = index.get_by_longname("Shape#draw").next().unwrap();
        assert_eq!(draw.implements, ["Drawable#draw"]);
        assert_eq!(draw.description, None);

        let erase: Vec<_> = index.get_by_longname("Shape#erase").collect();
        assert_eq!(erase.len(), 2);
        assert_eq!(erase[1].implements, ["Drawable#erase"]);
        assert!(!index.contains("Shape#resize"));
    }
}
