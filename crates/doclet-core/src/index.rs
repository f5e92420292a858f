//! Longname index over the doclets of one run.
//!
//! Doclets live in an append-only arena and are addressed by [`DocletId`];
//! the index maps each longname to the ids carrying it, in insertion order.

use std::ops::Index;

use indexmap::IndexMap;

use crate::doclet::Doclet;
use crate::name::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocletId(usize);

#[derive(Debug, Clone, Default)]
pub struct DocletIndex {
    doclets: Vec<Doclet>,
    by_longname: IndexMap<String, Vec<DocletId>>,
}

impl DocletIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doclet: Doclet) -> DocletId {
        let id = DocletId(self.doclets.len());
        self.by_longname
            .entry(doclet.longname.clone())
            .or_default()
            .push(id);
        self.doclets.push(doclet);
        id
    }

    pub fn len(&self) -> usize {
        self.doclets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doclets.is_empty()
    }

    pub fn get(&self, id: DocletId) -> Option<&Doclet> {
        self.doclets.get(id.0)
    }

    /// Mutable access for fields other than `longname`; use [`rekey`](Self::rekey)
    /// to change that.
    pub fn get_mut(&mut self, id: DocletId) -> Option<&mut Doclet> {
        self.doclets.get_mut(id.0)
    }

    /// Ids of every doclet with this longname, oldest first.
    pub fn lookup(&self, longname: &str) -> &[DocletId] {
        self.by_longname.get(longname).map_or(&[], Vec::as_slice)
    }

    pub fn get_by_longname<'a>(&'a self, longname: &str) -> impl Iterator<Item = &'a Doclet> + 'a {
        let ids = self.lookup(longname);
        ids.iter().map(move |id| &self.doclets[id.0])
    }

    pub fn contains(&self, longname: &str) -> bool {
        !self.lookup(longname).is_empty()
    }

    /// Moves a doclet to a new longname, keeping the index in step.
    pub fn rekey(&mut self, id: DocletId, longname: String) {
        let Some(doclet) = self.doclets.get_mut(id.0) else {
            return;
        };
        let old = std::mem::replace(&mut doclet.longname, longname.clone());
        if let Some(ids) = self.by_longname.get_mut(&old) {
            ids.retain(|i| *i != id);
            if ids.is_empty() {
                self.by_longname.shift_remove(&old);
            }
        }
        self.by_longname.entry(longname).or_default().push(id);
    }

    pub fn ids(&self) -> impl Iterator<Item = DocletId> {
        (0..self.doclets.len()).map(DocletId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocletId, &Doclet)> {
        self.doclets.iter().enumerate().map(|(i, d)| (DocletId(i), d))
    }

    pub fn doclets(&self) -> &[Doclet] {
        &self.doclets
    }

    /// Members of `longname`, optionally restricted to some scopes, in
    /// insertion order.
    pub fn members_of(&self, longname: &str, scopes: Option<&[Scope]>) -> Vec<DocletId> {
        self.iter()
            .filter(|(_, d)| d.memberof.as_deref() == Some(longname))
            .filter(|(_, d)| match scopes {
                Some(scopes) => d.scope.is_some_and(|s| scopes.contains(&s)),
                None => true,
            })
            .map(|(id, _)| id)
            .collect()
    }

    pub fn into_doclets(self) -> Vec<Doclet> {
        self.doclets
    }
}

impl Index<DocletId> for DocletIndex {
    type Output = Doclet;

    fn index(&self, id: DocletId) -> &Doclet {
        &self.doclets[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doclet(longname: &str, memberof: Option<&str>, scope: Option<Scope>) -> Doclet {
        Doclet {
            longname: longname.to_string(),
            memberof: memberof.map(str::to_string),
            scope,
            ..Default::default()
        }
    }

    #[test]
    fn duplicates_keep_insertion_order() {
        let mut index = DocletIndex::new();
        let a = index.insert(doclet("Soup#heat", Some("Soup"), Some(Scope::Instance)));
        let b = index.insert(doclet("Soup#heat", Some("Soup"), Some(Scope::Instance)));
        assert_eq!(index.lookup("Soup#heat"), [a, b]);
        assert_eq!(index.get_by_longname("Soup#heat").count(), 2);
        assert!(index.lookup("Soup#cool").is_empty());
    }

    #[test]
    fn rekey_moves_entry() {
        let mut index = DocletIndex::new();
        let a = index.insert(doclet("Soup#heat", Some("Soup"), Some(Scope::Instance)));
        index.rekey(a, "Soup#heat(1)".to_string());
        assert!(!index.contains("Soup#heat"));
        assert_eq!(index.lookup("Soup#heat(1)"), [a]);
        assert_eq!(index[a].longname, "Soup#heat(1)");
    }

    #[test]
    fn members_by_scope() {
        let mut index = DocletIndex::new();
        index.insert(doclet("Soup", None, None));
        let stir = index.insert(doclet("Soup#stir", Some("Soup"), Some(Scope::Instance)));
        let make = index.insert(doclet("Soup.make", Some("Soup"), Some(Scope::Static)));
        assert_eq!(index.members_of("Soup", Some(&[Scope::Instance])), [stir]);
        assert_eq!(index.members_of("Soup", None), [stir, make]);
    }
}
