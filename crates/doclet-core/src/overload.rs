//! Variations for overloaded functions.
//!
//! When a second function doclet shows up under a longname that is already
//! taken, both get a variation: their own `@variation` if those differ, else
//! their parameter lists (`bar, ...baz`), else sequential numbers. Once a base
//! longname has gone numeric it stays numeric for the rest of the run.

use std::collections::HashMap;

use tracing::debug;

use crate::doclet::{Doclet, Kind, Param};
use crate::index::{DocletId, DocletIndex};
use crate::name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variations {
    Named,
    Numeric,
}

/// Per-run overload state.
#[derive(Debug, Default)]
pub struct OverloadTracker {
    /// Most recent function doclet per longname.
    latest: HashMap<String, DocletId>,
    /// Base longnames that have been disambiguated, and how.
    overloaded: HashMap<String, Variations>,
}

impl OverloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks a doclet that has just been indexed and gives it, and the doclet
    /// it collides with, unique longnames.
    pub fn track(&mut self, index: &mut DocletIndex, id: DocletId) {
        let Some(doclet) = index.get(id) else {
            return;
        };
        // Constructors and other doclets without an owner keep their longname.
        if doclet.kind != Some(Kind::Function) || doclet.memberof.is_none() {
            return;
        }
        let longname = doclet.longname.clone();

        if let Some(old) = self.latest.get(&longname).copied() {
            self.disambiguate_pair(index, old, id);
            return;
        }

        let mode = self.overloaded.get(&longname).copied();
        match mode {
            Some(mode) => self.disambiguate_late(index, id, &longname, mode),
            None => {
                self.latest.insert(longname, id);
            }
        }
    }

    fn disambiguate_pair(&mut self, index: &mut DocletIndex, old: DocletId, new: DocletId) {
        let shared = index[old].longname.clone();
        let had_variation = index[old].variation.is_some();
        let base = if had_variation {
            name::strip_variation(&shared)
        } else {
            shared.clone()
        };

        let preferred = |d: &Doclet| -> String {
            if had_variation {
                param_variation(&d.params)
            } else {
                d.variation
                    .clone()
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| param_variation(&d.params))
            }
        };

        let numeric = self.overloaded.get(&base) == Some(&Variations::Numeric)
            || index.contains(&numbered(&base, 1));
        let variations = if numeric {
            None
        } else {
            let mut pair = [preferred(&index[old]), preferred(&index[new])];
            if pair[0] == pair[1] {
                pair = [param_variation(&index[old].params), param_variation(&index[new].params)];
            }
            (pair[0] != pair[1]).then_some(pair)
        };

        let (variations, mode) = match variations {
            Some(pair) => (pair, Variations::Named),
            None => {
                let mut counter = 0;
                let first = next_number(index, &base, &mut counter);
                let second = next_number(index, &base, &mut counter);
                ([first, second], Variations::Numeric)
            }
        };
        debug!(longname = %base, ?variations, "disambiguating overloaded function");

        let [old_variation, new_variation] = variations;
        self.latest.remove(&shared);
        let old_longname = apply(index, old, &base, old_variation);
        let new_longname = apply(index, new, &base, new_variation);
        self.latest.insert(old_longname, old);
        self.latest.insert(new_longname, new);
        self.record(base, mode);
    }

    /// A further overload of a base longname whose earlier overloads already
    /// carry variations.
    fn disambiguate_late(&mut self, index: &mut DocletIndex, id: DocletId, base: &str, mode: Variations) {
        let named = match mode {
            Variations::Named => {
                let doclet = &index[id];
                let variation = doclet
                    .variation
                    .clone()
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| param_variation(&doclet.params));
                (!index.contains(&format!("{base}({variation})"))).then_some(variation)
            }
            Variations::Numeric => None,
        };

        let (variation, mode) = match named {
            Some(variation) => (variation, Variations::Named),
            None => {
                let mut counter = 0;
                (next_number(index, base, &mut counter), Variations::Numeric)
            }
        };
        debug!(longname = %base, %variation, "disambiguating overloaded function");

        let longname = apply(index, id, base, variation);
        self.latest.insert(longname, id);
        self.record(base.to_string(), mode);
    }

    fn record(&mut self, base: String, mode: Variations) {
        let entry = self.overloaded.entry(base).or_insert(mode);
        if mode == Variations::Numeric {
            *entry = Variations::Numeric;
        }
    }
}

/// `bar, ...baz` for `@param bar` and a repeatable `@param baz`.
pub fn param_variation(params: &[Param]) -> String {
    params
        .iter()
        .filter_map(|param| {
            let name = param.name.as_deref().unwrap_or_default();
            let name = if param.variable == Some(true) {
                format!("...{name}")
            } else {
                name.to_string()
            };
            (!name.is_empty()).then_some(name)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn numbered(base: &str, n: usize) -> String {
    format!("{base}({n})")
}

fn next_number(index: &DocletIndex, base: &str, counter: &mut usize) -> String {
    loop {
        *counter += 1;
        if !index.contains(&numbered(base, *counter)) {
            return counter.to_string();
        }
    }
}

fn apply(index: &mut DocletIndex, id: DocletId, base: &str, variation: String) -> String {
    let longname = format!("{base}({variation})");
    index.rekey(id, longname.clone());
    if let Some(doclet) = index.get_mut(id) {
        doclet.variation = Some(variation);
    }
    longname
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Scope;

    fn method(longname: &str, params: &[(&str, bool)]) -> Doclet {
        let parts = name::shorten(longname);
        Doclet {
            name: parts.name,
            longname: longname.to_string(),
            memberof: Some(parts.memberof),
            scope: Some(Scope::Instance),
            kind: Some(Kind::Function),
            params: params
                .iter()
                .map(|(name, variable)| Param {
                    name: Some(name.to_string()),
                    variable: variable.then_some(true),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn add(index: &mut DocletIndex, tracker: &mut OverloadTracker, doclet: Doclet) -> DocletId {
        let id = index.insert(doclet);
        tracker.track(index, id);
        id
    }

    #[test]
    fn param_names() {
        let d = method("Soup#eat", &[("bar", false), ("baz", true)]);
        assert_eq!(param_variation(&d.params), "bar, ...baz");
        assert_eq!(param_variation(&[]), "");
    }

    #[test]
    fn single_function_untouched() {
        let mut index = DocletIndex::new();
        let mut tracker = OverloadTracker::new();
        let id = add(&mut index, &mut tracker, method("Soup#stir", &[]));
        assert_eq!(index[id].longname, "Soup#stir");
        assert_eq!(index[id].variation, None);
    }

    #[test]
    fn distinct_params_become_variations() {
        let mut index = DocletIndex::new();
        let mut tracker = OverloadTracker::new();
        let a = add(&mut index, &mut tracker, method("Soup#slurp", &[]));
        let b = add(&mut index, &mut tracker, method("Soup#slurp", &[("dBA", false)]));
        assert_eq!(index[a].longname, "Soup#slurp()");
        assert_eq!(index[a].variation.as_deref(), Some(""));
        assert_eq!(index[b].longname, "Soup#slurp(dBA)");
        assert!(!index.contains("Soup#slurp"));
    }

    #[test]
    fn manual_variations_preserved_when_distinct() {
        let mut index = DocletIndex::new();
        let mut tracker = OverloadTracker::new();
        let a = add(&mut index, &mut tracker, method("Soup#pour", &[("x", false)]));
        let mut second = method("Soup#pour", &[("y", false)]);
        second.variation = Some("fast".to_string());
        let b = add(&mut index, &mut tracker, second);
        assert_eq!(index[a].longname, "Soup#pour(x)");
        assert_eq!(index[b].longname, "Soup#pour(fast)");
    }

    #[test]
    fn identical_params_number_from_one() {
        let mut index = DocletIndex::new();
        let mut tracker = OverloadTracker::new();
        let ids: Vec<_> = (0..3)
            .map(|_| add(&mut index, &mut tracker, method("Soup#heat", &[("degrees", false)])))
            .collect();
        let longnames: Vec<_> = ids.iter().map(|id| index[*id].longname.as_str()).collect();
        assert_eq!(longnames, ["Soup#heat(1)", "Soup#heat(2)", "Soup#heat(3)"]);
    }

    #[test]
    fn numeric_skips_existing_suffix() {
        let mut index = DocletIndex::new();
        let mut tracker = OverloadTracker::new();
        let mut manual = method("Soup#cool(2)", &[]);
        manual.variation = Some("2".to_string());
        index.insert(manual);
        let a = add(&mut index, &mut tracker, method("Soup#cool", &[("x", false)]));
        let b = add(&mut index, &mut tracker, method("Soup#cool", &[("x", false)]));
        assert_eq!(index[a].longname, "Soup#cool(1)");
        assert_eq!(index[b].longname, "Soup#cool(3)");
    }

    #[test]
    fn global_functions_are_left_alone() {
        let mut index = DocletIndex::new();
        let mut tracker = OverloadTracker::new();
        let mut a = method("helper", &[]);
        a.memberof = None;
        let mut b = a.clone();
        b.params.push(Param {
            name: Some("x".to_string()),
            ..Default::default()
        });
        let a = add(&mut index, &mut tracker, a);
        let b = add(&mut index, &mut tracker, b);
        assert_eq!(index[a].longname, "helper");
        assert_eq!(index[b].longname, "helper");
    }
}
