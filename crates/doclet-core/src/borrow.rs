//! `@borrows` resolution.

use tracing::warn;

use crate::doclet::Doclet;
use crate::error::DocletError;
use crate::index::DocletIndex;
use crate::name::{self, Scope};

/// Copies every borrowed doclet onto its borrower under the new name.
///
/// Runs once over the complete index. The borrowing doclets lose their
/// `borrows` directives; a directive whose source is not indexed produces a
/// warning and no clone. The skipped directives are returned.
pub fn resolve_borrows(index: &mut DocletIndex) -> Vec<DocletError> {
    let mut missing = Vec::new();

    let borrowers: Vec<_> = index.ids().filter(|id| !index[*id].borrows.is_empty()).collect();
    for id in borrowers {
        let Some(borrower) = index.get_mut(id) else {
            continue;
        };
        let directives = std::mem::take(&mut borrower.borrows);
        let owner = borrower.longname.clone();
        let location = borrower.location();

        for directive in directives {
            let target = directive.target.as_deref().unwrap_or(&directive.from);
            let sources: Vec<Doclet> = index.get_by_longname(&directive.from).cloned().collect();
            if sources.is_empty() {
                let err = DocletError::MissingBorrowSource {
                    source_name: directive.from.clone(),
                    target: target.to_string(),
                    location: location.clone(),
                };
                warn!(borrower = %owner, "{err}");
                missing.push(err);
                continue;
            }

            let (scope, short_name) = borrowed_name(target);
            for source in sources {
                index.insert(Doclet {
                    name: short_name.clone(),
                    longname: format!("{owner}{}{short_name}", scope.punctuation()),
                    memberof: Some(owner.clone()),
                    scope: Some(scope),
                    borrowed: true,
                    borrows: Vec::new(),
                    ..source
                });
            }
        }
    }
    missing
}

/// Scope and short name a borrowed member takes on: `#baz` and `Foo#baz` are
/// instance members, anything else is static.
fn borrowed_name(target: &str) -> (Scope, String) {
    let target = match target.strip_prefix("prototype.") {
        Some(rest) => format!("#{rest}"),
        None => target.to_string(),
    };
    match target.rsplit_once('#') {
        Some((_, short)) => (Scope::Instance, short.to_string()),
        None => (Scope::Static, name::shorten(&target).name),
    }
}
