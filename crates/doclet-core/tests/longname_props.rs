//! Property tests for longname splitting and reassembly.

use doclet_core::name::{combine, shorten};
use doclet_core::Scope;
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z_$][A-Za-z0-9_$]{0,6}"
}

fn delimiter() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['.', '#', '~'])
}

/// `a.b#c~d`, with an optional `(variation)` on the last segment.
fn longname() -> impl Strategy<Value = String> {
    (
        identifier(),
        prop::collection::vec((delimiter(), identifier()), 0..4),
        prop::option::of("[a-z0-9]{1,4}"),
    )
        .prop_map(|(head, rest, variation)| {
            let mut out = head;
            for (d, segment) in rest {
                out.push(d);
                out.push_str(&segment);
            }
            if let Some(variation) = variation {
                out.push_str(&format!("({variation})"));
            }
            out
        })
}

proptest! {
    /// Splitting then reassembling gives back the same longname.
    #[test]
    fn prop_shorten_combine_roundtrip(longname in longname()) {
        let parts = shorten(&longname);
        prop_assert_eq!(combine(&parts), longname);
    }

    /// The last delimiter decides the scope.
    #[test]
    fn prop_scope_from_last_delimiter(owner in identifier(), d in delimiter(), name in identifier()) {
        let parts = shorten(&format!("{owner}{d}{name}"));
        prop_assert_eq!(parts.scope, Scope::from_punctuation(d).unwrap());
        prop_assert_eq!(parts.memberof, owner);
        prop_assert_eq!(parts.name, name);
    }

    /// Delimiters inside a quoted name never split it.
    #[test]
    fn prop_quoted_name_is_atomic(
        owner in identifier(),
        d in delimiter(),
        inner in "[a-z]{1,3}[.#~][a-z.#~]{0,5}",
    ) {
        let quoted = format!("\"{inner}\"");
        let parts = shorten(&format!("{owner}{d}{quoted}"));
        prop_assert_eq!(parts.name, quoted);
        prop_assert_eq!(parts.memberof, owner);
    }

    /// A bare quoted name is a global symbol, whatever it contains.
    #[test]
    fn prop_quoted_global(inner in "[a-z.#~]{1,8}") {
        let quoted = format!("\"{inner}\"");
        let parts = shorten(&quoted);
        prop_assert_eq!(parts.scope, Scope::Global);
        prop_assert_eq!(parts.name, quoted);
    }
}
