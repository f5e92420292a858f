//! Longname algebra.
//!
//! A longname is `memberof + punctuation(scope) + name + ("(" variation ")")`.
//! Splitting is done on a token stream rather than on the raw string so that
//! quoted segments (`"a.b"`, `'a#b'`, `["a~b"]`) and parenthesised groups are
//! never cut at the scope delimiters they contain.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::doclet::Doclet;
use crate::error::DocletError;
use crate::tag::dictionary::Dictionary;

/// Pseudo-owner of global symbols.
pub const GLOBAL: &str = "<global>";
/// Name given to symbols that have none.
pub const ANONYMOUS: &str = "<anonymous>";
pub const MODULE_NAMESPACE: &str = "module:";

static RE_NAMESPACED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+?:.+$").unwrap());
static RE_NAMESPACE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+:").unwrap());
static RE_GLOBAL_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<global>\.?").unwrap());

// -- Scope ------------------------------------------------------------------

/// Relationship between a symbol and its owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Global,
    Static,
    Inner,
    Instance,
}

impl Scope {
    pub fn punctuation(self) -> &'static str {
        match self {
            Scope::Global => "",
            Scope::Static => ".",
            Scope::Inner => "~",
            Scope::Instance => "#",
        }
    }

    pub fn from_punctuation(c: char) -> Option<Scope> {
        match c {
            '.' => Some(Scope::Static),
            '~' => Some(Scope::Inner),
            '#' => Some(Scope::Instance),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Static => "static",
            Scope::Inner => "inner",
            Scope::Instance => "instance",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = DocletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Scope::Global),
            "static" => Ok(Scope::Static),
            "inner" => Ok(Scope::Inner),
            "instance" => Ok(Scope::Instance),
            other => Err(DocletError::InvalidScope(other.to_string())),
        }
    }
}

fn is_scope_punctuation(c: char) -> bool {
    Scope::from_punctuation(c).is_some()
}

// -- Tokenizer ----------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Text,
    Quoted,
    Delimiter(char),
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

/// Byte offsets of every `(` that has a matching `)` outside quotes.
fn matched_parens(chars: &[(usize, char)]) -> Vec<usize> {
    let mut open = Vec::new();
    let mut matched = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];
        match c {
            '\\' => i += 1,
            '"' | '\'' => {
                if let Some(close) = closing_quote(chars, i) {
                    i = close;
                }
            }
            '(' => open.push(pos),
            ')' => {
                if let Some(start) = open.pop() {
                    matched.push(start);
                }
            }
            _ => {}
        }
        i += 1;
    }
    matched
}

/// Index (into `chars`) of the quote closing the one at `open`.
fn closing_quote(chars: &[(usize, char)], open: usize) -> Option<usize> {
    let quote = chars[open].1;
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i].1 {
            '\\' => i += 1,
            c if c == quote => return (i > open + 1).then_some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let matched = matched_parens(&chars);
    let end_of = |i: usize| chars.get(i).map_or(input.len(), |(pos, _)| *pos);

    let mut tokens: Vec<Token> = Vec::new();
    let push_text = |tokens: &mut Vec<Token>, start: usize, end: usize| match tokens.last_mut() {
        Some(last) if last.kind == TokenKind::Text && last.end == start => last.end = end,
        _ => tokens.push(Token {
            kind: TokenKind::Text,
            start,
            end,
        }),
    };

    let mut depth = 0usize;
    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];
        match c {
            '\\' => {
                let next = (i + 2).min(chars.len());
                push_text(&mut tokens, pos, end_of(next));
                i = next;
                continue;
            }
            '"' | '\'' => {
                if let Some(close) = closing_quote(&chars, i) {
                    tokens.push(Token {
                        kind: TokenKind::Quoted,
                        start: pos,
                        end: end_of(close + 1),
                    });
                    i = close + 1;
                    continue;
                }
                push_text(&mut tokens, pos, end_of(i + 1));
            }
            '(' if matched.contains(&pos) => {
                depth += 1;
                push_text(&mut tokens, pos, end_of(i + 1));
            }
            ')' if depth > 0 => {
                depth -= 1;
                push_text(&mut tokens, pos, end_of(i + 1));
            }
            c if depth == 0 && is_scope_punctuation(c) => tokens.push(Token {
                kind: TokenKind::Delimiter(c),
                start: pos,
                end: pos + 1,
            }),
            _ => push_text(&mut tokens, pos, end_of(i + 1)),
        }
        i += 1;
    }
    tokens
}

// -- Normalisation ------------------------------------------------------------

/// `foo["bar"]` → `foo."bar"`.
fn bracket_to_dot(longname: &str) -> String {
    let chars: Vec<(usize, char)> = longname.char_indices().collect();
    let mut out = String::with_capacity(longname.len());
    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];
        if c == '\\' {
            let next = (i + 2).min(chars.len());
            let end = chars.get(next).map_or(longname.len(), |(p, _)| *p);
            out.push_str(&longname[pos..end]);
            i = next;
            continue;
        }
        let quoted = match c {
            '[' => chars
                .get(i + 1)
                .filter(|(_, q)| *q == '"' || *q == '\'')
                .and_then(|_| closing_quote(&chars, i + 1)),
            '"' | '\'' => {
                // quoted segments outside brackets are copied through untouched
                if let Some(close) = closing_quote(&chars, i) {
                    let end = chars.get(close + 1).map_or(longname.len(), |(p, _)| *p);
                    out.push_str(&longname[pos..end]);
                    i = close + 1;
                    continue;
                }
                None
            }
            _ => None,
        };
        match quoted {
            Some(close) => {
                let start = chars[i + 1].0;
                let end = chars.get(close + 1).map_or(longname.len(), |(p, _)| *p);
                // `Foo#["bar"]` keeps its own delimiter
                if !out.ends_with(|c: char| matches!(c, '.' | '#' | '~')) {
                    out.push('.');
                }
                out.push_str(&longname[start..end]);
                i = close + 1;
                if chars.get(i).is_some_and(|(_, c)| *c == ']') {
                    i += 1;
                }
            }
            None => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Replaces `prototype` path segments with the instance delimiter:
/// `Foo.prototype.bar` → `Foo#bar`, `Foo.prototype` → `Foo#`.
pub fn prototype_to_punc(name: &str) -> String {
    let tokens = tokenize(name);
    let mut out = String::with_capacity(name.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let text = &name[token.start..token.end];
        let after_dot = i == 0 || tokens[i - 1].kind == TokenKind::Delimiter('.');
        if token.kind == TokenKind::Text && text == "prototype" && after_dot {
            if i > 0 {
                out.pop();
            }
            out.push('#');
            if tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::Delimiter('.')) {
                i += 1;
            }
        } else {
            out.push_str(text);
        }
        i += 1;
    }
    out
}

fn normalize(longname: &str) -> String {
    prototype_to_punc(&bracket_to_dot(longname))
}

// -- Longname -------------------------------------------------------------------

/// The four parts of a longname, plus the normalised longname they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Longname {
    pub longname: String,
    pub memberof: String,
    pub scope: Scope,
    pub name: String,
    pub variation: Option<String>,
}

/// Splits a trailing `(variation)` off a name. The group must be non-empty,
/// contain no `)` outside quotes and must not be the whole name.
fn split_variation(name: &str) -> (String, Option<String>) {
    let tokens = tokenize(name);
    let Some(last) = tokens.last() else {
        return (name.to_string(), None);
    };
    if last.kind != TokenKind::Text || !name.ends_with(')') {
        return (name.to_string(), None);
    }

    let close = name.len() - 1;
    let mut open = None;
    'scan: for token in tokens.iter().rev() {
        if token.kind != TokenKind::Text {
            continue;
        }
        let text = &name[token.start..token.end];
        for (offset, c) in text.char_indices().rev() {
            let pos = token.start + offset;
            if pos == close {
                continue;
            }
            match c {
                '(' => {
                    open = Some(pos);
                    break 'scan;
                }
                ')' => break 'scan,
                _ => {}
            }
        }
    }

    match open {
        Some(open) if open > 0 && open + 1 < close => (
            name[..open].to_string(),
            Some(name[open + 1..close].to_string()),
        ),
        _ => (name.to_string(), None),
    }
}

/// Splits a longname into memberof, scope, name and variation.
///
/// The split happens at the last scope delimiter that has text on both
/// sides; a name without one is global.
pub fn shorten(longname: &str) -> Longname {
    let normalized = normalize(longname);
    let tokens = tokenize(&normalized);

    let split = tokens.iter().enumerate().rev().find_map(|(i, t)| match t.kind {
        TokenKind::Delimiter(c) if i > 0 && i + 1 < tokens.len() => Some((t, c)),
        _ => None,
    });

    let (memberof, scope, name) = match split {
        Some((token, c)) => (
            normalized[..token.start].to_string(),
            Scope::from_punctuation(c).unwrap_or_default(),
            &normalized[token.end..],
        ),
        None => (String::new(), Scope::Global, normalized.as_str()),
    };
    let (name, variation) = split_variation(name);

    Longname {
        longname: normalized.clone(),
        memberof,
        scope,
        name,
        variation,
    }
}

/// Like [`shorten`], but the owner is dictated (`@memberof!`) and the name is
/// whatever follows it.
pub fn shorten_with_memberof(longname: &str, forced_memberof: &str) -> Longname {
    let normalized = normalize(longname);
    let rest = normalized.get(forced_memberof.len()..).unwrap_or_default();

    let (memberof, mut scope) = match forced_memberof.chars().last() {
        Some(c) if forced_memberof.len() > 1 && is_scope_punctuation(c) => (
            &forced_memberof[..forced_memberof.len() - 1],
            Scope::from_punctuation(c).unwrap_or_default(),
        ),
        _ => (forced_memberof, Scope::Global),
    };

    let mut name = rest;
    if scope == Scope::Global {
        if let Some(leading) = rest.chars().next().and_then(Scope::from_punctuation) {
            scope = leading;
            name = &rest[1..];
        }
    }
    let (name, variation) = split_variation(name);

    Longname {
        longname: normalized.clone(),
        memberof: memberof.to_string(),
        scope,
        name,
        variation,
    }
}

/// Reassembles a longname from its parts.
pub fn combine(parts: &Longname) -> String {
    let mut out = format!("{}{}{}", parts.memberof, parts.scope.punctuation(), parts.name);
    if let Some(variation) = &parts.variation {
        out.push('(');
        out.push_str(variation);
        out.push(')');
    }
    out
}

/// Prefixes the name segment with `ns:` unless it already carries a namespace.
pub fn apply_namespace(longname: &str, ns: &str) -> String {
    let parts = shorten(longname);
    if RE_NAMESPACED.is_match(&parts.name) {
        return parts.longname;
    }
    let name = format!("{ns}:{}", parts.name);
    combine(&Longname { name, ..parts })
}

pub fn strip_namespace(longname: &str) -> String {
    RE_NAMESPACE_PREFIX.replace(longname, "").into_owned()
}

pub fn strip_global_prefix(longname: &str) -> String {
    RE_GLOBAL_PREFIX.replace(longname, "").into_owned()
}

/// Removes everything from the first unquoted `(` when the name ends in `)`.
pub fn strip_variation(name: &str) -> String {
    if !name.ends_with(')') {
        return name.to_string();
    }
    let first_open = tokenize(name)
        .into_iter()
        .filter(|t| t.kind == TokenKind::Text)
        .find_map(|t| name[t.start..t.end].find('(').map(|offset| t.start + offset));
    match first_open {
        Some(open) => name[..open].to_string(),
        None => name.to_string(),
    }
}

pub fn has_leading_scope(name: &str) -> bool {
    name.chars().next().is_some_and(is_scope_punctuation)
}

pub fn has_trailing_scope(name: &str) -> bool {
    name.chars().last().is_some_and(is_scope_punctuation)
}

/// True when `name` is `memberof` followed by a scope delimiter and more.
pub fn name_is_longname(name: &str, memberof: &str) -> bool {
    !memberof.is_empty()
        && name
            .strip_prefix(memberof)
            .and_then(|rest| rest.chars().next())
            .is_some_and(is_scope_punctuation)
}

/// True when `parent` appears anywhere in `child`'s chain of owners.
pub fn has_ancestor(parent: &str, child: &str) -> bool {
    if parent.is_empty() || parent == child {
        return false;
    }
    let mut memberof = shorten(child).memberof;
    while !memberof.is_empty() {
        if memberof == parent {
            return true;
        }
        memberof = shorten(&memberof).memberof;
    }
    false
}

/// The leading identifier of a name: `foo.Bar#baz` → `foo`.
pub fn get_basename(name: &str) -> Option<String> {
    let base: String = name
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    (!base.is_empty()).then_some(base)
}

/// Splits a tag body into a leading name and the description that follows.
///
/// Bracketed names (`[foo="a b"]`) may contain spaces and nested, quoted
/// brackets. When the brackets do not balance, the name runs to the last `]`.
pub fn split_name_and_description(text: &str) -> (String, String) {
    let text = text.trim_start();
    let name_end = if text.starts_with('[') {
        bracketed_name_end(text)
            .or_else(|| text.rfind(']').map(|i| i + 1))
            .unwrap_or_else(|| first_whitespace(text))
    } else {
        first_whitespace(text)
    };

    let name = text[..name_end].to_string();
    let rest = &text[name_end..];
    let trimmed = rest.trim_start();
    let description = match trimmed.strip_prefix('-') {
        Some(after_dash) if !name.is_empty() => after_dash.trim_start(),
        _ => trimmed,
    };
    (name, description.trim_end().to_string())
}

fn first_whitespace(text: &str) -> usize {
    text.find(char::is_whitespace).unwrap_or(text.len())
}

fn bracketed_name_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

// -- Resolution -------------------------------------------------------------------

/// Computes a doclet's final longname, memberof, scope and name from its raw
/// name, `@memberof`, explicit scope and the enclosing function scope.
///
/// A doclet whose longname is already set to something other than its bare
/// name is left alone.
pub fn resolve(doclet: &mut Doclet, dictionary: &Dictionary) {
    if !doclet.longname.is_empty() && doclet.longname != doclet.name {
        return;
    }

    let mut name = doclet.name.clone();
    if !name.is_empty() && doclet.kind.is_some() {
        name = prototype_to_punc(&name);
    }
    doclet.name = name.clone();

    let mut memberof = doclet.memberof.clone().unwrap_or_default();

    if !name.is_empty() && memberof.is_empty() {
        if let Some(funcscope) = doclet.meta.code.funcscope.as_deref() {
            name = format!("{funcscope}{}{name}", Scope::Inner.punctuation());
            doclet.longname = name.clone();
        }
    }

    let about = if !memberof.is_empty() || doclet.force_memberof {
        memberof = prototype_to_punc(&memberof);
        let forced = doclet.force_memberof.then(|| memberof.clone());
        let split = |longname: &str| match &forced {
            Some(owner) => shorten_with_memberof(longname, owner),
            None => shorten(longname),
        };

        if name.is_empty() {
            None
        } else if (name_is_longname(&name, &memberof) && name != memberof)
            || (name == memberof && name.starts_with(MODULE_NAMESPACE))
        {
            Some(split(&name))
        } else if name == memberof {
            let scope = *doclet.scope.get_or_insert(Scope::Static);
            Some(split(&format!("{memberof}{}{name}", scope.punctuation())))
        } else if has_trailing_scope(&memberof) {
            Some(split(&format!("{memberof}{name}")))
        } else {
            doclet
                .scope
                .map(|scope| split(&format!("{memberof}{}{name}", scope.punctuation())))
        }
    } else {
        Some(shorten(&name))
    };
    let about = about.unwrap_or_default();

    if !about.name.is_empty() {
        doclet.name = about.name.clone();
    }
    if !about.memberof.is_empty() {
        doclet.set_memberof(&about.memberof);
    }
    if !about.longname.is_empty()
        && (doclet.longname.is_empty() || doclet.longname == doclet.name)
    {
        doclet.set_longname(&about.longname, dictionary);
    }

    if doclet.scope == Some(Scope::Global) {
        let name = doclet.name.clone();
        doclet.set_longname(&name, dictionary);
        doclet.memberof = None;
    } else if about.scope != Scope::Global {
        doclet.scope = Some(if about.memberof == GLOBAL {
            Scope::Global
        } else {
            about.scope
        });
    } else if !doclet.name.is_empty() && doclet.longname.is_empty() {
        if let Some(owner) = doclet.memberof.clone() {
            if let Some(leading) = doclet.name.chars().next().and_then(Scope::from_punctuation) {
                doclet.scope = Some(leading);
                doclet.name = doclet.name[1..].to_string();
            } else {
                doclet.scope = Some(Scope::Static);
            }
            let punctuation = doclet.scope.unwrap_or_default().punctuation();
            let longname = format!("{owner}{punctuation}{}", doclet.name);
            doclet.set_longname(&longname, dictionary);
        }
    }

    if about.variation.is_some() {
        doclet.variation = about.variation;
    }
}
