//! JavaScript comment extraction with a line-by-line scanner.
//!
//! Finds `/** ... */` blocks and reads just enough of the next line of code
//! to tell the engine what the comment documents: a name, whether it is a
//! function or class, its parameter names, the enclosing function and what
//! `this` refers to. Brace depth is tracked so that methods know their class
//! and locals know their function.

use doclet_core::doclet::{CodeInfo, Meta, RawDoclet};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

static RE_EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^export\s+(?:default\s+)?").unwrap());

static RE_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(([^)]*)\)").unwrap()
});

static RE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^class\s+([A-Za-z_$][\w$]*)").unwrap());

static RE_VAR_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:var|let|const)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?",
        r"(?:function\b[^(]*\(([^)]*)\)|\(([^)]*)\)\s*=>|([A-Za-z_$][\w$]*)\s*=>)"
    ))
    .unwrap()
});

static RE_VAR_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:var|let|const)\s+([A-Za-z_$][\w$]*)\s*=\s*class\b").unwrap()
});

static RE_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:var|let|const)\s+([A-Za-z_$][\w$]*)\s*(?:=\s*(.*?))?;?$").unwrap()
});

static RE_ASSIGN_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^([A-Za-z_$][\w$.]*)\s*=\s*(?:async\s+)?",
        r"(?:function\b[^(]*\(([^)]*)\)|\(([^)]*)\)\s*=>)"
    ))
    .unwrap()
});

static RE_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_$][\w$.]*)\s*=\s*(.*?);?$").unwrap());

static RE_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(static\s+)?(?:async\s+)?(?:get\s+|set\s+)?\*?([A-Za-z_$][\w$]*)\s*\(([^)]*)\)\s*\{")
        .unwrap()
});

static RE_PARAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\.\.\.)?([A-Za-z_$][\w$]*)").unwrap());

// -- Scanner state -------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Class,
    Function,
}

/// A class or function body the scanner is inside of.
#[derive(Debug)]
struct Block {
    kind: BlockKind,
    /// Longname-ish path of the symbol owning the body.
    name: String,
    /// What `this` means inside the body.
    receiver: String,
    /// Brace depth outside the body.
    depth: usize,
}

struct PendingComment {
    text: String,
    line: u32,
}

#[derive(Default)]
struct Scanner {
    filename: String,
    path: String,
    depth: usize,
    blocks: Vec<Block>,
    in_comment: Option<PendingComment>,
    pending: Option<PendingComment>,
    out: Vec<RawDoclet>,
}

/// Extracts every doc comment from a JavaScript source.
pub fn scan(source: &str, file: &Path) -> Vec<RawDoclet> {
    let mut scanner = Scanner {
        filename: file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        path: file
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default(),
        ..Default::default()
    };

    for (i, line) in source.lines().enumerate() {
        scanner.line(line, i as u32 + 1);
    }
    scanner.finish()
}

impl Scanner {
    fn line(&mut self, line: &str, lineno: u32) {
        let mut rest = line;

        if let Some(mut open) = self.in_comment.take() {
            match rest.find("*/") {
                Some(end) => {
                    open.text.push('\n');
                    open.text.push_str(&rest[..end + 2]);
                    self.close_comment(open);
                    rest = &rest[end + 2..];
                }
                None => {
                    open.text.push('\n');
                    open.text.push_str(rest);
                    self.in_comment = Some(open);
                    return;
                }
            }
        }

        while let Some(start) = find_doc_comment(rest) {
            self.code(&rest[..start]);
            let body = &rest[start..];
            match body[3..].find("*/") {
                Some(end) => {
                    let end = 3 + end + 2;
                    self.close_comment(PendingComment {
                        text: body[..end].to_string(),
                        line: lineno,
                    });
                    rest = &body[end..];
                }
                None => {
                    self.in_comment = Some(PendingComment {
                        text: body.to_string(),
                        line: lineno,
                    });
                    return;
                }
            }
        }
        self.code(rest);
    }

    fn close_comment(&mut self, comment: PendingComment) {
        // Two comments in a row: the first documents nothing in the code.
        if let Some(previous) = self.pending.take() {
            self.emit(previous, CodeInfo::default());
        }
        self.pending = Some(comment);
    }

    fn code(&mut self, code: &str) {
        let trimmed = code.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            return;
        }

        let declared = self.declaration(trimmed);
        if let Some(pending) = self.pending.take() {
            let info = declared.as_ref().map(|d| d.info.clone()).unwrap_or_default();
            self.emit(pending, info);
        }

        let depth_before = self.depth;
        if let Some(block) = declared.and_then(|d| d.opens) {
            if trimmed.contains('{') {
                self.blocks.push(Block {
                    depth: depth_before,
                    ..block
                });
            }
        }
        self.depth = count_braces(trimmed, self.depth);
        while self.blocks.last().is_some_and(|b| b.depth >= self.depth) {
            self.blocks.pop();
        }
    }

    fn emit(&mut self, comment: PendingComment, code: CodeInfo) {
        self.out.push(RawDoclet {
            comment: comment.text,
            tags: Vec::new(),
            meta: Meta {
                filename: Some(self.filename.clone()),
                path: Some(self.path.clone()),
                lineno: Some(comment.line),
                code,
            },
        });
    }

    fn finish(mut self) -> Vec<RawDoclet> {
        if let Some(pending) = self.pending.take() {
            self.emit(pending, CodeInfo::default());
        }
        self.out
    }

    fn enclosing_function(&self) -> Option<String> {
        self.blocks
            .last()
            .filter(|b| b.kind == BlockKind::Function)
            .map(|b| b.name.clone())
    }

    fn receiver(&self) -> Option<String> {
        self.blocks.last().map(|b| b.receiver.clone())
    }

    fn current_class(&self) -> Option<&Block> {
        self.blocks.last().filter(|b| b.kind == BlockKind::Class)
    }

    /// Reads what a line of code declares, if anything.
    fn declaration(&self, line: &str) -> Option<Declaration> {
        let stripped = RE_EXPORT.replace(line, "");
        let line: &str = &stripped;

        if let Some(class) = self.current_class() {
            if let Some(caps) = RE_METHOD.captures(line) {
                let method = caps.get(2)?.as_str();
                if matches!(method, "if" | "for" | "while" | "switch" | "catch") {
                    return None;
                }
                let (name, body) = if caps.get(1).is_some() {
                    (format!("{}.{method}", class.name), format!("{}.{method}", class.name))
                } else {
                    (format!("{}.prototype.{method}", class.name), format!("{}#{method}", class.name))
                };
                let receiver = class.receiver.clone();
                // The constructor is documented through the class itself.
                let info = (method != "constructor").then(|| CodeInfo {
                    name: Some(name.clone()),
                    node_type: Some("function".to_string()),
                    receiver: Some(receiver.clone()),
                    paramnames: param_names(caps.get(3).map_or("", |m| m.as_str())),
                    ..Default::default()
                });
                return Some(Declaration {
                    info: info.unwrap_or_default(),
                    opens: Some(Block::function(body, receiver)),
                });
            }
        }

        if let Some(caps) = RE_CLASS.captures(line).or_else(|| RE_VAR_CLASS.captures(line)) {
            let name = caps.get(1)?.as_str().to_string();
            return Some(Declaration {
                info: CodeInfo {
                    name: Some(name.clone()),
                    node_type: Some("class".to_string()),
                    funcscope: self.enclosing_function(),
                    ..Default::default()
                },
                opens: Some(Block {
                    kind: BlockKind::Class,
                    name: name.clone(),
                    receiver: name,
                    depth: 0,
                }),
            });
        }

        if let Some(caps) = RE_FUNCTION.captures(line) {
            let name = caps.get(1)?.as_str().to_string();
            return Some(self.function(name, caps.get(2), true));
        }

        if let Some(caps) = RE_VAR_FUNCTION.captures(line) {
            let name = caps.get(1)?.as_str().to_string();
            let params = caps.get(2).or(caps.get(3)).or(caps.get(4));
            return Some(self.function(name, params, true));
        }

        if let Some(caps) = RE_VAR.captures(line) {
            return Some(Declaration {
                info: CodeInfo {
                    name: Some(caps.get(1)?.as_str().to_string()),
                    node_type: Some("member".to_string()),
                    value: caps.get(2).map(|m| m.as_str().trim().to_string()).filter(|v| !v.is_empty()),
                    funcscope: self.enclosing_function(),
                    ..Default::default()
                },
                opens: None,
            });
        }

        if let Some(caps) = RE_ASSIGN_FUNCTION.captures(line) {
            let name = caps.get(1)?.as_str().to_string();
            let params = caps.get(2).or(caps.get(3));
            return Some(self.function(name, params, false));
        }

        if let Some(caps) = RE_ASSIGN.captures(line) {
            return Some(Declaration {
                info: CodeInfo {
                    name: Some(caps.get(1)?.as_str().to_string()),
                    node_type: Some("member".to_string()),
                    value: caps.get(2).map(|m| m.as_str().trim().to_string()).filter(|v| !v.is_empty()),
                    receiver: self.receiver(),
                    ..Default::default()
                },
                opens: None,
            });
        }

        None
    }

    /// `function f(a, b) {`, `const f = (a) => {` and `a.b.f = function (x) {`.
    /// Only declarations (not assignments) are scoped to the enclosing function.
    fn function(&self, name: String, params: Option<regex::Match<'_>>, declared: bool) -> Declaration {
        let funcscope = if declared { self.enclosing_function() } else { None };
        let qualified = match &funcscope {
            Some(outer) => format!("{outer}~{name}"),
            None => name.clone(),
        };
        let receiver = if declared {
            qualified.clone()
        } else {
            owner_of(&name)
        };
        Declaration {
            info: CodeInfo {
                name: Some(name),
                node_type: Some("function".to_string()),
                funcscope,
                receiver: (!declared).then(|| self.receiver()).flatten(),
                paramnames: param_names(params.map_or("", |m| m.as_str())),
                ..Default::default()
            },
            opens: Some(Block::function(qualified, receiver)),
        }
    }
}

impl Block {
    fn function(name: String, receiver: String) -> Block {
        Block {
            kind: BlockKind::Function,
            name,
            receiver,
            depth: 0,
        }
    }
}

struct Declaration {
    info: CodeInfo,
    /// Body opened by the declaration, if the line opens one.
    opens: Option<Block>,
}

/// `/**` that starts a doc comment; `/***` and `/**/` do not.
fn find_doc_comment(line: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = line[from..].find("/**") {
        let start = from + found;
        let after = &line[start + 3..];
        if !after.starts_with('*') && !after.starts_with('/') {
            return Some(start);
        }
        from = start + 3;
    }
    None
}

/// `Foo.prototype.bar` is called on a `Foo`; `ns.helper` on `ns`.
fn owner_of(name: &str) -> String {
    let owner = match name.rsplit_once('.') {
        Some((owner, _)) => owner,
        None => name,
    };
    owner.strip_suffix(".prototype").unwrap_or(owner).to_string()
}

fn param_names(params: &str) -> Vec<String> {
    params
        .split(',')
        .filter_map(|p| RE_PARAM_NAME.captures(p.trim()))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Brace depth after a line, skipping string literals and trailing `//` comments.
fn count_braces(line: &str, mut depth: usize) -> usize {
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'' | '`') => quote = Some(c),
            (None, '/') if chars.peek() == Some(&'/') => break,
            (None, '{') => depth += 1,
            (None, '}') => depth = depth.saturating_sub(1),
            (None, _) => {}
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_str(source: &str) -> Vec<RawDoclet> {
        scan(source, Path::new("lib/soup.js"))
    }

    fn code(doclet: &RawDoclet) -> &CodeInfo {
        &doclet.meta.code
    }

    #[test]
    fn function_declaration() {
        let docs = scan_str("/**\n * Heats.\n */\nfunction heat(degrees, ...rest) {\n}\n");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].comment, "/**\n * Heats.\n */");
        assert_eq!(docs[0].meta.lineno, Some(1));
        assert_eq!(docs[0].meta.filename.as_deref(), Some("soup.js"));
        assert_eq!(docs[0].meta.path.as_deref(), Some("lib"));
        let c = code(&docs[0]);
        assert_eq!(c.name.as_deref(), Some("heat"));
        assert_eq!(c.node_type.as_deref(), Some("function"));
        assert_eq!(c.paramnames, ["degrees", "rest"]);
    }

    #[test]
    fn single_line_comment_and_code() {
        let docs = scan_str("/** The size. */ var size = 3;");
        assert_eq!(docs[0].comment, "/** The size. */");
        assert_eq!(code(&docs[0]).name.as_deref(), Some("size"));
        assert_eq!(code(&docs[0]).value.as_deref(), Some("3"));
    }

    #[test]
    fn consecutive_comments_are_virtual() {
        let docs = scan_str("/** @class Soup */\n/** Makes soup. */\nfunction make() {}\n");
        assert_eq!(docs.len(), 2);
        assert_eq!(code(&docs[0]).name, None);
        assert_eq!(code(&docs[1]).name.as_deref(), Some("make"));
    }

    #[test]
    fn trailing_comment_has_no_code() {
        let docs = scan_str("var x = 1;\n/** @name orphan */\n");
        assert_eq!(docs.len(), 1);
        assert_eq!(code(&docs[0]).name, None);
    }

    #[test]
    fn non_doc_comments_are_skipped() {
        let docs = scan_str("/*** banner ***/\n/* plain */\nfunction f() {}\n");
        assert!(docs.is_empty());
    }

    #[test]
    fn class_methods() {
        let source = "\
/** A pot. */
class Soup {
  /** Builds. */
  constructor(size) {
    /** Size. */
    this.size = size;
  }
  /** Stirs. */
  stir(spoon) {
  }
  /** Makes one. */
  static make() {
  }
}
";
        let docs = scan_str(source);
        let names: Vec<_> = docs.iter().map(|d| code(d).name.as_deref()).collect();
        assert_eq!(
            names,
            [
                Some("Soup"),
                None,
                Some("this.size"),
                Some("Soup.prototype.stir"),
                Some("Soup.make"),
            ]
        );
        assert_eq!(code(&docs[2]).receiver.as_deref(), Some("Soup"));
        assert_eq!(code(&docs[3]).paramnames, ["spoon"]);
    }

    #[test]
    fn locals_know_their_function() {
        let source = "function outer() {\n  /** Inner. */\n  var helper = function (x) {};\n}\n/** Top. */\nvar top = 1;\n";
        let docs = scan_str(source);
        assert_eq!(code(&docs[0]).funcscope.as_deref(), Some("outer"));
        assert_eq!(code(&docs[0]).paramnames, ["x"]);
        assert_eq!(code(&docs[1]).funcscope, None);
    }

    #[test]
    fn constructor_function_receiver() {
        let source = "function Soup() {\n  /** Level. */\n  this.level = 0;\n}\n/** Heats. */\nSoup.prototype.heat = function (d) {\n};\n";
        let docs = scan_str(source);
        assert_eq!(code(&docs[0]).name.as_deref(), Some("this.level"));
        assert_eq!(code(&docs[0]).receiver.as_deref(), Some("Soup"));
        assert_eq!(code(&docs[1]).name.as_deref(), Some("Soup.prototype.heat"));
        assert_eq!(code(&docs[1]).paramnames, ["d"]);
    }

    #[test]
    fn exports() {
        let docs = scan_str("/** Adds. */\nexports.add = (a, b) => a + b;\n/** All. */\nmodule.exports = {};\n");
        assert_eq!(code(&docs[0]).name.as_deref(), Some("exports.add"));
        assert_eq!(code(&docs[0]).paramnames, ["a", "b"]);
        assert_eq!(code(&docs[1]).name.as_deref(), Some("module.exports"));
    }

    #[test]
    fn braces_in_strings_do_not_count() {
        assert_eq!(count_braces("var s = '{'; // {", 0), 0);
        assert_eq!(count_braces("function f() {", 0), 1);
        assert_eq!(count_braces("}", 1), 0);
    }
}
