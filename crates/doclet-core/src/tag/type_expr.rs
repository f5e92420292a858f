//! Type expression grammar.
//!
//! Parses Closure Compiler / jsdoc type expressions such as
//! `?Array.<string>|undefined`, `function(new:Foo, ...*): boolean` or
//! `{id: number, name}` and reports the top-level type names in canonical
//! form together with the optional/nullable/variable modifiers.

use std::fmt;

use thiserror::Error;

/// Result of parsing one type expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedType {
    pub names: Vec<String>,
    pub optional: Option<bool>,
    pub nullable: Option<bool>,
    pub variable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {offset})")]
pub struct TypeExprError {
    pub message: String,
    pub offset: usize,
}

/// Seam for plugging a different type grammar into a run.
pub trait TypeExpressionParser {
    fn parse(&self, expression: &str) -> Result<ParsedType, TypeExprError>;
}

/// The default grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosureTypeParser;

impl TypeExpressionParser for ClosureTypeParser {
    fn parse(&self, expression: &str) -> Result<ParsedType, TypeExprError> {
        let tokens = lex(expression)?;
        if tokens.is_empty() {
            return Ok(ParsedType::default());
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            len: expression.len(),
        };
        let (node, modifiers) = parser.parse_modified()?;
        if let Some((tok, offset)) = parser.tokens.get(parser.pos) {
            return Err(error(format!("unexpected `{tok}`"), *offset));
        }

        let names = match node {
            TypeNode::Union(members) => members.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        };
        Ok(ParsedType {
            names,
            optional: modifiers.optional.then_some(true),
            nullable: modifiers.nullable,
            variable: modifiers.variable.then_some(true),
        })
    }
}

fn error(message: impl Into<String>, offset: usize) -> TypeExprError {
    TypeExprError {
        message: message.into(),
        offset,
    }
}

// -- Lexer ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    LParen,
    RParen,
    LAngle,
    RAngle,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Pipe,
    Comma,
    Colon,
    Equals,
    Question,
    Bang,
    Star,
    Ellipsis,
    Name(String),
    Literal(String),
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::LAngle => "<",
            Tok::RAngle => ">",
            Tok::LBrace => "{",
            Tok::RBrace => "}",
            Tok::LBracket => "[",
            Tok::RBracket => "]",
            Tok::Pipe => "|",
            Tok::Comma => ",",
            Tok::Colon => ":",
            Tok::Equals => "=",
            Tok::Question => "?",
            Tok::Bang => "!",
            Tok::Star => "*",
            Tok::Ellipsis => "...",
            Tok::Name(s) | Tok::Literal(s) => s.as_str(),
        };
        f.write_str(s)
    }
}

const STRUCTURAL: &str = "(){}<>[]|,:=?!*\"'";
const NAMESPACES: [&str; 3] = ["module", "external", "event"];

fn lex(input: &str) -> Result<Vec<(Tok, usize)>, TypeExprError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if input[offset..].starts_with("...") {
            tokens.push((Tok::Ellipsis, offset));
            i += 3;
            continue;
        }

        let single = match c {
            '(' => Some(Tok::LParen),
            ')' => Some(Tok::RParen),
            '<' => Some(Tok::LAngle),
            '>' => Some(Tok::RAngle),
            '{' => Some(Tok::LBrace),
            '}' => Some(Tok::RBrace),
            '[' => Some(Tok::LBracket),
            ']' => Some(Tok::RBracket),
            '|' => Some(Tok::Pipe),
            ',' => Some(Tok::Comma),
            ':' => Some(Tok::Colon),
            '=' => Some(Tok::Equals),
            '?' => Some(Tok::Question),
            '!' => Some(Tok::Bang),
            '*' => Some(Tok::Star),
            _ => None,
        };
        if let Some(tok) = single {
            tokens.push((tok, offset));
            i += 1;
            continue;
        }

        if c == '"' || c == '\'' {
            let mut j = i + 1;
            let mut closed = false;
            while j < chars.len() {
                match chars[j].1 {
                    '\\' => j += 1,
                    q if q == c => {
                        closed = true;
                        break;
                    }
                    _ => {}
                }
                j += 1;
            }
            if !closed {
                return Err(error("unterminated string literal", offset));
            }
            let end = chars.get(j + 1).map_or(input.len(), |(p, _)| *p);
            tokens.push((Tok::Literal(input[offset..end].to_string()), offset));
            i = j + 1;
            continue;
        }

        let mut name = String::new();
        while i < chars.len() {
            let c = chars[i].1;
            let namespaced = c == ':'
                && NAMESPACES.contains(&name.as_str())
                && chars.get(i + 1).is_some_and(|(_, n)| !n.is_whitespace());
            if c.is_whitespace() || (STRUCTURAL.contains(c) && !namespaced) {
                break;
            }
            name.push(c);
            i += 1;
        }
        tokens.push((Tok::Name(name), offset));
    }
    Ok(tokens)
}

// -- Syntax tree ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Modifiers {
    nullable: Option<bool>,
    optional: bool,
    variable: bool,
}

impl Modifiers {
    fn is_empty(&self) -> bool {
        *self == Modifiers::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeNode {
    Name(String),
    Any,
    Unknown,
    Union(Vec<TypeNode>),
    Generic {
        base: String,
        params: Vec<TypeNode>,
    },
    Function {
        receiver: Option<(&'static str, Box<TypeNode>)>,
        params: Vec<TypeNode>,
        returns: Option<Box<TypeNode>>,
    },
    Record(Vec<(String, Option<TypeNode>)>),
    Modified {
        inner: Box<TypeNode>,
        modifiers: Modifiers,
    },
}

impl TypeNode {
    fn modified(self, modifiers: Modifiers) -> TypeNode {
        if modifiers.is_empty() {
            self
        } else {
            TypeNode::Modified {
                inner: Box::new(self),
                modifiers,
            }
        }
    }
}

fn join(nodes: &[TypeNode], sep: &str) -> String {
    nodes.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Name(name) => f.write_str(name),
            TypeNode::Any => f.write_str("*"),
            TypeNode::Unknown => f.write_str("?"),
            TypeNode::Union(members) => write!(f, "({})", join(members, "|")),
            TypeNode::Generic { base, params } => write!(f, "{base}.<{}>", join(params, ", ")),
            TypeNode::Function {
                receiver,
                params,
                returns,
            } => {
                let mut parts: Vec<String> = Vec::new();
                if let Some((keyword, ty)) = receiver {
                    parts.push(format!("{keyword}:{ty}"));
                }
                parts.extend(params.iter().map(ToString::to_string));
                write!(f, "function({})", parts.join(", "))?;
                if let Some(returns) = returns {
                    write!(f, ": {returns}")?;
                }
                Ok(())
            }
            TypeNode::Record(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(key, value)| match value {
                        Some(value) => format!("{key}: {value}"),
                        None => key.clone(),
                    })
                    .collect();
                write!(f, "{{{}}}", fields.join(", "))
            }
            TypeNode::Modified { inner, modifiers } => {
                if modifiers.variable {
                    f.write_str("...")?;
                }
                match modifiers.nullable {
                    Some(true) => f.write_str("?")?,
                    Some(false) => f.write_str("!")?,
                    None => {}
                }
                write!(f, "{inner}")?;
                if modifiers.optional {
                    f.write_str("=")?;
                }
                Ok(())
            }
        }
    }
}

// -- Parser -------------------------------------------------------------------------

struct Parser {
    tokens: Vec<(Tok, usize)>,
    pos: usize,
    len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    fn peek_at(&self, pos: usize) -> Option<&Tok> {
        self.tokens.get(pos).map(|(tok, _)| tok)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.len, |(_, offset)| *offset)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|(tok, _)| tok.clone());
        self.pos += 1;
        tok
    }

    fn eat(&mut self, expected: &Tok) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Tok) -> Result<(), TypeExprError> {
        if self.eat(&expected) {
            return Ok(());
        }
        let found = match self.peek() {
            Some(tok) => format!("`{tok}`"),
            None => "end of expression".to_string(),
        };
        Err(error(format!("expected `{expected}`, found {found}"), self.offset()))
    }

    fn starts_type_at(&self, pos: usize) -> bool {
        matches!(
            self.peek_at(pos),
            Some(Tok::Name(_) | Tok::Literal(_) | Tok::LParen | Tok::LBrace | Tok::Star)
        )
    }

    /// A type with its prefix and suffix modifiers kept apart.
    fn parse_modified(&mut self) -> Result<(TypeNode, Modifiers), TypeExprError> {
        let mut modifiers = Modifiers::default();
        loop {
            match self.peek() {
                Some(Tok::Ellipsis) => modifiers.variable = true,
                Some(Tok::Question) if self.starts_type_at(self.pos + 1) => {
                    modifiers.nullable = Some(true)
                }
                Some(Tok::Bang) => modifiers.nullable = Some(false),
                _ => break,
            }
            self.pos += 1;
        }

        let node = if modifiers.variable && !self.starts_type_at(self.pos) && self.peek() != Some(&Tok::Question) {
            TypeNode::Any
        } else {
            self.parse_union()?
        };

        loop {
            match self.peek() {
                Some(Tok::Equals) => modifiers.optional = true,
                Some(Tok::Question) => modifiers.nullable = Some(true),
                Some(Tok::Bang) => modifiers.nullable = Some(false),
                _ => break,
            }
            self.pos += 1;
        }
        Ok((node, modifiers))
    }

    fn parse_inner(&mut self) -> Result<TypeNode, TypeExprError> {
        let (node, modifiers) = self.parse_modified()?;
        Ok(node.modified(modifiers))
    }

    fn parse_union(&mut self) -> Result<TypeNode, TypeExprError> {
        let first = self.parse_member()?;
        if self.peek() != Some(&Tok::Pipe) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.eat(&Tok::Pipe) {
            members.push(self.parse_member()?);
        }
        Ok(TypeNode::Union(members))
    }

    fn parse_member(&mut self) -> Result<TypeNode, TypeExprError> {
        let mut modifiers = Modifiers::default();
        loop {
            match self.peek() {
                Some(Tok::Question) if self.starts_type_at(self.pos + 1) => {
                    modifiers.nullable = Some(true)
                }
                Some(Tok::Bang) => modifiers.nullable = Some(false),
                _ => break,
            }
            self.pos += 1;
        }
        Ok(self.parse_atom()?.modified(modifiers))
    }

    fn parse_atom(&mut self) -> Result<TypeNode, TypeExprError> {
        let offset = self.offset();
        let mut node = match self.bump() {
            Some(Tok::LParen) => {
                let inner = self.parse_inner()?;
                self.expect(Tok::RParen)?;
                inner
            }
            Some(Tok::Star) => TypeNode::Any,
            Some(Tok::Question) => TypeNode::Unknown,
            Some(Tok::LBrace) => self.parse_record()?,
            Some(Tok::Name(name)) if name == "function" && self.peek() == Some(&Tok::LParen) => {
                self.parse_function()?
            }
            Some(Tok::Name(name)) | Some(Tok::Literal(name)) => TypeNode::Name(name),
            Some(tok) => return Err(error(format!("unexpected `{tok}`"), offset)),
            None => return Err(error("unexpected end of expression", offset)),
        };

        loop {
            match self.peek() {
                Some(Tok::LAngle) => {
                    let TypeNode::Name(base) = &node else {
                        return Err(error("type parameters on a non-name type", self.offset()));
                    };
                    let base = base.strip_suffix('.').unwrap_or(base).to_string();
                    self.pos += 1;
                    let mut params = vec![self.parse_inner()?];
                    while self.eat(&Tok::Comma) {
                        params.push(self.parse_inner()?);
                    }
                    self.expect(Tok::RAngle)?;
                    node = TypeNode::Generic { base, params };
                }
                Some(Tok::LBracket) if self.peek_at(self.pos + 1) == Some(&Tok::RBracket) => {
                    self.pos += 2;
                    node = TypeNode::Generic {
                        base: "Array".to_string(),
                        params: vec![node],
                    };
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_function(&mut self) -> Result<TypeNode, TypeExprError> {
        self.expect(Tok::LParen)?;
        let mut receiver = None;
        let mut params = Vec::new();
        if !self.eat(&Tok::RParen) {
            loop {
                let keyword = match self.peek() {
                    Some(Tok::Name(n)) if n == "new" => Some("new"),
                    Some(Tok::Name(n)) if n == "this" => Some("this"),
                    _ => None,
                };
                match keyword {
                    Some(keyword) if self.peek_at(self.pos + 1) == Some(&Tok::Colon) => {
                        self.pos += 2;
                        receiver = Some((keyword, Box::new(self.parse_inner()?)));
                    }
                    _ => params.push(self.parse_inner()?),
                }
                if !self.eat(&Tok::Comma) {
                    break;
                }
            }
            self.expect(Tok::RParen)?;
        }
        let returns = if self.eat(&Tok::Colon) {
            Some(Box::new(self.parse_inner()?))
        } else {
            None
        };
        Ok(TypeNode::Function {
            receiver,
            params,
            returns,
        })
    }

    fn parse_record(&mut self) -> Result<TypeNode, TypeExprError> {
        let mut fields = Vec::new();
        if self.eat(&Tok::RBrace) {
            return Ok(TypeNode::Record(fields));
        }
        loop {
            let offset = self.offset();
            let key = match self.bump() {
                Some(Tok::Name(key)) | Some(Tok::Literal(key)) => key,
                Some(tok) => return Err(error(format!("expected a field name, found `{tok}`"), offset)),
                None => return Err(error("unterminated record type", offset)),
            };
            let value = if self.eat(&Tok::Colon) {
                Some(self.parse_inner()?)
            } else {
                None
            };
            fields.push((key, value));
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expect(Tok::RBrace)?;
        Ok(TypeNode::Record(fields))
    }
}
