//! Proof text front end.
//!
//! A proof is line oriented:
//!
//! ```text
//! # comment
//! a -> b              : premise
//! | with x0
//! | P(x0)             : hypothesis
//! | ---
//! A x. P(x)           : A.x/x0 i 2-3
//! ```
//!
//! Leading bars give the box depth, `---` separates sibling boxes, and
//! everything after the first `:` is the justification. Lines that fail to
//! parse become [Node::Error]s so that the verifier can report them by step.

use std::ops::Range;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::expr::{
    mk_app, mk_binary, mk_bot, mk_equality, mk_not, mk_quantifier, mk_var, BinaryOp, Expr,
    QuantifierOp,
};
use crate::lex::{is_identifier, File, Lex, LexError, SourceInfo, Token, TokenKind};
use crate::proof::{Justification, Node, NodeBox, NodeError, NodeFolBox, NodeRule};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("tokenize error: {lex_error}")]
    Lex {
        #[from]
        lex_error: LexError,
    },
    #[error("parse error: {message} at {source_info}")]
    Parse {
        message: String,
        source_info: String,
    },
    #[error("unexpected end of input at {source_info}")]
    Eof { source_info: String },
    #[error("invalid justification: {message} at {source_info}")]
    Justification {
        message: String,
        source_info: String,
    },
}

pub struct Parser<'a> {
    lex: &'a mut Lex,
}

impl<'a> Parser<'a> {
    pub fn new(lex: &'a mut Lex) -> Self {
        Self { lex }
    }

    fn fail<R>(token: Token, message: impl Into<String>) -> Result<R, ParseError> {
        Err(ParseError::Parse {
            message: message.into(),
            source_info: token.source_info.to_string(),
        })
    }

    fn eof_error(&self) -> ParseError {
        let end = self.lex.end();
        ParseError::Eof {
            source_info: SourceInfo::new(Arc::clone(self.lex.input()), end..end).to_string(),
        }
    }

    fn optional<F, R>(&mut self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Self) -> Result<R, ParseError>,
    {
        let state = self.lex.save();
        match f(self) {
            Ok(m) => Some(m),
            Err(_err) => {
                self.lex.restore(state);
                None
            }
        }
    }

    fn peek_opt(&mut self) -> Option<Token> {
        self.optional(|this| this.peek())
    }

    fn peek(&mut self) -> Result<Token, ParseError> {
        self.lex
            .clone()
            .next()
            .transpose()?
            .ok_or_else(|| self.eof_error())
    }

    fn advance(&mut self) {
        self.lex
            .next()
            .expect("unchecked advance")
            .expect("impossible lex error! probably due to unchecked advance");
    }

    pub fn eof(&mut self) -> Result<(), ParseError> {
        if let Some(token) = self.lex.next() {
            return Self::fail(token?, "expected end of formula but tokens remain");
        }
        Ok(())
    }

    fn any_token(&mut self) -> Result<Token, ParseError> {
        self.lex
            .next()
            .transpose()?
            .ok_or_else(|| self.eof_error())
    }

    fn expect_symbol(&mut self, sym: &str) -> Result<(), ParseError> {
        let token = self.any_token()?;
        if token.kind == TokenKind::Symbol && token.as_str() == sym {
            return Ok(());
        }
        Self::fail(token, format!("expected symbol '{}'", sym))
    }

    fn expect_symbol_opt(&mut self, sym: &str) -> Option<Token> {
        if let Some(token) = self.peek_opt() {
            if token.kind == TokenKind::Symbol && token.as_str() == sym {
                self.advance();
                return Some(token);
            }
        }
        None
    }

    /// Consumes the next token if `classify` recognizes it.
    fn operator_opt<T>(&mut self, classify: fn(&Token) -> Option<T>) -> Option<T> {
        let op = classify(&self.peek_opt()?)?;
        self.advance();
        Some(op)
    }

    fn imp_op(token: &Token) -> Option<BinaryOp> {
        match (token.kind, token.as_str()) {
            (TokenKind::Symbol, "->" | "→") | (TokenKind::Keyword, "implies") => {
                Some(BinaryOp::Imp)
            }
            (TokenKind::Symbol, "<->" | "↔") | (TokenKind::Keyword, "iff") => Some(BinaryOp::Iff),
            _ => None,
        }
    }

    fn and_or_op(token: &Token) -> Option<BinaryOp> {
        match (token.kind, token.as_str()) {
            (TokenKind::Symbol, "&" | "∧") | (TokenKind::Keyword, "and") => Some(BinaryOp::And),
            (TokenKind::Symbol, "+" | "∨") | (TokenKind::Keyword, "or" | "v") => {
                Some(BinaryOp::Or)
            }
            _ => None,
        }
    }

    fn not_op(token: &Token) -> Option<()> {
        match (token.kind, token.as_str()) {
            (TokenKind::Symbol, "~" | "¬") | (TokenKind::Keyword, "not") => Some(()),
            _ => None,
        }
    }

    /// ```text
    /// formula ::= and_or [ ("->" | "<->") formula ]
    /// ```
    pub fn formula(&mut self) -> Result<Expr, ParseError> {
        let left = self.and_or()?;
        if let Some(op) = self.operator_opt(Self::imp_op) {
            let right = self.formula()?;
            return Ok(mk_binary(op, left, right));
        }
        Ok(left)
    }

    fn and_or(&mut self) -> Result<Expr, ParseError> {
        let left = self.unary()?;
        if let Some(op) = self.operator_opt(Self::and_or_op) {
            let right = self.and_or()?;
            return Ok(mk_binary(op, left, right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.operator_opt(Self::not_op).is_some() {
            return Ok(mk_not(self.unary()?));
        }
        let token = self.peek()?;
        if token.is_binder() {
            self.advance();
            let (op, var) = binder(token.as_str());
            // the body extends as far to the right as possible
            let body = self.formula()?;
            return Ok(mk_quantifier(op, var, body));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        let token = self.any_token()?;
        if token.is_symbol() && token.as_str() == "(" {
            let e = self.formula()?;
            self.expect_symbol(")")?;
            return Ok(e);
        }
        if is_bottom(&token) {
            return Ok(mk_bot());
        }
        if token.is_ident() {
            let left = self.term_rest(token)?;
            if self.expect_symbol_opt("=").is_some() {
                let right = self.term()?;
                return Ok(mk_equality(left, right));
            }
            return Ok(left);
        }
        Self::fail(token, "expected a formula")
    }

    pub fn term(&mut self) -> Result<Expr, ParseError> {
        let token = self.any_token()?;
        if !token.is_ident() {
            return Self::fail(token, "expected a term");
        }
        self.term_rest(token)
    }

    fn term_rest(&mut self, head: Token) -> Result<Expr, ParseError> {
        let name = head.as_str().to_owned();
        if self.expect_symbol_opt("(").is_none() {
            return Ok(mk_var(name));
        }
        let mut args = vec![];
        if self.expect_symbol_opt(")").is_some() {
            return Ok(mk_app(name, args));
        }
        loop {
            args.push(self.term()?);
            if self.expect_symbol_opt(",").is_some() {
                continue;
            }
            self.expect_symbol(")")?;
            return Ok(mk_app(name, args));
        }
    }
}

fn is_bottom(token: &Token) -> bool {
    matches!(
        (token.kind, token.as_str()),
        (TokenKind::Symbol, "_|_" | "⊥") | (TokenKind::Keyword, "bot")
    )
}

/// Splits a binder token such as `∀x.`, `A x .` or `forall x.`.
fn binder(text: &str) -> (QuantifierOp, String) {
    let text = text.trim_end_matches('.').trim_end();
    let (op, var) = if let Some(var) = text.strip_prefix("forall") {
        (QuantifierOp::Forall, var)
    } else if let Some(var) = text.strip_prefix("exists") {
        (QuantifierOp::Exists, var)
    } else if let Some(var) = text.strip_prefix('∀').or_else(|| text.strip_prefix('A')) {
        (QuantifierOp::Forall, var)
    } else {
        let var = text
            .strip_prefix('∃')
            .or_else(|| text.strip_prefix('E'))
            .expect("binder token starts with a quantifier");
        (QuantifierOp::Exists, var)
    };
    (op, var.trim().to_owned())
}

fn parse_formula_at(file: &Arc<File>, range: Range<usize>) -> Result<Expr, ParseError> {
    let mut lex = Lex::with_range(Arc::clone(file), range);
    let mut parser = Parser::new(&mut lex);
    let e = parser.formula()?;
    parser.eof()?;
    Ok(e)
}

/// Parses a standalone formula or term.
pub fn parse_sentence(src: &str) -> Result<Expr, ParseError> {
    let file = Arc::new(File::new("<input>", src));
    let end = file.len();
    parse_formula_at(&file, 0..end)
}

/// Splits at `seps` outside of parentheses.
fn split_toplevel<'s>(s: &'s str, seps: &[char]) -> Vec<&'s str> {
    let mut items = vec![];
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if depth == 0 && seps.contains(&c) => {
                items.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    items.push(&s[start..]);
    items
}

/// ```text
/// justification ::= rule [ "." subst ] [ selector [ part ] ] [ refs ]
/// ```
fn justification_from(text: &str) -> Result<Justification, String> {
    let text = text.trim();
    let head_end = split_toplevel(text, &[' ', '\t'])[0].len();
    let (head, rest) = text.split_at(head_end);

    let (rule, subst) = match head.split_once('.') {
        Some((rule, subst)) => (rule, Some(subst)),
        None => (head, None),
    };
    if rule.is_empty() {
        return Err("missing rule name".to_owned());
    }
    let mut justification = Justification::new(rule);

    if let Some(subst) = subst {
        let mut items = vec![];
        for item in split_toplevel(subst, &[';', ',']) {
            if item.trim().is_empty() {
                continue;
            }
            let (var, term) = item.split_once('/').ok_or_else(|| {
                format!("Substitution must consist of a variable and a term (e.g., x/f(c)), but got {item}.")
            })?;
            items.push((var.trim().to_owned(), term.trim().to_owned()));
        }
        justification.subst = Some(items);
    }

    static SELECTOR: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*(?P<selector>[[:alpha:]]+)(?P<part>\d*)").expect("valid selector regex")
    });
    let mut rest = rest;
    if let Some(cap) = SELECTOR.captures(rest) {
        justification.selector = Some(cap["selector"].to_owned());
        if !cap["part"].is_empty() {
            justification.part = Some(cap["part"].to_owned());
        }
        rest = &rest[cap.get(0).map_or(0, |m| m.end())..];
    }

    let refs: Vec<_> = rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|r| !r.is_empty())
        .collect();
    if !refs.is_empty() {
        justification = justification.with_refs(refs);
    }
    Ok(justification)
}

/// Parses the justification part of a proof line, e.g. `and e1 3`.
pub fn parse_justification(src: &str) -> Result<Justification, ParseError> {
    justification_from(src).map_err(|message| ParseError::Justification {
        message,
        source_info: src.trim().to_owned(),
    })
}

struct OpenBox {
    var: Option<String>,
    children: Vec<Node>,
    range: Range<usize>,
}

struct ProofParser {
    file: Arc<File>,
    root: Vec<Node>,
    open: Vec<OpenBox>,
}

/// One physical line with its prefix stripped.
struct Line {
    depth: usize,
    /// Byte range of the content after the bars, trimmed.
    body: Range<usize>,
}

impl ProofParser {
    fn loc(&self, range: Range<usize>) -> Option<SourceInfo> {
        Some(SourceInfo::new(Arc::clone(&self.file), range))
    }

    fn push(&mut self, node: Node, end: usize) {
        for b in &mut self.open {
            b.range.end = end;
        }
        match self.open.last_mut() {
            Some(b) => b.children.push(node),
            None => self.root.push(node),
        }
    }

    fn close(&mut self) {
        let Some(b) = self.open.pop() else {
            return;
        };
        let loc = self.loc(b.range.clone());
        let node = match b.var {
            Some(var) => Node::FolBox(NodeFolBox {
                var,
                children: b.children,
                loc,
            }),
            None => Node::Box(NodeBox {
                children: b.children,
                loc,
            }),
        };
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    /// Splits a line into its depth and body. `None` for blank lines.
    fn split_line(&self, start: usize, line: &str) -> Option<Line> {
        static PREFIX: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^\s*(?:\d+\.?\s*)?(?P<bars>[\s|]*)").expect("valid line prefix regex")
        });

        let line = match line.find('#') {
            Some(i) => &line[..i],
            None => line,
        };
        let cap = PREFIX.captures(line)?;
        let depth = cap["bars"].matches('|').count();
        let prefix = cap.get(0).map_or(0, |m| m.end());
        let body = line[prefix..].trim_end();
        if body.is_empty() {
            return None;
        }
        let body_start = start + prefix;
        Some(Line {
            depth,
            body: body_start..body_start + body.len(),
        })
    }

    fn error(&mut self, message: impl Into<String>, range: Range<usize>) {
        let node = Node::Error(NodeError {
            message: message.into(),
            loc: self.loc(range.clone()),
        });
        self.push(node, range.end);
    }

    fn line(&mut self, line: Line) {
        static SEPARATOR: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^-{3,}$").expect("valid separator regex"));
        static WITH: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^with\s+(?P<var>[^\s:]+)\s*(?P<colon>:.*)?$").expect("valid with regex")
        });

        let file = Arc::clone(&self.file);
        let body = &file.contents()[line.body.clone()];

        if SEPARATOR.is_match(body) {
            while self.open.len() > line.depth {
                self.close();
            }
            return;
        }

        while self.open.len() > line.depth {
            self.close();
        }
        let opened = self.open.len() < line.depth;
        while self.open.len() < line.depth {
            self.open.push(OpenBox {
                var: None,
                children: vec![],
                range: line.body.clone(),
            });
        }

        if let Some(cap) = WITH.captures(body) {
            let var = &cap["var"];
            if !opened {
                return self.error("'with' may only open a new assumption box", line.body);
            }
            if cap.name("colon").is_some() {
                return self.error("'with' does not take a justification", line.body);
            }
            if !is_identifier(var) {
                return self.error(format!("'{var}' is not a variable name"), line.body);
            }
            if let Some(b) = self.open.last_mut() {
                b.var = Some(var.to_owned());
            }
            let node = Node::Rule(NodeRule {
                sentence: mk_var(var),
                justification: Justification::new("with"),
                loc: self.loc(line.body.clone()),
            });
            return self.push(node, line.body.end);
        }

        let (sentence_range, justification_range) = match body.find(':') {
            Some(i) => (
                line.body.start..line.body.start + i,
                Some(line.body.start + i + 1..line.body.end),
            ),
            None => (line.body.clone(), None),
        };

        let sentence = match parse_formula_at(&file, sentence_range) {
            Ok(sentence) => sentence,
            Err(err) => return self.error(err.to_string(), line.body),
        };

        let justification = match justification_range {
            Some(range) if !file.contents()[range.clone()].trim().is_empty() => {
                match parse_justification(&file.contents()[range]) {
                    Ok(justification) => justification,
                    Err(err) => return self.error(err.to_string(), line.body),
                }
            }
            _ if line.depth == 0 => Justification::new("premise"),
            _ => Justification::new("hypothesis"),
        };

        let node = Node::Rule(NodeRule {
            sentence,
            justification,
            loc: self.loc(line.body.clone()),
        });
        self.push(node, line.body.end);
    }
}

/// Parses a whole proof. Never fails: malformed lines become error nodes.
pub fn parse_proof(file: Arc<File>) -> Vec<Node> {
    let mut parser = ProofParser {
        file: Arc::clone(&file),
        root: vec![],
        open: vec![],
    };
    let mut start = 0;
    for raw in file.contents().split_inclusive('\n') {
        let text = raw.trim_end_matches(|c| c == '\n' || c == '\r');
        if let Some(line) = parser.split_line(start, text) {
            parser.line(line);
        }
        start += raw.len();
    }
    while !parser.open.is_empty() {
        parser.close();
    }
    parser.root
}
