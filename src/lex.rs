use std::iter::FusedIterator;
use std::ops::Range;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug)]
pub struct File {
    name: String,
    contents: String,
    lines: Vec<usize>,
}

impl File {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        let name = name.into();
        let contents = contents.into();
        let mut lines = vec![0];
        for (idx, ch) in contents.char_indices() {
            if ch == '\n' {
                lines.push(idx + ch.len_utf8());
            }
        }
        Self {
            name,
            contents,
            lines,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn line_column_at(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.contents.len());
        let line_index = match self.lines.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = *self
            .lines
            .get(line_index)
            .expect("at least one line start is recorded");
        let column = self.contents[line_start..offset].chars().count() + 1;
        (line_index + 1, column)
    }

    pub fn line(&self, line: usize) -> &str {
        if line == 0 || line > self.lines.len() {
            return "";
        }
        let start = self.lines[line - 1];
        let end = if let Some(next_start) = self.lines.get(line) {
            let mut end = *next_start;
            if end > start && self.contents.as_bytes()[end - 1] == b'\n' {
                end -= 1;
            }
            end
        } else {
            self.contents.len()
        };
        &self.contents[start..end]
    }
}

/// A range of a source file. Statements carry one so that a failing step can
/// be reported at its line.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    range: Range<usize>,
    file: Arc<File>,
}

impl SourceInfo {
    pub fn new(file: Arc<File>, range: Range<usize>) -> Self {
        Self { range, file }
    }

    pub fn as_str(&self) -> &str {
        self.file
            .contents()
            .get(self.range.clone())
            .expect("invalid token position")
    }

    pub fn line_column(&self) -> (usize, usize) {
        self.file.line_column_at(self.range.start)
    }
}

impl PartialEq for SourceInfo {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.file, &other.file) && self.range == other.range
    }
}

impl Eq for SourceInfo {}

impl std::fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (line, column) = self.line_column();
        writeln!(f, "{}:{}:{}\n", self.file.name(), line, column)?;
        let line_text = self.file.line(line);
        writeln!(f, "{}", line_text)?;
        writeln!(
            f,
            "{}{}",
            " ".repeat(column - 1),
            "^".repeat(std::cmp::max(1, self.as_str().chars().count()))
        )
    }
}

pub fn is_identifier(s: &str) -> bool {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*$").expect("valid identifier regex"));
    RE.is_match(s)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,   // e.g. "P", "x0", "f'"
    Binder,  // e.g. "A x.", "∃y.", "forall z."
    Symbol,  // e.g. "(", "->", "∧", "_|_"
    Keyword, // e.g. "and", "v", "not", "bot"
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub source_info: SourceInfo,
}

impl Token {
    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }

    pub fn is_binder(&self) -> bool {
        self.kind == TokenKind::Binder
    }

    pub fn is_symbol(&self) -> bool {
        self.kind == TokenKind::Symbol
    }

    pub fn as_str(&self) -> &str {
        self.source_info.as_str()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?} {}\n{}", self.kind, self.as_str(), self.source_info)
    }
}

/// Tokenizer over a byte range of a file. Sentences are lexed one proof line
/// at a time, so the range usually stops before the justification.
#[derive(Debug, Clone)]
pub struct Lex {
    file: Arc<File>,
    position: usize,
    end: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct LexState {
    position: usize,
}

#[derive(Debug, Clone, Error)]
#[error("unrecognizable character at {source_info}")]
pub struct LexError {
    source_info: SourceInfo,
}

impl From<Lex> for LexError {
    fn from(lex: Lex) -> Self {
        let start = std::cmp::min(lex.position, lex.end);
        let end = if start < lex.end {
            let rest = &lex.file.contents()[start..lex.end];
            rest.chars()
                .next()
                .map(|c| start + c.len_utf8())
                .unwrap_or(start)
        } else {
            start
        };
        Self {
            source_info: SourceInfo::new(lex.file, start..end),
        }
    }
}

impl Lex {
    pub fn new(file: Arc<File>) -> Self {
        let end = file.len();
        Self::with_range(file, 0..end)
    }

    pub fn with_range(file: Arc<File>, range: Range<usize>) -> Self {
        Self {
            file,
            position: range.start,
            end: range.end,
        }
    }

    pub fn input(&self) -> &Arc<File> {
        &self.file
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn save(&self) -> LexState {
        LexState {
            position: self.position,
        }
    }

    pub fn restore(&mut self, state: LexState) {
        self.position = state.position;
    }

    fn advance(&mut self, bytes: usize) -> SourceInfo {
        let source_info =
            SourceInfo::new(Arc::clone(&self.file), self.position..self.position + bytes);
        self.position += bytes;
        source_info
    }
}

impl Iterator for Lex {
    type Item = std::result::Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        #[derive(PartialEq, Eq, Debug)]
        enum Kind {
            Space,
            Binder,
            Symbol,
            Ident,
        }

        static RE: Lazy<Regex> = Lazy::new(|| {
            let s = &[
                (Kind::Space, r"\s+"),
                (
                    Kind::Binder,
                    r"(?:∀|∃|A|E|forall\s|exists\s)\s*[\p{Cased_Letter}_][\p{Cased_Letter}\p{Number}_']*\s*\.",
                ),
                (Kind::Symbol, r"_\|_|<->|->|[()=,~&+∧∨→↔¬⊥]"),
                (
                    Kind::Ident,
                    r"[\p{Cased_Letter}_][\p{Cased_Letter}\p{Number}_']*",
                ),
            ]
            .iter()
            .map(|(kind, re)| format!("(?P<{:?}>{})", kind, re))
            .collect::<Vec<_>>()
            .join("|");
            regex::Regex::new(&format!("^(?:{})", s)).expect("valid token regex")
        });

        loop {
            if self.position >= self.end {
                return None;
            }
            let input = Arc::clone(&self.file);
            let cap = match RE.captures(&input.contents()[self.position..self.end]) {
                None => return Some(Err(LexError::from(self.clone()))),
                Some(cap) => cap,
            };
            let whole = cap.get(0).expect("group 0 always matches");

            // skip whitespaces
            if cap.name(&format!("{:?}", Kind::Space)).is_some() {
                self.advance(whole.len());
                continue;
            }

            // change the position of the cursor
            let source_info = self.advance(whole.len());
            let text = source_info.as_str();

            let kind;
            if cap.name(&format!("{:?}", Kind::Binder)).is_some() {
                kind = TokenKind::Binder;
            } else if cap.name(&format!("{:?}", Kind::Ident)).is_some() {
                match text {
                    "and" | "or" | "v" | "not" | "implies" | "iff" | "bot" => {
                        kind = TokenKind::Keyword;
                    }
                    _ => {
                        kind = TokenKind::Ident;
                    }
                }
            } else {
                assert!(cap.name(&format!("{:?}", Kind::Symbol)).is_some());
                kind = TokenKind::Symbol;
            };
            return Some(Ok(Token { kind, source_info }));
        }
    }
}

impl FusedIterator for Lex {}
