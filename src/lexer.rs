//! Scannerless HTML lexer.
//!
//! Splits any text into a gap-free sequence of [`Token`]s. At each cursor
//! position the rules below are tried in order and the first one that matches
//! wins:
//!
//! 1. comment `<!-- ... -->` (up to the first `-->`)
//! 2. declaration `<! ... >`
//! 3. start tag `<name attrs... /?>`
//! 4. end tag `</name>`
//! 5. whitespace run
//! 6. text run, quoted string literal, or a lone quote
//! 7. any single character
//!
//! The last rule always matches, so the lexer never gets stuck.

use std::borrow::Cow;
use std::collections::HashSet;

use memchr::{memchr, memmem};

use crate::attrs::{attr_ends, match_attr};

/// Token categories, with the tag-specific fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Comment,
    Declaration,
    StartTag {
        /// Lower-cased tag name
        name: Cow<'a, str>,
        /// Raw attribute list, from just after the name up to the closing `/`/`>`
        attrs: &'a str,
        self_closing: bool,
    },
    EndTag {
        name: Cow<'a, str>,
    },
    Whitespace,
    Quoted,
    Text,
    Fallback,
}

/// A classified slice of the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub text: &'a str,
    /// Byte offset of `text` in the input
    pub offset: usize,
}

/* ============================ Utility predicates ========================= */

/// The whitespace class used throughout: ASCII whitespace plus the Unicode
/// space separators, line/paragraph separators and BOM.
#[inline]
pub(crate) fn is_space(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{b}'
            | '\u{c}'
            | '\r'
            | ' '
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
            | '\u{feff}'
    )
}

#[inline]
fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// True for a non-empty string made only of whitespace.
pub(crate) fn is_blank(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_space)
}

/// End of the longest run starting at `at` whose chars satisfy `pred`.
#[inline]
pub(crate) fn scan_while(s: &str, at: usize, pred: impl Fn(char) -> bool) -> usize {
    s[at..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(s.len(), |(i, _)| at + i)
}

#[inline]
fn char_at(s: &str, at: usize) -> Option<char> {
    s[at..].chars().next()
}

#[inline]
fn char_before(s: &str, at: usize) -> Option<char> {
    s[..at].chars().next_back()
}

/* =============================== Matchers ================================ */

// Every matcher takes the cursor and returns the end of its match, leaving the
// caller to advance.

fn match_comment(s: &str, at: usize) -> Option<usize> {
    if !s[at..].starts_with("<!--") {
        return None;
    }
    let body = at + 4;
    memmem::find(&s.as_bytes()[body..], b"-->").map(|i| body + i + 3)
}

fn match_declaration(s: &str, at: usize) -> Option<usize> {
    if !s[at..].starts_with("<!") {
        return None;
    }
    let body = at + 2;
    match memchr(b'>', &s.as_bytes()[body..]) {
        Some(0) | None => None,
        Some(i) => Some(body + i + 1),
    }
}

/// `[A-Za-z]` followed by anything but `/`, whitespace or `>`.
fn match_tag_name(s: &str, at: usize) -> Option<usize> {
    if !char_at(s, at)?.is_ascii_alphabetic() {
        return None;
    }
    Some(scan_while(s, at + 1, |c| c != '/' && c != '>' && !is_space(c)))
}

/// A quoted string literal: not glued to a preceding or following word char,
/// single-line, and free of `<` and `>` so markup is never swallowed.
pub(crate) fn match_quoted(s: &str, at: usize) -> Option<usize> {
    let quote = char_at(s, at)?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    if char_before(s, at).is_some_and(is_word) {
        return None;
    }
    let mut chars = s[at + 1..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '<' | '>' | '\n' => return None,
            '\\' => match chars.next() {
                Some((_, '<' | '>' | '\n')) | None => return None,
                Some(_) => {}
            },
            c if c == quote => {
                let end = at + 1 + i + 1;
                return match char_at(s, end) {
                    Some(next) if is_word(next) => None,
                    _ => Some(end),
                };
            }
            _ => {}
        }
    }
    None
}

struct StartTag {
    end: usize,
    name_end: usize,
    attrs_end: usize,
    self_closing: bool,
}

fn match_start_tag(s: &str, at: usize) -> Option<StartTag> {
    if !s[at..].starts_with('<') {
        return None;
    }
    let name_end = match_tag_name(s, at + 1)?;

    let mut attrs_end = name_end;
    while let Some((_, end)) = match_attr(s, attrs_end) {
        attrs_end = end;
    }
    let (attrs_end, self_closing, end) = match match_tag_close(s, attrs_end) {
        Some((self_closing, end)) => (attrs_end, self_closing, end),
        // Only a quoted value can hide a `>` from the longest reading.
        None if s[name_end..attrs_end].contains('>') => backtrack_attrs(s, name_end)?,
        None => return None,
    };
    Some(StartTag {
        end,
        name_end,
        attrs_end,
        self_closing,
    })
}

struct Frame {
    pos: usize,
    ends: Vec<usize>,
    next: usize,
}

impl Frame {
    fn new(s: &str, pos: usize) -> Self {
        Self {
            pos,
            ends: attr_ends(s, pos),
            next: 0,
        }
    }
}

/// Depth-first search over every way to split an attribute list into units,
/// preferring more units and longer readings of the latest one, until the tag
/// closer matches. Returns the end of the attribute list, the self-closing
/// flag and the end of the tag.
///
/// What follows a given position never changes, so a position that failed
/// once is not searched again.
fn backtrack_attrs(s: &str, start: usize) -> Option<(usize, bool, usize)> {
    let mut dead = HashSet::new();
    let mut stack = vec![Frame::new(s, start)];
    while let Some(frame) = stack.last_mut() {
        if let Some(&end) = frame.ends.get(frame.next) {
            frame.next += 1;
            if !dead.contains(&end) {
                stack.push(Frame::new(s, end));
            }
            continue;
        }
        let pos = frame.pos;
        if let Some((self_closing, end)) = match_tag_close(s, pos) {
            log::trace!("start tag at byte {start} closed after backtracking to byte {pos}");
            return Some((pos, self_closing, end));
        }
        dead.insert(pos);
        stack.pop();
    }
    None
}

/// `\s*/?\s*>` after the attribute list.
fn match_tag_close(s: &str, at: usize) -> Option<(bool, usize)> {
    let mut p = scan_while(s, at, is_space);
    let self_closing = s[p..].starts_with('/');
    if self_closing {
        p += 1;
    }
    p = scan_while(s, p, is_space);
    s[p..].starts_with('>').then_some((self_closing, p + 1))
}

fn match_end_tag(s: &str, at: usize) -> Option<(usize, usize)> {
    if !s[at..].starts_with("</") {
        return None;
    }
    let name_end = match_tag_name(s, at + 2)?;
    let p = scan_while(s, name_end, is_space);
    s[p..].starts_with('>').then_some((name_end, p + 1))
}

/// Text run, quoted literal, or a lone quote character.
fn match_text(s: &str, at: usize) -> Option<(usize, TokenKind<'static>)> {
    let end = scan_while(s, at, |c| c != '<' && c != '"' && c != '\'' && !is_space(c));
    if end > at {
        return Some((end, TokenKind::Text));
    }
    if let Some(end) = match_quoted(s, at) {
        return Some((end, TokenKind::Quoted));
    }
    matches!(char_at(s, at), Some('"' | '\'')).then_some((at + 1, TokenKind::Text))
}

fn lowercase(name: &str) -> Cow<'_, str> {
    if name.chars().any(char::is_uppercase) {
        Cow::Owned(name.to_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/* ================================ Lexer ================================== */

/// Lazy token iterator over a document.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Cursor position: everything before it has been tokenized.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Match the next token without advancing.
    fn next_match(&self) -> Option<(usize, TokenKind<'a>)> {
        let s = self.input;
        let at = self.pos;

        if s[at..].starts_with('<') {
            if let Some(end) = match_comment(s, at) {
                return Some((end, TokenKind::Comment));
            }
            if let Some(end) = match_declaration(s, at) {
                return Some((end, TokenKind::Declaration));
            }
            if let Some(tag) = match_start_tag(s, at) {
                return Some((
                    tag.end,
                    TokenKind::StartTag {
                        name: lowercase(&s[at + 1..tag.name_end]),
                        attrs: &s[tag.name_end..tag.attrs_end],
                        self_closing: tag.self_closing,
                    },
                ));
            }
            if let Some((name_end, end)) = match_end_tag(s, at) {
                return Some((
                    end,
                    TokenKind::EndTag {
                        name: lowercase(&s[at + 2..name_end]),
                    },
                ));
            }
        }

        let end = scan_while(s, at, is_space);
        if end > at {
            return Some((end, TokenKind::Whitespace));
        }
        if let Some(found) = match_text(s, at) {
            return Some(found);
        }
        char_at(s, at).map(|c| (at + c.len_utf8(), TokenKind::Fallback))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.pos >= self.input.len() {
            return None;
        }
        let (end, kind) = self.next_match()?;
        let token = Token {
            kind,
            text: &self.input[self.pos..end],
            offset: self.pos,
        };
        log::trace!("token {:?} {:?}", token.kind, token.text);
        self.pos = end;
        Some(token)
    }
}

/// Tokenize a whole document.
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>, crate::FormatError> {
    let mut lexer = Lexer::new(text);
    let tokens: Vec<_> = lexer.by_ref().collect();
    if lexer.offset() != text.len() {
        return Err(crate::FormatError::LexIncomplete {
            offset: lexer.offset(),
        });
    }
    Ok(tokens)
}
