//! Output assembler.
//!
//! Non-whitespace tokens accumulate into a *span*; whitespace is held back as
//! the pending separator. When the next separator arrives the span is placed:
//! the pending whitespace is decided (kept, collapsed, or promoted to a line
//! break when the span would overflow the width), indentation is added after
//! a line break, and the result is appended to the buffer.

use memchr::{memchr, memrchr};

use crate::lexer::is_blank;

pub(crate) struct Output<'o> {
    indent: &'o str,
    width: usize,
    buf: String,
    /// Chars on the current output line
    line_len: usize,
    /// Start of the trailing run of whitespace-only fragments in `buf`
    blank_tail: Option<usize>,
    span: String,
    span_depth: usize,
    pending: String,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl<'o> Output<'o> {
    pub fn new(indent: &'o str, width: usize, capacity: usize) -> Self {
        Self {
            indent,
            width,
            buf: String::with_capacity(capacity),
            line_len: 0,
            blank_tail: None,
            span: String::new(),
            span_depth: 0,
            pending: String::new(),
        }
    }

    /// Whitespace waiting to be placed before the next span.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Drop the pending whitespace unless a span is already open (in which
    /// case the whitespace belongs to that span).
    pub fn discard_pending_if_idle(&mut self) {
        if self.span.is_empty() {
            self.pending.clear();
        }
    }

    /// Feed one token. Whitespace closes the current span and becomes the
    /// pending separator, unless `verbatim` is set, in which case it is glued
    /// to the span like any other text.
    pub fn push(&mut self, token: &str, verbatim: bool, depth: usize) {
        if !verbatim && is_blank(token) {
            self.flush();
            self.pending.push_str(token);
        } else {
            if self.span.is_empty() {
                self.span_depth = depth;
            }
            self.span.push_str(token);
        }
    }

    /// Place the pending whitespace and the current span.
    pub fn flush(&mut self) {
        if !self.pending.is_empty() && self.pending != "\n" {
            // Only measure up to the span's own first line break; a span that
            // breaks the line itself needs no extra wrap.
            let first_line = memchr(b'\n', self.span.as_bytes()).map_or(&self.span[..], |i| &self.span[..i]);
            if self.line_len + char_len(&self.pending) + char_len(first_line) > self.width {
                log::debug!("wrapping before {first_line:?} at column {}", self.line_len);
                self.pending.clear();
                self.pending.push('\n');
            }
        }

        let start = self.buf.len();
        self.buf.push_str(&self.pending);
        if self.pending == "\n" && !self.span.is_empty() {
            for _ in 0..self.span_depth {
                self.buf.push_str(self.indent);
            }
        }
        self.buf.push_str(&self.span);

        let fragment = &self.buf[start..];
        if !fragment.is_empty() {
            self.line_len = match memrchr(b'\n', fragment.as_bytes()) {
                Some(i) => char_len(&fragment[i + 1..]),
                None => self.line_len + char_len(fragment),
            };
            if is_blank(fragment) {
                self.blank_tail.get_or_insert(start);
            } else {
                self.blank_tail = None;
            }
        }

        self.span.clear();
        self.pending.clear();
    }

    /// Flush and trim: a trailing run of whitespace-only fragments is replaced
    /// by a single newline if it held one, and dropped otherwise.
    pub fn finish(mut self) -> String {
        self.flush();
        if let Some(start) = self.blank_tail {
            let had_newline = self.buf[start..].contains('\n');
            self.buf.truncate(start);
            if had_newline {
                self.buf.push('\n');
            }
        }
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(width: usize, tokens: &[(&str, usize)]) -> String {
        let mut out = Output::new("  ", width, 0);
        for &(token, depth) in tokens {
            out.push(token, false, depth);
        }
        out.finish()
    }

    #[test]
    fn adjacent_tokens_form_one_span() {
        let got = assemble(8, &[("ab", 0), ("cd", 0), (" ", 0), ("efgh", 0)]);
        // "abcd" + " " + "efgh" is 9 wide.
        assert_eq!(got, "abcd\nefgh");
    }

    #[test]
    fn newline_indents_by_span_depth() {
        let got = assemble(80, &[("a", 0), ("\n", 0), ("b", 2)]);
        assert_eq!(got, "a\n    b");
    }

    #[test]
    fn blank_line_has_no_indent() {
        let got = assemble(80, &[("a", 1), ("\n", 1), ("\n", 1), ("b", 1)]);
        assert_eq!(got, "a\n\n  b");
    }

    #[test]
    fn long_atom_is_not_broken() {
        let got = assemble(4, &[("abcdefgh", 0)]);
        assert_eq!(got, "abcdefgh");
    }

    #[test]
    fn span_with_early_newline_does_not_wrap() {
        let got = assemble(10, &[("abcdefgh", 0), (" ", 0), ("x\nyyyyyyyyyyyy", 0)]);
        assert_eq!(got, "abcdefgh x\nyyyyyyyyyyyy");
    }

    #[test]
    fn verbatim_whitespace_joins_span() {
        let mut out = Output::new("  ", 80, 0);
        out.push("<pre>", false, 0);
        out.push("  \n  ", true, 1);
        out.push("</pre>", false, 0);
        assert_eq!(out.finish(), "<pre>  \n  </pre>");
    }

    #[test]
    fn trailing_whitespace_is_trimmed() {
        assert_eq!(assemble(80, &[("a", 0), (" ", 0)]), "a");
        assert_eq!(assemble(80, &[("a", 0), ("\n", 0), ("\n", 0)]), "a\n");
    }

    #[test]
    fn discarding_pending() {
        let mut out = Output::new("  ", 80, 0);
        out.push("a", false, 0);
        out.push(" ", false, 0);
        out.discard_pending_if_idle();
        out.push("b", false, 0);
        assert_eq!(out.finish(), "ab");
    }
}
