//! Token printer.
//!
//! Walks the token stream once, tracking nesting depth and whether we are
//! inside a raw-text element (`script`, `style`, `textarea`) or `pre`, and
//! feeds normalized tokens to the output assembler.

use std::borrow::Cow;
use std::mem;

use crate::attrs::{tokenize_attrs, AttrKind};
use crate::elements::{is_pre, is_raw_text, is_void};
use crate::error::FormatError;
use crate::lexer::{is_blank, Lexer, Token, TokenKind};
use crate::options::FormatOptions;
use crate::output::Output;

/// What a [`RewriteHook`] wants done with a span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenAction {
    /// Emit the span unchanged.
    Pass,
    /// Emit nothing now. The hook is expected to hold on to what it needs.
    Suppress,
    /// Emit these tokens instead. They go through the normal
    /// whitespace/wrap/indent handling but are not offered to the hook again.
    Replace(Vec<String>),
}

/// Per-token rewrite callback.
///
/// Called once for every non-whitespace token, in document order, with the
/// whitespace currently pending in front of it. The body of a raw-text or
/// `pre` element arrives as a single token right before its end tag.
pub trait RewriteHook {
    fn rewrite(&mut self, token: &str, pending_ws: &str) -> TokenAction;
}

impl<F> RewriteHook for F
where
    F: FnMut(&str, &str) -> TokenAction,
{
    fn rewrite(&mut self, token: &str, pending_ws: &str) -> TokenAction {
        self(token, pending_ws)
    }
}

#[derive(Debug)]
enum Mode<'s> {
    Normal,
    /// Inside a raw-text element; only its own end tag is recognized.
    RawText(Cow<'s, str>),
    /// Inside `pre`; counts nested `pre` start tags.
    Pre(usize),
}

pub(crate) struct Printer<'s, 'o> {
    input: &'s str,
    options: &'o FormatOptions,
    hook: Option<&'o mut dyn RewriteHook>,
    out: Output<'o>,
    depth: usize,
    mode: Mode<'s>,
    /// Raw text collected while not in `Mode::Normal`
    verbatim: String,
}

impl<'s, 'o> Printer<'s, 'o> {
    pub fn new(input: &'s str, options: &'o FormatOptions, hook: Option<&'o mut dyn RewriteHook>) -> Self {
        Self {
            input,
            options,
            hook,
            out: Output::new(&options.indent, options.width, input.len() + input.len() / 8),
            depth: 0,
            mode: Mode::Normal,
            verbatim: String::new(),
        }
    }

    pub fn run(mut self) -> Result<String, FormatError> {
        let mut lexer = Lexer::new(self.input);
        for token in lexer.by_ref() {
            self.token(token)?;
        }
        if lexer.offset() != self.input.len() {
            log::warn!("lexing stopped at byte {}", lexer.offset());
            return Err(FormatError::LexIncomplete {
                offset: lexer.offset(),
            });
        }
        self.flush_verbatim();
        Ok(self.out.finish())
    }

    fn token(&mut self, token: Token<'s>) -> Result<(), FormatError> {
        if self.options.strict && token.kind == TokenKind::Fallback {
            let ch = token.text.chars().next().unwrap_or_default();
            log::warn!("fallback character {ch:?} at byte {}", token.offset);
            return Err(FormatError::UnexpectedFallback {
                offset: token.offset,
                ch,
            });
        }

        match self.mode {
            Mode::Normal => self.normal(token),
            Mode::RawText(ref element) => {
                match token.kind {
                    TokenKind::EndTag { ref name } if name == element => {
                        log::debug!("leaving <{name}>");
                        self.mode = Mode::Normal;
                        self.end_tag(name);
                    }
                    _ => self.verbatim.push_str(token.text),
                }
                Ok(())
            }
            Mode::Pre(nesting) => {
                self.pre(token, nesting);
                Ok(())
            }
        }
    }

    fn normal(&mut self, token: Token<'s>) -> Result<(), FormatError> {
        match token.kind {
            TokenKind::StartTag {
                name,
                attrs,
                self_closing,
            } => self.start_tag(name, attrs, self_closing)?,
            TokenKind::EndTag { ref name } => self.end_tag(name),
            TokenKind::Whitespace => {
                // At most one blank line survives.
                match token.text.matches('\n').count() {
                    0 => self.add(" "),
                    1 => self.add("\n"),
                    _ => {
                        self.add("\n");
                        self.add("\n");
                    }
                }
            }
            TokenKind::Comment
            | TokenKind::Declaration
            | TokenKind::Quoted
            | TokenKind::Text
            | TokenKind::Fallback => self.add(token.text),
        }
        Ok(())
    }

    /// Inside `pre` every token is copied as is, but tags still move the depth.
    fn pre(&mut self, token: Token<'s>, nesting: usize) {
        match &token.kind {
            TokenKind::StartTag {
                name, self_closing, ..
            } if !*self_closing && !is_void(name) => {
                self.depth += 1;
                if is_pre(name) {
                    self.mode = Mode::Pre(nesting + 1);
                }
            }
            TokenKind::EndTag { name } if is_pre(name) => {
                if nesting == 1 {
                    log::debug!("leaving <pre>");
                    self.mode = Mode::Normal;
                    self.end_tag(name);
                    return;
                }
                self.mode = Mode::Pre(nesting - 1);
                self.depth = self.depth.saturating_sub(1);
            }
            TokenKind::EndTag { .. } => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        self.verbatim.push_str(token.text);
    }

    fn start_tag(&mut self, name: Cow<'s, str>, attrs: &str, self_closing: bool) -> Result<(), FormatError> {
        self.add(&format!("<{name}"));
        // Wrapped attributes indent one level deeper than their tag.
        self.depth += 1;

        let mut prev_text = false;
        for attr in tokenize_attrs(&name, attrs)? {
            if let AttrKind::Text(text) = attr.kind {
                if self.options.strict {
                    log::warn!("attribute text {text:?} in <{name}>");
                    return Err(FormatError::UnexpectedAttributeText {
                        tag: name.into_owned(),
                        text: text.to_string(),
                    });
                }
                if !attr.space.is_empty() {
                    self.add(attr.separator());
                }
            } else if !attr.space.is_empty() || !prev_text {
                self.add(attr.separator());
            }
            self.add(&attr.kind.to_string());
            prev_text = attr.is_text();
        }

        self.add(if self_closing { " />" } else { ">" });

        if self_closing || is_void(&name) {
            self.depth -= 1;
        } else if is_raw_text(&name) {
            log::debug!("entering <{name}>");
            self.mode = Mode::RawText(name);
        } else if is_pre(&name) {
            log::debug!("entering <pre>");
            self.mode = Mode::Pre(1);
        }
        Ok(())
    }

    fn end_tag(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.add(&format!("</{name}>"));
    }

    /// Emit a token produced outside verbatim mode, first releasing any
    /// verbatim text collected before it.
    fn add(&mut self, token: &str) {
        self.flush_verbatim();
        self.emit(token, false);
    }

    fn flush_verbatim(&mut self) {
        if !self.verbatim.is_empty() {
            let text = mem::take(&mut self.verbatim);
            self.emit(&text, true);
        }
    }

    fn emit(&mut self, token: &str, verbatim: bool) {
        if !is_blank(token) {
            if let Some(hook) = self.hook.as_deref_mut() {
                match hook.rewrite(token, self.out.pending()) {
                    TokenAction::Pass => {}
                    TokenAction::Suppress => {
                        self.out.discard_pending_if_idle();
                        return;
                    }
                    TokenAction::Replace(tokens) => {
                        self.out.discard_pending_if_idle();
                        for t in &tokens {
                            self.out.push(t, verbatim, self.depth);
                        }
                        return;
                    }
                }
            }
        }
        self.out.push(token, verbatim, self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> String {
        let opts = FormatOptions::default();
        Printer::new(input, &opts, None).run().unwrap()
    }

    #[test]
    fn depth_tracks_nesting() {
        assert_eq!(run("<a>\n<b>\n<c>\nx</c></b></a>"), "<a>\n  <b>\n    <c>\n      x</c></b></a>");
    }

    #[test]
    fn void_and_self_closing_do_not_nest() {
        assert_eq!(run("<div>\n<br>\n<img src=x>\n<x />\n<p></p></div>"), "<div>\n  <br>\n  <img src=x>\n  <x />\n  <p></p></div>");
    }

    #[test]
    fn unmatched_end_tags_clamp_at_zero() {
        assert_eq!(run("</a></b>\n<p>\nx</p>"), "</a></b>\n<p>\n  x</p>");
    }

    #[test]
    fn raw_text_ignores_other_end_tags() {
        assert_eq!(
            run("<style>a  </div>  b</style>  x"),
            "<style>a  </div>  b</style> x"
        );
    }

    #[test]
    fn raw_text_end_tag_is_case_insensitive() {
        assert_eq!(run("<SCRIPT>  x  </Script>  y"), "<script>  x  </script> y");
    }

    #[test]
    fn pre_copies_inner_tags_verbatim() {
        assert_eq!(
            run("<pre><b  class = x>  a  </b>\n\n\n</pre>  y"),
            "<pre><b  class = x>  a  </b>\n\n\n</pre> y"
        );
    }

    #[test]
    fn nested_pre_closes_at_outermost() {
        assert_eq!(run("<pre><pre> a </pre>  b </pre>  c"), "<pre><pre> a </pre>  b </pre> c");
    }

    #[test]
    fn pre_inner_tags_still_count_depth() {
        // The <div> left open inside pre pushes the next line one level deeper.
        assert_eq!(run("<pre><div></pre>\n<p></p>"), "<pre><div></pre>\n  <p></p>");
    }

    #[test]
    fn unterminated_raw_text_is_kept() {
        assert_eq!(run("<textarea>  a\n\n\n  b"), "<textarea>  a\n\n\n  b");
    }

    #[test]
    fn hook_sees_verbatim_body_as_one_token() {
        let opts = FormatOptions::default();
        let mut seen = Vec::new();
        let mut hook = |token: &str, _ws: &str| {
            seen.push(token.to_string());
            TokenAction::Pass
        };
        let input = "<script> a  b </script>";
        let out = Printer::new(input, &opts, Some(&mut hook)).run().unwrap();
        assert_eq!(out, input);
        assert_eq!(seen, vec!["<script", ">", " a  b ", "</script>"]);
    }
}
