//! htmlfmt: whitespace-normalizing HTML re-serializer
//!
//! - Lexes any text, however malformed, into tokens without ever failing: a
//!   single-character fallback rule guarantees progress.
//! - Collapses whitespace runs to one space, keeps at most one blank line, and
//!   re-indents every line that starts after a newline by nesting depth.
//! - Normalizes start tags: lower-case names, one space between attributes,
//!   no space around `=`, `/>` written as ` />`.
//! - Soft-wraps at a column budget, one level deeper inside a tag's attribute
//!   list. A single token that is too long on its own is left unbroken.
//! - Leaves `pre`, `script`, `style` and `textarea` content, and quoted string
//!   literals, exactly as written.
//!
//! ```
//! use htmlfmt::{format, FormatOptions};
//!
//! let out = format("<body>\n<main   class = \"x\"></main></body>", &FormatOptions::default()).unwrap();
//! assert_eq!(out, "<body>\n  <main class=\"x\"></main></body>");
//! ```

pub mod attrs;
mod elements;
mod error;
pub mod lexer;
mod options;
mod output;
mod printer;

pub use error::FormatError;
pub use options::FormatOptions;
pub use printer::{RewriteHook, TokenAction};

use printer::Printer;

/// Re-serialize `text`.
///
/// Only fails when `options.strict` is set and the input needed the fallback
/// character rule or opaque attribute text, or if a scanner failed to account
/// for all of its input.
pub fn format(text: &str, options: &FormatOptions) -> Result<String, FormatError> {
    Printer::new(text, options, None).run()
}

/// Like [`format`], offering every non-whitespace token to `hook` first.
///
/// ```
/// use htmlfmt::{format_with_hook, FormatOptions, TokenAction};
///
/// // Replacements take over the pending whitespace, so hand it back.
/// let mut upper = |token: &str, ws: &str| TokenAction::Replace(vec![ws.to_string(), token.to_uppercase()]);
/// let out = format_with_hook("<p>hi  there</p>", &FormatOptions::default(), &mut upper).unwrap();
/// assert_eq!(out, "<P>HI THERE</P>");
/// ```
pub fn format_with_hook<H: RewriteHook>(
    text: &str,
    options: &FormatOptions,
    hook: &mut H,
) -> Result<String, FormatError> {
    Printer::new(text, options, Some(hook)).run()
}
