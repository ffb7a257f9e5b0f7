//! Attribute sub-lexer.
//!
//! Re-reads the raw attribute list captured by a start tag and splits it into
//! `name[=value]` pairs and opaque text fragments (template directives such as
//! `{{#if x}}`, stray characters).

use std::fmt;

use crate::error::FormatError;
use crate::lexer::{is_space, match_quoted, scan_while};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
    Unquoted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttrValue<'a> {
    /// Value text without its quotes
    pub text: &'a str,
    pub quote: Quote,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrKind<'a> {
    Pair {
        name: &'a str,
        value: Option<AttrValue<'a>>,
    },
    Text(&'a str),
}

/// One attribute unit and the whitespace that preceded it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttrToken<'a> {
    pub space: &'a str,
    pub kind: AttrKind<'a>,
}

impl AttrToken<'_> {
    pub fn is_text(&self) -> bool {
        matches!(self.kind, AttrKind::Text(_))
    }

    /// Separator to emit before this unit: a newline survives so that callers
    /// can realign wrapped attributes, anything else collapses to a space.
    pub fn separator(&self) -> &'static str {
        if self.space.contains('\n') {
            "\n"
        } else {
            " "
        }
    }
}

/// Normalized rendering: no whitespace around `=`, original quote style kept.
impl fmt::Display for AttrKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            AttrKind::Text(text) => f.write_str(text),
            AttrKind::Pair { name, value: None } => f.write_str(name),
            AttrKind::Pair {
                name,
                value: Some(AttrValue { text, quote }),
            } => match quote {
                Quote::Double => write!(f, "{name}=\"{text}\""),
                Quote::Single => write!(f, "{name}='{text}'"),
                Quote::Unquoted => write!(f, "{name}={text}"),
            },
        }
    }
}

/* ======================== Attribute unit matching ======================= */

fn is_name_char(c: char) -> bool {
    !matches!(c, '=' | '>' | '/' | '"' | '\'') && !is_space(c)
}

fn is_unquoted_value_char(c: char) -> bool {
    !matches!(c, '"' | '\'' | '`' | '=' | '<' | '>') && !is_space(c)
}

/// `name` must end right before `=`, `>`, whitespace or the end of `s`.
fn match_name(s: &str, at: usize) -> Option<usize> {
    let end = scan_while(s, at, is_name_char);
    if end == at {
        return None;
    }
    match s[end..].chars().next() {
        None | Some('=' | '>') => Some(end),
        Some(c) if is_space(c) => Some(end),
        Some(_) => None,
    }
}

/// `\s*=\s*value`, returning the value and where it ends.
fn match_value(s: &str, at: usize) -> Option<(AttrValue<'_>, usize)> {
    let start = value_start(s, at)?;
    let rest = &s[start..];
    for (q, quote) in [('"', Quote::Double), ('\'', Quote::Single)] {
        if let Some(body) = rest.strip_prefix(q) {
            let close = body.find(q)?;
            let text = &body[..close];
            return Some((AttrValue { text, quote }, start + 1 + close + 1));
        }
    }
    let end = scan_while(s, start, is_unquoted_value_char);
    (end > start).then(|| {
        (
            AttrValue {
                text: &s[start..end],
                quote: Quote::Unquoted,
            },
            end,
        )
    })
}

/// Where the value begins after `\s*=\s*`.
fn value_start(s: &str, at: usize) -> Option<usize> {
    let eq = scan_while(s, at, is_space);
    s[eq..]
        .starts_with('=')
        .then(|| scan_while(s, eq + 1, is_space))
}

/// Opaque attribute text: a quoted literal, a run of non-space chars that does
/// not end in `/`, or a run ending in `/` that is not the self-closing marker.
fn match_text(s: &str, at: usize) -> Option<usize> {
    if let Some(end) = match_quoted(s, at) {
        return Some(end);
    }
    let run_end = scan_while(s, at, |c| c != '>' && !is_space(c));
    let run = &s[at..run_end];
    if let Some(last) = run.rfind(|c| c != '/') {
        let len = run[last..].chars().next().map_or(1, char::len_utf8);
        return Some(at + last + len);
    }
    // All slashes: the last one may belong to a `/>` closer.
    if run.is_empty() {
        return None;
    }
    let after = scan_while(s, run_end, is_space);
    if s[after..].starts_with('>') {
        (run.len() > 1).then_some(run_end - 1)
    } else {
        Some(run_end)
    }
}

/// Match one attribute unit at `at`, taking the longest reading of each part.
pub(crate) fn match_attr(s: &str, at: usize) -> Option<(AttrToken<'_>, usize)> {
    let start = scan_while(s, at, is_space);
    let space = &s[at..start];

    if let Some(name_end) = match_name(s, start) {
        let name = &s[start..name_end];
        let (value, end) = match match_value(s, name_end) {
            Some((value, end)) => (Some(value), end),
            None => (None, name_end),
        };
        let kind = AttrKind::Pair { name, value };
        return Some((AttrToken { space, kind }, end));
    }

    let end = match_text(s, start)?;
    let kind = AttrKind::Text(&s[start..end]);
    Some((AttrToken { space, kind }, end))
}

/// Every place an attribute unit starting at `at` could end, in the order a
/// backtracking matcher would try them. The first entry is where
/// [`match_attr`] ends.
pub(crate) fn attr_ends(s: &str, at: usize) -> Vec<usize> {
    let start = scan_while(s, at, is_space);
    let mut ends = Vec::new();

    if let Some(name_end) = match_name(s, start) {
        if let Some(value) = value_start(s, name_end) {
            match s[value..].chars().next() {
                Some(q @ ('"' | '\'')) => {
                    if let Some(close) = s[value + 1..].find(q) {
                        ends.push(value + 1 + close + 1);
                    }
                }
                _ => {
                    let end = scan_while(s, value, is_unquoted_value_char);
                    ends.extend(ends_within(s, value, end, |_| true));
                }
            }
        }
        ends.push(name_end);
    }

    if let Some(end) = match_quoted(s, start) {
        ends.push(end);
    }
    let run_end = scan_while(s, start, |c| c != '>' && !is_space(c));
    ends.extend(ends_within(s, start, run_end, |c| c != '/'));
    ends.extend(
        ends_within(s, start, run_end, |c| c == '/')
            .filter(|&end| !s[scan_while(s, end, is_space)..].starts_with('>')),
    );
    ends
}

/// Ends of the non-empty prefixes of `s[start..end]` whose last char passes
/// `last`, longest first.
fn ends_within<'s>(
    s: &'s str,
    start: usize,
    end: usize,
    last: impl Fn(char) -> bool + 's,
) -> impl Iterator<Item = usize> + 's {
    s[start..end]
        .char_indices()
        .rev()
        .filter(move |&(_, c)| last(c))
        .map(move |(i, c)| start + i + c.len_utf8())
}

/// Split a start tag's raw attribute list into units. `tag` is only used to
/// label the error.
pub fn tokenize_attrs<'a>(tag: &str, attrs: &'a str) -> Result<Vec<AttrToken<'a>>, FormatError> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while let Some((token, end)) = match_attr(attrs, pos) {
        tokens.push(token);
        pos = end;
    }
    if pos != attrs.len() {
        log::warn!("attribute lexing of <{tag}> stopped at byte {pos}");
        return Err(FormatError::AttributeLexIncomplete {
            tag: tag.to_string(),
            attrs: attrs.to_string(),
            offset: pos,
        });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(attrs: &str) -> Vec<(&str, String, bool)> {
        tokenize_attrs("x", attrs)
            .unwrap()
            .into_iter()
            .map(|t| (t.space, t.kind.to_string(), t.is_text()))
            .collect()
    }

    #[test]
    fn pairs_and_quote_styles() {
        let tokens = tokenize_attrs("x", r#" a="1" b='2' c=3 d"#).unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(
            tokens[0].kind,
            AttrKind::Pair {
                name: "a",
                value: Some(AttrValue {
                    text: "1",
                    quote: Quote::Double
                })
            }
        );
        assert_eq!(tokens[1].kind.to_string(), "b='2'");
        assert_eq!(tokens[2].kind.to_string(), "c=3");
        assert_eq!(tokens[3].kind, AttrKind::Pair { name: "d", value: None });
    }

    #[test]
    fn space_around_equals_is_dropped() {
        assert_eq!(
            units(r#"  id = "container"  class ="grid""#),
            vec![
                ("  ", r#"id="container""#.to_string(), false),
                ("  ", r#"class="grid""#.to_string(), false),
            ]
        );
    }

    #[test]
    fn butted_attributes() {
        assert_eq!(
            units(r#" id="container"class="grid""#),
            vec![
                (" ", r#"id="container""#.to_string(), false),
                ("", r#"class="grid""#.to_string(), false),
            ]
        );
    }

    #[test]
    fn separator_keeps_one_newline() {
        let tokens = tokenize_attrs("x", " a\n  \n b").unwrap();
        assert_eq!(tokens[0].separator(), " ");
        assert_eq!(tokens[1].separator(), "\n");
    }

    #[test]
    fn template_directives_are_text() {
        assert_eq!(
            units(" {% if a==2 %}hidden{% endif %}"),
            vec![
                (" ", "{%".to_string(), false),
                (" ", "if".to_string(), false),
                (" ", "a".to_string(), false),
                ("", "==2".to_string(), true),
                (" ", "%}hidden{%".to_string(), false),
                (" ", "endif".to_string(), false),
                (" ", "%}".to_string(), false),
            ]
        );
    }

    #[test]
    fn quoted_literal_text() {
        let got = units(r#" (equals value " do not "" show ")"#);
        assert_eq!(got[2], (" ", "\" do not \"".to_string(), true));
        assert_eq!(got[3], ("", "\" show \"".to_string(), true));
        assert_eq!(got[4], ("", ")".to_string(), false));
    }

    #[test]
    fn stray_slashes() {
        assert_eq!(units(" x/y"), vec![(" ", "x/y".to_string(), true)]);
        assert_eq!(units(" /"), vec![(" ", "/".to_string(), true)]);
    }

    #[test]
    fn alternative_ends_in_preference_order() {
        // value, bare name, then text runs ending on a non-slash char
        assert_eq!(attr_ends(r#" c="y>""#, 0), vec![7, 2, 5, 4, 3, 2]);
        // unquoted values shrink one char at a time
        assert_eq!(attr_ends(" v=ab", 0), vec![5, 4, 2, 5, 4, 3, 2]);
        // a trailing slash is only text when it does not close the tag
        assert_eq!(attr_ends("x/ >", 0), vec![1]);
        assert_eq!(attr_ends("x/ y", 0), vec![1, 2]);
        assert_eq!(attr_ends("x/y", 0), vec![3, 1, 2]);
    }

    #[test]
    fn first_alternative_matches_longest_reading() {
        for s in [r#" c="y>""#, " v=ab", " x/y", " {{#if", " a = 'b'"] {
            let (_, end) = match_attr(s, 0).unwrap();
            assert_eq!(attr_ends(s, 0)[0], end, "{s:?}");
        }
    }

    #[test]
    fn empty_list() {
        assert!(tokenize_attrs("x", "").unwrap().is_empty());
    }
}
