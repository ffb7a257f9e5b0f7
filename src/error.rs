use thiserror::Error;

/// Conditions that abort a formatting run.
///
/// The first two mean a scanner stopped short of the text it was handed. The
/// fallback rules make them unreachable in practice; they are kept as hard
/// assertions. The last two are only raised in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("failed to lex document: stopped at byte {offset}")]
    LexIncomplete { offset: usize },

    #[error("failed to lex attributes of <{tag}>: stopped at byte {offset} of {attrs:?}")]
    AttributeLexIncomplete {
        tag: String,
        attrs: String,
        offset: usize,
    },

    #[error("unexpected fallback character {ch:?} at byte {offset}")]
    UnexpectedFallback { offset: usize, ch: char },

    #[error("unexpected attribute text {text:?} in <{tag}>")]
    UnexpectedAttributeText { tag: String, text: String },
}
