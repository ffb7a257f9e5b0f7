/// Options for [`format`](crate::format).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    /// String inserted once per nesting level (default: two spaces)
    pub indent: String,
    /// Soft column budget (default: 80)
    pub width: usize,
    /// Fail instead of silently using the fallback character rule or opaque
    /// attribute text (default: false). Meant for regression tests; output is
    /// identical whenever formatting succeeds.
    pub strict: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            width: 80,
            strict: false,
        }
    }
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-level indentation string.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Set the column budget.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Enable or disable strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = FormatOptions::default();
        assert_eq!(opts.indent, "  ");
        assert_eq!(opts.width, 80);
        assert!(!opts.strict);
    }

    #[test]
    fn builder_chain() {
        let opts = FormatOptions::new().indent("\t").width(100).strict(true);
        assert_eq!(opts.indent, "\t");
        assert_eq!(opts.width, 100);
        assert!(opts.strict);
    }
}
