/* =============================== Core sets =============================== */

// Names arrive here already lower-cased by the lexer.

/// Elements that never have children or an end tag.
pub fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "basefont"
            | "bgsound"
            | "br"
            | "col"
            | "command"
            | "embed"
            | "frame"
            | "hr"
            | "image"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose content is copied through untouched up to the matching end tag.
pub fn is_raw_text(name: &str) -> bool {
    matches!(name, "script" | "style" | "textarea")
}

/// `pre` keeps its whitespace, but tags inside it still count for nesting.
pub fn is_pre(name: &str) -> bool {
    name == "pre"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(is_void("br"));
        assert!(is_void("input"));
        assert!(!is_void("div"));
        assert!(is_raw_text("script"));
        assert!(is_raw_text("textarea"));
        assert!(!is_raw_text("pre"));
        assert!(is_pre("pre"));
    }
}
