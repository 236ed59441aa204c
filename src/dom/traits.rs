//! Element traits - Per-tag capability flags.

use bitflags::bitflags;

bitflags! {
    /// Capabilities an element gets from its tag name.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ElementTraits: u8 {
        /// Starts and ends its own line in text layout.
        const BLOCK = 1 << 0;
        /// Serialized without children or closing tag.
        const VOID = 1 << 1;
        /// Carries a live `value` property.
        const FORM_CONTROL = 1 << 2;
        /// Reachable by focus navigation without a tabindex.
        const FOCUSABLE = 1 << 3;
        /// Accepts typed text.
        const TEXT_ENTRY = 1 << 4;
        /// `ul` / `ol` container.
        const LIST = 1 << 5;
    }
}

impl ElementTraits {
    /// Traits for a lower-case tag name. Unknown tags are inline with no traits.
    pub fn for_tag(tag: &str) -> Self {
        match tag {
            "div" | "p" | "pre" | "form" | "section" | "article" | "header" | "footer" | "main"
            | "nav" | "li" | "table" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                Self::BLOCK
            }
            "ul" | "ol" => Self::BLOCK | Self::LIST,
            "hr" => Self::BLOCK | Self::VOID,
            "br" | "img" | "meta" | "link" => Self::VOID,
            "input" => Self::VOID | Self::FORM_CONTROL | Self::FOCUSABLE | Self::TEXT_ENTRY,
            "textarea" => Self::FORM_CONTROL | Self::FOCUSABLE | Self::TEXT_ENTRY,
            "button" | "select" | "option" => Self::FORM_CONTROL | Self::FOCUSABLE,
            "a" => Self::FOCUSABLE,
            _ => Self::empty(),
        }
    }
}

/// Whether `name` is acceptable as an element tag.
pub(crate) fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
