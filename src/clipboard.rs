//! Clipboard - Text copy/paste with an internal buffer fallback.
//!
//! Two backends:
//! - [`ClipboardBackend::Internal`] keeps text in a per-thread buffer
//! - [`ClipboardBackend::System`] writes through `arboard` as well, falling back
//!   to the buffer when the system clipboard is unavailable
//!
//! # Example
//!
//! ```ignore
//! use redactio::clipboard;
//!
//! clipboard::copy("Hello, World!");
//! assert_eq!(clipboard::paste().as_deref(), Some("Hello, World!"));
//!
//! // Select a node's contents and copy them
//! clipboard::select_all_and_copy(output_area);
//! ```

use std::cell::{Cell, RefCell};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::dom::{self, Node};

// =============================================================================
// Backend
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClipboardBackend {
    #[default]
    Internal,
    System,
}

impl FromStr for ClipboardBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(Self::Internal),
            "system" => Ok(Self::System),
            other => Err(format!("unknown clipboard backend `{other}`")),
        }
    }
}

thread_local! {
    /// Always holds the last copied text, whatever the backend.
    static CLIPBOARD_BUFFER: RefCell<Option<String>> = const { RefCell::new(None) };
    static BACKEND: Cell<ClipboardBackend> = const { Cell::new(ClipboardBackend::Internal) };
}

pub fn backend() -> ClipboardBackend {
    BACKEND.with(Cell::get)
}

pub fn set_backend(backend: ClipboardBackend) {
    BACKEND.with(|b| b.set(backend));
}

fn system_copy(text: &str) {
    let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string()));
    if let Err(err) = result {
        warn!(error = %err, "system clipboard unavailable; using internal buffer");
    }
}

fn system_paste() -> Option<String> {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
        Ok(text) if !text.is_empty() => Some(text),
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "system clipboard unavailable; using internal buffer");
            None
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Copy text to the clipboard. Empty strings are ignored.
pub fn copy(text: &str) {
    if text.is_empty() {
        return;
    }

    CLIPBOARD_BUFFER.with(|buf| {
        *buf.borrow_mut() = Some(text.to_string());
    });
    if backend() == ClipboardBackend::System {
        system_copy(text);
    }
    debug!(bytes = text.len(), "copied to clipboard");
}

/// Most recently copied text, or `None` if the clipboard is empty.
pub fn paste() -> Option<String> {
    if backend() == ClipboardBackend::System {
        if let Some(text) = system_paste() {
            return Some(text);
        }
    }
    CLIPBOARD_BUFFER.with(|buf| buf.borrow().clone())
}

/// Clear the internal buffer.
pub fn clear() {
    CLIPBOARD_BUFFER.with(|buf| {
        *buf.borrow_mut() = None;
    });
}

/// Select everything inside `node` and copy the selection.
///
/// Returns the copied text.
pub fn select_all_and_copy(node: Node) -> Option<String> {
    dom::select_node_contents(node);
    let text = dom::selection_text()?;
    copy(&text);
    Some(text)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::reset_document;

    fn setup() {
        set_backend(ClipboardBackend::Internal);
        clear();
    }

    #[test]
    fn test_copy_paste() {
        setup();

        assert!(paste().is_none());

        copy("Hello");
        assert_eq!(paste(), Some("Hello".to_string()));

        // Non-destructive
        assert_eq!(paste(), Some("Hello".to_string()));
    }

    #[test]
    fn test_copy_overwrites_and_ignores_empty() {
        setup();

        copy("First");
        copy("Second");
        copy("");
        assert_eq!(paste(), Some("Second".to_string()));
    }

    #[test]
    fn test_clear() {
        setup();

        copy("Something");
        clear();
        assert!(paste().is_none());
    }

    #[test]
    fn test_multiline_unicode() {
        setup();

        let text = "[\n    \"milk ✔\",\n    \"eggs 🚀\"\n]";
        copy(text);
        assert_eq!(paste().as_deref(), Some(text));
    }

    #[test]
    fn test_select_all_and_copy() {
        setup();
        reset_document();

        let pre = dom::create_element("pre").unwrap();
        pre.set_inner_text("line 1\nline 2");

        assert_eq!(select_all_and_copy(pre).as_deref(), Some("line 1\nline 2"));
        assert_eq!(dom::selection_text().as_deref(), Some("line 1\nline 2"));
        assert_eq!(paste().as_deref(), Some("line 1\nline 2"));
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("System".parse::<ClipboardBackend>(), Ok(ClipboardBackend::System));
        assert_eq!(" internal ".parse::<ClipboardBackend>(), Ok(ClipboardBackend::Internal));
        assert!("x11".parse::<ClipboardBackend>().is_err());
    }
}
