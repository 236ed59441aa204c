//! Terminal renderer.
//!
//! - [`layout`] - Live tree to styled lines (pure, testable)
//! - [`Session`] - Focus cursor and key handling over a mounted tree
//! - [`TerminalApp`] - Fullscreen crossterm loop around a session
//!
//! Every frame is laid out from the live tree; there is nothing to diff against.

mod layout;
mod terminal;

pub use layout::{fit_tail, focus_stops, layout, to_plain_text, Line, Span, SpanStyle};
pub use terminal::{KeyOutcome, Session, TerminalApp};
