//! Live node tree.
//!
//! The document holds every node in a per-thread arena:
//! - Document: allocation, release, body, focus, selection
//! - Node: tree edits, text, reflected attributes, property table
//! - Events: handler properties, listeners, bubbling dispatch
//! - ClassList, selectors, serialization
//!
//! # Architecture
//!
//! Nodes are NOT objects. A [`Node`] is a copyable index into the arena:
//!
//! ```text
//! Index 0: body (parent=-,  children=[1])
//! Index 1: div  (parent=0,  children=[2, 3])
//! Index 2: h1   (parent=1,  children=[4])
//! Index 3: ol   (parent=1,  children=[])
//! Index 4: text "Todo"
//! ```
//!
//! There is no virtual tree: every edit lands here directly and is visible to
//! whatever runs next.

mod class_list;
pub mod document;
mod event;
mod node;
mod property;
mod selector;
mod serialize;
mod traits;
mod value;

pub use class_list::ClassList;
pub use document::{
    active_element, body, clear_selection, create_element, create_fragment, create_text_node,
    get_element_by_id, node_count, release, reset_document, select_node_contents, selection_text,
};
pub use event::{handler, Event, EventHandler};
pub use node::Node;
pub use traits::ElementTraits;
pub use value::Value;
