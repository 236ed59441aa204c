//! # redactio
//!
//! Declarative construction over a live node tree, with imperative mutation
//! afterwards.
//!
//! There is no virtual tree and no re-rendering. [`render`] builds live nodes
//! once and hands back named references; components wrap the result and edit
//! the tree directly from event handlers.
//!
//! ## Architecture
//!
//! ```text
//! Attrs + Tag ──render──▶ RenderOutput { root, refs } ──▶ Component ──▶ live tree
//!                                                             ▲             │
//!                                                             └── events ◀──┘
//! ```
//!
//! ## Modules
//!
//! - [`dom`] - Per-thread node arena: tree edits, attributes, events, selectors
//! - [`jsx`] - The render function, tags, attribute bags, refs
//! - [`component`] - Component trait and [`BackedArray`]
//! - [`apps`] - To-do list, greeter and synchronizer demos
//! - [`renderer`] - Text layout and the interactive terminal host
//! - [`clipboard`], [`config`], [`logging`], [`error`]
//!
//! ## Example
//!
//! ```ignore
//! use redactio::{render, Attrs};
//!
//! let output = render("ul", Attrs::new().child(
//!     render("li", Attrs::new().reference("first").child("milk"))?,
//! ))?;
//! output.refs.node("first")?.set_hidden(true);
//! ```

pub mod apps;
pub mod clipboard;
pub mod component;
pub mod config;
pub mod dom;
pub mod error;
pub mod jsx;
pub mod logging;
pub mod renderer;

pub use component::{Arrayish, BackedArray, Component, ComponentBase, Construct, SelfRef};
pub use config::{Config, RenderOptions};
pub use dom::{ClassList, Event, Node, Value};
pub use error::{Error, ErrorKind, Result};
pub use jsx::{render, Attrs, ComponentRef, RefTarget, Refs, RenderOutput, Tag};
