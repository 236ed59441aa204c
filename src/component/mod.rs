//! Components - Uniform mutation surface over a rendered tree.
//!
//! A component wraps one [`RenderOutput`]:
//! 1. `root` is the node or fragment the output produced
//! 2. `element` is the node accessors act on (the root itself, or the first
//!    element inside a fragment root)
//! 3. `refs` are the names registered while rendering
//!
//! # Example
//!
//! ```ignore
//! use redactio::component::{Component, ComponentBase};
//! use redactio::jsx::{render, Attrs};
//!
//! #[derive(Clone)]
//! struct Greeting {
//!     base: ComponentBase,
//! }
//!
//! impl Component for Greeting {
//!     fn base(&self) -> &ComponentBase {
//!         &self.base
//!     }
//! }
//!
//! let greeting = Greeting {
//!     base: ComponentBase::new(render("p", Attrs::new().child("Hello"))?),
//! };
//! greeting.set_hidden(true);
//! ```

mod backed_array;
mod self_ref;

pub use backed_array::{Arrayish, BackedArray, Iter};
pub use self_ref::SelfRef;

use crate::dom::{self, ClassList, Event, Node};
use crate::error::Result;
use crate::jsx::{Props, Refs, RenderOutput};

// =============================================================================
// Component Base
// =============================================================================

/// State every component carries.
#[derive(Clone, Debug)]
pub struct ComponentBase {
    root: Node,
    element: Node,
    refs: Refs,
    placeholder: bool,
}

impl ComponentBase {
    /// Adopt a render output. A fragment root resolves `element` to its first
    /// element descendant, or to a detached placeholder if it has none.
    pub fn new(output: RenderOutput) -> Self {
        let (root, refs) = output.into_parts();
        let (element, placeholder) = if root.is_fragment() {
            match root.first_element_descendant() {
                Some(element) => (element, false),
                None => (dom::document::create_placeholder(), true),
            }
        } else {
            (root, false)
        };
        Self { root, element, refs, placeholder }
    }

    /// Free the root subtree, and the placeholder element if one was made.
    pub fn release(&self) {
        self.root.release();
        if self.placeholder {
            self.element.release();
        }
    }

    pub fn root(&self) -> Node {
        self.root
    }

    pub fn element(&self) -> Node {
        self.element
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }
}

// =============================================================================
// Component Trait
// =============================================================================

/// Read/write surface shared by every component. Everything is a pass-through
/// to [`Component::element`].
pub trait Component: 'static {
    fn base(&self) -> &ComponentBase;

    fn root(&self) -> Node {
        self.base().root()
    }

    fn element(&self) -> Node {
        self.base().element()
    }

    fn refs(&self) -> &Refs {
        self.base().refs()
    }

    /// Free this component's nodes. Handles into them become stale.
    fn release(&self) {
        self.base().release();
    }

    fn hidden(&self) -> bool {
        self.element().hidden()
    }

    fn set_hidden(&self, hidden: bool) {
        self.element().set_hidden(hidden);
    }

    fn inner_text(&self) -> String {
        self.element().inner_text()
    }

    fn set_inner_text(&self, text: &str) {
        self.element().set_inner_text(text);
    }

    fn class_list(&self) -> ClassList {
        self.element().class_list()
    }

    fn add_event_listener(&self, name: &str, handler: impl Fn(&Event) -> Result<()> + 'static)
    where
        Self: Sized,
    {
        self.element().add_event_listener(name, handler);
    }

    fn id(&self) -> String {
        self.element().id()
    }

    fn set_id(&self, id: &str) {
        self.element().set_id(id);
    }

    fn content_editable(&self) -> bool {
        self.element().content_editable()
    }

    fn set_content_editable(&self, editable: bool) {
        self.element().set_content_editable(editable);
    }

    fn spellcheck(&self) -> bool {
        self.element().spellcheck()
    }

    fn set_spellcheck(&self, spellcheck: bool) {
        self.element().set_spellcheck(spellcheck);
    }

    fn tab_index(&self) -> i32 {
        self.element().tab_index()
    }

    fn set_tab_index(&self, index: i32) {
        self.element().set_tab_index(index);
    }

    fn title(&self) -> String {
        self.element().title()
    }

    fn set_title(&self, title: &str) {
        self.element().set_title(title);
    }

    fn focus(&self) -> Result<()> {
        self.element().focus()
    }

    fn blur(&self) -> Result<()> {
        self.element().blur()
    }

    fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        self.element().query_selector(selector)
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        self.element().query_selector_all(selector)
    }
}

/// A component that can be built from a props bag, so it can be used as a
/// [`Tag::component`](crate::jsx::Tag::component).
pub trait Construct: Component + Clone + Sized {
    fn construct(props: &Props) -> Result<Self>;
}
