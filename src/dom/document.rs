//! Document - Per-thread node arena.
//!
//! Manages the lifecycle of nodes:
//! - Slot allocation with a free pool for O(1) reuse
//! - Generation counters so released handles are detected, not aliased
//! - Recursive release of detached subtrees
//! - Document-level state: body, active element, selection
//!
//! Nodes are NOT objects. A [`Node`] is a copyable handle into this arena,
//! so handlers can capture nodes freely without tying up ownership.

use std::cell::RefCell;

use tracing::{debug, trace};

use super::event::EventHandler;
use super::node::Node;
use super::traits::{is_valid_tag_name, ElementTraits};
use crate::error::{Error, Result};

// =============================================================================
// Node Storage
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Element(String),
    Text,
    Fragment,
}

pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) traits: ElementTraits,
    pub(crate) parent: Option<Node>,
    pub(crate) children: Vec<Node>,
    pub(crate) attributes: Vec<(String, String)>,
    /// Character data for text nodes, live value for form controls.
    pub(crate) data: String,
    pub(crate) handler_props: Vec<(String, EventHandler)>,
    pub(crate) listeners: Vec<(String, EventHandler)>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        let traits = match &kind {
            NodeKind::Element(tag) => ElementTraits::for_tag(tag),
            _ => ElementTraits::empty(),
        };
        Self {
            kind,
            traits,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            data: String::new(),
            handler_props: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub(crate) fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    pub(crate) fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub(crate) fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(key, _)| key != name);
    }
}

struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

pub(crate) struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    body: Option<Node>,
    pub(crate) active: Option<Node>,
    selection: Option<Node>,
}

thread_local! {
    static DOCUMENT: RefCell<Document> = RefCell::new(Document::new());
}

/// Run `f` with shared access to the current thread's document.
///
/// Never call back into user code from inside `f`.
pub(crate) fn with<R>(f: impl FnOnce(&Document) -> R) -> R {
    DOCUMENT.with(|doc| f(&doc.borrow()))
}

/// Run `f` with exclusive access to the current thread's document.
pub(crate) fn with_mut<R>(f: impl FnOnce(&mut Document) -> R) -> R {
    DOCUMENT.with(|doc| f(&mut doc.borrow_mut()))
}

impl Document {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            body: None,
            active: None,
            selection: None,
        }
    }

    fn alloc(&mut self, data: NodeData) -> Node {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            return Node::from_parts(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, data: Some(data) });
        Node::from_parts(index, 0)
    }

    pub(crate) fn get(&self, node: Node) -> Option<&NodeData> {
        self.slots
            .get(node.index())
            .filter(|slot| slot.generation == node.generation())
            .and_then(|slot| slot.data.as_ref())
    }

    pub(crate) fn get_mut(&mut self, node: Node) -> Option<&mut NodeData> {
        self.slots
            .get_mut(node.index())
            .filter(|slot| slot.generation == node.generation())
            .and_then(|slot| slot.data.as_mut())
    }

    pub(crate) fn data(&self, node: Node) -> Result<&NodeData> {
        self.get(node).ok_or(Error::StaleNode)
    }

    pub(crate) fn data_mut(&mut self, node: Node) -> Result<&mut NodeData> {
        self.get_mut(node).ok_or(Error::StaleNode)
    }

    pub(crate) fn contains(&self, node: Node) -> bool {
        self.get(node).is_some()
    }

    /// True if `ancestor` is `node` or one of its ancestors.
    pub(crate) fn is_inclusive_ancestor(&self, ancestor: Node, node: Node) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.get(n).and_then(|data| data.parent);
        }
        false
    }

    /// Unlink `node` from its parent's child list.
    pub(crate) fn detach(&mut self, node: Node) {
        let Some(parent) = self.get(node).and_then(|data| data.parent) else {
            return;
        };
        if let Some(parent_data) = self.get_mut(parent) {
            parent_data.children.retain(|child| *child != node);
        }
        if let Some(data) = self.get_mut(node) {
            data.parent = None;
        }
    }

    /// Free `node` and its whole subtree, handing back the removed payloads.
    ///
    /// Payloads are returned so their handlers drop after the borrow ends.
    fn free_subtree(&mut self, node: Node, removed: &mut Vec<NodeData>) {
        let Some(slot) = self.slots.get_mut(node.index()) else { return };
        if slot.generation != node.generation() {
            return;
        }
        let Some(data) = slot.data.take() else { return };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(node.index() as u32);
        self.live -= 1;

        if self.active == Some(node) {
            self.active = None;
        }
        if self.selection == Some(node) {
            self.selection = None;
        }
        if self.body == Some(node) {
            self.body = None;
        }

        for child in &data.children {
            self.free_subtree(*child, removed);
        }
        removed.push(data);
    }
}

// =============================================================================
// Node Creation
// =============================================================================

/// Create a detached element.
///
/// The tag is lower-cased. Fails with [`Error::InvalidTagName`] if it is not a
/// valid element name.
pub fn create_element(tag: &str) -> Result<Node> {
    if !is_valid_tag_name(tag) {
        return Err(Error::InvalidTagName(tag.to_string()));
    }
    let tag = tag.to_ascii_lowercase();
    trace!(%tag, "create element");
    Ok(with_mut(|doc| doc.alloc(NodeData::new(NodeKind::Element(tag)))))
}

/// Create a detached text node.
pub fn create_text_node(text: &str) -> Node {
    let mut data = NodeData::new(NodeKind::Text);
    data.data = text.to_string();
    with_mut(|doc| doc.alloc(data))
}

/// Create an empty fragment.
pub fn create_fragment() -> Node {
    with_mut(|doc| doc.alloc(NodeData::new(NodeKind::Fragment)))
}

/// Detached `div` used where a valid tag is known statically.
pub(crate) fn create_placeholder() -> Node {
    with_mut(|doc| doc.alloc(NodeData::new(NodeKind::Element("div".to_string()))))
}

/// Release `node` and its subtree, detaching it from its parent first.
///
/// Handles to released nodes become stale. Releasing a stale handle is a no-op.
pub fn release(node: Node) {
    let removed = with_mut(|doc| {
        if !doc.contains(node) {
            return Vec::new();
        }
        doc.detach(node);
        let mut removed = Vec::new();
        doc.free_subtree(node, &mut removed);
        removed
    });
    if !removed.is_empty() {
        debug!(count = removed.len(), "released nodes");
    }
    drop(removed);
}

// =============================================================================
// Document State
// =============================================================================

/// The document body, created on first use.
pub fn body() -> Node {
    with_mut(|doc| {
        if let Some(body) = doc.body.filter(|body| doc.contains(*body)) {
            return body;
        }
        let body = doc.alloc(NodeData::new(NodeKind::Element("body".to_string())));
        doc.body = Some(body);
        body
    })
}

/// First element under the body whose `id` attribute equals `id`.
pub fn get_element_by_id(id: &str) -> Option<Node> {
    let body = body();
    if body.id() == id {
        return Some(body);
    }
    body.descendants()
        .into_iter()
        .find(|node| node.is_element() && node.id() == id)
}

/// Currently focused element.
pub fn active_element() -> Option<Node> {
    with(|doc| doc.active.filter(|node| doc.contains(*node)))
}

/// Number of live nodes in this thread's document.
pub fn node_count() -> usize {
    with(|doc| doc.live)
}

// =============================================================================
// Selection
// =============================================================================

/// Select the contents of `node`, replacing any previous selection.
pub fn select_node_contents(node: Node) {
    with_mut(|doc| doc.selection = Some(node).filter(|n| doc.contains(*n)));
}

/// Text of the current selection.
pub fn selection_text() -> Option<String> {
    let node = with(|doc| doc.selection.filter(|n| doc.contains(*n)))?;
    Some(node.text_content())
}

/// Drop the current selection.
pub fn clear_selection() {
    with_mut(|doc| doc.selection = None);
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Drop every node and all document state on this thread.
pub fn reset_document() {
    let old = with_mut(|doc| std::mem::replace(doc, Document::new()));
    drop(old);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_count() {
        reset_document();

        let li = create_element("LI").unwrap();
        let text = create_text_node("milk");
        let fragment = create_fragment();

        assert_eq!(li.tag_name().as_deref(), Some("li"));
        assert!(text.is_text());
        assert!(fragment.is_fragment());
        assert_eq!(node_count(), 3);
    }

    #[test]
    fn test_invalid_tag() {
        reset_document();

        let err = create_element("not a tag").unwrap_err();
        assert!(matches!(err, Error::InvalidTagName(_)));
        assert_eq!(node_count(), 0);
    }

    #[test]
    fn test_release_and_reuse() {
        reset_document();

        let ul = create_element("ul").unwrap();
        let li = create_element("li").unwrap();
        ul.append(li).unwrap();

        release(ul);
        assert!(!ul.is_alive());
        assert!(!li.is_alive());
        assert_eq!(node_count(), 0);

        // The slot is reused under a new generation
        let fresh = create_element("p").unwrap();
        assert!(fresh.is_alive());
        assert_ne!(fresh, ul);
        assert_ne!(fresh, li);
        assert!(!ul.is_alive());
    }

    #[test]
    fn test_release_detaches_from_parent() {
        reset_document();

        let ul = create_element("ul").unwrap();
        let li = create_element("li").unwrap();
        ul.append(li).unwrap();

        release(li);
        assert!(ul.children().is_empty());
        assert!(ul.is_alive());
    }

    #[test]
    fn test_body_and_lookup() {
        reset_document();

        let app = create_element("div").unwrap();
        app.set_id("app");
        body().append(app).unwrap();

        assert_eq!(body(), body());
        assert_eq!(get_element_by_id("app"), Some(app));
        assert_eq!(get_element_by_id("missing"), None);
    }

    #[test]
    fn test_selection() {
        reset_document();

        let pre = create_element("pre").unwrap();
        pre.set_inner_text("[]");

        assert_eq!(selection_text(), None);
        select_node_contents(pre);
        assert_eq!(selection_text().as_deref(), Some("[]"));

        release(pre);
        assert_eq!(selection_text(), None);
    }
}
