//! Node handle - Tree edits, text and reflected attributes.
//!
//! A [`Node`] is an index + generation pair into the thread's document. It is
//! `Copy`, so closures and components hold nodes by value. Fallible tree edits
//! return [`Result`]; plain accessors on a released node log a warning and act
//! on a default instead.

use std::fmt;

use tracing::{trace, warn};

use super::document::{self, NodeData, NodeKind};
use super::property::Property;
use super::traits::ElementTraits;
use super::value::Value;
use crate::error::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    index: u32,
    generation: u32,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}@{})", self.index, self.generation)
    }
}

// =============================================================================
// Handle Plumbing
// =============================================================================

impl Node {
    pub(crate) fn from_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }

    pub(crate) fn read<R: Default>(&self, f: impl FnOnce(&NodeData) -> R) -> R {
        document::with(|doc| match doc.get(*self) {
            Some(data) => f(data),
            None => {
                warn!(node = ?self, "read from released node");
                R::default()
            }
        })
    }

    pub(crate) fn write(&self, f: impl FnOnce(&mut NodeData)) {
        document::with_mut(|doc| match doc.get_mut(*self) {
            Some(data) => f(data),
            None => warn!(node = ?self, "write to released node"),
        })
    }

    /// False once the node has been released.
    pub fn is_alive(&self) -> bool {
        document::with(|doc| doc.contains(*self))
    }

    /// True if `other` is this node or one of its descendants.
    pub fn contains(&self, other: Node) -> bool {
        document::with(|doc| doc.contains(*self) && doc.is_inclusive_ancestor(*self, other))
    }

    pub fn is_element(&self) -> bool {
        self.read(|data| data.is_element())
    }

    pub fn is_text(&self) -> bool {
        self.read(|data| data.kind == NodeKind::Text)
    }

    pub fn is_fragment(&self) -> bool {
        self.read(|data| data.kind == NodeKind::Fragment)
    }

    /// Lower-case tag name, `None` for text and fragments.
    pub fn tag_name(&self) -> Option<String> {
        self.read(|data| data.tag().map(str::to_string))
    }

    pub fn traits(&self) -> ElementTraits {
        self.read(|data| data.traits)
    }

    /// Free this node and its subtree. See [`document::release`].
    pub fn release(self) {
        document::release(self);
    }
}

// =============================================================================
// Tree Navigation
// =============================================================================

impl Node {
    pub fn parent(&self) -> Option<Node> {
        self.read(|data| data.parent)
    }

    /// All child nodes, text included.
    pub fn child_nodes(&self) -> Vec<Node> {
        self.read(|data| data.children.clone())
    }

    /// Element children only.
    pub fn children(&self) -> Vec<Node> {
        document::with(|doc| {
            doc.get(*self)
                .map(|data| {
                    data.children
                        .iter()
                        .copied()
                        .filter(|child| doc.get(*child).is_some_and(NodeData::is_element))
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// The `index`-th element child.
    pub fn element_child(&self, index: usize) -> Option<Node> {
        self.children().get(index).copied()
    }

    pub fn first_element_child(&self) -> Option<Node> {
        self.element_child(0)
    }

    pub fn child_element_count(&self) -> usize {
        self.children().len()
    }

    /// Every node below this one, in document order.
    pub fn descendants(&self) -> Vec<Node> {
        fn walk(doc: &document::Document, node: Node, out: &mut Vec<Node>) {
            if let Some(data) = doc.get(node) {
                for child in &data.children {
                    out.push(*child);
                    walk(doc, *child, out);
                }
            }
        }
        let mut out = Vec::new();
        document::with(|doc| walk(doc, *self, &mut out));
        out
    }

    /// First element descendant in document order.
    pub fn first_element_descendant(&self) -> Option<Node> {
        self.descendants().into_iter().find(|node| node.is_element())
    }
}

// =============================================================================
// Tree Mutation
// =============================================================================

/// Insert `new` into `parent` before `reference` (or at the end).
///
/// A fragment contributes its children and is left empty.
fn insert_into(
    doc: &mut document::Document,
    parent: Node,
    new: Node,
    reference: Option<Node>,
) -> Result<()> {
    if doc.data(parent)?.kind == NodeKind::Text {
        return Err(Error::HierarchyRequest("text nodes cannot have children"));
    }
    let new_is_fragment = doc.data(new)?.kind == NodeKind::Fragment;
    if let Some(reference) = reference {
        if doc.data(reference)?.parent != Some(parent) {
            return Err(Error::NotFound);
        }
    }
    if doc.is_inclusive_ancestor(new, parent) {
        return Err(Error::HierarchyRequest("node is an ancestor of the new parent"));
    }
    if reference == Some(new) {
        return Ok(());
    }

    let moved = if new_is_fragment {
        let children = std::mem::take(&mut doc.data_mut(new)?.children);
        for child in &children {
            doc.data_mut(*child)?.parent = None;
        }
        children
    } else {
        doc.detach(new);
        vec![new]
    };

    let parent_data = doc.data_mut(parent)?;
    let position = match reference {
        Some(reference) => parent_data
            .children
            .iter()
            .position(|child| *child == reference)
            .ok_or(Error::NotFound)?,
        None => parent_data.children.len(),
    };
    parent_data.children.splice(position..position, moved.iter().copied());
    for node in moved {
        doc.data_mut(node)?.parent = Some(parent);
    }
    Ok(())
}

impl Node {
    /// Append `child` as the last child, moving it from any previous parent.
    pub fn append(&self, child: Node) -> Result<()> {
        trace!(parent = ?self, ?child, "append");
        document::with_mut(|doc| insert_into(doc, *self, child, None))
    }

    /// Append a new text node and return it.
    pub fn append_text(&self, text: &str) -> Result<Node> {
        let node = document::create_text_node(text);
        match self.append(node) {
            Ok(()) => Ok(node),
            Err(err) => {
                document::release(node);
                Err(err)
            }
        }
    }

    /// Insert `new` before `reference`, or append when `reference` is `None`.
    pub fn insert_before(&self, new: Node, reference: Option<Node>) -> Result<()> {
        trace!(parent = ?self, ?new, ?reference, "insert before");
        document::with_mut(|doc| insert_into(doc, *self, new, reference))
    }

    /// Detach `child` from this node and return it.
    pub fn remove_child(&self, child: Node) -> Result<Node> {
        document::with_mut(|doc| {
            doc.data(*self)?;
            if doc.data(child)?.parent != Some(*self) {
                return Err(Error::NotFound);
            }
            doc.detach(child);
            Ok(child)
        })
    }

    /// Detach this node from its parent, if any.
    pub fn remove(&self) {
        document::with_mut(|doc| doc.detach(*self));
    }

    /// Put `new` where this node is and detach this node.
    ///
    /// A node without a parent is left as is.
    pub fn replace_with(&self, new: Node) -> Result<()> {
        document::with_mut(|doc| {
            let Some(parent) = doc.data(*self)?.parent else {
                return Ok(());
            };
            if new == *self {
                return Ok(());
            }
            insert_into(doc, parent, new, Some(*self))?;
            doc.detach(*self);
            Ok(())
        })
    }
}

// =============================================================================
// Text
// =============================================================================

fn collect_text(doc: &document::Document, node: Node, out: &mut String) {
    let Some(data) = doc.get(node) else { return };
    match data.kind {
        NodeKind::Text => out.push_str(&data.data),
        _ => {
            for child in &data.children {
                collect_text(doc, *child, out);
            }
        }
    }
}

impl Node {
    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        document::with(|doc| collect_text(doc, *self, &mut out));
        out
    }

    pub fn inner_text(&self) -> String {
        self.text_content()
    }

    /// Replace all children with a single text node (none for an empty string).
    ///
    /// The replaced children are released along with their subtrees.
    pub fn set_inner_text(&self, text: &str) {
        let old = document::with_mut(|doc| {
            let Some(data) = doc.get_mut(*self) else {
                warn!(node = ?self, "write to released node");
                return None;
            };
            if data.kind == NodeKind::Text {
                data.data = text.to_string();
                return None;
            }
            let children = std::mem::take(&mut data.children);
            for child in &children {
                if let Some(child_data) = doc.get_mut(*child) {
                    child_data.parent = None;
                }
            }
            Some(children)
        });
        let Some(old) = old else { return };

        for child in old {
            document::release(child);
        }
        if !text.is_empty() {
            let node = document::create_text_node(text);
            self.write(|data| data.children.push(node));
            node.write(|data| data.parent = Some(*self));
        }
    }

    pub fn set_text_content(&self, text: &str) {
        self.set_inner_text(text);
    }
}

// =============================================================================
// Attributes
// =============================================================================

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, '"' | '\'' | '>' | '<' | '/' | '='))
}

impl Node {
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.read(|data| data.attribute(name).map(str::to_string))
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.read(|data| data.attribute(name).is_some())
    }

    /// Set an attribute on an element, keeping its original position if it exists.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        if !is_valid_attribute_name(name) {
            return Err(Error::MalformedAttribute(name.to_string()));
        }
        document::with_mut(|doc| {
            let data = doc.data_mut(*self)?;
            if !data.is_element() {
                return Err(Error::HierarchyRequest("only elements carry attributes"));
            }
            data.set_attribute(name, value);
            Ok(())
        })
    }

    pub fn remove_attribute(&self, name: &str) {
        self.write(|data| data.remove_attribute(name));
    }

    /// All attributes in insertion order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.read(|data| data.attributes.clone())
    }

    fn set_reflected(&self, name: &str, value: &str) {
        self.write(|data| {
            if data.is_element() {
                data.set_attribute(name, value);
            }
        });
    }
}

// =============================================================================
// Reflected Properties
// =============================================================================

impl Node {
    pub fn hidden(&self) -> bool {
        self.has_attribute("hidden")
    }

    pub fn set_hidden(&self, hidden: bool) {
        if hidden {
            self.set_reflected("hidden", "");
        } else {
            self.remove_attribute("hidden");
        }
    }

    pub fn id(&self) -> String {
        self.get_attribute("id").unwrap_or_default()
    }

    pub fn set_id(&self, id: &str) {
        self.set_reflected("id", id);
    }

    pub fn title(&self) -> String {
        self.get_attribute("title").unwrap_or_default()
    }

    pub fn set_title(&self, title: &str) {
        self.set_reflected("title", title);
    }

    /// Raw `class` attribute.
    pub fn class_name(&self) -> String {
        self.get_attribute("class").unwrap_or_default()
    }

    pub fn set_class_name(&self, class: &str) {
        self.set_reflected("class", class);
    }

    pub fn content_editable(&self) -> bool {
        matches!(
            self.get_attribute("contenteditable").as_deref(),
            Some("" | "true" | "plaintext-only")
        )
    }

    pub fn set_content_editable(&self, editable: bool) {
        self.set_reflected("contenteditable", if editable { "true" } else { "false" });
    }

    /// Spellcheck is on unless explicitly disabled.
    pub fn spellcheck(&self) -> bool {
        self.get_attribute("spellcheck").as_deref() != Some("false")
    }

    pub fn set_spellcheck(&self, spellcheck: bool) {
        self.set_reflected("spellcheck", if spellcheck { "true" } else { "false" });
    }

    /// Explicit `tabindex`, else 0 for focusable or editable elements and -1 otherwise.
    pub fn tab_index(&self) -> i32 {
        if let Some(index) = self.get_attribute("tabindex").and_then(|v| v.trim().parse().ok()) {
            return index;
        }
        if self.traits().contains(ElementTraits::FOCUSABLE) || self.content_editable() {
            0
        } else {
            -1
        }
    }

    pub fn set_tab_index(&self, index: i32) {
        self.set_reflected("tabindex", &index.to_string());
    }

    pub fn disabled(&self) -> bool {
        self.traits().contains(ElementTraits::FORM_CONTROL) && self.has_attribute("disabled")
    }

    pub fn set_disabled(&self, disabled: bool) {
        if disabled {
            self.set_reflected("disabled", "");
        } else {
            self.remove_attribute("disabled");
        }
    }

    /// Live value of a form control; empty for anything else.
    pub fn value(&self) -> String {
        self.read(|data| {
            if data.traits.contains(ElementTraits::FORM_CONTROL) {
                data.data.clone()
            } else {
                String::new()
            }
        })
    }

    pub fn set_value(&self, value: &str) {
        self.write(|data| {
            if data.traits.contains(ElementTraits::FORM_CONTROL) {
                data.data = value.to_string();
            }
        });
    }
}

// =============================================================================
// Property Table
// =============================================================================

impl Node {
    fn resolve_property(&self, name: &str) -> Option<Property> {
        self.read(|data| {
            if data.is_element() {
                Property::resolve(name, data.traits)
            } else {
                None
            }
        })
    }

    /// Whether `name` is a live property of this node rather than an attribute.
    pub fn has_property(&self, name: &str) -> bool {
        self.resolve_property(name).is_some()
    }

    /// Validate `value` for property `name` without assigning it.
    pub(crate) fn check_property(&self, name: &str, value: &Value) -> Result<()> {
        match self.resolve_property(name) {
            Some(property) => property.check(name, value),
            None => Err(Error::PropertyType {
                name: name.to_string(),
                expected: "a known property",
            }),
        }
    }

    /// Assign a live property. Fails if the property is unknown or the type is wrong.
    pub fn set_property(&self, name: &str, value: Value) -> Result<()> {
        self.check_property(name, &value)?;
        let Some(property) = self.resolve_property(name) else {
            return Err(Error::StaleNode);
        };
        property.apply(*self, value);
        Ok(())
    }

    pub fn get_property(&self, name: &str) -> Option<Value> {
        self.resolve_property(name)
            .and_then(|property| property.read(*self))
    }

    /// Validate one attributes-bag entry for [`Node::assign`].
    pub(crate) fn check_assign(&self, name: &str, value: &Value) -> Result<()> {
        if self.has_property(name) {
            return self.check_property(name, value);
        }
        if !is_valid_attribute_name(name) || value.to_attribute_string().is_none() {
            return Err(Error::MalformedAttribute(name.to_string()));
        }
        Ok(())
    }

    /// Assign a live property if this node has one named `name`, else set a
    /// string attribute.
    pub(crate) fn assign(&self, name: &str, value: Value) -> Result<()> {
        if self.has_property(name) {
            return self.set_property(name, value);
        }
        let text = value
            .to_attribute_string()
            .ok_or_else(|| Error::MalformedAttribute(name.to_string()))?;
        self.set_attribute(name, &text)
    }
}
