//! Render function - Declarative tree description to live nodes.
//!
//! [`render`] takes a [`Tag`] and an [`Attrs`] bag and returns a
//! [`RenderOutput`]: the new root plus every reference name registered while
//! building it.
//!
//! # Example
//!
//! ```ignore
//! use redactio::jsx::{render, Attrs};
//!
//! let output = render("li", Attrs::new().class("todo-item").child(
//!     render("span", Attrs::new().reference("nameSpan").child("milk"))?,
//! ))?;
//!
//! assert_eq!(output.refs.node("nameSpan")?.inner_text(), "milk");
//! ```
//!
//! # Attribute application
//!
//! Children are appended first, merging their refs (last write wins). Then
//! `ref` registers this call's component (or, failing that, its root) in the
//! parent scope. Every other key becomes a live property when the root has one
//! by that name and a string attribute otherwise. Fragments take no
//! attributes; those keys are skipped.

mod refs;

pub use refs::{ComponentRef, RefTarget, Refs};

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::component::Construct;
use crate::dom::{self, Event, Node, Value};
use crate::error::{Error, Result};

// =============================================================================
// Tag
// =============================================================================

/// Constructor for a component tag.
#[derive(Clone)]
pub struct ComponentFactory(Rc<dyn Fn(&Props) -> Result<ComponentRef>>);

impl ComponentFactory {
    pub fn new(f: impl Fn(&Props) -> Result<ComponentRef> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Factory for a [`Construct`] type.
    pub fn of<T: Construct>() -> Self {
        Self::new(|props| T::construct(props).map(ComponentRef::new))
    }

    pub fn construct(&self, props: &Props) -> Result<ComponentRef> {
        (self.0)(props)
    }
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ComponentFactory(..)")
    }
}

/// What [`render`] builds.
#[derive(Clone, Debug)]
pub enum Tag {
    /// A primitive element by tag name.
    Element(String),
    /// A multi-node root with no attributes of its own.
    Fragment,
    /// A component; its root becomes the rendered root.
    Component(ComponentFactory),
}

impl Tag {
    pub fn component<T: Construct>() -> Self {
        Tag::Component(ComponentFactory::of::<T>())
    }

    pub fn factory(f: impl Fn(&Props) -> Result<ComponentRef> + 'static) -> Self {
        Tag::Component(ComponentFactory::new(f))
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::Element(name.to_string())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::Element(name)
    }
}

impl From<ComponentFactory> for Tag {
    fn from(factory: ComponentFactory) -> Self {
        Tag::Component(factory)
    }
}

// =============================================================================
// Props / Children / Attrs
// =============================================================================

/// Ordered property bag. A repeated key overwrites the earlier value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props(Vec<(String, Value)>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    /// String prop; a present non-string value is a type error.
    pub fn get_str(&self, name: &str) -> Result<Option<&str>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(_) => Err(Error::PropertyType { name: name.to_string(), expected: "a string" }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl IntoIterator for Props {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One child in an attributes bag.
#[derive(Debug)]
pub enum Child {
    Output(RenderOutput),
    Node(Node),
    Text(String),
}

impl From<RenderOutput> for Child {
    fn from(output: RenderOutput) -> Self {
        Child::Output(output)
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

/// Attributes bag with the reserved `ref` and `children` keys split out.
#[derive(Debug, Default)]
pub struct Attrs {
    reference: Option<String>,
    children: Vec<Child>,
    props: Props,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the result under `name` in the parent scope.
    pub fn reference(mut self, name: impl Into<String>) -> Self {
        self.reference = Some(name.into());
        self
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Any other key. `ref` with a string value is routed to [`Attrs::reference`].
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        if name == "ref" {
            if let Value::Str(reference) = value {
                self.reference = Some(reference);
                return self;
            }
        }
        self.props.insert(name, value);
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class.into())
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id.into())
    }

    pub fn hidden(self, hidden: bool) -> Self {
        self.attr("hidden", hidden)
    }

    /// `on<event>` handler property.
    pub fn on(self, event: &str, handler: impl Fn(&Event) -> Result<()> + 'static) -> Self {
        self.attr(format!("on{event}"), Value::Handler(dom::handler(handler)))
    }

    pub fn reference_name(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn props(&self) -> &Props {
        &self.props
    }
}

// =============================================================================
// Render
// =============================================================================

/// Result of one construction call.
#[derive(Debug)]
pub struct RenderOutput {
    /// Exclusively owned root: an element or a fragment.
    pub root: Node,
    /// Registrations made by this call and merged from its children.
    pub refs: Refs,
}

impl RenderOutput {
    pub fn into_parts(self) -> (Node, Refs) {
        (self.root, self.refs)
    }
}

fn release_children(children: Vec<Child>) {
    for child in children {
        if let Child::Output(output) = child {
            output.root.release();
        }
    }
}

fn create_root(tag: &Tag, props: &Props) -> Result<(Node, Option<ComponentRef>)> {
    match tag {
        Tag::Element(name) => Ok((dom::create_element(name)?, None)),
        Tag::Fragment => Ok((dom::create_fragment(), None)),
        Tag::Component(factory) => {
            let component = factory.construct(props)?;
            Ok((component.root(), Some(component)))
        }
    }
}

/// Check everything that could fail before the first mutation.
fn validate(root: Node, children: &[Child], props: &Props) -> Result<()> {
    for child in children {
        let node = match child {
            Child::Output(output) => output.root,
            Child::Node(node) => *node,
            Child::Text(_) => continue,
        };
        if !node.is_alive() {
            return Err(Error::StaleNode);
        }
        if node.contains(root) {
            return Err(Error::HierarchyRequest("node is an ancestor of the new parent"));
        }
    }
    if root.is_fragment() {
        return Ok(());
    }
    for (name, value) in props.iter() {
        if name == "children" {
            continue;
        }
        root.check_assign(name, value)?;
    }
    Ok(())
}

/// Build a live tree for `tag` from `attrs`.
///
/// On failure nothing built by this call survives: the new root and every
/// child output are released.
pub fn render(tag: impl Into<Tag>, attrs: Attrs) -> Result<RenderOutput> {
    let tag = tag.into();
    let Attrs { reference, children, props } = attrs;

    let (root, component) = match create_root(&tag, &props) {
        Ok(created) => created,
        Err(err) => {
            debug!(?tag, error = %err, "construction failed");
            release_children(children);
            return Err(err);
        }
    };
    if let Err(err) = validate(root, &children, &props) {
        debug!(?tag, error = %err, "construction failed");
        // A component root that is already attached belongs to its parent
        if root.parent().is_none() {
            root.release();
        }
        release_children(children);
        return Err(err);
    }
    trace!(?tag, children = children.len(), props = props.len(), "render");

    let mut refs = Refs::new();
    for child in children {
        match child {
            Child::Output(output) => {
                refs.merge(output.refs);
                root.append(output.root)?;
            }
            Child::Node(node) => root.append(node)?,
            Child::Text(text) => {
                root.append_text(&text)?;
            }
        }
    }

    if let Some(name) = reference {
        let target = match component {
            Some(component) => RefTarget::Component(component),
            None => RefTarget::Node(root),
        };
        refs.insert(name, target);
    }

    if root.is_fragment() {
        if !props.is_empty() {
            debug!(count = props.len(), "fragment root: attributes skipped");
        }
    } else {
        for (name, value) in props {
            if name == "children" {
                continue;
            }
            root.assign(&name, value)?;
        }
    }

    Ok(RenderOutput { root, refs })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::component::{Component, ComponentBase};
    use crate::dom::{node_count, reset_document};

    #[derive(Clone)]
    struct Badge {
        base: ComponentBase,
    }

    impl Component for Badge {
        fn base(&self) -> &ComponentBase {
            &self.base
        }
    }

    impl Construct for Badge {
        fn construct(props: &Props) -> Result<Self> {
            let label = props.get_str("label")?.unwrap_or("badge");
            let output = render(
                "span",
                Attrs::new().child(render("b", Attrs::new().reference("label").child(label))?),
            )?;
            Ok(Self { base: ComponentBase::new(output) })
        }
    }

    #[test]
    fn test_primitive_with_text_children() {
        reset_document();

        let output = render("p", Attrs::new().child("Hello, ").child("world")).unwrap();
        assert_eq!(output.root.tag_name().as_deref(), Some("p"));
        assert_eq!(output.root.inner_text(), "Hello, world");
        assert!(output.refs.is_empty());
    }

    #[test]
    fn test_refs_merge_from_children() {
        reset_document();

        let output = render(
            "li",
            Attrs::new()
                .child(render("span", Attrs::new().reference("nameSpan").child("milk")).unwrap())
                .child(render("button", Attrs::new().reference("finish").child("finish")).unwrap()),
        )
        .unwrap();

        assert_eq!(output.refs.names(), vec!["finish", "nameSpan"]);
        assert_eq!(output.refs.node("nameSpan").unwrap().inner_text(), "milk");
        assert_eq!(output.refs.node("finish").unwrap().parent(), Some(output.root));
    }

    #[test]
    fn test_ref_collision_last_write_wins() {
        reset_document();

        let output = render(
            "div",
            Attrs::new()
                .reference("dup")
                .child(render("span", Attrs::new().reference("dup")).unwrap())
                .child(render("em", Attrs::new().reference("inner")).unwrap())
                .child(render("i", Attrs::new().reference("inner")).unwrap()),
        )
        .unwrap();

        // Own ref is registered after children merge
        assert_eq!(output.refs.node("dup").unwrap(), output.root);
        assert_eq!(output.refs.node("inner").unwrap().tag_name().as_deref(), Some("i"));
        assert_eq!(output.refs.len(), 2);
    }

    #[test]
    fn test_property_versus_attribute() {
        reset_document();

        let clicked = Rc::new(Cell::new(false));
        let clicked_inner = clicked.clone();
        let output = render(
            "input",
            Attrs::new()
                .class("name")
                .attr("value", "eggs")
                .attr("data-row", 3)
                .hidden(true)
                .on("click", move |_| {
                    clicked_inner.set(true);
                    Ok(())
                }),
        )
        .unwrap();
        let input = output.root;

        assert_eq!(input.get_attribute("class").as_deref(), Some("name"));
        assert_eq!(input.value(), "eggs");
        assert!(!input.has_attribute("value"));
        assert_eq!(input.get_attribute("data-row").as_deref(), Some("3"));
        assert!(input.hidden());

        input.click().unwrap();
        assert!(clicked.get());
    }

    #[test]
    fn test_component_tag_prefers_component_ref() {
        reset_document();

        let output = render(
            "div",
            Attrs::new().child(
                render(Tag::component::<Badge>(), Attrs::new().reference("badge").attr("label", "new"))
                    .unwrap(),
            ),
        )
        .unwrap();

        let badge: Badge = output.refs.component("badge").unwrap();
        assert_eq!(badge.inner_text(), "new");
        assert_eq!(badge.root().parent(), Some(output.root));
        // Inner refs of the component stay with the component
        assert!(!output.refs.contains("label"));
        assert!(badge.refs().contains("label"));
        // Remaining props land on the component root
        assert_eq!(badge.root().get_attribute("label").as_deref(), Some("new"));
    }

    #[test]
    fn test_fragment_root() {
        reset_document();

        let output = render(
            Tag::Fragment,
            Attrs::new()
                .reference("group")
                .class("ignored")
                .child(render("dt", Attrs::new()).unwrap())
                .child(render("dd", Attrs::new()).unwrap()),
        )
        .unwrap();

        assert!(output.root.is_fragment());
        assert_eq!(output.root.children().len(), 2);
        assert!(output.root.attributes().is_empty());
        assert_eq!(output.refs.node("group").unwrap(), output.root);
    }

    #[test]
    fn test_unknown_tag_leaves_nothing_behind() {
        reset_document();

        let before = node_count();
        let err = render(
            "not a tag",
            Attrs::new().child(render("span", Attrs::new().child("x")).unwrap()),
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidTagName(_)));
        assert_eq!(node_count(), before);
    }

    #[test]
    fn test_malformed_attrs_leave_nothing_behind() {
        reset_document();

        let before = node_count();
        let err = render(
            "span",
            Attrs::new().child("text").hidden(true).attr("hidden", "yes"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::PropertyType { .. }));
        assert_eq!(node_count(), before);

        let err = render("span", Attrs::new().attr("bad name", "x")).unwrap_err();
        assert!(matches!(err, Error::MalformedAttribute(_)));
        assert_eq!(node_count(), before);
    }

    #[test]
    fn test_ancestor_child_rejected_before_mutation() {
        reset_document();

        let container = dom::create_element("div").unwrap();
        let root = dom::create_element("span").unwrap();
        container.append(root).unwrap();
        let factory = Tag::factory(move |_| {
            let output = RenderOutput { root, refs: Refs::new() };
            Ok(ComponentRef::new(Badge { base: ComponentBase::new(output) }))
        });

        let err = render(factory, Attrs::new().child("first").child(container)).unwrap_err();
        assert!(matches!(err, Error::HierarchyRequest(_)));
        assert!(root.child_nodes().is_empty());
        assert_eq!(root.parent(), Some(container));
        assert!(container.is_alive());
    }

    #[test]
    fn test_raw_node_child_is_moved() {
        reset_document();

        let existing = dom::create_element("em").unwrap();
        let output = render("p", Attrs::new().child(existing)).unwrap();
        assert_eq!(existing.parent(), Some(output.root));
    }

    #[test]
    fn test_props_overwrite_in_place() {
        let mut props = Props::new();
        props.insert("a", 1);
        props.insert("b", 2);
        props.insert("a", 3);

        let keys: Vec<&str> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(props.get("a"), Some(&Value::Int(3)));
        assert!(props.get_str("a").is_err());
    }
}
