//! Reference map - Names bound during construction.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::component::Component;
use crate::dom::Node;
use crate::error::{Error, Result};

/// Type-erased handle to a component instance.
#[derive(Clone)]
pub struct ComponentRef {
    root: Node,
    element: Node,
    instance: Rc<dyn Any>,
}

impl ComponentRef {
    pub fn new<T: Component + Clone>(component: T) -> Self {
        Self {
            root: component.root(),
            element: component.element(),
            instance: Rc::new(component),
        }
    }

    pub fn root(&self) -> Node {
        self.root
    }

    pub fn element(&self) -> Node {
        self.element
    }

    /// The instance as `T`, if that is what it is.
    pub fn downcast<T: Clone + 'static>(&self) -> Option<T> {
        self.instance.downcast_ref::<T>().cloned()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.instance.is::<T>()
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef")
            .field("root", &self.root)
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

/// What a reference name resolves to. Components are preferred over their raw
/// root when both are available.
#[derive(Clone, Debug)]
pub enum RefTarget {
    Node(Node),
    Component(ComponentRef),
}

impl RefTarget {
    /// The node to read or mutate: the node itself, or a component's element.
    pub fn node(&self) -> Node {
        match self {
            RefTarget::Node(node) => *node,
            RefTarget::Component(component) => component.element(),
        }
    }

    pub fn as_component(&self) -> Option<&ComponentRef> {
        match self {
            RefTarget::Component(component) => Some(component),
            RefTarget::Node(_) => None,
        }
    }
}

/// Flat map from reference name to target.
///
/// Collision policy: last write wins. No duplicate detection.
#[derive(Clone, Debug, Default)]
pub struct Refs {
    entries: HashMap<String, RefTarget>,
}

impl Refs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning whatever it pointed at before.
    pub fn insert(&mut self, name: impl Into<String>, target: RefTarget) -> Option<RefTarget> {
        self.entries.insert(name.into(), target)
    }

    /// Fold `other` into this map; its entries win on collision.
    pub fn merge(&mut self, other: Refs) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, name: &str) -> Option<&RefTarget> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Node bound to `name` (a component's element for component targets).
    pub fn node(&self, name: &str) -> Result<Node> {
        self.get(name)
            .map(RefTarget::node)
            .ok_or_else(|| Error::UnknownRef(name.to_string()))
    }

    /// Component bound to `name`, as `T`.
    pub fn component<T: Clone + 'static>(&self, name: &str) -> Result<T> {
        let target = self
            .get(name)
            .ok_or_else(|| Error::UnknownRef(name.to_string()))?;
        target
            .as_component()
            .and_then(ComponentRef::downcast::<T>)
            .ok_or_else(|| Error::RefKind {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RefTarget)> {
        self.entries.iter().map(|(name, target)| (name.as_str(), target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{create_element, reset_document};

    #[test]
    fn test_last_write_wins() {
        reset_document();

        let first = create_element("span").unwrap();
        let second = create_element("span").unwrap();

        let mut refs = Refs::new();
        assert!(refs.insert("name", RefTarget::Node(first)).is_none());
        assert!(refs.insert("name", RefTarget::Node(second)).is_some());
        assert_eq!(refs.node("name").unwrap(), second);
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_merge_overwrites() {
        reset_document();

        let a = create_element("span").unwrap();
        let b = create_element("span").unwrap();
        let c = create_element("span").unwrap();

        let mut refs = Refs::new();
        refs.insert("x", RefTarget::Node(a));
        refs.insert("y", RefTarget::Node(b));

        let mut other = Refs::new();
        other.insert("x", RefTarget::Node(c));
        refs.merge(other);

        assert_eq!(refs.node("x").unwrap(), c);
        assert_eq!(refs.node("y").unwrap(), b);
        assert_eq!(refs.names(), vec!["x", "y"]);
    }

    #[test]
    fn test_lookup_errors() {
        reset_document();

        let mut refs = Refs::new();
        refs.insert("plain", RefTarget::Node(create_element("p").unwrap()));

        assert!(matches!(refs.node("missing"), Err(Error::UnknownRef(_))));
        assert!(matches!(refs.component::<String>("missing"), Err(Error::UnknownRef(_))));
        assert!(matches!(refs.component::<String>("plain"), Err(Error::RefKind { .. })));
    }
}
