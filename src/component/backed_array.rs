//! Backed array - Ordered collection of components mirrored by live children.
//!
//! The collection owns a container element (`ul` by default) and a list of
//! items. For every valid index `i`, `items[i].element()` is the `i`-th element
//! child of the container. Every mutator validates first and then edits both
//! sides, so a failed call leaves both untouched.
//!
//! # Example
//!
//! ```ignore
//! use redactio::component::BackedArray;
//!
//! let items = BackedArray::with_tag("ol")?;
//! items.push(first)?;
//! items.insert_at(0, second)?;
//! let removed = items.remove_at(1)?;
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::{Component, ComponentBase, Construct};
use crate::dom::Node;
use crate::error::{Error, Result};
use crate::jsx::{render, Attrs, Props};

/// Array-like operations shared by view-backed collections.
pub trait Arrayish<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, item: T) -> Result<()>;
    fn remove_at(&self, index: usize) -> Result<T>;
    fn insert_at(&self, index: usize, item: T) -> Result<()>;
    fn get(&self, index: usize) -> Result<T>;
    fn set(&self, index: usize, item: T) -> Result<T>;
}

struct Inner<T> {
    base: ComponentBase,
    items: RefCell<Vec<T>>,
}

/// Shared handle to an ordered, view-backed collection.
pub struct BackedArray<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for BackedArray<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T> PartialEq for BackedArray<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> fmt::Debug for BackedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackedArray")
            .field("element", &self.inner.base.element())
            .field("len", &self.inner.items.borrow().len())
            .finish()
    }
}

impl<T: Component + Clone> BackedArray<T> {
    /// Empty collection rendered as a `ul`.
    pub fn new() -> Result<Self> {
        Self::with_tag("ul")
    }

    /// Empty collection rendered as `tag`.
    pub fn with_tag(tag: &str) -> Result<Self> {
        let output = render(tag, Attrs::new())?;
        Ok(Self {
            inner: Rc::new(Inner {
                base: ComponentBase::new(output),
                items: RefCell::new(Vec::new()),
            }),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_index(&self, index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(Error::IndexOutOfBounds { index, len })
        }
    }

    /// An item may join only if its element is alive and not already sitting
    /// in a live container (a fragment parent is fine).
    fn check_adoptable(&self, item: &T) -> Result<()> {
        let node = item.element();
        if !node.is_alive() {
            return Err(Error::StaleNode);
        }
        match node.parent() {
            Some(parent) if !parent.is_fragment() => Err(Error::AlreadyAttached),
            _ => Ok(()),
        }
    }

    /// Live child at `index`, verified against the logical item.
    fn live_child(&self, index: usize) -> Result<Node> {
        let expected = self.inner.items.borrow()[index].element();
        match self.element().element_child(index) {
            Some(live) if live == expected => Ok(live),
            _ => Err(Error::Desynchronized { index }),
        }
    }

    /// Append `item` to the end of both sequences.
    pub fn push(&self, item: T) -> Result<()> {
        self.check_adoptable(&item)?;
        self.element().append(item.element())?;
        self.inner.items.borrow_mut().push(item);
        trace!(len = self.len(), "backed array push");
        Ok(())
    }

    /// Remove the item at `index` and detach its node.
    pub fn remove_at(&self, index: usize) -> Result<T> {
        self.check_index(index, self.len())?;
        let node = self.live_child(index)?;
        self.element().remove_child(node)?;
        let removed = self.inner.items.borrow_mut().remove(index);
        trace!(index, len = self.len(), "backed array remove");
        Ok(removed)
    }

    /// Insert `item` before the item currently at `index`; `index == len` appends.
    pub fn insert_at(&self, index: usize, item: T) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        self.check_adoptable(&item)?;
        let reference = if index < len { Some(self.live_child(index)?) } else { None };
        self.element().insert_before(item.element(), reference)?;
        self.inner.items.borrow_mut().insert(index, item);
        trace!(index, len = len + 1, "backed array insert");
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<T> {
        let items = self.inner.items.borrow();
        items
            .get(index)
            .cloned()
            .ok_or(Error::IndexOutOfBounds { index, len: items.len() })
    }

    /// Replace the item at `index`, swapping its node in place.
    ///
    /// Returns the previous item. Its node is detached unless it is the same
    /// element as `item`; releasing it is up to the caller.
    pub fn set(&self, index: usize, item: T) -> Result<T> {
        self.check_index(index, self.len())?;
        let current = self.live_child(index)?;
        if item.element() != current {
            self.check_adoptable(&item)?;
            current.replace_with(item.element())?;
        }
        let previous = std::mem::replace(&mut self.inner.items.borrow_mut()[index], item);
        trace!(index, "backed array set");
        Ok(previous)
    }

    /// Items by increasing index. Each call starts over.
    pub fn iter(&self) -> Iter<T> {
        Iter { array: self.clone(), index: 0 }
    }

    /// Project every item, in order.
    ///
    /// No borrow is held while `project` runs, so it may read the collection.
    pub fn map<U>(&self, mut project: impl FnMut(&T, usize, &Self) -> U) -> Vec<U> {
        let mut result = Vec::with_capacity(self.len());
        for (index, item) in self.iter().enumerate() {
            result.push(project(&item, index, self));
        }
        result
    }

    /// Items matching `predicate`, in their original relative order.
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        self.iter().filter(|item| predicate(item)).collect()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.borrow().clone()
    }
}

impl<T: Component + Clone> Component for BackedArray<T> {
    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }
}

impl<T: Component + Clone> Construct for BackedArray<T> {
    /// Reads an optional string prop `tag` (default `ul`).
    fn construct(props: &Props) -> Result<Self> {
        Self::with_tag(props.get_str("tag")?.unwrap_or("ul"))
    }
}

impl<T: Component + Clone> Arrayish<T> for BackedArray<T> {
    fn len(&self) -> usize {
        BackedArray::len(self)
    }

    fn push(&self, item: T) -> Result<()> {
        BackedArray::push(self, item)
    }

    fn remove_at(&self, index: usize) -> Result<T> {
        BackedArray::remove_at(self, index)
    }

    fn insert_at(&self, index: usize, item: T) -> Result<()> {
        BackedArray::insert_at(self, index, item)
    }

    fn get(&self, index: usize) -> Result<T> {
        BackedArray::get(self, index)
    }

    fn set(&self, index: usize, item: T) -> Result<T> {
        BackedArray::set(self, index, item)
    }
}

/// Lazy iterator over a [`BackedArray`].
pub struct Iter<T> {
    array: BackedArray<T>,
    index: usize,
}

impl<T: Component + Clone> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.array.inner.items.borrow().get(self.index).cloned()?;
        self.index += 1;
        Some(item)
    }
}

impl<'a, T: Component + Clone> IntoIterator for &'a BackedArray<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Iter<T> {
        self.iter()
    }
}
