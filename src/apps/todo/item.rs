//! One row of the to-do list.
//!
//! ```text
//! li.todo-item
//! ├── span defaultControls
//! │   ├── span nameSpan      (click: start editing unless done)
//! │   ├── button finish      (click: mark done)
//! │   └── button remove      (click: ask the host to remove this item)
//! └── span editControls [hidden]
//!     ├── input nameInput
//!     ├── button ✔          (click: commit the edit)
//!     └── button ✖          (click: cancel the edit)
//! ```

use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::component::{Component, ComponentBase, SelfRef};
use crate::dom::{Event, Node};
use crate::error::Result;
use crate::jsx::{render, Attrs};

/// Owner of a set of items. Items call back into it to remove themselves.
pub trait TodoHost {
    fn remove(&self, item: &TodoItem) -> Result<()>;
}

struct ItemInner {
    base: ComponentBase,
    host: Weak<dyn TodoHost>,
    default_controls: Node,
    name_span: Node,
    finish: Node,
    edit_controls: Node,
    name_input: Node,
}

fn on_item(
    this: &SelfRef<ItemInner>,
    f: fn(&TodoItem) -> Result<()>,
) -> impl Fn(&Event) -> Result<()> + use<> {
    this.handler(move |inner, _| f(&TodoItem { inner }))
}

/// Shared handle to one item. Two handles are equal when they name the same item.
#[derive(Clone)]
pub struct TodoItem {
    inner: Rc<ItemInner>,
}

impl TodoItem {
    pub fn new(host: Weak<dyn TodoHost>, name: &str, done: bool) -> Result<Self> {
        let this: SelfRef<ItemInner> = SelfRef::new();

        let output = render(
            "li",
            Attrs::new()
                .class("todo-item")
                .child(render(
                    "span",
                    Attrs::new()
                        .reference("defaultControls")
                        .child(render(
                            "span",
                            Attrs::new()
                                .reference("nameSpan")
                                .on("click", on_item(&this, |item| if item.done() { Ok(()) } else { item.start_edit() }))
                                .child(name),
                        )?)
                        .child(render(
                            "button",
                            Attrs::new().reference("finish").on("click", on_item(&this, TodoItem::finish)).child("finish"),
                        )?)
                        .child(render("button", Attrs::new().on("click", on_item(&this, TodoItem::remove)).child("remove"))?),
                )?)
                .child(render(
                    "span",
                    Attrs::new()
                        .hidden(true)
                        .reference("editControls")
                        .child(render("input", Attrs::new().reference("nameInput"))?)
                        .child(render("button", Attrs::new().on("click", on_item(&this, TodoItem::finish_edit)).child("✔"))?)
                        .child(render(
                            "button",
                            Attrs::new().on("click", on_item(&this, |item| item.show_edit_controls(false))).child("✖"),
                        )?),
                )?),
        )?;

        let base = ComponentBase::new(output);
        let refs = base.refs();
        let inner = Rc::new(ItemInner {
            default_controls: refs.node("defaultControls")?,
            name_span: refs.node("nameSpan")?,
            finish: refs.node("finish")?,
            edit_controls: refs.node("editControls")?,
            name_input: refs.node("nameInput")?,
            base,
            host,
        });
        this.bind(&inner);

        let item = Self { inner };
        item.set_done(done)?;
        Ok(item)
    }

    pub fn name(&self) -> String {
        self.inner.name_span.inner_text()
    }

    pub fn set_name(&self, name: &str) {
        self.inner.name_span.set_inner_text(name);
    }

    pub fn done(&self) -> bool {
        self.class_list().contains("done")
    }

    /// Completion is one transition: the `done` class and the hidden `finish`
    /// control always agree.
    pub fn set_done(&self, done: bool) -> Result<()> {
        self.inner.finish.set_hidden(done);
        self.class_list().toggle_force("done", done)?;
        Ok(())
    }

    pub fn finish(&self) -> Result<()> {
        debug!(name = %self.name(), "todo finished");
        self.set_done(true)
    }

    /// Value currently typed into the edit field.
    pub fn name_editing(&self) -> String {
        self.inner.name_input.value()
    }

    pub fn set_name_editing(&self, name: &str) {
        self.inner.name_input.set_value(name);
    }

    pub fn is_editing(&self) -> bool {
        !self.inner.edit_controls.hidden()
    }

    pub fn start_edit(&self) -> Result<()> {
        self.set_name_editing(&self.name());
        self.show_edit_controls(true)?;
        self.inner.name_input.focus()
    }

    pub fn finish_edit(&self) -> Result<()> {
        self.set_name(&self.name_editing());
        self.show_edit_controls(false)
    }

    pub fn show_edit_controls(&self, show: bool) -> Result<()> {
        self.inner.default_controls.set_hidden(show);
        self.inner.edit_controls.set_hidden(!show);
        Ok(())
    }

    /// Ask the owning host to drop this item.
    pub fn remove(&self) -> Result<()> {
        match self.inner.host.upgrade() {
            Some(host) => host.remove(self),
            None => {
                warn!(name = %self.name(), "todo item outlived its list");
                Ok(())
            }
        }
    }
}

impl Component for TodoItem {
    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }
}

impl PartialEq for TodoItem {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for TodoItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoItem")
            .field("element", &self.element())
            .field("name", &self.name())
            .field("done", &self.done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::dom::reset_document;

    #[derive(Default)]
    struct RecordingHost {
        removed: RefCell<Vec<String>>,
    }

    impl TodoHost for RecordingHost {
        fn remove(&self, item: &TodoItem) -> Result<()> {
            self.removed.borrow_mut().push(item.name());
            Ok(())
        }
    }

    fn detached() -> Weak<dyn TodoHost> {
        Weak::<RecordingHost>::new()
    }

    fn button(item: &TodoItem, label: &str) -> Node {
        item.query_selector_all("button")
            .unwrap()
            .into_iter()
            .find(|b| b.inner_text() == label)
            .unwrap()
    }

    #[test]
    fn test_new_item_state() {
        reset_document();

        let item = TodoItem::new(detached(), "milk", false).unwrap();
        assert_eq!(item.name(), "milk");
        assert!(!item.done());
        assert!(!item.is_editing());
        assert!(item.class_list().contains("todo-item"));
        assert!(!item.refs().node("finish").unwrap().hidden());
    }

    #[test]
    fn test_finish_hides_control() {
        reset_document();

        let item = TodoItem::new(detached(), "milk", false).unwrap();
        button(&item, "finish").click().unwrap();

        assert!(item.done());
        assert!(item.done());
        assert!(item.refs().node("finish").unwrap().hidden());
    }

    #[test]
    fn test_done_is_one_transition() {
        reset_document();

        let item = TodoItem::new(detached(), "eggs", true).unwrap();
        let finish = item.refs().node("finish").unwrap();
        assert!(item.done() && finish.hidden());

        item.set_done(false).unwrap();
        assert!(!item.done());
        assert!(!finish.hidden());
    }

    #[test]
    fn test_edit_round_trip() {
        reset_document();

        let item = TodoItem::new(detached(), "milk", false).unwrap();
        item.refs().node("nameSpan").unwrap().click().unwrap();
        assert!(item.is_editing());
        assert_eq!(item.name_editing(), "milk");
        assert!(item.refs().node("defaultControls").unwrap().hidden());

        item.set_name_editing("oat milk");
        button(&item, "✔").click().unwrap();
        assert_eq!(item.name(), "oat milk");
        assert!(!item.is_editing());

        item.start_edit().unwrap();
        item.set_name_editing("discarded");
        button(&item, "✖").click().unwrap();
        assert_eq!(item.name(), "oat milk");
        assert!(!item.is_editing());
    }

    #[test]
    fn test_done_item_does_not_edit() {
        reset_document();

        let item = TodoItem::new(detached(), "bread", true).unwrap();
        item.refs().node("nameSpan").unwrap().click().unwrap();
        assert!(!item.is_editing());
    }

    #[test]
    fn test_remove_asks_host() {
        reset_document();

        let host = Rc::new(RecordingHost::default());
        let weak: Weak<dyn TodoHost> = Rc::downgrade(&host) as Weak<dyn TodoHost>;
        let item = TodoItem::new(weak, "milk", false).unwrap();

        button(&item, "remove").click().unwrap();
        assert_eq!(*host.removed.borrow(), vec!["milk".to_string()]);

        // Without a host the button does nothing
        drop(host);
        button(&item, "remove").click().unwrap();
    }

    #[test]
    fn test_identity_equality() {
        reset_document();

        let a = TodoItem::new(detached(), "milk", false).unwrap();
        let b = TodoItem::new(detached(), "milk", false).unwrap();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
