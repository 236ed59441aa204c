//! The to-do list: an ordered collection of items, an add form and an
//! export panel.

use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};

use super::item::{TodoHost, TodoItem};
use crate::clipboard;
use crate::component::{BackedArray, Component, ComponentBase, SelfRef};
use crate::dom::Node;
use crate::error::{Error, Result};
use crate::jsx::{render, Attrs, Tag};

/// One exported item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub name: String,
    pub done: bool,
}

struct ListInner {
    base: ComponentBase,
    items: BackedArray<TodoItem>,
    name_input: Node,
    output_area: Node,
}

impl TodoHost for ListInner {
    /// Remove every entry that is `item`, releasing its nodes.
    fn remove(&self, item: &TodoItem) -> Result<()> {
        for index in (0..self.items.len()).rev() {
            if self.items.get(index)? == *item {
                let removed = self.items.remove_at(index)?;
                debug!(index, name = %removed.name(), "todo removed");
                removed.release();
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct TodoList {
    inner: Rc<ListInner>,
}

impl TodoList {
    pub fn new() -> Result<Self> {
        let this: SelfRef<ListInner> = SelfRef::new();

        let output = render(
            "div",
            Attrs::new()
                .child(render("h1", Attrs::new().child("Todo"))?)
                .child(render(
                    Tag::component::<BackedArray<TodoItem>>(),
                    Attrs::new().reference("items").attr("tag", "ol"),
                )?)
                .child(render(
                    "div",
                    Attrs::new()
                        .child(render("input", Attrs::new().reference("nameInput"))?)
                        .child(render(
                            "button",
                            Attrs::new()
                                .on("click", this.handler(|inner, _| TodoList { inner }.add().map(drop)))
                                .child("Add"),
                        )?),
                )?)
                .child(render("h2", Attrs::new().child("Export"))?)
                .child(render(
                    "button",
                    Attrs::new()
                        .on("click", this.handler(|inner, _| TodoList { inner }.export().map(drop)))
                        .child("export"),
                )?)
                .child(render("pre", Attrs::new().reference("outputArea"))?),
        )?;

        let base = ComponentBase::new(output);
        let refs = base.refs();
        let inner = Rc::new(ListInner {
            items: refs.component("items")?,
            name_input: refs.node("nameInput")?,
            output_area: refs.node("outputArea")?,
            base,
        });
        this.bind(&inner);
        Ok(Self { inner })
    }

    fn host(&self) -> Weak<dyn TodoHost> {
        let weak: Weak<ListInner> = Rc::downgrade(&self.inner);
        weak
    }

    pub fn items(&self) -> BackedArray<TodoItem> {
        self.inner.items.clone()
    }

    pub fn name_input(&self) -> Node {
        self.inner.name_input
    }

    pub fn output_area(&self) -> Node {
        self.inner.output_area
    }

    /// Add an item named after the input's value and clear the input.
    pub fn add(&self) -> Result<TodoItem> {
        let name = self.inner.name_input.value();
        let item = self.add_item(&name, false)?;
        self.inner.name_input.set_value("");
        Ok(item)
    }

    pub fn add_item(&self, name: &str, done: bool) -> Result<TodoItem> {
        let item = TodoItem::new(self.host(), name, done)?;
        if let Err(err) = self.inner.items.push(item.clone()) {
            item.root().release();
            return Err(err);
        }
        debug!(name, done, len = self.inner.items.len(), "todo added");
        Ok(item)
    }

    pub fn remove(&self, item: &TodoItem) -> Result<()> {
        self.inner.remove(item)
    }

    pub fn records(&self) -> Vec<TodoRecord> {
        self.inner.items.map(|item, _, _| TodoRecord { name: item.name(), done: item.done() })
    }

    /// Serialize every item as JSON (4-space indent), show it in the output
    /// area and copy it to the clipboard.
    pub fn export(&self) -> Result<String> {
        let records = self.records();
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut serializer)?;
        let text = String::from_utf8(buf)
            .map_err(|err| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;

        self.inner.output_area.set_inner_text(&text);
        clipboard::select_all_and_copy(self.inner.output_area);
        info!(count = records.len(), "todo list exported");
        Ok(text)
    }
}

impl Component for TodoList {
    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }
}
