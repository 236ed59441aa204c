//! Greeter demo: two name fields and a live greeting.

use std::rc::Rc;

use crate::component::{Component, ComponentBase, SelfRef};
use crate::dom::Node;
use crate::error::Result;
use crate::jsx::{render, Attrs};

struct GreeterInner {
    base: ComponentBase,
    first_name: Node,
    last_name: Node,
    full_name: Node,
}

#[derive(Clone)]
pub struct Greeter {
    inner: Rc<GreeterInner>,
}

impl Greeter {
    pub fn new() -> Result<Self> {
        let this: SelfRef<GreeterInner> = SelfRef::new();
        let field = |label: &str, reference: &str| {
            render(
                "label",
                Attrs::new().child(label).child(render(
                    "input",
                    Attrs::new()
                        .reference(reference)
                        .on("input", this.handler(|inner, _| Greeter { inner }.update_name())),
                )?),
            )
        };

        let output = render(
            "div",
            Attrs::new()
                .child(field("First Name: ", "firstName")?)
                .child(field("Last Name: ", "lastName")?)
                .child(render(
                    "p",
                    Attrs::new().child("Hello, ").child(render("span", Attrs::new().reference("fullName"))?),
                )?),
        )?;

        let base = ComponentBase::new(output);
        let refs = base.refs();
        let inner = Rc::new(GreeterInner {
            first_name: refs.node("firstName")?,
            last_name: refs.node("lastName")?,
            full_name: refs.node("fullName")?,
            base,
        });
        this.bind(&inner);
        Ok(Self { inner })
    }

    pub fn first_name(&self) -> Node {
        self.inner.first_name
    }

    pub fn last_name(&self) -> Node {
        self.inner.last_name
    }

    /// Text currently shown after "Hello, ".
    pub fn full_name(&self) -> String {
        self.inner.full_name.inner_text()
    }

    pub fn update_name(&self) -> Result<()> {
        let full_name = format!("{} {}", self.inner.first_name.value(), self.inner.last_name.value());
        self.inner.full_name.set_inner_text(&full_name);
        Ok(())
    }
}

impl Component for Greeter {
    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }
}
