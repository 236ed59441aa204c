//! Synchronizer demo: three inputs that always hold the same text.

use std::rc::Rc;

use crate::component::{Component, ComponentBase, SelfRef};
use crate::dom::{Event, Node};
use crate::error::Result;
use crate::jsx::{render, Attrs};

struct SyncInner {
    base: ComponentBase,
    inputs: [Node; 3],
}

#[derive(Clone)]
pub struct Synchronizer {
    inner: Rc<SyncInner>,
}

impl Synchronizer {
    pub fn new() -> Result<Self> {
        let this: SelfRef<SyncInner> = SelfRef::new();
        let input = |reference: &str| {
            render(
                "input",
                Attrs::new()
                    .reference(reference)
                    .on("input", this.handler(|inner, event| Synchronizer { inner }.synchronize(event))),
            )
        };

        let output = render(
            "div",
            Attrs::new()
                .child(input("input1")?)
                .child(input("input2")?)
                .child(input("input3")?)
                .child(render("p", Attrs::new().child("But they're always the same!"))?),
        )?;

        let base = ComponentBase::new(output);
        let refs = base.refs();
        let inner = Rc::new(SyncInner {
            inputs: [refs.node("input1")?, refs.node("input2")?, refs.node("input3")?],
            base,
        });
        this.bind(&inner);
        Ok(Self { inner })
    }

    pub fn inputs(&self) -> [Node; 3] {
        self.inner.inputs
    }

    /// Copy the value of the event's target into every input.
    pub fn synchronize(&self, event: &Event) -> Result<()> {
        let Some(target) = event.target() else {
            return Ok(());
        };
        let value = target.value();
        for input in self.inner.inputs {
            input.set_value(&value);
        }
        Ok(())
    }
}

impl Component for Synchronizer {
    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::reset_document;

    #[test]
    fn test_inputs_stay_equal() {
        reset_document();

        let sync = Synchronizer::new().unwrap();
        let [first, second, third] = sync.inputs();

        second.set_value("hello");
        second.dispatch_event(&Event::new("input")).unwrap();
        assert_eq!(first.value(), "hello");
        assert_eq!(third.value(), "hello");

        third.set_value("bye");
        third.dispatch_event(&Event::new("input")).unwrap();
        assert!(sync.inputs().iter().all(|input| input.value() == "bye"));
    }
}
