//! Late-bound weak self handle for handlers declared during construction.

use std::cell::OnceCell;
use std::rc::{Rc, Weak};

use crate::dom::Event;
use crate::error::Result;

/// Handlers in a constructor's tree exist before the component does. A
/// `SelfRef` is captured by those handlers and bound once the component is
/// allocated; until then (or after it is dropped) the handlers do nothing.
pub struct SelfRef<T> {
    cell: Rc<OnceCell<Weak<T>>>,
}

impl<T> Clone for SelfRef<T> {
    fn clone(&self) -> Self {
        Self { cell: self.cell.clone() }
    }
}

impl<T> Default for SelfRef<T> {
    fn default() -> Self {
        Self { cell: Rc::new(OnceCell::new()) }
    }
}

impl<T: 'static> SelfRef<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `target`. Only the first bind takes effect.
    pub fn bind(&self, target: &Rc<T>) {
        let _ = self.cell.set(Rc::downgrade(target));
    }

    pub fn upgrade(&self) -> Option<Rc<T>> {
        self.cell.get().and_then(Weak::upgrade)
    }

    /// Event handler that runs `f` with the bound component.
    pub fn handler<F>(&self, f: F) -> impl Fn(&Event) -> Result<()> + use<T, F>
    where
        F: Fn(Rc<T>, &Event) -> Result<()> + 'static,
    {
        let this = self.clone();
        move |event| match this.upgrade() {
            Some(target) => f(target, event),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_unbound_handler_is_noop() {
        let this: SelfRef<Cell<u32>> = SelfRef::new();
        let handler = this.handler(|target, _| {
            target.set(target.get() + 1);
            Ok(())
        });

        handler(&Event::new("click")).unwrap();
        assert!(this.upgrade().is_none());
    }

    #[test]
    fn test_bound_handler_reaches_target() {
        let this: SelfRef<Cell<u32>> = SelfRef::new();
        let handler = this.handler(|target, _| {
            target.set(target.get() + 1);
            Ok(())
        });

        let target = Rc::new(Cell::new(0));
        this.bind(&target);
        handler(&Event::new("click")).unwrap();
        handler(&Event::new("click")).unwrap();
        assert_eq!(target.get(), 2);

        drop(target);
        handler(&Event::new("click")).unwrap();
        assert!(this.upgrade().is_none());
    }
}
