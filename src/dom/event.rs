//! Events - Listener registry and dispatch.
//!
//! Each node carries `on<event>` property handlers and a list of listeners added
//! with [`Node::add_event_listener`]. Dispatch walks a path fixed up front:
//! the target, then its ancestors when the event bubbles.
//!
//! # Example
//!
//! ```ignore
//! use redactio::dom::{create_element, Event};
//!
//! let button = create_element("button")?;
//! button.add_event_listener("click", |event| {
//!     println!("clicked {:?}", event.target());
//!     Ok(())
//! });
//! button.click()?;
//! ```

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};

use super::document;
use super::node::Node;
use super::traits::ElementTraits;
use crate::error::{Error, Result};

/// Event handler. An `Err` stops dispatch and is returned to the dispatcher.
pub type EventHandler = Rc<dyn Fn(&Event) -> Result<()>>;

/// Wrap a closure as an [`EventHandler`].
pub fn handler(f: impl Fn(&Event) -> Result<()> + 'static) -> EventHandler {
    Rc::new(f)
}

// =============================================================================
// Event
// =============================================================================

#[derive(Debug)]
pub struct Event {
    event_type: String,
    bubbles: bool,
    target: Cell<Option<Node>>,
    current_target: Cell<Option<Node>>,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

impl Event {
    /// Create an event. Interaction events bubble; focus changes do not.
    pub fn new(event_type: impl Into<String>) -> Self {
        let event_type = event_type.into();
        let bubbles = matches!(
            event_type.as_str(),
            "click" | "dblclick" | "input" | "change" | "keydown" | "keyup" | "submit"
        );
        Self {
            event_type,
            bubbles,
            target: Cell::new(None),
            current_target: Cell::new(None),
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Node the event was dispatched to.
    pub fn target(&self) -> Option<Node> {
        self.target.get()
    }

    /// Node whose handlers are running.
    pub fn current_target(&self) -> Option<Node> {
        self.current_target.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

// =============================================================================
// Dispatch
// =============================================================================

fn handlers_for(node: Node, event_type: &str) -> Vec<EventHandler> {
    document::with(|doc| {
        let Some(data) = doc.get(node) else {
            return Vec::new();
        };
        data.handler_props
            .iter()
            .chain(data.listeners.iter())
            .filter(|(name, _)| name == event_type)
            .map(|(_, handler)| handler.clone())
            .collect()
    })
}

impl Node {
    /// Subscribe `handler` to `event_type`. There is no unsubscribe; listeners
    /// live as long as the node.
    pub fn add_event_listener(
        &self,
        event_type: &str,
        handler: impl Fn(&Event) -> Result<()> + 'static,
    ) {
        let handler: EventHandler = Rc::new(handler);
        self.write(|data| data.listeners.push((event_type.to_string(), handler)));
    }

    /// Whether any handler is registered for `event_type` on this node.
    pub fn has_listener(&self, event_type: &str) -> bool {
        self.read(|data| {
            data.handler_props
                .iter()
                .chain(data.listeners.iter())
                .any(|(name, _)| name == event_type)
        })
    }

    /// Dispatch `event` with this node as target.
    ///
    /// Returns `Ok(false)` if a handler called `prevent_default`. The first
    /// handler error stops dispatch and comes back as [`Error::Handler`].
    pub fn dispatch_event(&self, event: &Event) -> Result<bool> {
        if !self.is_alive() {
            return Err(Error::StaleNode);
        }
        event.target.set(Some(*self));
        event.propagation_stopped.set(false);

        let mut path = vec![*self];
        if event.bubbles {
            let mut current = self.parent();
            while let Some(node) = current {
                path.push(node);
                current = node.parent();
            }
        }
        trace!(event = event.event_type(), target = ?self, depth = path.len(), "dispatch");

        for node in path {
            event.current_target.set(Some(node));
            // Handlers are cloned out so they can freely edit the tree.
            for handler in handlers_for(node, &event.event_type) {
                if let Err(source) = handler(event) {
                    debug!(event = event.event_type(), error = %source, "handler failed");
                    event.current_target.set(None);
                    return Err(Error::Handler {
                        event: event.event_type.clone(),
                        source: Box::new(source),
                    });
                }
            }
            if event.propagation_stopped.get() {
                break;
            }
        }
        event.current_target.set(None);
        Ok(!event.default_prevented())
    }

    /// Dispatch a `click`, unless this is a disabled form control.
    pub fn click(&self) -> Result<()> {
        if self.disabled() {
            return Ok(());
        }
        self.dispatch_event(&Event::new("click")).map(drop)
    }

    fn is_focusable(&self) -> bool {
        self.is_element()
            && (self.traits().contains(ElementTraits::FOCUSABLE)
                || self.has_attribute("tabindex")
                || self.content_editable())
            && !self.disabled()
    }

    /// Make this the active element, firing `blur` on the previous one and
    /// `focus` on this one. Non-focusable nodes are ignored.
    pub fn focus(&self) -> Result<()> {
        if !self.is_focusable() {
            return Ok(());
        }
        let previous = document::active_element();
        if previous == Some(*self) {
            return Ok(());
        }
        document::with_mut(|doc| doc.active = Some(*self));
        if let Some(previous) = previous {
            previous.dispatch_event(&Event::new("blur"))?;
        }
        self.dispatch_event(&Event::new("focus")).map(drop)
    }

    /// Drop focus if this node holds it.
    pub fn blur(&self) -> Result<()> {
        if document::active_element() != Some(*self) {
            return Ok(());
        }
        document::with_mut(|doc| doc.active = None);
        self.dispatch_event(&Event::new("blur")).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::dom::document::{active_element, create_element, reset_document};
    use crate::dom::value::Value;

    fn log() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_click_bubbles_with_target() {
        reset_document();

        let li = create_element("li").unwrap();
        let button = create_element("button").unwrap();
        li.append(button).unwrap();

        let seen = log();
        let seen_li = seen.clone();
        li.add_event_listener("click", move |event| {
            assert_eq!(event.current_target(), Some(li));
            seen_li.borrow_mut().push(format!("li:{:?}", event.target() == Some(button)));
            Ok(())
        });
        let seen_button = seen.clone();
        button.add_event_listener("click", move |_| {
            seen_button.borrow_mut().push("button".into());
            Ok(())
        });

        button.click().unwrap();
        assert_eq!(*seen.borrow(), vec!["button".to_string(), "li:true".to_string()]);
    }

    #[test]
    fn test_stop_propagation() {
        reset_document();

        let div = create_element("div").unwrap();
        let span = create_element("span").unwrap();
        div.append(span).unwrap();

        let reached = Rc::new(Cell::new(false));
        let reached_div = reached.clone();
        div.add_event_listener("click", move |_| {
            reached_div.set(true);
            Ok(())
        });
        span.add_event_listener("click", |event| {
            event.stop_propagation();
            Ok(())
        });

        span.click().unwrap();
        assert!(!reached.get());
    }

    #[test]
    fn test_handler_property_runs_first_and_is_replaced() {
        reset_document();

        let button = create_element("button").unwrap();
        let seen = log();

        let seen_listener = seen.clone();
        button.add_event_listener("click", move |_| {
            seen_listener.borrow_mut().push("listener".into());
            Ok(())
        });
        let seen_old = seen.clone();
        button
            .set_property("onclick", Value::Handler(handler(move |_| {
                seen_old.borrow_mut().push("old".into());
                Ok(())
            })))
            .unwrap();
        let seen_new = seen.clone();
        button
            .set_property("onclick", Value::Handler(handler(move |_| {
                seen_new.borrow_mut().push("new".into());
                Ok(())
            })))
            .unwrap();

        button.click().unwrap();
        assert_eq!(*seen.borrow(), vec!["new".to_string(), "listener".to_string()]);
    }

    #[test]
    fn test_handler_error_stops_dispatch() {
        reset_document();

        let div = create_element("div").unwrap();
        let button = create_element("button").unwrap();
        div.append(button).unwrap();

        let reached = Rc::new(Cell::new(false));
        let reached_div = reached.clone();
        div.add_event_listener("click", move |_| {
            reached_div.set(true);
            Ok(())
        });
        button.add_event_listener("click", |_| Err(Error::UnknownRef("nameInput".into())));

        let err = button.click().unwrap_err();
        assert!(matches!(&err, Error::Handler { event, .. } if event == "click"));
        assert!(matches!(err.root_cause(), Error::UnknownRef(_)));
        assert!(!reached.get());
    }

    #[test]
    fn test_disabled_suppresses_click() {
        reset_document();

        let button = create_element("button").unwrap();
        let clicked = Rc::new(Cell::new(false));
        let clicked_inner = clicked.clone();
        button.add_event_listener("click", move |_| {
            clicked_inner.set(true);
            Ok(())
        });
        button.set_disabled(true);

        button.click().unwrap();
        assert!(!clicked.get());
    }

    #[test]
    fn test_focus_and_blur() {
        reset_document();

        let first = create_element("input").unwrap();
        let second = create_element("input").unwrap();
        let span = create_element("span").unwrap();

        let blurred = Rc::new(Cell::new(false));
        let blurred_inner = blurred.clone();
        first.add_event_listener("blur", move |_| {
            blurred_inner.set(true);
            Ok(())
        });

        first.focus().unwrap();
        assert_eq!(active_element(), Some(first));
        second.focus().unwrap();
        assert_eq!(active_element(), Some(second));
        assert!(blurred.get());

        span.focus().unwrap();
        assert_eq!(active_element(), Some(second));

        second.blur().unwrap();
        assert_eq!(active_element(), None);
    }

    #[test]
    fn test_event_defaults() {
        assert!(Event::new("click").bubbles());
        assert!(Event::new("input").bubbles());
        assert!(!Event::new("focus").bubbles());
        assert!(!Event::new("click").with_bubbles(false).bubbles());
    }
}
