//! End-to-end to-do flows through the public API.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use redactio::apps::{TodoList, TodoRecord};
use redactio::clipboard::{self, ClipboardBackend};
use redactio::dom::{self, reset_document};
use redactio::renderer::{to_plain_text, Session};
use redactio::{Component, ErrorKind, RenderOptions};

fn press(session: &mut Session, code: KeyCode) {
    session.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn mounted() -> TodoList {
    reset_document();
    clipboard::set_backend(ClipboardBackend::Internal);
    clipboard::clear();
    let list = TodoList::new().unwrap();
    dom::body().append(list.root()).unwrap();
    list
}

#[test]
fn test_milk_item_lifecycle() {
    let list = mounted();
    let milk = list.add_item("milk", false).unwrap();

    assert_eq!(milk.name(), "milk");
    assert!(!milk.done());

    milk.finish().unwrap();
    assert!(milk.done());
    assert!(milk.refs().node("finish").unwrap().hidden());
    assert!(milk.element().matches("li.todo-item.done").unwrap());
}

#[test]
fn test_export_two_items_in_order() {
    let list = mounted();
    list.add_item("milk", false).unwrap();
    list.add_item("eggs", true).unwrap();

    let text = list.export().unwrap();
    let records: Vec<TodoRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(
        records,
        vec![
            TodoRecord { name: "milk".into(), done: false },
            TodoRecord { name: "eggs".into(), done: true },
        ]
    );
    assert!(text.contains("\n    {\n        \"name\": \"milk\""));
    assert_eq!(clipboard::paste(), Some(text));
}

#[test]
fn test_keyboard_session_builds_list() {
    let list = mounted();
    let mut session = Session::new(dom::body(), RenderOptions::default());

    press(&mut session, KeyCode::Tab);
    for c in "bread".chars() {
        press(&mut session, KeyCode::Char(c));
    }
    press(&mut session, KeyCode::Tab);
    press(&mut session, KeyCode::Enter);

    assert_eq!(list.items().len(), 1);
    let frame = to_plain_text(&session.frame());
    assert!(frame.starts_with("Todo\n  1. bread [finish] [remove]"), "{frame}");
}

#[test]
fn test_removal_keeps_collection_aligned() {
    let list = mounted();
    let items: Vec<_> = ["a", "b", "c", "d"]
        .iter()
        .map(|name| list.add_item(name, false).unwrap())
        .collect();

    items[1].remove().unwrap();
    items[3].remove().unwrap();

    let names: Vec<String> = list.items().iter().map(|item| item.name()).collect();
    assert_eq!(names, vec!["a", "c"]);
    let live: Vec<String> = list
        .items()
        .element()
        .children()
        .iter()
        .map(|li| li.query_selector("span span").unwrap().unwrap().inner_text())
        .collect();
    assert_eq!(live, names);
}

#[test]
fn test_out_of_range_is_a_precondition_violation() {
    let list = mounted();
    let err = list.items().get(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
}
