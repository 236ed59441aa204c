//! Demo applications built on [`component`](crate::component).
//!
//! - [`todo`] - to-do list with edit, finish, remove and JSON export
//! - [`greeter`] - two name fields joined into a greeting
//! - [`synchronizer`] - three inputs kept equal

pub mod greeter;
pub mod synchronizer;
pub mod todo;

pub use greeter::Greeter;
pub use synchronizer::Synchronizer;
pub use todo::{TodoItem, TodoList, TodoRecord};
