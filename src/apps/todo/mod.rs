//! To-do list demo.
//!
//! A [`TodoList`] owns a [`BackedArray`](crate::component::BackedArray) of
//! [`TodoItem`]s. Items reach their list through [`TodoHost`] to remove
//! themselves.

mod item;
mod list;

pub use item::{TodoHost, TodoItem};
pub use list::{TodoList, TodoRecord};
