//! To-do list in the terminal.
//!
//! ```text
//! cargo run --example todo
//! REDACTIO_CLIPBOARD=system REDACTIO_LOG=debug REDACTIO_LOG_FILE=todo.log cargo run --example todo
//! ```

use redactio::apps::TodoList;
use redactio::renderer::TerminalApp;
use redactio::{dom, logging, Component, Config};

fn main() -> redactio::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config)?;
    config.apply();

    let app = TodoList::new()?;
    dom::body().append(app.root())?;
    TerminalApp::new(dom::body(), config.render.clone()).run()
}
