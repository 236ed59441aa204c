//! Two name fields joined into a greeting as you type.

use redactio::apps::Greeter;
use redactio::renderer::TerminalApp;
use redactio::{dom, logging, Component, Config};

fn main() -> redactio::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config)?;
    config.apply();

    let app = Greeter::new()?;
    dom::body().append(app.root())?;
    TerminalApp::new(dom::body(), config.render.clone()).run()
}
