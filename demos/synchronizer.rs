//! Three inputs that always hold the same text.

use redactio::apps::Synchronizer;
use redactio::renderer::TerminalApp;
use redactio::{dom, logging, Component, Config};

fn main() -> redactio::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config)?;
    config.apply();

    let app = Synchronizer::new()?;
    dom::body().append(app.root())?;
    TerminalApp::new(dom::body(), config.render.clone()).run()
}
