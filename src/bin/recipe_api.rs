//! `recipe-api`: serves the static recipe catalog over HTTP.

use std::sync::Arc;

use anyhow::Context;
use recipe_relay::{
    api::producer::{self, ProducerState},
    config::{process_env, Config},
    identity::{ProcessIdentity, Service},
    recipe::RecipeBook,
    server,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::discover(process_env)?
        .into_producer(process_env)
        .context("invalid recipe-api configuration")?;

    if std::env::args().nth(1).as_deref() == Some("--healthcheck") {
        return server::healthcheck(&config.host, config.port).await;
    }

    server::init_tracing();

    let identity = ProcessIdentity::current();
    let book = RecipeBook::builtin();
    info!(pid = identity.pid, recipes = book.len(), "recipe-api starting");

    let listener = server::bind(&config.host, config.port).await?;
    info!(addr = %listener.local_addr()?, "recipe-api listening");

    let state = Arc::new(ProducerState::new(identity, book));
    server::serve(listener, producer::router(state), Service::RecipeApi).await
}
