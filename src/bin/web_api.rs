//! `web-api`: relays the producer's recipe, tagged with this process's pid.

use std::sync::Arc;

use anyhow::Context;
use recipe_relay::{
    api::consumer::{self, ConsumerState},
    config::{process_env, Config},
    identity::{ProcessIdentity, Service},
    recipe::TIKKA_MASALA_ID,
    server,
    upstream::RecipeClient,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::discover(process_env)?
        .into_consumer(process_env)
        .context("invalid web-api configuration")?;

    if std::env::args().nth(1).as_deref() == Some("--healthcheck") {
        return server::healthcheck(&config.host, config.port).await;
    }

    server::init_tracing();

    let identity = ProcessIdentity::current();
    let target = config.resolve_target().await?;
    let client = RecipeClient::new(&target)?;
    info!(pid = identity.pid, target = client.base_url(), "web-api starting");

    // Startup never depends on the producer being up.
    match client.check_reachable(TIKKA_MASALA_ID).await {
        Ok(()) => info!(target = client.base_url(), "producer reachable"),
        Err(e) => warn!(target = client.base_url(), error = %format!("{e:#}"), "producer not reachable yet"),
    }

    let listener = server::bind(&config.host, config.port).await?;
    info!(addr = %listener.local_addr()?, "web-api listening");

    let state = Arc::new(ConsumerState::new(identity, client));
    server::serve(listener, consumer::router(state), Service::WebApi).await
}
