//! Process plumbing shared by `recipe-api` and `web-api`: tracing setup,
//! middleware stack, listener binding, graceful shutdown and the
//! `--healthcheck` client.

use std::net::IpAddr;

use anyhow::Context;
use axum::Router;
use tokio::{net::TcpListener, signal};
use tracing::info;

use crate::{api::request_id::request_id_middleware, identity::Service};

/// Set to `json` to emit one JSON object per log line.
pub const LOG_FORMAT_ENV: &str = "RECIPE_RELAY_LOG_FORMAT";

const DEFAULT_FILTER: &str = "recipe_relay=info,recipe_api=info,web_api=info,tower_http=warn";

/// Initialise the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if std::env::var(LOG_FORMAT_ENV).is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Wrap a service router with request tracing and request IDs.
pub fn with_middleware(app: Router, service: Service) -> Router {
    let trace_layer = tower_http::trace::TraceLayer::new_for_http()
        .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
        .on_response(tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO));

    app.layer(axum::middleware::from_fn_with_state(service, request_id_middleware))
        .layer(trace_layer)
}

pub async fn bind(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("binding {host}:{port}"))
}

/// Serve `app` (with [`with_middleware`] applied) until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, app: Router, service: Service) -> anyhow::Result<()> {
    axum::serve(listener, with_middleware(app, service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!(%service, "shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

/// URL of the local `/healthz` for a service listening on `host:port`.
///
/// Wildcard listen addresses are reached through loopback.
pub fn healthz_url(host: &str, port: u16) -> String {
    match host.parse::<IpAddr>() {
        Ok(ip) if ip.is_unspecified() => format!("http://127.0.0.1:{port}/healthz"),
        Ok(IpAddr::V6(ip)) => format!("http://[{ip}]:{port}/healthz"),
        _ => format!("http://{host}:{port}/healthz"),
    }
}

/// Lightweight healthcheck: `GET /healthz`, error unless it answers 200.
///
/// Invoked via `<binary> --healthcheck` from a container HEALTHCHECK, so no
/// external tool (curl/wget) is needed in the image.
pub async fn healthcheck(host: &str, port: u16) -> anyhow::Result<()> {
    let url = healthz_url(host, port);
    let resp = reqwest::get(&url)
        .await
        .with_context(|| format!("GET {url}"))?;
    anyhow::ensure!(
        resp.status().is_success(),
        "healthcheck returned HTTP {}",
        resp.status()
    );
    Ok(())
}
