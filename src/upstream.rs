//! HTTP client for the recipe producer.
//!
//! A single [`RecipeClient`] is built at startup and shared by every consumer
//! request. [`reqwest::Client`] holds its connection pool behind an `Arc`, so
//! the shared client needs no locking.

use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{api::request_id::REQUEST_ID_HEADER, recipe::RecipeEnvelope};

pub struct RecipeClient {
    client: Client,
    base_url: String,
}

impl RecipeClient {
    /// Construct a client for `target`, given as `host:port`.
    pub fn new(target: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("recipe-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building reqwest client")?;

        Ok(Self {
            client,
            base_url: format!("http://{}", target.trim_end_matches('/')),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch `GET /recipes/{id}` and return the body as parsed JSON.
    ///
    /// The body is returned as-is so callers can relay it verbatim; it is
    /// only checked against the [`RecipeEnvelope`] array shape.
    ///
    /// # Errors
    /// Returns an error if the network request fails, the producer returns a
    /// non-2xx status, the body is not valid JSON, or the JSON does not have
    /// the recipe envelope shape.
    pub async fn fetch_recipe(&self, id: i64) -> anyhow::Result<Value> {
        self.send_recipe_request(id, None).await
    }

    /// [`fetch_recipe`](Self::fetch_recipe), passing `request_id` on as
    /// `X-Request-ID` so the producer's log line carries the same ID.
    pub async fn fetch_recipe_for(&self, id: i64, request_id: &str) -> anyhow::Result<Value> {
        self.send_recipe_request(id, Some(request_id)).await
    }

    async fn send_recipe_request(
        &self,
        id: i64,
        request_id: Option<&str>,
    ) -> anyhow::Result<Value> {
        let url = format!("{}/recipes/{id}", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(request_id) = request_id {
            request = request.header(REQUEST_ID_HEADER, request_id);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        let text = response.text().await.context("reading response body")?;

        if !status.is_success() {
            warn!(%url, %status, body = %text, "producer returned an error status");
            anyhow::bail!("producer returned HTTP {}: {}", status, excerpt(&text));
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            warn!(%url, body = %text, "producer response is not JSON");
            anyhow::Error::new(e)
                .context(format!("parsing producer response as JSON: {}", excerpt(&text)))
        })?;

        check_envelope_shape(&body)?;
        Ok(body)
    }

    /// One-off reachability check logged by `web-api` at startup.
    pub async fn check_reachable(&self, id: i64) -> anyhow::Result<()> {
        self.fetch_recipe(id).await.map(|_| ())
    }
}

/// Producer bodies quoted in error messages are cut to this many chars.
const EXCERPT_CHARS: usize = 120;

/// Leading part of `text` for error messages; the full body only goes to the log.
fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}... ({} bytes)", &text[..cut], text.len()),
        None => text.to_string(),
    }
}

/// Shape check without taking ownership of the relayed body.
fn check_envelope_shape(body: &Value) -> anyhow::Result<()> {
    let envelopes = Vec::<RecipeEnvelope>::deserialize(body)
        .context("producer response does not have the recipe envelope shape")?;
    anyhow::ensure!(!envelopes.is_empty(), "producer returned an empty recipe list");
    Ok(())
}
