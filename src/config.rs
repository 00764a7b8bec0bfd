//! Configuration types for recipe-relay.
//!
//! Settings are layered once at startup: built-in defaults, then an optional
//! TOML file named by `RECIPE_RELAY_CONFIG`, then the `HOST` / `PORT` /
//! `TARGET` environment variables of the service being started. The result is
//! validated before any listener binds; an invalid setting aborts startup
//! rather than silently falling back to a default.
//!
//! # Example
//! ```toml
//! [producer]
//! host = "127.0.0.1"
//! port = 4000
//!
//! [consumer]
//! host   = "127.0.0.1"
//! port   = 3000
//! target = "localhost:4000"
//! ```

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "RECIPE_RELAY_CONFIG";

/// Host the consumer resolves when no `TARGET` is configured.
pub const DEFAULT_TARGET_HOST: &str = "localhost";
pub const DEFAULT_TARGET_PORT: u16 = 4000;

/// Reads a variable from the real process environment.
///
/// Every env-aware function takes the lookup as a parameter so tests can feed
/// a fixed map instead of mutating the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Top-level file layout. Both sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub producer: ProducerConfig,

    #[serde(default)]
    pub consumer: ConsumerConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).context("parsing config TOML")
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`], or the defaults when unset.
    pub fn discover(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        match env(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            Some(path) => {
                let path = PathBuf::from(path);
                Self::load(&path)
                    .with_context(|| format!("failed to load config from {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Finalises the `[producer]` section: env overrides, then validation.
    pub fn into_producer(
        self,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<ProducerConfig> {
        let mut producer = self.producer;
        apply_listen_env(&mut producer.host, &mut producer.port, &env)?;
        producer.validate()?;
        Ok(producer)
    }

    /// Finalises the `[consumer]` section: env overrides, then validation.
    pub fn into_consumer(
        self,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<ConsumerConfig> {
        let mut consumer = self.consumer;
        apply_listen_env(&mut consumer.host, &mut consumer.port, &env)?;
        if let Some(target) = env("TARGET").filter(|t| !t.is_empty()) {
            consumer.target = Some(target);
        }
        consumer.validate()?;
        Ok(consumer)
    }
}

/// Settings for `recipe-api`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProducerConfig {
    /// Listen address (default: `127.0.0.1`).
    #[serde(default = "defaults::host")]
    pub host: String,

    /// Listen port (default: 4000).
    #[serde(default = "defaults::producer_port")]
    pub port: u16,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::producer_port(),
        }
    }
}

impl ProducerConfig {
    fn validate(&self) -> anyhow::Result<()> {
        validate_listen(&self.host, self.port)
    }
}

/// Settings for `web-api`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsumerConfig {
    /// Listen address (default: `127.0.0.1`).
    #[serde(default = "defaults::host")]
    pub host: String,

    /// Listen port (default: 3000).
    #[serde(default = "defaults::consumer_port")]
    pub port: u16,

    /// `host:port` of the recipe producer, without a scheme.
    ///
    /// When unset, [`ConsumerConfig::resolve_target`] resolves
    /// `localhost:4000` to a concrete address at startup.
    #[serde(default)]
    pub target: Option<String>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::consumer_port(),
            target: None,
        }
    }
}

impl ConsumerConfig {
    fn validate(&self) -> anyhow::Result<()> {
        validate_listen(&self.host, self.port)?;
        if let Some(target) = &self.target {
            validate_target(target)?;
        }
        Ok(())
    }

    /// Returns the producer endpoint as `host:port`.
    ///
    /// An explicit target is returned unchanged. Otherwise the default host is
    /// resolved once, preferring an IPv4 address so a producer listening on
    /// its default `127.0.0.1` is reachable even where `localhost` lists `::1`
    /// first.
    pub async fn resolve_target(&self) -> anyhow::Result<String> {
        if let Some(target) = &self.target {
            return Ok(target.clone());
        }
        let addr = resolve_preferring_ipv4(DEFAULT_TARGET_HOST, DEFAULT_TARGET_PORT).await?;
        Ok(addr.to_string())
    }
}

/// First IPv4 address of `host`, or its first address of any family.
pub async fn resolve_preferring_ipv4(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("resolving {host}:{port}"))?
        .collect();
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .with_context(|| format!("{host} resolved to no addresses"))
}

fn apply_listen_env(
    host: &mut String,
    port: &mut u16,
    env: &impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(h) = env("HOST").filter(|h| !h.is_empty()) {
        *host = h;
    }
    if let Some(p) = env("PORT").filter(|p| !p.is_empty()) {
        *port = p
            .trim()
            .parse()
            .with_context(|| format!("PORT `{p}` is not a valid port number"))?;
    }
    Ok(())
}

fn validate_listen(host: &str, port: u16) -> anyhow::Result<()> {
    anyhow::ensure!(!host.trim().is_empty(), "listen host must not be empty");
    anyhow::ensure!(port != 0, "listen port must be non-zero");
    Ok(())
}

/// Accepts `host:port` (IPv6 hosts in brackets), rejects URLs.
fn validate_target(target: &str) -> anyhow::Result<()> {
    anyhow::ensure!(
        !target.contains("://"),
        "TARGET `{target}` must be host:port without a scheme"
    );
    let (host, port) = target
        .rsplit_once(':')
        .with_context(|| format!("TARGET `{target}` must be host:port"))?;
    anyhow::ensure!(!host.is_empty(), "TARGET `{target}` has an empty host");
    let port: u16 = port
        .parse()
        .with_context(|| format!("TARGET `{target}` has an invalid port"))?;
    anyhow::ensure!(port != 0, "TARGET `{target}` has port 0");
    Ok(())
}

mod defaults {
    pub fn host() -> String { "127.0.0.1".into() }
    pub fn producer_port() -> u16 { 4000 }
    pub fn consumer_port() -> u16 { 3000 }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn no_env() -> impl Fn(&str) -> Option<String> {
        env_of(&[])
    }

    // -----------------------------------------------------------------------
    // Defaults & parsing
    // -----------------------------------------------------------------------

    #[test]
    fn defaults_apply_without_file_or_env() {
        let producer = Config::default().into_producer(no_env()).unwrap();
        assert_eq!(producer.host, "127.0.0.1");
        assert_eq!(producer.port, 4000);

        let consumer = Config::default().into_consumer(no_env()).unwrap();
        assert_eq!(consumer.host, "127.0.0.1");
        assert_eq!(consumer.port, 3000);
        assert!(consumer.target.is_none());
    }

    #[test]
    fn parse_example_config() {
        let content = include_str!("../config.example.toml");
        let config: Config = toml::from_str(content).expect("example config should parse");
        config.clone().into_producer(no_env()).expect("producer section valid");
        let consumer = config.into_consumer(no_env()).expect("consumer section valid");
        assert_eq!(consumer.target.as_deref(), Some("localhost:4000"));
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let config: Config = toml::from_str(
            r#"
            [producer]
            port = 4100

            [consumer]
            target = "recipes.internal:4100"
            "#,
        )
        .expect("should parse");
        assert_eq!(config.producer.host, "127.0.0.1");
        assert_eq!(config.producer.port, 4100);
        assert_eq!(config.consumer.port, 3000);
        assert_eq!(config.consumer.target.as_deref(), Some("recipes.internal:4100"));
    }

    #[test]
    fn discover_without_path_returns_defaults() {
        let config = Config::discover(no_env()).unwrap();
        assert_eq!(config.producer.port, 4000);
    }

    #[test]
    fn discover_reports_missing_file() {
        let err = Config::discover(env_of(&[(CONFIG_PATH_ENV, "/no/such/recipe-relay.toml")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/recipe-relay.toml"));
    }

    // -----------------------------------------------------------------------
    // Env overrides
    // -----------------------------------------------------------------------

    #[test]
    fn env_overrides_file_values() {
        let config: Config = toml::from_str(
            r#"
            [consumer]
            host   = "10.0.0.5"
            port   = 3100
            target = "file-host:4000"
            "#,
        )
        .unwrap();
        let consumer = config
            .into_consumer(env_of(&[
                ("HOST", "0.0.0.0"),
                ("PORT", "8080"),
                ("TARGET", "producer:4000"),
            ]))
            .unwrap();
        assert_eq!(consumer.host, "0.0.0.0");
        assert_eq!(consumer.port, 8080);
        assert_eq!(consumer.target.as_deref(), Some("producer:4000"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let producer = Config::default()
            .into_producer(env_of(&[("HOST", ""), ("PORT", "")]))
            .unwrap();
        assert_eq!(producer.host, "127.0.0.1");
        assert_eq!(producer.port, 4000);
    }

    #[test]
    fn producer_ignores_target() {
        let producer = Config::default()
            .into_producer(env_of(&[("TARGET", "not a target")]))
            .unwrap();
        assert_eq!(producer.port, 4000);
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn rejects_non_numeric_port() {
        assert!(Config::default()
            .into_producer(env_of(&[("PORT", "forty")]))
            .is_err());
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert!(Config::default()
            .into_consumer(env_of(&[("PORT", "70000")]))
            .is_err());
    }

    #[test]
    fn rejects_port_zero() {
        assert!(Config::default()
            .into_producer(env_of(&[("PORT", "0")]))
            .is_err());
    }

    #[test]
    fn rejects_blank_host_from_file() {
        let config: Config = toml::from_str("[producer]\nhost = \"  \"").unwrap();
        assert!(config.into_producer(no_env()).is_err());
    }

    #[test]
    fn target_validation() {
        for ok in ["localhost:4000", "10.1.2.3:80", "[::1]:4000", "recipe-api:4000"] {
            assert!(validate_target(ok).is_ok(), "{ok} should be accepted");
        }
        for bad in [
            "localhost",
            ":4000",
            "localhost:",
            "localhost:abc",
            "localhost:0",
            "http://localhost:4000",
        ] {
            assert!(validate_target(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn rejects_malformed_target_from_env() {
        assert!(Config::default()
            .into_consumer(env_of(&[("TARGET", "http://producer:4000")]))
            .is_err());
    }

    // -----------------------------------------------------------------------
    // Target resolution
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn explicit_target_is_returned_verbatim() {
        let consumer = ConsumerConfig {
            target: Some("producer:4000".into()),
            ..ConsumerConfig::default()
        };
        assert_eq!(consumer.resolve_target().await.unwrap(), "producer:4000");
    }

    #[tokio::test]
    async fn default_target_resolves_to_ipv4_loopback_on_port_4000() {
        let target = ConsumerConfig::default().resolve_target().await.unwrap();
        let addr: SocketAddr = target.parse().unwrap();
        assert_eq!(addr.port(), 4000);
        assert!(addr.is_ipv4(), "expected IPv4, got {target}");
        assert!(addr.ip().is_loopback());
    }

    #[tokio::test]
    async fn resolved_localhost_reaches_producer_bound_to_ipv4_only() {
        use std::sync::Arc;

        use crate::{
            api::producer::{self, ProducerState},
            identity::ProcessIdentity,
            recipe::RecipeBook,
            upstream::RecipeClient,
        };

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = ProducerState::new(ProcessIdentity { pid: 1 }, RecipeBook::builtin());
        tokio::spawn(async move {
            axum::serve(listener, producer::router(Arc::new(state))).await
        });

        let addr = resolve_preferring_ipv4(DEFAULT_TARGET_HOST, port).await.unwrap();
        let client = RecipeClient::new(&addr.to_string()).unwrap();
        client.fetch_recipe(42).await.unwrap();
    }
}
