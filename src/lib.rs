//! Two small JSON-over-HTTP services:
//!
//! - `recipe-api` serves a static recipe by id ([`api::producer`]).
//! - `web-api` fetches that recipe and relays it with its own pid
//!   ([`api::consumer`]).
//!
//! The binaries under `src/bin/` only wire configuration to these modules.

pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod recipe;
pub mod server;
pub mod upstream;

pub use config::Config;
pub use error::AppError;
