//! Aggregate LLM pricing from several providers into one comparable list.

#[cfg(feature = "network")]
pub mod aggregate;
#[cfg(feature = "network")]
pub mod api;
pub mod catalog;
pub mod config;
#[cfg(feature = "network")]
pub mod enrich;
pub mod error;
pub mod parse;
pub mod provider;
pub mod record;
pub mod view;

#[cfg(feature = "network")]
pub use aggregate::{Aggregator, ProviderOutcome};
pub use catalog::{Catalog, GithubRepo};
pub use config::{Credentials, Endpoints};
pub use error::PriceError;
pub use provider::{Provider, ProviderKind, PROVIDERS};
pub use record::{ModelRecord, ModelsResponse};

/// `Cache-Control` for the aggregation endpoint: shared caches may serve the
/// body for a minute and keep serving it while revalidating.
pub const CACHE_CONTROL: &str = "s-maxage=60, stale-while-revalidate";
