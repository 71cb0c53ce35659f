//! # Combinestreamer Core
//!
//! Aggregation pipeline for live streams of one game across several
//! streaming platforms.
//!
//! ## Overview
//!
//! - **Canonical record** ([`StreamRecord`]) every platform is normalised into
//! - **Source adapters** for Twitch (Helix), YouTube (through Invidious
//!   mirrors) and a Kick placeholder
//! - **Instance fallback** trying mirrors in a fixed order
//! - **Token cache** with a 60 second safety margin for client-credentials auth
//! - **Aggregator** polling all adapters concurrently, tolerating partial failure
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Platform adapters (Twitch, Invidious, Kick) |
//! | [`aggregator`] | Concurrent fan-out, merge and ranking |
//! | [`auth`] | Client-credentials token exchange |
//! | [`clock`] | Wall clock abstraction |
//! | [`config`] | Environment-driven configuration |
//! | [`data_source`] | Adapter trait and error types |
//! | [`domain`] | Stream record, timestamps, thumbnails |
//! | [`envelope`] | JSON payload for the aggregated collection |
//! | [`error`] | Core error types |
//! | [`fallback`] | Ordered instance fallback |
//! | [`filter`] | Platform/search filtering and statistics |
//! | [`http_client`] | HTTP client abstraction |
//! | [`platform`] | Platform identifiers |
//! | [`token_cache`] | Bearer token cache |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use combinestreamer_core::{Aggregator, StreamerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let aggregator = Aggregator::from_config(&StreamerConfig::from_env()?);
//!
//!     for stream in aggregator.aggregate().await {
//!         println!("{:>6}  {}  {}", stream.viewer_count, stream.platform, stream.title);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Server   │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   Aggregator    │  join all, merge, rank
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Stream Source   │────▶│ Token Cache /    │
//! │ (Adapter Trait) │     │ Instance Fallback│
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ HTTP Client     │
//! │ (reqwest/noop)  │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Adapter failures are structured [`SourceError`]s, but they never escape
//! the aggregator:
//!
//! ```rust
//! use combinestreamer_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::Exhausted => "every mirror failed",
//!         SourceErrorKind::Credentials => "check TWITCH_CLIENT_ID / TWITCH_CLIENT_SECRET",
//!         _ => "upstream problem",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - Client secrets are read from environment variables and never logged
//! - Outbound requests use TLS via reqwest

pub mod adapters;
pub mod aggregator;
pub mod auth;
pub mod clock;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod http_client;
pub mod platform;
pub mod token_cache;

#[cfg(test)]
mod testutil;

// Adapter implementations
pub use adapters::{InvidiousAdapter, KickAdapter, TwitchAdapter, YoutubeQuery};

// Aggregation
pub use aggregator::{Aggregation, Aggregator, AggregatorBuilder, SourceOutcome, SourceReport};

// Credentials
pub use auth::{ClientCredentials, ClientCredentialsAuth};
pub use clock::{Clock, ManualClock, SystemClock};
pub use token_cache::{TokenCache, TokenCacheEntry, TOKEN_SAFETY_MARGIN_MS};

// Configuration
pub use config::StreamerConfig;

// Data source trait and types
pub use data_source::{SourceError, SourceErrorKind, SourceStatus, StreamBatch, StreamSource};

// Domain models
pub use domain::{RawStream, StreamRecord, UtcDateTime, UNKNOWN_STREAMER, UNTITLED_STREAM};

pub use envelope::StreamsEnvelope;
pub use error::ValidationError;
pub use fallback::{first_success, FallbackSuccess, InstanceEndpoint};
pub use filter::{PlatformStats, StreamFilter};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};

pub use platform::Platform;
