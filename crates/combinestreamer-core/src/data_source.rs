//! Provider adapter contract.
//!
//! Every platform integration implements [`StreamSource`]. Adapters report
//! failures through [`SourceError`] from [`StreamSource::fetch_live`]; the
//! provided [`StreamSource::fetch_streams`] turns any failure into an empty
//! sequence so one platform can never fail another.
//!
//! # Example Implementation
//!
//! ```rust,ignore
//! use combinestreamer_core::{Platform, SourceError, StreamBatch, StreamSource};
//!
//! struct FixtureSource;
//!
//! impl StreamSource for FixtureSource {
//!     fn platform(&self) -> Platform {
//!         Platform::Kick
//!     }
//!
//!     fn fetch_live<'a>(
//!         &'a self,
//!     ) -> Pin<Box<dyn Future<Output = Result<StreamBatch, SourceError>> + Send + 'a>> {
//!         Box::pin(async move { Ok(StreamBatch::new(Vec::new())) })
//!     }
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::http_client::HttpError;
use crate::{Platform, StreamRecord};

/// Whether an adapter takes part in aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Enabled,
    /// Registered but configured off (or a placeholder); never touches the network.
    Disabled,
    /// Enabled, but lacking the credentials it needs to return anything.
    MissingCredentials,
}

impl SourceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::MissingCredentials => "missing_credentials",
        }
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Network failure, timeout or non-2xx status.
    Unavailable,
    /// 2xx response whose body failed the structural check.
    MalformedResponse,
    /// Credentials missing or the token exchange failed.
    Credentials,
    /// Every fallback endpoint was tried and none answered usefully.
    Exhausted,
    Internal,
}

/// Structured source error; contained by the aggregator, never surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedResponse,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Credentials,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn exhausted(attempts: usize) -> Self {
        Self {
            kind: SourceErrorKind::Exhausted,
            message: format!("all {attempts} endpoint(s) failed"),
            retryable: true,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    /// Maps a transport failure, keeping its retry classification.
    pub fn from_transport(platform: Platform, error: &HttpError) -> Self {
        let message = format!("{platform} transport error: {}", error.message());
        if error.retryable() {
            Self::unavailable(message)
        } else {
            Self::internal(message)
        }
    }

    /// Maps a non-2xx status.
    pub fn from_status(platform: Platform, what: &str, status: u16) -> Self {
        Self::unavailable(format!("{platform} {what} returned status {status}"))
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::MalformedResponse => "source.malformed_response",
            SourceErrorKind::Credentials => "source.credentials",
            SourceErrorKind::Exhausted => "source.exhausted",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Live records returned by one adapter call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamBatch {
    pub streams: Vec<StreamRecord>,
    /// Base URL of the endpoint that answered, for adapters with fallbacks.
    pub served_by: Option<String>,
}

impl StreamBatch {
    pub fn new(streams: Vec<StreamRecord>) -> Self {
        Self {
            streams,
            served_by: None,
        }
    }

    pub fn served_by(mut self, endpoint: impl Into<String>) -> Self {
        self.served_by = Some(endpoint.into());
        self
    }
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the aggregator polls every
/// registered adapter concurrently from shared references.
pub trait StreamSource: Send + Sync {
    /// Platform every record from this adapter is tagged with.
    fn platform(&self) -> Platform;

    fn status(&self) -> SourceStatus {
        SourceStatus::Enabled
    }

    /// Fetches the platform's current live streams for the configured game.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the platform is unreachable, answers with
    /// an unexpected shape, or rejects the adapter's credentials.
    fn fetch_live<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<StreamBatch, SourceError>> + Send + 'a>>;

    /// Infallible form of [`fetch_live`](StreamSource::fetch_live): failures
    /// are logged and degrade to an empty sequence.
    fn fetch_streams<'a>(&'a self) -> Pin<Box<dyn Future<Output = Vec<StreamRecord>> + Send + 'a>> {
        Box::pin(async move {
            match self.fetch_live().await {
                Ok(batch) => batch.streams,
                Err(error) => {
                    warn!(platform = %self.platform(), code = error.code(), %error, "source failed");
                    Vec::new()
                }
            }
        })
    }
}
