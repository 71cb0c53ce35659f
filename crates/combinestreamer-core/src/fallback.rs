//! "First success wins" iteration over interchangeable endpoints.
//!
//! Mirrors behave identically, so the order of the configured list is the
//! only policy: try each in turn, stop at the first structurally valid
//! answer. There is no reordering, no retry of the same endpoint within a
//! call, and no state carried between calls.

use std::fmt::{Display, Formatter};
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::SourceError;

/// One interchangeable backend serving the same logical API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceEndpoint {
    base_url: String,
}

impl InstanceEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` (which should start with `/`) onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Display for InstanceEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base_url)
    }
}

/// Value produced by the first endpoint that answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackSuccess<T> {
    pub value: T,
    pub endpoint: InstanceEndpoint,
    /// Endpoints tried, including the successful one.
    pub attempts: usize,
}

/// Runs `attempt` against each endpoint in order until one returns `Ok`.
///
/// An `Ok` carrying an empty collection still ends the search: zero live
/// streams is an answer, not a failure.
///
/// # Errors
///
/// Returns [`SourceError::exhausted`] once every endpoint has failed.
pub async fn first_success<T, F, Fut>(
    endpoints: &[InstanceEndpoint],
    mut attempt: F,
) -> Result<FallbackSuccess<T>, SourceError>
where
    F: FnMut(InstanceEndpoint) -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    for (index, endpoint) in endpoints.iter().enumerate() {
        debug!(%endpoint, "trying endpoint");
        match attempt(endpoint.clone()).await {
            Ok(value) => {
                if index > 0 {
                    info!(%endpoint, failed = index, "fallback endpoint succeeded");
                }
                return Ok(FallbackSuccess {
                    value,
                    endpoint: endpoint.clone(),
                    attempts: index + 1,
                });
            }
            Err(error) => {
                warn!(%endpoint, code = error.code(), %error, "endpoint failed; trying next");
            }
        }
    }

    warn!(attempts = endpoints.len(), "all endpoints exhausted");
    Err(SourceError::exhausted(endpoints.len()))
}
