//! Client-credentials token exchange backed by [`TokenCache`].

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::clock::{Clock, SystemClock};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::token_cache::TokenCache;
use crate::{Platform, SourceError};

/// Twitch's OAuth token endpoint.
pub const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Application credentials for a client-credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl Debug for ClientCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Lazily exchanges client credentials for a bearer token and caches it.
#[derive(Clone)]
pub struct ClientCredentialsAuth {
    http_client: Arc<dyn HttpClient>,
    credentials: Option<ClientCredentials>,
    cache: TokenCache,
    clock: Arc<dyn Clock>,
    token_url: String,
    timeout_ms: u64,
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl ClientCredentialsAuth {
    pub fn new(http_client: Arc<dyn HttpClient>, credentials: Option<ClientCredentials>) -> Self {
        Self {
            http_client,
            credentials,
            cache: TokenCache::new(),
            clock: Arc::new(SystemClock),
            token_url: String::from(TWITCH_TOKEN_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn with_cache(mut self, cache: TokenCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn credentials(&self) -> Option<&ClientCredentials> {
        self.credentials.as_ref()
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Returns a valid bearer token, exchanging credentials only when the
    /// cached one is missing or inside its safety margin.
    ///
    /// Returns `None` when credentials are not configured or the exchange
    /// fails; a failed exchange leaves the previous cache entry untouched.
    /// Concurrent callers that miss the cache together share one exchange.
    pub async fn access_token(&self) -> Option<String> {
        let Some(credentials) = self.credentials.as_ref() else {
            warn!("missing client credentials; skipping token exchange");
            return None;
        };

        if let Some(token) = self.cache.get(self.clock.now_epoch_ms()).await {
            return Some(token);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.cache.get(self.clock.now_epoch_ms()).await {
            return Some(token);
        }

        match self.exchange(credentials).await {
            Ok(response) => {
                let expires_in = response.expires_in.unwrap_or_else(|| {
                    debug!("token response carried no expires_in; token will not be reused");
                    0
                });
                let expires_at = self
                    .clock
                    .now_epoch_ms()
                    .saturating_add(expires_in.saturating_mul(1_000));
                self.cache.set(response.access_token.clone(), expires_at).await;
                debug!(expires_in, "refreshed access token");
                Some(response.access_token)
            }
            Err(error) => {
                error!(code = error.code(), %error, "token exchange failed");
                None
            }
        }
    }

    async fn exchange(&self, credentials: &ClientCredentials) -> Result<TokenResponse, SourceError> {
        debug!(url = %self.token_url, "exchanging client credentials");
        let request = HttpRequest::post(self.token_url.as_str())
            .with_form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| SourceError::from_transport(Platform::Twitch, &error))?;

        if !response.is_success() {
            return Err(SourceError::credentials(format!(
                "token endpoint returned status {}",
                response.status
            )));
        }

        let token: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|error| SourceError::malformed(format!("token response: {error}")))?;
        if token.access_token.is_empty() {
            return Err(SourceError::malformed("token response had an empty access_token"));
        }
        Ok(token)
    }
}
