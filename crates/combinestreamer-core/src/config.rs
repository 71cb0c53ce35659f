//! Runtime configuration for the aggregation pipeline.
//!
//! Defaults target SOULCALIBUR VI. Credentials and overrides come from the
//! environment; see [`StreamerConfig::from_env`].

use std::env;

use crate::auth::ClientCredentials;
use crate::fallback::InstanceEndpoint;
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::ValidationError;

pub const ENV_TWITCH_CLIENT_ID: &str = "TWITCH_CLIENT_ID";
pub const ENV_TWITCH_CLIENT_SECRET: &str = "TWITCH_CLIENT_SECRET";
pub const ENV_GAME_TITLE: &str = "COMBINESTREAMER_GAME_TITLE";
pub const ENV_SEARCH_QUERY: &str = "COMBINESTREAMER_SEARCH_QUERY";
pub const ENV_YOUTUBE_CHANNEL_ID: &str = "COMBINESTREAMER_YOUTUBE_CHANNEL_ID";
pub const ENV_INVIDIOUS_INSTANCES: &str = "COMBINESTREAMER_INVIDIOUS_INSTANCES";
pub const ENV_TWITCH_GAME_ID: &str = "COMBINESTREAMER_TWITCH_GAME_ID";
pub const ENV_TIMEOUT_MS: &str = "COMBINESTREAMER_TIMEOUT_MS";

/// Public Invidious instances, most reliable first.
pub const DEFAULT_INVIDIOUS_INSTANCES: [&str; 5] = [
    "https://iv.nboeck.de",
    "https://invidious.privacyredirect.com",
    "https://y.com.sb",
    "https://invidious.slipfox.xyz",
    "https://invidious.projectsegfau.lt",
];

pub const DEFAULT_GAME_TITLE: &str = "SOULCALIBUR VI";
pub const DEFAULT_SEARCH_QUERY: &str = "soulcalibur 6";
pub const DEFAULT_TWITCH_PAGE_SIZE: u16 = 20;

/// Everything the adapters need to know about what to look for and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamerConfig {
    /// Exact game name used for the Twitch category lookup.
    pub game_title: String,
    /// Free-text query used against YouTube search.
    pub search_query: String,
    /// When set, YouTube streams are read from this channel instead of search.
    pub youtube_channel_id: Option<String>,
    pub invidious_instances: Vec<InstanceEndpoint>,
    /// Skips the Twitch category lookup when known.
    pub twitch_game_id: Option<String>,
    pub twitch_page_size: u16,
    pub twitch_credentials: Option<ClientCredentials>,
    pub timeout_ms: u64,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            game_title: String::from(DEFAULT_GAME_TITLE),
            search_query: String::from(DEFAULT_SEARCH_QUERY),
            youtube_channel_id: None,
            invidious_instances: DEFAULT_INVIDIOUS_INSTANCES
                .iter()
                .map(|url| InstanceEndpoint::new(*url))
                .collect(),
            twitch_game_id: None,
            twitch_page_size: DEFAULT_TWITCH_PAGE_SIZE,
            twitch_credentials: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl StreamerConfig {
    /// Builds a config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfig`] when an override is present
    /// but unusable (non-numeric timeout, empty instance list).
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(title) = read(ENV_GAME_TITLE) {
            config.game_title = title;
        }
        if let Some(query) = read(ENV_SEARCH_QUERY) {
            config.search_query = query;
        }
        config.youtube_channel_id = read(ENV_YOUTUBE_CHANNEL_ID);
        config.twitch_game_id = read(ENV_TWITCH_GAME_ID);

        if let Some(raw) = read(ENV_INVIDIOUS_INSTANCES) {
            let instances = raw
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(InstanceEndpoint::new)
                .collect::<Vec<_>>();
            if instances.is_empty() {
                return Err(ValidationError::InvalidConfig {
                    key: ENV_INVIDIOUS_INSTANCES,
                    value: raw,
                    reason: "expected a comma separated list of base urls",
                });
            }
            config.invidious_instances = instances;
        }

        if let Some(raw) = read(ENV_TIMEOUT_MS) {
            config.timeout_ms = match raw.parse::<u64>() {
                Ok(value) if value > 0 => value,
                _ => {
                    return Err(ValidationError::InvalidConfig {
                        key: ENV_TIMEOUT_MS,
                        value: raw,
                        reason: "expected a positive integer",
                    })
                }
            };
        }

        config.twitch_credentials = match (read(ENV_TWITCH_CLIENT_ID), read(ENV_TWITCH_CLIENT_SECRET)) {
            (Some(id), Some(secret)) => Some(ClientCredentials::new(id, secret)),
            _ => None,
        };

        Ok(config)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}
