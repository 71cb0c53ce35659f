use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Closed set of platforms a stream can originate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    Youtube,
    Kick,
}

impl Platform {
    pub const ALL: [Self; 3] = [Self::Twitch, Self::Youtube, Self::Kick];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Twitch => "twitch",
            Self::Youtube => "youtube",
            Self::Kick => "kick",
        }
    }

    /// Builds the cross-platform record id `{platform}-{native_id}`.
    pub fn record_id(self, native_id: &str) -> String {
        format!("{}-{}", self.as_str(), native_id)
    }

    /// Canonical watch-page URL for a platform-native handle.
    ///
    /// The handle is the channel login on Twitch and Kick and the video id on
    /// YouTube.
    pub fn watch_url(self, handle: &str) -> String {
        match self {
            Self::Twitch => format!("https://twitch.tv/{handle}"),
            Self::Youtube => format!("https://youtube.com/watch?v={handle}"),
            Self::Kick => format!("https://kick.com/{handle}"),
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "twitch" => Ok(Self::Twitch),
            "youtube" | "yt" => Ok(Self::Youtube),
            "kick" => Ok(Self::Kick),
            other => Err(ValidationError::InvalidPlatform {
                value: other.to_owned(),
            }),
        }
    }
}
