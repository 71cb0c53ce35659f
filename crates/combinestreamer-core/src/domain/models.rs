use serde::{Deserialize, Serialize};

use super::thumbnail::resolve_thumbnail_url;
use crate::{Platform, UtcDateTime, ValidationError};

/// Title used when a provider reports no title or a blank one.
pub const UNTITLED_STREAM: &str = "Untitled Stream";
/// Streamer name used when a provider reports no usable name.
pub const UNKNOWN_STREAMER: &str = "Unknown";

/// Provider-agnostic fields an adapter extracts from one live entry before
/// normalisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStream {
    /// Identifier native to the platform (stream id, video id).
    pub native_id: String,
    /// Handle the watch URL is built from (channel login, video id).
    pub handle: String,
    pub streamer_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub title: Option<String>,
    pub thumbnail_url: String,
    pub viewer_count: Option<i64>,
    pub started_at: Option<UtcDateTime>,
}

/// Normalised live stream, identical in shape for every platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRecord {
    pub id: String,
    pub platform: Platform,
    pub streamer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    pub title: String,
    pub thumbnail_url: String,
    pub viewer_count: u64,
    pub stream_url: String,
    pub is_live: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<UtcDateTime>,
}

impl StreamRecord {
    /// Normalises a raw provider entry into a live record.
    ///
    /// Applies the shared defaults: blank titles become [`UNTITLED_STREAM`],
    /// blank names become [`UNKNOWN_STREAMER`], missing or negative viewer
    /// counts become 0, and thumbnail/profile URLs are made absolute.
    pub fn from_raw(platform: Platform, raw: RawStream) -> Result<Self, ValidationError> {
        let native_id = raw.native_id.trim();
        if native_id.is_empty() {
            return Err(ValidationError::EmptyField { field: "native_id" });
        }

        let handle = raw.handle.trim();
        if handle.is_empty() {
            return Err(ValidationError::EmptyField { field: "handle" });
        }

        let thumbnail_url = resolve_thumbnail_url(&raw.thumbnail_url);
        validate_absolute_url("thumbnail_url", &thumbnail_url)?;

        let profile_picture_url = raw
            .profile_picture_url
            .as_deref()
            .map(resolve_thumbnail_url)
            .filter(|url| is_absolute_url(url));

        Ok(Self {
            id: platform.record_id(native_id),
            platform,
            streamer_name: non_blank(raw.streamer_name)
                .unwrap_or_else(|| String::from(UNKNOWN_STREAMER)),
            profile_picture_url,
            title: non_blank(raw.title).unwrap_or_else(|| String::from(UNTITLED_STREAM)),
            thumbnail_url,
            viewer_count: raw.viewer_count.map_or(0, |count| count.max(0) as u64),
            stream_url: platform.watch_url(handle),
            is_live: true,
            started_at: raw.started_at,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn is_absolute_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

fn validate_absolute_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_absolute_url(value) {
        Ok(())
    } else {
        Err(ValidationError::NotAbsoluteUrl {
            field,
            value: value.to_owned(),
        })
    }
}
