use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Platform, StreamRecord};

/// Client-side narrowing of an aggregated collection.
///
/// An empty platform set admits every platform. The query matches streamer
/// name or title, case-insensitively; a blank query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamFilter {
    platforms: Vec<Platform>,
    query: Option<String>,
}

impl StreamFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        if !self.platforms.contains(&platform) {
            self.platforms.push(platform);
        }
        self
    }

    pub fn with_platforms(self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        platforms
            .into_iter()
            .fold(self, |filter, platform| filter.with_platform(platform))
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into().trim().to_lowercase();
        self.query = if query.is_empty() { None } else { Some(query) };
        self
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn matches(&self, stream: &StreamRecord) -> bool {
        if !self.platforms.is_empty() && !self.platforms.contains(&stream.platform) {
            return false;
        }

        match &self.query {
            Some(query) => {
                stream.streamer_name.to_lowercase().contains(query)
                    || stream.title.to_lowercase().contains(query)
            }
            None => true,
        }
    }

    /// Retains matching records; ranking order is preserved.
    pub fn apply(&self, streams: Vec<StreamRecord>) -> Vec<StreamRecord> {
        streams
            .into_iter()
            .filter(|stream| self.matches(stream))
            .collect()
    }
}

/// Summary counts over a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_streams: usize,
    pub total_viewers: u64,
    pub per_platform: BTreeMap<Platform, usize>,
}

impl PlatformStats {
    pub fn from_streams(streams: &[StreamRecord]) -> Self {
        let mut stats = Self::default();
        for stream in streams {
            stats.total_streams += 1;
            stats.total_viewers = stats.total_viewers.saturating_add(stream.viewer_count);
            *stats.per_platform.entry(stream.platform).or_default() += 1;
        }
        stats
    }

    pub fn count(&self, platform: Platform) -> usize {
        self.per_platform.get(&platform).copied().unwrap_or(0)
    }
}
