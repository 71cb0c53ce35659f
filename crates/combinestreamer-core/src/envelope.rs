use serde::{Deserialize, Serialize};

use crate::aggregator::{Aggregation, SourceReport};
use crate::{StreamRecord, UtcDateTime};

/// JSON payload served for the aggregated collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamsEnvelope {
    pub streams: Vec<StreamRecord>,
    pub last_updated: UtcDateTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceReport>,
}

impl StreamsEnvelope {
    pub fn new(streams: Vec<StreamRecord>, last_updated: UtcDateTime) -> Self {
        Self {
            streams,
            last_updated,
            sources: Vec::new(),
        }
    }

    pub fn from_aggregation(aggregation: Aggregation, last_updated: UtcDateTime) -> Self {
        Self {
            streams: aggregation.streams,
            last_updated,
            sources: aggregation.sources,
        }
    }

    /// Copy with the stream list replaced; timestamp and reports are kept.
    pub fn with_streams(&self, streams: Vec<StreamRecord>) -> Self {
        Self {
            streams,
            last_updated: self.last_updated,
            sources: self.sources.clone(),
        }
    }
}
