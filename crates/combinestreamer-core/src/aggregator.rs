//! Concurrent fan-out over every registered adapter.
//!
//! Each adapter's outcome is observed on its own: a failure (error or panic)
//! contributes zero records and a failed [`SourceReport`], never an
//! aggregation error. Surviving records are concatenated in registration
//! order and ranked by viewer count with a stable sort, so equal counts keep
//! registration order, then source order.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::adapters::{InvidiousAdapter, KickAdapter, TwitchAdapter};
use crate::config::StreamerConfig;
use crate::data_source::{SourceError, SourceStatus, StreamBatch, StreamSource};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{Platform, StreamRecord};

/// How one adapter fared in one aggregation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOutcome {
    Ok,
    Failed,
    Disabled,
}

/// Per-adapter diagnostics for one aggregation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    pub platform: Platform,
    pub outcome: SourceOutcome,
    /// Live records this adapter contributed after duplicate ids were dropped.
    pub stream_count: usize,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub served_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Ranked streams plus per-source reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub streams: Vec<StreamRecord>,
    /// One entry per registered adapter, in registration order.
    pub sources: Vec<SourceReport>,
    pub latency_ms: u64,
}

impl Aggregation {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources
            .iter()
            .filter(|report| report.outcome == SourceOutcome::Failed)
    }
}

/// Registry of adapters polled together.
#[derive(Clone)]
pub struct Aggregator {
    sources: Vec<Arc<dyn StreamSource>>,
}

impl Aggregator {
    /// Adapters are polled concurrently but merged in the order given here.
    pub fn new(sources: Vec<Arc<dyn StreamSource>>) -> Self {
        Self { sources }
    }

    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::new()
    }

    /// YouTube, Twitch and Kick adapters over a real HTTP client.
    pub fn from_config(config: &StreamerConfig) -> Self {
        AggregatorBuilder::new().with_config(config.clone()).build()
    }

    pub fn sources(&self) -> &[Arc<dyn StreamSource>] {
        &self.sources
    }

    /// Runs one aggregation cycle and returns the ranked live streams.
    ///
    /// Never fails: when every adapter fails the result is empty.
    pub async fn aggregate(&self) -> Vec<StreamRecord> {
        self.aggregate_with_report().await.streams
    }

    /// Like [`aggregate`](Self::aggregate), also reporting each adapter's outcome.
    pub async fn aggregate_with_report(&self) -> Aggregation {
        let started = Instant::now();
        let settled = join_all(self.sources.iter().map(|source| settle(source.as_ref()))).await;

        let mut streams = Vec::new();
        let mut sources = Vec::with_capacity(settled.len());
        let mut seen = HashSet::new();
        for (source, (result, latency_ms)) in self.sources.iter().zip(settled) {
            // Same first-wins rule as `rank`, so counts match the returned streams.
            let contributed = result.as_ref().map_or(0, |batch| {
                batch
                    .streams
                    .iter()
                    .filter(|stream| stream.is_live && seen.insert(stream.id.clone()))
                    .count()
            });
            sources.push(report(source.as_ref(), &result, latency_ms, contributed));
            if let Ok(batch) = result {
                streams.extend(batch.streams);
            }
        }

        let streams = rank(streams);
        let latency_ms = elapsed_ms(started);
        info!(
            streams = streams.len(),
            failed = sources.iter().filter(|r| r.outcome == SourceOutcome::Failed).count(),
            latency_ms,
            "aggregation complete"
        );

        Aggregation {
            streams,
            sources,
            latency_ms,
        }
    }
}

/// Awaits one adapter, capturing errors and panics as a failed outcome.
async fn settle(source: &dyn StreamSource) -> (Result<StreamBatch, SourceError>, u64) {
    if source.status() == SourceStatus::Disabled {
        return (Ok(StreamBatch::default()), 0);
    }

    let started = Instant::now();
    let result = AssertUnwindSafe(source.fetch_live())
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            let message = panic_message(panic.as_ref());
            error!(platform = %source.platform(), %message, "source panicked");
            Err(SourceError::internal(format!("adapter panicked: {message}")))
        });

    if let Err(error) = &result {
        warn!(platform = %source.platform(), code = error.code(), %error, "source failed");
    }
    (result, elapsed_ms(started))
}

fn report(
    source: &dyn StreamSource,
    result: &Result<StreamBatch, SourceError>,
    latency_ms: u64,
    stream_count: usize,
) -> SourceReport {
    let platform = source.platform();
    match result {
        Ok(_) if source.status() == SourceStatus::Disabled => SourceReport {
            platform,
            outcome: SourceOutcome::Disabled,
            stream_count: 0,
            latency_ms,
            served_by: None,
            error_code: None,
            error_message: None,
        },
        Ok(batch) => SourceReport {
            platform,
            outcome: SourceOutcome::Ok,
            stream_count,
            latency_ms,
            served_by: batch.served_by.clone(),
            error_code: None,
            error_message: None,
        },
        Err(error) => SourceReport {
            platform,
            outcome: SourceOutcome::Failed,
            stream_count: 0,
            latency_ms,
            served_by: None,
            error_code: Some(error.code().to_owned()),
            error_message: Some(error.message().to_owned()),
        },
    }
}

/// Keeps live records, drops repeated ids (first occurrence wins) and sorts
/// by viewer count, descending and stable.
pub fn rank(streams: Vec<StreamRecord>) -> Vec<StreamRecord> {
    let mut seen = HashSet::with_capacity(streams.len());
    let mut ranked = streams
        .into_iter()
        .filter(|stream| stream.is_live)
        .filter(|stream| seen.insert(stream.id.clone()))
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.viewer_count.cmp(&a.viewer_count));
    ranked
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}

/// Builder for the default adapter set.
///
/// # Example
///
/// ```rust,ignore
/// use combinestreamer_core::{Aggregator, StreamerConfig};
///
/// let aggregator = Aggregator::builder()
///     .with_config(StreamerConfig::from_env()?)
///     .build();
/// let streams = aggregator.aggregate().await;
/// ```
#[derive(Default)]
pub struct AggregatorBuilder {
    config: StreamerConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    extra_sources: Vec<Arc<dyn StreamSource>>,
}

impl AggregatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: StreamerConfig) -> Self {
        self.config = config;
        self
    }

    /// Transport shared by every built-in adapter. Defaults to reqwest.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Registers an additional adapter after the built-in ones.
    pub fn with_source(mut self, source: Arc<dyn StreamSource>) -> Self {
        self.extra_sources.push(source);
        self
    }

    pub fn build(self) -> Aggregator {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));

        let mut sources: Vec<Arc<dyn StreamSource>> = vec![
            Arc::new(InvidiousAdapter::new(http_client.clone(), &self.config)),
            Arc::new(TwitchAdapter::new(http_client, &self.config)),
            Arc::new(KickAdapter),
        ];
        sources.extend(self.extra_sources);
        Aggregator::new(sources)
    }
}
