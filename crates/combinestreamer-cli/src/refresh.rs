//! Latest-wins publication of aggregation results.
//!
//! Every refresh cycle takes a [`Ticket`] before it starts. When it
//! completes, its result is published unless a newer cycle has already
//! published, so a slow cycle can never overwrite a fresher snapshot while
//! cycles that outlast the refresh period still land.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use combinestreamer_core::{Aggregator, StreamsEnvelope, UtcDateTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Generation number handed to one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tickets.
#[derive(Debug, Default)]
pub struct RefreshGuard {
    latest: AtomicU64,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }
}

/// A published aggregation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub generation: u64,
    pub envelope: StreamsEnvelope,
}

pub type SnapshotReceiver = watch::Receiver<Option<Arc<Snapshot>>>;

/// Owns the guard and the watch channel readers subscribe to.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    guard: Arc<RefreshGuard>,
    sender: Arc<watch::Sender<Option<Arc<Snapshot>>>>,
}

impl SnapshotPublisher {
    pub fn channel() -> (Self, SnapshotReceiver) {
        let (sender, receiver) = watch::channel(None);
        let publisher = Self {
            guard: Arc::new(RefreshGuard::new()),
            sender: Arc::new(sender),
        };
        (publisher, receiver)
    }

    pub fn issue(&self) -> Ticket {
        self.guard.issue()
    }

    /// Publishes `envelope` unless a snapshot from the same or a newer
    /// generation is already published.
    ///
    /// Returns whether the snapshot was published.
    pub fn publish(&self, ticket: Ticket, envelope: StreamsEnvelope) -> bool {
        self.sender.send_if_modified(|current| {
            if current
                .as_ref()
                .is_some_and(|snapshot| snapshot.generation >= ticket.0)
            {
                debug!(generation = ticket.0, "discarding superseded refresh result");
                return false;
            }
            *current = Some(Arc::new(Snapshot {
                generation: ticket.0,
                envelope,
            }));
            true
        })
    }
}

/// Starts a cycle every `period`, the first one immediately.
///
/// Each cycle runs on its own task so a slow cycle never delays the next
/// one; the publisher decides which results land.
pub fn spawn_refresher(
    aggregator: Arc<Aggregator>,
    publisher: SnapshotPublisher,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let ticket = publisher.issue();
                    tokio::spawn(refresh_once(
                        aggregator.clone(),
                        publisher.clone(),
                        ticket,
                        cancel.clone(),
                    ));
                }
            }
        }
        debug!("refresher stopped");
    })
}

async fn refresh_once(
    aggregator: Arc<Aggregator>,
    publisher: SnapshotPublisher,
    ticket: Ticket,
    cancel: CancellationToken,
) {
    tokio::select! {
        _ = cancel.cancelled() => {}
        aggregation = aggregator.aggregate_with_report() => {
            let count = aggregation.streams.len();
            let envelope = StreamsEnvelope::from_aggregation(aggregation, UtcDateTime::now());
            if publisher.publish(ticket, envelope) {
                info!(generation = ticket.generation(), streams = count, "published snapshot");
            }
        }
    }
}
