use std::process::ExitCode;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;
use crate::refresh::{spawn_refresher, SnapshotPublisher};

use super::Context;

pub async fn run(
    args: &WatchArgs,
    context: &Context,
    format: OutputFormat,
    pretty: bool,
) -> Result<ExitCode, CliError> {
    let (publisher, mut snapshots) = SnapshotPublisher::channel();
    let cancel = CancellationToken::new();
    let refresher = spawn_refresher(
        context.aggregator.clone(),
        publisher,
        Duration::from_secs(args.interval_secs),
        cancel.clone(),
    );
    info!(interval_secs = args.interval_secs, "watching live streams");

    let mut printed = 0_u64;
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(snapshot) = snapshots.borrow_and_update().clone() else {
                    continue;
                };
                let envelope = snapshot
                    .envelope
                    .with_streams(context.filter.apply(snapshot.envelope.streams.clone()));
                output::render_streams(&envelope, format, pretty)?;

                printed += 1;
                if args.cycles.is_some_and(|cycles| printed >= cycles) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal");
                break;
            }
        }
    }

    cancel.cancel();
    if let Err(error) = refresher.await {
        return Err(CliError::Command(format!("refresher task failed: {error}")));
    }
    Ok(ExitCode::SUCCESS)
}
