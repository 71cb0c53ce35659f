use std::process::ExitCode;

use combinestreamer_core::{StreamsEnvelope, UtcDateTime};

use crate::cli::{OutputFormat, StreamsArgs};
use crate::error::CliError;
use crate::output;

use super::{exit_code_for, Context};

pub async fn run(
    args: &StreamsArgs,
    context: &Context,
    format: OutputFormat,
    pretty: bool,
) -> Result<ExitCode, CliError> {
    let aggregation = context.aggregator.aggregate_with_report().await;
    let exit_code = exit_code_for(&aggregation);

    let mut envelope = StreamsEnvelope::from_aggregation(aggregation, UtcDateTime::now());
    envelope.streams = context.filter.apply(envelope.streams);
    if let Some(limit) = args.limit {
        envelope.streams.truncate(limit);
    }
    if !args.report {
        envelope.sources.clear();
    }

    output::render_streams(&envelope, format, pretty)?;
    Ok(exit_code)
}
