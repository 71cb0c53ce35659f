mod serve;
mod sources;
mod streams;
mod watch;

use std::process::ExitCode;
use std::sync::Arc;

use combinestreamer_core::{
    Aggregation, Aggregator, SourceOutcome, StreamFilter, StreamerConfig,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub use sources::SourceRow;

/// Exit code when no enabled source produced a result.
const ALL_SOURCES_FAILED: u8 = 3;

/// Shared state every command runs against.
pub struct Context {
    pub config: StreamerConfig,
    pub aggregator: Arc<Aggregator>,
    pub filter: StreamFilter,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut config = StreamerConfig::from_env()?;
        if let Some(timeout_ms) = cli.timeout_ms {
            if timeout_ms == 0 {
                return Err(CliError::Command(String::from(
                    "--timeout-ms must be greater than zero",
                )));
            }
            config = config.with_timeout_ms(timeout_ms);
        }

        let mut filter = StreamFilter::new().with_platforms(cli.platforms.iter().copied());
        if let Some(search) = &cli.search {
            filter = filter.with_query(search.as_str());
        }

        Ok(Self {
            aggregator: Arc::new(Aggregator::from_config(&config)),
            config,
            filter,
        })
    }
}

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let context = Context::from_cli(cli)?;

    match &cli.command {
        Command::Streams(args) => streams::run(args, &context, cli.format, cli.pretty).await,
        Command::Watch(args) => watch::run(args, &context, cli.format, cli.pretty).await,
        Command::Sources(args) => {
            let rows = sources::run(args, &context);
            crate::output::render_sources(&rows, cli.format, cli.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve(args) => serve::run(args, &context).await,
    }
}

/// True when at least one source was polled and every polled source failed.
fn every_source_failed(aggregation: &Aggregation) -> bool {
    let mut polled = aggregation
        .sources
        .iter()
        .filter(|report| report.outcome != SourceOutcome::Disabled)
        .peekable();
    polled.peek().is_some() && polled.all(|report| report.outcome == SourceOutcome::Failed)
}

fn exit_code_for(aggregation: &Aggregation) -> ExitCode {
    if every_source_failed(aggregation) {
        ExitCode::from(ALL_SOURCES_FAILED)
    } else {
        ExitCode::SUCCESS
    }
}
