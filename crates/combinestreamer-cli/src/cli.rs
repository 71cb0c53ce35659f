//! CLI argument definitions for combinestreamer.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `streams` | Aggregate once and print the ranked live streams |
//! | `watch` | Re-aggregate on an interval, printing each fresh snapshot |
//! | `sources` | List registered adapters and their status |
//! | `serve` | Serve the aggregated collection over HTTP |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--platform` | all | Keep only these platforms (repeatable) |
//! | `--search` | none | Case-insensitive match on streamer name or title |
//! | `--timeout-ms` | env or `10000` | Per-request timeout |
//!
//! # Examples
//!
//! ```bash
//! combinestreamer streams --format table
//! combinestreamer streams --platform twitch --search ranked --pretty
//! combinestreamer watch --interval-secs 30
//! combinestreamer serve --bind 0.0.0.0:3000
//! ```

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use combinestreamer_core::Platform;

/// Live streams for one game across Twitch, YouTube and Kick.
#[derive(Debug, Parser)]
#[command(
    name = "combinestreamer",
    author,
    version,
    about = "Aggregate live streams across streaming platforms",
    long_about = "combinestreamer polls Twitch, YouTube (through public Invidious mirrors) \
and Kick for live streams of one game, merges them into one list and ranks it by \
viewer count. A failing platform never hides the others.\n\
\n\
Twitch needs TWITCH_CLIENT_ID and TWITCH_CLIENT_SECRET. Other settings are read \
from COMBINESTREAMER_* environment variables."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Keep only streams from this platform. Repeat for several.
    #[arg(long = "platform", global = true)]
    pub platforms: Vec<Platform>,

    /// Keep only streams whose streamer name or title contains this text.
    #[arg(long, global = true)]
    pub search: Option<String>,

    /// Per-request timeout in milliseconds. Overrides COMBINESTREAMER_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON document.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate once and print the ranked live streams.
    ///
    /// # Examples
    ///
    ///   combinestreamer streams
    ///   combinestreamer streams --limit 5 --format table
    Streams(StreamsArgs),

    /// Re-aggregate on an interval and print every fresh snapshot.
    ///
    /// Each cycle runs on its own task. A slow cycle that completes after a
    /// newer one has already published is discarded.
    Watch(WatchArgs),

    /// List registered adapters in polling order.
    Sources(SourcesArgs),

    /// Serve `GET /api/streams` and `GET /health`.
    Serve(ServeArgs),
}

/// Arguments for the `streams` command.
#[derive(Debug, Args)]
pub struct StreamsArgs {
    /// Print at most this many streams.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Include per-source diagnostics in JSON output.
    #[arg(long, default_value_t = false)]
    pub report: bool,
}

/// Arguments for the `watch` command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between aggregation cycles.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,

    /// Stop after printing this many snapshots.
    #[arg(long)]
    pub cycles: Option<u64>,
}

/// Arguments for the `sources` command.
#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Include the YouTube instance order and query.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

/// Arguments for the `serve` command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Seconds between background refreshes.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_filters_after_subcommand() {
        let cli = Cli::try_parse_from([
            "combinestreamer",
            "streams",
            "--platform",
            "twitch",
            "--platform",
            "yt",
            "--search",
            "ranked",
            "--limit",
            "3",
        ])
        .expect("valid arguments");

        assert_eq!(cli.platforms, vec![Platform::Twitch, Platform::Youtube]);
        assert_eq!(cli.search.as_deref(), Some("ranked"));
        assert!(matches!(cli.command, Command::Streams(StreamsArgs { limit: Some(3), .. })));
    }

    #[test]
    fn rejects_unknown_platform() {
        let result = Cli::try_parse_from(["combinestreamer", "streams", "--platform", "mixer"]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["combinestreamer", "serve"]).expect("valid arguments");
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.bind.to_string(), "127.0.0.1:3000");
                assert_eq!(args.interval_secs, 60);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn watch_interval_must_be_positive() {
        let result = Cli::try_parse_from(["combinestreamer", "watch", "--interval-secs", "0"]);
        assert!(result.is_err());
    }
}
