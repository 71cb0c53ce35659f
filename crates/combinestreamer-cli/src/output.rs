use serde::Serialize;

use combinestreamer_core::{SourceOutcome, SourceReport, StreamRecord, StreamsEnvelope};

use crate::cli::OutputFormat;
use crate::commands::SourceRow;
use crate::error::CliError;

const TITLE_WIDTH: usize = 48;

pub fn render_streams(
    envelope: &StreamsEnvelope,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => println!("{}", to_json(envelope, pretty)?),
        OutputFormat::Table => {
            for line in stream_table(envelope) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

pub fn render_sources(
    sources: &[SourceRow],
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => println!("{}", to_json(sources, pretty)?),
        OutputFormat::Table => {
            for line in source_table(sources) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(payload)
}

fn stream_table(envelope: &StreamsEnvelope) -> Vec<String> {
    let mut lines = vec![format!("last_updated: {}", envelope.last_updated)];

    for report in &envelope.sources {
        let mut line = format!(
            "  {:<8} {:<9} {:>3} streams {:>6} ms",
            report.platform.as_str(),
            outcome_label(report),
            report.stream_count,
            report.latency_ms
        );
        if let Some(message) = &report.error_message {
            line.push_str(&format!("  {message}"));
        }
        lines.push(line);
    }

    if envelope.streams.is_empty() {
        lines.push(String::from("no live streams"));
        return lines;
    }

    lines.push(format!(
        "{:>4}  {:<8} {:>8}  {:<20} {}",
        "#", "platform", "viewers", "streamer", "title"
    ));
    for (rank, stream) in envelope.streams.iter().enumerate() {
        lines.push(stream_row(rank + 1, stream));
    }
    lines
}

fn stream_row(rank: usize, stream: &StreamRecord) -> String {
    format!(
        "{:>4}  {:<8} {:>8}  {:<20} {}  {}",
        rank,
        stream.platform.as_str(),
        stream.viewer_count,
        truncate(&stream.streamer_name, 20),
        truncate(&stream.title, TITLE_WIDTH),
        stream.stream_url
    )
}

fn outcome_label(report: &SourceReport) -> &'static str {
    match report.outcome {
        SourceOutcome::Ok => "ok",
        SourceOutcome::Failed => "failed",
        SourceOutcome::Disabled => "disabled",
    }
}

fn source_table(sources: &[SourceRow]) -> Vec<String> {
    let mut lines = vec![format!("{:<8} {:<20} {}", "platform", "status", "detail")];
    for source in sources {
        lines.push(format!(
            "{:<8} {:<20} {}",
            source.platform.as_str(),
            source.status,
            source.detail.join(", ")
        ));
    }
    lines
}

/// Cuts `value` to at most `max` characters, marking the cut with `…`.
fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_owned();
    }
    let mut cut = value.chars().take(max.saturating_sub(1)).collect::<String>();
    cut.push('…');
    cut
}
