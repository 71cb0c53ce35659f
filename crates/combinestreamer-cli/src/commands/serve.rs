use std::process::ExitCode;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use combinestreamer_core::{Platform, SourceOutcome, StreamFilter};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::error::CliError;
use crate::metadata::RequestId;
use crate::refresh::{spawn_refresher, SnapshotPublisher, SnapshotReceiver};

use super::Context;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct AppState {
    snapshots: SnapshotReceiver,
    defaults: StreamFilter,
}

pub async fn run(args: &ServeArgs, context: &Context) -> Result<ExitCode, CliError> {
    let listener = TcpListener::bind(args.bind).await?;
    let local_addr = listener.local_addr()?;
    info!(%local_addr, interval_secs = args.interval_secs, "serving live streams");

    let cancel = CancellationToken::new();
    let (publisher, snapshots) = SnapshotPublisher::channel();
    let refresher = spawn_refresher(
        context.aggregator.clone(),
        publisher,
        Duration::from_secs(args.interval_secs),
        cancel.clone(),
    );

    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for ctrl+c");
        }
        info!("received shutdown signal, draining");
        shutdown_cancel.cancel();
    });

    let app = router(snapshots, context.filter.clone());
    let server_cancel = cancel.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_cancel.cancelled().await })
        .await;

    cancel.cancel();
    let refreshed = refresher_outcome(refresher.await);
    served.map_err(|error| CliError::Server(error.to_string()))?;
    refreshed?;

    info!("shutdown complete");
    Ok(ExitCode::SUCCESS)
}

fn refresher_outcome(joined: Result<(), JoinError>) -> Result<(), CliError> {
    joined.map_err(|error| {
        warn!(%error, "refresher task ended abnormally");
        CliError::Server(format!("refresher task failed: {error}"))
    })
}

fn router(snapshots: SnapshotReceiver, defaults: StreamFilter) -> Router {
    Router::new()
        .route("/api/streams", get(streams))
        .route("/health", get(health))
        .with_state(AppState {
            snapshots,
            defaults,
        })
}

#[derive(Debug, Default, Deserialize)]
struct StreamsQuery {
    /// Comma separated platform names.
    platform: Option<String>,
    q: Option<String>,
}

async fn streams(State(state): State<AppState>, Query(query): Query<StreamsQuery>) -> Response {
    let request_id = RequestId::new_v4();

    let filter = match request_filter(&state.defaults, &query) {
        Ok(filter) => filter,
        Err(error) => {
            let body = json!({ "streams": [], "error": error });
            return with_request_id((StatusCode::BAD_REQUEST, Json(body)).into_response(), request_id);
        }
    };

    let snapshot = state.snapshots.borrow().clone();
    let response = match snapshot {
        Some(snapshot) => {
            let streams = filter.apply(snapshot.envelope.streams.clone());
            info!(%request_id, generation = snapshot.generation, streams = streams.len(), "served streams");
            Json(snapshot.envelope.with_streams(streams)).into_response()
        }
        None => {
            let body = json!({ "streams": [], "error": "streams have not been loaded yet" });
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    };
    with_request_id(response, request_id)
}

fn request_filter(defaults: &StreamFilter, query: &StreamsQuery) -> Result<StreamFilter, String> {
    let mut filter = defaults.clone();

    if let Some(raw) = &query.platform {
        let platforms = raw
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| value.parse::<Platform>().map_err(|error| error.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        filter = StreamFilter::new()
            .with_platforms(platforms)
            .with_query(defaults.query().unwrap_or_default());
    }
    if let Some(q) = &query.q {
        filter = filter.with_query(q.as_str());
    }
    Ok(filter)
}

fn with_request_id(mut response: Response, request_id: RequestId) -> Response {
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let snapshot = state.snapshots.borrow().clone();
    let Some(snapshot) = snapshot else {
        return (StatusCode::SERVICE_UNAVAILABLE, "STARTING\n");
    };

    let mut polled = snapshot
        .envelope
        .sources
        .iter()
        .filter(|report| report.outcome != SourceOutcome::Disabled);
    if polled.any(|report| report.outcome == SourceOutcome::Failed) {
        (StatusCode::OK, "DEGRADED\n")
    } else {
        (StatusCode::OK, "OK\n")
    }
}
