//! Fakes shared by the workspace integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use combinestreamer_core::{
    HttpClient, HttpError, HttpRequest, HttpResponse, Platform, RawStream, SourceError,
    StreamBatch, StreamRecord, StreamSource,
};

/// Transport answering by URL prefix; the first matching route wins.
/// Unmatched URLs fail like a refused connection.
#[derive(Default)]
pub struct FakeHttpClient {
    routes: Vec<(String, Result<HttpResponse, HttpError>)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, prefix: &str, status: u16, body: &str) -> Self {
        self.routes
            .push((prefix.to_owned(), Ok(HttpResponse::new(status, body))));
        self
    }

    pub fn route_error(mut self, prefix: &str, message: &str) -> Self {
        self.routes
            .push((prefix.to_owned(), Err(HttpError::new(message))));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.starts_with(prefix))
            .count()
    }
}

impl HttpClient for FakeHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let answer = self
            .routes
            .iter()
            .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| Err(HttpError::new(format!("connection refused: {}", request.url))));
        self.requests.lock().expect("requests lock").push(request);
        Box::pin(async move { answer })
    }
}

/// What a [`FixtureSource`] does when polled.
#[derive(Clone)]
pub enum Script {
    Streams(Vec<(&'static str, i64)>),
    Fail,
    Panic,
    /// Sleeps, then returns the streams.
    Slow(Duration, Vec<(&'static str, i64)>),
}

/// In-memory adapter with a fixed script.
pub struct FixtureSource {
    platform: Platform,
    script: Script,
    calls: AtomicUsize,
}

impl FixtureSource {
    pub fn new(platform: Platform, script: Script) -> Arc<Self> {
        Arc::new(Self {
            platform,
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StreamSource for FixtureSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn fetch_live<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<StreamBatch, SourceError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            match &self.script {
                Script::Streams(entries) => Ok(StreamBatch::new(records(self.platform, entries))),
                Script::Fail => Err(SourceError::unavailable("scripted outage")),
                Script::Panic => panic!("scripted adapter bug"),
                Script::Slow(delay, entries) => {
                    tokio::time::sleep(*delay).await;
                    Ok(StreamBatch::new(records(self.platform, entries)))
                }
            }
        })
    }
}

pub fn record(platform: Platform, native_id: &str, viewers: i64) -> StreamRecord {
    StreamRecord::from_raw(
        platform,
        RawStream {
            native_id: native_id.to_owned(),
            handle: native_id.to_owned(),
            thumbnail_url: String::from("https://cdn.test/thumb.jpg"),
            viewer_count: Some(viewers),
            ..RawStream::default()
        },
    )
    .expect("valid fixture record")
}

fn records(platform: Platform, entries: &[(&'static str, i64)]) -> Vec<StreamRecord> {
    entries
        .iter()
        .map(|(id, viewers)| record(platform, id, *viewers))
        .collect()
}

pub fn ids(streams: &[StreamRecord]) -> Vec<String> {
    streams.iter().map(|stream| stream.id.clone()).collect()
}

pub const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

pub const TOKEN_JSON: &str = r#"{"access_token":"tok-live","expires_in":3600,"token_type":"bearer"}"#;

pub const GAMES_JSON: &str = r#"{"data":[{"id":"497385","name":"SOULCALIBUR VI"}]}"#;

pub const STREAMS_JSON: &str = r#"{
  "data": [
    {"id":"901","user_login":"guardimpact","user_name":"GuardImpact","type":"live","title":"Ranked","viewer_count":210,
     "started_at":"2024-05-01T17:00:00Z","thumbnail_url":"https://static-cdn.jtvnw.net/previews-ttv/live_user_guardimpact-{width}x{height}.jpg"},
    {"id":"902","user_login":"stepfighter","user_name":"StepFighter","type":"live","title":"","viewer_count":15,
     "started_at":"2024-05-01T16:30:00Z","thumbnail_url":"https://static-cdn.jtvnw.net/previews-ttv/live_user_stepfighter-{width}x{height}.jpg"}
  ]
}"#;

pub const SEARCH_JSON: &str = r#"[
  {"type":"video","videoId":"yt-live-1","title":"SC6 lab","author":"LabRat","authorId":"UC1","liveNow":true,
   "viewCount":95,"published":1714586400,
   "videoThumbnails":[{"quality":"high","url":"//i.ytimg.com/vi/yt-live-1/hq.jpg"}]},
  {"type":"video","videoId":"yt-vod","title":"Old tournament","author":"Archive","liveNow":false,"viewCount":5000}
]"#;
