//! Shared test fixtures and helpers.
//!
//! A scripted transport plus captured provider payloads, reused by the
//! adapter, auth and aggregator test modules.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

type Scripted = Result<HttpResponse, HttpError>;

/// Transport that answers by URL prefix and records every request.
///
/// Each prefix holds a queue of answers; the last answer repeats once the
/// queue is drained. Unmatched URLs fail like a connection error.
#[derive(Debug, Default)]
pub(crate) struct ScriptedHttpClient {
    routes: Mutex<Vec<(String, VecDeque<Scripted>)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, prefix: &str, status: u16, body: &str) -> Self {
        self.push(prefix, Ok(HttpResponse::new(status, body)))
    }

    pub(crate) fn fail(self, prefix: &str, message: &str) -> Self {
        self.push(prefix, Err(HttpError::new(message)))
    }

    fn push(self, prefix: &str, answer: Scripted) -> Self {
        {
            let mut routes = self.routes.lock().expect("routes lock");
            match routes.iter_mut().find(|(known, _)| known == prefix) {
                Some((_, queue)) => queue.push_back(answer),
                None => routes.push((prefix.to_owned(), VecDeque::from([answer]))),
            }
        }
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.starts_with(prefix))
            .count()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let answer = {
            let mut routes = self.routes.lock().expect("routes lock");
            routes
                .iter_mut()
                .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
                .and_then(|(_, queue)| {
                    if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    }
                })
                .unwrap_or_else(|| Err(HttpError::new(format!("connection refused: {}", request.url))))
        };
        self.requests.lock().expect("requests lock").push(request);
        Box::pin(async move { answer })
    }
}

pub(crate) const TWITCH_TOKEN_JSON: &str =
    r#"{"access_token":"tok-1","expires_in":3600,"token_type":"bearer"}"#;

pub(crate) const TWITCH_GAMES_JSON: &str =
    r#"{"data":[{"id":"497385","name":"SOULCALIBUR VI","box_art_url":"https://x.test/{width}x{height}.jpg"}]}"#;

/// Two live channels plus one rerun that must be dropped.
pub(crate) const TWITCH_STREAMS_JSON: &str = r#"{"data":[
    {"id":"111","user_id":"9","user_login":"stepfighter","user_name":"StepFighter","game_id":"497385","game_name":"SOULCALIBUR VI","type":"live","title":"Ranked","viewer_count":42,"started_at":"2024-05-01T18:00:00Z","thumbnail_url":"https://static-cdn.jtvnw.net/previews-ttv/live_user_stepfighter-{width}x{height}.jpg"},
    {"id":"222","user_id":"8","user_login":"guardimpact","user_name":"GuardImpact","game_id":"497385","game_name":"SOULCALIBUR VI","type":"live","title":"","viewer_count":130,"started_at":"2024-05-01T17:00:00Z","thumbnail_url":"https://static-cdn.jtvnw.net/previews-ttv/live_user_guardimpact-{width}x{height}.jpg"},
    {"id":"333","user_id":"7","user_login":"offline","user_name":"Offline","game_id":"497385","game_name":"SOULCALIBUR VI","type":"","title":"vod","viewer_count":3,"started_at":"","thumbnail_url":""}
],"pagination":{}}"#;

/// Invidious search result: two live videos, one VOD.
pub(crate) const INVIDIOUS_SEARCH_JSON: &str = r#"[
    {"type":"video","title":"SC6 lobby","videoId":"vid-a","author":"Nightmare Main","authorId":"UCa","videoThumbnails":[{"quality":"maxres","url":"https://i.ytimg.com/vi/vid-a/maxres.jpg"},{"quality":"high","url":"//i.ytimg.com/vi/vid-a/hq.jpg"}],"viewCount":75,"published":1714586400,"liveNow":true},
    {"type":"live","title":"","videoId":"vid-b","authorId":"UCb","videoThumbnails":[],"liveNow":false,"authorThumbnails":[{"url":"//yt3.ggpht.com/small","width":32},{"url":"//yt3.ggpht.com/large","width":176}]},
    {"type":"video","title":"Old VOD","videoId":"vid-c","author":"Archive","viewCount":9000,"liveNow":false}
]"#;
