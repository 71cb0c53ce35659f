use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::ClientCredentialsAuth;
use crate::config::StreamerConfig;
use crate::data_source::{SourceError, SourceStatus, StreamBatch, StreamSource};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::{Platform, RawStream, StreamRecord, UtcDateTime};

/// Helix REST API root.
pub const TWITCH_API_BASE: &str = "https://api.twitch.tv/helix";

/// Twitch Helix adapter: category lookup, then live streams in that category.
#[derive(Clone)]
pub struct TwitchAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: ClientCredentialsAuth,
    api_base: String,
    game_title: String,
    game_id: Option<String>,
    page_size: u16,
    timeout_ms: u64,
}

impl TwitchAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &StreamerConfig) -> Self {
        let auth = ClientCredentialsAuth::new(http_client.clone(), config.twitch_credentials.clone())
            .with_timeout_ms(config.timeout_ms);
        Self {
            http_client,
            auth,
            api_base: String::from(TWITCH_API_BASE),
            game_title: config.game_title.clone(),
            game_id: config.twitch_game_id.clone(),
            page_size: config.twitch_page_size.clamp(1, 100),
            timeout_ms: config.timeout_ms,
        }
    }

    /// Replaces the token provider, e.g. to share a cache or inject a clock.
    pub fn with_auth(mut self, auth: ClientCredentialsAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn auth(&self) -> &ClientCredentialsAuth {
        &self.auth
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        client_id: &str,
        token: &str,
        what: &str,
    ) -> Result<T, SourceError> {
        debug!(%url, "twitch request");
        let request = HttpRequest::get(url)
            .with_auth(&HttpAuth::Header {
                name: String::from("Client-Id"),
                value: client_id.to_owned(),
            })
            .with_auth(&HttpAuth::BearerToken(token.to_owned()))
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| SourceError::from_transport(Platform::Twitch, &error))?;

        if !response.is_success() {
            return Err(SourceError::from_status(Platform::Twitch, what, response.status));
        }

        serde_json::from_str(&response.body)
            .map_err(|error| SourceError::malformed(format!("twitch {what}: {error}")))
    }

    async fn resolve_game_id(&self, client_id: &str, token: &str) -> Result<Option<String>, SourceError> {
        if let Some(game_id) = &self.game_id {
            return Ok(Some(game_id.clone()));
        }

        let url = format!(
            "{}/games?name={}",
            self.api_base,
            urlencoding::encode(&self.game_title)
        );
        let page: HelixPage<HelixGame> = self.get_json(url, client_id, token, "game lookup").await?;
        Ok(page
            .data
            .into_iter()
            .map(|game| game.id)
            .find(|id| !id.is_empty()))
    }
}

impl StreamSource for TwitchAdapter {
    fn platform(&self) -> Platform {
        Platform::Twitch
    }

    fn status(&self) -> SourceStatus {
        if self.auth.credentials().is_some() {
            SourceStatus::Enabled
        } else {
            SourceStatus::MissingCredentials
        }
    }

    fn fetch_live<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<StreamBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let Some(credentials) = self.auth.credentials() else {
                return Err(SourceError::credentials(
                    "twitch client credentials are not configured",
                ));
            };
            let client_id = credentials.client_id.as_str();

            let token = self
                .auth
                .access_token()
                .await
                .ok_or_else(|| SourceError::credentials("could not obtain a twitch access token"))?;

            let Some(game_id) = self.resolve_game_id(client_id, &token).await? else {
                warn!(game = %self.game_title, "game not found on twitch");
                return Ok(StreamBatch::new(Vec::new()));
            };

            let url = format!(
                "{}/streams?game_id={}&first={}",
                self.api_base,
                urlencoding::encode(&game_id),
                self.page_size
            );
            let page: HelixPage<Value> = self.get_json(url, client_id, &token, "streams").await?;

            let streams = page
                .data
                .into_iter()
                .filter_map(|value| match serde_json::from_value::<HelixStream>(value) {
                    Ok(stream) => Some(stream),
                    Err(error) => {
                        debug!(%error, "skipping unreadable twitch stream entry");
                        None
                    }
                })
                .filter(|stream| stream.kind == "live")
                .filter_map(|stream| {
                    let id = stream.id.clone();
                    normalize_stream(stream)
                        .map_err(|error| warn!(id = %id, %error, "skipping twitch stream"))
                        .ok()
                })
                .collect::<Vec<_>>();

            info!(count = streams.len(), "found twitch streams");
            Ok(StreamBatch::new(streams))
        })
    }
}

#[derive(Debug, Deserialize)]
struct HelixPage<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct HelixGame {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HelixStream {
    id: String,
    user_login: String,
    user_name: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    title: Option<String>,
    viewer_count: Option<i64>,
    started_at: Option<String>,
    thumbnail_url: String,
}

fn normalize_stream(stream: HelixStream) -> Result<StreamRecord, crate::ValidationError> {
    let started_at = stream
        .started_at
        .as_deref()
        .filter(|value| !value.is_empty())
        .and_then(|value| UtcDateTime::parse(value).ok());

    let streamer_name = stream
        .user_name
        .filter(|name| !name.trim().is_empty())
        .or_else(|| Some(stream.user_login.clone()));

    StreamRecord::from_raw(
        Platform::Twitch,
        RawStream {
            native_id: stream.id,
            handle: stream.user_login,
            streamer_name,
            profile_picture_url: None,
            title: stream.title,
            thumbnail_url: stream.thumbnail_url,
            viewer_count: stream.viewer_count,
            started_at,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ClientCredentials, TWITCH_TOKEN_URL};
    use crate::data_source::SourceErrorKind;
    use crate::testutil::{ScriptedHttpClient, TWITCH_GAMES_JSON, TWITCH_STREAMS_JSON, TWITCH_TOKEN_JSON};
    use crate::UNTITLED_STREAM;

    const GAMES: &str = "https://api.twitch.tv/helix/games";
    const STREAMS: &str = "https://api.twitch.tv/helix/streams";

    fn config() -> StreamerConfig {
        StreamerConfig {
            twitch_credentials: Some(ClientCredentials::new("cid", "secret")),
            ..StreamerConfig::default()
        }
    }

    fn happy_client() -> ScriptedHttpClient {
        ScriptedHttpClient::new()
            .respond(TWITCH_TOKEN_URL, 200, TWITCH_TOKEN_JSON)
            .respond(GAMES, 200, TWITCH_GAMES_JSON)
            .respond(STREAMS, 200, TWITCH_STREAMS_JSON)
    }

    #[tokio::test]
    async fn maps_live_streams_and_drops_reruns() {
        let client = Arc::new(happy_client());
        let adapter = TwitchAdapter::new(client.clone(), &config());

        let batch = adapter.fetch_live().await.expect("twitch should answer");
        let ids = batch.streams.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["twitch-111", "twitch-222"]);

        let first = &batch.streams[0];
        assert_eq!(first.streamer_name, "StepFighter");
        assert_eq!(first.stream_url, "https://twitch.tv/stepfighter");
        assert_eq!(
            first.thumbnail_url,
            "https://static-cdn.jtvnw.net/previews-ttv/live_user_stepfighter-640x360.jpg"
        );
        assert_eq!(first.viewer_count, 42);
        assert_eq!(
            first.started_at.map(UtcDateTime::format_rfc3339).as_deref(),
            Some("2024-05-01T18:00:00Z")
        );
        assert_eq!(batch.streams[1].title, UNTITLED_STREAM);
    }

    #[tokio::test]
    async fn sends_client_id_and_bearer_headers() {
        let client = Arc::new(happy_client());
        TwitchAdapter::new(client.clone(), &config())
            .fetch_live()
            .await
            .expect("ok");

        let streams_request = client
            .requests()
            .into_iter()
            .find(|request| request.url.starts_with(STREAMS))
            .expect("streams request");
        assert_eq!(
            streams_request.url,
            "https://api.twitch.tv/helix/streams?game_id=497385&first=20"
        );
        assert_eq!(streams_request.headers.get("client-id").map(String::as_str), Some("cid"));
        assert_eq!(
            streams_request.headers.get("authorization").map(String::as_str),
            Some("Bearer tok-1")
        );
    }

    #[tokio::test]
    async fn configured_game_id_skips_lookup() {
        let client = Arc::new(happy_client());
        let config = StreamerConfig {
            twitch_game_id: Some(String::from("497385")),
            ..config()
        };
        TwitchAdapter::new(client.clone(), &config)
            .fetch_live()
            .await
            .expect("ok");
        assert_eq!(client.count(GAMES), 0);
    }

    #[tokio::test]
    async fn unknown_game_yields_empty_batch() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .respond(TWITCH_TOKEN_URL, 200, TWITCH_TOKEN_JSON)
                .respond(GAMES, 200, r#"{"data":[]}"#),
        );
        let batch = TwitchAdapter::new(client.clone(), &config())
            .fetch_live()
            .await
            .expect("empty is fine");
        assert!(batch.streams.is_empty());
        assert_eq!(client.count(STREAMS), 0);
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_network() {
        let client = Arc::new(ScriptedHttpClient::new());
        let adapter = TwitchAdapter::new(client.clone(), &StreamerConfig::default());

        assert_eq!(adapter.status(), SourceStatus::MissingCredentials);
        let error = adapter.fetch_live().await.expect_err("no credentials");
        assert_eq!(error.kind(), SourceErrorKind::Credentials);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn token_failure_is_a_credentials_error() {
        let client = Arc::new(ScriptedHttpClient::new().respond(TWITCH_TOKEN_URL, 401, "{}"));
        let error = TwitchAdapter::new(client, &config())
            .fetch_live()
            .await
            .expect_err("token rejected");
        assert_eq!(error.kind(), SourceErrorKind::Credentials);
    }

    #[tokio::test]
    async fn unreadable_entry_is_skipped_without_failing_batch() {
        let body = r#"{"data":[
            {"id":"1","user_login":null,"type":"live","thumbnail_url":"https://t/a.jpg"},
            {"id":"2","user_login":"ok","type":"live","thumbnail_url":null},
            {"id":"3","user_login":"steady","user_name":"Steady","type":"live",
             "title":"Ranked","viewer_count":7,"thumbnail_url":"https://t/c.jpg"}
        ]}"#;
        let client = Arc::new(
            ScriptedHttpClient::new()
                .respond(TWITCH_TOKEN_URL, 200, TWITCH_TOKEN_JSON)
                .respond(GAMES, 200, TWITCH_GAMES_JSON)
                .respond(STREAMS, 200, body),
        );

        let batch = TwitchAdapter::new(client, &config())
            .fetch_live()
            .await
            .expect("batch survives bad entries");
        let ids = batch.streams.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["twitch-3"]);
        assert_eq!(batch.streams[0].viewer_count, 7);
    }

    #[tokio::test]
    async fn missing_data_array_is_malformed() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .respond(TWITCH_TOKEN_URL, 200, TWITCH_TOKEN_JSON)
                .respond(GAMES, 200, TWITCH_GAMES_JSON)
                .respond(STREAMS, 200, r#"{"error":"nope"}"#),
        );
        let error = TwitchAdapter::new(client, &config())
            .fetch_live()
            .await
            .expect_err("malformed");
        assert_eq!(error.kind(), SourceErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn non_success_status_is_unavailable() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .respond(TWITCH_TOKEN_URL, 200, TWITCH_TOKEN_JSON)
                .respond(GAMES, 503, ""),
        );
        let error = TwitchAdapter::new(client, &config())
            .fetch_live()
            .await
            .expect_err("unavailable");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    }
}
