#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use combinestreamer_core::adapters::TWITCH_API_BASE;
use combinestreamer_core::{
    ClientCredentials, HttpClient, InvidiousAdapter, KickAdapter, NoopHttpClient, Platform,
    SourceStatus, StreamSource, StreamerConfig, TwitchAdapter,
};

use support::{FakeHttpClient, GAMES_JSON, SEARCH_JSON, STREAMS_JSON, TOKEN_JSON, TOKEN_URL};

struct AdapterCase {
    platform: Platform,
    source: Arc<dyn StreamSource>,
}

fn healthy_http(config: &StreamerConfig) -> Arc<dyn HttpClient> {
    Arc::new(
        FakeHttpClient::new()
            .route(TOKEN_URL, 200, TOKEN_JSON)
            .route(&format!("{TWITCH_API_BASE}/games"), 200, GAMES_JSON)
            .route(&format!("{TWITCH_API_BASE}/streams"), 200, STREAMS_JSON)
            .route(config.invidious_instances[0].base_url(), 200, SEARCH_JSON),
    )
}

fn adapter_cases(http: Arc<dyn HttpClient>, config: &StreamerConfig) -> Vec<AdapterCase> {
    vec![
        AdapterCase {
            platform: Platform::Youtube,
            source: Arc::new(InvidiousAdapter::new(http.clone(), config)),
        },
        AdapterCase {
            platform: Platform::Twitch,
            source: Arc::new(TwitchAdapter::new(http, config)),
        },
        AdapterCase {
            platform: Platform::Kick,
            source: Arc::new(KickAdapter),
        },
    ]
}

fn configured() -> StreamerConfig {
    let mut config = StreamerConfig::default();
    config.twitch_credentials = Some(ClientCredentials::new("client-id", "client-secret"));
    config
}

#[tokio::test]
async fn every_record_is_a_live_normalised_stream_of_its_platform() {
    let config = configured();
    for case in adapter_cases(healthy_http(&config), &config) {
        assert_eq!(case.source.platform(), case.platform);

        let batch = case
            .source
            .fetch_live()
            .await
            .unwrap_or_else(|error| panic!("{} fetch failed: {error}", case.platform));

        for stream in &batch.streams {
            let prefix = format!("{}-", case.platform.as_str());
            assert!(stream.id.starts_with(&prefix), "{}: id {}", case.platform, stream.id);
            assert_eq!(stream.platform, case.platform);
            assert!(stream.is_live, "{}: non-live record", case.platform);
            assert!(!stream.title.is_empty(), "{}: empty title", case.platform);
            assert!(!stream.streamer_name.is_empty(), "{}: empty name", case.platform);
            assert!(stream.thumbnail_url.starts_with("https://"), "{}: thumbnail", case.platform);
            assert!(stream.stream_url.starts_with("https://"), "{}: stream url", case.platform);
            assert!(!stream.thumbnail_url.contains("{width}"), "{}: unresolved template", case.platform);
        }
    }
}

#[tokio::test]
async fn enabled_adapters_return_their_fixture_streams() {
    let config = configured();
    for case in adapter_cases(healthy_http(&config), &config) {
        let batch = case.source.fetch_live().await.expect("healthy fetch");
        let expected = match case.platform {
            Platform::Youtube => 1,
            Platform::Twitch => 2,
            Platform::Kick => 0,
        };
        assert_eq!(batch.streams.len(), expected, "{}", case.platform);
    }
}

#[tokio::test]
async fn fetch_streams_never_fails_even_offline() {
    let config = StreamerConfig::default();
    for case in adapter_cases(Arc::new(NoopHttpClient), &config) {
        let streams = case.source.fetch_streams().await;
        assert!(streams.is_empty(), "{}: offline fetch returned data", case.platform);
    }
}

#[tokio::test]
async fn failures_surface_as_structured_errors() {
    let config = configured();
    let http: Arc<dyn HttpClient> = Arc::new(FakeHttpClient::new());
    for case in adapter_cases(http, &config) {
        match case.source.fetch_live().await {
            Ok(batch) => {
                assert_eq!(case.platform, Platform::Kick, "only the placeholder succeeds");
                assert!(batch.streams.is_empty());
            }
            Err(error) => {
                assert!(error.code().starts_with("source."), "{}: {}", case.platform, error.code());
                assert!(!error.message().is_empty());
            }
        }
    }
}

#[test]
fn status_reflects_configuration() {
    let http: Arc<dyn HttpClient> = Arc::new(NoopHttpClient);
    let bare = StreamerConfig::default();
    let statuses = adapter_cases(http.clone(), &bare)
        .into_iter()
        .map(|case| case.source.status())
        .collect::<Vec<_>>();
    assert_eq!(
        statuses,
        vec![SourceStatus::Enabled, SourceStatus::MissingCredentials, SourceStatus::Disabled]
    );

    let twitch = TwitchAdapter::new(http, &configured());
    assert_eq!(twitch.status(), SourceStatus::Enabled);
}
