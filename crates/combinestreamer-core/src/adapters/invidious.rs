use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::StreamerConfig;
use crate::data_source::{SourceError, StreamBatch, StreamSource};
use crate::fallback::{first_success, InstanceEndpoint};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{Platform, RawStream, StreamRecord, UtcDateTime};

/// Some instances refuse requests without a browser user agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// What to ask each Invidious instance for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YoutubeQuery {
    /// Live video search; the instance answers with a JSON array.
    Search(String),
    /// A channel's streams tab; the instance answers with `{"videos": [...]}`.
    Channel(String),
}

impl YoutubeQuery {
    pub fn from_config(config: &StreamerConfig) -> Self {
        match &config.youtube_channel_id {
            Some(channel_id) => Self::Channel(channel_id.clone()),
            None => Self::Search(config.search_query.clone()),
        }
    }

    fn path(&self) -> String {
        match self {
            Self::Search(query) => format!(
                "/api/v1/search?q={}&type=video&features=live",
                urlencoding::encode(query)
            ),
            Self::Channel(channel_id) => {
                format!("/api/v1/channels/{}/streams", urlencoding::encode(channel_id))
            }
        }
    }

    /// Pulls the video list out of a response body, or `None` if the body
    /// has the wrong shape for this query.
    fn extract_videos(&self, body: Value) -> Option<Vec<Value>> {
        match (self, body) {
            (Self::Search(_), Value::Array(videos)) => Some(videos),
            (Self::Channel(_), Value::Object(mut object)) => match object.remove("videos") {
                Some(Value::Array(videos)) => Some(videos),
                _ => None,
            },
            _ => None,
        }
    }
}

/// YouTube live streams read through public Invidious mirrors.
///
/// Instances are tried in configured order; the first one that returns a
/// well-formed list wins, even if that list holds no live videos.
#[derive(Clone)]
pub struct InvidiousAdapter {
    http_client: Arc<dyn HttpClient>,
    instances: Vec<InstanceEndpoint>,
    query: YoutubeQuery,
    timeout_ms: u64,
}

impl InvidiousAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &StreamerConfig) -> Self {
        Self {
            http_client,
            instances: config.invidious_instances.clone(),
            query: YoutubeQuery::from_config(config),
            timeout_ms: config.timeout_ms,
        }
    }

    pub fn instances(&self) -> &[InstanceEndpoint] {
        &self.instances
    }

    pub fn query(&self) -> &YoutubeQuery {
        &self.query
    }

    async fn fetch_instance(&self, instance: InstanceEndpoint) -> Result<Vec<StreamRecord>, SourceError> {
        let request = HttpRequest::get(instance.url(&self.query.path()))
            .with_header("Accept", "application/json")
            .with_header("User-Agent", BROWSER_USER_AGENT)
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| SourceError::from_transport(Platform::Youtube, &error))?;

        if !response.is_success() {
            return Err(SourceError::from_status(
                Platform::Youtube,
                &format!("instance {instance}"),
                response.status,
            ));
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|error| {
            SourceError::malformed(format!("instance {instance} returned invalid json: {error}"))
        })?;
        let videos = self.query.extract_videos(body).ok_or_else(|| {
            SourceError::malformed(format!("instance {instance} returned invalid data"))
        })?;

        Ok(videos
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<InvidiousVideo>(value) {
                Ok(video) => Some(video),
                Err(error) => {
                    debug!(%error, "skipping unreadable video entry");
                    None
                }
            })
            .filter(InvidiousVideo::is_live)
            .filter_map(|video| match normalize_video(video) {
                Ok(record) => Some(record),
                Err(error) => {
                    debug!(%error, "skipping video");
                    None
                }
            })
            .collect())
    }
}

impl StreamSource for InvidiousAdapter {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    fn fetch_live<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<StreamBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let success =
                first_success(&self.instances, |instance| self.fetch_instance(instance)).await?;

            info!(
                count = success.value.len(),
                instance = %success.endpoint,
                "found youtube streams"
            );
            Ok(StreamBatch::new(success.value).served_by(success.endpoint.base_url()))
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InvidiousVideo {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    video_id: Option<String>,
    author: Option<String>,
    author_id: Option<String>,
    video_thumbnails: Vec<VideoThumbnail>,
    author_thumbnails: Vec<AuthorThumbnail>,
    view_count: Option<i64>,
    live_viewers: Option<i64>,
    published: Option<i64>,
    live_now: Option<bool>,
}

impl InvidiousVideo {
    fn is_live(&self) -> bool {
        self.live_now == Some(true) || self.kind.as_deref() == Some("live")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VideoThumbnail {
    quality: String,
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthorThumbnail {
    url: String,
    width: u32,
}

fn normalize_video(video: InvidiousVideo) -> Result<StreamRecord, crate::ValidationError> {
    let video_id = video.video_id.unwrap_or_default();

    let thumbnail_url = video
        .video_thumbnails
        .iter()
        .filter(|thumb| !thumb.url.is_empty())
        .find(|thumb| thumb.quality == "high")
        .or_else(|| video.video_thumbnails.iter().find(|thumb| !thumb.url.is_empty()))
        .map(|thumb| thumb.url.clone())
        .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg"));

    let profile_picture_url = video
        .author_thumbnails
        .iter()
        .filter(|thumb| !thumb.url.is_empty())
        .max_by_key(|thumb| thumb.width)
        .map(|thumb| thumb.url.clone());

    let streamer_name = video
        .author
        .filter(|author| !author.trim().is_empty())
        .or(video.author_id);

    let started_at = video
        .published
        .and_then(|seconds| UtcDateTime::from_unix_seconds(seconds).ok());

    StreamRecord::from_raw(
        Platform::Youtube,
        RawStream {
            native_id: video_id.clone(),
            handle: video_id,
            streamer_name,
            profile_picture_url,
            title: video.title,
            thumbnail_url,
            viewer_count: video.view_count.filter(|count| *count > 0).or(video.live_viewers),
            started_at,
        },
    )
}
