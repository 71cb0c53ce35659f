use serde::Serialize;

use combinestreamer_core::{Platform, StreamSource, YoutubeQuery};

use crate::cli::SourcesArgs;

use super::Context;

/// One registered adapter as shown by `sources`.
#[derive(Debug, Serialize)]
pub struct SourceRow {
    pub platform: Platform,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detail: Vec<String>,
}

pub fn run(args: &SourcesArgs, context: &Context) -> Vec<SourceRow> {
    context
        .aggregator
        .sources()
        .iter()
        .map(|source| SourceRow {
            platform: source.platform(),
            status: source.status().as_str(),
            detail: if args.verbose {
                detail(source.as_ref(), context)
            } else {
                Vec::new()
            },
        })
        .collect()
}

fn detail(source: &dyn StreamSource, context: &Context) -> Vec<String> {
    let config = &context.config;
    match source.platform() {
        Platform::Youtube => {
            let mut detail = vec![match YoutubeQuery::from_config(config) {
                YoutubeQuery::Search(query) => format!("search \"{query}\""),
                YoutubeQuery::Channel(channel_id) => format!("channel {channel_id}"),
            }];
            detail.extend(
                config
                    .invidious_instances
                    .iter()
                    .map(|instance| instance.base_url().to_owned()),
            );
            detail
        }
        Platform::Twitch => vec![match &config.twitch_game_id {
            Some(game_id) => format!("game id {game_id}"),
            None => format!("game \"{}\"", config.game_title),
        }],
        Platform::Kick => Vec::new(),
    }
}
