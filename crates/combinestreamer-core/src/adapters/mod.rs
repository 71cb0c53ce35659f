//! Provider adapters, one per platform.

pub mod invidious;
pub mod kick;
pub mod twitch;

pub use invidious::{InvidiousAdapter, YoutubeQuery};
pub use kick::KickAdapter;
pub use twitch::{TwitchAdapter, TWITCH_API_BASE};
