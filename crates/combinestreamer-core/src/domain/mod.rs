//! # Domain Models
//!
//! The normalised stream record every adapter produces, plus the helpers used
//! to build it from provider payloads.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StreamRecord`] | One live stream, identical shape for every platform |
//! | [`RawStream`] | Adapter-extracted fields prior to normalisation |
//! | [`UtcDateTime`] | UTC timestamp, serialised as RFC3339 |
//!
//! Normalisation is the only place defaults are applied, so every platform
//! gets the same placeholder title and viewer-count fallback.

mod models;
mod thumbnail;
mod timestamp;

pub use models::{RawStream, StreamRecord, UNKNOWN_STREAMER, UNTITLED_STREAM};
pub use thumbnail::{resolve_thumbnail_url, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};
pub use timestamp::UtcDateTime;
