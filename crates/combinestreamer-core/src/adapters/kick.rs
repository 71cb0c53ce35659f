use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::data_source::{SourceError, SourceStatus, StreamBatch, StreamSource};
use crate::Platform;

/// Placeholder for Kick.
///
/// Kick's API sits behind bot protection that rejects server-side requests,
/// so the adapter stays registered (the platform keeps its slot in filters
/// and statistics) but never calls out and always answers with no streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct KickAdapter;

impl StreamSource for KickAdapter {
    fn platform(&self) -> Platform {
        Platform::Kick
    }

    fn status(&self) -> SourceStatus {
        SourceStatus::Disabled
    }

    fn fetch_live<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<StreamBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            debug!("kick adapter is disabled");
            Ok(StreamBatch::new(Vec::new()))
        })
    }
}
