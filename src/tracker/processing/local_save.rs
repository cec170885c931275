use anyhow::Result;
use tracing::warn;

use crate::tracker::storage::session_storage::SessionStorage;

use super::{module::SnapshotProcessor, FlushReason, FlushRequest};

/// Bridges [FlushModule](super::FlushModule) and [SessionStorage]. A failed save isn't retried,
/// the next snapshot supersedes it.
pub struct LocalSaver<S: SessionStorage> {
    storage: S,
    failed_saves: usize,
    last_saved_shutdown: bool,
}

impl<S: SessionStorage> LocalSaver<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            failed_saves: 0,
            last_saved_shutdown: false,
        }
    }
}

impl<S: SessionStorage> SnapshotProcessor for LocalSaver<S> {
    async fn process_next(&mut self, request: FlushRequest) -> Result<()> {
        match self.storage.save(&request.store).await {
            Ok(()) => {
                self.last_saved_shutdown = request.reason == FlushReason::Shutdown;
                Ok(())
            }
            Err(e) => {
                self.failed_saves += 1;
                self.last_saved_shutdown = false;
                Err(e.into())
            }
        }
    }

    async fn finalize(&mut self) -> Result<()> {
        if self.failed_saves > 0 {
            warn!("{} saves failed during this session", self.failed_saves);
        }
        if !self.last_saved_shutdown {
            warn!("Final state wasn't saved, data since the last successful save is lost");
        }
        Ok(())
    }
}
