use anyhow::Result;
use module::SnapshotProcessor;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info};

use super::storage::entities::SessionStore;

pub mod local_save;
pub mod module;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// Another minute of focused time was accumulated.
    Periodic,
    Shutdown,
}

/// A full copy of the store taken by the tracker at the moment a flush was due.
#[derive(Debug, Clone)]
pub struct FlushRequest {
    pub store: SessionStore,
    pub reason: FlushReason,
}

/// Receives snapshots and hands them to the processor one at a time. Being the only consumer of
/// the channel it guarantees that writes never interleave: a request arriving during a write waits
/// in the queue.
pub struct FlushModule<Processor> {
    receiver: Receiver<FlushRequest>,
    processor: Processor,
}

impl<P: SnapshotProcessor> FlushModule<P> {
    pub fn new(receiver: Receiver<FlushRequest>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    /// Runs until every sender is dropped and the queue is drained.
    pub async fn run(mut self) -> Result<()> {
        while let Some(request) = self.receiver.recv().await {
            let reason = request.reason;
            debug!("Flushing {} days ({reason:?})", request.store.len());
            match self.processor.process_next(request).await {
                Ok(_) => {
                    info!("Flushed session store ({reason:?})")
                }
                Err(e) => {
                    error!("Error flushing session store ({reason:?}): {e:?}")
                }
            }
        }

        let result = self.processor.finalize().await;
        self.receiver.close();
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};
    use tokio::sync::mpsc;

    use crate::tracker::storage::entities::SessionStore;

    use super::{module::SnapshotProcessor, FlushModule, FlushReason, FlushRequest};

    #[derive(Default, Clone)]
    struct RecordingProcessor {
        seen: Arc<Mutex<Vec<(FlushReason, u64)>>>,
        finalized: Arc<Mutex<bool>>,
    }

    impl SnapshotProcessor for RecordingProcessor {
        async fn process_next(&mut self, request: FlushRequest) -> Result<()> {
            let total = request
                .store
                .get("2024-03-04")
                .map_or(0, |v| v.total_seconds);
            self.seen.lock().unwrap().push((request.reason, total));
            if total == 2 {
                return Err(anyhow!("disk full"));
            }
            Ok(())
        }

        async fn finalize(&mut self) -> Result<()> {
            *self.finalized.lock().unwrap() = true;
            Ok(())
        }
    }

    fn snapshot(seconds: u64, reason: FlushReason) -> FlushRequest {
        let mut store = SessionStore::new();
        for _ in 0..seconds {
            store.day_mut("2024-03-04").add_second(0);
        }
        FlushRequest { store, reason }
    }

    #[tokio::test]
    async fn test_requests_processed_in_order_despite_failures() -> Result<()> {
        let processor = RecordingProcessor::default();
        let (sender, receiver) = mpsc::channel(4);
        let module = FlushModule::new(receiver, processor.clone());

        let (_, result) = tokio::join!(
            async move {
                sender.send(snapshot(1, FlushReason::Periodic)).await.unwrap();
                sender.send(snapshot(2, FlushReason::Periodic)).await.unwrap();
                sender.send(snapshot(3, FlushReason::Shutdown)).await.unwrap();
            },
            module.run(),
        );
        result?;

        assert_eq!(
            *processor.seen.lock().unwrap(),
            vec![
                (FlushReason::Periodic, 1),
                (FlushReason::Periodic, 2),
                (FlushReason::Shutdown, 3)
            ]
        );
        assert!(*processor.finalized.lock().unwrap());
        Ok(())
    }
}
