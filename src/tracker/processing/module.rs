use anyhow::Result;

use super::FlushRequest;

/// Represents a consumer of store snapshots. Local JSON storage is the only one for now, but the
/// pipeline doesn't care where snapshots end up.
pub trait SnapshotProcessor {
    fn process_next(
        &mut self,
        request: FlushRequest,
    ) -> impl std::future::Future<Output = Result<()>>;

    fn finalize(&mut self) -> impl std::future::Future<Output = Result<()>>;
}
