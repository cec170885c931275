use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use tokio::time::Instant;

/// Represents an entity responsible for providing time across the application. Wall-clock time
/// is used for bucketing, instants drive the tick schedule. Both can be replaced in tests.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Current time on the host's local calendar. Day-keys and hour buckets are derived from it.
    fn local_time(&self) -> NaiveDateTime;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn local_time(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
