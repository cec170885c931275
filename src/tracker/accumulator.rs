use chrono::{NaiveDateTime, Timelike};
use tracing::trace;

use crate::utils::time::day_key;

use super::storage::entities::SessionStore;

/// Flushes are due every time the current day's total reaches a multiple of this. The cadence
/// follows focused seconds, so it pauses while the window is unfocused.
pub const DEFAULT_FLUSH_EVERY_SECONDS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The window isn't focused, nothing was counted.
    Inactive,
    Counted { flush_due: bool },
}

impl TickOutcome {
    pub fn flush_due(&self) -> bool {
        matches!(self, TickOutcome::Counted { flush_due: true })
    }
}

/// Owns the [SessionStore] and the focus flag. Only the tracker task holds one, so all mutation
/// happens in a single place.
#[derive(Debug)]
pub struct SessionAccumulator {
    store: SessionStore,
    active: bool,
    flush_every: u64,
}

impl SessionAccumulator {
    pub fn new(store: SessionStore, active: bool) -> Self {
        Self {
            store,
            active,
            flush_every: DEFAULT_FLUSH_EVERY_SECONDS,
        }
    }

    /// Changes the flush cadence. Zero is treated as a flush on every counted second.
    pub fn with_flush_every(self, seconds: u64) -> Self {
        Self {
            flush_every: seconds.max(1),
            ..self
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Counts one second at `now` (local wall-clock time) if the window is focused.
    pub fn tick(&mut self, now: NaiveDateTime) -> TickOutcome {
        if !self.active {
            return TickOutcome::Inactive;
        }

        let key = day_key(now.date());
        let record = self.store.day_mut(&key);
        record.add_second(now.hour() as usize);
        trace!("Counted second for {key}, total {}", record.total_seconds);

        TickOutcome::Counted {
            flush_due: record.total_seconds % self.flush_every == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

    use crate::tracker::storage::entities::SessionStore;

    use super::{SessionAccumulator, TickOutcome};

    fn monday_10am() -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_fixed_time_ticks_flush_twice() {
        let mut accumulator = SessionAccumulator::new(SessionStore::new(), true);

        let flushes = (1..=125)
            .filter_map(|tick| accumulator.tick(monday_10am()).flush_due().then_some(tick))
            .collect::<Vec<_>>();

        assert_eq!(flushes, vec![60, 120]);
        let record = accumulator.store().get("2024-03-04").unwrap();
        assert_eq!(record.total_seconds, 125);
        for (hour, seconds) in record.hourly_data.iter().enumerate() {
            assert_eq!(*seconds, if hour == 10 { 125 } else { 0 });
        }
    }

    #[test]
    fn test_custom_flush_cadence() {
        let mut accumulator =
            SessionAccumulator::new(SessionStore::new(), true).with_flush_every(10);

        let flushes = (1..=35)
            .filter_map(|tick| accumulator.tick(monday_10am()).flush_due().then_some(tick))
            .collect::<Vec<_>>();

        assert_eq!(flushes, vec![10, 20, 30]);
    }

    #[test]
    fn test_zero_flush_cadence_flushes_every_second() {
        let mut accumulator =
            SessionAccumulator::new(SessionStore::new(), true).with_flush_every(0);

        assert!(accumulator.tick(monday_10am()).flush_due());
        assert!(accumulator.tick(monday_10am()).flush_due());
    }

    #[test]
    fn test_total_matches_buckets_after_every_tick() {
        let mut accumulator = SessionAccumulator::new(SessionStore::new(), true);
        let start = monday_10am() - Duration::minutes(3);

        // Crosses an hour boundary and midnight of the next day.
        for step in 0..(3600 * 14) {
            let now = start + Duration::seconds(step * 7);
            accumulator.tick(now);
            let record = accumulator.store().get(&now.date().to_string()).unwrap();
            assert!(record.is_consistent());
        }
        assert!(accumulator.store().len() > 1);
    }

    #[test]
    fn test_inactive_tick_is_noop() {
        let mut accumulator = SessionAccumulator::new(SessionStore::new(), true);
        accumulator.tick(monday_10am());
        accumulator.set_active(false);
        let before = accumulator.store().clone();

        for offset in 0..200 {
            let outcome = accumulator.tick(monday_10am() + Duration::hours(offset));
            assert_eq!(outcome, TickOutcome::Inactive);
        }

        assert_eq!(accumulator.store(), &before);
    }

    #[test]
    fn test_flush_cadence_pauses_while_unfocused() {
        let mut accumulator = SessionAccumulator::new(SessionStore::new(), true);
        for _ in 0..59 {
            assert!(!accumulator.tick(monday_10am()).flush_due());
        }
        accumulator.set_active(false);
        for _ in 0..30 {
            assert!(!accumulator.tick(monday_10am()).flush_due());
        }
        accumulator.set_active(true);

        assert!(accumulator.tick(monday_10am()).flush_due());
    }

    #[test]
    fn test_hour_bucket_uses_local_hour() {
        let mut accumulator = SessionAccumulator::new(SessionStore::new(), true);
        let late = NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
        );
        accumulator.tick(late);
        accumulator.tick(late + Duration::seconds(1));

        assert_eq!(accumulator.store().get("2024-03-04").unwrap().hourly_data[23], 1);
        assert_eq!(accumulator.store().get("2024-03-05").unwrap().hourly_data[0], 1);
    }
}
