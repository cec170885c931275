//! Read-only projections over the [SessionStore] consumed by the chart views.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::utils::time::{day_key, week_start};

use super::storage::entities::{SessionStore, HOURS_IN_DAY};

/// Monday first. The chart front end relies on this exact order.
pub const WEEKDAY_LABELS: [&str; 7] = ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyView {
    pub days: Vec<String>,
    /// Focused minutes per day, positionally paired with `days`.
    pub values: Vec<u64>,
    /// Day-keys of the week, used for requesting a day's [HourlyView].
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyView {
    pub hours: Vec<String>,
    pub values: Vec<u64>,
}

/// Whole minutes with half a minute rounding up.
pub fn seconds_to_minutes(seconds: u64) -> u64 {
    (seconds + 30) / 60
}

/// Totals for the calendar week (Monday to Sunday) containing `today`.
pub fn current_week(store: &SessionStore, today: NaiveDate) -> WeeklyView {
    let monday = week_start(today);
    let dates = (0..WEEKDAY_LABELS.len() as i64)
        .map(|offset| day_key(monday + Duration::days(offset)))
        .collect::<Vec<_>>();

    let values = dates
        .iter()
        .map(|key| store.get(key).map_or(0, |record| record.total_seconds))
        .map(seconds_to_minutes)
        .collect();

    WeeklyView {
        days: WEEKDAY_LABELS.iter().map(|v| v.to_string()).collect(),
        values,
        dates,
    }
}

/// Per hour minutes for `day_key`. Unknown days produce zeros.
pub fn hourly_breakdown(store: &SessionStore, day_key: &str) -> HourlyView {
    let values = match store.get(day_key) {
        Some(record) => record
            .hourly_data
            .iter()
            .copied()
            .map(seconds_to_minutes)
            .collect(),
        None => vec![0; HOURS_IN_DAY],
    };

    HourlyView {
        hours: (0..HOURS_IN_DAY).map(|hour| format!("{hour}h")).collect(),
        values,
    }
}
