use std::collections::{hash_map, HashMap};

use serde::{Deserialize, Serialize};

pub const HOURS_IN_DAY: usize = 24;

/// Focused time accumulated during one calendar day. Stored on disk as
/// `{ "totalSeconds": .., "hourlyData": [24 integers] }`.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub total_seconds: u64,
    /// Seconds per local hour of the day, index is the hour.
    pub hourly_data: [u64; HOURS_IN_DAY],
}

impl DailyRecord {
    /// Counts one focused second in `hour`. Total and bucket always move together.
    pub fn add_second(&mut self, hour: usize) {
        self.total_seconds += 1;
        self.hourly_data[hour] += 1;
    }

    pub fn is_consistent(&self) -> bool {
        self.total_seconds == self.hourly_data.iter().sum::<u64>()
    }
}

/// Every tracked day keyed by its `YYYY-MM-DD` day-key. Days are never removed.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(transparent)]
pub struct SessionStore {
    days: HashMap<String, DailyRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day_key: &str) -> Option<&DailyRecord> {
        self.days.get(day_key)
    }

    /// Returns the record for `day_key`, inserting an empty one if the day is new.
    pub fn day_mut(&mut self, day_key: &str) -> &mut DailyRecord {
        match self.days.entry(day_key.to_owned()) {
            hash_map::Entry::Occupied(entry) => entry.into_mut(),
            hash_map::Entry::Vacant(entry) => entry.insert(DailyRecord::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DailyRecord)> {
        self.days.iter().map(|(key, record)| (key.as_str(), record))
    }
}

impl FromIterator<(String, DailyRecord)> for SessionStore {
    fn from_iter<T: IntoIterator<Item = (String, DailyRecord)>>(iter: T) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}
