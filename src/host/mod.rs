//! Contains the contract between the tracker and the editor hosting it.
//! The editor add-on spawns the tracker and exchanges one JSON object per line: commands come in
//! through stdin, events go out through stdout. [bridge] moves these lines in and out of the
//! tracker's channels.

pub mod bridge;

use serde::{Deserialize, Serialize};

use crate::tracker::query::{HourlyView, WeeklyView};

/// Messages sent by the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum HostCommand {
    /// The editor window gained or lost focus.
    Focus { focused: bool },
    /// Statistics view was opened.
    GetWeekData,
    /// A day was selected in the statistics view. `date` is a day-key.
    GetDayData { date: String },
    /// The editor is deactivating the add-on.
    Shutdown,
}

/// Messages sent to the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum HostEvent {
    /// Status bar text with the time elapsed since the tracker started.
    Status { text: String },
    WeekData { data: WeeklyView },
    DayData { date: String, data: HourlyView },
}
