//! Sidecar for editor add-ons that tracks how long the editor window stays focused.
//! Focused seconds are bucketed by local day and hour, saved into a single JSON file and served
//! back as weekly and hourly views for charts.
//!

pub mod cli;
pub mod host;
pub mod tracker;
pub mod utils;
