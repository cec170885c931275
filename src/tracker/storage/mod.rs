//! Storage is organized through [session_storage::JsonFileStorage].
//! The basic idea is:
//!  - The whole [entities::SessionStore] is a single JSON object keyed by day.
//!  - Every save rewrites the file, there is no journal or append log.
//!  - Loading never fails, broken data is dropped with a warning.

pub mod entities;
pub mod session_storage;
