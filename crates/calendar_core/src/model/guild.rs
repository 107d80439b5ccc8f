//! Per-guild calendar aggregate.
//!
//! # Responsibility
//! - Bundle the current date, the event store and the last posted artifact
//!   for one tenant.
//!
//! # Invariants
//! - A record is exclusively owned by its guild; nothing is shared across
//!   guilds.
//! - `last_artifact_ref` points at the most recent successful post, or is
//!   `None` before the first one.

use crate::model::calendar::CalendarDate;
use crate::model::event_store::EventStore;
use std::fmt::{Display, Formatter};

/// Chat-platform tenant identifier.
pub type GuildId = u64;

/// Year of the date a new guild starts on.
pub const DEFAULT_YEAR: i64 = 1784;
/// Month of the date a new guild starts on.
pub const DEFAULT_MONTH: u32 = 2;
/// Day of the date a new guild starts on.
pub const DEFAULT_DAY: u32 = 11;

/// Opaque reference to a published calendar image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ArtifactRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildCalendarState {
    pub current: CalendarDate,
    pub events: EventStore,
    pub last_artifact_ref: Option<ArtifactRef>,
}

impl GuildCalendarState {
    /// Creates the record a guild gets on first contact.
    pub fn new_default() -> Self {
        Self {
            current: default_date(),
            events: EventStore::new(),
            last_artifact_ref: None,
        }
    }
}

impl Default for GuildCalendarState {
    fn default() -> Self {
        Self::new_default()
    }
}

/// Start date for newly observed guilds.
pub fn default_date() -> CalendarDate {
    match CalendarDate::new(DEFAULT_YEAR, DEFAULT_MONTH, DEFAULT_DAY) {
        Ok(date) => date,
        Err(_) => unreachable!("default date constants are within calendar bounds"),
    }
}
