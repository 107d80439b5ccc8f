//! Per-guild event store keyed by calendar date.
//!
//! # Responsibility
//! - Keep free-text event entries grouped by exact date.
//! - Provide the date, month and full-listing projections used by commands.
//!
//! # Invariants
//! - Entries for one date keep insertion order.
//! - A date key never maps to an empty list; removing the last entry drops
//!   the key.
//! - Iteration is chronological because `EventKey` orders by year, month, day.

use crate::model::calendar::{CalendarDate, DAYS_PER_MONTH};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Mapping key into the store. Structural equality on `(year, month, day)`.
pub type EventKey = CalendarDate;

/// Free-text event description. No validation or length cap.
pub type EventEntry = String;

/// Event store error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventStoreError {
    /// Removal targeted an entry that does not exist.
    IndexOutOfRange {
        key: EventKey,
        index: usize,
        len: usize,
    },
}

impl Display for EventStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { key, index, len } => write!(
                f,
                "event index {index} out of range for {key} ({len} events)"
            ),
        }
    }
}

impl Error for EventStoreError {}

/// Events stored on one day of a month listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayEvents<'a> {
    pub day: u32,
    pub entries: &'a [EventEntry],
}

/// All non-empty days of one `(year, month)` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthEvents<'a> {
    pub year: i64,
    pub month: u32,
    pub days: Vec<DayEvents<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStore {
    by_date: BTreeMap<EventKey, Vec<EventEntry>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` after any existing entries for `key`.
    pub fn add(&mut self, key: EventKey, entry: impl Into<EventEntry>) {
        self.by_date.entry(key).or_default().push(entry.into());
    }

    /// Removes and returns the entry at `index` (0-based) for `key`.
    ///
    /// # Errors
    /// - `IndexOutOfRange` when `key` is absent or `index >= len`; the store
    ///   is left unchanged.
    pub fn remove(&mut self, key: EventKey, index: usize) -> Result<EventEntry, EventStoreError> {
        let Some(entries) = self.by_date.get_mut(&key) else {
            return Err(EventStoreError::IndexOutOfRange { key, index, len: 0 });
        };
        if index >= entries.len() {
            return Err(EventStoreError::IndexOutOfRange {
                key,
                index,
                len: entries.len(),
            });
        }

        let removed = entries.remove(index);
        if entries.is_empty() {
            self.by_date.remove(&key);
        }
        Ok(removed)
    }

    /// All entries for one exact date, in insertion order.
    pub fn list_for_date(&self, key: &EventKey) -> &[EventEntry] {
        self.by_date.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty days of `year`/`month` in ascending day order.
    ///
    /// An out-of-range `month` yields an empty listing.
    pub fn list_for_month(&self, year: i64, month: u32) -> Vec<DayEvents<'_>> {
        (1..=DAYS_PER_MONTH)
            .filter_map(|day| {
                let key = CalendarDate::new(year, month, day).ok()?;
                let entries = self.by_date.get(&key)?;
                Some(DayEvents {
                    day,
                    entries: entries.as_slice(),
                })
            })
            .collect()
    }

    /// Every stored event grouped by `(year, month)` ascending, then by day.
    pub fn list_all(&self) -> Vec<MonthEvents<'_>> {
        let mut groups: Vec<MonthEvents<'_>> = Vec::new();
        for (key, entries) in &self.by_date {
            let day = DayEvents {
                day: key.day(),
                entries: entries.as_slice(),
            };
            match groups.last_mut() {
                Some(group) if group.year == key.year() && group.month == key.month() => {
                    group.days.push(day);
                }
                _ => groups.push(MonthEvents {
                    year: key.year(),
                    month: key.month(),
                    days: vec![day],
                }),
            }
        }
        groups
    }

    /// Iterates `(date, entries)` pairs chronologically.
    pub fn iter(&self) -> impl Iterator<Item = (&EventKey, &[EventEntry])> {
        self.by_date
            .iter()
            .map(|(key, entries)| (key, entries.as_slice()))
    }

    /// Number of dates carrying at least one entry.
    pub fn date_count(&self) -> usize {
        self.by_date.len()
    }

    /// Total number of entries across all dates.
    pub fn entry_count(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
