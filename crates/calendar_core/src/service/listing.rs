//! Event listing views and removal selection.
//!
//! # Responsibility
//! - Render event store projections into chat message text.
//! - Enumerate removable events as selectable choices and decode a selection.
//!
//! # Invariants
//! - Choice values round-trip through `EventSelection::parse`.
//! - Choice labels never exceed `MAX_CHOICE_LABEL_CHARS` characters.

use crate::model::calendar::{month_name, CalendarDate};
use crate::model::event_store::{DayEvents, EventKey, EventStore};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Selection menus truncate labels to this many characters.
pub const MAX_CHOICE_LABEL_CHARS: usize = 100;
pub const NO_EVENTS_TEXT: &str = "No planned events.";

static SELECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d+)\|(\d+)\|(\d+)\|(\d+)$").expect("valid event selection regex")
});
static MONTH_SCOPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^month:(-?\d+):(\d+)$").expect("valid month scope regex"));

/// Which events `list_events` shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    CurrentMonth,
    NextMonth,
    /// Explicit `(year, month)`.
    Month { year: i64, month: u32 },
}

/// Scope text that matched none of the known forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseScopeError(pub String);

impl Display for ParseScopeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown list scope `{}`; expected all|current|next|month:<year>:<month>",
            self.0
        )
    }
}

impl Error for ParseScopeError {}

impl FromStr for ListScope {
    type Err = ParseScopeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "all" => Ok(Self::All),
            "current" => Ok(Self::CurrentMonth),
            "next" => Ok(Self::NextMonth),
            other => {
                let caps = MONTH_SCOPE_RE
                    .captures(other)
                    .ok_or_else(|| ParseScopeError(value.to_string()))?;
                let year = caps[1]
                    .parse()
                    .map_err(|_| ParseScopeError(value.to_string()))?;
                let month = caps[2]
                    .parse()
                    .map_err(|_| ParseScopeError(value.to_string()))?;
                Ok(Self::Month { year, month })
            }
        }
    }
}

/// One selectable event in the removal menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventChoice {
    pub label: String,
    pub value: String,
}

/// Decoded removal selection: which entry of which date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSelection {
    pub key: EventKey,
    pub index: usize,
}

impl EventSelection {
    pub fn new(key: EventKey, index: usize) -> Self {
        Self { key, index }
    }

    /// Parses a `year|month|day|index` choice value.
    ///
    /// Returns `None` when the text is malformed or names an invalid date.
    pub fn parse(value: &str) -> Option<Self> {
        let caps = SELECTION_RE.captures(value.trim())?;
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        let index = caps[4].parse().ok()?;
        let key = CalendarDate::new(year, month, day).ok()?;
        Some(Self { key, index })
    }

    pub fn to_value(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.key.year(),
            self.key.month(),
            self.key.day(),
            self.index
        )
    }
}

/// Every stored entry as a removal choice, in chronological order.
pub fn removal_choices(events: &EventStore) -> Vec<EventChoice> {
    events
        .iter()
        .flat_map(|(key, entries)| {
            entries.iter().enumerate().map(move |(index, entry)| {
                let label = format!("{}: {entry}", key.format_short());
                EventChoice {
                    label: label.chars().take(MAX_CHOICE_LABEL_CHARS).collect(),
                    value: EventSelection::new(*key, index).to_value(),
                }
            })
        })
        .collect()
}

/// Full listing grouped by month, then day.
pub fn format_all(events: &EventStore) -> String {
    let groups = events.list_all();
    if groups.is_empty() {
        return NO_EVENTS_TEXT.to_string();
    }

    let mut message = String::from("All planned events:\n");
    for group in groups {
        let name = month_name(group.month);
        message.push_str(&format!("\n{name} {}:\n", group.year));
        for DayEvents { day, entries } in group.days {
            message.push_str(&format!("  {day} {name}:\n"));
            push_bullets(&mut message, "", entries);
        }
    }
    message
}

/// Listing for one month; days without events are skipped.
pub fn format_month(events: &EventStore, year: i64, month: u32) -> String {
    let name = month_name(month);
    let mut message = format!("Events in {name} {year}:\n");
    let days = events.list_for_month(year, month);
    if days.is_empty() {
        message.push_str(NO_EVENTS_TEXT);
        return message;
    }

    for DayEvents { day, entries } in days {
        message.push_str(&format!("{day} {name}:\n"));
        push_bullets(&mut message, "  ", entries);
    }
    message
}

fn push_bullets(message: &mut String, indent: &str, entries: &[String]) {
    for entry in entries {
        message.push_str(&format!("{indent}• {entry}\n"));
    }
}
