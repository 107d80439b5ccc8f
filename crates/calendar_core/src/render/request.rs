//! Render descriptor assembly.
//!
//! # Responsibility
//! - Collect everything a rasterizer needs from one guild record.
//!
//! # Invariants
//! - At most `MAX_RENDERED_EVENTS` entries are carried, in insertion order.
//! - Building a request never touches pixels, fonts or I/O.

use crate::model::calendar::{CalendarDate, WEEKDAY_NAMES};
use crate::model::guild::GuildCalendarState;

/// Event lines that fit under the weekday header.
pub const MAX_RENDERED_EVENTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub date: CalendarDate,
    /// Header cell to highlight, in `[0, weekday_names.len())`.
    pub weekday_index: usize,
    pub weekday_names: &'static [&'static str],
    /// First `MAX_RENDERED_EVENTS` events of `date`.
    pub events: Vec<String>,
    pub title_text: String,
}

/// Builds the descriptor for the guild's current date.
pub fn build_render_request(state: &GuildCalendarState) -> RenderRequest {
    let date = state.current;
    let events = state
        .events
        .list_for_date(&date)
        .iter()
        .take(MAX_RENDERED_EVENTS)
        .cloned()
        .collect();

    RenderRequest {
        date,
        weekday_index: date.weekday_index(),
        weekday_names: &WEEKDAY_NAMES,
        events,
        title_text: date.format_title(),
    }
}
