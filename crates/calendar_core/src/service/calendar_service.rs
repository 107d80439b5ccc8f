//! Calendar command service.
//!
//! # Responsibility
//! - Own every guild record and expose the bot's command surface over them.
//! - Run the republish cycle (render, replace posted image, persist) after
//!   each successful mutation.
//!
//! # Invariants
//! - User input is validated before any state change; a rejected command
//!   leaves memory and storage untouched.
//! - A mutation is committed in memory only after the store write succeeds.
//! - Failing to delete the previous image never fails a republish.
//! - Commands take `&mut self`, so one command finishes (including its
//!   republish) before the next starts. Share the service behind a `Mutex`
//!   when several threads issue commands.

use crate::model::calendar::{CalendarDate, DAYS_PER_MONTH, MONTH_COUNT};
use crate::model::event_store::{EventEntry, EventStoreError};
use crate::model::guild::{default_date, GuildCalendarState, GuildId};
use crate::platform::{ChatPlatform, PlatformError};
use crate::render::{build_render_request, Rasterizer, RenderError, CALENDAR_FILE_NAME};
use crate::repo::kv_repo::KeyValueStore;
use crate::repo::state_repo::{GuildStates, StateRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::listing::{
    format_all, format_month, removal_choices, EventChoice, EventSelection, ListScope,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default name of the channel that carries the calendar image.
pub const DEFAULT_CHANNEL_NAME: &str = "calendar";

/// Persistence, rasterization or publish failure.
#[derive(Debug)]
pub enum ExternalIoFailure {
    Persistence(RepoError),
    Render(RenderError),
    Platform(PlatformError),
}

impl Display for ExternalIoFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "persistence failed: {err}"),
            Self::Render(err) => write!(f, "rendering failed: {err}"),
            Self::Platform(err) => write!(f, "publishing failed: {err}"),
        }
    }
}

impl Error for ExternalIoFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Platform(err) => Some(err),
        }
    }
}

/// Command-level error taxonomy.
#[derive(Debug)]
pub enum CommandError {
    /// Month or day outside the calendar bounds.
    InvalidDate { month: u32, day: u32 },
    /// A day was given without a month.
    MissingMonthForDay,
    /// Removal targeted an entry that does not exist.
    EventIndexOutOfRange(EventStoreError),
    /// Selection value could not be decoded.
    InvalidSelection(String),
    ExternalIo(ExternalIoFailure),
}

impl CommandError {
    /// Whether the caller supplied bad input (as opposed to an I/O failure).
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::ExternalIo(_))
    }

    /// Short message suitable for replying to the command caller.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidDate { .. } => format!(
                "Invalid date. Month must be 1-{MONTH_COUNT} and day 1-{DAYS_PER_MONTH}."
            ),
            Self::MissingMonthForDay => {
                "When you give a day, you must also give a month.".to_string()
            }
            Self::EventIndexOutOfRange(_) => "That event no longer exists.".to_string(),
            Self::InvalidSelection(_) => "That selection is not a valid event.".to_string(),
            Self::ExternalIo(_) => {
                "Something went wrong while updating the calendar.".to_string()
            }
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate { month, day } => {
                write!(f, "invalid date: month {month}, day {day}")
            }
            Self::MissingMonthForDay => write!(f, "day given without month"),
            Self::EventIndexOutOfRange(err) => write!(f, "{err}"),
            Self::InvalidSelection(value) => write!(f, "invalid event selection `{value}`"),
            Self::ExternalIo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EventIndexOutOfRange(err) => Some(err),
            Self::ExternalIo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventStoreError> for CommandError {
    fn from(value: EventStoreError) -> Self {
        Self::EventIndexOutOfRange(value)
    }
}

impl From<RepoError> for CommandError {
    fn from(value: RepoError) -> Self {
        Self::ExternalIo(ExternalIoFailure::Persistence(value))
    }
}

impl From<RenderError> for CommandError {
    fn from(value: RenderError) -> Self {
        Self::ExternalIo(ExternalIoFailure::Render(value))
    }
}

impl From<PlatformError> for CommandError {
    fn from(value: PlatformError) -> Self {
        Self::ExternalIo(ExternalIoFailure::Platform(value))
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    /// Private acknowledgment for the caller.
    pub message: String,
    /// Public text also posted to the calendar channel.
    pub announcement: Option<String>,
}

impl CommandReply {
    fn private(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            announcement: None,
        }
    }

    fn announced(message: impl Into<String>, announcement: String) -> Self {
        Self {
            message: message.into(),
            announcement: Some(announcement),
        }
    }
}

/// Input for `add_event`; omitted fields default to the current date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddEventRequest {
    pub text: EventEntry,
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i64>,
}

impl AddEventRequest {
    /// Event on the guild's current date.
    pub fn today(text: impl Into<EventEntry>) -> Self {
        Self {
            text: text.into(),
            day: None,
            month: None,
            year: None,
        }
    }

    /// Resolves the target date against `current`.
    ///
    /// # Errors
    /// - `MissingMonthForDay` when `day` is set without `month`.
    /// - `InvalidDate` when the resolved month/day are out of bounds.
    pub fn resolve_date(&self, current: CalendarDate) -> CommandResult<CalendarDate> {
        if self.day.is_some() && self.month.is_none() {
            return Err(CommandError::MissingMonthForDay);
        }
        let day = self.day.unwrap_or(current.day());
        let month = self.month.unwrap_or(current.month());
        let year = self.year.unwrap_or(current.year());
        checked_date(year, month, day)
    }
}

/// Command surface over all guild calendars.
pub struct CalendarService<S: KeyValueStore, R: Rasterizer, P: ChatPlatform> {
    repo: StateRepository<S>,
    rasterizer: R,
    platform: P,
    channel_name: String,
    states: GuildStates,
}

impl<S: KeyValueStore, R: Rasterizer, P: ChatPlatform> CalendarService<S, R, P> {
    /// Loads persisted guild records and wires the external collaborators.
    ///
    /// # Errors
    /// - Returns repository errors when the stored blob cannot be read or
    ///   decoded.
    pub fn new(
        store: S,
        rasterizer: R,
        platform: P,
        channel_name: impl Into<String>,
    ) -> RepoResult<Self> {
        let repo = StateRepository::new(store);
        let states = repo.load()?;
        Ok(Self {
            repo,
            rasterizer,
            platform,
            channel_name: channel_name.into(),
            states,
        })
    }

    pub fn guild_state(&self, guild_id: GuildId) -> Option<&GuildCalendarState> {
        self.states.get(&guild_id)
    }

    pub fn guild_ids(&self) -> impl Iterator<Item = GuildId> + '_ {
        self.states.keys().copied()
    }

    /// First-contact hook: creates, persists and publishes a missing guild.
    ///
    /// Returns whether the guild was newly created.
    pub fn ensure_guild(&mut self, guild_id: GuildId) -> CommandResult<bool> {
        let created = self.ensure_record(guild_id)?;
        if created {
            self.republish(guild_id)?;
        }
        Ok(created)
    }

    /// Ensures every listed guild; returns how many were created.
    pub fn ensure_guilds(
        &mut self,
        guild_ids: impl IntoIterator<Item = GuildId>,
    ) -> CommandResult<usize> {
        let mut created = 0;
        for guild_id in guild_ids {
            if self.ensure_guild(guild_id)? {
                created += 1;
            }
        }
        Ok(created)
    }

    pub fn set_date(
        &mut self,
        guild_id: GuildId,
        year: i64,
        month: u32,
        day: u32,
    ) -> CommandResult<CommandReply> {
        let date = checked_date(year, month, day)?;
        self.mutate(guild_id, "set_date", |state| {
            state.current = date;
            Ok(())
        })?;

        Ok(self.announce(
            guild_id,
            CommandReply::announced(
                "Date updated.",
                format!("Date changed:\n{}", date.format_short()),
            ),
        ))
    }

    pub fn add_event(
        &mut self,
        guild_id: GuildId,
        request: AddEventRequest,
    ) -> CommandResult<CommandReply> {
        let current = self.current_or_default(guild_id);
        let date = request.resolve_date(current)?;
        let AddEventRequest { text, .. } = request;
        let announcement = format!("New event added!\n{}\n{text}", date.format_short());

        self.mutate(guild_id, "add_event", |state| {
            state.events.add(date, text);
            Ok(())
        })?;

        Ok(self.announce(
            guild_id,
            CommandReply::announced(format!("Event added on {date}."), announcement),
        ))
    }

    /// Selectable choices for `remove_event`, in date order.
    pub fn removal_choices(&mut self, guild_id: GuildId) -> CommandResult<Vec<EventChoice>> {
        self.ensure_guild(guild_id)?;
        Ok(self
            .states
            .get(&guild_id)
            .map(|state| removal_choices(&state.events))
            .unwrap_or_default())
    }

    /// Removes the entry chosen from `removal_choices` by its value.
    pub fn remove_event_by_value(
        &mut self,
        guild_id: GuildId,
        value: &str,
    ) -> CommandResult<CommandReply> {
        let selection = EventSelection::parse(value)
            .ok_or_else(|| CommandError::InvalidSelection(value.to_string()))?;
        self.remove_event(guild_id, selection)
    }

    pub fn remove_event(
        &mut self,
        guild_id: GuildId,
        selection: EventSelection,
    ) -> CommandResult<CommandReply> {
        let removed = self.mutate(guild_id, "remove_event", |state| {
            Ok(state.events.remove(selection.key, selection.index)?)
        })?;

        Ok(self.announce(
            guild_id,
            CommandReply::announced(
                "Event removed.",
                format!(
                    "Event removed:\n{}\n{removed}",
                    selection.key.format_short()
                ),
            ),
        ))
    }

    /// Forces a republish without changing state.
    pub fn show_calendar(&mut self, guild_id: GuildId) -> CommandResult<CommandReply> {
        if !self.ensure_guild(guild_id)? {
            self.republish(guild_id)?;
        }
        Ok(CommandReply::private("Calendar refreshed."))
    }

    pub fn list_events(
        &mut self,
        guild_id: GuildId,
        scope: ListScope,
    ) -> CommandResult<CommandReply> {
        self.ensure_guild(guild_id)?;
        let state = self.states.entry(guild_id).or_default();
        let listing = match scope {
            ListScope::All => format_all(&state.events),
            ListScope::CurrentMonth => {
                format_month(&state.events, state.current.year(), state.current.month())
            }
            ListScope::NextMonth => {
                let next = state.current.next_month_start();
                format_month(&state.events, next.year(), next.month())
            }
            ListScope::Month { year, month } => {
                if !(1..=MONTH_COUNT).contains(&month) {
                    return Err(CommandError::InvalidDate { month, day: 1 });
                }
                format_month(&state.events, year, month)
            }
        };

        Ok(self.announce(
            guild_id,
            CommandReply::announced("Events shown in this channel.", listing),
        ))
    }

    pub fn next_day(&mut self, guild_id: GuildId) -> CommandResult<CommandReply> {
        self.mutate(guild_id, "next_day", |state| {
            state.current = state.current.advance();
            Ok(())
        })?;
        Ok(CommandReply::private("Next day."))
    }

    pub fn prev_day(&mut self, guild_id: GuildId) -> CommandResult<CommandReply> {
        self.mutate(guild_id, "prev_day", |state| {
            state.current = state.current.retreat();
            Ok(())
        })?;
        Ok(CommandReply::private("Previous day."))
    }

    fn current_or_default(&self, guild_id: GuildId) -> CalendarDate {
        self.states
            .get(&guild_id)
            .map(|state| state.current)
            .unwrap_or_else(default_date)
    }

    /// Creates and persists a default record when the guild is unknown.
    fn ensure_record(&mut self, guild_id: GuildId) -> CommandResult<bool> {
        if self.states.contains_key(&guild_id) {
            return Ok(false);
        }

        self.states.insert(guild_id, GuildCalendarState::new_default());
        if let Err(err) = self.repo.save(&self.states) {
            self.states.remove(&guild_id);
            return Err(err.into());
        }
        info!("event=guild_init module=service status=ok guild_id={guild_id}");
        Ok(true)
    }

    /// Applies `change` to a copy of the guild record, persists, commits and
    /// republishes.
    ///
    /// An unknown guild starts from a default record that is stored only if
    /// `change` succeeds; the republish below doubles as its first publish.
    fn mutate<T>(
        &mut self,
        guild_id: GuildId,
        command: &'static str,
        change: impl FnOnce(&mut GuildCalendarState) -> CommandResult<T>,
    ) -> CommandResult<T> {
        let existing = self.states.get(&guild_id).cloned();
        let created = existing.is_none();
        let mut candidate = existing.unwrap_or_default();

        let output = match change(&mut candidate) {
            Ok(output) => output,
            Err(err) => {
                info!(
                    "event=command module=service status=rejected command={command} guild_id={guild_id} error={err}"
                );
                return Err(err);
            }
        };

        let previous = self.states.insert(guild_id, candidate);
        if let Err(err) = self.repo.save(&self.states) {
            match previous {
                Some(previous) => self.states.insert(guild_id, previous),
                None => self.states.remove(&guild_id),
            };
            warn!(
                "event=command module=service status=error command={command} guild_id={guild_id} stage=persist error={err}"
            );
            return Err(err.into());
        }

        if created {
            info!("event=guild_init module=service status=ok guild_id={guild_id}");
        }
        info!("event=command module=service status=ok command={command} guild_id={guild_id}");
        self.republish(guild_id)?;
        Ok(output)
    }

    /// Renders the current state, replaces the posted image and persists the
    /// new artifact reference.
    fn republish(&mut self, guild_id: GuildId) -> CommandResult<()> {
        let state = self.states.entry(guild_id).or_default();
        let request = build_render_request(state);
        let bytes = self.rasterizer.render(&request)?;
        let channel = self
            .platform
            .get_or_create_channel(guild_id, &self.channel_name)?;

        if let Some(previous) = state.last_artifact_ref.as_ref() {
            if let Err(err) = self.platform.delete_artifact(&channel, previous) {
                warn!(
                    "event=artifact_delete module=service status=error guild_id={guild_id} artifact={previous} error={err}"
                );
            }
        }

        let artifact = self
            .platform
            .post_image(&channel, CALENDAR_FILE_NAME, &bytes)?;
        info!(
            "event=republish module=service status=ok guild_id={guild_id} date={} events={} artifact={artifact}",
            request.date,
            request.events.len()
        );
        state.last_artifact_ref = Some(artifact);

        self.repo.save(&self.states)?;
        Ok(())
    }

    /// Posts the reply's announcement; failures are logged, never returned.
    fn announce(&self, guild_id: GuildId, reply: CommandReply) -> CommandReply {
        let Some(text) = reply.announcement.as_deref() else {
            return reply;
        };

        let posted = self
            .platform
            .get_or_create_channel(guild_id, &self.channel_name)
            .and_then(|channel| self.platform.announce(&channel, text));
        if let Err(err) = posted {
            warn!("event=announce module=service status=error guild_id={guild_id} error={err}");
        }
        reply
    }
}

fn checked_date(year: i64, month: u32, day: u32) -> CommandResult<CalendarDate> {
    CalendarDate::new(year, month, day).map_err(|_| CommandError::InvalidDate { month, day })
}
