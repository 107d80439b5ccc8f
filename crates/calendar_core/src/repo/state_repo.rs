//! Whole-collection persistence of guild calendar state.
//!
//! # Responsibility
//! - Serialize every guild record into one versioned JSON blob.
//! - Decode that blob back into validated `GuildCalendarState` values.
//!
//! # Invariants
//! - The blob lives under `STATE_KEY`; no partial writes.
//! - Composite date keys are stored as explicit `{year, month, day}` objects
//!   and guild ids stay JSON integers.
//! - Decoding rejects unknown versions, duplicate guilds and out-of-range
//!   dates instead of silently dropping them.

use crate::model::calendar::CalendarDate;
use crate::model::event_store::EventStore;
use crate::model::guild::{ArtifactRef, GuildCalendarState, GuildId};
use crate::repo::kv_repo::KeyValueStore;
use crate::repo::{RepoError, RepoResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed key holding the serialized guild collection.
pub const STATE_KEY: &str = "calendar_state";
/// Current blob format version.
pub const STATE_FORMAT_VERSION: u32 = 1;

/// In-memory guild collection, ordered by guild id.
pub type GuildStates = BTreeMap<GuildId, GuildCalendarState>;

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    version: u32,
    guilds: Vec<StoredGuild>,
}

#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredGuild {
    guild_id: GuildId,
    current: StoredDate,
    last_artifact_ref: Option<String>,
    #[serde(default)]
    events: Vec<StoredEventDay>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StoredDate {
    year: i64,
    month: u32,
    day: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEventDay {
    date: StoredDate,
    entries: Vec<String>,
}

impl From<CalendarDate> for StoredDate {
    fn from(value: CalendarDate) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
        }
    }
}

impl StoredDate {
    fn into_date(self, guild_id: GuildId, field: &str) -> RepoResult<CalendarDate> {
        CalendarDate::new(self.year, self.month, self.day).map_err(|err| {
            RepoError::InvalidData(format!("guild {guild_id} {field}: {err}"))
        })
    }
}

/// Reads and writes the guild collection through a key-value store.
pub struct StateRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StateRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads all guild records; a missing key yields an empty collection.
    pub fn load(&self) -> RepoResult<GuildStates> {
        match self.store.get(STATE_KEY)? {
            Some(raw) => {
                let states = decode_states(&raw)?;
                info!(
                    "event=state_load module=repo status=ok guilds={}",
                    states.len()
                );
                Ok(states)
            }
            None => {
                info!("event=state_load module=repo status=ok guilds=0 source=default");
                Ok(GuildStates::new())
            }
        }
    }

    /// Replaces the stored blob with the full collection.
    pub fn save(&self, states: &GuildStates) -> RepoResult<()> {
        let raw = encode_states(states)?;
        self.store.set(STATE_KEY, &raw)
    }
}

/// Serializes the collection into the versioned blob format.
pub fn encode_states(states: &GuildStates) -> RepoResult<String> {
    let guilds = states
        .iter()
        .map(|(guild_id, state)| StoredGuild {
            guild_id: *guild_id,
            current: state.current.into(),
            last_artifact_ref: state
                .last_artifact_ref
                .as_ref()
                .map(|artifact| artifact.as_str().to_string()),
            events: state
                .events
                .iter()
                .map(|(date, entries)| StoredEventDay {
                    date: (*date).into(),
                    entries: entries.to_vec(),
                })
                .collect(),
        })
        .collect();

    let snapshot = StoredSnapshot {
        version: STATE_FORMAT_VERSION,
        guilds,
    };
    Ok(serde_json::to_string(&snapshot)?)
}

/// Parses and validates a blob produced by `encode_states`.
///
/// # Errors
/// - `Serialization` when the text is not valid JSON of the expected shape.
/// - `InvalidData` for unknown versions, duplicate guild ids or invalid dates.
pub fn decode_states(raw: &str) -> RepoResult<GuildStates> {
    let probe: VersionProbe = serde_json::from_str(raw)?;
    if probe.version != STATE_FORMAT_VERSION {
        return Err(RepoError::InvalidData(format!(
            "unsupported state format version {} (expected {STATE_FORMAT_VERSION})",
            probe.version
        )));
    }

    let snapshot: StoredSnapshot = serde_json::from_str(raw)?;
    let mut states = GuildStates::new();
    for stored in snapshot.guilds {
        let guild_id = stored.guild_id;
        let current = stored.current.into_date(guild_id, "current date")?;

        let mut events = EventStore::new();
        for day in stored.events {
            let date = day.date.into_date(guild_id, "event date")?;
            for entry in day.entries {
                events.add(date, entry);
            }
        }

        let state = GuildCalendarState {
            current,
            events,
            last_artifact_ref: stored.last_artifact_ref.map(ArtifactRef::new),
        };
        if states.insert(guild_id, state).is_some() {
            return Err(RepoError::InvalidData(format!(
                "guild {guild_id} appears more than once"
            )));
        }
    }
    Ok(states)
}
