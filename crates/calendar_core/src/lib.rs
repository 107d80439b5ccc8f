//! Core logic for the in-universe calendar bot.
//! This crate is the single source of truth for calendar rules and state.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod platform;
pub mod render;
pub mod repo;
pub mod service;

pub use config::{BotConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::calendar::{CalendarDate, CalendarError, DAYS_PER_MONTH, MONTH_COUNT};
pub use model::event_store::{EventEntry, EventKey, EventStore, EventStoreError};
pub use model::guild::{ArtifactRef, GuildCalendarState, GuildId};
pub use platform::{ChannelRef, ChatPlatform, DirectoryPlatform, PlatformError};
pub use render::{PngRasterizer, Rasterizer, RenderError, RenderRequest};
pub use repo::kv_repo::{KeyValueStore, SqliteKvStore};
pub use repo::state_repo::StateRepository;
pub use repo::{RepoError, RepoResult};
pub use service::calendar_service::{
    AddEventRequest, CalendarService, CommandError, CommandReply, CommandResult,
    ExternalIoFailure,
};
pub use service::listing::{EventChoice, EventSelection, ListScope};

/// Minimal liveness probe.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
