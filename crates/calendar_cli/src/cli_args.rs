use calendar_core::{GuildId, ListScope};
use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Operator console for the guild calendar bot.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings that override `CALENDAR_BOT_*` environment variables.
#[derive(Debug, Clone, Args, Default)]
pub struct GlobalArgs {
    /// SQLite database file holding the calendar state.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// Absolute directory for rolling log files; stderr when omitted.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Name of the channel that carries the calendar image.
    #[arg(long, value_name = "NAME")]
    pub channel: Option<String>,

    /// Root directory of the channel tree.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub channel_root: Option<PathBuf>,

    /// Guild the command applies to.
    #[arg(long, value_name = "ID")]
    pub guild: Option<GuildId>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Set the guild's current date.
    SetDate(SetDateArgs),
    /// Add an event; omitted date parts default to the current date.
    AddEvent(AddEventArgs),
    /// Remove an event. Without `--choice`, list the selectable events.
    #[command(alias = "remove")]
    RemoveEvent(RemoveEventArgs),
    /// Republish the calendar image.
    ShowCalendar,
    /// Post planned events to the calendar channel.
    ListEvents(ListEventsArgs),
    /// Advance the current date by one day.
    NextDay,
    /// Step the current date back by one day.
    PrevDay,
    /// Initialize the guild if it has no calendar yet.
    Ensure,
    /// Print the liveness probe and core version.
    Health,
}

#[derive(Debug, Clone, Args)]
pub struct SetDateArgs {
    #[arg(allow_negative_numbers = true)]
    pub year: i64,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, Args)]
pub struct AddEventArgs {
    /// Event description.
    pub text: String,

    #[arg(long)]
    pub day: Option<u32>,

    #[arg(long)]
    pub month: Option<u32>,

    #[arg(long, allow_negative_numbers = true)]
    pub year: Option<i64>,
}

#[derive(Debug, Clone, Args)]
pub struct RemoveEventArgs {
    /// Choice value as printed by `remove-event` without arguments.
    #[arg(long, value_name = "VALUE")]
    pub choice: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ListEventsArgs {
    /// all|current|next|month:<year>:<month>
    #[arg(default_value = "all")]
    pub scope: ListScope,
}
