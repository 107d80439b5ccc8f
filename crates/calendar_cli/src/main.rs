//! Operator entry point for the calendar bot.
//!
//! # Responsibility
//! - Resolve settings from flags and `CALENDAR_BOT_*` variables.
//! - Run exactly one guild command and print its reply.
//!
//! # Invariants
//! - Flags win over environment variables.
//! - Exit status is non-zero whenever the command was not applied.

mod cli_args;

use calendar_core::config::{
    ENV_CHANNEL_NAME, ENV_CHANNEL_ROOT, ENV_DB_PATH, ENV_GUILD_ID, ENV_LOG_DIR, ENV_LOG_LEVEL,
};
use calendar_core::db::open_db;
use calendar_core::{
    core_version, init_logging, init_stderr_logging, ping, AddEventRequest, BotConfig,
    CalendarService, ChatPlatform, CommandError, CommandReply, DirectoryPlatform, GuildId,
    KeyValueStore, PngRasterizer, Rasterizer, SqliteKvStore,
};
use clap::Parser;
use cli_args::{Cli, Command, GlobalArgs};
use log::error;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<(), String> {
    if matches!(cli.command, Command::Health) {
        println!("calendar_core ping={}", ping());
        println!("calendar_core version={}", core_version());
        return Ok(());
    }

    let config = load_config(&cli.global)?;
    match config.log_dir.as_deref() {
        Some(dir) => init_logging(&config.log_level, &dir.to_string_lossy())?,
        None => init_stderr_logging(&config.log_level)?,
    }
    let guild_id = config.default_guild.ok_or_else(|| {
        format!("no guild selected; pass --guild or set {ENV_GUILD_ID}")
    })?;

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let mut calendar = CalendarService::new(
        SqliteKvStore::new(&conn),
        PngRasterizer::new(),
        DirectoryPlatform::new(config.channel_root.clone()),
        config.channel_name.clone(),
    )
    .map_err(|err| err.to_string())?;

    run_command(&mut calendar, guild_id, cli.command).map_err(|err| {
        if err.is_user_error() {
            err.user_message()
        } else {
            error!("event=command module=cli status=error guild_id={guild_id} error={err}");
            format!("{}: {err}", err.user_message())
        }
    })
}

/// Reads settings with flags taking precedence over the environment.
fn load_config(global: &GlobalArgs) -> Result<BotConfig, String> {
    load_config_with(global, |key| std::env::var(key).ok())
}

fn load_config_with(
    global: &GlobalArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<BotConfig, String> {
    let path_flag = |value: &Option<std::path::PathBuf>| {
        value
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
    };
    let db = path_flag(&global.db);
    let log_dir = path_flag(&global.log_dir);
    let channel_root = path_flag(&global.channel_root);
    let guild = global.guild.map(|id| id.to_string());

    BotConfig::from_lookup(|key| {
        let flag = match key {
            ENV_DB_PATH => db.clone(),
            ENV_LOG_DIR => log_dir.clone(),
            ENV_LOG_LEVEL => global.log_level.clone(),
            ENV_CHANNEL_NAME => global.channel.clone(),
            ENV_CHANNEL_ROOT => channel_root.clone(),
            ENV_GUILD_ID => guild.clone(),
            _ => None,
        };
        flag.or_else(|| env(key))
    })
    .map_err(|err| err.to_string())
}

fn run_command<S, R, P>(
    calendar: &mut CalendarService<S, R, P>,
    guild_id: GuildId,
    command: Command,
) -> Result<(), CommandError>
where
    S: KeyValueStore,
    R: Rasterizer,
    P: ChatPlatform,
{
    let reply = match command {
        Command::SetDate(args) => calendar.set_date(guild_id, args.year, args.month, args.day)?,
        Command::AddEvent(args) => calendar.add_event(
            guild_id,
            AddEventRequest {
                text: args.text,
                day: args.day,
                month: args.month,
                year: args.year,
            },
        )?,
        Command::RemoveEvent(args) => match args.choice {
            Some(value) => calendar.remove_event_by_value(guild_id, &value)?,
            None => {
                let choices = calendar.removal_choices(guild_id)?;
                if choices.is_empty() {
                    println!("No events to remove.");
                }
                for choice in choices {
                    println!("{:<24} {}", choice.value, choice.label);
                }
                return Ok(());
            }
        },
        Command::ShowCalendar => calendar.show_calendar(guild_id)?,
        Command::ListEvents(args) => calendar.list_events(guild_id, args.scope)?,
        Command::NextDay => calendar.next_day(guild_id)?,
        Command::PrevDay => calendar.prev_day(guild_id)?,
        Command::Ensure => {
            let created = calendar.ensure_guild(guild_id)?;
            println!(
                "{}",
                if created {
                    "Calendar created."
                } else {
                    "Calendar already exists."
                }
            );
            return Ok(());
        }
        Command::Health => return Ok(()),
    };

    print_reply(&reply);
    Ok(())
}

fn print_reply(reply: &CommandReply) {
    println!("{}", reply.message);
    if let Some(announcement) = reply.announcement.as_deref() {
        println!();
        println!("{announcement}");
    }
}
