mod common;

use calendar_core::db::open_db_in_memory;
use calendar_core::{
    AddEventRequest, ArtifactRef, CalendarDate, CalendarService, CommandError, DirectoryPlatform,
    ExternalIoFailure, PngRasterizer, SqliteKvStore,
};
use common::{service, FakeRasterizer, FlakyStore, RecordingPlatform};

const GUILD: u64 = 77;

fn artifact(id: u64) -> ArtifactRef {
    ArtifactRef::new(format!("artifact-{id}"))
}

fn date(year: i64, month: u32, day: u32) -> CalendarDate {
    CalendarDate::new(year, month, day).unwrap()
}

#[test]
fn republish_replaces_previous_artifact() {
    let conn = open_db_in_memory().unwrap();
    let store = FlakyStore::new(&conn);
    let rasterizer = FakeRasterizer::default();
    let platform = RecordingPlatform::default();
    let mut calendar = service(&store, &rasterizer, &platform);

    calendar.ensure_guild(GUILD).unwrap();
    calendar.add_event(GUILD, AddEventRequest::today("Feast")).unwrap();

    assert_eq!(*platform.deleted.borrow(), vec![artifact(1)]);
    assert_eq!(platform.live(), vec![artifact(2)]);
    assert_eq!(
        calendar.guild_state(GUILD).unwrap().last_artifact_ref,
        Some(artifact(2))
    );
    assert_eq!(
        platform.posted_bytes.borrow().last().unwrap().as_slice(),
        b"image:11/2/1784"
    );

    let reloaded = service(&store, &rasterizer, &platform);
    assert_eq!(
        reloaded.guild_state(GUILD).unwrap().last_artifact_ref,
        Some(artifact(2))
    );
}

#[test]
fn failed_delete_does_not_fail_the_command() {
    let conn = open_db_in_memory().unwrap();
    let store = FlakyStore::new(&conn);
    let rasterizer = FakeRasterizer::default();
    let platform = RecordingPlatform::default();
    let mut calendar = service(&store, &rasterizer, &platform);
    calendar.ensure_guild(GUILD).unwrap();

    platform.fail_deletes.set(true);
    calendar.next_day(GUILD).unwrap();

    assert_eq!(platform.live(), vec![artifact(1), artifact(2)]);
    assert_eq!(
        calendar.guild_state(GUILD).unwrap().last_artifact_ref,
        Some(artifact(2))
    );
}

#[test]
fn persist_failure_discards_the_mutation() {
    let conn = open_db_in_memory().unwrap();
    let store = FlakyStore::new(&conn);
    let rasterizer = FakeRasterizer::default();
    let platform = RecordingPlatform::default();
    let mut calendar = service(&store, &rasterizer, &platform);
    calendar.ensure_guild(GUILD).unwrap();
    let renders_before = rasterizer.render_count();

    store.fail_writes.set(true);
    let err = calendar
        .add_event(GUILD, AddEventRequest::today("Lost"))
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::ExternalIo(ExternalIoFailure::Persistence(_))
    ));
    assert!(!err.is_user_error());

    assert!(calendar.guild_state(GUILD).unwrap().events.is_empty());
    assert_eq!(rasterizer.render_count(), renders_before);
    assert!(platform.announcements().is_empty());

    store.fail_writes.set(false);
    let reloaded = service(&store, &rasterizer, &platform);
    assert!(reloaded.guild_state(GUILD).unwrap().events.is_empty());
}

#[test]
fn first_contact_is_not_recorded_when_persist_fails() {
    let conn = open_db_in_memory().unwrap();
    let store = FlakyStore::new(&conn);
    let rasterizer = FakeRasterizer::default();
    let platform = RecordingPlatform::default();
    let mut calendar = service(&store, &rasterizer, &platform);

    store.fail_writes.set(true);
    assert!(calendar.ensure_guild(GUILD).is_err());
    assert!(calendar.guild_state(GUILD).is_none());
    assert_eq!(platform.post_count(), 0);
}

#[test]
fn render_failure_keeps_persisted_state_and_stale_artifact() {
    let conn = open_db_in_memory().unwrap();
    let store = FlakyStore::new(&conn);
    let rasterizer = FakeRasterizer::default();
    let platform = RecordingPlatform::default();
    let mut calendar = service(&store, &rasterizer, &platform);
    calendar.ensure_guild(GUILD).unwrap();

    rasterizer.fail.set(true);
    let err = calendar.next_day(GUILD).unwrap_err();
    assert!(matches!(
        err,
        CommandError::ExternalIo(ExternalIoFailure::Render(_))
    ));

    let state = calendar.guild_state(GUILD).unwrap();
    assert_eq!(state.current, date(1784, 2, 12));
    assert_eq!(state.last_artifact_ref, Some(artifact(1)));
    assert_eq!(platform.live(), vec![artifact(1)]);

    let reloaded = service(&store, &rasterizer, &platform);
    assert_eq!(reloaded.guild_state(GUILD).unwrap().current, date(1784, 2, 12));
}

#[test]
fn post_failure_recovers_on_next_republish() {
    let conn = open_db_in_memory().unwrap();
    let store = FlakyStore::new(&conn);
    let rasterizer = FakeRasterizer::default();
    let platform = RecordingPlatform::default();
    let mut calendar = service(&store, &rasterizer, &platform);
    calendar.ensure_guild(GUILD).unwrap();

    platform.fail_posts.set(true);
    let err = calendar.next_day(GUILD).unwrap_err();
    assert!(matches!(
        err,
        CommandError::ExternalIo(ExternalIoFailure::Platform(_))
    ));
    assert!(platform.live().is_empty());

    platform.fail_posts.set(false);
    let reply = calendar.show_calendar(GUILD).unwrap();
    assert_eq!(reply.message, "Calendar refreshed.");
    assert_eq!(reply.announcement, None);

    let state = calendar.guild_state(GUILD).unwrap();
    assert_eq!(state.current, date(1784, 2, 12));
    assert_eq!(state.last_artifact_ref, Some(artifact(2)));
    assert_eq!(platform.live(), vec![artifact(2)]);
}

#[test]
fn announce_failure_does_not_fail_the_command() {
    let conn = open_db_in_memory().unwrap();
    let store = FlakyStore::new(&conn);
    let rasterizer = FakeRasterizer::default();
    let platform = RecordingPlatform::default();
    let mut calendar = service(&store, &rasterizer, &platform);

    platform.fail_announcements.set(true);
    let reply = calendar.set_date(GUILD, 1790, 5, 5).unwrap();

    assert_eq!(reply.message, "Date updated.");
    assert!(reply.announcement.is_some());
    assert!(platform.announcements().is_empty());
    assert_eq!(calendar.guild_state(GUILD).unwrap().current, date(1790, 5, 5));
}

#[test]
fn render_request_marks_weekday_and_caps_events() {
    let conn = open_db_in_memory().unwrap();
    let store = FlakyStore::new(&conn);
    let rasterizer = FakeRasterizer::default();
    let platform = RecordingPlatform::default();
    let mut calendar = service(&store, &rasterizer, &platform);
    calendar.set_date(GUILD, 1784, 3, 15).unwrap();

    for index in 0..7 {
        calendar
            .add_event(GUILD, AddEventRequest::today(format!("event {index}")))
            .unwrap();
    }

    let request = rasterizer.last_request();
    assert_eq!(request.date, date(1784, 3, 15));
    assert_eq!(request.weekday_index, 1);
    assert_eq!(request.weekday_names.len(), 7);
    assert_eq!(
        request.events,
        vec!["event 0", "event 1", "event 2", "event 3", "event 4"]
    );
    assert_eq!(request.title_text, "Year: 1784 | Month: Maius (3) | Day: 15");
}

#[test]
fn directory_platform_holds_exactly_one_calendar_image() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);
    let platform = DirectoryPlatform::new(dir.path());
    let mut calendar =
        CalendarService::new(store, PngRasterizer::new(), platform, "calendar").unwrap();

    calendar.ensure_guild(GUILD).unwrap();
    calendar.add_event(GUILD, AddEventRequest::today("Feast")).unwrap();
    calendar.next_day(GUILD).unwrap();

    let channel_dir = dir.path().join(GUILD.to_string()).join("calendar");
    let images: Vec<String> = std::fs::read_dir(&channel_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".png"))
        .collect();
    assert_eq!(images.len(), 1);

    let state = calendar.guild_state(GUILD).unwrap();
    assert_eq!(
        state.last_artifact_ref.as_ref().map(|artifact| artifact.as_str()),
        Some(images[0].as_str())
    );

    let bytes = std::fs::read(channel_dir.join(&images[0])).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));

    let log = std::fs::read_to_string(channel_dir.join("announcements.log")).unwrap();
    assert!(log.contains("New event added!\n11 Aprilis 1784\nFeast"));
}
