#![allow(dead_code)]

use calendar_core::platform::PlatformResult;
use calendar_core::{
    ArtifactRef, CalendarService, ChannelRef, ChatPlatform, GuildId, KeyValueStore,
    PlatformError, Rasterizer, RenderError, RenderRequest, RepoError, RepoResult, SqliteKvStore,
};
use rusqlite::Connection;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;

pub type TestService<'a> =
    CalendarService<&'a FlakyStore<'a>, &'a FakeRasterizer, &'a RecordingPlatform>;

/// Builds a service over borrowed fakes so tests can inspect them afterwards.
pub fn service<'a>(
    store: &'a FlakyStore<'a>,
    rasterizer: &'a FakeRasterizer,
    platform: &'a RecordingPlatform,
) -> TestService<'a> {
    CalendarService::new(store, rasterizer, platform, "calendar").unwrap()
}

/// SQLite key-value store whose writes can be made to fail.
pub struct FlakyStore<'conn> {
    inner: SqliteKvStore<'conn>,
    pub fail_writes: Cell<bool>,
}

impl<'conn> FlakyStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            inner: SqliteKvStore::new(conn),
            fail_writes: Cell::new(false),
        }
    }
}

impl KeyValueStore for FlakyStore<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        if self.fail_writes.get() {
            return Err(RepoError::InvalidData("forced write failure".to_string()));
        }
        self.inner.set(key, value)
    }
}

/// Rasterizer that records requests and returns small fake images.
#[derive(Default)]
pub struct FakeRasterizer {
    pub fail: Cell<bool>,
    pub requests: RefCell<Vec<RenderRequest>>,
}

impl FakeRasterizer {
    pub fn render_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> RenderRequest {
        self.requests.borrow().last().cloned().unwrap()
    }
}

impl Rasterizer for FakeRasterizer {
    fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        if self.fail.get() {
            return Err(RenderError::InvalidRequest("forced failure".to_string()));
        }
        self.requests.borrow_mut().push(request.clone());
        Ok(format!("image:{}", request.date).into_bytes())
    }
}

/// In-memory chat platform recording every call.
#[derive(Default)]
pub struct RecordingPlatform {
    next_id: Cell<u64>,
    pub live: RefCell<Vec<ArtifactRef>>,
    pub deleted: RefCell<Vec<ArtifactRef>>,
    pub posted_bytes: RefCell<Vec<Vec<u8>>>,
    pub announcements: RefCell<Vec<String>>,
    pub fail_deletes: Cell<bool>,
    pub fail_posts: Cell<bool>,
    pub fail_announcements: Cell<bool>,
}

impl RecordingPlatform {
    pub fn live(&self) -> Vec<ArtifactRef> {
        self.live.borrow().clone()
    }

    pub fn post_count(&self) -> usize {
        self.posted_bytes.borrow().len()
    }

    pub fn announcements(&self) -> Vec<String> {
        self.announcements.borrow().clone()
    }
}

impl ChatPlatform for RecordingPlatform {
    fn get_or_create_channel(&self, guild_id: GuildId, name: &str) -> PlatformResult<ChannelRef> {
        Ok(ChannelRef {
            guild_id,
            name: name.to_string(),
            location: PathBuf::from(format!("memory/{guild_id}/{name}")),
        })
    }

    fn post_image(
        &self,
        _channel: &ChannelRef,
        _file_name: &str,
        bytes: &[u8],
    ) -> PlatformResult<ArtifactRef> {
        if self.fail_posts.get() {
            return Err(PlatformError::Io(std::io::Error::other("post failed")));
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let artifact = ArtifactRef::new(format!("artifact-{id}"));
        self.live.borrow_mut().push(artifact.clone());
        self.posted_bytes.borrow_mut().push(bytes.to_vec());
        Ok(artifact)
    }

    fn delete_artifact(&self, _channel: &ChannelRef, artifact: &ArtifactRef) -> PlatformResult<()> {
        if self.fail_deletes.get() {
            return Err(PlatformError::ArtifactNotFound(artifact.clone()));
        }
        let mut live = self.live.borrow_mut();
        let Some(position) = live.iter().position(|item| item == artifact) else {
            return Err(PlatformError::ArtifactNotFound(artifact.clone()));
        };
        live.remove(position);
        self.deleted.borrow_mut().push(artifact.clone());
        Ok(())
    }

    fn announce(&self, _channel: &ChannelRef, text: &str) -> PlatformResult<()> {
        if self.fail_announcements.get() {
            return Err(PlatformError::Io(std::io::Error::other("announce failed")));
        }
        self.announcements.borrow_mut().push(text.to_string());
        Ok(())
    }
}
