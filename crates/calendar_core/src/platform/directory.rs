//! Directory-backed chat platform.
//!
//! A channel is `<root>/<guild_id>/<channel_name>/`, a posted image is one
//! file named `<uuid>.<ext>` inside it, and announcements are appended to
//! `announcements.log` in the same directory.

use crate::model::guild::{ArtifactRef, GuildId};
use crate::platform::{ChannelRef, ChatPlatform, PlatformError, PlatformResult};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ANNOUNCEMENTS_FILE_NAME: &str = "announcements.log";

static CHANNEL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,99}$").expect("valid channel name regex"));
static ARTIFACT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}(-[0-9a-f]{4}){3}-[0-9a-f]{12}\.[a-z0-9]+$")
        .expect("valid artifact name regex")
});

#[derive(Debug, Clone)]
pub struct DirectoryPlatform {
    root: PathBuf,
}

impl DirectoryPlatform {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ChatPlatform for DirectoryPlatform {
    fn get_or_create_channel(&self, guild_id: GuildId, name: &str) -> PlatformResult<ChannelRef> {
        if !CHANNEL_NAME_RE.is_match(name) {
            return Err(PlatformError::InvalidChannel(name.to_string()));
        }

        let location = self.root.join(guild_id.to_string()).join(name);
        if !location.is_dir() {
            fs::create_dir_all(&location)?;
            info!("event=channel_create module=platform status=ok guild_id={guild_id} channel={name}");
        }

        Ok(ChannelRef {
            guild_id,
            name: name.to_string(),
            location,
        })
    }

    fn post_image(
        &self,
        channel: &ChannelRef,
        file_name: &str,
        bytes: &[u8],
    ) -> PlatformResult<ArtifactRef> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "bin".to_string());
        let artifact = ArtifactRef::new(format!("{}.{extension}", Uuid::new_v4()));

        fs::write(channel.location.join(artifact.as_str()), bytes)?;
        Ok(artifact)
    }

    fn delete_artifact(&self, channel: &ChannelRef, artifact: &ArtifactRef) -> PlatformResult<()> {
        if !ARTIFACT_NAME_RE.is_match(artifact.as_str()) {
            return Err(PlatformError::ArtifactNotFound(artifact.clone()));
        }

        match fs::remove_file(channel.location.join(artifact.as_str())) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(PlatformError::ArtifactNotFound(artifact.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn announce(&self, channel: &ChannelRef, text: &str) -> PlatformResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(channel.location.join(ANNOUNCEMENTS_FILE_NAME))?;
        writeln!(file, "{text}\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DirectoryPlatform, ANNOUNCEMENTS_FILE_NAME};
    use crate::model::guild::ArtifactRef;
    use crate::platform::{ChatPlatform, PlatformError};

    #[test]
    fn channel_is_created_once_per_guild() {
        let dir = tempfile::tempdir().unwrap();
        let platform = DirectoryPlatform::new(dir.path());

        let first = platform.get_or_create_channel(42, "calendar").unwrap();
        let second = platform.get_or_create_channel(42, "calendar").unwrap();

        assert_eq!(first, second);
        assert!(first.location.ends_with("42/calendar"));
        assert!(first.location.is_dir());
    }

    #[test]
    fn rejects_channel_names_that_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let platform = DirectoryPlatform::new(dir.path());

        let err = platform.get_or_create_channel(1, "../outside").unwrap_err();
        assert!(matches!(err, PlatformError::InvalidChannel(_)));
    }

    #[test]
    fn post_then_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let platform = DirectoryPlatform::new(dir.path());
        let channel = platform.get_or_create_channel(1, "calendar").unwrap();

        let artifact = platform
            .post_image(&channel, "calendar.png", b"png-bytes")
            .unwrap();
        assert!(artifact.as_str().ends_with(".png"));
        let path = channel.location.join(artifact.as_str());
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");

        platform.delete_artifact(&channel, &artifact).unwrap();
        assert!(!path.exists());

        let err = platform.delete_artifact(&channel, &artifact).unwrap_err();
        assert!(matches!(err, PlatformError::ArtifactNotFound(_)));
    }

    #[test]
    fn delete_rejects_foreign_artifact_names() {
        let dir = tempfile::tempdir().unwrap();
        let platform = DirectoryPlatform::new(dir.path());
        let channel = platform.get_or_create_channel(1, "calendar").unwrap();

        let err = platform
            .delete_artifact(&channel, &ArtifactRef::new("../../etc/passwd"))
            .unwrap_err();
        assert!(matches!(err, PlatformError::ArtifactNotFound(_)));
    }

    #[test]
    fn announcements_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let platform = DirectoryPlatform::new(dir.path());
        let channel = platform.get_or_create_channel(1, "calendar").unwrap();

        platform.announce(&channel, "first").unwrap();
        platform.announce(&channel, "second").unwrap();

        let log = std::fs::read_to_string(channel.location.join(ANNOUNCEMENTS_FILE_NAME)).unwrap();
        assert_eq!(log, "first\n\nsecond\n\n");
    }
}
