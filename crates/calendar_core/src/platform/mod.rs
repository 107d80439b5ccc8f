//! Chat platform seam.
//!
//! # Responsibility
//! - Define what the calendar service needs from a chat platform: a named
//!   channel per guild, image posts, post deletion and text announcements.
//! - Provide a local directory-backed platform (`directory`).
//!
//! # Invariants
//! - Artifact references returned by `post_image` are accepted back by
//!   `delete_artifact` on the same channel.

use crate::model::guild::{ArtifactRef, GuildId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod directory;

pub use directory::DirectoryPlatform;

/// Resolved channel handle for one guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub guild_id: GuildId,
    pub name: String,
    pub location: PathBuf,
}

#[derive(Debug)]
pub enum PlatformError {
    Io(std::io::Error),
    /// Artifact does not exist in the channel.
    ArtifactNotFound(ArtifactRef),
    /// Channel name cannot be used on this platform.
    InvalidChannel(String),
}

impl Display for PlatformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "platform io error: {err}"),
            Self::ArtifactNotFound(artifact) => write!(f, "artifact not found: {artifact}"),
            Self::InvalidChannel(name) => write!(f, "invalid channel name: `{name}`"),
        }
    }
}

impl Error for PlatformError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PlatformError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Operations the calendar service performs against a chat platform.
pub trait ChatPlatform {
    fn get_or_create_channel(&self, guild_id: GuildId, name: &str) -> PlatformResult<ChannelRef>;
    fn post_image(
        &self,
        channel: &ChannelRef,
        file_name: &str,
        bytes: &[u8],
    ) -> PlatformResult<ArtifactRef>;
    fn delete_artifact(&self, channel: &ChannelRef, artifact: &ArtifactRef) -> PlatformResult<()>;
    fn announce(&self, channel: &ChannelRef, text: &str) -> PlatformResult<()>;
}

impl<T: ChatPlatform + ?Sized> ChatPlatform for &T {
    fn get_or_create_channel(&self, guild_id: GuildId, name: &str) -> PlatformResult<ChannelRef> {
        (**self).get_or_create_channel(guild_id, name)
    }

    fn post_image(
        &self,
        channel: &ChannelRef,
        file_name: &str,
        bytes: &[u8],
    ) -> PlatformResult<ArtifactRef> {
        (**self).post_image(channel, file_name, bytes)
    }

    fn delete_artifact(&self, channel: &ChannelRef, artifact: &ArtifactRef) -> PlatformResult<()> {
        (**self).delete_artifact(channel, artifact)
    }

    fn announce(&self, channel: &ChannelRef, text: &str) -> PlatformResult<()> {
        (**self).announce(channel, text)
    }
}
