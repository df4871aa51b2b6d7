//! Versioned mapping lookup command.
//!
//! Resolves human-readable names to versioned identifier mappings and shapes
//! the result into a chat reply. One logical command ([`CommandFamily`]) is
//! exposed as a root variant plus one variant per [`MappingType`], all sharing
//! a single per-guild default-version store.
//!
//! | Concern | Type(s) |
//! |---------|---------|
//! | Command tree | [`CommandFamily`], [`CommandVariant`] |
//! | Per-guild defaults | [`GuildStorage`], [`Persistence`] |
//! | Lookup | [`MappingDownloader`], [`lookup::resolve`] |
//! | Replies | [`ChatContext`], [`render::Reply`] |
//!
//! Test doubles ([`mock::MockContext`], [`mock::MockDownloader`],
//! [`MemFiles`]) are available with `#[cfg(test)]` or the `"test-support"`
//! feature.

pub mod catalog;
pub mod command;
pub mod context;
pub mod downloader;
pub mod error;
pub mod family;
pub mod invocation;
pub mod lookup;
pub mod mapping;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod permissions;
pub mod render;
pub mod store;

pub use catalog::CatalogDownloader;
pub use command::CommandOutcome;
pub use context::{ChatContext, SentMessage};
pub use downloader::{LookupRequest, LookupResponse, MappingDownloader};
pub use error::{CommandError, Result};
pub use family::{CommandFamily, CommandVariant};
pub use invocation::Invocation;
pub use mapping::{MappingEntry, MappingType};
pub use permissions::Requirements;
pub use render::{Embed, ListMessageBuilder, PaginatedMessage};
#[cfg(any(test, feature = "test-support"))]
pub use store::MemFiles;
pub use store::{GuildStorage, GuildVersions, JsonFiles, Persistence};
