//! Interface to the mapping database.

use std::collections::BTreeSet;

use futures::future::BoxFuture;

use crate::mapping::{MappingEntry, MappingType};

/// A single lookup, built per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub name: String,
    pub version: String,
    /// `None` searches every mapping type
    pub kind: Option<MappingType>,
}

/// Outcome of a lookup that ran to completion.
///
/// An empty `Mappings` means the version exists but nothing matched;
/// `NoSuchVersion` means there is no data for the version at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    Mappings(Vec<MappingEntry>),
    NoSuchVersion,
}

/// Source of mapping data shared by every variant of a command family.
///
/// `lookup` returns an owned future so it can be spawned as an independent
/// task; the first lookup against a version may take seconds while its
/// database is built.
pub trait MappingDownloader: Send + Sync + 'static {
    fn latest_version(&self) -> String;

    fn known_versions(&self) -> BTreeSet<String>;

    fn lookup(&self, request: LookupRequest) -> BoxFuture<'static, anyhow::Result<LookupResponse>>;
}
