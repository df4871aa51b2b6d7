//! Command family and its variant tree.
//!
//! A [`CommandFamily`] holds what every variant shares: display name, command
//! prefix, accent colour, downloader and the per-guild version storage. The
//! root [`CommandVariant`] searches every mapping type; its children each
//! narrow the lookup to one [`MappingType`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use tracing::{debug, info};

use crate::downloader::MappingDownloader;
use crate::mapping::MappingType;
use crate::store::{GuildStorage, Persistence};

/// Configuration shared by the root command and all its typed children.
pub struct CommandFamily {
    name: String,
    prefix: String,
    color: u32,
    downloader: Arc<dyn MappingDownloader>,
    storage: OnceLock<Arc<GuildStorage>>,
}

impl CommandFamily {
    /// `name` is shown to users (`MCP`); `prefix` names the commands
    /// (`mcp`, `mcpm`, ...) and the storage file.
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        color: u32,
        downloader: Arc<dyn MappingDownloader>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            prefix: prefix.into().to_lowercase(),
            color,
            downloader,
            storage: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn downloader(&self) -> &dyn MappingDownloader {
        self.downloader.as_ref()
    }

    /// `None` until some variant has been initialized.
    pub fn storage(&self) -> Option<&Arc<GuildStorage>> {
        self.storage.get()
    }

    pub fn storage_path(&self, storage_root: &Path) -> PathBuf {
        storage_root.join(format!("{}.json", self.prefix))
    }

    /// The root variant, which searches every mapping type.
    pub fn root(self: &Arc<Self>) -> CommandVariant {
        CommandVariant {
            family: Arc::clone(self),
            kind: None,
        }
    }

    fn attach_storage<P: Persistence + ?Sized>(&self, persistence: &P, storage_root: &Path) -> Result<()> {
        if self.storage.get().is_some() {
            return Ok(());
        }
        let path = self.storage_path(storage_root);
        let versions = persistence.load(&path)?;
        info!(
            "Loaded {} default version(s) for '{}' from {}",
            versions.len(),
            self.prefix,
            path.display()
        );
        if self.storage.set(Arc::new(GuildStorage::new(versions))).is_err() {
            debug!("Storage for '{}' attached concurrently, keeping first", self.prefix);
        }
        Ok(())
    }

    async fn save_storage<P: Persistence + ?Sized>(&self, persistence: &P, storage_root: &Path) -> Result<()> {
        let Some(storage) = self.storage.get() else {
            debug!("Nothing to persist for '{}', storage never attached", self.prefix);
            return Ok(());
        };
        let path = self.storage_path(storage_root);
        persistence.save(&storage.snapshot().await, &path)?;
        debug!("Persisted default versions for '{}' to {}", self.prefix, path.display());
        Ok(())
    }
}

/// One node of the command tree.
#[derive(Clone)]
pub struct CommandVariant {
    family: Arc<CommandFamily>,
    kind: Option<MappingType>,
}

impl CommandVariant {
    pub fn family(&self) -> &Arc<CommandFamily> {
        &self.family
    }

    /// `None` for the root variant
    pub fn kind(&self) -> Option<MappingType> {
        self.kind
    }

    pub fn is_root(&self) -> bool {
        self.kind.is_none()
    }

    pub fn name(&self) -> String {
        match self.kind {
            None => self.family.prefix.clone(),
            Some(kind) => format!("{}{}", self.family.prefix, kind.key()),
        }
    }

    /// One child per mapping type for the root; none for a typed variant.
    pub fn children(&self) -> Vec<CommandVariant> {
        if self.kind.is_some() {
            return Vec::new();
        }
        MappingType::ALL
            .iter()
            .map(|&kind| CommandVariant {
                family: Arc::clone(&self.family),
                kind: Some(kind),
            })
            .collect()
    }

    /// The root followed by all of its children.
    pub fn with_children(&self) -> Vec<CommandVariant> {
        let mut all = vec![self.clone()];
        all.extend(self.children());
        all
    }

    /// Attach the family's storage if nothing has yet. Safe to call from any
    /// variant, in any order, any number of times.
    pub fn initialize<P: Persistence + ?Sized>(&self, persistence: &P, storage_root: &Path) -> Result<()> {
        self.family.attach_storage(persistence, storage_root)
    }

    /// Save the family's storage. Idempotent from any variant.
    pub async fn persist<P: Persistence + ?Sized>(&self, persistence: &P, storage_root: &Path) -> Result<()> {
        self.family.save_storage(persistence, storage_root).await
    }

    pub fn describe(&self) -> String {
        match self.kind {
            None => format!("Looks up {} info.", self.family.name),
            Some(kind) => format!(
                "Looks up {} info for a given {}.",
                self.family.name,
                kind.as_str().to_lowercase()
            ),
        }
    }
}

#[path = "family_tests.rs"]
mod family_tests;
