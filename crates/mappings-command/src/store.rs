//! Per-guild default version storage and its persistence.
//!
//! # Examples
//!
//! ```
//! use mappings_command::{GuildStorage, GuildVersions};
//!
//! # tokio_test_block_on(async {
//! let storage = GuildStorage::new(GuildVersions::new());
//! storage.put(42, Some("1.12.2".to_string())).await;
//! assert_eq!(storage.get(42).await.as_deref(), Some("1.12.2"));
//!
//! storage.put(42, None).await;
//! assert_eq!(storage.get(42).await, None);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tracing::debug;

/// Guild id → default version. A missing key means "use latest".
pub type GuildVersions = BTreeMap<u64, String>;

/// Shared, in-memory view of every guild's default version.
///
/// Writes are last-writer-wins; concurrent writers for the same guild race.
#[derive(Debug, Default)]
pub struct GuildStorage {
    versions: RwLock<GuildVersions>,
}

impl GuildStorage {
    pub fn new(versions: GuildVersions) -> Self {
        Self {
            versions: RwLock::new(versions),
        }
    }

    pub async fn get(&self, guild_id: u64) -> Option<String> {
        self.versions.read().await.get(&guild_id).cloned()
    }

    /// Store a default version, or clear it with `None`.
    pub async fn put(&self, guild_id: u64, version: Option<String>) {
        let mut versions = self.versions.write().await;
        match version {
            Some(v) => {
                versions.insert(guild_id, v);
            }
            None => {
                versions.remove(&guild_id);
            }
        }
    }

    pub async fn snapshot(&self) -> GuildVersions {
        self.versions.read().await.clone()
    }
}

/// Where a [`GuildStorage`] is loaded from and saved to.
pub trait Persistence: Send + Sync {
    /// Load stored versions. A missing file yields an empty map.
    fn load(&self, path: &Path) -> Result<GuildVersions>;

    fn save(&self, versions: &GuildVersions, path: &Path) -> Result<()>;
}

/// JSON files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFiles;

impl Persistence for JsonFiles {
    fn load(&self, path: &Path) -> Result<GuildVersions> {
        if !path.exists() {
            debug!("No stored versions at {}, starting empty", path.display());
            return Ok(GuildVersions::new());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read storage file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse storage file: {}", path.display()))
    }

    /// Write to a temp file beside `path`, then rename it into place, so
    /// readers never see a partially written file.
    fn save(&self, versions: &GuildVersions, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create storage dir: {}", parent.display()))?;

        let mut file = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        serde_json::to_writer_pretty(&mut file, versions)
            .with_context(|| format!("Failed to write storage file: {}", path.display()))?;
        file.as_file()
            .sync_all()
            .with_context(|| format!("Failed to flush storage file: {}", path.display()))?;
        file.persist(path)
            .with_context(|| format!("Failed to replace storage file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use mem::MemFiles;

#[cfg(any(test, feature = "test-support"))]
mod mem {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use anyhow::Result;

    use super::{GuildVersions, Persistence};

    /// In-memory persistence that counts loads and saves.
    ///
    /// Paths are raw keys with no normalization.
    #[derive(Clone, Default)]
    pub struct MemFiles {
        files: Arc<Mutex<HashMap<PathBuf, GuildVersions>>>,
        loads: Arc<Mutex<usize>>,
        saves: Arc<Mutex<usize>>,
    }

    impl MemFiles {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&self, path: impl AsRef<Path>, versions: GuildVersions) {
            self.files
                .lock()
                .unwrap()
                .insert(path.as_ref().to_path_buf(), versions);
        }

        pub fn get(&self, path: impl AsRef<Path>) -> Option<GuildVersions> {
            self.files.lock().unwrap().get(path.as_ref()).cloned()
        }

        pub fn load_count(&self) -> usize {
            *self.loads.lock().unwrap()
        }

        pub fn save_count(&self) -> usize {
            *self.saves.lock().unwrap()
        }
    }

    impl Persistence for MemFiles {
        fn load(&self, path: &Path) -> Result<GuildVersions> {
            *self.loads.lock().unwrap() += 1;
            Ok(self
                .files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .unwrap_or_default())
        }

        fn save(&self, versions: &GuildVersions, path: &Path) -> Result<()> {
            *self.saves.lock().unwrap() += 1;
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), versions.clone());
            Ok(())
        }
    }
}
