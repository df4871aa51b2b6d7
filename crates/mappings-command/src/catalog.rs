//! File-backed mapping catalog.
//!
//! Each `<catalog_dir>/<version>.json` holds a JSON array of
//! [`MappingEntry`]. A version's file is parsed on its first lookup and kept
//! in memory afterwards. Each version builds behind its own cell, so a cold
//! build never holds up lookups on versions that are already cached.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, warn};

use crate::downloader::{LookupRequest, LookupResponse, MappingDownloader};
use crate::mapping::MappingEntry;

type Database = Arc<Vec<MappingEntry>>;
type DatabaseCell = Arc<OnceCell<Database>>;
type Databases = Arc<RwLock<HashMap<String, DatabaseCell>>>;

#[derive(Debug)]
pub struct CatalogDownloader {
    dir: PathBuf,
    latest: String,
    versions: BTreeSet<String>,
    databases: Databases,
}

impl CatalogDownloader {
    /// Scan `dir` for version files. `latest` overrides the highest version
    /// found and must be one of them.
    pub fn open(dir: impl Into<PathBuf>, latest: Option<String>) -> Result<Self> {
        let dir = dir.into();
        let versions = scan_versions(&dir)?;

        let latest = match latest {
            Some(latest) if versions.contains(&latest) => latest,
            Some(latest) => anyhow::bail!(
                "Configured latest version {} has no catalog file in {}",
                latest,
                dir.display()
            ),
            None => versions
                .iter()
                .max_by(|a, b| compare_versions(a, b))
                .cloned()
                .with_context(|| format!("No mapping catalogs found in {}", dir.display()))?,
        };

        info!(
            "Mapping catalog at {}: {} version(s), latest {}",
            dir.display(),
            versions.len(),
            latest
        );

        Ok(Self {
            dir,
            latest,
            versions,
            databases: Arc::new(RwLock::new(HashMap::new())),
        })
    }
}

impl MappingDownloader for CatalogDownloader {
    fn latest_version(&self) -> String {
        self.latest.clone()
    }

    fn known_versions(&self) -> BTreeSet<String> {
        self.versions.clone()
    }

    fn lookup(&self, request: LookupRequest) -> BoxFuture<'static, Result<LookupResponse>> {
        let known = self.versions.contains(&request.version);
        let path = self.dir.join(format!("{}.json", request.version));
        let databases = Arc::clone(&self.databases);

        Box::pin(async move {
            if !known {
                return Ok(LookupResponse::NoSuchVersion);
            }
            let build = read_catalog(&request.version, &path);
            let database = load_database(&databases, &request.version, build).await?;
            let found = database
                .iter()
                .filter(|entry| request.kind.map_or(true, |kind| entry.kind == kind))
                .filter(|entry| entry.matches(&request.name))
                .cloned()
                .collect();
            Ok(LookupResponse::Mappings(found))
        })
    }
}

/// The cell for `version`, created empty on first use.
async fn database_cell(databases: &Databases, version: &str) -> DatabaseCell {
    if let Some(cell) = databases.read().await.get(version) {
        return Arc::clone(cell);
    }
    let mut databases = databases.write().await;
    Arc::clone(databases.entry(version.to_string()).or_default())
}

/// Return the cached database for `version`, running `build` if none exists.
///
/// The map lock is released before `build` runs. Concurrent callers for the
/// same version wait on its cell; a failed build leaves the cell empty.
async fn load_database<F>(databases: &Databases, version: &str, build: F) -> Result<Database>
where
    F: Future<Output = Result<Vec<MappingEntry>>>,
{
    let cell = database_cell(databases, version).await;
    let database = cell.get_or_try_init(|| async move { build.await.map(Arc::new) }).await?;
    Ok(Arc::clone(database))
}

async fn read_catalog(version: &str, path: &Path) -> Result<Vec<MappingEntry>> {
    info!("Building mapping database for {} from {}", version, path.display());
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read mapping catalog: {}", path.display()))?;
    let entries: Vec<MappingEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse mapping catalog: {}", path.display()))?;
    debug!("Mapping database for {} has {} entries", version, entries.len());
    Ok(entries)
}

fn scan_versions(dir: &Path) -> Result<BTreeSet<String>> {
    let mut versions = BTreeSet::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read catalog dir: {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) if !stem.is_empty() => {
                versions.insert(stem.to_string());
            }
            _ => warn!("Skipping catalog file with unusable name: {}", path.display()),
        }
    }
    Ok(versions)
}

/// Natural ordering: digit runs compare numerically, so `1.9 < 1.12`.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        let (a_run, a_rest) = split_run(a);
        let (b_run, b_rest) = split_run(b);
        let ord = match (a_run.parse::<u64>(), b_run.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a_run.cmp(b_run),
        };
        if ord != Ordering::Equal {
            return ord;
        }
        a = a_rest;
        b = b_rest;
    }
}

/// Leading run of all-digit or all-non-digit characters.
fn split_run(s: &str) -> (&str, &str) {
    let digits = s.starts_with(|c: char| c.is_ascii_digit());
    let end = s
        .find(|c: char| c.is_ascii_digit() != digits)
        .unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingType;
    use std::time::Duration;

    fn write_catalog(dir: &Path, version: &str, entries: &[MappingEntry]) {
        std::fs::write(
            dir.join(format!("{}.json", version)),
            serde_json::to_string(entries).unwrap(),
        )
        .unwrap();
    }

    fn sample() -> Vec<MappingEntry> {
        vec![
            MappingEntry::new(MappingType::Class, "World", "net/minecraft/world/World").with_original("aid"),
            MappingEntry::new(MappingType::Method, "getBlockState", "func_180495_p").with_original("o"),
            MappingEntry::new(MappingType::Field, "blockState", "field_180495_a"),
        ]
    }

    fn request(name: &str, version: &str, kind: Option<MappingType>) -> LookupRequest {
        LookupRequest {
            name: name.to_string(),
            version: version.to_string(),
            kind,
        }
    }

    #[test]
    fn test_compare_versions_natural() {
        assert_eq!(compare_versions("1.9", "1.12"), Ordering::Less);
        assert_eq!(compare_versions("1.12.2", "1.12"), Ordering::Greater);
        assert_eq!(compare_versions("1.12", "1.12"), Ordering::Equal);
        assert_eq!(compare_versions("18w50a", "1.13"), Ordering::Greater);
    }

    #[test]
    fn test_open_picks_highest_version() {
        let dir = tempfile::tempdir().unwrap();
        for v in ["1.9", "1.12.2", "1.10"] {
            write_catalog(dir.path(), v, &[]);
        }
        std::fs::write(dir.path().join("README.txt"), "ignored").unwrap();

        let catalog = CatalogDownloader::open(dir.path(), None).unwrap();
        assert_eq!(catalog.latest_version(), "1.12.2");
        assert_eq!(catalog.known_versions().len(), 3);
    }

    #[test]
    fn test_open_rejects_unknown_latest() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "1.12", &[]);
        assert!(CatalogDownloader::open(dir.path(), Some("1.13".to_string())).is_err());
    }

    #[test]
    fn test_open_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = CatalogDownloader::open(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("No mapping catalogs found"));
    }

    #[tokio::test]
    async fn test_lookup_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "1.12", &sample());
        let catalog = CatalogDownloader::open(dir.path(), None).unwrap();

        let response = catalog.lookup(request("World", "99w99a", None)).await.unwrap();
        assert_eq!(response, LookupResponse::NoSuchVersion);
    }

    #[tokio::test]
    async fn test_lookup_matches_numeric_id_across_types() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "1.12", &sample());
        let catalog = CatalogDownloader::open(dir.path(), None).unwrap();

        let LookupResponse::Mappings(found) = catalog.lookup(request("180495", "1.12", None)).await.unwrap() else {
            panic!("expected mappings");
        };
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, MappingType::Method);
        assert_eq!(found[1].kind, MappingType::Field);
    }

    #[tokio::test]
    async fn test_lookup_filters_by_type() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "1.12", &sample());
        let catalog = CatalogDownloader::open(dir.path(), None).unwrap();

        let response = catalog
            .lookup(request("180495", "1.12", Some(MappingType::Field)))
            .await
            .unwrap();
        let LookupResponse::Mappings(found) = response else {
            panic!("expected mappings");
        };
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "blockState");
    }

    #[tokio::test]
    async fn test_lookup_no_match_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "1.12", &sample());
        let catalog = CatalogDownloader::open(dir.path(), None).unwrap();

        let response = catalog.lookup(request("nothing", "1.12", None)).await.unwrap();
        assert_eq!(response, LookupResponse::Mappings(vec![]));
    }

    #[tokio::test]
    async fn test_database_cached_after_first_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "1.12", &sample());
        let catalog = CatalogDownloader::open(dir.path(), None).unwrap();

        catalog.lookup(request("World", "1.12", None)).await.unwrap();
        std::fs::remove_file(dir.path().join("1.12.json")).unwrap();

        let response = catalog.lookup(request("aid", "1.12", None)).await.unwrap();
        let LookupResponse::Mappings(found) = response else {
            panic!("expected mappings");
        };
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_catalog_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.12.json"), "{ nope").unwrap();
        let catalog = CatalogDownloader::open(dir.path(), None).unwrap();

        let err = catalog.lookup(request("World", "1.12", None)).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse mapping catalog"));
    }

    #[tokio::test]
    async fn test_failed_build_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.12.json"), "{ nope").unwrap();
        let catalog = CatalogDownloader::open(dir.path(), None).unwrap();
        assert!(catalog.lookup(request("World", "1.12", None)).await.is_err());

        write_catalog(dir.path(), "1.12", &sample());
        let response = catalog.lookup(request("World", "1.12", None)).await.unwrap();
        let LookupResponse::Mappings(found) = response else {
            panic!("expected mappings");
        };
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_cached_version_resolves_during_cold_build() {
        let databases: Databases = Arc::default();
        load_database(&databases, "1.12", async { Ok::<_, anyhow::Error>(sample()) }).await.unwrap();

        let (release, gate) = tokio::sync::oneshot::channel::<()>();
        let cold = {
            let databases = Arc::clone(&databases);
            tokio::spawn(async move {
                load_database(&databases, "1.13", async {
                    gate.await.ok();
                    Ok::<_, anyhow::Error>(vec![])
                })
                .await
            })
        };
        while !databases.read().await.contains_key("1.13") {
            tokio::task::yield_now().await;
        }

        let cached = tokio::time::timeout(
            Duration::from_millis(100),
            load_database(&databases, "1.12", std::future::pending::<Result<Vec<MappingEntry>>>()),
        )
        .await
        .expect("cached lookup waited on the cold build")
        .unwrap();
        assert_eq!(cached.len(), 3);
        assert!(!cold.is_finished());

        release.send(()).unwrap();
        assert!(cold.await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_builds_of_one_version_run_once() {
        let databases: Databases = Arc::default();
        let builds = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let databases = Arc::clone(&databases);
                let builds = Arc::clone(&builds);
                tokio::spawn(async move {
                    load_database(&databases, "1.12", async move {
                        builds.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        Ok::<_, anyhow::Error>(sample())
                    })
                    .await
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().len(), 3);
        }
        assert_eq!(builds.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
