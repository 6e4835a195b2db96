//! Local tool cache: workdir directories saved as blobs under a cache root.
//!
//! The [`FsCache`] mirrors the build host's cache utility. A key names a path
//! relative to the working directory; saving copies that directory into
//! `<root>/entries/<key>` and records it in a libSQL index at `<root>/index.db`.
//!
//! Layout:
//! ```text
//! <root>/
//! ├── index.db
//! └── entries/
//!     └── redoc/ ...
//! ```

mod blob;
pub mod index;
mod migrations;

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use oaspages_shared::{OasPagesError, Result};

pub use index::{CacheEntry, CacheIndex};

/// Directory-blob cache rooted at `root`, saving and restoring paths under `workdir`.
pub struct FsCache {
    root: PathBuf,
    workdir: PathBuf,
    index: CacheIndex,
}

impl FsCache {
    /// Open (or create) the cache at `root` for the given working directory.
    pub async fn open(root: &Path, workdir: &Path) -> Result<Self> {
        let index = CacheIndex::open(&root.join("index.db")).await?;
        Ok(Self {
            root: root.to_path_buf(),
            workdir: workdir.to_path_buf(),
            index,
        })
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_dir(&self, key: &str) -> PathBuf {
        self.root.join("entries").join(key)
    }

    /// Whether `key` is indexed and its blob is still on disk.
    pub async fn has(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let indexed = self.index.get_entry(key).await?.is_some();
        Ok(indexed && self.blob_dir(key).is_dir())
    }

    /// Save `<workdir>/<key>`. Returns `false` if there was nothing to save.
    #[instrument(skip(self))]
    pub async fn save(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let source = self.workdir.join(key);
        if !source.is_dir() {
            warn!(path = %source.display(), "nothing to cache, directory does not exist");
            return Ok(false);
        }

        let blob_dir = self.blob_dir(key);
        let stats = run_blocking(move || blob::replace_tree(&source, &blob_dir)).await?;

        let entry = CacheEntry {
            key: key.to_string(),
            cached_at: Utc::now(),
            file_count: stats.file_count,
            size_bytes: stats.size_bytes,
            digest: stats.digest,
        };
        self.index.upsert_entry(&entry).await?;

        info!(
            key,
            files = entry.file_count,
            bytes = entry.size_bytes,
            "saved cache entry"
        );
        Ok(true)
    }

    /// Restore `key` into `<workdir>/<key>`, replacing what is there.
    /// Returns `false` on a cache miss.
    #[instrument(skip(self))]
    pub async fn restore(&self, key: &str) -> Result<bool> {
        if !self.has(key).await? {
            debug!(key, "cache miss");
            return Ok(false);
        }

        let blob_dir = self.blob_dir(key);
        let target = self.workdir.join(key);
        let stats = run_blocking(move || blob::replace_tree(&blob_dir, &target)).await?;

        info!(key, files = stats.file_count, "restored cache entry");
        Ok(true)
    }

    /// Drop `key` from the cache. Returns whether anything was removed.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let blob_dir = self.blob_dir(key);
        let had_blob = blob_dir.is_dir();
        if had_blob {
            std::fs::remove_dir_all(&blob_dir).map_err(|e| OasPagesError::io(&blob_dir, e))?;
        }
        let had_row = self.index.remove_entry(key).await?;
        Ok(had_blob || had_row)
    }

    /// All indexed entries, ordered by key.
    pub async fn list(&self) -> Result<Vec<CacheEntry>> {
        self.index.list_entries().await
    }
}

/// Keys are workdir-relative paths that must stay inside both the workdir and the cache root.
fn validate_key(key: &str) -> Result<()> {
    let path = Path::new(key);
    let valid = !key.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if valid {
        Ok(())
    } else {
        Err(OasPagesError::validation(format!("invalid cache key '{key}'")))
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| OasPagesError::Cache(format!("cache worker panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        _tmp: tempfile::TempDir,
        workdir: PathBuf,
        cache: FsCache,
    }

    async fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let workdir = tmp.path().join("work");
        std::fs::create_dir_all(&workdir).unwrap();
        let cache = FsCache::open(&tmp.path().join("cache"), &workdir)
            .await
            .expect("open cache");
        Fixture {
            _tmp: tmp,
            workdir,
            cache,
        }
    }

    fn install_fake_tool(workdir: &Path) {
        let cli = workdir.join("redoc/cli");
        std::fs::create_dir_all(&cli).unwrap();
        std::fs::write(cli.join("index.js"), "// redoc").unwrap();
    }

    #[tokio::test]
    async fn save_then_restore_roundtrip() {
        let fx = fixture().await;
        install_fake_tool(&fx.workdir);

        assert!(!fx.cache.has("redoc").await.unwrap());
        assert!(fx.cache.save("redoc").await.unwrap());
        assert!(fx.cache.has("redoc").await.unwrap());

        std::fs::remove_dir_all(fx.workdir.join("redoc")).unwrap();
        assert!(fx.cache.restore("redoc").await.unwrap());
        assert_eq!(
            std::fs::read_to_string(fx.workdir.join("redoc/cli/index.js")).unwrap(),
            "// redoc"
        );
    }

    #[tokio::test]
    async fn saving_missing_directory_returns_false() {
        let fx = fixture().await;
        assert!(!fx.cache.save("redoc").await.unwrap());
        assert!(!fx.cache.has("redoc").await.unwrap());
    }

    #[tokio::test]
    async fn restore_miss_returns_false() {
        let fx = fixture().await;
        assert!(!fx.cache.restore("redoc").await.unwrap());
        assert!(!fx.workdir.join("redoc").exists());
    }

    #[tokio::test]
    async fn vanished_blob_is_not_a_hit() {
        let fx = fixture().await;
        install_fake_tool(&fx.workdir);
        fx.cache.save("redoc").await.unwrap();

        std::fs::remove_dir_all(fx.cache.root().join("entries/redoc")).unwrap();
        assert!(!fx.cache.has("redoc").await.unwrap());
        assert!(!fx.cache.restore("redoc").await.unwrap());
    }

    #[tokio::test]
    async fn remove_and_list() {
        let fx = fixture().await;
        install_fake_tool(&fx.workdir);
        fx.cache.save("redoc").await.unwrap();

        let entries = fx.cache.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "redoc");
        assert_eq!(entries[0].file_count, 1);

        assert!(fx.cache.remove("redoc").await.unwrap());
        assert!(!fx.cache.remove("redoc").await.unwrap());
        assert!(fx.cache.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_keys_outside_workdir() {
        let fx = fixture().await;
        for key in ["", "../redoc", "/abs", "a/../../b"] {
            assert!(fx.cache.has(key).await.is_err(), "key: {key:?}");
        }
        assert!(validate_key("tools/redoc").is_ok());
    }
}
