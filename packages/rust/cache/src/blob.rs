//! Directory blob copying and fingerprinting.

use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use oaspages_shared::{OasPagesError, Result};

/// What a copy wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TreeStats {
    pub file_count: u64,
    pub size_bytes: u64,
    pub digest: String,
}

/// Replace `dst` with a recursive copy of `src`.
///
/// Symlinks are recreated as symlinks (unix) rather than followed. The digest
/// covers every relative path in walk order plus each regular file's bytes,
/// so identical trees hash identically regardless of location.
pub(crate) fn replace_tree(src: &Path, dst: &Path) -> Result<TreeStats> {
    if dst.exists() {
        std::fs::remove_dir_all(dst).map_err(|e| OasPagesError::io(dst, e))?;
    }
    std::fs::create_dir_all(dst).map_err(|e| OasPagesError::io(dst, e))?;

    let mut hasher = Sha256::new();
    let mut stats = TreeStats {
        file_count: 0,
        size_bytes: 0,
        digest: String::new(),
    };

    for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| OasPagesError::Cache(format!("walk {}: {e}", src.display())))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| OasPagesError::Cache(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = dst.join(relative);
        hasher.update(relative.to_string_lossy().as_bytes());

        let file_type = entry.file_type();
        if file_type.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| OasPagesError::io(&target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            let bytes = std::fs::read(entry.path()).map_err(|e| OasPagesError::io(entry.path(), e))?;
            std::fs::write(&target, &bytes).map_err(|e| OasPagesError::io(&target, e))?;
            let permissions = entry
                .metadata()
                .map_err(|e| OasPagesError::Cache(e.to_string()))?
                .permissions();
            std::fs::set_permissions(&target, permissions)
                .map_err(|e| OasPagesError::io(&target, e))?;

            hasher.update(&bytes);
            stats.file_count += 1;
            stats.size_bytes += bytes.len() as u64;
        }
    }

    stats.digest = format!("{:x}", hasher.finalize());
    Ok(stats)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link = std::fs::read_link(src).map_err(|e| OasPagesError::io(src, e))?;
    std::os::unix::fs::symlink(&link, dst).map_err(|e| OasPagesError::io(dst, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dst: &Path) -> Result<()> {
    tracing::warn!(path = %src.display(), "skipping symlink, not supported on this platform");
    Ok(())
}
