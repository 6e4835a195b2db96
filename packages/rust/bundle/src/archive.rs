//! Build bundle extraction.

use std::fs::File;
use std::path::Path;

use tracing::{debug, info, instrument};
use zip::ZipArchive;

use oaspages_shared::{OasPagesError, Result};

/// Extract the zip archive at `archive_path` into `dest`.
///
/// Existing files are overwritten. Entries whose names would land outside
/// `dest` abort the extraction. Returns the number of files written.
#[instrument(skip_all, fields(archive = %archive_path.display(), dest = %dest.display()))]
pub fn extract_bundle(archive_path: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive_path).map_err(|e| {
        OasPagesError::Bundle(format!("cannot open {}: {e}", archive_path.display()))
    })?;
    let mut archive = ZipArchive::new(file).map_err(|e| {
        OasPagesError::Bundle(format!("{} is not a readable zip: {e}", archive_path.display()))
    })?;

    std::fs::create_dir_all(dest).map_err(|e| OasPagesError::io(dest, e))?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| OasPagesError::Bundle(format!("entry #{index}: {e}")))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(OasPagesError::Bundle(format!(
                "entry '{}' escapes the extraction directory",
                entry.name()
            )));
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| OasPagesError::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| OasPagesError::io(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| OasPagesError::io(&target, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| OasPagesError::io(&target, e))?;

        debug!(path = %target.display(), "extracted");
        written += 1;
    }

    info!(files = written, "bundle extracted");
    Ok(written)
}
