//! Resolved build paths: working directory + config.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use oaspages_shared::AppConfig;

/// Everything a hook needs to know about where it runs.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Build working directory; all configured paths are relative to it.
    pub workdir: PathBuf,
    pub config: AppConfig,
}

impl BuildContext {
    pub fn new(workdir: impl Into<PathBuf>, config: AppConfig) -> Self {
        Self {
            workdir: workdir.into(),
            config,
        }
    }

    /// Cache key of the installed redoc CLI.
    pub fn tool_cache_key(&self) -> &str {
        &self.config.redoc.install_dir
    }

    /// Where the redoc CLI is cloned.
    pub fn install_dir(&self) -> PathBuf {
        self.workdir.join(&self.config.redoc.install_dir)
    }

    /// The CLI's node entry point.
    pub fn redoc_entry(&self) -> PathBuf {
        self.install_dir().join("cli").join("index.js")
    }

    pub fn bundle_zip(&self) -> PathBuf {
        self.workdir.join(&self.config.build.bundle)
    }

    pub fn bundle_dir(&self) -> PathBuf {
        self.workdir.join(&self.config.build.bundle_dir)
    }

    /// Root rendered pages are written under.
    pub fn output_root(&self) -> PathBuf {
        self.workdir.join(&self.config.build.output_dir)
    }

    /// Options file for one page. Distinct slugs get distinct files, so
    /// no two pages ever share an options document.
    pub fn options_path(&self, slug: &str) -> PathBuf {
        let digest = format!("{:x}", Sha256::digest(slug.as_bytes()));
        self.workdir
            .join(&self.config.build.options_dir)
            .join(format!("{}.json", &digest[..16]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> BuildContext {
        BuildContext::new("/site", AppConfig::default())
    }

    #[test]
    fn default_layout() {
        let ctx = ctx();
        assert_eq!(ctx.tool_cache_key(), "redoc");
        assert_eq!(ctx.redoc_entry(), PathBuf::from("/site/redoc/cli/index.js"));
        assert_eq!(ctx.bundle_zip(), PathBuf::from("/site/bundle.zip"));
        assert_eq!(ctx.bundle_dir(), PathBuf::from("/site/bundle"));
        assert_eq!(ctx.output_root(), PathBuf::from("/site/snooty/public"));
    }

    #[test]
    fn options_paths_are_per_slug_and_stable() {
        let ctx = ctx();
        let a = ctx.options_path("api-ref");
        assert_eq!(a, ctx.options_path("api-ref"));
        assert_ne!(a, ctx.options_path("admin/api"));
        assert!(a.starts_with("/site/.oaspages/options"));
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("json"));
    }
}
