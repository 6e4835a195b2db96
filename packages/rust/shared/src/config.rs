//! Application configuration for oaspages.
//!
//! Project config lives at `<workdir>/oaspages.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{OasPagesError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "oaspages.toml";

/// Directory name under the user cache dir when `[cache] dir` is unset.
const CACHE_DIR_NAME: &str = "oaspages";

// ---------------------------------------------------------------------------
// Config structs (matching oaspages.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Redoc CLI install settings.
    #[serde(default)]
    pub redoc: RedocConfig,

    /// Build artifact locations.
    #[serde(default)]
    pub build: BuildConfig,

    /// Tool cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// `[redoc]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedocConfig {
    /// Pinned redoc CLI release; selects the `@dop/redoc-cli@<version>` branch.
    #[serde(default = "default_redoc_version")]
    pub version: String,

    /// Git repository the CLI is cloned from.
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Clone target directory, relative to the working directory.
    /// Also the key the installed CLI is cached under.
    #[serde(default = "default_install_dir")]
    pub install_dir: String,
}

impl Default for RedocConfig {
    fn default() -> Self {
        Self {
            version: default_redoc_version(),
            repository: default_repository(),
            install_dir: default_install_dir(),
        }
    }
}

impl RedocConfig {
    /// Source-control branch holding the pinned CLI release.
    pub fn branch(&self) -> String {
        format!("@dop/redoc-cli@{}", self.version)
    }
}

fn default_redoc_version() -> String {
    "1.2.3".into()
}
fn default_repository() -> String {
    "https://github.com/mongodb-forks/redoc.git".into()
}
fn default_install_dir() -> String {
    "redoc".into()
}

/// `[build]` section. All paths are relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Zip archive produced by the site build.
    #[serde(default = "default_bundle")]
    pub bundle: String,

    /// Directory the bundle is extracted into.
    #[serde(default = "default_bundle_dir")]
    pub bundle_dir: String,

    /// BSON metadata file inside the extracted bundle.
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// Root that rendered pages are written under.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Prefix joined to local spec sources.
    #[serde(default = "default_source_root")]
    pub source_root: String,

    /// Directory for per-page redoc options files.
    #[serde(default = "default_options_dir")]
    pub options_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            bundle: default_bundle(),
            bundle_dir: default_bundle_dir(),
            metadata_file: default_metadata_file(),
            output_dir: default_output_dir(),
            source_root: default_source_root(),
            options_dir: default_options_dir(),
        }
    }
}

fn default_bundle() -> String {
    "bundle.zip".into()
}
fn default_bundle_dir() -> String {
    "bundle".into()
}
fn default_metadata_file() -> String {
    "site.bson".into()
}
fn default_output_dir() -> String {
    "snooty/public".into()
}
fn default_source_root() -> String {
    "source".into()
}
fn default_options_dir() -> String {
    ".oaspages/options".into()
}

/// `[cache]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache root. Defaults to the user cache directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl CacheConfig {
    /// Resolve the cache root directory.
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.clone());
        }
        let base = dirs::cache_dir()
            .ok_or_else(|| OasPagesError::config("could not determine user cache directory"))?;
        Ok(base.join(CACHE_DIR_NAME))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path to the project config file inside `workdir`.
pub fn config_file_path(workdir: &Path) -> PathBuf {
    workdir.join(CONFIG_FILE_NAME)
}

/// Load the project config. Returns defaults if the file does not exist.
pub fn load_config(workdir: &Path) -> Result<AppConfig> {
    let path = config_file_path(workdir);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| OasPagesError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        OasPagesError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Write a default config file into `workdir`.
/// Returns the path to the created file.
pub fn init_config(workdir: &Path) -> Result<PathBuf> {
    let path = config_file_path(workdir);
    if path.exists() {
        return Err(OasPagesError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| OasPagesError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| OasPagesError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
