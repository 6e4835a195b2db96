//! Capabilities the build host hands to each lifecycle hook.
//!
//! Hooks depend only on [`CommandRunner`] and [`ToolCache`]. The CLI wires in
//! [`ShellRunner`] and [`oaspages_cache::FsCache`]; tests wire in in-memory fakes.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use oaspages_cache::FsCache;
use oaspages_shared::{OasPagesError, Result};

/// Runs one shell command line to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command`, in `cwd` if given, else in the build working directory.
    /// A non-zero exit is an error.
    async fn run(&self, command: &str, cwd: Option<&Path>) -> Result<()>;
}

/// Named directory cache persisted across builds.
#[async_trait]
pub trait ToolCache: Send + Sync {
    async fn has(&self, key: &str) -> Result<bool>;
    /// Returns `false` if there was nothing to save.
    async fn save(&self, key: &str) -> Result<bool>;
    /// Returns `false` on a miss.
    async fn restore(&self, key: &str) -> Result<bool>;
}

/// The utilities passed into every hook.
#[derive(Clone, Copy)]
pub struct BuildUtils<'a> {
    pub run: &'a dyn CommandRunner,
    pub cache: &'a dyn ToolCache,
}

// ---------------------------------------------------------------------------
// ShellRunner
// ---------------------------------------------------------------------------

/// Runs commands through `sh -c`, streaming their output to ours.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    workdir: PathBuf,
}

impl ShellRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, cwd: Option<&Path>) -> Result<()> {
        let dir = cwd.unwrap_or(&self.workdir);
        info!(command, cwd = %dir.display(), "running command");

        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(dir)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| OasPagesError::command(command, format!("failed to spawn: {e}")))?;

        if status.success() {
            debug!(command, "command succeeded");
            Ok(())
        } else {
            Err(OasPagesError::command(command, format!("exited with {status}")))
        }
    }
}

// ---------------------------------------------------------------------------
// FsCache adapter
// ---------------------------------------------------------------------------

#[async_trait]
impl ToolCache for FsCache {
    async fn has(&self, key: &str) -> Result<bool> {
        FsCache::has(self, key).await
    }

    async fn save(&self, key: &str) -> Result<bool> {
        FsCache::save(self, key).await
    }

    async fn restore(&self, key: &str) -> Result<bool> {
        FsCache::restore(self, key).await
    }
}
