//! Pre-build hook: make sure the redoc CLI is installed.

use tracing::{info, instrument, warn};

use oaspages_shared::{RedocConfig, Result};

use crate::context::BuildContext;
use crate::host::BuildUtils;

/// Installs the CLI's runtime dependencies; runs inside the clone.
pub const INSTALL_COMMAND: &str = "npm ci --prefix cli/ --omit=dev";

/// How the tool ended up on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreBuildOutcome {
    Restored,
    Installed,
}

/// Shallow clone of the pinned CLI branch into the install directory.
pub fn clone_command(redoc: &RedocConfig) -> String {
    shell_words::join([
        "git",
        "clone",
        "-b",
        &redoc.branch(),
        "--depth",
        "1",
        &redoc.repository,
        &redoc.install_dir,
    ])
}

/// Restore the redoc CLI from the tool cache, or clone, install, and cache it.
///
/// Any command failure is returned: later pages cannot render without the tool.
#[instrument(skip_all, fields(key = ctx.tool_cache_key()))]
pub async fn on_pre_build(ctx: &BuildContext, utils: BuildUtils<'_>) -> Result<PreBuildOutcome> {
    let key = ctx.tool_cache_key();

    if utils.cache.has(key).await? {
        if utils.cache.restore(key).await? {
            info!("restored redoc from cache");
            return Ok(PreBuildOutcome::Restored);
        }
        warn!("cached redoc could not be restored, reinstalling");
    }

    let redoc = &ctx.config.redoc;
    info!(version = %redoc.version, "installing redoc");

    utils.run.run(&clone_command(redoc), None).await?;
    utils
        .run
        .run(INSTALL_COMMAND, Some(&ctx.install_dir()))
        .await?;

    utils.cache.save(key).await?;
    info!("redoc installed and cached");
    Ok(PreBuildOutcome::Installed)
}
