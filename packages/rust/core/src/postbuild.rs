//! Post-build hook: render every OpenAPI page the site build declared.
//!
//! 1. Extract the bundle and decode its build metadata
//! 2. Build one redoc command per page, in document order
//! 3. Run each command, one at a time

use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};

use oaspages_bundle::decode_page;
use oaspages_shared::{OasPagesError, Result};

use crate::context::BuildContext;
use crate::host::BuildUtils;
use crate::render::{RenderRequest, page_command};

/// What a post-build run did.
#[derive(Debug, Default)]
pub struct PostBuildSummary {
    /// Pages declared in the build metadata.
    pub pages_total: usize,
    /// Pages whose render command ran.
    pub pages_rendered: usize,
    /// Slugs that could not be decoded or produced no command.
    pub skipped: Vec<String>,
    pub elapsed: Duration,
}

/// Progress callback for reporting post-build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a page is picked up.
    fn page_started(&self, slug: &str, current: usize, total: usize);
    /// Called right before an external command takes over the terminal.
    fn command_started(&self, command: &str);
    /// Called once that command has exited, successfully or not.
    fn command_finished(&self);
    /// Called when the hook completes.
    fn done(&self, summary: &PostBuildSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_started(&self, _slug: &str, _current: usize, _total: usize) {}
    fn command_started(&self, _command: &str) {}
    fn command_finished(&self) {}
    fn done(&self, _summary: &PostBuildSummary) {}
}

/// Run the post-build hook.
///
/// Bundle and metadata failures are fatal, as is a failing render command.
/// A page that cannot be decoded, or whose command cannot be built, is
/// logged and skipped.
#[instrument(skip_all, fields(workdir = %ctx.workdir.display()))]
pub async fn on_post_build(
    ctx: &BuildContext,
    site_url: &str,
    utils: BuildUtils<'_>,
    progress: &dyn ProgressReporter,
) -> Result<PostBuildSummary> {
    let start = Instant::now();
    info!("=== Running OpenAPI content build ===");

    progress.phase("Extracting build bundle");
    let metadata = oaspages_bundle::load_build_metadata(
        &ctx.bundle_zip(),
        &ctx.bundle_dir(),
        &ctx.config.build.metadata_file,
    )?;

    let Some(pages) = metadata.pages() else {
        info!("No OpenAPI pages found");
        let summary = PostBuildSummary {
            elapsed: start.elapsed(),
            ..PostBuildSummary::default()
        };
        progress.done(&summary);
        return Ok(summary);
    };

    let site_title = metadata.site_title();
    let total = pages.len();
    let mut summary = PostBuildSummary {
        pages_total: total,
        ..PostBuildSummary::default()
    };

    progress.phase("Rendering OpenAPI pages");
    for (i, (slug, entry)) in pages.iter().enumerate() {
        progress.page_started(slug, i + 1, total);

        let page = match decode_page(slug, entry) {
            Ok(page) => page,
            Err(e) => {
                error!(slug = %slug, error = %e, "malformed page metadata, skipping");
                summary.skipped.push(slug.clone());
                continue;
            }
        };

        let req = RenderRequest {
            slug,
            page: &page,
            site_url,
            site_title,
        };
        let command = page_command(ctx, &req);
        if command.is_empty() {
            warn!(slug = %slug, "no command for page, skipping");
            summary.skipped.push(slug.clone());
            continue;
        }

        progress.command_started(&command);
        let result = utils.run.run(&command, None).await;
        progress.command_finished();
        remove_options_file(ctx, slug);
        result?;
        summary.pages_rendered += 1;
    }

    summary.elapsed = start.elapsed();
    info!(
        rendered = summary.pages_rendered,
        skipped = summary.skipped.len(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "=== Finished OpenAPI content build ==="
    );
    progress.done(&summary);

    Ok(summary)
}

fn remove_options_file(ctx: &BuildContext, slug: &str) {
    let path = ctx.options_path(slug);
    if let Err(e) = std::fs::remove_file(&path) {
        let e = OasPagesError::io(&path, e);
        debug!(error = %e, "options file not removed");
    }
}
