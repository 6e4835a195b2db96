//! Per-page redoc command construction.
//!
//! For one OpenAPI page this validates the spec source, writes the page's
//! options document, and assembles the `node .../cli/index.js build ...`
//! command line. Failures are confined to the page: [`page_command`] turns
//! them into an empty command so the caller can move on.

use std::path::Path;

use tracing::{debug, error, warn};

use oaspages_shared::{
    ActiveVersion, OasPagesError, PageMetadata, RedocOptions, RedocVersionOptions, Result,
    SourceType, normalize_path, normalize_url,
};

use crate::context::BuildContext;

/// Inputs for rendering one page.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub slug: &'a str,
    pub page: &'a PageMetadata,
    pub site_url: &'a str,
    pub site_title: &'a str,
}

/// Build the redoc command for one page, writing its options file first.
///
/// Nothing is written unless the source type is supported and the slug is valid.
pub fn build_render_command(ctx: &BuildContext, req: &RenderRequest<'_>) -> Result<String> {
    let spec_path = match &req.page.source_type {
        SourceType::Local => local_spec_path(&ctx.config.build.source_root, &req.page.source),
        SourceType::Other(source_type) => {
            return Err(OasPagesError::UnsupportedSource {
                source_type: source_type.clone(),
                slug: req.slug.to_string(),
            });
        }
    };
    validate_slug(req.slug)?;

    let output_path = normalize_path(&format!(
        "{}/{}/index.html",
        ctx.output_root().display(),
        req.slug
    ));

    let options_path = ctx.options_path(req.slug);
    write_options(&options_path, &redoc_options(req))?;

    let entry = ctx.redoc_entry();
    let command = shell_words::join([
        "node",
        &entry.to_string_lossy(),
        "build",
        &spec_path,
        "--output",
        &output_path,
        "--options",
        &options_path.to_string_lossy(),
    ]);

    debug!(slug = req.slug, %command, "built redoc command");
    Ok(command)
}

/// Like [`build_render_command`], but logs a failure and returns an empty string.
pub fn page_command(ctx: &BuildContext, req: &RenderRequest<'_>) -> String {
    match build_render_command(ctx, req) {
        Ok(command) => command,
        Err(e) => {
            error!(slug = req.slug, error = %e, "cannot build redoc command for page");
            String::new()
        }
    }
}

/// Root and source are always separated, even when `source` has no leading `/`.
fn local_spec_path(source_root: &str, source: &str) -> String {
    normalize_path(&format!("{source_root}/{source}"))
}

/// Slugs become output sub-paths verbatim and must not climb out of the output root.
fn validate_slug(slug: &str) -> Result<()> {
    if slug.split('/').any(|segment| segment == "..") {
        return Err(OasPagesError::validation(format!(
            "page slug '{slug}' contains a '..' segment"
        )));
    }
    Ok(())
}

fn redoc_options(req: &RenderRequest<'_>) -> RedocOptions {
    let version_data = req.page.api_version.as_ref().map(|api_version| {
        let resource_versions = req.page.resource_versions.clone().unwrap_or_default();
        RedocVersionOptions {
            active: ActiveVersion {
                api_version: api_version.clone(),
                resource_version: resource_versions.last().cloned().unwrap_or_default(),
            },
            root_url: version_root_url(req.site_url, req.slug),
            resource_versions,
        }
    });

    RedocOptions {
        site_url: req.site_url.to_string(),
        site_title: req.site_title.to_string(),
        version_data,
    }
}

fn version_root_url(site_url: &str, slug: &str) -> String {
    if !site_url.is_empty() {
        match normalize_url(&format!("{site_url}/{slug}")) {
            Ok(url) => return url,
            Err(e) => warn!(site_url, error = %e, "site URL is not absolute, using a relative root URL"),
        }
    }
    normalize_path(&format!("/{slug}"))
}

fn write_options(path: &Path, options: &RedocOptions) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| OasPagesError::io(parent, e))?;
    }
    let json = serde_json::to_string(options)
        .map_err(|e| OasPagesError::validation(format!("cannot serialize redoc options: {e}")))?;
    std::fs::write(path, json).map_err(|e| OasPagesError::io(path, e))
}
