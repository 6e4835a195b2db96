//! Build bundle access: unpack `bundle.zip` and decode its `site.bson`.
//!
//! This crate provides:
//! - [`extract_bundle`]: zip extraction into a working directory
//! - [`decode_build_metadata`] / [`read_build_metadata`]: BSON decoding into [`BuildMetadata`]
//! - [`load_build_metadata`]: extraction and decoding chained, as the post-build hook needs them
//! - [`decode_page`]: one `openapi_pages` entry decoded on its own into a [`PageMetadata`](oaspages_shared::PageMetadata)

pub mod archive;
pub mod metadata;

use std::path::Path;

use oaspages_shared::Result;

pub use archive::extract_bundle;
pub use metadata::{BuildMetadata, RawPages, decode_build_metadata, decode_page, read_build_metadata};

/// Extract `bundle_zip` into `bundle_dir`, then decode `bundle_dir/metadata_file`.
///
/// Any failure here means the site build produced something unusable and is
/// returned to the caller as fatal.
pub fn load_build_metadata(
    bundle_zip: &Path,
    bundle_dir: &Path,
    metadata_file: &str,
) -> Result<BuildMetadata> {
    extract_bundle(bundle_zip, bundle_dir)?;
    read_build_metadata(&bundle_dir.join(metadata_file))
}
