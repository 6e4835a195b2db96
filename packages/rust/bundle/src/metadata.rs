//! `site.bson` decoding.
//!
//! The document is decoded in two steps. [`decode_build_metadata`] reads the
//! title and keeps each `openapi_pages` entry as raw BSON; [`decode_page`]
//! turns one entry into a [`PageMetadata`]. A malformed page therefore fails
//! only itself.

use std::path::Path;

use bson::Bson;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

use oaspages_shared::{OasPagesError, PageMetadata, Result};

/// Slug → undecoded page entry, in document order.
pub type RawPages = IndexMap<String, Bson>;

/// The subset of `site.bson` this tool reads. Other keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub openapi_pages: Option<RawPages>,
}

impl BuildMetadata {
    /// Site title, or empty when the document has none.
    pub fn site_title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Pages to render. `None` when the key is absent or the mapping is empty.
    pub fn pages(&self) -> Option<&RawPages> {
        self.openapi_pages.as_ref().filter(|pages| !pages.is_empty())
    }
}

/// Decode a BSON build metadata document.
pub fn decode_build_metadata(bytes: &[u8]) -> Result<BuildMetadata> {
    let metadata: BuildMetadata =
        bson::from_slice(bytes).map_err(|e| OasPagesError::Decode(e.to_string()))?;

    if metadata.title.is_none() {
        warn!("build metadata has no title, using an empty site title");
    }
    debug!(
        pages = metadata.openapi_pages.as_ref().map_or(0, |p| p.len()),
        "decoded build metadata"
    );

    Ok(metadata)
}

/// Decode one `openapi_pages` entry.
pub fn decode_page(slug: &str, entry: &Bson) -> Result<PageMetadata> {
    bson::from_bson(entry.clone())
        .map_err(|e| OasPagesError::Decode(format!("page '{slug}': {e}")))
}

/// Read and decode the BSON build metadata file at `path`.
pub fn read_build_metadata(path: &Path) -> Result<BuildMetadata> {
    let bytes = std::fs::read(path).map_err(|e| OasPagesError::io(path, e))?;
    decode_build_metadata(&bytes)
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;
    use oaspages_shared::SourceType;

    fn encode(document: &bson::Document) -> Vec<u8> {
        let mut buf = Vec::new();
        document.to_writer(&mut buf).unwrap();
        buf
    }

    #[test]
    fn decodes_title_and_pages_in_document_order() {
        let bytes = encode(&doc! {
            "title": "Atlas Admin API",
            "project": "cloud-docs",
            "openapi_pages": {
                "zeta": { "source_type": "local", "source": "/z.yaml" },
                "alpha": {
                    "source_type": "url",
                    "source": "https://example.com/a.yaml",
                    "api_version": "2.0",
                    "resource_versions": ["2023-01-01", "2024-05-30"],
                },
            },
        });

        let meta = decode_build_metadata(&bytes).expect("decode");
        assert_eq!(meta.site_title(), "Atlas Admin API");

        let pages = meta.pages().expect("pages present");
        let slugs: Vec<&str> = pages.keys().map(String::as_str).collect();
        assert_eq!(slugs, ["zeta", "alpha"]);

        let zeta = decode_page("zeta", &pages["zeta"]).expect("zeta");
        assert_eq!(zeta.source_type, SourceType::Local);
        let alpha = decode_page("alpha", &pages["alpha"]).expect("alpha");
        assert_eq!(alpha.source_type, SourceType::Other("url".into()));
        assert_eq!(alpha.api_version.as_deref(), Some("2.0"));
        assert_eq!(alpha.resource_versions.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn missing_openapi_pages_is_not_an_error() {
        let bytes = encode(&doc! { "title": "Docs" });
        let meta = decode_build_metadata(&bytes).expect("decode");
        assert!(meta.openapi_pages.is_none());
        assert!(meta.pages().is_none());
    }

    #[test]
    fn missing_title_decodes_as_empty() {
        let bytes = encode(&doc! { "openapi_pages": {} });
        let meta = decode_build_metadata(&bytes).expect("decode");
        assert_eq!(meta.site_title(), "");
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = decode_build_metadata(b"\x01\x02\x03").unwrap_err();
        assert!(matches!(err, OasPagesError::Decode(_)));
    }

    #[test]
    fn malformed_page_fails_alone() {
        let bytes = encode(&doc! {
            "title": "Docs",
            "openapi_pages": {
                "good": { "source_type": "local", "source": "/good.yaml" },
                "no-source": { "source_type": "local" },
                "int-version": { "source_type": "local", "source": "/a.yaml", "api_version": 2 },
                "bad-versions": {
                    "source_type": "local",
                    "source": "/b.yaml",
                    "api_version": "2.0",
                    "resource_versions": ["2024-01-01", 7],
                },
                "not-a-doc": 5,
            },
        });
        let meta = decode_build_metadata(&bytes).expect("document still decodes");
        let pages = meta.pages().expect("pages present");
        assert_eq!(pages.len(), 5);

        assert!(decode_page("good", &pages["good"]).is_ok());
        for slug in ["no-source", "int-version", "bad-versions", "not-a-doc"] {
            let err = decode_page(slug, &pages[slug]).unwrap_err();
            assert!(matches!(err, OasPagesError::Decode(_)), "{slug}: {err}");
            assert!(err.to_string().contains(slug), "{slug}: {err}");
        }
    }

    #[test]
    fn empty_pages_mapping_is_absent() {
        let bytes = encode(&doc! { "title": "Docs", "openapi_pages": {} });
        let meta = decode_build_metadata(&bytes).expect("decode");
        assert!(meta.pages().is_none());
        assert_eq!(BuildMetadata::default().site_title(), "");
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_build_metadata(&tmp.path().join("site.bson")).unwrap_err();
        assert!(matches!(err, OasPagesError::Io { .. }));
    }
}
