//! Core domain types: page metadata and the redoc options document.

use serde::{Deserialize, Serialize};

/// The `source_type` value the site generator uses for specs checked into the repo.
pub const LOCAL_SOURCE_TYPE: &str = "local";

// ---------------------------------------------------------------------------
// SourceType
// ---------------------------------------------------------------------------

/// Where a page's OpenAPI spec lives.
///
/// Only [`SourceType::Local`] can be rendered today. Every other string the
/// site generator may emit is preserved in [`SourceType::Other`] so it can be
/// reported back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceType {
    /// A spec file inside the site's source tree.
    Local,
    /// Any other declared source (URL, atlas, ...).
    Other(String),
}

impl SourceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local => LOCAL_SOURCE_TYPE,
            Self::Other(s) => s,
        }
    }
}

impl From<String> for SourceType {
    fn from(value: String) -> Self {
        if value == LOCAL_SOURCE_TYPE {
            Self::Local
        } else {
            Self::Other(value)
        }
    }
}

impl From<&str> for SourceType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<SourceType> for String {
    fn from(value: SourceType) -> Self {
        match value {
            SourceType::Local => LOCAL_SOURCE_TYPE.to_string(),
            SourceType::Other(s) => s,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Page metadata
// ---------------------------------------------------------------------------

/// Metadata for one OpenAPI page, keyed by slug in the build metadata's `openapi_pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub source_type: SourceType,
    /// Spec location; for local sources, a path relative to the source root.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_versions: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Redoc options document
// ---------------------------------------------------------------------------

/// JSON options handed to the redoc CLI via `--options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedocOptions {
    pub site_url: String,
    pub site_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_data: Option<RedocVersionOptions>,
}

/// Version switcher data for versioned API pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedocVersionOptions {
    pub active: ActiveVersion,
    pub root_url: String,
    pub resource_versions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveVersion {
    pub api_version: String,
    pub resource_version: String,
}
