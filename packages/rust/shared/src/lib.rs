//! Shared types, error model, and configuration for oaspages.
//!
//! This crate is the foundation depended on by all other oaspages crates.
//! It provides:
//! - [`OasPagesError`]: the unified error type
//! - Domain types ([`PageMetadata`], [`SourceType`], [`RedocOptions`])
//! - Configuration ([`AppConfig`], config loading)
//! - Path/URL normalization ([`normalize_path`], [`normalize_url`])

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, CONFIG_FILE_NAME, CacheConfig, RedocConfig, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{OasPagesError, Result};
pub use paths::{normalize_path, normalize_url};
pub use types::{
    ActiveVersion, LOCAL_SOURCE_TYPE, PageMetadata, RedocOptions, RedocVersionOptions, SourceType,
};
