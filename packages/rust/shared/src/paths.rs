//! Path and URL normalization shared by the command builder and options writer.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{OasPagesError, Result};

static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("/+").expect("static regex compiles"));

/// Collapse every run of consecutive `/` into a single `/`.
///
/// Idempotent: `normalize_path(&normalize_path(p)) == normalize_path(p)`.
pub fn normalize_path(path: &str) -> String {
    REPEATED_SLASHES.replace_all(path, "/").into_owned()
}

/// Normalize only the path component of an absolute URL.
///
/// Scheme, host, port, query and fragment are left as the URL parser
/// serializes them.
pub fn normalize_url(url: &str) -> Result<String> {
    let mut parsed =
        Url::parse(url).map_err(|e| OasPagesError::validation(format!("invalid URL '{url}': {e}")))?;
    let path = normalize_path(parsed.path());
    parsed.set_path(&path);
    Ok(parsed.into())
}
