//! Core runtime configuration.
//!
//! Resolved once at process startup and then passed into the client and stores, so nothing
//! reads environment variables while a command is running.

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_STORAGE_DIR, STORAGE_FILENAME};
use crate::{CardioError, CardioResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    api_base_url: String,
    storage_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The base URL must be an `http://` or `https://` URL with a host; a trailing `/` is
    /// stripped so endpoint paths can be appended directly.
    pub fn new(api_base_url: impl Into<String>, storage_dir: PathBuf) -> CardioResult<Self> {
        let api_base_url = validate_api_base_url(&api_base_url.into())?;
        Ok(Self {
            api_base_url,
            storage_dir,
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn storage_file(&self) -> PathBuf {
        self.storage_dir.join(STORAGE_FILENAME)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

fn validate_api_base_url(raw: &str) -> CardioResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| {
            CardioError::InvalidInput(format!(
                "API base URL must start with http:// or https://, got '{raw}'"
            ))
        })?;

    if host.is_empty() || host.starts_with('/') {
        return Err(CardioError::InvalidInput(format!(
            "API base URL has no host: '{raw}'"
        )));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(CardioError::InvalidInput(
            "API base URL cannot contain whitespace".into(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Build a `CoreConfig` from optional raw environment values.
///
/// Empty or whitespace-only values fall back to the defaults.
pub fn core_config_from_env_values(
    api_base_url: Option<String>,
    storage_dir: Option<String>,
) -> CardioResult<CoreConfig> {
    fn non_blank(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    let api_base_url =
        non_blank(api_base_url).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let storage_dir = non_blank(storage_dir)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

    CoreConfig::new(api_base_url, storage_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_env_values_fall_back_to_defaults() {
        let cfg = core_config_from_env_values(Some("  ".into()), None).unwrap();
        assert_eq!(cfg.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(cfg.storage_dir(), Path::new(DEFAULT_STORAGE_DIR));
        assert_eq!(
            cfg.storage_file(),
            Path::new(DEFAULT_STORAGE_DIR).join(STORAGE_FILENAME)
        );
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let cfg = CoreConfig::new("https://api.example.org/", PathBuf::from("/tmp/x")).unwrap();
        assert_eq!(cfg.api_base_url(), "https://api.example.org");
    }

    #[test]
    fn rejects_non_http_urls() {
        for bad in ["ftp://host", "localhost:8000", "http://", "http:///path", "http://a b"] {
            assert!(
                CoreConfig::new(bad, PathBuf::from(".")).is_err(),
                "expected {bad:?} to be rejected"
            );
        }
    }
}
