use crate::error::ClientError;
use reqwest::Url;
use std::env;
use std::time::Duration;

pub const BACKEND_URL_VAR: &str = "BACKEND_URL";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Indexing happens server-side during the upload call, so it gets a long budget.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the backend lives and how long each call may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    base_url: String,
    upload_timeout: Duration,
    query_timeout: Duration,
}

impl BackendConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');

        let parsed = Url::parse(trimmed).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        })
    }

    /// Reads `BACKEND_URL`, falling back to the local default.
    pub fn from_env() -> Result<Self, ClientError> {
        match env::var(BACKEND_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => Self::new(&url),
            _ => Self::new(DEFAULT_BACKEND_URL),
        }
    }

    pub fn with_timeouts(mut self, upload: Duration, query: Duration) -> Self {
        self.upload_timeout = upload;
        self.query_timeout = query;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
