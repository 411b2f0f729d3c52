use std::time::Duration;

use crate::decoder::DEFAULT_MAX_LINE_BYTES;
use crate::errors::StreamError;

/// Default location of the search service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Default path of the streaming search endpoint.
pub const DEFAULT_STREAM_PATH: &str = "/api/recommendations/frog/stream";

/// Configuration for the HTTP transport.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the search service.
    pub base_url: String,
    /// Path of the streaming search endpoint.
    pub stream_path: String,
    /// Longest the connection may stay silent, reset by every read. A job
    /// that keeps streaming progress is never cut off by it.
    pub read_timeout: Duration,
    /// Optional cap on the whole exchange, including the streamed body.
    pub total_timeout: Option<Duration>,
    /// Upper bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Longest line the frame decoder buffers.
    pub max_line_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            read_timeout: Duration::from_secs(120),
            total_timeout: None,
            connect_timeout: Duration::from_secs(10),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl ClientConfig {
    /// Creates a config pointing at `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Builds a config from the environment.
    ///
    /// - `ROUTE_STREAM_BASE_URL`: service base URL.
    /// - `ROUTE_STREAM_PATH`: streaming endpoint path.
    /// - `ROUTE_STREAM_TIMEOUT_SECS`: read (idle) timeout in seconds.
    /// - `ROUTE_STREAM_TOTAL_TIMEOUT_SECS`: optional whole-exchange cap in seconds.
    pub fn from_env() -> Result<Self, StreamError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StreamError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("ROUTE_STREAM_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(path) = lookup("ROUTE_STREAM_PATH").filter(|v| !v.trim().is_empty()) {
            config.stream_path = path.trim().to_string();
        }
        if let Some(timeout) = secs_var(&lookup, "ROUTE_STREAM_TIMEOUT_SECS")? {
            config.read_timeout = timeout;
        }
        if let Some(timeout) = secs_var(&lookup, "ROUTE_STREAM_TOTAL_TIMEOUT_SECS")? {
            config.total_timeout = Some(timeout);
        }
        config.validate()?;
        Ok(config)
    }

    /// Overrides the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the streaming endpoint path.
    pub fn stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = path.into();
        self
    }

    /// Overrides the read (idle) timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Caps the whole exchange.
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), StreamError> {
        if self.base_url.trim().is_empty() {
            return Err(StreamError::Config("base_url must not be empty".into()));
        }
        if self.read_timeout.is_zero() {
            return Err(StreamError::Config(
                "read_timeout must be greater than 0".into(),
            ));
        }
        if self.total_timeout.is_some_and(|t| t.is_zero()) {
            return Err(StreamError::Config(
                "total_timeout must be greater than 0".into(),
            ));
        }
        if self.max_line_bytes == 0 {
            return Err(StreamError::Config(
                "max_line_bytes must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn stream_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.stream_path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

fn secs_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, StreamError> {
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| StreamError::Config(format!("{key} is not a number: {raw}")))?;
    Ok(Some(Duration::from_secs(secs)))
}
