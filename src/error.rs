//! Error types for the webguard scanner

use std::fmt;
use thiserror::Error;

/// Why a single fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    Timeout,
    /// Connection refused, DNS resolution failure, host unreachable
    Connect,
    Tls,
    Redirect,
    /// The response arrived but its body could not be read
    Body,
    Request,
}

impl FetchFailure {
    /// Classifies a reqwest error into a fetch failure tag
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return FetchFailure::Timeout;
        }
        if err.is_redirect() {
            return FetchFailure::Redirect;
        }
        if err.is_body() || err.is_decode() {
            return FetchFailure::Body;
        }
        if mentions_tls(err) {
            return FetchFailure::Tls;
        }
        if err.is_connect() {
            return FetchFailure::Connect;
        }
        FetchFailure::Request
    }
}

/// reqwest does not expose TLS failures as a kind, so walk the source chain.
/// The top-level message embeds the URL and is skipped.
fn mentions_tls(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(e) = source {
        let text = e.to_string().to_lowercase();
        if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
            return true;
        }
        source = e.source();
    }
    false
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Timeout => write!(f, "timeout"),
            FetchFailure::Connect => write!(f, "connection error"),
            FetchFailure::Tls => write!(f, "TLS error"),
            FetchFailure::Redirect => write!(f, "redirect error"),
            FetchFailure::Body => write!(f, "body read error"),
            FetchFailure::Request => write!(f, "request error"),
        }
    }
}

/// Main error type for webguard operations
#[derive(Debug, Error)]
pub enum WebguardError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to fetch {url} ({cause}): {detail}")]
    FetchError {
        url: String,
        cause: FetchFailure,
        detail: String,
    },

    #[error("Scanner error: {0}")]
    ScanError(String),
}

impl WebguardError {
    /// Builds a fetch error from a reqwest failure on `url`
    pub fn fetch(url: &str, err: reqwest::Error) -> Self {
        WebguardError::FetchError {
            url: url.to_string(),
            cause: FetchFailure::classify(&err),
            detail: err.to_string(),
        }
    }

    /// Returns the fetch cause tag, if this is a fetch error
    pub fn fetch_failure(&self) -> Option<FetchFailure> {
        match self {
            WebguardError::FetchError { cause, .. } => Some(*cause),
            _ => None,
        }
    }
}

/// Result type alias for webguard operations
pub type Result<T> = std::result::Result<T, WebguardError>;
