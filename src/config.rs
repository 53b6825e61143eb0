//! Configuration management for the webguard scanner

use crate::error::{Result, WebguardError};
use crate::models::ScanConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// File-based configuration structure matching config/default.toml
#[derive(Debug, Deserialize)]
struct FileConfig {
    scan: Option<ScanSection>,
    checks: Option<ChecksSection>,
}

#[derive(Debug, Deserialize)]
struct ScanSection {
    user_agent: Option<String>,
    root_timeout_secs: Option<u64>,
    crawl_timeout_secs: Option<u64>,
    max_pages: Option<usize>,
    concurrency: Option<usize>,
    follow_redirects: Option<bool>,
    headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ChecksSection {
    enabled: Option<Vec<String>>,
}

/// Loads configuration from a TOML file and merges with defaults
pub fn load_config(path: &Path) -> Result<ScanConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses TOML configuration text and merges it over the defaults
pub fn parse_config(content: &str) -> Result<ScanConfig> {
    let file_config: FileConfig = toml::from_str(content)?;
    let mut config = ScanConfig::default();

    if let Some(scan) = file_config.scan {
        if let Some(ua) = scan.user_agent {
            config.user_agent = ua;
        }
        if let Some(timeout) = scan.root_timeout_secs {
            config.root_timeout_secs = timeout;
        }
        if let Some(timeout) = scan.crawl_timeout_secs {
            config.crawl_timeout_secs = timeout;
        }
        if let Some(pages) = scan.max_pages {
            config.max_pages = pages;
        }
        if let Some(concurrency) = scan.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(follow) = scan.follow_redirects {
            config.follow_redirects = follow;
        }
        if let Some(headers) = scan.headers {
            config.headers.extend(headers);
        }
    }

    if let Some(checks) = file_config.checks {
        if let Some(enabled) = checks.enabled {
            config.checks = enabled;
        }
    }

    Ok(config)
}

/// Merges CLI arguments into an existing ScanConfig
#[allow(clippy::too_many_arguments)]
pub fn merge_cli_args(
    config: &mut ScanConfig,
    target: String,
    max_pages: Option<usize>,
    concurrency: Option<usize>,
    timeout: Option<u64>,
    crawl_timeout: Option<u64>,
    checks: Option<Vec<String>>,
    headers: Option<Vec<String>>,
) {
    config.target = target;

    if let Some(p) = max_pages {
        config.max_pages = p;
    }
    if let Some(c) = concurrency {
        config.concurrency = c;
    }
    if let Some(t) = timeout {
        config.root_timeout_secs = t;
    }
    if let Some(t) = crawl_timeout {
        config.crawl_timeout_secs = t;
    }
    if let Some(c) = checks {
        config.checks = c;
    }
    if let Some(h) = headers {
        for header in h {
            if let Some((key, value)) = header.split_once(':') {
                config
                    .headers
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }
}

/// Rejects configurations a scan cannot run with
pub fn validate(config: &ScanConfig) -> Result<()> {
    url::Url::parse(&config.target)?;
    if config.max_pages == 0 {
        return Err(WebguardError::ConfigError(
            "max_pages must be at least 1".to_string(),
        ));
    }
    if config.concurrency == 0 {
        return Err(WebguardError::ConfigError(
            "concurrency must be at least 1".to_string(),
        ));
    }
    Ok(())
}
