//! Core data models for the webguard scanner

use chrono::{DateTime, Local};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Severity level for security findings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    High,
    Medium,
    Low,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "High"),
            Severity::Medium => write!(f, "Medium"),
            Severity::Low => write!(f, "Low"),
            Severity::Info => write!(f, "Info"),
        }
    }
}

impl Severity {
    /// Parses a severity name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }

    /// Returns the color name for terminal output
    pub fn color(&self) -> &str {
        match self {
            Severity::High => "bright red",
            Severity::Medium => "yellow",
            Severity::Low => "blue",
            Severity::Info => "white",
        }
    }
}

/// A security finding discovered during scanning.
///
/// Field names are the columns persisted by API consumers, so `vuln_type`
/// serializes as `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub name: String,
    /// Slug derived from `name`
    #[serde(rename = "type")]
    pub vuln_type: String,
    pub description: String,
    pub severity: Severity,
    /// Page the finding was observed on
    pub url: String,
    /// Header group, form, field, or cookie name involved
    pub parameter: String,
    pub evidence: String,
    pub mitigation: String,
}

impl Finding {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        url: impl Into<String>,
    ) -> Self {
        let name: String = name.into();
        Self {
            vuln_type: slugify(&name),
            name,
            description: description.into(),
            severity,
            url: url.into(),
            parameter: String::new(),
            evidence: String::new(),
            mitigation: String::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = parameter.into();
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    pub fn with_mitigation(mut self, mitigation: impl Into<String>) -> Self {
        self.mitigation = mitigation.into();
        self
    }
}

/// "Potential SQL Injection" -> "potential_sql_injection"
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// A single input-like element inside a form (`input`, `textarea`, `select`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputField {
    /// Empty when the element has no `name` attribute
    pub name: String,
    /// Defaults to "text" when the element has no `type` attribute
    pub input_type: String,
    pub value: String,
}

/// A form discovered on a crawled page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Form {
    /// Final URL of the page the form was found on
    pub source_url: String,
    /// Raw `action` attribute, possibly relative or empty
    pub action: String,
    /// Raw `method` attribute, "get" when absent
    pub method: String,
    pub inputs: Vec<InputField>,
}

impl Form {
    pub fn is_post(&self) -> bool {
        self.method.eq_ignore_ascii_case("post")
    }
}

/// Cookie attributes parsed from one `Set-Cookie` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub flags: CookieFlags,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CookieFlags {
    pub secure: bool,
    pub http_only: bool,
}

/// Session cookies keyed by name. Later responses overwrite earlier ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CookieJar {
    cookies: BTreeMap<String, CookieFlags>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, flags: CookieFlags) {
        self.cookies.insert(name.into(), flags);
    }

    /// Merges the cookies set by one response
    pub fn absorb(&mut self, set_cookies: &[SetCookie]) {
        for cookie in set_cookies {
            self.cookies.insert(cookie.name.clone(), cookie.flags);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CookieFlags> {
        self.cookies.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CookieFlags)> {
        self.cookies.iter().map(|(name, flags)| (name.as_str(), flags))
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// A fetched HTTP response, reduced to what the crawler and checks need
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub status: StatusCode,
    /// Case-insensitive header map
    pub headers: HeaderMap,
    pub cookies: Vec<SetCookie>,
    pub body: String,
}

impl FetchedPage {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Header names in response order, deduplicated
    pub fn header_names(&self) -> Vec<String> {
        self.headers.keys().map(|k| k.as_str().to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Completed,
    Failed,
}

/// Terminal output of one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: String,
    pub status: ScanStatus,
    pub summary: String,
    pub vulnerabilities: Vec<Finding>,
    pub scan_date: DateTime<Local>,
    pub target_url: String,
    /// Wall-clock duration, only recorded for completed scans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_secs: Option<f64>,
    #[serde(default)]
    pub pages_crawled: usize,
    #[serde(default)]
    pub total_requests: u64,
}

impl ScanReport {
    pub fn completed(
        target_url: impl Into<String>,
        vulnerabilities: Vec<Finding>,
        elapsed_secs: f64,
    ) -> Self {
        let summary = format!(
            "Scan completed in {elapsed_secs:.2} seconds. Found {} potential vulnerabilities.",
            vulnerabilities.len()
        );
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            status: ScanStatus::Completed,
            summary,
            vulnerabilities,
            scan_date: Local::now(),
            target_url: target_url.into(),
            elapsed_secs: Some(elapsed_secs),
            pages_crawled: 0,
            total_requests: 0,
        }
    }

    pub fn failed(target_url: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            status: ScanStatus::Failed,
            summary: format!("Scan failed: {error}"),
            vulnerabilities: Vec::new(),
            scan_date: Local::now(),
            target_url: target_url.into(),
            elapsed_secs: None,
            pages_crawled: 0,
            total_requests: 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ScanStatus::Failed
    }

    /// Returns count of findings by severity
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}

/// Configuration for a scan session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Target URL to scan; also the same-origin prefix for the crawl
    pub target: String,
    pub user_agent: String,
    /// Timeout for the initial fetch of the target
    pub root_timeout_secs: u64,
    /// Timeout for each fetch made while crawling
    pub crawl_timeout_secs: u64,
    /// Maximum number of distinct URLs visited
    pub max_pages: usize,
    /// Maximum simultaneous crawl fetches
    pub concurrency: usize,
    pub follow_redirects: bool,
    /// Names of the checks to run
    pub checks: Vec<String>,
    /// Extra request headers sent with every fetch
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

impl ScanConfig {
    /// Default configuration aimed at `target`
    pub fn for_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            root_timeout_secs: 10,
            crawl_timeout_secs: 5,
            max_pages: 10,
            concurrency: 5,
            follow_redirects: true,
            checks: vec![
                "headers".to_string(),
                "csrf".to_string(),
                "injection".to_string(),
                "cookies".to_string(),
            ],
            headers: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_type_is_slug_of_name() {
        let finding = Finding::new("Potential SQL Injection", "d", Severity::High, "http://x");
        assert_eq!(finding.vuln_type, "potential_sql_injection");

        let json = serde_json::to_value(&finding).expect("serialize");
        assert_eq!(json["type"], "potential_sql_injection");
        assert_eq!(json["severity"], "High");
        assert!(json.get("mitigation").is_some());
    }

    #[test]
    fn test_summary_format() {
        let findings = vec![
            Finding::new("A", "", Severity::Medium, "u"),
            Finding::new("B", "", Severity::High, "u"),
        ];
        let report = ScanReport::completed("http://example.com", findings, 1.234);
        assert_eq!(
            report.summary,
            "Scan completed in 1.23 seconds. Found 2 potential vulnerabilities."
        );
        assert_eq!(report.count_by_severity(Severity::High), 1);
        assert!(!report.is_failed());
    }

    #[test]
    fn test_failed_report_is_empty() {
        let report = ScanReport::failed("http://example.com", "connection refused");
        assert!(report.summary.starts_with("Scan failed:"));
        assert!(report.vulnerabilities.is_empty());
        assert!(report.elapsed_secs.is_none());
        assert!(report.is_failed());
    }

    #[test]
    fn test_cookie_jar_last_write_wins() {
        let mut jar = CookieJar::new();
        jar.insert("session", CookieFlags::default());
        jar.absorb(&[SetCookie {
            name: "session".to_string(),
            flags: CookieFlags {
                secure: true,
                http_only: true,
            },
        }]);
        assert_eq!(jar.len(), 1);
        assert!(jar.get("session").is_some_and(|f| f.secure && f.http_only));
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("MEDIUM"), Some(Severity::Medium));
        assert_eq!(Severity::parse("critical"), None);
    }
}
