//! Rule engine, check trait, and scan orchestration

pub mod cookies;
pub mod csrf;
pub mod headers;
pub mod injection;

use crate::config;
use crate::crawler::Crawler;
use crate::error::WebguardError;
use crate::http::HttpClient;
use crate::models::{CookieJar, FetchedPage, Finding, Form, ScanConfig, ScanReport};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// When a check runs relative to the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Needs only the target's first response
    InitialResponse,
    /// Needs the forms and cookies collected by the crawl
    PostCrawl,
}

/// Crawl artifacts a check may inspect
#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    pub target: &'a str,
    pub initial: &'a FetchedPage,
    pub forms: &'a [Form],
    pub cookies: &'a CookieJar,
}

/// Trait that all checks must implement. Checks are pure: they read the
/// artifacts and return their own findings.
pub trait Check: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn stage(&self) -> Stage;

    fn evaluate(&self, input: &CheckInput<'_>) -> Vec<Finding>;
}

/// Ordered registry of checks
pub struct RuleEngine {
    checks: Vec<Arc<dyn Check>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Headers, CSRF, injection, cookies; findings concatenate in this order
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.register(Arc::new(headers::HeaderCheck));
        engine.register(Arc::new(csrf::FormCsrfCheck));
        engine.register(Arc::new(injection::FormInjectionCheck));
        engine.register(Arc::new(cookies::CookieFlagsCheck));
        engine
    }

    pub fn register(&mut self, check: Arc<dyn Check>) {
        self.checks.push(check);
    }

    /// Returns name and description of every registered check
    pub fn list_checks(&self) -> Vec<(&str, &str)> {
        self.checks
            .iter()
            .map(|c| (c.name(), c.description()))
            .collect()
    }

    /// Runs the enabled checks of one stage in registration order
    pub fn run(&self, stage: Stage, enabled: &[String], input: &CheckInput<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for check in self
            .checks
            .iter()
            .filter(|c| c.stage() == stage)
            .filter(|c| enabled.iter().any(|name| name == c.name()))
        {
            let found = check.evaluate(input);
            info!("Check '{}' completed: {} findings", check.name(), found.len());
            findings.extend(found);
        }
        findings
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Drives fetch, crawl, and checks, and always produces a report
pub struct ScanEngine {
    rules: RuleEngine,
}

struct Analysis {
    findings: Vec<Finding>,
    pages_crawled: usize,
}

impl ScanEngine {
    pub fn new(rules: RuleEngine) -> Self {
        Self { rules }
    }

    pub fn with_defaults() -> Self {
        Self::new(RuleEngine::with_defaults())
    }

    pub fn list_checks(&self) -> Vec<(&str, &str)> {
        self.rules.list_checks()
    }

    /// Runs a full scan. Every failure, including a panic inside the crawl or
    /// a check, becomes a failed report rather than an error.
    pub async fn run_scan(&self, config: &ScanConfig) -> ScanReport {
        let started = Instant::now();
        info!("Starting security scan of {}", config.target);

        if let Err(e) = config::validate(config) {
            error!("Scan failed: {e}");
            return ScanReport::failed(&config.target, e);
        }

        let client = match HttpClient::from_config(config) {
            Ok(c) => c,
            Err(e) => {
                error!("Scan failed: {e}");
                return ScanReport::failed(&config.target, e);
            }
        };

        let initial = match client.fetch_root(&config.target).await {
            Ok(page) => page,
            Err(e) => {
                error!("Scan failed: {e}");
                return ScanReport::failed(&config.target, e);
            }
        };

        let analysis = AssertUnwindSafe(self.analyze(&client, config, &initial))
            .catch_unwind()
            .await;

        match analysis {
            Ok(analysis) => {
                let mut report = ScanReport::completed(
                    &config.target,
                    analysis.findings,
                    started.elapsed().as_secs_f64(),
                );
                report.pages_crawled = analysis.pages_crawled;
                report.total_requests = client.request_count();
                info!("{}", report.summary);
                report
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Scan failed: {message}");
                ScanReport::failed(&config.target, WebguardError::ScanError(message))
            }
        }
    }

    /// Synchronous entry point. Safe to call from inside a tokio runtime: the
    /// scan is then driven by a fresh runtime on a scoped thread, since
    /// `block_on` panics on a runtime thread.
    pub fn run_scan_blocking(&self, config: &ScanConfig) -> ScanReport {
        if tokio::runtime::Handle::try_current().is_err() {
            return self.block_on_scan(config);
        }
        std::thread::scope(|s| match s.spawn(|| self.block_on_scan(config)).join() {
            Ok(report) => report,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Scan failed: {message}");
                ScanReport::failed(&config.target, WebguardError::ScanError(message))
            }
        })
    }

    fn block_on_scan(&self, config: &ScanConfig) -> ScanReport {
        match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(self.run_scan(config)),
            Err(e) => ScanReport::failed(&config.target, WebguardError::IoError(e)),
        }
    }

    async fn analyze(
        &self,
        client: &HttpClient,
        config: &ScanConfig,
        initial: &FetchedPage,
    ) -> Analysis {
        let mut initial_jar = CookieJar::new();
        initial_jar.absorb(&initial.cookies);
        let mut findings = self.rules.run(
            Stage::InitialResponse,
            &config.checks,
            &CheckInput {
                target: &config.target,
                initial,
                forms: &[],
                cookies: &initial_jar,
            },
        );

        let outcome = Crawler::new(client, config).crawl(initial).await;

        findings.extend(self.rules.run(
            Stage::PostCrawl,
            &config.checks,
            &CheckInput {
                target: &config.target,
                initial,
                forms: &outcome.forms,
                cookies: &outcome.cookies,
            },
        ));

        Analysis {
            findings,
            pages_crawled: outcome.visited.len(),
        }
    }
}

impl Default for ScanEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}

#[cfg(test)]
impl<'a> CheckInput<'a> {
    fn empty_page() -> &'static FetchedPage {
        Box::leak(Box::new(FetchedPage {
            url: "https://example.com/".to_string(),
            status: reqwest::StatusCode::OK,
            headers: reqwest::header::HeaderMap::new(),
            cookies: Vec::new(),
            body: String::new(),
        }))
    }

    pub(crate) fn for_forms(forms: &'a [Form]) -> Self {
        Self {
            target: "https://example.com",
            initial: Self::empty_page(),
            forms,
            cookies: Box::leak(Box::new(CookieJar::new())),
        }
    }

    pub(crate) fn for_cookies(cookies: &'a CookieJar) -> Self {
        Self {
            target: "https://example.com",
            initial: Self::empty_page(),
            forms: &[],
            cookies,
        }
    }
}
