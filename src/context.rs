//! Per-scan mutable state shared by concurrent crawl tasks

use crate::models::{CookieJar, Form, SetCookie};
use std::collections::HashSet;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct CrawlState {
    visited: HashSet<String>,
    forms: Vec<Form>,
    cookies: CookieJar,
}

/// State of one scan: visited set, collected forms, and the session cookie jar.
/// All mutation goes through the inner lock, so check-and-mark on the visited
/// set is atomic with respect to other crawl tasks.
#[derive(Debug)]
pub struct ScanContext {
    target: String,
    budget: usize,
    state: Mutex<CrawlState>,
}

/// What a finished crawl leaves behind
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    pub visited: HashSet<String>,
    pub forms: Vec<Form>,
    pub cookies: CookieJar,
}

impl ScanContext {
    pub fn new(target: impl Into<String>, budget: usize) -> Self {
        Self {
            target: target.into(),
            budget,
            state: Mutex::new(CrawlState::default()),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Same-origin test: plain string prefix against the target URL
    pub fn in_scope(&self, url: &str) -> bool {
        url.starts_with(&self.target)
    }

    /// Marks `url` visited unless it already is or the budget is spent.
    /// Returns true when the caller now owns the visit.
    pub async fn claim(&self, url: &str) -> bool {
        let mut state = self.state.lock().await;
        if state.visited.len() >= self.budget || state.visited.contains(url) {
            return false;
        }
        state.visited.insert(url.to_string())
    }

    /// Claims every unvisited link in order until the budget runs out
    pub async fn claim_batch(&self, links: Vec<String>) -> Vec<String> {
        let mut state = self.state.lock().await;
        let mut claimed = Vec::new();
        for link in links {
            if state.visited.len() >= self.budget {
                break;
            }
            if state.visited.insert(link.clone()) {
                claimed.push(link);
            }
        }
        claimed
    }

    pub async fn add_forms(&self, forms: Vec<Form>) {
        self.state.lock().await.forms.extend(forms);
    }

    pub async fn add_cookies(&self, cookies: &[SetCookie]) {
        self.state.lock().await.cookies.absorb(cookies);
    }

    pub async fn visited_count(&self) -> usize {
        self.state.lock().await.visited.len()
    }

    /// Consumes the context once no crawl task holds it
    pub fn into_outcome(self) -> CrawlOutcome {
        let state = self.state.into_inner();
        CrawlOutcome {
            visited: state.visited,
            forms: state.forms,
            cookies: state.cookies,
        }
    }
}
