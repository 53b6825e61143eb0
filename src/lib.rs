//! webguard - heuristic web application security scanner
//!
//! Fetches a target site, crawls a bounded number of same-prefix pages, and
//! reports missing security headers, POST forms without CSRF tokens,
//! injection-prone form fields, and cookies without Secure/HttpOnly flags.

pub mod config;
pub mod context;
pub mod crawler;
pub mod error;
pub mod http;
pub mod models;
pub mod report;
pub mod scanner;

use models::{ScanConfig, ScanReport};
use scanner::ScanEngine;

/// Scans `target` with default settings, blocking until the report is ready.
/// Never fails: errors are reported through a failed [`ScanReport`].
pub fn run_scan(target: &str) -> ScanReport {
    ScanEngine::with_defaults().run_scan_blocking(&ScanConfig::for_target(target))
}
