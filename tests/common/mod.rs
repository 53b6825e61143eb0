//! Common test utilities

#![allow(dead_code)]

use webguard::models::ScanConfig;
use wiremock::ResponseTemplate;

/// Creates a test ScanConfig pointing to a wiremock server
pub fn test_config(target: &str) -> ScanConfig {
    ScanConfig {
        target: target.to_string(),
        root_timeout_secs: 5,
        crawl_timeout_secs: 5,
        user_agent: "webguard-test/0.1.0".to_string(),
        ..ScanConfig::default()
    }
}

/// 200 response with an HTML body.
/// wiremock's `set_body_string` forces Content-Type to text/plain.
pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

/// 200 HTML response carrying every required security header
pub fn hardened_html(body: &str) -> ResponseTemplate {
    html(body)
        .insert_header("Strict-Transport-Security", "max-age=31536000")
        .insert_header("X-Content-Type-Options", "nosniff")
        .insert_header("X-Frame-Options", "DENY")
}

/// HTML page whose only content is links to `paths`
pub fn links_page(paths: &[&str]) -> String {
    let anchors: String = paths
        .iter()
        .map(|p| format!(r#"<a href="{p}">{p}</a>"#))
        .collect();
    format!("<html><body>{anchors}</body></html>")
}
