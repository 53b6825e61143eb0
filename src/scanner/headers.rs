//! Security headers check

use super::{Check, CheckInput, Stage};
use crate::models::{Finding, Severity};
use tracing::debug;

/// Flags required security headers missing from the initial response
pub struct HeaderCheck;

struct HeaderRule {
    name: &'static str,
    /// Only required headers are ever reported
    required: bool,
    description: &'static str,
}

impl HeaderRule {
    fn severity(&self) -> Severity {
        if self.required {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

const SECURITY_HEADERS: &[HeaderRule] = &[
    HeaderRule {
        name: "Strict-Transport-Security",
        required: true,
        description: "Missing HTTP Strict Transport Security header",
    },
    HeaderRule {
        name: "Content-Security-Policy",
        required: false,
        description: "Missing Content Security Policy header",
    },
    HeaderRule {
        name: "X-Content-Type-Options",
        required: true,
        description: "Missing X-Content-Type-Options: nosniff header",
    },
    HeaderRule {
        name: "X-Frame-Options",
        required: true,
        description: "Missing X-Frame-Options header",
    },
    HeaderRule {
        name: "X-XSS-Protection",
        required: false,
        description: "Missing X-XSS-Protection header",
    },
];

impl Check for HeaderCheck {
    fn name(&self) -> &str {
        "headers"
    }

    fn description(&self) -> &str {
        "Reports required HTTP security headers missing from the target's response"
    }

    fn stage(&self) -> Stage {
        Stage::InitialResponse
    }

    fn evaluate(&self, input: &CheckInput<'_>) -> Vec<Finding> {
        let page = input.initial;
        let evidence = format!("Response headers: {}", quoted_list(&page.header_names()));

        SECURITY_HEADERS
            .iter()
            .filter(|rule| rule.required)
            .filter(|rule| {
                let present = page.headers.contains_key(rule.name);
                debug!("Header '{}' present: {present}", rule.name);
                !present
            })
            .map(|rule| {
                Finding::new(
                    format!("Missing {} Header", rule.name),
                    rule.description,
                    rule.severity(),
                    &page.url,
                )
                .with_parameter("HTTP Headers")
                .with_evidence(evidence.clone())
                .with_mitigation(format!(
                    "Add the {} header to your server responses",
                    rule.name
                ))
            })
            .collect()
    }
}

/// Renders names as `['a', 'b']`
fn quoted_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    format!("[{}]", quoted.join(", "))
}
