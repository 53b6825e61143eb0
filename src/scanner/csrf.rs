//! CSRF token presence check for POST forms

use super::{Check, CheckInput, Stage};
use crate::models::{Finding, Form, Severity};

/// Field-name fragments taken to indicate an anti-CSRF token
const CSRF_TOKENS: &[&str] = &["csrf_token", "csrftoken", "_csrf", "csrf", "csrf_name", "token"];

/// Flags POST forms with no field name resembling a CSRF token
pub struct FormCsrfCheck;

/// True when any input name contains a known token fragment (case-insensitive)
pub fn has_csrf_token(form: &Form) -> bool {
    form.inputs.iter().any(|input| {
        let name = input.name.to_lowercase();
        CSRF_TOKENS.iter().any(|token| name.contains(token))
    })
}

impl Check for FormCsrfCheck {
    fn name(&self) -> &str {
        "csrf"
    }

    fn description(&self) -> &str {
        "Reports POST forms without a CSRF token field"
    }

    fn stage(&self) -> Stage {
        Stage::PostCrawl
    }

    fn evaluate(&self, input: &CheckInput<'_>) -> Vec<Finding> {
        input
            .forms
            .iter()
            .filter(|form| form.is_post() && !has_csrf_token(form))
            .map(|form| {
                Finding::new(
                    "CSRF Vulnerability",
                    "Form doesn't have CSRF protection",
                    Severity::Medium,
                    &form.source_url,
                )
                .with_parameter("Form")
                .with_evidence(format!("Form action: {}", form.action))
                .with_mitigation("Implement CSRF tokens for all POST forms")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InputField;

    fn form(method: &str, names: &[&str]) -> Form {
        Form {
            source_url: "https://example.com/".to_string(),
            action: "/submit".to_string(),
            method: method.to_string(),
            inputs: names
                .iter()
                .map(|n| InputField {
                    name: n.to_string(),
                    input_type: "text".to_string(),
                    value: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_token_match_is_case_insensitive_substring() {
        assert!(has_csrf_token(&form("post", &["X_CSRFToken_field"])));
        assert!(has_csrf_token(&form("post", &["authenticity_token"])));
        assert!(!has_csrf_token(&form("post", &["user", ""])));
    }

    #[test]
    fn test_only_post_forms_reported() {
        let forms = vec![
            form("POST", &["user"]),
            form("get", &["user"]),
            form("post", &["user", "csrfmiddlewaretoken"]),
        ];
        let findings = FormCsrfCheck.evaluate(&CheckInput::for_forms(&forms));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].name, "CSRF Vulnerability");
        assert_eq!(findings[0].vuln_type, "csrf_vulnerability");
        assert_eq!(findings[0].evidence, "Form action: /submit");
        assert_eq!(findings[0].url, "https://example.com/");
    }
}
