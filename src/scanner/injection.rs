//! Injection-prone form field check

use super::{Check, CheckInput, Stage};
use crate::models::{Finding, InputField, Severity};

/// Field names commonly passed straight into database queries
const SENSITIVE_NAMES: &[&str] = &[
    "username", "user", "email", "login", "password", "pass", "query", "search", "id",
];

/// Input types that never carry free-form user text. Matched verbatim, so
/// `type="HIDDEN"` is not excluded.
const EXCLUDED_TYPES: &[&str] = &["hidden", "submit", "button", "checkbox", "radio"];

/// Flags free-text form fields whose names suggest a database lookup
pub struct FormInjectionCheck;

pub fn is_injection_candidate(field: &InputField) -> bool {
    if EXCLUDED_TYPES.contains(&field.input_type.as_str()) {
        return false;
    }
    let name = field.name.to_lowercase();
    SENSITIVE_NAMES.contains(&name.as_str())
}

impl Check for FormInjectionCheck {
    fn name(&self) -> &str {
        "injection"
    }

    fn description(&self) -> &str {
        "Reports form fields whose names suggest SQL injection exposure"
    }

    fn stage(&self) -> Stage {
        Stage::PostCrawl
    }

    fn evaluate(&self, input: &CheckInput<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for form in input.forms {
            for field in form.inputs.iter().filter(|f| is_injection_candidate(f)) {
                findings.push(
                    Finding::new(
                        "Potential SQL Injection",
                        format!(
                            "Form input '{}' could be vulnerable to SQL injection",
                            field.name
                        ),
                        Severity::High,
                        &form.source_url,
                    )
                    .with_parameter(&field.name)
                    .with_evidence(format!(
                        "Input field: {}, Type: {}",
                        field.name, field.input_type
                    ))
                    .with_mitigation(
                        "Use parameterized queries or ORM for database operations. \
                         Validate and sanitize all inputs.",
                    ),
                );
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Form;

    fn field(name: &str, input_type: &str) -> InputField {
        InputField {
            name: name.to_string(),
            input_type: input_type.to_string(),
            value: String::new(),
        }
    }

    #[test]
    fn test_exact_name_match_only() {
        assert!(is_injection_candidate(&field("Email", "text")));
        assert!(is_injection_candidate(&field("ID", "number")));
        assert!(!is_injection_candidate(&field("user_id", "text")));
        assert!(!is_injection_candidate(&field("", "text")));
    }

    #[test]
    fn test_excluded_types() {
        assert!(!is_injection_candidate(&field("id", "hidden")));
        assert!(!is_injection_candidate(&field("search", "submit")));
        assert!(!is_injection_candidate(&field("user", "checkbox")));
        assert!(is_injection_candidate(&field("password", "password")));
    }

    #[test]
    fn test_excluded_types_case_sensitive() {
        assert!(is_injection_candidate(&field("id", "HIDDEN")));
        assert!(is_injection_candidate(&field("search", "Submit")));
    }

    #[test]
    fn test_one_finding_per_matching_field() {
        let forms = vec![Form {
            source_url: "https://example.com/login".to_string(),
            action: "/login".to_string(),
            method: "post".to_string(),
            inputs: vec![
                field("username", "text"),
                field("password", "password"),
                field("remember", "checkbox"),
                field("id", "hidden"),
            ],
        }];
        let findings = FormInjectionCheck.evaluate(&CheckInput::for_forms(&forms));
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].parameter, "username");
        assert_eq!(findings[1].evidence, "Input field: password, Type: password");
        assert!(findings.iter().all(|f| f.severity == Severity::High));
        assert_eq!(findings[0].vuln_type, "potential_sql_injection");
    }
}
