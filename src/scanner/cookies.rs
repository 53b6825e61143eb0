//! Cookie security flags check

use super::{Check, CheckInput, Stage};
use crate::models::{Finding, Severity};

/// Flags session cookies set without Secure or HttpOnly
pub struct CookieFlagsCheck;

impl Check for CookieFlagsCheck {
    fn name(&self) -> &str {
        "cookies"
    }

    fn description(&self) -> &str {
        "Reports session cookies missing the Secure or HttpOnly flag"
    }

    fn stage(&self) -> Stage {
        Stage::PostCrawl
    }

    fn evaluate(&self, input: &CheckInput<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (name, flags) in input.cookies.iter() {
            if !flags.secure {
                findings.push(
                    Finding::new(
                        "Insecure Cookies",
                        format!("Cookie '{name}' is set without the Secure flag"),
                        Severity::Medium,
                        input.target,
                    )
                    .with_parameter(name)
                    .with_evidence(format!("Cookie: {name}"))
                    .with_mitigation("Set the Secure flag for all cookies"),
                );
            }

            if !flags.http_only {
                findings.push(
                    Finding::new(
                        "Cookies Without HttpOnly",
                        format!("Cookie '{name}' is set without the HttpOnly flag"),
                        Severity::Medium,
                        input.target,
                    )
                    .with_parameter(name)
                    .with_evidence(format!("Cookie: {name}"))
                    .with_mitigation(
                        "Set the HttpOnly flag for all cookies containing sensitive data",
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
    use crate::models::{CookieFlags, CookieJar};

    fn run(jar: &CookieJar) -> Vec<Finding> {
        CookieFlagsCheck.evaluate(&CheckInput::for_cookies(jar))
    }

    #[test]
    fn test_flag_combinations() {
        let cases = [
            (false, false, 2),
            (true, false, 1),
            (false, true, 1),
            (true, true, 0),
        ];
        for (secure, http_only, expected) in cases {
            let mut jar = CookieJar::new();
            jar.insert("c", CookieFlags { secure, http_only });
            assert_eq!(run(&jar).len(), expected, "secure={secure} httponly={http_only}");
        }
    }

    #[test]
    fn test_missing_both_flags_names() {
        let mut jar = CookieJar::new();
        jar.insert("session", CookieFlags::default());
        let findings = run(&jar);
        assert_eq!(findings[0].name, "Insecure Cookies");
        assert_eq!(findings[0].vuln_type, "insecure_cookies");
        assert_eq!(findings[1].name, "Cookies Without HttpOnly");
        assert!(findings.iter().all(|f| f.parameter == "session"));
        assert!(findings.iter().all(|f| f.url == "https://example.com"));
    }

    #[test]
    fn test_empty_jar() {
        assert!(run(&CookieJar::new()).is_empty());
    }
}
