//! JSON report export

use crate::error::Result;
use crate::models::ScanReport;
use std::path::Path;
use tracing::info;

/// Pretty-printed report JSON, newline-terminated
pub fn to_string(report: &ScanReport) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// Writes the report to `output_path`
pub fn export(report: &ScanReport, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, to_string(report)?)?;
    info!(
        "Report with {} findings saved to {}",
        report.vulnerabilities.len(),
        output_path.display()
    );
    Ok(())
}

/// Reads a report previously written by [`export`]
pub fn load(input_path: &Path) -> Result<ScanReport> {
    let content = std::fs::read_to_string(input_path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WebguardError;

    #[test]
    fn test_failed_report_serializes_without_findings() {
        let report = ScanReport::failed(
            "https://example.com",
            WebguardError::ScanError("boom".to_string()),
        );
        let json = to_string(&report).expect("json");
        assert!(json.ends_with("}\n"));

        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["summary"], "Scan failed: Scanner error: boom");
        assert_eq!(value["target_url"], "https://example.com");
        assert_eq!(value["vulnerabilities"].as_array().map(Vec::len), Some(0));
    }
}
