use crate::scanner::{Finding, Severity};
use serde_json::Value;
use std::path::Path;

/// Parse `stylelint --formatter json` output into findings.
pub fn parse_stylelint_json(raw: &str, root: &Path) -> Vec<Finding> {
    let parsed: Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(e) => {
            if !raw.trim().is_empty() {
                tracing::warn!(
                    "failed to parse stylelint output, treating as zero findings: {}",
                    e
                );
            }
            return vec![];
        }
    };
    let Some(entries) = parsed.as_array() else {
        return vec![];
    };

    let mut findings = Vec::new();
    for entry in entries {
        let file = entry.get("source").and_then(|v| v.as_str()).unwrap_or("");
        let file = Path::new(file)
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| file.to_string());

        let Some(warnings) = entry.get("warnings").and_then(|v| v.as_array()) else {
            continue;
        };
        for warning in warnings {
            let text = warning
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown style message");
            let severity = match warning.get("severity").and_then(|v| v.as_str()) {
                Some("error") => Severity::Medium,
                _ => Severity::Low,
            };
            let line = warning
                .get("line")
                .and_then(|v| v.as_u64())
                .map(|l| l as usize);
            let mut finding = Finding::new("style", severity, text)
                .at_file(file.clone(), line)
                .with_source("stylelint");
            if let Some(rule) = warning.get("rule").and_then(|v| v.as_str()) {
                finding = finding.with_rule_id(rule);
            }
            findings.push(finding);
        }
    }
    findings
}
