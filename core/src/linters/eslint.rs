use crate::scanner::{clip_snippet, Finding, Severity};
use serde_json::Value;
use std::path::Path;

/// Parse `eslint --format json` output into findings.
///
/// Never panics: malformed output is logged and treated as zero findings.
pub fn parse_eslint_json(raw: &str, root: &Path) -> Vec<Finding> {
    let parsed: Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(e) => {
            if !raw.trim().is_empty() {
                tracing::warn!("failed to parse eslint output, treating as zero findings: {}", e);
            }
            return vec![];
        }
    };
    let Some(entries) = parsed.as_array() else {
        return vec![];
    };

    let mut findings = Vec::new();
    for entry in entries {
        let file = entry
            .get("filePath")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let file = Path::new(file)
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| file.to_string());

        let Some(messages) = entry.get("messages").and_then(|v| v.as_array()) else {
            continue;
        };
        for message in messages {
            let text = message
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown lint message");
            // ESLint: 2 = error, 1 = warning
            let severity = match message.get("severity").and_then(|v| v.as_u64()) {
                Some(2) => Severity::High,
                _ => Severity::Medium,
            };
            let line = message
                .get("line")
                .and_then(|v| v.as_u64())
                .map(|l| l as usize);
            let mut finding = Finding::new("lint", severity, text)
                .at_file(file.clone(), line)
                .with_source("eslint");
            if let Some(rule_id) = message.get("ruleId").and_then(|v| v.as_str()) {
                finding = finding.with_rule_id(rule_id);
            }
            if let Some(source) = message.get("source").and_then(|v| v.as_str()) {
                finding.code = Some(clip_snippet(source));
            }
            findings.push(finding);
        }
    }
    findings
}
