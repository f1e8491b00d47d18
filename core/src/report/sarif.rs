// SARIF output - 供 CI 平台摄取的标准化结果
// SARIF 2.1.0，单个 run 覆盖全部审计类别

use crate::report::AuditResult;
use crate::scanner::{Finding, Severity};
use serde_json::{json, Value};

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

fn level(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

fn rule_id(finding: &Finding) -> String {
    finding
        .rule_id
        .clone()
        .unwrap_or_else(|| finding.issue_type.clone())
}

/// Render all audit results as one SARIF document.
pub fn to_sarif(results: &[AuditResult]) -> Value {
    let mut rules: Vec<Value> = Vec::new();
    let mut seen_rules: Vec<String> = Vec::new();
    let mut sarif_results: Vec<Value> = Vec::new();

    for result in results {
        for finding in &result.issues {
            let id = rule_id(finding);
            if !seen_rules.contains(&id) {
                seen_rules.push(id.clone());
                rules.push(json!({
                    "id": id,
                    "shortDescription": { "text": finding.issue_type },
                    "properties": { "category": result.category },
                }));
            }

            let location = if let Some(file) = &finding.file {
                json!({
                    "physicalLocation": {
                        "artifactLocation": { "uri": file },
                        "region": { "startLine": finding.line.unwrap_or(1) },
                    }
                })
            } else {
                json!({
                    "physicalLocation": {
                        "artifactLocation": { "uri": finding.url.clone().unwrap_or_default() },
                    }
                })
            };

            sarif_results.push(json!({
                "ruleId": id,
                "level": level(finding.severity),
                "message": { "text": finding.message },
                "locations": [location],
            }));
        }
    }

    json!({
        "$schema": SARIF_SCHEMA,
        "version": SARIF_VERSION,
        "runs": [{
            "tool": {
                "driver": {
                    "name": "fe-audit",
                    "informationUri": "https://github.com/fe-audit/fe-audit",
                    "rules": rules,
                }
            },
            "results": sarif_results,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::aggregate;

    #[test]
    fn sarif_document_maps_severities_to_levels() {
        let findings = vec![
            Finding::new("missing_alt", Severity::High, "no alt").at_file("a.html", Some(3)),
            Finding::new("color_contrast", Severity::Low, "check contrast")
                .at_file("b.css", Some(9)),
        ];
        let results = vec![aggregate("accessibility", findings)];
        let sarif = to_sarif(&results);

        assert_eq!(sarif["version"], "2.1.0");
        let run_results = sarif["runs"][0]["results"].as_array().unwrap();
        assert_eq!(run_results.len(), 2);
        assert_eq!(run_results[0]["level"], "error");
        assert_eq!(run_results[1]["level"], "note");
        assert_eq!(
            run_results[0]["locations"][0]["physicalLocation"]["region"]["startLine"],
            3
        );
    }

    #[test]
    fn rules_are_listed_once_per_id() {
        let findings = vec![
            Finding::new("missing_alt", Severity::High, "a").at_file("a.html", Some(1)),
            Finding::new("missing_alt", Severity::High, "b").at_file("a.html", Some(2)),
        ];
        let results = vec![aggregate("accessibility", findings)];
        let sarif = to_sarif(&results);
        let rules = sarif["runs"][0]["tool"]["driver"]["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 1);
    }
}
