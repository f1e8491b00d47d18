// JUnit XML output - 供 CI 平台展示
// 每个审计类别映射为一个 testsuite，每个问题是一条失败的 testcase

use crate::report::AuditResult;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render all audit results as one JUnit XML document.
pub fn to_junit(results: &[AuditResult]) -> String {
    let total: usize = results.iter().map(|r| r.total_issues).sum();
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<testsuites name=\"fe-audit\" tests=\"{}\" failures=\"{}\">\n",
        total.max(results.len()),
        total
    ));

    for result in results {
        xml.push_str(&format!(
            "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\">\n",
            escape(&result.category),
            result.total_issues.max(1),
            result.total_issues
        ));
        if result.issues.is_empty() {
            // 空类别保留一条通过的用例，方便 CI 面板显示绿色
            xml.push_str(&format!(
                "    <testcase name=\"{} audit passed\"/>\n",
                escape(&result.category)
            ));
        }
        for finding in &result.issues {
            let location = finding
                .file
                .clone()
                .or_else(|| finding.url.clone())
                .unwrap_or_default();
            let name = match finding.line {
                Some(line) => format!("{}: {}:{}", finding.issue_type, location, line),
                None => format!("{}: {}", finding.issue_type, location),
            };
            xml.push_str(&format!(
                "    <testcase name=\"{}\" classname=\"{}\">\n",
                escape(&name),
                escape(&result.category)
            ));
            xml.push_str(&format!(
                "      <failure message=\"{}\" type=\"{}\">{}</failure>\n",
                escape(&finding.message),
                escape(finding.severity.as_str()),
                escape(finding.code.as_deref().unwrap_or("")),
            ));
            xml.push_str("    </testcase>\n");
        }
        xml.push_str("  </testsuite>\n");
    }
    xml.push_str("</testsuites>\n");
    xml
}
