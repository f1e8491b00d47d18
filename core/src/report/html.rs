// HTML output - 汇总页
// 单文件自包含页面：级别统计 + 每个类别的问题表格

use crate::report::AuditResult;
use crate::scanner::Severity;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "sev-high",
        Severity::Medium => "sev-medium",
        Severity::Low => "sev-low",
    }
}

/// Render a unified, self-contained HTML report over all categories.
pub fn render_html(results: &[AuditResult]) -> String {
    let total: usize = results.iter().map(|r| r.total_issues).sum();
    let high: usize = results.iter().map(|r| r.summary.high).sum();
    let medium: usize = results.iter().map(|r| r.summary.medium).sum();
    let low: usize = results.iter().map(|r| r.summary.low).sum();
    let generated = results
        .first()
        .map(|r| r.timestamp.to_rfc3339())
        .unwrap_or_default();

    let mut body = String::new();
    for result in results {
        body.push_str(&format!(
            "<section>\n<h2>{} <small>{} issues</small></h2>\n",
            escape(&result.category),
            result.total_issues
        ));
        if result.issues.is_empty() {
            body.push_str("<p class=\"clean\">No issues found.</p>\n</section>\n");
            continue;
        }
        body.push_str(
            "<table>\n<thead><tr><th>Severity</th><th>Type</th><th>Location</th><th>Message</th><th>Recommendation</th></tr></thead>\n<tbody>\n",
        );
        for finding in &result.issues {
            let location = match (&finding.file, finding.line, &finding.url) {
                (Some(file), Some(line), _) => format!("{}:{}", file, line),
                (Some(file), None, _) => file.clone(),
                (None, _, Some(url)) => url.clone(),
                _ => String::new(),
            };
            body.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                severity_class(finding.severity),
                finding.severity,
                escape(&finding.issue_type),
                escape(&location),
                escape(&finding.message),
                escape(finding.recommendation.as_deref().unwrap_or("")),
            ));
        }
        body.push_str("</tbody>\n</table>\n</section>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>FE-Audit Report</title>
<style>
body {{ font-family: -apple-system, "Segoe UI", sans-serif; margin: 2rem auto; max-width: 72rem; color: #222; }}
h1 {{ border-bottom: 2px solid #eee; padding-bottom: .5rem; }}
.tiles {{ display: flex; gap: 1rem; margin: 1rem 0 2rem; }}
.tile {{ flex: 1; border: 1px solid #e0e0e0; border-radius: 6px; padding: 1rem; text-align: center; }}
.tile b {{ display: block; font-size: 1.8rem; }}
table {{ border-collapse: collapse; width: 100%; margin-bottom: 2rem; }}
th, td {{ border: 1px solid #e0e0e0; padding: .4rem .6rem; text-align: left; font-size: .9rem; }}
tr.sev-high td:first-child {{ color: #b3261e; font-weight: 600; }}
tr.sev-medium td:first-child {{ color: #9a6700; font-weight: 600; }}
tr.sev-low td:first-child {{ color: #57606a; }}
.clean {{ color: #1a7f37; }}
small {{ color: #888; font-weight: normal; }}
</style>
</head>
<body>
<h1>FE-Audit Report</h1>
<p>Generated {generated}</p>
<div class="tiles">
<div class="tile"><b>{total}</b>total</div>
<div class="tile"><b>{high}</b>high</div>
<div class="tile"><b>{medium}</b>medium</div>
<div class="tile"><b>{low}</b>low</div>
</div>
{body}</body>
</html>
"#,
        generated = escape(&generated),
        total = total,
        high = high,
        medium = medium,
        low = low,
        body = body
    )
}
