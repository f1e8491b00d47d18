// End-to-end audit flows over fixture trees.

use feaudit_core::{AuditCategory, AuditConfig, AuditRunner};
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Page scaffold that satisfies the corpus-level landmark/skip-link checks so
/// fixtures only surface the issues they mean to.
fn page(body: &str) -> String {
    format!(
        "<main id=\"content\">\n<a href=\"#content\" class=\"skip-link\">Skip</a>\n{}\n</main>\n",
        body
    )
}

#[tokio::test]
async fn img_without_alt_is_reported_at_its_line() {
    let dir = tempfile::tempdir().unwrap();
    let filler = (0..7)
        .map(|i| format!("<p>filler {}</p>", i))
        .collect::<Vec<_>>()
        .join("\n");
    // scaffold 占两行，img 恰好落在第 10 行
    write(
        dir.path(),
        "index.html",
        &page(&format!("{}\n<img src=\"a.png\">", filler)),
    );

    let runner = AuditRunner::new(AuditConfig::new(dir.path()));
    let outcome = runner
        .run_category(AuditCategory::Accessibility)
        .await
        .unwrap();

    assert_eq!(outcome.result.total_issues, 1);
    let finding = &outcome.result.issues[0];
    assert_eq!(finding.issue_type, "missing_alt");
    assert_eq!(finding.severity, feaudit_core::Severity::High);
    assert_eq!(finding.line, Some(10));
    assert_eq!(finding.file.as_deref(), Some("index.html"));
}

#[tokio::test]
async fn heading_skip_is_reported_with_both_levels() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "page.html",
        &page("<h1>Title</h1>\n<h3>Detail</h3>"),
    );

    let runner = AuditRunner::new(AuditConfig::new(dir.path()));
    let outcome = runner
        .run_category(AuditCategory::Accessibility)
        .await
        .unwrap();

    let skipped: Vec<_> = outcome
        .result
        .issues
        .iter()
        .filter(|f| f.issue_type == "skipped_heading")
        .collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].message.contains("level 3"));
    assert!(skipped[0].message.contains("level 2"));
}

#[tokio::test]
async fn empty_project_produces_an_empty_report_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let runner = AuditRunner::new(AuditConfig::new(dir.path()));
    let outcome = runner
        .run_category(AuditCategory::Accessibility)
        .await
        .unwrap();

    assert_eq!(outcome.result.total_issues, 0);
    assert!(outcome.result.issues.is_empty());
    assert_eq!(outcome.stats.batches, 0);

    let raw = fs::read_to_string(
        dir.path()
            .join("reports/accessibility-audit-report.json"),
    )
    .unwrap();
    assert!(raw.contains("\"totalIssues\": 0"));
}

#[tokio::test]
async fn duplicate_findings_on_one_line_collapse() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "index.html",
        &page("<img src=\"a.png\"><img src=\"b.png\">"),
    );

    let runner = AuditRunner::new(AuditConfig::new(dir.path()));
    let outcome = runner
        .run_category(AuditCategory::Accessibility)
        .await
        .unwrap();

    // 两个 img 产生同键问题，聚合后只剩一条
    assert_eq!(outcome.result.total_issues, 1);

    // 落盘的流水账保留了聚合前的全部记录
    let jsonl =
        fs::read_to_string(dir.path().join("reports/accessibility-issues.jsonl")).unwrap();
    assert_eq!(jsonl.lines().count(), 2);
}

#[tokio::test]
async fn unchanged_fixture_yields_identical_reports_modulo_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..12 {
        write(
            dir.path(),
            &format!("pages/page{:02}.html", i),
            &page(&format!(
                "<h1>Page {}</h1>\n<img src=\"{}.png\">\n<input type=\"text\" name=\"f\">",
                i, i
            )),
        );
    }

    let mut reports = Vec::new();
    for _ in 0..2 {
        let runner = AuditRunner::new(AuditConfig::new(dir.path()));
        runner
            .run_category(AuditCategory::Accessibility)
            .await
            .unwrap();
        let raw = fs::read_to_string(
            dir.path()
                .join("reports/accessibility-audit-report.json"),
        )
        .unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        value.as_object_mut().unwrap().remove("timestamp");
        reports.push(serde_json::to_string(&value).unwrap());
    }
    assert_eq!(reports[0], reports[1]);
}

#[tokio::test]
async fn security_audit_flags_eval_and_secrets() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/app.js",
        "const password = \"hunter2\";\nconst out = eval(input);\n",
    );

    let runner = AuditRunner::new(AuditConfig::new(dir.path()));
    let outcome = runner.run_category(AuditCategory::Security).await.unwrap();

    let types: Vec<_> = outcome
        .result
        .issues
        .iter()
        .map(|f| f.issue_type.as_str())
        .collect();
    assert!(types.contains(&"hardcoded_secret"));
    assert!(types.contains(&"eval_usage"));
    assert_eq!(outcome.result.summary.high, 2);
    assert!(fs::read_to_string(dir.path().join("reports/security-audit-report.json"))
        .unwrap()
        .contains("hardcoded_secret"));
}

#[tokio::test]
async fn custom_rule_packs_extend_the_security_audit() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "rules/extra.yaml",
        "id: no-debugger\nname: Debugger\ndescription: debugger left in code\nseverity: medium\npattern: \"\\\\bdebugger\\\\b\"\n",
    );
    write(dir.path(), "src/app.js", "debugger;\n");

    let mut config = AuditConfig::new(dir.path());
    config.rules_dir = Some(dir.path().join("rules"));
    // 规则目录自身不参与扫描
    config.globs.insert(
        "security".into(),
        feaudit_core::CategoryGlobs {
            include: vec!["src/**/*.js".into()],
            exclude: vec![],
        },
    );

    let runner = AuditRunner::new(config);
    let outcome = runner.run_category(AuditCategory::Security).await.unwrap();
    assert!(outcome
        .result
        .issues
        .iter()
        .any(|f| f.rule_id.as_deref() == Some("no-debugger")));
}

#[tokio::test]
async fn component_usage_report_counts_imports_and_renders() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/App.jsx",
        "import Button from './Button';\nimport Ghost from './Ghost';\nexport default () => <Button />;\n",
    );

    let runner = AuditRunner::new(AuditConfig::new(dir.path()));
    let outcome = runner
        .run_category(AuditCategory::Components)
        .await
        .unwrap();

    assert!(outcome
        .result
        .issues
        .iter()
        .any(|f| f.issue_type == "unused_component" && f.message.contains("Ghost")));

    let raw =
        fs::read_to_string(dir.path().join("reports/component-usage-report.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["components"]["Button"]["imported"], 1);
    assert_eq!(value["components"]["Button"]["rendered"], 1);
    assert_eq!(value["totalComponents"], 2);
}

#[tokio::test]
async fn ci_artifacts_are_written_and_gates_evaluated() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "index.html", &page("<img src=\"a.png\">"));

    let runner = AuditRunner::new(AuditConfig::new(dir.path()));
    let outcome = runner
        .run_category(AuditCategory::Accessibility)
        .await
        .unwrap();
    let summary = runner.write_ci_artifacts(&[outcome]);

    // 默认阈值不允许任何 high 问题
    assert!(!summary.passed);
    assert_eq!(summary.exit_code(), 1);

    let reports = dir.path().join("reports");
    assert!(reports.join("audit-report.html").exists());
    assert!(reports.join("fe-audit.sarif").exists());
    assert!(reports.join("junit-report.xml").exists());
    assert!(reports.join("ci-summary.json").exists());

    let sarif: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(reports.join("fe-audit.sarif")).unwrap()).unwrap();
    assert_eq!(sarif["version"], "2.1.0");
}

#[tokio::test]
async fn scan_respects_configured_batch_size() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..7 {
        write(
            dir.path(),
            &format!("p{}.html", i),
            &page("<p>nothing wrong here</p>"),
        );
    }

    let mut config = AuditConfig::new(dir.path());
    config.batch_size = 3;
    let runner = AuditRunner::new(config);
    let outcome = runner
        .run_category(AuditCategory::Accessibility)
        .await
        .unwrap();

    assert_eq!(outcome.stats.files_scanned, 7);
    assert_eq!(outcome.stats.batches, 3); // ceil(7/3)
    assert_eq!(outcome.result.total_issues, 0);
}
