// Report module - 汇聚与报告
// 组合键去重、级别统计与最终报告模型

pub mod ci;
pub mod emit;
pub mod html;
pub mod junit;
pub mod sarif;

use crate::scanner::{Finding, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 各级别问题计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeveritySummary {
    pub fn tally(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// 一次审计运行的最终汇总，构造后不再变更
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub total_issues: usize,
    pub summary: SeveritySummary,
    pub issues: Vec<Finding>,
}

/// Collapse duplicates by the composite key, keeping the first-seen
/// occurrence so output order stays stable. Idempotent.
pub fn dedupe(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(findings.len());
    for finding in findings {
        if seen.insert(finding.dedup_key()) {
            out.push(finding);
        }
    }
    out
}

/// Deduplicate and bucket a category's findings into the final aggregate.
pub fn aggregate(category: &str, findings: Vec<Finding>) -> AuditResult {
    let issues = dedupe(findings);
    let summary = SeveritySummary::tally(&issues);
    AuditResult {
        timestamp: Utc::now(),
        category: category.to_string(),
        total_issues: summary.total(),
        summary,
        issues,
    }
}
