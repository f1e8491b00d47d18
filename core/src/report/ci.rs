// CI gate - 质量门
// 将各类别的级别计数与阈值比较，决定 CI 通过与否

use crate::config::{AuditConfig, CategoryThresholds};
use crate::report::{AuditResult, SeveritySummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单个类别的门禁结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiGate {
    pub category: String,
    pub summary: SeveritySummary,
    pub max_high: MaxCount,
    pub max_medium: MaxCount,
    pub max_low: MaxCount,
    pub passed: bool,
}

/// 阈值序列化包装：usize::MAX 输出为 null（不设限）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxCount(pub usize);

impl Serialize for MaxCount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 == usize::MAX {
            serializer.serialize_none()
        } else {
            serializer.serialize_u64(self.0 as u64)
        }
    }
}

impl<'de> Deserialize<'de> for MaxCount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value: Option<u64> = Option::deserialize(deserializer)?;
        Ok(MaxCount(value.map(|v| v as usize).unwrap_or(usize::MAX)))
    }
}

/// CI 汇总，写入 ci-summary.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiSummary {
    pub timestamp: DateTime<Utc>,
    pub passed: bool,
    pub categories: Vec<CiGate>,
}

impl CiSummary {
    /// CI 模式下的进程退出码
    pub fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            1
        }
    }
}

/// Compare every category's severity counts against its thresholds.
pub fn evaluate_gates(results: &[AuditResult], config: &AuditConfig) -> CiSummary {
    let mut categories = Vec::new();
    let mut passed = true;
    for result in results {
        let thresholds: CategoryThresholds = config.thresholds_for(&result.category);
        let gate_passed = result.summary.high <= thresholds.max_high
            && result.summary.medium <= thresholds.max_medium
            && result.summary.low <= thresholds.max_low;
        passed &= gate_passed;
        categories.push(CiGate {
            category: result.category.clone(),
            summary: result.summary,
            max_high: MaxCount(thresholds.max_high),
            max_medium: MaxCount(thresholds.max_medium),
            max_low: MaxCount(thresholds.max_low),
            passed: gate_passed,
        });
    }
    CiSummary {
        timestamp: Utc::now(),
        passed,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::aggregate;
    use crate::scanner::{Finding, Severity};

    fn result_with(category: &str, high: usize) -> AuditResult {
        let findings = (0..high)
            .map(|i| {
                Finding::new("x", Severity::High, format!("issue {}", i)).at_file("a.js", Some(i))
            })
            .collect();
        aggregate(category, findings)
    }

    #[test]
    fn default_gate_fails_on_any_high_finding() {
        let config = AuditConfig::new("/tmp/p");
        let summary = evaluate_gates(&[result_with("security", 1)], &config);
        assert!(!summary.passed);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn configured_threshold_allows_counted_findings() {
        let mut config = AuditConfig::new("/tmp/p");
        config.thresholds.insert(
            "security".into(),
            CategoryThresholds {
                max_high: 2,
                max_medium: usize::MAX,
                max_low: usize::MAX,
            },
        );
        let summary = evaluate_gates(&[result_with("security", 2)], &config);
        assert!(summary.passed);
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn unlimited_thresholds_serialize_as_null() {
        let config = AuditConfig::new("/tmp/p");
        let summary = evaluate_gates(&[result_with("security", 0)], &config);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"maxHigh\":0"));
        assert!(json.contains("\"maxMedium\":null"));
    }

    #[test]
    fn one_failing_category_fails_the_whole_summary() {
        let mut config = AuditConfig::new("/tmp/p");
        config.thresholds.insert(
            "accessibility".into(),
            CategoryThresholds {
                max_high: 5,
                max_medium: usize::MAX,
                max_low: usize::MAX,
            },
        );
        let results = vec![result_with("accessibility", 3), result_with("security", 1)];
        let summary = evaluate_gates(&results, &config);
        assert!(!summary.passed);
        assert!(summary.categories[0].passed);
        assert!(!summary.categories[1].passed);
    }
}
