// Audit orchestration - 审计编排
// 每个类别一个 runner，状态机：Idle → Enumerating → Scanning → Draining → Aggregating → Emitting → Done

pub mod components;

use crate::config::AuditConfig;
use crate::detectors::{accessibility_detectors, corpus_findings, security_detectors, DetectorScanner};
use crate::error::Result;
use crate::linters::{run_linter, LinterKind};
use crate::report::ci::CiSummary;
use crate::report::{aggregate, ci, emit, html, junit, sarif, AuditResult};
use crate::rules::loader::load_rules_from_dir;
use crate::rules::scanner::compile_rules;
use crate::scanner::batch::{BatchScheduler, ScanStats};
use crate::scanner::enumerate::enumerate_files;
use crate::scanner::sink::IssueSink;
use crate::scanner::{CorpusState, Scanner};
use self::components::{ComponentScanner, ComponentUsageReport};
use std::str::FromStr;
use std::sync::Arc;

/// 审计类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditCategory {
    Accessibility,
    Security,
    Eslint,
    Stylelint,
    Components,
}

impl AuditCategory {
    pub const ALL: [AuditCategory; 5] = [
        AuditCategory::Accessibility,
        AuditCategory::Security,
        AuditCategory::Eslint,
        AuditCategory::Stylelint,
        AuditCategory::Components,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditCategory::Accessibility => "accessibility",
            AuditCategory::Security => "security",
            AuditCategory::Eslint => "eslint",
            AuditCategory::Stylelint => "stylelint",
            AuditCategory::Components => "components",
        }
    }
}

impl FromStr for AuditCategory {
    type Err = crate::error::AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "accessibility" | "a11y" => Ok(AuditCategory::Accessibility),
            "security" => Ok(AuditCategory::Security),
            "eslint" | "lint" => Ok(AuditCategory::Eslint),
            "stylelint" | "style" => Ok(AuditCategory::Stylelint),
            "components" => Ok(AuditCategory::Components),
            other => Err(crate::error::AuditError::Config(format!(
                "unknown audit category: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 运行状态机的各阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditPhase {
    Idle,
    Enumerating,
    Scanning(usize),
    Draining,
    Aggregating,
    Emitting,
    Done,
}

impl std::fmt::Display for AuditPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditPhase::Idle => write!(f, "idle"),
            AuditPhase::Enumerating => write!(f, "enumerating"),
            AuditPhase::Scanning(batch) => write!(f, "scanning(batch {})", batch),
            AuditPhase::Draining => write!(f, "draining"),
            AuditPhase::Aggregating => write!(f, "aggregating"),
            AuditPhase::Emitting => write!(f, "emitting"),
            AuditPhase::Done => write!(f, "done"),
        }
    }
}

/// 阶段跟踪：只进不退
struct PhaseTracker {
    category: &'static str,
    phase: AuditPhase,
}

impl PhaseTracker {
    fn new(category: &'static str) -> Self {
        Self {
            category,
            phase: AuditPhase::Idle,
        }
    }

    fn advance(&mut self, phase: AuditPhase) {
        tracing::debug!(category = self.category, from = %self.phase, to = %phase, "audit phase");
        self.phase = phase;
    }
}

/// 单个类别的运行结果
#[derive(Debug)]
pub struct AuditOutcome {
    pub category: AuditCategory,
    pub result: AuditResult,
    pub stats: ScanStats,
}

/// Drives audits across categories against one project root.
pub struct AuditRunner {
    config: AuditConfig,
    show_progress: bool,
}

impl AuditRunner {
    pub fn new(config: AuditConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run every category in order.
    pub async fn run_all(&self) -> Result<Vec<AuditOutcome>> {
        let mut outcomes = Vec::new();
        for category in AuditCategory::ALL {
            outcomes.push(self.run_category(category).await?);
        }
        Ok(outcomes)
    }

    /// Run one category end to end.
    pub async fn run_category(&self, category: AuditCategory) -> Result<AuditOutcome> {
        tracing::info!(category = %category, "audit started");
        let outcome = match category {
            AuditCategory::Accessibility => {
                let scanner: Arc<dyn Scanner> = Arc::new(DetectorScanner::new(
                    "AccessibilityScanner",
                    &self.config.root,
                    accessibility_detectors(),
                ));
                self.run_scan(category, scanner).await?
            }
            AuditCategory::Security => {
                let mut detectors = security_detectors();
                if let Some(rules_dir) = &self.config.rules_dir {
                    match load_rules_from_dir(rules_dir) {
                        Ok(rules) => detectors.extend(compile_rules(rules)),
                        Err(e) => {
                            tracing::warn!("failed to load custom rules, continuing without: {}", e)
                        }
                    }
                }
                let scanner: Arc<dyn Scanner> = Arc::new(DetectorScanner::new(
                    "SecurityScanner",
                    &self.config.root,
                    detectors,
                ));
                self.run_scan(category, scanner).await?
            }
            AuditCategory::Components => {
                let scanner: Arc<dyn Scanner> = Arc::new(ComponentScanner::new(&self.config.root));
                self.run_scan(category, scanner).await?
            }
            AuditCategory::Eslint => self.run_delegated(category, LinterKind::Eslint).await?,
            AuditCategory::Stylelint => {
                self.run_delegated(category, LinterKind::Stylelint).await?
            }
        };
        tracing::info!(
            category = %category,
            issues = outcome.result.total_issues,
            "audit finished"
        );
        Ok(outcome)
    }

    /// 批量扫描类管线：枚举 → 分批扫描 → 收尾 → 汇聚 → 落盘
    async fn run_scan(
        &self,
        category: AuditCategory,
        scanner: Arc<dyn Scanner>,
    ) -> Result<AuditOutcome> {
        let mut tracker = PhaseTracker::new(category.as_str());

        tracker.advance(AuditPhase::Enumerating);
        let globs = self.config.globs_for(category.as_str());
        let files = enumerate_files(&self.config.root, &globs.include, &globs.exclude)?;
        tracing::debug!(category = %category, files = files.len(), "enumeration complete");

        let mut sink = IssueSink::open(&self.config.report_dir, category.as_str())
            .await?
            .with_cap(self.config.findings_cap);

        tracker.advance(AuditPhase::Scanning(0));
        let scheduler =
            BatchScheduler::new(self.config.batch_size).with_progress(self.show_progress);
        let (corpus, stats) = scheduler.run(&files, scanner, &mut sink).await;

        // 语料级检查只在确实扫描过文件时有意义
        if category == AuditCategory::Accessibility && stats.files_scanned > 0 {
            let root = self.config.root.to_string_lossy().to_string();
            for finding in corpus_findings(&root, &corpus) {
                sink.record(finding);
            }
        }

        tracker.advance(AuditPhase::Draining);
        let findings = sink.close().await;

        tracker.advance(AuditPhase::Aggregating);
        let result = aggregate(category.as_str(), findings);

        tracker.advance(AuditPhase::Emitting);
        self.emit_category(category, &result, &corpus);

        tracker.advance(AuditPhase::Done);
        Ok(AuditOutcome {
            category,
            result,
            stats,
        })
    }

    /// 委托 linter 管线：调用外部工具 → 汇聚 → 落盘
    async fn run_delegated(
        &self,
        category: AuditCategory,
        kind: LinterKind,
    ) -> Result<AuditOutcome> {
        let mut tracker = PhaseTracker::new(category.as_str());

        let mut sink = IssueSink::open(&self.config.report_dir, category.as_str())
            .await?
            .with_cap(self.config.findings_cap);

        tracker.advance(AuditPhase::Scanning(0));
        let outcome = run_linter(kind, &self.config.root, self.config.project_type).await;
        for finding in outcome.findings {
            sink.record(finding);
        }

        tracker.advance(AuditPhase::Draining);
        let findings = sink.close().await;

        tracker.advance(AuditPhase::Aggregating);
        let result = aggregate(category.as_str(), findings);

        tracker.advance(AuditPhase::Emitting);
        self.emit_category(category, &result, &CorpusState::default());

        tracker.advance(AuditPhase::Done);
        Ok(AuditOutcome {
            category,
            result,
            stats: ScanStats::default(),
        })
    }

    fn emit_category(&self, category: AuditCategory, result: &AuditResult, corpus: &CorpusState) {
        let path = emit::report_path(&self.config.report_dir, category.as_str());
        if category == AuditCategory::Components {
            let report =
                ComponentUsageReport::new(result.clone(), corpus.components.clone());
            emit::write_json_report(&path, &report);
        } else {
            emit::write_json_report(&path, result);
        }
    }

    /// Emit the merged CI artifacts (HTML, SARIF, JUnit, CI summary) and
    /// return the gate evaluation.
    pub fn write_ci_artifacts(&self, outcomes: &[AuditOutcome]) -> CiSummary {
        let results: Vec<AuditResult> = outcomes.iter().map(|o| o.result.clone()).collect();
        let dir = &self.config.report_dir;

        emit::write_text_report(&dir.join("audit-report.html"), &html::render_html(&results));
        emit::write_json_report(&dir.join("fe-audit.sarif"), &sarif::to_sarif(&results));
        emit::write_text_report(&dir.join("junit-report.xml"), &junit::to_junit(&results));

        let summary = ci::evaluate_gates(&results, &self.config);
        emit::write_json_report(&dir.join("ci-summary.json"), &summary);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_parse_with_aliases() {
        assert_eq!(
            "a11y".parse::<AuditCategory>().unwrap(),
            AuditCategory::Accessibility
        );
        assert_eq!(
            "style".parse::<AuditCategory>().unwrap(),
            AuditCategory::Stylelint
        );
        assert!("quantum".parse::<AuditCategory>().is_err());
    }

    #[test]
    fn phases_render_for_logging() {
        assert_eq!(AuditPhase::Scanning(2).to_string(), "scanning(batch 2)");
        assert_eq!(AuditPhase::Done.to_string(), "done");
    }
}
