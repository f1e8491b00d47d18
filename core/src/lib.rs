// FE-Audit Core Library
// 核心功能库，包含批量扫描调度、逐行规则引擎、问题汇聚与报告输出

mod audit;
mod config;
mod detectors;
mod linters;
mod report;
mod rules;
mod scanner;

// 重新导出常用类型
pub use audit::{AuditCategory, AuditOutcome, AuditPhase, AuditRunner};
pub use config::{AuditConfig, CategoryGlobs, CategoryThresholds, ProjectType};
pub use report::ci::{evaluate_gates, CiGate, CiSummary};
pub use report::{aggregate, dedupe, AuditResult, SeveritySummary};
pub use report::{emit, html, junit, sarif};
pub use scanner::batch::{BatchScheduler, ScanStats};
pub use scanner::enumerate::enumerate_files;
pub use scanner::sink::IssueSink;
pub use scanner::{ComponentTally, CorpusState, FileReport, Finding, Scanner, Severity};

// 规则系统
pub use detectors::{accessibility_detectors, security_detectors, Detector, DetectorScanner};
pub use rules::{loader::load_rules_from_dir, model::Rule, model::RuleSet, scanner::compile_rules};

pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum AuditError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("configuration error: {0}")]
        Config(String),

        #[error("invalid pattern: {0}")]
        Pattern(String),

        #[error("issue sink error: {0}")]
        Sink(String),
    }

    pub type Result<T> = std::result::Result<T, AuditError>;
}
