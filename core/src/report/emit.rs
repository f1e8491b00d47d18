// Report emitter - 报告落盘
// 写失败只记日志，绝不影响已经完成的扫描结果

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Serialize `value` as pretty JSON to `path`.
///
/// Returns whether the write succeeded; failures are logged and otherwise
/// swallowed — the in-memory result stays valid either way.
pub fn write_json_report<T: Serialize>(path: &Path, value: &T) -> bool {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!("failed to create report directory {}: {}", parent.display(), e);
            return false;
        }
    }
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("failed to serialize report {}: {}", path.display(), e);
            return false;
        }
    };
    match std::fs::write(path, json + "\n") {
        Ok(()) => {
            tracing::info!("report written to {}", path.display());
            true
        }
        Err(e) => {
            tracing::error!("failed to write report {}: {}", path.display(), e);
            false
        }
    }
}

/// Write a plain text artifact (HTML, XML) next to the JSON reports.
pub fn write_text_report(path: &Path, content: &str) -> bool {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!("failed to create report directory {}: {}", parent.display(), e);
            return false;
        }
    }
    match std::fs::write(path, content) {
        Ok(()) => {
            tracing::info!("report written to {}", path.display());
            true
        }
        Err(e) => {
            tracing::error!("failed to write report {}: {}", path.display(), e);
            false
        }
    }
}

/// 各类别报告文件的固定路径
pub fn report_path(report_dir: &Path, category: &str) -> PathBuf {
    let name = match category {
        "accessibility" => "accessibility-audit-report.json",
        "security" => "security-audit-report.json",
        "eslint" => "eslint-report.json",
        "stylelint" => "stylelint-report.json",
        "components" => "component-usage-report.json",
        other => return report_dir.join(format!("{}-report.json", other)),
    };
    report_dir.join(name)
}
