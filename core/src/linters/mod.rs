// Linters - 委托外部 linter
// 以子进程方式调用 ESLint / Stylelint，解析其 JSON 输出并换算为 Finding

pub mod eslint;
pub mod stylelint;

use crate::config::ProjectType;
use crate::scanner::Finding;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// 重试次数上限
const MAX_ATTEMPTS: u32 = 3;
/// 退避基准间隔
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// 支持的外部 linter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinterKind {
    Eslint,
    Stylelint,
}

impl LinterKind {
    pub fn binary(&self) -> &'static str {
        match self {
            LinterKind::Eslint => "eslint",
            LinterKind::Stylelint => "stylelint",
        }
    }

    fn args(&self) -> Vec<String> {
        match self {
            LinterKind::Eslint => vec![
                ".".into(),
                "--ext".into(),
                ".js,.jsx,.ts,.tsx".into(),
                "--format".into(),
                "json".into(),
            ],
            LinterKind::Stylelint => vec![
                "**/*.{css,scss,less}".into(),
                "--formatter".into(),
                "json".into(),
                "--allow-empty-input".into(),
            ],
        }
    }

    fn config_flag(&self) -> &'static str {
        match self {
            LinterKind::Eslint => "-c",
            LinterKind::Stylelint => "--config",
        }
    }

    /// 项目类型专属配置文件名
    fn typed_config(&self, project_type: ProjectType) -> String {
        match self {
            LinterKind::Eslint => format!(".eslintrc.{}.json", project_type),
            LinterKind::Stylelint => format!(".stylelintrc.{}.json", project_type),
        }
    }

    /// 常规配置文件名的兜底搜索路径
    fn fallback_configs(&self) -> &'static [&'static str] {
        match self {
            LinterKind::Eslint => &[
                ".eslintrc.json",
                ".eslintrc.js",
                ".eslintrc.cjs",
                "eslint.config.js",
                ".eslintrc",
            ],
            LinterKind::Stylelint => &[
                ".stylelintrc.json",
                ".stylelintrc",
                "stylelint.config.js",
            ],
        }
    }

    fn parse(&self, raw: &str, root: &Path) -> Vec<Finding> {
        match self {
            LinterKind::Eslint => eslint::parse_eslint_json(raw, root),
            LinterKind::Stylelint => stylelint::parse_stylelint_json(raw, root),
        }
    }
}

/// 一次 linter 运行的结果
#[derive(Debug, Default)]
pub struct LinterOutcome {
    pub findings: Vec<Finding>,
    pub success: bool,
    pub attempts: u32,
}

/// Pick the ruleset file for a project type.
///
/// The type-specific file wins; otherwise fall through the conventional
/// config filenames. `None` lets the tool use its own resolution.
pub fn select_config(kind: LinterKind, root: &Path, project_type: ProjectType) -> Option<PathBuf> {
    let typed = root.join(kind.typed_config(project_type));
    if typed.exists() {
        return Some(typed);
    }
    for name in kind.fallback_configs() {
        let candidate = root.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Resolve the linter binary: a project-local install wins over PATH.
fn resolve_binary(root: &Path, name: &str) -> PathBuf {
    let local = root.join("node_modules").join(".bin").join(name);
    if local.exists() {
        local
    } else {
        PathBuf::from(name)
    }
}

/// Run one delegated linter against the project root.
///
/// Invocation failures retry with exponential backoff up to `MAX_ATTEMPTS`;
/// after the last attempt the category falls back to an empty result. A
/// missing binary skips the retries entirely. Exit codes 0 and 1 both count
/// as success (1 just means findings were reported).
pub async fn run_linter(kind: LinterKind, root: &Path, project_type: ProjectType) -> LinterOutcome {
    let binary = resolve_binary(root, kind.binary());
    run_linter_binary(kind, &binary, root, project_type).await
}

async fn run_linter_binary(
    kind: LinterKind,
    binary: &Path,
    root: &Path,
    project_type: ProjectType,
) -> LinterOutcome {
    let config = select_config(kind, root, project_type);

    let mut outcome = LinterOutcome::default();
    for attempt in 1..=MAX_ATTEMPTS {
        outcome.attempts = attempt;

        let mut command = Command::new(binary);
        command.args(kind.args()).current_dir(root);
        if let Some(config) = &config {
            command.arg(kind.config_flag()).arg(config);
        }

        let output = match command.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    linter = kind.binary(),
                    "linter not installed, skipping delegation"
                );
                return outcome;
            }
            Err(e) => {
                tracing::warn!(
                    linter = kind.binary(),
                    attempt,
                    "linter spawn failed: {}",
                    e
                );
                backoff(attempt).await;
                continue;
            }
        };

        // 退出码 0/1 视为成功：1 只表示有问题被报告
        let code = output.status.code().unwrap_or(-1);
        if code > 1 || code < 0 {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                linter = kind.binary(),
                attempt,
                code,
                stderr = %stderr.chars().take(512).collect::<String>(),
                "linter exited with error"
            );
            backoff(attempt).await;
            continue;
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        outcome.findings = kind.parse(&raw, root);
        outcome.success = true;
        return outcome;
    }

    tracing::warn!(
        linter = kind.binary(),
        "all attempts failed, falling back to empty result"
    );
    outcome
}

async fn backoff(attempt: u32) {
    if attempt < MAX_ATTEMPTS {
        let delay = BACKOFF_BASE * 2u32.saturating_pow(attempt - 1);
        tokio::time::sleep(delay).await;
    }
}
