// Configuration - 审计配置
// 项目类型、分类 glob、批大小与 CI 阈值；支持可选的 feaudit.yaml

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 项目类型，决定委托 linter 的配置选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    React,
    Node,
    #[default]
    Vanilla,
    Typescript,
    TypescriptReact,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::React => "react",
            ProjectType::Node => "node",
            ProjectType::Vanilla => "vanilla",
            ProjectType::Typescript => "typescript",
            ProjectType::TypescriptReact => "typescript-react",
        }
    }
}

impl FromStr for ProjectType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "react" => Ok(ProjectType::React),
            "node" => Ok(ProjectType::Node),
            "vanilla" => Ok(ProjectType::Vanilla),
            "typescript" => Ok(ProjectType::Typescript),
            "typescript-react" | "typescript+react" => Ok(ProjectType::TypescriptReact),
            other => Err(AuditError::Config(format!(
                "unknown project type: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个审计类别的 include/exclude glob
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryGlobs {
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_excludes() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/dist/**",
        "**/build/**",
        "**/coverage/**",
        "**/reports/**",
        "**/*.min.js",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// CI 阈值：每个级别允许的最大问题数
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryThresholds {
    #[serde(default)]
    pub max_high: usize,
    #[serde(default = "unlimited")]
    pub max_medium: usize,
    #[serde(default = "unlimited")]
    pub max_low: usize,
}

fn unlimited() -> usize {
    usize::MAX
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        // 默认只对 high 设限
        Self {
            max_high: 0,
            max_medium: usize::MAX,
            max_low: usize::MAX,
        }
    }
}

/// 审计运行配置
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// 被审计项目根目录
    pub root: PathBuf,
    /// 报告输出目录
    pub report_dir: PathBuf,
    /// 批大小（并发上限）
    pub batch_size: usize,
    pub project_type: ProjectType,
    /// 浏览器端测试的目标 URL，由外部协作方消费
    pub urls: Vec<String>,
    /// 单类别问题数量上限
    pub findings_cap: usize,
    /// 自定义 YAML 规则目录
    pub rules_dir: Option<PathBuf>,
    /// 各类别的 glob 覆盖
    pub globs: BTreeMap<String, CategoryGlobs>,
    /// 各类别的 CI 阈值
    pub thresholds: BTreeMap<String, CategoryThresholds>,
}

impl AuditConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let report_dir = root.join("reports");
        Self {
            root,
            report_dir,
            batch_size: crate::scanner::batch::DEFAULT_BATCH_SIZE,
            project_type: ProjectType::default(),
            urls: Vec::new(),
            findings_cap: crate::scanner::sink::DEFAULT_FINDINGS_CAP,
            rules_dir: None,
            globs: BTreeMap::new(),
            thresholds: BTreeMap::new(),
        }
    }

    /// Load configuration, merging an optional `feaudit.yaml`.
    ///
    /// An explicitly given path that does not exist is a fatal configuration
    /// error; a missing default file is not.
    pub fn load(root: impl Into<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::new(root);
        let path = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(AuditError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => {
                let default = config.root.join("feaudit.yaml");
                if !default.exists() {
                    return Ok(config);
                }
                default
            }
        };

        let raw = std::fs::read_to_string(&path)?;
        let file: ConfigFile = serde_yaml::from_str(&raw)
            .map_err(|e| AuditError::Config(format!("{}: {}", path.display(), e)))?;
        config.apply(file);
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) {
        if let Some(report_dir) = file.report_dir {
            self.report_dir = self.root.join(report_dir);
        }
        if let Some(batch_size) = file.batch_size {
            self.batch_size = batch_size.max(1);
        }
        if let Some(project_type) = file.project_type {
            self.project_type = project_type;
        }
        if let Some(cap) = file.findings_cap {
            self.findings_cap = cap.max(1);
        }
        if let Some(rules_dir) = file.rules_dir {
            self.rules_dir = Some(self.root.join(rules_dir));
        }
        if !file.urls.is_empty() {
            self.urls = file.urls;
        }
        self.globs.extend(file.globs);
        self.thresholds.extend(file.thresholds);
    }

    /// Globs for a category: explicit override, else the built-in defaults.
    pub fn globs_for(&self, category: &str) -> CategoryGlobs {
        if let Some(globs) = self.globs.get(category) {
            return globs.clone();
        }
        let include = match category {
            "accessibility" => vec!["**/*.html", "**/*.htm", "**/*.jsx", "**/*.tsx"],
            "security" => vec![
                "**/*.js", "**/*.jsx", "**/*.ts", "**/*.tsx", "**/*.html", "**/*.htm",
            ],
            "components" => vec!["**/*.js", "**/*.jsx", "**/*.ts", "**/*.tsx"],
            _ => vec!["**/*"],
        };
        CategoryGlobs {
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: default_excludes(),
        }
    }

    pub fn thresholds_for(&self, category: &str) -> CategoryThresholds {
        self.thresholds.get(category).copied().unwrap_or_default()
    }
}

/// feaudit.yaml 的文件模型，全部字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    report_dir: Option<PathBuf>,
    batch_size: Option<usize>,
    project_type: Option<ProjectType>,
    findings_cap: Option<usize>,
    rules_dir: Option<PathBuf>,
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    globs: BTreeMap<String, CategoryGlobs>,
    #[serde(default)]
    thresholds: BTreeMap<String, CategoryThresholds>,
}
