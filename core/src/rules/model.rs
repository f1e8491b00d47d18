use crate::scanner::Severity;
use serde::{Deserialize, Serialize};

/// 单条自定义规则（正则匹配）
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub wcag: Option<String>,
    /// 限定扩展名；为空表示对所有文件生效
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub file_types: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RuleSet {
    pub name: String,
    pub version: String,
    pub rules: Vec<Rule>,
}
