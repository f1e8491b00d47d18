// Scanner module - 扫描器模块
// 定义扫描器的核心接口和问题记录类型

pub mod batch;
pub mod enumerate;
pub mod sink;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// 存储片段的最大长度（字符数）
pub const SNIPPET_MAX: usize = 200;
/// 截断标记，附加在被裁剪的片段之后
pub const TRUNCATION_MARKER: &str = "... (truncated)";
/// 上下文提取时目标行前后各取的行数
const CONTEXT_RADIUS: usize = 2;

/// 问题严重级别（high > medium > low）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Ordering weight, larger is more severe.
    pub fn weight(&self) -> u8 {
        match self {
            Severity::High => 2,
            Severity::Medium => 1,
            Severity::Low => 0,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 审计发现的单个问题
///
/// Identity for deduplication is the composite key
/// `(file_or_url, line, type, message)`; everything else is presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wcag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl Finding {
    pub fn new(issue_type: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            issue_type: issue_type.into(),
            severity,
            message: message.into(),
            file: None,
            line: None,
            url: None,
            code: None,
            context: None,
            recommendation: None,
            source: None,
            wcag: None,
            rule_id: None,
        }
    }

    pub fn at_file(mut self, file: impl Into<String>, line: Option<usize>) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self
    }

    pub fn at_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(clip_snippet(code));
        self
    }

    pub fn with_recommendation(mut self, rec: impl Into<String>) -> Self {
        self.recommendation = Some(rec.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_wcag(mut self, wcag: impl Into<String>) -> Self {
        self.wcag = Some(wcag.into());
        self
    }

    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    /// 去重组合键：位置 + 行号 + 类型 + 消息
    pub fn dedup_key(&self) -> (String, Option<usize>, String, String) {
        let location = self
            .file
            .clone()
            .or_else(|| self.url.clone())
            .unwrap_or_default();
        (
            location,
            self.line,
            self.issue_type.clone(),
            self.message.clone(),
        )
    }
}

/// 组件引用统计（按组件名汇总）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTally {
    pub imported: usize,
    pub rendered: usize,
}

/// Corpus-wide accumulator carried across the whole file list.
///
/// Each file scan returns its own copy; the batch scheduler merges them, so
/// no ambient mutable state is shared between concurrent scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusState {
    pub landmark: bool,
    pub skip_link: bool,
    pub components: BTreeMap<String, ComponentTally>,
}

impl CorpusState {
    pub fn merge(&mut self, other: CorpusState) {
        self.landmark |= other.landmark;
        self.skip_link |= other.skip_link;
        for (name, tally) in other.components {
            let entry = self.components.entry(name).or_default();
            entry.imported += tally.imported;
            entry.rendered += tally.rendered;
        }
    }
}

/// 单个文件的扫描结果
#[derive(Debug, Default)]
pub struct FileReport {
    pub findings: Vec<Finding>,
    pub corpus: CorpusState,
}

/// 扫描器 trait - 所有扫描器都需要实现此接口
#[async_trait]
pub trait Scanner: Send + Sync {
    /// 返回扫描器名称
    fn name(&self) -> String;

    /// 扫描单个文件
    async fn scan_file(&self, path: &Path, content: &str) -> FileReport;
}

/// Clip a snippet for storage.
///
/// Detection always runs on the untruncated line; this bound applies only to
/// what gets stored on the finding. The stored value never exceeds 214
/// characters including the marker.
pub fn clip_snippet(s: &str) -> String {
    let trimmed = s.trim_end();
    if trimmed.chars().count() <= SNIPPET_MAX {
        return trimmed.to_string();
    }
    let mut clipped: String = trimmed.chars().take(SNIPPET_MAX - 1).collect();
    clipped.push_str(TRUNCATION_MARKER);
    clipped
}

/// Extract surrounding lines for human review.
///
/// Lines get a number gutter and the target line a `>` marker. The window is
/// clipped to file boundaries; leading/trailing blank lines are stripped and
/// runs of blank lines collapse to one.
pub fn extract_context(lines: &[&str], index: usize) -> String {
    if lines.is_empty() || index >= lines.len() {
        return String::new();
    }
    let start = index.saturating_sub(CONTEXT_RADIUS);
    let end = (index + CONTEXT_RADIUS).min(lines.len() - 1);

    let mut entries: Vec<(usize, String, bool)> = Vec::new();
    for i in start..=end {
        entries.push((i + 1, lines[i].trim_end().to_string(), i == index));
    }

    // 去掉首尾空行（目标行除外）
    while entries
        .first()
        .map_or(false, |(_, text, target)| text.is_empty() && !target)
    {
        entries.remove(0);
    }
    while entries
        .last()
        .map_or(false, |(_, text, target)| text.is_empty() && !target)
    {
        entries.pop();
    }

    let mut out = String::new();
    let mut prev_blank = false;
    for (no, text, target) in entries {
        let blank = text.is_empty() && !target;
        if blank && prev_blank {
            continue;
        }
        prev_blank = blank;
        let marker = if target { ">" } else { " " };
        let rendered = clip_snippet(&text);
        out.push_str(&format!("{} {:>4} | {}\n", marker, no, rendered));
    }
    out.trim_end_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Severity::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn finding_serializes_camel_case_and_skips_none() {
        let f = Finding::new("missing_alt", Severity::High, "no alt")
            .at_file("src/a.html", Some(10))
            .with_rule_id("img-alt");
        let json = serde_json::to_string(&f).unwrap();
        assert!(json.contains("\"type\":\"missing_alt\""));
        assert!(json.contains("\"ruleId\":\"img-alt\""));
        assert!(!json.contains("\"url\""));
        assert!(!json.contains("\"context\""));
    }

    #[test]
    fn short_snippets_pass_through() {
        let s = "a".repeat(SNIPPET_MAX);
        assert_eq!(clip_snippet(&s), s);
    }

    #[test]
    fn long_snippets_are_clipped_with_marker() {
        let s = "x".repeat(500);
        let clipped = clip_snippet(&s);
        assert!(clipped.ends_with(TRUNCATION_MARKER));
        assert!(clipped.chars().count() <= 214);
    }

    #[test]
    fn context_marks_target_and_clips_to_bounds() {
        let lines = vec!["one", "two", "three"];
        let ctx = extract_context(&lines, 0);
        assert!(ctx.starts_with(">    1 | one"));
        assert!(ctx.contains("     3 | three"));
    }

    #[test]
    fn context_collapses_blank_runs() {
        let lines = vec!["", "", "target", "", ""];
        let ctx = extract_context(&lines, 2);
        assert_eq!(ctx, ">    3 | target");
    }

    #[test]
    fn corpus_state_merges_with_or_semantics() {
        let mut a = CorpusState::default();
        let mut b = CorpusState::default();
        b.landmark = true;
        b.components.insert(
            "Button".into(),
            ComponentTally {
                imported: 1,
                rendered: 2,
            },
        );
        a.merge(b);
        let mut c = CorpusState::default();
        c.components.insert(
            "Button".into(),
            ComponentTally {
                imported: 1,
                rendered: 0,
            },
        );
        a.merge(c);
        assert!(a.landmark);
        assert!(!a.skip_link);
        assert_eq!(a.components["Button"].imported, 2);
        assert_eq!(a.components["Button"].rendered, 2);
    }

    #[test]
    fn dedup_key_prefers_file_over_url() {
        let f = Finding::new("t", Severity::Low, "m").at_file("a.js", Some(3));
        assert_eq!(f.dedup_key().0, "a.js");
        let u = Finding::new("t", Severity::Low, "m").at_url("https://example.com");
        assert_eq!(u.dedup_key().0, "https://example.com");
    }
}
