// Component usage audit - 组件引用统计
// 统计 import 与 JSX 渲染次数，标记导入后从未使用的组件

use crate::report::AuditResult;
use crate::scanner::{ComponentTally, CorpusState, FileReport, Finding, Scanner, Severity};
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Scans JS/TS sources for component imports and JSX usage.
///
/// Tallies flow through the corpus accumulator like the landmark flags do;
/// per-file findings cover imports that are never referenced again.
pub struct ComponentScanner {
    root: PathBuf,
    default_import: Regex,
    named_import: Regex,
    jsx_tag: Regex,
}

impl ComponentScanner {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            default_import: Regex::new(r#"^\s*import\s+([A-Z][A-Za-z0-9_]*)\s*(?:,|\s+from\s)"#)
                .unwrap(),
            named_import: Regex::new(r#"^\s*import\s+[^{'"]*\{([^}]*)\}\s*from\s+['"]"#).unwrap(),
            jsx_tag: Regex::new(r"<([A-Z][A-Za-z0-9_]*)[\s/>]").unwrap(),
        }
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// 这一行 import 了哪些组件名（首字母大写的说明符）
    fn imported_names(&self, line: &str) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(cap) = self.default_import.captures(line) {
            names.push(cap[1].to_string());
        }
        if let Some(cap) = self.named_import.captures(line) {
            for spec in cap[1].split(',') {
                // `Original as Alias` 以本地名为准
                let local = spec.split_whitespace().last().unwrap_or("").trim();
                if local
                    .chars()
                    .next()
                    .map_or(false, |c| c.is_ascii_uppercase())
                {
                    names.push(local.to_string());
                }
            }
        }
        names
    }
}

#[async_trait]
impl Scanner for ComponentScanner {
    fn name(&self) -> String {
        "ComponentScanner".to_string()
    }

    async fn scan_file(&self, path: &Path, content: &str) -> FileReport {
        let file = self.display_path(path);
        let lines: Vec<&str> = content.lines().collect();
        let mut corpus = CorpusState::default();
        let mut findings = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            for name in self.imported_names(line) {
                corpus.components.entry(name.clone()).or_default().imported += 1;

                // 除 import 行以外的引用次数
                let reference = Regex::new(&format!(r"\b{}\b", name)).unwrap();
                let uses: usize = lines
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != index)
                    .map(|(_, l)| reference.find_iter(l).count())
                    .sum();
                if uses == 0 {
                    findings.push(
                        Finding::new(
                            "unused_component",
                            Severity::Low,
                            format!("Component {} is imported but never used", name),
                        )
                        .at_file(file.clone(), Some(index + 1))
                        .with_code(line)
                        .with_recommendation("Remove the unused import or render the component")
                        .with_source("custom"),
                    );
                }
            }
        }

        for cap in self.jsx_tag.captures_iter(content) {
            corpus
                .components
                .entry(cap[1].to_string())
                .or_default()
                .rendered += 1;
        }

        FileReport { findings, corpus }
    }
}

/// component-usage-report.json 的文件模型
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUsageReport {
    #[serde(flatten)]
    pub result: AuditResult,
    pub total_components: usize,
    pub components: BTreeMap<String, ComponentTally>,
}

impl ComponentUsageReport {
    pub fn new(result: AuditResult, components: BTreeMap<String, ComponentTally>) -> Self {
        Self {
            total_components: components.len(),
            components,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tallies_imports_and_renders() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = ComponentScanner::new(dir.path());
        let content = "import Button from './Button';\nimport { Card, Modal as Dialog } from './ui';\nexport const App = () => <Card><Button label=\"go\" /></Card>;\n";
        let report = scanner
            .scan_file(&dir.path().join("App.jsx"), content)
            .await;

        assert_eq!(report.corpus.components["Button"].imported, 1);
        assert_eq!(report.corpus.components["Button"].rendered, 1);
        assert_eq!(report.corpus.components["Card"].rendered, 1);
        // Dialog 导入后未被使用
        let unused: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.issue_type == "unused_component")
            .collect();
        assert_eq!(unused.len(), 1);
        assert!(unused[0].message.contains("Dialog"));
        assert_eq!(unused[0].line, Some(2));
    }

    #[tokio::test]
    async fn lowercase_imports_are_not_components() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = ComponentScanner::new(dir.path());
        let content = "import { useState } from 'react';\n";
        let report = scanner.scan_file(&dir.path().join("x.js"), content).await;
        assert!(report.corpus.components.is_empty());
        assert!(report.findings.is_empty());
    }
}
