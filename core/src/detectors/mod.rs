// Detectors - 逐行规则引擎
// 每个 detector 都是独立、可单测的纯函数式检查器

mod a11y;
mod security;

pub use self::a11y::{accessibility_detectors, corpus_findings};
pub use self::security::security_detectors;

use crate::scanner::{clip_snippet, extract_context, CorpusState, FileReport, Finding, Scanner};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Per-file state threaded through the detector sequence.
///
/// Holds what structural detectors need to look back at earlier lines
/// (heading history) and the corpus-wide sightings merged by the scheduler.
#[derive(Debug, Default)]
pub struct FileState {
    /// 当前文件扩展名（小写），供按扩展名过滤的规则使用
    pub extension: Option<String>,
    pub last_heading_level: Option<u32>,
    pub h1_seen: usize,
    pub corpus: CorpusState,
}

impl FileState {
    pub fn for_path(path: &Path) -> Self {
        Self {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase()),
            ..Self::default()
        }
    }
}

/// 单条检查规则
///
/// Detectors are order-insensitive for correctness but run in a fixed
/// sequence so duplicate suppression stays deterministic. A detector returns
/// findings without location; the scanner fills in file, line, code and
/// context afterwards.
pub trait Detector: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, line: &str, index: usize, state: &mut FileState) -> Vec<Finding>;
}

/// Scanner that applies an ordered detector list to each line of a file.
pub struct DetectorScanner {
    name: String,
    root: PathBuf,
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorScanner {
    pub fn new(name: impl Into<String>, root: &Path, detectors: Vec<Box<dyn Detector>>) -> Self {
        Self {
            name: name.into(),
            root: root.to_path_buf(),
            detectors,
        }
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

#[async_trait]
impl Scanner for DetectorScanner {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn scan_file(&self, path: &Path, content: &str) -> FileReport {
        let file = self.display_path(path);
        let lines: Vec<&str> = content.lines().collect();
        let mut state = FileState::for_path(path);
        let mut findings = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            for detector in &self.detectors {
                for mut finding in detector.check(line, index, &mut state) {
                    finding.file = Some(file.clone());
                    finding.line = Some(index + 1);
                    if finding.code.is_none() {
                        finding.code = Some(clip_snippet(line));
                    }
                    if finding.context.is_none() {
                        finding.context = Some(extract_context(&lines, index));
                    }
                    if finding.source.is_none() {
                        finding.source = Some("custom".to_string());
                    }
                    findings.push(finding);
                }
            }
        }

        FileReport {
            findings,
            corpus: state.corpus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Severity;

    struct OnWord;

    impl Detector for OnWord {
        fn name(&self) -> &str {
            "on_word"
        }

        fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
            if line.contains("needle") {
                vec![Finding::new("needle", Severity::Low, "needle found")]
            } else {
                vec![]
            }
        }
    }

    #[tokio::test]
    async fn scanner_attaches_location_code_context_and_source() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = DetectorScanner::new("test", dir.path(), vec![Box::new(OnWord)]);
        let path = dir.path().join("src/x.js");
        let report = scanner.scan_file(&path, "alpha\nneedle here\nomega\n").await;

        assert_eq!(report.findings.len(), 1);
        let f = &report.findings[0];
        assert_eq!(f.file.as_deref(), Some("src/x.js"));
        assert_eq!(f.line, Some(2));
        assert_eq!(f.code.as_deref(), Some("needle here"));
        assert!(f.context.as_deref().unwrap().contains(">    2 | needle here"));
        assert_eq!(f.source.as_deref(), Some("custom"));
    }

    #[tokio::test]
    async fn detector_sequence_is_pure_and_order_stable() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = DetectorScanner::new(
            "a11y",
            dir.path(),
            accessibility_detectors(),
        );
        let content = "<img src=\"a.png\">\n<h1>t</h1>\n<h3>s</h3>\n";
        let path = dir.path().join("page.html");
        let first = scanner.scan_file(&path, content).await.findings;
        let second = scanner.scan_file(&path, content).await.findings;
        assert_eq!(first, second);
    }
}
