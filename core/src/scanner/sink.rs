// Issue sink - 问题流水账
// 权威状态保存在内存里；JSONL 镜像异步落盘，仅作持久化副本

use crate::error::{AuditError, Result};
use crate::scanner::Finding;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// 单个审计类别默认的问题数量上限
pub const DEFAULT_FINDINGS_CAP: usize = 10_000;

/// Append-only issue log for one audit category.
///
/// The in-memory vector is the single source of truth for the run. Each
/// `record` also enqueues the finding to a write-behind task that mirrors it
/// to `<category>-issues.jsonl`, one JSON record per line. The mirror file is
/// truncated at open (no cross-run accumulation) and is never read back
/// within the same run.
pub struct IssueSink {
    category: String,
    findings: Vec<Finding>,
    cap: usize,
    dropped: usize,
    tx: Option<mpsc::UnboundedSender<String>>,
    writer: Option<JoinHandle<()>>,
}

impl IssueSink {
    /// Open the sink for a category, truncating any prior run's mirror file.
    ///
    /// Failure to create the mirror file is fatal: the run aborts before any
    /// scanning starts.
    pub async fn open(report_dir: &Path, category: &str) -> Result<Self> {
        tokio::fs::create_dir_all(report_dir).await?;
        let path: PathBuf = report_dir.join(format!("{}-issues.jsonl", category));
        let file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| AuditError::Sink(format!("cannot open {}: {}", path.display(), e)))?;

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let writer = tokio::spawn(async move {
            let mut out = BufWriter::new(file);
            while let Some(line) = rx.recv().await {
                if let Err(e) = out.write_all(line.as_bytes()).await {
                    tracing::warn!("issue sink write failed: {}", e);
                    break;
                }
                if let Err(e) = out.write_all(b"\n").await {
                    tracing::warn!("issue sink write failed: {}", e);
                    break;
                }
            }
            if let Err(e) = out.flush().await {
                tracing::warn!("issue sink flush failed: {}", e);
            }
        });

        Ok(Self {
            category: category.to_string(),
            findings: Vec::new(),
            cap: DEFAULT_FINDINGS_CAP,
            dropped: 0,
            tx: Some(tx),
            writer: Some(writer),
        })
    }

    /// In-memory only variant, no disk mirror. Used by scans that aggregate
    /// straight away and by tests.
    pub fn in_memory(category: &str) -> Self {
        Self {
            category: category.to_string(),
            findings: Vec::new(),
            cap: DEFAULT_FINDINGS_CAP,
            dropped: 0,
            tx: None,
            writer: None,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Append one finding. Fire-and-forget relative to the disk mirror.
    pub fn record(&mut self, finding: Finding) {
        if self.findings.len() >= self.cap {
            self.dropped += 1;
            return;
        }
        if let Some(tx) = &self.tx {
            match serde_json::to_string(&finding) {
                Ok(json) => {
                    // Receiver生命周期由 close 控制，发送失败只影响镜像
                    let _ = tx.send(json);
                }
                Err(e) => tracing::warn!("issue sink serialize failed: {}", e),
            }
        }
        self.findings.push(finding);
    }

    /// Close the sink: drain the write-behind queue, then hand back the
    /// authoritative in-memory findings.
    pub async fn close(mut self) -> Vec<Finding> {
        drop(self.tx.take());
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.await {
                tracing::warn!("issue sink writer task failed: {}", e);
            }
        }
        if self.dropped > 0 {
            tracing::warn!(
                category = %self.category,
                dropped = self.dropped,
                "findings cap reached, excess findings dropped"
            );
        }
        self.findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Severity;

    fn finding(n: usize) -> Finding {
        Finding::new("t", Severity::Low, format!("issue {}", n)).at_file("a.js", Some(n))
    }

    #[tokio::test]
    async fn close_returns_recorded_findings_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = IssueSink::open(dir.path(), "accessibility").await.unwrap();
        sink.record(finding(1));
        sink.record(finding(2));
        let findings = sink.close().await;
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].line, Some(1));
    }

    #[tokio::test]
    async fn mirror_file_holds_one_json_record_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = IssueSink::open(dir.path(), "security").await.unwrap();
        sink.record(finding(1));
        sink.record(finding(2));
        sink.record(finding(3));
        let _ = sink.close().await;

        let raw = std::fs::read_to_string(dir.path().join("security-issues.jsonl")).unwrap();
        let lines: Vec<_> = raw.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let parsed: Finding = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.issue_type, "t");
        }
    }

    #[tokio::test]
    async fn reopen_truncates_prior_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = IssueSink::open(dir.path(), "security").await.unwrap();
        sink.record(finding(1));
        sink.record(finding(2));
        let _ = sink.close().await;

        let mut sink = IssueSink::open(dir.path(), "security").await.unwrap();
        sink.record(finding(9));
        let _ = sink.close().await;

        let raw = std::fs::read_to_string(dir.path().join("security-issues.jsonl")).unwrap();
        assert_eq!(raw.lines().count(), 1);
    }

    #[tokio::test]
    async fn cap_bounds_retained_findings() {
        let mut sink = IssueSink::in_memory("security").with_cap(2);
        for n in 0..5 {
            sink.record(finding(n));
        }
        let findings = sink.close().await;
        assert_eq!(findings.len(), 2);
    }
}
