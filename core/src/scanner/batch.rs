// Batch scheduler - 批量调度
// 将文件列表按固定大小分批，批内并发扫描，批间严格串行

use crate::scanner::sink::IssueSink;
use crate::scanner::{CorpusState, FileReport, Scanner};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// 默认批大小
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Summary counters for one scheduled scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Number of files scanned successfully.
    pub files_scanned: usize,
    /// Files that could not be read; each contributed zero findings.
    pub files_failed: usize,
    /// Sequential scheduling steps taken (`ceil(N / batch_size)`).
    pub batches: usize,
    /// Findings recorded into the sink.
    pub findings: usize,
}

/// Drives file scans in fixed-size batches.
///
/// Within a batch all files are scanned concurrently; the next batch starts
/// only once every task of the current one resolved. That sequencing is the
/// back-pressure mechanism: at most `batch_size` file contents are resident
/// at a time.
pub struct BatchScheduler {
    batch_size: usize,
    show_progress: bool,
}

impl BatchScheduler {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            show_progress: false,
        }
    }

    /// Enable the in-place progress line on stderr.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Scan `files` with `scanner`, recording findings into `sink`.
    ///
    /// A single file's read failure is logged as a warning and treated as
    /// zero findings; it never aborts the batch or the run. Corpus state from
    /// each file is OR-merged into the returned accumulator.
    pub async fn run(
        &self,
        files: &[PathBuf],
        scanner: Arc<dyn Scanner>,
        sink: &mut IssueSink,
    ) -> (CorpusState, ScanStats) {
        let mut corpus = CorpusState::default();
        let mut stats = ScanStats::default();
        let total = files.len();
        let mut done = 0usize;

        for batch in files.chunks(self.batch_size) {
            stats.batches += 1;
            let mut set: JoinSet<(usize, Option<FileReport>)> = JoinSet::new();

            for (slot, path) in batch.iter().enumerate() {
                let path = path.clone();
                let scanner = Arc::clone(&scanner);
                set.spawn(async move { (slot, scan_one(&path, scanner.as_ref()).await) });
            }

            // 等待整批完成后才进入下一批；完成顺序不定，结果按槽位回填，
            // 使问题记录顺序与文件顺序一致
            let mut slots: Vec<Option<FileReport>> = (0..batch.len()).map(|_| None).collect();
            while let Some(joined) = set.join_next().await {
                done += 1;
                match joined {
                    Ok((slot, report)) => slots[slot] = report,
                    Err(e) => {
                        tracing::warn!("scan task failed: {}", e);
                    }
                }
                if self.show_progress {
                    // 末尾覆盖式进度行，最后一次写入生效
                    eprint!("\r  scanned {}/{} files", done, total);
                    let _ = std::io::stderr().flush();
                }
            }

            for report in slots {
                match report {
                    Some(report) => {
                        stats.files_scanned += 1;
                        corpus.merge(report.corpus);
                        for finding in report.findings {
                            stats.findings += 1;
                            sink.record(finding);
                        }
                    }
                    None => {
                        stats.files_failed += 1;
                    }
                }
            }
        }

        if self.show_progress && total > 0 {
            eprintln!();
        }
        (corpus, stats)
    }
}

async fn scan_one(path: &Path, scanner: &dyn Scanner) -> Option<FileReport> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Some(scanner.scan_file(path, &content).await),
        Err(e) => {
            tracing::warn!("skipping unreadable file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{Finding, Severity};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scanner that tracks how many files are in flight at once.
    struct ConcurrencyProbe {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Scanner for ConcurrencyProbe {
        fn name(&self) -> String {
            "ConcurrencyProbe".to_string()
        }

        async fn scan_file(&self, path: &Path, _content: &str) -> FileReport {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            FileReport {
                findings: vec![Finding::new("probe", Severity::Low, "seen")
                    .at_file(path.to_string_lossy(), Some(1))],
                corpus: CorpusState::default(),
            }
        }
    }

    fn fixture_files(dir: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("f{}.js", i));
                std::fs::write(&path, "content").unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn schedules_ceil_n_over_b_batches() {
        let dir = tempfile::tempdir().unwrap();
        let files = fixture_files(dir.path(), 7);
        let probe = Arc::new(ConcurrencyProbe {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let mut sink = IssueSink::in_memory("test");
        let scheduler = BatchScheduler::new(3);
        let (_, stats) = scheduler.run(&files, probe.clone(), &mut sink).await;

        assert_eq!(stats.batches, 3); // ceil(7/3)
        assert_eq!(stats.files_scanned, 7);
        assert!(probe.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(sink.len(), 7);
    }

    #[tokio::test]
    async fn unreadable_file_contributes_zero_findings() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = fixture_files(dir.path(), 2);
        files.push(dir.path().join("missing.js"));
        files.sort();

        let probe = Arc::new(ConcurrencyProbe {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let mut sink = IssueSink::in_memory("test");
        let (_, stats) = BatchScheduler::new(5).run(&files, probe, &mut sink).await;

        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn empty_file_list_runs_zero_batches() {
        let probe = Arc::new(ConcurrencyProbe {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let mut sink = IssueSink::in_memory("test");
        let (corpus, stats) = BatchScheduler::new(5).run(&[], probe, &mut sink).await;
        assert_eq!(stats.batches, 0);
        assert_eq!(corpus, CorpusState::default());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn batch_size_is_clamped_to_at_least_one() {
        assert_eq!(BatchScheduler::new(0).batch_size(), 1);
    }
}
