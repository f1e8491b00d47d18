// File enumerator - 文件枚举
// 将 include/exclude glob 解析为确定的文件列表

use crate::error::{AuditError, Result};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Resolve include/exclude glob patterns into a concrete, sorted file list.
///
/// Include patterns whitelist files; exclude patterns are applied on top.
/// Standard ignore files (.gitignore, hidden entries) are honored the same
/// way the directory walker does elsewhere. Output order is stable so that
/// repeated runs over an unchanged tree scan files in the same sequence.
pub fn enumerate_files(root: &Path, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut overrides = OverrideBuilder::new(root);
    for pattern in include {
        overrides
            .add(pattern)
            .map_err(|e| AuditError::Pattern(format!("{}: {}", pattern, e)))?;
    }
    for pattern in exclude {
        // 前缀 ! 表示排除
        overrides
            .add(&format!("!{}", pattern))
            .map_err(|e| AuditError::Pattern(format!("{}: {}", pattern, e)))?;
    }
    let overrides = overrides
        .build()
        .map_err(|e| AuditError::Pattern(e.to_string()))?;

    let walker = WalkBuilder::new(root).overrides(overrides).build();

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().map_or(false, |ft| ft.is_file()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                tracing::warn!("walk error: {}", e);
            }
        }
    }
    files.sort();
    Ok(files)
}
