use crate::rules::model::{Rule, RuleSet};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Load every YAML rule file under `path`.
///
/// A file may hold either a `RuleSet` or a single `Rule`. Unparseable files
/// are skipped with a warning so one bad pack does not take the scan down.
pub fn load_rules_from_dir<P: AsRef<Path>>(path: P) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();

    for entry in WalkDir::new(path) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(extension) = path.extension() else {
            continue;
        };
        if extension != "yaml" && extension != "yml" {
            continue;
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file: {:?}", path))?;

        // 先按 RuleSet 解析，失败再按单条 Rule 解析
        if let Ok(rule_set) = serde_yaml::from_str::<RuleSet>(&content) {
            rules.extend(rule_set.rules);
        } else if let Ok(rule) = serde_yaml::from_str::<Rule>(&content) {
            rules.push(rule);
        } else {
            tracing::warn!("Failed to parse rule file: {:?}", path);
        }
    }

    Ok(rules)
}
