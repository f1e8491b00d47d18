use crate::detectors::{Detector, FileState};
use crate::rules::model::Rule;
use crate::scanner::Finding;
use regex::Regex;

/// 编译后的自定义规则，可直接挂入检查器序列
pub struct CompiledRule {
    rule: Rule,
    regex: Regex,
}

impl Detector for CompiledRule {
    fn name(&self) -> &str {
        &self.rule.id
    }

    fn check(&self, line: &str, _index: usize, state: &mut FileState) -> Vec<Finding> {
        if !self.rule.file_types.is_empty() {
            let applies = state
                .extension
                .as_deref()
                .map_or(false, |ext| self.rule.file_types.iter().any(|t| t == ext));
            if !applies {
                return vec![];
            }
        }
        if self.regex.is_match(line) {
            let mut finding = Finding::new(
                self.rule.id.clone(),
                self.rule.severity,
                self.rule.description.clone(),
            )
            .with_rule_id(self.rule.id.clone());
            if let Some(rec) = &self.rule.recommendation {
                finding = finding.with_recommendation(rec.clone());
            }
            if let Some(wcag) = &self.rule.wcag {
                finding = finding.with_wcag(wcag.clone());
            }
            vec![finding]
        } else {
            vec![]
        }
    }
}

/// Compile user rules into detectors. Rules with invalid regexes are skipped
/// with a warning, mirroring how unparseable rule files are handled upstream.
pub fn compile_rules(rules: Vec<Rule>) -> Vec<Box<dyn Detector>> {
    let mut compiled: Vec<Box<dyn Detector>> = Vec::new();
    for rule in rules {
        match Regex::new(&rule.pattern) {
            Ok(regex) => compiled.push(Box::new(CompiledRule { rule, regex })),
            Err(e) => {
                tracing::warn!("Invalid regex pattern for rule {}: {}", rule.id, e);
            }
        }
    }
    compiled
}
