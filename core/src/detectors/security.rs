// Security detectors - 安全检查规则
// 同样的行级正则启发式，覆盖常见的前端安全反模式

use super::{Detector, FileState};
use crate::scanner::{Finding, Severity};
use regex::Regex;

/// The security rule family, in its fixed execution order.
pub fn security_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(HardcodedSecretDetector::new()),
        Box::new(EvalDetector::new()),
        Box::new(UnsafeHtmlDetector::new()),
        Box::new(DocumentWriteDetector::new()),
        Box::new(InsecureUrlDetector::new()),
        Box::new(TargetBlankDetector::new()),
    ]
}

/// 硬编码口令 / 密钥
struct HardcodedSecretDetector {
    secret: Regex,
}

impl HardcodedSecretDetector {
    fn new() -> Self {
        Self {
            secret: Regex::new(
                r#"(?i)\b(password|passwd|secret|api[_-]?key|access[_-]?token|auth[_-]?token)\b\s*[:=]\s*['"][^'"]+['"]"#,
            )
            .unwrap(),
        }
    }
}

impl Detector for HardcodedSecretDetector {
    fn name(&self) -> &str {
        "hardcoded_secret"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        if self.secret.is_match(line) {
            vec![Finding::new(
                "hardcoded_secret",
                Severity::High,
                "Possible hardcoded credential or API key",
            )
            .with_recommendation("Move secrets to environment variables or a secret store")]
        } else {
            vec![]
        }
    }
}

/// eval / Function 构造
struct EvalDetector {
    eval: Regex,
}

impl EvalDetector {
    fn new() -> Self {
        Self {
            eval: Regex::new(r"(\beval\s*\(|\bnew\s+Function\s*\()").unwrap(),
        }
    }
}

impl Detector for EvalDetector {
    fn name(&self) -> &str {
        "eval_usage"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        if self.eval.is_match(line) {
            vec![Finding::new(
                "eval_usage",
                Severity::High,
                "eval or Function constructor executes arbitrary strings",
            )
            .with_recommendation("Replace dynamic code evaluation with explicit logic")]
        } else {
            vec![]
        }
    }
}

/// innerHTML / dangerouslySetInnerHTML 直接写入
struct UnsafeHtmlDetector {
    sink: Regex,
}

impl UnsafeHtmlDetector {
    fn new() -> Self {
        Self {
            sink: Regex::new(r"(\.(inner|outer)HTML\s*=|dangerouslySetInnerHTML)").unwrap(),
        }
    }
}

impl Detector for UnsafeHtmlDetector {
    fn name(&self) -> &str {
        "unsafe_html"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        if self.sink.is_match(line) {
            vec![Finding::new(
                "unsafe_html",
                Severity::Medium,
                "Raw HTML assignment can introduce XSS",
            )
            .with_recommendation("Use textContent, or sanitize the markup before inserting it")]
        } else {
            vec![]
        }
    }
}

/// document.write
struct DocumentWriteDetector {
    write: Regex,
}

impl DocumentWriteDetector {
    fn new() -> Self {
        Self {
            write: Regex::new(r"\bdocument\.write(ln)?\s*\(").unwrap(),
        }
    }
}

impl Detector for DocumentWriteDetector {
    fn name(&self) -> &str {
        "document_write"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        if self.write.is_match(line) {
            vec![Finding::new(
                "document_write",
                Severity::Medium,
                "document.write blocks parsing and is an XSS vector",
            )
            .with_recommendation("Build DOM nodes explicitly instead")]
        } else {
            vec![]
        }
    }
}

/// 明文 http:// 资源引用（localhost 除外）
struct InsecureUrlDetector {
    url: Regex,
    local: Regex,
}

impl InsecureUrlDetector {
    fn new() -> Self {
        Self {
            url: Regex::new(r"http://[^\s'\x22)>]+").unwrap(),
            local: Regex::new(r"http://(localhost|127\.0\.0\.1|0\.0\.0\.0|\[::1\])").unwrap(),
        }
    }
}

impl Detector for InsecureUrlDetector {
    fn name(&self) -> &str {
        "insecure_url"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        let mut findings = Vec::new();
        for m in self.url.find_iter(line) {
            if self.local.is_match(m.as_str()) {
                continue;
            }
            findings.push(
                Finding::new(
                    "insecure_url",
                    Severity::Medium,
                    "Resource loaded over plain http",
                )
                .with_recommendation("Serve external resources over https"),
            );
        }
        findings
    }
}

/// target="_blank" 缺少 rel="noopener"
struct TargetBlankDetector {
    blank: Regex,
    noopener: Regex,
}

impl TargetBlankDetector {
    fn new() -> Self {
        Self {
            blank: Regex::new(r#"(?i)\btarget\s*=\s*["']_blank["']"#).unwrap(),
            noopener: Regex::new(r#"(?i)\brel\s*=\s*["'][^"']*(noopener|noreferrer)"#).unwrap(),
        }
    }
}

impl Detector for TargetBlankDetector {
    fn name(&self) -> &str {
        "target_blank"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        if self.blank.is_match(line) && !self.noopener.is_match(line) {
            vec![Finding::new(
                "unsafe_target_blank",
                Severity::Low,
                "target=\"_blank\" without rel=\"noopener\"",
            )
            .with_recommendation("Add rel=\"noopener noreferrer\" to links opening new tabs")]
        } else {
            vec![]
        }
    }
}
