// Accessibility detectors - 可访问性检查规则
// 行级正则启发式，不做 AST 解析，也不计算真实对比度

use super::{Detector, FileState};
use crate::scanner::{CorpusState, Finding, Severity};
use regex::Regex;

/// The accessibility rule family, in its fixed execution order.
pub fn accessibility_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(ImgAltDetector::new()),
        Box::new(HeadingDetector::new()),
        Box::new(FormLabelDetector::new()),
        Box::new(ClickKeyboardDetector::new()),
        Box::new(AriaDetector::new()),
        Box::new(TabindexDetector::new()),
        Box::new(DialogFocusDetector::new()),
        Box::new(ColorLiteralDetector::new()),
        Box::new(LandmarkProbe::new()),
    ]
}

/// Corpus-level findings derived from the merged accumulator after the last
/// batch. Only meaningful when at least one file was scanned.
pub fn corpus_findings(root: &str, corpus: &CorpusState) -> Vec<Finding> {
    let mut out = Vec::new();
    if !corpus.landmark {
        out.push(
            Finding::new(
                "missing_landmark",
                Severity::Medium,
                "No landmark elements found in the scanned files",
            )
            .at_file(root, None)
            .with_recommendation("Add <main>, <nav> or <header> landmarks so assistive technology can navigate by region")
            .with_wcag("1.3.1")
            .with_source("custom"),
        );
    }
    if !corpus.skip_link {
        out.push(
            Finding::new(
                "missing_skip_link",
                Severity::Low,
                "No skip link found in the scanned files",
            )
            .at_file(root, None)
            .with_recommendation("Provide a \"skip to content\" link as the first focusable element")
            .with_wcag("2.4.1")
            .with_source("custom"),
        );
    }
    out
}

/// 图片 alt 属性检查：缺失 / 空值 / 泛化描述
struct ImgAltDetector {
    tag: Regex,
    alt: Regex,
    empty_alt: Regex,
    generic_alt: Regex,
}

impl ImgAltDetector {
    fn new() -> Self {
        Self {
            tag: Regex::new(r"(?i)<img\b[^>]*").unwrap(),
            alt: Regex::new(r#"(?i)\balt\s*="#).unwrap(),
            empty_alt: Regex::new(r#"(?i)\balt\s*=\s*(""|'')"#).unwrap(),
            generic_alt: Regex::new(r#"(?i)\balt\s*=\s*["'](image|img|photo|picture|graphic|icon)["']"#)
                .unwrap(),
        }
    }
}

impl Detector for ImgAltDetector {
    fn name(&self) -> &str {
        "img_alt"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        let mut findings = Vec::new();
        for m in self.tag.find_iter(line) {
            let tag = m.as_str();
            if !self.alt.is_match(tag) {
                findings.push(
                    Finding::new(
                        "missing_alt",
                        Severity::High,
                        "Image element is missing an alt attribute",
                    )
                    .with_recommendation("Add a descriptive alt attribute; use alt=\"\" only for decorative images")
                    .with_wcag("1.1.1"),
                );
            } else if self.empty_alt.is_match(tag) {
                findings.push(
                    Finding::new(
                        "empty_alt",
                        Severity::Medium,
                        "Image has an empty alt attribute",
                    )
                    .with_recommendation("Confirm the image is purely decorative; otherwise describe it")
                    .with_wcag("1.1.1"),
                );
            } else if self.generic_alt.is_match(tag) {
                findings.push(
                    Finding::new(
                        "generic_alt",
                        Severity::Medium,
                        "Image alt text is a generic placeholder",
                    )
                    .with_recommendation("Describe what the image conveys instead of its medium")
                    .with_wcag("1.1.1"),
                );
            }
        }
        findings
    }
}

/// 标题层级检查：跳级与重复 h1
struct HeadingDetector {
    heading: Regex,
}

impl HeadingDetector {
    fn new() -> Self {
        Self {
            heading: Regex::new(r"(?i)<h([1-6])\b").unwrap(),
        }
    }
}

impl Detector for HeadingDetector {
    fn name(&self) -> &str {
        "heading_structure"
    }

    fn check(&self, line: &str, _index: usize, state: &mut FileState) -> Vec<Finding> {
        let mut findings = Vec::new();
        for cap in self.heading.captures_iter(line) {
            let level: u32 = cap[1].parse().unwrap_or(1);
            if level == 1 {
                state.h1_seen += 1;
                if state.h1_seen > 1 {
                    findings.push(
                        Finding::new(
                            "multiple_h1",
                            Severity::Medium,
                            "More than one <h1> heading in the same document",
                        )
                        .with_recommendation("Keep a single <h1> per page and nest the rest below it")
                        .with_wcag("1.3.1"),
                    );
                }
            }
            if let Some(prev) = state.last_heading_level {
                if level > prev + 1 {
                    findings.push(
                        Finding::new(
                            "skipped_heading",
                            Severity::Medium,
                            format!(
                                "Heading level {} follows level {} without a preceding level {}",
                                level,
                                prev,
                                level - 1
                            ),
                        )
                        .with_recommendation("Do not skip heading levels; they describe document structure")
                        .with_wcag("1.3.1"),
                    );
                }
            }
            state.last_heading_level = Some(level);
        }
        findings
    }
}

/// 表单控件标签检查
struct FormLabelDetector {
    control: Regex,
    exempt_type: Regex,
    labelled: Regex,
}

impl FormLabelDetector {
    fn new() -> Self {
        Self {
            control: Regex::new(r"(?i)<(input|select|textarea)\b[^>]*").unwrap(),
            exempt_type: Regex::new(r#"(?i)\btype\s*=\s*["']?(hidden|submit|reset|button|image)"#)
                .unwrap(),
            labelled: Regex::new(r"(?i)(aria-label\s*=|aria-labelledby\s*=|\bid\s*=)").unwrap(),
        }
    }
}

impl Detector for FormLabelDetector {
    fn name(&self) -> &str {
        "form_label"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        let mut findings = Vec::new();
        for m in self.control.find_iter(line) {
            let tag = m.as_str();
            if self.exempt_type.is_match(tag) {
                continue;
            }
            if !self.labelled.is_match(tag) {
                findings.push(
                    Finding::new(
                        "missing_label",
                        Severity::High,
                        "Form control has no label, aria-label or aria-labelledby association",
                    )
                    .with_recommendation("Associate a <label for> via id, or add aria-label")
                    .with_wcag("3.3.2"),
                );
            }
        }
        findings
    }
}

/// 点击事件缺少键盘等价操作
struct ClickKeyboardDetector {
    click: Regex,
    keyboard: Regex,
    native: Regex,
}

impl ClickKeyboardDetector {
    fn new() -> Self {
        Self {
            click: Regex::new(r"(?i)\bonclick\s*=").unwrap(),
            keyboard: Regex::new(r"(?i)\bonkey(down|up|press)\s*=").unwrap(),
            native: Regex::new(r"(?i)<(button|a|input|select|textarea|option|label)\b").unwrap(),
        }
    }
}

impl Detector for ClickKeyboardDetector {
    fn name(&self) -> &str {
        "click_keyboard"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        if self.click.is_match(line) && !self.keyboard.is_match(line) && !self.native.is_match(line)
        {
            vec![Finding::new(
                "click_no_keyboard",
                Severity::Medium,
                "Click handler on a non-interactive element without a keyboard equivalent",
            )
            .with_recommendation("Add onKeyDown handling and tabindex=\"0\", or use a <button>")
            .with_wcag("2.1.1")]
        } else {
            vec![]
        }
    }
}

/// ARIA 属性检查：空值与同一标签内重复
struct AriaDetector {
    full_tag: Regex,
    empty: Regex,
    attr: Regex,
}

impl AriaDetector {
    fn new() -> Self {
        Self {
            full_tag: Regex::new(r"<[^>]+>").unwrap(),
            empty: Regex::new(r#"(?i)\b(aria-[a-z]+)\s*=\s*(""|'')"#).unwrap(),
            attr: Regex::new(r"(?i)\b(aria-[a-z]+)\s*=").unwrap(),
        }
    }
}

impl Detector for AriaDetector {
    fn name(&self) -> &str {
        "aria_attributes"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        let mut findings = Vec::new();
        for cap in self.empty.captures_iter(line) {
            findings.push(
                Finding::new(
                    "empty_aria",
                    Severity::Medium,
                    format!("ARIA attribute {} has an empty value", &cap[1].to_lowercase()),
                )
                .with_recommendation("Remove the attribute or give it a meaningful value")
                .with_wcag("4.1.2"),
            );
        }
        for tag in self.full_tag.find_iter(line) {
            let mut seen = Vec::new();
            for cap in self.attr.captures_iter(tag.as_str()) {
                let name = cap[1].to_lowercase();
                if seen.contains(&name) {
                    findings.push(
                        Finding::new(
                            "duplicate_aria",
                            Severity::Medium,
                            format!("Duplicate ARIA attribute {} on one element", name),
                        )
                        .with_recommendation("Keep a single instance of each ARIA attribute")
                        .with_wcag("4.1.2"),
                    );
                } else {
                    seen.push(name);
                }
            }
        }
        findings
    }
}

/// 正数 tabindex 检查
struct TabindexDetector {
    positive: Regex,
}

impl TabindexDetector {
    fn new() -> Self {
        Self {
            positive: Regex::new(r#"(?i)\btabindex\s*=\s*["']?\+?[1-9][0-9]*"#).unwrap(),
        }
    }
}

impl Detector for TabindexDetector {
    fn name(&self) -> &str {
        "tabindex"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        if self.positive.is_match(line) {
            vec![Finding::new(
                "positive_tabindex",
                Severity::Medium,
                "Positive tabindex overrides the natural focus order",
            )
            .with_recommendation("Use tabindex=\"0\" or reorder the DOM instead")
            .with_wcag("2.4.3")]
        } else {
            vec![]
        }
    }
}

/// 对话框焦点管理启发式
struct DialogFocusDetector {
    dialog: Regex,
    aria_modal: Regex,
}

impl DialogFocusDetector {
    fn new() -> Self {
        Self {
            dialog: Regex::new(r#"(?i)(<dialog\b|role\s*=\s*["']dialog["'])"#).unwrap(),
            aria_modal: Regex::new(r"(?i)\baria-modal\s*=").unwrap(),
        }
    }
}

impl Detector for DialogFocusDetector {
    fn name(&self) -> &str {
        "dialog_focus"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        if self.dialog.is_match(line) && !self.aria_modal.is_match(line) {
            vec![Finding::new(
                "missing_focus_trap",
                Severity::Low,
                "Dialog without aria-modal; focus may escape the modal",
            )
            .with_recommendation("Add aria-modal=\"true\" and trap focus while the dialog is open")
            .with_wcag("2.4.3")]
        } else {
            vec![]
        }
    }
}

/// 颜色字面量仅标记供人工复核，不计算对比度
struct ColorLiteralDetector {
    color: Regex,
}

impl ColorLiteralDetector {
    fn new() -> Self {
        Self {
            color: Regex::new(
                r"(?i)(#[0-9a-f]{8}\b|#[0-9a-f]{6}\b|#[0-9a-f]{4}\b|#[0-9a-f]{3}\b|\brgba?\(|\bhsla?\()",
            )
            .unwrap(),
        }
    }
}

impl Detector for ColorLiteralDetector {
    fn name(&self) -> &str {
        "color_literal"
    }

    fn check(&self, line: &str, _index: usize, _state: &mut FileState) -> Vec<Finding> {
        if self.color.is_match(line) {
            vec![Finding::new(
                "color_contrast",
                Severity::Low,
                "Color literal found; contrast ratio not verified",
            )
            .with_recommendation("Check foreground/background contrast manually (4.5:1 for body text)")
            .with_wcag("1.4.3")]
        } else {
            vec![]
        }
    }
}

/// Landmark / skip-link 探测：只设置 corpus 标志，不直接产出问题
struct LandmarkProbe {
    landmark: Regex,
    skip_link: Regex,
}

impl LandmarkProbe {
    fn new() -> Self {
        Self {
            landmark: Regex::new(
                r#"(?i)(<main\b|<nav\b|<header\b|<footer\b|role\s*=\s*["'](main|banner|navigation|contentinfo)["'])"#,
            )
            .unwrap(),
            skip_link: Regex::new(
                r#"(?i)(href\s*=\s*["']#(main|content|top)\b|class\s*=\s*["'][^"']*\bskip|skip to (main )?content)"#,
            )
            .unwrap(),
        }
    }
}

impl Detector for LandmarkProbe {
    fn name(&self) -> &str {
        "landmark_probe"
    }

    fn check(&self, line: &str, _index: usize, state: &mut FileState) -> Vec<Finding> {
        if self.landmark.is_match(line) {
            state.corpus.landmark = true;
        }
        if self.skip_link.is_match(line) {
            state.corpus.skip_link = true;
        }
        vec![]
    }
}
