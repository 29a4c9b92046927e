//! Multi-strategy extraction of a structured analysis from accumulated
//! model output.
//!
//! The model intermixes free-form "thinking" prose with an eventual JSON
//! block, and sometimes emits no JSON at all. Strategies run in fixed
//! priority order; the first one producing a usable result wins, and the
//! Fallback strategy always matches, so the caller always gets a valid
//! analysis back.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::analysis::enhancer::enhance_analysis;
use crate::models::interview::{InterviewAnalysis, Priority};

// ────────────────────────────────────────────────────────────────────────────
// Raw (pre-enhancement) result types
// ────────────────────────────────────────────────────────────────────────────

/// An improvement as extracted by a strategy, before ids/tags/resources are
/// assigned.
#[derive(Debug, Clone, Default)]
pub struct RawImprovement {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub estimated_duration: Option<String>,
    pub resources: Vec<String>,
    pub milestones: Vec<String>,
}

/// A strategy's validated output, handed to the enhancer.
#[derive(Debug, Clone)]
pub struct RawAnalysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvements: Vec<RawImprovement>,
    pub overall_score: f64,
    pub summary: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy chain
// ────────────────────────────────────────────────────────────────────────────

/// The ordered parsing strategies. A thrown-away (`None`) or unusable result
/// advances to the next entry; no individual failure propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    JsonExtraction,
    StructuredText,
    /// Extension slot for richer language-model-based structuring.
    NlpAnalysis,
    Fallback,
}

pub const STRATEGY_CHAIN: [ParseStrategy; 4] = [
    ParseStrategy::JsonExtraction,
    ParseStrategy::StructuredText,
    ParseStrategy::NlpAnalysis,
    ParseStrategy::Fallback,
];

impl ParseStrategy {
    pub fn name(self) -> &'static str {
        match self {
            ParseStrategy::JsonExtraction => "JsonExtraction",
            ParseStrategy::StructuredText => "StructuredText",
            ParseStrategy::NlpAnalysis => "NlpAnalysis",
            ParseStrategy::Fallback => "Fallback",
        }
    }

    fn attempt(self, content: &str) -> Option<RawAnalysis> {
        match self {
            ParseStrategy::JsonExtraction => attempt_json_extraction(content),
            ParseStrategy::StructuredText => attempt_structured_text(content),
            ParseStrategy::NlpAnalysis => None,
            ParseStrategy::Fallback => Some(fallback_analysis()),
        }
    }
}

/// Parses accumulated stream content into a final analysis.
/// Never fails: the Fallback strategy accepts any input.
pub fn parse_streaming_result(content: &str) -> InterviewAnalysis {
    let raw = STRATEGY_CHAIN
        .iter()
        .find_map(|strategy| {
            let raw = strategy.attempt(content).filter(is_usable);
            if raw.is_some() {
                debug!("Parse strategy {} matched", strategy.name());
            }
            raw
        })
        // Fallback always matches; this branch is unreachable in practice.
        .unwrap_or_else(fallback_analysis);

    enhance_analysis(raw)
}

/// A strategy result is usable when every mandatory section is non-empty.
fn is_usable(raw: &RawAnalysis) -> bool {
    !raw.strengths.is_empty()
        && !raw.weaknesses.is_empty()
        && !raw.improvements.is_empty()
        && !raw.summary.trim().is_empty()
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy 1: JSON extraction
// ────────────────────────────────────────────────────────────────────────────

fn attempt_json_extraction(content: &str) -> Option<RawAnalysis> {
    if let Some(candidate) = scan_balanced_forward(content) {
        if let Some(raw) = parse_candidate_json(candidate) {
            return Some(raw);
        }
    }
    if let Some(candidate) = scan_balanced_backward(content) {
        if let Some(raw) = parse_candidate_json(candidate) {
            return Some(raw);
        }
    }
    None
}

/// Scans from the first `{` for the balanced matching `}`. Quote- and
/// escape-aware: braces inside JSON strings do not count toward the balance.
fn scan_balanced_forward(content: &str) -> Option<&str> {
    let start = content.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, ch) in content[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Scans backward from the last `}` for a balanced span ending there.
/// Intentionally not string-aware, matching the observed extraction behavior
/// when multiple JSON-like blocks are present.
fn scan_balanced_backward(content: &str) -> Option<&str> {
    let end = content.rfind('}')?;

    let mut depth = 0isize;
    for (offset, ch) in content[..=end].char_indices().rev() {
        match ch {
            '}' => depth += 1,
            '{' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[offset..=end]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses a candidate span and validates the five mandatory keys with their
/// required types. Array fields that arrived as free text make this strategy
/// non-matching, deferring to structured-text extraction.
fn parse_candidate_json(candidate: &str) -> Option<RawAnalysis> {
    let value: Value = serde_json::from_str(candidate).ok()?;

    let strengths = string_array(value.get("strengths")?)?;
    let weaknesses = string_array(value.get("weaknesses")?)?;
    let improvements = value.get("improvements")?.as_array()?;
    let overall_score = value.get("overallScore")?.as_f64()?;
    let summary = value.get("summary")?.as_str()?.to_string();

    let improvements = improvements
        .iter()
        .map(raw_improvement_from_json)
        .collect();

    Some(RawAnalysis {
        strengths,
        weaknesses,
        improvements,
        overall_score,
        summary,
    })
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
    )
}

fn raw_improvement_from_json(item: &Value) -> RawImprovement {
    let title = item
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("改进建议")
        .to_string();
    let description = item
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let priority = item
        .get("priority")
        .and_then(Value::as_str)
        .and_then(parse_priority)
        .unwrap_or_default();

    RawImprovement {
        title,
        description,
        priority,
        estimated_duration: item
            .get("estimatedDuration")
            .and_then(Value::as_str)
            .map(str::to_string),
        resources: item
            .get("resources")
            .map(|v| string_array(v).unwrap_or_default())
            .unwrap_or_default(),
        milestones: item
            .get("milestones")
            .map(|v| string_array(v).unwrap_or_default())
            .unwrap_or_default(),
    }
}

fn parse_priority(s: &str) -> Option<Priority> {
    match s {
        "high" => Some(Priority::High),
        "medium" => Some(Priority::Medium),
        "low" => Some(Priority::Low),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy 2: structured text
// ────────────────────────────────────────────────────────────────────────────

struct SectionRegexes {
    strengths: Regex,
    weaknesses: Regex,
    improvements: Regex,
    score: Regex,
    summary: Regex,
}

fn section_regexes() -> &'static SectionRegexes {
    static REGEXES: OnceLock<SectionRegexes> = OnceLock::new();
    REGEXES.get_or_init(|| SectionRegexes {
        strengths: Regex::new(r"(?s)(?:优点|优势|表现良好)(.*?)(?:缺点|不足|需要改进|建议)")
            .expect("strengths section regex"),
        weaknesses: Regex::new(r"(?s)(?:缺点|不足|需要改进)(.*?)(?:建议|改进|评分)")
            .expect("weaknesses section regex"),
        improvements: Regex::new(r"(?s)(?:建议|改进|行动计划)(.*?)(?:评分|总结|整体)")
            .expect("improvements section regex"),
        score: Regex::new(r"(?s)(?:评分|得分|分数).*?(\d+(?:\.\d+)?)").expect("score regex"),
        summary: Regex::new(r"(?s)(?:总结|整体|综合)(.*)$").expect("summary regex"),
    })
}

fn list_item_regexes() -> &'static [Regex; 3] {
    static REGEXES: OnceLock<[Regex; 3]> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            Regex::new(r"(?m)^\s*[•\-\*]\s*(.+)").expect("bullet list regex"),
            Regex::new(r"(?m)^\s*\d+[\.、\)]\s*(.+)").expect("numbered list regex"),
            Regex::new(r"(?m)^\s*[一二三四五六七八九十]+\s*[、\.]\s*(.+)")
                .expect("chinese numeral list regex"),
        ]
    })
}

fn attempt_structured_text(content: &str) -> Option<RawAnalysis> {
    let regexes = section_regexes();

    let strengths_section = capture_section(&regexes.strengths, content);
    let weaknesses_section = capture_section(&regexes.weaknesses, content);
    let improvements_section = capture_section(&regexes.improvements, content);
    let summary_section = capture_section(&regexes.summary, content);

    let overall_score = regexes
        .score
        .captures(content)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(7.0);

    let improvements = extract_list_items(&improvements_section)
        .into_iter()
        .map(|item| RawImprovement {
            title: extract_title(&item),
            priority: guess_priority(&item),
            description: item,
            ..Default::default()
        })
        .collect();

    Some(RawAnalysis {
        strengths: extract_list_items(&strengths_section),
        weaknesses: extract_list_items(&weaknesses_section),
        improvements,
        overall_score,
        summary: clean_fragment(&summary_section),
    })
}

fn capture_section(regex: &Regex, content: &str) -> String {
    regex
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts list items from one section. Marker patterns are tried in order
/// and the first one that matches wins; with no markers, the section is split
/// on sentence-ending punctuation, and a non-empty section never yields an
/// empty list.
fn extract_list_items(section: &str) -> Vec<String> {
    if section.trim().is_empty() {
        return Vec::new();
    }

    for regex in list_item_regexes() {
        let items: Vec<String> = regex
            .captures_iter(section)
            .filter_map(|c| c.get(1))
            .map(|m| clean_fragment(m.as_str()))
            .filter(|item| !item.is_empty())
            .collect();
        if !items.is_empty() {
            return items;
        }
    }

    let sentences: Vec<String> = section
        .split(['。', '！', '？', '.'])
        .map(clean_fragment)
        .filter(|s| {
            let len = s.chars().count();
            len > 5 && len < 200
        })
        .take(5)
        .collect();
    if !sentences.is_empty() {
        return sentences;
    }

    vec![clean_fragment(section)]
}

/// Trims whitespace plus leading/trailing list punctuation off a fragment.
fn clean_fragment(fragment: &str) -> String {
    fragment
        .trim()
        .trim_start_matches(['：', ':', '，', ',', '、', '。'])
        .trim_end_matches(['。', '！', '？'])
        .trim()
        .to_string()
}

/// Title: first clause of the item, capped at 30 characters.
fn extract_title(item: &str) -> String {
    let first = item
        .split(['，', '。', '：', '；'])
        .next()
        .unwrap_or(item)
        .trim();
    if first.chars().count() > 30 {
        let truncated: String = first.chars().take(30).collect();
        format!("{truncated}...")
    } else {
        first.to_string()
    }
}

const HIGH_PRIORITY_KEYWORDS: [&str; 6] = ["重要", "关键", "核心", "必须", "急需", "迫切"];
const LOW_PRIORITY_KEYWORDS: [&str; 5] = ["可以", "建议", "尝试", "考虑", "适当"];

fn guess_priority(item: &str) -> Priority {
    if HIGH_PRIORITY_KEYWORDS.iter().any(|k| item.contains(k)) {
        Priority::High
    } else if LOW_PRIORITY_KEYWORDS.iter().any(|k| item.contains(k)) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy 4: fallback
// ────────────────────────────────────────────────────────────────────────────

/// Fixed generic analysis. Always usable, guaranteeing the chain terminates
/// with a valid result for any input.
fn fallback_analysis() -> RawAnalysis {
    RawAnalysis {
        strengths: vec!["表现积极，态度认真".to_string()],
        weaknesses: vec!["需要进一步提升专业技能".to_string()],
        improvements: vec![RawImprovement {
            title: "继续学习和实践".to_string(),
            description: "建议继续深入学习相关技能，多参与实际项目练习".to_string(),
            priority: Priority::Medium,
            ..Default::default()
        }],
        overall_score: 7.0,
        summary: "整体表现良好，继续努力！".to_string(),
    }
}
