//! Post-processing of a strategy's raw result into the final analysis.
//!
//! Assigns stable ids, derives tags from a fixed keyword table, orders
//! improvements by priority, fills missing durations and resources, infers
//! the position type, and computes the role-specific score breakdown. All
//! lookup tables are read-only constants shared across requests.

use uuid::Uuid;

use crate::analysis::parser::{RawAnalysis, RawImprovement};
use crate::models::interview::{
    ImprovementItem, InterviewAnalysis, PositionType, Priority, ScoreBreakdown,
};

// ────────────────────────────────────────────────────────────────────────────
// Constant lookup tables
// ────────────────────────────────────────────────────────────────────────────

const TAG_KEYWORDS: &[(&str, &[&str])] = &[
    ("algorithm", &["算法", "algorithm", "数据结构"]),
    ("system-design", &["系统设计", "架构", "system design"]),
    ("communication", &["沟通", "表达", "communication"]),
    ("teamwork", &["团队", "协作", "team", "collaboration"]),
    ("project-management", &["项目管理", "project management"]),
    ("learning", &["学习", "learning"]),
    ("coding", &["编程", "coding", "代码"]),
    ("testing", &["测试", "test", "qa"]),
];

const TAG_RESOURCES: &[(&str, &[&str])] = &[
    ("algorithm", &["LeetCode算法练习", "《算法导论》"]),
    ("system-design", &["《设计数据密集型应用》", "系统设计面试题集"]),
    ("communication", &["《金字塔原理》", "Toastmasters演讲俱乐部"]),
    ("coding", &["Clean Code编码规范", "GitHub开源项目贡献"]),
];

const DEFAULT_RESOURCES: [&str; 2] = ["相关技术博客", "在线课程平台"];

/// Position-type keyword sets, checked in this fixed priority order.
const POSITION_KEYWORDS: &[(PositionType, &[&str])] = &[
    (
        PositionType::Technical,
        &["技术", "算法", "编程", "代码", "系统设计"],
    ),
    (PositionType::Product, &["产品", "用户", "需求", "原型"]),
    (PositionType::Business, &["销售", "客户", "业务", "商务"]),
    (PositionType::Design, &["设计", "ui", "ux", "视觉"]),
];

// ────────────────────────────────────────────────────────────────────────────
// Enhancement
// ────────────────────────────────────────────────────────────────────────────

/// Turns a raw strategy result into the fully populated final analysis.
/// Every list in the output is non-empty and the score is within 1–10.
pub fn enhance_analysis(raw: RawAnalysis) -> InterviewAnalysis {
    let overall_score = normalize_score(raw.overall_score);

    let strengths = non_empty_or(raw.strengths, "面试表现良好");
    let weaknesses = non_empty_or(raw.weaknesses, "有提升空间");
    let summary = if raw.summary.trim().is_empty() {
        "分析完成".to_string()
    } else {
        raw.summary
    };

    let raw_improvements = if raw.improvements.is_empty() {
        vec![RawImprovement {
            title: "持续改进".to_string(),
            description: "基于面试反馈持续提升能力".to_string(),
            priority: Priority::Medium,
            ..Default::default()
        }]
    } else {
        raw.improvements
    };

    let mut improvements: Vec<ImprovementItem> =
        raw_improvements.into_iter().map(build_improvement).collect();
    // Descending by priority; sort_by is stable, so ties keep source order.
    improvements.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));

    let position_type = infer_position_type(&strengths, &weaknesses, &improvements, &summary);

    InterviewAnalysis {
        score_breakdown: Some(score_breakdown(overall_score, position_type)),
        strengths,
        weaknesses,
        improvements,
        overall_score,
        summary,
        position_type: Some(position_type),
    }
}

/// Scores outside 1–10 (or non-finite) fall back to 7.
fn normalize_score(score: f64) -> f64 {
    if score.is_finite() && (1.0..=10.0).contains(&score) {
        score
    } else {
        7.0
    }
}

fn non_empty_or(items: Vec<String>, default: &str) -> Vec<String> {
    if items.is_empty() {
        vec![default.to_string()]
    } else {
        items
    }
}

fn build_improvement(raw: RawImprovement) -> ImprovementItem {
    let tags = extract_tags(&raw.title, &raw.description);
    let estimated_duration = raw
        .estimated_duration
        .unwrap_or_else(|| default_duration(raw.priority).to_string());
    let resources = if raw.resources.is_empty() {
        recommend_resources(&tags)
    } else {
        raw.resources
    };

    ImprovementItem {
        id: format!("improvement-{}", Uuid::new_v4()),
        title: raw.title,
        description: raw.description,
        priority: raw.priority,
        completed: false,
        estimated_duration: Some(estimated_duration),
        resources,
        milestones: raw.milestones,
        tags,
    }
}

/// Keyword-matches title+description against the fixed tag table.
pub fn extract_tags(title: &str, description: &str) -> Vec<String> {
    let text = format!("{title} {description}").to_lowercase();
    TAG_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

fn default_duration(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "1-2周",
        Priority::Medium => "2-4周",
        Priority::Low => "4-8周",
    }
}

/// First tag with a resource list wins; generic two-item default otherwise.
fn recommend_resources(tags: &[String]) -> Vec<String> {
    let mut resources: Vec<String> = tags
        .iter()
        .filter_map(|tag| {
            TAG_RESOURCES
                .iter()
                .find(|(t, _)| *t == tag.as_str())
                .map(|(_, list)| list.iter().map(|r| r.to_string()))
        })
        .flatten()
        .collect();
    if resources.is_empty() {
        resources = DEFAULT_RESOURCES.iter().map(|r| r.to_string()).collect();
    }
    resources
}

/// Infers the position category from keyword presence over the whole result,
/// first matching category in fixed priority order.
fn infer_position_type(
    strengths: &[String],
    weaknesses: &[String],
    improvements: &[ImprovementItem],
    summary: &str,
) -> PositionType {
    let mut text = String::new();
    for s in strengths.iter().chain(weaknesses) {
        text.push_str(s);
    }
    for imp in improvements {
        text.push_str(&imp.title);
        text.push_str(&imp.description);
    }
    text.push_str(summary);
    let text = text.to_lowercase();

    POSITION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(position, _)| *position)
        .unwrap_or(PositionType::General)
}

/// Deterministic linear transforms of the overall score, keyed by position
/// type. Sub-scores are rounded to the nearest integer and intentionally not
/// clamped to 10.
fn score_breakdown(overall_score: f64, position_type: PositionType) -> ScoreBreakdown {
    let scaled = |factor: f64| Some((overall_score * factor).round() as i64);

    match position_type {
        PositionType::Technical => ScoreBreakdown {
            technical: scaled(0.9),
            soft_skills: scaled(0.8),
            fit_match: scaled(1.1),
            ..Default::default()
        },
        PositionType::Product => ScoreBreakdown {
            product: scaled(0.95),
            soft_skills: scaled(1.05),
            fit_match: scaled(0.9),
            ..Default::default()
        },
        PositionType::Business => ScoreBreakdown {
            business: scaled(0.9),
            soft_skills: scaled(1.1),
            fit_match: scaled(0.95),
            ..Default::default()
        },
        PositionType::Design | PositionType::General => ScoreBreakdown {
            technical: scaled(1.0),
            soft_skills: scaled(1.0),
            fit_match: scaled(1.0),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_improvement(title: &str, description: &str, priority: Priority) -> RawImprovement {
        RawImprovement {
            title: title.to_string(),
            description: description.to_string(),
            priority,
            ..Default::default()
        }
    }

    fn base_raw() -> RawAnalysis {
        RawAnalysis {
            strengths: vec!["表达清晰".to_string()],
            weaknesses: vec!["经验不足".to_string()],
            improvements: vec![raw_improvement("学习算法", "系统学习数据结构", Priority::High)],
            overall_score: 8.0,
            summary: "不错".to_string(),
        }
    }

    #[test]
    fn test_ids_are_unique_within_one_result() {
        let mut raw = base_raw();
        raw.improvements = vec![
            raw_improvement("a", "", Priority::High),
            raw_improvement("b", "", Priority::High),
            raw_improvement("c", "", Priority::High),
        ];
        let analysis = enhance_analysis(raw);
        let mut ids: Vec<&str> = analysis.improvements.iter().map(|i| i.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_improvements_sorted_by_priority_stable_on_ties() {
        let mut raw = base_raw();
        raw.improvements = vec![
            raw_improvement("low-1", "", Priority::Low),
            raw_improvement("med-1", "", Priority::Medium),
            raw_improvement("high-1", "", Priority::High),
            raw_improvement("med-2", "", Priority::Medium),
        ];
        let analysis = enhance_analysis(raw);
        let titles: Vec<&str> = analysis.improvements.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["high-1", "med-1", "med-2", "low-1"]);
    }

    #[test]
    fn test_duration_derived_from_priority_when_absent() {
        let mut raw = base_raw();
        raw.improvements = vec![
            raw_improvement("h", "", Priority::High),
            raw_improvement("m", "", Priority::Medium),
            raw_improvement("l", "", Priority::Low),
        ];
        let analysis = enhance_analysis(raw);
        let durations: Vec<&str> = analysis
            .improvements
            .iter()
            .map(|i| i.estimated_duration.as_deref().unwrap())
            .collect();
        assert_eq!(durations, vec!["1-2周", "2-4周", "4-8周"]);
    }

    #[test]
    fn test_supplied_duration_is_kept() {
        let mut raw = base_raw();
        raw.improvements[0].estimated_duration = Some("3周".to_string());
        let analysis = enhance_analysis(raw);
        assert_eq!(analysis.improvements[0].estimated_duration.as_deref(), Some("3周"));
    }

    #[test]
    fn test_tags_from_keyword_table() {
        let tags = extract_tags("深入学习算法", "多写代码，提升编程和沟通能力");
        assert!(tags.contains(&"algorithm".to_string()));
        assert!(tags.contains(&"coding".to_string()));
        assert!(tags.contains(&"communication".to_string()));
        assert!(tags.contains(&"learning".to_string()));
    }

    #[test]
    fn test_resources_recommended_from_tags() {
        let raw = base_raw();
        let analysis = enhance_analysis(raw);
        // "学习算法" tags as algorithm → algorithm resource list
        assert!(analysis.improvements[0]
            .resources
            .contains(&"LeetCode算法练习".to_string()));
    }

    #[test]
    fn test_resources_default_when_no_tag_matches() {
        let mut raw = base_raw();
        raw.improvements = vec![raw_improvement("休息好", "保证睡眠", Priority::Low)];
        let analysis = enhance_analysis(raw);
        assert_eq!(analysis.improvements[0].resources, vec!["相关技术博客", "在线课程平台"]);
    }

    #[test]
    fn test_score_out_of_range_defaults_to_seven() {
        for bad in [0.0, -3.0, 11.0, f64::NAN] {
            let mut raw = base_raw();
            raw.overall_score = bad;
            assert_eq!(enhance_analysis(raw).overall_score, 7.0);
        }
    }

    #[test]
    fn test_score_in_range_preserved_verbatim() {
        let mut raw = base_raw();
        raw.overall_score = 8.5;
        assert_eq!(enhance_analysis(raw).overall_score, 8.5);
    }

    #[test]
    fn test_empty_lists_replaced_with_defaults() {
        let raw = RawAnalysis {
            strengths: vec![],
            weaknesses: vec![],
            improvements: vec![],
            overall_score: 7.0,
            summary: String::new(),
        };
        let analysis = enhance_analysis(raw);
        assert_eq!(analysis.strengths, vec!["面试表现良好"]);
        assert_eq!(analysis.weaknesses, vec!["有提升空间"]);
        assert_eq!(analysis.improvements.len(), 1);
        assert_eq!(analysis.improvements[0].title, "持续改进");
        assert_eq!(analysis.summary, "分析完成");
    }

    #[test]
    fn test_technical_position_breakdown_multipliers() {
        let analysis = enhance_analysis(base_raw());
        assert_eq!(analysis.position_type, Some(PositionType::Technical));
        let breakdown = analysis.score_breakdown.unwrap();
        // 8 × 0.9 = 7.2 → 7; 8 × 0.8 = 6.4 → 6; 8 × 1.1 = 8.8 → 9
        assert_eq!(breakdown.technical, Some(7));
        assert_eq!(breakdown.soft_skills, Some(6));
        assert_eq!(breakdown.fit_match, Some(9));
    }

    #[test]
    fn test_breakdown_not_clamped_above_ten() {
        let mut raw = base_raw();
        raw.overall_score = 10.0;
        let breakdown = enhance_analysis(raw).score_breakdown.unwrap();
        assert_eq!(breakdown.fit_match, Some(11));
    }

    #[test]
    fn test_general_position_breakdown_passthrough() {
        let raw = RawAnalysis {
            strengths: vec!["踏实".to_string()],
            weaknesses: vec!["紧张".to_string()],
            improvements: vec![raw_improvement("放松心态", "深呼吸", Priority::Medium)],
            overall_score: 6.0,
            summary: "加油".to_string(),
        };
        let analysis = enhance_analysis(raw);
        assert_eq!(analysis.position_type, Some(PositionType::General));
        let breakdown = analysis.score_breakdown.unwrap();
        assert_eq!(breakdown.technical, Some(6));
        assert_eq!(breakdown.soft_skills, Some(6));
        assert_eq!(breakdown.fit_match, Some(6));
    }

    #[test]
    fn test_completed_always_false_at_creation() {
        let analysis = enhance_analysis(base_raw());
        assert!(analysis.improvements.iter().all(|i| !i.completed));
    }
}
