//! Interview record and analysis data models.
//!
//! Wire names are camelCase to match the front-end contract; database rows
//! use snake_case columns and are mapped explicitly in the interviews module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Priority of an improvement item. Ordering is by urgency: high > medium > low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Rank used for descending stable sort (high first).
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// Inferred category of the interviewed position. Drives score breakdown
/// multipliers and prompt emphasis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionType {
    Technical,
    Product,
    Business,
    Design,
    #[default]
    General,
}

/// A single actionable improvement produced by analysis.
///
/// Created once at analysis completion; only `completed` is mutated later,
/// by the storage layer in response to user action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Role-specific numeric sub-scores derived from `overall_score`.
/// Always derived, never authoritative input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_skills: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_match: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<i64>,
}

/// The structured analysis result. Always fully populated by the enhancer:
/// every list is non-empty and `overall_score` is within 1–10.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewAnalysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvements: Vec<ImprovementItem>,
    pub overall_score: f64,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_type: Option<PositionType>,
}

/// One logged interview, as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub interview_date: String,
    pub interview_process: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<InterviewAnalysis>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_serde_lowercase() {
        let p: Priority = serde_json::from_str(r#""high""#).unwrap();
        assert_eq!(p, Priority::High);
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), r#""low""#);
    }

    #[test]
    fn test_priority_rank_ordering() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }

    #[test]
    fn test_analysis_wire_names_are_camel_case() {
        let analysis = InterviewAnalysis {
            strengths: vec!["清晰表达".to_string()],
            weaknesses: vec!["深度不足".to_string()],
            improvements: vec![],
            overall_score: 8.0,
            summary: "整体不错".to_string(),
            score_breakdown: None,
            position_type: Some(PositionType::Technical),
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["overallScore"], 8.0);
        assert_eq!(json["positionType"], "technical");
        assert!(json.get("scoreBreakdown").is_none());
    }

    #[test]
    fn test_improvement_item_optional_fields_omitted() {
        let item = ImprovementItem {
            id: "improvement-1".to_string(),
            title: "学习".to_string(),
            description: "系统学习".to_string(),
            priority: Priority::High,
            completed: false,
            estimated_duration: None,
            resources: vec![],
            milestones: vec![],
            tags: vec![],
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("estimatedDuration").is_none());
        assert!(json.get("resources").is_none());
        assert_eq!(json["completed"], false);
    }
}
