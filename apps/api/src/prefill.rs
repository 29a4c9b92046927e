//! Smart prefill for the interview form: company/position suggestions,
//! per-role process templates, and preparation tips.
//!
//! Explicitly constructed in `main` and carried in `AppState`; suggestion
//! lists are ordinary owned state behind a lock, updated as records are
//! created. No process-wide singleton.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

const MAX_COMPANY_SUGGESTIONS: usize = 20;
const MAX_POSITION_SUGGESTIONS: usize = 8;

/// Category of interview, detected from the position title. Drives the
/// process template and the prompt emphasis block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Technical,
    Product,
    Business,
    Design,
    Hr,
    #[default]
    General,
}

impl InterviewType {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "technical" => Some(Self::Technical),
            "product" => Some(Self::Product),
            "business" => Some(Self::Business),
            "design" => Some(Self::Design),
            "hr" => Some(Self::Hr),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

const COMMON_POSITIONS: [&str; 12] = [
    "前端工程师",
    "后端工程师",
    "全栈工程师",
    "算法工程师",
    "产品经理",
    "数据分析师",
    "项目经理",
    "UI设计师",
    "UX设计师",
    "销售经理",
    "测试工程师",
    "架构师",
];

#[derive(Debug, Default)]
struct Suggestions {
    companies: Vec<String>,
    positions_by_company: HashMap<String, Vec<String>>,
}

/// Suggestion store for the interview form.
#[derive(Debug, Default)]
pub struct PrefillStore {
    suggestions: RwLock<Suggestions>,
}

impl PrefillStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recently used companies, most recent first.
    pub fn suggest_companies(&self) -> Vec<String> {
        self.suggestions
            .read()
            .expect("prefill lock poisoned")
            .companies
            .clone()
    }

    /// Company-specific history first, then common positions, deduped,
    /// capped at eight entries.
    pub fn suggest_positions(&self, company: &str) -> Vec<String> {
        let guard = self.suggestions.read().expect("prefill lock poisoned");
        let mut out: Vec<String> = guard
            .positions_by_company
            .get(company)
            .cloned()
            .unwrap_or_default();
        for common in COMMON_POSITIONS {
            if !out.iter().any(|p| p == common) {
                out.push(common.to_string());
            }
        }
        out.truncate(MAX_POSITION_SUGGESTIONS);
        out
    }

    /// Records a created interview so its company/position surface first in
    /// later suggestions.
    pub fn record_usage(&self, company: &str, position: &str) {
        let mut guard = self.suggestions.write().expect("prefill lock poisoned");

        if !guard.companies.iter().any(|c| c == company) {
            guard.companies.insert(0, company.to_string());
            guard.companies.truncate(MAX_COMPANY_SUGGESTIONS);
        }

        let positions = guard
            .positions_by_company
            .entry(company.to_string())
            .or_default();
        if !positions.iter().any(|p| p == position) {
            positions.insert(0, position.to_string());
            positions.truncate(MAX_POSITION_SUGGESTIONS);
        }
    }

    /// Detects the interview category from the position title.
    pub fn detect_interview_type(&self, position: &str) -> InterviewType {
        let p = position.to_lowercase();

        let matches_any = |keywords: &[&str]| keywords.iter().any(|k| p.contains(k));

        if matches_any(&["工程师", "developer", "engineer", "程序员", "架构师", "tech"]) {
            InterviewType::Technical
        } else if matches_any(&["产品", "product", "pm", "运营"]) {
            InterviewType::Product
        } else if matches_any(&["销售", "sales", "business", "商务", "市场", "marketing"]) {
            InterviewType::Business
        } else if matches_any(&["设计", "design", "ui", "ux", "visual"]) {
            InterviewType::Design
        } else if matches_any(&["hr", "人事", "招聘", "hrbp"]) {
            InterviewType::Hr
        } else {
            InterviewType::General
        }
    }

    /// Process template for logging one interview of the given type.
    pub fn template(&self, interview_type: InterviewType) -> &'static str {
        match interview_type {
            InterviewType::Technical => TECHNICAL_TEMPLATE,
            InterviewType::Product => PRODUCT_TEMPLATE,
            InterviewType::Business => BUSINESS_TEMPLATE,
            InterviewType::Design => DESIGN_TEMPLATE,
            InterviewType::Hr => HR_TEMPLATE,
            InterviewType::General => GENERAL_TEMPLATE,
        }
    }

    /// Preparation tips: shared base advice plus type-specific items.
    pub fn preparation_tips(&self, interview_type: InterviewType) -> Vec<String> {
        let base = [
            "提前了解公司背景、业务模式和发展现状",
            "准备STAR法则回答行为问题",
            "准备3-5个问题询问面试官",
            "检查网络、设备，确保面试环境良好",
        ];
        let specific: &[&str] = match interview_type {
            InterviewType::Technical => &[
                "复习核心算法和数据结构",
                "准备系统设计思路和案例",
                "梳理项目中的技术难点和解决方案",
            ],
            InterviewType::Product => &[
                "分析目标公司的产品和竞品",
                "准备产品设计案例和思考过程",
                "准备数据分析和指标设计案例",
            ],
            InterviewType::Business => &[
                "了解目标行业和市场情况",
                "准备销售案例和客户关系管理经验",
                "准备业绩数据和成功案例",
            ],
            InterviewType::Design => &[
                "整理最佳作品集和设计案例",
                "准备设计思路和用户研究过程",
                "了解目标公司的设计风格和规范",
            ],
            InterviewType::Hr => &[
                "梳理职业发展轨迹和规划",
                "准备离职原因的合理解释",
                "了解目标公司文化和价值观",
            ],
            InterviewType::General => &[
                "准备自我介绍和职业亮点",
                "梳理工作经历和主要成就",
            ],
        };

        base.iter()
            .chain(specific)
            .map(|t| t.to_string())
            .collect()
    }
}

const TECHNICAL_TEMPLATE: &str = "## 技术面试记录\n\n### 基本信息\n- 面试轮次：\n- 面试形式：\n\n### 技术问题回顾\n1. 算法题：题目、解题思路、实现完成度\n2. 系统设计：设计要求、架构方案、技术选型\n3. 项目深挖：技术难点、解决方案、成果影响\n\n### 互动表现\n- 沟通清晰度 / 思考逻辑性 / 主动提问\n\n### 亮点与不足\n";

const PRODUCT_TEMPLATE: &str = "## 产品面试记录\n\n### 基本信息\n- 面试轮次：\n- 面试形式：\n\n### 问题回顾\n1. 产品设计题：需求分析、方案、权衡\n2. 数据与指标：指标设计、分析思路\n3. 过往项目：角色、产出、复盘\n\n### 亮点与不足\n";

const BUSINESS_TEMPLATE: &str = "## 商务/销售面试记录\n\n### 基本信息\n- 面试轮次：\n- 面试形式：\n\n### 问题回顾\n1. 业绩案例：目标、打法、结果\n2. 客户关系：典型客户、维护方式\n3. 行业理解：市场格局、竞品\n\n### 亮点与不足\n";

const DESIGN_TEMPLATE: &str = "## 设计面试记录\n\n### 基本信息\n- 面试轮次：\n- 面试形式：\n\n### 问题回顾\n1. 作品集讲解：项目背景、设计过程、结果\n2. 现场设计题：思路、取舍\n3. 用户研究：方法、验证\n\n### 亮点与不足\n";

const HR_TEMPLATE: &str = "## HR面试记录\n\n### 基本信息\n- 面试轮次：\n- 面试形式：\n\n### 问题回顾\n1. 职业规划与动机\n2. 离职原因与稳定性\n3. 薪资期望与到岗时间\n\n### 亮点与不足\n";

const GENERAL_TEMPLATE: &str = "## 面试记录\n\n### 基本信息\n- 面试轮次：\n- 面试形式：\n\n### 问题回顾\n1. 自我介绍与经历追问\n2. 主要问题与回答要点\n\n### 亮点与不足\n";
