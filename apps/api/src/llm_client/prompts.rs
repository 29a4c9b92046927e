//! Prompt templates for interview analysis.
//!
//! One shared template plus a per-role emphasis block; the expected output
//! shape is pinned in the template so the JSON extraction strategy has a
//! stable target.

use crate::prefill::InterviewType;

pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"
请分析以下面试记录，并提供专业的反馈建议。请逐步思考并输出分析过程：

公司：{company}
职位：{position}
面试时间：{interview_date}
面试过程记录：
{interview_process}

{emphasis}
请按照以下步骤进行分析，每步都要输出思考过程：

第一步：分析面试表现优点
第二步：识别需要改进的地方
第三步：提出具体的改进建议
第四步：给出整体评分和总结

最后请以JSON格式返回完整结果，格式如下：
{
  "strengths": ["优点1", "优点2", "优点3"],
  "weaknesses": ["缺点1", "缺点2", "缺点3"],
  "improvements": [
    {
      "title": "改进项标题",
      "description": "详细描述",
      "priority": "high/medium/low"
    }
  ],
  "overallScore": 8,
  "summary": "整体评价和建议"
}
"#;

const TECHNICAL_EMPHASIS: &str = "请重点评估：算法与数据结构掌握程度、系统设计与架构能力、编程实践与代码质量意识、调试排错的逻辑性。";
const PRODUCT_EMPHASIS: &str =
    "请重点评估：需求分析与用户洞察、产品设计思路、数据分析能力、跨团队协作与沟通。";
const BUSINESS_EMPHASIS: &str =
    "请重点评估：客户关系管理、业务理解深度、谈判与说服能力、业绩导向思维。";
const DESIGN_EMPHASIS: &str =
    "请重点评估：设计思路与方法论、作品集质量、用户研究能力、视觉与交互表达。";
const HR_EMPHASIS: &str = "请重点评估：职业规划清晰度、动机与稳定性、文化匹配度、沟通表达。";

fn emphasis_for(interview_type: InterviewType) -> &'static str {
    match interview_type {
        InterviewType::Technical => TECHNICAL_EMPHASIS,
        InterviewType::Product => PRODUCT_EMPHASIS,
        InterviewType::Business => BUSINESS_EMPHASIS,
        InterviewType::Design => DESIGN_EMPHASIS,
        InterviewType::Hr => HR_EMPHASIS,
        InterviewType::General => "",
    }
}

/// Renders the analysis prompt for one interview record.
pub fn build_analysis_prompt(
    company: &str,
    position: &str,
    interview_date: &str,
    interview_process: &str,
    interview_type: InterviewType,
) -> String {
    let emphasis = emphasis_for(interview_type);
    let emphasis_block = if emphasis.is_empty() {
        String::new()
    } else {
        format!("{emphasis}\n")
    };

    ANALYZE_PROMPT_TEMPLATE
        .replace("{company}", company)
        .replace("{position}", position)
        .replace("{interview_date}", interview_date)
        .replace("{interview_process}", interview_process)
        .replace("{emphasis}\n", &emphasis_block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_substitutes_all_placeholders() {
        let prompt = build_analysis_prompt(
            "字节跳动",
            "后端工程师",
            "2025-03-01",
            "一面算法题两道",
            InterviewType::Technical,
        );
        assert!(prompt.contains("公司：字节跳动"));
        assert!(prompt.contains("职位：后端工程师"));
        assert!(prompt.contains("面试时间：2025-03-01"));
        assert!(prompt.contains("一面算法题两道"));
        assert!(prompt.contains("算法与数据结构"));
        assert!(!prompt.contains("{company}"));
        assert!(!prompt.contains("{emphasis}"));
    }

    #[test]
    fn test_general_type_has_no_emphasis_block() {
        let prompt = build_analysis_prompt("A", "专员", "2025-01-01", "聊了聊", InterviewType::General);
        assert!(!prompt.contains("请重点评估"));
        assert!(!prompt.contains("{emphasis}"));
    }

    #[test]
    fn test_prompt_pins_json_output_shape() {
        let prompt =
            build_analysis_prompt("A", "B", "C", "D", InterviewType::General);
        assert!(prompt.contains(r#""overallScore""#));
        assert!(prompt.contains(r#""priority": "high/medium/low""#));
    }
}
