// ==========================================
// PlantX 运维智能中台 - 提示词模板
// ==========================================
// 职责: 通用问答 / 工单处置 / SOP 生成的提示词，SOP 步骤提取
// ==========================================

use crate::domain::ai::{ChatMessage, SopRequest, SopStep};
use regex::Regex;
use std::sync::OnceLock;

/// 通用系统提示词（所有提供方共用）
pub const SYSTEM_PROMPT: &str = "You are an industrial operations assistant helping with field operations, equipment maintenance, and safety procedures. Provide practical, actionable answers.";

const TICKET_RESOLUTION_SYSTEM: &str = "You are an expert maintenance engineer and technical support specialist. \
Provide detailed, actionable resolution steps for maintenance tickets. \
Include safety considerations, required tools/parts, estimated time, and follow-up actions. \
Format your response with clear numbered steps and bullet points.";

const SOP_SYSTEM: &str = "You are an expert in industrial procedures and safety standards. \
Create comprehensive Standard Operating Procedures (SOPs) that comply with industry standards \
including OSHA, ISO, and relevant industry-specific regulations.\n\n\
Format your response as structured steps with safety considerations for each step. \
Be specific about equipment, tools, PPE requirements, and safety protocols.";

/// 用户提示词: `Context: ..\n\nQuestion: ..`
pub fn user_prompt(context: &str, question: &str) -> String {
    format!("Context: {}\n\nQuestion: {}", context, question)
}

/// 单段提示词（不支持 system 角色的接口使用）
pub fn combined_prompt(context: &str, question: &str) -> String {
    format!("{}\n\n{}", user_prompt(context, question), SYSTEM_PROMPT)
}

/// 通用问答消息
pub fn chat_messages(context: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt(context, question)),
    ]
}

/// 工单处置方案消息
pub fn ticket_resolution_messages(title: &str, description: &str, priority: &str) -> Vec<ChatMessage> {
    let user = format!(
        "Please provide a detailed resolution plan for this maintenance ticket:\n\n\
         Title: {}\n\
         Description: {}\n\
         Priority: {}\n\n\
         Include:\n\
         1. Initial assessment steps\n\
         2. Safety precautions\n\
         3. Required tools and materials\n\
         4. Step-by-step resolution procedure\n\
         5. Testing and verification\n\
         6. Documentation requirements",
        title, description, priority
    );
    vec![ChatMessage::system(TICKET_RESOLUTION_SYSTEM), ChatMessage::user(user)]
}

/// SOP 生成消息
pub fn sop_messages(request: &SopRequest) -> Vec<ChatMessage> {
    let user = format!(
        "Create a detailed SOP for:\n\n\
         Title: {}\n\
         Description: {}\n\
         Equipment Types: {}\n\
         Safety Requirements: {}\n\
         Industry Standards: {}\n\n\
         Please provide:\n\
         1. Purpose and scope\n\
         2. Responsibilities\n\
         3. Required equipment and PPE\n\
         4. Detailed step-by-step procedure with safety notes\n\
         5. Emergency procedures\n\
         6. Documentation and record keeping requirements\n\n\
         Format each procedural step as: \"Step X: [Title] - [Description] - Safety: [Safety considerations]\"",
        request.title,
        request.description,
        request.equipment_types.join(", "),
        request.safety_requirements.join(", "),
        request.industry_standards.join(", "),
    );
    vec![ChatMessage::system(SOP_SYSTEM), ChatMessage::user(user)]
}

fn step_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)Step (\d+):\s*(.+?)\s*-\s*(.+?)\s*-\s*Safety:\s*(.+)").ok())
        .as_ref()
}

/// 从 SOP 正文中提取 `Step N: 标题 - 描述 - Safety: a, b` 行
///
/// 步骤号无法解析时按出现顺序编号
pub fn extract_sop_steps(response: &str) -> Vec<SopStep> {
    let Some(pattern) = step_pattern() else {
        return Vec::new();
    };

    let mut steps = Vec::new();
    for line in response.lines() {
        let Some(caps) = pattern.captures(line) else {
            continue;
        };

        let ordinal = steps.len() as u32 + 1;
        let safety = caps[4]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        steps.push(SopStep {
            step: caps[1].parse().unwrap_or(ordinal),
            title: caps[2].trim().to_string(),
            description: caps[3].trim().to_string(),
            safety,
        });
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt() {
        assert_eq!(
            user_prompt("Plant A", "Why is the pump noisy?"),
            "Context: Plant A\n\nQuestion: Why is the pump noisy?"
        );
        assert!(combined_prompt("c", "q").ends_with(SYSTEM_PROMPT));
    }

    #[test]
    fn test_extract_sop_steps() {
        let response = "1. Purpose\n\
            Step 1: Isolate - Lock out the pump motor - Safety: LOTO, gloves\n\
            some text\n\
            **step 2: Drain - Open drain valve slowly - Safety: Face shield, , Drip tray**\n\
            Step 3: Inspect the seal";

        let steps = extract_sop_steps(response);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step, 1);
        assert_eq!(steps[0].title, "Isolate");
        assert_eq!(steps[0].description, "Lock out the pump motor");
        assert_eq!(steps[0].safety, vec!["LOTO", "gloves"]);
        assert_eq!(steps[1].step, 2);
        assert_eq!(steps[1].safety, vec!["Face shield", "Drip tray**"]);
    }

    #[test]
    fn test_sop_messages_include_lists() {
        let request = SopRequest {
            title: "Pump Isolation".into(),
            description: "Isolate centrifugal pump".into(),
            equipment_types: vec!["Pump".into(), "Valve".into()],
            ..Default::default()
        };
        let messages = sop_messages(&request);
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("Equipment Types: Pump, Valve"));
    }
}
