// ==========================================
// PlantX 运维智能中台 - 字段值规范化
// ==========================================
// 职责: status / priority / 日期 的宽松输入 → 闭集取值
// 红线: 任何输入都有确定结果，不抛错
// ==========================================

use crate::domain::timestamp::parse_flexible;
use crate::domain::types::{TicketPriority, TicketStatus};
use chrono::{DateTime, Utc};
use tracing::debug;

// 状态规则表（按顺序匹配，首个命中生效）
// 关键字为子串匹配，数字代码为精确匹配
const STATUS_RULES: &[(&[&str], &str, TicketStatus)] = &[
    (&["new", "open"], "1", TicketStatus::Open),
    (&["progress", "assigned", "work"], "2", TicketStatus::InProgress),
    (&["resolved", "closed", "complete"], "3", TicketStatus::Closed),
    (&["pending", "hold"], "4", TicketStatus::Pending),
    (&["cancelled", "canceled"], "5", TicketStatus::Cancelled),
];

// 优先级规则表（全部为子串匹配，含数字）
const PRIORITY_RULES: &[(&[&str], TicketPriority)] = &[
    (&["1", "critical", "urgent"], TicketPriority::Critical),
    (&["2", "high"], TicketPriority::High),
    (&["3", "medium", "moderate", "normal"], TicketPriority::Medium),
    (&["4", "low", "planning"], TicketPriority::Low),
];

/// 规范化工单状态，无法识别时为 open
pub fn normalize_status(raw: &str) -> TicketStatus {
    let normalized = raw.trim().to_lowercase();

    for (keywords, code, status) in STATUS_RULES {
        if normalized == *code || keywords.iter().any(|k| normalized.contains(k)) {
            return *status;
        }
    }

    if !normalized.is_empty() {
        debug!(raw_status = %raw, "未识别的工单状态，按 open 处理");
    }
    TicketStatus::Open
}

/// 规范化优先级，无法识别时为 medium
pub fn normalize_priority(raw: &str) -> TicketPriority {
    let normalized = raw.trim().to_lowercase();

    PRIORITY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| normalized.contains(k)))
        .map(|(_, priority)| *priority)
        .unwrap_or_default()
}

/// 规范化日期，无法解析时为 None
pub fn normalize_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = parse_flexible(trimmed);
    if parsed.is_none() {
        debug!(raw_date = %raw, "日期无法解析，置空");
    }
    parsed
}
