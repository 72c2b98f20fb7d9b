// ==========================================
// PlantX 运维智能中台 - 工单校验器
// ==========================================
// 职责: RawTicketRecord → NewTicket
// 流程: 逐字段规范化 → 填充默认值 → 校验必填
// 红线: 落库工单 title 不得为空
// ==========================================

use crate::domain::ticket::{NewTicket, RawTicketRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::normalizer::{normalize_date, normalize_priority, normalize_status};

/// 缺少标题时的占位标题
pub fn placeholder_title(row_number: usize) -> String {
    format!("Imported Ticket {}", row_number)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TicketValidator;

impl TicketValidator {
    pub fn new() -> Self {
        Self
    }

    /// 规范化并校验单条记录
    pub fn validate(&self, raw: &RawTicketRecord) -> ImportResult<NewTicket> {
        let text = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").to_string();

        let title = match raw.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => placeholder_title(raw.row_number),
        };

        let ticket = NewTicket {
            title,
            description: text(&raw.description),
            status: normalize_status(raw.status.as_deref().unwrap_or("")),
            priority: normalize_priority(raw.priority.as_deref().unwrap_or("")),
            assigned_to: text(&raw.assigned_to),
            site_id: text(&raw.site_id),
            external_id: text(&raw.external_id),
            due_date: raw.due_date.as_deref().and_then(normalize_date),
        };

        if ticket.title.trim().is_empty() {
            return Err(ImportError::ValidationError {
                row: raw.row_number,
                message: "title 为空".to_string(),
            });
        }

        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{TicketPriority, TicketStatus};

    #[test]
    fn test_defaults_and_placeholder() {
        let raw = RawTicketRecord {
            external_id: Some(" INC42 ".to_string()),
            row_number: 7,
            ..Default::default()
        };

        let ticket = TicketValidator::new().validate(&raw).unwrap();
        assert_eq!(ticket.title, "Imported Ticket 7");
        assert_eq!(ticket.external_id, "INC42");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, TicketPriority::Medium);
        assert_eq!(ticket.description, "");
        assert!(ticket.due_date.is_none());
    }

    #[test]
    fn test_normalizes_fields() {
        let raw = RawTicketRecord {
            title: Some("Pump Check".to_string()),
            status: Some("New".to_string()),
            priority: Some("1".to_string()),
            due_date: Some("not a date".to_string()),
            row_number: 1,
            ..Default::default()
        };

        let ticket = TicketValidator::new().validate(&raw).unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, TicketPriority::Critical);
        assert!(ticket.due_date.is_none());
    }
}
