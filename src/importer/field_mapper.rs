// ==========================================
// PlantX 运维智能中台 - 字段映射器
// ==========================================
// 职责: 表头同义词 → 规范字段，数据行 → RawTicketRecord
// 规则:
// - 表头小写 + trim 后匹配同义词表
// - 未识别表头忽略；含 "description" 的表头兜底填充 description
// - 空值不覆盖已有值
// - 数据行字段数少于表头数 → 整行跳过
// - 既无 title 也无外部工单号 → 丢弃
// ==========================================

use crate::domain::ticket::RawTicketRecord;
use crate::importer::ticket_importer_trait::{FieldMapper, RowMapping};

// ==========================================
// 规范字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    ExternalId,
    Title,
    Description,
    Status,
    Priority,
    AssignedTo,
    SiteId,
    DueDate,
}

// 同义词表（所有导入入口共用）
const HEADER_SYNONYMS: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::ExternalId,
        &["number", "ticket number", "id", "ticket id", "servicenow_id", "external_id"],
    ),
    (
        CanonicalField::Title,
        &["title", "short description", "subject", "ticket title"],
    ),
    (
        CanonicalField::Description,
        &["description", "details", "ticket description"],
    ),
    (CanonicalField::Status, &["state", "status", "ticket status"]),
    (CanonicalField::Priority, &["priority", "ticket priority"]),
    (
        CanonicalField::AssignedTo,
        &["assigned to", "assignee", "assigned_to"],
    ),
    (CanonicalField::SiteId, &["site", "site_id", "location"]),
    (CanonicalField::DueDate, &["due date", "due", "due_date"]),
];

impl CanonicalField {
    /// 按表头解析规范字段（大小写与首尾空白不敏感）
    pub fn from_header(header: &str) -> Option<Self> {
        let normalized = header.trim().to_lowercase();
        HEADER_SYNONYMS
            .iter()
            .find(|(_, synonyms)| synonyms.contains(&normalized.as_str()))
            .map(|(field, _)| *field)
    }
}

// 表头解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderSlot {
    Field(CanonicalField),
    DescriptionFallback,
    Ignored,
}

fn resolve_header(header: &str) -> HeaderSlot {
    if let Some(field) = CanonicalField::from_header(header) {
        return HeaderSlot::Field(field);
    }
    if header.trim().to_lowercase().contains("description") {
        HeaderSlot::DescriptionFallback
    } else {
        HeaderSlot::Ignored
    }
}

// ==========================================
// TicketFieldMapper
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct TicketFieldMapper;

impl TicketFieldMapper {
    pub fn new() -> Self {
        Self
    }

    fn slot_mut(record: &mut RawTicketRecord, field: CanonicalField) -> &mut Option<String> {
        match field {
            CanonicalField::ExternalId => &mut record.external_id,
            CanonicalField::Title => &mut record.title,
            CanonicalField::Description => &mut record.description,
            CanonicalField::Status => &mut record.status,
            CanonicalField::Priority => &mut record.priority,
            CanonicalField::AssignedTo => &mut record.assigned_to,
            CanonicalField::SiteId => &mut record.site_id,
            CanonicalField::DueDate => &mut record.due_date,
        }
    }
}

impl FieldMapper for TicketFieldMapper {
    fn map_row(&self, headers: &[String], row: &[String], row_number: usize) -> RowMapping {
        if row.len() < headers.len() {
            return RowMapping::ShortRow;
        }

        let mut record = RawTicketRecord {
            row_number,
            ..Default::default()
        };

        for (header, value) in headers.iter().zip(row.iter()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match resolve_header(header) {
                HeaderSlot::Field(field) => {
                    *Self::slot_mut(&mut record, field) = Some(value.to_string());
                }
                HeaderSlot::DescriptionFallback => {
                    if record.description.is_none() {
                        record.description = Some(value.to_string());
                    }
                }
                HeaderSlot::Ignored => {}
            }
        }

        if record.has_identity() {
            RowMapping::Mapped(record)
        } else {
            RowMapping::Empty
        }
    }
}
