// ==========================================
// PlantX 运维智能中台 - 导入解析管道（纯函数）
// ==========================================
// 流程: 文本 → 行 → 字段 → RawTicketRecord → NewTicket
// 红线: 不做任何 IO，所有导入入口共用
// ==========================================

use crate::domain::ticket::{FailureStage, NewTicket, RawTicketRecord, RowFailure};
use crate::importer::csv_tokenizer::{split_lines, tokenize_line};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::ticket_importer_trait::{FieldMapper, RowMapping};
use crate::importer::ticket_validator::TicketValidator;

/// 解析阶段输出
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBatch {
    pub headers: Vec<String>,
    pub candidates: Vec<RawTicketRecord>,
    pub total_rows: usize,
    pub skipped_short: usize,
    pub skipped_empty: usize,
}

/// 校验阶段输出
#[derive(Debug, Clone, Default)]
pub struct ValidatedBatch {
    pub tickets: Vec<(usize, NewTicket)>,
    pub failures: Vec<RowFailure>,
}

/// 文本 → 候选记录
///
/// 首个非空行为表头；没有任何数据行时返回 EmptySource
pub fn parse_tickets(text: &str, mapper: &dyn FieldMapper) -> ImportResult<ParsedBatch> {
    let lines = split_lines(text);
    let (header_line, data_lines) = match lines.split_first() {
        Some((header, rest)) if !rest.is_empty() => (header, rest),
        _ => return Err(ImportError::EmptySource),
    };

    let mut batch = ParsedBatch {
        headers: tokenize_line(header_line),
        total_rows: data_lines.len(),
        ..Default::default()
    };

    for (idx, line) in data_lines.iter().enumerate() {
        let row = tokenize_line(line);
        match mapper.map_row(&batch.headers, &row, idx + 1) {
            RowMapping::Mapped(record) => batch.candidates.push(record),
            RowMapping::ShortRow => batch.skipped_short += 1,
            RowMapping::Empty => batch.skipped_empty += 1,
        }
    }

    Ok(batch)
}

/// 候选记录 → 待写入工单（校验失败逐行记录）
pub fn validate_tickets(candidates: &[RawTicketRecord], validator: &TicketValidator) -> ValidatedBatch {
    let mut batch = ValidatedBatch::default();
    for raw in candidates {
        match validator.validate(raw) {
            Ok(ticket) => batch.tickets.push((raw.row_number, ticket)),
            Err(e) => batch.failures.push(RowFailure {
                row_number: raw.row_number,
                external_id: raw.external_id.clone(),
                stage: FailureStage::Validation,
                message: e.to_string(),
            }),
        }
    }
    batch
}
