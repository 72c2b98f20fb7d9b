// ==========================================
// PlantX 运维智能中台 - 工单领域模型
// ==========================================
// 职责: 工单实体、导入中间结构、导入结果
// 红线: 落库工单 title 不得为空; status/priority 只取闭集
// ==========================================

use crate::domain::timestamp::option_iso;
use crate::domain::types::{PersistenceStrategy, TicketPriority, TicketStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// 记录存储中外部工单号的字段名（沿用 ServiceNow 列名）
pub const EXTERNAL_ID_FIELD: &str = "servicenow_id";

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// Supabase 自增主键返回数字，PocketBase 返回字符串
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

// ==========================================
// NewTicket - 待写入工单（规范化后）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    #[serde(default)]
    pub status: TicketStatus,

    #[serde(default)]
    pub priority: TicketPriority,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub assigned_to: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub site_id: String,

    #[serde(
        default,
        rename = "servicenow_id",
        alias = "external_id",
        deserialize_with = "null_as_empty"
    )]
    pub external_id: String,

    #[serde(default, with = "option_iso")]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTicket {
    /// 外部工单号（空串视为无）
    pub fn external_key(&self) -> Option<&str> {
        let key = self.external_id.trim();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

// ==========================================
// Ticket - 已落库工单
// ==========================================
// created/updated 兼容 PocketBase 与 Supabase 两种命名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(flatten)]
    pub fields: NewTicket,

    #[serde(default, alias = "created", with = "option_iso")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, alias = "updated", with = "option_iso")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ==========================================
// RawTicketRecord - 字段映射输出（未规范化）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTicketRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub site_id: Option<String>,
    pub external_id: Option<String>,
    pub due_date: Option<String>,

    // 元信息: 数据行号（从 1 开始，不含表头）
    pub row_number: usize,
}

impl RawTicketRecord {
    /// 是否可保留: 需要非空 title 或非空外部工单号
    pub fn has_identity(&self) -> bool {
        let non_blank = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        non_blank(&self.title) || non_blank(&self.external_id)
    }
}

// ==========================================
// RowFailure - 单行失败明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row_number: usize,
    pub external_id: Option<String>,
    pub stage: FailureStage,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Validation, // 校验
    Persist,    // 落库
}

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
// 部分成功与完全失败通过 failures 区分
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch_id: String,
    pub source: String,
    pub strategy: PersistenceStrategy,

    // 解析统计
    pub total_rows: usize,
    pub mapped: usize,
    pub skipped_short: usize,
    pub skipped_empty: usize,

    // 落库统计
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,

    pub failures: Vec<RowFailure>,
    pub elapsed_time: Duration,
}

impl ImportOutcome {
    /// 成功写入（新建+更新）的工单数
    pub fn imported(&self) -> usize {
        self.created + self.updated
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() && self.imported() > 0
    }
}
