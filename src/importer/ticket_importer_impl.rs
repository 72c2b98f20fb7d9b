// ==========================================
// PlantX 运维智能中台 - 工单导入器实现
// ==========================================
// 职责: 整合导入流程，从数据源到记录存储
// 流程: 读取 → 切分 → 映射 → 规范化/校验 → 落库
// 落库策略:
// - ReplaceAll: 清空集合后写入（破坏性、非事务；清空失败即中止）
// - UpsertByKey: 按外部工单号更新或新建（幂等）
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::ticket::{FailureStage, ImportOutcome, NewTicket, RowFailure};
use crate::domain::types::PersistenceStrategy;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::TicketFieldMapper;
use crate::importer::pipeline::{parse_tickets, validate_tickets};
use crate::importer::source_loader::{HttpSourceLoader, ImportSource};
use crate::importer::ticket_importer_trait::{FieldMapper, SourceLoader, TicketImporter};
use crate::importer::ticket_validator::TicketValidator;
use crate::repository::{RecordStore, TicketRepository};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// 落库阶段统计
#[derive(Debug, Default)]
struct SinkReport {
    created: usize,
    updated: usize,
    deleted: usize,
    failures: Vec<RowFailure>,
}

impl SinkReport {
    fn record_failure(&mut self, row_number: usize, ticket: &NewTicket, message: String) {
        self.failures.push(RowFailure {
            row_number,
            external_id: ticket.external_key().map(str::to_string),
            stage: FailureStage::Persist,
            message,
        });
    }
}

// ==========================================
// TicketImporterImpl - 工单导入器实现
// ==========================================
pub struct TicketImporterImpl<C>
where
    C: ImportConfigReader,
{
    // 记录存储（显式传入）
    store: Arc<dyn RecordStore>,

    // 配置读取器
    config: Arc<C>,

    // 导入组件
    source_loader: Box<dyn SourceLoader>,
    field_mapper: Box<dyn FieldMapper>,
    validator: TicketValidator,
}

impl<C> TicketImporterImpl<C>
where
    C: ImportConfigReader,
{
    /// 创建新的 TicketImporter 实例
    ///
    /// # 参数
    /// - store: 记录存储
    /// - config: 配置读取器
    /// - source_loader: 数据源读取器
    /// - field_mapper: 字段映射器
    pub fn new(
        store: Arc<dyn RecordStore>,
        config: Arc<C>,
        source_loader: Box<dyn SourceLoader>,
        field_mapper: Box<dyn FieldMapper>,
    ) -> Self {
        Self {
            store,
            config,
            source_loader,
            field_mapper,
            validator: TicketValidator::new(),
        }
    }

    /// 使用默认组件（HTTP 读取器 + 同义词映射器）
    pub fn with_defaults(store: Arc<dyn RecordStore>, config: Arc<C>) -> Self {
        Self::new(
            store,
            config,
            Box::new(HttpSourceLoader::new()),
            Box::new(TicketFieldMapper::new()),
        )
    }

    async fn resolve_strategy(
        &self,
        strategy: Option<PersistenceStrategy>,
    ) -> ImportResult<PersistenceStrategy> {
        match strategy {
            Some(s) => Ok(s),
            None => Ok(self.config.get_persistence_strategy().await?),
        }
    }

    /// 破坏性替换: 清空 → 写入
    async fn replace_all(
        &self,
        repo: &TicketRepository,
        tickets: &[(usize, NewTicket)],
    ) -> ImportResult<SinkReport> {
        let mut report = SinkReport {
            deleted: repo.clear_all().await.map_err(|e| {
                error!(error = %e, "清空集合失败，导入中止");
                ImportError::ClearFailed(e)
            })?,
            ..Default::default()
        };
        debug!(deleted = report.deleted, "集合已清空，开始写入");

        for (row_number, ticket) in tickets {
            match repo.create(ticket).await {
                Ok(_) => report.created += 1,
                Err(e) => {
                    warn!(row_number, error = %e, "工单写入失败");
                    report.record_failure(*row_number, ticket, e.to_string());
                }
            }
        }

        Ok(report)
    }

    /// 按外部工单号幂等写入
    async fn upsert_by_key(
        &self,
        repo: &TicketRepository,
        tickets: &[(usize, NewTicket)],
    ) -> ImportResult<SinkReport> {
        let mut index = repo.existing_key_index().await?;
        debug!(existing_keys = index.len(), "已加载外部工单号索引");

        let mut report = SinkReport::default();
        for (row_number, ticket) in tickets {
            let key = ticket.external_key();
            let existing_id = key.and_then(|k| index.get(k).cloned());

            let result = match existing_id {
                Some(id) => repo.update(&id, ticket).await.map(|_| {
                    report.updated += 1;
                }),
                None => repo.create(ticket).await.map(|created| {
                    report.created += 1;
                    if let Some(k) = key {
                        index.insert(k.to_string(), created.id);
                    }
                }),
            };

            if let Err(e) = result {
                warn!(row_number, external_id = ?key, error = %e, "工单写入失败");
                report.record_failure(*row_number, ticket, e.to_string());
            }
        }

        Ok(report)
    }
}

#[async_trait]
impl<C> TicketImporter for TicketImporterImpl<C>
where
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, source), fields(source = %source.describe()))]
    async fn import(
        &self,
        source: &ImportSource,
        strategy: Option<PersistenceStrategy>,
    ) -> ImportResult<ImportOutcome> {
        let text = self.source_loader.load(source).await.map_err(|e| {
            error!(error = %e, "数据源读取失败");
            e
        })?;
        self.import_text(&text, &source.describe(), strategy).await
    }

    #[instrument(skip(self, text), fields(batch_id))]
    async fn import_text(
        &self,
        text: &str,
        source_label: &str,
        strategy: Option<PersistenceStrategy>,
    ) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let strategy = self.resolve_strategy(strategy).await?;
        let collection = self.config.get_collection_name().await?;
        info!(batch_id = %batch_id, source = %source_label, %strategy, %collection, "开始导入工单");

        // === 步骤 1: 切分与字段映射 ===
        let parsed = parse_tickets(text, self.field_mapper.as_ref())?;
        info!(
            total_rows = parsed.total_rows,
            mapped = parsed.candidates.len(),
            skipped_short = parsed.skipped_short,
            skipped_empty = parsed.skipped_empty,
            "字段映射完成"
        );

        // === 步骤 2: 规范化与校验 ===
        let validated = validate_tickets(&parsed.candidates, &self.validator);
        if !validated.failures.is_empty() {
            warn!(failed = validated.failures.len(), "部分记录校验失败");
        }

        // 替换模式下空批次会清空整个集合，直接拒绝
        if strategy == PersistenceStrategy::ReplaceAll && validated.tickets.is_empty() {
            warn!("替换模式下没有可写入的工单，保留现有数据");
            return Err(ImportError::EmptySource);
        }

        // === 步骤 3: 落库 ===
        let repo = TicketRepository::new(Arc::clone(&self.store), collection);
        let report = match strategy {
            PersistenceStrategy::ReplaceAll => self.replace_all(&repo, &validated.tickets).await?,
            PersistenceStrategy::UpsertByKey => self.upsert_by_key(&repo, &validated.tickets).await?,
        };

        let mut failures = validated.failures;
        failures.extend(report.failures);

        let outcome = ImportOutcome {
            batch_id,
            source: source_label.to_string(),
            strategy,
            total_rows: parsed.total_rows,
            mapped: parsed.candidates.len(),
            skipped_short: parsed.skipped_short,
            skipped_empty: parsed.skipped_empty,
            created: report.created,
            updated: report.updated,
            deleted: report.deleted,
            failures,
            elapsed_time: start_time.elapsed(),
        };

        info!(
            created = outcome.created,
            updated = outcome.updated,
            deleted = outcome.deleted,
            failed = outcome.failures.len(),
            partial = outcome.is_partial(),
            elapsed_ms = outcome.elapsed_time.as_millis() as u64,
            "工单导入完成"
        );

        Ok(outcome)
    }
}
