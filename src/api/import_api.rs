// ==========================================
// PlantX 运维智能中台 - 工单导入API
// ==========================================
// 职责: 封装工单导入入口（本地文件 / 上传 / 表格链接）
// 并发: 同一时刻只允许一个导入任务（is_importing）
// 输出: 导入结果 + 本地化提示文本
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportConfigReader;
use crate::domain::ticket::ImportOutcome;
use crate::domain::types::PersistenceStrategy;
use crate::i18n::t_with_args;
use crate::importer::{ImportSource, TicketImporter};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 导入结果（逐行失败见 outcome.failures）
    pub outcome: ImportOutcome,
    /// 面向用户的提示文本
    pub message: String,
}

// ==========================================
// ImportGuard - 导入互斥标记
// ==========================================
// 获取时置位，Drop 时复位（含提前返回与错误路径）
struct ImportGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ImportGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> ApiResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ApiError::ImportInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for ImportGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 导入结果提示文本
pub fn outcome_message(outcome: &ImportOutcome) -> String {
    let count = outcome.imported().to_string();
    if outcome.failures.is_empty() {
        t_with_args("import.success", &[("count", &count)])
    } else if outcome.imported() > 0 {
        let failed = outcome.failures.len().to_string();
        t_with_args("import.partial", &[("count", &count), ("failed", &failed)])
    } else {
        let failed = outcome.failures.len().to_string();
        t_with_args("import.all_failed", &[("failed", &failed)])
    }
}

/// 导入失败提示文本
pub fn failure_message(err: &ApiError) -> String {
    match err {
        ApiError::ImportInProgress => crate::i18n::t("import.in_progress"),
        ApiError::InvalidInput(msg) => msg.clone(),
        other => t_with_args("import.failed", &[("reason", &other.to_string())]),
    }
}

/// 工单导入API
pub struct ImportApi {
    importer: Arc<dyn TicketImporter>,
    config: Arc<dyn ImportConfigReader>,
    is_importing: AtomicBool,
}

impl ImportApi {
    pub fn new(importer: Arc<dyn TicketImporter>, config: Arc<dyn ImportConfigReader>) -> Self {
        Self {
            importer,
            config,
            is_importing: AtomicBool::new(false),
        }
    }

    /// 是否有导入任务正在进行
    pub fn is_importing(&self) -> bool {
        self.is_importing.load(Ordering::Acquire)
    }

    /// 导入本地 CSV 文件
    ///
    /// # 参数
    /// - file_path: 文件路径（.xlsx/.xls 会被拒绝）
    /// - strategy: 持久化策略（None 时读取配置 import.strategy）
    pub async fn import_from_file(
        &self,
        file_path: &str,
        strategy: Option<PersistenceStrategy>,
    ) -> ApiResult<ImportApiResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }
        let source = ImportSource::File {
            path: file_path.into(),
        };
        self.run(source, strategy).await
    }

    /// 导入上传的文件内容
    pub async fn import_from_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        strategy: Option<PersistenceStrategy>,
    ) -> ApiResult<ImportApiResponse> {
        let source = ImportSource::Upload {
            file_name: file_name.to_string(),
            bytes,
        };
        self.run(source, strategy).await
    }

    /// 导入在线表格
    ///
    /// # 参数
    /// - url: 表格链接（为空时使用配置 import.default_sheet_url）
    pub async fn import_from_google_sheet(
        &self,
        url: Option<&str>,
        strategy: Option<PersistenceStrategy>,
    ) -> ApiResult<ImportApiResponse> {
        let url = match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(u) => u.to_string(),
            None => self
                .config
                .get_default_sheet_url()
                .await?
                .ok_or_else(|| ApiError::InvalidInput(crate::i18n::t("import.missing_url")))?,
        };
        self.run(ImportSource::GoogleSheet { url }, strategy).await
    }

    #[instrument(skip(self, source), fields(source = %source.describe()))]
    async fn run(
        &self,
        source: ImportSource,
        strategy: Option<PersistenceStrategy>,
    ) -> ApiResult<ImportApiResponse> {
        let _guard = match ImportGuard::acquire(&self.is_importing) {
            Ok(guard) => guard,
            Err(err) => {
                warn!("已有导入任务正在进行，拒绝本次请求");
                return Err(err);
            }
        };

        let outcome = self.importer.import(&source, strategy).await?;
        let message = outcome_message(&outcome);
        info!(
            imported = outcome.imported(),
            failed = outcome.failures.len(),
            "导入完成"
        );

        Ok(ImportApiResponse { outcome, message })
    }
}
