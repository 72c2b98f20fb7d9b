// ==========================================
// PlantX 运维智能中台 - Supabase 记录存储
// ==========================================
// 职责: 通过 PostgREST (/rest/v1/{table}) 实现 RecordStore
// 认证: apikey + Authorization: Bearer
// ==========================================

use crate::domain::types::StoreBackend;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::{Record, RecordStore};
use crate::repository::rest_support::{endpoint_url, ensure_success};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, instrument};

/// 分页读取时的单页条数（不超过 PostgREST max-rows 默认值 1000）
const DEFAULT_PAGE_SIZE: usize = 1000;

pub struct SupabaseStore {
    client: Client,
    base_url: String,
    api_key: String,
    page_size: usize,
}

impl SupabaseStore {
    /// 创建新的 SupabaseStore 实例
    ///
    /// # 参数
    /// - base_url: 项目地址（如 https://xyz.supabase.co）
    /// - api_key: anon 或 service_role key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    fn table_url(&self, table: &str) -> RepositoryResult<Url> {
        endpoint_url(&self.base_url, &["rest", "v1", table])
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// PostgREST 写操作返回数组，取首条
    fn first_record(rows: Vec<Value>, table: &str, id: Option<&str>) -> RepositoryResult<Record> {
        match rows.into_iter().next() {
            Some(row) => Record::from_value(row),
            None => Err(RepositoryError::NotFound {
                entity: table.to_string(),
                id: id.unwrap_or("-").to_string(),
            }),
        }
    }
}

#[async_trait]
impl RecordStore for SupabaseStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Supabase
    }

    // 服务端 max-rows 会截断单次查询，按 limit/offset 翻页直到短页
    #[instrument(skip(self))]
    async fn get_full_list(&self, table: &str) -> RepositoryResult<Vec<Record>> {
        let url = self.table_url(table)?;
        let limit = self.page_size.to_string();
        let mut records = Vec::new();
        let mut offset = 0usize;

        loop {
            let resp = self
                .authorize(self.client.get(url.clone()))
                .query(&[
                    ("select", "*"),
                    ("order", "id.asc"),
                    ("limit", limit.as_str()),
                    ("offset", offset.to_string().as_str()),
                ])
                .send()
                .await?;
            let resp = ensure_success(resp, table, None).await?;
            let rows: Vec<Value> = resp.json().await?;

            let fetched = rows.len();
            for row in rows {
                records.push(Record::from_value(row)?);
            }
            debug!(offset, fetched, "读取分页完成");

            if fetched < self.page_size {
                break;
            }
            offset += fetched;
        }

        Ok(records)
    }

    async fn create(&self, table: &str, data: Value) -> RepositoryResult<Record> {
        let resp = self
            .authorize(self.client.post(self.table_url(table)?))
            .header("Prefer", "return=representation")
            .json(&data)
            .send()
            .await?;
        let resp = ensure_success(resp, table, None).await?;
        let rows: Vec<Value> = resp.json().await?;
        Self::first_record(rows, table, None)
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> RepositoryResult<Record> {
        let resp = self
            .authorize(self.client.patch(self.table_url(table)?))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        let resp = ensure_success(resp, table, Some(id)).await?;
        let rows: Vec<Value> = resp.json().await?;
        Self::first_record(rows, table, Some(id))
    }

    async fn delete(&self, table: &str, id: &str) -> RepositoryResult<()> {
        let resp = self
            .authorize(self.client.delete(self.table_url(table)?))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        ensure_success(resp, table, Some(id)).await?;
        Ok(())
    }
}
