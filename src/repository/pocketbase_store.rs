// ==========================================
// PlantX 运维智能中台 - PocketBase 记录存储
// ==========================================
// 职责: 通过 PocketBase REST API 实现 RecordStore
// 接口: /api/collections/{collection}/records[/{id}]
// ==========================================

use crate::domain::types::StoreBackend;
use crate::repository::error::RepositoryResult;
use crate::repository::record_store::{Record, RecordStore};
use crate::repository::rest_support::{endpoint_url, ensure_success};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

/// 默认 PocketBase 地址
pub const DEFAULT_POCKETBASE_URL: &str = "http://127.0.0.1:8090";

/// 分页读取时的单页条数（PocketBase 上限 500）
const DEFAULT_PAGE_SIZE: u32 = 500;

// PocketBase 列表接口响应
#[derive(Debug, Deserialize)]
struct ListPage {
    page: u32,
    #[serde(rename = "totalPages")]
    total_pages: u32,
    items: Vec<Value>,
}

// ==========================================
// PocketBaseStore
// ==========================================
pub struct PocketBaseStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    page_size: u32,
}

impl PocketBaseStore {
    /// 创建新的 PocketBaseStore 实例
    ///
    /// # 参数
    /// - base_url: PocketBase 服务地址（如 http://127.0.0.1:8090）
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// 设置认证 token（管理员或用户 token）
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    fn records_url(&self, collection: &str) -> RepositoryResult<Url> {
        endpoint_url(&self.base_url, &["api", "collections", collection, "records"])
    }

    fn record_url(&self, collection: &str, id: &str) -> RepositoryResult<Url> {
        endpoint_url(&self.base_url, &["api", "collections", collection, "records", id])
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.header("Authorization", token),
            None => builder,
        }
    }
}

#[async_trait]
impl RecordStore for PocketBaseStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::PocketBase
    }

    #[instrument(skip(self))]
    async fn get_full_list(&self, collection: &str) -> RepositoryResult<Vec<Record>> {
        let url = self.records_url(collection)?;
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let resp = self
                .authorize(self.client.get(url.clone()))
                .query(&[("page", page), ("perPage", self.page_size)])
                .send()
                .await?;
            let resp = ensure_success(resp, collection, None).await?;
            let list: ListPage = resp.json().await?;

            let fetched = list.items.len();
            for item in list.items {
                records.push(Record::from_value(item)?);
            }
            debug!(page = list.page, total_pages = list.total_pages, fetched, "读取分页完成");

            if fetched == 0 || list.page >= list.total_pages {
                break;
            }
            page = list.page + 1;
        }

        Ok(records)
    }

    async fn create(&self, collection: &str, data: Value) -> RepositoryResult<Record> {
        let resp = self
            .authorize(self.client.post(self.records_url(collection)?))
            .json(&data)
            .send()
            .await?;
        let resp = ensure_success(resp, collection, None).await?;
        Record::from_value(resp.json().await?)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> RepositoryResult<Record> {
        let resp = self
            .authorize(self.client.patch(self.record_url(collection, id)?))
            .json(&patch)
            .send()
            .await?;
        let resp = ensure_success(resp, collection, Some(id)).await?;
        Record::from_value(resp.json().await?)
    }

    async fn delete(&self, collection: &str, id: &str) -> RepositoryResult<()> {
        let resp = self
            .authorize(self.client.delete(self.record_url(collection, id)?))
            .send()
            .await?;
        ensure_success(resp, collection, Some(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_urls() {
        let store = PocketBaseStore::new("http://127.0.0.1:8090/");
        assert_eq!(
            store.records_url("tickets").unwrap().as_str(),
            "http://127.0.0.1:8090/api/collections/tickets/records"
        );
        assert_eq!(
            store.record_url("tickets", "abc").unwrap().as_str(),
            "http://127.0.0.1:8090/api/collections/tickets/records/abc"
        );
        assert_eq!(
            store.record_url("tickets", "../users").unwrap().as_str(),
            "http://127.0.0.1:8090/api/collections/tickets/records/..%2Fusers"
        );
    }

    #[test]
    fn test_blank_token_ignored() {
        let store = PocketBaseStore::new(DEFAULT_POCKETBASE_URL).with_auth_token(Some("  ".into()));
        assert!(store.auth_token.is_none());
    }
}
