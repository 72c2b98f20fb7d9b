// ==========================================
// PlantX 运维智能中台 - 数据源读取
// ==========================================
// 职责: 本地文件 / 上传内容 / 表格链接 → CSV 文本
// 规则:
// - 仅接受 .csv（或无扩展名）；.xlsx/.xls 明确拒绝
// - 表格链接按 URL 形态改写为 CSV 导出地址后 GET
// - 超时与重试沿用 HTTP 客户端默认行为
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::ticket_importer_trait::SourceLoader;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, instrument};

const UTF8_BOM: char = '\u{feff}';

// ==========================================
// ImportSource - 导入数据源
// ==========================================
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// 本地文件路径
    File { path: PathBuf },
    /// 已在内存中的上传内容
    Upload { file_name: String, bytes: Vec<u8> },
    /// 已发布的表格链接
    GoogleSheet { url: String },
}

impl ImportSource {
    /// 用于日志与导入结果的数据源描述
    pub fn describe(&self) -> String {
        match self {
            ImportSource::File { path } => format!("file:{}", path.display()),
            ImportSource::Upload { file_name, .. } => format!("upload:{}", file_name),
            ImportSource::GoogleSheet { url } => format!("sheet:{}", url),
        }
    }
}

/// 校验文件扩展名
pub fn check_extension(file_name: &str) -> ImportResult<()> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        None | Some("csv") => Ok(()),
        Some("xlsx") | Some("xls") => Err(ImportError::ExcelNotSupported),
        Some(other) => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

/// 字节解码为文本（非法 UTF-8 替换，去掉 BOM）
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix(UTF8_BOM).unwrap_or(&*text).to_string()
}

fn sheet_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").ok())
        .as_ref()
}

fn find_gid(url: &Url) -> String {
    let from_query = url
        .query_pairs()
        .find(|(k, _)| k == "gid")
        .map(|(_, v)| v.into_owned());
    let from_fragment = url
        .fragment()
        .and_then(|f| f.strip_prefix("gid="))
        .map(|v| v.to_string());

    from_query
        .or(from_fragment)
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| "0".to_string())
}

/// 表格链接 → CSV 导出地址
///
/// - `.../pubhtml?gid=G&single=true` → `.../export?format=csv&gid=G`
/// - `.../spreadsheets/d/<ID>/...` → `<scheme>://<host>/spreadsheets/d/<ID>/export?format=csv&gid=G`
/// - 其他 http(s) 链接视为 CSV 直链
pub fn to_csv_export_url(raw_url: &str) -> ImportResult<String> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err(ImportError::InvalidSheetUrl("链接为空".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| ImportError::InvalidSheetUrl(format!("{}: {}", trimmed, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ImportError::InvalidSheetUrl(format!(
            "不支持的协议: {}",
            url.scheme()
        )));
    }

    let gid = find_gid(&url);

    if url.path().ends_with("/pubhtml") {
        let mut export = url.clone();
        let path = url.path();
        let base = &path[..path.len() - "/pubhtml".len()];
        export.set_path(&format!("{}/export", base));
        export.set_query(Some(&format!("format=csv&gid={}", gid)));
        export.set_fragment(None);
        return Ok(export.to_string());
    }

    if let Some(caps) = sheet_id_pattern().and_then(|re| re.captures(url.path())) {
        let host = url.host_str().unwrap_or_default();
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        return Ok(format!(
            "{}://{}/spreadsheets/d/{}/export?format=csv&gid={}",
            url.scheme(),
            authority,
            &caps[1],
            gid
        ));
    }

    Ok(url.to_string())
}

// ==========================================
// HttpSourceLoader
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct HttpSourceLoader {
    client: Client,
}

impl HttpSourceLoader {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_sheet(&self, url: &str) -> ImportResult<String> {
        let export_url = to_csv_export_url(url)?;
        debug!(export_url = %export_url, "表格链接已改写为导出地址");

        let resp = self.client.get(&export_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ImportError::FetchStatus(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        Ok(decode_text(&bytes))
    }
}

#[async_trait]
impl SourceLoader for HttpSourceLoader {
    #[instrument(skip(self, source), fields(source = %source.describe()))]
    async fn load(&self, source: &ImportSource) -> ImportResult<String> {
        let text = match source {
            ImportSource::File { path } => {
                let name = path.to_string_lossy();
                check_extension(&name)?;
                if !path.exists() {
                    return Err(ImportError::FileNotFound(name.to_string()));
                }
                let bytes = tokio::fs::read(path).await?;
                decode_text(&bytes)
            }
            ImportSource::Upload { file_name, bytes } => {
                check_extension(file_name)?;
                decode_text(bytes)
            }
            ImportSource::GoogleSheet { url } => self.fetch_sheet(url).await?,
        };

        info!(bytes = text.len(), "数据源读取完成");
        Ok(text)
    }
}
