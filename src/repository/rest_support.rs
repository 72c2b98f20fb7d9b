// ==========================================
// PlantX 运维智能中台 - REST 存储公共工具
// ==========================================
// 职责: 非 2xx 响应 → RepositoryError 的统一映射、端点 URL 拼接
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use reqwest::{Response, StatusCode, Url};
use serde_json::Value;

/// 在服务地址后追加路径段（集合名、记录 id 逐段转义）
///
/// # 参数
/// - base_url: 服务地址（可带路径前缀）
/// - segments: 追加的路径段
pub(crate) fn endpoint_url(base_url: &str, segments: &[&str]) -> RepositoryResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| RepositoryError::ConnectionError(format!("服务地址无效 {}: {}", base_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| RepositoryError::ConnectionError(format!("服务地址无效: {}", base_url)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// 校验响应状态，非 2xx 时读取错误体并转换为仓储错误
///
/// # 参数
/// - resp: HTTP 响应
/// - entity: 集合名（用于 404 提示）
/// - id: 记录 id（用于 404 提示）
pub(crate) async fn ensure_success(
    resp: Response,
    entity: &str,
    id: Option<&str>,
) -> RepositoryResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or_else(|| {
        if body.is_empty() {
            status.to_string()
        } else {
            body.clone()
        }
    });

    Err(match status {
        StatusCode::NOT_FOUND => RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.unwrap_or("-").to_string(),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            RepositoryError::ValidationError(message)
        }
        StatusCode::CONFLICT => RepositoryError::UniqueConstraintViolation(message),
        _ => RepositoryError::HttpStatus {
            status: status.as_u16(),
            message,
        },
    })
}

/// 从错误体中提取 message 字段（PocketBase / PostgREST 均使用该字段）
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message() {
        assert_eq!(
            extract_message(r#"{"code":400,"message":"Failed to create record.","data":{}}"#),
            Some("Failed to create record.".to_string())
        );
        assert_eq!(extract_message("plain text"), None);
    }

    #[test]
    fn test_endpoint_url_escapes_segments() {
        let url = endpoint_url("http://127.0.0.1:8090", &["api", "collections", "tickets", "a/b c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8090/api/collections/tickets/a%2Fb%20c"
        );
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let url = endpoint_url("https://proxy.local/pb", &["api", "collections"]).unwrap();
        assert_eq!(url.as_str(), "https://proxy.local/pb/api/collections");
    }

    #[test]
    fn test_endpoint_url_invalid_base() {
        assert!(matches!(
            endpoint_url("not a url", &["x"]),
            Err(RepositoryError::ConnectionError(_))
        ));
    }
}
