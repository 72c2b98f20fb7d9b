// ==========================================
// PocketBase 记录存储测试
// ==========================================
// 测试目标: 分页读取、认证头、写操作路径、错误映射
// ==========================================

use mockito::Matcher;
use plantx_hub::repository::{
    PocketBaseStore, RecordStore, RepositoryError, TicketRepository,
};
use plantx_hub::StoreBackend;
use serde_json::json;
use std::sync::Arc;

fn page(page: u32, total_pages: u32, ids: &[&str]) -> String {
    let items: Vec<_> = ids
        .iter()
        .map(|id| json!({"id": id, "title": format!("Ticket {}", id), "servicenow_id": format!("INC-{}", id)}))
        .collect();
    json!({
        "page": page,
        "perPage": 2,
        "totalPages": total_pages,
        "totalItems": ids.len(),
        "items": items,
    })
    .to_string()
}

#[tokio::test]
async fn test_get_full_list_follows_pages() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", "/api/collections/tickets/records")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("perPage".into(), "2".into()),
        ]))
        .match_header("authorization", "admin-token")
        .with_body(page(1, 2, &["a", "b"]))
        .create_async()
        .await;
    let second = server
        .mock("GET", "/api/collections/tickets/records")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("perPage".into(), "2".into()),
        ]))
        .with_body(page(2, 2, &["c"]))
        .create_async()
        .await;

    let store = PocketBaseStore::new(server.url())
        .with_auth_token(Some("admin-token".to_string()))
        .with_page_size(2);
    assert_eq!(store.backend(), StoreBackend::PocketBase);

    let records = store.get_full_list("tickets").await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_create_update_delete() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/api/collections/tickets/records")
        .match_body(Matcher::PartialJson(json!({"title": "Pump Check"})))
        .with_body(json!({"id": "r1", "title": "Pump Check", "created": "2024-02-01 10:00:00.000Z"}).to_string())
        .create_async()
        .await;
    let update = server
        .mock("PATCH", "/api/collections/tickets/records/r1")
        .match_body(Matcher::PartialJson(json!({"status": "closed"})))
        .with_body(json!({"id": "r1", "title": "Pump Check", "status": "closed"}).to_string())
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/collections/tickets/records/r1")
        .with_status(204)
        .create_async()
        .await;

    let store = PocketBaseStore::new(server.url());

    let created = store
        .create("tickets", json!({"title": "Pump Check"}))
        .await
        .unwrap();
    assert_eq!(created.id, "r1");

    let updated = store
        .update("tickets", "r1", json!({"status": "closed"}))
        .await
        .unwrap();
    assert_eq!(updated.get_str("status"), Some("closed"));

    store.delete("tickets", "r1").await.unwrap();

    create.assert_async().await;
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_error_mapping() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/api/collections/tickets/records/gone")
        .with_status(404)
        .with_body(json!({"code": 404, "message": "The requested resource wasn't found."}).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/api/collections/tickets/records")
        .with_status(400)
        .with_body(json!({"code": 400, "message": "Failed to create record.", "data": {}}).to_string())
        .create_async()
        .await;
    server
        .mock("PATCH", "/api/collections/tickets/records/x")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let store = PocketBaseStore::new(server.url());

    let err = store.delete("tickets", "gone").await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { ref id, .. } if id == "gone"));

    let err = store.create("tickets", json!({})).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError(ref m) if m == "Failed to create record."));

    let err = store.update("tickets", "x", json!({})).await.unwrap_err();
    assert!(matches!(err, RepositoryError::HttpStatus { status: 500, ref message } if message == "boom"));
}

#[tokio::test]
async fn test_ticket_repository_clear_all_over_rest() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/collections/tickets/records")
        .match_query(Matcher::Any)
        .with_body(page(1, 1, &["a", "b"]))
        .create_async()
        .await;
    let deletes = server
        .mock("DELETE", Matcher::Regex(r"^/api/collections/tickets/records/[ab]$".to_string()))
        .with_status(204)
        .expect(2)
        .create_async()
        .await;

    let repo = TicketRepository::new(Arc::new(PocketBaseStore::new(server.url())), "tickets");

    let index = repo.existing_key_index().await.unwrap();
    assert_eq!(index.get("INC-a").map(String::as_str), Some("a"));

    let deleted = repo.clear_all().await.unwrap();
    assert_eq!(deleted, 2);
    deletes.assert_async().await;
}
