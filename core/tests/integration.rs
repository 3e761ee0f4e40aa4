//! Full lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `RecordService` in
//! remote mode over real HTTP with the reqwest transport. Validates request
//! building, retry classification and response parsing end-to-end.

use std::time::Duration;

use course_core::{ApiError, BackendMode, CoursePatch, CourseQuery, NewCourse, RecordService, ServiceConfig};
use serde_json::json;

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn remote(base_url: &str, max_retries: u32) -> RecordService {
    let config = ServiceConfig {
        base_url: Some(base_url.to_string()),
        timeout_ms: 2_000,
        max_retries,
        base_delay_ms: 5,
        ..ServiceConfig::default()
    };
    RecordService::from_config(&config)
}

async fn install_faults(base_url: &str, status: u16, count: u32) {
    let resp = reqwest::Client::new()
        .post(format!("{base_url}/__faults"))
        .json(&json!({"status": status, "count": count}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);
}

#[tokio::test]
async fn crud_lifecycle() {
    let base_url = start_server().await;
    let service = remote(&base_url, 0);
    assert_eq!(service.mode(), BackendMode::Remote);

    // Seeded listing, published only.
    let page = service
        .list(&CourseQuery::page(0, 2).only_published(true))
        .await
        .unwrap();
    assert_eq!(page.items().len(), 2);
    assert_eq!(page.total(), 5);
    assert!(page.has_more());

    // Create.
    let created = service
        .create(NewCourse {
            title: "Integration test".to_string(),
            author: "Harness".to_string(),
            price: 12.0,
            thumbnail: "https://img/i.png".to_string(),
            ..NewCourse::default()
        })
        .await
        .unwrap();
    assert_eq!(created.title, "Integration test");
    assert!(!created.published);
    let id = created.id.clone();

    // Get.
    let fetched = service.get(&id).await.unwrap();
    assert_eq!(fetched.title, created.title);
    assert_eq!(fetched.price, created.price);

    // Update.
    let updated = service
        .update(
            &id,
            CoursePatch {
                title: Some("Updated title".to_string()),
                ..CoursePatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Updated title");
    assert_eq!(updated.author, "Harness");

    // Publish toggle round-trip.
    assert!(service.set_published(&id, true).await.unwrap().published);
    assert!(!service.set_published(&id, false).await.unwrap().published);

    // Search finds the new course.
    let found = service.list(&CourseQuery::default().with_text("updated")).await.unwrap();
    assert_eq!(found.total(), 1);

    // Delete, then get is NotFound.
    let ack = service.remove(&id).await.unwrap();
    assert!(ack.ok);
    assert_eq!(ack.id, id);

    let err = service.get(&id).await.unwrap_err();
    assert_eq!(err, ApiError::NotFound);
    assert_eq!(err.info().status, Some(404));
}

#[tokio::test]
async fn transient_server_errors_are_retried() {
    let base_url = start_server().await;
    install_faults(&base_url, 500, 2).await;

    let page = remote(&base_url, 2).list(&CourseQuery::default()).await.unwrap();

    assert_eq!(page.total(), 6);
}

#[tokio::test]
async fn request_timeout_is_retried_as_server_error() {
    let base_url = start_server().await;
    install_faults(&base_url, 408, 1).await;

    let course = remote(&base_url, 1).get("c1").await.unwrap();

    assert_eq!(course.id, "c1");
}

#[tokio::test]
async fn exhausted_retries_surface_last_error() {
    let base_url = start_server().await;
    install_faults(&base_url, 503, 5).await;

    let err = remote(&base_url, 1).list(&CourseQuery::default()).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 503, .. }));
    let info = err.info();
    assert_eq!(info.status, Some(503));
    assert!(!info.is_network_error);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let base_url = start_server().await;
    // One 409 followed by a healthy server: a retry would succeed.
    install_faults(&base_url, 409, 1).await;

    let err = remote(&base_url, 3).get("c1").await.unwrap_err();

    assert!(matches!(err, ApiError::Client { status: 409, .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let err = remote(&format!("http://{addr}"), 1)
        .list(&CourseQuery::default())
        .await
        .unwrap_err();

    assert!(err.info().is_network_error);
    assert_eq!(err.info().status, None);
}
