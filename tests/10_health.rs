mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = common::test_app();

    let (status, body) = common::send(&app.router, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true, "unexpected body: {}", body);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let app = common::test_app();

    let (status, body) = common::send(&app.router, Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["version"].is_string(), "missing version: {}", body);
    Ok(())
}
