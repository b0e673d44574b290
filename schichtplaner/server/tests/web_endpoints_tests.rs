use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use insta::assert_yaml_snapshot;
use tower::ServiceExt;

mod common;

use common::{send, setup};

#[tokio::test]
async fn can_report_health() {
    let ctx = setup().await.expect("Failed to setup test context");

    let (status, body) = send(&ctx.app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_yaml_snapshot!(body, @r"
    message: OK
    success: true
    ");
}

#[tokio::test]
async fn can_answer_unknown_route_with_envelope() {
    let ctx = setup().await.expect("Failed to setup test context");

    let (status, body) = send(&ctx.app, Method::GET, "/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_yaml_snapshot!(body, @r"
    error: Route not found
    success: false
    ");
}

#[tokio::test]
async fn can_serve_openapi_document() {
    let ctx = setup().await.expect("Failed to setup test context");

    let (status, body) = send(&ctx.app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/users/{id}").is_some());
    assert!(body["paths"].get("/shifts").is_some());
}

#[tokio::test]
async fn can_allow_cross_origin_requests() {
    let ctx = setup().await.expect("Failed to setup test context");
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/todos")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
