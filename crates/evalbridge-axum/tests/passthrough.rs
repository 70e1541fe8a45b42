//! `/wrapper/*` forwarding against a live fake wrapper on loopback.

mod common;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use common::fake_port::FakePort;
use common::{config, router, send};

/// Echo method, path, query, API key and body back as JSON.
///
/// `POST /evaluate` redirects to the trailing-slash route the way FastAPI
/// does; following it would answer `"followed"`.
async fn echo(req: Request) -> Response {
    let (parts, body) = req.into_parts();
    if parts.method == Method::POST && parts.uri.path() == "/evaluate" {
        return (
            StatusCode::TEMPORARY_REDIRECT,
            [(header::LOCATION, "/evaluate/")],
        )
            .into_response();
    }
    if parts.uri.path() == "/evaluate/" {
        return (StatusCode::OK, "followed").into_response();
    }

    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let status = if parts.uri.path().starts_with("/evaluate/async") {
        StatusCode::ACCEPTED
    } else if parts.uri.path().starts_with("/jobs/missing") {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };

    (
        status,
        Json(json!({
            "method": parts.method.as_str(),
            "path": parts.uri.path(),
            "query": parts.uri.query(),
            "api_key": parts.headers.get("x-api-key").and_then(|v| v.to_str().ok()),
            "body": String::from_utf8_lossy(&bytes),
            "body_len": bytes.len(),
        })),
    )
        .into_response()
}

async fn spawn_echo_wrapper() -> String {
    let app = Router::new().fallback(echo);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn request(method: &str, uri: &str, key: Option<&str>, body: &str) -> axum::http::Request<Body> {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn method_path_query_and_body_reach_the_wrapper() {
    let wrapper = spawn_echo_wrapper().await;
    let app = router(
        config(&[("OPENAI_API_KEY", "sk"), ("DEEPEVAL_WRAPPER_URL", wrapper.as_str())]),
        Some(FakePort::healthy()),
    );

    let (status, _, body) = send(
        app,
        request("PUT", "/wrapper/jobs/abc?verbose=true&x=1", None, "{\"a\":1}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "PUT");
    assert_eq!(body["path"], "/jobs/abc");
    assert_eq!(body["query"], "verbose=true&x=1");
    assert_eq!(body["body"], "{\"a\":1}");
}

#[tokio::test]
async fn upstream_status_is_preserved() {
    let wrapper = spawn_echo_wrapper().await;
    let cfg = || config(&[("OPENAI_API_KEY", "sk"), ("DEEPEVAL_WRAPPER_URL", wrapper.as_str())]);

    let app = router(cfg(), Some(FakePort::healthy()));
    let (status, _, body) = send(app, request("POST", "/wrapper/evaluate/async", None, "{}")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["path"], "/evaluate/async");

    let app = router(cfg(), Some(FakePort::healthy()));
    let (status, _, _) = send(app, request("DELETE", "/wrapper/jobs/missing", None, "")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_key_is_forwarded_unchanged() {
    let wrapper = spawn_echo_wrapper().await;
    let app = router(
        config(&[
            ("OPENAI_API_KEY", "sk"),
            ("API_KEYS", "shared"),
            ("DEEPEVAL_WRAPPER_URL", wrapper.as_str()),
        ]),
        Some(FakePort::healthy()),
    );

    let (status, _, body) = send(app, request("GET", "/wrapper/metrics/", Some("shared"), "")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_key"], "shared");
    assert_eq!(body["path"], "/metrics/");
}

#[tokio::test]
async fn bare_prefix_targets_wrapper_root() {
    let wrapper = spawn_echo_wrapper().await;
    let app = router(
        config(&[("OPENAI_API_KEY", "sk"), ("DEEPEVAL_WRAPPER_URL", wrapper.as_str())]),
        Some(FakePort::healthy()),
    );

    let (status, _, body) = send(app, request("GET", "/wrapper", None, "")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], "/");
}

#[tokio::test]
async fn unreachable_wrapper_is_bad_gateway() {
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);
    let wrapper = format!("http://{addr}");

    let app = router(
        config(&[("OPENAI_API_KEY", "sk"), ("DEEPEVAL_WRAPPER_URL", wrapper.as_str())]),
        Some(FakePort::healthy()),
    );

    let (status, _, body) = send(app, request("GET", "/wrapper/docs", None, "")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["type"], "upstream_error");
}

#[tokio::test]
async fn wrapper_redirects_reach_the_caller() {
    let wrapper = spawn_echo_wrapper().await;
    let app = router(
        config(&[("OPENAI_API_KEY", "sk"), ("DEEPEVAL_WRAPPER_URL", wrapper.as_str())]),
        Some(FakePort::healthy()),
    );

    let (status, headers, body) = send(app, request("POST", "/wrapper/evaluate", None, "{}")).await;

    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(headers[header::LOCATION], "/evaluate/");
    assert_ne!(body, Value::String("followed".into()));
}

#[tokio::test]
async fn uploads_larger_than_the_default_body_limit_are_forwarded() {
    const SIZE: usize = 3 * 1024 * 1024;

    let wrapper = spawn_echo_wrapper().await;
    let app = router(
        config(&[("OPENAI_API_KEY", "sk"), ("DEEPEVAL_WRAPPER_URL", wrapper.as_str())]),
        Some(FakePort::healthy()),
    );
    let upload = "x".repeat(SIZE);

    let (status, _, body) = send(
        app,
        request("POST", "/wrapper/evaluate/dataset", None, &upload),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], "/evaluate/dataset");
    assert_eq!(body["body_len"], SIZE);
}
