//! Shared fixtures for evalbridge-axum tests.
#![allow(dead_code)]

pub mod fake_port;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use evalbridge_axum::{AppContext, create_router};
use evalbridge_core::{BridgeConfig, EvaluationPort};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Build a config from literal variables without touching process env.
pub fn config(vars: &[(&str, &str)]) -> BridgeConfig {
    let map: HashMap<&str, &str> = vars.iter().copied().collect();
    BridgeConfig::from_lookup(|k| map.get(k).map(|v| (*v).to_string())).unwrap()
}

/// Router around `port`, or with the wrapper uninitialised when `None`.
pub fn router(config: BridgeConfig, port: Option<Arc<dyn EvaluationPort>>) -> Router {
    create_router(AppContext::new(Arc::new(config), port).unwrap())
}

/// Send one request and decode the JSON body (`Value::Null` when empty).
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, headers, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_key(uri: &str, key: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-API-Key", key)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, key: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
