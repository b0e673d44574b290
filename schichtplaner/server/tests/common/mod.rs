#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use migration::MigratorTrait;
use regex::Regex;
use schichtplaner_server::user::password::{CredentialHasher, PasswordHashError};
use schichtplaner_server::web::{AppState, create_app};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Opens a fresh in-memory database with all migrations applied.
///
/// The pool is pinned to a single connection, since every sqlite memory
/// connection would otherwise see its own empty database.
pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Cheap stand-in for Argon2, which is slow in debug builds.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("plain${password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        Ok(hash == format!("plain${password}"))
    }
}

/// Shared [`PlainHasher`] for building services directly.
pub fn plain_hasher() -> Arc<dyn CredentialHasher> {
    Arc::new(PlainHasher)
}

/// Test context for endpoint tests.
pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub app: Router,
}

pub async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let db = Arc::new(setup_db().await?);
    let app = create_app(AppState::with_hasher(db.clone(), Arc::new(PlainHasher)));
    Ok(TestContext { db, app })
}

/// Sends a request through the router and returns the status and the parsed JSON body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let raw = body.map(|body| body.to_string());
    send_raw(app, method, uri, raw.as_deref()).await
}

/// Like [`send`], but with the body passed verbatim.
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Replaces RFC 3339 timestamps so snapshots stay stable between runs.
pub fn scrub_timestamps(value: &Value) -> Value {
    let timestamp =
        Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})").unwrap();
    let text = value.to_string();
    let scrubbed = timestamp.replace_all(&text, "[timestamp]");
    serde_json::from_str(&scrubbed).unwrap()
}
