//! Shared helpers for integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use inventory_api::create_app;
use inventory_api::db::SqliteItemStore;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Router backed by a throwaway SQLite database.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub store: Arc<SqliteItemStore>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store = Arc::new(
            SqliteItemStore::new(temp_dir.path().join("inventory.db"))
                .await
                .expect("Failed to create item store"),
        );
        let router = create_app(store.clone());

        Self {
            router,
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Sends a request and returns the status with the decoded JSON body
    /// (`Value::Null` when the body is empty).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(v) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn list(&self) -> Vec<Value> {
        let (status, body) = self.request("GET", "/api/v1/inventory/", None).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().cloned().expect("list body is an array")
    }
}
