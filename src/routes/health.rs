use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::DynItemStore;

pub async fn health(Extension(store): Extension<DynItemStore>) -> (StatusCode, Json<Value>) {
    match store.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(err) => {
            tracing::error!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
