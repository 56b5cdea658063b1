use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::item::{CreateItemRequest, Item, UpdateItemRequest};
use crate::validation::ValidatedJson;
use crate::DynItemStore;

pub const LIST_FAILED_MESSAGE: &str = "failed to fetch items";
pub const DELETED_MESSAGE: &str = "item deleted successfully";

pub async fn list(
    Extension(store): Extension<DynItemStore>,
) -> Result<Json<Vec<Item>>, AppError> {
    debug!("listing items");
    let items = store
        .list()
        .await
        .map_err(|err| AppError::from_store(err, LIST_FAILED_MESSAGE))?;
    Ok(Json(items))
}

pub async fn get_by_id(
    Extension(store): Extension<DynItemStore>,
    Path(id): Path<String>,
) -> Result<Json<Item>, AppError> {
    debug!(id = %id, "fetching item");
    let item = store.get(&id).await?;
    Ok(Json(item))
}

pub async fn create(
    Extension(store): Extension<DynItemStore>,
    ValidatedJson(request): ValidatedJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let (name, quantity) = request.into_parts();
    let item = store.create(&name, quantity).await?;
    info!(id = item.id, name = %item.name, quantity = item.quantity, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    Extension(store): Extension<DynItemStore>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateItemRequest>,
) -> Result<Json<Item>, AppError> {
    let (name, quantity) = request.into_parts();
    let item = store.update(&id, name, quantity).await?;
    info!(id = item.id, name = %item.name, quantity = item.quantity, "item updated");
    Ok(Json(item))
}

pub async fn delete(
    Extension(store): Extension<DynItemStore>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    store.soft_delete(&id).await?;
    info!(id = %id, "item deleted");
    Ok(Json(json!({ "message": DELETED_MESSAGE })))
}
