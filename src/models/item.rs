use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A stock record. Rows are never purged; `deleted_at` marks them gone.
#[derive(Debug, Serialize, Clone, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub name: String,
    pub quantity: i64,
}

/// Body of `POST /api/v1/inventory`.
///
/// Fields are optional at the serde level so that a missing field is reported
/// by the validator with a field-level message instead of a generic parse error.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateItemRequest {
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "quantity is required"),
        range(min = 1, message = "quantity must be greater than zero")
    )]
    pub quantity: Option<i64>,
}

impl CreateItemRequest {
    /// Only meaningful after `validate()` succeeded.
    pub fn into_parts(self) -> (String, i64) {
        (
            self.name.unwrap_or_default(),
            self.quantity.unwrap_or_default(),
        )
    }
}

/// Body of `PUT /api/v1/inventory/:id`. Unlike creation, a zero quantity is allowed.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(
        required(message = "quantity is required"),
        range(min = 0, message = "quantity must not be negative")
    )]
    pub quantity: Option<i64>,
}

impl UpdateItemRequest {
    /// Only meaningful after `validate()` succeeded.
    pub fn into_parts(self) -> (Option<String>, i64) {
        (self.name, self.quantity.unwrap_or_default())
    }
}
