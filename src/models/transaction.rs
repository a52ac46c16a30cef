use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::category::EntryType;
use crate::validation::{validate_currency_code, validate_positive_amount};

/// A single income or expense entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub entry_type: EntryType,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a transaction
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "amount": 42.50,
    "currency": "USD",
    "description": "Weekly groceries",
    "category_id": "550e8400-e29b-41d4-a716-446655440000",
    "entry_type": "expense",
    "date": "2024-01-15"
}))]
pub struct CreateTransactionRequest {
    #[validate(custom(function = "validate_positive_amount"))]
    #[schema(minimum = 0.01, example = 42.50)]
    pub amount: Decimal,

    /// Defaults to the user's preferred currency
    #[validate(custom(function = "validate_currency_code"))]
    #[schema(min_length = 3, max_length = 3, example = "USD")]
    pub currency: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    #[serde(default)]
    pub description: String,

    pub category_id: Uuid,

    pub subcategory_id: Option<Uuid>,

    #[serde(default)]
    pub entry_type: EntryType,

    #[schema(format = "date", example = "2024-01-15")]
    pub date: NaiveDate,
}

/// Request payload for updating a transaction; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTransactionRequest {
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Option<Decimal>,

    #[validate(custom(function = "validate_currency_code"))]
    pub currency: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub category_id: Option<Uuid>,

    pub subcategory_id: Option<Uuid>,

    pub entry_type: Option<EntryType>,

    #[schema(format = "date")]
    pub date: Option<NaiveDate>,
}
