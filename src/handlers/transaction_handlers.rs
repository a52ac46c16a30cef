use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::handlers::{ErrorResponse, validate_request};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::filters::TransactionFilters;
use crate::models::pagination::{Page, PageQuery};
use crate::models::transaction::{
    CreateTransactionRequest, Transaction, UpdateTransactionRequest,
};
use crate::services::transaction_service::{TransactionError, TransactionService};

/// Convert TransactionError to HTTP response
impl IntoResponse for TransactionError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            TransactionError::TransactionNotFound => {
                (StatusCode::NOT_FOUND, "transaction_not_found")
            }
            TransactionError::CategoryNotFound => (StatusCode::NOT_FOUND, "category_not_found"),
            TransactionError::SubcategoryNotFound => {
                (StatusCode::BAD_REQUEST, "subcategory_not_found")
            }
            TransactionError::CategoryTypeMismatch { .. } => {
                (StatusCode::BAD_REQUEST, "category_type_mismatch")
            }
            TransactionError::InvalidCursor(_) => (StatusCode::BAD_REQUEST, "invalid_cursor"),
            TransactionError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "transaction request failed");
                let error_response =
                    ErrorResponse::new("database_error", "Internal server error");
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response();
            }
        };

        let error_response = ErrorResponse::new(error_type, &self.to_string());
        (status, Json(error_response)).into_response()
    }
}

/// Handler for creating a transaction
///
/// The category must belong to the user and match the entry type.
#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created", body = Transaction),
        (status = 400, description = "Validation error or category type mismatch", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn create_transaction_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), Response> {
    validate_request(&request)?;

    match transaction_service
        .create_transaction(&auth_user.user, request)
        .await
    {
        Ok(transaction) => Ok((StatusCode::CREATED, Json(transaction))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the transaction feed
///
/// Returns one page in (date desc, id desc) order. Pass `next_cursor` back as
/// `cursor` to continue.
#[utoipa::path(
    get,
    path = "/api/transactions/feed",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of transactions", body = Page<Transaction>),
        (status = 400, description = "Invalid cursor", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn feed_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Transaction>>, Response> {
    match transaction_service.feed(auth_user.user.id, query).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing transactions with optional filters
///
/// Newest date first, at most 1000 rows. Use the feed to page through more.
#[utoipa::path(
    get,
    path = "/api/transactions",
    params(TransactionFilters),
    responses(
        (status = 200, description = "Matching transactions", body = Vec<Transaction>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn list_transactions_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(filters): Query<TransactionFilters>,
) -> Result<Json<Vec<Transaction>>, Response> {
    match transaction_service
        .list_transactions(auth_user.user.id, filters)
        .await
    {
        Ok(transactions) => Ok(Json(transactions)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for fetching a single transaction
#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction", body = Transaction),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn get_transaction_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Transaction>, Response> {
    match transaction_service
        .get_transaction(auth_user.user.id, transaction_id)
        .await
    {
        Ok(transaction) => Ok(Json(transaction)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for updating a transaction
#[utoipa::path(
    put,
    path = "/api/transactions/{id}",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated", body = Transaction),
        (status = 400, description = "Validation error or category type mismatch", body = ErrorResponse),
        (status = 404, description = "Transaction or category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn update_transaction_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(transaction_id): Path<Uuid>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, Response> {
    validate_request(&request)?;

    match transaction_service
        .update_transaction(auth_user.user.id, transaction_id, request)
        .await
    {
        Ok(transaction) => Ok(Json(transaction)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting a transaction
#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 204, description = "Transaction deleted"),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn delete_transaction_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    match transaction_service
        .delete_transaction(auth_user.user.id, transaction_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::authenticated_user;
    use crate::models::category::{Category, EntryType};
    use crate::repositories::category_repository::CategoryRepository;
    use crate::repositories::memory::{InMemoryCategoryRepository, InMemoryTransactionRepository};
    use crate::services::transaction_service::TransactionServiceImpl;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    async fn setup(
        auth_user: &AuthenticatedUser,
        entry_type: EntryType,
    ) -> (Arc<dyn TransactionService>, Category) {
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let category = categories
            .create(Category {
                id: Uuid::new_v4(),
                user_id: auth_user.user.id,
                name: "Food".to_string(),
                icon: "utensils".to_string(),
                color: "#F59E0B".to_string(),
                entry_type,
                subcategories: vec![],
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let service: Arc<dyn TransactionService> = Arc::new(TransactionServiceImpl::new(
            Arc::new(InMemoryTransactionRepository::new()),
            categories,
        ));
        (service, category)
    }

    fn request(category_id: Uuid, amount: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            amount: Decimal::from_str(amount).unwrap(),
            currency: Some("USD".to_string()),
            description: "Lunch".to_string(),
            category_id,
            subcategory_id: None,
            entry_type: EntryType::Expense,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    async fn error_code(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        body_json["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_transaction_handler_success() {
        let auth_user = authenticated_user();
        let (service, category) = setup(&auth_user, EntryType::Expense).await;

        let (status, Json(transaction)) = create_transaction_handler(
            State(service),
            Extension(auth_user.clone()),
            Json(request(category.id, "12.50")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(transaction.amount, Decimal::from_str("12.50").unwrap());
        assert_eq!(transaction.user_id, auth_user.user.id);
    }

    #[tokio::test]
    async fn test_create_transaction_handler_rejects_non_positive_amount() {
        let auth_user = authenticated_user();
        let (service, category) = setup(&auth_user, EntryType::Expense).await;

        let result = create_transaction_handler(
            State(service),
            Extension(auth_user),
            Json(request(category.id, "0")),
        )
        .await;

        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "validation_error");
    }

    #[tokio::test]
    async fn test_create_transaction_handler_type_mismatch() {
        let auth_user = authenticated_user();
        let (service, category) = setup(&auth_user, EntryType::Income).await;

        let result = create_transaction_handler(
            State(service),
            Extension(auth_user),
            Json(request(category.id, "10")),
        )
        .await;

        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "category_type_mismatch");
    }

    #[tokio::test]
    async fn test_feed_handler_invalid_cursor() {
        let auth_user = authenticated_user();
        let (service, _) = setup(&auth_user, EntryType::Expense).await;

        let result = feed_handler(
            State(service),
            Extension(auth_user),
            Query(PageQuery {
                limit: Some(10),
                cursor: Some("2024-13-01|nope".to_string()),
            }),
        )
        .await;

        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "invalid_cursor");
    }

    #[tokio::test]
    async fn test_get_and_delete_transaction_handlers() {
        let auth_user = authenticated_user();
        let (service, category) = setup(&auth_user, EntryType::Expense).await;
        let (_, Json(created)) = create_transaction_handler(
            State(service.clone()),
            Extension(auth_user.clone()),
            Json(request(category.id, "3.20")),
        )
        .await
        .unwrap();

        let Json(fetched) = get_transaction_handler(
            State(service.clone()),
            Extension(auth_user.clone()),
            Path(created.id),
        )
        .await
        .unwrap();
        assert_eq!(fetched.id, created.id);

        let status = delete_transaction_handler(
            State(service.clone()),
            Extension(auth_user.clone()),
            Path(created.id),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let missing =
            get_transaction_handler(State(service), Extension(auth_user), Path(created.id)).await;
        let response = missing.unwrap_err();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_code(response).await, "transaction_not_found");
    }

    #[tokio::test]
    async fn test_list_transactions_handler_applies_filters() {
        let auth_user = authenticated_user();
        let (service, category) = setup(&auth_user, EntryType::Expense).await;
        for (amount, day) in [("1.00", 10), ("2.00", 15), ("3.00", 20)] {
            let mut req = request(category.id, amount);
            req.date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            create_transaction_handler(
                State(service.clone()),
                Extension(auth_user.clone()),
                Json(req),
            )
            .await
            .unwrap();
        }

        let Json(listed) = list_transactions_handler(
            State(service),
            Extension(auth_user),
            Query(TransactionFilters {
                start_date: NaiveDate::from_ymd_opt(2024, 1, 12),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let amounts: Vec<Decimal> = listed.iter().map(|t| t.amount).collect();
        assert_eq!(
            amounts,
            vec![
                Decimal::from_str("3.00").unwrap(),
                Decimal::from_str("2.00").unwrap()
            ]
        );
    }
}
