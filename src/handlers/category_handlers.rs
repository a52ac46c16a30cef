use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::handlers::{ErrorResponse, validate_request};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::category::{
    Category, CreateCategoryRequest, CreateSubcategoryRequest, UpdateCategoryRequest,
};
use crate::services::category_service::{CategoryError, CategoryService};

/// Convert CategoryError to HTTP response
impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            CategoryError::CategoryNotFound => (
                StatusCode::NOT_FOUND,
                "category_not_found",
                "Category not found",
            ),
            CategoryError::SubcategoryNotFound => (
                StatusCode::NOT_FOUND,
                "subcategory_not_found",
                "Subcategory not found",
            ),
            CategoryError::DatabaseError(ref msg) => {
                tracing::error!(error = %msg, "category request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Internal server error",
                )
            }
        };

        let error_response = ErrorResponse::new(error_type, message);
        (status, Json(error_response)).into_response()
    }
}

/// Result of deleting a category
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteCategoryResponse {
    pub message: String,
    /// Transactions removed along with the category
    pub deleted_transactions: u64,
}

/// Handler for listing categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories of the current user", body = Vec<Category>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Category>>, Response> {
    match category_service.get_categories(auth_user.user.id).await {
        Ok(categories) => Ok(Json(categories)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for creating a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), Response> {
    validate_request(&request)?;

    match category_service
        .create_category(auth_user.user.id, request)
        .await
    {
        Ok(category) => Ok((StatusCode::CREATED, Json(category))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for updating a category's name, icon or color
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(category_id): Path<Uuid>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, Response> {
    validate_request(&request)?;

    match category_service
        .update_category(auth_user.user.id, category_id, request)
        .await
    {
        Ok(category) => Ok(Json(category)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting a category
///
/// Every transaction filed under the category is deleted too.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = DeleteCategoryResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<DeleteCategoryResponse>, Response> {
    match category_service
        .delete_category(auth_user.user.id, category_id)
        .await
    {
        Ok(deleted_transactions) => Ok(Json(DeleteCategoryResponse {
            message: "Category deleted".to_string(),
            deleted_transactions,
        })),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for adding a subcategory
#[utoipa::path(
    post,
    path = "/api/categories/{id}/subcategories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CreateSubcategoryRequest,
    responses(
        (status = 201, description = "Subcategory added", body = Category),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn add_subcategory_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(category_id): Path<Uuid>,
    Json(request): Json<CreateSubcategoryRequest>,
) -> Result<(StatusCode, Json<Category>), Response> {
    validate_request(&request)?;

    match category_service
        .add_subcategory(auth_user.user.id, category_id, request)
        .await
    {
        Ok(category) => Ok((StatusCode::CREATED, Json(category))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for removing a subcategory
#[utoipa::path(
    delete,
    path = "/api/categories/{id}/subcategories/{sub_id}",
    params(
        ("id" = Uuid, Path, description = "Category ID"),
        ("sub_id" = Uuid, Path, description = "Subcategory ID")
    ),
    responses(
        (status = 200, description = "Subcategory removed", body = Category),
        (status = 404, description = "Category or subcategory not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_subcategory_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((category_id, subcategory_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Category>, Response> {
    match category_service
        .delete_subcategory(auth_user.user.id, category_id, subcategory_id)
        .await
    {
        Ok(category) => Ok(Json(category)),
        Err(e) => Err(e.into_response()),
    }
}
