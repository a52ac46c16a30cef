use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::category::{
    Category, CreateCategoryRequest, CreateSubcategoryRequest, DEFAULT_CATEGORY_COLOR,
    DEFAULT_CATEGORY_ICON, UpdateCategoryRequest, default_categories,
};
use crate::models::user::ProfileType;
use crate::repositories::RepositoryError;
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::transaction_repository::TransactionRepository;

/// Category service errors
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("Category not found")]
    CategoryNotFound,

    #[error("Subcategory not found")]
    SubcategoryNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

fn database_error(e: RepositoryError) -> CategoryError {
    match e {
        RepositoryError::NotFound => CategoryError::CategoryNotFound,
        RepositoryError::DatabaseError(msg) => CategoryError::DatabaseError(msg),
        RepositoryError::ConstraintViolation(msg) => CategoryError::DatabaseError(msg),
    }
}

/// Trait defining category service operations.
///
/// Categories belonging to another user are reported as not found.
#[async_trait]
pub trait CategoryService: Send + Sync {
    /// Get all categories of a user
    async fn get_categories(&self, user_id: Uuid) -> Result<Vec<Category>, CategoryError>;

    /// Create a category, with any initial subcategories
    async fn create_category(
        &self,
        user_id: Uuid,
        request: CreateCategoryRequest,
    ) -> Result<Category, CategoryError>;

    /// Rename or restyle a category
    async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<Category, CategoryError>;

    /// Delete a category and every transaction filed under it.
    /// Returns the number of transactions removed.
    async fn delete_category(&self, user_id: Uuid, category_id: Uuid)
    -> Result<u64, CategoryError>;

    /// Append a subcategory
    async fn add_subcategory(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        request: CreateSubcategoryRequest,
    ) -> Result<Category, CategoryError>;

    /// Remove a subcategory
    async fn delete_subcategory(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        subcategory_id: Uuid,
    ) -> Result<Category, CategoryError>;

    /// Create the starter categories for a new user's profile type
    async fn seed_defaults(
        &self,
        user_id: Uuid,
        profile_type: ProfileType,
    ) -> Result<Vec<Category>, CategoryError>;
}

/// Implementation of CategoryService
pub struct CategoryServiceImpl {
    category_repository: Arc<dyn CategoryRepository>,
    transaction_repository: Arc<dyn TransactionRepository>,
}

impl CategoryServiceImpl {
    pub fn new(
        category_repository: Arc<dyn CategoryRepository>,
        transaction_repository: Arc<dyn TransactionRepository>,
    ) -> Self {
        Self {
            category_repository,
            transaction_repository,
        }
    }

    async fn owned_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<Category, CategoryError> {
        self.category_repository
            .find_by_id(category_id)
            .await
            .map_err(database_error)?
            .filter(|c| c.user_id == user_id)
            .ok_or(CategoryError::CategoryNotFound)
    }
}

#[async_trait]
impl CategoryService for CategoryServiceImpl {
    async fn get_categories(&self, user_id: Uuid) -> Result<Vec<Category>, CategoryError> {
        self.category_repository
            .find_by_user(user_id)
            .await
            .map_err(database_error)
    }

    async fn create_category(
        &self,
        user_id: Uuid,
        request: CreateCategoryRequest,
    ) -> Result<Category, CategoryError> {
        let category = Category {
            id: Uuid::new_v4(),
            user_id,
            name: request.name,
            icon: request
                .icon
                .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
            color: request
                .color
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            entry_type: request.entry_type.unwrap_or_default(),
            subcategories: request
                .subcategories
                .into_iter()
                .map(CreateSubcategoryRequest::into_subcategory)
                .collect(),
            created_at: Utc::now(),
        };

        self.category_repository
            .create(category)
            .await
            .map_err(database_error)
    }

    async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<Category, CategoryError> {
        self.owned_category(user_id, category_id).await?;

        self.category_repository
            .update(category_id, request)
            .await
            .map_err(database_error)
    }

    async fn delete_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<u64, CategoryError> {
        self.owned_category(user_id, category_id).await?;

        // Two separate writes; a failure in between leaves orphaned transactions
        self.category_repository
            .delete(category_id)
            .await
            .map_err(database_error)?;

        let removed = self
            .transaction_repository
            .delete_by_category(user_id, category_id)
            .await
            .map_err(database_error)?;

        tracing::debug!(
            user_id = %user_id,
            category_id = %category_id,
            removed,
            "category deleted"
        );
        Ok(removed)
    }

    async fn add_subcategory(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        request: CreateSubcategoryRequest,
    ) -> Result<Category, CategoryError> {
        self.owned_category(user_id, category_id).await?;

        self.category_repository
            .add_subcategory(category_id, request.into_subcategory())
            .await
            .map_err(database_error)
    }

    async fn delete_subcategory(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        subcategory_id: Uuid,
    ) -> Result<Category, CategoryError> {
        let category = self.owned_category(user_id, category_id).await?;
        if category.subcategory(subcategory_id).is_none() {
            return Err(CategoryError::SubcategoryNotFound);
        }

        self.category_repository
            .remove_subcategory(category_id, subcategory_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CategoryError::SubcategoryNotFound,
                other => database_error(other),
            })
    }

    async fn seed_defaults(
        &self,
        user_id: Uuid,
        profile_type: ProfileType,
    ) -> Result<Vec<Category>, CategoryError> {
        let now = Utc::now();
        let mut created = Vec::new();

        for template in default_categories(profile_type) {
            let category = self
                .category_repository
                .create(template.instantiate(user_id, now))
                .await
                .map_err(database_error)?;
            created.push(category);
        }

        Ok(created)
    }
}
