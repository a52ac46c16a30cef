use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::category::{Category, EntryType, Subcategory, UpdateCategoryRequest};
use crate::repositories::RepositoryError;

/// Trait defining category repository operations
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: Category) -> Result<Category, RepositoryError>;

    /// Find a category by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError>;

    /// Find all categories owned by a user, oldest first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Category>, RepositoryError>;

    /// Apply the present fields of an update
    async fn update(
        &self,
        id: Uuid,
        update: UpdateCategoryRequest,
    ) -> Result<Category, RepositoryError>;

    /// Append a subcategory
    async fn add_subcategory(
        &self,
        id: Uuid,
        subcategory: Subcategory,
    ) -> Result<Category, RepositoryError>;

    /// Remove a subcategory. `NotFound` if either the category or the subcategory is missing.
    async fn remove_subcategory(
        &self,
        id: Uuid,
        subcategory_id: Uuid,
    ) -> Result<Category, RepositoryError>;

    /// Delete a category by ID
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

const CATEGORY_COLUMNS: &str = "id, user_id, name, icon, color, entry_type, subcategories, created_at";

#[derive(FromRow)]
struct CategoryRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    icon: String,
    color: String,
    entry_type: EntryType,
    subcategories: Json<Vec<Subcategory>>,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            icon: row.icon,
            color: row.color,
            entry_type: row.entry_type,
            subcategories: row.subcategories.0,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL implementation of CategoryRepository
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO categories ({CATEGORY_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {CATEGORY_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, CategoryRow>(&query)
            .bind(category.id)
            .bind(category.user_id)
            .bind(&category.name)
            .bind(&category.icon)
            .bind(&category.color)
            .bind(category.entry_type)
            .bind(Json(&category.subcategories))
            .bind(category.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");

        let row = sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Category::from))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Category>, RepositoryError> {
        let query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = $1 ORDER BY created_at ASC, name ASC"
        );

        let rows = sqlx::query_as::<_, CategoryRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        update: UpdateCategoryRequest,
    ) -> Result<Category, RepositoryError> {
        let query = format!(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                icon = COALESCE($3, icon),
                color = COALESCE($4, color)
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .bind(update.name)
            .bind(update.icon)
            .bind(update.color)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Category::from).ok_or(RepositoryError::NotFound)
    }

    async fn add_subcategory(
        &self,
        id: Uuid,
        subcategory: Subcategory,
    ) -> Result<Category, RepositoryError> {
        let query = format!(
            r#"
            UPDATE categories
            SET subcategories = subcategories || jsonb_build_array($2::jsonb)
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .bind(Json(&subcategory))
            .fetch_optional(&self.pool)
            .await?;

        row.map(Category::from).ok_or(RepositoryError::NotFound)
    }

    async fn remove_subcategory(
        &self,
        id: Uuid,
        subcategory_id: Uuid,
    ) -> Result<Category, RepositoryError> {
        // Only matches when the subcategory is actually present
        let query = format!(
            r#"
            UPDATE categories
            SET subcategories = COALESCE(
                (SELECT jsonb_agg(s) FROM jsonb_array_elements(subcategories) s
                 WHERE s->>'id' <> $2),
                '[]'::jsonb)
            WHERE id = $1
              AND EXISTS (SELECT 1 FROM jsonb_array_elements(subcategories) s
                          WHERE s->>'id' = $2)
            RETURNING {CATEGORY_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .bind(subcategory_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Category::from).ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}
