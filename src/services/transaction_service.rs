use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::category::{Category, EntryType};
use crate::models::filters::{MAX_FILTERED_RESULTS, TransactionFilters};
use crate::models::pagination::{Cursor, Page, PageQuery};
use crate::models::transaction::{
    CreateTransactionRequest, Transaction, UpdateTransactionRequest,
};
use crate::models::user::User;
use crate::repositories::RepositoryError;
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::transaction_repository::TransactionRepository;

/// Transaction service errors
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Transaction not found")]
    TransactionNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Subcategory not found in category")]
    SubcategoryNotFound,

    #[error("Category is for {category} entries, not {entry}")]
    CategoryTypeMismatch {
        category: EntryType,
        entry: EntryType,
    },

    #[error("{0}")]
    InvalidCursor(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

fn database_error(e: RepositoryError) -> TransactionError {
    match e {
        RepositoryError::NotFound => TransactionError::TransactionNotFound,
        RepositoryError::DatabaseError(msg) => TransactionError::DatabaseError(msg),
        RepositoryError::ConstraintViolation(msg) => TransactionError::DatabaseError(msg),
    }
}

/// Trait defining transaction service operations.
///
/// Transactions belonging to another user are reported as not found.
#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Record a transaction. The currency defaults to the user's preferred one.
    async fn create_transaction(
        &self,
        user: &User,
        request: CreateTransactionRequest,
    ) -> Result<Transaction, TransactionError>;

    /// Get a single transaction
    async fn get_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Transaction, TransactionError>;

    /// Apply a partial update, re-checking the category rules
    async fn update_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        request: UpdateTransactionRequest,
    ) -> Result<Transaction, TransactionError>;

    /// Delete a transaction
    async fn delete_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<(), TransactionError>;

    /// One page of the user's transactions, newest date first
    async fn feed(
        &self,
        user_id: Uuid,
        query: PageQuery,
    ) -> Result<Page<Transaction>, TransactionError>;

    /// The user's transactions matching the filters, newest date first,
    /// capped at 1000 rows
    async fn list_transactions(
        &self,
        user_id: Uuid,
        filters: TransactionFilters,
    ) -> Result<Vec<Transaction>, TransactionError>;
}

/// Implementation of TransactionService
pub struct TransactionServiceImpl {
    transaction_repository: Arc<dyn TransactionRepository>,
    category_repository: Arc<dyn CategoryRepository>,
}

impl TransactionServiceImpl {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepository>,
        category_repository: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            transaction_repository,
            category_repository,
        }
    }

    async fn owned_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Transaction, TransactionError> {
        self.transaction_repository
            .find_by_id(transaction_id)
            .await
            .map_err(database_error)?
            .filter(|t| t.user_id == user_id)
            .ok_or(TransactionError::TransactionNotFound)
    }

    /// Resolve the category and confirm the entry may be filed under it
    async fn check_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        subcategory_id: Option<Uuid>,
        entry_type: EntryType,
    ) -> Result<Category, TransactionError> {
        let category = self
            .category_repository
            .find_by_id(category_id)
            .await
            .map_err(database_error)?
            .filter(|c| c.user_id == user_id)
            .ok_or(TransactionError::CategoryNotFound)?;

        if category.entry_type != entry_type {
            return Err(TransactionError::CategoryTypeMismatch {
                category: category.entry_type,
                entry: entry_type,
            });
        }

        if let Some(subcategory_id) = subcategory_id {
            if category.subcategory(subcategory_id).is_none() {
                return Err(TransactionError::SubcategoryNotFound);
            }
        }

        Ok(category)
    }
}

#[async_trait]
impl TransactionService for TransactionServiceImpl {
    async fn create_transaction(
        &self,
        user: &User,
        request: CreateTransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        self.check_category(
            user.id,
            request.category_id,
            request.subcategory_id,
            request.entry_type,
        )
        .await?;

        let transaction = Transaction {
            id: Uuid::new_v4(),
            user_id: user.id,
            amount: request.amount,
            currency: request
                .currency
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| user.preferred_currency.clone()),
            description: request.description,
            category_id: request.category_id,
            subcategory_id: request.subcategory_id,
            entry_type: request.entry_type,
            date: request.date,
            created_at: Utc::now(),
        };

        self.transaction_repository
            .create(transaction)
            .await
            .map_err(database_error)
    }

    async fn get_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Transaction, TransactionError> {
        self.owned_transaction(user_id, transaction_id).await
    }

    async fn update_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        request: UpdateTransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        let mut transaction = self.owned_transaction(user_id, transaction_id).await?;

        if let Some(category_id) = request.category_id {
            if category_id != transaction.category_id {
                // The old subcategory cannot belong to a different category
                transaction.subcategory_id = None;
            }
            transaction.category_id = category_id;
        }
        if let Some(subcategory_id) = request.subcategory_id {
            transaction.subcategory_id = Some(subcategory_id);
        }
        if let Some(entry_type) = request.entry_type {
            transaction.entry_type = entry_type;
        }
        if let Some(amount) = request.amount {
            transaction.amount = amount;
        }
        if let Some(currency) = request.currency {
            transaction.currency = currency.to_uppercase();
        }
        if let Some(description) = request.description {
            transaction.description = description;
        }
        if let Some(date) = request.date {
            transaction.date = date;
        }

        self.check_category(
            user_id,
            transaction.category_id,
            transaction.subcategory_id,
            transaction.entry_type,
        )
        .await?;

        self.transaction_repository
            .update(transaction)
            .await
            .map_err(database_error)
    }

    async fn delete_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<(), TransactionError> {
        self.owned_transaction(user_id, transaction_id).await?;

        self.transaction_repository
            .delete(transaction_id)
            .await
            .map_err(database_error)
    }

    async fn feed(
        &self,
        user_id: Uuid,
        query: PageQuery,
    ) -> Result<Page<Transaction>, TransactionError> {
        let after = query
            .decoded_cursor()
            .map_err(|e| TransactionError::InvalidCursor(e.to_string()))?;
        let limit = query.effective_limit();

        let rows = self
            .transaction_repository
            .find_page(user_id, after, i64::from(limit) + 1)
            .await
            .map_err(database_error)?;

        Ok(Page::from_lookahead(rows, limit as usize, |t| {
            Cursor::new(t.date, t.id)
        }))
    }

    async fn list_transactions(
        &self,
        user_id: Uuid,
        filters: TransactionFilters,
    ) -> Result<Vec<Transaction>, TransactionError> {
        self.transaction_repository
            .find_filtered(user_id, &filters, MAX_FILTERED_RESULTS)
            .await
            .map_err(database_error)
    }
}
