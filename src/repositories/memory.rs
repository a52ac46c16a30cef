//! In-process store used when no database is configured, and by tests.
//!
//! Every mutation happens under a single write lock, which gives the same
//! per-record atomicity the conditional SQL updates rely on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::category::{Category, Subcategory, UpdateCategoryRequest};
use crate::models::filters::{PeriodTotals, TransactionFilters};
use crate::models::pagination::Cursor;
use crate::models::session::{RevocationReason, Session};
use crate::models::transaction::Transaction;
use crate::models::user::{UpdateProfileRequest, User};
use crate::repositories::RepositoryError;
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::transaction_repository::TransactionRepository;
use crate::repositories::user_repository::UserRepository;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::ConstraintViolation(
                "Email already exists".to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: UpdateProfileRequest,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(profile_type) = update.profile_type {
            user.profile_type = profile_type;
        }
        if let Some(currency) = update.preferred_currency {
            user.preferred_currency = currency;
        }

        Ok(user.clone())
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: Session) -> Result<Session, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(RepositoryError::ConstraintViolation(
                "Session already exists".to_string(),
            ));
        }
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, RepositoryError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn touch(
        &self,
        id: Uuid,
        last_activity_at: DateTime<Utc>,
        idle_expires_at: DateTime<Utc>,
    ) -> Result<Option<Session>, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if !session.revoked => {
                session.last_activity_at = last_activity_at;
                session.idle_expires_at = idle_expires_at;
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn revoke(
        &self,
        id: Uuid,
        reason: RevocationReason,
        revoked_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if !session.revoked => {
                session.revoked = true;
                session.revoked_reason = Some(reason);
                session.revoked_at = Some(revoked_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<HashMap<Uuid, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
        let mut categories = self.categories.write().await;
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Category>, RepositoryError> {
        let categories = self.categories.read().await;
        let mut owned: Vec<Category> = categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(owned)
    }

    async fn update(
        &self,
        id: Uuid,
        update: UpdateCategoryRequest,
    ) -> Result<Category, RepositoryError> {
        let mut categories = self.categories.write().await;
        let category = categories.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(icon) = update.icon {
            category.icon = icon;
        }
        if let Some(color) = update.color {
            category.color = color;
        }

        Ok(category.clone())
    }

    async fn add_subcategory(
        &self,
        id: Uuid,
        subcategory: Subcategory,
    ) -> Result<Category, RepositoryError> {
        let mut categories = self.categories.write().await;
        let category = categories.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        category.subcategories.push(subcategory);
        Ok(category.clone())
    }

    async fn remove_subcategory(
        &self,
        id: Uuid,
        subcategory_id: Uuid,
    ) -> Result<Category, RepositoryError> {
        let mut categories = self.categories.write().await;
        let category = categories.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        let before = category.subcategories.len();
        category.subcategories.retain(|s| s.id != subcategory_id);
        if category.subcategories.len() == before {
            return Err(RepositoryError::NotFound);
        }

        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        match self.categories.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[derive(Default)]
pub struct InMemoryTransactionRepository {
    transactions: RwLock<HashMap<Uuid, Transaction>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, RepositoryError> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, RepositoryError> {
        Ok(self.transactions.read().await.get(&id).cloned())
    }

    async fn update(&self, transaction: Transaction) -> Result<Transaction, RepositoryError> {
        let mut transactions = self.transactions.write().await;
        let existing = transactions
            .get_mut(&transaction.id)
            .ok_or(RepositoryError::NotFound)?;

        // Owner and creation time are immutable
        existing.amount = transaction.amount;
        existing.currency = transaction.currency;
        existing.description = transaction.description;
        existing.category_id = transaction.category_id;
        existing.subcategory_id = transaction.subcategory_id;
        existing.entry_type = transaction.entry_type;
        existing.date = transaction.date;

        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        match self.transactions.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete_by_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<u64, RepositoryError> {
        let mut transactions = self.transactions.write().await;
        let before = transactions.len();
        transactions.retain(|_, t| !(t.user_id == user_id && t.category_id == category_id));
        Ok((before - transactions.len()) as u64)
    }

    async fn find_page(
        &self,
        user_id: Uuid,
        after: Option<Cursor>,
        fetch: i64,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let transactions = self.transactions.read().await;
        let mut rows: Vec<Transaction> = transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| after.is_none_or(|c| c.precedes(t.date, t.id)))
            .cloned()
            .collect();

        sort_newest_first(&mut rows);
        rows.truncate(usize::try_from(fetch).unwrap_or(0));

        Ok(rows)
    }

    async fn find_filtered(
        &self,
        user_id: Uuid,
        filters: &TransactionFilters,
        limit: i64,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let transactions = self.transactions.read().await;
        let mut rows: Vec<Transaction> = transactions
            .values()
            .filter(|t| t.user_id == user_id && filters.matches(t))
            .cloned()
            .collect();

        sort_newest_first(&mut rows);
        rows.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(rows)
    }

    async fn totals(
        &self,
        user_id: Uuid,
        filters: &TransactionFilters,
    ) -> Result<PeriodTotals, RepositoryError> {
        let transactions = self.transactions.read().await;
        let totals = transactions
            .values()
            .filter(|t| t.user_id == user_id && filters.matches(t))
            .fold(PeriodTotals::default(), |acc, t| PeriodTotals {
                total: acc.total.saturating_add(t.amount),
                count: acc.count + 1,
            });

        Ok(totals)
    }
}

/// (date desc, id desc)
fn sort_newest_first(rows: &mut [Transaction]) {
    rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
}
