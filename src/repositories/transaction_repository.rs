use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use uuid::Uuid;

use crate::models::filters::{PeriodTotals, TransactionFilters};
use crate::models::pagination::Cursor;
use crate::models::transaction::Transaction;
use crate::repositories::RepositoryError;

const TRANSACTION_COLUMNS: &str = "id, user_id, amount, currency, description, category_id, \
     subcategory_id, entry_type, date, created_at";

/// Trait defining transaction repository operations
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Create a new transaction
    async fn create(&self, transaction: Transaction) -> Result<Transaction, RepositoryError>;

    /// Find a transaction by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, RepositoryError>;

    /// Replace the mutable fields of an existing transaction
    async fn update(&self, transaction: Transaction) -> Result<Transaction, RepositoryError>;

    /// Delete a transaction by ID
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Delete every transaction of a user that references the category.
    /// Returns the number of rows removed.
    async fn delete_by_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<u64, RepositoryError>;

    /// Up to `fetch` transactions of a user in (date desc, id desc) order,
    /// starting strictly after `after` when given
    async fn find_page(
        &self,
        user_id: Uuid,
        after: Option<Cursor>,
        fetch: i64,
    ) -> Result<Vec<Transaction>, RepositoryError>;

    /// Up to `limit` transactions of a user matching the filters, in
    /// (date desc, id desc) order
    async fn find_filtered(
        &self,
        user_id: Uuid,
        filters: &TransactionFilters,
        limit: i64,
    ) -> Result<Vec<Transaction>, RepositoryError>;

    /// Sum and count of a user's transactions matching the filters
    async fn totals(
        &self,
        user_id: Uuid,
        filters: &TransactionFilters,
    ) -> Result<PeriodTotals, RepositoryError>;
}

/// `AND ...` conditions for the present filters. Parameters are numbered from
/// `$2` in the order `bind_filters` binds them.
fn filter_conditions(filters: &TransactionFilters) -> (String, usize) {
    let mut param_count = 1;
    let mut conditions = Vec::new();

    if filters.start_date.is_some() {
        param_count += 1;
        conditions.push(format!("date >= ${}", param_count));
    }
    if filters.end_date.is_some() {
        param_count += 1;
        conditions.push(format!("date <= ${}", param_count));
    }
    if filters.category_id.is_some() {
        param_count += 1;
        conditions.push(format!("category_id = ${}", param_count));
    }
    if filters.entry_type.is_some() {
        param_count += 1;
        conditions.push(format!("entry_type = ${}", param_count));
    }

    let clause = conditions
        .iter()
        .map(|c| format!(" AND {}", c))
        .collect::<String>();
    (clause, param_count)
}

fn bind_filters<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    filters: &TransactionFilters,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    if let Some(start) = filters.start_date {
        query = query.bind(start);
    }
    if let Some(end) = filters.end_date {
        query = query.bind(end);
    }
    if let Some(category_id) = filters.category_id {
        query = query.bind(category_id);
    }
    if let Some(entry_type) = filters.entry_type {
        query = query.bind(entry_type);
    }
    query
}

/// PostgreSQL implementation of TransactionRepository
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO transactions ({TRANSACTION_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Transaction>(&query)
            .bind(transaction.id)
            .bind(transaction.user_id)
            .bind(transaction.amount)
            .bind(&transaction.currency)
            .bind(&transaction.description)
            .bind(transaction.category_id)
            .bind(transaction.subcategory_id)
            .bind(transaction.entry_type)
            .bind(transaction.date)
            .bind(transaction.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, RepositoryError> {
        let query = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1");

        let transaction = sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(transaction)
    }

    async fn update(&self, transaction: Transaction) -> Result<Transaction, RepositoryError> {
        let query = format!(
            r#"
            UPDATE transactions
            SET amount = $2,
                currency = $3,
                description = $4,
                category_id = $5,
                subcategory_id = $6,
                entry_type = $7,
                date = $8
            WHERE id = $1
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Transaction>(&query)
            .bind(transaction.id)
            .bind(transaction.amount)
            .bind(&transaction.currency)
            .bind(&transaction.description)
            .bind(transaction.category_id)
            .bind(transaction.subcategory_id)
            .bind(transaction.entry_type)
            .bind(transaction.date)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }

    async fn delete_by_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM transactions WHERE user_id = $1 AND category_id = $2")
                .bind(user_id)
                .bind(category_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn find_page(
        &self,
        user_id: Uuid,
        after: Option<Cursor>,
        fetch: i64,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = match after {
            Some(cursor) => {
                let query = format!(
                    r#"
                    SELECT {TRANSACTION_COLUMNS}
                    FROM transactions
                    WHERE user_id = $1
                      AND (date < $2 OR (date = $2 AND id < $3))
                    ORDER BY date DESC, id DESC
                    LIMIT $4
                    "#
                );
                sqlx::query_as::<_, Transaction>(&query)
                    .bind(user_id)
                    .bind(cursor.date)
                    .bind(cursor.id)
                    .bind(fetch)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    r#"
                    SELECT {TRANSACTION_COLUMNS}
                    FROM transactions
                    WHERE user_id = $1
                    ORDER BY date DESC, id DESC
                    LIMIT $2
                    "#
                );
                sqlx::query_as::<_, Transaction>(&query)
                    .bind(user_id)
                    .bind(fetch)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows)
    }

    async fn find_filtered(
        &self,
        user_id: Uuid,
        filters: &TransactionFilters,
        limit: i64,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let (conditions, param_count) = filter_conditions(filters);
        let query = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE user_id = $1{conditions}
            ORDER BY date DESC, id DESC
            LIMIT ${}
            "#,
            param_count + 1
        );

        let sqlx_query = sqlx::query_as::<_, Transaction>(&query).bind(user_id);
        let rows = bind_filters(sqlx_query, filters)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn totals(
        &self,
        user_id: Uuid,
        filters: &TransactionFilters,
    ) -> Result<PeriodTotals, RepositoryError> {
        let (conditions, _) = filter_conditions(filters);
        let query = format!(
            r#"
            SELECT COALESCE(SUM(amount), 0) AS total, COUNT(*) AS count
            FROM transactions
            WHERE user_id = $1{conditions}
            "#
        );

        let sqlx_query = sqlx::query_as::<_, (Decimal, i64)>(&query).bind(user_id);
        let (total, count) = bind_filters(sqlx_query, filters)
            .fetch_one(&self.pool)
            .await?;

        Ok(PeriodTotals { total, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_conditions_number_parameters_in_bind_order() {
        let filters = TransactionFilters {
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: None,
            category_id: Some(Uuid::new_v4()),
            entry_type: Some(crate::models::category::EntryType::Expense),
        };

        let (clause, last) = filter_conditions(&filters);

        assert_eq!(
            clause,
            " AND date >= $2 AND category_id = $3 AND entry_type = $4"
        );
        assert_eq!(last, 4);
    }

    #[test]
    fn test_no_filters_no_conditions() {
        let (clause, last) = filter_conditions(&TransactionFilters::default());
        assert!(clause.is_empty());
        assert_eq!(last, 1);
    }
}
