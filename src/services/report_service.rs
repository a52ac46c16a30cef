use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::category::{DEFAULT_CATEGORY_COLOR, EntryType};
use crate::models::filters::{PeriodTotals, TransactionFilters};
use crate::models::report::{
    CategoryTotal, DailyTotal, DashboardStats, ReportPeriod, SummaryReport,
};
use crate::models::user::User;
use crate::repositories::RepositoryError;
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::transaction_repository::TransactionRepository;

/// Rows scanned for a single summary report
pub const REPORT_SCAN_LIMIT: i64 = 10_000;

const UNKNOWN_CATEGORY_NAME: &str = "Other";

/// Report service errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for ReportError {
    fn from(e: RepositoryError) -> Self {
        ReportError::DatabaseError(e.to_string())
    }
}

/// Trait defining the aggregate views over a user's transactions
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Totals for the recent period, by category and by day
    async fn summary(
        &self,
        user: &User,
        period: ReportPeriod,
        entry_type: EntryType,
    ) -> Result<SummaryReport, ReportError>;

    /// Expense totals for this month, last month and all time
    async fn dashboard(&self, user: &User) -> Result<DashboardStats, ReportError>;
}

/// Implementation of ReportService
pub struct ReportServiceImpl {
    transaction_repository: Arc<dyn TransactionRepository>,
    category_repository: Arc<dyn CategoryRepository>,
    clock: Arc<dyn Clock>,
}

impl ReportServiceImpl {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepository>,
        category_repository: Arc<dyn CategoryRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transaction_repository,
            category_repository,
            clock,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Percentage change from `previous` to `current`, one decimal place.
/// With nothing to compare against it is 100 when `current` is positive, else 0.
pub fn change_percentage(current: Decimal, previous: Decimal) -> Decimal {
    if previous > Decimal::ZERO {
        current
            .checked_sub(previous)
            .and_then(|diff| diff.checked_div(previous))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.round_dp(1))
            .unwrap_or(Decimal::ZERO)
    } else if current > Decimal::ZERO {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

#[async_trait]
impl ReportService for ReportServiceImpl {
    async fn summary(
        &self,
        user: &User,
        period: ReportPeriod,
        entry_type: EntryType,
    ) -> Result<SummaryReport, ReportError> {
        let start_date = period.start_from(self.today());
        let filters = TransactionFilters::between(entry_type, Some(start_date), None);

        let transactions = self
            .transaction_repository
            .find_filtered(user.id, &filters, REPORT_SCAN_LIMIT)
            .await?;
        let categories: HashMap<Uuid, _> = self
            .category_repository
            .find_by_user(user.id)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut total = Decimal::ZERO;
        let mut by_category: HashMap<Uuid, CategoryTotal> = HashMap::new();
        let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

        for transaction in &transactions {
            total = total.saturating_add(transaction.amount);

            let entry = by_category
                .entry(transaction.category_id)
                .or_insert_with(|| {
                    let category = categories.get(&transaction.category_id);
                    CategoryTotal {
                        category_id: transaction.category_id,
                        name: category
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| UNKNOWN_CATEGORY_NAME.to_string()),
                        color: category
                            .map(|c| c.color.clone())
                            .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
                        total: Decimal::ZERO,
                        count: 0,
                    }
                });
            entry.total = entry.total.saturating_add(transaction.amount);
            entry.count += 1;

            let day = by_day.entry(transaction.date).or_insert(Decimal::ZERO);
            *day = day.saturating_add(transaction.amount);
        }

        let mut by_category: Vec<CategoryTotal> = by_category.into_values().collect();
        by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

        tracing::debug!(
            user_id = %user.id,
            period = ?period,
            rows = transactions.len(),
            "built summary report"
        );

        Ok(SummaryReport {
            total,
            count: transactions.len() as i64,
            by_category,
            daily_trend: by_day
                .into_iter()
                .map(|(date, amount)| DailyTotal { date, amount })
                .collect(),
            period,
            entry_type,
            start_date,
            currency: user.preferred_currency.clone(),
        })
    }

    async fn dashboard(&self, user: &User) -> Result<DashboardStats, ReportError> {
        let month_start = first_of_month(self.today());
        let last_month_end = month_start - Days::new(1);
        let last_month_start = first_of_month(last_month_end);

        let this_month: PeriodTotals = self
            .transaction_repository
            .totals(
                user.id,
                &TransactionFilters::between(EntryType::Expense, Some(month_start), None),
            )
            .await?;
        let last_month = self
            .transaction_repository
            .totals(
                user.id,
                &TransactionFilters::between(
                    EntryType::Expense,
                    Some(last_month_start),
                    Some(last_month_end),
                ),
            )
            .await?;
        let all_time = self
            .transaction_repository
            .totals(
                user.id,
                &TransactionFilters::between(EntryType::Expense, None, None),
            )
            .await?;
        let categories_count = self.category_repository.find_by_user(user.id).await?.len();

        Ok(DashboardStats {
            this_month,
            last_month,
            all_time,
            change_percentage: change_percentage(this_month.total, last_month.total),
            categories_count: categories_count as i64,
            currency: user.preferred_currency.clone(),
        })
    }
}
