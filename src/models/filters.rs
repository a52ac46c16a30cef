use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::category::EntryType;
use crate::models::transaction::Transaction;

/// Upper bound on rows returned by a filtered listing
pub const MAX_FILTERED_RESULTS: i64 = 1000;

/// Optional filters for listing transactions. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionFilters {
    /// Earliest date to include (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Latest date to include (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub entry_type: Option<EntryType>,
}

impl TransactionFilters {
    /// Every transaction of one entry type within `start..=end`
    pub fn between(
        entry_type: EntryType,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        Self {
            start_date: start,
            end_date: end,
            category_id: None,
            entry_type: Some(entry_type),
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.start_date.is_none_or(|start| transaction.date >= start)
            && self.end_date.is_none_or(|end| transaction.date <= end)
            && self
                .category_id
                .is_none_or(|id| transaction.category_id == id)
            && self
                .entry_type
                .is_none_or(|entry_type| transaction.entry_type == entry_type)
    }
}

/// Sum and number of matching transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PeriodTotals {
    pub total: Decimal,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn transaction(day: u32, category_id: Uuid, entry_type: EntryType) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: Decimal::ONE,
            currency: "USD".to_string(),
            description: String::new(),
            category_id,
            subcategory_id: None,
            entry_type,
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let filters = TransactionFilters::default();
        assert!(filters.matches(&transaction(1, Uuid::new_v4(), EntryType::Income)));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let filters = TransactionFilters {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 10),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 20),
            ..Default::default()
        };
        let category = Uuid::new_v4();

        assert!(!filters.matches(&transaction(9, category, EntryType::Expense)));
        assert!(filters.matches(&transaction(10, category, EntryType::Expense)));
        assert!(filters.matches(&transaction(20, category, EntryType::Expense)));
        assert!(!filters.matches(&transaction(21, category, EntryType::Expense)));
    }

    #[test]
    fn test_category_and_type_filters() {
        let category = Uuid::new_v4();
        let filters = TransactionFilters {
            category_id: Some(category),
            entry_type: Some(EntryType::Expense),
            ..Default::default()
        };

        assert!(filters.matches(&transaction(1, category, EntryType::Expense)));
        assert!(!filters.matches(&transaction(1, category, EntryType::Income)));
        assert!(!filters.matches(&transaction(1, Uuid::new_v4(), EntryType::Expense)));
    }
}
