use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::category::EntryType;
use crate::models::filters::PeriodTotals;

/// Look-back window of a summary report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Week,
    #[default]
    Month,
    Year,
}

impl ReportPeriod {
    /// Unrecognized or missing values mean `Month`
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            Some("week") => ReportPeriod::Week,
            Some("year") => ReportPeriod::Year,
            _ => ReportPeriod::Month,
        }
    }

    pub fn days(&self) -> u64 {
        match self {
            ReportPeriod::Week => 7,
            ReportPeriod::Month => 30,
            ReportPeriod::Year => 365,
        }
    }

    /// First date covered when the report is run on `today`
    pub fn start_from(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(self.days()))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Query string of the summary report
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// `week`, `month` (default) or `year`
    pub period: Option<String>,
    /// Defaults to `expense`
    pub entry_type: Option<EntryType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryTotal {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub total: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// Totals over a recent period, broken down by category and by day.
/// Amounts are summed as stored, without currency conversion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SummaryReport {
    pub total: Decimal,
    pub count: i64,
    /// Largest total first
    pub by_category: Vec<CategoryTotal>,
    /// Oldest day first
    pub daily_trend: Vec<DailyTotal>,
    pub period: ReportPeriod,
    pub entry_type: EntryType,
    pub start_date: NaiveDate,
    pub currency: String,
}

/// Expense overview for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub this_month: PeriodTotals,
    pub last_month: PeriodTotals,
    pub all_time: PeriodTotals,
    /// Change of this month against last month, one decimal place
    pub change_percentage: Decimal,
    pub categories_count: i64,
    pub currency: String,
}
