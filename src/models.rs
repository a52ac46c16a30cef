pub mod auth;
pub mod category;
pub mod currency;
pub mod filters;
pub mod pagination;
pub mod report;
pub mod session;
pub mod transaction;
pub mod user;

pub use auth::{AuthResponse, LoginRequest, MessageResponse};
pub use category::{
    Category, CreateCategoryRequest, CreateSubcategoryRequest, EntryType, Subcategory,
    UpdateCategoryRequest,
};
pub use currency::{CURRENCIES, CurrencyInfo};
pub use filters::{PeriodTotals, TransactionFilters};
pub use pagination::{Cursor, Page, PageQuery};
pub use report::{DashboardStats, ReportPeriod, SummaryReport};
pub use session::{ClientInfo, RevocationReason, Session};
pub use transaction::{CreateTransactionRequest, Transaction, UpdateTransactionRequest};
pub use user::{CreateUserRequest, ProfileType, UpdateProfileRequest, User};
