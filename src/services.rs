pub mod auth_service;
pub mod authenticator;
pub mod category_service;
pub mod currency_service;
pub mod report_service;
pub mod session_service;
pub mod token_service;
pub mod transaction_service;
