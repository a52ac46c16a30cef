//! Application wiring: shared state, OpenAPI document and the router.

use axum::{
    Json, Router,
    extract::FromRef,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::clock::Clock;
use crate::config::{AppConfig, AuthConfig, CookieConfig};
use crate::handlers::ErrorResponse;
use crate::handlers::auth_handlers::{
    SessionCookie, login_handler, logout_handler, me_handler, register_handler,
    update_profile_handler,
};
use crate::handlers::category_handlers::{
    add_subcategory_handler, create_category_handler, delete_category_handler,
    delete_subcategory_handler, list_categories_handler, update_category_handler,
};
use crate::handlers::currency_handlers::{convert_handler, list_currencies_handler};
use crate::handlers::report_handlers::{dashboard_handler, summary_handler};
use crate::handlers::transaction_handlers::{
    create_transaction_handler, delete_transaction_handler, feed_handler,
    get_transaction_handler, list_transactions_handler, update_transaction_handler,
};
use crate::middleware::auth_middleware::auth_middleware;
use crate::repositories::category_repository::{CategoryRepository, PostgresCategoryRepository};
use crate::repositories::memory::{
    InMemoryCategoryRepository, InMemorySessionRepository, InMemoryTransactionRepository,
    InMemoryUserRepository,
};
use crate::repositories::session_repository::{PostgresSessionRepository, SessionRepository};
use crate::repositories::transaction_repository::{
    PostgresTransactionRepository, TransactionRepository,
};
use crate::repositories::user_repository::{PostgresUserRepository, UserRepository};
use crate::services::auth_service::{AuthService, AuthServiceImpl};
use crate::services::authenticator::Authenticator;
use crate::services::category_service::{CategoryService, CategoryServiceImpl};
use crate::services::currency_service::{CurrencyService, CurrencyServiceImpl};
use crate::services::report_service::{ReportService, ReportServiceImpl};
use crate::services::session_service::{SessionManager, SessionManagerImpl};
use crate::services::token_service::TokenCodec;
use crate::services::transaction_service::{TransactionService, TransactionServiceImpl};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth_handlers::register_handler,
        crate::handlers::auth_handlers::login_handler,
        crate::handlers::auth_handlers::logout_handler,
        crate::handlers::auth_handlers::me_handler,
        crate::handlers::auth_handlers::update_profile_handler,
        crate::handlers::category_handlers::list_categories_handler,
        crate::handlers::category_handlers::create_category_handler,
        crate::handlers::category_handlers::update_category_handler,
        crate::handlers::category_handlers::delete_category_handler,
        crate::handlers::category_handlers::add_subcategory_handler,
        crate::handlers::category_handlers::delete_subcategory_handler,
        crate::handlers::transaction_handlers::create_transaction_handler,
        crate::handlers::transaction_handlers::list_transactions_handler,
        crate::handlers::transaction_handlers::feed_handler,
        crate::handlers::transaction_handlers::get_transaction_handler,
        crate::handlers::transaction_handlers::update_transaction_handler,
        crate::handlers::transaction_handlers::delete_transaction_handler,
        crate::handlers::currency_handlers::list_currencies_handler,
        crate::handlers::currency_handlers::convert_handler,
        crate::handlers::report_handlers::summary_handler,
        crate::handlers::report_handlers::dashboard_handler,
    ),
    components(schemas(ErrorResponse)),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication and sessions"),
        (name = "categories", description = "Income and expense categories"),
        (name = "transactions", description = "Transactions and the paginated feed"),
        (name = "currencies", description = "Currency table and conversion"),
        (name = "reports", description = "Summary report and dashboard statistics")
    ),
    info(
        title = "Expense Tracker API",
        version = "0.1.0",
        description = "REST API for tracking personal income and expenses",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Storage backends behind the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            sessions: Arc::new(PostgresSessionRepository::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
            transactions: Arc::new(PostgresTransactionRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            transactions: Arc::new(InMemoryTransactionRepository::new()),
        }
    }
}

/// Shared state; handlers extract the piece they need
#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub category_service: Arc<dyn CategoryService>,
    pub transaction_service: Arc<dyn TransactionService>,
    pub currency_service: Arc<dyn CurrencyService>,
    pub report_service: Arc<dyn ReportService>,
    pub authenticator: Arc<Authenticator>,
    pub session_cookie: SessionCookie,
}

impl AppState {
    pub fn new(
        auth: &AuthConfig,
        cookie: CookieConfig,
        repositories: Repositories,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let token_codec = Arc::new(TokenCodec::new(
            &auth.jwt_secret,
            auth.access_token_ttl,
            clock.clone(),
        ));
        let session_manager: Arc<dyn SessionManager> = Arc::new(SessionManagerImpl::new(
            repositories.sessions.clone(),
            clock.clone(),
            auth,
        ));
        let report_service: Arc<dyn ReportService> = Arc::new(ReportServiceImpl::new(
            repositories.transactions.clone(),
            repositories.categories.clone(),
            clock,
        ));

        let category_service: Arc<dyn CategoryService> = Arc::new(CategoryServiceImpl::new(
            repositories.categories.clone(),
            repositories.transactions.clone(),
        ));
        let transaction_service: Arc<dyn TransactionService> = Arc::new(
            TransactionServiceImpl::new(
                repositories.transactions.clone(),
                repositories.categories.clone(),
            ),
        );
        let auth_service: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
            repositories.users.clone(),
            category_service.clone(),
            session_manager.clone(),
            token_codec.clone(),
            auth.bcrypt_cost,
        ));
        let authenticator = Arc::new(Authenticator::new(
            token_codec,
            session_manager,
            repositories.users,
        ));

        Self {
            auth_service,
            category_service,
            transaction_service,
            currency_service: Arc::new(CurrencyServiceImpl::new()),
            report_service,
            authenticator,
            session_cookie: SessionCookie::new(cookie, auth.session_absolute_window),
        }
    }
}

/// CORS for the configured origins. Credentials are allowed so the session
/// cookie travels with cross-origin requests.
pub fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Build the full application router
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let protected = Router::new()
        .route("/api/auth/me", get(me_handler))
        .route("/api/auth/profile", put(update_profile_handler))
        .route(
            "/api/categories",
            get(list_categories_handler).post(create_category_handler),
        )
        .route(
            "/api/categories/{id}",
            put(update_category_handler).delete(delete_category_handler),
        )
        .route(
            "/api/categories/{id}/subcategories",
            post(add_subcategory_handler),
        )
        .route(
            "/api/categories/{id}/subcategories/{sub_id}",
            delete(delete_subcategory_handler),
        )
        .route(
            "/api/transactions",
            get(list_transactions_handler).post(create_transaction_handler),
        )
        .route("/api/transactions/feed", get(feed_handler))
        .route(
            "/api/transactions/{id}",
            get(get_transaction_handler)
                .put(update_transaction_handler)
                .delete(delete_transaction_handler),
        )
        .route("/api/reports/summary", get(summary_handler))
        .route("/api/dashboard/stats", get(dashboard_handler))
        .route_layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            auth_middleware,
        ));

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/api/docs/openapi.json", get(openapi_json))
        // Authentication routes
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        // Currency routes
        .route("/api/currencies", get(list_currencies_handler))
        .route("/api/currencies/convert", get(convert_handler))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
