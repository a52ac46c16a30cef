use axum::{
    Json,
    extract::{Extension, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::handlers::ErrorResponse;
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::report::{DashboardStats, ReportPeriod, SummaryQuery, SummaryReport};
use crate::services::report_service::{ReportError, ReportService};

/// Convert ReportError to HTTP response
impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        match self {
            ReportError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "report request failed");
                let error_response =
                    ErrorResponse::new("database_error", "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response()
            }
        }
    }
}

/// Handler for the summary report
///
/// Unknown periods fall back to `month`.
#[utoipa::path(
    get,
    path = "/api/reports/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Totals by category and by day", body = SummaryReport),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn summary_handler(
    State(report_service): State<Arc<dyn ReportService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryReport>, Response> {
    let period = ReportPeriod::parse_lenient(query.period.as_deref());
    let entry_type = query.entry_type.unwrap_or_default();

    match report_service
        .summary(&auth_user.user, period, entry_type)
        .await
    {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the dashboard statistics
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Monthly and all-time expense totals", body = DashboardStats),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn dashboard_handler(
    State(report_service): State<Arc<dyn ReportService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<DashboardStats>, Response> {
    match report_service.dashboard(&auth_user.user).await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => Err(e.into_response()),
    }
}
