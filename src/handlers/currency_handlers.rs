use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::handlers::ErrorResponse;
use crate::models::currency::{ConversionResult, ConvertQuery, CurrencyList};
use crate::services::currency_service::{CurrencyError, CurrencyService};

/// Convert CurrencyError to HTTP response
impl IntoResponse for CurrencyError {
    fn into_response(self) -> Response {
        let code = match &self {
            CurrencyError::InvalidCurrency(_) => "invalid_currency",
            CurrencyError::AmountOutOfRange(_) => "amount_out_of_range",
        };
        let error_response = ErrorResponse::new(code, &self.to_string());
        (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
    }
}

/// Handler for listing supported currencies
#[utoipa::path(
    get,
    path = "/api/currencies",
    responses(
        (status = 200, description = "Supported currencies with approximate USD rates", body = CurrencyList)
    ),
    tag = "currencies"
)]
pub async fn list_currencies_handler(
    State(currency_service): State<Arc<dyn CurrencyService>>,
) -> Json<CurrencyList> {
    Json(currency_service.list_currencies())
}

/// Handler for currency conversion
#[utoipa::path(
    get,
    path = "/api/currencies/convert",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Converted amount", body = ConversionResult),
        (status = 400, description = "Unsupported currency or amount out of range", body = ErrorResponse)
    ),
    tag = "currencies"
)]
pub async fn convert_handler(
    State(currency_service): State<Arc<dyn CurrencyService>>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ConversionResult>, Response> {
    match currency_service.convert(query.amount, &query.from, &query.to) {
        Ok(result) => Ok(Json(result)),
        Err(e) => Err(e.into_response()),
    }
}
