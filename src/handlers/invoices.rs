use crate::{
    errors::ApiError,
    handlers::common::{created_response, map_service_error, success_response},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::services::invoices::CreateInvoiceRequest;

/// POST / - checkout: create an invoice and deduct stock atomically
async fn create_invoice(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<Response, ApiError> {
    let invoice_id = state
        .services
        .invoices
        .create_invoice(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "success": true,
        "invoiceId": invoice_id,
    })))
}

/// GET /:id - invoice header with pet list and ordered lines
async fn get_invoice(
    State(state): State<Arc<AppState>>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let details = state
        .services
        .invoices
        .get_invoice(invoice_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(details))
}

pub fn invoice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_invoice))
        .route("/:id", get(get_invoice))
}
