use crate::{
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, success_response, validate_input, PaginatedResponse,
        PaginationParams,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::services::customers::CreateCustomerRequest;

async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let customer_id = state
        .services
        .customers
        .create_customer(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "success": true,
        "customerId": customer_id,
    })))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let customer = state
        .services
        .customers
        .get_customer(customer_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(customer))
}

async fn list_customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let per_page = params.clamped_per_page();
    let (items, total) = state
        .services
        .customers
        .list_customers(params.page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        items,
        params.page,
        per_page,
        total,
    )))
}

/// GET /:id/pets - the customer's pets, by name
async fn list_customer_pets(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    // 404 for an unknown customer rather than an empty list
    state
        .services
        .customers
        .get_customer(customer_id)
        .await
        .map_err(map_service_error)?;

    let pets = state
        .services
        .pets
        .list_for_customer(customer_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(pets))
}

pub fn customer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route("/:id", get(get_customer))
        .route("/:id/pets", get(list_customer_pets))
}
