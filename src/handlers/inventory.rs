use crate::{
    errors::ApiError,
    handlers::common::{
        map_service_error, success_response, PaginatedResponse, PaginationParams,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// GET /:branch_id - stock rows for a branch, paginated
async fn list_branch_stock(
    State(state): State<Arc<AppState>>,
    Path(branch_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let per_page = params.clamped_per_page();
    let (items, total) = state
        .services
        .inventory
        .list_for_branch(branch_id, params.page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        items,
        params.page,
        per_page,
        total,
    )))
}

/// GET /:branch_id/:product_id - on-hand quantity for one pair
async fn get_stock(
    State(state): State<Arc<AppState>>,
    Path((branch_id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    let quantity = state
        .services
        .inventory
        .get_stock(branch_id, product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "branchId": branch_id,
        "productId": product_id,
        "quantityOnHand": quantity,
    })))
}

pub fn inventory_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:branch_id", get(list_branch_stock))
        .route("/:branch_id/:product_id", get(get_stock))
}
