use crate::{
    errors::ApiError,
    handlers::common::{created_response, map_service_error, success_response, validate_input},
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

use crate::services::pets::RegisterPetRequest;

async fn register_pet(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPetRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let pet_id = state
        .services
        .pets
        .register_pet(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "success": true,
        "petId": pet_id,
    })))
}

async fn get_pet(
    State(state): State<Arc<AppState>>,
    Path(pet_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let pet = state
        .services
        .pets
        .get_pet(pet_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(pet))
}

pub fn pet_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(register_pet))
        .route("/:id", get(get_pet))
}
