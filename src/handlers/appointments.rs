use crate::{
    errors::ApiError,
    handlers::common::{created_response, map_service_error, success_response},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::services::appointments::{BookAppointmentRequest, RescheduleAppointmentRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentListQuery {
    customer_id: Uuid,
}

/// POST / - book an appointment; 409 when the doctor's slot is taken
async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<Response, ApiError> {
    let appointment_id = state
        .services
        .appointments
        .book(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "success": true,
        "appointmentId": appointment_id,
    })))
}

async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let appointment = state
        .services
        .appointments
        .get(appointment_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(appointment))
}

/// GET /?customerId= - a customer's appointments, soonest first
async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Response, ApiError> {
    let appointments = state
        .services
        .appointments
        .list_for_customer(query.customer_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(appointments))
}

/// PUT /:id - reschedule; availability is re-checked, self excluded
async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<RescheduleAppointmentRequest>,
) -> Result<Response, ApiError> {
    let appointment = state
        .services
        .appointments
        .reschedule(appointment_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(appointment))
}

/// POST /:id/cancel - soft cancel, frees the doctor's slot
async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let appointment = state
        .services
        .appointments
        .cancel(appointment_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(appointment))
}

pub fn appointment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(book_appointment).get(list_appointments))
        .route("/:id", get(get_appointment).put(reschedule_appointment))
        .route("/:id/cancel", post(cancel_appointment))
}
