mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{response_json, TestApp};
use serde_json::json;
use uuid::Uuid;

fn booking_payload(
    customer_id: Uuid,
    pet_id: Uuid,
    doctor_id: Option<Uuid>,
    scheduled_at: chrono::DateTime<Utc>,
) -> serde_json::Value {
    let mut payload = json!({
        "branchId": Uuid::new_v4(),
        "customerId": customer_id,
        "petId": pet_id,
        "serviceId": Uuid::new_v4(),
        "scheduledAt": scheduled_at.to_rfc3339(),
    });
    if let Some(doctor_id) = doctor_id {
        payload["doctorId"] = json!(doctor_id);
    }
    payload
}

#[tokio::test]
async fn booking_succeeds_for_a_free_slot() {
    let app = TestApp::spawn().await;
    let customer_id = app.seed_customer().await;
    let pet_id = app.seed_pet(customer_id).await;
    let doctor_id = Uuid::new_v4();
    let when = Utc::now() + Duration::days(1);

    let (status, body) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(customer_id, pet_id, Some(doctor_id), when),
        )
        .await,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    let appointment_id = body["appointmentId"].as_str().expect("appointment id");

    let (status, details) = response_json(
        app.get(&format!("/api/v1/appointments/{}", appointment_id))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["status"], json!("booked"));
    assert_eq!(details["doctorId"], json!(doctor_id));
}

#[tokio::test]
async fn double_booking_the_same_doctor_conflicts() {
    let app = TestApp::spawn().await;
    let customer_id = app.seed_customer().await;
    let pet_id = app.seed_pet(customer_id).await;
    let doctor_id = Uuid::new_v4();
    let when = Utc::now() + Duration::days(1);

    let (status, _) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(customer_id, pet_id, Some(doctor_id), when),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // 10 minutes later is inside the default 30 minute window
    let (status, body) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(
                customer_id,
                pet_id,
                Some(doctor_id),
                when + Duration::minutes(10),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already has"));

    // A different doctor at the same time is fine
    let (status, _) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(customer_id, pet_id, Some(Uuid::new_v4()), when),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn bookings_outside_the_window_do_not_conflict() {
    let app = TestApp::spawn().await;
    let customer_id = app.seed_customer().await;
    let pet_id = app.seed_pet(customer_id).await;
    let doctor_id = Uuid::new_v4();
    let when = Utc::now() + Duration::days(1);

    let (status, _) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(customer_id, pet_id, Some(doctor_id), when),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Exactly one slot width away is the first free slot
    let (status, _) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(
                customer_id,
                pet_id,
                Some(doctor_id),
                when + Duration::minutes(30),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn appointments_without_a_doctor_never_conflict() {
    let app = TestApp::spawn().await;
    let customer_id = app.seed_customer().await;
    let pet_id = app.seed_pet(customer_id).await;
    let when = Utc::now() + Duration::days(1);

    for _ in 0..3 {
        let (status, _) = response_json(
            app.post(
                "/api/v1/appointments",
                booking_payload(customer_id, pet_id, None, when),
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn cancelling_frees_the_doctors_slot() {
    let app = TestApp::spawn().await;
    let customer_id = app.seed_customer().await;
    let pet_id = app.seed_pet(customer_id).await;
    let doctor_id = Uuid::new_v4();
    let when = Utc::now() + Duration::days(1);

    let (_, body) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(customer_id, pet_id, Some(doctor_id), when),
        )
        .await,
    )
    .await;
    let appointment_id = body["appointmentId"].as_str().unwrap().to_string();

    let (status, cancelled) = response_json(
        app.post(
            &format!("/api/v1/appointments/{}/cancel", appointment_id),
            json!({}),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], json!("cancelled"));

    // The slot is available again
    let (status, _) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(customer_id, pet_id, Some(doctor_id), when),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Cancelling twice is rejected
    let (status, _) = response_json(
        app.post(
            &format!("/api/v1/appointments/{}/cancel", appointment_id),
            json!({}),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rescheduling_moves_the_appointment() {
    let app = TestApp::spawn().await;
    let customer_id = app.seed_customer().await;
    let pet_id = app.seed_pet(customer_id).await;
    let doctor_id = Uuid::new_v4();
    let when = Utc::now() + Duration::days(1);

    let (_, body) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(customer_id, pet_id, Some(doctor_id), when),
        )
        .await,
    )
    .await;
    let appointment_id = body["appointmentId"].as_str().unwrap().to_string();

    // Moving within its own window must not conflict with itself
    let new_time = when + Duration::minutes(10);
    let (status, moved) = response_json(
        app.put(
            &format!("/api/v1/appointments/{}", appointment_id),
            json!({ "scheduledAt": new_time.to_rfc3339() }),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["status"], json!("booked"));
}

#[tokio::test]
async fn rescheduling_into_a_taken_slot_conflicts() {
    let app = TestApp::spawn().await;
    let customer_id = app.seed_customer().await;
    let pet_id = app.seed_pet(customer_id).await;
    let doctor_id = Uuid::new_v4();
    let first = Utc::now() + Duration::days(1);
    let second = first + Duration::hours(2);

    let (_, _) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(customer_id, pet_id, Some(doctor_id), first),
        )
        .await,
    )
    .await;
    let (_, body) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(customer_id, pet_id, Some(doctor_id), second),
        )
        .await,
    )
    .await;
    let second_id = body["appointmentId"].as_str().unwrap().to_string();

    let (status, _) = response_json(
        app.put(
            &format!("/api/v1/appointments/{}", second_id),
            json!({ "scheduledAt": (first + chrono::Duration::minutes(5)).to_rfc3339() }),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn cancelled_appointments_cannot_be_rescheduled() {
    let app = TestApp::spawn().await;
    let customer_id = app.seed_customer().await;
    let pet_id = app.seed_pet(customer_id).await;
    let when = Utc::now() + Duration::days(1);

    let (_, body) = response_json(
        app.post(
            "/api/v1/appointments",
            booking_payload(customer_id, pet_id, None, when),
        )
        .await,
    )
    .await;
    let appointment_id = body["appointmentId"].as_str().unwrap().to_string();

    let (status, _) = response_json(
        app.post(
            &format!("/api/v1/appointments/{}/cancel", appointment_id),
            json!({}),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = response_json(
        app.put(
            &format!("/api/v1/appointments/{}", appointment_id),
            json!({ "scheduledAt": (when + Duration::days(1)).to_rfc3339() }),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("cancelled"));
}

#[tokio::test]
async fn listing_returns_a_customers_appointments_in_time_order() {
    let app = TestApp::spawn().await;
    let customer_id = app.seed_customer().await;
    let pet_id = app.seed_pet(customer_id).await;
    let base = Utc::now() + Duration::days(1);

    // Booked out of order
    for offset in [3i64, 1, 2] {
        let (status, _) = response_json(
            app.post(
                "/api/v1/appointments",
                booking_payload(customer_id, pet_id, None, base + Duration::hours(offset)),
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = response_json(
        app.get(&format!("/api/v1/appointments?customerId={}", customer_id))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let times: Vec<String> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["scheduledAt"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(times.len(), 3);
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
}

#[tokio::test]
async fn booking_with_missing_fields_is_a_client_error() {
    let app = TestApp::spawn().await;

    let (status, _) = response_json(
        app.post("/api/v1/appointments", json!({ "petId": Uuid::new_v4() }))
            .await,
    )
    .await;
    assert!(status.is_client_error());

    let payload = json!({
        "branchId": Uuid::nil(),
        "customerId": Uuid::new_v4(),
        "petId": Uuid::new_v4(),
        "serviceId": Uuid::new_v4(),
        "scheduledAt": Utc::now().to_rfc3339(),
    });
    let (status, body) = response_json(app.post("/api/v1/appointments", payload).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("missing required fields"));
}

#[tokio::test]
async fn unknown_appointment_is_not_found() {
    let app = TestApp::spawn().await;

    let (status, _) = response_json(
        app.get(&format!("/api/v1/appointments/{}", Uuid::new_v4()))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
