mod common;

use axum::http::StatusCode;
use common::{response_json, TestApp};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn customer_and_pet_lifecycle() {
    let app = TestApp::spawn().await;

    let (status, body) = response_json(
        app.post(
            "/api/v1/customers",
            json!({
                "firstName": "Sam",
                "lastName": "Rivera",
                "email": "sam.rivera@example.com",
                "phone": "555-0101"
            }),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let customer_id = body["customerId"].as_str().expect("customer id").to_string();

    let (status, customer) = response_json(
        app.get(&format!("/api/v1/customers/{}", customer_id))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(customer["firstName"], json!("Sam"));

    let (status, body) = response_json(
        app.post(
            "/api/v1/pets",
            json!({
                "customerId": customer_id,
                "name": "Mochi",
                "species": "cat",
                "birthDate": "2021-04-12"
            }),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let pet_id = body["petId"].as_str().expect("pet id").to_string();

    let (status, pet) = response_json(app.get(&format!("/api/v1/pets/{}", pet_id)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pet["name"], json!("Mochi"));
    assert_eq!(pet["species"], json!("cat"));

    let (status, pets) = response_json(
        app.get(&format!("/api/v1/customers/{}/pets", customer_id))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pets.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn pet_registration_requires_an_existing_owner() {
    let app = TestApp::spawn().await;

    let (status, body) = response_json(
        app.post(
            "/api/v1/pets",
            json!({
                "customerId": Uuid::new_v4(),
                "name": "Ghost",
                "species": "dog"
            }),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let app = TestApp::spawn().await;

    let (status, _) = response_json(
        app.post(
            "/api/v1/customers",
            json!({ "firstName": "", "lastName": "Rivera" }),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let customer_id = app.seed_customer().await;
    let (status, _) = response_json(
        app.post(
            "/api/v1/pets",
            json!({ "customerId": customer_id, "name": "", "species": "cat" }),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customer_listing_is_paginated() {
    let app = TestApp::spawn().await;
    for _ in 0..3 {
        app.seed_customer().await;
    }

    let (status, body) =
        response_json(app.get("/api/v1/customers?page=1&perPage=2").await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], json!(3));
    assert_eq!(body["pagination"]["totalPages"], json!(2));

    let (status, body) =
        response_json(app.get("/api/v1/customers?page=2&perPage=2").await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn branch_stock_listing_only_shows_that_branch() {
    let app = TestApp::spawn().await;
    let branch_a = Uuid::new_v4();
    let branch_b = Uuid::new_v4();
    app.seed_stock(branch_a, Uuid::new_v4(), 5).await;
    app.seed_stock(branch_a, Uuid::new_v4(), 7).await;
    app.seed_stock(branch_b, Uuid::new_v4(), 9).await;

    let (status, body) =
        response_json(app.get(&format!("/api/v1/inventory/{}", branch_a)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], json!(2));
}

#[tokio::test]
async fn unknown_stock_pair_is_not_found() {
    let app = TestApp::spawn().await;

    let (status, _) = response_json(
        app.get(&format!(
            "/api/v1/inventory/{}/{}",
            Uuid::new_v4(),
            Uuid::new_v4()
        ))
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_endpoint_reports_database_status() {
    let app = TestApp::spawn().await;

    let (status, body) = response_json(app.get("/api/v1/health").await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checks"]["database"], json!("healthy"));
}
