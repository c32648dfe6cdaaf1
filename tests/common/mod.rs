#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use chrono::Utc;
use petclinic_api::{
    api_v1_routes,
    config::AppConfig,
    db::{establish_connection, run_migrations, DbPool},
    entities::{customer, inventory_record, pet},
    events::{process_events, EventSender},
    handlers::AppServices,
    tracing::request_id_middleware,
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// One fully wired application on a throwaway sqlite database.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub router: Router,
    // Held so the database file outlives the test
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let db_path = temp_dir.path().join("petclinic-test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let db = Arc::new(
            establish_connection(&database_url)
                .await
                .expect("connect to test database"),
        );
        run_migrations(&db).await.expect("run migrations");

        let (event_tx, event_rx) = mpsc::channel(64);
        tokio::spawn(process_events(event_rx));
        let event_sender = Arc::new(EventSender::new(event_tx));

        let config = AppConfig::new(
            database_url,
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );

        let services = AppServices::new(
            db.clone(),
            event_sender.clone(),
            config.appointment_slot_minutes,
        );

        let state = Arc::new(AppState {
            db: db.clone(),
            config,
            event_sender,
            services,
        });

        let router = Router::new()
            .nest("/api/v1", api_v1_routes())
            .layer(axum::middleware::from_fn(request_id_middleware))
            .with_state(state);

        Self {
            db,
            router,
            _temp_dir: temp_dir,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("infallible router call")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response<Body> {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response<Body> {
        self.request(Method::PUT, uri, Some(body)).await
    }

    /// Inserts a customer row directly, bypassing the HTTP layer.
    pub async fn seed_customer(&self) -> Uuid {
        let id = Uuid::new_v4();
        customer::ActiveModel {
            id: Set(id),
            first_name: Set("Jordan".to_string()),
            last_name: Set("Avery".to_string()),
            email: Set(Some("jordan.avery@example.com".to_string())),
            phone: Set(None),
            address: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await
        .expect("seed customer");
        id
    }

    pub async fn seed_pet(&self, customer_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        pet::ActiveModel {
            id: Set(id),
            customer_id: Set(customer_id),
            name: Set("Biscuit".to_string()),
            species: Set("dog".to_string()),
            breed: Set(Some("beagle".to_string())),
            birth_date: Set(None),
            sex: Set(Some("f".to_string())),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await
        .expect("seed pet");
        id
    }

    /// Creates a stock row for a (branch, product) pair.
    pub async fn seed_stock(&self, branch_id: Uuid, product_id: Uuid, quantity: i32) {
        inventory_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            branch_id: Set(branch_id),
            product_id: Set(product_id),
            quantity_on_hand: Set(quantity),
            selling_price: Set(Decimal::new(995, 2)),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await
        .expect("seed inventory record");
    }
}

pub async fn response_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };
    (status, json)
}
