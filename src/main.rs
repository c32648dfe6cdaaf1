use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use petclinic_api::{
    api_v1_routes, config, db,
    events::{self, EventSender},
    handlers::AppServices,
    tracing as apptracing, AppState,
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal, sync::mpsc};
use tower_http::{compression::CompressionLayer, cors::CorsLayer};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config().context("Failed to load configuration")?;
    config::init_tracing(config.log_level(), config.log_json);

    info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting petclinic-api"
    );

    let db_pool = Arc::new(
        db::establish_connection_from_app_config(&config)
            .await
            .context("Failed to connect to the database")?,
    );

    if config.auto_migrate {
        db::run_migrations(&db_pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity);
    let event_sender = Arc::new(EventSender::new(event_tx));
    let event_task = tokio::spawn(events::process_events(event_rx));

    let services = AppServices::new(
        db_pool.clone(),
        event_sender.clone(),
        config.appointment_slot_minutes,
    );

    let state = Arc::new(AppState {
        db: db_pool.clone(),
        config: config.clone(),
        event_sender,
        services,
    });

    let cors = build_cors_layer(&config);

    let app = axum::Router::new()
        .nest("/api/v1", api_v1_routes())
        .layer(axum::middleware::from_fn(
            apptracing::request_id_middleware,
        ))
        .layer(apptracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // All EventSender clones live in the dropped router state, so the drain
    // task exits once the channel closes
    info!("Server stopped; draining events");
    if let Err(e) = event_task.await {
        error!(error = %e, "Event processor task failed");
    }

    // The router state is gone by now, so this is the last handle
    match Arc::try_unwrap(db_pool) {
        Ok(pool) => {
            if let Err(e) = db::close_pool(pool).await {
                error!(error = %e, "Failed to close the database pool");
            }
        }
        Err(_) => warn!("Database pool still referenced at shutdown; skipping close"),
    }

    Ok(())
}

fn build_cors_layer(config: &config::AppConfig) -> CorsLayer {
    if config.should_allow_permissive_cors() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.cors_allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
