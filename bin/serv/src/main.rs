use std::net::SocketAddr;

use axum::middleware;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use wv_api::{
    auth::service::ensure_default_admin, config::ApiConfig, metrics, state::ApiState,
    tracing::init_tracing,
};
use wv_db::RecordStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    init_tracing(&config.env);

    let metrics_handle = match metrics::init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!("Prometheus exporter disabled: {e}");
            None
        }
    };

    let store = RecordStore::initialize(&config.db_path).await;

    match &config.admin_password {
        Some(password) => {
            let email = config.admin_email.trim().to_lowercase();
            ensure_default_admin(&store, &email, password, config.bcrypt_cost).await?;
        }
        None => tracing::warn!("ADMIN_PASSWORD not set, skipping default admin creation"),
    }

    let state = ApiState::new(&config, store.clone(), metrics_handle)?;
    state.uploads.ensure_root().await?;

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let app = wv_api::router::router()
        .with_state(state)
        .layer(trace_layer)
        .layer(middleware::from_fn(metrics::track_metrics));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(
        environment = %config.env,
        db_path = %config.db_path.display(),
        "Server running on http://localhost:{}",
        config.port
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutting down, flushing database");
    store.save().await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
