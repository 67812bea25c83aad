use axum::middleware::from_fn;
use axum::Router;
use dotenvy::dotenv;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod config;
mod db;
mod error;
mod middleware;
mod time;
mod utils;

use crate::api::auth::AuthDoc;
use crate::config::Config;
use crate::db::queries::approvals::ApprovalDoc;
use crate::db::queries::availability::AvailabilityDoc;
use crate::db::queries::bookings::BookingDoc;
use crate::db::queries::dashboard::DashboardDoc;
use crate::db::queries::guests::GuestDoc;
use crate::db::queries::rooms::RoomDoc;
use crate::db::queries::staff::StaffDoc;
use crate::middleware::auth::{require_admin, session_middleware};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    Config::init();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hoteltrack_backend=debug,tower_http=info")),
        )
        .init();

    let pool = db::pool::connect().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let merged_doc = AuthDoc::openapi()
        .merge_from(RoomDoc::openapi())
        .merge_from(AvailabilityDoc::openapi())
        .merge_from(GuestDoc::openapi())
        .merge_from(BookingDoc::openapi())
        .merge_from(ApprovalDoc::openapi())
        .merge_from(StaffDoc::openapi())
        .merge_from(DashboardDoc::openapi());

    // Public routes
    let public_routes = Router::new().merge(api::auth::auth_routes());

    // Routes for any signed-in staff member
    let staff_routes = Router::new()
        .merge(api::auth::session_routes())
        .merge(api::rooms::room_routes())
        .merge(api::availability::availability_routes())
        .merge(api::guests::guest_routes())
        .merge(api::bookings::booking_routes())
        .merge(api::approvals::approval_count_routes())
        .merge(api::dashboard::dashboard_routes());

    // Admin-only routes; the gate runs inside the session middleware
    let admin_routes = Router::new()
        .merge(api::rooms::admin_room_routes())
        .merge(api::approvals::approval_routes())
        .merge(api::staff::staff_routes())
        .route_layer(from_fn(require_admin));

    let private_routes = Router::new()
        .merge(staff_routes)
        .merge(admin_routes)
        .route_layer(from_fn(session_middleware));

    let app = Router::new()
        .merge(api::health::health_routes())
        .merge(public_routes)
        .merge(private_routes)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", merged_doc.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/rapidoc.json", merged_doc).path("/rapidoc"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(pool.clone());

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    run_server(app, shutdown_tx, pool).await?;
    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal(mut shutdown_rx: broadcast::Receiver<()>, pool: PgPool) {
    tokio::select! {
        _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down..."),
        _ = shutdown_rx.recv() => info!("Received shutdown signal."),
    }
    info!("🛠️ Closing database pool...");
    pool.close().await;
    info!("✅ Database pool closed. Server shutting down.");
}

async fn run_server(
    app: Router,
    shutdown_tx: broadcast::Sender<()>,
    pool: PgPool,
) -> anyhow::Result<()> {
    let config = Config::get();
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx.subscribe(), pool))
        .await?;
    Ok(())
}
