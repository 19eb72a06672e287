use axum::{
    Router,
    routing::{get, post, put},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::storage::PersonStore;

pub mod routes;

/// Server state
///
/// The store sits behind an async mutex: each request takes the single
/// session for the duration of its operation, which is exactly the
/// one-session guarantee the batch transaction needs.
pub struct AppState {
    pub store: Mutex<PersonStore>,
}

/// Build the application router around an already-initialized store.
///
/// Schema setup happens when the store is opened, before this is called,
/// so the surface never accepts a request against a missing table.
pub fn app(store: PersonStore, public_dir: PathBuf) -> Router {
    let state = Arc::new(AppState {
        store: Mutex::new(store),
    });

    Router::new()
        .route(
            "/api/pessoas",
            get(routes::list_people).post(routes::create_person),
        )
        .route(
            "/api/pessoas/{id}",
            put(routes::update_person).delete(routes::delete_person),
        )
        .route("/api/pessoas/batch-import", post(routes::import_people))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    store: PersonStore,
    public_dir: PathBuf,
) -> anyhow::Result<()> {
    let app = app(store, public_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
