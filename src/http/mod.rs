//! HTTP front end.
//!
//! ## Endpoints
//!
//! - `GET /` - redirect to some item awaiting review
//! - `GET /view/{id}` - show an item in review with accept/reject links
//! - `GET /accept/{id}` - queue `review -> accept`, redirect to the next item
//! - `GET /reject/{id}` - queue `review -> reject`, redirect to the next item
//! - `GET /exit` - stop the server and the move processor

mod handlers;
mod pages;

pub use handlers::{
    accept_handler, exit_handler, reject_handler, root_handler, view_handler,
};

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::engine::Engine;
use crate::error::Result;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

/// Build the router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/view/{id}", get(handlers::view_handler))
        .route("/accept/{id}", get(handlers::accept_handler))
        .route("/reject/{id}", get(handlers::reject_handler))
        .route("/exit", get(handlers::exit_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the engine is shut down (via `/exit` or [`Engine::shutdown`]).
pub async fn run_server(addr: &str, engine: Engine) -> Result<()> {
    let stopped = engine.stopped();
    let router = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(stopped)
        .await?;

    info!("http server stopped");
    Ok(())
}
