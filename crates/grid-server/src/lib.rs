//! HTTP service for survey grids.
//!
//! Serves the grid page, dynamic row fragments and the save endpoint, plus a
//! JSON view of the assembled table for tooling.

pub mod error;
pub mod markup;
pub mod routes;
pub mod state;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use error::{SaveReply, ServerError};
pub use markup::{render_grid, render_page, render_row_fragment};
pub use routes::grid_endpoint;
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/app/{year}/bdgr/lista-ankiet/{farm}/{table}/{subtable}/",
            get(routes::grid_page).post(routes::save_grid),
        )
        .route(
            "/app/{year}/bdgr/lista-ankiet/{farm}/{table}/{subtable}/{code}/{index}",
            get(routes::row_fragment),
        )
        .route(
            "/api/{year}/{farm}/{subtable}/description",
            get(routes::description),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
