//! Demo host server.
//!
//! # Responsibilities
//! - Create the Axum Router for the host application
//! - Wrap it with the scale-to-zero middleware
//! - Serve until Ctrl+C or until the watchdog ends the process

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::time::Instant;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::watchdog::ScaleToZero;

/// Path of the watchdog status endpoint.
pub const STATUS_PATH: &str = "/-/scale-to-zero";

/// HTTP server standing in for the host application.
pub struct HttpServer {
    router: Router,
    watchdog: ScaleToZero,
}

impl HttpServer {
    pub fn new(watchdog: ScaleToZero) -> Self {
        let router = Self::build_router(&watchdog);
        Self { router, watchdog }
    }

    fn build_router(watchdog: &ScaleToZero) -> Router {
        let app = Router::new()
            .route("/", get(index_handler))
            .route(STATUS_PATH, get(status_handler))
            .with_state(watchdog.clone());

        watchdog
            .wrap(app)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }

    /// The fully layered router, for driving without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            inert = self.watchdog.is_inert(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn index_handler() -> &'static str {
    "ok"
}

async fn status_handler(State(watchdog): State<ScaleToZero>) -> impl IntoResponse {
    Json(watchdog.status(Instant::now()))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
