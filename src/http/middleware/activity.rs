//! Activity tracking middleware.
//! Counts every request as traffic for the scale-to-zero watchdog.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    Router,
};

use crate::watchdog::ScaleToZero;

/// Record the request, then hand it on unchanged.
pub async fn track_activity(
    State(watchdog): State<ScaleToZero>,
    req: Request<Body>,
    next: Next,
) -> Response {
    watchdog.record_request();
    next.run(req).await
}

impl ScaleToZero {
    /// Wrap `router` so every request feeds the watchdog.
    ///
    /// Returns the router untouched when no threshold is configured.
    pub fn wrap<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        if self.is_inert() {
            return router;
        }
        router.layer(middleware::from_fn_with_state(self.clone(), track_activity))
    }
}
