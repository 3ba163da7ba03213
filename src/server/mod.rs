//! HTTP surface (axum router + state wiring).
//!
//! - `middleware.rs`: webhook signature check
//! - `routes.rs`: handlers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::bridge::{FiscalDispatch, Issuer, SourceRecords};

mod errors;
mod middleware;
mod routes;

pub use errors::{bridge_error_to_response, json_error};
pub use middleware::{webhook_auth, WebhookAuth, MAX_BODY_BYTES};

pub const ISSUE_ROUTE: &str = "/api/v1/webhook/invoices/issue";
pub const NFEIO_CALLBACK_ROUTE: &str = "/api/v1/webhook/nfeio/response";
pub const HEALTH_ROUTE: &str = "/health";

/// Shared handler state.
pub struct AppState<S, D> {
    pub issuer: Arc<Issuer<S, D>>,
}

impl<S, D> Clone for AppState<S, D> {
    fn clone(&self) -> Self {
        Self {
            issuer: Arc::clone(&self.issuer),
        }
    }
}

/// Build the full HTTP router.
pub fn router<S, D>(issuer: Arc<Issuer<S, D>>, auth: WebhookAuth) -> Router
where
    S: SourceRecords + 'static,
    D: FiscalDispatch + 'static,
{
    let state = AppState { issuer };

    // Only the ERP-facing route is signed.
    let protected = Router::new()
        .route(ISSUE_ROUTE, post(routes::issue_invoice::<S, D>))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::new(auth),
            webhook_auth,
        ));

    Router::new()
        .route(NFEIO_CALLBACK_ROUTE, post(routes::nfeio_callback))
        .route(HEALTH_ROUTE, get(routes::health))
        .merge(protected)
        .with_state(state)
}
