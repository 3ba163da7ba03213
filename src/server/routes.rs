use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::errors::{bridge_error_to_response, json_error};
use super::AppState;
use crate::bridge::{FiscalDispatch, NfeIoCallback, SourceRecords, WebhookPayload};

pub(super) async fn issue_invoice<S, D>(State(state): State<AppState<S, D>>, body: Bytes) -> Response
where
    S: SourceRecords + 'static,
    D: FiscalDispatch + 'static,
{
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, "invalid_json", e.to_string()),
    };
    if payload.name.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "invalid_payload", "name is required");
    }

    match state.issuer.issue(payload.name.trim()).await {
        Ok(issuance) => Json(json!({
            "message": "Invoice Issued",
            "nfe_id": issuance.response.id,
            "status": issuance.response.status,
        }))
        .into_response(),
        Err(err) => {
            tracing::error!(invoice_id = %payload.name, error = %err, "invoice issuance failed");
            bridge_error_to_response(&err)
        }
    }
}

pub(super) async fn nfeio_callback(body: Bytes) -> Response {
    match serde_json::from_slice::<NfeIoCallback>(&body) {
        Ok(callback) => {
            tracing::info!(
                nfe_id = %callback.id,
                status = %callback.status,
                flow_status = %callback.flow_status,
                flow_message = callback.flow_message.as_deref().unwrap_or(""),
                "received issuance status callback"
            );
            StatusCode::OK.into_response()
        }
        Err(e) => json_error(StatusCode::BAD_REQUEST, "invalid_json", e.to_string()),
    }
}

pub(super) async fn health() -> &'static str {
    "OK"
}
