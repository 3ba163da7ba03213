use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::bridge::BridgeError;

pub fn bridge_error_to_response(err: &BridgeError) -> axum::response::Response {
    match err {
        BridgeError::AlreadyInFlight(_) => json_error(StatusCode::CONFLICT, "in_flight", err.to_string()),
        BridgeError::Assembly(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "assembly_error", err.to_string())
        }
        BridgeError::Invalid(findings) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "validation_error",
                "message": err.to_string(),
                "findings": findings
                    .iter()
                    .map(|f| json!({"field": f.field, "message": f.message}))
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        BridgeError::Source(_) => json_error(StatusCode::BAD_GATEWAY, "source_error", err.to_string()),
        BridgeError::Dispatch(_) => json_error(StatusCode::BAD_GATEWAY, "dispatch_error", err.to_string()),
        _ => json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", err.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
