use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use super::errors::json_error;
use crate::bridge::{verify_signature, BridgeConfig};

/// Upper bound on buffered webhook bodies.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Webhook signing secret and the header that carries the signature.
#[derive(Clone)]
pub struct WebhookAuth {
    secret: Vec<u8>,
    header: String,
}

impl WebhookAuth {
    pub fn new(secret: impl Into<Vec<u8>>, header: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            header: header.into(),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.webhook_secret.as_bytes(), config.signature_header.as_str())
    }
}

/// Reject requests whose body does not match the HMAC signature header.
pub async fn webhook_auth(
    State(auth): State<Arc<WebhookAuth>>,
    req: Request,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();

    let signature = parts
        .headers
        .get(auth.header.as_str())
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return json_error(StatusCode::PAYLOAD_TOO_LARGE, "body_too_large", "request body too large");
        }
    };

    if !verify_signature(&auth.secret, &bytes, &signature) {
        tracing::warn!(path = %parts.uri.path(), "rejected webhook with invalid signature");
        return json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid webhook signature");
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
