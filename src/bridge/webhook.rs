//! Webhook payloads and HMAC-SHA256 signature verification.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Issuance webhook body sent by Frappe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Invoice record id.
    pub name: String,
}

/// Status callback posted by NFe.io after asynchronous processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NfeIoCallback {
    pub id: String,
    pub status: String,
    pub flow_status: String,
    pub flow_message: Option<String>,
}

/// Base64 HMAC-SHA256 of `body` under `secret`.
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Check a base64 signature in constant time. An empty secret rejects
/// everything.
pub fn verify_signature(secret: &[u8], body: &[u8], signature: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"webhook-secret";
    const BODY: &[u8] = br#"{"name":"INV-0001"}"#;

    #[test]
    fn signature_round_trip() {
        let sig = sign(SECRET, BODY);
        assert!(verify_signature(SECRET, BODY, &sig));
    }

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2
        let sig = sign(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(sig, "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM=");
    }

    #[test]
    fn tampered_body_fails() {
        let sig = sign(SECRET, BODY);
        assert!(!verify_signature(SECRET, br#"{"name":"INV-0002"}"#, &sig));
    }

    #[test]
    fn empty_secret_rejects() {
        let sig = sign(b"", BODY);
        assert!(!verify_signature(b"", BODY, &sig));
    }

    #[test]
    fn garbage_signature_rejects() {
        assert!(!verify_signature(SECRET, BODY, "not base64!"));
        assert!(!verify_signature(SECRET, BODY, ""));
    }

    #[test]
    fn callback_deserialization() {
        let cb: NfeIoCallback =
            serde_json::from_str(r#"{"id":"x","status":"Issued","flowStatus":"Issued"}"#).unwrap();
        assert_eq!(cb.flow_status, "Issued");
        assert_eq!(cb.flow_message, None);
    }
}
