//! Bridge configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;

use crate::frappe::DEFAULT_INVOICE_DOCTYPE;
use crate::nfeio::DEFAULT_ENDPOINT;

/// Runtime configuration, built once at startup and passed to constructors.
#[derive(Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// HTTP listen port
    pub port: u16,

    /// Frappe site base URL
    pub frappe_url: String,
    pub frappe_api_key: String,
    pub frappe_api_secret: String,
    /// Doctype holding invoice records
    pub invoice_doctype: String,

    pub nfe_api_key: String,
    pub nfe_company_id: String,
    pub nfe_endpoint: String,
    /// Host for access-key lookups (defaults to `nfe_endpoint`)
    pub nfe_consult_endpoint: String,

    /// Shared secret for webhook HMAC signatures; empty rejects every request
    pub webhook_secret: String,
    /// Header carrying the base64 signature
    pub signature_header: String,

    /// UF of the issuing company
    pub issuer_state: String,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const REDACTED: &str = "<redacted>";
        f.debug_struct("BridgeConfig")
            .field("port", &self.port)
            .field("frappe_url", &self.frappe_url)
            .field("frappe_api_key", &REDACTED)
            .field("frappe_api_secret", &REDACTED)
            .field("invoice_doctype", &self.invoice_doctype)
            .field("nfe_api_key", &REDACTED)
            .field("nfe_company_id", &self.nfe_company_id)
            .field("nfe_endpoint", &self.nfe_endpoint)
            .field("nfe_consult_endpoint", &self.nfe_consult_endpoint)
            .field("webhook_secret", &REDACTED)
            .field("signature_header", &self.signature_header)
            .field("issuer_state", &self.issuer_state)
            .finish()
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let nfe_endpoint = get("NFE_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            port: get("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
            frappe_url: required("FRAPPE_URL")?,
            frappe_api_key: get("FRAPPE_API_KEY").unwrap_or_default(),
            frappe_api_secret: get("FRAPPE_API_SECRET").unwrap_or_default(),
            invoice_doctype: get("FRAPPE_INVOICE_DOCTYPE")
                .or_else(|| get("CUSTOM_DOCTYPE"))
                .unwrap_or_else(|| DEFAULT_INVOICE_DOCTYPE.to_string()),
            nfe_api_key: required("NFE_API_KEY")?,
            nfe_company_id: get("NFE_COMPANY_ID").unwrap_or_default(),
            nfe_consult_endpoint: get("NFE_ENDPOINT_CONSULT").unwrap_or_else(|| nfe_endpoint.clone()),
            nfe_endpoint,
            webhook_secret: get("WEBHOOK_SECRET").unwrap_or_default(),
            signature_header: get("WEBHOOK_SIGNATURE_HEADER")
                .unwrap_or_else(|| "X-Webhook-Signature".to_string()),
            issuer_state: get("ISSUER_STATE")
                .unwrap_or_else(|| "SP".to_string())
                .trim()
                .to_ascii_uppercase(),
        })
    }
}

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
