use serde::{Deserialize, Serialize};

/// Provider answer to an issuance, status query or correction letter.
///
/// Every field is optional on the wire: a freshly queued invoice has no
/// `pdf` or `xml` yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssuanceResponse {
    pub id: String,
    pub status: String,
    pub environment: String,
    pub flow_status: String,
    /// Link to the DANFE PDF.
    pub pdf: String,
    /// Link to the authorized XML.
    pub xml: String,
}

/// Error from the NFe.io API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum NfeIoError {
    /// Network or HTTP transport error.
    #[error("NFe.io network error: {0}")]
    Network(String),
    /// The API answered with status >= 400.
    #[error("NFe.io API error: status {status}, body: {body}")]
    Api { status: u16, body: String },
    /// Failed to parse the response.
    #[error("NFe.io parse error: {0}")]
    Parse(String),
    /// The configured endpoint is not a usable base URL.
    #[error("invalid NFe.io endpoint: {0}")]
    Url(String),
}
