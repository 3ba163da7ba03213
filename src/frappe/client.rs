use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::{Carrier, SourceRecord, TaxTemplate};

/// Default doctype holding invoice records.
pub const DEFAULT_INVOICE_DOCTYPE: &str = "Invoices";
/// Doctype of tax templates.
pub const TAX_DOCTYPE: &str = "Tax";
/// Doctype of carrier records.
pub const CARRIER_DOCTYPE: &str = "Carrier";

const TIMEOUT: Duration = Duration::from_secs(30);

/// Error from the Frappe API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FrappeError {
    /// Network or HTTP transport error.
    #[error("Frappe network error: {0}")]
    Network(String),
    /// The API answered with status >= 400.
    #[error("Frappe API error: status {status}, body: {body}")]
    Api { status: u16, body: String },
    /// Failed to parse the response.
    #[error("Frappe parse error: {0}")]
    Parse(String),
    /// The base URL cannot carry a resource path.
    #[error("invalid Frappe URL: {0}")]
    Url(String),
}

/// Issuance result written back to the invoice record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceWriteBack {
    /// Provider invoice id.
    pub invoice_id: String,
    pub invoice_serie: u32,
    /// DANFE PDF link.
    pub invoice_link: String,
}

/// Frappe responses wrap the document in `{"data": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Async Frappe REST client using token authentication.
#[derive(Clone)]
pub struct FrappeClient {
    http: reqwest::Client,
    base_url: Url,
    authorization: String,
    invoice_doctype: String,
}

impl std::fmt::Debug for FrappeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrappeClient")
            .field("base_url", &self.base_url.as_str())
            .field("invoice_doctype", &self.invoice_doctype)
            .finish_non_exhaustive()
    }
}

impl FrappeClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        api_secret: &str,
        invoice_doctype: impl Into<String>,
    ) -> Result<Self, FrappeError> {
        let base_url = Url::parse(base_url).map_err(|e| FrappeError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FrappeError::Url(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| FrappeError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            authorization: format!("token {api_key}:{api_secret}"),
            invoice_doctype: invoice_doctype.into(),
        })
    }

    pub async fn get_invoice(&self, name: &str) -> Result<SourceRecord, FrappeError> {
        self.get_resource(&self.invoice_doctype, name).await
    }

    pub async fn get_tax_template(&self, name: &str) -> Result<TaxTemplate, FrappeError> {
        self.get_resource(TAX_DOCTYPE, name).await
    }

    pub async fn get_carrier(&self, name: &str) -> Result<Carrier, FrappeError> {
        self.get_resource(CARRIER_DOCTYPE, name).await
    }

    /// `PUT` the issuance result onto the invoice record.
    pub async fn update_invoice(
        &self,
        name: &str,
        write_back: &InvoiceWriteBack,
    ) -> Result<(), FrappeError> {
        let url = resource_url(&self.base_url, &self.invoice_doctype, name)?;
        let req = self
            .http
            .put(url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .json(write_back);
        send(req).await?;
        Ok(())
    }

    async fn get_resource<T: DeserializeOwned>(
        &self,
        doctype: &str,
        name: &str,
    ) -> Result<T, FrappeError> {
        let url = resource_url(&self.base_url, doctype, name)?;
        let req = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization);
        let body = send(req)
            .await?
            .text()
            .await
            .map_err(|e| FrappeError::Network(e.to_string()))?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| FrappeError::Parse(e.to_string()))?;
        Ok(envelope.data)
    }
}

/// `{base}/api/resource/{doctype}/{name}` with each segment percent-encoded.
fn resource_url(base: &Url, doctype: &str, name: &str) -> Result<Url, FrappeError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FrappeError::Url(base.to_string()))?
        .pop_if_empty()
        .extend(["api", "resource", doctype, name]);
    Ok(url)
}

async fn send(req: reqwest::RequestBuilder) -> Result<reqwest::Response, FrappeError> {
    let resp = req
        .send()
        .await
        .map_err(|e| FrappeError::Network(e.to_string()))?;
    let status = resp.status();
    if status.as_u16() >= 400 {
        let body = resp.text().await.unwrap_or_default();
        return Err(FrappeError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}
