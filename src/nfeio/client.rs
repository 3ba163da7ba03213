use std::time::Duration;

use reqwest::Url;
use serde::Serialize;

use super::response::{IssuanceResponse, NfeIoError};
use crate::core::InvoiceRequest;

/// Default production endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.nfe.io/v2";

const TIMEOUT: Duration = Duration::from_secs(30);

/// Async NFe.io client. Every request carries the API key as the `apiKey`
/// query parameter.
#[derive(Clone)]
pub struct NfeIoClient {
    http: reqwest::Client,
    endpoint: Url,
    consult_endpoint: Url,
    api_key: String,
}

impl std::fmt::Debug for NfeIoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NfeIoClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("consult_endpoint", &self.consult_endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct CorrectionLetterRequest<'a> {
    reason: &'a str,
}

impl NfeIoClient {
    /// `consult_endpoint` serves access-key lookups; pass `endpoint` again
    /// when the account has no separate consultation host.
    pub fn new(
        endpoint: &str,
        consult_endpoint: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, NfeIoError> {
        let http = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| NfeIoError::Network(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: parse_base(endpoint)?,
            consult_endpoint: parse_base(consult_endpoint)?,
            api_key: api_key.into(),
        })
    }

    /// Submit a product invoice for issuance. The provider processes it
    /// asynchronously; the returned status is usually not final.
    pub async fn create_product_invoice(
        &self,
        company_id: &str,
        request: &InvoiceRequest,
    ) -> Result<IssuanceResponse, NfeIoError> {
        let url = endpoint_url(&self.endpoint, &[company_id, "productinvoices"])?;
        let resp = self.send(self.http.post(url).json(request)).await?;
        parse_json(resp).await
    }

    pub async fn get_invoice(
        &self,
        company_id: &str,
        invoice_id: &str,
    ) -> Result<IssuanceResponse, NfeIoError> {
        let url = endpoint_url(
            &self.endpoint,
            &[company_id, "productinvoices", invoice_id],
        )?;
        let resp = self.send(self.http.get(url)).await?;
        parse_json(resp).await
    }

    /// Look up an invoice by its 44-digit access key.
    pub async fn get_invoice_by_access_key(
        &self,
        access_key: &str,
    ) -> Result<IssuanceResponse, NfeIoError> {
        let url = endpoint_url(&self.consult_endpoint, &["productinvoices", access_key])?;
        let resp = self.send(self.http.get(url)).await?;
        parse_json(resp).await
    }

    /// Request cancellation of an issued invoice.
    pub async fn cancel_invoice(&self, company_id: &str, invoice_id: &str) -> Result<(), NfeIoError> {
        let url = endpoint_url(
            &self.endpoint,
            &[company_id, "productinvoices", invoice_id],
        )?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    /// DANFE PDF bytes.
    pub async fn invoice_pdf(&self, company_id: &str, invoice_id: &str) -> Result<Vec<u8>, NfeIoError> {
        let url = endpoint_url(
            &self.endpoint,
            &[company_id, "productinvoices", invoice_id, "pdf"],
        )?;
        let resp = self.send(self.http.get(url)).await?;
        read_bytes(resp).await
    }

    pub async fn invoice_xml(&self, company_id: &str, invoice_id: &str) -> Result<Vec<u8>, NfeIoError> {
        let url = endpoint_url(
            &self.endpoint,
            &[company_id, "productinvoices", invoice_id, "xml"],
        )?;
        let resp = self.send(self.http.get(url)).await?;
        read_bytes(resp).await
    }

    /// Issue a correction letter (CC-e) with the given reason.
    pub async fn create_correction_letter(
        &self,
        company_id: &str,
        invoice_id: &str,
        reason: &str,
    ) -> Result<IssuanceResponse, NfeIoError> {
        let url = endpoint_url(
            &self.endpoint,
            &[company_id, "productinvoices", invoice_id, "correctionletter"],
        )?;
        let body = CorrectionLetterRequest { reason };
        let resp = self.send(self.http.put(url).json(&body)).await?;
        parse_json(resp).await
    }

    pub async fn correction_letter_pdf(
        &self,
        company_id: &str,
        invoice_id: &str,
    ) -> Result<Vec<u8>, NfeIoError> {
        let url = endpoint_url(
            &self.endpoint,
            &[company_id, "productinvoices", invoice_id, "correctionletter", "pdf"],
        )?;
        let resp = self.send(self.http.get(url)).await?;
        read_bytes(resp).await
    }

    pub async fn correction_letter_xml(
        &self,
        company_id: &str,
        invoice_id: &str,
    ) -> Result<Vec<u8>, NfeIoError> {
        let url = endpoint_url(
            &self.endpoint,
            &[company_id, "productinvoices", invoice_id, "correctionletter", "xml"],
        )?;
        let resp = self.send(self.http.get(url)).await?;
        read_bytes(resp).await
    }

    /// Attach the key, send, and turn status >= 400 into [`NfeIoError::Api`].
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, NfeIoError> {
        let resp = builder
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| NfeIoError::Network(e.to_string()))?;

        let status = resp.status();
        if status.as_u16() >= 400 {
            let body = resp.text().await.unwrap_or_default();
            return Err(NfeIoError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

fn parse_base(raw: &str) -> Result<Url, NfeIoError> {
    let url = Url::parse(raw.trim()).map_err(|e| NfeIoError::Url(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(NfeIoError::Url(raw.to_string()));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`.
fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, NfeIoError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| NfeIoError::Url(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn parse_json(resp: reqwest::Response) -> Result<IssuanceResponse, NfeIoError> {
    let body = resp
        .text()
        .await
        .map_err(|e| NfeIoError::Network(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| NfeIoError::Parse(e.to_string()))
}

async fn read_bytes(resp: reqwest::Response) -> Result<Vec<u8>, NfeIoError> {
    resp.bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| NfeIoError::Network(e.to_string()))
}
