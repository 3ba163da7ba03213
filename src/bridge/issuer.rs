use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use crate::core::{
    build_invoice, validate_request, Carrier, InvoiceRequest, NfeError, SourceRecord, TaxTemplate,
    ValidationError,
};
use crate::frappe::{FrappeClient, FrappeError, InvoiceWriteBack};
use crate::nfeio::{IssuanceResponse, NfeIoClient, NfeIoError};

use super::config::ConfigError;

/// Errors from one issuance attempt.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("source system: {0}")]
    Source(#[from] FrappeError),

    #[error("issuance provider: {0}")]
    Dispatch(#[from] NfeIoError),

    #[error("invoice assembly: {0}")]
    Assembly(#[from] NfeError),

    #[error("invoice request failed validation: {}", join_findings(.0))]
    Invalid(Vec<ValidationError>),

    #[error("invoice {0} is already being issued")]
    AlreadyInFlight(String),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
}

fn join_findings(findings: &[ValidationError]) -> String {
    findings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Where invoice records, tax templates and carriers come from, and where
/// issuance results are written back.
pub trait SourceRecords: Send + Sync {
    fn fetch_invoice(&self, id: &str) -> impl Future<Output = Result<SourceRecord, FrappeError>> + Send;

    fn fetch_tax_template(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<TaxTemplate, FrappeError>> + Send;

    fn fetch_carrier(&self, name: &str) -> impl Future<Output = Result<Carrier, FrappeError>> + Send;

    fn write_back(
        &self,
        id: &str,
        result: &InvoiceWriteBack,
    ) -> impl Future<Output = Result<(), FrappeError>> + Send;
}

/// Where assembled requests are sent for issuance.
pub trait FiscalDispatch: Send + Sync {
    fn dispatch(
        &self,
        request: &InvoiceRequest,
    ) -> impl Future<Output = Result<IssuanceResponse, NfeIoError>> + Send;
}

impl SourceRecords for FrappeClient {
    async fn fetch_invoice(&self, id: &str) -> Result<SourceRecord, FrappeError> {
        self.get_invoice(id).await
    }

    async fn fetch_tax_template(&self, name: &str) -> Result<TaxTemplate, FrappeError> {
        self.get_tax_template(name).await
    }

    async fn fetch_carrier(&self, name: &str) -> Result<Carrier, FrappeError> {
        self.get_carrier(name).await
    }

    async fn write_back(&self, id: &str, result: &InvoiceWriteBack) -> Result<(), FrappeError> {
        self.update_invoice(id, result).await
    }
}

/// [`FiscalDispatch`] through NFe.io for one company.
#[derive(Debug, Clone)]
pub struct NfeIoDispatch {
    pub client: NfeIoClient,
    pub company_id: String,
}

impl FiscalDispatch for NfeIoDispatch {
    async fn dispatch(&self, request: &InvoiceRequest) -> Result<IssuanceResponse, NfeIoError> {
        self.client.create_product_invoice(&self.company_id, request).await
    }
}

/// Outcome of a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuance {
    pub response: IssuanceResponse,
    pub serie: u32,
}

/// Runs issuances, allowing at most one in flight per invoice id.
pub struct Issuer<S, D> {
    source: S,
    dispatch: D,
    issuer_state: String,
    in_flight: Mutex<HashSet<String>>,
}

impl<S: SourceRecords, D: FiscalDispatch> Issuer<S, D> {
    pub fn new(source: S, dispatch: D, issuer_state: impl Into<String>) -> Self {
        Self {
            source,
            dispatch,
            issuer_state: issuer_state.into(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatch
    }

    /// Fetch, assemble, validate and dispatch the invoice `invoice_id`, then
    /// write the result back to the source. A failed write-back is logged and
    /// does not fail the issuance.
    pub async fn issue(&self, invoice_id: &str) -> Result<Issuance, BridgeError> {
        let _claim = InFlight::claim(&self.in_flight, invoice_id)?;
        tracing::info!(invoice_id, "issuing invoice");

        let record = self.source.fetch_invoice(invoice_id).await?;

        let template = match non_empty(&record.tax_template) {
            Some(name) => Some(self.source.fetch_tax_template(name).await?),
            None => None,
        };
        let carrier = match non_empty(&record.carrier) {
            Some(name) => Some(self.source.fetch_carrier(name).await?),
            None => None,
        };

        let request = build_invoice(
            &record,
            &self.issuer_state,
            template.as_ref(),
            carrier.as_ref(),
        )?;

        let findings = validate_request(&request);
        if !findings.is_empty() {
            return Err(BridgeError::Invalid(findings));
        }

        let response = self.dispatch.dispatch(&request).await?;
        tracing::info!(
            invoice_id,
            nfe_id = %response.id,
            serie = request.serie,
            status = %response.status,
            "invoice dispatched"
        );

        let write_back = InvoiceWriteBack {
            invoice_id: response.id.clone(),
            invoice_serie: request.serie,
            invoice_link: response.pdf.clone(),
        };
        if let Err(err) = self.source.write_back(invoice_id, &write_back).await {
            tracing::warn!(invoice_id, error = %err, "failed to write issuance result back");
        }

        Ok(Issuance {
            response,
            serie: request.serie,
        })
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Membership of one id in the in-flight set, released on drop.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl<'a> InFlight<'a> {
    fn claim(set: &'a Mutex<HashSet<String>>, id: &str) -> Result<Self, BridgeError> {
        let mut ids = set.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(id.to_string()) {
            return Err(BridgeError::AlreadyInFlight(id.to_string()));
        }
        Ok(Self {
            set,
            id: id.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
