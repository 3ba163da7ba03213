use thiserror::Error;

/// Errors that can occur while classifying, resolving or assembling an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum NfeError {
    /// Tax id is not 11 (CPF) or 14 (CNPJ) digits after cleaning.
    #[error("invalid tax number length: {0} digits (expected 11 for CPF or 14 for CNPJ)")]
    InvalidTaxNumberLength(usize),

    /// Legal-entity contributor label is not one of the recognized ICMS statuses.
    #[error("invalid contributor status {0:?}: expected \"Contribuinte\", \"Não Contribuinte\" or \"Contribuinte Isento\"")]
    InvalidContributorStatus(String),

    /// A mandatory address field (city name or IBGE city code) is absent.
    #[error("missing address field: {0}")]
    MissingAddressField(&'static str),

    /// Incoming operation nature has no CFOP table entry.
    #[error("CFOP not found for operation nature {0:?}")]
    CfopNotFound(String),

    /// Transport block requested without a carrier tax number.
    #[error("carrier tax number (CNPJ) is required for transport")]
    MissingCarrierIdentifier,

    /// Direction is neither incoming nor outgoing.
    #[error("invalid operation direction {0:?}: expected \"incoming\" or \"outgoing\"")]
    InvalidOperationDirection(String),

    /// Source record is structurally unusable (e.g. no line items).
    #[error("builder error: {0}")]
    Builder(String),
}

/// A single consistency finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the offending field (e.g. "items[0].tax.icms.amount").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
