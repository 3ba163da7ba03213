//! ERP source records as delivered by the Frappe REST API.
//!
//! Frappe stores most fields as free text, so every field is optional and
//! numeric fields accept numbers, numeric strings, `null`, or anything else
//! (which reads as absent).

use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Invoice record (custom doctype, `Invoices` by default).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceRecord {
    /// Record id; also used as the transport seal number.
    pub name: String,
    pub client_name: Option<String>,
    /// CPF or CNPJ, any punctuation.
    pub client_id_number: Option<String>,
    /// ICMS contributor-status label.
    pub contribuinte_icms: Option<String>,
    pub inscricao_estadual: Option<String>,
    pub client_email: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_number_address: Option<String>,
    pub delivery_neighborhood: Option<String>,
    pub city: Option<String>,
    /// IBGE municipality code.
    pub delivery_ibge: Option<String>,
    pub delivery_state: Option<String>,
    pub delivery_cep: Option<String>,
    pub delivery_complement: Option<String>,
    pub delivery_phone: Option<String>,
    pub operation_nature: Option<String>,
    /// `"incoming"` or `"outgoing"`; empty means outgoing.
    pub operation_type: Option<String>,
    /// Name of the `Tax` template record, if any.
    pub tax_template: Option<String>,
    /// Name of the `Carrier` record, if any.
    pub carrier: Option<String>,
    pub freight_modality: Option<String>,
    pub additional_information: Option<String>,
    pub product_brand: Option<String>,
    pub invoices_table: Vec<SourceItem>,
}

/// A child-table row of [`SourceRecord`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceItem {
    pub item_name: Option<String>,
    pub ncm: Option<String>,
    pub cest: Option<String>,
    /// Unit price.
    #[serde(deserialize_with = "lenient_decimal")]
    pub rate: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub quantity: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub icms_rate: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub pis_rate: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub cofins_rate: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub ipi_rate: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub gross_weight: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub net_weight: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub freight_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub insurance_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub other_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub discount_amount: Option<Decimal>,
}

/// Tax template record (doctype `Tax`). Rates are percentages.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TaxTemplate {
    #[serde(deserialize_with = "lenient_decimal")]
    pub aliq_icms: Option<Decimal>,
    pub cst_icms: Option<String>,
    pub origin_icms: Option<String>,
    pub mod_determ_bc: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub aliquota_pis: Option<Decimal>,
    pub cst_pis: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub aliquota_cofins: Option<Decimal>,
    pub cst_cofins: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub aliquota_ipi: Option<Decimal>,
    pub cst_ipi: Option<String>,
}

/// Carrier record (doctype `Carrier`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Carrier {
    pub carrier_name: Option<String>,
    pub cnpj: Option<String>,
    pub state_registration: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub address_number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub ibge: Option<String>,
    pub state: Option<String>,
    pub cep: Option<String>,
}

/// Borrow an optional text field, treating absent as empty.
pub(crate) fn text(field: &Option<String>) -> &str {
    field.as_deref().map(str::trim).unwrap_or("")
}

/// Optional text field, `None` when absent or blank.
pub(crate) fn non_blank(field: &Option<String>) -> Option<String> {
    let value = text(field);
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(Decimal),
    Text(String),
    #[allow(dead_code)]
    Other(IgnoredAny),
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(match value {
        Some(LenientNumber::Number(n)) => Some(n),
        Some(LenientNumber::Text(s)) => parse_decimal_text(&s),
        Some(LenientNumber::Other(_)) | None => None,
    })
}

/// Accepts `"12.5"` and the Brazilian `"12,5"`; thousands separators are not
/// supported.
fn parse_decimal_text(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<Decimal>()
        .or_else(|_| trimmed.replace(',', ".").parse::<Decimal>())
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}
