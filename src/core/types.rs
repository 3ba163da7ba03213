use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::NfeError;

/// Product invoice request: the top-level document sent to the issuance provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    /// Document series: 11 for outgoing, 10 for incoming operations.
    pub serie: u32,
    /// Operation nature text as entered in the source system (natOp).
    pub operation_nature: String,
    /// Direction of goods movement (tpNF).
    pub operation_type: Direction,
    /// Final consumer indicator (indFinal).
    pub consumer_type: ConsumerType,
    /// Issuance purpose (finNFe).
    pub purpose_type: PurposeType,
    /// Intrastate or interstate operation (idDest).
    pub destination: Destination,
    pub buyer: Buyer,
    pub items: Vec<Item>,
    pub payment: Vec<Payment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_information: Option<AdditionalInformation>,
}

/// Buyer (destinatário).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub name: String,
    /// CPF or CNPJ as a number; the provider drops leading zeros.
    pub federal_tax_number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: Address,
    #[serde(rename = "type")]
    pub person_type: PersonType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_regime: Option<TaxRegime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_tax_number_indicator: Option<StateTaxNumberIndicator>,
    /// Inscrição estadual, digits only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_tax_number: Option<String>,
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// UF code (e.g. "SP").
    pub state: String,
    pub city: City,
    /// Neighborhood (bairro).
    pub district: String,
    /// Complement (complemento).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_information: Option<String>,
    pub street: String,
    pub number: String,
    /// CEP, digits only.
    pub postal_code: String,
    /// ISO 3166-1 alpha-3, always "BRA" for domestic documents.
    pub country: String,
}

/// Municipality, identified by its IBGE code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub code: String,
    pub name: String,
}

/// Invoice line item (det/prod).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// 1-based sequential product code within the document.
    pub code: String,
    #[serde(rename = "codeGTIN")]
    pub code_gtin: String,
    #[serde(rename = "codeTaxGTIN")]
    pub code_tax_gtin: String,
    pub description: String,
    pub ncm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cest: Option<String>,
    pub cfop: Cfop,
    pub unit: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub tax: TaxResult,
}

/// Per-item tax block: the result of the tax rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    /// Sum of the ICMS, PIS, COFINS and IPI amounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_tax: Decimal,
    pub icms: Icms,
    pub pis: Pis,
    pub cofins: Cofins,
    pub ipi: Ipi,
}

impl TaxResult {
    /// The taxable base shared by all four taxes.
    pub fn base_tax(&self) -> Decimal {
        self.icms.base_tax
    }
}

/// ICMS: state value-added tax on goods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icms {
    /// Goods origin (orig), one character.
    pub origin: String,
    /// CST, two characters.
    pub cst: String,
    /// Base determination modality (modBC), one character.
    pub base_tax_modality: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_tax: Decimal,
    #[serde(rename = "baseTaxSTReduction")]
    pub base_tax_st_reduction: String,
    /// Percentage rate (pICMS).
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// PIS: social integration contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pis {
    pub cst: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// COFINS: social security financing contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cofins {
    pub cst: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// IPI: federal excise tax on industrialized products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ipi {
    pub cst: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Payment group (pag).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_detail: Vec<PaymentDetail>,
}

/// Payment detail (detPag).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetail {
    pub method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Transport group (transp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    pub freight_modality: FreightModality,
    pub transport_group: TransportGroup,
    pub volume: Volume,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seal_number: Option<String>,
}

/// Carrier (transporta).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportGroup {
    pub name: String,
    pub federal_tax_number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_tax_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub person_type: PersonType,
    pub address: Address,
}

/// Transported volumes (vol).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub volume_quantity: u32,
    pub species: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_numeration: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_weight: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_weight: Decimal,
}

/// Free-text complementary information (infCpl).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalInformation {
    pub taxpayer: String,
}

/// Fiscal operation code: four digits, first digit encodes direction and locality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cfop(u16);

impl Cfop {
    /// Wrap a numeric code; `None` unless it has exactly four digits.
    pub fn new(code: u16) -> Option<Self> {
        (1000..=9999).contains(&code).then_some(Self(code))
    }

    pub fn code(&self) -> u16 {
        self.0
    }

    /// Leading digit: 1/2 incoming, 5/6 outgoing; odd-one-out 3/7 are foreign trade.
    pub fn leading_digit(&self) -> u16 {
        self.0 / 1000
    }
}

impl std::fmt::Display for Cfop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Buyer/carrier person type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonType {
    /// Pessoa física, identified by an 11-digit CPF.
    NaturalPerson,
    /// Pessoa jurídica, identified by a 14-digit CNPJ.
    LegalEntity,
}

/// Buyer tax regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaxRegime {
    /// No business tax regime (natural persons).
    #[serde(rename = "none")]
    NoRegime,
    NationalSimple,
    PresumedProfit,
    RealProfit,
}

/// State tax number indicator (indIEDest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateTaxNumberIndicator {
    /// 1: ICMS contributor.
    TaxPayer,
    /// 2: Contributor exempt from state registration.
    Exempt,
    /// 9: Not an ICMS contributor.
    NonTaxPayer,
}

impl StateTaxNumberIndicator {
    /// Contributor-status label as stored in the ERP ("Contribuinte", …).
    pub fn label(&self) -> &'static str {
        match self {
            Self::TaxPayer => "Contribuinte",
            Self::Exempt => "Contribuinte Isento",
            Self::NonTaxPayer => "Não Contribuinte",
        }
    }

    /// Parse from the case-sensitive ERP contributor-status label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Contribuinte" => Some(Self::TaxPayer),
            "Contribuinte Isento" => Some(Self::Exempt),
            "Não Contribuinte" => Some(Self::NonTaxPayer),
            _ => None,
        }
    }
}

/// Final consumer indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsumerType {
    FinalConsumer,
    Normal,
}

/// Direction of the goods movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Entrada: goods coming into the issuer.
    Incoming,
    /// Saída: goods leaving the issuer.
    Outgoing,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }

    /// Document series used for this direction.
    pub fn series(&self) -> u32 {
        match self {
            Self::Incoming => 10,
            Self::Outgoing => 11,
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = NfeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "incoming" => Ok(Self::Incoming),
            "outgoing" => Ok(Self::Outgoing),
            _ => Err(NfeError::InvalidOperationDirection(s.to_string())),
        }
    }
}

/// Operation locality (idDest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    #[serde(rename = "internal_Operation")]
    Internal,
    #[serde(rename = "interstate_Operation")]
    Interstate,
}

/// Issuance purpose (finNFe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PurposeType {
    Normal,
    Complement,
    Adjustment,
    Devolution,
}

/// Freight responsibility (modFrete).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FreightModality {
    /// 0: Contracted by the issuer (CIF).
    #[default]
    ByIssuer,
    /// 1: Contracted by the buyer (FOB).
    ByBuyer,
    /// 2: Contracted by a third party.
    ThirdParty,
    /// 3/4: Own transport of the issuer or buyer.
    OwnAccount,
    /// 9: No freight.
    NoFreight,
}

impl FreightModality {
    /// Parse an ERP freight label: the modFrete digit, the Portuguese label,
    /// or the provider literal. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "0" | "Por conta do emitente" | "ByIssuer" => Some(Self::ByIssuer),
            "1" | "Por conta do destinatário" | "ByBuyer" => Some(Self::ByBuyer),
            "2" | "Por conta de terceiros" | "ThirdParty" => Some(Self::ThirdParty),
            "3" | "4" | "Transporte próprio" | "OwnAccount" => Some(Self::OwnAccount),
            "9" | "Sem frete" | "NoFreight" => Some(Self::NoFreight),
            _ => None,
        }
    }
}

/// Payment method (tPag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    /// 90: No payment captured with the document.
    WithoutPayment,
    Cash,
    CreditCard,
    DebitCard,
    BankSlip,
    InstantPayment,
    Others,
}
