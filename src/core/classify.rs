//! Buyer classification from a CPF/CNPJ and an ICMS contributor-status label.

use super::digits::only_digits;
use super::error::NfeError;
use super::types::{ConsumerType, PersonType, StateTaxNumberIndicator, TaxRegime};

/// A cleaned, digits-only taxpayer id of a known kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartyIdentity {
    /// 11-digit CPF.
    Cpf(String),
    /// 14-digit CNPJ.
    Cnpj(String),
}

impl PartyIdentity {
    /// Strip punctuation from `raw` and classify it by length.
    pub fn parse(raw: &str) -> Result<Self, NfeError> {
        let digits = only_digits(raw);
        match digits.len() {
            11 => Ok(Self::Cpf(digits)),
            14 => Ok(Self::Cnpj(digits)),
            n => Err(NfeError::InvalidTaxNumberLength(n)),
        }
    }

    pub fn digits(&self) -> &str {
        match self {
            Self::Cpf(d) | Self::Cnpj(d) => d,
        }
    }

    pub fn person_type(&self) -> PersonType {
        match self {
            Self::Cpf(_) => PersonType::NaturalPerson,
            Self::Cnpj(_) => PersonType::LegalEntity,
        }
    }

    /// The id as the provider's numeric `federalTaxNumber` (leading zeros drop).
    pub fn as_number(&self) -> u64 {
        self.digits()
            .bytes()
            .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'))
    }
}

/// Fiscal profile of a buyer, before name and address are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerProfile {
    pub identity: PartyIdentity,
    pub person_type: PersonType,
    /// `Some(NoRegime)` for natural persons, unset for legal entities.
    pub tax_regime: Option<TaxRegime>,
    /// Only set for legal entities.
    pub state_tax_number_indicator: Option<StateTaxNumberIndicator>,
    pub consumer_type: ConsumerType,
}

/// Classify a buyer from its raw tax number and contributor-status label.
///
/// The status is ignored for CPFs. For CNPJs it must be one of the exact,
/// case-sensitive labels `"Contribuinte"`, `"Não Contribuinte"` or
/// `"Contribuinte Isento"`.
///
/// ```
/// use nfe_bridge::core::*;
///
/// let profile = classify_buyer("12.345.678/0001-90", "Contribuinte").unwrap();
/// assert_eq!(profile.person_type, PersonType::LegalEntity);
/// assert_eq!(profile.state_tax_number_indicator, Some(StateTaxNumberIndicator::TaxPayer));
/// ```
pub fn classify_buyer(raw_tax_number: &str, contributor_status: &str) -> Result<BuyerProfile, NfeError> {
    let identity = PartyIdentity::parse(raw_tax_number)?;
    let person_type = identity.person_type();

    let profile = match person_type {
        PersonType::NaturalPerson => BuyerProfile {
            identity,
            person_type,
            tax_regime: Some(TaxRegime::NoRegime),
            state_tax_number_indicator: None,
            consumer_type: ConsumerType::FinalConsumer,
        },
        PersonType::LegalEntity => {
            let indicator = StateTaxNumberIndicator::from_label(contributor_status)
                .ok_or_else(|| NfeError::InvalidContributorStatus(contributor_status.to_string()))?;
            BuyerProfile {
                identity,
                person_type,
                tax_regime: None,
                state_tax_number_indicator: Some(indicator),
                consumer_type: ConsumerType::Normal,
            }
        }
    };
    Ok(profile)
}
