use rust_decimal::Decimal;

use super::error::ValidationError;
use super::operation::locality_digit;
use super::tax::tax_amount;
use super::types::*;

/// Check an assembled request for internal consistency before dispatch.
/// Returns all validation errors found (not just the first).
pub fn validate_request(request: &InvoiceRequest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if request.items.is_empty() {
        errors.push(ValidationError::new("items", "at least one item is required"));
    }

    if request.serie != request.operation_type.series() {
        errors.push(ValidationError::new(
            "serie",
            format!(
                "series {} does not match {} operation (expected {})",
                request.serie,
                request.operation_type.as_str(),
                request.operation_type.series()
            ),
        ));
    }

    validate_buyer(request, &mut errors);

    for (i, item) in request.items.iter().enumerate() {
        validate_item(request, item, i, &mut errors);
    }

    if let Some(transport) = &request.transport {
        if transport.transport_group.federal_tax_number == 0 {
            errors.push(ValidationError::new(
                "transport.transportGroup.federalTaxNumber",
                "carrier tax number is required",
            ));
        }
    }

    errors
}

fn validate_buyer(request: &InvoiceRequest, errors: &mut Vec<ValidationError>) {
    let buyer = &request.buyer;

    let expected_consumer = match buyer.person_type {
        PersonType::NaturalPerson => ConsumerType::FinalConsumer,
        PersonType::LegalEntity => ConsumerType::Normal,
    };
    if request.consumer_type != expected_consumer {
        errors.push(ValidationError::new(
            "consumerType",
            "consumer type does not match buyer type",
        ));
    }

    let is_legal_entity = buyer.person_type == PersonType::LegalEntity;
    if is_legal_entity != buyer.state_tax_number_indicator.is_some() {
        errors.push(ValidationError::new(
            "buyer.stateTaxNumberIndicator",
            "state tax number indicator must be set for legal entities only",
        ));
    }

    if buyer.federal_tax_number == 0 {
        errors.push(ValidationError::new(
            "buyer.federalTaxNumber",
            "buyer tax number is required",
        ));
    }
}

fn validate_item(
    request: &InvoiceRequest,
    item: &Item,
    index: usize,
    errors: &mut Vec<ValidationError>,
) {
    let prefix = format!("items[{index}]");
    let tax = &item.tax;

    let lines = [
        ("icms", tax.icms.rate, tax.icms.base_tax, tax.icms.amount),
        ("pis", tax.pis.rate, tax.pis.base_tax, tax.pis.amount),
        ("cofins", tax.cofins.rate, tax.cofins.base_tax, tax.cofins.amount),
        ("ipi", tax.ipi.rate, tax.ipi.base_tax, tax.ipi.amount),
    ];
    for (name, rate, base, amount) in lines {
        match tax_amount(rate, base) {
            Some(expected) if expected == amount => {}
            Some(expected) => errors.push(ValidationError::new(
                format!("{prefix}.tax.{name}.amount"),
                format!("expected {expected}, got {amount}"),
            )),
            None => errors.push(ValidationError::new(
                format!("{prefix}.tax.{name}.amount"),
                format!("rate {rate} applied to base {base} overflows"),
            )),
        }
    }

    let sum = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, (_, _, _, amount)| acc.checked_add(*amount));
    match sum {
        Some(sum) if sum == tax.total_tax => {}
        Some(sum) => errors.push(ValidationError::new(
            format!("{prefix}.tax.totalTax"),
            format!("expected {sum}, got {}", tax.total_tax),
        )),
        None => errors.push(ValidationError::new(
            format!("{prefix}.tax.totalTax"),
            "sum of tax amounts overflows",
        )),
    }

    // Overflowing line totals are assembled as zero.
    let expected_total = item
        .unit_amount
        .checked_mul(item.quantity)
        .unwrap_or(Decimal::ZERO);
    if item.total_amount != expected_total {
        errors.push(ValidationError::new(
            format!("{prefix}.totalAmount"),
            format!("expected {expected_total}, got {}", item.total_amount),
        ));
    }

    let expected_digit = locality_digit(request.operation_type, request.destination);
    let actual_digit = item.cfop.to_string().chars().next();
    if actual_digit != Some(expected_digit) {
        errors.push(ValidationError::new(
            format!("{prefix}.cfop"),
            format!(
                "CFOP {} does not start with {expected_digit} for this direction and destination",
                item.cfop
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{build_payment, calculate_tax, AddressBuilder, TaxInput};
    use rust_decimal_macros::dec;

    fn item(cfop: u16) -> Item {
        let input = TaxInput::new(dec!(100), dec!(2)).icms(dec!(18), "0", "00", "3");
        Item {
            code: "1".into(),
            code_gtin: "SEM GTIN".into(),
            code_tax_gtin: "SEM GTIN".into(),
            description: "Cadeira".into(),
            ncm: "94013000".into(),
            cest: None,
            cfop: Cfop::new(cfop).unwrap(),
            unit: "UN".into(),
            quantity: dec!(2),
            unit_amount: dec!(100),
            total_amount: dec!(200),
            tax: calculate_tax(&input),
        }
    }

    fn request() -> InvoiceRequest {
        InvoiceRequest {
            serie: 11,
            operation_nature: "Venda".into(),
            operation_type: Direction::Outgoing,
            consumer_type: ConsumerType::FinalConsumer,
            purpose_type: PurposeType::Normal,
            destination: Destination::Interstate,
            buyer: Buyer {
                name: "Maria".into(),
                federal_tax_number: 12345678900,
                email: None,
                address: AddressBuilder::new("Rio de Janeiro", "3304557", "RJ").build_unchecked(),
                person_type: PersonType::NaturalPerson,
                tax_regime: Some(TaxRegime::NoRegime),
                state_tax_number_indicator: None,
                state_tax_number: None,
            },
            items: vec![item(6102)],
            payment: build_payment(),
            transport: None,
            additional_information: None,
        }
    }

    #[test]
    fn consistent_request_passes() {
        assert!(validate_request(&request()).is_empty());
    }

    #[test]
    fn empty_items() {
        let mut req = request();
        req.items.clear();
        let errors = validate_request(&req);
        assert!(errors.iter().any(|e| e.field == "items"));
    }

    #[test]
    fn wrong_series() {
        let mut req = request();
        req.serie = 10;
        let errors = validate_request(&req);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "serie");
    }

    #[test]
    fn cfop_digit_mismatch() {
        let mut req = request();
        req.items = vec![item(5102)];
        let errors = validate_request(&req);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "items[0].cfop");
    }

    #[test]
    fn tampered_amount_and_total() {
        let mut req = request();
        req.items[0].tax.icms.amount = dec!(1);
        req.items[0].total_amount = dec!(199);
        let fields: Vec<_> = validate_request(&req).into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"items[0].tax.icms.amount".to_string()));
        assert!(fields.contains(&"items[0].tax.totalTax".to_string()));
        assert!(fields.contains(&"items[0].totalAmount".to_string()));
    }

    #[test]
    fn legal_entity_needs_indicator() {
        let mut req = request();
        req.buyer.person_type = PersonType::LegalEntity;
        req.consumer_type = ConsumerType::Normal;
        let errors = validate_request(&req);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "buyer.stateTaxNumberIndicator");
    }

    #[test]
    fn overflowing_amounts_are_reported() {
        let mut req = request();
        req.items[0].tax.icms.rate = dec!(200);
        req.items[0].tax.icms.base_tax = Decimal::MAX;
        req.items[0].unit_amount = Decimal::MAX;
        req.items[0].quantity = dec!(2);
        req.items[0].total_amount = Decimal::ZERO;
        let fields: Vec<_> = validate_request(&req).into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"items[0].tax.icms.amount".to_string()));
        assert!(!fields.contains(&"items[0].totalAmount".to_string()));
    }

    #[test]
    fn consumer_type_mismatch() {
        let mut req = request();
        req.consumer_type = ConsumerType::Normal;
        let errors = validate_request(&req);
        assert_eq!(errors[0].field, "consumerType");
    }
}
