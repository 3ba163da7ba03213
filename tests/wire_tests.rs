//! JSON shape of the product-invoice request as sent to NFe.io.

use nfe_bridge::core::*;
use rust_decimal_macros::dec;
use serde_json::json;

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

fn consumer_record() -> SourceRecord {
    SourceRecord {
        name: "INV-2024-0043".into(),
        client_name: some("Maria Silva"),
        client_id_number: some("123.456.789-00"),
        city: some("São Paulo"),
        delivery_ibge: some("3550308"),
        delivery_state: some("SP"),
        operation_nature: some("Venda"),
        invoices_table: vec![SourceItem {
            item_name: some("Cadeira"),
            ncm: some("9401.30.00"),
            rate: Some(dec!(100)),
            quantity: Some(dec!(1)),
            icms_rate: Some(dec!(18)),
            pis_rate: Some(dec!(1.65)),
            cofins_rate: Some(dec!(7.6)),
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[test]
fn consumer_request_json() {
    let request = build_invoice(&consumer_record(), "SP", None, None).unwrap();
    let value = serde_json::to_value(&request).unwrap();

    let expected = json!({
        "serie": 11,
        "operationNature": "Venda",
        "operationType": "outgoing",
        "consumerType": "finalConsumer",
        "purposeType": "normal",
        "destination": "internal_Operation",
        "buyer": {
            "name": "Maria Silva",
            "federalTaxNumber": 12345678900u64,
            "address": {
                "state": "SP",
                "city": { "code": "3550308", "name": "São Paulo" },
                "district": "",
                "street": "",
                "number": "",
                "postalCode": "",
                "country": "BRA"
            },
            "type": "naturalPerson",
            "taxRegime": "none"
        },
        "items": [{
            "code": "1",
            "codeGTIN": "SEM GTIN",
            "codeTaxGTIN": "SEM GTIN",
            "description": "Cadeira",
            "ncm": "94013000",
            "cfop": 5102,
            "unit": "UN",
            "quantity": 1.0,
            "unitAmount": 100.0,
            "totalAmount": 100.0,
            "tax": {
                "totalTax": 27.25,
                "icms": {
                    "origin": "0",
                    "cst": "00",
                    "baseTaxModality": "3",
                    "baseTax": 100.0,
                    "baseTaxSTReduction": "0",
                    "rate": 18.0,
                    "amount": 18.0
                },
                "pis": { "cst": "01", "baseTax": 100.0, "rate": 1.65, "amount": 1.65 },
                "cofins": { "cst": "01", "baseTax": 100.0, "rate": 7.6, "amount": 7.6 },
                "ipi": { "cst": "50", "baseTax": 100.0, "rate": 0.0, "amount": 0.0 }
            }
        }],
        "payment": [{ "paymentDetail": [{ "method": "withoutPayment", "amount": 0.0 }] }]
    });

    assert_eq!(value, expected);
}

#[test]
fn company_buyer_fields() {
    let mut record = consumer_record();
    record.client_id_number = some("12.345.678/0001-90");
    record.contribuinte_icms = some("Contribuinte");
    record.inscricao_estadual = some("110.042.490.114");
    record.client_email = some("nf@acme.com.br");
    record.additional_information = some("Pedido 7");

    let value = serde_json::to_value(build_invoice(&record, "SP", None, None).unwrap()).unwrap();

    assert_eq!(value["consumerType"], "normal");
    assert_eq!(value["buyer"]["type"], "legalEntity");
    assert_eq!(value["buyer"]["stateTaxNumberIndicator"], "taxPayer");
    assert_eq!(value["buyer"]["stateTaxNumber"], "110042490114");
    assert_eq!(value["buyer"]["email"], "nf@acme.com.br");
    assert_eq!(value["buyer"]["federalTaxNumber"], 12345678000190u64);
    assert!(value["buyer"].get("taxRegime").is_none());
    assert_eq!(value["additionalInformation"], json!({ "taxpayer": "Pedido 7" }));
}

#[test]
fn transport_json() {
    let carrier = Carrier {
        carrier_name: some("Transportes Rápidos SA"),
        cnpj: some("98.765.432/0001-10"),
        city: some("Campinas"),
        ibge: some("3509502"),
        state: some("SP"),
        ..Default::default()
    };
    let mut record = consumer_record();
    record.freight_modality = some("9");

    let value =
        serde_json::to_value(build_invoice(&record, "SP", None, Some(&carrier)).unwrap()).unwrap();
    let transport = &value["transport"];

    assert_eq!(transport["freightModality"], "NoFreight");
    assert_eq!(transport["transportGroup"]["type"], "legalEntity");
    assert_eq!(transport["transportGroup"]["federalTaxNumber"], 98765432000110u64);
    assert_eq!(transport["volume"]["volumeQuantity"], 1);
    assert_eq!(transport["volume"]["species"], "Caixa");
    assert_eq!(transport["volume"]["volumeNumeration"], "Cadeira");
    assert_eq!(transport["volume"]["grossWeight"], 0.0);
    assert_eq!(transport["sealNumber"], "INV-2024-0043");
    assert!(transport["volume"].get("brand").is_none());
}

#[test]
fn request_deserializes_back() {
    let request = build_invoice(&consumer_record(), "SP", None, None).unwrap();
    let json = serde_json::to_string(&request).unwrap();
    let parsed: InvoiceRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.items[0].cfop, request.items[0].cfop);
    assert_eq!(parsed.buyer.person_type, PersonType::NaturalPerson);
    assert_eq!(parsed.destination, Destination::Internal);
}

// ---------------------------------------------------------------------------
// Snapshot tests (insta)
// ---------------------------------------------------------------------------

#[test]
fn tax_block_snapshot() {
    let input = TaxInput::new(dec!(100.00), dec!(2))
        .freight(dec!(10))
        .insurance(dec!(5))
        .icms(dec!(18), "0", "00", "3")
        .pis(dec!(1.65), "01")
        .cofins(dec!(7.6), "01")
        .ipi(dec!(0), "50");
    let json = serde_json::to_string_pretty(&calculate_tax(&input)).unwrap();

    insta::assert_snapshot!(json, @r#"
{
  "totalTax": 58.59,
  "icms": {
    "origin": "0",
    "cst": "00",
    "baseTaxModality": "3",
    "baseTax": 215.0,
    "baseTaxSTReduction": "0",
    "rate": 18.0,
    "amount": 38.7
  },
  "pis": {
    "cst": "01",
    "baseTax": 215.0,
    "rate": 1.65,
    "amount": 3.55
  },
  "cofins": {
    "cst": "01",
    "baseTax": 215.0,
    "rate": 7.6,
    "amount": 16.34
  },
  "ipi": {
    "cst": "50",
    "baseTax": 215.0,
    "rate": 0.0,
    "amount": 0.0
  }
}
"#);
}
