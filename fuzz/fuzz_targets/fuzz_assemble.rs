#![no_main]

use libfuzzer_sys::fuzz_target;
use nfe_bridge::core::{
    build_invoice, calculate_difal, calculate_difal_simple, calculate_tax, validate_request,
    Carrier, SourceItem, SourceRecord, TaxInput, TaxTemplate,
};
use rust_decimal::Decimal;

/// Any 13 bytes make a Decimal, including values near `Decimal::MAX`.
fn decimal(bytes: &[u8]) -> Decimal {
    let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    Decimal::from_parts(word(0), word(4), word(8), bytes[12] & 1 == 1, u32::from(bytes[12] >> 1) % 29)
}

fuzz_target!(|data: &[u8]| {
    // Must not panic: errors are fine, panics are bugs.
    if let Ok(record) = serde_json::from_slice::<SourceRecord>(data) {
        let template = serde_json::from_slice::<TaxTemplate>(data).ok();
        let carrier = serde_json::from_slice::<Carrier>(data).ok();
        if let Ok(request) = build_invoice(&record, "SP", template.as_ref(), carrier.as_ref()) {
            let _ = validate_request(&request);
            let _ = serde_json::to_vec(&request);
        }
        return;
    }

    let values: Vec<Decimal> = data.chunks_exact(13).map(decimal).collect();
    let [unit, quantity, freight, discount, rate, ..] = values.as_slice() else {
        return;
    };

    let input = TaxInput::new(*unit, *quantity)
        .freight(*freight)
        .discount(*discount)
        .icms(*rate, "0", "00", "3")
        .pis(*rate, "01");
    let _ = calculate_tax(&input);
    let _ = calculate_difal(*unit, *rate, *quantity);
    let _ = calculate_difal_simple(*unit, *rate, *quantity);

    let item = SourceItem {
        item_name: Some("fuzz".into()),
        rate: Some(*unit),
        quantity: Some(*quantity),
        icms_rate: Some(*rate),
        gross_weight: Some(*freight),
        net_weight: Some(*discount),
        ..Default::default()
    };
    let record = SourceRecord {
        name: "FUZZ".into(),
        client_id_number: Some("12345678900".into()),
        city: Some("São Paulo".into()),
        delivery_ibge: Some("3550308".into()),
        delivery_state: Some("SP".into()),
        invoices_table: vec![item.clone(), item],
        ..Default::default()
    };
    let carrier = Carrier {
        cnpj: Some("98765432000110".into()),
        ..Default::default()
    };
    if let Ok(request) = build_invoice(&record, "SP", None, Some(&carrier)) {
        assert!(validate_request(&request).is_empty());
        let _ = serde_json::to_vec(&request);
    }
});
