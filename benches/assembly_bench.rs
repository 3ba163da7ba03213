use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use nfe_bridge::core::*;

fn record_with_lines(lines: usize) -> SourceRecord {
    SourceRecord {
        name: "BENCH-001".into(),
        client_name: Some("Comercial Carioca Ltda".into()),
        client_id_number: Some("12.345.678/0001-90".into()),
        contribuinte_icms: Some("Contribuinte".into()),
        inscricao_estadual: Some("86.123.456".into()),
        delivery_address: Some("Rua do Ouvidor".into()),
        delivery_number_address: Some("50".into()),
        city: Some("Rio de Janeiro".into()),
        delivery_ibge: Some("3304557".into()),
        delivery_state: Some("RJ".into()),
        delivery_cep: Some("20040-030".into()),
        operation_nature: Some("Venda".into()),
        invoices_table: (1..=lines)
            .map(|i| SourceItem {
                item_name: Some(format!("Item {i}")),
                ncm: Some("9401.30.00".into()),
                rate: Some(dec!(9.99)),
                quantity: Some(dec!(2)),
                icms_rate: Some(dec!(12)),
                pis_rate: Some(dec!(1.65)),
                cofins_rate: Some(dec!(7.6)),
                gross_weight: Some(dec!(1.2)),
                net_weight: Some(dec!(1)),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn carrier() -> Carrier {
    Carrier {
        carrier_name: Some("Transportes Rápidos SA".into()),
        cnpj: Some("98.765.432/0001-10".into()),
        city: Some("Campinas".into()),
        ibge: Some("3509502".into()),
        state: Some("SP".into()),
        ..Default::default()
    }
}

fn bench_calculate_tax(c: &mut Criterion) {
    let input = TaxInput::new(dec!(100), dec!(2))
        .freight(dec!(10))
        .insurance(dec!(5))
        .icms(dec!(18), "0", "00", "3")
        .pis(dec!(1.65), "01")
        .cofins(dec!(7.6), "01");
    c.bench_function("calculate_tax", |b| {
        b.iter(|| black_box(calculate_tax(black_box(&input))));
    });
}

fn bench_build_invoice(c: &mut Criterion) {
    let record = record_with_lines(10);
    let carrier = carrier();
    c.bench_function("build_invoice_10_lines", |b| {
        b.iter(|| black_box(build_invoice(black_box(&record), "SP", None, Some(&carrier))));
    });
}

fn bench_build_large_invoice(c: &mut Criterion) {
    let record = record_with_lines(990);
    c.bench_function("build_invoice_990_lines", |b| {
        b.iter(|| black_box(build_invoice(black_box(&record), "SP", None, None)));
    });
}

fn bench_validate(c: &mut Criterion) {
    let request = build_invoice(&record_with_lines(10), "SP", None, None).unwrap();
    c.bench_function("validate_request", |b| {
        b.iter(|| black_box(validate_request(black_box(&request))));
    });
}

fn bench_serialize(c: &mut Criterion) {
    let request = build_invoice(&record_with_lines(10), "SP", None, Some(&carrier())).unwrap();
    c.bench_function("serialize_request_json", |b| {
        b.iter(|| black_box(serde_json::to_vec(black_box(&request))));
    });
}

criterion_group!(
    benches,
    bench_calculate_tax,
    bench_build_invoice,
    bench_build_large_invoice,
    bench_validate,
    bench_serialize,
);
criterion_main!(benches);
