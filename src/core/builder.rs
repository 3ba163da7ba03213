use rust_decimal::Decimal;

use super::classify::classify_buyer;
use super::digits::{non_empty_digits, only_digits};
use super::error::NfeError;
use super::operation::resolve_operation;
use super::source::{non_blank, text, Carrier, SourceItem, SourceRecord, TaxTemplate};
use super::tax::{
    calculate_tax, TaxInput, DEFAULT_ICMS_CST, DEFAULT_ICMS_MODALITY, DEFAULT_ICMS_ORIGIN,
    DEFAULT_IPI_CST, DEFAULT_PIS_COFINS_CST,
};
use super::types::*;

/// GTIN placeholder for products without a barcode.
pub const NO_GTIN: &str = "SEM GTIN";
/// Commercial unit used for every line.
pub const DEFAULT_UNIT: &str = "UN";
/// Volume species for the transport block.
pub const DEFAULT_SPECIES: &str = "Caixa";
/// Country code for domestic addresses.
pub const DEFAULT_COUNTRY: &str = "BRA";

/// Assembles an [`InvoiceRequest`] from an ERP [`SourceRecord`].
///
/// ```
/// use nfe_bridge::core::*;
///
/// let record: SourceRecord = serde_json::from_str(r#"{
///     "name": "INV-0001",
///     "client_name": "Maria Silva",
///     "client_id_number": "123.456.789-00",
///     "city": "Rio de Janeiro",
///     "delivery_ibge": "3304557",
///     "delivery_state": "RJ",
///     "operation_nature": "Venda",
///     "invoices_table": [{"item_name": "Cadeira", "ncm": "94013000", "rate": 100, "quantity": 2}]
/// }"#).unwrap();
///
/// let request = InvoiceAssembler::new(&record, "SP").build().unwrap();
/// assert_eq!(request.items[0].cfop.code(), 6102);
/// assert_eq!(request.serie, 11);
/// ```
pub struct InvoiceAssembler<'a> {
    record: &'a SourceRecord,
    issuer_state: &'a str,
    tax_template: Option<&'a TaxTemplate>,
    carrier: Option<&'a Carrier>,
}

impl<'a> InvoiceAssembler<'a> {
    pub fn new(record: &'a SourceRecord, issuer_state: &'a str) -> Self {
        Self {
            record,
            issuer_state,
            tax_template: None,
            carrier: None,
        }
    }

    /// Use the template's rates and codes for every line instead of the
    /// per-item rates.
    pub fn tax_template(mut self, template: &'a TaxTemplate) -> Self {
        self.tax_template = Some(template);
        self
    }

    /// Emit a transport block for this carrier.
    pub fn carrier(mut self, carrier: &'a Carrier) -> Self {
        self.carrier = Some(carrier);
        self
    }

    /// Build the request. Fails on the first classification, address,
    /// operation or transport error.
    pub fn build(self) -> Result<InvoiceRequest, NfeError> {
        let record = self.record;

        let (buyer, consumer_type) = build_buyer(record)?;

        if record.invoices_table.is_empty() {
            return Err(NfeError::Builder(format!(
                "invoice {:?} has no line items",
                record.name
            )));
        }

        let direction = match text(&record.operation_type) {
            "" => Direction::Outgoing,
            raw => raw.parse()?,
        };
        let operation = resolve_operation(
            text(&record.operation_nature),
            direction,
            text(&record.delivery_state),
            self.issuer_state,
        )?;

        let items = record
            .invoices_table
            .iter()
            .enumerate()
            .map(|(i, item)| build_item(i, item, self.tax_template, operation.cfop))
            .collect();

        let transport = self
            .carrier
            .map(|carrier| build_transport(record, carrier))
            .transpose()?;

        Ok(InvoiceRequest {
            serie: operation.series,
            operation_nature: text(&record.operation_nature).to_string(),
            operation_type: operation.direction,
            consumer_type,
            purpose_type: PurposeType::Normal,
            destination: operation.destination,
            buyer,
            items,
            payment: build_payment(),
            transport,
            additional_information: non_blank(&record.additional_information)
                .map(|taxpayer| AdditionalInformation { taxpayer }),
        })
    }
}

/// Shorthand for [`InvoiceAssembler`].
pub fn build_invoice(
    record: &SourceRecord,
    issuer_state: &str,
    tax_template: Option<&TaxTemplate>,
    carrier: Option<&Carrier>,
) -> Result<InvoiceRequest, NfeError> {
    let mut assembler = InvoiceAssembler::new(record, issuer_state);
    if let Some(template) = tax_template {
        assembler = assembler.tax_template(template);
    }
    if let Some(carrier) = carrier {
        assembler = assembler.carrier(carrier);
    }
    assembler.build()
}

/// The payment block: goods are invoiced without a captured payment.
pub fn build_payment() -> Vec<Payment> {
    vec![Payment {
        payment_detail: vec![PaymentDetail {
            method: PaymentMethod::WithoutPayment,
            amount: Decimal::ZERO,
        }],
    }]
}

/// Tax engine input for one line, from the template when present, otherwise
/// from the line's own rates with the default codes.
pub fn item_tax_input(item: &SourceItem, template: Option<&TaxTemplate>) -> TaxInput {
    let amount = |v: Option<Decimal>| v.unwrap_or_default();
    let base = TaxInput::new(amount(item.rate), amount(item.quantity))
        .freight(amount(item.freight_amount))
        .insurance(amount(item.insurance_amount))
        .others(amount(item.other_amount))
        .discount(amount(item.discount_amount));

    match template {
        Some(t) => base
            .icms(
                amount(t.aliq_icms),
                text(&t.origin_icms),
                text(&t.cst_icms),
                text(&t.mod_determ_bc),
            )
            .pis(amount(t.aliquota_pis), text(&t.cst_pis))
            .cofins(amount(t.aliquota_cofins), text(&t.cst_cofins))
            .ipi(amount(t.aliquota_ipi), text(&t.cst_ipi)),
        None => base
            .icms(
                amount(item.icms_rate),
                DEFAULT_ICMS_ORIGIN,
                DEFAULT_ICMS_CST,
                DEFAULT_ICMS_MODALITY,
            )
            .pis(amount(item.pis_rate), DEFAULT_PIS_COFINS_CST)
            .cofins(amount(item.cofins_rate), DEFAULT_PIS_COFINS_CST)
            .ipi(amount(item.ipi_rate), DEFAULT_IPI_CST),
    }
}

fn build_buyer(record: &SourceRecord) -> Result<(Buyer, ConsumerType), NfeError> {
    let profile = classify_buyer(
        text(&record.client_id_number),
        text(&record.contribuinte_icms),
    )?;

    let address = AddressBuilder::new(
        text(&record.city),
        text(&record.delivery_ibge),
        text(&record.delivery_state),
    )
    .street(text(&record.delivery_address))
    .number(text(&record.delivery_number_address))
    .district(text(&record.delivery_neighborhood))
    .postal_code(text(&record.delivery_cep))
    .phone(text(&record.delivery_phone))
    .additional_information(text(&record.delivery_complement))
    .build()?;

    let state_tax_number = match profile.state_tax_number_indicator {
        Some(StateTaxNumberIndicator::TaxPayer) => {
            non_empty_digits(text(&record.inscricao_estadual))
        }
        _ => None,
    };

    let buyer = Buyer {
        name: text(&record.client_name).to_string(),
        federal_tax_number: profile.identity.as_number(),
        email: non_blank(&record.client_email),
        address,
        person_type: profile.person_type,
        tax_regime: profile.tax_regime,
        state_tax_number_indicator: profile.state_tax_number_indicator,
        state_tax_number,
    };
    Ok((buyer, profile.consumer_type))
}

fn build_item(index: usize, item: &SourceItem, template: Option<&TaxTemplate>, cfop: Cfop) -> Item {
    let input = item_tax_input(item, template);
    let tax = calculate_tax(&input);
    Item {
        code: (index + 1).to_string(),
        code_gtin: NO_GTIN.to_string(),
        code_tax_gtin: NO_GTIN.to_string(),
        description: text(&item.item_name).to_string(),
        ncm: only_digits(text(&item.ncm)),
        cest: non_empty_digits(text(&item.cest)),
        cfop,
        unit: DEFAULT_UNIT.to_string(),
        quantity: input.quantity,
        unit_amount: input.unit_value,
        total_amount: input
            .unit_value
            .checked_mul(input.quantity)
            .unwrap_or(Decimal::ZERO),
        tax,
    }
}

fn build_transport(record: &SourceRecord, carrier: &Carrier) -> Result<Transport, NfeError> {
    let cnpj = only_digits(text(&carrier.cnpj));
    if cnpj.is_empty() {
        return Err(NfeError::MissingCarrierIdentifier);
    }
    let federal_tax_number = cnpj
        .parse::<u64>()
        .map_err(|_| NfeError::InvalidTaxNumberLength(cnpj.len()))?;

    let address = AddressBuilder::new(
        text(&carrier.city),
        text(&carrier.ibge),
        text(&carrier.state),
    )
    .street(text(&carrier.address))
    .number(text(&carrier.address_number))
    .district(text(&carrier.neighborhood))
    .postal_code(text(&carrier.cep))
    .phone(text(&carrier.phone))
    .build_unchecked();

    let (gross_weight, net_weight) = record
        .invoices_table
        .iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(gross, net), item| {
            Some((
                gross.checked_add(item.gross_weight.unwrap_or_default())?,
                net.checked_add(item.net_weight.unwrap_or_default())?,
            ))
        })
        .unwrap_or_default();

    Ok(Transport {
        freight_modality: FreightModality::from_label(text(&record.freight_modality))
            .unwrap_or_default(),
        transport_group: TransportGroup {
            name: text(&carrier.carrier_name).to_string(),
            federal_tax_number,
            state_tax_number: non_empty_digits(text(&carrier.state_registration)),
            email: non_blank(&carrier.email),
            person_type: PersonType::LegalEntity,
            address,
        },
        volume: Volume {
            volume_quantity: 1,
            species: DEFAULT_SPECIES.to_string(),
            brand: non_blank(&record.product_brand),
            volume_numeration: record
                .invoices_table
                .first()
                .and_then(|item| non_blank(&item.item_name)),
            net_weight,
            gross_weight,
        },
        seal_number: (!record.name.trim().is_empty()).then(|| record.name.trim().to_string()),
    })
}

/// Builder for [`Address`].
pub struct AddressBuilder {
    city_name: String,
    city_code: String,
    state: String,
    street: String,
    number: String,
    district: String,
    postal_code: String,
    phone: Option<String>,
    additional_information: Option<String>,
    country: String,
}

impl AddressBuilder {
    pub fn new(
        city_name: impl Into<String>,
        city_code: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            city_name: city_name.into(),
            city_code: city_code.into(),
            state: state.into(),
            street: String::new(),
            number: String::new(),
            district: String::new(),
            postal_code: String::new(),
            phone: None,
            additional_information: None,
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = street.into();
        self
    }

    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    pub fn district(mut self, district: impl Into<String>) -> Self {
        self.district = district.into();
        self
    }

    /// CEP; punctuation is stripped.
    pub fn postal_code(mut self, cep: &str) -> Self {
        self.postal_code = only_digits(cep);
        self
    }

    /// Phone; punctuation is stripped and an empty result is dropped.
    pub fn phone(mut self, phone: &str) -> Self {
        self.phone = non_empty_digits(phone);
        self
    }

    pub fn additional_information(mut self, info: &str) -> Self {
        let info = info.trim();
        self.additional_information = (!info.is_empty()).then(|| info.to_string());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Build, requiring the city name and IBGE code.
    pub fn build(self) -> Result<Address, NfeError> {
        if self.city_name.trim().is_empty() {
            return Err(NfeError::MissingAddressField("city"));
        }
        if self.city_code.trim().is_empty() {
            return Err(NfeError::MissingAddressField("city code"));
        }
        Ok(self.build_unchecked())
    }

    /// Build without checking mandatory fields.
    pub fn build_unchecked(self) -> Address {
        Address {
            phone: self.phone,
            state: self.state.trim().to_ascii_uppercase(),
            city: City {
                code: self.city_code.trim().to_string(),
                name: self.city_name.trim().to_string(),
            },
            district: self.district,
            additional_information: self.additional_information,
            street: self.street,
            number: self.number,
            postal_code: self.postal_code,
            country: self.country,
        }
    }
}
