use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::types::{Cofins, Icms, Ipi, Pis, TaxResult};

/// Default ICMS goods origin (national).
pub const DEFAULT_ICMS_ORIGIN: &str = "0";
/// Default ICMS CST (fully taxed).
pub const DEFAULT_ICMS_CST: &str = "00";
/// Default ICMS base determination modality (operation value).
pub const DEFAULT_ICMS_MODALITY: &str = "3";
/// Default PIS/COFINS CST (taxable at the basic rate).
pub const DEFAULT_PIS_COFINS_CST: &str = "01";
/// Default IPI CST (taxed outgoing).
pub const DEFAULT_IPI_CST: &str = "50";

/// Per-item input to the tax rule engine.
///
/// Monetary fields are in BRL; rates are percentages (`18` = 18 %).
/// Code fields hold the raw values from the tax template; only their
/// leading characters are used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxInput {
    pub unit_value: Decimal,
    pub quantity: Decimal,
    pub freight: Decimal,
    pub insurance: Decimal,
    pub others: Decimal,
    pub discount: Decimal,
    pub icms_rate: Decimal,
    pub icms_origin: String,
    pub icms_cst: String,
    pub icms_base_modality: String,
    pub pis_rate: Decimal,
    pub pis_cst: String,
    pub cofins_rate: Decimal,
    pub cofins_cst: String,
    pub ipi_rate: Decimal,
    pub ipi_cst: String,
}

impl TaxInput {
    pub fn new(unit_value: Decimal, quantity: Decimal) -> Self {
        Self {
            unit_value,
            quantity,
            ..Default::default()
        }
    }

    pub fn freight(mut self, amount: Decimal) -> Self {
        self.freight = amount;
        self
    }

    pub fn insurance(mut self, amount: Decimal) -> Self {
        self.insurance = amount;
        self
    }

    pub fn others(mut self, amount: Decimal) -> Self {
        self.others = amount;
        self
    }

    pub fn discount(mut self, amount: Decimal) -> Self {
        self.discount = amount;
        self
    }

    /// ICMS rate, origin, CST and base modality.
    pub fn icms(
        mut self,
        rate: Decimal,
        origin: impl Into<String>,
        cst: impl Into<String>,
        modality: impl Into<String>,
    ) -> Self {
        self.icms_rate = rate;
        self.icms_origin = origin.into();
        self.icms_cst = cst.into();
        self.icms_base_modality = modality.into();
        self
    }

    pub fn pis(mut self, rate: Decimal, cst: impl Into<String>) -> Self {
        self.pis_rate = rate;
        self.pis_cst = cst.into();
        self
    }

    pub fn cofins(mut self, rate: Decimal, cst: impl Into<String>) -> Self {
        self.cofins_rate = rate;
        self.cofins_cst = cst.into();
        self
    }

    pub fn ipi(mut self, rate: Decimal, cst: impl Into<String>) -> Self {
        self.ipi_rate = rate;
        self.ipi_cst = cst.into();
        self
    }

    /// `unit_value * quantity + freight + insurance + others - discount`.
    ///
    /// Not clamped: a discount larger than the gross value yields a negative base.
    /// Zero when the sum does not fit in a [`Decimal`].
    pub fn base_tax(&self) -> Decimal {
        self.checked_base_tax().unwrap_or(Decimal::ZERO)
    }

    /// Like [`base_tax`](Self::base_tax), but `None` on overflow.
    pub fn checked_base_tax(&self) -> Option<Decimal> {
        self.unit_value
            .checked_mul(self.quantity)?
            .checked_add(self.freight)?
            .checked_add(self.insurance)?
            .checked_add(self.others)?
            .checked_sub(self.discount)
    }
}

/// Compute the taxable base and the ICMS, PIS, COFINS and IPI lines for one item.
///
/// Never fails. Rates outside `[0, 100]` are treated as zero and code fields
/// shorter than their prefix fall back to the defaults above. A base whose
/// tax lines would overflow a [`Decimal`] is treated as zero.
///
/// ```
/// use nfe_bridge::core::{calculate_tax, TaxInput};
/// use rust_decimal_macros::dec;
///
/// let input = TaxInput::new(dec!(100), dec!(2))
///     .freight(dec!(10))
///     .insurance(dec!(5))
///     .icms(dec!(18), "0", "00", "3")
///     .pis(dec!(1.65), "01")
///     .cofins(dec!(7.6), "01");
/// let tax = calculate_tax(&input);
/// assert_eq!(tax.base_tax(), dec!(215.00));
/// assert_eq!(tax.total_tax, dec!(58.59));
/// ```
pub fn calculate_tax(input: &TaxInput) -> TaxResult {
    let rates = [
        input.icms_rate,
        input.pis_rate,
        input.cofins_rate,
        input.ipi_rate,
    ]
    .map(sanitize_rate);
    let [icms_rate, pis_rate, cofins_rate, ipi_rate] = rates;

    let base = input.base_tax();
    let (base, [icms_amount, pis_amount, cofins_amount, ipi_amount]) =
        match line_amounts(rates, base) {
            Some(amounts) => (base, amounts),
            None => (Decimal::ZERO, [Decimal::ZERO; 4]),
        };

    let icms = Icms {
        origin: code_prefix(&input.icms_origin, 1, DEFAULT_ICMS_ORIGIN),
        cst: code_prefix(&input.icms_cst, 2, DEFAULT_ICMS_CST),
        base_tax_modality: code_prefix(&input.icms_base_modality, 1, DEFAULT_ICMS_MODALITY),
        base_tax: base,
        base_tax_st_reduction: "0".to_string(),
        rate: icms_rate,
        amount: icms_amount,
    };
    let pis = Pis {
        cst: code_prefix(&input.pis_cst, 2, DEFAULT_PIS_COFINS_CST),
        base_tax: base,
        rate: pis_rate,
        amount: pis_amount,
    };
    let cofins = Cofins {
        cst: code_prefix(&input.cofins_cst, 2, DEFAULT_PIS_COFINS_CST),
        base_tax: base,
        rate: cofins_rate,
        amount: cofins_amount,
    };
    let ipi = Ipi {
        cst: code_prefix(&input.ipi_cst, 2, DEFAULT_IPI_CST),
        base_tax: base,
        rate: ipi_rate,
        amount: ipi_amount,
    };

    TaxResult {
        // line_amounts checked that this sum fits.
        total_tax: icms_amount + pis_amount + cofins_amount + ipi_amount,
        icms,
        pis,
        cofins,
        ipi,
    }
}

/// The four rounded amounts, or `None` if any of them or their sum overflows.
fn line_amounts(rates: [Decimal; 4], base: Decimal) -> Option<[Decimal; 4]> {
    let mut amounts = [Decimal::ZERO; 4];
    let mut total = Decimal::ZERO;
    for (amount, rate) in amounts.iter_mut().zip(rates) {
        *amount = tax_amount(rate, base)?;
        total = total.checked_add(*amount)?;
    }
    Some(amounts)
}

/// DIFAL with the dual-base ("base dupla") method.
///
/// Rates are fractions (`0.12` = 12 %). The result is not rounded. Returns
/// `None` when `internal_rate == 1`, where the gross-up divides by zero, or
/// when an intermediate value overflows.
///
/// ```
/// use nfe_bridge::core::calculate_difal;
/// use rust_decimal_macros::dec;
///
/// let difal = calculate_difal(dec!(1000), dec!(0.12), dec!(0.18)).unwrap();
/// assert_eq!(difal.round_dp(2), dec!(73.17));
/// ```
pub fn calculate_difal(
    operation_value: Decimal,
    interstate_rate: Decimal,
    internal_rate: Decimal,
) -> Option<Decimal> {
    let icms_inter = operation_value.checked_mul(interstate_rate)?;
    let base_without_icms = operation_value.checked_sub(icms_inter)?;
    let grossed_up = base_without_icms.checked_div(Decimal::ONE.checked_sub(internal_rate)?)?;
    let icms_intra = grossed_up.checked_mul(internal_rate)?;
    icms_intra.checked_sub(icms_inter)
}

/// DIFAL with the single-base method: `value * (internal - interstate)`,
/// unrounded. Zero when the product overflows.
pub fn calculate_difal_simple(
    operation_value: Decimal,
    interstate_rate: Decimal,
    internal_rate: Decimal,
) -> Decimal {
    internal_rate
        .checked_sub(interstate_rate)
        .and_then(|spread| operation_value.checked_mul(spread))
        .unwrap_or(Decimal::ZERO)
}

/// `round(rate / 100 * base, 2)`, `None` on overflow.
pub(crate) fn tax_amount(rate: Decimal, base: Decimal) -> Option<Decimal> {
    rate.checked_div(dec!(100))?
        .checked_mul(base)
        .map(|amount| round_half_up(amount, 2))
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn sanitize_rate(rate: Decimal) -> Decimal {
    if rate < Decimal::ZERO || rate > dec!(100) {
        Decimal::ZERO
    } else {
        rate
    }
}

/// First `len` characters of `code`, or `default` when it is shorter.
fn code_prefix(code: &str, len: usize, default: &str) -> String {
    let code = code.trim();
    if code.chars().count() < len {
        default.to_string()
    } else {
        code.chars().take(len).collect()
    }
}
