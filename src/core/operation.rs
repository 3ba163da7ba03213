use super::error::NfeError;
use super::types::{Cfop, Destination, Direction};

/// Outgoing natures of operation and their CFOP templates. `x` is the
/// locality placeholder.
const OUTGOING: &[(&str, &str)] = &[
    ("venda", "x102"),
    ("venda de produção do estabelecimento", "x101"),
    ("retorno de remessa para conserto", "x916"),
    ("retorno de troca em garantia", "x949"),
    ("devolução de mercadoria de bonificação", "x949"),
];

/// Template used for outgoing natures missing from [`OUTGOING`].
const OUTGOING_DEFAULT: &str = "x102";

/// Incoming natures of operation. There is no fallback.
const INCOMING: &[(&str, &str)] = &[
    ("remessa para conserto", "x915"),
    ("troca em garantia", "x949"),
    ("bonificação", "x910"),
    ("compra", "x102"),
];

/// Resolved fiscal operation metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub cfop: Cfop,
    pub series: u32,
    pub direction: Direction,
    pub destination: Destination,
}

/// Derive CFOP, series and destination for an operation.
///
/// `nature` is matched after trimming and lower-casing; states are compared as
/// UF codes after trimming and ASCII upper-casing.
///
/// ```
/// use nfe_bridge::core::*;
///
/// let op = resolve_operation("Venda", Direction::Outgoing, "RJ", "SP").unwrap();
/// assert_eq!(op.cfop.code(), 6102);
/// assert_eq!(op.series, 11);
/// assert_eq!(op.destination, Destination::Interstate);
/// ```
pub fn resolve_operation(
    nature: &str,
    direction: Direction,
    buyer_state: &str,
    issuer_state: &str,
) -> Result<Operation, NfeError> {
    let key = nature.trim().to_lowercase();
    let template = match direction {
        Direction::Outgoing => lookup(OUTGOING, &key).unwrap_or(OUTGOING_DEFAULT),
        Direction::Incoming => {
            lookup(INCOMING, &key).ok_or_else(|| NfeError::CfopNotFound(nature.to_string()))?
        }
    };

    let same_state = normalize_state(buyer_state) == normalize_state(issuer_state);
    let destination = if same_state {
        Destination::Internal
    } else {
        Destination::Interstate
    };

    let cfop = fill_template(template, locality_digit(direction, destination))
        .ok_or_else(|| NfeError::CfopNotFound(nature.to_string()))?;

    Ok(Operation {
        cfop,
        series: direction.series(),
        direction,
        destination,
    })
}

/// Leading CFOP digit for a direction and locality.
pub fn locality_digit(direction: Direction, destination: Destination) -> char {
    match (direction, destination) {
        (Direction::Outgoing, Destination::Internal) => '5',
        (Direction::Outgoing, Destination::Interstate) => '6',
        (Direction::Incoming, Destination::Internal) => '1',
        (Direction::Incoming, Destination::Interstate) => '2',
    }
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(nature, _)| *nature == key)
        .map(|(_, template)| *template)
}

fn fill_template(template: &str, digit: char) -> Option<Cfop> {
    template.replacen('x', &digit.to_string(), 1).parse().ok().and_then(Cfop::new)
}

fn normalize_state(state: &str) -> String {
    state.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_hold_valid_templates() {
        for (_, template) in OUTGOING.iter().chain(INCOMING) {
            for digit in ['1', '2', '5', '6'] {
                assert!(fill_template(template, digit).is_some(), "{template}");
            }
        }
    }

    #[test]
    fn locality_matrix() {
        assert_eq!(locality_digit(Direction::Outgoing, Destination::Internal), '5');
        assert_eq!(locality_digit(Direction::Outgoing, Destination::Interstate), '6');
        assert_eq!(locality_digit(Direction::Incoming, Destination::Internal), '1');
        assert_eq!(locality_digit(Direction::Incoming, Destination::Interstate), '2');
    }

    #[test]
    fn states_are_normalized() {
        let op = resolve_operation("venda", Direction::Outgoing, " sp", "SP ").unwrap();
        assert_eq!(op.destination, Destination::Internal);
        assert_eq!(op.cfop.code(), 5102);
    }

    #[test]
    fn unknown_incoming_nature_fails() {
        let err = resolve_operation("Doação", Direction::Incoming, "SP", "SP").unwrap_err();
        assert_eq!(err, NfeError::CfopNotFound("Doação".into()));
    }

    #[test]
    fn unknown_outgoing_nature_defaults_to_sale() {
        let op = resolve_operation("amostra grátis", Direction::Outgoing, "MG", "SP").unwrap();
        assert_eq!(op.cfop.code(), 6102);
    }
}
