/// Keep only the ASCII digits of `raw`.
///
/// Used for CPF/CNPJ, state tax numbers, postal codes and phone numbers,
/// which the ERP stores with arbitrary punctuation (`"12.345.678/0001-90"`,
/// `"+55 (11) 9999-0000"`).
pub fn only_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Like [`only_digits`] but `None` when nothing is left.
pub fn non_empty_digits(raw: &str) -> Option<String> {
    let digits = only_digits(raw);
    (!digits.is_empty()).then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation() {
        assert_eq!(only_digits("123.456.789-00"), "12345678900");
        assert_eq!(only_digits("12.345.678/0001-90"), "12345678000190");
        assert_eq!(only_digits("01310-100"), "01310100");
    }

    #[test]
    fn drops_plus_and_letters() {
        assert_eq!(only_digits("+55 (11) 9999-0000"), "551199990000");
        assert_eq!(only_digits("ISENTO"), "");
    }

    #[test]
    fn non_ascii_digits_are_dropped() {
        assert_eq!(only_digits("١٢٣4"), "4");
    }

    #[test]
    fn empty_becomes_none() {
        assert_eq!(non_empty_digits(" - "), None);
        assert_eq!(non_empty_digits("(11) 3000"), Some("113000".into()));
    }
}
