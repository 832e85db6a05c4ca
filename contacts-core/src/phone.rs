/// Reduces a raw phone string to its comparison key by dropping every
/// character that is not an ASCII decimal digit.
///
/// Total and idempotent. Input without digits yields the empty key.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_formatting() {
        assert_eq!(normalize_phone("+1 (555) 111-2222"), "15551112222");
        assert_eq!(normalize_phone("555.999.8888"), "5559998888");
        assert_eq!(normalize_phone("tel:+44 20 7946 0958 ext. 12"), "44207946095812");
    }

    #[test]
    fn test_empty_and_digitless_input() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("n/a"), "");
        assert_eq!(normalize_phone("  () - +"), "");
    }

    #[test]
    fn test_non_ascii_digits_are_dropped() {
        assert_eq!(normalize_phone("٠١٢ 345"), "345");
    }

    #[test]
    fn test_idempotent_over_printable_ascii() {
        let printable: String = (0x20u8..0x7f).map(char::from).collect();
        let once = normalize_phone(&printable);
        assert_eq!(once, "0123456789");
        assert_eq!(normalize_phone(&once), once);

        for raw in ["", "+1 (555) 111-2222", "abc", "12 34", "#*#*"] {
            let key = normalize_phone(raw);
            assert_eq!(normalize_phone(&key), key);
        }
    }
}
