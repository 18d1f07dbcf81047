/// Reduces a free-form phone value to its decimal digits.
///
/// Formatting characters (`+`, spaces, dashes, parentheses, dots) and any other
/// non-digit text are dropped, so two renderings of the same number produce the
/// same key. The result may be empty.
pub fn normalize_phone(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| ch.is_ascii_digit())
        .collect()
}
