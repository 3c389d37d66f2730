//! Amount helpers. Amounts are stored as integer cents.

/// Format cents as a plain decimal (`-12.05`, `1234.50`).
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse a user-typed amount into cents.
///
/// Accepts `100`, `100.5`, `100,50` and surrounding whitespace. More than two
/// decimal digits is rejected rather than rounded.
pub fn parse_amount(input: &str) -> Option<i64> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    let (negative, digits) = match normalized.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, normalized.as_str()),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > 2
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    let cents = whole.checked_mul(100)?.checked_add(fraction)?;
    Some(if negative { -cents } else { cents })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(123_450), "1234.50");
        assert_eq!(format_amount(-1205), "-12.05");
        assert_eq!(format_amount(7), "0.07");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100"), Some(10_000));
        assert_eq!(parse_amount(" 100.5 "), Some(10_050));
        assert_eq!(parse_amount("100,50"), Some(10_050));
        assert_eq!(parse_amount(".5"), Some(50));
        assert_eq!(parse_amount("-3"), Some(-300));
        assert_eq!(parse_amount("1.234"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("."), None);
    }
}
