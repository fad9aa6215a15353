use std::time::Duration;

/// Parses a compact duration string such as `30s`, `2m` or `1h30m`.
///
/// Each component is a decimal number followed by one of `s`, `m`, `h` or
/// `d`. Returns `None` for empty input, a trailing number without a unit, an
/// unknown unit, or on overflow.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use clpkg_utils::time::parse_duration;
///
/// assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
/// ```
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut chars = input.chars().peekable();

    while chars.peek().is_some() {
        let mut number: u64 = 0;
        let mut digits = 0;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            number = number.checked_mul(10)?.checked_add(u64::from(digit))?;
            digits += 1;
            chars.next();
        }

        if digits == 0 {
            return None;
        }

        let multiplier = match chars.next()? {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return None,
        };

        total = total.checked_add(number.checked_mul(multiplier)?)?;
    }

    Some(Duration::from_secs(total))
}
