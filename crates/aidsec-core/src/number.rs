#![forbid(unsafe_code)]

//! Lenient integer coercion for dirty numeric cells.

/// Leading-integer value of a cell, or `None` when it has no leading digits.
///
/// Surrounding whitespace is ignored, an optional sign is accepted, and
/// parsing stops at the first non-digit: `"12abc"` is 12, `"2.9"` is 2.
#[must_use]
pub fn leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let mut value: i64 = 0;
    for b in digits[..end].bytes() {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    Some(if negative { -value } else { value })
}

/// Non-negative count for an accumulator; anything unparseable or negative is 0.
#[must_use]
pub fn count(raw: &str) -> u64 {
    leading_int(raw).map_or(0, |value| u64::try_from(value).unwrap_or(0))
}
