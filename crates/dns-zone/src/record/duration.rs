//! TTL values in zone files are durations: either a plain number of
//! seconds, or a sequence of `<number><unit>` groups (`1h30m`, `4w`),
//! with the units `w`, `d`, `h`, `m`, and `s` in either case.

/// Check if a token has the shape of a duration.
pub fn is_duration(token: &str) -> bool {
    to_seconds(token).is_some()
}

/// Convert a duration to seconds.  Returns `None` if it is not a
/// duration or does not fit in a `u32`.
pub fn to_seconds(token: &str) -> Option<u32> {
    if token.is_empty() {
        return None;
    }

    let mut total: u32 = 0;
    let mut group: Option<u32> = None;

    for c in token.chars() {
        if let Some(digit) = c.to_digit(10) {
            group = Some(group.unwrap_or(0).checked_mul(10)?.checked_add(digit)?);
        } else {
            let multiplier = match c.to_ascii_lowercase() {
                'w' => 604_800,
                'd' => 86_400,
                'h' => 3_600,
                'm' => 60,
                's' => 1,
                _ => return None,
            };
            total = total.checked_add(group?.checked_mul(multiplier)?)?;
            group = None;
        }
    }

    // trailing digits without a unit are seconds
    match group {
        Some(seconds) => total.checked_add(seconds),
        None => Some(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_seconds_plain() {
        assert_eq!(Some(0), to_seconds("0"));
        assert_eq!(Some(3600), to_seconds("3600"));
    }

    #[test]
    fn to_seconds_units() {
        assert_eq!(Some(10_800), to_seconds("3h"));
        assert_eq!(Some(900), to_seconds("15m"));
        assert_eq!(Some(2_419_200), to_seconds("4w"));
        assert_eq!(Some(1_800), to_seconds("30M"));
        assert_eq!(Some(86_400 + 7_200 + 5), to_seconds("1d2h5s"));
        assert_eq!(Some(3_630), to_seconds("1h30"));
    }

    #[test]
    fn to_seconds_rejects_non_durations() {
        assert_eq!(None, to_seconds(""));
        assert_eq!(None, to_seconds("IN"));
        assert_eq!(None, to_seconds("HS"));
        assert_eq!(None, to_seconds("h"));
        assert_eq!(None, to_seconds("1x"));
        assert_eq!(None, to_seconds("www"));
        assert_eq!(None, to_seconds("-1"));
    }

    #[test]
    fn to_seconds_rejects_overflow() {
        assert_eq!(None, to_seconds("4294967296"));
        assert_eq!(None, to_seconds("10000w"));
    }
}
