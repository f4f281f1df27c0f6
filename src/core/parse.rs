//! Lenient numeric parsing for grid cells.

const CM3_PER_M3: f64 = 1_000_000.0;

/// Parses a number out of noisy cell text such as `"₹ 1,250.00"`.
///
/// Everything that is not a digit or a decimal point is dropped, then the
/// leading `digits[.digits]` run is parsed. Anything unparseable yields `0`.
pub fn parse_number(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    // "1.2.3" reads as 1.2
    let end = cleaned
        .match_indices('.')
        .nth(1)
        .map(|(idx, _)| idx)
        .unwrap_or(cleaned.len());

    match cleaned[..end].parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            tracing::trace!("Unparseable number '{}', using 0", text);
            0.0
        }
    }
}

/// Converts `"LxWxH"` centimetre dimensions to cubic metres.
///
/// Returns `0` unless the text holds exactly three numeric tokens.
pub fn parse_volume(dimensions: &str) -> f64 {
    let tokens: Vec<&str> = dimensions
        .split(|c: char| matches!(c, 'x' | 'X' | '×'))
        .map(str::trim)
        .collect();

    if tokens.len() != 3 {
        tracing::debug!("Malformed dimensions '{}': expected 3 parts", dimensions);
        return 0.0;
    }

    let mut product = 1.0;
    for token in tokens {
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => product *= value,
            _ => {
                tracing::debug!("Malformed dimensions '{}': bad part '{}'", dimensions, token);
                return 0.0;
            }
        }
    }

    let cbm = product / CM3_PER_M3;
    if cbm.is_finite() {
        cbm
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_number_strips_noise() {
        assert_eq!(parse_number("₹1,250.50"), 1250.5);
        assert_eq!(parse_number("  42 "), 42.0);
        assert_eq!(parse_number("Qty: 7 pcs"), 7.0);
        assert_eq!(parse_number("1.2.3"), 1.2);
    }

    #[test]
    fn test_parse_number_defaults_to_zero() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("₹ --"), 0.0);
        assert_eq!(parse_number("."), 0.0);
        assert_eq!(parse_number("n/a"), 0.0);
    }

    #[test]
    fn test_parse_volume() {
        assert!(approx(parse_volume("50x40x30"), 0.06));
        assert!(approx(parse_volume("10 x 10 x 10"), 0.001));
        assert!(approx(parse_volume("20X20×20"), 0.008));
    }

    #[test]
    fn test_parse_volume_rejects_malformed() {
        assert_eq!(parse_volume(""), 0.0);
        assert_eq!(parse_volume("50x40"), 0.0);
        assert_eq!(parse_volume("50x40x30x2"), 0.0);
        assert_eq!(parse_volume("50cmx40x30"), 0.0);
        assert_eq!(parse_volume("axbxc"), 0.0);
    }
}
