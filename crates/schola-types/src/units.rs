//! Currency unit conversion.
//!
//! Ledger amounts are carried in wei (`u128`). Display conversion to ETH is
//! exact decimal string formatting; nothing here goes through floating point.
//! Values fed back into a transaction must always use the original wei
//! amount, never a re-parsed display string.

use crate::{TypeError, WEI_PER_ETH};

/// Format a wei amount as an exact ETH decimal string.
///
/// Trailing fractional zeros are trimmed: `1_500_000_000_000_000_000` wei
/// renders as `"1.5"`, zero renders as `"0"`.
pub fn format_eth(wei: u128) -> String {
    let whole = wei / WEI_PER_ETH;
    let frac = wei % WEI_PER_ETH;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_digits = format!("{frac:018}");
    let trimmed = frac_digits.trim_end_matches('0');
    format!("{whole}.{trimmed}")
}

/// Parse an ETH decimal string into wei, exactly.
///
/// Accepts an optional fractional part of at most 18 digits. Anything else
/// (empty input, signs, exponents, overflow) is an [`TypeError::InvalidAmount`].
pub fn parse_eth(s: &str) -> crate::Result<u128> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TypeError::InvalidAmount("empty amount".to_string()));
    }

    let (whole_part, frac_part) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole_part.is_empty() && frac_part.is_empty() {
        return Err(TypeError::InvalidAmount(s.to_string()));
    }
    if frac_part.len() > 18 {
        return Err(TypeError::InvalidAmount(format!(
            "more than 18 fractional digits: {s}"
        )));
    }
    if !whole_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(TypeError::InvalidAmount(s.to_string()));
    }

    let whole: u128 = if whole_part.is_empty() {
        0
    } else {
        whole_part
            .parse()
            .map_err(|_| TypeError::InvalidAmount(s.to_string()))?
    };

    // Right-pad the fraction to 18 digits before parsing.
    let mut frac_digits = frac_part.to_string();
    while frac_digits.len() < 18 {
        frac_digits.push('0');
    }
    let frac: u128 = if frac_part.is_empty() {
        0
    } else {
        frac_digits
            .parse()
            .map_err(|_| TypeError::InvalidAmount(s.to_string()))?
    };

    whole
        .checked_mul(WEI_PER_ETH)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| TypeError::InvalidAmount(format!("amount out of range: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole() {
        assert_eq!(format_eth(0), "0");
        assert_eq!(format_eth(WEI_PER_ETH), "1");
        assert_eq!(format_eth(15 * WEI_PER_ETH), "15");
    }

    #[test]
    fn test_format_fraction_trims_zeros() {
        assert_eq!(format_eth(1_500_000_000_000_000_000), "1.5");
        assert_eq!(format_eth(900_000_000), "0.0000000009");
        assert_eq!(format_eth(1), "0.000000000000000001");
    }

    #[test]
    fn test_parse_roundtrip() {
        for wei in [0u128, 1, 900_000_000, WEI_PER_ETH, 1_500_000_000_000_000_000] {
            assert_eq!(parse_eth(&format_eth(wei)).expect("parse"), wei);
        }
    }

    #[test]
    fn test_parse_fraction_only() {
        assert_eq!(parse_eth(".5").expect("parse"), WEI_PER_ETH / 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_eth("").is_err());
        assert!(parse_eth(".").is_err());
        assert!(parse_eth("-1").is_err());
        assert!(parse_eth("1e18").is_err());
        assert!(parse_eth("1.0000000000000000001").is_err());
    }

    #[test]
    fn test_parse_exactness_beyond_f64() {
        // 1 ETH + 1 wei cannot be represented in an f64; the decimal path must
        // keep it exact.
        let wei = WEI_PER_ETH + 1;
        assert_eq!(parse_eth("1.000000000000000001").expect("parse"), wei);
        assert_eq!(format_eth(wei), "1.000000000000000001");
    }
}
