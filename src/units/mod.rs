/*
 * Conversion between on-chain base units and decimal display strings
 */

use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::{BaseSwapError, Result};

/// Basis points in 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Parses a non-negative decimal numeral into base units of a token with
/// `decimals` fractional digits.
///
/// Rejects signs, exponents, empty input, more than `decimals` fractional
/// digits and values that do not fit into 256 bits.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(BaseSwapError::InvalidAmount(format!("not a number: {amount:?}")));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BaseSwapError::InvalidAmount(format!(
            "not a non-negative decimal numeral: {amount:?}"
        )));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(BaseSwapError::InvalidAmount(format!(
            "{amount} has {} fractional digits, token supports {decimals}",
            fraction.len()
        )));
    }

    let mut digits = String::with_capacity(whole.len() + usize::from(decimals));
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(usize::from(decimals) - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits)
        .map_err(|e| BaseSwapError::InvalidAmount(format!("{amount} is out of range: {e:?}")))
}

/// Formats base units with exactly `decimals` fractional digits.
#[must_use]
pub fn from_base_units(raw: U256, decimals: u8) -> String {
    let decimals = usize::from(decimals);
    let digits = raw.to_string();
    if decimals == 0 {
        return digits;
    }
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let split = padded.len() - decimals;
    format!("{}.{}", &padded[..split], &padded[split..])
}

/// Formats base units rounded half-up to `places` fractional digits.
#[must_use]
pub fn format_fixed(raw: U256, decimals: u8, places: u8) -> String {
    if places >= decimals {
        let mut formatted = from_base_units(raw, decimals);
        if decimals == 0 && places > 0 {
            formatted.push('.');
        }
        formatted.extend(std::iter::repeat('0').take(usize::from(places - decimals)));
        return formatted;
    }

    let drop = decimals - places;
    let rounded = match U256::from(10u8).checked_pow(U256::from(drop)) {
        Some(scale) => {
            let half = scale / 2;
            match raw.checked_add(half) {
                Some(biased) => biased / scale,
                None => raw / scale + U256::from(u8::from(raw % scale >= half)),
            }
        }
        None => U256::zero(),
    };
    from_base_units(rounded, places)
}

/// Formats a basis-point fee as a percentage with two places (`30` -> `0.30%`).
#[must_use]
pub fn format_basis_points(bps: U256) -> String {
    format!("{}%", from_base_units(bps, 2))
}

/// Shortens an address to its first and last `chars` hex digits,
/// `0x1234...abcd` for `chars == 4`. Widths of 20 or more return the full address.
#[must_use]
pub fn truncate_address(address: &Address, chars: usize) -> String {
    let full = format!("{address:?}");
    let digits = &full[2..];
    if chars >= digits.len() / 2 {
        return full;
    }
    format!("0x{}...{}", &digits[..chars], &digits[digits.len() - chars..])
}

/// Parses a slippage percentage (`"0.5"`) into basis points.
pub fn parse_slippage_bps(percent: &str) -> Result<u32> {
    let value = Decimal::from_str(percent.trim())
        .map_err(|e| BaseSwapError::InvalidAmount(format!("invalid slippage {percent:?}: {e}")))?;
    if value.is_sign_negative() || value >= Decimal::from(100) {
        return Err(BaseSwapError::InvalidAmount(format!(
            "slippage must be within [0, 100), got {percent}"
        )));
    }
    let bps = value * Decimal::from(100);
    if bps.fract() != Decimal::ZERO {
        return Err(BaseSwapError::InvalidAmount(format!(
            "slippage {percent} is finer than one basis point"
        )));
    }
    u32::try_from(bps.mantissa() / 10_i128.pow(bps.scale()))
        .map_err(|e| BaseSwapError::InvalidAmount(format!("invalid slippage {percent}: {e}")))
}

/// Minimum acceptable output for `amount` under a slippage tolerance, rounded down.
#[must_use]
pub fn apply_slippage(amount: U256, slippage_bps: u32) -> U256 {
    let keep = BPS_DENOMINATOR.saturating_sub(slippage_bps);
    match amount.checked_mul(U256::from(keep)) {
        Some(scaled) => scaled / U256::from(BPS_DENOMINATOR),
        None => amount / U256::from(BPS_DENOMINATOR) * U256::from(keep),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(to_base_units("1", 6).unwrap(), U256::from(1_000_000));
        assert_eq!(to_base_units("1.5", 6).unwrap(), U256::from(1_500_000));
        assert_eq!(to_base_units(".5", 6).unwrap(), U256::from(500_000));
        assert_eq!(to_base_units("2.", 6).unwrap(), U256::from(2_000_000));
        assert_eq!(to_base_units("0.000001", 6).unwrap(), U256::one());
        assert_eq!(to_base_units("12.345678", 6).unwrap(), U256::from(12_345_678));
        assert_eq!(to_base_units("0", 18).unwrap(), U256::zero());
        assert_eq!(to_base_units("1", 18).unwrap(), U256::exp10(18));
    }

    #[test]
    fn rejects_excess_precision() {
        assert!(matches!(
            to_base_units("12.3456789", 6),
            Err(BaseSwapError::InvalidAmount(_))
        ));
        assert!(matches!(to_base_units("1.5", 0), Err(BaseSwapError::InvalidAmount(_))));
    }

    #[test]
    fn rejects_malformed_numerals() {
        for input in ["", ".", "-1", "+1", "1e5", "abc", "1.2.3", "1,5", " "] {
            assert!(
                matches!(to_base_units(input, 6), Err(BaseSwapError::InvalidAmount(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_values_beyond_256_bits() {
        let too_big = format!("{}0", U256::MAX);
        assert!(matches!(to_base_units(&too_big, 0), Err(BaseSwapError::InvalidAmount(_))));
        assert_eq!(to_base_units(&U256::MAX.to_string(), 0).unwrap(), U256::MAX);
    }

    #[test]
    fn formats_with_exact_fraction_digits() {
        assert_eq!(from_base_units(U256::from(1_500_000), 6), "1.500000");
        assert_eq!(from_base_units(U256::one(), 6), "0.000001");
        assert_eq!(from_base_units(U256::zero(), 6), "0.000000");
        assert_eq!(from_base_units(U256::from(42), 0), "42");
        assert_eq!(from_base_units(U256::exp10(18), 18), "1.000000000000000000");
    }

    #[test]
    fn base_units_round_trip() {
        let samples = [
            U256::zero(),
            U256::one(),
            U256::from(999_999),
            U256::from(123_456_789_012u64),
            U256::exp10(30),
            U256::MAX,
        ];
        for decimals in [0u8, 1, 6, 18, 40, 77, 90] {
            for x in samples {
                let text = from_base_units(x, decimals);
                assert_eq!(to_base_units(&text, decimals).unwrap(), x, "{text} at {decimals}");
            }
        }
    }

    #[test]
    fn parse_then_format_preserves_value() {
        assert_eq!(from_base_units(to_base_units("3.14", 6).unwrap(), 6), "3.140000");
        assert_eq!(from_base_units(to_base_units("007", 2).unwrap(), 2), "7.00");
    }

    #[test]
    fn fixed_formatting_rounds_half_up() {
        assert_eq!(format_fixed(U256::from(1_234_567), 6, 2), "1.23");
        assert_eq!(format_fixed(U256::from(1_235_000), 6, 2), "1.24");
        assert_eq!(format_fixed(U256::from(999_999), 6, 4), "1.0000");
        assert_eq!(format_fixed(U256::from(5), 0, 2), "5.00");
        assert_eq!(format_fixed(U256::from(15), 1, 3), "1.500");
        assert!(!format_fixed(U256::MAX, 18, 0).contains('.'));
    }

    #[test]
    fn formats_fee_percentages() {
        assert_eq!(format_basis_points(U256::from(30)), "0.30%");
        assert_eq!(format_basis_points(U256::from(250)), "2.50%");
    }

    #[test]
    fn truncates_addresses() {
        let address = Address::from_str("0xA9f2C892DB67585ce6B3BC519F1B69c6B42B2937").unwrap();
        assert_eq!(truncate_address(&address, 4), "0xa9f2...2937");
        assert_eq!(truncate_address(&address, 6), "0xa9f2c8...2b2937");
        assert_eq!(truncate_address(&address, 20).len(), 42);
    }

    #[test]
    fn slippage_parsing_and_application() {
        assert_eq!(parse_slippage_bps("0.5").unwrap(), 50);
        assert_eq!(parse_slippage_bps("1.0").unwrap(), 100);
        assert_eq!(parse_slippage_bps("3").unwrap(), 300);
        assert!(parse_slippage_bps("-1").is_err());
        assert!(parse_slippage_bps("100").is_err());
        assert!(parse_slippage_bps("0.001").is_err());

        assert_eq!(apply_slippage(U256::from(1_000_000), 50), U256::from(995_000));
        assert_eq!(apply_slippage(U256::from(1_000), 0), U256::from(1_000));
        assert_eq!(apply_slippage(U256::MAX, 100), U256::MAX / 10_000 * 9_900);
    }
}
