// crates/lockstake-token/src/amount.rs
//
// Fixed-point token amounts.
//
// All internal accounting uses integer units to avoid floating-point
// precision issues. Decimal strings ("0.5", "100") are accepted at the
// edges (configuration files, CLI arguments) and rendered back for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places of the token.
pub const DECIMALS: u32 = 18;

/// Number of units in one whole token. 1 token = 10^18 units.
pub const UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// A token amount, stored in the smallest denomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Amount in units (1 token = 10^18 units).
    pub units: u128,
}

/// Error returned when a decimal token string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid token amount {input:?}: {reason}")]
pub struct ParseAmountError {
    pub input: String,
    pub reason: &'static str,
}

impl TokenAmount {
    /// Create an amount from a unit count.
    pub fn from_units(units: u128) -> Self {
        Self { units }
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.units / UNITS_PER_TOKEN;
        let frac = self.units % UNITS_PER_TOKEN;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            // Up to 18 decimal places, trailing zeros trimmed
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{}", whole, trimmed)
        }
    }
}

impl FromStr for TokenAmount {
    type Err = ParseAmountError;

    /// Parse a decimal token string such as `"100"`, `"0.5"` or `"1_000.25"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseAmountError {
            input: s.to_string(),
            reason,
        };
        let cleaned: String = s.trim().chars().filter(|c| *c != '_').collect();
        let (whole_str, frac_str) = match cleaned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (cleaned.as_str(), ""),
        };
        if whole_str.is_empty() && frac_str.is_empty() {
            return Err(err("empty amount"));
        }
        if frac_str.len() > DECIMALS as usize {
            return Err(err("more than 18 decimal places"));
        }
        if !whole_str.chars().chain(frac_str.chars()).all(|c| c.is_ascii_digit()) {
            return Err(err("not a decimal number"));
        }

        let whole: u128 = if whole_str.is_empty() {
            0
        } else {
            whole_str.parse().map_err(|_| err("whole part out of range"))?
        };
        let frac: u128 = if frac_str.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac_str, width = DECIMALS as usize);
            padded.parse().map_err(|_| err("fraction out of range"))?
        };

        whole
            .checked_mul(UNITS_PER_TOKEN)
            .and_then(|w| w.checked_add(frac))
            .map(Self::from_units)
            .ok_or_else(|| err("amount overflows u128"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_per_token() {
        assert_eq!(UNITS_PER_TOKEN, 10u128.pow(DECIMALS));
    }

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!("100".parse::<TokenAmount>().unwrap().units, 100 * UNITS_PER_TOKEN);
        assert_eq!(
            "0.5".parse::<TokenAmount>().unwrap().units,
            UNITS_PER_TOKEN / 2
        );
        assert_eq!(
            "1_000.25".parse::<TokenAmount>().unwrap().units,
            1_000 * UNITS_PER_TOKEN + UNITS_PER_TOKEN / 4
        );
        assert_eq!(".3".parse::<TokenAmount>().unwrap().units, 3 * UNITS_PER_TOKEN / 10);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<TokenAmount>().is_err());
        assert!("abc".parse::<TokenAmount>().is_err());
        assert!("-1".parse::<TokenAmount>().is_err());
        assert!("0.0000000000000000001".parse::<TokenAmount>().is_err());
    }

    #[test]
    fn test_display_whole() {
        assert_eq!(TokenAmount::from_units(42 * UNITS_PER_TOKEN).to_string(), "42");
    }

    #[test]
    fn test_display_fractional() {
        let amount = TokenAmount::from_units(99 * UNITS_PER_TOKEN + 7 * UNITS_PER_TOKEN / 10);
        assert_eq!(amount.to_string(), "99.7");
        assert_eq!(TokenAmount::from_units(1).to_string(), "0.000000000000000001");
    }

    #[test]
    fn test_display_zero() {
        assert_eq!(TokenAmount::default().to_string(), "0");
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let too_big = format!("{}", u128::MAX / UNITS_PER_TOKEN + 1);
        assert!(too_big.parse::<TokenAmount>().is_err());
    }
}
