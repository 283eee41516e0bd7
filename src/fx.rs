// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::LedgerError;
use crate::models::Currency;
use crate::rates;

// Monetary columns hold 20 digits with 2 fractional, so the integer part
// caps at 18 digits.
const MONEY_INTEGER_LIMIT: Decimal =
    Decimal::from_parts(0xA764_0000, 0x0DE0_B6B3, 0, false, 0); // 10^18

/// Convert `amount` into its local-currency equivalent.
///
/// The local currency converts to itself; any other currency is multiplied
/// by the applicable rate for `as_of` (the most recent published rate not
/// after that date). A foreign currency without a published rate fails with
/// [`LedgerError::MissingExchangeRate`], which callers surface as a field
/// error on `currency`.
pub fn convert_to_lcy(
    conn: &Connection,
    amount: Decimal,
    currency: &Currency,
    as_of: NaiveDate,
) -> Result<Decimal, LedgerError> {
    if currency.is_local {
        return Ok(amount);
    }
    let Some(rate) = rates::rate_on_or_before(conn, &currency.code, as_of)? else {
        log::error!("missing exchange rate for currency {}", currency.code);
        return Err(LedgerError::MissingExchangeRate(currency.code.clone()));
    };
    amount
        .checked_mul(rate)
        .ok_or(LedgerError::QuantizationOverflow(amount))
}

/// Quantize a monetary value to 2 decimal places, rounding exact halves
/// away from zero. Values whose integer part exceeds 18 digits are rejected
/// rather than truncated.
pub fn quantize_money(value: Decimal) -> Result<Decimal, LedgerError> {
    let q = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if q.abs() >= MONEY_INTEGER_LIMIT {
        return Err(LedgerError::QuantizationOverflow(q));
    }
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn quantize_rounds_halves_away_from_zero() {
        let q = quantize_money(Decimal::from_str("1.005").unwrap()).unwrap();
        assert_eq!(q, Decimal::from_str("1.01").unwrap());
        let q = quantize_money(Decimal::from_str("-1.005").unwrap()).unwrap();
        assert_eq!(q, Decimal::from_str("-1.01").unwrap());
        let q = quantize_money(Decimal::from_str("2.004").unwrap()).unwrap();
        assert_eq!(q, Decimal::from_str("2.00").unwrap());
    }

    #[test]
    fn quantize_rejects_values_beyond_column_precision() {
        let big = Decimal::from_str("1000000000000000000").unwrap(); // 10^18
        assert!(matches!(
            quantize_money(big),
            Err(LedgerError::QuantizationOverflow(_))
        ));
        let fits = Decimal::from_str("999999999999999999.99").unwrap();
        assert_eq!(quantize_money(fits).unwrap(), fits);
    }
}
