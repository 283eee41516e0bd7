// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};

use crate::errors::LedgerError;

const DEFAULT_COMPOUND_FREQUENCY: u32 = 12;

/// Dispatch to the formula named by the interest-type code.
///
/// `compound_frequency` falls back to monthly compounding when omitted; the
/// save pipeline still demands an explicit value for compound loans before
/// it gets here.
pub fn calculate_interest(
    amount: Decimal,
    rate: Decimal,
    interest_type_code: &str,
    loan_date: NaiveDate,
    repayment_date: NaiveDate,
    compound_frequency: Option<u32>,
) -> Result<Decimal, LedgerError> {
    match interest_type_code {
        "SIMPLE" => calculate_simple_interest(amount, rate, loan_date, repayment_date),
        "COMPOUND" => calculate_compound_interest(
            amount,
            rate,
            loan_date,
            repayment_date,
            compound_frequency.unwrap_or(DEFAULT_COMPOUND_FREQUENCY),
        ),
        other => Err(LedgerError::UnsupportedInterestType(other.to_string())),
    }
}

/// Annual simple interest pro-rated over the actual days elapsed:
/// `amount * (rate/100) * (days/365)`.
pub fn calculate_simple_interest(
    amount: Decimal,
    rate: Decimal,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Decimal, LedgerError> {
    let days = elapsed_days(start_date, end_date)?;
    Ok(amount * (rate / Decimal::ONE_HUNDRED) * (Decimal::from(days) / Decimal::from(365)))
}

/// Compound interest, `A = P(1 + r/n)^(nt)`, with `t` in years of 365 days
/// and `n` compounding periods per year. Returns the interest portion,
/// `A - P`.
pub fn calculate_compound_interest(
    amount: Decimal,
    rate: Decimal,
    start_date: NaiveDate,
    end_date: NaiveDate,
    compounding_frequency: u32,
) -> Result<Decimal, LedgerError> {
    if compounding_frequency == 0 {
        return Err(LedgerError::validation(
            "compound_frequency",
            "compound frequency must be a positive number of periods per year",
        ));
    }
    let days = elapsed_days(start_date, end_date)?;
    let years = Decimal::from(days) / Decimal::from(365);
    let n = Decimal::from(compounding_frequency);
    let growth = (Decimal::ONE + (rate / Decimal::ONE_HUNDRED) / n)
        .checked_powd(n * years)
        .ok_or(LedgerError::QuantizationOverflow(amount))?;
    let amount_due = amount
        .checked_mul(growth)
        .ok_or(LedgerError::QuantizationOverflow(amount))?;
    Ok(amount_due - amount)
}

fn elapsed_days(start_date: NaiveDate, end_date: NaiveDate) -> Result<i64, LedgerError> {
    let days = (end_date - start_date).num_days();
    if days <= 0 {
        return Err(LedgerError::InvalidDateRange);
    }
    Ok(days)
}

/// Predicate consumed by the periodic default sweep: a loan defaults once
/// its repayment date has passed with a balance still owing.
pub fn loan_is_in_default(
    due_balance: Decimal,
    repayment_date: NaiveDate,
    today: NaiveDate,
) -> bool {
    due_balance > Decimal::ZERO && repayment_date <= today
}
