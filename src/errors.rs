// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures raised inside the save pipeline and its collaborators.
///
/// Every variant maps to the form field the surrounding API layer would
/// report it under; see [`LedgerError::field`].
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no exchange rate found for currency {0}")]
    MissingExchangeRate(String),
    #[error("repayment date must be after loan date")]
    InvalidDateRange,
    #[error("invalid interest type: {0}")]
    UnsupportedInterestType(String),
    #[error("modifier must be specified for updating a record")]
    ModifierRequired,
    #[error("only one local currency is allowed")]
    DuplicateLocalCurrency,
    #[error("only one exchange rate per currency per day is allowed")]
    DuplicateDailyRate,
    #[error("{0} does not fit the monetary precision of 20 digits")]
    QuantizationOverflow(Decimal),
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Field key the failure is reported under.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingExchangeRate(_) => Some("currency"),
            Self::InvalidDateRange => Some("repayment_date"),
            Self::UnsupportedInterestType(_) => Some("interest_type"),
            Self::ModifierRequired => Some("modified_by"),
            Self::DuplicateLocalCurrency => Some("is_local"),
            Self::DuplicateDailyRate => Some("currency"),
            Self::QuantizationOverflow(_) => Some("amount"),
            Self::Validation { field, .. } => Some(*field),
            Self::Storage(_) => None,
        }
    }
}

/// Map SQLite uniqueness/foreign-key failures onto domain errors. Races on
/// the unique indexes surface here at commit time rather than silently
/// overwriting.
pub fn translate_constraint(err: rusqlite::Error) -> LedgerError {
    if let rusqlite::Error::SqliteFailure(_, Some(msg)) = &err {
        if msg.contains("uq_currencies_local") {
            return LedgerError::DuplicateLocalCurrency;
        }
        if msg.contains("exchange_rates.currency") && msg.contains("exchange_rates.rate_date") {
            return LedgerError::DuplicateDailyRate;
        }
        if msg.contains("currencies.code") {
            return LedgerError::validation("code", "a currency with this code already exists");
        }
        if msg.contains("interest_types.code") {
            return LedgerError::validation("code", "an interest type with this code already exists");
        }
        if msg.contains("FOREIGN KEY constraint failed") {
            return LedgerError::validation("code", "record is referenced by other rows");
        }
    }
    LedgerError::Storage(err)
}
