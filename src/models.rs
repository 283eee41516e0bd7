// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub description: String,
    pub is_local: bool,
    pub created_by: String,
    pub created_at: String,
    pub modified_by: Option<String>,
    pub modified_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub id: i64,
    pub currency: String,
    pub rate: Decimal,
    pub rate_date: NaiveDate,
    pub created_by: String,
    pub created_at: String,
    pub modified_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestType {
    pub code: String,
    pub description: String,
    pub created_by: String,
    pub created_at: String,
    pub modified_by: Option<String>,
}

/// One row of the asset/expense/income families. The family decides the
/// backing table and the admissible kinds; the save pipeline is shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: Option<i64>,
    pub name: String,
    pub kind: String,
    pub currency: String,
    pub amount: Decimal,
    pub amount_lcy: Decimal,
    pub notes: Option<String>,
    pub created_by: String,
    pub modified_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: Option<i64>,
    pub source: String,
    pub reason: String,
    pub loan_date: NaiveDate,
    pub repayment_date: NaiveDate,
    pub currency: String,
    pub amount_taken: Decimal,
    pub amount_taken_lcy: Decimal,
    pub interest_type: String,
    pub compound_frequency: Option<u32>,
    pub interest_rate: Decimal,
    pub interest: Decimal,
    pub interest_lcy: Decimal,
    pub amount_repay: Decimal,
    pub amount_repay_lcy: Decimal,
    pub amount_paid: Decimal,
    pub amount_paid_lcy: Decimal,
    pub due_balance: Decimal,
    pub due_balance_lcy: Decimal,
    pub in_default: bool,
    pub created_by: String,
    pub modified_by: Option<String>,
}
