// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::LedgerError;
use crate::fx::{convert_to_lcy, quantize_money};
use crate::interest;
use crate::ledger::FinancialRecord;
use crate::models::{Currency, Entry, Loan};
use crate::registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Asset,
    Expense,
    Income,
}

impl Family {
    pub fn table(self) -> &'static str {
        match self {
            Family::Asset => "assets",
            Family::Expense => "expenses",
            Family::Income => "income",
        }
    }

    pub fn entity(self) -> &'static str {
        match self {
            Family::Asset => "asset",
            Family::Expense => "expense",
            Family::Income => "income",
        }
    }

    pub fn kinds(self) -> &'static [&'static str] {
        match self {
            Family::Asset => &["liquid", "equity", "investment", "retirement"],
            Family::Expense => &["fixed", "variable", "discretionary"],
            Family::Income => &["earned", "portfolio", "passive"],
        }
    }
}

/// An [`Entry`] bound to the table it persists into.
pub struct FamilyEntry {
    pub family: Family,
    pub entry: Entry,
}

impl FamilyEntry {
    pub fn new(
        family: Family,
        name: String,
        kind: String,
        currency: String,
        amount: Decimal,
        notes: Option<String>,
        created_by: String,
    ) -> Self {
        Self {
            family,
            entry: Entry {
                id: None,
                name,
                kind,
                currency: currency.trim().to_uppercase(),
                amount,
                amount_lcy: Decimal::ZERO,
                notes,
                created_by,
                modified_by: None,
            },
        }
    }

    pub fn load(
        conn: &Connection,
        family: Family,
        id: i64,
    ) -> Result<Option<FamilyEntry>, LedgerError> {
        let sql = format!(
            "SELECT id, name, kind, currency, amount, amount_lcy, notes, created_by, modified_by
             FROM {} WHERE id=?1",
            family.table()
        );
        let raw = conn
            .query_row(&sql, params![id], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, String>(5)?,
                    r.get::<_, Option<String>>(6)?,
                    r.get::<_, String>(7)?,
                    r.get::<_, Option<String>>(8)?,
                ))
            })
            .optional()?;
        let Some((id, name, kind, currency, amount, amount_lcy, notes, created_by, modified_by)) =
            raw
        else {
            return Ok(None);
        };
        Ok(Some(FamilyEntry {
            family,
            entry: Entry {
                id: Some(id),
                name,
                kind,
                currency,
                amount: stored_decimal(&amount, "amount")?,
                amount_lcy: stored_decimal(&amount_lcy, "amount_lcy")?,
                notes,
                created_by,
                modified_by,
            },
        }))
    }

    pub fn delete(
        conn: &Connection,
        family: Family,
        id: i64,
        owner: &str,
    ) -> Result<(), LedgerError> {
        let sql = format!("DELETE FROM {} WHERE id=?1 AND created_by=?2", family.table());
        let removed = conn.execute(&sql, params![id, owner])?;
        if removed == 0 {
            return Err(LedgerError::validation(
                "id",
                format!("{} {} not found for user {}", family.entity(), id, owner),
            ));
        }
        Ok(())
    }
}

impl FinancialRecord for FamilyEntry {
    fn entity(&self) -> &'static str {
        self.family.entity()
    }

    fn id(&self) -> Option<i64> {
        self.entry.id
    }

    fn modified_by(&self) -> Option<&str> {
        self.entry.modified_by.as_deref()
    }

    fn clear_modifier(&mut self) {
        self.entry.modified_by = None;
    }

    fn currency_code(&self) -> &str {
        &self.entry.currency
    }

    fn principal(&self) -> Decimal {
        self.entry.amount
    }

    fn set_principal_lcy(&mut self, value: Decimal) {
        self.entry.amount_lcy = value;
    }

    fn validate(&self, _conn: &Connection) -> Result<(), LedgerError> {
        let e = &self.entry;
        if e.name.trim().is_empty() {
            return Err(LedgerError::validation("name", "a name must be provided"));
        }
        if !self.family.kinds().contains(&e.kind.as_str()) {
            return Err(LedgerError::validation(
                "kind",
                format!(
                    "kind '{}' is not one of {}",
                    e.kind,
                    self.family.kinds().join(", ")
                ),
            ));
        }
        if e.amount < Decimal::ZERO {
            return Err(LedgerError::validation(
                "amount",
                "amount must be a non-negative value",
            ));
        }
        if e.amount_lcy < Decimal::ZERO {
            return Err(LedgerError::validation(
                "amount_lcy",
                "amount_lcy must be a non-negative value",
            ));
        }
        Ok(())
    }

    fn insert(&mut self, conn: &Connection) -> Result<(), LedgerError> {
        let e = &self.entry;
        let sql = format!(
            "INSERT INTO {}(name, kind, currency, amount, amount_lcy, notes, created_by, modified_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL)",
            self.family.table()
        );
        conn.execute(
            &sql,
            params![
                e.name,
                e.kind,
                e.currency,
                e.amount.to_string(),
                e.amount_lcy.to_string(),
                e.notes,
                e.created_by
            ],
        )?;
        self.entry.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    fn update(&self, conn: &Connection) -> Result<(), LedgerError> {
        let e = &self.entry;
        let sql = format!(
            "UPDATE {}
             SET name=?1, kind=?2, currency=?3, amount=?4, amount_lcy=?5, notes=?6,
                 modified_by=?7, modified_at=datetime('now')
             WHERE id=?8",
            self.family.table()
        );
        conn.execute(
            &sql,
            params![
                e.name,
                e.kind,
                e.currency,
                e.amount.to_string(),
                e.amount_lcy.to_string(),
                e.notes,
                e.modified_by,
                e.id
            ],
        )?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct EntryRow {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub amount: String,
    pub currency: String,
    pub amount_lcy: String,
    pub notes: String,
    pub created_by: String,
    pub created_at: String,
    pub modified_by: String,
}

pub fn list_entries(
    conn: &Connection,
    family: Family,
    created_by: Option<&str>,
) -> Result<Vec<EntryRow>, LedgerError> {
    let mut sql = format!(
        "SELECT id, name, kind, amount, currency, amount_lcy, notes, created_by, created_at, modified_by
         FROM {}",
        family.table()
    );
    if created_by.is_some() {
        sql.push_str(" WHERE created_by=?1");
    }
    sql.push_str(" ORDER BY id");
    let map = |r: &rusqlite::Row<'_>| {
        Ok(EntryRow {
            id: r.get(0)?,
            name: r.get(1)?,
            kind: r.get(2)?,
            amount: r.get(3)?,
            currency: r.get(4)?,
            amount_lcy: r.get(5)?,
            notes: r.get::<_, Option<String>>(6)?.unwrap_or_default(),
            created_by: r.get(7)?,
            created_at: r.get(8)?,
            modified_by: r.get::<_, Option<String>>(9)?.unwrap_or_default(),
        })
    };
    let mut stmt = conn.prepare(&sql)?;
    let mut out = Vec::new();
    if let Some(user) = created_by {
        let rows = stmt.query_map(params![user], map)?;
        for row in rows {
            out.push(row?);
        }
    } else {
        let rows = stmt.query_map([], map)?;
        for row in rows {
            out.push(row?);
        }
    }
    Ok(out)
}

impl Loan {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: String,
        reason: String,
        loan_date: NaiveDate,
        repayment_date: NaiveDate,
        currency: String,
        amount_taken: Decimal,
        interest_type: String,
        compound_frequency: Option<u32>,
        interest_rate: Decimal,
        amount_paid: Decimal,
        due_balance: Decimal,
        created_by: String,
    ) -> Self {
        Self {
            id: None,
            source,
            reason,
            loan_date,
            repayment_date,
            currency: currency.trim().to_uppercase(),
            amount_taken,
            amount_taken_lcy: Decimal::ZERO,
            interest_type: interest_type.trim().to_uppercase(),
            compound_frequency,
            interest_rate,
            interest: Decimal::ZERO,
            interest_lcy: Decimal::ZERO,
            amount_repay: Decimal::ZERO,
            amount_repay_lcy: Decimal::ZERO,
            amount_paid,
            amount_paid_lcy: Decimal::ZERO,
            due_balance,
            due_balance_lcy: Decimal::ZERO,
            in_default: false,
            created_by,
            modified_by: None,
        }
    }

    pub fn load(conn: &Connection, id: i64) -> Result<Option<Loan>, LedgerError> {
        let raw = conn
            .query_row(
                "SELECT id, source, reason, loan_date, repayment_date, currency, amount_taken,
                        amount_taken_lcy, interest_type, compound_frequency, interest_rate,
                        interest, interest_lcy, amount_repay, amount_repay_lcy, amount_paid,
                        amount_paid_lcy, due_balance, due_balance_lcy, in_default, created_by,
                        modified_by
                 FROM loans WHERE id=?1",
                params![id],
                |r| {
                    Ok((
                        r.get::<_, i64>(0)?,
                        r.get::<_, String>(1)?,
                        r.get::<_, String>(2)?,
                        r.get::<_, String>(3)?,
                        r.get::<_, String>(4)?,
                        r.get::<_, String>(5)?,
                        r.get::<_, String>(6)?,
                        r.get::<_, String>(7)?,
                        r.get::<_, String>(8)?,
                        r.get::<_, Option<u32>>(9)?,
                        r.get::<_, String>(10)?,
                        r.get::<_, String>(11)?,
                        r.get::<_, String>(12)?,
                        r.get::<_, String>(13)?,
                        r.get::<_, String>(14)?,
                        r.get::<_, String>(15)?,
                        r.get::<_, String>(16)?,
                        r.get::<_, String>(17)?,
                        r.get::<_, String>(18)?,
                        r.get::<_, bool>(19)?,
                        r.get::<_, String>(20)?,
                        r.get::<_, Option<String>>(21)?,
                    ))
                },
            )
            .optional()?;
        let Some(raw) = raw else { return Ok(None) };
        Ok(Some(Loan {
            id: Some(raw.0),
            source: raw.1,
            reason: raw.2,
            loan_date: stored_date(&raw.3, "loan_date")?,
            repayment_date: stored_date(&raw.4, "repayment_date")?,
            currency: raw.5,
            amount_taken: stored_decimal(&raw.6, "amount_taken")?,
            amount_taken_lcy: stored_decimal(&raw.7, "amount_taken_lcy")?,
            interest_type: raw.8,
            compound_frequency: raw.9,
            interest_rate: stored_decimal(&raw.10, "interest_rate")?,
            interest: stored_decimal(&raw.11, "interest")?,
            interest_lcy: stored_decimal(&raw.12, "interest_lcy")?,
            amount_repay: stored_decimal(&raw.13, "amount_repay")?,
            amount_repay_lcy: stored_decimal(&raw.14, "amount_repay_lcy")?,
            amount_paid: stored_decimal(&raw.15, "amount_paid")?,
            amount_paid_lcy: stored_decimal(&raw.16, "amount_paid_lcy")?,
            due_balance: stored_decimal(&raw.17, "due_balance")?,
            due_balance_lcy: stored_decimal(&raw.18, "due_balance_lcy")?,
            in_default: raw.19,
            created_by: raw.20,
            modified_by: raw.21,
        }))
    }

    pub fn delete(conn: &Connection, id: i64, owner: &str) -> Result<(), LedgerError> {
        let removed = conn.execute(
            "DELETE FROM loans WHERE id=?1 AND created_by=?2",
            params![id, owner],
        )?;
        if removed == 0 {
            return Err(LedgerError::validation(
                "id",
                format!("loan {} not found for user {}", id, owner),
            ));
        }
        Ok(())
    }
}

impl FinancialRecord for Loan {
    fn entity(&self) -> &'static str {
        "loan"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn modified_by(&self) -> Option<&str> {
        self.modified_by.as_deref()
    }

    fn clear_modifier(&mut self) {
        self.modified_by = None;
    }

    fn currency_code(&self) -> &str {
        &self.currency
    }

    fn principal(&self) -> Decimal {
        self.amount_taken
    }

    fn set_principal_lcy(&mut self, value: Decimal) {
        self.amount_taken_lcy = value;
    }

    fn derive_extra(
        &mut self,
        conn: &Connection,
        currency: &Currency,
        as_of: NaiveDate,
    ) -> Result<(), LedgerError> {
        if self.interest_type == "COMPOUND" && self.compound_frequency.is_none() {
            return Err(LedgerError::validation(
                "compound_frequency",
                "compound frequency must be specified for compound interest",
            ));
        }
        let interest_type =
            registry::get_interest_type(conn, &self.interest_type)?.ok_or_else(|| {
                LedgerError::validation(
                    "interest_type",
                    format!("interest type {} does not exist", self.interest_type),
                )
            })?;
        let interest = interest::calculate_interest(
            self.amount_taken,
            self.interest_rate,
            &interest_type.code,
            self.loan_date,
            self.repayment_date,
            self.compound_frequency,
        )?;
        self.interest = quantize_money(interest)?;
        self.interest_lcy = quantize_money(convert_to_lcy(conn, self.interest, currency, as_of)?)?;
        self.amount_repay = quantize_money(self.amount_taken + self.interest)?;
        self.amount_repay_lcy =
            quantize_money(convert_to_lcy(conn, self.amount_repay, currency, as_of)?)?;
        self.amount_paid_lcy =
            quantize_money(convert_to_lcy(conn, self.amount_paid, currency, as_of)?)?;
        self.due_balance_lcy =
            quantize_money(convert_to_lcy(conn, self.due_balance, currency, as_of)?)?;
        Ok(())
    }

    fn validate(&self, _conn: &Connection) -> Result<(), LedgerError> {
        if self.source.trim().is_empty() {
            return Err(LedgerError::validation("source", "a source must be provided"));
        }
        if self.reason.trim().is_empty() {
            return Err(LedgerError::validation("reason", "a reason must be provided"));
        }
        if self.amount_taken < Decimal::ZERO {
            return Err(LedgerError::validation(
                "amount_taken",
                "amount must be a non-negative value",
            ));
        }
        if self.amount_paid < Decimal::ZERO || self.due_balance < Decimal::ZERO {
            return Err(LedgerError::validation(
                "amount_paid",
                "paid and due amounts must be non-negative values",
            ));
        }
        if self.interest_rate < Decimal::ZERO || self.interest_rate >= Decimal::ONE_HUNDRED {
            return Err(LedgerError::validation(
                "interest_rate",
                "annual interest rate must be a percentage below 100",
            ));
        }
        if self.repayment_date <= self.loan_date {
            return Err(LedgerError::InvalidDateRange);
        }
        if let Some(0) = self.compound_frequency {
            return Err(LedgerError::validation(
                "compound_frequency",
                "compound frequency must be a positive number of periods per year",
            ));
        }
        Ok(())
    }

    fn insert(&mut self, conn: &Connection) -> Result<(), LedgerError> {
        conn.execute(
            "INSERT INTO loans(source, reason, loan_date, repayment_date, currency, amount_taken,
                               amount_taken_lcy, interest_type, compound_frequency, interest_rate,
                               interest, interest_lcy, amount_repay, amount_repay_lcy, amount_paid,
                               amount_paid_lcy, due_balance, due_balance_lcy, in_default,
                               created_by, modified_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                     ?18, ?19, ?20, NULL)",
            params![
                self.source,
                self.reason,
                self.loan_date.to_string(),
                self.repayment_date.to_string(),
                self.currency,
                self.amount_taken.to_string(),
                self.amount_taken_lcy.to_string(),
                self.interest_type,
                self.compound_frequency,
                self.interest_rate.to_string(),
                self.interest.to_string(),
                self.interest_lcy.to_string(),
                self.amount_repay.to_string(),
                self.amount_repay_lcy.to_string(),
                self.amount_paid.to_string(),
                self.amount_paid_lcy.to_string(),
                self.due_balance.to_string(),
                self.due_balance_lcy.to_string(),
                self.in_default,
                self.created_by
            ],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    fn update(&self, conn: &Connection) -> Result<(), LedgerError> {
        conn.execute(
            "UPDATE loans
             SET source=?1, reason=?2, loan_date=?3, repayment_date=?4, currency=?5,
                 amount_taken=?6, amount_taken_lcy=?7, interest_type=?8, compound_frequency=?9,
                 interest_rate=?10, interest=?11, interest_lcy=?12, amount_repay=?13,
                 amount_repay_lcy=?14, amount_paid=?15, amount_paid_lcy=?16, due_balance=?17,
                 due_balance_lcy=?18, in_default=?19, modified_by=?20, modified_at=datetime('now')
             WHERE id=?21",
            params![
                self.source,
                self.reason,
                self.loan_date.to_string(),
                self.repayment_date.to_string(),
                self.currency,
                self.amount_taken.to_string(),
                self.amount_taken_lcy.to_string(),
                self.interest_type,
                self.compound_frequency,
                self.interest_rate.to_string(),
                self.interest.to_string(),
                self.interest_lcy.to_string(),
                self.amount_repay.to_string(),
                self.amount_repay_lcy.to_string(),
                self.amount_paid.to_string(),
                self.amount_paid_lcy.to_string(),
                self.due_balance.to_string(),
                self.due_balance_lcy.to_string(),
                self.in_default,
                self.modified_by,
                self.id
            ],
        )?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LoanRow {
    pub id: i64,
    pub source: String,
    pub loan_date: String,
    pub repayment_date: String,
    pub currency: String,
    pub amount_taken: String,
    pub amount_taken_lcy: String,
    pub interest_type: String,
    pub interest: String,
    pub amount_repay: String,
    pub due_balance: String,
    pub in_default: bool,
    pub created_by: String,
}

pub fn list_loans(
    conn: &Connection,
    created_by: Option<&str>,
) -> Result<Vec<LoanRow>, LedgerError> {
    let mut sql = String::from(
        "SELECT id, source, loan_date, repayment_date, currency, amount_taken, amount_taken_lcy,
                interest_type, interest, amount_repay, due_balance, in_default, created_by
         FROM loans",
    );
    if created_by.is_some() {
        sql.push_str(" WHERE created_by=?1");
    }
    sql.push_str(" ORDER BY id");
    let map = |r: &rusqlite::Row<'_>| {
        Ok(LoanRow {
            id: r.get(0)?,
            source: r.get(1)?,
            loan_date: r.get(2)?,
            repayment_date: r.get(3)?,
            currency: r.get(4)?,
            amount_taken: r.get(5)?,
            amount_taken_lcy: r.get(6)?,
            interest_type: r.get(7)?,
            interest: r.get(8)?,
            amount_repay: r.get(9)?,
            due_balance: r.get(10)?,
            in_default: r.get(11)?,
            created_by: r.get(12)?,
        })
    };
    let mut stmt = conn.prepare(&sql)?;
    let mut out = Vec::new();
    if let Some(user) = created_by {
        let rows = stmt.query_map(params![user], map)?;
        for row in rows {
            out.push(row?);
        }
    } else {
        let rows = stmt.query_map([], map)?;
        for row in rows {
            out.push(row?);
        }
    }
    Ok(out)
}

/// Flip `in_default` on loans whose repayment date has passed with a balance
/// still owing. The flag write is disjoint from the save pipeline and
/// idempotently recomputable, so the sweep can run at any cadence.
pub fn sweep_defaults(conn: &mut Connection, today: NaiveDate) -> Result<usize, LedgerError> {
    let mut candidates = Vec::new();
    {
        let mut stmt = conn.prepare(
            "SELECT id, due_balance, repayment_date FROM loans WHERE in_default=0",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (id, due_s, date_s) = row?;
            let due = stored_decimal(&due_s, "due_balance")?;
            let repayment = stored_date(&date_s, "repayment_date")?;
            if interest::loan_is_in_default(due, repayment, today) {
                candidates.push(id);
            }
        }
    }
    if candidates.is_empty() {
        return Ok(0);
    }
    let tx = conn.transaction()?;
    for id in &candidates {
        tx.execute("UPDATE loans SET in_default=1 WHERE id=?1", params![id])?;
    }
    tx.commit()?;
    log::info!("marked {} loans as defaulted on {}", candidates.len(), today);
    Ok(candidates.len())
}

fn stored_decimal(s: &str, column: &'static str) -> Result<Decimal, LedgerError> {
    Decimal::from_str_exact(s).map_err(|_| {
        LedgerError::validation(column, format!("invalid stored decimal '{}' in {}", s, column))
    })
}

fn stored_date(s: &str, column: &'static str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        LedgerError::validation(column, format!("invalid stored date '{}' in {}", s, column))
    })
}
