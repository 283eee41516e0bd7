// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::errors::LedgerError;
use crate::fx::{convert_to_lcy, quantize_money};
use crate::models::Currency;
use crate::registry;

/// A financial record that flows through the shared save pipeline.
///
/// The four families (asset, expense, income, loan) differ only in their
/// principal-amount field and, for loans, a set of extra derived figures
/// supplied through [`FinancialRecord::derive_extra`]. The pipeline owns the
/// conversion and interest arithmetic; record types carry none of it.
pub trait FinancialRecord {
    fn entity(&self) -> &'static str;
    fn id(&self) -> Option<i64>;
    fn modified_by(&self) -> Option<&str>;
    fn clear_modifier(&mut self);
    fn currency_code(&self) -> &str;
    fn principal(&self) -> Decimal;
    fn set_principal_lcy(&mut self, value: Decimal);

    /// Extra derived fields beyond the principal's LCY mirror. Runs inside
    /// the save transaction, after the principal conversion.
    fn derive_extra(
        &mut self,
        conn: &Connection,
        currency: &Currency,
        as_of: NaiveDate,
    ) -> Result<(), LedgerError> {
        let _ = (conn, currency, as_of);
        Ok(())
    }

    /// Full model validation, not merely the fields touched by a change.
    fn validate(&self, conn: &Connection) -> Result<(), LedgerError>;

    fn insert(&mut self, conn: &Connection) -> Result<(), LedgerError>;
    fn update(&self, conn: &Connection) -> Result<(), LedgerError>;
}

/// Save a record, deriving every LCY figure with today's applicable rates.
pub fn save<R: FinancialRecord>(conn: &mut Connection, record: &mut R) -> Result<(), LedgerError> {
    save_as_of(conn, record, Utc::now().date_naive())
}

/// Save pipeline: modifier check, LCY derivation, loan-only interest
/// derivation, full validation, then insert/update, all inside one
/// transaction. A failure at any step unwinds the whole save.
pub fn save_as_of<R: FinancialRecord>(
    conn: &mut Connection,
    record: &mut R,
    as_of: NaiveDate,
) -> Result<(), LedgerError> {
    let is_new = record.id().is_none();
    if !is_new && record.modified_by().is_none() {
        log::error!(
            "rejected {} {:?} update without a modifier",
            record.entity(),
            record.id()
        );
        return Err(LedgerError::ModifierRequired);
    }
    if is_new {
        // hard override, not a default: creates never carry a modifier
        record.clear_modifier();
    }

    let tx = conn.transaction()?;
    match run_pipeline(&tx, record, as_of, is_new) {
        Ok(()) => {
            tx.commit()?;
            Ok(())
        }
        Err(err) => {
            log::error!("error saving {} {:?}: {}", record.entity(), record.id(), err);
            Err(err)
        }
    }
}

fn run_pipeline<R: FinancialRecord>(
    tx: &Connection,
    record: &mut R,
    as_of: NaiveDate,
    is_new: bool,
) -> Result<(), LedgerError> {
    let currency = registry::get_currency(tx, record.currency_code())?.ok_or_else(|| {
        LedgerError::validation(
            "currency",
            format!("currency {} does not exist", record.currency_code()),
        )
    })?;
    let lcy = quantize_money(convert_to_lcy(tx, record.principal(), &currency, as_of)?)?;
    record.set_principal_lcy(lcy);
    record.derive_extra(tx, &currency, as_of)?;
    record.validate(tx)?;
    if is_new {
        record.insert(tx)
    } else {
        record.update(tx)
    }
}
