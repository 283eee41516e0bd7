// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{translate_constraint, LedgerError};
use crate::models::ExchangeRate;
use crate::registry;

// rate column precision: 8 digits, 2 fractional
const MIN_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1); // 0.1
const MAX_RATE_INTEGER: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Publish a rate for `rate_date`. One rate per currency per day; rates are
/// quantized half-up to 2 decimal places before they are written.
pub fn publish_rate(
    conn: &Connection,
    code: &str,
    rate: Decimal,
    user: &str,
    rate_date: NaiveDate,
) -> Result<ExchangeRate, LedgerError> {
    let code = code.trim().to_uppercase();
    let currency = registry::get_currency(conn, &code)?.ok_or_else(|| {
        LedgerError::validation("currency", format!("currency {} not found", code))
    })?;
    if currency.is_local {
        return Err(LedgerError::validation(
            "currency",
            "exchange rates cannot be assigned to a local currency",
        ));
    }
    let rate = clean_rate(rate)?;
    conn.execute(
        "INSERT INTO exchange_rates(currency, rate, rate_date, created_by, modified_by)
         VALUES (?1, ?2, ?3, ?4, NULL)",
        params![code, rate.to_string(), rate_date.to_string(), user],
    )
    .map_err(translate_constraint)?;
    let id = conn.last_insert_rowid();
    get_rate(conn, id)?.ok_or_else(|| {
        LedgerError::validation("currency", format!("rate {} vanished after insert", id))
    })
}

pub fn update_rate(
    conn: &Connection,
    id: i64,
    rate: Decimal,
    modifier: Option<&str>,
) -> Result<(), LedgerError> {
    let Some(modifier) = modifier else {
        return Err(LedgerError::ModifierRequired);
    };
    let rate = clean_rate(rate)?;
    let changed = conn.execute(
        "UPDATE exchange_rates
         SET rate=?1, modified_by=?2, modified_at=datetime('now')
         WHERE id=?3",
        params![rate.to_string(), modifier, id],
    )?;
    if changed == 0 {
        return Err(LedgerError::validation(
            "currency",
            format!("exchange rate {} not found", id),
        ));
    }
    Ok(())
}

fn clean_rate(rate: Decimal) -> Result<Decimal, LedgerError> {
    if rate < MIN_RATE {
        return Err(LedgerError::validation(
            "rate",
            "rate must be at least 0.1",
        ));
    }
    let rate = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rate >= MAX_RATE_INTEGER {
        return Err(LedgerError::validation(
            "rate",
            "rate does not fit the precision of 8 digits",
        ));
    }
    Ok(rate)
}

pub fn delete_rate(conn: &Connection, id: i64) -> Result<(), LedgerError> {
    let removed = conn.execute("DELETE FROM exchange_rates WHERE id=?1", params![id])?;
    if removed == 0 {
        return Err(LedgerError::validation(
            "currency",
            format!("exchange rate {} not found", id),
        ));
    }
    Ok(())
}

/// Applicable rate for a conversion on `as_of`: the most recent rate whose
/// day is on or before that date.
pub fn rate_on_or_before(
    conn: &Connection,
    code: &str,
    as_of: NaiveDate,
) -> Result<Option<Decimal>, LedgerError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT rate FROM exchange_rates
             WHERE currency=?1 AND rate_date<=?2
             ORDER BY rate_date DESC LIMIT 1",
            params![code, as_of.to_string()],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => {
            let rate = Decimal::from_str_exact(&s).map_err(|_| {
                LedgerError::validation("rate", format!("invalid stored rate '{}' for {}", s, code))
            })?;
            Ok(Some(rate))
        }
        None => Ok(None),
    }
}

pub fn get_rate(conn: &Connection, id: i64) -> Result<Option<ExchangeRate>, LedgerError> {
    let row = conn
        .query_row(
            "SELECT id, currency, rate, rate_date, created_by, created_at, modified_by
             FROM exchange_rates WHERE id=?1",
            params![id],
            map_rate_row,
        )
        .optional()?;
    match row {
        Some(row) => Ok(Some(finish_rate_row(row)?)),
        None => Ok(None),
    }
}

pub fn list_rates(
    conn: &Connection,
    created_by: Option<&str>,
    limit: usize,
) -> Result<Vec<ExchangeRate>, LedgerError> {
    let mut out = Vec::new();
    if let Some(user) = created_by {
        let mut stmt = conn.prepare(
            "SELECT id, currency, rate, rate_date, created_by, created_at, modified_by
             FROM exchange_rates WHERE created_by=?1
             ORDER BY rate_date DESC, currency LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user, limit as i64], map_rate_row)?;
        for row in rows {
            out.push(finish_rate_row(row?)?);
        }
    } else {
        let mut stmt = conn.prepare(
            "SELECT id, currency, rate, rate_date, created_by, created_at, modified_by
             FROM exchange_rates ORDER BY rate_date DESC, currency LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], map_rate_row)?;
        for row in rows {
            out.push(finish_rate_row(row?)?);
        }
    }
    Ok(out)
}

type RawRateRow = (i64, String, String, String, String, String, Option<String>);

fn map_rate_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawRateRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
    ))
}

fn finish_rate_row(raw: RawRateRow) -> Result<ExchangeRate, LedgerError> {
    let (id, currency, rate_s, date_s, created_by, created_at, modified_by) = raw;
    let rate = Decimal::from_str_exact(&rate_s).map_err(|_| {
        LedgerError::validation(
            "rate",
            format!("invalid stored rate '{}' for {}", rate_s, currency),
        )
    })?;
    let rate_date = NaiveDate::parse_from_str(&date_s, "%Y-%m-%d").map_err(|_| {
        LedgerError::validation(
            "currency",
            format!("invalid stored rate date '{}' for {}", date_s, currency),
        )
    })?;
    Ok(ExchangeRate {
        id,
        currency,
        rate,
        rate_date,
        created_by,
        created_at,
        modified_by,
    })
}
