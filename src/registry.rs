// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use std::time::{Duration, Instant};

use crate::errors::{translate_constraint, LedgerError};
use crate::models::{Currency, InterestType};

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

pub struct NewCurrency {
    pub code: String,
    pub description: String,
    pub is_local: bool,
}

/// Read-through cache for the single local currency, used for display
/// formatting only. Entries go stale after an hour; every registry write
/// invalidates explicitly.
pub struct LocalCurrencyCache {
    entry: Option<(Currency, Instant)>,
}

impl LocalCurrencyCache {
    const MAX_AGE: Duration = Duration::from_secs(3600);

    pub fn new() -> Self {
        Self { entry: None }
    }

    pub fn get(&mut self, conn: &Connection) -> Result<Option<Currency>, LedgerError> {
        if let Some((currency, cached_at)) = &self.entry {
            if cached_at.elapsed() < Self::MAX_AGE {
                return Ok(Some(currency.clone()));
            }
        }
        let fresh = local_currency(conn)?;
        self.entry = fresh.clone().map(|c| (c, Instant::now()));
        Ok(fresh)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl Default for LocalCurrencyCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns currency writes and the local-currency display cache.
pub struct CurrencyRegistry {
    cache: LocalCurrencyCache,
}

impl CurrencyRegistry {
    pub fn new() -> Self {
        Self {
            cache: LocalCurrencyCache::new(),
        }
    }

    pub fn create(
        &mut self,
        conn: &mut Connection,
        new: &NewCurrency,
        user: &str,
    ) -> Result<(), LedgerError> {
        let code = new.code.trim().to_uppercase();
        validate_code(&code)?;
        let description = new.description.trim();
        if description.is_empty() {
            return Err(LedgerError::validation(
                "description",
                "a description must be provided",
            ));
        }
        let tx = conn.transaction()?;
        clean_currency(&tx, &code, new.is_local)?;
        tx.execute(
            "INSERT INTO currencies(code, description, is_local, created_by, modified_by)
             VALUES (?1, ?2, ?3, ?4, NULL)",
            params![code, description, new.is_local, user],
        )
        .map_err(translate_constraint)?;
        tx.commit()?;
        self.cache.invalidate();
        Ok(())
    }

    pub fn update(
        &mut self,
        conn: &mut Connection,
        code: &str,
        description: Option<&str>,
        is_local: Option<bool>,
        modifier: Option<&str>,
    ) -> Result<(), LedgerError> {
        let Some(modifier) = modifier else {
            return Err(LedgerError::ModifierRequired);
        };
        let code = code.trim().to_uppercase();
        let existing = get_currency(conn, &code)?.ok_or_else(|| {
            LedgerError::validation("code", format!("currency {} not found", code))
        })?;
        let description = description
            .map(str::trim)
            .unwrap_or(existing.description.as_str())
            .to_string();
        if description.is_empty() {
            return Err(LedgerError::validation(
                "description",
                "a description must be provided",
            ));
        }
        let is_local = is_local.unwrap_or(existing.is_local);
        let tx = conn.transaction()?;
        clean_currency(&tx, &code, is_local)?;
        tx.execute(
            "UPDATE currencies
             SET description=?1, is_local=?2, modified_by=?3, modified_at=datetime('now')
             WHERE code=?4",
            params![description, is_local, modifier, code],
        )
        .map_err(translate_constraint)?;
        tx.commit()?;
        self.cache.invalidate();
        Ok(())
    }

    pub fn delete(&mut self, conn: &Connection, code: &str) -> Result<(), LedgerError> {
        let code = code.trim().to_uppercase();
        let existing = get_currency(conn, &code)?.ok_or_else(|| {
            LedgerError::validation("code", format!("currency {} not found", code))
        })?;
        if existing.is_local {
            let foreign: i64 = conn.query_row(
                "SELECT COUNT(*) FROM currencies WHERE is_local=0",
                [],
                |r| r.get(0),
            )?;
            if foreign > 0 {
                return Err(LedgerError::validation(
                    "is_local",
                    "cannot delete the local currency while foreign currencies exist",
                ));
            }
        }
        conn.execute("DELETE FROM currencies WHERE code=?1", params![code])
            .map_err(translate_constraint)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Cached local-currency read for display paths.
    pub fn local_display(&mut self, conn: &Connection) -> Result<Option<Currency>, LedgerError> {
        self.cache.get(conn)
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_code(code: &str) -> Result<(), LedgerError> {
    if !CODE_RE.is_match(code) {
        return Err(LedgerError::validation(
            "code",
            format!("currency code '{}' must be 3 uppercase letters", code),
        ));
    }
    Ok(())
}

// Application-level half of the single-local invariant; the partial unique
// index backstops concurrent writers.
fn clean_currency(conn: &Connection, code: &str, is_local: bool) -> Result<(), LedgerError> {
    if is_local {
        let other: Option<String> = conn
            .query_row(
                "SELECT code FROM currencies WHERE is_local=1 AND code != ?1",
                params![code],
                |r| r.get(0),
            )
            .optional()?;
        if other.is_some() {
            return Err(LedgerError::DuplicateLocalCurrency);
        }
    } else {
        let local: Option<String> = conn
            .query_row(
                "SELECT code FROM currencies WHERE is_local=1 AND code != ?1",
                params![code],
                |r| r.get(0),
            )
            .optional()?;
        if local.is_none() {
            return Err(LedgerError::validation(
                "is_local",
                "cannot set this currency as foreign; no local currency exists",
            ));
        }
    }
    Ok(())
}

pub fn get_currency(conn: &Connection, code: &str) -> Result<Option<Currency>, LedgerError> {
    let row = conn
        .query_row(
            "SELECT code, description, is_local, created_by, created_at, modified_by, modified_at
             FROM currencies WHERE code=?1",
            params![code],
            |r| {
                Ok(Currency {
                    code: r.get(0)?,
                    description: r.get(1)?,
                    is_local: r.get(2)?,
                    created_by: r.get(3)?,
                    created_at: r.get(4)?,
                    modified_by: r.get(5)?,
                    modified_at: r.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn currency_exists(conn: &Connection, code: &str) -> Result<bool, LedgerError> {
    Ok(get_currency(conn, code)?.is_some())
}

pub fn local_currency(conn: &Connection) -> Result<Option<Currency>, LedgerError> {
    let code: Option<String> = conn
        .query_row(
            "SELECT code FROM currencies WHERE is_local=1",
            [],
            |r| r.get(0),
        )
        .optional()?;
    match code {
        Some(code) => get_currency(conn, &code),
        None => Ok(None),
    }
}

pub fn list_currencies(
    conn: &Connection,
    created_by: Option<&str>,
) -> Result<Vec<Currency>, LedgerError> {
    let sql = "SELECT code, description, is_local, created_by, created_at, modified_by, modified_at
               FROM currencies";
    let map = |r: &rusqlite::Row<'_>| {
        Ok(Currency {
            code: r.get(0)?,
            description: r.get(1)?,
            is_local: r.get(2)?,
            created_by: r.get(3)?,
            created_at: r.get(4)?,
            modified_by: r.get(5)?,
            modified_at: r.get(6)?,
        })
    };
    let mut out = Vec::new();
    if let Some(user) = created_by {
        let mut stmt = conn.prepare(&format!("{} WHERE created_by=?1 ORDER BY code", sql))?;
        let rows = stmt.query_map(params![user], map)?;
        for row in rows {
            out.push(row?);
        }
    } else {
        let mut stmt = conn.prepare(&format!("{} ORDER BY code", sql))?;
        let rows = stmt.query_map([], map)?;
        for row in rows {
            out.push(row?);
        }
    }
    Ok(out)
}

pub fn create_interest_type(
    conn: &Connection,
    code: &str,
    description: &str,
    user: &str,
) -> Result<(), LedgerError> {
    let code = code.trim().to_uppercase();
    if code.is_empty() || code.len() > 10 {
        return Err(LedgerError::validation(
            "code",
            "interest type code must be 1-10 characters",
        ));
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(LedgerError::validation(
            "description",
            "a description must be provided",
        ));
    }
    conn.execute(
        "INSERT INTO interest_types(code, description, created_by, modified_by)
         VALUES (?1, ?2, ?3, NULL)",
        params![code, description, user],
    )
    .map_err(translate_constraint)?;
    Ok(())
}

pub fn update_interest_type(
    conn: &Connection,
    code: &str,
    description: &str,
    modifier: Option<&str>,
) -> Result<(), LedgerError> {
    let Some(modifier) = modifier else {
        return Err(LedgerError::ModifierRequired);
    };
    let code = code.trim().to_uppercase();
    let changed = conn.execute(
        "UPDATE interest_types
         SET description=?1, modified_by=?2, modified_at=datetime('now')
         WHERE code=?3",
        params![description.trim(), modifier, code],
    )?;
    if changed == 0 {
        return Err(LedgerError::validation(
            "code",
            format!("interest type {} not found", code),
        ));
    }
    Ok(())
}

pub fn delete_interest_type(conn: &Connection, code: &str) -> Result<(), LedgerError> {
    let code = code.trim().to_uppercase();
    let removed = conn
        .execute("DELETE FROM interest_types WHERE code=?1", params![code])
        .map_err(translate_constraint)?;
    if removed == 0 {
        return Err(LedgerError::validation(
            "code",
            format!("interest type {} not found", code),
        ));
    }
    Ok(())
}

pub fn get_interest_type(
    conn: &Connection,
    code: &str,
) -> Result<Option<InterestType>, LedgerError> {
    let row = conn
        .query_row(
            "SELECT code, description, created_by, created_at, modified_by
             FROM interest_types WHERE code=?1",
            params![code],
            |r| {
                Ok(InterestType {
                    code: r.get(0)?,
                    description: r.get(1)?,
                    created_by: r.get(2)?,
                    created_at: r.get(3)?,
                    modified_by: r.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn list_interest_types(conn: &Connection) -> Result<Vec<InterestType>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT code, description, created_by, created_at, modified_by
         FROM interest_types ORDER BY code",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(InterestType {
            code: r.get(0)?,
            description: r.get(1)?,
            created_by: r.get(2)?,
            created_at: r.get(3)?,
            modified_by: r.get(4)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
