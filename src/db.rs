// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Kitabu", "kitabu"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("kitabu.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    init_schema(&mut conn)?;
    Ok(conn)
}

fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS currencies(
        code TEXT PRIMARY KEY,
        description TEXT NOT NULL,
        is_local INTEGER NOT NULL CHECK(is_local IN (0,1)),
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        modified_by TEXT,
        modified_at TEXT
    );
    -- at most one row may carry is_local = 1
    CREATE UNIQUE INDEX IF NOT EXISTS uq_currencies_local
        ON currencies(is_local) WHERE is_local = 1;

    -- one rate per currency per calendar day
    CREATE TABLE IF NOT EXISTS exchange_rates(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        currency TEXT NOT NULL,
        rate TEXT NOT NULL,
        rate_date TEXT NOT NULL,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        modified_by TEXT,
        modified_at TEXT,
        UNIQUE(currency, rate_date),
        FOREIGN KEY(currency) REFERENCES currencies(code)
    );
    CREATE INDEX IF NOT EXISTS idx_exchange_rates_lookup
        ON exchange_rates(currency, rate_date DESC);

    CREATE TABLE IF NOT EXISTS interest_types(
        code TEXT PRIMARY KEY,
        description TEXT NOT NULL,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        modified_by TEXT,
        modified_at TEXT
    );

    CREATE TABLE IF NOT EXISTS assets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('liquid','equity','investment','retirement')),
        currency TEXT NOT NULL,
        amount TEXT NOT NULL,
        amount_lcy TEXT NOT NULL DEFAULT '0',
        notes TEXT,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        modified_by TEXT,
        modified_at TEXT,
        FOREIGN KEY(currency) REFERENCES currencies(code)
    );

    CREATE TABLE IF NOT EXISTS expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('fixed','variable','discretionary')),
        currency TEXT NOT NULL,
        amount TEXT NOT NULL,
        amount_lcy TEXT NOT NULL DEFAULT '0',
        notes TEXT,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        modified_by TEXT,
        modified_at TEXT,
        FOREIGN KEY(currency) REFERENCES currencies(code)
    );

    CREATE TABLE IF NOT EXISTS income(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('earned','portfolio','passive')),
        currency TEXT NOT NULL,
        amount TEXT NOT NULL,
        amount_lcy TEXT NOT NULL DEFAULT '0',
        notes TEXT,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        modified_by TEXT,
        modified_at TEXT,
        FOREIGN KEY(currency) REFERENCES currencies(code)
    );

    CREATE TABLE IF NOT EXISTS loans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source TEXT NOT NULL,
        reason TEXT NOT NULL,
        loan_date TEXT NOT NULL,
        repayment_date TEXT NOT NULL,
        currency TEXT NOT NULL,
        amount_taken TEXT NOT NULL,
        amount_taken_lcy TEXT NOT NULL DEFAULT '0',
        interest_type TEXT NOT NULL,
        compound_frequency INTEGER,
        interest_rate TEXT NOT NULL,
        interest TEXT NOT NULL DEFAULT '0',
        interest_lcy TEXT NOT NULL DEFAULT '0',
        amount_repay TEXT NOT NULL DEFAULT '0',
        amount_repay_lcy TEXT NOT NULL DEFAULT '0',
        amount_paid TEXT NOT NULL DEFAULT '0',
        amount_paid_lcy TEXT NOT NULL DEFAULT '0',
        due_balance TEXT NOT NULL DEFAULT '0',
        due_balance_lcy TEXT NOT NULL DEFAULT '0',
        in_default INTEGER NOT NULL DEFAULT 0,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        modified_by TEXT,
        modified_at TEXT,
        FOREIGN KEY(currency) REFERENCES currencies(code),
        FOREIGN KEY(interest_type) REFERENCES interest_types(code)
    );
    CREATE INDEX IF NOT EXISTS idx_loans_repayment ON loans(repayment_date);
    "#,
    )?;
    Ok(())
}
