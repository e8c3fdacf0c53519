// Copyright (c) 2025 Soumyadip Sarkar.
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
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.finboard", "Finboard", "finboard"));

/// Environment variable that overrides the database location.
pub const DB_ENV: &str = "FINBOARD_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(p);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        return Ok(path);
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("finboard.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    debug!("Opening database at {}", path.display());
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Creates any missing tables. Safe to run against an existing database.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS user(
        email TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- amounts and dates are TEXT; historical rows may hold values the report skips
    CREATE TABLE IF NOT EXISTS income(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_email TEXT NOT NULL,
        source TEXT NOT NULL,
        amount TEXT,
        date TEXT,
        cadence TEXT NOT NULL DEFAULT 'one-time',
        FOREIGN KEY(user_email) REFERENCES user(email) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_income_user ON income(user_email);

    CREATE TABLE IF NOT EXISTS expense(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_email TEXT NOT NULL,
        category TEXT,
        description TEXT,
        amount TEXT,
        date TEXT,
        cadence TEXT NOT NULL DEFAULT 'one-time',
        FOREIGN KEY(user_email) REFERENCES user(email) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_expense_user ON expense(user_email);

    -- no UNIQUE(user_email, category): repeated rows are summed by the report
    CREATE TABLE IF NOT EXISTS budget(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_email TEXT NOT NULL,
        category TEXT,
        amount TEXT,
        cadence TEXT NOT NULL DEFAULT 'monthly',
        FOREIGN KEY(user_email) REFERENCES user(email) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_budget_user ON budget(user_email);

    CREATE TABLE IF NOT EXISTS user_categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_email TEXT NOT NULL,
        name TEXT NOT NULL,
        UNIQUE(user_email, name),
        FOREIGN KEY(user_email) REFERENCES user(email) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}
