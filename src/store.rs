// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Queries against the transaction store. Every statement is scoped to a
//! single user key.

use crate::models::{
    BudgetRecord, Cadence, DEFAULT_CATEGORIES, ExpenseRecord, IncomeRecord, User,
};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use rust_decimal::Decimal;
use tracing::{debug, warn};

fn stored_amount(value: ValueRef<'_>) -> std::result::Result<Option<Decimal>, String> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(i) => Ok(Some(Decimal::from(i))),
        ValueRef::Real(f) => Decimal::try_from(f).map(Some).map_err(|_| f.to_string()),
        ValueRef::Text(t) => {
            let s = String::from_utf8_lossy(t);
            if s.trim().is_empty() {
                return Ok(None);
            }
            crate::utils::parse_money(&s)
                .map(Some)
                .map_err(|_| s.to_string())
        }
        ValueRef::Blob(_) => Err("<blob>".to_string()),
    }
}

fn amount_at(r: &Row<'_>, idx: usize, table: &str, id: i64) -> Result<Option<Decimal>> {
    match stored_amount(r.get_ref(idx)?) {
        Ok(v) => Ok(v),
        Err(raw) => {
            warn!("{} #{}: stored amount '{}' is not a number", table, id, raw);
            Ok(None)
        }
    }
}

/// Reads a cell as text whatever its storage class; blobs read as `None`.
pub fn text_at(r: &Row<'_>, idx: usize) -> Result<Option<String>> {
    Ok(match r.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Blob(_) => None,
    })
}

fn cadence_at(r: &Row<'_>, idx: usize, table: &str, id: i64) -> Result<Cadence> {
    let raw = text_at(r, idx)?;
    Ok(match raw.as_deref().map(str::parse::<Cadence>) {
        Some(Ok(c)) => c,
        Some(Err(e)) => {
            debug!("{} #{}: {}; treating as one-time", table, id, e);
            Cadence::OneTime
        }
        None => Cadence::OneTime,
    })
}

pub fn list_income(conn: &Connection, user: &str) -> Result<Vec<IncomeRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, source, amount, date, cadence FROM income WHERE user_email=?1 ORDER BY id",
    )?;
    let mut rows = stmt.query(params![user])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        out.push(IncomeRecord {
            id,
            user_key: user.to_string(),
            source: text_at(r, 1)?.unwrap_or_default(),
            amount: amount_at(r, 2, "income", id)?,
            date: text_at(r, 3)?,
            cadence: cadence_at(r, 4, "income", id)?,
        });
    }
    debug!("Loaded {} income rows for {}", out.len(), user);
    Ok(out)
}

pub fn list_expense(conn: &Connection, user: &str) -> Result<Vec<ExpenseRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, description, amount, date, cadence
         FROM expense WHERE user_email=?1 ORDER BY id",
    )?;
    let mut rows = stmt.query(params![user])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        out.push(ExpenseRecord {
            id,
            user_key: user.to_string(),
            category: text_at(r, 1)?,
            description: text_at(r, 2)?.filter(|d| !d.is_empty()),
            amount: amount_at(r, 3, "expense", id)?,
            date: text_at(r, 4)?,
            cadence: cadence_at(r, 5, "expense", id)?,
        });
    }
    debug!("Loaded {} expense rows for {}", out.len(), user);
    Ok(out)
}

pub fn list_budgets(conn: &Connection, user: &str) -> Result<Vec<BudgetRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, amount, cadence FROM budget WHERE user_email=?1 ORDER BY id",
    )?;
    let mut rows = stmt.query(params![user])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        out.push(BudgetRecord {
            id,
            user_key: user.to_string(),
            category: text_at(r, 1)?,
            amount: amount_at(r, 2, "budget", id)?,
            cadence: cadence_at(r, 3, "budget", id)?,
        });
    }
    debug!("Loaded {} budget rows for {}", out.len(), user);
    Ok(out)
}

// Users

pub fn add_user(conn: &Connection, email: &str, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO user(email, name) VALUES (?1, ?2)",
        params![email, name],
    )
    .with_context(|| format!("Could not add user '{}'", email))?;
    Ok(())
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT email, name, created_at FROM user ORDER BY email")?;
    let rows = stmt.query_map([], |r| {
        Ok(User {
            email: r.get(0)?,
            name: r.get(1)?,
            created_at: r.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn user_exists(conn: &Connection, email: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM user WHERE email=?1", params![email], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

pub fn ensure_user(conn: &Connection, email: &str) -> Result<()> {
    if !user_exists(conn, email)? {
        bail!("User '{}' not found", email);
    }
    Ok(())
}

/// Removes a user and, through cascading keys, every row they own.
pub fn remove_user(conn: &Connection, email: &str) -> Result<bool> {
    let n = conn.execute("DELETE FROM user WHERE email=?1", params![email])?;
    Ok(n > 0)
}

// Categories

pub fn add_category(conn: &Connection, user: &str, name: &str) -> Result<()> {
    if DEFAULT_CATEGORIES.contains(&name) {
        bail!("'{}' is already a default category", name);
    }
    conn.execute(
        "INSERT INTO user_categories(user_email, name) VALUES (?1, ?2)",
        params![user, name],
    )
    .with_context(|| format!("Could not add category '{}'", name))?;
    Ok(())
}

pub fn list_custom_categories(conn: &Connection, user: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM user_categories WHERE user_email=?1 ORDER BY name")?;
    let rows = stmt.query_map(params![user], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn remove_category(conn: &Connection, user: &str, name: &str) -> Result<bool> {
    let n = conn.execute(
        "DELETE FROM user_categories WHERE user_email=?1 AND name=?2",
        params![user, name],
    )?;
    Ok(n > 0)
}

/// True for the default categories and for any the user added.
pub fn is_known_category(conn: &Connection, user: &str, name: &str) -> Result<bool> {
    if DEFAULT_CATEGORIES.contains(&name) {
        return Ok(true);
    }
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM user_categories WHERE user_email=?1 AND name=?2",
            params![user, name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

// Writes

#[derive(Debug, Clone)]
pub struct NewIncome {
    pub source: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub cadence: Cadence,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub cadence: Cadence,
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category: String,
    pub amount: Decimal,
    pub cadence: Cadence,
}

pub fn insert_income(conn: &Connection, user: &str, inc: &NewIncome) -> Result<i64> {
    conn.execute(
        "INSERT INTO income(user_email, source, amount, date, cadence) VALUES (?1,?2,?3,?4,?5)",
        params![
            user,
            inc.source,
            inc.amount.to_string(),
            inc.date.to_string(),
            inc.cadence.as_str()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_expense(conn: &Connection, user: &str, exp: &NewExpense) -> Result<i64> {
    conn.execute(
        "INSERT INTO expense(user_email, category, description, amount, date, cadence)
         VALUES (?1,?2,?3,?4,?5,?6)",
        params![
            user,
            exp.category,
            exp.description.as_deref(),
            exp.amount.to_string(),
            exp.date.to_string(),
            exp.cadence.as_str()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Always adds a row; an earlier budget for the same category is kept and summed by the report.
pub fn insert_budget(conn: &Connection, user: &str, b: &NewBudget) -> Result<i64> {
    conn.execute(
        "INSERT INTO budget(user_email, category, amount, cadence) VALUES (?1,?2,?3,?4)",
        params![user, b.category, b.amount.to_string(), b.cadence.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Column assignments for an UPDATE, in `(column, value)` form.
pub type Changes = Vec<(&'static str, Option<String>)>;

/// Applies `changes` to one row owned by `user`. Returns false when no such row exists.
pub fn update_row(
    conn: &Connection,
    table: &str,
    user: &str,
    id: i64,
    changes: &Changes,
) -> Result<bool> {
    if !matches!(table, "income" | "expense" | "budget") {
        bail!("Unknown table '{}'", table);
    }
    if changes.is_empty() {
        bail!("Nothing to update for {} #{}", table, id);
    }
    let assignments: Vec<String> = changes
        .iter()
        .enumerate()
        .map(|(i, (col, _))| format!("{}=?{}", col, i + 1))
        .collect();
    let n = changes.len();
    let sql = format!(
        "UPDATE {} SET {} WHERE id=?{} AND user_email=?{}",
        table,
        assignments.join(", "),
        n + 1,
        n + 2
    );
    let mut values: Vec<&dyn ToSql> = changes.iter().map(|(_, v)| v as &dyn ToSql).collect();
    values.push(&id);
    values.push(&user);
    let updated = conn.execute(&sql, rusqlite::params_from_iter(values))?;
    Ok(updated > 0)
}

pub fn delete_row(conn: &Connection, table: &str, user: &str, id: i64) -> Result<bool> {
    if !matches!(table, "income" | "expense" | "budget") {
        bail!("Unknown table '{}'", table);
    }
    let n = conn.execute(
        &format!("DELETE FROM {} WHERE id=?1 AND user_email=?2", table),
        params![id, user],
    )?;
    Ok(n > 0)
}
