// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    chrono::NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

/// Parses a money value as typed by a person: `1200`, `1,200.50`, `$1,200.50`, `-$5`.
pub fn parse_money(s: &str) -> Result<Decimal> {
    let trimmed = s.trim();
    let (neg, rest) = match trimmed.strip_prefix('-') {
        Some(r) => (true, r.trim_start()),
        None => (false, trimmed),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    let digits: String = rest.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || digits.starts_with('-') || digits.starts_with('+') {
        bail!("Invalid amount '{}'", s);
    }
    let v = digits
        .parse::<Decimal>()
        .map_err(|e| anyhow!("Invalid amount '{}': {}", s, e))?;
    Ok(if neg { -v } else { v })
}

/// Like [`parse_money`] but rejects negative values; income, expenses and
/// budgets are all entered as magnitudes.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let v = parse_money(s)?;
    if v.is_sign_negative() && !v.is_zero() {
        bail!("Amount '{}' must not be negative", s.trim());
    }
    Ok(v)
}

/// Formats money with two decimals and thousands separators, e.g. `USD 1,234.50`.
pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    let rounded = format!("{:.2}", d.round_dp(2).abs());
    let (int_part, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if d.is_sign_negative() && !d.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{} {}.{}", sign, ccy, grouped, frac)
}

pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Prints a table, or a "No data" placeholder when there is nothing to show.
pub fn print_table_or_placeholder(headers: &[&str], rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        println!("No data");
    } else {
        println!("{}", pretty_table(headers, rows));
    }
}

// Settings

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "currency")?.unwrap_or_else(|| "USD".to_string()))
}

/// The user a command acts for: `--user` when given, else the configured default.
pub fn resolve_user(conn: &Connection, sub: &clap::ArgMatches) -> Result<String> {
    let explicit = sub
        .try_get_one::<String>("user")
        .ok()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let user = match explicit {
        Some(u) => u,
        None => get_setting(conn, "default_user")?.context(
            "No user given; pass --user <EMAIL> or run `finboard config set-user <EMAIL>`",
        )?,
    };
    crate::store::ensure_user(conn, &user)?;
    Ok(user)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Reads an optional string argument that may not be declared on every subcommand.
pub fn opt_arg(sub: &clap::ArgMatches, id: &str) -> Option<String> {
    sub.try_get_one::<String>(id)
        .ok()
        .flatten()
        .map(|s| s.trim().to_string())
}

/// Reads a flag that may not be declared on every subcommand.
pub fn flag(sub: &clap::ArgMatches, id: &str) -> bool {
    sub.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false)
}
