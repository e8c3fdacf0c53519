// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::reports::load_report;
use crate::store;
use crate::utils::resolve_user;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("report", sub)) => export_report(conn, sub),
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let out = sub.get_one::<String>("out").unwrap().trim();
    let report = load_report(conn, &user)?;
    std::fs::write(out, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Write {}", out))?;
    println!("Exported report to {}", out);
    Ok(())
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let kind = sub.get_one::<String>("kind").unwrap().as_str();
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();

    match (kind, fmt.as_str()) {
        ("income", "json") => write_json(out, &store::list_income(conn, &user)?)?,
        ("expense", "json") => write_json(out, &store::list_expense(conn, &user)?)?,
        ("income", "csv") => write_csv(
            out,
            &["id", "date", "source", "amount", "cadence"],
            store::list_income(conn, &user)?.into_iter().map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.unwrap_or_default(),
                    r.source,
                    r.amount.map(|a| a.to_string()).unwrap_or_default(),
                    r.cadence.to_string(),
                ]
            }),
        )?,
        ("expense", "csv") => write_csv(
            out,
            &["id", "date", "category", "description", "amount", "cadence"],
            store::list_expense(conn, &user)?.into_iter().map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.unwrap_or_default(),
                    r.category.unwrap_or_default(),
                    r.description.unwrap_or_default(),
                    r.amount.map(|a| a.to_string()).unwrap_or_default(),
                    r.cadence.to_string(),
                ]
            }),
        )?,
        (_, "csv" | "json") => bail!("Unknown kind: {} (use income|expense)", kind),
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} rows to {}", kind, out);
    Ok(())
}

/// Records keep their types in JSON: numeric ids, string amounts, `null` for missing cells.
fn write_json<T: Serialize>(out: &str, rows: &[T]) -> Result<()> {
    std::fs::write(out, serde_json::to_string_pretty(rows)?)
        .with_context(|| format!("Write {}", out))
}

fn write_csv(
    out: &str,
    headers: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
