// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::expenses::check_category;
use crate::models::Cadence;
use crate::store::{self, NewExpense, NewIncome};
use crate::utils::{parse_amount, parse_date, resolve_user};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use rusqlite::Connection;
use tracing::debug;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("income", sub)) => import_income(conn, sub),
        Some(("expense", sub)) => import_expense(conn, sub),
        _ => Ok(()),
    }
}

fn optional_field(rec: &StringRecord, idx: usize) -> Option<String> {
    rec.get(idx)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn cadence_field(rec: &StringRecord, idx: usize, line: u64) -> Result<Cadence> {
    match optional_field(rec, idx) {
        Some(c) => c
            .parse::<Cadence>()
            .with_context(|| format!("Line {}: bad cadence", line)),
        None => Ok(Cadence::OneTime),
    }
}

fn import_income(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut count = 0usize;
    for result in rdr.records() {
        let rec = result?;
        let line = rec.position().map(|p| p.line()).unwrap_or_default();
        let date_raw = rec.get(0).context("date missing")?.trim().to_string();
        let source = rec.get(1).context("source missing")?.trim().to_string();
        let amount_raw = rec.get(2).context("amount missing")?.trim().to_string();

        let date = parse_date(&date_raw).with_context(|| format!("Line {}", line))?;
        let amount = parse_amount(&amount_raw)
            .with_context(|| format!("Line {}: invalid amount for {}", line, source))?;
        if source.is_empty() {
            anyhow::bail!("Line {}: source is empty", line);
        }
        let cadence = cadence_field(&rec, 3, line)?;

        store::insert_income(
            &tx,
            &user,
            &NewIncome {
                source,
                amount,
                date,
                cadence,
            },
        )?;
        count += 1;
    }
    tx.commit()?;
    debug!("Imported {} income rows for {}", count, user);
    println!("Imported {} income rows from {}", count, path);
    Ok(())
}

fn import_expense(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut count = 0usize;
    for result in rdr.records() {
        let rec = result?;
        let line = rec.position().map(|p| p.line()).unwrap_or_default();
        let date_raw = rec.get(0).context("date missing")?.trim().to_string();
        let category = rec.get(1).context("category missing")?.trim().to_string();
        let amount_raw = rec.get(2).context("amount missing")?.trim().to_string();

        let date = parse_date(&date_raw).with_context(|| format!("Line {}", line))?;
        let amount = parse_amount(&amount_raw)
            .with_context(|| format!("Line {}: invalid amount for {}", line, category))?;
        check_category(&tx, &user, &category).with_context(|| format!("Line {}", line))?;
        let description = optional_field(&rec, 3);
        let cadence = cadence_field(&rec, 4, line)?;

        store::insert_expense(
            &tx,
            &user,
            &NewExpense {
                category,
                description,
                amount,
                date,
                cadence,
            },
        )?;
        count += 1;
    }
    tx.commit()?;
    debug!("Imported {} expense rows for {}", count, user);
    println!("Imported {} expense rows from {}", count, path);
    Ok(())
}
