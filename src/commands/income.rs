// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Cadence, IncomeRecord};
use crate::store::{self, Changes, NewIncome};
use crate::utils::{
    fmt_money, get_currency, maybe_print_json, opt_arg, parse_amount, parse_date, parse_month,
    print_table_or_placeholder, resolve_user,
};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let source = sub.get_one::<String>("source").unwrap().trim().to_string();
    if source.is_empty() {
        bail!("Income source must not be empty");
    }
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let cadence: Cadence = sub.get_one::<String>("cadence").unwrap().parse()?;

    let id = store::insert_income(
        conn,
        &user,
        &NewIncome {
            source: source.clone(),
            amount,
            date,
            cadence,
        },
    )?;
    println!(
        "Recorded income #{}: {} from '{}' on {} ({})",
        id,
        fmt_money(&amount, &get_currency(conn)?),
        source,
        date,
        cadence
    );
    Ok(())
}

/// Income rows for `user`, newest first, optionally limited to one `YYYY-MM` month.
pub fn query_rows(
    conn: &Connection,
    user: &str,
    month: Option<&str>,
) -> Result<Vec<IncomeRecord>> {
    let mut rows = store::list_income(conn, user)?;
    if let Some(month) = month {
        let month = parse_month(month)?;
        rows.retain(|r| r.date.as_deref().is_some_and(|d| d.starts_with(&month)));
    }
    rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    Ok(rows)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let month = opt_arg(sub, "month");
    let data = query_rows(conn, &user, month.as_deref())?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = data
        .into_iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.date.unwrap_or_default(),
                r.source,
                r.amount
                    .map(|a| fmt_money(&a, &ccy))
                    .unwrap_or_else(|| "?".into()),
                r.cadence.to_string(),
            ]
        })
        .collect();
    print_table_or_placeholder(&["ID", "Date", "Source", "Amount", "Cadence"], rows);
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut changes: Changes = Vec::new();
    if let Some(source) = opt_arg(sub, "source") {
        if source.is_empty() {
            bail!("Income source must not be empty");
        }
        changes.push(("source", Some(source)));
    }
    if let Some(amount) = opt_arg(sub, "amount") {
        changes.push(("amount", Some(parse_amount(&amount)?.to_string())));
    }
    if let Some(date) = opt_arg(sub, "date") {
        changes.push(("date", Some(parse_date(&date)?.to_string())));
    }
    if let Some(cadence) = opt_arg(sub, "cadence") {
        let cadence: Cadence = cadence.parse()?;
        changes.push(("cadence", Some(cadence.to_string())));
    }
    if !store::update_row(conn, "income", &user, id, &changes)? {
        bail!("Income #{} not found", id);
    }
    println!("Updated income #{}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    if !store::delete_row(conn, "income", &user, id)? {
        bail!("Income #{} not found", id);
    }
    println!("Deleted income #{}", id);
    Ok(())
}
