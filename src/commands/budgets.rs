// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::expenses::check_category;
use crate::models::Cadence;
use crate::store::{self, NewBudget};
use crate::utils::{
    fmt_money, get_currency, maybe_print_json, parse_amount, print_table_or_placeholder,
    resolve_user,
};
use anyhow::{Result, bail};
use rust_decimal::Decimal;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    check_category(conn, &user, &category)?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let cadence: Cadence = sub.get_one::<String>("cadence").unwrap().parse()?;

    store::insert_budget(
        conn,
        &user,
        &NewBudget {
            category: category.clone(),
            amount,
            cadence,
        },
    )?;

    let ccy = get_currency(conn)?;
    let rows: Vec<_> = store::list_budgets(conn, &user)?
        .into_iter()
        .filter(|b| b.category.as_deref() == Some(category.as_str()))
        .collect();
    if rows.len() > 1 {
        let total = rows
            .iter()
            .filter_map(|b| b.amount)
            .fold(Decimal::ZERO, |acc, a| acc + a);
        info!("{} budget rows for '{}'", rows.len(), category);
        println!(
            "Budget added for {}: {} (now {} across {} rows)",
            category,
            fmt_money(&amount, &ccy),
            fmt_money(&total, &ccy),
            rows.len()
        );
    } else {
        println!("Budget set for {}: {}", category, fmt_money(&amount, &ccy));
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let mut data = store::list_budgets(conn, &user)?;
    data.sort_by(|a, b| a.category.cmp(&b.category).then(a.id.cmp(&b.id)));
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = data
        .into_iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.category.unwrap_or_default(),
                b.amount
                    .map(|a| fmt_money(&a, &ccy))
                    .unwrap_or_else(|| "?".into()),
                b.cadence.to_string(),
            ]
        })
        .collect();
    print_table_or_placeholder(&["ID", "Category", "Amount", "Cadence"], rows);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    if !store::delete_row(conn, "budget", &user, id)? {
        bail!("Budget #{} not found", id);
    }
    println!("Deleted budget #{}", id);
    Ok(())
}
