// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Cadence, ExpenseRecord};
use crate::store::{self, Changes, NewExpense};
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

/// Fails unless `category` is a default category or one the user added.
pub fn check_category(conn: &Connection, user: &str, category: &str) -> Result<()> {
    if category.is_empty() {
        bail!("Category must not be empty");
    }
    if !store::is_known_category(conn, user, category)? {
        bail!(
            "Unknown category '{}'; add it with `finboard category add --name \"{}\"`",
            category,
            category
        );
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    check_category(conn, &user, &category)?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let description = opt_arg(sub, "description").filter(|s| !s.is_empty());
    let cadence: Cadence = sub.get_one::<String>("cadence").unwrap().parse()?;

    let id = store::insert_expense(
        conn,
        &user,
        &NewExpense {
            category: category.clone(),
            description,
            amount,
            date,
            cadence,
        },
    )?;
    println!(
        "Recorded expense #{}: {} on {} in '{}'",
        id,
        fmt_money(&amount, &get_currency(conn)?),
        date,
        category
    );
    Ok(())
}

/// Expense rows for `user`, newest first, optionally filtered by month and category.
pub fn query_rows(
    conn: &Connection,
    user: &str,
    month: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<ExpenseRecord>> {
    let mut rows = store::list_expense(conn, user)?;
    if let Some(month) = month {
        let month = parse_month(month)?;
        rows.retain(|r| r.date.as_deref().is_some_and(|d| d.starts_with(&month)));
    }
    if let Some(category) = category {
        rows.retain(|r| r.category.as_deref() == Some(category));
    }
    rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    Ok(rows)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let month = opt_arg(sub, "month");
    let category = opt_arg(sub, "category");
    let data = query_rows(conn, &user, month.as_deref(), category.as_deref())?;
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
                r.category.unwrap_or_default(),
                r.description.unwrap_or_default(),
                r.amount
                    .map(|a| fmt_money(&a, &ccy))
                    .unwrap_or_else(|| "?".into()),
                r.cadence.to_string(),
            ]
        })
        .collect();
    print_table_or_placeholder(
        &["ID", "Date", "Category", "Description", "Amount", "Cadence"],
        rows,
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut changes: Changes = Vec::new();
    if let Some(category) = opt_arg(sub, "category") {
        check_category(conn, &user, &category)?;
        changes.push(("category", Some(category)));
    }
    if let Some(description) = opt_arg(sub, "description") {
        // an empty description clears it
        changes.push(("description", Some(description).filter(|d| !d.is_empty())));
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
    if !store::update_row(conn, "expense", &user, id, &changes)? {
        bail!("Expense #{} not found", id);
    }
    println!("Updated expense #{}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    if !store::delete_row(conn, "expense", &user, id)? {
        bail!("Expense #{} not found", id);
    }
    println!("Deleted expense #{}", id);
    Ok(())
}
