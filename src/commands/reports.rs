// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::report::{Report, budget_vs_actual, build_report};
use crate::store;
use crate::utils::{
    fmt_money, get_currency, maybe_print_json, pretty_table, print_table_or_placeholder,
    resolve_user,
};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rusqlite::Connection;
use tracing::{info, warn};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("income-trend", sub)) => income_trend(conn, sub)?,
        Some(("spend-by-category", sub)) => spend_by_category(conn, sub)?,
        Some(("budget-vs-actual", sub)) => budget_vs_actual_view(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Reads the user's rows and builds a fresh report. Skipped rows are logged as warnings.
pub fn load_report(conn: &Connection, user: &str) -> Result<Report> {
    let income = store::list_income(conn, user).context("Failed to load income")?;
    let expense = store::list_expense(conn, user).context("Failed to load expenses")?;
    let budget = store::list_budgets(conn, user).context("Failed to load budgets")?;
    let report = build_report(&income, &expense, &budget);
    for w in &report.warnings {
        warn!("{}", w);
    }
    info!(
        "Report for {}: {} months, {} spending categories, {} budget categories",
        user,
        report.payload.monthly_income.len(),
        report.payload.expenses_by_category.len(),
        report.payload.budgets.by_category.len()
    );
    Ok(report)
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let report = load_report(conn, &user)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let p = &report.payload;
    if p.is_empty() {
        println!("No data");
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    println!(
        "{}",
        pretty_table(
            &["Income", "Expenses", "Net", "Budgeted"],
            vec![vec![
                fmt_money(&p.totals.income, &ccy),
                fmt_money(&p.totals.expenses, &ccy),
                fmt_money(&p.totals.net, &ccy),
                fmt_money(&p.budgets.total, &ccy),
            ]],
        )
    );
    print_table_or_placeholder(
        &["Month", "Income"],
        p.monthly_income
            .iter()
            .map(|m| vec![m.year_month.to_string(), fmt_money(&m.total, &ccy)])
            .collect(),
    );
    print_table_or_placeholder(
        &["Category", "Spent"],
        p.expenses_by_category
            .iter()
            .map(|c| vec![c.category.clone(), fmt_money(&c.total, &ccy)])
            .collect(),
    );
    print_table_or_placeholder(
        &["Category", "Budget"],
        p.budgets
            .by_category
            .iter()
            .map(|c| vec![c.category.clone(), fmt_money(&c.total, &ccy)])
            .collect(),
    );
    if !report.warnings.is_empty() {
        eprintln!("{} row(s) need attention; run `finboard doctor`", report.warnings.len());
    }
    Ok(())
}

fn income_trend(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);
    let report = load_report(conn, &user)?;
    let data = report.payload.recent_months(months);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    print_table_or_placeholder(
        &["Month", "Income"],
        data.iter()
            .map(|m| vec![m.year_month.to_string(), fmt_money(&m.total, &ccy)])
            .collect(),
    );
    Ok(())
}

fn spend_by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let report = load_report(conn, &user)?;
    let data = &report.payload.expenses_by_category;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), data)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let total = report.payload.totals.expenses;
    let rows = data
        .iter()
        .map(|c| {
            let share = if total.is_zero() {
                Decimal::ZERO
            } else {
                match c.total.checked_mul(Decimal::ONE_HUNDRED) {
                    Some(scaled) => scaled / total,
                    None => c.total / total * Decimal::ONE_HUNDRED,
                }
            };
            vec![
                c.category.clone(),
                fmt_money(&c.total, &ccy),
                format!("{:.1}%", share),
            ]
        })
        .collect();
    print_table_or_placeholder(&["Category", "Spent", "Share"], rows);
    Ok(())
}

fn budget_vs_actual_view(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let report = load_report(conn, &user)?;
    let data = budget_vs_actual(
        &report.payload.expenses_by_category,
        &report.payload.budgets.by_category,
    );
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = data
        .into_iter()
        .map(|c| {
            vec![
                c.category,
                fmt_money(&c.budgeted, &ccy),
                fmt_money(&c.spent, &ccy),
                fmt_money(&c.remaining, &ccy),
            ]
        })
        .collect();
    print_table_or_placeholder(&["Category", "Budget", "Spent", "Remaining"], rows);
    Ok(())
}
