// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Cadence;
use crate::report::{build_report, parse_record_date};
use crate::store;
use crate::utils::{pretty_table, resolve_user};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, m)?;
    let rows = find_issues(conn, &user)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Rows of `user` that reports skip or only partly use, as `[issue, detail]` pairs.
pub fn find_issues(conn: &Connection, user: &str) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    let income = store::list_income(conn, user)?;
    let expense = store::list_expense(conn, user)?;
    let budget = store::list_budgets(conn, user)?;

    // 1) Rows the report engine warns about
    for w in build_report(&income, &expense, &budget).warnings {
        let issue = if w.skipped() {
            "skipped_by_report"
        } else {
            "excluded_from_trend"
        };
        rows.push(vec![issue.into(), w.to_string()]);
    }

    // 2) Expense dates that do not parse; they still count toward totals
    for e in &expense {
        if let Some(d) = e.date.as_deref().filter(|d| !d.trim().is_empty()) {
            if parse_record_date(d).is_none() {
                rows.push(vec!["bad_date".into(), format!("expense #{}: '{}'", e.id, d)]);
            }
        }
    }

    // 3) Expenses and budgets filed under a category the user no longer has
    let categorized = expense
        .iter()
        .map(|e| ("expense", e.id, e.category.as_deref()))
        .chain(budget.iter().map(|b| ("budget", b.id, b.category.as_deref())));
    for (table, id, category) in categorized {
        if let Some(cat) = category.filter(|c| !c.trim().is_empty()) {
            if !store::is_known_category(conn, user, cat)? {
                rows.push(vec![
                    "unknown_category".into(),
                    format!("{} #{}: '{}'", table, id, cat),
                ]);
            }
        }
    }

    // 4) Cadence text that is not one of the known tags
    for table in ["income", "expense", "budget"] {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, cadence FROM {} WHERE user_email=?1 ORDER BY id",
            table
        ))?;
        let mut cur = stmt.query(params![user])?;
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let cadence = store::text_at(r, 1)?.unwrap_or_default();
            if cadence.parse::<Cadence>().is_err() {
                rows.push(vec![
                    "unknown_cadence".into(),
                    format!("{} #{}: '{}'", table, id, cadence),
                ]);
            }
        }
    }

    Ok(rows)
}
