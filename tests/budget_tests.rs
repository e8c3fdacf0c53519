// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finboard::commands::{budgets, reports};
use finboard::report::budget_vs_actual;
use finboard::{cli, db, store, utils};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    store::add_user(&conn, "ana@example.com", "Ana").unwrap();
    utils::set_setting(&conn, "default_user", "ana@example.com").unwrap();
    conn
}

fn budget(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["finboard", "budget"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("budget", m)) = matches.subcommand() {
        budgets::handle(conn, m)
    } else {
        panic!("no budget subcommand");
    }
}

#[test]
fn setting_a_budget_twice_sums_in_the_report() {
    let conn = setup();
    budget(&conn, &["set", "--category", "Housing", "--amount", "500"]).unwrap();
    budget(&conn, &["set", "--category", "Housing", "--amount", "500"]).unwrap();

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM budget WHERE user_email=?1",
            params!["ana@example.com"],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(count, 2);

    let report = reports::load_report(&conn, "ana@example.com").unwrap();
    assert_eq!(report.payload.budgets.by_category.len(), 1);
    assert_eq!(report.payload.budgets.by_category[0].total, Decimal::from(1000));
    assert_eq!(report.payload.budgets.total, Decimal::from(1000));
}

#[test]
fn budget_default_cadence_is_monthly() {
    let conn = setup();
    budget(&conn, &["set", "--category", "Food", "--amount", "250.00"]).unwrap();
    let rows = store::list_budgets(&conn, "ana@example.com").unwrap();
    assert_eq!(rows[0].cadence.to_string(), "monthly");
    assert_eq!(rows[0].amount, Some(Decimal::new(25000, 2)));
}

#[test]
fn budget_rejects_unknown_category_and_negative_amount() {
    let conn = setup();
    assert!(budget(&conn, &["set", "--category", "Yachts", "--amount", "10"]).is_err());
    assert!(budget(&conn, &["set", "--category", "Food", "--amount", "-10"]).is_err());
    assert!(store::list_budgets(&conn, "ana@example.com").unwrap().is_empty());
}

#[test]
fn budget_rm_removes_one_row() {
    let conn = setup();
    budget(&conn, &["set", "--category", "Food", "--amount", "100"]).unwrap();
    budget(&conn, &["set", "--category", "Food", "--amount", "50"]).unwrap();
    let first = store::list_budgets(&conn, "ana@example.com").unwrap()[0].id;
    budget(&conn, &["rm", "--id", &first.to_string()]).unwrap();

    let report = reports::load_report(&conn, "ana@example.com").unwrap();
    assert_eq!(report.payload.budgets.total, Decimal::from(50));
    assert!(budget(&conn, &["rm", "--id", &first.to_string()]).is_err());
}

#[test]
fn budget_vs_actual_covers_unbudgeted_and_unspent() {
    let conn = setup();
    budget(&conn, &["set", "--category", "Housing", "--amount", "1200"]).unwrap();
    conn.execute(
        "INSERT INTO expense(user_email, category, amount, date) VALUES (?1, 'Food', '45.10', '2025-08-10')",
        params!["ana@example.com"],
    )
    .unwrap();

    let report = reports::load_report(&conn, "ana@example.com").unwrap();
    let rows = budget_vs_actual(
        &report.payload.expenses_by_category,
        &report.payload.budgets.by_category,
    );
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].category, "Food");
    assert!(rows[0].budgeted.is_zero());
    assert_eq!(format!("{:.2}", rows[0].remaining), "-45.10");
    assert_eq!(rows[1].category, "Housing");
    assert!(rows[1].spent.is_zero());
    assert_eq!(rows[1].remaining, Decimal::from(1200));
}

#[test]
fn spend_share_renders_for_amounts_near_the_decimal_limit() {
    let conn = setup();
    conn.execute(
        "INSERT INTO expense(user_email, category, amount, date) VALUES (?1, 'Food', ?2, '2025-08-10')",
        params!["ana@example.com", Decimal::MAX.to_string()],
    )
    .unwrap();
    let matches =
        cli::build_cli().get_matches_from(["finboard", "report", "spend-by-category"]);
    if let Some(("report", m)) = matches.subcommand() {
        reports::handle(&conn, m).unwrap();
    } else {
        panic!("no report subcommand");
    }
}
