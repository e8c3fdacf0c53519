// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finboard::commands::{categories, expenses, income};
use finboard::{cli, db, store, utils};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    store::add_user(&conn, "ana@example.com", "Ana").unwrap();
    store::add_user(&conn, "ben@example.com", "Ben").unwrap();
    utils::set_setting(&conn, "default_user", "ana@example.com").unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["finboard"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("income", m)) => income::handle(conn, m),
        Some(("expense", m)) => expenses::handle(conn, m),
        Some(("category", m)) => categories::handle(conn, m),
        _ => panic!("unexpected subcommand"),
    }
}

#[test]
fn income_add_trims_and_parses_formatted_amounts() {
    let conn = setup();
    run(
        &conn,
        &[
            "income", "add", "--source", " Salary ", "--amount", "$3,200.50", "--date",
            " 2025-01-31 ", "--cadence", "monthly",
        ],
    )
    .unwrap();

    let rows = income::query_rows(&conn, "ana@example.com", None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source, "Salary");
    assert_eq!(rows[0].amount, Some(Decimal::new(320050, 2)));
    assert_eq!(rows[0].date.as_deref(), Some("2025-01-31"));
    assert_eq!(rows[0].cadence.to_string(), "monthly");
}

#[test]
fn income_add_rejects_negative_and_bad_dates() {
    let conn = setup();
    assert!(run(&conn, &["income", "add", "--source", "X", "--amount", "-5", "--date", "2025-01-01"]).is_err());
    assert!(run(&conn, &["income", "add", "--source", "X", "--amount", "5", "--date", "01/02/2025"]).is_err());
    assert!(run(&conn, &["income", "add", "--source", "X", "--amount", "5", "--date", "2025-01-01", "--cadence", "hourly"]).is_err());
    assert!(income::query_rows(&conn, "ana@example.com", None).unwrap().is_empty());
}

#[test]
fn explicit_user_overrides_default() {
    let conn = setup();
    run(
        &conn,
        &["income", "add", "--user", "ben@example.com", "--source", "Gig", "--amount", "80", "--date", "2025-02-02"],
    )
    .unwrap();
    assert!(income::query_rows(&conn, "ana@example.com", None).unwrap().is_empty());
    assert_eq!(income::query_rows(&conn, "ben@example.com", None).unwrap().len(), 1);

    let err = run(
        &conn,
        &["income", "add", "--user", "nobody@example.com", "--source", "Gig", "--amount", "1", "--date", "2025-02-02"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn income_list_filters_by_month_newest_first() {
    let conn = setup();
    for (d, a) in [("2025-01-03", "1"), ("2025-02-01", "2"), ("2025-01-20", "3")] {
        run(&conn, &["income", "add", "--source", "S", "--amount", a, "--date", d]).unwrap();
    }
    let jan = income::query_rows(&conn, "ana@example.com", Some("2025-01")).unwrap();
    let dates: Vec<&str> = jan.iter().filter_map(|r| r.date.as_deref()).collect();
    assert_eq!(dates, ["2025-01-20", "2025-01-03"]);
    assert!(income::query_rows(&conn, "ana@example.com", Some("2025-13")).is_err());
}

#[test]
fn income_edit_and_rm() {
    let conn = setup();
    run(&conn, &["income", "add", "--source", "S", "--amount", "10", "--date", "2025-01-01"]).unwrap();
    let id = income::query_rows(&conn, "ana@example.com", None).unwrap()[0].id;
    let id_s = id.to_string();

    run(&conn, &["income", "edit", "--id", &id_s, "--amount", "12.5", "--source", "Freelance"]).unwrap();
    let row = &income::query_rows(&conn, "ana@example.com", None).unwrap()[0];
    assert_eq!(row.amount, Some(Decimal::new(125, 1)));
    assert_eq!(row.source, "Freelance");

    // nothing to change
    assert!(run(&conn, &["income", "edit", "--id", &id_s]).is_err());
    // another user's row is invisible
    assert!(run(&conn, &["income", "rm", "--user", "ben@example.com", "--id", &id_s]).is_err());

    run(&conn, &["income", "rm", "--id", &id_s]).unwrap();
    assert!(income::query_rows(&conn, "ana@example.com", None).unwrap().is_empty());
    assert!(run(&conn, &["income", "rm", "--id", &id_s]).is_err());
}

#[test]
fn expense_requires_known_category() {
    let conn = setup();
    let err = run(
        &conn,
        &["expense", "add", "--category", "Pets", "--amount", "20", "--date", "2025-03-01"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Unknown category"));

    run(&conn, &["category", "add", "--name", " Pets "]).unwrap();
    run(
        &conn,
        &["expense", "add", "--category", "Pets", "--amount", "20", "--date", "2025-03-01", "--description", "Vet"],
    )
    .unwrap();
    run(&conn, &["expense", "add", "--category", "Food", "--amount", "7.25", "--date", "2025-03-02"]).unwrap();

    let pets = expenses::query_rows(&conn, "ana@example.com", None, Some("Pets")).unwrap();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].description.as_deref(), Some("Vet"));
    let march = expenses::query_rows(&conn, "ana@example.com", Some("2025-03"), None).unwrap();
    assert_eq!(march.len(), 2);
    assert_eq!(march[0].category.as_deref(), Some("Food"));
}

#[test]
fn expense_edit_can_clear_description() {
    let conn = setup();
    run(
        &conn,
        &["expense", "add", "--category", "Food", "--amount", "9", "--date", "2025-03-01", "--description", "Pizza"],
    )
    .unwrap();
    let id = expenses::query_rows(&conn, "ana@example.com", None, None).unwrap()[0].id.to_string();
    run(&conn, &["expense", "edit", "--id", &id, "--description", "", "--category", "Shopping"]).unwrap();
    let row = &expenses::query_rows(&conn, "ana@example.com", None, None).unwrap()[0];
    assert_eq!(row.description, None);
    assert_eq!(row.category.as_deref(), Some("Shopping"));
    assert!(run(&conn, &["expense", "edit", "--id", &id, "--category", "Nope"]).is_err());
}

#[test]
fn default_categories_cannot_be_removed() {
    let conn = setup();
    assert!(run(&conn, &["category", "rm", "--name", "Food"]).is_err());
    assert!(run(&conn, &["category", "rm", "--name", "Pets"]).is_err());
    run(&conn, &["category", "add", "--name", "Pets"]).unwrap();
    run(&conn, &["category", "rm", "--name", "Pets"]).unwrap();

    let all = categories::all_categories(&conn, "ana@example.com").unwrap();
    assert_eq!(all.len(), finboard::models::DEFAULT_CATEGORIES.len());
    assert!(all.iter().all(|c| c.kind == "default"));
}
