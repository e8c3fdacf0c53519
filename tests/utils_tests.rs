// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finboard::commands::{config, users};
use finboard::models::Cadence;
use finboard::utils::{
    fmt_money, get_currency, get_setting, is_valid_email, parse_amount, parse_money,
};
use finboard::{cli, db, store};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["finboard"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("user", m)) => users::handle(conn, m),
        Some(("config", m)) => config::handle(conn, m),
        _ => panic!("unexpected subcommand"),
    }
}

#[test]
fn money_parsing_accepts_what_people_type() {
    assert_eq!(parse_money("1200").unwrap(), Decimal::from(1200));
    assert_eq!(parse_money(" $1,200.50 ").unwrap(), Decimal::new(120050, 2));
    assert_eq!(parse_money("-$5").unwrap(), Decimal::from(-5));
    assert!(parse_money("").is_err());
    assert!(parse_money("$").is_err());
    assert!(parse_money("12abc").is_err());
    assert!(parse_money("--5").is_err());
}

#[test]
fn amounts_must_not_be_negative() {
    assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
    assert!(parse_amount("-0.01").is_err());
}

#[test]
fn money_formatting_groups_thousands() {
    assert_eq!(fmt_money(&Decimal::new(123456789, 2), "USD"), "USD 1,234,567.89");
    assert_eq!(fmt_money(&Decimal::from(999), "EUR"), "EUR 999.00");
    assert_eq!(fmt_money(&Decimal::new(-10005, 1), "USD"), "-USD 1,000.50");
    assert_eq!(fmt_money(&Decimal::new(-1, 3), "USD"), "USD 0.00");
}

#[test]
fn cadence_text_round_trips() {
    for c in Cadence::ALL {
        assert_eq!(c.to_string().parse::<Cadence>().unwrap(), c);
    }
    assert_eq!("One Time".parse::<Cadence>().unwrap(), Cadence::OneTime);
    assert_eq!("YEARLY".parse::<Cadence>().unwrap(), Cadence::Yearly);
    assert!("hourly".parse::<Cadence>().is_err());
}

#[test]
fn email_check() {
    assert!(is_valid_email("ana@example.com"));
    assert!(!is_valid_email("ana@example"));
    assert!(!is_valid_email("ana example.com"));
}

#[test]
fn first_user_becomes_default_and_removal_clears_it() {
    let conn = conn();
    run(&conn, &["user", "add", "--email", "ana@example.com", "--name", "Ana"]).unwrap();
    run(&conn, &["user", "add", "--email", "ben@example.com", "--name", "Ben"]).unwrap();
    assert_eq!(
        get_setting(&conn, "default_user").unwrap().as_deref(),
        Some("ana@example.com")
    );
    assert!(run(&conn, &["user", "add", "--email", "not-an-email", "--name", "X"]).is_err());
    assert!(run(&conn, &["user", "add", "--email", "ana@example.com", "--name", "Again"]).is_err());

    run(&conn, &["config", "set-user", "--email", "ben@example.com"]).unwrap();
    run(&conn, &["user", "rm", "--email", "ben@example.com"]).unwrap();
    assert_eq!(get_setting(&conn, "default_user").unwrap(), None);
    assert_eq!(store::list_users(&conn).unwrap().len(), 1);
    assert!(run(&conn, &["config", "set-user", "--email", "ben@example.com"]).is_err());
}

#[test]
fn currency_setting() {
    let conn = conn();
    assert_eq!(get_currency(&conn).unwrap(), "USD");
    run(&conn, &["config", "set-currency", "--currency", "eur"]).unwrap();
    assert_eq!(get_currency(&conn).unwrap(), "EUR");
    assert!(run(&conn, &["config", "set-currency", "--currency", "EURO"]).is_err());
}

#[test]
fn config_setters_take_named_flags() {
    let parse = |args: &[&str]| cli::build_cli().try_get_matches_from(args.iter().copied());
    assert!(parse(&["finboard", "config", "set-currency", "--currency", "EUR"]).is_ok());
    assert!(parse(&["finboard", "config", "set-currency", "EUR"]).is_err());
    assert!(parse(&["finboard", "config", "set-user", "--email", "ana@example.com"]).is_ok());
}
