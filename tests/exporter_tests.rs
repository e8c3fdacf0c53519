// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finboard::commands::exporter;
use finboard::{cli, db, store};
use rusqlite::{Connection, params};
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    store::add_user(&conn, "ana@example.com", "Ana").unwrap();
    conn.execute(
        "INSERT INTO income(user_email, source, amount, date, cadence) VALUES (?1,'Salary','2500.00','2025-01-31','monthly')",
        params!["ana@example.com"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO expense(user_email, category, description, amount, date) VALUES (?1,'Food','Corner Shop','12.34','2025-01-02')",
        params!["ana@example.com"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO budget(user_email, category, amount) VALUES (?1,'Food','300')",
        params!["ana@example.com"],
    )
    .unwrap();
    conn
}

fn export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["finboard", "export", "--user", "ana@example.com"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_report_writes_dashboard_payload() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("report.json");
    let out_str = out_path.to_string_lossy().to_string();

    export(&conn, &["report", "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!({
            "totals": { "income": "2500.00", "expenses": "12.34", "net": "2487.66" },
            "monthlyIncome": [ { "yearMonth": "2025-01", "total": "2500.00" } ],
            "expensesByCategory": [ { "category": "Food", "total": "12.34" } ],
            "budgets": {
                "total": "300",
                "byCategory": [ { "category": "Food", "total": "300" } ]
            }
        })
    );
}

#[test]
fn export_expenses_as_pretty_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("expenses.json");
    let out_str = out_path.to_string_lossy().to_string();

    export(
        &conn,
        &["transactions", "--kind", "expense", "--format", "json", "--out", &out_str],
    )
    .unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": 1,
                "user_key": "ana@example.com",
                "category": "Food",
                "description": "Corner Shop",
                "amount": "12.34",
                "date": "2025-01-02",
                "cadence": "one-time"
            }
        ])
    );
}

#[test]
fn json_export_writes_null_for_missing_cells() {
    let conn = base_conn();
    conn.execute(
        "INSERT INTO income(user_email, source, amount, date) VALUES (?1,'Gift',NULL,NULL)",
        params!["ana@example.com"],
    )
    .unwrap();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("income.json");
    let out_str = out_path.to_string_lossy().to_string();

    export(
        &conn,
        &["transactions", "--kind", "income", "--format", "json", "--out", &out_str],
    )
    .unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(parsed[0]["id"], 1);
    assert_eq!(parsed[0]["amount"], "2500.00");
    assert_eq!(parsed[1]["id"], 2);
    assert!(parsed[1]["amount"].is_null());
    assert!(parsed[1]["date"].is_null());
}

#[test]
fn export_income_as_csv() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("income.csv");
    let out_str = out_path.to_string_lossy().to_string();

    export(&conn, &["transactions", "--kind", "income", "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "id,date,source,amount,cadence");
    assert_eq!(lines[1], "1,2025-01-31,Salary,2500.00,monthly");
    assert_eq!(lines.len(), 2);
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(
        export(
            &conn,
            &["transactions", "--kind", "income", "--format", "xml", "--out", &out_str],
        )
        .is_err()
    );
    assert!(!out_path.exists());
}
