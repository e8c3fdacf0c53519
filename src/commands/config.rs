// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::db_path;
use crate::store::ensure_user;
use crate::utils::{get_currency, get_setting, pretty_table, set_setting};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let rows = vec![
                vec!["database".to_string(), db_path()?.display().to_string()],
                vec!["currency".to_string(), get_currency(conn)?],
                vec![
                    "default_user".to_string(),
                    get_setting(conn, "default_user")?.unwrap_or_else(|| "(none)".into()),
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set-currency", sub)) => {
            let ccy = sub.get_one::<String>("currency").unwrap().trim().to_uppercase();
            if ccy.len() != 3 || !ccy.chars().all(|c| c.is_ascii_alphabetic()) {
                bail!("Invalid currency code '{}', expected e.g. USD", ccy);
            }
            set_setting(conn, "currency", &ccy)?;
            println!("Currency set to {}", ccy);
        }
        Some(("set-user", sub)) => {
            let email = sub.get_one::<String>("email").unwrap().trim();
            ensure_user(conn, email)?;
            set_setting(conn, "default_user", email)?;
            println!("Default user set to {}", email);
        }
        _ => {}
    }
    Ok(())
}
