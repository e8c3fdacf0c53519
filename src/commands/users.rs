// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{get_setting, is_valid_email, maybe_print_json, pretty_table, set_setting};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let email = sub.get_one::<String>("email").unwrap().trim().to_string();
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    if !is_valid_email(&email) {
        bail!("'{}' is not a valid email address", email);
    }
    if name.is_empty() {
        bail!("Name must not be empty");
    }
    store::add_user(conn, &email, &name)?;
    // the first user becomes the default so single-user setups need no --user
    if get_setting(conn, "default_user")?.is_none() {
        set_setting(conn, "default_user", &email)?;
        info!("Default user set to {}", email);
    }
    println!("Added user '{}' <{}>", name, email);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let users = store::list_users(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &users)? {
        return Ok(());
    }
    let default = get_setting(conn, "default_user")?;
    let rows: Vec<Vec<String>> = users
        .into_iter()
        .map(|u| {
            let mark = if default.as_deref() == Some(u.email.as_str()) {
                "*".to_string()
            } else {
                String::new()
            };
            vec![u.email, u.name, u.created_at, mark]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Email", "Name", "Created", "Default"], rows)
    );
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let email = sub.get_one::<String>("email").unwrap().trim();
    if !store::remove_user(conn, email)? {
        bail!("User '{}' not found", email);
    }
    conn.execute(
        "DELETE FROM settings WHERE key='default_user' AND value=?1",
        params![email],
    )?;
    println!("Removed user '{}'", email);
    Ok(())
}
