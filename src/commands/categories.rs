// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::DEFAULT_CATEGORIES;
use crate::store;
use crate::utils::{maybe_print_json, pretty_table, resolve_user};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = resolve_user(conn, sub)?;
            let name = sub.get_one::<String>("name").unwrap().trim();
            if name.is_empty() {
                bail!("Category name must not be empty");
            }
            store::add_category(conn, &user, name)?;
            println!("Added category '{}'", name);
        }
        Some(("list", sub)) => {
            let user = resolve_user(conn, sub)?;
            let data = all_categories(conn, &user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|c| vec![c.name, c.kind.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Category", "Kind"], rows));
            }
        }
        Some(("rm", sub)) => {
            let user = resolve_user(conn, sub)?;
            let name = sub.get_one::<String>("name").unwrap().trim();
            if DEFAULT_CATEGORIES.contains(&name) {
                bail!("'{}' is a default category and cannot be removed", name);
            }
            if !store::remove_category(conn, &user, name)? {
                bail!("Category '{}' not found", name);
            }
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub kind: &'static str,
}

/// Default categories first, in their fixed order, then the user's own by name.
pub fn all_categories(conn: &Connection, user: &str) -> Result<Vec<CategoryRow>> {
    let mut out: Vec<CategoryRow> = DEFAULT_CATEGORIES
        .iter()
        .map(|c| CategoryRow {
            name: c.to_string(),
            kind: "default",
        })
        .collect();
    for name in store::list_custom_categories(conn, user)? {
        out.push(CategoryRow {
            name,
            kind: "custom",
        });
    }
    Ok(out)
}
