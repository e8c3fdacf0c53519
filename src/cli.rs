// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn with_json(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn amount_arg(required: bool) -> Arg {
    Arg::new("amount")
        .long("amount")
        .required(required)
        .allow_hyphen_values(true)
        .help("Amount, e.g. 1200 or 1,200.50")
}

fn date_arg(required: bool) -> Arg {
    Arg::new("date")
        .long("date")
        .required(required)
        .help("YYYY-MM-DD")
}

fn cadence_arg() -> Arg {
    Arg::new("cadence")
        .long("cadence")
        .help("one-time|weekly|biweekly|monthly|quarterly|yearly")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Manage users")
        .subcommand(
            Command::new("add")
                .about("Add a user")
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("name").long("name").required(true)),
        )
        .subcommand(with_json(Command::new("list").about("List users")))
        .subcommand(
            Command::new("rm")
                .about("Remove a user and all of their records")
                .arg(Arg::new("email").long("email").required(true)),
        )
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage expense categories")
        .subcommand(
            Command::new("add")
                .about("Add a custom category")
                .arg(Arg::new("name").long("name").required(true)),
        )
        .subcommand(with_json(
            Command::new("list").about("List default and custom categories"),
        ))
        .subcommand(
            Command::new("rm")
                .about("Remove a custom category")
                .arg(Arg::new("name").long("name").required(true)),
        )
}

fn income_cmd() -> Command {
    Command::new("income")
        .about("Record and manage income")
        .subcommand(
            Command::new("add")
                .about("Record income")
                .arg(Arg::new("source").long("source").required(true))
                .arg(amount_arg(true))
                .arg(date_arg(true))
                .arg(cadence_arg().default_value("one-time")),
        )
        .subcommand(with_json(
            Command::new("list")
                .about("List income")
                .arg(Arg::new("month").long("month").help("YYYY-MM")),
        ))
        .subcommand(
            Command::new("edit")
                .about("Change fields of an income row")
                .arg(id_arg())
                .arg(Arg::new("source").long("source"))
                .arg(amount_arg(false))
                .arg(date_arg(false))
                .arg(cadence_arg()),
        )
        .subcommand(Command::new("rm").about("Delete an income row").arg(id_arg()))
}

fn expense_cmd() -> Command {
    Command::new("expense")
        .about("Record and manage expenses")
        .subcommand(
            Command::new("add")
                .about("Record an expense")
                .arg(Arg::new("category").long("category").required(true))
                .arg(amount_arg(true))
                .arg(date_arg(true))
                .arg(Arg::new("description").long("description"))
                .arg(cadence_arg().default_value("one-time")),
        )
        .subcommand(with_json(
            Command::new("list")
                .about("List expenses")
                .arg(Arg::new("month").long("month").help("YYYY-MM"))
                .arg(Arg::new("category").long("category")),
        ))
        .subcommand(
            Command::new("edit")
                .about("Change fields of an expense row")
                .arg(id_arg())
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("description").long("description"))
                .arg(amount_arg(false))
                .arg(date_arg(false))
                .arg(cadence_arg()),
        )
        .subcommand(Command::new("rm").about("Delete an expense row").arg(id_arg()))
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Manage per-category budgets")
        .subcommand(
            Command::new("set")
                .about("Add a budget amount for a category")
                .arg(Arg::new("category").long("category").required(true))
                .arg(amount_arg(true))
                .arg(cadence_arg().default_value("monthly")),
        )
        .subcommand(with_json(Command::new("list").about("List budget rows")))
        .subcommand(Command::new("rm").about("Delete a budget row").arg(id_arg()))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Dashboard reports")
        .subcommand(with_json(
            Command::new("summary").about("Totals, income trend, spending and budgets"),
        ))
        .subcommand(with_json(
            Command::new("income-trend").about("Income per month").arg(
                Arg::new("months")
                    .long("months")
                    .value_parser(value_parser!(usize))
                    .default_value("12"),
            ),
        ))
        .subcommand(with_json(
            Command::new("spend-by-category").about("Spending per category, largest first"),
        ))
        .subcommand(with_json(
            Command::new("budget-vs-actual").about("Budgeted against spent per category"),
        ))
}

fn export_cmd() -> Command {
    Command::new("export")
        .about("Write data to files")
        .subcommand(
            Command::new("report")
                .about("Write the report payload as JSON")
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(
            Command::new("transactions")
                .about("Write income or expense rows as CSV or JSON")
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .required(true)
                        .value_parser(["income", "expense"]),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("csv")
                        .help("csv|json"),
                )
                .arg(Arg::new("out").long("out").required(true)),
        )
}

fn import_cmd() -> Command {
    Command::new("import")
        .about("Load rows from CSV files")
        .subcommand(
            Command::new("income")
                .about("CSV columns: date,source,amount[,cadence]")
                .arg(Arg::new("path").long("path").required(true)),
        )
        .subcommand(
            Command::new("expense")
                .about("CSV columns: date,category,amount[,description,cadence]")
                .arg(Arg::new("path").long("path").required(true)),
        )
}

fn config_cmd() -> Command {
    Command::new("config")
        .about("Show or change settings")
        .subcommand(Command::new("show").about("Print current settings"))
        .subcommand(
            Command::new("set-currency")
                .about("Currency code used when printing money")
                .arg(Arg::new("currency").long("currency").required(true)),
        )
        .subcommand(
            Command::new("set-user")
                .about("User to act for when --user is not given")
                .arg(Arg::new("email").long("email").required(true)),
        )
}

pub fn build_cli() -> Command {
    Command::new("finboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track income, expenses and budgets; view dashboard reports")
        .arg(
            Arg::new("user")
                .long("user")
                .short('u')
                .global(true)
                .value_name("EMAIL")
                .help("User to act for (defaults to the configured user)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("More log output on stderr (-v, -vv, -vvv)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(user_cmd())
        .subcommand(category_cmd())
        .subcommand(income_cmd())
        .subcommand(expense_cmd())
        .subcommand(budget_cmd())
        .subcommand(report_cmd())
        .subcommand(export_cmd())
        .subcommand(import_cmd())
        .subcommand(Command::new("doctor").about("Find rows the reports would skip"))
        .subcommand(config_cmd())
}
