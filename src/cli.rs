// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};

fn json_flags(cmd: Command) -> Command {
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
            .help("Print one JSON object per line"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn tx_command() -> Command {
    Command::new("tx")
        .about("Record, list, edit and delete transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record a transaction")
                .arg(opt("amount", "Amount, e.g. 25.50").required(true))
                .arg(opt("description", "What it was for").required(true))
                .arg(opt("category", "Category name").default_value("Others"))
                .arg(
                    opt("type", "Transaction type")
                        .value_parser(["expense", "income"]),
                )
                .arg(opt("date", "Back-date the entry (YYYY-MM-DD); defaults to now")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List transactions")
                .arg(opt("search", "Match description or category, ignoring case"))
                .arg(
                    opt("type", "Only this type")
                        .value_parser(["all", "expense", "income"])
                        .default_value("all"),
                )
                .arg(opt("category", "Only this category").default_value("all"))
                .arg(
                    opt("sort", "Sort field")
                        .value_parser(["date", "amount", "category"])
                        .default_value("date"),
                )
                .arg(
                    opt("order", "Sort order")
                        .value_parser(["asc", "desc"])
                        .default_value("desc"),
                )
                .arg(opt("limit", "Show at most this many rows").value_parser(value_parser!(usize))),
        ))
        .subcommand(
            Command::new("edit")
                .about("Change fields of a transaction")
                .arg(Arg::new("id").required(true))
                .arg(opt("amount", "New amount"))
                .arg(opt("description", "New description"))
                .arg(opt("category", "New category"))
                .arg(opt("type", "New type; none clears it").value_parser(["expense", "income", "none"])),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("export")
                .about("Write all transactions to a file")
                .arg(
                    opt("format", "Output format")
                        .value_parser(["csv", "json"])
                        .default_value("csv"),
                )
                .arg(opt("out", "Output path").required(true)),
        )
}

fn report_command() -> Command {
    Command::new("report")
        .about("Spending analytics")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("by-category").about("Total spent per category"),
        ))
        .subcommand(json_flags(
            Command::new("monthly").about("Total spent per month"),
        ))
}

fn budget_command() -> Command {
    Command::new("budget")
        .about("Daily, weekly and monthly budgets")
        .subcommand_required(true)
        .subcommand(
            Command::new("set")
                .about("Set budgets; pass 'none' to clear one")
                .arg(opt("daily", "Daily budget"))
                .arg(opt("weekly", "Weekly budget"))
                .arg(opt("monthly", "Monthly budget"))
                .group(
                    ArgGroup::new("budgets")
                        .args(["daily", "weekly", "monthly"])
                        .multiple(true)
                        .required(true),
                ),
        )
        .subcommand(json_flags(
            Command::new("show").about("Spending against each budget"),
        ))
        .subcommand(
            Command::new("check")
                .about("Show budget alerts")
                .arg(
                    Arg::new("new-only")
                        .long("new-only")
                        .action(ArgAction::SetTrue)
                        .help("Only alerts not shown before in this period"),
                ),
        )
}

fn category_command() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List categories and colors"))
        .subcommand(json_flags(
            Command::new("used").about("Categories that appear in transactions"),
        ))
        .subcommand(
            Command::new("add")
                .about("Add a category")
                .arg(Arg::new("name").required(true)),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a custom category")
                .arg(Arg::new("name").required(true)),
        )
        .subcommand(
            Command::new("color")
                .about("Change a category color")
                .arg(Arg::new("name").required(true))
                .arg(Arg::new("color").required(true).help("Hex color, e.g. #FF0000")),
        )
}

fn profile_command() -> Command {
    Command::new("profile")
        .about("User profile and preferences")
        .subcommand_required(true)
        .subcommand(json_flags(Command::new("show").about("Show the profile")))
        .subcommand(
            Command::new("set")
                .about("Update profile fields")
                .arg(opt("name", "Display name"))
                .arg(opt("email", "Email address"))
                .arg(opt("phone", "Phone number"))
                .arg(opt("currency", "Display currency, e.g. USD"))
                .arg(opt("budget-alerts", "Budget alert notifications (on|off)"))
                .arg(opt("weekly-report", "Weekly report notifications (on|off)"))
                .arg(opt("monthly-report", "Monthly report notifications (on|off)"))
                .arg(opt("category-limit", "Category limit notifications (on|off)")),
        )
        .subcommand(
            Command::new("avatar")
                .about("Choose the profile avatar")
                .arg(opt("emoji", "Use an emoji"))
                .arg(opt("color", "Use a hex color with your initial"))
                .arg(opt("image", "Use a picture at this URI"))
                .group(
                    ArgGroup::new("avatar")
                        .args(["emoji", "color", "image"])
                        .required(true),
                ),
        )
}

pub fn build_cli() -> Command {
    Command::new("pennywise")
        .about("Track spending, see where it goes and stay within budget")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(tx_command())
        .subcommand(report_command())
        .subcommand(budget_command())
        .subcommand(category_command())
        .subcommand(profile_command())
}
