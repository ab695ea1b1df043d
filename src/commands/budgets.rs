// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::{self, AlertLedger, BudgetAlert, Budgets};
use crate::kv::KvStore;
use crate::profile::{parse_budget, ProfileStore, UserProfile};
use crate::store::TransactionStore;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use chrono::Local;

pub fn handle(kv: &dyn KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(kv, sub)?,
        Some(("show", sub)) => show(kv, sub)?,
        Some(("check", sub)) => check(kv, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let profiles = ProfileStore::new(kv);
    let mut profile = profiles.load()?;
    let mut budgets = profile.budgets();
    if let Some(s) = sub.get_one::<String>("daily") {
        budgets.daily = parse_budget("daily", s)?;
    }
    if let Some(s) = sub.get_one::<String>("weekly") {
        budgets.weekly = parse_budget("weekly", s)?;
    }
    if let Some(s) = sub.get_one::<String>("monthly") {
        budgets.monthly = parse_budget("monthly", s)?;
    }
    profile.set_budgets(budgets);
    profiles.save(&profile).context("Failed to update budget")?;
    println!("Budget updated successfully");
    print_alerts(kv, &profile, false)?;
    Ok(())
}

fn show(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let profile = ProfileStore::new(kv).load()?;
    let txns = TransactionStore::new(kv)
        .list()
        .context("Failed to load transactions")?;
    let rows = budget::progress(&txns, &profile.budgets(), &Local::now());
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let ccy = profile.currency;
        let data = rows
            .iter()
            .map(|p| {
                let budget = p.budget.map(|b| ccy.format(b)).unwrap_or_else(|| "-".into());
                let used = p.percent.map(|v| format!("{}%", v)).unwrap_or_else(|| "-".into());
                let status = if p.over_budget { "over" } else { "" };
                vec![
                    p.window.label().to_string(),
                    ccy.format(p.spent),
                    budget,
                    used,
                    status.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Window", "Spent", "Budget", "Used", "Status"], data)
        );
    }
    Ok(())
}

fn check(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let profile = ProfileStore::new(kv).load()?;
    if !profile.notifications.budget_alerts {
        println!("Budget alerts are turned off");
        return Ok(());
    }
    let shown = print_alerts(kv, &profile, sub.get_flag("new-only"))?;
    if shown.is_empty() {
        println!("All budgets are on track");
    }
    Ok(())
}

/// Alerts for the current spending. With `new_only`, alerts already seen in
/// this period are dropped and the rest are recorded as seen.
pub fn current_alerts(
    kv: &dyn KvStore,
    budgets: &Budgets,
    new_only: bool,
) -> Result<Vec<BudgetAlert>> {
    let now = Local::now();
    let txns = TransactionStore::new(kv)
        .list()
        .context("Failed to load transactions")?;
    let alerts = budget::evaluate(&txns, budgets, &now);
    if !new_only {
        return Ok(alerts);
    }
    let ledger = AlertLedger::new(kv);
    let fresh = ledger.fresh(&alerts, &now)?;
    ledger.acknowledge(&fresh, &now)?;
    Ok(fresh)
}

/// Prints the budget alert block when alerts are enabled in the profile.
pub fn print_alerts(
    kv: &dyn KvStore,
    profile: &UserProfile,
    new_only: bool,
) -> Result<Vec<BudgetAlert>> {
    if !profile.notifications.budget_alerts {
        return Ok(Vec::new());
    }
    let alerts = current_alerts(kv, &profile.budgets(), new_only)?;
    if !alerts.is_empty() {
        println!("Budget Alert");
        for msg in budget::alert_messages(&alerts) {
            println!("  - {}", msg);
        }
    }
    Ok(alerts)
}
