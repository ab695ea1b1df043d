// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{category_totals, grand_total, month_label};
use crate::kv::KvStore;
use crate::profile::ProfileStore;
use crate::store::TransactionStore;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(kv: &dyn KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("by-category", sub)) => by_category(kv, sub)?,
        Some(("monthly", sub)) => monthly(kv, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryRow {
    pub category: String,
    pub total: Decimal,
    /// Share of all spending, in percent with one decimal.
    pub share: Decimal,
    pub color: String,
}

/// Category totals, largest first.
pub fn category_rows(kv: &dyn KvStore) -> Result<Vec<CategoryRow>> {
    let profile = ProfileStore::new(kv).load()?;
    let txns = TransactionStore::new(kv)
        .list()
        .context("Failed to load transactions")?;
    let total = grand_total(&txns);
    let mut items: Vec<_> = category_totals(&txns).into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(items
        .into_iter()
        .map(|(category, amount)| {
            let share = if total.is_zero() {
                Decimal::ZERO
            } else {
                (amount / total * Decimal::ONE_HUNDRED).round_dp(1)
            };
            CategoryRow {
                color: profile.category_color(&category).to_string(),
                category,
                total: amount,
                share,
            }
        })
        .collect())
}

fn by_category(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let rows = category_rows(kv)?;
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let currency = ProfileStore::new(kv).load()?.currency;
        let data = rows
            .iter()
            .map(|r| {
                vec![
                    r.category.clone(),
                    currency.format(r.total),
                    format!("{}%", r.share),
                    r.color.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Spent", "Share", "Color"], data)
        );
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MonthRow {
    pub month: String,
    pub label: String,
    pub total: Decimal,
}

/// Monthly totals in chronological order.
pub fn month_rows(kv: &dyn KvStore) -> Result<Vec<MonthRow>> {
    let totals = TransactionStore::new(kv)
        .monthly_totals()
        .context("Failed to load transactions")?;
    Ok(totals
        .into_iter()
        .map(|(month, total)| MonthRow {
            label: month_label(&month),
            month,
            total,
        })
        .collect())
}

fn monthly(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let rows = month_rows(kv)?;
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let currency = ProfileStore::new(kv).load()?.currency;
        let data = rows
            .iter()
            .map(|r| vec![r.month.clone(), r.label.clone(), currency.format(r.total)])
            .collect();
        println!("{}", pretty_table(&["Month", "Label", "Spent"], data));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::models::NewTransaction;
    use chrono::{TimeZone, Utc};

    #[test]
    fn category_rows_sort_largest_first_with_shares() {
        let kv = MemoryKv::new();
        let store = TransactionStore::new(&kv);
        for (amt, cat) in [("30", "Travel"), ("10", "Food & Dining"), ("60", "Travel")] {
            store
                .append(NewTransaction::parse(amt, "x", cat, None).unwrap())
                .unwrap();
        }
        let rows = category_rows(&kv).unwrap();
        assert_eq!(rows[0].category, "Travel");
        assert_eq!(rows[0].total, Decimal::from(90));
        assert_eq!(rows[0].share, Decimal::from(90));
        assert_eq!(rows[0].color, "#9B59B6");
        assert_eq!(rows[1].share, Decimal::from(10));
    }

    #[test]
    fn month_rows_are_chronological() {
        let kv = MemoryKv::new();
        let store = TransactionStore::new(&kv);
        let mar = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        store
            .append_at(NewTransaction::parse("5", "x", "a", None).unwrap(), mar)
            .unwrap();
        store
            .append_at(NewTransaction::parse("7", "y", "b", None).unwrap(), jan)
            .unwrap();
        let rows = month_rows(&kv).unwrap();
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["01/24", "03/24"]);
    }
}
