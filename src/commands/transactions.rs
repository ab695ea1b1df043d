// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{budgets, exporter};
use crate::filter::{filter_sort, CategoryFilter, SortBy, SortOrder, TransactionQuery, TypeFilter};
use crate::kv::KvStore;
use crate::models::{NewTransaction, TransactionPatch};
use crate::profile::{ProfileStore, UserProfile};
use crate::store::TransactionStore;
use crate::utils::{
    local_day, local_noon, maybe_print_json, parse_date, pretty_table, required_arg,
};
use anyhow::{Context, Result};
use serde::Serialize;

pub fn handle(kv: &dyn KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(kv, sub)?,
        Some(("list", sub)) => list(kv, sub)?,
        Some(("edit", sub)) => edit(kv, sub)?,
        Some(("rm", sub)) => remove(kv, sub)?,
        Some(("export", sub)) => exporter::export_transactions(kv, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let new = NewTransaction::parse(
        required_arg(sub, "amount")?,
        required_arg(sub, "description")?,
        sub.get_one::<String>("category").map(String::as_str).unwrap_or(""),
        sub.get_one::<String>("type").map(String::as_str),
    )?;
    let profile = ProfileStore::new(kv).load()?;
    let store = TransactionStore::new(kv);
    let created = match sub.get_one::<String>("date") {
        Some(d) => store.append_at(new, local_noon(parse_date(d)?)?),
        None => store.append(new),
    }
    .context("Failed to add transaction")?;
    println!(
        "Recorded {} '{}' in {} (id: {})",
        profile.currency.format(created.amount),
        created.description,
        created.category_or_default(),
        created.id
    );
    budgets::print_alerts(kv, &profile, false)?;
    Ok(())
}

fn list(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(kv, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.date.clone(),
                    r.description.clone(),
                    r.category.clone(),
                    r.r#type.clone(),
                    r.amount.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Description", "Category", "Type", "Amount"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub description: String,
    pub category: String,
    pub r#type: String,
    pub amount: String,
    pub color: String,
}

/// Builds the list view controls from command-line arguments.
pub fn query_from_args(sub: &clap::ArgMatches) -> Result<TransactionQuery> {
    let mut query = TransactionQuery::default();
    if let Some(search) = sub.get_one::<String>("search") {
        query = query.with_search(search.trim());
    }
    if let Some(t) = sub.get_one::<String>("type") {
        query = query.with_type(t.parse::<TypeFilter>()?);
    }
    if let Some(c) = sub.get_one::<String>("category") {
        query = query.with_category(CategoryFilter::from(c.as_str()));
    }
    let sort_by = match sub.get_one::<String>("sort") {
        Some(s) => s.parse::<SortBy>()?,
        None => SortBy::default(),
    };
    let sort_order = match sub.get_one::<String>("order") {
        Some(s) => s.parse::<SortOrder>()?,
        None => SortOrder::default(),
    };
    Ok(query.with_sort(sort_by, sort_order))
}

pub fn query_rows(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let query = query_from_args(sub)?;
    let profile: UserProfile = ProfileStore::new(kv).load()?;
    let txns = TransactionStore::new(kv)
        .list()
        .context("Failed to load transactions")?;
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);

    let data = filter_sort(&txns, &query)
        .into_iter()
        .take(limit)
        .map(|t| TransactionRow {
            color: profile.category_color(&t.category).to_string(),
            date: local_day(&t.date),
            amount: profile.currency.format(t.amount),
            r#type: t.kind.map(|k| k.to_string()).unwrap_or_default(),
            category: t.category_or_default().to_string(),
            description: t.description,
            id: t.id,
        })
        .collect();
    Ok(data)
}

fn edit(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = required_arg(sub, "id")?;
    let patch = TransactionPatch::parse(
        sub.get_one::<String>("amount").map(String::as_str),
        sub.get_one::<String>("description").map(String::as_str),
        sub.get_one::<String>("category").map(String::as_str),
        sub.get_one::<String>("type").map(String::as_str),
    )?;
    if patch.is_empty() {
        anyhow::bail!("Nothing to change; pass --amount, --description, --category or --type");
    }
    let updated = TransactionStore::new(kv)
        .update(id, &patch)
        .context("Failed to update transaction")?;
    if updated {
        println!("Updated transaction {}", id);
        let profile = ProfileStore::new(kv).load()?;
        budgets::print_alerts(kv, &profile, false)?;
    } else {
        println!("No transaction with id {}", id);
    }
    Ok(())
}

fn remove(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = required_arg(sub, "id")?;
    let removed = TransactionStore::new(kv)
        .remove(id)
        .context("Failed to delete transaction")?;
    if removed {
        println!("Deleted transaction {}", id);
    } else {
        println!("No transaction with id {}", id);
    }
    Ok(())
}
