// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::filter::{filter_sort, SortBy, SortOrder, TransactionQuery};
use crate::kv::KvStore;
use crate::store::TransactionStore;
use crate::utils::required_arg;
use anyhow::{Context, Result};
use serde_json::json;

/// Writes every transaction, oldest first, as CSV or JSON.
pub fn export_transactions(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required_arg(sub, "format")?.to_lowercase();
    let out = required_arg(sub, "out")?;

    let txns = TransactionStore::new(kv)
        .list()
        .context("Failed to load transactions")?;
    let query = TransactionQuery::default().with_sort(SortBy::Date, SortOrder::Asc);
    let rows = filter_sort(&txns, &query);

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["id", "date", "description", "category", "type", "amount"])?;
            for t in &rows {
                wtr.write_record([
                    t.id.clone(),
                    t.date.to_rfc3339(),
                    t.description.clone(),
                    t.category.clone(),
                    t.kind.map(|k| k.to_string()).unwrap_or_default(),
                    t.amount.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<serde_json::Value> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id, "date": t.date.to_rfc3339(), "description": t.description,
                        "category": t.category, "type": t.kind, "amount": t.amount.to_string()
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => anyhow::bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
