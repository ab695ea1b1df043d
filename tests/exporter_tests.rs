// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use pennywise::kv::{KvStore, MemoryKv};
use pennywise::models::NewTransaction;
use pennywise::store::TransactionStore;
use pennywise::{cli, commands::exporter};
use serde_json::json;
use tempfile::tempdir;

fn seeded() -> MemoryKv {
    let kv = MemoryKv::new();
    let store = TransactionStore::new(&kv);
    let later = Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap();
    let earlier = Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap();
    store
        .append_at(
            NewTransaction::parse("3", "Refund, partial", "Shopping", None).unwrap(),
            later,
        )
        .unwrap();
    store
        .append_at(
            NewTransaction::parse("12.34", "Corner Shop", "Food & Dining", Some("expense")).unwrap(),
            earlier,
        )
        .unwrap();
    kv
}

fn run_export(kv: &dyn KvStore, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "pennywise", "tx", "export", "--format", format, "--out", out,
    ]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, export_m) = tx_m.subcommand().unwrap();
    exporter::export_transactions(kv, export_m)
}

#[test]
fn export_json_is_oldest_first() {
    let kv = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    run_export(&kv, "json", &out_path.to_string_lossy()).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let items = written.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["description"], json!("Corner Shop"));
    assert_eq!(items[0]["amount"], json!("12.34"));
    assert_eq!(items[0]["type"], json!("expense"));
    assert_eq!(items[1]["type"], serde_json::Value::Null);
}

#[test]
fn export_csv_quotes_fields() {
    let kv = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    run_export(&kv, "csv", &out_path.to_string_lossy()).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["id", "date", "description", "category", "type", "amount"]
    );
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][2], "Corner Shop");
    assert_eq!(&records[1][2], "Refund, partial");
    assert_eq!(&records[1][4], "");
}

#[test]
fn export_empty_store_writes_header_only() {
    let kv = MemoryKv::new();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("empty.csv");
    run_export(&kv, "csv", &out_path.to_string_lossy()).unwrap();
    let text = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(text.lines().count(), 1);
}
