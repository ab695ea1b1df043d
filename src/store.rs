// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction persistence on top of a [`KvStore`].
//!
//! The whole collection lives as one JSON array under [`TRANSACTIONS_KEY`].
//! Every mutation goes through [`KvStore::update`], so the read, merge and
//! write happen as one unit and concurrent writers cannot lose each other's
//! records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::error::{Error, Result};
use crate::kv::KvStore;
use crate::models::{NewTransaction, Transaction, TransactionPatch};

pub const TRANSACTIONS_KEY: &str = "transactions";

pub struct TransactionStore<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> TransactionStore<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    /// All stored transactions in insertion order.
    ///
    /// Missing or unreadable data yields an empty list; only a failing store
    /// is reported as an error.
    pub fn list(&self) -> Result<Vec<Transaction>> {
        let raw = self
            .kv
            .get(TRANSACTIONS_KEY)
            .inspect_err(|e| tracing::error!("error getting transactions: {e}"))?;
        Ok(decode(raw.as_deref()))
    }

    pub fn get(&self, id: &str) -> Result<Option<Transaction>> {
        Ok(self.list()?.into_iter().find(|t| t.id == id))
    }

    /// Stores a new transaction stamped with the current time.
    pub fn append(&self, new: NewTransaction) -> Result<Transaction> {
        self.append_at(new, Utc::now())
    }

    /// Stores a new transaction with an explicit timestamp.
    pub fn append_at(&self, new: NewTransaction, at: DateTime<Utc>) -> Result<Transaction> {
        let mut created = Transaction {
            id: String::new(),
            amount: new.amount,
            description: new.description,
            category: new.category,
            date: at,
            kind: new.kind,
        };
        self.kv
            .update(TRANSACTIONS_KEY, &mut |raw| {
                let mut entries = decode_entries(raw.as_deref());
                created.id = next_id(&entries, at);
                entries.push(Entry::Valid(created.clone()));
                encode(&entries).map(Some)
            })
            .inspect_err(|e| tracing::error!("error saving transaction: {e}"))?;
        tracing::info!(id = %created.id, amount = %created.amount, "transaction recorded");
        Ok(created)
    }

    /// Merges `patch` into the transaction with `id`.
    ///
    /// Returns `false` without writing anything when no such transaction
    /// exists.
    pub fn update(&self, id: &str, patch: &TransactionPatch) -> Result<bool> {
        let mut found = false;
        self.kv
            .update(TRANSACTIONS_KEY, &mut |raw| {
                let mut entries = decode_entries(raw.as_deref());
                let target = entries.iter_mut().find_map(|e| match e {
                    Entry::Valid(t) if t.id == id => Some(t),
                    _ => None,
                });
                match target {
                    Some(t) => {
                        patch.apply(t);
                        found = true;
                        encode(&entries).map(Some)
                    }
                    None => Ok(None),
                }
            })
            .inspect_err(|e| tracing::error!("error updating transaction {id}: {e}"))?;
        if !found {
            tracing::debug!("update skipped, no transaction with id {id}");
        }
        Ok(found)
    }

    /// Deletes the transaction with `id`; `false` when it did not exist.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut found = false;
        self.kv
            .update(TRANSACTIONS_KEY, &mut |raw| {
                let mut entries = decode_entries(raw.as_deref());
                let before = entries.len();
                entries.retain(|e| !matches!(e, Entry::Valid(t) if t.id == id));
                found = entries.len() != before;
                if found {
                    encode(&entries).map(Some)
                } else {
                    Ok(None)
                }
            })
            .inspect_err(|e| tracing::error!("error deleting transaction {id}: {e}"))?;
        Ok(found)
    }

    pub fn category_totals(&self) -> Result<BTreeMap<String, Decimal>> {
        Ok(aggregate::category_totals(&self.list()?))
    }

    pub fn monthly_totals(&self) -> Result<BTreeMap<String, Decimal>> {
        Ok(aggregate::monthly_totals(&self.list()?))
    }
}

/// One element of the stored array. Elements that fail to decode are kept
/// as raw JSON so a mutation writes them back unchanged.
#[derive(Serialize)]
#[serde(untagged)]
enum Entry {
    Valid(Transaction),
    Unreadable(serde_json::Value),
}

impl Entry {
    fn id(&self) -> Option<&str> {
        match self {
            Entry::Valid(t) => Some(&t.id),
            Entry::Unreadable(v) => v.get("id").and_then(serde_json::Value::as_str),
        }
    }
}

/// Time-derived id, bumped past any id already in use.
fn next_id(existing: &[Entry], at: DateTime<Utc>) -> String {
    let mut candidate = at.timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !existing.iter().any(|e| e.id() == Some(id.as_str())) {
            return id;
        }
        candidate += 1;
    }
}

fn decode_entries(raw: Option<&str>) -> Vec<Entry> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("stored transactions are unreadable, treating as empty: {e}");
            return Vec::new();
        }
    };
    values
        .into_iter()
        .map(|v| match Transaction::deserialize(&v) {
            Ok(t) => Entry::Valid(t),
            Err(e) => {
                tracing::warn!("skipping malformed transaction record: {e}");
                Entry::Unreadable(v)
            }
        })
        .collect()
}

fn decode(raw: Option<&str>) -> Vec<Transaction> {
    decode_entries(raw)
        .into_iter()
        .filter_map(|e| match e {
            Entry::Valid(t) => Some(t),
            Entry::Unreadable(_) => None,
        })
        .collect()
}

fn encode(entries: &[Entry]) -> Result<String> {
    serde_json::to_string(entries).map_err(|e| Error::Serialize("transactions", e))
}
