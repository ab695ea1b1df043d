// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! String key-value persistence that the stores serialize their data into.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::db;
use crate::error::{Error, Result};

/// Mutation closure passed to [`KvStore::update`].
///
/// Receives the current value and returns the value to write, or `None` to
/// leave the key untouched.
pub type Mutation<'a> = &'a mut dyn FnMut(Option<String>) -> Result<Option<String>>;

pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Read-modify-write of a single key.
    ///
    /// Implementations must make the read and the write one unit so two
    /// writers cannot interleave and drop each other's changes. The default
    /// only suits stores with a single writer.
    fn update(&self, key: &str, f: Mutation<'_>) -> Result<()> {
        let current = self.get(key)?;
        if let Some(next) = f(current)? {
            self.set(key, &next)?;
        }
        Ok(())
    }
}

/// Key-value store kept in the `kv` table of a SQLite database.
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    /// Wraps a connection whose schema has already been initialized.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        db::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn read(conn: &Connection, key: &str) -> Result<Option<String>> {
        let v = conn
            .query_row("SELECT value FROM kv WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(v)
    }

    fn write(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO kv(key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::read(&self.conn, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::write(&self.conn, key, value)
    }

    fn update(&self, key: &str, f: Mutation<'_>) -> Result<()> {
        // IMMEDIATE takes the write lock up front, so a second writer waits
        // instead of failing the lock upgrade halfway through.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let current = Self::read(&tx, key)?;
        if let Some(next) = f(current)? {
            Self::write(&tx, key, &next)?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// In-process store, used by tests and embedders without a database.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| Error::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Error::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn update(&self, key: &str, f: Mutation<'_>) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Error::Poisoned)?;
        if let Some(next) = f(entries.get(key).cloned())? {
            entries.insert(key.to_string(), next);
        }
        Ok(())
    }
}
