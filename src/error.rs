// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Library level error types.

/// Input rejected before anything is written to storage.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount is required")]
    MissingAmount,

    #[error("invalid amount '{0}', expected a non-negative number")]
    InvalidAmount(String),

    #[error("description is required")]
    MissingDescription,

    #[error("unknown transaction type '{0}', expected expense or income")]
    InvalidType(String),

    #[error("category name is required")]
    EmptyCategory,

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("category '{0}' not found")]
    UnknownCategory(String),

    /// The built-in categories can be recolored but never removed.
    #[error("cannot delete default category '{0}'")]
    ProtectedCategory(String),

    #[error("invalid color '{0}', expected a hex color such as #FF0000")]
    InvalidColor(String),

    #[error("unsupported currency '{0}'")]
    InvalidCurrency(String),

    #[error("invalid {0} budget '{1}', expected a positive number")]
    InvalidBudget(&'static str, String),

    #[error("name is required")]
    MissingName,

    /// A list option such as a sort field or filter was not recognised.
    #[error("invalid {0} '{1}'")]
    InvalidOption(&'static str, String),
}

/// The errors that may occur while reading or writing persisted data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The underlying key-value store failed to read or write.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A value could not be encoded before writing.
    #[error("could not serialize {0}: {1}")]
    Serialize(&'static str, serde_json::Error),

    /// Raised by in-process stores when a previous writer panicked.
    #[error("storage lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, Error>;
