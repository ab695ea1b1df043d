// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Bucket name for transactions recorded without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(TransactionType::Expense),
            "income" => Ok(TransactionType::Income),
            other => Err(ValidationError::InvalidType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
}

impl Transaction {
    /// The category used for grouping, with blanks folded into
    /// [`UNCATEGORIZED`].
    pub fn category_or_default(&self) -> &str {
        if self.category.is_empty() {
            UNCATEGORIZED
        } else {
            &self.category
        }
    }
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// A validated transaction waiting for an id and timestamp from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub kind: Option<TransactionType>,
}

impl NewTransaction {
    /// Validates raw user input. Nothing reaches the store unless every field
    /// checks out.
    pub fn parse(
        amount: &str,
        description: &str,
        category: &str,
        kind: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let amount = parse_amount(amount)?;
        let description = parse_description(description)?;
        let kind = kind.map(TransactionType::from_str).transpose()?;
        Ok(Self {
            amount,
            description,
            category: category.trim().to_string(),
            kind,
        })
    }
}

/// Fields to merge into an existing transaction; `None` keeps the old value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// `Some(None)` clears the type.
    pub kind: Option<Option<TransactionType>>,
}

impl TransactionPatch {
    pub fn parse(
        amount: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
        kind: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            amount: amount.map(parse_amount).transpose()?,
            description: description.map(parse_description).transpose()?,
            category: category.map(|c| c.trim().to_string()),
            kind: kind.map(parse_optional_type).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, t: &mut Transaction) {
        if let Some(amount) = self.amount {
            t.amount = amount;
        }
        if let Some(ref description) = self.description {
            t.description = description.clone();
        }
        if let Some(ref category) = self.category {
            t.category = category.clone();
        }
        if let Some(kind) = self.kind {
            t.kind = kind;
        }
    }
}

/// A type for an edit, where `none` means no type.
fn parse_optional_type(s: &str) -> Result<Option<TransactionType>, ValidationError> {
    if s.trim().eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        TransactionType::from_str(s).map(Some)
    }
}

pub fn parse_amount(s: &str) -> Result<Decimal, ValidationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ValidationError::MissingAmount);
    }
    let d = s
        .parse::<Decimal>()
        .map_err(|_| ValidationError::InvalidAmount(s.to_string()))?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(ValidationError::InvalidAmount(s.to_string()));
    }
    Ok(d)
}

fn parse_description(s: &str) -> Result<String, ValidationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ValidationError::MissingDescription);
    }
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;

    #[test]
    fn parse_rejects_missing_and_non_numeric_amounts() {
        assert_eq!(
            NewTransaction::parse("", "Coffee", "Food", None),
            Err(ValidationError::MissingAmount)
        );
        assert_eq!(
            NewTransaction::parse("abc", "Coffee", "Food", None),
            Err(ValidationError::InvalidAmount("abc".into()))
        );
        assert_eq!(
            NewTransaction::parse("-3", "Coffee", "Food", None),
            Err(ValidationError::InvalidAmount("-3".into()))
        );
        assert_eq!(
            NewTransaction::parse("3", "   ", "Food", None),
            Err(ValidationError::MissingDescription)
        );
    }

    #[test]
    fn parse_trims_and_reads_type() {
        let t = NewTransaction::parse(" 25.5 ", " Coffee ", " Food ", Some("Expense")).unwrap();
        assert_eq!(t.amount, Decimal::from_str("25.5").unwrap());
        assert_eq!(t.description, "Coffee");
        assert_eq!(t.category, "Food");
        assert_eq!(t.kind, Some(TransactionType::Expense));

        assert_eq!(
            NewTransaction::parse("1", "x", "y", Some("transfer")),
            Err(ValidationError::InvalidType("transfer".into()))
        );
    }

    #[test]
    fn loads_legacy_records_with_numeric_amounts() {
        let raw = r#"{"amount":12.5,"description":"Lunch","category":null,
            "id":"1700000000000","date":"2024-01-15T10:30:00.000Z"}"#;
        let t: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(t.amount, Decimal::from_str("12.5").unwrap());
        assert_eq!(t.category, "");
        assert_eq!(t.category_or_default(), UNCATEGORIZED);
        assert_eq!(t.kind, None);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut t: Transaction = serde_json::from_str(
            r#"{"id":"1","amount":"10","description":"Bus","category":"Transport",
                "date":"2024-03-01T08:00:00Z","type":"expense"}"#,
        )
        .unwrap();
        let patch = TransactionPatch::parse(Some("12"), None, Some("Travel"), None).unwrap();
        patch.apply(&mut t);
        assert_eq!(t.amount, Decimal::from(12));
        assert_eq!(t.description, "Bus");
        assert_eq!(t.category, "Travel");
        assert_eq!(t.kind, Some(TransactionType::Expense));
        assert!(TransactionPatch::default().is_empty());
    }

    #[test]
    fn patch_can_clear_the_type() {
        let mut t: Transaction = serde_json::from_str(
            r#"{"id":"1","amount":"10","description":"Bus","category":"Transport",
                "date":"2024-03-01T08:00:00Z","type":"income"}"#,
        )
        .unwrap();
        let patch = TransactionPatch::parse(None, None, None, Some("None")).unwrap();
        assert!(!patch.is_empty());
        patch.apply(&mut t);
        assert_eq!(t.kind, None);
        assert!(!serde_json::to_string(&t).unwrap().contains("\"type\""));

        assert_eq!(
            TransactionPatch::parse(None, None, None, Some("transfer")),
            Err(ValidationError::InvalidType("transfer".into()))
        );
    }
}
