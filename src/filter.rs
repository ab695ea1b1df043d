// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Search, filter and sort for the transaction list view.
//!
//! A [`TransactionQuery`] is an immutable snapshot of the list controls.
//! Changing a control produces a new query; [`filter_sort`] turns a query and
//! a transaction snapshot into the rows to display.
//!
//! Every sort field compares in its natural ascending direction (oldest date,
//! smallest amount, A to Z). [`SortOrder::Desc`] reverses that for all three
//! fields alike.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::{Transaction, TransactionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Expense,
    Income,
}

impl TypeFilter {
    fn matches(&self, kind: Option<TransactionType>) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Expense => kind == Some(TransactionType::Expense),
            TypeFilter::Income => kind == Some(TransactionType::Income),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "expense" => Ok(TypeFilter::Expense),
            "income" => Ok(TypeFilter::Income),
            _ => Err(ValidationError::InvalidOption("type filter", s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl From<&str> for CategoryFilter {
    fn from(s: &str) -> Self {
        if s == "all" {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(s.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Date,
    Amount,
    Category,
}

impl FromStr for SortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortBy::Date),
            "amount" => Ok(SortBy::Amount),
            "category" => Ok(SortBy::Category),
            _ => Err(ValidationError::InvalidOption("sort field", s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::InvalidOption("sort order", s.to_string())),
        }
    }
}

/// List controls. The default shows everything, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionQuery {
    pub search: String,
    pub filter_type: TypeFilter,
    pub filter_category: CategoryFilter,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl TransactionQuery {
    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self
        }
    }

    pub fn with_type(self, filter_type: TypeFilter) -> Self {
        Self {
            filter_type,
            ..self
        }
    }

    pub fn with_category(self, filter_category: CategoryFilter) -> Self {
        Self {
            filter_category,
            ..self
        }
    }

    pub fn with_sort(self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        Self {
            sort_by,
            sort_order,
            ..self
        }
    }

    pub fn toggle_order(self) -> Self {
        Self {
            sort_order: self.sort_order.toggled(),
            ..self
        }
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            if !t.description.to_lowercase().contains(&needle)
                && !t.category.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if !self.filter_type.matches(t.kind) {
            return false;
        }
        match &self.filter_category {
            CategoryFilter::All => true,
            CategoryFilter::Named(c) => &t.category == c,
        }
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let natural = match self.sort_by {
            SortBy::Date => a.date.cmp(&b.date),
            SortBy::Amount => a.amount.cmp(&b.amount),
            SortBy::Category => compare_names(&a.category, &b.category),
        };
        match self.sort_order {
            SortOrder::Asc => natural,
            SortOrder::Desc => natural.reverse(),
        }
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Rows matching `query`, in its sort order. Equal keys keep their input
/// order.
pub fn filter_sort(txns: &[Transaction], query: &TransactionQuery) -> Vec<Transaction> {
    let mut out: Vec<Transaction> = txns.iter().filter(|t| query.matches(t)).cloned().collect();
    out.sort_by(|a, b| query.compare(a, b));
    out
}

/// Distinct categories in first-seen order, for the category filter picker.
pub fn unique_categories(txns: &[Transaction]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for t in txns {
        if !seen.iter().any(|c| c == &t.category) {
            seen.push(t.category.clone());
        }
    }
    seen
}
