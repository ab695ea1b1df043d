// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Grouped sums over a transaction snapshot.
//!
//! Sums saturate at [`Decimal::MAX`] instead of overflowing.

use std::collections::BTreeMap;

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use rust_decimal::Decimal;

use crate::models::Transaction;

/// Total amount per category. Blank categories are grouped under
/// [`crate::models::UNCATEGORIZED`].
pub fn category_totals(txns: &[Transaction]) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in txns {
        let total = totals
            .entry(t.category_or_default().to_string())
            .or_insert(Decimal::ZERO);
        *total = total.saturating_add(t.amount);
    }
    totals
}

/// Total amount per local calendar month, keyed `YYYY-MM`.
pub fn monthly_totals(txns: &[Transaction]) -> BTreeMap<String, Decimal> {
    monthly_totals_in(txns, &Local)
}

/// Like [`monthly_totals`] but bucketing dates in the given time zone.
pub fn monthly_totals_in<Tz: TimeZone>(txns: &[Transaction], tz: &Tz) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in txns {
        let local = t.date.with_timezone(tz);
        let key = format!("{}-{:02}", local.year(), local.month());
        let total = totals.entry(key).or_insert(Decimal::ZERO);
        *total = total.saturating_add(t.amount);
    }
    totals
}

pub fn grand_total(txns: &[Transaction]) -> Decimal {
    sum_amounts(txns.iter())
}

/// Saturating sum of the amounts of `txns`.
pub fn sum_amounts<'a>(txns: impl Iterator<Item = &'a Transaction>) -> Decimal {
    txns.fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

/// Short `MM/YY` axis label for a `YYYY-MM` month key.
pub fn month_label(month: &str) -> String {
    match NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d") {
        Ok(d) => d.format("%m/%y").to_string(),
        Err(_) => month.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use std::str::FromStr;

    fn tx(id: &str, amount: &str, category: &str, date: &str) -> Transaction {
        Transaction {
            id: id.into(),
            amount: Decimal::from_str(amount).unwrap(),
            description: format!("tx {id}"),
            category: category.into(),
            date: date.parse().unwrap(),
            kind: None,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("1", "12.40", "Food", "2024-01-03T10:00:00Z"),
            tx("2", "7.60", "Food", "2024-01-20T10:00:00Z"),
            tx("3", "30", "", "2024-02-01T10:00:00Z"),
            tx("4", "100.01", "Travel", "2023-12-31T23:30:00Z"),
        ]
    }

    #[test]
    fn category_totals_group_blank_as_uncategorized() {
        let totals = category_totals(&sample());
        assert_eq!(totals["Food"], Decimal::from(20));
        assert_eq!(totals["Uncategorized"], Decimal::from(30));
        assert_eq!(totals["Travel"], Decimal::from_str("100.01").unwrap());
    }

    #[test]
    fn partitions_conserve_grand_total() {
        let txns = sample();
        let total = grand_total(&txns);
        assert_eq!(category_totals(&txns).values().copied().sum::<Decimal>(), total);
        assert_eq!(
            monthly_totals_in(&txns, &Utc).values().copied().sum::<Decimal>(),
            total
        );
        assert_eq!(monthly_totals(&txns).values().copied().sum::<Decimal>(), total);
    }

    #[test]
    fn monthly_buckets_follow_the_time_zone() {
        let txns = sample();
        let utc = monthly_totals_in(&txns, &Utc);
        assert_eq!(
            utc.keys().collect::<Vec<_>>(),
            vec!["2023-12", "2024-01", "2024-02"]
        );

        // 23:30 UTC on New Year's Eve is already January at UTC+2.
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let shifted = monthly_totals_in(&txns, &plus_two);
        assert!(!shifted.contains_key("2023-12"));
        assert_eq!(shifted["2024-01"], Decimal::from_str("120.01").unwrap());
    }

    #[test]
    fn empty_input_gives_empty_maps() {
        assert!(category_totals(&[]).is_empty());
        assert!(monthly_totals(&[]).is_empty());
        assert_eq!(grand_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn month_labels() {
        assert_eq!(month_label("2024-03"), "03/24");
        assert_eq!(month_label("bogus"), "bogus");
        assert_eq!(month_label("ab€-03"), "ab€-03");
        assert_eq!(month_label("€€-03"), "€€-03");
    }

    #[test]
    fn huge_amounts_saturate() {
        let txns = vec![
            tx("1", "79228162514264337593543950335", "Food", "2024-01-03T10:00:00Z"),
            tx("2", "79228162514264337593543950335", "Food", "2024-01-04T10:00:00Z"),
        ];
        assert_eq!(category_totals(&txns)["Food"], Decimal::MAX);
        assert_eq!(monthly_totals_in(&txns, &Utc)["2024-01"], Decimal::MAX);
        assert_eq!(grand_total(&txns), Decimal::MAX);
    }
}
