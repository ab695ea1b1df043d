// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spending windows and budget threshold alerts.
//!
//! All window math happens in the time zone of the `now` passed in, so the
//! "day", "week" and "month" are the user's local calendar periods.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::error::{Error, Result};
use crate::kv::KvStore;
use crate::models::Transaction;

/// Percentage of a budget at which the near-limit warning starts.
pub const NEAR_LIMIT_PERCENT: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

pub const ALERT_ACKS_KEY: &str = "budgetAlertAcks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetWindow {
    Daily,
    Weekly,
    Monthly,
}

impl BudgetWindow {
    pub const ALL: [BudgetWindow; 3] = [
        BudgetWindow::Daily,
        BudgetWindow::Weekly,
        BudgetWindow::Monthly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BudgetWindow::Daily => "daily",
            BudgetWindow::Weekly => "weekly",
            BudgetWindow::Monthly => "monthly",
        }
    }

    /// Whether `date` falls in this window as seen from `now`.
    ///
    /// The weekly window runs from Sunday midnight up to and including `now`;
    /// the daily and monthly windows cover the whole calendar day or month.
    pub fn contains<Tz: TimeZone>(&self, date: &DateTime<chrono::Utc>, now: &DateTime<Tz>) -> bool {
        let local = date.with_timezone(&now.timezone());
        match self {
            BudgetWindow::Daily => local.date_naive() == now.date_naive(),
            BudgetWindow::Weekly => {
                local.date_naive() >= week_start(now) && date.timestamp_millis() <= now.timestamp_millis()
            }
            BudgetWindow::Monthly => local.year() == now.year() && local.month() == now.month(),
        }
    }

    /// Identifies the current period, e.g. `2024-03-06` for a day.
    pub fn period_key<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String {
        match self {
            BudgetWindow::Daily => now.date_naive().to_string(),
            BudgetWindow::Weekly => format!("week-of-{}", week_start(now)),
            BudgetWindow::Monthly => format!("{}-{:02}", now.year(), now.month()),
        }
    }
}

impl fmt::Display for BudgetWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calendar date of the most recent Sunday (today, if today is Sunday).
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    let today = now.date_naive();
    today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
}

/// Configured thresholds. `None` means no budget for that window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Budgets {
    pub daily: Option<Decimal>,
    pub weekly: Option<Decimal>,
    pub monthly: Option<Decimal>,
}

impl Budgets {
    /// The threshold for `window`, ignoring zero or negative values.
    pub fn get(&self, window: BudgetWindow) -> Option<Decimal> {
        let v = match window {
            BudgetWindow::Daily => self.daily,
            BudgetWindow::Weekly => self.weekly,
            BudgetWindow::Monthly => self.monthly,
        };
        v.filter(|b| *b > Decimal::ZERO)
    }
}

pub fn spent_in<Tz: TimeZone>(
    txns: &[Transaction],
    window: BudgetWindow,
    now: &DateTime<Tz>,
) -> Decimal {
    aggregate::sum_amounts(txns.iter().filter(|t| window.contains(&t.date, now)))
}

/// `spent / budget * 100`, or `None` on overflow.
fn percentage(spent: Decimal, budget: Decimal) -> Option<Decimal> {
    spent
        .checked_div(budget)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    /// At least 90% but under 100%; carries the rounded percentage.
    NearLimit { percent: u32 },
    Exceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetAlert {
    pub window: BudgetWindow,
    pub level: AlertLevel,
}

impl fmt::Display for BudgetAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            AlertLevel::NearLimit { percent } => {
                write!(f, "You've used {}% of your {} budget", percent, self.window)
            }
            AlertLevel::Exceeded => write!(f, "You've exceeded your {} budget", self.window),
        }
    }
}

/// Alerts for every configured budget at or above the warning threshold,
/// in daily, weekly, monthly order.
///
/// This is a derived value: calling it again while a threshold is still
/// crossed yields the same alert again. See [`AlertLedger`] for fire-once
/// behavior.
pub fn evaluate<Tz: TimeZone>(
    txns: &[Transaction],
    budgets: &Budgets,
    now: &DateTime<Tz>,
) -> Vec<BudgetAlert> {
    let mut alerts = Vec::new();
    for window in BudgetWindow::ALL {
        let Some(budget) = budgets.get(window) else {
            continue;
        };
        let spent = spent_in(txns, window, now);
        let level = match percentage(spent, budget) {
            None => Some(AlertLevel::Exceeded),
            Some(p) if p >= Decimal::ONE_HUNDRED => Some(AlertLevel::Exceeded),
            Some(p) if p >= NEAR_LIMIT_PERCENT => {
                let rounded = p.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                Some(AlertLevel::NearLimit {
                    percent: rounded.to_u32().unwrap_or(100),
                })
            }
            Some(_) => None,
        };
        if let Some(level) = level {
            alerts.push(BudgetAlert { window, level });
        }
    }
    alerts
}

pub fn alert_messages(alerts: &[BudgetAlert]) -> Vec<String> {
    alerts.iter().map(|a| a.to_string()).collect()
}

/// Spend against budget for one window, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetProgress {
    pub window: BudgetWindow,
    pub spent: Decimal,
    pub budget: Option<Decimal>,
    /// Share of the budget used, capped at 100 for progress bars.
    pub percent: Option<Decimal>,
    pub over_budget: bool,
}

pub fn progress<Tz: TimeZone>(
    txns: &[Transaction],
    budgets: &Budgets,
    now: &DateTime<Tz>,
) -> Vec<BudgetProgress> {
    BudgetWindow::ALL
        .into_iter()
        .map(|window| {
            let spent = spent_in(txns, window, now);
            let budget = budgets.get(window);
            let percent = budget.map(|b| {
                percentage(spent, b)
                    .unwrap_or(Decimal::ONE_HUNDRED)
                    .min(Decimal::ONE_HUNDRED)
                    .round_dp(1)
            });
            BudgetProgress {
                window,
                spent,
                budget,
                percent,
                over_budget: budget.is_some_and(|b| spent > b),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Acknowledgement {
    period: String,
    exceeded: bool,
}

/// Remembers which alerts the user has already seen, per window and period.
///
/// An acknowledged near-limit warning stays quiet for the rest of its period
/// but an escalation to "exceeded" fires again. A new period starts fresh.
pub struct AlertLedger<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> AlertLedger<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    fn load(&self) -> Result<BTreeMap<BudgetWindow, Acknowledgement>> {
        Ok(decode_acks(self.kv.get(ALERT_ACKS_KEY)?.as_deref()))
    }

    /// The subset of `alerts` not yet acknowledged in the current period.
    pub fn fresh<Tz: TimeZone>(
        &self,
        alerts: &[BudgetAlert],
        now: &DateTime<Tz>,
    ) -> Result<Vec<BudgetAlert>> {
        let acks = self.load()?;
        Ok(alerts
            .iter()
            .filter(|a| {
                let ack = Acknowledgement {
                    period: a.window.period_key(now),
                    exceeded: a.level == AlertLevel::Exceeded,
                };
                acks.get(&a.window) != Some(&ack)
            })
            .copied()
            .collect())
    }

    pub fn acknowledge<Tz: TimeZone>(&self, alerts: &[BudgetAlert], now: &DateTime<Tz>) -> Result<()> {
        if alerts.is_empty() {
            return Ok(());
        }
        self.kv.update(ALERT_ACKS_KEY, &mut |raw| {
            let mut acks = decode_acks(raw.as_deref());
            for a in alerts {
                acks.insert(
                    a.window,
                    Acknowledgement {
                        period: a.window.period_key(now),
                        exceeded: a.level == AlertLevel::Exceeded,
                    },
                );
            }
            serde_json::to_string(&acks)
                .map(Some)
                .map_err(|e| Error::Serialize("alert acknowledgements", e))
        })
    }
}

fn decode_acks(raw: Option<&str>) -> BTreeMap<BudgetWindow, Acknowledgement> {
    raw.and_then(|s| {
        serde_json::from_str(s)
            .inspect_err(|e| tracing::warn!("ignoring unreadable alert acknowledgements: {e}"))
            .ok()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use chrono::{FixedOffset, Utc};
    use std::str::FromStr;

    fn tx(amount: &str, date: &str) -> Transaction {
        Transaction {
            id: date.into(),
            amount: Decimal::from_str(amount).unwrap(),
            description: "spend".into(),
            category: "Food".into(),
            date: date.parse().unwrap(),
            kind: None,
        }
    }

    // Wednesday.
    fn now() -> DateTime<Utc> {
        "2024-03-06T15:00:00Z".parse().unwrap()
    }

    fn daily(amount: i64) -> Budgets {
        Budgets {
            daily: Some(Decimal::from(amount)),
            ..Budgets::default()
        }
    }

    #[test]
    fn daily_thresholds() {
        let near = evaluate(&[tx("90", "2024-03-06T08:00:00Z")], &daily(100), &now());
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].to_string(), "You've used 90% of your daily budget");
        assert!(near[0].to_string().contains("90%"));

        let over = evaluate(&[tx("150", "2024-03-06T08:00:00Z")], &daily(100), &now());
        assert_eq!(
            alert_messages(&over),
            vec!["You've exceeded your daily budget".to_string()]
        );

        let under = evaluate(&[tx("50", "2024-03-06T08:00:00Z")], &daily(100), &now());
        assert!(under.is_empty());
    }

    #[test]
    fn exactly_one_hundred_percent_is_exceeded() {
        let alerts = evaluate(&[tx("100", "2024-03-06T08:00:00Z")], &daily(100), &now());
        assert_eq!(alerts[0].level, AlertLevel::Exceeded);
    }

    #[test]
    fn near_limit_percent_is_rounded() {
        let alerts = evaluate(&[tx("94.5", "2024-03-06T08:00:00Z")], &daily(100), &now());
        assert_eq!(alerts[0].level, AlertLevel::NearLimit { percent: 95 });
    }

    #[test]
    fn missing_or_zero_budgets_are_skipped() {
        let txns = [tx("1000", "2024-03-06T08:00:00Z")];
        assert!(evaluate(&txns, &Budgets::default(), &now()).is_empty());
        assert!(evaluate(&txns, &daily(0), &now()).is_empty());
    }

    #[test]
    fn weekly_window_starts_sunday_midnight_and_ends_now() {
        let txns = [
            tx("10", "2024-03-02T23:59:59Z"), // Saturday before
            tx("20", "2024-03-03T00:00:00Z"), // Sunday start
            tx("30", "2024-03-06T14:59:00Z"),
            tx("40", "2024-03-06T15:00:01Z"), // after now
        ];
        assert_eq!(week_start(&now()).to_string(), "2024-03-03");
        assert_eq!(spent_in(&txns, BudgetWindow::Weekly, &now()), Decimal::from(50));
        // The daily window is the whole calendar day.
        assert_eq!(spent_in(&txns, BudgetWindow::Daily, &now()), Decimal::from(70));
        assert_eq!(spent_in(&txns, BudgetWindow::Monthly, &now()), Decimal::from(100));
    }

    #[test]
    fn sunday_is_its_own_week_start() {
        let sunday: DateTime<Utc> = "2024-03-10T09:00:00Z".parse().unwrap();
        assert_eq!(week_start(&sunday).to_string(), "2024-03-10");
    }

    #[test]
    fn windows_use_the_callers_time_zone() {
        // 22:00 UTC on the 5th is already the 6th at UTC+3.
        let txns = [tx("25", "2024-03-05T22:00:00Z")];
        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();
        let local_now = now().with_timezone(&plus_three);
        assert_eq!(spent_in(&txns, BudgetWindow::Daily, &now()), Decimal::ZERO);
        assert_eq!(spent_in(&txns, BudgetWindow::Daily, &local_now), Decimal::from(25));
    }

    #[test]
    fn alerts_come_in_window_order() {
        let txns = [
            tx("95", "2024-03-06T08:00:00Z"),
            tx("400", "2024-03-04T08:00:00Z"),
            tx("10", "2024-03-01T08:00:00Z"),
        ];
        let budgets = Budgets {
            daily: Some(Decimal::from(100)),
            weekly: Some(Decimal::from(450)),
            monthly: Some(Decimal::from(5000)),
        };
        let alerts = evaluate(&txns, &budgets, &now());
        assert_eq!(
            alert_messages(&alerts),
            vec![
                "You've used 95% of your daily budget".to_string(),
                "You've exceeded your weekly budget".to_string(),
            ]
        );
        // Re-evaluating fires the same alerts again.
        assert_eq!(evaluate(&txns, &budgets, &now()), alerts);
    }

    #[test]
    fn progress_caps_percent_and_flags_overspend() {
        let txns = [tx("150", "2024-03-06T08:00:00Z")];
        let budgets = Budgets {
            daily: Some(Decimal::from(100)),
            weekly: Some(Decimal::from(600)),
            monthly: None,
        };
        let p = progress(&txns, &budgets, &now());
        assert_eq!(p.len(), 3);
        assert_eq!(p[0].percent, Some(Decimal::from(100)));
        assert!(p[0].over_budget);
        assert_eq!(p[1].percent, Some(Decimal::from(25)));
        assert!(!p[1].over_budget);
        assert_eq!(p[2].budget, None);
        assert_eq!(p[2].percent, None);
        assert_eq!(p[2].spent, Decimal::from(150));
    }

    #[test]
    fn ledger_suppresses_acknowledged_alerts_until_escalation() {
        let kv = MemoryKv::new();
        let ledger = AlertLedger::new(&kv);
        let near = [BudgetAlert {
            window: BudgetWindow::Daily,
            level: AlertLevel::NearLimit { percent: 91 },
        }];
        assert_eq!(ledger.fresh(&near, &now()).unwrap(), near.to_vec());
        ledger.acknowledge(&near, &now()).unwrap();

        let nearer = [BudgetAlert {
            window: BudgetWindow::Daily,
            level: AlertLevel::NearLimit { percent: 97 },
        }];
        assert!(ledger.fresh(&nearer, &now()).unwrap().is_empty());

        let exceeded = [BudgetAlert {
            window: BudgetWindow::Daily,
            level: AlertLevel::Exceeded,
        }];
        assert_eq!(ledger.fresh(&exceeded, &now()).unwrap(), exceeded.to_vec());

        let tomorrow: DateTime<Utc> = "2024-03-07T09:00:00Z".parse().unwrap();
        assert_eq!(ledger.fresh(&nearer, &tomorrow).unwrap(), nearer.to_vec());
    }

    #[test]
    fn huge_spending_counts_as_exceeded() {
        let max = "79228162514264337593543950335";
        let txns = [tx(max, "2024-03-06T08:00:00Z"), tx(max, "2024-03-06T09:00:00Z")];
        assert_eq!(spent_in(&txns, BudgetWindow::Daily, &now()), Decimal::MAX);
        let alerts = evaluate(&txns, &daily(100), &now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Exceeded);
        let rows = progress(&txns, &daily(100), &now());
        assert_eq!(rows[0].percent, Some(Decimal::ONE_HUNDRED));
        assert!(rows[0].over_budget);
    }
}
