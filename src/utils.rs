// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Midday local time on `date`, as stored for back-dated entries.
pub fn local_noon(date: NaiveDate) -> Result<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(12, 0, 0)
        .with_context(|| format!("Invalid date '{}'", date))?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("'{}' does not exist in the local time zone", naive))?;
    Ok(local.with_timezone(&Utc))
}

/// Local calendar date of a stored timestamp, for display.
pub fn local_day(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// A required argument; clap enforces presence, this keeps handlers free of
/// panics when called with hand-built matches.
pub fn required_arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("Missing required argument '{}'", name))
}

/// `on`/`off` style switch values from the command line.
pub fn parse_switch(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(anyhow::anyhow!("Invalid switch '{}', expected on|off", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_dates_and_switches() {
        let d = parse_date(" 2024-02-29 ").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 2, 29));
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_switch("On").unwrap());
        assert!(!parse_switch("no").unwrap());
        assert!(parse_switch("maybe").is_err());
    }

    #[test]
    fn local_noon_stays_on_the_same_local_day() {
        let d = parse_date("2024-07-04").unwrap();
        let at = local_noon(d).unwrap();
        assert_eq!(at.with_timezone(&Local).date_naive(), d);
    }
}
