// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::kv::KvStore;
use crate::profile::{AvatarType, Currency, ProfileStore, UserProfile};
use crate::utils::{maybe_print_json, parse_switch, pretty_table};
use anyhow::{Context, Result};

pub fn handle(kv: &dyn KvStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(kv, sub)?,
        Some(("set", sub)) => set(kv, sub)?,
        Some(("avatar", sub)) => avatar(kv, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let profile = ProfileStore::new(kv).load()?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &profile)? {
        return Ok(());
    }
    let ccy = profile.currency;
    let budget = |b: Option<rust_decimal::Decimal>| b.map(|v| ccy.format(v)).unwrap_or_else(|| "-".into());
    let on_off = |b: bool| if b { "on" } else { "off" }.to_string();
    let avatar = match profile.avatar_type {
        AvatarType::Image => profile.profile_picture.clone().unwrap_or_else(|| "(none)".into()),
        AvatarType::Emoji => profile.profile_emoji.clone(),
        AvatarType::Color => format!("{} on {}", profile.initial(), profile.profile_color),
    };
    let rows = vec![
        vec!["Name".into(), profile.name.clone()],
        vec!["Email".into(), profile.email.clone()],
        vec!["Phone".into(), profile.phone.clone()],
        vec!["Currency".into(), ccy.to_string()],
        vec!["Daily budget".into(), budget(profile.daily_budget)],
        vec!["Weekly budget".into(), budget(profile.weekly_budget)],
        vec!["Monthly budget".into(), budget(profile.monthly_budget)],
        vec!["Budget alerts".into(), on_off(profile.notifications.budget_alerts)],
        vec!["Weekly report".into(), on_off(profile.notifications.weekly_report)],
        vec!["Monthly report".into(), on_off(profile.notifications.monthly_report)],
        vec!["Category limit".into(), on_off(profile.notifications.category_limit)],
        vec!["Avatar".into(), avatar],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

/// Applies the `profile set` arguments to `profile`.
pub fn apply_set(profile: &mut UserProfile, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(v) = sub.get_one::<String>("name") {
        profile.name = v.trim().to_string();
    }
    if let Some(v) = sub.get_one::<String>("email") {
        profile.email = v.trim().to_string();
    }
    if let Some(v) = sub.get_one::<String>("phone") {
        profile.phone = v.trim().to_string();
    }
    if let Some(v) = sub.get_one::<String>("currency") {
        profile.currency = v.parse::<Currency>()?;
    }
    let n = &mut profile.notifications;
    for (arg, flag) in [
        ("budget-alerts", &mut n.budget_alerts),
        ("weekly-report", &mut n.weekly_report),
        ("monthly-report", &mut n.monthly_report),
        ("category-limit", &mut n.category_limit),
    ] {
        if let Some(v) = sub.get_one::<String>(arg) {
            *flag = parse_switch(v)?;
        }
    }
    Ok(())
}

fn set(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let profiles = ProfileStore::new(kv);
    let mut profile = profiles.load()?;
    apply_set(&mut profile, sub)?;
    profile.validate()?;
    profiles.save(&profile).context("Failed to save profile")?;
    println!("Profile updated successfully");
    Ok(())
}

fn avatar(kv: &dyn KvStore, sub: &clap::ArgMatches) -> Result<()> {
    let profiles = ProfileStore::new(kv);
    let mut profile = profiles.load()?;
    if let Some(emoji) = sub.get_one::<String>("emoji") {
        profile.set_avatar_emoji(emoji.trim());
    } else if let Some(color) = sub.get_one::<String>("color") {
        profile.set_avatar_color(color)?;
    } else if let Some(uri) = sub.get_one::<String>("image") {
        profile.set_avatar_image(uri.trim());
    } else {
        anyhow::bail!("Choose one of --emoji, --color or --image");
    }
    profiles.save(&profile).context("Failed to save avatar")?;
    println!("Avatar updated");
    Ok(())
}
