// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::filter::unique_categories;
use crate::kv::KvStore;
use crate::profile::{is_default_category, ProfileStore};
use crate::store::TransactionStore;
use crate::utils::{maybe_print_json, pretty_table, required_arg};
use anyhow::{Context, Result};

pub fn handle(kv: &dyn KvStore, m: &clap::ArgMatches) -> Result<()> {
    let profiles = ProfileStore::new(kv);
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required_arg(sub, "name")?;
            let mut profile = profiles.load()?;
            profile.add_category(name)?;
            profiles.save(&profile).context("Failed to save category")?;
            println!("Added category '{}'", name.trim());
        }
        Some(("list", _)) => {
            let profile = profiles.load()?;
            let data = profile
                .categories
                .iter()
                .map(|c| {
                    let kind = if is_default_category(&c.name) {
                        "default"
                    } else {
                        "custom"
                    };
                    vec![c.name.clone(), c.color.clone(), kind.to_string()]
                })
                .collect();
            println!("{}", pretty_table(&["Category", "Color", "Kind"], data));
        }
        Some(("used", sub)) => {
            let txns = TransactionStore::new(kv)
                .list()
                .context("Failed to load transactions")?;
            let used = unique_categories(&txns);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &used)? {
                let profile = profiles.load()?;
                let data = used
                    .iter()
                    .map(|c| vec![c.clone(), profile.category_color(c).to_string()])
                    .collect();
                println!("{}", pretty_table(&["Category", "Color"], data));
            }
        }
        Some(("rm", sub)) => {
            let name = required_arg(sub, "name")?;
            let mut profile = profiles.load()?;
            profile.delete_category(name)?;
            profiles.save(&profile).context("Failed to save categories")?;
            println!("Removed category '{}'", name);
        }
        Some(("color", sub)) => {
            let name = required_arg(sub, "name")?;
            let color = required_arg(sub, "color")?;
            let mut profile = profiles.load()?;
            profile.set_category_color(name, color)?;
            profiles.save(&profile).context("Failed to save categories")?;
            println!("Category '{}' is now {}", name, color.trim());
        }
        _ => {}
    }
    Ok(())
}
