// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use pennywise::kv::KvStore;
use pennywise::{cli, commands, db, logging};

fn main() -> Result<()> {
    logging::init();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let kv = db::open_or_init()?;
    let kv: &dyn KvStore = &kv;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(kv, sub)?,
        Some(("report", sub)) => commands::reports::handle(kv, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(kv, sub)?,
        Some(("category", sub)) => commands::categories::handle(kv, sub)?,
        Some(("profile", sub)) => commands::profile::handle(kv, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
