// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Diagnostic logging for the command line binary.

use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Environment variable holding the log filter, e.g. `PENNYWISE_LOG=debug`.
pub const LOG_ENV: &str = "PENNYWISE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Sends `tracing` output to stderr so table and JSON output on stdout stays
/// clean. Calling it twice is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init();
}
