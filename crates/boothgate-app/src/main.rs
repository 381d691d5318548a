// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boothgate — photo-booth print arbiter
//
// Entry point. Initialises logging, loads the printer config, picks a printer
// backend, and drives the arbiter from stdin until `quit` or end of input.

mod host;
mod services;

use std::sync::Arc;

use boothgate_print::PrintArbiter;

use host::ConsoleHost;
use services::data_dir;
use services::display::ConsoleDisplay;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Boothgate starting");

    let config = data_dir::load_config(&data_dir::config_path());
    let backend = boothgate_bridge::printer_backend(&config);
    let arbiter = PrintArbiter::new(config, backend, Arc::new(ConsoleDisplay));

    let mut host = ConsoleHost::new(&arbiter);
    if let Err(e) = host.run(std::io::stdin().lock(), std::io::stdout().lock()) {
        tracing::error!(error = %e, "host loop stopped on I/O error");
    }

    arbiter.shutdown();
    tracing::info!(
        printed = host.quota().printed(),
        "Boothgate stopped"
    );
}
