// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Interactive shell for an in-memory `thumbbase` store.
//!
//! Reads one command per line from stdin. When stdin is a terminal a `> ` prompt is shown;
//! piped input is processed silently. Set `RUST_LOG=thumbbase=debug` to trace transactions.

use clap::Parser;
use std::{
    io::{self, IsTerminal},
    process::ExitCode,
};
use thumbbase::{Config, KeyValueStore, RollbackGuard, command};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Refuse to roll back while the outermost open transaction has recorded nothing.
    #[arg(long)]
    legacy_rollback_guard: bool,

    /// Number of keys to reserve space for up front.
    #[arg(long, default_value_t = 0)]
    capacity: usize,
}

impl Args {
    fn config(&self) -> Config {
        let guard = if self.legacy_rollback_guard {
            RollbackGuard::OutermostNonEmpty
        } else {
            RollbackGuard::TopmostBlock
        };
        Config::default()
            .with_capacity(self.capacity)
            .with_rollback_guard(guard)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut store = KeyValueStore::with_config(args.config());
    let stdin = io::stdin();
    let prompt = stdin.is_terminal().then_some("> ");

    match command::run_session(&mut store, stdin.lock(), io::stdout(), io::stderr(), prompt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
