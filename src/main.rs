// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! tiergov - adaptive rendering governor
//!
//! Entry point for the tiergov CLI application.

use clap::Parser;

use tiergov::cli::{Cli, Commands};
use tiergov::commands;
use tiergov::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on governor diagnostics without knowing target names.
    // `RUST_LOG` still takes precedence.
    if cli.verbose > 0 {
        let level = if cli.verbose > 1 { "trace" } else { "debug" };
        for target in [
            "tiergov.probe",
            "tiergov.sampler",
            "tiergov.governor",
            "tiergov.flag",
            "tiergov.component",
            "tiergov.config",
        ] {
            if let Ok(parsed) = format!("{}={}", target, level).parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    // Settings commands must work on a broken file, so they load it themselves
    if let Commands::Settings(args) = &cli.command {
        return commands::settings::execute(args.command, config, &cli.format);
    }

    let settings = commands::load_settings(config)?;

    match &cli.command {
        Commands::Probe(args) => commands::probe::execute(args, &settings, &cli.format)?,
        Commands::Simulate(args) => commands::simulate::execute(args, &settings, &cli.format)?,
        Commands::Watch(args) => commands::watch::execute(args, &settings, &cli.format).await?,
        Commands::Demo(args) => commands::demo::execute(args, &settings, &cli.format).await?,
        Commands::Settings(_) => {}
    }

    Ok(())
}
