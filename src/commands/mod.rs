// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Subcommand implementations for the `tiergov` binary

pub mod demo;
pub mod probe;
pub mod settings;
pub mod simulate;
pub mod watch;

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::Result;
use crate::probe::{Environment, SnapshotEnvironment, SystemEnvironment};

/// Settings file to use: `--config` when given, else the default location.
pub fn settings_path(config: Option<&Path>) -> PathBuf {
    config
        .map(Path::to_path_buf)
        .unwrap_or_else(Settings::default_path)
}

/// Load settings from `--config` or the default location.
pub fn load_settings(config: Option<&Path>) -> Result<Settings> {
    Settings::load_from(&settings_path(config))
}

/// The environment to probe: a recorded snapshot when `env` is given,
/// otherwise this host.
pub fn load_environment(env: Option<&Path>, settings: &Settings) -> Result<Box<dyn Environment>> {
    match env {
        Some(path) => {
            tracing::debug!(target: "tiergov.probe", path = %path.display(), "using recorded environment");
            Ok(Box::new(SnapshotEnvironment::from_file(path)?))
        }
        None => Ok(Box::new(SystemEnvironment::new(settings.host.clone()))),
    }
}
