// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management command

use std::path::Path;

use crate::cli::args::{OutputFormat, SettingsCommands};
use crate::config::Settings;
use crate::error::Result;

use super::settings_path;

/// Execute a settings subcommand against `config` (or the default path).
pub fn execute(command: SettingsCommands, config: Option<&Path>, format: &OutputFormat) -> Result<()> {
    let path = settings_path(config);
    match command {
        SettingsCommands::Show => {
            let settings = Settings::load_from(&path)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsCommands::Path => {
            if matches!(format, OutputFormat::Json) {
                println!("{}", serde_json::json!({ "path": path }));
            } else {
                println!("{}", path.display());
            }
        }
        SettingsCommands::Reset => {
            Settings::default().save_to_clean(&path)?;
            println!("Settings reset to defaults at {}", path.display());
        }
        SettingsCommands::Validate => {
            Settings::load_from(&path)?;
            if matches!(format, OutputFormat::Json) {
                println!("{}", serde_json::json!({ "path": path, "valid": true }));
            } else {
                println!("✓ {} is valid", path.display());
            }
        }
    }
    Ok(())
}
