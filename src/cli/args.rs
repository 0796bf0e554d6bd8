// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for tiergov.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::governor::PerformanceTier;

/// tiergov - adaptive rendering governor
#[derive(Parser, Debug)]
#[command(name = "tiergov")]
#[command(
    version,
    about = "Probe rendering capability, follow frame rate and pick a visual tier"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path (defaults to ~/.tiergov/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the capability probe and print the verdict
    Probe(ProbeArgs),

    /// Feed synthetic frame-rate windows through the governor
    #[command(alias = "sim")]
    Simulate(SimulateArgs),

    /// Run the live governor against a steady frame clock
    Watch(WatchArgs),

    /// Render an adaptive component in the terminal
    Demo(DemoArgs),

    /// Manage configuration
    #[command(alias = "config")]
    Settings(SettingsArgs),
}

/// Arguments for the probe subcommand
#[derive(clap::Args, Debug, Default)]
pub struct ProbeArgs {
    /// Probe a recorded environment (JSON) instead of this host
    #[arg(long)]
    pub env: Option<PathBuf>,
}

/// Arguments for the simulate subcommand
#[derive(clap::Args, Debug)]
pub struct SimulateArgs {
    /// Frame rate of each window, comma separated (e.g. 22,18,25,55,58)
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true)]
    pub fps: Vec<f64>,

    /// Probe a recorded environment (JSON) instead of a capable desktop
    #[arg(long)]
    pub env: Option<PathBuf>,

    /// Turn the reduced-motion preference on before this window (0-based)
    #[arg(long)]
    pub reduced_motion_at: Option<usize>,
}

/// Arguments for the watch subcommand
#[derive(clap::Args, Debug)]
pub struct WatchArgs {
    /// Stop after this many seconds
    #[arg(short, long, default_value_t = 10)]
    pub seconds: u64,

    /// Probe a recorded environment (JSON) instead of this host
    #[arg(long)]
    pub env: Option<PathBuf>,

    /// Flip the dev low-power override after this many seconds (needs governor.dev_tools)
    #[arg(long, value_name = "SECS")]
    pub dev_toggle_at: Option<u64>,

    /// Flip the reduced-motion preference after this many seconds
    #[arg(long, value_name = "SECS")]
    pub reduced_motion_at: Option<u64>,
}

/// Arguments for the demo subcommand
#[derive(clap::Args, Debug)]
pub struct DemoArgs {
    /// Component to render
    pub component: DemoComponent,

    /// Number of frames to draw before exiting
    #[arg(short, long, default_value_t = 90)]
    pub frames: u32,

    /// Force a tier instead of probing this host
    #[arg(short, long)]
    pub tier: Option<PerformanceTier>,
}

/// Components the demo can render
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoComponent {
    Donut,
    Rings,
    Particles,
    Cursor,
}

impl DemoComponent {
    /// Name accepted by [`crate::component::by_name`]
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoComponent::Donut => "donut",
            DemoComponent::Rings => "rings",
            DemoComponent::Particles => "particles",
            DemoComponent::Cursor => "cursor",
        }
    }
}

/// Arguments for the settings subcommand
#[derive(clap::Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommands,
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsCommands {
    /// Show current configuration
    Show,

    /// Print the settings file location
    Path,

    /// Overwrite the settings file with defaults
    Reset,

    /// Load and validate the settings file
    Validate,
}

/// Output format options
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== CLI Global Arguments ====================

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tiergov", "probe"]);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
        assert!(matches!(cli.format, OutputFormat::Text));
    }

    #[test]
    fn test_cli_verbose_multiple() {
        let cli = Cli::parse_from(["tiergov", "-vvv", "probe"]);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "tiergov",
            "probe",
            "--format",
            "json",
            "--config",
            "/tmp/s.json",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn test_command_required() {
        assert!(Cli::try_parse_from(["tiergov"]).is_err());
    }

    // ==================== Probe ====================

    #[test]
    fn test_probe_with_env_file() {
        let cli = Cli::parse_from(["tiergov", "probe", "--env", "phone.json"]);
        if let Commands::Probe(args) = cli.command {
            assert_eq!(args.env, Some(PathBuf::from("phone.json")));
        } else {
            panic!("Expected Probe command");
        }
    }

    // ==================== Simulate ====================

    #[test]
    fn test_simulate_fps_list() {
        let cli = Cli::parse_from(["tiergov", "simulate", "--fps", "22,18,25,55,58"]);
        if let Commands::Simulate(args) = cli.command {
            assert_eq!(args.fps, vec![22.0, 18.0, 25.0, 55.0, 58.0]);
            assert!(args.reduced_motion_at.is_none());
        } else {
            panic!("Expected Simulate command");
        }
    }

    #[test]
    fn test_simulate_requires_fps() {
        assert!(Cli::try_parse_from(["tiergov", "simulate"]).is_err());
    }

    #[test]
    fn test_simulate_alias_and_reduced_motion() {
        let cli = Cli::parse_from(["tiergov", "sim", "--fps", "60", "--reduced-motion-at", "2"]);
        if let Commands::Simulate(args) = cli.command {
            assert_eq!(args.reduced_motion_at, Some(2));
        } else {
            panic!("Expected Simulate command");
        }
    }

    // ==================== Watch ====================

    #[test]
    fn test_watch_default_seconds() {
        let cli = Cli::parse_from(["tiergov", "watch"]);
        if let Commands::Watch(args) = cli.command {
            assert_eq!(args.seconds, 10);
            assert!(args.dev_toggle_at.is_none());
        } else {
            panic!("Expected Watch command");
        }
    }

    #[test]
    fn test_watch_host_event_schedule() {
        let cli = Cli::parse_from([
            "tiergov",
            "watch",
            "--dev-toggle-at",
            "3",
            "--reduced-motion-at",
            "5",
        ]);
        if let Commands::Watch(args) = cli.command {
            assert_eq!(args.dev_toggle_at, Some(3));
            assert_eq!(args.reduced_motion_at, Some(5));
        } else {
            panic!("Expected Watch command");
        }
    }

    // ==================== Demo ====================

    #[test]
    fn test_demo_component_and_tier() {
        let cli = Cli::parse_from(["tiergov", "demo", "rings", "--tier", "reduced", "-f", "5"]);
        if let Commands::Demo(args) = cli.command {
            assert_eq!(args.component, DemoComponent::Rings);
            assert_eq!(args.tier, Some(PerformanceTier::Reduced));
            assert_eq!(args.frames, 5);
        } else {
            panic!("Expected Demo command");
        }
    }

    #[test]
    fn test_demo_rejects_unknown_component() {
        assert!(Cli::try_parse_from(["tiergov", "demo", "teapot"]).is_err());
    }

    #[test]
    fn test_demo_rejects_unknown_tier() {
        assert!(Cli::try_parse_from(["tiergov", "demo", "donut", "--tier", "ultra"]).is_err());
    }

    // ==================== Settings ====================

    #[test]
    fn test_settings_subcommands() {
        for (word, expected) in [
            ("show", SettingsCommands::Show),
            ("path", SettingsCommands::Path),
            ("reset", SettingsCommands::Reset),
            ("validate", SettingsCommands::Validate),
        ] {
            let cli = Cli::parse_from(["tiergov", "settings", word]);
            if let Commands::Settings(args) = cli.command {
                assert_eq!(args.command, expected);
            } else {
                panic!("Expected Settings command");
            }
        }
    }

    #[test]
    fn test_config_alias() {
        let cli = Cli::parse_from(["tiergov", "config", "show"]);
        assert!(matches!(cli.command, Commands::Settings(_)));
    }
}
