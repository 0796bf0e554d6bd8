// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Terminal component demo command

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    terminal::{Clear, ClearType},
    ExecutableCommand,
};
use serde::Serialize;

use crate::cli::args::{DemoArgs, OutputFormat};
use crate::component::{by_name, mount, RenderMode};
use crate::config::Settings;
use crate::error::Result;
use crate::flag::TierFlag;
use crate::governor::{PerformanceGovernor, PerformanceTier};
use crate::probe::{assess_capability, SystemEnvironment};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoReport {
    component: &'static str,
    tier: PerformanceTier,
    mode: RenderMode,
    frames_rendered: u64,
    last_frame: String,
}

/// Execute the demo command
pub async fn execute(args: &DemoArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    let component = by_name(args.component.as_str())?;
    let (publisher, flag) = TierFlag::new();

    // Keep the governor alive for the whole demo so the flag stays owned
    let _governor = match args.tier {
        Some(tier) => {
            publisher.publish(tier);
            None
        }
        None => {
            let env = SystemEnvironment::new(settings.host.clone());
            let verdict = assess_capability(&env, &settings.probe);
            Some(PerformanceGovernor::new(verdict, &settings.governor, publisher))
        }
    };
    let tier = flag.current();
    let interval = component.frame_interval(tier);

    let mounted = mount(component, &flag);
    mounted.settled().await;

    if matches!(format, OutputFormat::Json) {
        if tier.runs_frame_loop() {
            tokio::time::sleep(interval * args.frames).await;
        }
        let report = DemoReport {
            component: mounted.name(),
            tier,
            mode: mounted.mode(),
            frames_rendered: mounted.frames_rendered(),
            last_frame: mounted.last_frame(),
        };
        mounted.unmount().await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut stdout = io::stdout();
    if !tier.runs_frame_loop() {
        println!("{}", mounted.last_frame());
        if let Some(label) = tier.indicator_label() {
            println!("[{}]", label);
        }
        mounted.unmount().await;
        return Ok(());
    }

    stdout.execute(Hide)?;
    stdout.execute(Clear(ClearType::All))?;
    let drawn = draw_frames(&mut stdout, &mounted, args.frames, interval, tier).await;
    stdout.execute(Show)?;
    mounted.unmount().await;
    drawn
}

async fn draw_frames(
    stdout: &mut io::Stdout,
    mounted: &crate::component::MountedComponent,
    frames: u32,
    interval: std::time::Duration,
    tier: PerformanceTier,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    for _ in 0..frames {
        ticker.tick().await;
        stdout.execute(MoveTo(0, 0))?;
        writeln!(stdout, "{}", mounted.last_frame())?;
        writeln!(stdout, "{} | {} | {}", mounted.name(), tier, tier.description())?;
        stdout.flush()?;
    }
    Ok(())
}
