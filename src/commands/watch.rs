// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Live governor command

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use crate::cli::args::{OutputFormat, WatchArgs};
use crate::config::Settings;
use crate::error::{Result, TierGovError};
use crate::frame::IntervalFrames;
use crate::governor::{GovernorSnapshot, PerformanceGovernor, PerformanceTier, TierChange};
use crate::runtime::{GovernorRuntime, HostSignals};

use super::load_environment;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WatchReport {
    initial_tier: PerformanceTier,
    elapsed_secs: f64,
    changes: Vec<TierChange>,
    final_state: GovernorSnapshot,
}

/// Execute the watch command
pub async fn execute(args: &WatchArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    if args.dev_toggle_at.is_some() && !settings.governor.dev_tools {
        return Err(TierGovError::DevToolsDisabled);
    }

    let env = load_environment(args.env.as_deref(), settings)?;
    let frames = IntervalFrames::new(settings.sampler.target_fps);

    let mut signals = HostSignals::default();
    let motion = args.reduced_motion_at.map(|_| {
        let (tx, rx) = watch::channel(env.prefers_reduced_motion());
        signals.reduced_motion = Some(rx);
        tx
    });
    let runtime = GovernorRuntime::start(settings, env.as_ref(), signals, frames)?;
    let governor = runtime.governor().clone();
    let initial_tier = governor.current_tier();
    let text = !matches!(format, OutputFormat::Json);

    if text {
        println!(
            "Watching for {}s at {} fps target, starting at {}",
            args.seconds, settings.sampler.target_fps, initial_tier
        );
    }

    let changes = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&changes);
    let _subscription = governor.subscribe(move |change| {
        if text {
            println!("  {} -> {} ({})", change.from, change.to, change.cause);
        }
        if let Ok(mut list) = recorded.lock() {
            list.push(*change);
        }
    });

    let started = std::time::Instant::now();
    let schedule = HostSchedule {
        dev_toggle_at: args.dev_toggle_at,
        reduced_motion_at: args.reduced_motion_at,
    };
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(args.seconds)) => {}
        _ = schedule.replay(&governor, motion.as_ref()) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!(target: "tiergov.governor", "interrupted");
        }
    }
    runtime.shutdown().await;

    let final_state = governor.snapshot();
    let changes = match changes.lock() {
        Ok(list) => list.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };

    if !text {
        let report = WatchReport {
            initial_tier,
            elapsed_secs: started.elapsed().as_secs_f64(),
            changes,
            final_state,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!(
        "Final tier: {} (last sample {})",
        final_state.tier,
        final_state
            .last_fps
            .map(|fps| format!("{:.1} fps", fps))
            .unwrap_or_else(|| "none".to_string())
    );
    if final_state.hardware_locked {
        println!("Hardware ceiling: {} (locked)", final_state.ceiling);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostEvent {
    DevToggle,
    ReducedMotionFlip,
}

/// Host events fired at fixed offsets into a watch session.
#[derive(Debug, Clone, Copy, Default)]
struct HostSchedule {
    dev_toggle_at: Option<u64>,
    reduced_motion_at: Option<u64>,
}

impl HostSchedule {
    fn events(&self) -> Vec<(u64, HostEvent)> {
        let mut events: Vec<(u64, HostEvent)> = self
            .dev_toggle_at
            .map(|at| (at, HostEvent::DevToggle))
            .into_iter()
            .chain(
                self.reduced_motion_at
                    .map(|at| (at, HostEvent::ReducedMotionFlip)),
            )
            .collect();
        events.sort_by_key(|(at, _)| *at);
        events
    }

    /// Fire every event in order, then idle forever.
    async fn replay(&self, governor: &PerformanceGovernor, motion: Option<&watch::Sender<bool>>) {
        let start = tokio::time::Instant::now();
        for (at, event) in self.events() {
            tokio::time::sleep_until(start + Duration::from_secs(at)).await;
            match event {
                HostEvent::DevToggle => match governor.toggle_dev_override() {
                    Ok(forced) => {
                        tracing::info!(target: "tiergov.governor", forced, "dev low-power override toggled");
                    }
                    Err(e) => {
                        tracing::warn!(target: "tiergov.governor", error = %e, "dev toggle refused");
                    }
                },
                HostEvent::ReducedMotionFlip => {
                    if let Some(tx) = motion {
                        tx.send_modify(|enabled| *enabled = !*enabled);
                    }
                }
            }
        }
        std::future::pending::<()>().await
    }
}
