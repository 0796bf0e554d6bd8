// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Synthetic frame-rate simulation command

use serde::Serialize;

use crate::cli::args::{OutputFormat, SimulateArgs};
use crate::config::Settings;
use crate::error::{Result, TierGovError};
use crate::flag::TierFlag;
use crate::governor::{GovernorSnapshot, PerformanceGovernor, PerformanceTier, TierChange};
use crate::probe::{assess_capability, Environment, SnapshotEnvironment};
use crate::sampler::FrameRateSampler;

use super::load_environment;

/// One sampling window of a simulation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedWindow {
    pub index: usize,
    pub requested_fps: f64,
    /// What the sampler measured; `None` if the window was dropped as a stall
    pub sample: Option<f64>,
    pub tier: PerformanceTier,
    pub changes: Vec<TierChange>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub initial_tier: PerformanceTier,
    pub windows: Vec<SimulatedWindow>,
    pub final_state: GovernorSnapshot,
}

/// Drive a governor through one window per entry of `fps`.
///
/// Frames are fed through the same sampler the live runtime uses, so stall
/// handling and smoothing apply. `reduced_motion_at` turns the preference
/// on just before that window.
pub fn run_simulation(
    settings: &Settings,
    env: &dyn Environment,
    fps: &[f64],
    reduced_motion_at: Option<usize>,
) -> Result<SimulationReport> {
    settings.validate()?;
    if fps.is_empty() {
        return Err(TierGovError::InvalidInput("no frame rates given".to_string()));
    }
    if let Some(bad) = fps.iter().find(|r| !(r.is_finite() && **r > 0.0)) {
        return Err(TierGovError::InvalidInput(format!(
            "frame rate must be positive, got {}",
            bad
        )));
    }

    let verdict = assess_capability(env, &settings.probe);
    let (publisher, _flag) = TierFlag::new();
    let governor = PerformanceGovernor::new(verdict, &settings.governor, publisher);
    let initial_tier = governor.current_tier();

    let mut sampler = FrameRateSampler::new(&settings.sampler);
    let mut now = 0.0;
    sampler.record_frame(now);

    let mut windows = Vec::with_capacity(fps.len());
    for (index, &rate) in fps.iter().enumerate() {
        let mut changes = Vec::new();
        if reduced_motion_at == Some(index) {
            changes.extend(governor.set_reduced_motion(true));
        }

        let period = 1000.0 / rate;
        let mut sample = None;
        for _ in 0..settings.sampler.window_frames {
            now += period;
            if let Some(measured) = sampler.record_frame(now) {
                sample = Some(measured);
                changes.extend(governor.record_fps(measured));
            }
        }

        windows.push(SimulatedWindow {
            index,
            requested_fps: rate,
            sample,
            tier: governor.current_tier(),
            changes,
        });
    }

    Ok(SimulationReport {
        initial_tier,
        windows,
        final_state: governor.snapshot(),
    })
}

/// Execute the simulate command
pub fn execute(args: &SimulateArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    let env: Box<dyn Environment> = match args.env.as_deref() {
        Some(path) => load_environment(Some(path), settings)?,
        None => Box::new(SnapshotEnvironment::desktop()),
    };
    let report = run_simulation(settings, env.as_ref(), &args.fps, args.reduced_motion_at)?;

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Initial tier: {}", report.initial_tier);
    println!();
    println!("{:>6}  {:>8}  {:>8}  {:<8}  transition", "window", "target", "sampled", "tier");
    for window in &report.windows {
        let sampled = window
            .sample
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "stall".to_string());
        let transition = window
            .changes
            .iter()
            .map(|c| format!("{} -> {} ({})", c.from, c.to, c.cause))
            .collect::<Vec<_>>()
            .join("; ");
        println!(
            "{:>6}  {:>8.1}  {:>8}  {:<8}  {}",
            window.index, window.requested_fps, sampled, window.tier, transition
        );
    }
    println!();
    println!(
        "Final tier: {} after {} transition(s)",
        report.final_state.tier, report.final_state.transitions
    );
    Ok(())
}
