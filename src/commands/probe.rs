// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Capability probe command

use serde::Serialize;

use crate::cli::args::{OutputFormat, ProbeArgs};
use crate::config::Settings;
use crate::error::Result;
use crate::governor::PerformanceTier;
use crate::probe::{assess_capability, CapabilityVerdict};

use super::load_environment;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub initial_tier: PerformanceTier,
    pub hardware_ceiling: PerformanceTier,
    pub hardware_locked: bool,
    pub verdict: CapabilityVerdict,
}

impl ProbeReport {
    pub fn from_verdict(verdict: CapabilityVerdict) -> Self {
        Self {
            initial_tier: verdict.initial_tier(),
            hardware_ceiling: verdict.hardware_ceiling(),
            hardware_locked: verdict.is_hardware_locked(),
            verdict,
        }
    }
}

/// Execute the probe command
pub fn execute(args: &ProbeArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    let env = load_environment(args.env.as_deref(), settings)?;
    let report = ProbeReport::from_verdict(assess_capability(env.as_ref(), &settings.probe));

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", render_text(&report));
    Ok(())
}

fn render_text(report: &ProbeReport) -> String {
    let v = &report.verdict;
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut out = String::new();

    out.push_str("\n=== Capability Verdict ===\n\n");
    out.push_str(&format!(
        "Initial tier: {} ({})\n",
        report.initial_tier,
        report.initial_tier.description()
    ));
    out.push_str(&format!(
        "Hardware ceiling: {}{}\n",
        report.hardware_ceiling,
        if report.hardware_locked { " (locked)" } else { "" }
    ));
    out.push_str(&format!("Policy: {:?}\n\n", v.policy));

    out.push_str(&format!("Accelerated context: {}\n", yes_no(v.has_webgl)));
    out.push_str(&format!(
        "Renderer: {}{}\n",
        v.renderer.as_deref().unwrap_or("(hidden)"),
        if v.is_software_renderer { " [software]" } else { "" }
    ));
    out.push_str(&format!("Texture allocation: {}\n", if v.texture_ok { "ok" } else { "failed" }));
    out.push_str(&format!(
        "Device memory: {}\n",
        v.device_memory_gb
            .map(|gb| format!("{:.1}GB", gb))
            .unwrap_or_else(|| "unknown".to_string())
    ));
    out.push_str(&format!(
        "Battery: {}\n",
        v.battery_level
            .map(|l| format!("{:.0}%", l * 100.0))
            .unwrap_or_else(|| "unknown".to_string())
    ));
    out.push_str(&format!(
        "Raster benchmark: {}\n",
        v.synthetic_render_ms
            .map(|ms| format!("{:.1}ms", ms))
            .unwrap_or_else(|| "skipped".to_string())
    ));
    out.push_str(&format!("Mobile: {}\n", yes_no(v.is_mobile_ua)));
    out.push_str(&format!("Reduced motion: {}\n", yes_no(v.prefers_reduced_motion)));

    if !v.reasons.is_empty() {
        out.push_str("\n=== Degrade Reasons ===\n");
        for reason in &v.reasons {
            let kind = if reason.is_permanent() { "hardware" } else { "soft" };
            out.push_str(&format!("  ✗ {} [{}]\n", reason.summary(), kind));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::SnapshotEnvironment;

    fn report_for(env: SnapshotEnvironment) -> ProbeReport {
        ProbeReport::from_verdict(assess_capability(&env, &Settings::default().probe))
    }

    #[test]
    fn test_capable_desktop_report() {
        let report = report_for(SnapshotEnvironment::desktop());
        assert_eq!(report.initial_tier, PerformanceTier::Full);
        assert!(!report.hardware_locked);
        let text = render_text(&report);
        assert!(text.contains("Initial tier: Full"));
        assert!(!text.contains("Degrade Reasons"));
    }

    #[test]
    fn test_software_renderer_report_lists_reason() {
        let report =
            report_for(SnapshotEnvironment::desktop().with_renderer("Google SwiftShader"));
        assert_eq!(report.initial_tier, PerformanceTier::Minimal);
        assert!(report.hardware_locked);
        let text = render_text(&report);
        assert!(text.contains("[software]"));
        assert!(text.contains("[hardware]"));
    }

    #[test]
    fn test_report_json_shape() {
        let report = report_for(SnapshotEnvironment::desktop());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["initialTier"], "full");
        assert_eq!(json["verdict"]["hasWebgl"], true);
    }
}
