// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Capability verdict and the reasons behind it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::environment::ProbeCheck;
use crate::config::ProbePolicy;
use crate::governor::PerformanceTier;

/// Why a probe lowered the tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DegradeReason {
    /// User asked for reduced motion
    ReducedMotion,
    /// Handheld form factor
    MobileDevice { cap: PerformanceTier },
    /// No accelerated context obtainable
    NoWebGl,
    /// Renderer string matched a software rasterizer
    SoftwareRenderer { renderer: String },
    /// Renderer hidden and policy says assume the worst
    UnknownRenderer,
    /// Test texture could not be allocated
    TextureAllocationFailed,
    /// Device memory under the configured floor
    LowDeviceMemory { gb: f64 },
    /// Synthetic raster benchmark over the threshold
    SlowRaster { ms: f64 },
    /// Battery under the configured level
    LowBattery { level: f64 },
    /// A probe threw
    ProbeFailed { check: ProbeCheck, error: String },
}

impl DegradeReason {
    /// Hardware reasons hold for the whole session; frame-rate recovery
    /// cannot lift them.
    pub fn is_permanent(&self) -> bool {
        match self {
            DegradeReason::MobileDevice { .. }
            | DegradeReason::NoWebGl
            | DegradeReason::SoftwareRenderer { .. }
            | DegradeReason::UnknownRenderer
            | DegradeReason::TextureAllocationFailed
            | DegradeReason::LowDeviceMemory { .. } => true,
            DegradeReason::ProbeFailed { check, .. } => *check != ProbeCheck::Raster,
            DegradeReason::ReducedMotion
            | DegradeReason::SlowRaster { .. }
            | DegradeReason::LowBattery { .. } => false,
        }
    }

    /// Highest tier this reason allows.
    pub fn tier_cap(&self) -> PerformanceTier {
        match self {
            DegradeReason::MobileDevice { cap } => *cap,
            _ => PerformanceTier::Minimal,
        }
    }

    /// Soft reasons start the session demoted but recover with frame rate.
    pub fn seeds_fps_latch(&self) -> bool {
        !self.is_permanent() && !matches!(self, DegradeReason::ReducedMotion)
    }

    pub fn summary(&self) -> String {
        match self {
            DegradeReason::ReducedMotion => "reduced-motion preference".to_string(),
            DegradeReason::MobileDevice { cap } => format!("mobile device (cap {})", cap),
            DegradeReason::NoWebGl => "no accelerated context".to_string(),
            DegradeReason::SoftwareRenderer { renderer } => {
                format!("software renderer '{}'", renderer)
            }
            DegradeReason::UnknownRenderer => "renderer hidden".to_string(),
            DegradeReason::TextureAllocationFailed => "texture allocation failed".to_string(),
            DegradeReason::LowDeviceMemory { gb } => format!("{:.1}GB device memory", gb),
            DegradeReason::SlowRaster { ms } => format!("raster benchmark {:.1}ms", ms),
            DegradeReason::LowBattery { level } => format!("battery {:.0}%", level * 100.0),
            DegradeReason::ProbeFailed { check, error } => {
                format!("{} probe failed: {}", check, error)
            }
        }
    }
}

/// One-shot, startup-time assessment of the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityVerdict {
    pub has_webgl: bool,
    pub is_software_renderer: bool,
    pub renderer: Option<String>,
    pub texture_ok: bool,
    pub device_memory_gb: Option<f64>,
    pub prefers_reduced_motion: bool,
    pub is_mobile_ua: bool,
    pub battery_level: Option<f64>,
    /// `None` when the policy skips the benchmark or it could not run
    pub synthetic_render_ms: Option<f64>,
    pub policy: ProbePolicy,
    pub reasons: Vec<DegradeReason>,
    pub assessed_at: DateTime<Utc>,
}

impl CapabilityVerdict {
    /// A verdict with every check passing; the starting point for assessment.
    pub fn capable(policy: ProbePolicy) -> Self {
        Self {
            has_webgl: true,
            is_software_renderer: false,
            renderer: None,
            texture_ok: true,
            device_memory_gb: None,
            prefers_reduced_motion: false,
            is_mobile_ua: false,
            battery_level: None,
            synthetic_render_ms: None,
            policy,
            reasons: Vec::new(),
            assessed_at: Utc::now(),
        }
    }

    /// Tier implied by every tripped check.
    pub fn initial_tier(&self) -> PerformanceTier {
        self.reasons
            .iter()
            .map(DegradeReason::tier_cap)
            .min()
            .unwrap_or(PerformanceTier::Full)
    }

    /// Highest tier the hardware ever allows this session.
    pub fn hardware_ceiling(&self) -> PerformanceTier {
        self.reasons
            .iter()
            .filter(|r| r.is_permanent())
            .map(DegradeReason::tier_cap)
            .min()
            .unwrap_or(PerformanceTier::Full)
    }

    /// Pinned to Minimal for a hardware reason.
    pub fn is_hardware_locked(&self) -> bool {
        self.hardware_ceiling() == PerformanceTier::Minimal
    }

    /// Whether a recoverable reason starts the session demoted.
    pub fn starts_fps_demoted(&self) -> bool {
        self.reasons.iter().any(DegradeReason::seeds_fps_latch)
    }
}
