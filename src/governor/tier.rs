// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Visual fidelity tiers and their per-tier rendering knobs

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::TierGovError;

/// Visual fidelity level the page operates in.
///
/// Variants are ordered from most to least conservative, so `min` of two
/// tiers is always the safer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    /// Static snapshots only, no per-frame work ("low-power mode")
    Minimal,
    /// Animated, with longer durations and fewer effects
    Reduced,
    /// Every decorative layer, updated every frame
    Full,
}

impl PerformanceTier {
    /// All tiers, most conservative first
    pub const ALL: [PerformanceTier; 3] = [
        PerformanceTier::Minimal,
        PerformanceTier::Reduced,
        PerformanceTier::Full,
    ];

    /// Whether components may schedule a per-frame loop at this tier
    pub fn runs_frame_loop(&self) -> bool {
        !matches!(self, PerformanceTier::Minimal)
    }

    /// Multiplier applied to animation durations and frame intervals
    pub fn duration_scale(&self) -> f64 {
        match self {
            PerformanceTier::Minimal => 0.0,
            PerformanceTier::Reduced => 2.0,
            PerformanceTier::Full => 1.0,
        }
    }

    /// Fraction of particles/effects kept at this tier
    pub fn effect_scale(&self) -> f64 {
        match self {
            PerformanceTier::Minimal => 0.0,
            PerformanceTier::Reduced => 0.4,
            PerformanceTier::Full => 1.0,
        }
    }

    /// Marker class mirrored onto the document root, if any
    pub fn marker_class(&self) -> Option<&'static str> {
        match self {
            PerformanceTier::Minimal => Some("low-power-mode"),
            PerformanceTier::Reduced => Some("reduced-motion"),
            PerformanceTier::Full => None,
        }
    }

    /// Label for the low-power indicator badge
    pub fn indicator_label(&self) -> Option<&'static str> {
        match self {
            PerformanceTier::Minimal => Some("Running in Low Power Mode"),
            _ => None,
        }
    }

    /// Get a human-readable description of this tier
    pub fn description(&self) -> &'static str {
        match self {
            PerformanceTier::Minimal => "Static fallback (no animation loops)",
            PerformanceTier::Reduced => "Reduced motion (slower, fewer effects)",
            PerformanceTier::Full => "Full animated scene",
        }
    }
}

impl std::fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerformanceTier::Minimal => write!(f, "Minimal"),
            PerformanceTier::Reduced => write!(f, "Reduced"),
            PerformanceTier::Full => write!(f, "Full"),
        }
    }
}

impl FromStr for PerformanceTier {
    type Err = TierGovError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" | "low-power" | "lowpower" | "fallback" => Ok(PerformanceTier::Minimal),
            "reduced" => Ok(PerformanceTier::Reduced),
            "full" => Ok(PerformanceTier::Full),
            other => Err(TierGovError::InvalidInput(format!(
                "unknown tier '{}' (expected full, reduced or minimal)",
                other
            ))),
        }
    }
}
