// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Pure tier state machine
//!
//! The effective tier is the minimum of four independent constraints:
//!
//! - the ceiling: permanent hardware reasons plus the user's `max_tier`
//! - the frame-rate latch: set by a window below `low_fps`, cleared by a
//!   window at or above `high_fps`, seeded by recoverable probe reasons
//! - the live reduced-motion preference
//! - the dev-mode low-power override
//!
//! Only the latch reacts to frame rate, so nothing a sampler reports can
//! lift a hardware ceiling.

use serde::{Deserialize, Serialize};

use super::tier::PerformanceTier;
use crate::config::GovernorConfig;
use crate::probe::CapabilityVerdict;

/// Something the governor was asked to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GovernorInput {
    /// Rolling FPS from one sampling window
    FrameRate(f64),
    /// Reduced-motion preference changed (or was re-read)
    ReducedMotion(bool),
    /// Dev-mode low-power override set or cleared
    DevOverride(bool),
}

/// What moved the tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum TransitionCause {
    LowFrameRate { fps: f64 },
    FrameRateRecovered { fps: f64 },
    ReducedMotion { enabled: bool },
    DevOverride { enabled: bool },
}

impl std::fmt::Display for TransitionCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionCause::LowFrameRate { fps } => write!(f, "frame rate dropped to {:.1}", fps),
            TransitionCause::FrameRateRecovered { fps } => {
                write!(f, "frame rate recovered to {:.1}", fps)
            }
            TransitionCause::ReducedMotion { enabled: true } => {
                write!(f, "reduced motion requested")
            }
            TransitionCause::ReducedMotion { enabled: false } => {
                write!(f, "reduced motion cleared")
            }
            TransitionCause::DevOverride { enabled: true } => write!(f, "low-power mode forced"),
            TransitionCause::DevOverride { enabled: false } => {
                write!(f, "low-power mode override cleared")
            }
        }
    }
}

/// One tier transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierChange {
    pub from: PerformanceTier,
    pub to: PerformanceTier,
    #[serde(flatten)]
    pub cause: TransitionCause,
}

/// Governor inputs and the tier they imply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernorState {
    ceiling: PerformanceTier,
    hardware_locked: bool,
    fps_latch: bool,
    reduced_motion: bool,
    dev_override: bool,
    low_fps: f64,
    high_fps: f64,
    last_fps: Option<f64>,
}

impl GovernorState {
    /// Seed the state from a startup verdict.
    pub fn from_verdict(verdict: &CapabilityVerdict, config: &GovernorConfig) -> Self {
        let hardware = verdict.hardware_ceiling();
        let ceiling = match config.max_tier {
            Some(max) => hardware.min(max),
            None => hardware,
        };

        Self {
            ceiling,
            hardware_locked: verdict.is_hardware_locked(),
            fps_latch: verdict.starts_fps_demoted(),
            reduced_motion: verdict.prefers_reduced_motion,
            dev_override: false,
            low_fps: config.low_fps,
            high_fps: config.high_fps,
            last_fps: None,
        }
    }

    /// The single active tier.
    pub fn tier(&self) -> PerformanceTier {
        if self.fps_latch || self.reduced_motion || self.dev_override {
            PerformanceTier::Minimal
        } else {
            self.ceiling
        }
    }

    pub fn ceiling(&self) -> PerformanceTier {
        self.ceiling
    }

    pub fn hardware_locked(&self) -> bool {
        self.hardware_locked
    }

    pub fn fps_latched(&self) -> bool {
        self.fps_latch
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn dev_override(&self) -> bool {
        self.dev_override
    }

    pub fn last_fps(&self) -> Option<f64> {
        self.last_fps
    }

    /// Fold one input in; returns the transition if the tier moved.
    pub fn apply(&mut self, input: GovernorInput) -> Option<TierChange> {
        let from = self.tier();

        let cause = match input {
            GovernorInput::FrameRate(fps) => {
                // Stalled or garbage windows say nothing about speed
                if !fps.is_finite() || fps < 0.0 {
                    return None;
                }
                self.last_fps = Some(fps);
                if fps < self.low_fps {
                    self.fps_latch = true;
                    TransitionCause::LowFrameRate { fps }
                } else if fps >= self.high_fps {
                    self.fps_latch = false;
                    TransitionCause::FrameRateRecovered { fps }
                } else {
                    return None;
                }
            }
            GovernorInput::ReducedMotion(enabled) => {
                self.reduced_motion = enabled;
                TransitionCause::ReducedMotion { enabled }
            }
            GovernorInput::DevOverride(enabled) => {
                self.dev_override = enabled;
                TransitionCause::DevOverride { enabled }
            }
        };

        let to = self.tier();
        (from != to).then_some(TierChange { from, to, cause })
    }
}
