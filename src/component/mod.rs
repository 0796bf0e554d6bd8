// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Adaptive decorative components
//!
//! A component knows how to draw one static snapshot and how to advance
//! one animation frame. [`mount`] binds it to the tier flag: `Minimal`
//! gets the snapshot and no loop, any other tier gets exactly one
//! per-frame loop paced by [`AdaptiveComponent::frame_interval`].

mod canvas;
mod cursor;
mod donut;
mod mount;
mod particles;
mod rings;

pub use canvas::AsciiCanvas;
pub use cursor::{CursorTrail, PointerHandle};
pub use donut::{donut_frame, AsciiDonut};
pub use mount::{mount, MountedComponent, RenderMode};
pub use particles::ParticleField;
pub use rings::TechRings;

use std::time::Duration;

use crate::error::{Result, TierGovError};
use crate::governor::PerformanceTier;

/// A decorative widget that renders differently per tier.
pub trait AdaptiveComponent: Send + 'static {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Delay between frames while animated at `tier`
    fn frame_interval(&self, tier: PerformanceTier) -> Duration;

    /// The snapshot shown in `Minimal`
    fn render_static(&mut self) -> String;

    /// Advance by `dt` and draw one frame at `tier`
    fn tick(&mut self, tier: PerformanceTier, dt: Duration) -> String;

    /// Drop transient animation state when the loop stops
    fn reset(&mut self) {}
}

/// Build one of the bundled components by name.
pub fn by_name(name: &str) -> Result<Box<dyn AdaptiveComponent>> {
    match name.trim().to_lowercase().as_str() {
        "donut" | "ascii-donut" => Ok(Box::new(AsciiDonut::new())),
        "rings" | "tech-rings" => Ok(Box::new(TechRings::new())),
        "particles" | "particle-field" => Ok(Box::new(ParticleField::new(42))),
        "cursor" | "cursor-trail" => Ok(Box::new(CursorTrail::new().0)),
        other => Err(TierGovError::InvalidInput(format!(
            "unknown component '{}' (expected donut, rings, particles or cursor)",
            other
        ))),
    }
}

impl AdaptiveComponent for Box<dyn AdaptiveComponent> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn frame_interval(&self, tier: PerformanceTier) -> Duration {
        (**self).frame_interval(tier)
    }

    fn render_static(&mut self) -> String {
        (**self).render_static()
    }

    fn tick(&mut self, tier: PerformanceTier, dt: Duration) -> String {
        (**self).tick(tier, dt)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Frame interval for `base` at `tier`, stretched by the tier's duration scale.
pub(crate) fn scaled_interval(base: Duration, tier: PerformanceTier) -> Duration {
    let scale = tier.duration_scale();
    if scale <= 0.0 {
        base
    } else {
        base.mul_f64(scale)
    }
}
