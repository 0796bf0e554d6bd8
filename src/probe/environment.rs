// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Host signals consumed by the capability probe

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProbeError;

/// What an accelerated rendering context told us about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuContextInfo {
    /// Unmasked renderer string; `None` when the debug extension is blocked
    pub renderer: Option<String>,
}

/// Individual probes, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeCheck {
    GpuContext,
    Texture,
    Raster,
}

impl std::fmt::Display for ProbeCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeCheck::GpuContext => write!(f, "gpu-context"),
            ProbeCheck::Texture => write!(f, "texture"),
            ProbeCheck::Raster => write!(f, "raster"),
        }
    }
}

/// Read-only view of the hosting environment.
///
/// Optional signals return `None` when the host has no API for them; that
/// is "unknown", never "incapable". Probes that can throw return
/// [`ProbeError`].
pub trait Environment: Send + Sync {
    /// User preference for reduced motion, as of now
    fn prefers_reduced_motion(&self) -> bool;

    /// Identification string used for the mobile heuristic
    fn user_agent(&self) -> Option<String>;

    /// Obtain an accelerated context; `Ok(None)` if none is available
    fn gpu_context(&self) -> Result<Option<GpuContextInfo>, ProbeError>;

    /// Allocate and immediately release a minimal GPU texture
    fn allocate_test_texture(&self) -> Result<(), ProbeError>;

    /// Total device memory hint in GB
    fn device_memory_gb(&self) -> Option<f64>;

    /// Battery charge in `0.0..=1.0`
    fn battery_level(&self) -> Option<f64>;

    /// Draw `rects` small filled rectangles offscreen and time it
    fn raster_benchmark(&self, rects: u32, canvas_px: u32) -> Result<Duration, ProbeError>;
}
