// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use regex::Regex;

use crate::error::{Result, TierGovError};

use super::{HostConfig, Settings};

/// Largest square raster benchmark canvas, in pixels per side.
pub const MAX_RASTER_CANVAS_PX: u32 = 4096;
/// Most rectangles the raster benchmark may draw.
pub const MAX_RASTER_RECTS: u32 = 100_000;

impl Settings {
    /// Check thresholds and tables for internal consistency.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<()> {
        let gov = &self.governor;
        if !(gov.low_fps > 0.0 && gov.high_fps > 0.0) {
            return Err(TierGovError::Config(
                "governor.low_fps and governor.high_fps must be positive".to_string(),
            ));
        }
        if gov.low_fps >= gov.high_fps {
            return Err(TierGovError::Config(format!(
                "governor.low_fps ({}) must be below governor.high_fps ({})",
                gov.low_fps, gov.high_fps
            )));
        }

        if self.sampler.window_frames == 0 {
            return Err(TierGovError::Config(
                "sampler.window_frames must be at least 1".to_string(),
            ));
        }
        if self.sampler.target_fps == 0 {
            return Err(TierGovError::Config(
                "sampler.target_fps must be at least 1".to_string(),
            ));
        }
        if !(self.sampler.stall_gap_ms > 0.0) {
            return Err(TierGovError::Config(
                "sampler.stall_gap_ms must be positive".to_string(),
            ));
        }
        if let Some(alpha) = self.sampler.smoothing {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(TierGovError::Config(format!(
                    "sampler.smoothing must be in (0, 1], got {}",
                    alpha
                )));
            }
        }

        let probe = &self.probe;
        if !(probe.min_device_memory_gb >= 0.0)
            || !(probe.raster_threshold_ms >= 0.0)
            || !(0.0..=1.0).contains(&probe.low_battery_level)
        {
            return Err(TierGovError::Config(
                "probe thresholds must be non-negative (battery level within 0..=1)".to_string(),
            ));
        }
        if probe.raster_canvas_px == 0 || probe.raster_canvas_px > MAX_RASTER_CANVAS_PX {
            return Err(TierGovError::Config(format!(
                "probe.raster_canvas_px must be in 1..={}, got {}",
                MAX_RASTER_CANVAS_PX, probe.raster_canvas_px
            )));
        }
        if probe.raster_rect_count > MAX_RASTER_RECTS {
            return Err(TierGovError::Config(format!(
                "probe.raster_rect_count must be at most {}, got {}",
                MAX_RASTER_RECTS, probe.raster_rect_count
            )));
        }
        if probe.software_renderers.iter().any(|s| s.trim().is_empty()) {
            return Err(TierGovError::Config(
                "probe.software_renderers must not contain empty entries".to_string(),
            ));
        }
        self.mobile_regex()?;

        Ok(())
    }

    /// Compile the mobile marker table into one case-insensitive regex.
    pub fn mobile_regex(&self) -> Result<Regex> {
        mobile_regex(&self.probe.mobile_markers)
    }
}

/// Compile marker alternatives into a case-insensitive regex.
pub fn mobile_regex(markers: &[String]) -> Result<Regex> {
    if markers.is_empty() {
        // Matches nothing.
        return Regex::new(r"[^\s\S]").map_err(|e| TierGovError::Config(e.to_string()));
    }
    let pattern = format!("(?i)({})", markers.join("|"));
    Regex::new(&pattern)
        .map_err(|e| TierGovError::Config(format!("probe.mobile_markers: {}", e)))
}

impl HostConfig {
    /// User agent, checking env var first.
    pub fn effective_user_agent(&self) -> Option<String> {
        std::env::var("TIERGOV_USER_AGENT")
            .ok()
            .or_else(|| self.user_agent.clone())
    }

    /// GPU renderer string, checking env var first.
    pub fn effective_gpu_renderer(&self) -> Option<String> {
        std::env::var("TIERGOV_GPU_RENDERER")
            .ok()
            .or_else(|| self.gpu_renderer.clone())
    }

    /// Reduced-motion preference, checking env var first.
    pub fn effective_reduced_motion(&self) -> bool {
        std::env::var("TIERGOV_REDUCED_MOTION")
            .ok()
            .and_then(|v| parse_flag(&v))
            .or(self.reduced_motion)
            .unwrap_or(false)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "reduce" => Some(true),
        "0" | "false" | "no" | "off" | "no-preference" => Some(false),
        _ => None,
    }
}
