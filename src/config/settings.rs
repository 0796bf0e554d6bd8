// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for tiergov
//!
//! Handles loading and saving settings from ~/.tiergov/settings.json

use serde::{Deserialize, Serialize};

use crate::governor::PerformanceTier;

mod io;
mod migration;
pub mod schema;
mod validation;

pub use validation::mobile_regex;

/// Main settings structure, stored in ~/.tiergov/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Capability probing heuristics
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Tier state machine thresholds
    #[serde(default)]
    pub governor: GovernorConfig,

    /// Frame-rate sampling window
    #[serde(default)]
    pub sampler: SamplerConfig,

    /// Overrides for host signals the native environment cannot discover
    #[serde(default)]
    pub host: HostConfig,
}

/// Which of the two capability policies to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProbePolicy {
    /// One-shot checks only; a mobile user agent alone forces Minimal
    Strict,
    /// Mobile only caps the tier at Reduced; a raster benchmark runs too
    #[default]
    Lenient,
}

/// What to assume when the GPU renderer string is hidden from us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownRendererPolicy {
    #[default]
    AssumeCapable,
    AssumeIncapable,
}

/// Capability probe configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
    /// Strict (early) or lenient (later) heuristic set
    #[serde(default)]
    pub policy: ProbePolicy,

    /// Device memory below this (GB) forces Minimal
    #[serde(default = "default_min_device_memory_gb")]
    pub min_device_memory_gb: f64,

    /// Battery level (0.0-1.0) below this forces Minimal
    #[serde(default = "default_low_battery_level")]
    pub low_battery_level: f64,

    /// Rectangles drawn by the synthetic raster benchmark
    #[serde(default = "default_raster_rect_count")]
    pub raster_rect_count: u32,

    /// Side length of the offscreen benchmark canvas in pixels
    #[serde(default = "default_raster_canvas_px")]
    pub raster_canvas_px: u32,

    /// Benchmark wall-clock time above this (ms) forces Minimal
    #[serde(default = "default_raster_threshold_ms")]
    pub raster_threshold_ms: f64,

    /// Substrings identifying software rasterizers (case-insensitive)
    #[serde(default = "default_software_renderers")]
    pub software_renderers: Vec<String>,

    /// Regex alternatives identifying mobile/handheld user agents
    #[serde(default = "default_mobile_markers")]
    pub mobile_markers: Vec<String>,

    /// Assumption when the renderer string is unavailable
    #[serde(default)]
    pub unknown_renderer: UnknownRendererPolicy,
}

/// Governor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GovernorConfig {
    /// Rolling FPS below this demotes to Minimal
    #[serde(default = "default_low_fps")]
    pub low_fps: f64,

    /// Rolling FPS at or above this lifts the demotion
    #[serde(default = "default_high_fps")]
    pub high_fps: f64,

    /// User ceiling; the governor never runs above it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tier: Option<PerformanceTier>,

    /// Allow the manual low-power toggle
    #[serde(default)]
    pub dev_tools: bool,
}

/// Frame-rate sampler configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplerConfig {
    /// Frames per sampling window
    #[serde(default = "default_window_frames")]
    pub window_frames: u32,

    /// Rate of the live frame source
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,

    /// A single frame gap longer than this (ms) is a stall, not slowness
    #[serde(default = "default_stall_gap_ms")]
    pub stall_gap_ms: f64,

    /// Consecutive stalls, while visible, that report the stall rate as a
    /// sample; 0 never reports stalls
    #[serde(default = "default_sustained_stalls")]
    pub sustained_stalls: u32,

    /// Exponential moving average factor applied to window samples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing: Option<f64>,
}

/// Host signal overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HostConfig {
    /// Identification string to classify (defaults to os/arch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// GPU renderer string, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_renderer: Option<String>,

    /// Reduced-motion preference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced_motion: Option<bool>,

    /// Force GPU context availability instead of detecting it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_gpu_context: Option<bool>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            policy: ProbePolicy::default(),
            min_device_memory_gb: default_min_device_memory_gb(),
            low_battery_level: default_low_battery_level(),
            raster_rect_count: default_raster_rect_count(),
            raster_canvas_px: default_raster_canvas_px(),
            raster_threshold_ms: default_raster_threshold_ms(),
            software_renderers: default_software_renderers(),
            mobile_markers: default_mobile_markers(),
            unknown_renderer: UnknownRendererPolicy::default(),
        }
    }
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            low_fps: default_low_fps(),
            high_fps: default_high_fps(),
            max_tier: None,
            dev_tools: false,
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            window_frames: default_window_frames(),
            target_fps: default_target_fps(),
            stall_gap_ms: default_stall_gap_ms(),
            sustained_stalls: default_sustained_stalls(),
            smoothing: None,
        }
    }
}

fn default_min_device_memory_gb() -> f64 {
    2.0
}

fn default_low_battery_level() -> f64 {
    0.2
}

fn default_raster_rect_count() -> u32 {
    1000
}

fn default_raster_canvas_px() -> u32 {
    100
}

fn default_raster_threshold_ms() -> f64 {
    50.0
}

pub(crate) fn default_software_renderers() -> Vec<String> {
    [
        "software",
        "llvmpipe",
        "swiftshader",
        "microsoft basic render driver",
        "gdi generic",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub(crate) fn default_mobile_markers() -> Vec<String> {
    [
        "android",
        "webos",
        "iphone",
        "ipad",
        "ipod",
        "blackberry",
        "iemobile",
        "opera mini",
        "windows phone",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_low_fps() -> f64 {
    30.0
}

fn default_high_fps() -> f64 {
    50.0
}

fn default_window_frames() -> u32 {
    30
}

fn default_target_fps() -> u32 {
    60
}

fn default_stall_gap_ms() -> f64 {
    1000.0
}

fn default_sustained_stalls() -> u32 {
    3
}
