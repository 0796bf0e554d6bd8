// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Fixed, file-describable environment

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::environment::{Environment, GpuContextInfo, ProbeCheck};
use crate::error::{ProbeError, Result, TierGovError};

/// An environment whose every signal is fixed up front.
///
/// Used to replay a host described in JSON and to drive probes in tests.
/// Unset optional signals behave as "host has no such API".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotEnvironment {
    pub prefers_reduced_motion: bool,
    pub user_agent: Option<String>,
    pub has_webgl: bool,
    pub renderer: Option<String>,
    pub texture_ok: bool,
    pub device_memory_gb: Option<f64>,
    pub battery_level: Option<f64>,
    /// Benchmark time to report, `None` to report no 2D raster support
    pub raster_ms: Option<f64>,
    /// Probes that throw instead of answering
    pub probe_errors: Vec<ProbeCheck>,
}

impl Default for SnapshotEnvironment {
    fn default() -> Self {
        Self {
            prefers_reduced_motion: false,
            user_agent: None,
            has_webgl: true,
            renderer: None,
            texture_ok: true,
            device_memory_gb: None,
            battery_level: None,
            raster_ms: Some(5.0),
            probe_errors: Vec::new(),
        }
    }
}

impl SnapshotEnvironment {
    /// A capable desktop: accelerated hardware renderer, 8GB, fast raster.
    pub fn desktop() -> Self {
        Self {
            user_agent: Some(
                "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0".to_string(),
            ),
            renderer: Some("ANGLE (NVIDIA GeForce RTX 3060)".to_string()),
            device_memory_gb: Some(8.0),
            ..Self::default()
        }
    }

    /// Load a snapshot from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            TierGovError::InvalidInput(format!(
                "environment file {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn with_reduced_motion(mut self, on: bool) -> Self {
        self.prefers_reduced_motion = on;
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    pub fn with_webgl(mut self, available: bool) -> Self {
        self.has_webgl = available;
        self
    }

    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    pub fn without_renderer(mut self) -> Self {
        self.renderer = None;
        self
    }

    pub fn with_texture(mut self, ok: bool) -> Self {
        self.texture_ok = ok;
        self
    }

    pub fn with_memory(mut self, gb: Option<f64>) -> Self {
        self.device_memory_gb = gb;
        self
    }

    pub fn with_battery(mut self, level: Option<f64>) -> Self {
        self.battery_level = level;
        self
    }

    pub fn with_raster_ms(mut self, ms: Option<f64>) -> Self {
        self.raster_ms = ms;
        self
    }

    pub fn failing(mut self, check: ProbeCheck) -> Self {
        if !self.probe_errors.contains(&check) {
            self.probe_errors.push(check);
        }
        self
    }

    fn fails(&self, check: ProbeCheck) -> bool {
        self.probe_errors.contains(&check)
    }
}

impl Environment for SnapshotEnvironment {
    fn prefers_reduced_motion(&self) -> bool {
        self.prefers_reduced_motion
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn gpu_context(&self) -> std::result::Result<Option<GpuContextInfo>, ProbeError> {
        if self.fails(ProbeCheck::GpuContext) {
            return Err(ProbeError::ContextCreation(
                "context creation threw".to_string(),
            ));
        }
        if !self.has_webgl {
            return Ok(None);
        }
        Ok(Some(GpuContextInfo {
            renderer: self.renderer.clone(),
        }))
    }

    fn allocate_test_texture(&self) -> std::result::Result<(), ProbeError> {
        if self.fails(ProbeCheck::Texture) {
            return Err(ProbeError::ContextCreation("texture probe threw".to_string()));
        }
        if self.texture_ok {
            Ok(())
        } else {
            Err(ProbeError::AllocationFailed("1x1 RGBA texture".to_string()))
        }
    }

    fn device_memory_gb(&self) -> Option<f64> {
        self.device_memory_gb
    }

    fn battery_level(&self) -> Option<f64> {
        self.battery_level
    }

    fn raster_benchmark(
        &self,
        _rects: u32,
        _canvas_px: u32,
    ) -> std::result::Result<Duration, ProbeError> {
        if self.fails(ProbeCheck::Raster) {
            return Err(ProbeError::ContextCreation("2d context threw".to_string()));
        }
        match self.raster_ms {
            Some(ms) if ms.is_finite() => Ok(Duration::from_secs_f64(ms.max(0.0) / 1000.0)),
            _ => Err(ProbeError::Unsupported("2d raster")),
        }
    }
}
