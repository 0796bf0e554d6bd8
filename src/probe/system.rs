// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Native host environment

use std::path::{Path, PathBuf};
use std::time::Duration;

use sysinfo::System;

use super::environment::{Environment, GpuContextInfo};
use super::raster;
use crate::config::HostConfig;
use crate::error::ProbeError;

const DRI_DIR: &str = "/dev/dri";
const DRM_CLASS_DIR: &str = "/sys/class/drm";
const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

/// Environment backed by the machine we are running on.
///
/// Signals the OS cannot answer come from [`HostConfig`] (and its
/// environment variables); anything still unknown is reported as absent.
#[derive(Debug, Clone)]
pub struct SystemEnvironment {
    host: HostConfig,
    total_memory_bytes: u64,
    sysfs_root: PathBuf,
}

impl SystemEnvironment {
    pub fn new(host: HostConfig) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        Self {
            host,
            total_memory_bytes: sys.total_memory(),
            sysfs_root: PathBuf::from("/"),
        }
    }

    /// Read device nodes and sysfs from `root` instead of `/`.
    pub fn with_sysfs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sysfs_root = root.into();
        self
    }

    fn rooted(&self, absolute: &str) -> PathBuf {
        self.sysfs_root.join(absolute.trim_start_matches('/'))
    }

    fn default_user_agent() -> String {
        format!(
            "tiergov/{} ({}; {})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        )
    }

    fn has_render_node(&self) -> Result<bool, ProbeError> {
        if !cfg!(target_os = "linux") {
            return Ok(true);
        }
        let dir = self.rooted(DRI_DIR);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(ProbeError::Io(e)),
        };
        for entry in entries {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("renderD") || name.starts_with("card") {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn kernel_driver(&self) -> Option<String> {
        let link = self.rooted(DRM_CLASS_DIR).join("card0/device/driver");
        let target = std::fs::read_link(link).ok()?;
        target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn read_battery(dir: &Path) -> Option<f64> {
        let kind = std::fs::read_to_string(dir.join("type")).ok()?;
        if kind.trim() != "Battery" {
            return None;
        }
        let capacity = std::fs::read_to_string(dir.join("capacity")).ok()?;
        let percent: f64 = capacity.trim().parse().ok()?;
        Some((percent / 100.0).clamp(0.0, 1.0))
    }
}

impl Environment for SystemEnvironment {
    fn prefers_reduced_motion(&self) -> bool {
        self.host.effective_reduced_motion()
    }

    fn user_agent(&self) -> Option<String> {
        Some(
            self.host
                .effective_user_agent()
                .unwrap_or_else(Self::default_user_agent),
        )
    }

    fn gpu_context(&self) -> Result<Option<GpuContextInfo>, ProbeError> {
        let available = match self.host.has_gpu_context {
            Some(forced) => forced,
            None => self.has_render_node()?,
        };
        if !available {
            return Ok(None);
        }
        let renderer = self
            .host
            .effective_gpu_renderer()
            .or_else(|| self.kernel_driver());
        Ok(Some(GpuContextInfo { renderer }))
    }

    fn allocate_test_texture(&self) -> Result<(), ProbeError> {
        // 1x1 RGBA
        let mut texture: Vec<u8> = Vec::new();
        texture
            .try_reserve_exact(4)
            .map_err(|e| ProbeError::AllocationFailed(e.to_string()))?;
        texture.extend_from_slice(&[0, 0, 0, 0]);
        drop(texture);
        Ok(())
    }

    fn device_memory_gb(&self) -> Option<f64> {
        if self.total_memory_bytes == 0 {
            return None;
        }
        Some(self.total_memory_bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }

    fn battery_level(&self) -> Option<f64> {
        let entries = std::fs::read_dir(self.rooted(POWER_SUPPLY_DIR)).ok()?;
        entries
            .flatten()
            .find_map(|entry| Self::read_battery(&entry.path()))
    }

    fn raster_benchmark(&self, rects: u32, canvas_px: u32) -> Result<Duration, ProbeError> {
        if canvas_px == 0 {
            return Err(ProbeError::ContextCreation(
                "zero-sized raster canvas".to_string(),
            ));
        }
        let mut rng = rand::rng();
        let (elapsed, _canvas) = raster::run_benchmark(&mut rng, rects, canvas_px)?;
        Ok(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_root() -> TempDir {
        TempDir::new().unwrap()
    }

    #[test]
    fn test_default_user_agent_is_not_mobile() {
        let env = SystemEnvironment::new(HostConfig {
            user_agent: None,
            ..HostConfig::default()
        });
        let ua = SystemEnvironment::default_user_agent();
        assert!(ua.starts_with("tiergov/"));
        assert!(env.user_agent().is_some());
    }

    #[test]
    fn test_memory_is_reported() {
        let env = SystemEnvironment::new(HostConfig::default());
        let gb = env.device_memory_gb();
        assert!(gb.map(|gb| gb > 0.0).unwrap_or(true));
    }

    #[test]
    fn test_forced_gpu_context() {
        let host = HostConfig {
            has_gpu_context: Some(false),
            ..HostConfig::default()
        };
        let env = SystemEnvironment::new(host);
        assert!(matches!(env.gpu_context(), Ok(None)));
    }

    #[test]
    fn test_configured_renderer() {
        let host = HostConfig {
            has_gpu_context: Some(true),
            gpu_renderer: Some("Mesa Intel(R) UHD Graphics 620".to_string()),
            ..HostConfig::default()
        };
        let env = SystemEnvironment::new(host);
        let info = env.gpu_context().unwrap().unwrap();
        // The env var, if set by the harness, wins over the file value
        assert!(info.renderer.is_some());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_missing_dri_means_no_context() {
        let root = fake_root();
        let env = SystemEnvironment::new(HostConfig::default()).with_sysfs_root(root.path());
        assert!(matches!(env.gpu_context(), Ok(None)));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_render_node_means_context() {
        let root = fake_root();
        std::fs::create_dir_all(root.path().join("dev/dri")).unwrap();
        std::fs::write(root.path().join("dev/dri/renderD128"), "").unwrap();
        let env = SystemEnvironment::new(HostConfig::default()).with_sysfs_root(root.path());
        assert!(matches!(env.gpu_context(), Ok(Some(_))));
    }

    #[test]
    fn test_battery_from_power_supply() {
        let root = fake_root();
        let ac = root.path().join("sys/class/power_supply/AC");
        let bat = root.path().join("sys/class/power_supply/BAT0");
        std::fs::create_dir_all(&ac).unwrap();
        std::fs::create_dir_all(&bat).unwrap();
        std::fs::write(ac.join("type"), "Mains\n").unwrap();
        std::fs::write(bat.join("type"), "Battery\n").unwrap();
        std::fs::write(bat.join("capacity"), "15\n").unwrap();

        let env = SystemEnvironment::new(HostConfig::default()).with_sysfs_root(root.path());
        assert_eq!(env.battery_level(), Some(0.15));
    }

    #[test]
    fn test_no_battery_is_absent() {
        let root = fake_root();
        let env = SystemEnvironment::new(HostConfig::default()).with_sysfs_root(root.path());
        assert_eq!(env.battery_level(), None);
    }

    #[test]
    fn test_texture_allocation_succeeds() {
        let env = SystemEnvironment::new(HostConfig::default());
        assert!(env.allocate_test_texture().is_ok());
    }

    #[test]
    fn test_raster_benchmark_runs() {
        let env = SystemEnvironment::new(HostConfig::default());
        assert!(env.raster_benchmark(100, 50).is_ok());
        assert!(env.raster_benchmark(100, 0).is_err());
        assert!(matches!(
            env.raster_benchmark(10, u32::MAX),
            Err(ProbeError::AllocationFailed(_))
        ));
    }
}
