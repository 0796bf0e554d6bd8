// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Startup capability assessment

use super::environment::{Environment, ProbeCheck};
use super::verdict::{CapabilityVerdict, DegradeReason};
use crate::config::{mobile_regex, ProbeConfig, ProbePolicy, UnknownRendererPolicy};
use crate::error::ProbeError;
use crate::governor::PerformanceTier;

/// Assess the host once and return a verdict.
///
/// Never fails: a probe that errors is logged and read as the conservative
/// value for that one check. A signal the host cannot report adds no
/// reason at all.
pub fn assess_capability(env: &dyn Environment, config: &ProbeConfig) -> CapabilityVerdict {
    let mut verdict = CapabilityVerdict::capable(config.policy);

    // Reduced motion
    verdict.prefers_reduced_motion = env.prefers_reduced_motion();
    if verdict.prefers_reduced_motion {
        verdict.reasons.push(DegradeReason::ReducedMotion);
    }

    // Mobile form factor
    if let Some(ua) = env.user_agent() {
        let markers = match mobile_regex(&config.mobile_markers) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!(target: "tiergov.probe", error = %e, "mobile marker table unusable");
                None
            }
        };
        verdict.is_mobile_ua = markers.is_some_and(|re| re.is_match(&ua));
    }
    if verdict.is_mobile_ua {
        let cap = match config.policy {
            ProbePolicy::Strict => PerformanceTier::Minimal,
            ProbePolicy::Lenient => PerformanceTier::Reduced,
        };
        verdict.reasons.push(DegradeReason::MobileDevice { cap });
    }

    // Accelerated context and renderer identity
    match env.gpu_context() {
        Ok(Some(info)) => {
            verdict.renderer = info.renderer.clone();
            match info.renderer.as_deref() {
                Some(renderer) if is_software_renderer(renderer, &config.software_renderers) => {
                    verdict.is_software_renderer = true;
                    verdict.reasons.push(DegradeReason::SoftwareRenderer {
                        renderer: renderer.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    if config.unknown_renderer == UnknownRendererPolicy::AssumeIncapable {
                        verdict.reasons.push(DegradeReason::UnknownRenderer);
                    }
                }
            }
        }
        Ok(None) => {
            verdict.has_webgl = false;
            verdict.reasons.push(DegradeReason::NoWebGl);
        }
        Err(e) => {
            tracing::debug!(target: "tiergov.probe", error = %e, "gpu context probe failed");
            verdict.has_webgl = false;
            verdict.reasons.push(probe_failed(ProbeCheck::GpuContext, &e));
        }
    }

    // Texture allocation needs a context to allocate against
    if verdict.has_webgl {
        match env.allocate_test_texture() {
            Ok(()) => {}
            Err(ProbeError::AllocationFailed(detail)) => {
                tracing::debug!(target: "tiergov.probe", %detail, "test texture allocation failed");
                verdict.texture_ok = false;
                verdict.reasons.push(DegradeReason::TextureAllocationFailed);
            }
            Err(e) => {
                tracing::debug!(target: "tiergov.probe", error = %e, "texture probe failed");
                verdict.texture_ok = false;
                verdict.reasons.push(probe_failed(ProbeCheck::Texture, &e));
            }
        }
    } else {
        verdict.texture_ok = false;
    }

    // Device memory
    verdict.device_memory_gb = env.device_memory_gb().filter(|gb| gb.is_finite());
    if let Some(gb) = verdict.device_memory_gb {
        if gb < config.min_device_memory_gb {
            verdict.reasons.push(DegradeReason::LowDeviceMemory { gb });
        }
    }

    if config.policy == ProbePolicy::Lenient {
        // Battery
        verdict.battery_level = env.battery_level().filter(|level| level.is_finite());
        if let Some(level) = verdict.battery_level {
            if level < config.low_battery_level {
                verdict.reasons.push(DegradeReason::LowBattery { level });
            }
        }

        // Synthetic raster benchmark
        match env.raster_benchmark(config.raster_rect_count, config.raster_canvas_px) {
            Ok(elapsed) => {
                let ms = elapsed.as_secs_f64() * 1000.0;
                verdict.synthetic_render_ms = Some(ms);
                if ms > config.raster_threshold_ms {
                    verdict.reasons.push(DegradeReason::SlowRaster { ms });
                }
            }
            Err(e) => {
                tracing::debug!(target: "tiergov.probe", error = %e, "raster benchmark failed");
                verdict.reasons.push(probe_failed(ProbeCheck::Raster, &e));
            }
        }
    }

    tracing::debug!(
        target: "tiergov.probe",
        policy = ?verdict.policy,
        reasons = verdict.reasons.len(),
        initial = %verdict.initial_tier(),
        ceiling = %verdict.hardware_ceiling(),
        "capability assessed"
    );

    verdict
}

fn probe_failed(check: ProbeCheck, error: &ProbeError) -> DegradeReason {
    DegradeReason::ProbeFailed {
        check,
        error: error.to_string(),
    }
}

/// Whether `renderer` contains any entry of `table`, ignoring case.
pub fn is_software_renderer(renderer: &str, table: &[String]) -> bool {
    let renderer = renderer.to_lowercase();
    table
        .iter()
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .any(|entry| renderer.contains(&entry))
}

/// Whether `user_agent` matches any of the mobile `markers`.
///
/// Returns `false` when the marker table does not compile.
pub fn is_mobile_user_agent(user_agent: &str, markers: &[String]) -> bool {
    mobile_regex(markers)
        .map(|re| re.is_match(user_agent))
        .unwrap_or(false)
}
