// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use tiergov::config::{HostConfig, ProbeConfig, ProbePolicy, Settings, UnknownRendererPolicy};
use tiergov::governor::PerformanceTier;
use tiergov::probe::{
    assess_capability, is_mobile_user_agent, is_software_renderer, DegradeReason, ProbeCheck,
    SnapshotEnvironment, SystemEnvironment,
};

const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

fn strict() -> ProbeConfig {
    ProbeConfig {
        policy: ProbePolicy::Strict,
        ..ProbeConfig::default()
    }
}

// ==================== Absent signals ====================

#[test]
fn test_unsupported_memory_and_battery_yield_full() {
    let env = SnapshotEnvironment::desktop()
        .with_memory(None)
        .with_battery(None);
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert!(verdict.device_memory_gb.is_none());
    assert!(verdict.battery_level.is_none());
    assert!(verdict.reasons.is_empty());
    assert_eq!(verdict.initial_tier(), PerformanceTier::Full);

    let verdict = assess_capability(&env, &strict());
    assert_eq!(verdict.initial_tier(), PerformanceTier::Full);
}

#[test]
fn test_hidden_renderer_assumed_capable_by_default() {
    let env = SnapshotEnvironment::desktop().without_renderer();
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert_eq!(verdict.initial_tier(), PerformanceTier::Full);

    let config = ProbeConfig {
        unknown_renderer: UnknownRendererPolicy::AssumeIncapable,
        ..ProbeConfig::default()
    };
    let verdict = assess_capability(&env, &config);
    assert_eq!(verdict.reasons, vec![DegradeReason::UnknownRenderer]);
    assert_eq!(verdict.initial_tier(), PerformanceTier::Minimal);
}

// ==================== Hardware checks ====================

#[test]
fn test_no_accelerated_context_is_minimal() {
    let env = SnapshotEnvironment::desktop().with_webgl(false);
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert!(!verdict.has_webgl);
    assert!(!verdict.texture_ok);
    assert!(verdict.reasons.contains(&DegradeReason::NoWebGl));
    assert!(!verdict
        .reasons
        .contains(&DegradeReason::TextureAllocationFailed));
    assert!(verdict.is_hardware_locked());
    assert_eq!(verdict.hardware_ceiling(), PerformanceTier::Minimal);
}

#[test]
fn test_software_renderers_detected() {
    for renderer in [
        "Google SwiftShader",
        "llvmpipe (LLVM 15.0.7, 256 bits)",
        "Microsoft Basic Render Driver",
        "GDI Generic",
    ] {
        let env = SnapshotEnvironment::desktop().with_renderer(renderer);
        let verdict = assess_capability(&env, &ProbeConfig::default());
        assert!(verdict.is_software_renderer, "{} not flagged", renderer);
        assert_eq!(verdict.initial_tier(), PerformanceTier::Minimal);
    }
}

#[test]
fn test_renderer_table_is_extensible() {
    let mut config = ProbeConfig::default();
    assert!(!is_software_renderer("Mesa Lavapipe", &config.software_renderers));
    config.software_renderers.push("lavapipe".to_string());
    assert!(is_software_renderer("Mesa Lavapipe", &config.software_renderers));

    let env = SnapshotEnvironment::desktop().with_renderer("Mesa Lavapipe");
    assert!(assess_capability(&env, &config).is_software_renderer);
}

#[test]
fn test_texture_failure_is_minimal() {
    let env = SnapshotEnvironment::desktop().with_texture(false);
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert!(!verdict.texture_ok);
    assert_eq!(verdict.reasons, vec![DegradeReason::TextureAllocationFailed]);
    assert!(verdict.is_hardware_locked());
}

#[test]
fn test_low_memory_is_minimal() {
    let env = SnapshotEnvironment::desktop().with_memory(Some(1.0));
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert_eq!(verdict.reasons, vec![DegradeReason::LowDeviceMemory { gb: 1.0 }]);
    assert_eq!(verdict.initial_tier(), PerformanceTier::Minimal);
}

#[test]
fn test_throwing_probe_reads_as_incapable() {
    let env = SnapshotEnvironment::desktop().failing(ProbeCheck::GpuContext);
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert!(!verdict.has_webgl);
    assert!(matches!(
        verdict.reasons.as_slice(),
        [DegradeReason::ProbeFailed {
            check: ProbeCheck::GpuContext,
            ..
        }]
    ));
    assert!(verdict.is_hardware_locked());
}

#[test]
fn test_oversized_raster_canvas_fails_soft() {
    let config = ProbeConfig {
        raster_canvas_px: u32::MAX,
        ..ProbeConfig::default()
    };
    let env = SystemEnvironment::new(HostConfig::default());
    let verdict = assess_capability(&env, &config);
    let raster_failure = verdict
        .reasons
        .iter()
        .find(|r| matches!(r, DegradeReason::ProbeFailed { check: ProbeCheck::Raster, .. }));
    assert!(raster_failure.is_some());
    assert!(verdict.synthetic_render_ms.is_none());
}

#[test]
fn test_all_failures_collected() {
    let env = SnapshotEnvironment::desktop()
        .with_reduced_motion(true)
        .with_renderer("SwiftShader")
        .with_memory(Some(0.5))
        .with_battery(Some(0.1));
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert_eq!(verdict.reasons.len(), 4);
    assert_eq!(verdict.initial_tier(), PerformanceTier::Minimal);
}

// ==================== Policies ====================

#[test]
fn test_mobile_strict_forces_minimal() {
    let env = SnapshotEnvironment::desktop().with_user_agent(IPHONE_UA);
    let verdict = assess_capability(&env, &strict());
    assert!(verdict.is_mobile_ua);
    assert_eq!(
        verdict.reasons,
        vec![DegradeReason::MobileDevice {
            cap: PerformanceTier::Minimal
        }]
    );
    assert_eq!(verdict.initial_tier(), PerformanceTier::Minimal);
}

#[test]
fn test_mobile_lenient_caps_at_reduced() {
    let env = SnapshotEnvironment::desktop().with_user_agent(IPHONE_UA);
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert_eq!(verdict.initial_tier(), PerformanceTier::Reduced);
    assert_eq!(verdict.hardware_ceiling(), PerformanceTier::Reduced);
}

#[test]
fn test_strict_skips_battery_and_raster() {
    let env = SnapshotEnvironment::desktop()
        .with_battery(Some(0.01))
        .with_raster_ms(Some(500.0));
    let verdict = assess_capability(&env, &strict());
    assert!(verdict.synthetic_render_ms.is_none());
    assert!(verdict.battery_level.is_none());
    assert_eq!(verdict.initial_tier(), PerformanceTier::Full);
}

#[test]
fn test_lenient_slow_raster_is_soft() {
    let env = SnapshotEnvironment::desktop().with_raster_ms(Some(120.0));
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert_eq!(verdict.synthetic_render_ms, Some(120.0));
    assert_eq!(verdict.initial_tier(), PerformanceTier::Minimal);
    assert!(!verdict.is_hardware_locked());
    assert!(verdict.starts_fps_demoted());
}

#[test]
fn test_low_battery_is_soft() {
    let env = SnapshotEnvironment::desktop().with_battery(Some(0.1));
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert_eq!(verdict.initial_tier(), PerformanceTier::Minimal);
    assert_eq!(verdict.hardware_ceiling(), PerformanceTier::Full);
}

#[test]
fn test_mobile_markers_match_common_agents() {
    let markers = Settings::default().probe.mobile_markers;
    assert!(is_mobile_user_agent(IPHONE_UA, &markers));
    assert!(is_mobile_user_agent(
        "Mozilla/5.0 (Linux; Android 14; Pixel 8) Chrome/124.0 Mobile",
        &markers
    ));
    assert!(!is_mobile_user_agent(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/124.0",
        &markers
    ));
}

// ==================== Snapshot files ====================

#[test]
fn test_snapshot_file_round_trip_through_probe() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("env.json");
    std::fs::write(
        &path,
        r#"{"hasWebgl": true, "renderer": "ANGLE (Apple M2)", "deviceMemoryGb": 16.0}"#,
    )
    .unwrap();

    let env = SnapshotEnvironment::from_file(&path).unwrap();
    let verdict = assess_capability(&env, &ProbeConfig::default());
    assert_eq!(verdict.renderer.as_deref(), Some("ANGLE (Apple M2)"));
    assert_eq!(verdict.device_memory_gb, Some(16.0));
    assert_eq!(verdict.initial_tier(), PerformanceTier::Full);
}
