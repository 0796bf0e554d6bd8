// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tiergov::component::{
    by_name, mount, AdaptiveComponent, AsciiDonut, ParticleField, RenderMode, TechRings,
};
use tiergov::governor::PerformanceTier;
use tiergov::TierFlag;

/// Counts what the supervisor asks of it.
#[derive(Clone, Default)]
struct Counting {
    ticks: Arc<AtomicUsize>,
    statics: Arc<AtomicUsize>,
}

impl AdaptiveComponent for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn frame_interval(&self, _tier: PerformanceTier) -> Duration {
        Duration::from_millis(2)
    }

    fn render_static(&mut self) -> String {
        self.statics.fetch_add(1, Ordering::SeqCst);
        "static".to_string()
    }

    fn tick(&mut self, tier: PerformanceTier, _dt: Duration) -> String {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        format!("frame@{}", tier)
    }
}

// ==================== Mount ====================

#[tokio::test]
async fn test_mount_renders_synchronously() {
    let (publisher, flag) = TierFlag::new();
    publisher.publish(PerformanceTier::Minimal);
    let mounted = mount(AsciiDonut::new(), &flag);
    assert_eq!(mounted.mode(), RenderMode::Static);
    assert!(!mounted.last_frame().is_empty());
    assert_eq!(mounted.active_loops(), 0);
    mounted.unmount().await;
}

#[tokio::test]
async fn test_unpublished_flag_mounts_static() {
    let (_publisher, flag) = TierFlag::new();
    let probe = Counting::default();
    let mounted = mount(probe.clone(), &flag);
    assert_eq!(mounted.mode(), RenderMode::Static);
    assert_eq!(probe.ticks.load(Ordering::SeqCst), 0);
    assert_eq!(mounted.last_frame(), "static");
    mounted.unmount().await;
}

#[tokio::test]
async fn test_full_tier_runs_one_loop() {
    let (publisher, flag) = TierFlag::new();
    publisher.publish(PerformanceTier::Full);
    let probe = Counting::default();
    let mounted = mount(probe.clone(), &flag);

    assert_eq!(mounted.mode(), RenderMode::Animated(PerformanceTier::Full));
    assert_eq!(mounted.active_loops(), 1);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(probe.ticks.load(Ordering::SeqCst) > 1);
    assert!(mounted.last_frame().starts_with("frame@"));
    mounted.unmount().await;
}

#[tokio::test]
async fn test_demotion_cancels_loop() {
    let (publisher, flag) = TierFlag::new();
    publisher.publish(PerformanceTier::Full);
    let probe = Counting::default();
    let mounted = mount(probe.clone(), &flag);

    publisher.publish(PerformanceTier::Minimal);
    mounted.settled().await;
    assert_eq!(mounted.mode(), RenderMode::Static);
    assert_eq!(mounted.active_loops(), 0);
    assert_eq!(mounted.last_frame(), "static");

    let ticks = probe.ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(probe.ticks.load(Ordering::SeqCst), ticks);
    mounted.unmount().await;
}

#[tokio::test]
async fn test_tier_change_between_animated_tiers_restarts_loop() {
    let (publisher, flag) = TierFlag::new();
    publisher.publish(PerformanceTier::Full);
    let mounted = mount(Counting::default(), &flag);

    publisher.publish(PerformanceTier::Reduced);
    mounted.settled().await;
    assert_eq!(mounted.mode(), RenderMode::Animated(PerformanceTier::Reduced));
    assert_eq!(mounted.active_loops(), 1);
    assert_eq!(mounted.peak_loops(), 1);
    mounted.unmount().await;
}

#[tokio::test]
async fn test_republishing_same_tier_is_idempotent() {
    let (publisher, flag) = TierFlag::new();
    publisher.publish(PerformanceTier::Minimal);
    let probe = Counting::default();
    let mounted = mount(probe.clone(), &flag);

    for _ in 0..10 {
        publisher.publish(PerformanceTier::Minimal);
    }
    mounted.settled().await;
    assert_eq!(probe.statics.load(Ordering::SeqCst), 1);
    assert_eq!(mounted.active_loops(), 0);
    mounted.unmount().await;
}

// ==================== Rapid flips ====================

#[tokio::test]
async fn test_hundred_rapid_flips_end_consistent() {
    for last_full in [true, false] {
        let (publisher, flag) = TierFlag::new();
        publisher.publish(PerformanceTier::Full);
        let mounted = mount(TechRings::new(), &flag);

        let flips = if last_full { 100 } else { 101 };
        for i in 0..flips {
            let tier = if i % 2 == 0 {
                PerformanceTier::Minimal
            } else {
                PerformanceTier::Full
            };
            publisher.publish(tier);
            if i % 7 == 0 {
                tokio::task::yield_now().await;
            }
        }
        mounted.settled().await;

        if last_full {
            assert_eq!(mounted.mode(), RenderMode::Animated(PerformanceTier::Full));
            assert_eq!(mounted.active_loops(), 1);
        } else {
            assert_eq!(mounted.mode(), RenderMode::Static);
            assert_eq!(mounted.active_loops(), 0);
        }
        assert!(mounted.peak_loops() <= 1);
        mounted.unmount().await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_flips_from_another_task_never_overlap_loops() {
    let (publisher, flag) = TierFlag::new();
    publisher.publish(PerformanceTier::Full);
    let mounted = mount(Counting::default(), &flag);

    let flipper = tokio::spawn(async move {
        for i in 0..100 {
            let tier = if i % 2 == 0 {
                PerformanceTier::Minimal
            } else {
                PerformanceTier::Full
            };
            publisher.publish(tier);
            tokio::task::yield_now().await;
        }
        publisher
    });
    let publisher = flipper.await.unwrap();
    mounted.settled().await;

    assert_eq!(flag.current(), PerformanceTier::Full);
    assert_eq!(mounted.mode(), RenderMode::Animated(PerformanceTier::Full));
    assert_eq!(mounted.active_loops(), 1);
    assert!(mounted.peak_loops() <= 1);
    mounted.unmount().await;
    drop(publisher);
}

// ==================== Unmount ====================

#[tokio::test]
async fn test_unmount_stops_ticking() {
    let (publisher, flag) = TierFlag::new();
    publisher.publish(PerformanceTier::Full);
    let probe = Counting::default();
    let mounted = mount(probe.clone(), &flag);
    tokio::time::sleep(Duration::from_millis(10)).await;
    mounted.unmount().await;

    let ticks = probe.ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(probe.ticks.load(Ordering::SeqCst), ticks);
}

#[tokio::test]
async fn test_remount_cycles_do_not_accumulate() {
    let (publisher, flag) = TierFlag::new();
    publisher.publish(PerformanceTier::Full);
    let probe = Counting::default();

    for _ in 0..20 {
        let mounted = mount(probe.clone(), &flag);
        publisher.publish(PerformanceTier::Minimal);
        mounted.settled().await;
        assert_eq!(mounted.active_loops(), 0);
        publisher.publish(PerformanceTier::Full);
        mounted.settled().await;
        assert_eq!(mounted.active_loops(), 1);
        mounted.unmount().await;
    }

    let ticks = probe.ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(probe.ticks.load(Ordering::SeqCst), ticks);
}

// ==================== Bundled components ====================

#[tokio::test]
async fn test_bundled_components_mount_in_every_tier() {
    for name in ["donut", "rings", "particles", "cursor"] {
        for tier in PerformanceTier::ALL {
            let (publisher, flag) = TierFlag::new();
            publisher.publish(tier);
            let mounted = mount(by_name(name).unwrap(), &flag);
            assert_eq!(mounted.mode(), RenderMode::for_tier(tier));
            assert_eq!(mounted.active_loops(), usize::from(tier.runs_frame_loop()));
            mounted.unmount().await;
        }
    }
}

#[test]
fn test_particle_field_thins_out_when_reduced() {
    let mut field = ParticleField::new(42);
    field.tick(PerformanceTier::Reduced, Duration::from_millis(16));
    assert!(field.live_count() < ParticleField::count_for(PerformanceTier::Full));
}

#[test]
fn test_unknown_component_name() {
    assert!(by_name("teapot").is_err());
}
