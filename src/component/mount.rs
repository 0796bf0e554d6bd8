// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mounting a component against the tier flag

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::AdaptiveComponent;
use crate::flag::{TierFlag, TierSignal};
use crate::governor::PerformanceTier;

/// What a mounted component is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "tier", rename_all = "lowercase")]
pub enum RenderMode {
    /// Single static snapshot, no loop
    Static,
    /// Per-frame loop running at this tier
    Animated(PerformanceTier),
}

impl RenderMode {
    pub fn for_tier(tier: PerformanceTier) -> Self {
        if tier.runs_frame_loop() {
            RenderMode::Animated(tier)
        } else {
            RenderMode::Static
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, RenderMode::Animated(_))
    }
}

type SharedComponent = Arc<Mutex<Box<dyn AdaptiveComponent>>>;

struct MountState {
    name: &'static str,
    mode: Mutex<RenderMode>,
    last_frame: Mutex<String>,
    frames: AtomicU64,
    active_loops: AtomicUsize,
    peak_loops: AtomicUsize,
    applied: watch::Sender<u64>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!(target: "tiergov.component", "{} lock was poisoned, recovering", what);
            poisoned.into_inner()
        }
    }
}

impl MountState {
    fn set_frame(&self, frame: String) {
        *lock(&self.last_frame, "frame") = frame;
        self.frames.fetch_add(1, Ordering::Relaxed);
    }
}

/// Counts a running loop for as long as it lives.
struct ActiveLoop {
    state: Arc<MountState>,
}

impl ActiveLoop {
    fn enter(state: &Arc<MountState>) -> Self {
        let now = state.active_loops.fetch_add(1, Ordering::SeqCst) + 1;
        state.peak_loops.fetch_max(now, Ordering::SeqCst);
        Self {
            state: Arc::clone(state),
        }
    }
}

impl Drop for ActiveLoop {
    fn drop(&mut self) {
        self.state.active_loops.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owns one per-frame loop task. Dropping it aborts the loop.
struct LoopGuard {
    handle: Option<JoinHandle<()>>,
}

impl LoopGuard {
    /// Abort the loop and wait until its task is gone.
    async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for LoopGuard {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Applies tier changes to one component. At most one loop exists at a time.
struct Supervisor {
    component: SharedComponent,
    state: Arc<MountState>,
    running: Option<LoopGuard>,
}

impl Supervisor {
    fn mode(&self) -> RenderMode {
        *lock(&self.state.mode, "mode")
    }

    /// Bring the component in line with `signal`.
    async fn apply(&mut self, signal: TierSignal) {
        let tier = signal.effective();
        let target = RenderMode::for_tier(tier);

        if self.mode() != target {
            if let Some(guard) = self.running.take() {
                guard.stop().await;
            }
            match target {
                RenderMode::Static => self.render_static(),
                RenderMode::Animated(tier) => self.start_loop(tier),
            }
            *lock(&self.state.mode, "mode") = target;
            tracing::debug!(
                target: "tiergov.component",
                component = self.state.name,
                %tier,
                generation = signal.generation,
                "render mode switched"
            );
        }

        self.state.applied.send_replace(signal.generation);
    }

    fn render_static(&self) {
        let frame = {
            let mut component = lock(&self.component, "component");
            component.reset();
            component.render_static()
        };
        self.state.set_frame(frame);
    }

    fn start_loop(&mut self, tier: PerformanceTier) {
        let interval = lock(&self.component, "component")
            .frame_interval(tier)
            .max(Duration::from_millis(1));
        // First animated frame is drawn before returning so a reader never
        // sees a static frame under an animated mode.
        let first = lock(&self.component, "component").tick(tier, Duration::ZERO);
        self.state.set_frame(first);

        let active = ActiveLoop::enter(&self.state);
        let component = Arc::clone(&self.component);
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            let _active = active;
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut last = Instant::now();
            loop {
                let now = ticker.tick().await;
                let dt = now.saturating_duration_since(last);
                last = now;
                let frame = lock(&component, "component").tick(tier, dt);
                state.set_frame(frame);
            }
        });

        self.running = Some(LoopGuard {
            handle: Some(handle),
        });
    }

    async fn shutdown(&mut self) {
        if let Some(guard) = self.running.take() {
            guard.stop().await;
        }
    }
}

/// A component following the tier flag.
///
/// Dropping it aborts every task it owns; [`MountedComponent::unmount`]
/// additionally waits for them to finish.
pub struct MountedComponent {
    state: Arc<MountState>,
    flag: TierFlag,
    shutdown: Option<oneshot::Sender<()>>,
    supervisor: Option<JoinHandle<()>>,
}

/// Mount `component` against `flag`.
///
/// The flag is read synchronously and the matching mode is rendered before
/// this returns; an unpublished flag reads as `Minimal`. After that a
/// supervisor task follows every publish. Must be called from within a
/// tokio runtime.
pub fn mount<C: AdaptiveComponent>(component: C, flag: &TierFlag) -> MountedComponent {
    let name = component.name();
    let (applied, _) = watch::channel(0);
    let state = Arc::new(MountState {
        name,
        mode: Mutex::new(RenderMode::Static),
        last_frame: Mutex::new(String::new()),
        frames: AtomicU64::new(0),
        active_loops: AtomicUsize::new(0),
        peak_loops: AtomicUsize::new(0),
        applied,
    });

    let mut supervisor = Supervisor {
        component: Arc::new(Mutex::new(Box::new(component) as Box<dyn AdaptiveComponent>)),
        state: Arc::clone(&state),
        running: None,
    };

    let mut rx = flag.subscribe();
    let signal = *rx.borrow_and_update();
    let tier = signal.effective();
    match RenderMode::for_tier(tier) {
        RenderMode::Static => supervisor.render_static(),
        RenderMode::Animated(tier) => supervisor.start_loop(tier),
    }
    *lock(&state.mode, "mode") = RenderMode::for_tier(tier);
    state.applied.send_replace(signal.generation);
    tracing::debug!(target: "tiergov.component", component = name, %tier, "mounted");

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let signal = *rx.borrow_and_update();
                    supervisor.apply(signal).await;
                }
            }
        }
        supervisor.shutdown().await;
        tracing::debug!(target: "tiergov.component", component = name, "unmounted");
    });

    MountedComponent {
        state,
        flag: flag.clone(),
        shutdown: Some(shutdown_tx),
        supervisor: Some(handle),
    }
}

impl MountedComponent {
    pub fn name(&self) -> &'static str {
        self.state.name
    }

    pub fn mode(&self) -> RenderMode {
        *lock(&self.state.mode, "mode")
    }

    /// Most recently rendered frame.
    pub fn last_frame(&self) -> String {
        lock(&self.state.last_frame, "frame").clone()
    }

    /// Frames rendered so far, static snapshots included.
    pub fn frames_rendered(&self) -> u64 {
        self.state.frames.load(Ordering::Relaxed)
    }

    /// Per-frame loops currently alive.
    pub fn active_loops(&self) -> usize {
        self.state.active_loops.load(Ordering::SeqCst)
    }

    /// Highest number of loops ever alive at once.
    pub fn peak_loops(&self) -> usize {
        self.state.peak_loops.load(Ordering::SeqCst)
    }

    /// Wait until the component has applied the flag's latest publish.
    pub async fn settled(&self) {
        let mut applied = self.state.applied.subscribe();
        loop {
            let target = self.flag.signal().generation;
            if applied.wait_for(|generation| *generation >= target).await.is_err() {
                return;
            }
            if self.flag.signal().generation == target {
                return;
            }
        }
    }

    /// Stop following the flag and wait for every owned task to end.
    pub async fn unmount(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.supervisor.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for MountedComponent {
    fn drop(&mut self) {
        if let Some(handle) = &self.supervisor {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for MountedComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountedComponent")
            .field("name", &self.state.name)
            .field("mode", &self.mode())
            .field("active_loops", &self.active_loops())
            .finish()
    }
}
