// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Process-wide performance governor

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Serialize;

use super::state::{GovernorInput, GovernorState, TierChange};
use super::tier::PerformanceTier;
use crate::config::GovernorConfig;
use crate::error::{Result, TierGovError};
use crate::flag::{TierFlag, TierPublisher};
use crate::probe::{CapabilityVerdict, DegradeReason};

type Listener = Arc<dyn Fn(&TierChange) + Send + Sync>;

struct GovernorInner {
    state: Mutex<GovernorState>,
    publisher: TierPublisher,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
    transitions: AtomicU64,
    verdict: CapabilityVerdict,
    dev_tools: bool,
}

/// Combines the startup verdict with live frame-rate and preference
/// signals into one tier, and is the only writer of the tier flag.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PerformanceGovernor {
    inner: Arc<GovernorInner>,
}

/// Listener registration returned by [`PerformanceGovernor::subscribe`].
/// Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    governor: Weak<GovernorInner>,
}

/// Point-in-time view of the governor, for display.
#[derive(Debug, Clone, Serialize)]
pub struct GovernorSnapshot {
    pub tier: PerformanceTier,
    pub ceiling: PerformanceTier,
    pub hardware_locked: bool,
    pub fps_latched: bool,
    pub reduced_motion: bool,
    pub dev_override: bool,
    pub last_fps: Option<f64>,
    pub transitions: u64,
    pub flag_generation: u64,
    pub reasons: Vec<DegradeReason>,
}

impl PerformanceGovernor {
    /// Build the governor and publish the initial tier before returning.
    pub fn new(
        verdict: CapabilityVerdict,
        config: &GovernorConfig,
        publisher: TierPublisher,
    ) -> Self {
        let state = GovernorState::from_verdict(&verdict, config);
        let initial = state.tier();
        publisher.publish(initial);

        tracing::info!(
            target: "tiergov.governor",
            tier = %initial,
            ceiling = %state.ceiling(),
            hardware_locked = state.hardware_locked(),
            "initial tier"
        );

        Self {
            inner: Arc::new(GovernorInner {
                state: Mutex::new(state),
                publisher,
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
                transitions: AtomicU64::new(0),
                verdict,
                dev_tools: config.dev_tools,
            }),
        }
    }

    /// Current tier.
    pub fn current_tier(&self) -> PerformanceTier {
        self.inner.lock_state().tier()
    }

    /// A reader for the flag this governor writes.
    pub fn flag(&self) -> TierFlag {
        self.inner.publisher.flag()
    }

    /// The verdict this governor was seeded from.
    pub fn verdict(&self) -> &CapabilityVerdict {
        &self.inner.verdict
    }

    /// Call `listener` after every transition until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TierChange) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner
            .lock_listeners()
            .push((id, Arc::new(listener)));
        Subscription {
            id,
            governor: Arc::downgrade(&self.inner),
        }
    }

    /// Feed one sampling window.
    pub fn record_fps(&self, fps: f64) -> Option<TierChange> {
        self.apply(GovernorInput::FrameRate(fps))
    }

    /// Follow a reduced-motion preference change.
    pub fn set_reduced_motion(&self, enabled: bool) -> Option<TierChange> {
        self.apply(GovernorInput::ReducedMotion(enabled))
    }

    /// Flip the dev-mode low-power override. Returns whether it is now on.
    pub fn toggle_dev_override(&self) -> Result<bool> {
        if !self.inner.dev_tools {
            return Err(TierGovError::DevToolsDisabled);
        }
        let mut enabled = false;
        self.apply_with(|state| {
            enabled = !state.dev_override();
            GovernorInput::DevOverride(enabled)
        });
        Ok(enabled)
    }

    /// Whether the dev override currently forces low-power mode.
    pub fn is_low_power_forced(&self) -> bool {
        self.inner.lock_state().dev_override()
    }

    pub fn snapshot(&self) -> GovernorSnapshot {
        let state = self.inner.lock_state();
        GovernorSnapshot {
            tier: state.tier(),
            ceiling: state.ceiling(),
            hardware_locked: state.hardware_locked(),
            fps_latched: state.fps_latched(),
            reduced_motion: state.reduced_motion(),
            dev_override: state.dev_override(),
            last_fps: state.last_fps(),
            transitions: self.inner.transitions.load(Ordering::Relaxed),
            flag_generation: self.inner.publisher.flag().signal().generation,
            reasons: self.inner.verdict.reasons.clone(),
        }
    }

    fn apply(&self, input: GovernorInput) -> Option<TierChange> {
        self.apply_with(|_| input)
    }

    /// Build the input from the locked state, so read-modify-write inputs
    /// see the state they replace.
    fn apply_with<F>(&self, input: F) -> Option<TierChange>
    where
        F: FnOnce(&GovernorState) -> GovernorInput,
    {
        let change = {
            let mut state = self.inner.lock_state();
            let input = input(&state);
            let change = state.apply(input)?;
            // Flag write happens under the state lock so no reader can see
            // a tier the governor has already left.
            self.inner.publisher.publish(change.to);
            change
        };
        self.inner.transitions.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            target: "tiergov.governor",
            from = %change.from,
            to = %change.to,
            cause = %change.cause,
            "tier transition"
        );

        let listeners: Vec<Listener> = self
            .inner
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&change);
        }

        Some(change)
    }
}

impl GovernorInner {
    fn lock_state(&self) -> MutexGuard<'_, GovernorState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!(target: "tiergov.governor", "State lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!(target: "tiergov.governor", "Listener lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl std::fmt::Debug for PerformanceGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceGovernor")
            .field("state", &*self.inner.lock_state())
            .field("dev_tools", &self.inner.dev_tools)
            .finish()
    }
}

impl Subscription {
    /// Stop receiving transitions.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.governor.upgrade() {
            inner.lock_listeners().retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
