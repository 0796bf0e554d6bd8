// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Governor runtime: probe, governor, preference follower and sampler

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::error::Result;
use crate::flag::{TierFlag, TierPublisher};
use crate::frame::FrameSource;
use crate::governor::PerformanceGovernor;
use crate::probe::{assess_capability, Environment};
use crate::sampler::{start_sampling, SamplerHandle, Visibility};

/// Live host signals the runtime follows after startup.
#[derive(Debug, Default)]
pub struct HostSignals {
    /// Reduced-motion preference; its value at start wins over the probe's
    pub reduced_motion: Option<watch::Receiver<bool>>,
    /// Host visibility; sampling pauses while hidden
    pub visibility: Option<watch::Receiver<Visibility>>,
}

/// Everything started for one session. Dropping it cancels every task.
#[derive(Debug)]
pub struct GovernorRuntime {
    governor: PerformanceGovernor,
    sampler: Option<SamplerHandle>,
    follower: Option<JoinHandle<()>>,
}

impl GovernorRuntime {
    /// Start a runtime writing to a fresh, private flag.
    pub fn start<S>(
        settings: &Settings,
        env: &dyn Environment,
        signals: HostSignals,
        frames: S,
    ) -> Result<Self>
    where
        S: FrameSource + 'static,
    {
        let (publisher, _flag) = TierFlag::new();
        Self::start_with_publisher(publisher, settings, env, signals, frames)
    }

    /// Start a runtime writing to `publisher`'s flag.
    ///
    /// The probe runs and the initial tier is published before the sampler
    /// exists, so the first sample always lands on a seeded governor. Must
    /// be called from within a tokio runtime.
    pub fn start_with_publisher<S>(
        publisher: TierPublisher,
        settings: &Settings,
        env: &dyn Environment,
        signals: HostSignals,
        frames: S,
    ) -> Result<Self>
    where
        S: FrameSource + 'static,
    {
        settings.validate()?;

        let verdict = assess_capability(env, &settings.probe);
        let governor = PerformanceGovernor::new(verdict, &settings.governor, publisher);

        let follower = signals.reduced_motion.map(|mut rx| {
            // The live preference is applied before start returns, so no
            // reader sees the probe's tier while motion is already reduced.
            let initial = *rx.borrow_and_update();
            if initial != governor.snapshot().reduced_motion {
                governor.set_reduced_motion(initial);
            }
            let governor = governor.clone();
            tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let enabled = *rx.borrow_and_update();
                    governor.set_reduced_motion(enabled);
                }
            })
        });

        let sink = governor.clone();
        let sampler = start_sampling(frames, &settings.sampler, signals.visibility, move |fps| {
            sink.record_fps(fps);
        });

        Ok(Self {
            governor,
            sampler: Some(sampler),
            follower,
        })
    }

    pub fn governor(&self) -> &PerformanceGovernor {
        &self.governor
    }

    pub fn flag(&self) -> TierFlag {
        self.governor.flag()
    }

    /// Whether the frame source has closed and sampling ended.
    pub fn sampling_finished(&self) -> bool {
        self.sampler.as_ref().map_or(true, SamplerHandle::is_finished)
    }

    /// Stop sampling and preference following, waiting for both to end.
    pub async fn shutdown(mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.stop().await;
        }
        if let Some(follower) = self.follower.take() {
            follower.abort();
            let _ = follower.await;
        }
        tracing::debug!(target: "tiergov.governor", "runtime stopped");
    }
}

impl Drop for GovernorRuntime {
    fn drop(&mut self) {
        if let Some(follower) = &self.follower {
            follower.abort();
        }
    }
}
