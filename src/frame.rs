// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Animation-frame scheduling
//!
//! A [`FrameSource`] hands out one timestamp per frame, in milliseconds on
//! a monotonic clock. Live hosts use [`IntervalFrames`]; simulations and
//! tests script the timestamps with [`ScriptedFrames`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Source of animation-frame callbacks.
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next frame. `None` once the source is closed.
    async fn next_frame(&mut self) -> Option<f64>;
}

/// Frames paced by a tokio interval.
#[derive(Debug)]
pub struct IntervalFrames {
    interval: Interval,
    origin: Instant,
}

impl IntervalFrames {
    /// Pace frames at `fps` (at least 1). Late ticks are skipped, not
    /// bunched, so a slow consumer sees a lower frame rate.
    pub fn new(fps: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            origin: Instant::now(),
        }
    }
}

#[async_trait]
impl FrameSource for IntervalFrames {
    async fn next_frame(&mut self) -> Option<f64> {
        let tick = self.interval.tick().await;
        Some(tick.duration_since(self.origin).as_secs_f64() * 1000.0)
    }
}

/// Frames whose timestamps are pushed in from elsewhere.
#[derive(Debug)]
pub struct ScriptedFrames {
    rx: mpsc::UnboundedReceiver<f64>,
}

/// Feeding end of a [`ScriptedFrames`]. Dropping it closes the source.
#[derive(Debug, Clone)]
pub struct FrameFeeder {
    tx: mpsc::UnboundedSender<f64>,
}

impl ScriptedFrames {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (FrameFeeder, ScriptedFrames) {
        let (tx, rx) = mpsc::unbounded_channel();
        (FrameFeeder { tx }, ScriptedFrames { rx })
    }

    /// A source that yields `timestamps` and then closes.
    pub fn from_timestamps(timestamps: impl IntoIterator<Item = f64>) -> Self {
        let (feeder, frames) = Self::new();
        for ts in timestamps {
            feeder.push(ts);
        }
        frames
    }
}

impl FrameFeeder {
    /// Queue one frame. Returns `false` if the source is gone.
    pub fn push(&self, timestamp_ms: f64) -> bool {
        self.tx.send(timestamp_ms).is_ok()
    }
}

#[async_trait]
impl FrameSource for ScriptedFrames {
    async fn next_frame(&mut self) -> Option<f64> {
        self.rx.recv().await
    }
}

/// `count` evenly spaced timestamps at `fps`, starting at `start_ms`.
pub fn frames_for_fps(fps: f64, count: usize, start_ms: f64) -> Vec<f64> {
    if !(fps > 0.0) {
        return Vec::new();
    }
    let period = 1000.0 / fps;
    (0..count).map(|i| start_ms + i as f64 * period).collect()
}

/// Timestamps that produce one sampling window per entry of `fps`, each
/// `window_frames` long, preceded by the frame that opens the first window.
pub fn frames_for_windows(fps: &[f64], window_frames: u32, start_ms: f64) -> Vec<f64> {
    let mut timestamps = vec![start_ms];
    let mut now = start_ms;
    for &rate in fps.iter().filter(|r| **r > 0.0) {
        let period = 1000.0 / rate;
        for _ in 0..window_frames {
            now += period;
            timestamps.push(now);
        }
    }
    timestamps
}
