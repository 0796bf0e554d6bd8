// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Frame-rate sampling
//!
//! [`FrameRateSampler`] is the pure counting core: feed it frame
//! timestamps and every `window_frames` frames it yields the window's
//! average FPS. [`start_sampling`] runs it on a background task against a
//! [`FrameSource`], pausing while the host is hidden.

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::SamplerConfig;
use crate::frame::FrameSource;

/// Host visibility, as in a browser tab being shown or backgrounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Counters for the window currently being measured.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LiveFrameStats {
    /// Frames counted since the window opened
    pub frame_count: u32,
    /// Timestamp that opened the window; `None` until the first frame
    pub window_start_ms: Option<f64>,
    /// Timestamp of the latest frame
    pub last_frame_ms: Option<f64>,
    /// Most recent emitted sample (smoothed, if smoothing is on)
    pub rolling_fps: Option<f64>,
    /// Windows completed
    pub windows: u64,
    /// Windows thrown away because of a stall
    pub stalls: u64,
    /// Stalls since the last completed window
    pub consecutive_stalls: u32,
}

/// Windowed FPS counter.
#[derive(Debug, Clone)]
pub struct FrameRateSampler {
    window_frames: u32,
    stall_gap_ms: f64,
    sustained_stalls: u32,
    smoothing: Option<f64>,
    paused: bool,
    stats: LiveFrameStats,
}

impl FrameRateSampler {
    pub fn new(config: &SamplerConfig) -> Self {
        Self {
            window_frames: config.window_frames.max(1),
            stall_gap_ms: config.stall_gap_ms,
            sustained_stalls: config.sustained_stalls,
            smoothing: config.smoothing,
            paused: false,
            stats: LiveFrameStats::default(),
        }
    }

    pub fn stats(&self) -> &LiveFrameStats {
        &self.stats
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Count one frame. Returns a sample when this frame closes a window.
    pub fn record_frame(&mut self, now_ms: f64) -> Option<f64> {
        if self.paused || !now_ms.is_finite() {
            return None;
        }

        let Some(start) = self.stats.window_start_ms else {
            self.open_window(now_ms);
            return None;
        };

        if let Some(last) = self.stats.last_frame_ms {
            let gap = now_ms - last;
            if gap > self.stall_gap_ms || gap < 0.0 {
                self.stats.stalls += 1;
                tracing::debug!(
                    target: "tiergov.sampler",
                    gap_ms = gap,
                    frames = self.stats.frame_count,
                    "frame stall, window dropped"
                );
                self.open_window(now_ms);
                return self.note_stall(gap);
            }
        }

        self.stats.frame_count += 1;
        self.stats.last_frame_ms = Some(now_ms);

        if self.stats.frame_count < self.window_frames {
            return None;
        }

        let elapsed = now_ms - start;
        let frames = self.stats.frame_count;
        self.open_window(now_ms);
        if elapsed <= 0.0 {
            return None;
        }

        let fps = 1000.0 * f64::from(frames) / elapsed;
        let sample = match (self.smoothing, self.stats.rolling_fps) {
            (Some(alpha), Some(previous)) => alpha * fps + (1.0 - alpha) * previous,
            _ => fps,
        };
        self.stats.rolling_fps = Some(sample);
        self.stats.windows += 1;
        self.stats.consecutive_stalls = 0;

        tracing::trace!(target: "tiergov.sampler", fps, sample, "window sampled");
        Some(sample)
    }

    /// A visible host that keeps stalling is rendering below one frame per
    /// stall gap; after `sustained_stalls` in a row report that rate
    /// unsmoothed. A clock that went backwards says nothing about speed.
    fn note_stall(&mut self, gap: f64) -> Option<f64> {
        if gap < 0.0 {
            return None;
        }
        self.stats.consecutive_stalls += 1;
        if self.sustained_stalls == 0 || self.stats.consecutive_stalls < self.sustained_stalls {
            return None;
        }
        self.stats.consecutive_stalls = 0;
        let fps = 1000.0 / gap;
        self.stats.rolling_fps = Some(fps);
        tracing::debug!(target: "tiergov.sampler", fps, "sustained stall reported");
        Some(fps)
    }

    /// Stop counting; the partial window is discarded.
    pub fn pause(&mut self) {
        self.paused = true;
        self.stats.consecutive_stalls = 0;
        self.stats.frame_count = 0;
        self.stats.window_start_ms = None;
        self.stats.last_frame_ms = None;
    }

    /// Resume counting; the next frame opens a fresh window.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    fn open_window(&mut self, now_ms: f64) {
        self.stats.frame_count = 0;
        self.stats.window_start_ms = Some(now_ms);
        self.stats.last_frame_ms = Some(now_ms);
    }
}

/// Running sampling loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct SamplerHandle {
    handle: Option<JoinHandle<()>>,
}

impl SamplerHandle {
    /// Cancel the loop and wait until it has fully stopped.
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }

    /// Whether the loop has ended (source closed or cancelled).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Run a sampler over `source` on a background task, calling `on_sample`
/// with every window's FPS.
///
/// While `visibility` reads [`Visibility::Hidden`] no frames are pulled and
/// the partial window is dropped, so a backgrounded host never reports a
/// near-zero frame rate. Must be called from within a tokio runtime.
pub fn start_sampling<S, F>(
    mut source: S,
    config: &SamplerConfig,
    visibility: Option<watch::Receiver<Visibility>>,
    mut on_sample: F,
) -> SamplerHandle
where
    S: FrameSource + 'static,
    F: FnMut(f64) + Send + 'static,
{
    let mut sampler = FrameRateSampler::new(config);

    let handle = tokio::spawn(async move {
        let (_always_visible, fallback) = watch::channel(Visibility::Visible);
        let mut visibility = visibility.unwrap_or(fallback);
        let mut visibility_open = true;

        tracing::debug!(target: "tiergov.sampler", "sampling started");
        loop {
            let hidden = *visibility.borrow_and_update() == Visibility::Hidden;
            if hidden {
                if !sampler.is_paused() {
                    tracing::debug!(target: "tiergov.sampler", "host hidden, sampling paused");
                    sampler.pause();
                }
                if !visibility_open || visibility.changed().await.is_err() {
                    // Nobody can ever make us visible again
                    break;
                }
                continue;
            }
            if sampler.is_paused() {
                tracing::debug!(target: "tiergov.sampler", "host visible, sampling resumed");
                sampler.resume();
            }

            tokio::select! {
                frame = source.next_frame() => {
                    match frame {
                        Some(now_ms) => {
                            if let Some(fps) = sampler.record_frame(now_ms) {
                                on_sample(fps);
                            }
                        }
                        None => break,
                    }
                }
                changed = visibility.changed(), if visibility_open => {
                    if changed.is_err() {
                        visibility_open = false;
                    }
                }
            }
        }
        tracing::debug!(target: "tiergov.sampler", "sampling stopped");
    });

    SamplerHandle {
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{frames_for_fps, frames_for_windows, ScriptedFrames};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn config() -> SamplerConfig {
        SamplerConfig::default()
    }

    fn feed(sampler: &mut FrameRateSampler, frames: &[f64]) -> Vec<f64> {
        frames
            .iter()
            .filter_map(|ts| sampler.record_frame(*ts))
            .collect()
    }

    #[test]
    fn test_emits_once_per_window() {
        let mut sampler = FrameRateSampler::new(&config());
        let samples = feed(&mut sampler, &frames_for_windows(&[60.0, 20.0], 30, 0.0));
        assert_eq!(samples.len(), 2);
        assert!((samples[0] - 60.0).abs() < 1e-6);
        assert!((samples[1] - 20.0).abs() < 1e-6);
        assert_eq!(sampler.stats().windows, 2);
        assert_eq!(sampler.stats().frame_count, 0);
    }

    #[test]
    fn test_partial_window_emits_nothing() {
        let mut sampler = FrameRateSampler::new(&config());
        let frames: Vec<f64> = (0..30).map(|i| i as f64 * 16.0).collect();
        assert!(feed(&mut sampler, &frames).is_empty());
        assert_eq!(sampler.stats().frame_count, 29);
    }

    #[test]
    fn test_stall_drops_window() {
        let mut sampler = FrameRateSampler::new(&config());
        let mut frames: Vec<f64> = (0..10).map(|i| i as f64 * 16.0).collect();
        // Tab backgrounded for five seconds
        frames.extend((0..=30).map(|i| 5_000.0 + i as f64 * 16.0));
        let samples = feed(&mut sampler, &frames);
        assert_eq!(sampler.stats().stalls, 1);
        assert_eq!(samples.len(), 1);
        assert!(samples[0] > 60.0);
    }

    #[test]
    fn test_sustained_stalls_report_stall_rate() {
        let mut sampler = FrameRateSampler::new(&config());
        // Visible host rendering one frame every two seconds
        let samples = feed(&mut sampler, &[0.0, 2_000.0, 4_000.0, 6_000.0]);
        assert_eq!(samples.len(), 1);
        assert!((samples[0] - 0.5).abs() < 1e-9);
        assert_eq!(sampler.stats().stalls, 3);
        assert_eq!(sampler.stats().consecutive_stalls, 0);
    }

    #[test]
    fn test_window_between_stalls_resets_run() {
        let mut sampler = FrameRateSampler::new(&config());
        let mut frames = vec![0.0, 2_000.0, 4_000.0];
        frames.extend(frames_for_windows(&[60.0], 30, 4_000.0).into_iter().skip(1));
        let last = *frames.last().unwrap();
        frames.push(last + 2_000.0);
        let samples = feed(&mut sampler, &frames);
        assert_eq!(samples.len(), 1);
        assert!((samples[0] - 60.0).abs() < 1e-6);
        assert_eq!(sampler.stats().consecutive_stalls, 1);
    }

    #[test]
    fn test_sustained_stall_reporting_can_be_disabled() {
        let config = SamplerConfig {
            sustained_stalls: 0,
            ..SamplerConfig::default()
        };
        let mut sampler = FrameRateSampler::new(&config);
        let frames: Vec<f64> = (0..10).map(|i| i as f64 * 2_000.0).collect();
        assert!(feed(&mut sampler, &frames).is_empty());
        assert_eq!(sampler.stats().stalls, 9);
    }

    #[test]
    fn test_backwards_clock_never_counts_toward_sustained_stall() {
        let mut sampler = FrameRateSampler::new(&config());
        let samples = feed(&mut sampler, &[10_000.0, 8_000.0, 6_000.0, 4_000.0, 2_000.0]);
        assert!(samples.is_empty());
        assert_eq!(sampler.stats().consecutive_stalls, 0);
    }

    #[test]
    fn test_pause_discards_partial_window() {
        let mut sampler = FrameRateSampler::new(&config());
        feed(&mut sampler, &[0.0, 16.0, 32.0]);
        sampler.pause();
        assert_eq!(sampler.record_frame(48.0), None);
        assert_eq!(sampler.stats().window_start_ms, None);

        sampler.resume();
        let samples = feed(&mut sampler, &frames_for_windows(&[40.0], 30, 900.0));
        assert_eq!(samples.len(), 1);
        assert!((samples[0] - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_blends_windows() {
        let config = SamplerConfig {
            smoothing: Some(0.5),
            ..SamplerConfig::default()
        };
        let mut sampler = FrameRateSampler::new(&config);
        let samples = feed(&mut sampler, &frames_for_windows(&[60.0, 20.0], 30, 0.0));
        assert!((samples[0] - 60.0).abs() < 1e-6);
        assert!((samples[1] - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_backwards_clock_resets() {
        let mut sampler = FrameRateSampler::new(&config());
        feed(&mut sampler, &[100.0, 116.0]);
        assert_eq!(sampler.record_frame(50.0), None);
        assert_eq!(sampler.stats().window_start_ms, Some(50.0));
    }

    #[tokio::test]
    async fn test_start_sampling_reports_windows() {
        let frames = ScriptedFrames::from_timestamps(frames_for_windows(&[22.0, 55.0], 30, 0.0));
        let samples = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&samples);
        let handle = start_sampling(frames, &config(), None, move |fps| {
            sink.lock().unwrap().push(fps);
        });

        for _ in 0..100 {
            if handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(handle.is_finished());
        let samples = samples.lock().unwrap();
        assert_eq!(samples.len(), 2);
        assert!((samples[0] - 22.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_stop_cancels_loop() {
        let (feeder, frames) = ScriptedFrames::new();
        let handle = start_sampling(frames, &config(), None, |_| {});
        feeder.push(0.0);
        handle.stop().await;
        assert!(!feeder.push(16.0));
    }

    #[tokio::test]
    async fn test_hidden_host_is_not_sampled() {
        let (feeder, frames) = ScriptedFrames::new();
        let (vis_tx, vis_rx) = watch::channel(Visibility::Hidden);
        let samples = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&samples);
        let _handle = start_sampling(frames, &config(), Some(vis_rx), move |fps| {
            sink.lock().unwrap().push(fps);
        });

        // A partial window queued while hidden must not leak into a sample
        for ts in frames_for_fps(5.0, 10, 0.0) {
            feeder.push(ts);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(samples.lock().unwrap().is_empty());

        vis_tx.send(Visibility::Visible).unwrap();
        for ts in frames_for_windows(&[60.0], 30, 60_000.0) {
            feeder.push(ts);
        }
        for _ in 0..100 {
            if !samples.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let samples = samples.lock().unwrap();
        assert_eq!(samples.len(), 1);
        assert!((samples[0] - 60.0).abs() < 1e-6);
    }
}
