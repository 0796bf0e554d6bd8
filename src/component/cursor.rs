// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Spring-follower cursor

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::canvas::AsciiCanvas;
use super::{scaled_interval, AdaptiveComponent};
use crate::governor::PerformanceTier;

const WIDTH: usize = 48;
const HEIGHT: usize = 16;
const BASE_FRAME: Duration = Duration::from_millis(16);
/// Fraction of the remaining distance closed per 60Hz frame is 1/FOLLOW
const FOLLOW: f64 = 8.0;
const MAX_TRAIL: usize = 6;

/// Feeds pointer positions (in canvas cells) to a [`CursorTrail`].
#[derive(Debug, Clone)]
pub struct PointerHandle {
    tx: Arc<watch::Sender<(f64, f64)>>,
}

impl PointerHandle {
    pub fn move_to(&self, x: f64, y: f64) {
        self.tx.send_replace((x, y));
    }

    pub fn position(&self) -> (f64, f64) {
        *self.tx.borrow()
    }
}

/// An inner dot pinned to the pointer and an outer ring that eases after it.
#[derive(Debug)]
pub struct CursorTrail {
    pointer: watch::Receiver<(f64, f64)>,
    outer: (f64, f64),
    trail: VecDeque<(f64, f64)>,
}

impl CursorTrail {
    /// A cursor and the handle that moves it.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (CursorTrail, PointerHandle) {
        let start = (WIDTH as f64 / 2.0, HEIGHT as f64 / 2.0);
        let (tx, rx) = watch::channel(start);
        (
            CursorTrail {
                pointer: rx,
                outer: start,
                trail: VecDeque::new(),
            },
            PointerHandle { tx: Arc::new(tx) },
        )
    }

    pub fn outer(&self) -> (f64, f64) {
        self.outer
    }

    fn target(&self) -> (f64, f64) {
        *self.pointer.borrow()
    }
}

impl AdaptiveComponent for CursorTrail {
    fn name(&self) -> &'static str {
        "cursor-trail"
    }

    fn frame_interval(&self, tier: PerformanceTier) -> Duration {
        scaled_interval(BASE_FRAME, tier)
    }

    fn render_static(&mut self) -> String {
        // Native cursor only; nothing decorative is drawn
        AsciiCanvas::new(WIDTH, HEIGHT).render()
    }

    fn tick(&mut self, tier: PerformanceTier, dt: Duration) -> String {
        let target = self.target();
        let divisor = FOLLOW * tier.duration_scale().max(1.0);
        let frames = dt.as_secs_f64() / BASE_FRAME.as_secs_f64();
        let keep = (1.0 - 1.0 / divisor).powf(frames);
        self.outer = (
            target.0 + (self.outer.0 - target.0) * keep,
            target.1 + (self.outer.1 - target.1) * keep,
        );

        let trail_len = (MAX_TRAIL as f64 * tier.effect_scale()).round() as usize;
        self.trail.push_front(self.outer);
        self.trail.truncate(trail_len.max(1));

        let mut canvas = AsciiCanvas::new(WIDTH, HEIGHT);
        for (x, y) in self.trail.iter().skip(1) {
            canvas.plot(x.round() as i64, y.round() as i64, '.');
        }
        canvas.plot(self.outer.0.round() as i64, self.outer.1.round() as i64, 'O');
        canvas.plot(target.0.round() as i64, target.1.round() as i64, '+');
        canvas.render()
    }

    fn reset(&mut self) {
        self.outer = self.target();
        self.trail.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_eases_toward_pointer() {
        let (mut cursor, pointer) = CursorTrail::new();
        pointer.move_to(40.0, 8.0);
        let start = cursor.outer();
        cursor.tick(PerformanceTier::Full, BASE_FRAME);
        let after = cursor.outer();
        // One 60Hz frame closes an eighth of the gap
        let expected = start.0 + (40.0 - start.0) / 8.0;
        assert!((after.0 - expected).abs() < 1e-9);

        for _ in 0..200 {
            cursor.tick(PerformanceTier::Full, BASE_FRAME);
        }
        assert!((cursor.outer().0 - 40.0).abs() < 0.01);
    }

    #[test]
    fn test_reduced_follows_slower() {
        let (mut full, p1) = CursorTrail::new();
        let (mut reduced, p2) = CursorTrail::new();
        p1.move_to(0.0, 0.0);
        p2.move_to(0.0, 0.0);
        full.tick(PerformanceTier::Full, BASE_FRAME);
        reduced.tick(PerformanceTier::Reduced, BASE_FRAME);
        assert!(reduced.outer().0 > full.outer().0);
    }

    #[test]
    fn test_frame_draws_both_cursors() {
        let (mut cursor, pointer) = CursorTrail::new();
        pointer.move_to(5.0, 5.0);
        let frame = cursor.tick(PerformanceTier::Full, BASE_FRAME);
        assert!(frame.contains('+'));
        assert!(frame.contains('O'));
    }

    #[test]
    fn test_static_draws_nothing() {
        let (mut cursor, _pointer) = CursorTrail::new();
        assert!(cursor.render_static().chars().all(|c| c == ' ' || c == '\n'));
    }

    #[test]
    fn test_reset_snaps_to_pointer() {
        let (mut cursor, pointer) = CursorTrail::new();
        pointer.move_to(3.0, 4.0);
        cursor.reset();
        assert_eq!(cursor.outer(), (3.0, 4.0));
    }
}
