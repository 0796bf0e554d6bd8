// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CPU-rasterized spinning torus

use std::time::Duration;

use super::canvas::AsciiCanvas;
use super::{scaled_interval, AdaptiveComponent};
use crate::governor::PerformanceTier;

const WIDTH: usize = 60;
const HEIGHT: usize = 30;
const FRAME_COUNT: usize = 60;
const TARGET_FPS: u64 = 15;
const LUMINANCE: &[char] = &['.', ',', '-', '~', ':', ';', '=', '!', '*', '#', '$', '@'];

/// Render one torus frame rotated by `a` around X and `b` around Z.
pub fn donut_frame(a: f64, b: f64, width: usize, height: usize) -> String {
    let mut canvas = AsciiCanvas::new(width, height);
    let (sin_a, cos_a) = a.sin_cos();
    let (sin_b, cos_b) = b.sin_cos();

    let mut theta = 0.0_f64;
    while theta < std::f64::consts::TAU {
        let (sin_t, cos_t) = theta.sin_cos();
        let mut phi = 0.0_f64;
        while phi < std::f64::consts::TAU {
            let (sin_p, cos_p) = phi.sin_cos();

            let x = cos_t * (cos_b * cos_p + sin_a * sin_b * sin_p) - sin_t * cos_a * sin_b;
            let y = cos_t * (sin_b * cos_p - sin_a * cos_b * sin_p) + sin_t * cos_a * cos_b;
            let z = cos_a * cos_t * sin_p + sin_t * sin_a + 4.0;
            let ooz = 1.0 / z;

            let xp = (width as f64 / 2.0 + 20.0 * ooz * x).floor() as i64;
            let yp = (height as f64 / 2.0 + 10.0 * ooz * y).floor() as i64;

            let luminance = cos_p * cos_t * sin_b - cos_a * cos_t * sin_p - sin_a * sin_t
                + cos_b * (cos_a * sin_t - cos_t * sin_a * sin_p);
            let idx = ((luminance * 8.0).floor() as i64 + 5).clamp(0, LUMINANCE.len() as i64 - 1);
            canvas.plot_depth(xp, yp, ooz, LUMINANCE[idx as usize]);

            phi += 0.02;
        }
        theta += 0.07;
    }

    canvas.render()
}

/// Solid ring drawn when animation is off.
fn static_ring(width: usize, height: usize) -> String {
    let mut canvas = AsciiCanvas::new(width, height);
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    for y in 0..height {
        for x in 0..width {
            let dx = (x as f64 + 0.5 - cx) / cx;
            let dy = (y as f64 + 0.5 - cy) / cy;
            let d = (dx * dx + dy * dy).sqrt();
            if (0.45..=1.0).contains(&d) {
                canvas.plot(x as i64, y as i64, '@');
            }
        }
    }
    canvas.render()
}

/// The spinning ASCII donut. Frames are computed once up front.
#[derive(Debug, Clone)]
pub struct AsciiDonut {
    frames: Vec<String>,
    fallback: String,
    current: usize,
}

impl AsciiDonut {
    pub fn new() -> Self {
        let frames = (0..FRAME_COUNT)
            .map(|frame| donut_frame(frame as f64 * 0.1, frame as f64 * 0.07, WIDTH, HEIGHT))
            .collect();
        Self {
            frames,
            fallback: static_ring(WIDTH, HEIGHT),
            current: 0,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> usize {
        self.current
    }
}

impl Default for AsciiDonut {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveComponent for AsciiDonut {
    fn name(&self) -> &'static str {
        "ascii-donut"
    }

    fn frame_interval(&self, tier: PerformanceTier) -> Duration {
        scaled_interval(Duration::from_millis(1000 / TARGET_FPS), tier)
    }

    fn render_static(&mut self) -> String {
        self.fallback.clone()
    }

    fn tick(&mut self, _tier: PerformanceTier, dt: Duration) -> String {
        if !dt.is_zero() {
            self.current = (self.current + 1) % self.frames.len().max(1);
        }
        self.frames.get(self.current).cloned().unwrap_or_default()
    }

    fn reset(&mut self) {
        self.current = 0;
    }
}
