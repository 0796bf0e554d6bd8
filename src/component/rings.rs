// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Concentric rotating rings of tech nodes

use std::f64::consts::TAU;
use std::time::Duration;

use super::canvas::AsciiCanvas;
use super::{scaled_interval, AdaptiveComponent};
use crate::governor::PerformanceTier;

const WIDTH: usize = 72;
const HEIGHT: usize = 36;
const BASE_FRAME: Duration = Duration::from_millis(33);
/// Terminal cells are about twice as tall as wide
const ASPECT: f64 = 0.5;

#[derive(Debug, Clone)]
struct Ring {
    /// Radius in page pixels; the outer ring fills the canvas
    radius: f64,
    /// Seconds per revolution; negative turns counter-clockwise
    period_secs: f64,
    labels: Vec<&'static str>,
    angle: f64,
}

/// Tech-stack nodes on three counter-rotating rings.
#[derive(Debug, Clone)]
pub struct TechRings {
    rings: Vec<Ring>,
}

impl TechRings {
    pub fn new() -> Self {
        let ring = |radius, period_secs, labels: &[&'static str]| Ring {
            radius,
            period_secs,
            labels: labels.to_vec(),
            angle: 0.0,
        };
        Self {
            rings: vec![
                ring(
                    340.0,
                    30.0,
                    &["Rust", "Go", "Python", "TS", "SQL", "Linux", "K8s", "AWS"],
                ),
                ring(200.0, 25.0, &["React", "Node", "Tokio", "gRPC", "Redis"]),
                ring(140.0, -18.0, &["ML", "GPU", "LLM"]),
            ],
        }
    }

    /// Rotation of each ring in radians, outermost first.
    pub fn angles(&self) -> Vec<f64> {
        self.rings.iter().map(|r| r.angle).collect()
    }

    /// Canvas positions of every node, outermost ring first.
    pub fn node_positions(&self) -> Vec<(i64, i64)> {
        let max_radius = self
            .rings
            .iter()
            .map(|r| r.radius)
            .fold(1.0_f64, f64::max);
        let scale = (WIDTH as f64 / 2.0 - 4.0) / max_radius;
        let (cx, cy) = (WIDTH as f64 / 2.0, HEIGHT as f64 / 2.0);

        let mut positions = Vec::new();
        for ring in &self.rings {
            let count = ring.labels.len().max(1);
            for i in 0..count {
                let theta = ring.angle + TAU * i as f64 / count as f64;
                let x = cx + theta.cos() * ring.radius * scale;
                let y = cy + theta.sin() * ring.radius * scale * ASPECT;
                positions.push((x.round() as i64, y.round() as i64));
            }
        }
        positions
    }

    fn draw(&self) -> String {
        let mut canvas = AsciiCanvas::new(WIDTH, HEIGHT);
        canvas.plot(WIDTH as i64 / 2, HEIGHT as i64 / 2, '@');

        let positions = self.node_positions();
        let labels = self.rings.iter().flat_map(|r| r.labels.iter());
        for ((x, y), label) in positions.into_iter().zip(labels) {
            canvas.plot(x, y, 'o');
            canvas.text(x + 1, y, label);
        }
        canvas.render()
    }
}

impl Default for TechRings {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveComponent for TechRings {
    fn name(&self) -> &'static str {
        "tech-rings"
    }

    fn frame_interval(&self, tier: PerformanceTier) -> Duration {
        scaled_interval(BASE_FRAME, tier)
    }

    fn render_static(&mut self) -> String {
        self.draw()
    }

    fn tick(&mut self, tier: PerformanceTier, dt: Duration) -> String {
        let slowdown = tier.duration_scale().max(1.0);
        for ring in &mut self.rings {
            let period = ring.period_secs * slowdown;
            ring.angle = (ring.angle + TAU * dt.as_secs_f64() / period).rem_euclid(TAU);
        }
        self.draw()
    }

    fn reset(&mut self) {
        for ring in &mut self.rings {
            ring.angle = 0.0;
        }
    }
}
