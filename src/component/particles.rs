// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Drifting particle field

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::canvas::AsciiCanvas;
use super::{scaled_interval, AdaptiveComponent};
use crate::governor::PerformanceTier;

const WIDTH: usize = 64;
const HEIGHT: usize = 20;
const BASE_COUNT: usize = 60;
const BASE_FRAME: Duration = Duration::from_millis(16);
const GLYPHS: &[char] = &['.', '*', '+', 'o'];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Particle {
    x: f64,
    y: f64,
    /// Cells per second
    vx: f64,
    vy: f64,
    glyph: char,
}

/// Seeded particles drifting across the canvas; count and speed follow
/// the tier.
#[derive(Debug, Clone)]
pub struct ParticleField {
    seed: u64,
    origin: Vec<Particle>,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let origin: Vec<Particle> = (0..BASE_COUNT)
            .map(|_| Particle {
                x: rng.random::<f64>() * WIDTH as f64,
                y: rng.random::<f64>() * HEIGHT as f64,
                vx: rng.random_range(-1.0..1.0) * 4.0,
                vy: rng.random_range(1.0..4.0),
                glyph: GLYPHS[rng.random_range(0..GLYPHS.len())],
            })
            .collect();
        Self {
            seed,
            particles: origin.clone(),
            origin,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Particles currently simulated.
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// Particles kept at `tier`.
    pub fn count_for(tier: PerformanceTier) -> usize {
        (BASE_COUNT as f64 * tier.effect_scale()).round() as usize
    }

    fn draw(particles: &[Particle]) -> String {
        let mut canvas = AsciiCanvas::new(WIDTH, HEIGHT);
        for p in particles {
            canvas.plot(p.x.floor() as i64, p.y.floor() as i64, p.glyph);
        }
        canvas.render()
    }
}

fn wrap(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negatives
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

impl AdaptiveComponent for ParticleField {
    fn name(&self) -> &'static str {
        "particle-field"
    }

    fn frame_interval(&self, tier: PerformanceTier) -> Duration {
        scaled_interval(BASE_FRAME, tier)
    }

    fn render_static(&mut self) -> String {
        // A sparse still starfield
        let keep = Self::count_for(PerformanceTier::Reduced);
        let still: Vec<Particle> = self
            .origin
            .iter()
            .take(keep)
            .map(|p| Particle { glyph: '.', ..*p })
            .collect();
        Self::draw(&still)
    }

    fn tick(&mut self, tier: PerformanceTier, dt: Duration) -> String {
        let wanted = Self::count_for(tier);
        if self.particles.len() > wanted {
            self.particles.truncate(wanted);
        } else if self.particles.len() < wanted {
            let missing = self.origin[self.particles.len()..wanted].to_vec();
            self.particles.extend(missing);
        }

        let speed = 1.0 / tier.duration_scale().max(1.0);
        let secs = dt.as_secs_f64() * speed;
        let (w, h) = (WIDTH as f64, HEIGHT as f64);
        for p in &mut self.particles {
            p.x = wrap(p.x + p.vx * secs, w);
            p.y = wrap(p.y + p.vy * secs, h);
        }
        Self::draw(&self.particles)
    }

    fn reset(&mut self) {
        self.particles = self.origin.clone();
    }
}
