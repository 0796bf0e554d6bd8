// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Offscreen CPU raster used by the synthetic benchmark

use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::ProbeError;

/// Packed 0xAARRGGBB pixel buffer.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl RasterCanvas {
    /// Allocate a transparent canvas. Oversized canvases fail instead of
    /// aborting the process.
    pub fn new(width: u32, height: u32) -> Result<Self, ProbeError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| {
                ProbeError::AllocationFailed(format!("{}x{} canvas overflows", width, height))
            })?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|e| {
            ProbeError::AllocationFailed(format!("{}x{} canvas: {}", width, height, e))
        })?;
        pixels.resize(len, 0);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y as usize) * (self.width as usize) + x as usize)
            .copied()
    }

    /// Fill an axis-aligned rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: u32) {
        let x0 = x.max(0.0).floor() as u32;
        let y0 = y.max(0.0).floor() as u32;
        let x1 = ((x + w).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((y + h).ceil().max(0.0) as u32).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let stride = self.width as usize;
        for row in y0..y1 {
            let start = row as usize * stride + x0 as usize;
            let end = row as usize * stride + x1 as usize;
            self.pixels[start..end].fill(color);
        }
    }

    /// Count of pixels that are no longer transparent black.
    pub fn painted(&self) -> usize {
        self.pixels.iter().filter(|p| **p != 0).count()
    }
}

/// Convert HSL (degrees, 0-1, 0-1) into an opaque packed pixel.
pub fn hsl_to_argb(hue: f32, saturation: f32, lightness: f32) -> u32 {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = (hue.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let to_byte = |v: f32| (((v + m) * 255.0).round().clamp(0.0, 255.0)) as u32;
    0xFF00_0000 | (to_byte(r) << 16) | (to_byte(g) << 8) | to_byte(b)
}

/// Scatter `rects` random rectangles (up to 20px) over a square canvas and
/// return the elapsed wall-clock time.
pub fn run_benchmark<R: Rng>(
    rng: &mut R,
    rects: u32,
    canvas_px: u32,
) -> Result<(Duration, RasterCanvas), ProbeError> {
    let mut canvas = RasterCanvas::new(canvas_px, canvas_px)?;
    let side = canvas_px as f32;
    let start = Instant::now();
    for i in 0..rects {
        let color = hsl_to_argb((i % 360) as f32, 0.7, 0.5);
        let x = rng.random::<f32>() * side;
        let y = rng.random::<f32>() * side;
        let w = rng.random::<f32>() * 20.0;
        let h = rng.random::<f32>() * 20.0;
        canvas.fill_rect(x, y, w, h, color);
    }
    Ok((start.elapsed(), canvas))
}
