// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Character raster shared by the decorative components

/// Fixed-size grid of characters with an optional depth buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiCanvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
    depth: Vec<f64>,
}

impl AsciiCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; width * height],
            depth: vec![0.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
        self.depth.fill(0.0);
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Set a cell; out-of-range coordinates are ignored.
    pub fn plot(&mut self, x: i64, y: i64, ch: char) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = ch;
        }
    }

    /// Set a cell only if `inv_depth` (1/z) is nearer than what is there.
    pub fn plot_depth(&mut self, x: i64, y: i64, inv_depth: f64, ch: char) -> bool {
        match self.index(x, y) {
            Some(idx) if inv_depth > self.depth[idx] => {
                self.depth[idx] = inv_depth;
                self.cells[idx] = ch;
                true
            }
            _ => false,
        }
    }

    /// Write `text` left to right starting at (x, y), clipped.
    pub fn text(&mut self, x: i64, y: i64, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.plot(x + i as i64, y, ch);
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        self.index(x as i64, y as i64).map(|idx| self.cells[idx])
    }

    /// Cells that are not blank.
    pub fn inked(&self) -> usize {
        self.cells.iter().filter(|c| **c != ' ').count()
    }

    /// Rows joined by newlines, trailing spaces kept so frames align.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for (row, chunk) in self.cells.chunks(self.width.max(1)).enumerate() {
            if row > 0 {
                out.push('\n');
            }
            out.extend(chunk.iter());
        }
        out
    }
}
