//! Slat tile - one period of the light-slat pattern
//!
//! The pattern is a bright bar followed by a gap, repeated vertically and
//! uniform horizontally, so the tile stores one coverage value per row.

use crate::Rgb;

#[derive(Debug, Clone)]
pub struct SlatTile {
    /// Tile width in device pixels (the pattern is horizontally uniform)
    pub width: u32,
    /// Bar height in device pixels
    pub slat_height: f32,
    /// Gap below each bar in device pixels
    pub slat_gap: f32,
    /// Bar colour
    pub color: Rgb,
    /// Bar coverage per tile row [0.0 - 1.0]
    rows: Vec<f32>,
}

impl SlatTile {
    /// Build the tile for the current hue drift and pixel ratio
    pub fn build(hue_base: f32, dpr: f32) -> Self {
        let slat_height = (8.0 * dpr).max(4.0);
        let slat_gap = slat_height * 2.5;
        let width = (512.0 * dpr).max(256.0) as u32;
        let rows = ((slat_height + slat_gap).floor() as usize).max(1);

        let hue = (200.0 + 100.0 * (hue_base * 0.24).sin()).rem_euclid(360.0);
        let color = Rgb::from_hsl(hue, 0.95, 0.65);

        let coverage = (0..rows)
            .map(|row| (slat_height - row as f32).clamp(0.0, 1.0))
            .collect();

        Self {
            width,
            slat_height,
            slat_gap,
            color,
            rows: coverage,
        }
    }

    /// Tile height in rows
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Scroll period (bar plus gap)
    pub fn period(&self) -> f32 {
        self.slat_height + self.slat_gap
    }

    /// Bar coverage at pattern coordinate `y`, repeating every tile height
    #[inline]
    pub fn sample(&self, y: f32) -> f32 {
        let len = self.rows.len();
        let row = (y.floor() as i64).rem_euclid(len as i64) as usize;
        self.rows[row]
    }
}
