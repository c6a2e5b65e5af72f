//! Raster surface - an opaque RGB pixel buffer with canvas-style blending

use std::path::Path;

use image::RgbImage;

use headroom_core::{HeadroomError, HeadroomResult};

use crate::Rgb;

/// Largest accepted surface side, in device pixels
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// How a source colour combines with the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Source-over: `dst = src·α + dst·(1 − α)`
    Replace,
    /// Additive ("lighter"): `dst = min(1, dst + src·α)`
    Lighter,
}

impl BlendMode {
    #[inline]
    pub fn apply(self, dst: Rgb, src: Rgb, alpha: f32) -> Rgb {
        match self {
            BlendMode::Replace => src.lerp(dst, 1.0 - alpha),
            BlendMode::Lighter => Rgb {
                r: (dst.r + src.r * alpha).min(1.0),
                g: (dst.g + src.g * alpha).min(1.0),
                b: (dst.b + src.b * alpha).min(1.0),
            },
        }
    }
}

/// Opaque RGB surface, row-major
#[derive(Debug, Clone, Default)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> HeadroomResult<Self> {
        check_size(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width as usize * height as usize],
        })
    }

    /// Reallocate to a new size; contents are cleared to black
    pub fn resize(&mut self, width: u32, height: u32) -> HeadroomResult<()> {
        check_size(width, height)?;
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, Rgb::BLACK);
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Mutable access to one row
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [Rgb]> {
        if y >= self.height {
            return None;
        }
        let start = (y * self.width) as usize;
        Some(&mut self.pixels[start..start + self.width as usize])
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgb, alpha: f32, mode: BlendMode) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y * self.width + x) as usize;
        self.pixels[idx] = mode.apply(self.pixels[idx], color, alpha);
    }

    /// Blend a rectangle given in fractional device pixels.
    ///
    /// Every pixel the rectangle touches is covered; a non-empty rectangle
    /// always touches at least one pixel. Parts outside the surface are
    /// clipped.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
        alpha: f32,
        mode: BlendMode,
    ) {
        if w <= 0.0 || h <= 0.0 || alpha <= 0.0 || self.is_empty() {
            return;
        }
        let (x0, x1) = span(x, w, self.width);
        let (y0, y1) = span(y, h, self.height);

        for py in y0..y1 {
            let start = (py * self.width) as usize;
            for px in &mut self.pixels[start + x0 as usize..start + x1 as usize] {
                *px = mode.apply(*px, color, alpha);
            }
        }
    }

    /// Quantize to an 8-bit RGB image
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let px = self.pixels[(y * self.width + x) as usize];
            image::Rgb(px.to_rgb8())
        })
    }

    /// Save to `path`; the encoding follows the file extension
    pub fn save(&self, path: impl AsRef<Path>) -> HeadroomResult<()> {
        self.to_image()
            .save(path)
            .map_err(|e| HeadroomError::Image(e.to_string()))
    }

    /// Mean luma over the whole surface
    pub fn mean_luma(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.pixels.iter().map(|px| px.luma() as f64).sum();
        (sum / self.pixels.len() as f64) as f32
    }
}

fn check_size(width: u32, height: u32) -> HeadroomResult<()> {
    if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
        return Err(HeadroomError::SurfaceTooLarge { width, height });
    }
    Ok(())
}

/// Integer pixel range touched by `[start, start + len)`, clipped to `[0, limit)`
fn span(start: f32, len: f32, limit: u32) -> (u32, u32) {
    let lo = start.floor();
    let hi = (start + len).ceil().max(lo + 1.0);
    let lo = lo.clamp(0.0, limit as f32) as u32;
    let hi = hi.clamp(0.0, limit as f32) as u32;
    (lo, hi.max(lo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_blend() {
        let out = BlendMode::Replace.apply(Rgb::BLACK, Rgb::WHITE, 0.25);
        assert!((out.r - 0.25).abs() < 1e-6);

        let out = BlendMode::Replace.apply(Rgb::BLACK, Rgb::WHITE, 1.0);
        assert_eq!(out, Rgb::WHITE);
    }

    #[test]
    fn test_lighter_blend_saturates() {
        let dst = Rgb::new(0.9, 0.5, 0.0);
        let out = BlendMode::Lighter.apply(dst, Rgb::WHITE, 0.5);
        assert_eq!(out.r, 1.0);
        assert!((out.g - 1.0).abs() < 1e-6);
        assert!((out.b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fill_rect_clips_and_covers() {
        let mut surface = RasterSurface::new(4, 4).unwrap();
        surface.fill_rect(-2.0, 3.4, 3.0, 0.2, Rgb::WHITE, 1.0, BlendMode::Replace);

        assert_eq!(surface.pixel(0, 3), Some(Rgb::WHITE));
        assert_eq!(surface.pixel(1, 3), Some(Rgb::BLACK));
        assert_eq!(surface.pixel(0, 2), Some(Rgb::BLACK));
    }

    #[test]
    fn test_fill_rect_outside_is_noop() {
        let mut surface = RasterSurface::new(4, 4).unwrap();
        surface.fill_rect(10.0, 10.0, 2.0, 2.0, Rgb::WHITE, 1.0, BlendMode::Lighter);
        assert_eq!(surface.mean_luma(), 0.0);
    }

    #[test]
    fn test_too_large() {
        let err = RasterSurface::new(MAX_SURFACE_DIMENSION + 1, 10).unwrap_err();
        assert!(matches!(err, HeadroomError::SurfaceTooLarge { .. }));

        let mut surface = RasterSurface::new(2, 2).unwrap();
        assert!(surface.resize(10, MAX_SURFACE_DIMENSION + 1).is_err());
        assert_eq!(surface.width(), 2);
    }

    #[test]
    fn test_empty_surface() {
        let mut surface = RasterSurface::new(0, 0).unwrap();
        surface.fill_rect(0.0, 0.0, 1.0, 1.0, Rgb::WHITE, 1.0, BlendMode::Replace);
        assert!(surface.is_empty());
        assert_eq!(surface.to_image().dimensions(), (0, 0));
    }

    #[test]
    fn test_image_export() {
        let mut surface = RasterSurface::new(3, 2).unwrap();
        surface.fill(Rgb::WHITE);
        surface.blend_pixel(2, 1, Rgb::new(1.0, 0.0, 0.0), 1.0, BlendMode::Replace);

        let img = surface.to_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0), &image::Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(2, 1), &image::Rgb([255, 0, 0]));
    }

    #[test]
    fn test_png_save() {
        let mut surface = RasterSurface::new(3, 2).unwrap();
        surface.blend_pixel(0, 0, Rgb::new(1.0, 0.0, 0.0), 1.0, BlendMode::Replace);

        let path = std::env::temp_dir().join(format!("headroom-surface-{}.png", std::process::id()));
        surface.save(&path).unwrap();
        let back = image::open(&path).unwrap().to_rgb8();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(back.get_pixel(0, 0), &image::Rgb([255, 0, 0]));
        assert_eq!(back.get_pixel(1, 0), &image::Rgb([0, 0, 0]));
    }

    #[test]
    fn test_save_unknown_extension() {
        let surface = RasterSurface::new(1, 1).unwrap();
        let path = std::env::temp_dir().join("headroom-surface.nope");
        assert!(matches!(surface.save(&path), Err(HeadroomError::Image(_))));
    }
}
