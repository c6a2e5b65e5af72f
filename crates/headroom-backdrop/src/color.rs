//! Colour primitives

/// Linear RGB colour, each channel in [0.0 - 1.0]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Colour from hue (degrees, any range), saturation and lightness [0.0 - 1.0]
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        Self::new(r + m, g + m, b + m)
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Mean of the three channels
    pub fn luma(self) -> f32 {
        (self.r + self.g + self.b) / 3.0
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        [to_u8(self.r), to_u8(self.g), to_u8(self.b)]
    }
}

#[inline]
fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
    }

    #[test]
    fn test_hsl_primaries() {
        assert!(close(Rgb::from_hsl(0.0, 1.0, 0.5), Rgb::new(1.0, 0.0, 0.0)));
        assert!(close(Rgb::from_hsl(120.0, 1.0, 0.5), Rgb::new(0.0, 1.0, 0.0)));
        assert!(close(Rgb::from_hsl(240.0, 1.0, 0.5), Rgb::new(0.0, 0.0, 1.0)));
        assert!(close(Rgb::from_hsl(0.0, 0.0, 1.0), Rgb::WHITE));
    }

    #[test]
    fn test_hue_wraps() {
        assert!(close(Rgb::from_hsl(420.0, 0.8, 0.4), Rgb::from_hsl(60.0, 0.8, 0.4)));
        assert!(close(Rgb::from_hsl(-60.0, 0.8, 0.4), Rgb::from_hsl(300.0, 0.8, 0.4)));
    }

    #[test]
    fn test_to_rgb8_clamps() {
        assert_eq!(Rgb::new(2.0, -1.0, 0.5).to_rgb8(), [255, 0, 128]);
    }
}
