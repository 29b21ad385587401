//! RGB color parsing and channel math.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::errors::EngineError;

/// An opaque RGB color. Alpha lives on the paint, not the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` string.
    ///
    /// Validation is strict: anything other than `#` followed by exactly six
    /// hex digits is rejected, so a malformed color fails at the brush spec
    /// boundary instead of mis-parsing deep inside a pixel loop.
    pub fn parse(hex: &str) -> Result<Self, EngineError> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| EngineError::InvalidColorFormat(hex.to_string()))?;

        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(EngineError::InvalidColorFormat(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| -> u8 {
            // Digits are validated above, so this cannot fail.
            u8::from_str_radix(&digits[range], 16).unwrap_or(0)
        };

        Ok(Self {
            r: channel(0..2),
            g: channel(2..4),
            b: channel(4..6),
        })
    }

    /// Perturb each channel by independent uniform noise in
    /// `[-magnitude, +magnitude]`, clamped to the valid range.
    pub fn jitter<R: Rng>(self, rng: &mut R, magnitude: f32) -> Self {
        let perturb = |channel: u8, rng: &mut R| -> u8 {
            let delta = rng.gen_range(-magnitude..=magnitude);
            (channel as f32 + delta).round().clamp(0.0, 255.0) as u8
        };

        Self {
            r: perturb(self.r, rng),
            g: perturb(self.g, rng),
            b: perturb(self.b, rng),
        }
    }

    /// Scale every channel by `factor` (0.0 to 1.0 darkens).
    pub fn darken(self, factor: f32) -> Self {
        let scale = |channel: u8| ((channel as f32) * factor).floor().clamp(0.0, 255.0) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }

    /// Channel-wise linear interpolation toward `other`.
    pub fn lerp(self, other: Rgb, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}
