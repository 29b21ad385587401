//! Brush engine module - turns pointer segments into pixels.

mod engine;

pub use engine::BrushEngine;

use serde::{Deserialize, Serialize};

use crate::core::color::Rgb;
use crate::core::errors::EngineError;
use crate::core::geometry::{self, Point};

/// The available brush algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BrushKind {
    /// Plain solid stroke.
    #[default]
    Standard,
    /// Solid stroke over a soft glow halo.
    SmartColor,
    /// Stamped discs with per-stamp size and color noise.
    Texture,
    /// Concentric translucent passes for soft blending.
    Blend,
    /// Solid stroke plus a darkened, perpendicular-offset shadow stroke.
    Shade,
    /// Repeating dot / cross-hatch / zigzag marks along the path.
    Pattern,
}

/// Whether a stroke lays paint down or lifts it off.
///
/// Erasing is a compositing mode, not a brush kind; it applies to any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StrokeMode {
    #[default]
    Paint,
    Erase,
}

/// Everything that stays fixed for the duration of one stroke.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrushSpec {
    pub kind: BrushKind,
    pub mode: StrokeMode,
    /// Brush radius-ish unit in pixels; strictly positive.
    pub size: f32,
    pub color: Rgb,
    /// Visual magnitude in [0, 1]; scales opacity, jitter and density.
    pub intensity: f32,
}

impl BrushSpec {
    /// Build a spec, validating the color string and clamping intensity.
    pub fn new(kind: BrushKind, color: &str, size: f32, intensity: f32) -> Result<Self, EngineError> {
        if size <= 0.0 || !size.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "brush size must be positive, got {size}"
            )));
        }
        Ok(Self {
            kind,
            mode: StrokeMode::Paint,
            size,
            color: Rgb::parse(color)?,
            intensity: intensity.clamp(0.0, 1.0),
        })
    }

    pub fn with_mode(mut self, mode: StrokeMode) -> Self {
        self.mode = mode;
        self
    }
}

/// The path traveled since the previous sampled pointer position.
///
/// `start == end` is a tap and still renders a single mark.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn tap(at: Point) -> Self {
        Self {
            start: at,
            end: at,
        }
    }

    pub fn length(&self) -> f32 {
        geometry::distance(self.start, self.end)
    }

    pub fn direction(&self) -> f32 {
        geometry::angle(self.start, self.end)
    }

    /// Point at parameter `t` in [0, 1] along the segment.
    pub fn point_at(&self, t: f32) -> Point {
        self.start.lerp(self.end, t)
    }

    /// Number of per-pixel subdivision steps; a tap still gets one.
    pub(crate) fn steps(&self) -> usize {
        (self.length().floor() as usize).max(1)
    }
}

/// Sub-pattern selector shared by the pattern brush and the pattern fill:
/// intensity thirds map to the three variants.
pub(crate) fn pattern_index(intensity: f32) -> usize {
    ((intensity * 3.0).floor() as usize).min(2)
}
