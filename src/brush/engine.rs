//! Brush stroke rasterization.
//!
//! `apply_stroke` is the single entry point: it validates the segment, picks
//! the per-kind algorithm, and mutates surface pixels. Only the standard kind
//! is deterministic; the organic kinds draw from the caller-supplied RNG so
//! tests can seed them and assert statistical properties.

use rand::Rng;

use crate::brush::{pattern_index, BrushKind, BrushSpec, Segment, StrokeMode};
use crate::core::errors::EngineError;
use crate::surface::{fill_disc, glow_segment, stroke_line, Composite, Paint, Surface};

/// Noise disc color variation for the texture brush, per channel.
const TEXTURE_JITTER: f32 = 15.0;
/// Noise discs stamped around each texture step.
const TEXTURE_NOISE_COUNT: usize = 3;

/// Stateless stroke renderer with engine-level policy knobs.
pub struct BrushEngine {
    /// Floor applied to `intensity` so a zero-intensity stroke still leaves a
    /// visible mark instead of silently doing nothing.
    min_intensity: f32,
}

impl BrushEngine {
    pub fn new() -> Self {
        Self {
            min_intensity: 0.05,
        }
    }

    /// Override the zero-intensity visibility floor (0.0 disables it).
    pub fn with_min_intensity(min_intensity: f32) -> Self {
        Self {
            min_intensity: min_intensity.clamp(0.0, 1.0),
        }
    }

    /// Rasterize one segment of a stroke onto the surface.
    ///
    /// Fails with `OutOfBounds` before touching any pixel if either segment
    /// endpoint lies outside the surface.
    pub fn apply_stroke<R: Rng>(
        &self,
        surface: &mut Surface,
        spec: &BrushSpec,
        segment: Segment,
        rng: &mut R,
    ) -> Result<(), EngineError> {
        surface.check_bounds(segment.start)?;
        surface.check_bounds(segment.end)?;

        if spec.mode == StrokeMode::Erase {
            // Erasing ignores the brush kind: same path, destructive blend.
            let paint = Paint::stroke(spec.color, spec.size)
                .with_composite(Composite::DestinationOut);
            stroke_line(surface, segment.start, segment.end, &paint);
            return Ok(());
        }

        let intensity = spec.intensity.max(self.min_intensity);

        match spec.kind {
            BrushKind::Standard => self.standard(surface, spec, segment),
            BrushKind::SmartColor => self.smart_color(surface, spec, segment, intensity),
            BrushKind::Texture => self.texture(surface, spec, segment, intensity, rng),
            BrushKind::Blend => self.blend(surface, spec, segment, intensity),
            BrushKind::Shade => self.shade(surface, spec, segment, intensity),
            BrushKind::Pattern => self.pattern(surface, spec, segment, intensity),
        }
        Ok(())
    }

    fn standard(&self, surface: &mut Surface, spec: &BrushSpec, segment: Segment) {
        let paint = Paint::stroke(spec.color, spec.size);
        stroke_line(surface, segment.start, segment.end, &paint);
    }

    fn smart_color(
        &self,
        surface: &mut Surface,
        spec: &BrushSpec,
        segment: Segment,
        intensity: f32,
    ) {
        let blur = spec.size * intensity * 2.0;
        glow_segment(
            surface,
            segment.start,
            segment.end,
            spec.size / 2.0,
            blur,
            spec.color,
            intensity,
        );
        self.standard(surface, spec, segment);
    }

    fn texture<R: Rng>(
        &self,
        surface: &mut Surface,
        spec: &BrushSpec,
        segment: Segment,
        intensity: f32,
        rng: &mut R,
    ) {
        let steps = segment.steps();

        for i in 0..steps {
            let t = i as f32 / steps as f32;
            let at = segment.point_at(t);

            let dot_radius = (0.5 + 0.5 * rng.gen::<f32>()) * spec.size * intensity;
            fill_disc(surface, at, dot_radius, &Paint::stroke(spec.color, 0.0));

            for _ in 0..TEXTURE_NOISE_COUNT {
                let noise_at = at.offset(
                    rng.gen_range(-spec.size..=spec.size),
                    rng.gen_range(-spec.size..=spec.size),
                );
                let noise_radius = rng.gen::<f32>() * 0.5 * spec.size * intensity;
                let noise_color = spec.color.jitter(rng, TEXTURE_JITTER);
                fill_disc(surface, noise_at, noise_radius, &Paint::stroke(noise_color, 0.0));
            }
        }
    }

    fn blend(&self, surface: &mut Surface, spec: &BrushSpec, segment: Segment, intensity: f32) {
        let passes = [
            (spec.size, 0.4),
            (spec.size * 1.5, 0.2),
            (spec.size * 2.5, 0.1),
        ];
        for (width, alpha) in passes {
            let paint = Paint::stroke(spec.color, width).with_alpha(alpha * intensity);
            stroke_line(surface, segment.start, segment.end, &paint);
        }
    }

    fn shade(&self, surface: &mut Surface, spec: &BrushSpec, segment: Segment, intensity: f32) {
        self.standard(surface, spec, segment);

        let perp = segment.direction() + std::f32::consts::FRAC_PI_2;
        let dx = perp.cos() * spec.size * 0.5;
        let dy = perp.sin() * spec.size * 0.5;

        let paint = Paint::stroke(spec.color.darken(0.7), spec.size * 0.7)
            .with_alpha(0.3 * intensity);
        stroke_line(
            surface,
            segment.start.offset(dx, dy),
            segment.end.offset(dx, dy),
            &paint,
        );
    }

    fn pattern(&self, surface: &mut Surface, spec: &BrushSpec, segment: Segment, intensity: f32) {
        let steps = segment.steps();
        let variant = pattern_index(intensity);

        for i in 0..steps {
            let t = i as f32 / steps as f32;
            let at = segment.point_at(t);

            match variant {
                0 => {
                    // Dots, every other step.
                    if i % 2 == 0 {
                        fill_disc(surface, at, spec.size * 0.6, &Paint::stroke(spec.color, 0.0));
                    }
                }
                1 => {
                    // Cross-hatch X, every third step.
                    if i % 3 == 0 {
                        let half = spec.size * 0.5;
                        let paint = Paint::stroke(spec.color, spec.size * 0.3);
                        stroke_line(
                            surface,
                            at.offset(-half, -half),
                            at.offset(half, half),
                            &paint,
                        );
                        stroke_line(
                            surface,
                            at.offset(half, -half),
                            at.offset(-half, half),
                            &paint,
                        );
                    }
                }
                _ => {
                    // Zigzag: alternate vertical and horizontal ticks.
                    let half = spec.size * 0.5;
                    let paint = Paint::stroke(spec.color, spec.size * 0.4);
                    let (from, to) = if i % 2 == 0 {
                        (at.offset(0.0, -half), at.offset(0.0, half))
                    } else {
                        (at.offset(-half, 0.0), at.offset(half, 0.0))
                    };
                    stroke_line(surface, from, to, &paint);
                }
            }
        }
    }
}

impl Default for BrushEngine {
    fn default() -> Self {
        Self::new()
    }
}
