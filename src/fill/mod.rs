//! Fill engine - flood fill and patterned stamp fills.
//!
//! The entry point mirrors the brush dispatch: a pattern-kind brush above a
//! small intensity threshold stamps a decorated disc, everything else runs a
//! classic queue-based flood fill.

use std::collections::VecDeque;

use crate::brush::{pattern_index, BrushKind, BrushSpec};
use crate::core::color::Rgb;
use crate::core::errors::EngineError;
use crate::core::geometry::{distance, Point};
use crate::surface::{blend_pixel, fill_disc, Composite, Paint, Surface};

/// Intensity above which a pattern brush stamps instead of flooding.
const PATTERN_FILL_THRESHOLD: f32 = 0.3;

// Pattern fill geometry. The ratios are tuning values, not invariants.
const PATTERN_DISC_FACTOR: f32 = 8.0;
const DOT_RADIUS_FACTOR: f32 = 0.3;
const DOT_ALPHA: f32 = 0.2;
const STRIPE_WIDTH_FACTOR: f32 = 0.2;
const STRIPE_ALPHA: f32 = 0.15;
const RADIAL_ALPHA: f32 = 0.9;
/// Fraction of the disc radius that keeps the solid fill color before the
/// gradient starts fading to white.
const RADIAL_INNER_STOP: f32 = 0.7;

/// Flood fill tuning.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillOptions {
    /// Per-channel absolute tolerance when matching the seed color.
    /// Zero (the default) means exact match.
    pub tolerance: u8,
}

/// Fill dispatch: pattern stamp for an intense pattern brush, flood fill
/// otherwise.
pub fn fill(
    surface: &mut Surface,
    seed: Point,
    fill_color: Rgb,
    spec: &BrushSpec,
) -> Result<(), EngineError> {
    if spec.kind == BrushKind::Pattern && spec.intensity > PATTERN_FILL_THRESHOLD {
        pattern_fill(surface, seed, fill_color, spec)
    } else {
        flood_fill(surface, seed, fill_color, FillOptions::default())
    }
}

/// Classic 4-connected flood fill from `seed`.
///
/// Every pixel matching the seed's original color (within the configured
/// tolerance) and reachable through 4-connected neighbors is replaced with
/// `fill_color`. Uses an explicit queue, so large enclosed regions cannot
/// overflow the stack. Filling with the region's existing color is a no-op.
pub fn flood_fill(
    surface: &mut Surface,
    seed: Point,
    fill_color: Rgb,
    options: FillOptions,
) -> Result<(), EngineError> {
    surface.check_bounds(seed)?;

    let width = surface.width() as usize;
    let height = surface.height() as usize;
    let sx = seed.x.floor() as usize;
    let sy = seed.y.floor() as usize;

    let target = match surface.pixel(sx as u32, sy as u32) {
        Some(px) => px,
        None => return Ok(()),
    };
    let replacement = [fill_color.r, fill_color.g, fill_color.b, 255];
    if target == replacement {
        return Ok(());
    }

    let tol = options.tolerance as i32;
    let matches = |px: &[u8]| -> bool {
        px.iter()
            .zip(target.iter())
            .all(|(&a, &b)| (a as i32 - b as i32).abs() <= tol)
    };

    // With a nonzero tolerance a freshly written pixel can still match the
    // target, so track visits explicitly instead of re-reading colors.
    let mut visited = vec![false; width * height];
    let mut queue = VecDeque::new();
    queue.push_back((sx, sy));
    visited[sy * width + sx] = true;

    let mut filled = 0usize;
    while let Some((x, y)) = queue.pop_front() {
        let idx = (y * width + x) * 4;
        {
            let data = surface.as_rgba_mut();
            if !matches(&data[idx..idx + 4]) {
                continue;
            }
            data[idx..idx + 4].copy_from_slice(&replacement);
        }
        filled += 1;

        let mut push = |nx: usize, ny: usize, queue: &mut VecDeque<(usize, usize)>| {
            let vi = ny * width + nx;
            if !visited[vi] {
                visited[vi] = true;
                queue.push_back((nx, ny));
            }
        };
        if x > 0 {
            push(x - 1, y, &mut queue);
        }
        if x + 1 < width {
            push(x + 1, y, &mut queue);
        }
        if y > 0 {
            push(x, y - 1, &mut queue);
        }
        if y + 1 < height {
            push(x, y + 1, &mut queue);
        }
    }

    tracing::debug!(filled, sx, sy, "flood fill complete");
    Ok(())
}

/// Stamp a filled disc at `seed` and overlay the selected decoration.
///
/// The overlay only touches pixels that already carry paint (source-atop
/// semantics) and is confined to the stamped disc.
fn pattern_fill(
    surface: &mut Surface,
    seed: Point,
    fill_color: Rgb,
    spec: &BrushSpec,
) -> Result<(), EngineError> {
    surface.check_bounds(seed)?;

    let spacing = (spec.size * spec.intensity).max(1.0);
    let radius = PATTERN_DISC_FACTOR * spec.size * spec.intensity;
    let variant = pattern_index(spec.intensity);

    fill_disc(surface, seed, radius, &Paint::stroke(fill_color, 0.0));

    let pad = radius.ceil() as i64 + 1;
    let left = (seed.x.floor() as i64 - pad).max(0);
    let top = (seed.y.floor() as i64 - pad).max(0);
    let right = (seed.x.ceil() as i64 + pad).min(surface.width() as i64 - 1);
    let bottom = (seed.y.ceil() as i64 + pad).min(surface.height() as i64 - 1);

    for y in top..=bottom {
        for x in left..=right {
            let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let dist = distance(p, seed);
            if dist > radius {
                continue;
            }

            match variant {
                0 => {
                    // Grid of translucent white dots.
                    let gx = (p.x - seed.x).rem_euclid(spacing) - spacing / 2.0;
                    let gy = (p.y - seed.y).rem_euclid(spacing) - spacing / 2.0;
                    let to_grid = (gx * gx + gy * gy).sqrt();
                    if to_grid <= spacing * DOT_RADIUS_FACTOR {
                        overlay(surface, x, y, Rgb::WHITE, DOT_ALPHA);
                    }
                }
                1 => {
                    // Horizontal translucent white stripes.
                    let band = (p.y - seed.y).rem_euclid(spacing);
                    let half_width = spacing * STRIPE_WIDTH_FACTOR / 2.0;
                    if band <= half_width || spacing - band <= half_width {
                        overlay(surface, x, y, Rgb::WHITE, STRIPE_ALPHA);
                    }
                }
                _ => {
                    // Radial gradient: solid fill color in the middle fading
                    // to white at the rim.
                    let t = (dist / radius).clamp(0.0, 1.0);
                    let color = if t <= RADIAL_INNER_STOP {
                        fill_color
                    } else {
                        let fade = (t - RADIAL_INNER_STOP) / (1.0 - RADIAL_INNER_STOP);
                        fill_color.lerp(Rgb::WHITE, fade)
                    };
                    overlay(surface, x, y, color, RADIAL_ALPHA);
                }
            }
        }
    }
    Ok(())
}

fn overlay(surface: &mut Surface, x: i64, y: i64, color: Rgb, alpha: f32) {
    blend_pixel(surface, x, y, color, alpha, Composite::SourceAtop);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Rgb {
        Rgb::new(255, 0, 0)
    }

    fn count_color(surface: &Surface, color: [u8; 4]) -> usize {
        surface
            .as_rgba()
            .chunks_exact(4)
            .filter(|px| **px == color)
            .count()
    }

    #[test]
    fn test_flood_fill_covers_uniform_surface() {
        let mut surface = Surface::new(50, 50);
        flood_fill(
            &mut surface,
            Point::new(5.0, 5.0),
            red(),
            FillOptions::default(),
        )
        .unwrap();
        assert_eq!(count_color(&surface, [255, 0, 0, 255]), 50 * 50);
    }

    #[test]
    fn test_flood_fill_idempotent() {
        let mut surface = Surface::filled(20, 20, red());
        let before = surface.as_rgba().to_vec();
        flood_fill(
            &mut surface,
            Point::new(10.0, 10.0),
            red(),
            FillOptions::default(),
        )
        .unwrap();
        assert_eq!(surface.as_rgba(), &before[..]);
    }

    #[test]
    fn test_flood_fill_contained_by_border() {
        let mut surface = Surface::new(40, 40);

        // Draw a closed black rectangle border from (10,10) to (30,30).
        {
            let data = surface.as_rgba_mut();
            for i in 10..=30usize {
                for (x, y) in [(i, 10), (i, 30), (10, i), (30, i)] {
                    let idx = (y * 40 + x) * 4;
                    data[idx..idx + 4].copy_from_slice(&[0, 0, 0, 255]);
                }
            }
        }

        flood_fill(
            &mut surface,
            Point::new(20.0, 20.0),
            red(),
            FillOptions::default(),
        )
        .unwrap();

        // Inside filled, border intact, outside untouched.
        assert_eq!(surface.pixel(20, 20), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(10, 20), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(5, 5), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(35, 35), Some([255, 255, 255, 255]));

        // Exactly the 19x19 interior changed.
        assert_eq!(count_color(&surface, [255, 0, 0, 255]), 19 * 19);
    }

    #[test]
    fn test_flood_fill_rejects_out_of_bounds_seed() {
        let mut surface = Surface::new(10, 10);
        let result = flood_fill(
            &mut surface,
            Point::new(10.0, 3.0),
            red(),
            FillOptions::default(),
        );
        assert!(matches!(result, Err(EngineError::OutOfBounds { .. })));
        assert_eq!(count_color(&surface, [255, 255, 255, 255]), 100);
    }

    #[test]
    fn test_flood_fill_with_tolerance() {
        let mut surface = Surface::new(10, 10);
        // A slightly off-white pixel in the middle.
        {
            let data = surface.as_rgba_mut();
            let idx = (5 * 10 + 5) * 4;
            data[idx..idx + 4].copy_from_slice(&[250, 250, 250, 255]);
        }

        // Exact match stops at the off-white pixel.
        flood_fill(
            &mut surface,
            Point::new(0.0, 0.0),
            red(),
            FillOptions::default(),
        )
        .unwrap();
        assert_eq!(surface.pixel(5, 5), Some([250, 250, 250, 255]));

        // Tolerant match crosses it.
        let mut surface = Surface::new(10, 10);
        {
            let data = surface.as_rgba_mut();
            let idx = (5 * 10 + 5) * 4;
            data[idx..idx + 4].copy_from_slice(&[250, 250, 250, 255]);
        }
        flood_fill(
            &mut surface,
            Point::new(0.0, 0.0),
            red(),
            FillOptions { tolerance: 8 },
        )
        .unwrap();
        assert_eq!(surface.pixel(5, 5), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_fill_dispatches_to_flood_for_standard_brush() {
        let mut surface = Surface::new(50, 50);
        let spec = BrushSpec::new(BrushKind::Standard, "#ff0000", 5.0, 0.9).unwrap();
        fill(&mut surface, Point::new(5.0, 5.0), red(), &spec).unwrap();
        assert_eq!(count_color(&surface, [255, 0, 0, 255]), 50 * 50);
    }

    #[test]
    fn test_pattern_fill_confined_to_disc() {
        let mut surface = Surface::new(200, 200);
        // intensity 0.5 -> stripes variant, disc radius 8 * 5 * 0.5 = 20.
        let spec = BrushSpec::new(BrushKind::Pattern, "#ff0000", 5.0, 0.5).unwrap();
        fill(&mut surface, Point::new(100.0, 100.0), red(), &spec).unwrap();

        // Center painted (possibly striped, but not white).
        assert_ne!(surface.pixel(100, 100), Some([255, 255, 255, 255]));
        // Outside the disc untouched.
        assert_eq!(surface.pixel(100, 130), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(160, 100), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_pattern_fill_radial_fades_to_white_at_rim() {
        let mut surface = Surface::new(200, 200);
        // intensity 0.9 -> radial variant, radius 8 * 5 * 0.9 = 36.
        let spec = BrushSpec::new(BrushKind::Pattern, "#ff0000", 5.0, 0.9).unwrap();
        fill(&mut surface, Point::new(100.0, 100.0), red(), &spec).unwrap();

        let center = surface.pixel(100, 100).unwrap();
        let rim = surface.pixel(100, 134).unwrap();
        // Center keeps the fill color; the rim is much closer to white.
        assert!(center[1] < 40, "center: {center:?}");
        assert!(rim[1] > center[1], "rim {rim:?} vs center {center:?}");
    }

    #[test]
    fn test_pattern_fill_low_intensity_floods_instead() {
        let mut surface = Surface::new(30, 30);
        let spec = BrushSpec::new(BrushKind::Pattern, "#ff0000", 5.0, 0.2).unwrap();
        fill(&mut surface, Point::new(5.0, 5.0), red(), &spec).unwrap();
        assert_eq!(count_color(&surface, [255, 0, 0, 255]), 30 * 30);
    }
}
