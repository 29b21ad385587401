//! Software rasterization primitives.
//!
//! Each drawing call takes an explicit [`Paint`] value instead of mutating
//! ambient stroke state, so reordered calls can never observe stale settings.
//! Lines are rasterized as capsules (distance to the segment with round caps)
//! in a single compositing pass, which keeps translucent strokes at a uniform
//! alpha instead of accumulating where stamps would overlap.

use crate::core::color::Rgb;
use crate::core::geometry::{distance, distance_to_segment, Point};
use crate::surface::Surface;

/// Compositing modes, matching the subset of canvas operations the engine
/// needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Normal painting: source over destination.
    #[default]
    SourceOver,
    /// Erasing: source alpha removes destination pixels.
    DestinationOut,
    /// Overlay: source drawn only where the destination already has paint.
    SourceAtop,
}

/// Everything one rasterization call needs, passed by value.
#[derive(Debug, Clone, Copy)]
pub struct Paint {
    pub color: Rgb,
    pub alpha: f32,
    /// Stroke width in pixels; discs ignore it.
    pub width: f32,
    pub composite: Composite,
}

impl Paint {
    pub fn stroke(color: Rgb, width: f32) -> Self {
        Self {
            color,
            alpha: 1.0,
            width,
            composite: Composite::SourceOver,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_composite(mut self, composite: Composite) -> Self {
        self.composite = composite;
        self
    }
}

/// Composite a single source sample onto the surface.
///
/// `alpha` is the effective source alpha after coverage. Out-of-range
/// coordinates are clipped silently; bounds policy belongs to the callers.
pub(crate) fn blend_pixel(
    surface: &mut Surface,
    x: i64,
    y: i64,
    color: Rgb,
    alpha: f32,
    composite: Composite,
) {
    if x < 0 || y < 0 || x >= surface.width() as i64 || y >= surface.height() as i64 {
        return;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    let width = surface.width() as usize;
    let idx = (y as usize * width + x as usize) * 4;
    let data = surface.as_rgba_mut();

    let dst_a = data[idx + 3] as f32 / 255.0;

    match composite {
        Composite::SourceOver => {
            let out_a = alpha + dst_a * (1.0 - alpha);
            if out_a <= 0.0 {
                return;
            }
            for (c, src) in [color.r, color.g, color.b].into_iter().enumerate() {
                let dst = data[idx + c] as f32;
                let out = (src as f32 * alpha + dst * dst_a * (1.0 - alpha)) / out_a;
                data[idx + c] = out.round().clamp(0.0, 255.0) as u8;
            }
            data[idx + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        Composite::DestinationOut => {
            let out_a = dst_a * (1.0 - alpha);
            data[idx + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        Composite::SourceAtop => {
            // Destination alpha is preserved; color mixes by source alpha.
            if dst_a <= 0.0 {
                return;
            }
            for (c, src) in [color.r, color.g, color.b].into_iter().enumerate() {
                let dst = data[idx + c] as f32;
                let out = dst + (src as f32 - dst) * alpha;
                data[idx + c] = out.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Antialiased coverage for a point at `dist` from a shape edge at `radius`.
#[inline]
fn edge_coverage(dist: f32, radius: f32) -> f32 {
    (radius + 0.5 - dist).clamp(0.0, 1.0)
}

/// Draw a line segment with round caps and joins.
pub(crate) fn stroke_line(surface: &mut Surface, a: Point, b: Point, paint: &Paint) {
    let half = (paint.width / 2.0).max(0.35);
    let pad = half.ceil() as i64 + 1;

    let left = (a.x.min(b.x).floor() as i64 - pad).max(0);
    let top = (a.y.min(b.y).floor() as i64 - pad).max(0);
    let right = (a.x.max(b.x).ceil() as i64 + pad).min(surface.width() as i64 - 1);
    let bottom = (a.y.max(b.y).ceil() as i64 + pad).min(surface.height() as i64 - 1);

    for y in top..=bottom {
        for x in left..=right {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let coverage = edge_coverage(distance_to_segment(center, a, b), half);
            if coverage > 0.0 {
                blend_pixel(surface, x, y, paint.color, paint.alpha * coverage, paint.composite);
            }
        }
    }
}

/// Fill a disc centered at `center`.
pub(crate) fn fill_disc(surface: &mut Surface, center: Point, radius: f32, paint: &Paint) {
    let radius = radius.max(0.35);
    let pad = radius.ceil() as i64 + 1;

    let left = (center.x.floor() as i64 - pad).max(0);
    let top = (center.y.floor() as i64 - pad).max(0);
    let right = (center.x.ceil() as i64 + pad).min(surface.width() as i64 - 1);
    let bottom = (center.y.ceil() as i64 + pad).min(surface.height() as i64 - 1);

    for y in top..=bottom {
        for x in left..=right {
            let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let coverage = edge_coverage(distance(p, center), radius);
            if coverage > 0.0 {
                blend_pixel(surface, x, y, paint.color, paint.alpha * coverage, paint.composite);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_over_opaque() {
        let mut surface = Surface::new(4, 4);
        blend_pixel(&mut surface, 1, 1, Rgb::BLACK, 1.0, Composite::SourceOver);
        assert_eq!(surface.pixel(1, 1), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_source_over_translucent() {
        let mut surface = Surface::new(4, 4);
        blend_pixel(&mut surface, 0, 0, Rgb::BLACK, 0.5, Composite::SourceOver);
        let px = surface.pixel(0, 0).unwrap();
        assert!(px[0] > 120 && px[0] < 135, "got {px:?}");
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_destination_out_removes_alpha() {
        let mut surface = Surface::new(4, 4);
        blend_pixel(&mut surface, 2, 2, Rgb::BLACK, 1.0, Composite::DestinationOut);
        assert_eq!(surface.pixel(2, 2).unwrap()[3], 0);
    }

    #[test]
    fn test_source_atop_skips_empty_pixels() {
        let mut surface = Surface::new(4, 4);
        blend_pixel(&mut surface, 1, 1, Rgb::BLACK, 1.0, Composite::DestinationOut);
        blend_pixel(&mut surface, 1, 1, Rgb::new(10, 10, 10), 1.0, Composite::SourceAtop);
        // Alpha was zero, so atop paints nothing.
        assert_eq!(surface.pixel(1, 1).unwrap()[3], 0);
    }

    #[test]
    fn test_blend_clips_out_of_range() {
        let mut surface = Surface::new(4, 4);
        blend_pixel(&mut surface, -1, 0, Rgb::BLACK, 1.0, Composite::SourceOver);
        blend_pixel(&mut surface, 0, 99, Rgb::BLACK, 1.0, Composite::SourceOver);
        assert!(surface
            .as_rgba()
            .chunks_exact(4)
            .all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_stroke_line_marks_path() {
        let mut surface = Surface::new(30, 30);
        let paint = Paint::stroke(Rgb::BLACK, 4.0);
        stroke_line(
            &mut surface,
            Point::new(5.0, 15.0),
            Point::new(25.0, 15.0),
            &paint,
        );

        // On the path: solid black. Far from it: untouched.
        assert_eq!(surface.pixel(15, 15), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(15, 3), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_stroke_zero_length_leaves_round_cap() {
        let mut surface = Surface::new(20, 20);
        let paint = Paint::stroke(Rgb::BLACK, 6.0);
        let p = Point::new(10.0, 10.0);
        stroke_line(&mut surface, p, p, &paint);
        assert_eq!(surface.pixel(10, 10), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_fill_disc() {
        let mut surface = Surface::new(20, 20);
        let paint = Paint::stroke(Rgb::new(255, 0, 0), 0.0);
        fill_disc(&mut surface, Point::new(10.0, 10.0), 5.0, &paint);

        assert_eq!(surface.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(10, 1), Some([255, 255, 255, 255]));
    }
}
