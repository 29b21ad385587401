//! Gaussian-falloff glow rendering for soft stroke halos.
//!
//! The falloff follows Krita's error-function brush profile: coverage is the
//! integral of a Gaussian across the stroke edge, which gives a smooth
//! shoulder near the core and a long soft tail, unlike a linear fade.

use std::f32::consts::SQRT_2;

use crate::core::color::Rgb;
use crate::core::geometry::{distance_to_segment, Point};
use crate::surface::raster::{blend_pixel, Composite};
use crate::surface::Surface;

/// Precomputed falloff parameters, built once per stroke.
#[derive(Clone, Debug)]
pub(crate) struct GlowParams {
    center: f32,
    alphafactor: f32,
    distfactor: f32,
    reach: f32,
    fade: f32,
}

impl GlowParams {
    /// `radius` is the solid core half-width; `blur` is how far the halo
    /// extends past it.
    pub(crate) fn new(radius: f32, blur: f32) -> Self {
        let reach = (radius + blur).max(0.5);
        // A halo much larger than the core behaves like a fully soft brush.
        let fade = (2.0 * blur / reach).clamp(1e-6, 2.0);

        let center = (2.5 * (6761.0 * fade - 10000.0)) / (SQRT_2 * 6761.0 * fade);
        let alphafactor = 255.0 / (2.0 * erf(center));
        let distfactor = SQRT_2 * 12500.0 / (6761.0 * fade * reach);

        Self {
            center,
            alphafactor,
            distfactor,
            reach,
            fade,
        }
    }

    /// Opacity in [0, 1] at `dist` pixels from the stroke spine.
    fn opacity(&self, dist: f32) -> f32 {
        let val = dist * self.distfactor;
        let full_fade = self.alphafactor * (erf(val + self.center) - erf(val - self.center));
        (full_fade / 255.0).clamp(0.0, 1.0)
    }

    /// Distance beyond which the halo no longer contributes visibly.
    fn extent(&self) -> f32 {
        self.reach * (1.0 + self.fade) + 1.0
    }
}

/// Scalar erf approximation (Abramowitz and Stegun 7.1.26, |error| < 1.5e-7).
#[inline]
fn erf(x: f32) -> f32 {
    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();

    const A1: f32 = 0.254_829_6;
    const A2: f32 = -0.284_496_72;
    const A3: f32 = 1.421_413_8;
    const A4: f32 = -1.453_152_1;
    const A5: f32 = 1.061_405_4;
    const P: f32 = 0.327_591_1;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}

/// Render a soft glow along the segment `a`..`b`.
pub(crate) fn glow_segment(
    surface: &mut Surface,
    a: Point,
    b: Point,
    radius: f32,
    blur: f32,
    color: Rgb,
    opacity: f32,
) {
    let params = GlowParams::new(radius, blur);
    let pad = params.extent().ceil() as i64;

    let left = (a.x.min(b.x).floor() as i64 - pad).max(0);
    let top = (a.y.min(b.y).floor() as i64 - pad).max(0);
    let right = (a.x.max(b.x).ceil() as i64 + pad).min(surface.width() as i64 - 1);
    let bottom = (a.y.max(b.y).ceil() as i64 + pad).min(surface.height() as i64 - 1);

    for y in top..=bottom {
        for x in left..=right {
            let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let mask = params.opacity(distance_to_segment(p, a, b));
            if mask < 0.001 {
                continue;
            }
            blend_pixel(surface, x, y, color, opacity * mask, Composite::SourceOver);
        }
    }
}
