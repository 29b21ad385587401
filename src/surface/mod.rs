//! The mutable raster surface that brushes and fills draw onto.
//!
//! A [`Surface`] is a straight-alpha RGBA byte buffer with fixed dimensions.
//! It is created once per editing session and never resized; every stroke and
//! fill mutates it in place, and the history manager snapshots it wholesale.

mod glow;
mod raster;

pub use raster::{Composite, Paint};
pub(crate) use glow::glow_segment;
pub(crate) use raster::{blend_pixel, fill_disc, stroke_line};

use base64::Engine as _;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

use crate::core::color::Rgb;
use crate::core::errors::EngineError;
use crate::core::geometry::Point;

/// A fixed-size RGBA pixel buffer.
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Create a white surface, matching a freshly cleared canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgb::WHITE)
    }

    /// Create a surface filled with a solid color.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let mut data = vec![0; width as usize * height as usize * 4];
        for px in data.chunks_exact_mut(4) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = 255;
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw straight-alpha RGBA buffer, row-major.
    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_rgba_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// RGBA value at integer coordinates, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Reject a point outside `[0, width) x [0, height)`.
    pub(crate) fn check_bounds(&self, p: Point) -> Result<(), EngineError> {
        if p.x < 0.0 || p.y < 0.0 || p.x >= self.width as f32 || p.y >= self.height as f32 {
            return Err(EngineError::OutOfBounds {
                x: p.x.floor() as i64,
                y: p.y.floor() as i64,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Replace the entire pixel contents with a same-sized RGBA buffer.
    pub fn replace_rgba(&mut self, rgba: &[u8]) -> Result<(), EngineError> {
        if rgba.len() != self.data.len() {
            return Err(EngineError::InvalidInput(format!(
                "frame buffer is {} bytes, surface needs {}",
                rgba.len(),
                self.data.len()
            )));
        }
        self.data.copy_from_slice(rgba);
        Ok(())
    }

    /// Draw a decoded template/background image over the whole surface,
    /// scaling it to the surface dimensions.
    pub fn load_background(&mut self, encoded: &[u8]) -> Result<(), EngineError> {
        let img = image::load_from_memory(encoded)?.to_rgba8();
        let scaled = if img.dimensions() == (self.width, self.height) {
            img
        } else {
            image::imageops::resize(
                &img,
                self.width,
                self.height,
                image::imageops::FilterType::Triangle,
            )
        };

        // Composite over the existing (white) ground so transparent line art
        // keeps a paintable backdrop.
        for (y, row) in scaled.rows().enumerate() {
            for (x, src) in row.enumerate() {
                let alpha = src.0[3] as f32 / 255.0;
                raster::blend_pixel(
                    self,
                    x as i64,
                    y as i64,
                    Rgb::new(src.0[0], src.0[1], src.0[2]),
                    alpha,
                    Composite::SourceOver,
                );
            }
        }
        Ok(())
    }

    /// Encode the current pixels as a PNG blob for the artwork store or the
    /// effects service.
    pub fn to_png(&self) -> Result<Vec<u8>, EngineError> {
        let img = RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(
            || EngineError::SnapshotEncode("surface buffer has inconsistent length".into()),
        )?;

        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// PNG export as a `data:` URL, the shape UI layers hand to external
    /// services.
    pub fn to_png_data_url(&self) -> Result<String, EngineError> {
        let png = self.to_png()?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        Ok(format!("data:image/png;base64,{encoded}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_white() {
        let surface = Surface::new(4, 3);
        assert_eq!(surface.width(), 4);
        assert_eq!(surface.height(), 3);
        assert!(surface
            .as_rgba()
            .chunks_exact(4)
            .all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_pixel_access() {
        let surface = Surface::filled(2, 2, Rgb::new(10, 20, 30));
        assert_eq!(surface.pixel(1, 1), Some([10, 20, 30, 255]));
        assert_eq!(surface.pixel(2, 0), None);
        assert_eq!(surface.pixel(0, 2), None);
    }

    #[test]
    fn test_check_bounds() {
        let surface = Surface::new(10, 10);
        assert!(surface.check_bounds(Point::new(0.0, 0.0)).is_ok());
        assert!(surface.check_bounds(Point::new(9.9, 9.9)).is_ok());
        assert!(matches!(
            surface.check_bounds(Point::new(10.0, 5.0)),
            Err(EngineError::OutOfBounds { .. })
        ));
        assert!(matches!(
            surface.check_bounds(Point::new(-1.0, 5.0)),
            Err(EngineError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_replace_rgba_rejects_wrong_length() {
        let mut surface = Surface::new(4, 4);
        assert!(matches!(
            surface.replace_rgba(&[0; 7]),
            Err(EngineError::InvalidInput(_))
        ));
        // Untouched after the failed call.
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_png_round_trip() {
        let surface = Surface::filled(8, 5, Rgb::new(200, 50, 25));
        let png = surface.to_png().unwrap();

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 5));
        assert_eq!(decoded.get_pixel(3, 2).0, [200, 50, 25, 255]);
    }

    #[test]
    fn test_png_data_url_prefix() {
        let surface = Surface::new(2, 2);
        let url = surface.to_png_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_load_background_scales_to_surface() {
        let template = Surface::filled(4, 4, Rgb::new(0, 128, 255));
        let png = template.to_png().unwrap();

        let mut surface = Surface::new(16, 16);
        surface.load_background(&png).unwrap();
        assert_eq!(surface.pixel(8, 8), Some([0, 128, 255, 255]));
    }
}
