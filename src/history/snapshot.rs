//! Lossless surface snapshots.
//!
//! Snapshots are LZ4-compressed raw RGBA rather than PNG: compression is an
//! order of magnitude faster, the round trip is exact, and undo latency stays
//! bounded by surface size. Each snapshot is a deep copy and never aliases
//! the live surface buffer.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use crate::core::errors::EngineError;
use crate::surface::Surface;

/// An encoded full copy of a surface's pixels at one point in time.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    width: u32,
    height: u32,
    compressed: Vec<u8>,
}

impl Snapshot {
    /// Capture the surface's current pixels.
    pub(crate) fn capture(surface: &Surface) -> Result<Self, EngineError> {
        let rgba = surface.as_rgba();
        let expected = surface.width() as usize * surface.height() as usize * 4;
        if rgba.len() != expected {
            return Err(EngineError::SnapshotEncode(format!(
                "surface buffer is {} bytes, expected {expected}",
                rgba.len()
            )));
        }

        let compressed = compress_prepend_size(rgba);
        tracing::debug!(
            raw = rgba.len(),
            compressed = compressed.len(),
            "captured snapshot"
        );

        Ok(Self {
            width: surface.width(),
            height: surface.height(),
            compressed,
        })
    }

    /// Restore this snapshot's pixels onto `surface`, replacing its contents
    /// entirely. The surface is untouched if decoding fails.
    pub(crate) fn restore(&self, surface: &mut Surface) -> Result<(), EngineError> {
        if (self.width, self.height) != (surface.width(), surface.height()) {
            return Err(EngineError::SnapshotDecode(format!(
                "snapshot is {}x{}, surface is {}x{}",
                self.width,
                self.height,
                surface.width(),
                surface.height()
            )));
        }

        let rgba = decompress_size_prepended(&self.compressed)
            .map_err(|e| EngineError::SnapshotDecode(e.to_string()))?;
        surface.replace_rgba(&rgba)?;
        Ok(())
    }
}
