//! Effects-service boundary.
//!
//! The external effects service is a black box: it takes the current frame
//! (see [`Surface::to_png`] / [`Surface::to_png_data_url`]) and returns a new
//! full-frame image. This module draws that result back wholesale and records
//! it as a single, non-mergeable AI history entry.

use serde_json::Value;

use crate::core::errors::EngineError;
use crate::history::{HistoryManager, RecordOutcome};
use crate::surface::Surface;

/// Replace the surface with a processed full frame and record one AI entry.
///
/// The frame must decode to exactly the surface's dimensions; a mismatched
/// frame is rejected before any pixel changes.
pub fn apply_effect_result(
    surface: &mut Surface,
    history: &mut HistoryManager,
    frame: &[u8],
    operation_type: &str,
    parameters: Value,
) -> Result<RecordOutcome, EngineError> {
    let img = image::load_from_memory(frame)?.to_rgba8();
    let (fw, fh) = img.dimensions();
    if (fw, fh) != (surface.width(), surface.height()) {
        return Err(EngineError::FrameSizeMismatch {
            frame_width: fw,
            frame_height: fh,
            surface_width: surface.width(),
            surface_height: surface.height(),
        });
    }

    surface.replace_rgba(img.as_raw())?;
    tracing::debug!(operation_type, "applied effect result frame");
    history.add_ai_operation(surface, operation_type, parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Rgb;

    #[test]
    fn test_apply_effect_result_replaces_frame_and_records() {
        let mut surface = Surface::new(16, 16);
        let mut history = HistoryManager::new();
        history.record(&surface, "init").unwrap();

        let processed = Surface::filled(16, 16, Rgb::new(90, 30, 200));
        let frame = processed.to_png().unwrap();

        let outcome = apply_effect_result(
            &mut surface,
            &mut history,
            &frame,
            "ghibli-style",
            serde_json::json!({"strength": 0.8}),
        )
        .unwrap();

        assert_eq!(outcome, RecordOutcome::Appended);
        assert_eq!(surface.pixel(8, 8), Some([90, 30, 200, 255]));

        let entry = history.current_entry().unwrap();
        assert!(entry.is_ai_operation());
        assert_eq!(entry.action_type(), "ghibli-style");

        // Undoing the AI operation returns to the pre-effect frame.
        history.undo(&mut surface, true).unwrap().unwrap();
        assert_eq!(surface.pixel(8, 8), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_mismatched_frame_rejected_before_mutation() {
        let mut surface = Surface::new(16, 16);
        let mut history = HistoryManager::new();

        let wrong = Surface::filled(8, 8, Rgb::BLACK).to_png().unwrap();
        let result = apply_effect_result(
            &mut surface,
            &mut history,
            &wrong,
            "enhance",
            Value::Null,
        );

        assert!(matches!(result, Err(EngineError::FrameSizeMismatch { .. })));
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
        assert!(history.is_empty());
    }

    #[test]
    fn test_garbage_frame_rejected() {
        let mut surface = Surface::new(4, 4);
        let mut history = HistoryManager::new();
        let result =
            apply_effect_result(&mut surface, &mut history, b"not an image", "x", Value::Null);
        assert!(matches!(result, Err(EngineError::Image(_))));
    }
}
