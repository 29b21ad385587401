use thiserror::Error;

/// Errors surfaced by the drawing engine.
///
/// Every public operation is all-or-nothing: when one of these is returned,
/// neither the surface nor the history log has been mutated.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("point ({x}, {y}) is outside the {width}x{height} surface")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("invalid color format {0:?}, expected \"#RRGGBB\"")]
    InvalidColorFormat(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("snapshot encode failed: {0}")]
    SnapshotEncode(String),

    #[error("snapshot decode failed: {0}")]
    SnapshotDecode(String),

    #[error("no checkpoint named {0:?}")]
    CheckpointNotFound(String),

    #[error(
        "frame is {frame_width}x{frame_height} but surface is {surface_width}x{surface_height}"
    )]
    FrameSizeMismatch {
        frame_width: u32,
        frame_height: u32,
        surface_width: u32,
        surface_height: u32,
    },

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
}
